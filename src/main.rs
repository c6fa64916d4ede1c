//! Chat Markdown - markdown toggles and message rendering from the shell
//!
//! Entry point for the command line tool. Handles CLI argument parsing,
//! logging initialization, and dispatch to the library.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chat_markdown::config::Config;
use chat_markdown::editor::{apply_markdown, ApplyMarkdownOptions, MarkdownMode, SelectionRange};
use chat_markdown::error::AppResult;
use chat_markdown::markdown::{format, format_with_renderer, strip_markdown, MentionableRenderer};

/// Application name for logging
const APP_NAME: &str = "chat-markdown";

/// A parsed command line
#[derive(Debug)]
enum Command {
    Render {
        search: Option<String>,
        singleline: bool,
        file: Option<PathBuf>,
    },
    Strip {
        file: Option<PathBuf>,
    },
    Mentionable {
        file: Option<PathBuf>,
    },
    Toggle {
        mode: String,
        start: usize,
        end: usize,
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_logging();

    let command = parse_args()?;
    log::debug!("Running {:?}", command);

    let config = load_config();
    let output = run(command, &config)?;
    println!("{}", output);
    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Load the user's configuration, falling back to defaults
fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(err) => {
            log::warn!("{}, using defaults", err.user_message());
            Config::default()
        }
    }
}

/// Parse command line arguments
fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let Some(name) = args.first() else {
        print_help();
        std::process::exit(1);
    };

    let mut search = None;
    let mut singleline = false;
    let mut positional: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" | "help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-s" | "--search" => {
                let Some(term) = args.get(i + 1) else {
                    bail!("--search requires a search term");
                };
                search = Some(term.clone());
                i += 1;
            }
            "--singleline" => singleline = true,
            arg if arg.starts_with('-') && arg != "-" => {
                bail!("Unknown option: {}\nUse --help for usage information", arg);
            }
            arg if i > 0 => positional.push(arg.to_string()),
            _ => {}
        }
        i += 1;
    }

    let file_arg = |idx: usize| {
        positional
            .get(idx)
            .filter(|path| path.as_str() != "-")
            .map(PathBuf::from)
    };

    let command = match name.as_str() {
        "render" => Command::Render {
            search,
            singleline,
            file: file_arg(0),
        },
        "strip" => Command::Strip { file: file_arg(0) },
        "mentionable" => Command::Mentionable { file: file_arg(0) },
        "toggle" => {
            if positional.len() < 3 {
                bail!("toggle requires MODE START END");
            }
            let start = positional[1]
                .parse()
                .with_context(|| format!("Invalid selection start: {}", positional[1]))?;
            let end = positional[2]
                .parse()
                .with_context(|| format!("Invalid selection end: {}", positional[2]))?;
            Command::Toggle {
                mode: positional[0].clone(),
                start,
                end,
                file: file_arg(3),
            }
        }
        other => bail!("Unknown command: {}\nUse --help for usage information", other),
    };
    Ok(command)
}

/// Read a message from `path`, or from stdin when no path is given
fn read_input(path: Option<&Path>) -> AppResult<String> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    log::debug!("Read {} bytes of input", text.len());
    Ok(text)
}

/// Accept a mode name or one of the configured shortcuts
fn resolve_mode(name: &str, config: &Config) -> Result<MarkdownMode> {
    match name.parse::<MarkdownMode>() {
        Ok(mode) => Ok(mode),
        Err(err) => config
            .editor
            .mode_for_shortcut(name)
            .ok_or_else(|| anyhow!(err.user_message())),
    }
}

fn run(command: Command, config: &Config) -> Result<String> {
    let output = match command {
        Command::Render {
            search,
            singleline,
            file,
        } => {
            let text = read_input(file.as_deref()).context("Could not read message")?;
            let mut options = config.render.clone();
            if let Some(term) = search {
                options = options.with_search_term(term);
            }
            if singleline {
                options = options.with_singleline(true);
            }
            format(&text, &options)
        }
        Command::Strip { file } => {
            let text = read_input(file.as_deref()).context("Could not read message")?;
            strip_markdown(&text)
        }
        Command::Mentionable { file } => {
            let text = read_input(file.as_deref()).context("Could not read message")?;
            format_with_renderer(&text, &MentionableRenderer)
        }
        Command::Toggle {
            mode,
            start,
            end,
            file,
        } => {
            let mode = resolve_mode(&mode, config)?;
            let text = read_input(file.as_deref()).context("Could not read message")?;
            if let Err(err) = SelectionRange::checked(&text, start, end) {
                log::warn!("{}, clamping to the message", err);
            }
            let options = ApplyMarkdownOptions::new(mode, text, SelectionRange::new(start, end));
            serde_json::to_string_pretty(&apply_markdown(&options))?
        }
    };
    Ok(output)
}

/// Print help message
fn print_help() {
    println!(
        r#"Chat Markdown - markdown toggles and message rendering

USAGE:
    {0} <COMMAND> [OPTIONS] [FILE]

Messages are read from FILE, or from stdin when FILE is omitted or "-".

COMMANDS:
    render [FILE]                   Render a message to HTML
    strip [FILE]                    Print a one-line plain text preview
    mentionable [FILE]              Print the text that may contain @mentions
    toggle MODE START END [FILE]    Toggle markdown around a selection and
                                    print the result as JSON

OPTIONS:
    -h, --help          Show this help message
    -v, --version       Show version information
    -s, --search TERM   Highlight search terms (render)
        --singleline    Render for a single-line preview (render)

MODES:
    bold, italic, link, strike, code, heading, quote, ul, ol
    A configured shortcut such as Ctrl+B is accepted in place of a mode.

EXAMPLES:
    echo '**hi** there' | {0} render
    {0} render --search "deploy" message.md
    printf 'hello world' | {0} toggle bold 6 11
"#,
        APP_NAME
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
