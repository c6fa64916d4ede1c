//! Syntax highlighting for fenced code blocks
//!
//! Uses syntect's bundled grammars and emits class-based HTML (`hljs-*`
//! classes) so the message view's stylesheet decides the colours.

use std::sync::OnceLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::utils::escape_html;

/// Global cached syntax set
static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Map the language names people type after a code fence to syntect tokens
fn map_language_alias(language: &str) -> &str {
    match language {
        "javascript" | "node" | "mjs" | "cjs" => "js",
        "python" | "py3" => "py",
        "ruby" => "rb",
        "rust" => "rs",
        "golang" => "go",
        "c++" | "cc" | "cxx" | "hpp" => "cpp",
        "c#" | "csharp" => "cs",
        "bash" | "shell" | "zsh" | "console" => "sh",
        "yml" => "yaml",
        "markdown" => "md",
        "objective-c" | "objc" => "m",
        "perl" => "pl",
        "patch" => "diff",
        "kotlin" => "kt",
        other => other,
    }
}

fn find_syntax(language: &str) -> Option<&'static SyntaxReference> {
    if language.is_empty() {
        return None;
    }
    let set = syntax_set();
    set.find_syntax_by_token(map_language_alias(language))
}

/// Display name of the language, e.g. `Rust` for `rs`
pub fn language_name(language: &str) -> Option<&'static str> {
    find_syntax(language).map(|syntax| syntax.name.as_str())
}

/// Highlight `code` as `language`.
///
/// Unknown languages and highlighter failures fall back to escaped plain
/// text, so the result is always safe to insert.
pub fn highlight(language: &str, code: &str) -> String {
    let Some(syntax) = find_syntax(language) else {
        return escape_html(code);
    };

    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        syntax_set(),
        ClassStyle::SpacedPrefixed { prefix: "hljs-" },
    );

    for line in LinesWithEndings::from(code) {
        if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
            log::warn!("Highlighting {} failed, using plain text: {}", language, err);
            return escape_html(code);
        }
    }

    log::trace!("Highlighted {} bytes of {}", code.len(), syntax.name);
    generator.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_languages() {
        assert_eq!(language_name("rs"), Some("Rust"));
        assert_eq!(language_name("xml"), Some("XML"));
    }

    #[test]
    fn test_unknown_language() {
        assert_eq!(language_name(""), None);
        assert_eq!(language_name("definitely-not-a-language"), None);
        assert_eq!(highlight("definitely-not-a-language", "<b>"), "&lt;b&gt;");
    }

    #[test]
    fn test_highlight_escapes_markup() {
        let html = highlight("xml", "<b>x</b>\n");
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;"));
        assert!(html.contains("hljs-"));
    }
}
