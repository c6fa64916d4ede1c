//! Search module for Chat Markdown
//!
//! Highlights the terms of a message search inside rendered output:
//! - Query parsing (phrases, flags, mentions)
//! - Term to regex compilation
//! - Highlight insertion into escaped HTML text

mod terms;

pub use terms::parse_search_terms;

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Opening tag wrapped around every highlighted match
pub const HIGHLIGHT_OPEN: &str = r#"<span class="search-highlight">"#;
const HIGHLIGHT_CLOSE: &str = "</span>";


/// A compiled search term
#[derive(Debug, Clone)]
pub struct SearchPattern {
    /// The term as typed by the user
    pub term: String,
    /// Case-insensitive regex with a prefix group (1) and a match group (2)
    pub pattern: Regex,
}

impl SearchPattern {
    /// Compile a single search term.
    ///
    /// - terms containing CJK characters match anywhere, without word boundaries
    /// - a trailing `*` makes a prefix search
    /// - terms starting with `@` or `#` must follow a non-word character
    /// - anything else is bounded by `\b` on both sides
    pub fn from_term(term: &str) -> Option<Self> {
        let body = if term.chars().any(is_cjk) {
            format!("()({})", regex::escape(&term.replace('*', "")))
        } else if is_prefix_search(term) {
            format!(r"\b()({})", regex::escape(&term[..term.len() - 1]))
        } else if term.starts_with('@') || term.starts_with('#') {
            format!(r"(\W|^)({})\b", regex::escape(term))
        } else {
            format!(r"\b()({})\b", regex::escape(term))
        };

        match Regex::new(&format!("(?i){}", body)) {
            Ok(pattern) => Some(Self {
                term: term.to_string(),
                pattern,
            }),
            Err(err) => {
                log::warn!("Could not compile search term {:?}: {}", term, err);
                None
            }
        }
    }

    /// Check if the pattern matches anywhere in `text`
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

fn is_prefix_search(term: &str) -> bool {
    let mut chars = term.chars().rev();
    matches!((chars.next(), chars.next()), (Some('*'), Some(prev)) if !prev.is_whitespace())
}

fn is_cjk(ch: char) -> bool {
    matches!(
        ch,
        '\u{3000}'..='\u{303f}'
            | '\u{3040}'..='\u{309f}'
            | '\u{30a0}'..='\u{30ff}'
            | '\u{ff00}'..='\u{ff9f}'
            | '\u{4e00}'..='\u{9faf}'
            | '\u{3400}'..='\u{4dbf}'
            | '\u{ac00}'..='\u{d7a3}'
    )
}

/// Compile a search box query into patterns, longest term first
pub fn search_patterns(search_term: &str) -> Vec<SearchPattern> {
    let mut patterns: Vec<SearchPattern> = parse_search_terms(search_term)
        .iter()
        .filter_map(|term| SearchPattern::from_term(term))
        .collect();

    patterns.sort_by(|a, b| b.term.chars().count().cmp(&a.term.chars().count()));
    patterns
}

fn entity() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("invalid entity regex"))
}

/// A run of output text
#[derive(Debug)]
enum Piece<'t> {
    /// Text later patterns may still match
    Open(&'t str),
    /// An entity or an inserted highlight, emitted as is
    Closed(Cow<'t, str>),
}

/// Split `text` into open runs and closed entities
fn split_entities(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in entity().find_iter(text) {
        if m.start() > last {
            pieces.push(Piece::Open(&text[last..m.start()]));
        }
        pieces.push(Piece::Closed(Cow::Borrowed(m.as_str())));
        last = m.end();
    }
    if last < text.len() {
        pieces.push(Piece::Open(&text[last..]));
    }
    pieces
}

/// Highlight the matches of `pattern` inside one open run
fn highlight_run<'t>(run: &'t str, pattern: &SearchPattern, pieces: &mut Vec<Piece<'t>>) -> usize {
    let mut last = 0;
    let mut count = 0;
    for caps in pattern.pattern.captures_iter(run) {
        let Some(word) = caps.get(2) else {
            continue;
        };
        if word.start() > last {
            pieces.push(Piece::Open(&run[last..word.start()]));
        }
        pieces.push(Piece::Closed(Cow::Owned(format!(
            "{}{}{}",
            HIGHLIGHT_OPEN,
            word.as_str(),
            HIGHLIGHT_CLOSE
        ))));
        last = word.end();
        count += 1;
    }
    if last < run.len() {
        pieces.push(Piece::Open(&run[last..]));
    }
    count
}

/// Wrap every match of `patterns` in `<span class="search-highlight">`.
///
/// `text` is escaped HTML text without tags. Entities are never split, and a
/// span inserted for one pattern is never matched again by a later one.
/// Each pattern only searches the runs left open by earlier ones, so the
/// edges of an entity or an earlier highlight act as word boundaries.
pub fn highlight_search_terms(text: &str, patterns: &[SearchPattern]) -> String {
    if patterns.is_empty() || text.is_empty() {
        return text.to_string();
    }

    let mut pieces = split_entities(text);
    let mut count = 0;

    for pattern in patterns {
        let mut next = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match piece {
                Piece::Open(run) => count += highlight_run(run, pattern, &mut next),
                closed => next.push(closed),
            }
        }
        pieces = next;
    }

    log::trace!("Highlighted {} search match(es)", count);
    pieces
        .iter()
        .map(|piece| match piece {
            Piece::Open(run) => *run,
            Piece::Closed(html) => &html[..],
        })
        .collect()
}

/// Check if any pattern matches `text`
pub fn matches_any(text: &str, patterns: &[SearchPattern]) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(text))
}
