//! Search query parsing
//!
//! Splits a raw search box query into the terms that should be highlighted
//! in rendered messages.

use std::sync::OnceLock;

use regex::Regex;

const SEARCH_FLAGS: [&str; 6] = ["in", "from", "channel", "on", "before", "after"];

fn quoted_phrase() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^"([^"]*)""#).expect("invalid phrase regex"))
}

fn search_flag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?(?:in|from|channel|on|before|after): ?\S+").expect("invalid flag regex")
    })
}

fn at_mention() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^@[a-z0-9._-]+\b").expect("invalid mention regex"))
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Whether a search flag such as `in:` or `-from:` begins at byte `idx`
fn flag_starts_at(text: &str, idx: usize) -> bool {
    let rest = text[idx..].strip_prefix('-').unwrap_or(&text[idx..]);
    let preceded_by_word = text[..idx].chars().next_back().map_or(false, is_word_char);

    !preceded_by_word
        && SEARCH_FLAGS
            .iter()
            .any(|flag| rest.strip_prefix(flag).map_or(false, |r| r.starts_with(':')))
}

/// Length of the plain run at the start of `text`: everything up to the next
/// quote or search flag, always at least one character
fn plain_run_len(text: &str) -> usize {
    text.char_indices()
        .skip(1)
        .map(|(idx, _)| idx)
        .find(|&idx| text[idx..].starts_with('"') || flag_starts_at(text, idx))
        .unwrap_or(text.len())
}

/// Parse a search query into highlightable terms.
///
/// - `"quoted phrases"` are kept whole
/// - search flags (`in:`, `from:`, `channel:`, `on:`, `before:`, `after:`,
///   optionally negated with `-`) are dropped
/// - a leading `@mention` keeps its `@`
/// - everything else is split on ` <>+()~@`
pub fn parse_search_terms(search_term: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut rest = search_term;

    while !rest.is_empty() {
        if let Some(caps) = quoted_phrase().captures(rest) {
            let phrase = &caps[1];
            if !phrase.is_empty() {
                terms.push(phrase.to_string());
            }
            rest = &rest[caps[0].len()..];
            continue;
        }

        if let Some(flag) = search_flag().find(rest) {
            log::trace!("Skipping search flag {:?}", flag.as_str());
            rest = &rest[flag.end()..];
            continue;
        }

        if let Some(mention) = at_mention().find(rest) {
            terms.push(mention.as_str().to_string());
            rest = &rest[mention.end()..];
            continue;
        }

        let run_len = plain_run_len(rest);
        terms.extend(
            rest[..run_len]
                .split(|ch| matches!(ch, ' ' | '<' | '>' | '+' | '(' | ')' | '~' | '@'))
                .filter(|term| !term.is_empty())
                .map(str::to_string),
        );
        rest = &rest[run_len..];
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(parse_search_terms("hello world"), vec!["hello", "world"]);
        assert!(parse_search_terms("").is_empty());
        assert!(parse_search_terms("   ").is_empty());
    }

    #[test]
    fn test_quoted_phrase() {
        assert_eq!(
            parse_search_terms(r#""exact phrase" other"#),
            vec!["exact phrase", "other"]
        );
        assert_eq!(parse_search_terms(r#""" word"#), vec!["word"]);
    }

    #[test]
    fn test_flags_are_dropped() {
        assert_eq!(
            parse_search_terms("deploy in:town-square from:alice -channel:off-topic after:2020-01-01"),
            vec!["deploy"]
        );
        assert_eq!(parse_search_terms("on: 2021-03-04 release"), vec!["release"]);
    }

    #[test]
    fn test_flag_needs_word_boundary() {
        assert_eq!(parse_search_terms("login:failed"), vec!["login:failed"]);
    }

    #[test]
    fn test_mentions() {
        assert_eq!(parse_search_terms("@alice.smith"), vec!["@alice.smith"]);
        assert_eq!(parse_search_terms("ping @bob"), vec!["ping", "bob"]);
    }

    #[test]
    fn test_split_characters() {
        assert_eq!(parse_search_terms("a+b (c) <d> e~f"), vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_wildcard_kept() {
        assert_eq!(parse_search_terms("deplo*"), vec!["deplo*"]);
    }
}
