//! Utilities module for Chat Markdown
//!
//! Shared text helpers used by the renderers:
//! - HTML escaping and entity decoding
//! - Line helpers for previews and single-line output

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Escape text for use in HTML text nodes and quoted attributes
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|(amp|lt|gt|quot|apos));")
            .expect("invalid entity regex")
    })
}

/// Decode the HTML entities produced by [`escape_html`] plus numeric entities.
///
/// Decoding is a single pass, so `&amp;lt;` becomes `&lt;` and not `<`.
/// Unknown or invalid entities are left as written.
pub fn decode_html_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    entity_regex()
        .replace_all(text, |caps: &Captures<'_>| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                match caps.get(3).map(|m| m.as_str()) {
                    Some("amp") => Some('&'),
                    Some("lt") => Some('<'),
                    Some("gt") => Some('>'),
                    Some("quot") => Some('"'),
                    Some("apos") => Some('\''),
                    _ => None,
                }
            };

            match decoded {
                Some(ch) => ch.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Text before the first newline
pub fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or(text)
}

/// Replace every newline with a space
pub fn replace_newlines(text: &str) -> String {
    text.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_decode_named_entities() {
        assert_eq!(
            decode_html_entities("&lt;b&gt; &amp; &quot;q&quot; &#39;s&#039; &apos;"),
            "<b> & \"q\" 's' '"
        );
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_html_entities("&#233;&#x1F600;&#X41;"), "é😀A");
    }

    #[test]
    fn test_decode_is_single_pass() {
        assert_eq!(decode_html_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_html_entities("&bogus; & &#xZZ;"), "&bogus; & &#xZZ;");
    }

    #[test]
    fn test_decode_inverts_escape() {
        let text = "if a < b && c > \"d\" then 'e'";
        assert_eq!(decode_html_entities(&escape_html(text)), text);
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("one\ntwo"), "one");
        assert_eq!(first_line("single"), "single");
        assert_eq!(first_line(""), "");
        assert_eq!(first_line("\nrest"), "");
    }

    #[test]
    fn test_replace_newlines() {
        assert_eq!(replace_newlines("a\nb\n"), "a b ");
    }
}
