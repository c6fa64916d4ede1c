//! Line-prefix toggles
//!
//! Heading, quote and bullet list put a fixed prefix at the start of every
//! line the selection touches. Ordered lists do the same with a running
//! `N. ` counter.

use std::sync::OnceLock;

use regex::Regex;

use super::selection::LineSpan;
use super::Edit;

pub(crate) const HEADING_DELIMITER: &str = "### ";
pub(crate) const QUOTE_DELIMITER: &str = "> ";
pub(crate) const BULLET_DELIMITER: &str = "- ";

fn leading_number_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\. ").expect("valid ordered marker regex"))
}

fn line_number_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\d+\. ").expect("valid ordered marker regex"))
}

/// Toggle a fixed prefix on every touched line
pub(crate) fn toggle_line_prefix(value: &str, start: usize, end: usize, delimiter: &str) -> Edit {
    let span = LineSpan::new(value, start, end);
    let is_first_line = span.is_first_line_selected();
    let newline_prefix = format!("\n{}", delimiter);

    let prefixed_lines = span.lines.matches(newline_prefix.as_str()).count();
    let has_markdown = prefixed_lines == span.newline_count()
        && (!is_first_line || span.lines.starts_with(delimiter));

    if has_markdown {
        let body = if is_first_line {
            &span.lines[delimiter.len()..]
        } else {
            span.lines
        };
        let count = usize::from(is_first_line) + body.matches('\n').count();
        let message = [span.head, &body.replace(newline_prefix.as_str(), "\n"), span.tail].concat();

        log::debug!("Removing {:?} from {} line(s)", delimiter, count);
        Edit::new(
            message,
            start.saturating_sub(delimiter.len()),
            end.saturating_sub(delimiter.len() * count),
        )
    } else {
        let count = usize::from(is_first_line) + span.newline_count();
        let first = if is_first_line { delimiter } else { "" };
        let message = [
            span.head,
            first,
            &span.lines.replace('\n', newline_prefix.as_str()),
            span.tail,
        ]
        .concat();

        log::debug!("Adding {:?} to {} line(s)", delimiter, count);
        Edit::new(
            message,
            start + delimiter.len(),
            end + delimiter.len() * count,
        )
    }
}

/// Marker for the `n`th item of a generated ordered list
fn ordered_marker(n: usize) -> String {
    format!("{}. ", n)
}

/// Toggle `1. `, `2. `, ... numbering on every touched line.
///
/// Existing numbers are recognised regardless of their value. Offsets are
/// shifted by the real length of each marker, so lists past nine items keep
/// the selection where the user left it.
pub(crate) fn toggle_ordered_list(value: &str, start: usize, end: usize) -> Edit {
    let span = LineSpan::new(value, start, end);
    let is_first_line = span.is_first_line_selected();

    let leading = leading_number_marker().find(span.lines);
    let has_markdown = line_number_marker().find_iter(span.lines).count() == span.newline_count()
        && (!is_first_line || leading.is_some());

    if has_markdown {
        let body = match leading {
            Some(marker) if is_first_line => &span.lines[marker.end()..],
            _ => span.lines,
        };
        let stripped = line_number_marker().replace_all(body, "\n");

        let first_marker_len = if is_first_line {
            leading.map(|m| m.len()).unwrap_or(0)
        } else {
            // the first match includes its leading newline
            line_number_marker()
                .find(body)
                .map(|m| m.len() - 1)
                .unwrap_or(0)
        };
        let removed = span.lines.len() - stripped.len();
        let message = [span.head, &stripped, span.tail].concat();

        log::debug!("Removing ordered list numbering ({} bytes)", removed);
        Edit::new(
            message,
            start.saturating_sub(first_marker_len),
            end.saturating_sub(removed),
        )
    } else {
        let (numbered, _) = span.lines.split('\n').enumerate().fold(
            (String::with_capacity(span.lines.len() * 2), 1usize),
            |(mut acc, counter), (idx, line)| {
                if idx > 0 {
                    acc.push('\n');
                }
                if idx == 0 && !is_first_line {
                    acc.push_str(line);
                    return (acc, counter);
                }
                acc.push_str(&ordered_marker(counter));
                acc.push_str(line);
                (acc, counter + 1)
            },
        );

        let added = numbered.len() - span.lines.len();
        let message = [span.head, &numbered, span.tail].concat();

        log::debug!("Adding ordered list numbering ({} bytes)", added);
        Edit::new(message, start + ordered_marker(1).len(), end + added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(value: &str, start: usize, end: usize, delimiter: &str) -> (String, usize, usize) {
        let edit = toggle_line_prefix(value, start, end, delimiter);
        (edit.message, edit.start, edit.end)
    }

    fn apply_ol(value: &str, start: usize, end: usize) -> (String, usize, usize) {
        let edit = toggle_ordered_list(value, start, end);
        (edit.message, edit.start, edit.end)
    }

    #[test]
    fn test_heading_single_line() {
        assert_eq!(apply("title", 0, 5, HEADING_DELIMITER), ("### title".to_string(), 4, 9));
        assert_eq!(apply("### title", 4, 9, HEADING_DELIMITER), ("title".to_string(), 0, 5));
    }

    #[test]
    fn test_quote_caret_mid_line() {
        assert_eq!(apply("some text", 4, 4, QUOTE_DELIMITER), ("> some text".to_string(), 6, 6));
    }

    #[test]
    fn test_bullets_multiline() {
        let (message, start, end) = apply("a\nb\nc", 0, 5, BULLET_DELIMITER);
        assert_eq!(message, "- a\n- b\n- c");
        assert_eq!((start, end), (2, 11));

        let (message, start, end) = apply(&message, start, end, BULLET_DELIMITER);
        assert_eq!(message, "a\nb\nc");
        assert_eq!((start, end), (0, 5));
    }

    #[test]
    fn test_prefix_on_later_line_only() {
        let (message, start, end) = apply("x\ny\nz", 2, 3, QUOTE_DELIMITER);
        assert_eq!(message, "x\n> y\nz");
        assert_eq!((start, end), (4, 5));

        let (message, start, end) = apply(&message, start, end, QUOTE_DELIMITER);
        assert_eq!(message, "x\ny\nz");
        assert_eq!((start, end), (2, 3));
    }

    #[test]
    fn test_partial_markdown_is_added_not_removed() {
        let (message, _, _) = apply("- a\nb", 0, 5, BULLET_DELIMITER);
        assert_eq!(message, "- - a\n- b");
    }

    #[test]
    fn test_remove_clamps_at_zero() {
        let (message, start, end) = apply("> a", 1, 1, QUOTE_DELIMITER);
        assert_eq!(message, "a");
        assert_eq!((start, end), (0, 0));
    }

    #[test]
    fn test_ordered_list_numbering() {
        let (message, start, end) = apply_ol("a\nb\nc", 0, 5);
        assert_eq!(message, "1. a\n2. b\n3. c");
        assert_eq!((start, end), (3, 14));

        let (message, start, end) = apply_ol(&message, start, end);
        assert_eq!(message, "a\nb\nc");
        assert_eq!((start, end), (0, 5));
    }

    #[test]
    fn test_ordered_list_ignores_existing_values() {
        let (message, _, _) = apply_ol("7. a\n3. b", 0, 9);
        assert_eq!(message, "a\nb");
    }

    #[test]
    fn test_ordered_list_on_later_lines() {
        let (message, start, end) = apply_ol("intro\nx\ny", 6, 9);
        assert_eq!(message, "intro\n1. x\n2. y");
        assert_eq!((start, end), (9, 15));
    }

    #[test]
    fn test_ordered_list_past_nine_items() {
        let value = (0..12).map(|i| format!("i{}", i)).collect::<Vec<_>>().join("\n");
        let (numbered, start, end) = apply_ol(&value, 0, value.len());
        assert!(numbered.ends_with("\n12. i11"));
        assert_eq!(start, 3);
        assert_eq!(end, numbered.len());

        let (message, start, end) = apply_ol(&numbered, start, end);
        assert_eq!(message, value);
        assert_eq!((start, end), (0, value.len()));
    }
}
