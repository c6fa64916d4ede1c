//! Link toggle
//!
//! Produces `[text](url)`. After linking, the `url` placeholder is left
//! selected so the user can type the destination straight away.

use super::selection::{find_word_end, find_word_start, Split};
use super::Edit;

const LINK_START: &str = "[";
const LINK_END: &str = "](url)";

/// Distance from the end of the link text to the start of `url`, which is
/// also the length of the placeholder itself
const URL_SHIFT: usize = LINK_START.len() + 2;

/// Where a caret sits relative to the surrounding word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaretPlacement {
    BeforeWord,
    AfterWord,
    EndOfText,
    InsideWord,
}

fn caret_placement(value: &str, split: &Split<'_>, offset: usize) -> CaretPlacement {
    let space_before = split.prefix.ends_with(' ');
    let space_after = split.suffix.starts_with(' ');

    let before_word =
        (offset != 0 && space_before && !space_after) || (offset == 0 && !space_after);
    let after_word = (offset != value.len() && space_after && !space_before)
        || (offset == value.len() && !space_before);

    if before_word {
        CaretPlacement::BeforeWord
    } else if after_word && offset == value.len() {
        CaretPlacement::EndOfText
    } else if after_word {
        CaretPlacement::AfterWord
    } else {
        CaretPlacement::InsideWord
    }
}

/// Toggle link markdown around the selection or the word at the caret
pub(crate) fn toggle_link(value: &str, start: usize, end: usize) -> Edit {
    let split = Split::new(value, start, end);

    if split.is_wrapped_by(LINK_START, LINK_END) {
        log::debug!("Removing link markdown");
        let message = [
            &split.prefix[..split.prefix.len() - LINK_START.len()],
            split.selection,
            &split.suffix[LINK_END.len()..],
        ]
        .concat();
        return Edit::new(
            message,
            start.saturating_sub(LINK_START.len()),
            end.saturating_sub(LINK_START.len()),
        );
    }

    if value.is_empty() {
        log::debug!("Inserting empty link template");
        return Edit::new(
            [LINK_START, LINK_END].concat(),
            LINK_START.len(),
            LINK_START.len(),
        );
    }

    if start < end {
        log::debug!("Linking selected text");
        let message = [split.prefix, LINK_START, split.selection, LINK_END, split.suffix].concat();
        let url_start = end + URL_SHIFT;
        return Edit::new(message, url_start, url_start + URL_SHIFT);
    }

    let placement = caret_placement(value, &split, start);
    log::debug!("Linking word at caret ({:?})", placement);

    match placement {
        CaretPlacement::BeforeWord => {
            let word_end = find_word_end(value, start);
            let word = &value[start..word_end];
            let message = [split.prefix, LINK_START, word, LINK_END, &value[word_end..]].concat();
            let url_start = start + word.len() + URL_SHIFT;
            Edit::new(message, url_start, url_start + URL_SHIFT)
        }
        CaretPlacement::EndOfText => {
            let message = [value, " ", LINK_START, LINK_END].concat();
            let caret = end + 1 + LINK_START.len();
            Edit::new(message, caret, caret)
        }
        CaretPlacement::AfterWord => {
            let word_start = find_word_start(value, start);
            let message = [
                &value[..word_start],
                LINK_START,
                &value[word_start..start],
                LINK_END,
                split.suffix,
            ]
            .concat();
            let url_start = start + URL_SHIFT;
            Edit::new(message, url_start, url_start + URL_SHIFT)
        }
        CaretPlacement::InsideWord => {
            let word_start = find_word_start(value, start);
            let word_end = find_word_end(value, start);
            let message = [
                &value[..word_start],
                LINK_START,
                &value[word_start..word_end],
                LINK_END,
                &value[word_end..],
            ]
            .concat();
            let url_start = word_end + URL_SHIFT;
            Edit::new(message, url_start, url_start + URL_SHIFT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(value: &str, start: usize, end: usize) -> (String, usize, usize) {
        let edit = toggle_link(value, start, end);
        (edit.message, edit.start, edit.end)
    }

    fn selected<'a>(message: &'a str, start: usize, end: usize) -> &'a str {
        &message[start..end]
    }

    #[test]
    fn test_empty_template() {
        assert_eq!(apply("", 0, 0), ("[](url)".to_string(), 1, 1));
    }

    #[test]
    fn test_selection_selects_url_placeholder() {
        let (message, start, end) = apply("see docs now", 4, 8);
        assert_eq!(message, "see [docs](url) now");
        assert_eq!(selected(&message, start, end), "url");
    }

    #[test]
    fn test_unwrap() {
        let (message, start, end) = apply("see [docs](url) now", 5, 9);
        assert_eq!(message, "see docs now");
        assert_eq!((start, end), (4, 8));
    }

    #[test]
    fn test_caret_before_word() {
        let (message, start, end) = apply("go home", 3, 3);
        assert_eq!(message, "go [home](url)");
        assert_eq!(selected(&message, start, end), "url");

        let (message, start, end) = apply("home run", 0, 0);
        assert_eq!(message, "[home](url) run");
        assert_eq!(selected(&message, start, end), "url");
    }

    #[test]
    fn test_caret_before_leading_space() {
        let (message, start, end) = apply(" lead", 0, 0);
        assert_eq!(message, "[](url) lead");
        assert_eq!(selected(&message, start, end), "url");
    }

    #[test]
    fn test_caret_after_word() {
        let (message, start, end) = apply("go home", 2, 2);
        assert_eq!(message, "[go](url) home");
        assert_eq!(selected(&message, start, end), "url");
    }

    #[test]
    fn test_caret_at_end_of_text() {
        let (message, start, end) = apply("hello", 5, 5);
        assert_eq!(message, "hello [](url)");
        assert_eq!((start, end), (7, 7));
    }

    #[test]
    fn test_caret_inside_word() {
        let (message, start, end) = apply("a hello b", 4, 4);
        assert_eq!(message, "a [hello](url) b");
        assert_eq!(selected(&message, start, end), "url");
    }

    #[test]
    fn test_caret_inside_word_keeps_punctuation() {
        let (message, _, _) = apply("see word, then", 6, 6);
        assert_eq!(message, "see [word,](url) then");
    }
}
