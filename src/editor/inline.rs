//! Symmetric wrap/unwrap toggles
//!
//! Strike, code, bold and italic all put the same delimiter on both sides of
//! the selection. If the delimiter is already there it is removed instead.

use super::selection::Split;
use super::Edit;

pub(crate) const BOLD_DELIMITER: &str = "**";
pub(crate) const ITALIC_DELIMITER: &str = "*";
pub(crate) const STRIKE_DELIMITER: &str = "~~";
pub(crate) const CODE_DELIMITER: &str = "```";

/// Emphasis flavour for [`toggle_emphasis`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    fn delimiter(self) -> &'static str {
        match self {
            Emphasis::Bold => BOLD_DELIMITER,
            Emphasis::Italic => ITALIC_DELIMITER,
        }
    }
}

/// Wrap the selection in `delimiter`, or unwrap it when already wrapped
pub(crate) fn toggle_wrap(value: &str, start: usize, end: usize, delimiter: &str) -> Edit {
    let split = Split::new(value, start, end);

    if split.is_wrapped_by(delimiter, delimiter) {
        unwrap(split, start, end, delimiter)
    } else {
        wrap(split, start, end, delimiter)
    }
}

/// Bold/italic toggle.
///
/// Italic on `**text**` adds a layer (`***text***`) rather than eating one
/// star of the bold markers, and either mode on `***text***` removes only its
/// own layer.
pub(crate) fn toggle_emphasis(value: &str, start: usize, end: usize, emphasis: Emphasis) -> Edit {
    let split = Split::new(value, start, end);
    let delimiter = emphasis.delimiter();

    let italic_over_bold =
        emphasis == Emphasis::Italic && split.is_wrapped_by(BOLD_DELIMITER, BOLD_DELIMITER);
    let has_current = split.is_wrapped_by(delimiter, delimiter);

    let combined = format!("{}{}", BOLD_DELIMITER, ITALIC_DELIMITER);
    let has_bold_and_italic = split.is_wrapped_by(&combined, &combined);

    if has_bold_and_italic || (has_current && !italic_over_bold) {
        log::debug!("Removing {:?} markers around selection", emphasis);
        unwrap(split, start, end, delimiter)
    } else {
        log::debug!("Adding {:?} markers around selection", emphasis);
        wrap(split, start, end, delimiter)
    }
}

fn wrap(split: Split<'_>, start: usize, end: usize, delimiter: &str) -> Edit {
    let message = [
        split.prefix,
        delimiter,
        split.selection,
        delimiter,
        split.suffix,
    ]
    .concat();

    Edit::new(message, start + delimiter.len(), end + delimiter.len())
}

fn unwrap(split: Split<'_>, start: usize, end: usize, delimiter: &str) -> Edit {
    let message = [
        &split.prefix[..split.prefix.len() - delimiter.len()],
        split.selection,
        &split.suffix[delimiter.len()..],
    ]
    .concat();

    Edit::new(
        message,
        start.saturating_sub(delimiter.len()),
        end.saturating_sub(delimiter.len()),
    )
}
