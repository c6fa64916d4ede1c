//! Selection ranges and string-offset helpers
//!
//! Editor widgets report selections in UTF-16 code units, while Rust strings
//! are indexed by bytes. The toggle functions work on byte offsets; this module
//! converts at the boundary and provides the prefix/selection/suffix and
//! line-span splits the toggles are written against.

use crate::error::{MarkdownError, MarkdownResult};
use serde::{Deserialize, Serialize};

/// A selection inside the editor text, measured in UTF-16 code units.
///
/// `start == end` denotes a caret with nothing selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    /// Create a range, swapping the bounds if they are reversed
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// Create a range, rejecting bounds that are reversed or exceed the text
    pub fn checked(text: &str, start: usize, end: usize) -> MarkdownResult<Self> {
        let len = utf16_len(text);
        if start > end || end > len {
            return Err(MarkdownError::InvalidSelection { start, end, len });
        }
        Ok(Self { start, end })
    }

    /// Clamp both bounds into `[0, utf16_len(text)]`
    pub fn clamp_to(self, text: &str) -> Self {
        let len = utf16_len(text);
        Self::new(self.start.min(len), self.end.min(len))
    }
}

/// Length of a string in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Convert a UTF-16 offset into a byte offset.
///
/// Offsets past the end clamp to `text.len()`; an offset that falls between
/// the two halves of a surrogate pair rounds down to the start of that character.
pub fn byte_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        let next = units + ch.len_utf16();
        if next > utf16_offset {
            return idx;
        }
        units = next;
    }
    text.len()
}

/// Convert a byte offset into a UTF-16 offset, clamping to the text
pub fn utf16_offset(text: &str, byte_offset: usize) -> usize {
    let idx = floor_char_boundary(text, byte_offset);
    utf16_len(&text[..idx])
}

/// Largest char boundary that is `<= idx`, clamped to the text length
pub(crate) fn floor_char_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// The text around a selection: `<prefix><selection><suffix>`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Split<'a> {
    pub prefix: &'a str,
    pub selection: &'a str,
    pub suffix: &'a str,
}

impl<'a> Split<'a> {
    /// Split at byte offsets that are already on char boundaries
    pub fn new(value: &'a str, start: usize, end: usize) -> Self {
        Self {
            prefix: &value[..start],
            selection: &value[start..end],
            suffix: &value[end..],
        }
    }

    /// Whether the selection sits directly between `before` and `after`
    pub fn is_wrapped_by(&self, before: &str, after: &str) -> bool {
        self.prefix.ends_with(before) && self.suffix.starts_with(after)
    }
}

/// The complete lines touched by a selection.
///
/// `head + lines + tail` always reassembles the original value. `lines` begins
/// at the newline that precedes the first touched line (so it starts with
/// `'\n'`) unless the selection begins on the first line of the document, and
/// runs to the end of the line holding the selection end. Only the remainder
/// of that last line is pulled in; following lines stay in `tail`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineSpan<'a> {
    pub head: &'a str,
    pub lines: &'a str,
    pub tail: &'a str,
}

impl<'a> LineSpan<'a> {
    pub fn new(value: &'a str, start: usize, end: usize) -> Self {
        let line_start = value[..start].rfind('\n').unwrap_or(0);
        let line_end = value[end..]
            .find('\n')
            .map(|idx| end + idx)
            .unwrap_or(value.len());

        Self {
            head: &value[..line_start],
            lines: &value[line_start..line_end],
            tail: &value[line_end..],
        }
    }

    /// True when the span begins on the document's first line
    pub fn is_first_line_selected(&self) -> bool {
        !self.lines.starts_with('\n')
    }

    /// Number of newlines inside the span
    pub fn newline_count(&self) -> usize {
        self.lines.matches('\n').count()
    }
}

/// End of the space-delimited word that contains or follows `start`
pub(crate) fn find_word_end(text: &str, start: usize) -> usize {
    text[start..]
        .find(' ')
        .map(|idx| start + idx)
        .unwrap_or(text.len())
}

/// Start of the space-delimited word that contains or precedes `start`
pub(crate) fn find_word_start(text: &str, start: usize) -> usize {
    text[..start].rfind(' ').map(|idx| idx + 1).unwrap_or(0)
}
