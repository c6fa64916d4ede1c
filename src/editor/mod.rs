//! Markdown toggle engine for the message editor
//!
//! Applies or removes markdown syntax around a text selection:
//! - Symmetric wrapping (bold, italic, strike, code)
//! - Per-line prefixes (heading, quote, bullet list)
//! - Ordered list numbering
//! - Links with the `url` placeholder selected afterwards
//!
//! Every toggle is a pure function of the text and the selection. Offsets at
//! the public boundary are UTF-16 code units, matching what text-input widgets
//! report.

pub mod selection;

mod inline;
mod lines;
mod link;

pub use selection::SelectionRange;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MarkdownError;
use inline::Emphasis;
use selection::{byte_offset, floor_char_boundary, utf16_offset};

/// The markdown toggles offered by the editor toolbar and hotkeys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownMode {
    Bold,
    Italic,
    Link,
    Strike,
    Code,
    Heading,
    Quote,
    Ul,
    Ol,
}

impl MarkdownMode {
    /// All supported modes
    pub const ALL: [MarkdownMode; 9] = [
        MarkdownMode::Bold,
        MarkdownMode::Italic,
        MarkdownMode::Link,
        MarkdownMode::Strike,
        MarkdownMode::Code,
        MarkdownMode::Heading,
        MarkdownMode::Quote,
        MarkdownMode::Ul,
        MarkdownMode::Ol,
    ];

    /// Name used in hotkey bindings and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkdownMode::Bold => "bold",
            MarkdownMode::Italic => "italic",
            MarkdownMode::Link => "link",
            MarkdownMode::Strike => "strike",
            MarkdownMode::Code => "code",
            MarkdownMode::Heading => "heading",
            MarkdownMode::Quote => "quote",
            MarkdownMode::Ul => "ul",
            MarkdownMode::Ol => "ol",
        }
    }
}

impl fmt::Display for MarkdownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkdownMode {
    type Err = MarkdownError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarkdownMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| MarkdownError::UnsupportedMode(s.to_string()))
    }
}

/// Input to [`apply_markdown`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMarkdownOptions {
    pub markdown_mode: MarkdownMode,
    pub selection_start: usize,
    pub selection_end: usize,
    pub value: String,
}

impl ApplyMarkdownOptions {
    pub fn new(markdown_mode: MarkdownMode, value: impl Into<String>, selection: SelectionRange) -> Self {
        Self {
            markdown_mode,
            selection_start: selection.start,
            selection_end: selection.end,
            value: value.into(),
        }
    }
}

/// New editor text and the selection to restore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMarkdownResult {
    pub message: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

/// Outcome of a single toggle, in byte offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Edit {
    pub message: String,
    pub start: usize,
    pub end: usize,
}

impl Edit {
    pub fn new(message: String, start: usize, end: usize) -> Self {
        Self {
            message,
            start,
            end,
        }
    }

    /// Clamp the selection into the message and convert it to UTF-16
    fn into_result(self) -> ApplyMarkdownResult {
        let start = floor_char_boundary(&self.message, self.start);
        let end = floor_char_boundary(&self.message, self.end).max(start);

        ApplyMarkdownResult {
            selection_start: utf16_offset(&self.message, start),
            selection_end: utf16_offset(&self.message, end),
            message: self.message,
        }
    }
}

/// Apply or remove markdown for the given mode.
///
/// Out-of-range or reversed selections are clamped and normalised rather
/// than rejected. The returned selection always satisfies
/// `0 <= selection_start <= selection_end <= message length`.
pub fn apply_markdown(options: &ApplyMarkdownOptions) -> ApplyMarkdownResult {
    let value = options.value.as_str();
    let range = SelectionRange::new(options.selection_start, options.selection_end).clamp_to(value);
    let start = byte_offset(value, range.start);
    let end = byte_offset(value, range.end);

    log::debug!(
        "Applying {} markdown to {}..{} ({} bytes)",
        options.markdown_mode,
        start,
        end,
        value.len()
    );

    let edit = match options.markdown_mode {
        MarkdownMode::Bold => inline::toggle_emphasis(value, start, end, Emphasis::Bold),
        MarkdownMode::Italic => inline::toggle_emphasis(value, start, end, Emphasis::Italic),
        MarkdownMode::Link => link::toggle_link(value, start, end),
        MarkdownMode::Strike => inline::toggle_wrap(value, start, end, inline::STRIKE_DELIMITER),
        MarkdownMode::Code => inline::toggle_wrap(value, start, end, inline::CODE_DELIMITER),
        MarkdownMode::Heading => {
            lines::toggle_line_prefix(value, start, end, lines::HEADING_DELIMITER)
        }
        MarkdownMode::Quote => lines::toggle_line_prefix(value, start, end, lines::QUOTE_DELIMITER),
        MarkdownMode::Ul => lines::toggle_line_prefix(value, start, end, lines::BULLET_DELIMITER),
        MarkdownMode::Ol => lines::toggle_ordered_list(value, start, end),
    };

    edit.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use selection::utf16_len;

    fn apply(mode: MarkdownMode, value: &str, start: usize, end: usize) -> ApplyMarkdownResult {
        apply_markdown(&ApplyMarkdownOptions::new(mode, value, SelectionRange::new(start, end)))
    }

    fn result(message: &str, start: usize, end: usize) -> ApplyMarkdownResult {
        ApplyMarkdownResult {
            message: message.to_string(),
            selection_start: start,
            selection_end: end,
        }
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("bold".parse::<MarkdownMode>(), Ok(MarkdownMode::Bold));
        assert_eq!("ol".parse::<MarkdownMode>(), Ok(MarkdownMode::Ol));
        assert_eq!(
            "underline".parse::<MarkdownMode>(),
            Err(MarkdownError::UnsupportedMode("underline".to_string()))
        );
        for mode in MarkdownMode::ALL {
            assert_eq!(mode.to_string().parse::<MarkdownMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_options_serde() {
        let json = r#"{"markdownMode":"heading","selectionStart":0,"selectionEnd":2,"value":"hi"}"#;
        let options: ApplyMarkdownOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.markdown_mode, MarkdownMode::Heading);
        assert_eq!(apply_markdown(&options), result("### hi", 4, 6));

        let out = serde_json::to_string(&result("x", 0, 1)).unwrap();
        assert_eq!(out, r#"{"message":"x","selectionStart":0,"selectionEnd":1}"#);
    }

    #[test]
    fn test_unknown_mode_rejected_by_serde() {
        let json = r#"{"markdownMode":"underline","selectionStart":0,"selectionEnd":0,"value":""}"#;
        assert!(serde_json::from_str::<ApplyMarkdownOptions>(json).is_err());
    }

    #[test]
    fn test_empty_link_template() {
        assert_eq!(apply(MarkdownMode::Link, "", 0, 0), result("[](url)", 1, 1));
    }

    #[test]
    fn test_bold_then_italic() {
        let bold = apply(MarkdownMode::Bold, "text", 0, 4);
        assert_eq!(bold, result("**text**", 2, 6));

        let both = apply(MarkdownMode::Italic, &bold.message, bold.selection_start, bold.selection_end);
        assert_eq!(both, result("***text***", 3, 7));

        let bold_again = apply(MarkdownMode::Italic, &both.message, both.selection_start, both.selection_end);
        assert_eq!(bold_again, result("**text**", 2, 6));
    }

    #[test]
    fn test_ordered_list_round_trip() {
        let numbered = apply(MarkdownMode::Ol, "a\nb\nc", 0, 5);
        assert_eq!(numbered.message, "1. a\n2. b\n3. c");

        let plain = apply(MarkdownMode::Ol, &numbered.message, numbered.selection_start, numbered.selection_end);
        assert_eq!(plain.message, "a\nb\nc");
    }

    #[test]
    fn test_line_prefix_symmetry() {
        let text = "first line\nsecond\nthird one";
        for mode in [MarkdownMode::Heading, MarkdownMode::Quote, MarkdownMode::Ul, MarkdownMode::Ol] {
            for (start, end) in [(0, text.len()), (3, 14), (12, 12), (11, 25)] {
                let once = apply(mode, text, start, end);
                let twice = apply(mode, &once.message, once.selection_start, once.selection_end);
                assert_eq!(twice.message, text, "{} on {}..{}", mode, start, end);
                assert_eq!((twice.selection_start, twice.selection_end), (start, end));
            }
        }
    }

    #[test]
    fn test_symmetric_double_toggle() {
        let text = "some words here";
        for mode in [
            MarkdownMode::Bold,
            MarkdownMode::Italic,
            MarkdownMode::Strike,
            MarkdownMode::Code,
        ] {
            for start in 0..=text.len() {
                for end in start..=text.len() {
                    let once = apply(mode, text, start, end);
                    let twice = apply(mode, &once.message, once.selection_start, once.selection_end);
                    assert_eq!(twice, result(text, start, end), "{} on {}..{}", mode, start, end);
                }
            }
        }
    }

    #[test]
    fn test_offsets_stay_in_bounds() {
        let texts = [
            "",
            "a",
            "word",
            "two words",
            "a\nb\nc",
            "**bold** and *it*",
            "1. x\n2. y",
            "> q\n> r\n",
            "[a](url) b",
            "é 😀 ü\n- z",
        ];
        for text in texts {
            let len = utf16_len(text);
            for mode in MarkdownMode::ALL {
                for start in 0..=len + 1 {
                    for end in 0..=len + 1 {
                        let out = apply(mode, text, start, end);
                        assert!(out.selection_start <= out.selection_end, "{} on {:?}", mode, text);
                        assert!(
                            out.selection_end <= utf16_len(&out.message),
                            "{} on {:?} {}..{}",
                            mode,
                            text,
                            start,
                            end
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_utf16_offsets() {
        // '😀' is two UTF-16 units
        let out = apply(MarkdownMode::Bold, "😀 hi", 3, 5);
        assert_eq!(out, result("😀 **hi**", 5, 7));
    }

    #[test]
    fn test_reversed_and_oversized_selection() {
        assert_eq!(apply(MarkdownMode::Strike, "abc", 3, 1), result("a~~bc~~", 3, 5));
        assert_eq!(apply(MarkdownMode::Strike, "abc", 1, 40), result("a~~bc~~", 3, 5));
    }
}
