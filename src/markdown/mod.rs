//! Markdown module for Chat Markdown
//!
//! Renders message markdown through a pluggable [`Renderer`]:
//! - [`HtmlRenderer`] for the message view
//! - [`RemoveMarkdown`] for one-line previews
//! - [`MentionableRenderer`] for mention scanning

pub mod html;
pub mod links;
pub mod mentionable;
pub mod plain;
pub mod renderer;
pub mod syntax;

pub use html::HtmlRenderer;
pub use mentionable::MentionableRenderer;
pub use plain::RemoveMarkdown;
pub use renderer::{render, CellAlign, ListItemInfo, Renderer, TableCellFlags, MAX_NESTING_DEPTH};

use crate::config::RenderOptions;
use crate::utils::decode_html_entities;

/// Shown in place of a message the renderer refused
pub const TOO_DEEPLY_NESTED: &str = "Post too deeply nested.";

/// Render a message to HTML for the message view
pub fn format(text: &str, options: &RenderOptions) -> String {
    format_with_renderer(text, &HtmlRenderer::new(options))
}

/// Render a message with any renderer, trimming trailing whitespace
pub fn format_with_renderer(text: &str, renderer: &dyn Renderer) -> String {
    match render(text, renderer) {
        Ok(output) => output.trim_end().to_string(),
        Err(err) => {
            log::warn!("Failed to render message: {}", err);
            TOO_DEEPLY_NESTED.to_string()
        }
    }
}

/// Plain text preview of a message: the first line, markdown removed and
/// entities decoded
pub fn strip_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    decode_html_entities(&format_with_renderer(text, &RemoveMarkdown))
}
