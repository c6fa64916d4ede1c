//! Chat Markdown
//!
//! Markdown support for a team-messaging client:
//! - [`editor`]: toggles markdown syntax around the editor selection
//! - [`markdown`]: renders messages to sanitised HTML, previews and
//!   mentionable text
//! - [`search`]: highlights search terms inside rendered messages

pub mod config;
pub mod editor;
pub mod error;
pub mod markdown;
pub mod search;
pub mod utils;

pub use config::{Config, RenderOptions};
pub use editor::{apply_markdown, ApplyMarkdownOptions, ApplyMarkdownResult, MarkdownMode, SelectionRange};
pub use error::{AppError, AppResult};
pub use markdown::{format, format_with_renderer, strip_markdown, Renderer};
