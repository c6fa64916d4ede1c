//! Plain text renderer for previews and notifications
//!
//! Every block keeps only its first line, so the result is a short
//! single-line approximation of the message. Headings and list items keep a
//! trailing newline. Output is still entity-escaped.

use super::renderer::{ListItemInfo, Renderer, TableCellFlags};
use crate::utils::{escape_html, first_line};

/// Renderer that removes markdown syntax
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveMarkdown;

impl Renderer for RemoveMarkdown {
    fn code(&self, code: &str, _language: Option<&str>) -> String {
        first_line(&escape_html(code)).to_string()
    }

    fn blockquote(&self, quote: String) -> String {
        first_line(&quote).to_string()
    }

    fn heading(&self, text: String, _level: u8) -> String {
        text + "\n"
    }

    fn hr(&self) -> String {
        String::new()
    }

    fn list(&self, body: String, _ordered: bool, _start: u64) -> String {
        first_line(&body).to_string()
    }

    fn listitem(&self, text: String, _item: ListItemInfo) -> String {
        text + "\n"
    }

    fn paragraph(&self, text: String) -> String {
        first_line(&text).to_string()
    }

    fn table(&self, header: String, _body: String) -> String {
        first_line(&header).to_string()
    }

    fn tablerow(&self, content: String) -> String {
        format!("{}\n", content.trim_end())
    }

    fn tablecell(&self, content: String, _flags: TableCellFlags) -> String {
        content + " "
    }

    fn strong(&self, text: String) -> String {
        text
    }

    fn em(&self, text: String) -> String {
        text
    }

    fn codespan(&self, code: &str) -> String {
        code.to_string()
    }

    fn br(&self) -> String {
        "\n".to_string()
    }

    fn del(&self, text: String) -> String {
        text
    }

    fn link(&self, _href: &str, _title: Option<&str>, text: String, _is_url: bool) -> String {
        text
    }

    fn image(&self, _href: &str, _title: Option<&str>, text: &str) -> String {
        text.to_string()
    }

    fn text(&self, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::renderer::render;

    fn strip(text: &str) -> String {
        render(text, &RemoveMarkdown).unwrap()
    }

    #[test]
    fn test_first_line_of_paragraph() {
        assert_eq!(strip("**bold** and *em*\nsecond line"), "bold and em");
    }

    #[test]
    fn test_heading_and_list_keep_newline() {
        assert_eq!(strip("# Title\n\n- a\n- b"), "Title\na");
    }

    #[test]
    fn test_code() {
        assert_eq!(strip("```rust\nx < y\nz\n```"), "x &lt; y");
        assert_eq!(strip("use `a < b` here"), "use a &lt; b here");
    }

    #[test]
    fn test_links_and_images_keep_text() {
        assert_eq!(strip("[x](http://a.com) ![alt](a.png)"), "x alt");
        assert_eq!(strip("see https://a.com/x"), "see https://a.com/x");
    }

    #[test]
    fn test_table_header_only() {
        assert_eq!(strip("| a | b |\n|-|-|\n| 1 | 2 |"), "a b");
    }

    #[test]
    fn test_quote_and_rule() {
        assert_eq!(strip("> one\n> two"), "one");
        assert_eq!(strip("---"), "");
    }
}
