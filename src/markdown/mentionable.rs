//! Renderer keeping only text that may contain @mentions
//!
//! Code, links and images are replaced by a single space so mention
//! scanning never matches inside a URL or a code sample.

use super::renderer::{ListItemInfo, Renderer, TableCellFlags};

#[derive(Debug, Clone, Copy, Default)]
pub struct MentionableRenderer;

impl Renderer for MentionableRenderer {
    fn code(&self, _code: &str, _language: Option<&str>) -> String {
        " ".to_string()
    }

    fn blockquote(&self, quote: String) -> String {
        quote + "\n"
    }

    fn heading(&self, text: String, _level: u8) -> String {
        text + "\n"
    }

    fn hr(&self) -> String {
        "\n".to_string()
    }

    fn list(&self, body: String, _ordered: bool, _start: u64) -> String {
        body
    }

    fn listitem(&self, text: String, _item: ListItemInfo) -> String {
        text + "\n"
    }

    fn paragraph(&self, text: String) -> String {
        text + "\n"
    }

    fn table(&self, header: String, body: String) -> String {
        header + &body
    }

    fn tablerow(&self, content: String) -> String {
        content + "\n"
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

    fn codespan(&self, _code: &str) -> String {
        " ".to_string()
    }

    fn br(&self) -> String {
        "\n".to_string()
    }

    fn del(&self, text: String) -> String {
        text
    }

    fn link(&self, _href: &str, _title: Option<&str>, _text: String, _is_url: bool) -> String {
        " ".to_string()
    }

    fn image(&self, _href: &str, _title: Option<&str>, _text: &str) -> String {
        " ".to_string()
    }

    fn text(&self, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::renderer::render;

    fn mentionable(text: &str) -> String {
        render(text, &MentionableRenderer).unwrap()
    }

    #[test]
    fn test_keeps_text() {
        assert_eq!(mentionable("hi **@bob**\nand @alice"), "hi @bob\nand @alice\n");
        assert_eq!(mentionable("# @here\n\n- @one\n- @two"), "@here\n@one\n@two\n");
    }

    #[test]
    fn test_drops_code_links_and_images() {
        let out = mentionable("`@code` [@link](http://a.com) ![@img](a.png) https://x.com/@url");
        assert!(!out.contains('@'));

        let out = mentionable("```\n@block\n```\n\n@after");
        assert_eq!(out, " @after\n");
    }

    #[test]
    fn test_table_cells() {
        assert_eq!(mentionable("| @a | b |\n|-|-|\n| c | @d |"), "@a b \nc @d \n");
    }
}
