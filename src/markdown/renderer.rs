//! Renderer visitor and the event walker that drives it
//!
//! The walker turns pulldown-cmark events into calls on a [`Renderer`].
//! Container constructs are rendered bottom-up: each visitor method receives
//! the already rendered output of its children and returns its own output.
//!
//! Text handed to the visitor is HTML-escaped. Fenced code is passed raw so
//! the renderer can decide how to highlight it.

use std::ops::Range;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, LinkType, Options, Parser, Tag};

use super::links::{find_bare_urls, protect_image_dimensions};
use crate::error::RenderError;
use crate::utils::escape_html;

/// Deepest container nesting the walker accepts
pub const MAX_NESTING_DEPTH: usize = 100;

/// Column alignment of a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellAlign {
    #[default]
    None,
    Left,
    Center,
    Right,
}

impl CellAlign {
    /// Value for an HTML `align` attribute
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            CellAlign::None => None,
            CellAlign::Left => Some("left"),
            CellAlign::Center => Some("center"),
            CellAlign::Right => Some("right"),
        }
    }
}

impl From<Alignment> for CellAlign {
    fn from(alignment: Alignment) -> Self {
        match alignment {
            Alignment::None => CellAlign::None,
            Alignment::Left => CellAlign::Left,
            Alignment::Center => CellAlign::Center,
            Alignment::Right => CellAlign::Right,
        }
    }
}

/// Position and alignment of a table cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableCellFlags {
    pub header: bool,
    pub align: CellAlign,
}

/// What the parser knows about a list item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListItemInfo {
    /// `Some(checked)` for a `[ ]` / `[x]` task item
    pub task: Option<bool>,
    /// Number written in the source for ordered items
    pub number: Option<u64>,
}

/// One method per markdown construct.
///
/// Block methods receive rendered children. `text`, `codespan` and the `text`
/// argument of `image` are already escaped; `code` receives the raw block.
pub trait Renderer {
    fn code(&self, code: &str, language: Option<&str>) -> String;
    fn blockquote(&self, quote: String) -> String;
    fn heading(&self, text: String, level: u8) -> String;
    fn hr(&self) -> String;
    fn list(&self, body: String, ordered: bool, start: u64) -> String;
    fn listitem(&self, text: String, item: ListItemInfo) -> String;
    fn paragraph(&self, text: String) -> String;
    fn table(&self, header: String, body: String) -> String;
    fn tablerow(&self, content: String) -> String;
    fn tablecell(&self, content: String, flags: TableCellFlags) -> String;
    fn strong(&self, text: String) -> String;
    fn em(&self, text: String) -> String;
    fn codespan(&self, code: &str) -> String;
    fn br(&self) -> String;
    fn del(&self, text: String) -> String;
    fn link(&self, href: &str, title: Option<&str>, text: String, is_url: bool) -> String;
    fn image(&self, href: &str, title: Option<&str>, text: &str) -> String;
    fn text(&self, text: &str) -> String;

    /// Raw HTML from the source. It is never passed through as markup.
    fn html(&self, html: &str) -> String {
        self.text(&escape_html(html))
    }

    /// Final pass over the complete output
    fn finish(&self, output: String) -> String {
        output
    }
}

/// Parser extensions used for every message
pub fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

#[derive(Debug)]
enum FrameKind {
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock(Option<String>),
    List { ordered: bool, start: u64 },
    Item(ListItemInfo),
    Table { alignments: Vec<CellAlign>, header: String },
    TableHead { column: usize },
    TableRow { column: usize },
    TableCell(TableCellFlags),
    Emphasis,
    Strong,
    Strikethrough,
    Link { href: String, title: String, is_url: bool },
    Image { href: String, title: String },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    content: String,
}

/// Walk state for one render
struct Walker<'r, R: Renderer + ?Sized> {
    renderer: &'r R,
    source: &'r str,
    stack: Vec<Frame>,
    output: String,
    pending_text: String,
    pending_block_html: String,
    /// Images nested inside an image's alt text
    skipped_images: usize,
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Number at the start of an ordered list item's source, e.g. `7` for `7. x`
fn source_item_number(source: &str) -> Option<u64> {
    let digits: String = source
        .trim_start()
        .chars()
        .take_while(|ch| ch.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

impl<'r, R: Renderer + ?Sized> Walker<'r, R> {
    fn new(renderer: &'r R, source: &'r str) -> Self {
        Self {
            renderer,
            source,
            stack: Vec::new(),
            output: String::new(),
            pending_text: String::new(),
            pending_block_html: String::new(),
            skipped_images: 0,
        }
    }

    fn emit(&mut self, rendered: &str) {
        match self.stack.last_mut() {
            Some(frame) => frame.content.push_str(rendered),
            None => self.output.push_str(rendered),
        }
    }

    fn in_image(&self) -> bool {
        matches!(self.stack.last(), Some(Frame { kind: FrameKind::Image { .. }, .. }))
    }

    fn in_code_block(&self) -> bool {
        matches!(self.stack.last(), Some(Frame { kind: FrameKind::CodeBlock(_), .. }))
    }

    fn in_link(&self) -> bool {
        self.stack
            .iter()
            .any(|frame| matches!(frame.kind, FrameKind::Link { .. } | FrameKind::Image { .. }))
    }

    /// Raw HTML directly inside the document or a quote is a block of its own
    fn at_block_level(&self) -> bool {
        matches!(
            self.stack.last(),
            None | Some(Frame { kind: FrameKind::BlockQuote, .. })
        )
    }

    /// Render buffered text, turning bare URLs into links
    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);

        if self.in_link() {
            let rendered = self.renderer.text(&escape_html(&text));
            self.emit(&rendered);
            return;
        }

        let mut rendered = String::with_capacity(text.len());
        let mut last = 0;
        for range in find_bare_urls(&text) {
            if range.start > last {
                rendered.push_str(&self.renderer.text(&escape_html(&text[last..range.start])));
            }
            let url = &text[range.clone()];
            let label = self.renderer.text(&escape_html(url));
            rendered.push_str(&self.renderer.link(url, None, label, true));
            last = range.end;
        }
        if last < text.len() {
            rendered.push_str(&self.renderer.text(&escape_html(&text[last..])));
        }
        self.emit(&rendered);
    }

    fn flush_block_html(&mut self) {
        if self.pending_block_html.is_empty() {
            return;
        }
        let html = std::mem::take(&mut self.pending_block_html);
        log::trace!("Escaping {} bytes of block HTML", html.len());
        let text = self.renderer.html(html.trim_end());
        let rendered = self.renderer.paragraph(text);
        self.emit(&rendered);
    }

    fn flush(&mut self) {
        self.flush_text();
        self.flush_block_html();
    }

    fn push(&mut self, kind: FrameKind) -> Result<(), RenderError> {
        if self.stack.len() >= MAX_NESTING_DEPTH {
            return Err(RenderError::TooDeeplyNested {
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.stack.push(Frame {
            kind,
            content: String::new(),
        });
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) -> Result<(), RenderError> {
        // alt text is collected as plain text
        if self.in_image() {
            if matches!(tag, Tag::Image(..)) {
                self.skipped_images += 1;
            }
            return Ok(());
        }

        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading(level, _id, _classes) => FrameKind::Heading(heading_level(level)),
            Tag::BlockQuote => FrameKind::BlockQuote,
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(|lang| lang.to_string()),
                    CodeBlockKind::Indented => None,
                };
                FrameKind::CodeBlock(language)
            }
            Tag::List(start) => FrameKind::List {
                ordered: start.is_some(),
                start: start.unwrap_or(1),
            },
            Tag::Item => {
                let ordered = matches!(
                    self.stack.last(),
                    Some(Frame { kind: FrameKind::List { ordered: true, .. }, .. })
                );
                let number = if ordered {
                    self.source.get(range).and_then(source_item_number)
                } else {
                    None
                };
                FrameKind::Item(ListItemInfo { task: None, number })
            }
            Tag::Table(alignments) => FrameKind::Table {
                alignments: alignments.into_iter().map(CellAlign::from).collect(),
                header: String::new(),
            },
            Tag::TableHead => FrameKind::TableHead { column: 0 },
            Tag::TableRow => FrameKind::TableRow { column: 0 },
            Tag::TableCell => FrameKind::TableCell(self.next_cell_flags()),
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => FrameKind::Strikethrough,
            Tag::Link(link_type, dest, title) => {
                let href = match link_type {
                    LinkType::Email => format!("mailto:{}", dest),
                    _ => dest.to_string(),
                };
                FrameKind::Link {
                    href,
                    title: title.to_string(),
                    is_url: matches!(link_type, LinkType::Autolink | LinkType::Email),
                }
            }
            Tag::Image(_link_type, dest, title) => FrameKind::Image {
                href: dest.to_string(),
                title: title.to_string(),
            },
            Tag::FootnoteDefinition(_) => FrameKind::Paragraph,
        };
        self.push(kind)
    }

    /// Advance the column of the enclosing row and describe the new cell
    fn next_cell_flags(&mut self) -> TableCellFlags {
        let (header, column) = match self.stack.last_mut() {
            Some(Frame { kind: FrameKind::TableHead { column }, .. }) => {
                *column += 1;
                (true, *column - 1)
            }
            Some(Frame { kind: FrameKind::TableRow { column }, .. }) => {
                *column += 1;
                (false, *column - 1)
            }
            _ => (false, 0),
        };

        let align = self
            .stack
            .iter()
            .rev()
            .find_map(|frame| match &frame.kind {
                FrameKind::Table { alignments, .. } => Some(alignments.get(column).copied().unwrap_or_default()),
                _ => None,
            })
            .unwrap_or_default();

        TableCellFlags { header, align }
    }

    fn end(&mut self, tag: Tag<'_>) {
        if self.in_image() {
            if !matches!(tag, Tag::Image(..)) {
                return;
            }
            if self.skipped_images > 0 {
                self.skipped_images -= 1;
                return;
            }
        }
        self.close_frame();
    }

    fn close_frame(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let r = self.renderer;
        let content = frame.content;

        let rendered = match frame.kind {
            FrameKind::Paragraph => r.paragraph(content),
            FrameKind::Heading(level) => r.heading(content, level),
            FrameKind::BlockQuote => r.blockquote(content),
            FrameKind::CodeBlock(language) => {
                let code = content.trim_end_matches('\n');
                let language = language.map(|lang| lang.to_lowercase());
                r.code(code, language.as_deref())
            }
            FrameKind::List { ordered, start } => r.list(content, ordered, start),
            FrameKind::Item(info) => r.listitem(content, info),
            FrameKind::Table { header, .. } => r.table(header, content),
            FrameKind::TableHead { .. } => {
                let row = r.tablerow(content);
                if let Some(Frame { kind: FrameKind::Table { header, .. }, .. }) = self.stack.last_mut() {
                    header.push_str(&row);
                }
                return;
            }
            FrameKind::TableRow { .. } => r.tablerow(content),
            FrameKind::TableCell(flags) => r.tablecell(content, flags),
            FrameKind::Emphasis => r.em(content),
            FrameKind::Strong => r.strong(content),
            FrameKind::Strikethrough => r.del(content),
            FrameKind::Link { href, title, is_url } => {
                let title = Some(title.as_str()).filter(|t| !t.is_empty());
                r.link(&href, title, content, is_url)
            }
            FrameKind::Image { href, title } => {
                let title = Some(title.as_str()).filter(|t| !t.is_empty());
                r.image(&href, title, &content)
            }
        };
        self.emit(&rendered);
    }

    fn walk(mut self) -> Result<String, RenderError> {
        let parser = Parser::new_ext(self.source, parser_options()).into_offset_iter();

        for (event, range) in parser {
            match event {
                Event::Text(text) if self.in_code_block() => {
                    self.emit(&text);
                }
                Event::Text(text) | Event::Code(text) if self.in_image() => {
                    self.emit(&escape_html(&text));
                }
                Event::Text(text) => {
                    self.flush_block_html();
                    self.pending_text.push_str(&text);
                }
                Event::SoftBreak if !self.in_image() => {
                    self.pending_text.push('\n');
                }
                Event::Html(html) if self.at_block_level() => {
                    self.flush_text();
                    self.pending_block_html.push_str(&html);
                }
                event => {
                    self.flush();
                    match event {
                        Event::Start(tag) => self.start(tag, range)?,
                        Event::End(tag) => self.end(tag),
                        Event::Code(code) => {
                            let rendered = self.renderer.codespan(&escape_html(&code));
                            self.emit(&rendered);
                        }
                        Event::Html(html) => {
                            let rendered = self.renderer.html(&html);
                            self.emit(&rendered);
                        }
                        Event::HardBreak if self.in_image() => self.emit(" "),
                        Event::HardBreak => {
                            let rendered = self.renderer.br();
                            self.emit(&rendered);
                        }
                        Event::SoftBreak => self.emit(" "),
                        Event::Rule => {
                            let rendered = self.renderer.hr();
                            self.emit(&rendered);
                        }
                        Event::TaskListMarker(checked) => {
                            if let Some(Frame { kind: FrameKind::Item(info), .. }) = self.stack.last_mut() {
                                info.task = Some(checked);
                            }
                        }
                        Event::FootnoteReference(label) => {
                            let rendered = self.renderer.text(&escape_html(&format!("[^{}]", label)));
                            self.emit(&rendered);
                        }
                        Event::Text(_) => {}
                    }
                }
            }
        }

        self.flush();
        while !self.stack.is_empty() {
            self.close_frame();
        }
        Ok(self.renderer.finish(self.output))
    }
}

/// Render `text` with `renderer`.
///
/// Fails only when containers nest deeper than [`MAX_NESTING_DEPTH`].
pub fn render<R: Renderer + ?Sized>(text: &str, renderer: &R) -> Result<String, RenderError> {
    let source = protect_image_dimensions(text);
    Walker::new(renderer, &source).walk()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes every construct as a bracketed tag so tests can see the calls
    struct Trace;

    impl Renderer for Trace {
        fn code(&self, code: &str, language: Option<&str>) -> String {
            format!("[code {}|{}]", language.unwrap_or("-"), code)
        }
        fn blockquote(&self, quote: String) -> String {
            format!("[quote {}]", quote)
        }
        fn heading(&self, text: String, level: u8) -> String {
            format!("[h{} {}]", level, text)
        }
        fn hr(&self) -> String {
            "[hr]".to_string()
        }
        fn list(&self, body: String, ordered: bool, start: u64) -> String {
            format!("[list {} {} {}]", ordered, start, body)
        }
        fn listitem(&self, text: String, item: ListItemInfo) -> String {
            format!("[li {:?} {:?} {}]", item.task, item.number, text)
        }
        fn paragraph(&self, text: String) -> String {
            format!("[p {}]", text)
        }
        fn table(&self, header: String, body: String) -> String {
            format!("[table {} | {}]", header, body)
        }
        fn tablerow(&self, content: String) -> String {
            format!("[tr {}]", content)
        }
        fn tablecell(&self, content: String, flags: TableCellFlags) -> String {
            format!("[td {} {:?} {}]", flags.header, flags.align, content)
        }
        fn strong(&self, text: String) -> String {
            format!("[b {}]", text)
        }
        fn em(&self, text: String) -> String {
            format!("[i {}]", text)
        }
        fn codespan(&self, code: &str) -> String {
            format!("[cs {}]", code)
        }
        fn br(&self) -> String {
            "[br]".to_string()
        }
        fn del(&self, text: String) -> String {
            format!("[del {}]", text)
        }
        fn link(&self, href: &str, title: Option<&str>, text: String, is_url: bool) -> String {
            format!("[a {} {:?} {} {}]", href, title, is_url, text)
        }
        fn image(&self, href: &str, title: Option<&str>, text: &str) -> String {
            format!("[img {} {:?} {}]", href, title, text)
        }
        fn text(&self, text: &str) -> String {
            text.to_string()
        }
    }

    fn trace(text: &str) -> String {
        render(text, &Trace).unwrap()
    }

    #[test]
    fn test_inline_nesting() {
        assert_eq!(trace("**a *b* ~~c~~**"), "[p [b a [i b] [del c]]]");
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(trace("a < b & c"), "[p a &lt; b &amp; c]");
    }

    #[test]
    fn test_softbreak_keeps_newline() {
        assert_eq!(trace("one\ntwo"), "[p one\ntwo]");
    }

    #[test]
    fn test_code_block_is_raw() {
        assert_eq!(trace("```Rust\nlet a = 1 < 2;\n```"), "[code rust|let a = 1 < 2;]");
        assert_eq!(trace("    indented"), "[code -|indented]");
    }

    #[test]
    fn test_codespan_is_escaped() {
        assert_eq!(trace("`<b>`"), "[p [cs &lt;b&gt;]]");
    }

    #[test]
    fn test_links() {
        assert_eq!(trace(r#"[x](http://a.com "T")"#), r#"[p [a http://a.com Some("T") false x]]"#);
        assert_eq!(trace("<http://a.com>"), "[p [a http://a.com None true http://a.com]]");
        assert_eq!(trace("<me@a.com>"), "[p [a mailto:me@a.com None true me@a.com]]");
    }

    #[test]
    fn test_bare_url_autolink() {
        assert_eq!(
            trace("go to https://a.com/x now"),
            "[p go to [a https://a.com/x None true https://a.com/x] now]"
        );
        assert_eq!(trace("[https://a.com](https://b.com)"), "[p [a https://b.com None false https://a.com]]");
    }

    #[test]
    fn test_image_alt_and_size() {
        assert_eq!(trace("![a *b*](x.png =10x20)"), "[p [img x.png =10x20 None a b]]");
        assert_eq!(trace("![a  \nb](x.png)"), "[p [img x.png None a b]]");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            trace("3. a\n7. b"),
            "[list true 3 [li None Some(3) a][li None Some(7) b]]"
        );
        assert_eq!(
            trace("- [x] done\n- [ ] todo"),
            "[list false 1 [li Some(true) None done][li Some(false) None todo]]"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            trace("| a | b |\n|:-|-:|\n| 1 | 2 |"),
            "[table [tr [td true Left a][td true Right b]] | [tr [td false Left 1][td false Right 2]]]"
        );
    }

    #[test]
    fn test_html_is_escaped() {
        assert_eq!(trace("a <b>x</b>"), "[p a &lt;b&gt;x&lt;/b&gt;]");
        assert_eq!(trace("<div>\nhi\n</div>"), "[p &lt;div&gt;\nhi\n&lt;/div&gt;]");
    }

    #[test]
    fn test_nesting_limit() {
        let deep = ">".repeat(MAX_NESTING_DEPTH + 5) + " x";
        assert!(matches!(render(&deep, &Trace), Err(RenderError::TooDeeplyNested { .. })));
        assert!(render(&(">".repeat(10) + " x"), &Trace).is_ok());
    }

    #[test]
    fn test_heading_and_rule() {
        assert_eq!(trace("## Title\n\n---"), "[h2 Title][hr]");
    }
}
