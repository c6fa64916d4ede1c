//! Default HTML renderer for messages
//!
//! Emits the message view's markup: highlighted code blocks, safe links,
//! proxied and sized images, task lists and responsive tables. Search terms
//! from [`RenderOptions`] are highlighted in text, inline code, code blocks
//! and link targets.

use super::links::{
    get_scheme, image_src, internal_link_path, is_url_safe, split_image_dimensions,
    strip_anchor_tags,
};
use super::renderer::{ListItemInfo, Renderer, TableCellFlags};
use super::syntax;
use crate::config::RenderOptions;
use crate::search::{highlight_search_terms, matches_any, HIGHLIGHT_OPEN};
use crate::utils::{decode_html_entities, escape_html, replace_newlines};

/// Full HTML renderer
#[derive(Debug, Clone, Copy)]
pub struct HtmlRenderer<'a> {
    options: &'a RenderOptions,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(options: &'a RenderOptions) -> Self {
        Self { options }
    }

    fn highlight(&self, text: &str) -> String {
        highlight_search_terms(text, self.options.search_patterns())
    }

    /// Invisible copy of a code block carrying only the search highlights
    fn code_search_layer(&self, code: &str) -> String {
        if self.options.search_patterns().is_empty() {
            return String::new();
        }
        let searched = self.highlight(&escape_html(code));
        if !searched.contains(HIGHLIGHT_OPEN) {
            return String::new();
        }
        format!(r#"<div class="post-code__search-highlighting">{}</div>"#, searched)
    }

    /// Resolve the `href` to emit, or `None` when the link must degrade to text
    fn link_target(&self, href: &str, is_url: bool) -> Option<String> {
        let mut out_href = href.to_string();
        if !href.starts_with('/') {
            match get_scheme(href) {
                None => out_href = format!("http://{}", href),
                Some(scheme) if is_url && !self.options.is_scheme_autolinked(scheme) => {
                    log::debug!("Scheme {:?} is not autolinked", scheme);
                    return None;
                }
                Some(_) => {}
            }
        }

        if !is_url_safe(&decode_html_entities(href)) {
            log::warn!("Dropping unsafe link target");
            return None;
        }
        Some(out_href)
    }
}

impl Renderer for HtmlRenderer<'_> {
    fn code(&self, code: &str, language: Option<&str>) -> String {
        let language = language.unwrap_or("");

        if language == "tex" || language == "latex" {
            return format!(r#"<div data-latex="{}"></div>"#, escape_html(code));
        }

        // highlight html as xml so markup in the block stays inert
        let language = if language == "html" { "xml" } else { language };

        let mut class_name = String::from("post-code");
        if language.is_empty() {
            class_name.push_str(" post-code--wrap");
        }

        let mut header = String::new();
        let mut line_numbers = String::new();
        if let Some(name) = syntax::language_name(language) {
            header = format!(r#"<span class="post-code__language">{}</span>"#, escape_html(name));

            let line_count = code.split('\n').count();
            if line_count > 1 {
                let numbers: Vec<String> = (1..=line_count).map(|n| n.to_string()).collect();
                line_numbers = format!(
                    r#"<div class="post-code__line-numbers">{}</div>"#,
                    numbers.join("\n")
                );
            }
        }

        format!(
            r#"<div class="{}">{}<code class="hljs">{}{}{}</code></div>"#,
            class_name,
            header,
            line_numbers,
            self.code_search_layer(code),
            syntax::highlight(language, code)
        )
    }

    fn blockquote(&self, quote: String) -> String {
        format!("<blockquote>{}</blockquote>", quote)
    }

    fn heading(&self, text: String, level: u8) -> String {
        format!(r#"<h{0} class="markdown__heading">{1}</h{0}>"#, level, text)
    }

    fn hr(&self) -> String {
        "<hr>".to_string()
    }

    fn list(&self, body: String, ordered: bool, start: u64) -> String {
        if !ordered {
            return format!(r#"<ul class="markdown__list">{}</ul>"#, body);
        }
        if start == 1 {
            format!(r#"<ol class="markdown__list">{}</ol>"#, body)
        } else {
            format!(r#"<ol class="markdown__list" start="{}">{}</ol>"#, start, body)
        }
    }

    fn listitem(&self, text: String, item: ListItemInfo) -> String {
        if let Some(checked) = item.task {
            let checked = if checked { r#"checked="checked" "# } else { "" };
            return format!(
                r#"<li class="list-item--task-list"><input type="checkbox" disabled="disabled" {}/> {}</li>"#,
                checked, text
            );
        }
        match item.number {
            Some(number) => format!(r#"<li value="{}">{}</li>"#, number, text),
            None => format!("<li>{}</li>", text),
        }
    }

    fn paragraph(&self, text: String) -> String {
        if self.options.singleline {
            format!(r#"<p class="markdown__paragraph-inline">{}</p>"#, text)
        } else {
            format!("<p>{}</p>", text)
        }
    }

    fn table(&self, header: String, body: String) -> String {
        format!(
            r#"<div class="table-responsive"><table class="markdown__table"><thead>{}</thead><tbody>{}</tbody></table></div>"#,
            header, body
        )
    }

    fn tablerow(&self, content: String) -> String {
        format!("<tr>{}</tr>", content)
    }

    fn tablecell(&self, content: String, flags: TableCellFlags) -> String {
        let tag = if flags.header { "th" } else { "td" };
        match flags.align.as_attr() {
            Some(align) => format!(r#"<{0} align="{1}">{2}</{0}>"#, tag, align, content),
            None => format!("<{0}>{1}</{0}>", tag, content),
        }
    }

    fn strong(&self, text: String) -> String {
        format!("<strong>{}</strong>", text)
    }

    fn em(&self, text: String) -> String {
        format!("<em>{}</em>", text)
    }

    fn codespan(&self, code: &str) -> String {
        format!(
            r#"<span class="codespan__pre-wrap"><code>{}</code></span>"#,
            self.highlight(code)
        )
    }

    fn br(&self) -> String {
        if self.options.singleline {
            " ".to_string()
        } else {
            "<br>".to_string()
        }
    }

    fn del(&self, text: String) -> String {
        format!("<del>{}</del>", text)
    }

    fn link(&self, href: &str, title: Option<&str>, text: String, is_url: bool) -> String {
        let Some(out_href) = self.link_target(href, is_url) else {
            return text;
        };

        let mut output = String::from(r#"<a class="theme markdown__link"#);
        if matches_any(href, self.options.search_patterns()) {
            output.push_str(" search-highlight");
        }
        output.push_str(&format!(
            r#"" href="{}" rel="noreferrer""#,
            escape_html(&out_href)
        ));

        match internal_link_path(&out_href, &self.options.site_url) {
            Some(path) => output.push_str(&format!(r#" data-link="{}""#, escape_html(&path))),
            None => output.push_str(r#" target="_blank""#),
        }

        if let Some(title) = title {
            output.push_str(&format!(r#" title="{}""#, escape_html(title)));
        }

        output.push('>');
        output.push_str(&strip_anchor_tags(&text));
        output.push_str("</a>");
        output
    }

    fn image(&self, href: &str, title: Option<&str>, text: &str) -> String {
        let (src, dimensions) = split_image_dimensions(href);
        if !is_url_safe(&decode_html_entities(src)) {
            log::warn!("Dropping image with unsafe source");
            return text.to_string();
        }

        let src = image_src(src, self.options);
        let mut output = format!(r#"<img src="{}" alt="{}""#, escape_html(&src), text);
        if let Some(title) = title {
            output.push_str(&format!(r#" title="{}""#, escape_html(title)));
        }
        if let Some(dimensions) = dimensions {
            output.push_str(&format!(r#" width="{}""#, escape_html(&dimensions.width)));
            if let Some(height) = dimensions.height {
                output.push_str(&format!(r#" height="{}""#, escape_html(&height)));
            }
        }
        output.push_str(r#" class="markdown-inline-img">"#);
        output
    }

    fn text(&self, text: &str) -> String {
        self.highlight(text)
    }

    fn finish(&self, output: String) -> String {
        if self.options.singleline {
            replace_newlines(&output)
        } else {
            output
        }
    }
}
