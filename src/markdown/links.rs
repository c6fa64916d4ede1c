//! URL helpers for links and images
//!
//! Scheme detection, the unsafe-scheme gate, internal permalink detection,
//! bare URL discovery and the `=WxH` image size suffix.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::RenderOptions;

fn scheme_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([a-z0-9+.-]+):").expect("invalid scheme regex"))
}

fn bare_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:[a-z][a-z0-9+.-]*://|www\.)[^\s<>"]+"#).expect("invalid url regex")
    })
}

fn sized_image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(!\[[^\]]*\]\()([^\s()<>]+)( =[0-9]*x?[0-9]*)\)").expect("invalid image regex")
    })
}

fn internal_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^/(?:signup_user_complete|admin_console|[^/]+/(?:pl|channels|messages))/")
            .expect("invalid internal link regex")
    })
}

fn anchor_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</?a(?:\s[^>]*)?>").expect("invalid anchor regex"))
}

/// Scheme of a URL without the trailing colon, e.g. `https`
pub fn get_scheme(url: &str) -> Option<&str> {
    scheme_regex()
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reject `javascript:`, `vbscript:` and `data:` URLs, including ones hidden
/// behind percent-encoding, whitespace or punctuation
pub fn is_url_safe(url: &str) -> bool {
    let decoded = urlencoding::decode_binary(url.as_bytes());
    let normalized: String = String::from_utf8_lossy(&decoded)
        .chars()
        .filter(|ch| ch.is_alphanumeric() || *ch == '_' || *ch == ':')
        .collect::<String>()
        .to_lowercase();

    !["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

/// Path to route to when `href` points inside the app, without `site_url`.
///
/// Internal links are signup and admin console pages, and team channel,
/// direct message and permalink URLs.
pub fn internal_link_path(href: &str, site_url: &str) -> Option<String> {
    let path = if site_url.is_empty() {
        href
    } else {
        href.strip_prefix(site_url).unwrap_or(href)
    };

    if internal_path_regex().is_match(path) {
        Some(path.to_string())
    } else {
        None
    }
}

/// Remove anchor tags from already rendered link text
pub fn strip_anchor_tags(html: &str) -> Cow<'_, str> {
    anchor_tag_regex().replace_all(html, "")
}

/// Byte ranges of bare URLs (`scheme://...` or `www....`) in plain text.
///
/// Trailing punctuation is left out of the link, and a closing parenthesis
/// only belongs to the URL when it balances an opening one.
pub fn find_bare_urls(text: &str) -> Vec<Range<usize>> {
    bare_url_regex()
        .find_iter(text)
        .filter_map(|m| {
            let url = trim_url_end(m.as_str());
            if url.ends_with("://") || url.eq_ignore_ascii_case("www.") {
                return None;
            }
            Some(m.start()..m.start() + url.len())
        })
        .collect()
}

fn trim_url_end(url: &str) -> &str {
    let mut url = url;
    loop {
        let Some(last) = url.chars().next_back() else {
            return url;
        };
        let trim = match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '\'' | '*' | '_' | '~' => true,
            ')' => url.matches(')').count() > url.matches('(').count(),
            _ => false,
        };
        if !trim {
            return url;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
}

/// Size requested with a trailing ` =WxH` on an image URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: String,
    /// `Some("auto")` for `=Wx`, `None` for `=W`
    pub height: Option<String>,
}

/// Split `"url =WxH"` into the URL and its requested size
pub fn split_image_dimensions(href: &str) -> (&str, Option<ImageDimensions>) {
    let Some((src, last)) = href.rsplit_once(' ') else {
        return (href, None);
    };
    let Some(size) = last.strip_prefix('=') else {
        return (src, None);
    };

    let dimensions = match size.split_once('x') {
        Some((width, "")) => ImageDimensions {
            width: width.to_string(),
            height: Some("auto".to_string()),
        },
        Some((width, height)) => ImageDimensions {
            width: width.to_string(),
            height: Some(height.to_string()),
        },
        None => ImageDimensions {
            width: size.to_string(),
            height: None,
        },
    };
    (src, Some(dimensions))
}

/// Rewrite `![alt](url =WxH)` so the parser keeps the size suffix as part of
/// the destination
pub(crate) fn protect_image_dimensions(text: &str) -> Cow<'_, str> {
    if !text.contains("![") {
        return Cow::Borrowed(text);
    }
    sized_image_regex().replace_all(text, "$1<$2$3>)")
}

/// Image source after applying the image proxy.
///
/// Only absolute external URLs are proxied; site-relative sources, sources
/// on `site_url` and already proxied sources are returned unchanged.
pub fn image_src(src: &str, options: &RenderOptions) -> String {
    let external = matches!(get_scheme(src), Some(scheme) if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https"));
    let on_site = !options.site_url.is_empty() && src.starts_with(&options.site_url);
    let proxied = src.starts_with(&options.image_proxy_url);

    if options.proxy_images && external && !on_site && !proxied {
        format!("{}{}", options.image_proxy_url, urlencoding::encode(src))
    } else {
        src.to_string()
    }
}
