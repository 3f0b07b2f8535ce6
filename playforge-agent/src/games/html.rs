//! HTML helpers shared by the built-in agents.

use regex::Regex;
use std::sync::LazyLock;

static FENCE_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:html)?[ \t]*\r?\n?").expect("Invalid fence regex"));

static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html[^>]*>").expect("Invalid html tag regex"));

static HEAD_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").expect("Invalid head tag regex"));

const CHARSET_META: &str = "<meta charset=\"UTF-8\">";

/// Escape text for inclusion in HTML content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Turn a model reply into a complete HTML document.
///
/// Strips Markdown code fences, then makes sure the document has a doctype
/// or `<html>` prefix, a closing `</html>` and a UTF-8 charset declaration.
pub fn clean_llm_html(raw: &str) -> String {
    let mut html = FENCE_OPEN_REGEX.replace_all(raw, "").trim().to_string();

    let lowered = html.to_ascii_lowercase();
    if !(lowered.starts_with("<!doctype html") || lowered.starts_with("<html")) {
        html = format!("<!DOCTYPE html>\n<html lang=\"zh-CN\">\n{}", html);
    }

    if !html.to_ascii_lowercase().ends_with("</html>") {
        html.push_str("\n</html>");
    }

    if !html.to_ascii_lowercase().contains("charset") {
        html = insert_charset(&html);
    }

    html
}

fn insert_charset(html: &str) -> String {
    if let Some(head) = HEAD_TAG_REGEX.find(html) {
        let at = head.end();
        return format!("{}\n    {}{}", &html[..at], CHARSET_META, &html[at..]);
    }
    match HTML_TAG_REGEX.find(html) {
        Some(tag) => format!(
            "{}\n<head>\n    {}\n</head>{}",
            &html[..tag.end()],
            CHARSET_META,
            &html[tag.end()..]
        ),
        None => format!("{}\n{}", CHARSET_META, html),
    }
}
