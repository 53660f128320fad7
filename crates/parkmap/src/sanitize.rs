//! Rich-text sanitizing for content delivered by the content service.
//!
//! Content is parsed as an HTML fragment and re-serialized from an allowlist. Executable
//! elements are dropped together with everything inside them, unknown elements are unwrapped
//! (their text survives), and every attribute outside the per-element allowlist is removed,
//! which covers inline event handlers.

use scraper::{ElementRef, Html};
use serde::Serialize;

const ALLOWED_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "caption", "code", "dd", "del", "div", "dl", "dt", "em",
    "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "ins", "li",
    "mark", "ol", "p", "pre", "s", "small", "span", "strong", "sub", "sup", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "u", "ul",
];

/// Dropped along with their children.
const STRIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "frame", "frameset",
    "applet", "link", "meta", "base", "form", "svg", "math",
];

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img"];

const GLOBAL_ATTRIBUTES: &[&str] = &["class", "id", "title", "lang", "dir"];

const URL_ATTRIBUTES: &[&str] = &["href", "src"];

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

fn element_attributes(element: &str) -> &'static [&'static str] {
    match element {
        "a" => &["href", "target", "rel"],
        "img" => &["src", "alt", "width", "height"],
        "td" | "th" => &["colspan", "rowspan"],
        "ol" => &["start"],
        _ => &[],
    }
}

/// HTML that has passed through [`sanitize_html`].
///
/// The only way to build one is the sanitizer, so renderers can demand this type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip executable markup from untrusted HTML while keeping formatting.
pub fn sanitize_html(raw: &str) -> SanitizedHtml {
    if raw.trim().is_empty() {
        return SanitizedHtml::default();
    }

    let fragment = Html::parse_fragment(raw);
    let mut output = String::with_capacity(raw.len());
    write_children(fragment.root_element(), &mut output);
    SanitizedHtml(output)
}

fn write_children(parent: ElementRef<'_>, output: &mut String) {
    for child in parent.children() {
        if let Some(element) = ElementRef::wrap(child) {
            write_element(element, output);
        } else if let Some(text) = child.value().as_text() {
            escape_text(text, output);
        }
    }
}

fn write_element(element: ElementRef<'_>, output: &mut String) {
    let name = element.value().name().to_ascii_lowercase();

    if STRIPPED_ELEMENTS.contains(&name.as_str()) {
        return;
    }

    if !ALLOWED_ELEMENTS.contains(&name.as_str()) {
        write_children(element, output);
        return;
    }

    let mut attributes: Vec<(String, &str)> = element
        .value()
        .attrs()
        .map(|(attribute, value)| (attribute.to_ascii_lowercase(), value))
        .filter(|(attribute, value)| attribute_allowed(&name, attribute, value))
        .collect();
    attributes.sort_by(|left, right| left.0.cmp(&right.0));

    output.push('<');
    output.push_str(&name);
    for (attribute, value) in attributes {
        output.push(' ');
        output.push_str(&attribute);
        output.push_str("=\"");
        escape_attribute(value, output);
        output.push('"');
    }
    output.push('>');

    if VOID_ELEMENTS.contains(&name.as_str()) {
        return;
    }

    write_children(element, output);
    output.push_str("</");
    output.push_str(&name);
    output.push('>');
}

fn attribute_allowed(element: &str, attribute: &str, value: &str) -> bool {
    if attribute.starts_with("on") {
        return false;
    }

    let listed =
        GLOBAL_ATTRIBUTES.contains(&attribute) || element_attributes(element).contains(&attribute);
    if !listed {
        return false;
    }

    if URL_ATTRIBUTES.contains(&attribute) {
        return url_allowed(value);
    }

    true
}

fn url_allowed(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.split_once(':') {
        // "path/with:colon" and "?q=a:b" are relative references, not schemes
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            ALLOWED_SCHEMES.contains(&scheme)
        }
        _ => true,
    }
}

fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

fn escape_attribute(value: &str, output: &mut String) {
    for c in value.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}
