use once_cell::sync::Lazy;
use regex::Regex;

static DANGEROUS_ELEMENTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["script", "style", "iframe"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<\s*{tag}[^>]*>.*?<\s*/\s*{tag}\s*>"))
                .expect("element pattern is a valid regex")
        })
        .collect()
});

static INLINE_HANDLERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\son\w+=("[^"]*"|'[^']*')"#).expect("INLINE_HANDLERS is a valid regex pattern")
});

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("PARAGRAPH_BREAK is a valid regex pattern"));

/// Plain text becomes `<p>` paragraphs with `<br/>` line breaks. Text that
/// already contains markup is kept as is.
pub fn to_html(text_or_html: &str) -> String {
    let s = text_or_html.trim();
    if s.is_empty() {
        return String::new();
    }
    if s.contains('<') || s.contains('>') {
        return s.to_string();
    }

    let escaped = s.replace('&', "&amp;");
    let paragraphs = PARAGRAPH_BREAK.replace_all(&escaped, "</p><p>");
    format!("<p>{}</p>", paragraphs.replace('\n', "<br/>"))
}

/// Strips `script`, `style` and `iframe` elements and inline `on*` handlers.
/// Rudimentary; not a full HTML sanitizer.
pub fn sanitize_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let mut out = html.to_string();
    for pattern in DANGEROUS_ELEMENTS.iter() {
        out = pattern.replace_all(&out, "").into_owned();
    }
    INLINE_HANDLERS.replace_all(&out, "").into_owned()
}
