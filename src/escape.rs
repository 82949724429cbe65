//! Escaping of literal text for the restricted HTML dialect.
//!
//! Neither function is idempotent: `&amp;` escapes to `&amp;amp;`. Call each
//! exactly once per literal segment.

/// Escape `&`, `<` and `>` in text content.
///
/// ```
/// use tgmark::escape_text;
///
/// assert_eq!(escape_text("a < b && c"), "a &lt; b &amp;&amp; c");
/// ```
pub fn escape_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 10);
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape an attribute value; like [`escape_text`] plus `"`.
pub fn escape_attr(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + value.len() / 10);
    for c in value.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}
