//! Shared helpers for integration tests.

use tgmark::{CODE_CLOSE, CODE_OPEN};

const ALLOWED: &[&str] = &["b", "i", "code", "pre", "a"];

/// Check that `markup` only uses the allowed tags and that they nest properly,
/// with no `<pre>` inside another `<pre>`.
pub fn assert_balanced(markup: &str) {
    let mut stack: Vec<String> = Vec::new();
    let mut rest = markup;

    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let close = after
            .find('>')
            .unwrap_or_else(|| panic!("unterminated tag in {markup:?}"));
        let tag = &after[..close];
        rest = &after[close + 1..];

        if let Some(name) = tag.strip_prefix('/') {
            let top = stack.pop();
            assert_eq!(top.as_deref(), Some(name), "mismatched </{name}> in {markup:?}");
            continue;
        }

        let name = tag.split_whitespace().next().unwrap_or("");
        assert!(ALLOWED.contains(&name), "unexpected tag <{tag}> in {markup:?}");
        if name == "a" {
            assert!(tag.starts_with("a href=\"") && tag.ends_with('"'), "bad link <{tag}>");
        } else {
            assert_eq!(tag, name, "unexpected attributes on <{tag}>");
        }
        if name == "pre" {
            assert!(!stack.iter().any(|t| t == "pre"), "nested <pre> in {markup:?}");
        }
        stack.push(name.to_string());
    }

    assert!(stack.is_empty(), "unclosed {stack:?} in {markup:?}");
}

/// Undo the wrapping added around slices of an oversized code block.
pub fn reassemble(chunks: &[String]) -> String {
    let mut out = String::new();
    let mut in_sliced_block = false;
    for (i, chunk) in chunks.iter().enumerate() {
        let continues_block = chunks
            .get(i + 1)
            .is_some_and(|next| next.starts_with(CODE_OPEN))
            && chunk.starts_with(CODE_OPEN)
            && chunk.ends_with(CODE_CLOSE);
        let mut piece = chunk.as_str();
        if in_sliced_block {
            piece = piece.strip_prefix(CODE_OPEN).unwrap_or(piece);
        }
        if continues_block {
            piece = piece.strip_suffix(CODE_CLOSE).unwrap_or(piece);
        }
        out.push_str(piece);
        in_sliced_block = continues_block;
    }
    out
}
