use std::fmt::Write;

use crate::escape::{escape_attr, escape_text};
use crate::node::{Document, EmphasisStyle, List, Node};
use crate::table::format_table;

/// Render a document to the restricted HTML dialect.
///
/// Blank lines accumulated by trailing blocks are trimmed at the very start
/// and end of the result only. Only ASCII whitespace and control chars are
/// trimmed, so a leading no-break space survives.
pub fn render(document: &Document) -> String {
    render_nodes(&document.children)
        .trim_matches(|c: char| c <= ' ')
        .to_string()
}

/// Render a single subtree without top-level trimming.
pub fn render_node(node: &Node) -> String {
    match node {
        Node::Text(text) => escape_text(text),
        Node::Emphasis { style, children } => {
            let tag = emphasis_tag(*style);
            format!("<{tag}>{}</{tag}>", render_nodes(children))
        }
        Node::CodeInline(code) => format!("<code>{}</code>", escape_text(code)),
        Node::CodeBlock { content, .. } => {
            format!("<pre><code>{}</code></pre>\n\n", escape_text(content))
        }
        // No heading primitive in the target dialect
        Node::Heading { children, .. } => format!("<b>{}</b>\n\n", render_nodes(children)),
        Node::Paragraph { children } => format!("{}\n\n", render_nodes(children)),
        Node::List(list) => render_list(list),
        Node::Link { href, children } => format!(
            "<a href=\"{}\">{}</a>",
            escape_attr(href),
            render_nodes(children)
        ),
        Node::LineBreak => "\n".to_string(),
        Node::Table(table) => format!("<pre>{}</pre>\n\n", escape_text(&format_table(table))),
        Node::Unsupported { children, .. } => render_nodes(children),
    }
}

fn render_nodes(nodes: &[Node]) -> String {
    nodes.iter().map(render_node).collect()
}

fn emphasis_tag(style: EmphasisStyle) -> &'static str {
    match style {
        EmphasisStyle::Bold => "b",
        EmphasisStyle::Italic => "i",
    }
}

fn render_list(list: &List) -> String {
    let mut out = String::new();
    for (index, item) in list.items.iter().enumerate() {
        if list.ordered {
            let _ = write!(out, "{}. ", index + 1);
        } else {
            out.push_str("• ");
        }
        out.push_str(&render_nodes(&item.children));
        out.push('\n');
    }
    out.push('\n');
    out
}
