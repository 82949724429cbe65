use serde::{Deserialize, Serialize};

/// Root of a parsed document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmphasisStyle {
    Bold,
    Italic,
}

/// A single list item, which can contain inline and block content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub children: Vec<Node>,
}

/// A list (ordered or unordered)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

/// A table row whose cells are already flattened to plain text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub is_header: bool,
}

/// Rows may carry different cell counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

/// Document tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Text(String),
    Emphasis {
        style: EmphasisStyle,
        children: Vec<Node>,
    },
    CodeInline(String),
    CodeBlock {
        // Kept for callers; the renderer ignores it
        language: Option<String>,
        content: String,
    },
    Heading {
        level: u8,
        children: Vec<Node>,
    },
    Paragraph {
        children: Vec<Node>,
    },
    List(List),
    Link {
        href: String,
        children: Vec<Node>,
    },
    LineBreak,
    Table(Table),
    /// Any construct without a dedicated rendering. Only its children are emitted.
    Unsupported {
        kind: String,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    pub fn bold(children: Vec<Node>) -> Self {
        Node::Emphasis {
            style: EmphasisStyle::Bold,
            children,
        }
    }

    pub fn italic(children: Vec<Node>) -> Self {
        Node::Emphasis {
            style: EmphasisStyle::Italic,
            children,
        }
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }
}
