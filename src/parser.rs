use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::config::MarkdownConfig;
use crate::node::{Document, EmphasisStyle, List, ListItem, Node, Table, TableRow};

/// Parse markdown text into a document tree
pub fn parse(markdown: &str, config: &MarkdownConfig) -> Document {
    let mut options = Options::empty();
    if config.tables {
        options.insert(Options::ENABLE_TABLES);
    }
    if config.strikethrough {
        options.insert(Options::ENABLE_STRIKETHROUGH);
    }
    if config.tasklists {
        options.insert(Options::ENABLE_TASKLISTS);
    }

    let mut state = ParseState::default();
    for event in Parser::new_ext(markdown, options) {
        process_event(event, &mut state);
    }
    state.finish()
}

enum FrameKind {
    Root,
    Paragraph,
    Heading(u8),
    Emphasis(EmphasisStyle),
    Link(String),
    InlineCode,
    List(bool),
    Item,
    CodeBlock(Option<String>),
    Unsupported(&'static str),
}

// One open container. Lists collect items, code blocks collect raw text.
// Frames opened by an inline HTML tag remember the tag name.
struct Frame {
    kind: FrameKind,
    children: Vec<Node>,
    items: Vec<ListItem>,
    code: String,
    html: Option<String>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            items: Vec::new(),
            code: String::new(),
            html: None,
        }
    }
}

struct ParseState {
    stack: Vec<Frame>,
    // Tables are flat, so they bypass the frame stack entirely
    table: Option<TableBuilder>,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            stack: vec![Frame::new(FrameKind::Root)],
            table: None,
        }
    }
}

impl ParseState {
    fn current(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push_node(&mut self, node: Node) {
        self.current().children.push(node);
    }

    fn push_text(&mut self, text: &str) {
        let frame = self.current();
        if let FrameKind::CodeBlock(_) = frame.kind {
            frame.code.push_str(text);
        } else {
            frame.children.push(Node::Text(text.to_string()));
        }
    }

    fn open(&mut self, kind: FrameKind) {
        self.stack.push(Frame::new(kind));
    }

    fn close_html_frames(&mut self) {
        while self.stack.len() > 1 && self.current().html.is_some() {
            self.close();
        }
    }

    fn inline_html(&mut self, html: &str) {
        let Some(tag) = parse_html_tag(html) else {
            return;
        };
        if tag.name == "br" {
            self.push_node(Node::LineBreak);
            return;
        }
        if tag.closing {
            self.close_html_tag(&tag.name);
            return;
        }
        if tag.self_closing {
            return;
        }
        let kind = match tag.name.as_str() {
            "b" | "strong" => FrameKind::Emphasis(EmphasisStyle::Bold),
            "i" | "em" => FrameKind::Emphasis(EmphasisStyle::Italic),
            "code" => FrameKind::InlineCode,
            "a" => match href_attr(tag.attrs) {
                Some(href) => FrameKind::Link(href),
                None => return,
            },
            _ => return,
        };
        self.stack.push(Frame {
            html: Some(tag.name),
            ..Frame::new(kind)
        });
    }

    // Closes the innermost open tag with this name, and any tags opened
    // after it. A closing tag with no open partner is dropped.
    fn close_html_tag(&mut self, name: &str) {
        let open = self
            .stack
            .iter()
            .rev()
            .take_while(|frame| frame.html.is_some())
            .position(|frame| frame.html.as_deref() == Some(name));
        if let Some(depth) = open {
            for _ in 0..=depth {
                self.close();
            }
        }
    }

    fn close(&mut self) {
        // Never pop the root
        if self.stack.len() < 2 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let parent = self.current();
        match frame.kind {
            FrameKind::Item => {
                let item = ListItem {
                    children: frame.children,
                };
                if let FrameKind::List(_) = parent.kind {
                    parent.items.push(item);
                } else {
                    parent.children.extend(item.children);
                }
            }
            kind => {
                if let Some(node) = frame_to_node(kind, frame.children, frame.items, frame.code) {
                    parent.children.push(node);
                }
            }
        }
    }

    fn finish(mut self) -> Document {
        while self.stack.len() > 1 {
            self.close();
        }
        let children = self
            .stack
            .pop()
            .map(|root| root.children)
            .unwrap_or_default();
        Document::new(children)
    }
}

fn frame_to_node(
    kind: FrameKind,
    children: Vec<Node>,
    items: Vec<ListItem>,
    code: String,
) -> Option<Node> {
    let node = match kind {
        FrameKind::Root | FrameKind::Item => return None,
        FrameKind::Paragraph => Node::Paragraph { children },
        FrameKind::Heading(level) => Node::Heading { level, children },
        FrameKind::Emphasis(style) => Node::Emphasis { style, children },
        FrameKind::Link(href) => Node::Link { href, children },
        FrameKind::InlineCode => Node::CodeInline(plain_text(&children)),
        FrameKind::List(ordered) => Node::List(List { ordered, items }),
        FrameKind::CodeBlock(language) => {
            let content = code.strip_suffix('\n').unwrap_or(&code).to_string();
            Node::CodeBlock { language, content }
        }
        FrameKind::Unsupported(kind) => Node::Unsupported {
            kind: kind.to_string(),
            children,
        },
    };
    Some(node)
}

fn process_event(event: Event, state: &mut ParseState) {
    if state.table.is_some() {
        if let Event::End(TagEnd::Table) = event {
            if let Some(builder) = state.table.take() {
                state.push_node(Node::Table(builder.finish()));
            }
        } else if let Some(builder) = state.table.as_mut() {
            builder.process(event);
        }
        return;
    }

    match event {
        Event::Start(Tag::Table(_)) => {
            state.table = Some(TableBuilder::default());
        }
        Event::Start(tag) => state.open(frame_kind(tag)),
        Event::End(_) => {
            state.close_html_frames();
            state.close();
        }

        Event::Text(text) => state.push_text(&text),
        Event::Code(code) => state.push_node(Node::CodeInline(code.into_string())),

        Event::InlineHtml(html) => state.inline_html(&html),
        // Models sometimes answer with raw <br> between blocks
        Event::Html(html) => {
            if is_line_break_tag(&html) {
                state.push_node(Node::LineBreak);
            } else {
                state.push_text(&html);
            }
        }

        Event::FootnoteReference(label) => state.push_text(&format!("[{label}]")),
        Event::TaskListMarker(checked) => state.push_text(if checked { "[x] " } else { "[ ] " }),

        Event::SoftBreak => state.push_text(" "),
        Event::HardBreak => state.push_node(Node::LineBreak),

        Event::Rule => state.push_node(Node::Unsupported {
            kind: "rule".to_string(),
            children: Vec::new(),
        }),

        // Ignore other events
        _ => {}
    }
}

fn frame_kind(tag: Tag) -> FrameKind {
    match tag {
        Tag::Paragraph => FrameKind::Paragraph,
        Tag::Heading { level, .. } => FrameKind::Heading(heading_level_to_u8(level)),
        Tag::Strong => FrameKind::Emphasis(EmphasisStyle::Bold),
        Tag::Emphasis => FrameKind::Emphasis(EmphasisStyle::Italic),
        Tag::Link { dest_url, .. } => FrameKind::Link(dest_url.into_string()),
        Tag::List(first_item) => FrameKind::List(first_item.is_some()),
        Tag::Item => FrameKind::Item,
        Tag::CodeBlock(kind) => FrameKind::CodeBlock(match kind {
            CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
            CodeBlockKind::Indented => None,
        }),
        Tag::BlockQuote(_) => FrameKind::Unsupported("blockquote"),
        Tag::Strikethrough => FrameKind::Unsupported("strikethrough"),
        Tag::Image { .. } => FrameKind::Unsupported("image"),
        Tag::HtmlBlock => FrameKind::Unsupported("html"),
        _ => FrameKind::Unsupported("other"),
    }
}

fn is_line_break_tag(html: &str) -> bool {
    let tag = html.trim().to_ascii_lowercase();
    matches!(tag.as_str(), "<br>" | "<br/>" | "<br />")
}

struct HtmlTag<'a> {
    name: String,
    closing: bool,
    self_closing: bool,
    attrs: &'a str,
}

/// Split a single HTML tag such as `<a href="x">` or `</b>` into its parts.
/// Comments, declarations and anything else without a tag name give `None`.
fn parse_html_tag(html: &str) -> Option<HtmlTag<'_>> {
    let inner = html.trim().strip_prefix('<')?.strip_suffix('>')?;
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let (self_closing, inner) = match inner.strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let name_end = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    if name_end == 0 {
        return None;
    }
    Some(HtmlTag {
        name: inner[..name_end].to_ascii_lowercase(),
        closing,
        self_closing,
        attrs: &inner[name_end..],
    })
}

fn href_attr(attrs: &str) -> Option<String> {
    let lower = attrs.to_ascii_lowercase();
    let at = lower.match_indices("href").map(|(at, _)| at).find(|&at| {
        attrs[..at]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace)
    })?;
    let rest = attrs[at + "href".len()..]
        .trim_start()
        .strip_prefix('=')?
        .trim_start();
    let value = match rest.chars().next()? {
        quote @ ('"' | '\'') => {
            let body = &rest[1..];
            &body[..body.find(quote)?]
        }
        _ => rest.split(char::is_whitespace).next()?,
    };
    (!value.is_empty()).then(|| value.to_string())
}

fn plain_text(nodes: &[Node]) -> String {
    let mut text = String::new();
    for node in nodes {
        match node {
            Node::Text(t) | Node::CodeInline(t) => text.push_str(t),
            Node::LineBreak => text.push('\n'),
            Node::Emphasis { children, .. }
            | Node::Link { children, .. }
            | Node::Unsupported { children, .. } => text.push_str(&plain_text(children)),
            _ => {}
        }
    }
    text
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Collects table rows, flattening everything inside a cell to plain text.
#[derive(Default)]
struct TableBuilder {
    rows: Vec<TableRow>,
    current_row: Vec<String>,
    cell: Option<String>,
}

impl TableBuilder {
    fn process(&mut self, event: Event) {
        match event {
            Event::Start(Tag::TableHead) | Event::Start(Tag::TableRow) => {
                self.current_row.clear();
            }
            Event::End(TagEnd::TableHead) => self.finish_row(true),
            Event::End(TagEnd::TableRow) => self.finish_row(false),

            Event::Start(Tag::TableCell) => {
                self.cell = Some(String::new());
            }
            Event::End(TagEnd::TableCell) => {
                if let Some(cell) = self.cell.take() {
                    self.current_row.push(cell.trim().to_string());
                }
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.push_str(&text);
                }
            }
            // Tags are dropped from cells, their text is kept
            Event::InlineHtml(html) if is_line_break_tag(&html) => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.push(' ');
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.push(' ');
                }
            }

            _ => {}
        }
    }

    fn finish_row(&mut self, is_header: bool) {
        let cells = std::mem::take(&mut self.current_row);
        if !cells.is_empty() {
            self.rows.push(TableRow { cells, is_header });
        }
    }

    fn finish(self) -> Table {
        Table { rows: self.rows }
    }
}
