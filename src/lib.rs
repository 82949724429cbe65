//! Markdown to chat-safe HTML, split into message-sized chunks.
//!
//! The pipeline is `markdown -> Document -> markup -> chunks`. The markup uses
//! only `<b>`, `<i>`, `<code>`, `<pre>`, `<pre><code>` and `<a href>`, with
//! `&`, `<` and `>` escaped in literal text. Every stage is a pure function
//! of its input and can be called from any number of threads at once.

mod config;
mod error;
mod escape;
mod node;
mod parser;
mod render;
mod split;
mod table;

pub use config::{Config, DEFAULT_MAX_MESSAGE_LENGTH, LoggingConfig, MarkdownConfig, TransportConfig};
pub use error::{Error, Result};
pub use escape::{escape_attr, escape_text};
pub use node::{Document, EmphasisStyle, List, ListItem, Node, Table, TableRow};
pub use render::{render, render_node};
pub use split::{CODE_CLOSE, CODE_OPEN, MIN_CHUNK_LEN, WRAPPER_OVERHEAD, split, text_len};
pub use table::format_table;

use tracing::debug;

/// Parse markdown text into a document tree.
pub fn parse(markdown: &str) -> Document {
    parse_with_config(markdown, &Config::compiled_default())
}

/// Parse markdown text with the parser extensions chosen in `config`.
pub fn parse_with_config(markdown: &str, config: &Config) -> Document {
    parser::parse(markdown, &config.markdown)
}

/// Convert markdown to the restricted HTML dialect using default config.
pub fn markdown_to_html(markdown: &str) -> String {
    markdown_to_html_with_config(markdown, &Config::compiled_default())
}

/// Convert markdown to the restricted HTML dialect with custom config.
pub fn markdown_to_html_with_config(markdown: &str, config: &Config) -> String {
    if markdown.is_empty() {
        return String::new();
    }
    let document = parse_with_config(markdown, config);
    render(&document)
}

/// Convert markdown to chunks of at most `max_len` UTF-16 code units.
pub fn markdown_to_chunks(markdown: &str, max_len: usize) -> Result<Vec<String>> {
    let config = Config::compiled_default();
    chunks_for(markdown, max_len, &config)
}

/// Convert markdown to chunks sized for `config.transport.max_message_length`.
pub fn markdown_to_chunks_with_config(markdown: &str, config: &Config) -> Result<Vec<String>> {
    chunks_for(markdown, config.transport.max_message_length, config)
}

fn chunks_for(markdown: &str, max_len: usize, config: &Config) -> Result<Vec<String>> {
    let markup = markdown_to_html_with_config(markdown, config);
    let chunks = split(&markup, max_len)?;
    debug!(
        markdown_len = markdown.len(),
        markup_units = text_len(&markup),
        chunks = chunks.len(),
        max_len,
        "rendered markdown into chunks"
    );
    Ok(chunks)
}
