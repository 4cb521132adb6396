//! Document tree
//!
//! This module defines the nodes a markdown tokenizer hands to the converter.
//! Block-level constructs are [`Node`]s; text-level constructs nested inside
//! them are [`Phrasing`] nodes.

/// A top-level document node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Heading with depth (1-6) and phrasing content
    Heading { depth: u8, content: Vec<Phrasing> },

    /// Paragraph containing phrasing content
    Paragraph(Vec<Phrasing>),

    /// Code block with optional language tag
    Code { lang: Option<String>, text: String },

    /// List (ordered or unordered)
    List { ordered: bool, items: Vec<ListItem> },

    /// Table with a header row and body rows; every cell is a phrasing sequence
    Table {
        headers: Vec<Vec<Phrasing>>,
        rows: Vec<Vec<Vec<Phrasing>>>,
    },

    /// Block quote containing nested nodes
    BlockQuote(Vec<Node>),

    /// Thematic break (horizontal rule)
    ThematicBreak,

    /// Raw HTML block
    Html(String),

    /// Standalone image
    Image {
        url: String,
        text: String,
        title: Option<String>,
    },
}

/// A list item.
///
/// Only the first text-bearing child of an item is rendered, so the item
/// keeps that child's phrasing plus the raw source text as a fallback.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    /// `Some(true)` / `Some(false)` for task list items, `None` otherwise
    pub checked: Option<bool>,
    pub content: Vec<Phrasing>,
    pub text: String,
}

impl ListItem {
    pub fn new(content: Vec<Phrasing>) -> Self {
        let text = content.iter().map(Phrasing::raw_text).collect();
        Self {
            checked: None,
            content,
            text,
        }
    }

    /// An item with a task-list checkbox
    pub fn task(checked: bool, content: Vec<Phrasing>) -> Self {
        Self {
            checked: Some(checked),
            ..Self::new(content)
        }
    }

    /// An item that only has raw text and no parsed phrasing
    pub fn raw(text: &str) -> Self {
        Self {
            checked: None,
            content: Vec::new(),
            text: text.to_string(),
        }
    }
}

/// A phrasing (inline) node
#[derive(Debug, Clone, PartialEq)]
pub enum Phrasing {
    /// Plain text
    Text(String),

    /// Strong emphasis (bold)
    Strong(Vec<Phrasing>),

    /// Emphasis (italic)
    Emphasis(Vec<Phrasing>),

    /// Strike-through
    Strikethrough(Vec<Phrasing>),

    /// Inline code
    Code(String),

    /// Link with content, URL, and optional title
    Link {
        content: Vec<Phrasing>,
        url: String,
        title: Option<String>,
    },

    /// Image with alt text, URL, and optional title
    Image {
        alt: String,
        url: String,
        title: Option<String>,
    },

    /// Hard line break
    LineBreak,

    /// Raw inline HTML
    Html(String),
}

impl Phrasing {
    /// Shorthand for a text node
    pub fn text(text: &str) -> Self {
        Phrasing::Text(text.to_string())
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Phrasing::Image { .. })
    }

    /// Approximate source text of this node, without any markup.
    ///
    /// Used as the fallback text of list items.
    pub fn raw_text(&self) -> String {
        match self {
            Phrasing::Text(text) | Phrasing::Code(text) | Phrasing::Html(text) => text.clone(),
            Phrasing::Strong(inner)
            | Phrasing::Emphasis(inner)
            | Phrasing::Strikethrough(inner)
            | Phrasing::Link { content: inner, .. } => {
                inner.iter().map(Phrasing::raw_text).collect()
            }
            Phrasing::Image { alt, .. } => alt.clone(),
            Phrasing::LineBreak => "\n".to_string(),
        }
    }
}
