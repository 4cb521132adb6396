//! Message blocks
//!
//! The output side of the conversion. Blocks serialize to the JSON shape the
//! chat rendering API expects, e.g.
//! `{"type":"section","text":{"type":"mrkdwn","text":"*hi*"}}`.

use serde::Serialize;

/// Maximum characters of a section's markup text
pub const SECTION_TEXT_LIMIT: usize = 3000;
/// Maximum characters of a header's plain text
pub const HEADER_TEXT_LIMIT: usize = 150;
/// Maximum characters of an image URL
pub const IMAGE_URL_LIMIT: usize = 3000;
/// Maximum characters of an image's alt text
pub const IMAGE_ALT_LIMIT: usize = 2000;
/// Maximum characters of an image title
pub const IMAGE_TITLE_LIMIT: usize = 2000;

/// A text object inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    /// Text in the restricted markup dialect
    Mrkdwn { text: String },
    /// Unformatted text
    PlainText { text: String },
}

impl Text {
    pub fn as_str(&self) -> &str {
        match self {
            Text::Mrkdwn { text } | Text::PlainText { text } => text,
        }
    }
}

/// A single output block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        text: Text,
    },
    Header {
        text: Text,
    },
    Image {
        image_url: String,
        alt_text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<Text>,
    },
    Divider,
}

impl Block {
    /// Create a section block with markup text
    pub fn section(text: &str) -> Self {
        Block::Section {
            text: Text::Mrkdwn {
                text: truncate(text, SECTION_TEXT_LIMIT),
            },
        }
    }

    /// Create a header block with plain text
    pub fn header(text: &str) -> Self {
        Block::Header {
            text: Text::PlainText {
                text: truncate(text, HEADER_TEXT_LIMIT),
            },
        }
    }

    /// Create an image block
    pub fn image(url: &str, alt_text: &str, title: Option<&str>) -> Self {
        Block::Image {
            image_url: truncate(url, IMAGE_URL_LIMIT),
            alt_text: truncate(alt_text, IMAGE_ALT_LIMIT),
            title: title.map(|t| Text::PlainText {
                text: truncate(t, IMAGE_TITLE_LIMIT),
            }),
        }
    }

    /// Create a divider block
    pub fn divider() -> Self {
        Block::Divider
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Block::Section { .. })
    }

    /// The text of a section or header block
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Section { text } | Block::Header { text } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Rewrite the text of a section block in place; other blocks are untouched
    pub fn map_section_text<F>(&mut self, f: F)
    where
        F: FnOnce(&str) -> String,
    {
        if let Block::Section {
            text: Text::Mrkdwn { text },
        } = self
        {
            *text = truncate(&f(text), SECTION_TEXT_LIMIT);
        }
    }
}

/// Truncate to at most `limit` characters, on a char boundary
fn truncate(s: &str, limit: usize) -> String {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
