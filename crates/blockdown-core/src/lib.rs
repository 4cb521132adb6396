//! blockdown-core - document tree, message blocks and markup reducers
//!
//! This crate provides the data structures shared by the `blockdown`
//! converter: the document tree a markdown tokenizer produces, the message
//! blocks the converter emits, and the pure reducers that flatten phrasing
//! content to plain text or to the restricted markup dialect.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────┐    reducers    ┌────────────────┐
//! Markdown ──────▶ │ Node/Phrasing│ ─────────────▶ │ Block sequence │ ──▶ JSON
//!   tokenizer      └──────────────┘  + admission   └────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use blockdown_core::{mrkdwn_all, Block, Phrasing};
//!
//! let content = vec![
//!     Phrasing::Text("This is ".to_string()),
//!     Phrasing::Strong(vec![Phrasing::Text("bold".to_string())]),
//! ];
//!
//! assert_eq!(Block::section(&mrkdwn_all(&content)), Block::section("This is *bold*"));
//! ```

mod ast;
mod block;
mod options;
mod reduce;

pub use ast::{ListItem, Node, Phrasing};
pub use block::{
    Block, Text, HEADER_TEXT_LIMIT, IMAGE_ALT_LIMIT, IMAGE_TITLE_LIMIT, IMAGE_URL_LIMIT,
    SECTION_TEXT_LIMIT,
};
pub use options::{CheckboxPrefixFn, ListOptions, Options, DEFAULT_BULLET};
pub use reduce::{mrkdwn, mrkdwn_all, plain_text, plain_text_all, Fragments};
