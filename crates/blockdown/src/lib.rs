//! # blockdown
//!
//! Convert markdown document trees to chat message blocks.
//!
//! Headings become header blocks, lists, tables, code and quotes become
//! section blocks in the restricted markup dialect (`*bold*`, `_italic_`,
//! `~strike~`, `<url|text>`), rules become dividers, and images become
//! image blocks once they pass the admission gates.
//!
//! ## Design
//!
//! The converter never fails. Unusable input produces fewer blocks:
//!
//! - **Images are checked**: only absolute `http`/`https` URLs that answer a
//!   liveness probe with a status below 400 are kept
//! - **Raw HTML is best-effort**: only its `img` tags are used, and a fragment
//!   that cannot be parsed yields nothing
//! - **Order is preserved**: nodes are converted concurrently but results are
//!   concatenated in input order
//!
//! ## Example (Node-based)
//!
//! ```rust,no_run
//! use blockdown::{BlocksService, Block, Node, Phrasing};
//!
//! # async fn run() {
//! let service = BlocksService::new();
//!
//! let nodes = vec![Node::Heading {
//!     depth: 1,
//!     content: vec![Phrasing::Text("Hello World".to_string())],
//! }];
//!
//! let blocks = service.convert(&nodes).await;
//! assert_eq!(blocks, vec![Block::header("Hello World")]);
//! # }
//! ```
//!
//! ## Example (markdown string)
//!
//! ```rust,no_run
//! use blockdown::BlocksService;
//!
//! # async fn run() {
//! let service = BlocksService::new();
//! let blocks = service.convert_markdown("# Hello World").await;
//! assert_eq!(blocks.len(), 1);
//! # }
//! ```

pub mod admission;
mod convert;
pub mod html;
#[cfg(feature = "markdown")]
pub mod markdown;
mod service;
#[cfg(test)]
mod test_utils;

pub use admission::{
    admit, check_url, Admission, HttpProbe, Probe, ProbeConfig, ProbeError, Rejection,
};
pub use blockdown_core::{
    mrkdwn, plain_text, Block, ListItem, ListOptions, Node, Options, Phrasing, Text,
};
#[cfg(feature = "markdown")]
pub use markdown::parse_markdown;
pub use service::{convert, BlocksService};

/// Error type for blockdown operations
#[derive(Debug, thiserror::Error)]
pub enum BlockdownError {
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
}

pub type Result<T> = std::result::Result<T, BlockdownError>;
