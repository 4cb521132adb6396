//! BlocksService - the main entry point for document to block conversion.

use blockdown_core::{Block, Node, Options};

use crate::admission::{HttpProbe, Probe};

/// The main service for converting document trees to message blocks
pub struct BlocksService<P = HttpProbe> {
    options: Options,
    probe: P,
}

impl BlocksService<HttpProbe> {
    /// Create a new BlocksService with default options and an HTTP probe
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Create a BlocksService with custom options and an HTTP probe
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            probe: HttpProbe::new(),
        }
    }
}

impl<P: Probe> BlocksService<P> {
    /// Create a BlocksService that checks image liveness with `probe`
    pub fn with_probe(options: Options, probe: P) -> Self {
        Self { options, probe }
    }

    /// Convert document nodes to blocks, in input order.
    ///
    /// Never fails: malformed nodes, rejected images and unparseable raw
    /// HTML just produce fewer blocks.
    pub async fn convert(&self, nodes: &[Node]) -> Vec<Block> {
        crate::convert::convert(nodes, &self.options, &self.probe).await
    }

    /// Tokenize markdown and convert it
    #[cfg(feature = "markdown")]
    pub async fn convert_markdown(&self, source: &str) -> Vec<Block> {
        let nodes = crate::markdown::parse_markdown(source);
        self.convert(&nodes).await
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }
}

impl Default for BlocksService<HttpProbe> {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert document nodes with the default HTTP probe.
///
/// Outside a tokio runtime no image can be checked, so every image is left out.
pub async fn convert(nodes: &[Node], options: &Options) -> Vec<Block> {
    crate::convert::convert(nodes, options, &HttpProbe::new()).await
}
