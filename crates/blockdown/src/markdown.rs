//! Markdown source to document tree.
//!
//! Tokenizes markdown with pulldown-cmark and folds its event stream into
//! [`Node`]s. Only the constructs the converter renders are kept: footnotes,
//! definition lists, metadata and math are dropped, and list items keep just
//! their first text-bearing child.

use pulldown_cmark::{CodeBlockKind, Event, Options as ParserOptions, Parser, Tag, TagEnd};

use blockdown_core::{plain_text_all, ListItem, Node, Phrasing};

/// Parse markdown into top-level document nodes.
///
/// # Example
///
/// ```rust
/// use blockdown::{parse_markdown, Node, Phrasing};
///
/// let nodes = parse_markdown("Hello *world*");
/// assert_eq!(
///     nodes,
///     vec![Node::Paragraph(vec![
///         Phrasing::Text("Hello ".to_string()),
///         Phrasing::Emphasis(vec![Phrasing::Text("world".to_string())]),
///     ])]
/// );
/// ```
pub fn parse_markdown(source: &str) -> Vec<Node> {
    let options = ParserOptions::ENABLE_TABLES
        | ParserOptions::ENABLE_STRIKETHROUGH
        | ParserOptions::ENABLE_TASKLISTS;

    let mut builder = TreeBuilder::new();
    for event in Parser::new_ext(source, options) {
        builder.event(event);
    }
    builder.finish()
}

/// Block-level containers still being filled
enum Container {
    Root(Vec<Node>),
    BlockQuote(Vec<Node>),
    List {
        ordered: bool,
        items: Vec<ListItem>,
    },
    Item {
        checked: Option<bool>,
        content: Option<Vec<Phrasing>>,
        /// Text of the first block child that is not a paragraph
        raw: Option<String>,
    },
    Table {
        headers: Vec<Vec<Phrasing>>,
        rows: Vec<Vec<Vec<Phrasing>>>,
        row: Vec<Vec<Phrasing>>,
    },
}

/// Phrasing containers still being filled
enum FrameKind {
    Paragraph,
    Heading(u8),
    /// Text directly inside a tight list item
    ItemText,
    Cell,
    Strong,
    Emphasis,
    Strikethrough,
    Link { url: String, title: Option<String> },
    Image { url: String, title: Option<String> },
}

struct Frame {
    kind: FrameKind,
    children: Vec<Phrasing>,
}

struct TreeBuilder {
    containers: Vec<Container>,
    frames: Vec<Frame>,
    code: Option<(Option<String>, String)>,
    html: Option<String>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            containers: vec![Container::Root(Vec::new())],
            frames: Vec::new(),
            code: None,
            html: None,
        }
    }

    fn event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),

            Event::Text(text) => {
                if let Some((_, code)) = &mut self.code {
                    code.push_str(&text);
                } else if let Some(html) = &mut self.html {
                    html.push_str(&text);
                } else {
                    self.push_phrasing(Phrasing::Text(text.into_string()));
                }
            }

            Event::Code(code) => self.push_phrasing(Phrasing::Code(code.into_string())),

            Event::Html(html) => match &mut self.html {
                Some(buffer) => buffer.push_str(&html),
                None => self.push_node(Node::Html(html.into_string())),
            },

            Event::InlineHtml(html) => self.push_phrasing(Phrasing::Html(html.into_string())),

            Event::SoftBreak => self.push_phrasing(Phrasing::text("\n")),

            Event::HardBreak => self.push_phrasing(Phrasing::LineBreak),

            Event::Rule => self.push_node(Node::ThematicBreak),

            Event::TaskListMarker(checked) => {
                if let Some(Container::Item { checked: slot, .. }) = self.containers.last_mut() {
                    *slot = Some(checked);
                }
            }

            _ => {}
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => self.open(FrameKind::Paragraph),

            Tag::Heading { level, .. } => self.open(FrameKind::Heading(level as u8)),

            Tag::BlockQuote(_) => self.containers.push(Container::BlockQuote(Vec::new())),

            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((lang, String::new()));
            }

            Tag::HtmlBlock => self.html = Some(String::new()),

            Tag::List(first) => {
                self.close_item_text();
                self.containers.push(Container::List {
                    ordered: first.is_some(),
                    items: Vec::new(),
                });
            }

            Tag::Item => self.containers.push(Container::Item {
                checked: None,
                content: None,
                raw: None,
            }),

            Tag::Table(_) => self.containers.push(Container::Table {
                headers: Vec::new(),
                rows: Vec::new(),
                row: Vec::new(),
            }),

            Tag::TableCell => self.open(FrameKind::Cell),

            Tag::Emphasis => self.open(FrameKind::Emphasis),

            Tag::Strong => self.open(FrameKind::Strong),

            Tag::Strikethrough => self.open(FrameKind::Strikethrough),

            Tag::Link {
                dest_url, title, ..
            } => self.open(FrameKind::Link {
                url: dest_url.into_string(),
                title: non_empty(title.into_string()),
            }),

            Tag::Image {
                dest_url, title, ..
            } => self.open(FrameKind::Image {
                url: dest_url.into_string(),
                title: non_empty(title.into_string()),
            }),

            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if let Some(children) = self.close(|kind| matches!(kind, FrameKind::Paragraph)) {
                    match self.containers.last_mut() {
                        Some(Container::Item { content, .. }) => {
                            content.get_or_insert(children);
                        }
                        _ => self.push_node(Node::Paragraph(children)),
                    }
                }
            }

            TagEnd::Heading(_) => {
                let depth = match self.frames.last() {
                    Some(Frame {
                        kind: FrameKind::Heading(depth),
                        ..
                    }) => *depth,
                    _ => return,
                };
                if let Some(content) = self.close(|kind| matches!(kind, FrameKind::Heading(_))) {
                    self.push_node(Node::Heading { depth, content });
                }
            }

            TagEnd::BlockQuote(_) => {
                if let Some(Container::BlockQuote(children)) = self.pop_container() {
                    self.push_node(Node::BlockQuote(children));
                }
            }

            TagEnd::CodeBlock => {
                if let Some((lang, mut text)) = self.code.take() {
                    if text.ends_with('\n') {
                        text.pop();
                    }
                    self.push_node(Node::Code { lang, text });
                }
            }

            TagEnd::HtmlBlock => {
                if let Some(html) = self.html.take() {
                    self.push_node(Node::Html(html));
                }
            }

            TagEnd::List(_) => {
                if let Some(Container::List { ordered, items }) = self.pop_container() {
                    self.push_node(Node::List { ordered, items });
                }
            }

            TagEnd::Item => {
                self.close_item_text();
                if let Some(Container::Item {
                    checked,
                    content,
                    raw,
                }) = self.pop_container()
                {
                    let content = content.unwrap_or_default();
                    let text = if content.is_empty() {
                        raw.unwrap_or_default()
                    } else {
                        plain_text_all(&content)
                    };
                    let item = ListItem {
                        checked,
                        text,
                        content,
                    };
                    if let Some(Container::List { items, .. }) = self.containers.last_mut() {
                        items.push(item);
                    }
                }
            }

            TagEnd::TableHead => {
                if let Some(Container::Table { headers, row, .. }) = self.containers.last_mut() {
                    *headers = std::mem::take(row);
                }
            }

            TagEnd::TableRow => {
                if let Some(Container::Table { rows, row, .. }) = self.containers.last_mut() {
                    rows.push(std::mem::take(row));
                }
            }

            TagEnd::TableCell => {
                if let Some(cell) = self.close(|kind| matches!(kind, FrameKind::Cell)) {
                    if let Some(Container::Table { row, .. }) = self.containers.last_mut() {
                        row.push(cell);
                    }
                }
            }

            TagEnd::Table => {
                if let Some(Container::Table { headers, rows, .. }) = self.pop_container() {
                    self.push_node(Node::Table { headers, rows });
                }
            }

            TagEnd::Emphasis => self.close_inline(|kind| matches!(kind, FrameKind::Emphasis)),

            TagEnd::Strong => self.close_inline(|kind| matches!(kind, FrameKind::Strong)),

            TagEnd::Strikethrough => {
                self.close_inline(|kind| matches!(kind, FrameKind::Strikethrough))
            }

            TagEnd::Link => self.close_inline(|kind| matches!(kind, FrameKind::Link { .. })),

            TagEnd::Image => self.close_inline(|kind| matches!(kind, FrameKind::Image { .. })),

            _ => {}
        }
    }

    fn open(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            children: Vec::new(),
        });
    }

    /// Pop the innermost frame if it matches, returning its children
    fn close<F>(&mut self, is_kind: F) -> Option<Vec<Phrasing>>
    where
        F: Fn(&FrameKind) -> bool,
    {
        match self.frames.last() {
            Some(frame) if is_kind(&frame.kind) => self.frames.pop().map(|f| f.children),
            _ => None,
        }
    }

    /// Pop an inline container frame and push it into its parent
    fn close_inline<F>(&mut self, is_kind: F)
    where
        F: Fn(&FrameKind) -> bool,
    {
        let frame = match self.frames.last() {
            Some(frame) if is_kind(&frame.kind) => self.frames.pop(),
            _ => None,
        };
        let Some(Frame { kind, children }) = frame else {
            return;
        };

        let phrasing = match kind {
            FrameKind::Strong => Phrasing::Strong(children),
            FrameKind::Emphasis => Phrasing::Emphasis(children),
            FrameKind::Strikethrough => Phrasing::Strikethrough(children),
            FrameKind::Link { url, title } => Phrasing::Link {
                content: children,
                url,
                title,
            },
            FrameKind::Image { url, title } => Phrasing::Image {
                alt: plain_text_all(&children),
                url,
                title,
            },
            _ => return,
        };
        self.push_phrasing(phrasing);
    }

    /// Finish the implicit text frame of a tight list item
    fn close_item_text(&mut self) {
        if let Some(children) = self.close(|kind| matches!(kind, FrameKind::ItemText)) {
            if let Some(Container::Item { content, .. }) = self.containers.last_mut() {
                content.get_or_insert(children);
            }
        }
    }

    fn push_phrasing(&mut self, phrasing: Phrasing) {
        if self.frames.is_empty() && matches!(self.containers.last(), Some(Container::Item { .. }))
        {
            self.open(FrameKind::ItemText);
        }

        if let Some(frame) = self.frames.last_mut() {
            frame.children.push(phrasing);
        }
    }

    fn push_node(&mut self, node: Node) {
        self.close_item_text();
        match self.containers.last_mut() {
            Some(Container::Root(nodes)) | Some(Container::BlockQuote(nodes)) => nodes.push(node),
            // Blocks inside an item only supply its fallback text
            Some(Container::Item { raw, .. }) => {
                if raw.is_none() {
                    *raw = raw_text(&node);
                }
            }
            _ => {}
        }
    }

    fn pop_container(&mut self) -> Option<Container> {
        // The root container is never popped
        if self.containers.len() > 1 {
            self.containers.pop()
        } else {
            None
        }
    }

    fn finish(mut self) -> Vec<Node> {
        self.close_item_text();
        match self.containers.into_iter().next() {
            Some(Container::Root(nodes)) => nodes,
            _ => Vec::new(),
        }
    }
}

/// Fallback text of a block that ends up inside a list item
fn raw_text(node: &Node) -> Option<String> {
    match node {
        Node::Heading { content, .. } | Node::Paragraph(content) => Some(plain_text_all(content)),
        Node::Code { text, .. } => Some(text.clone()),
        Node::Html(raw) => Some(raw.trim_end().to_string()),
        _ => None,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
