//! Convert document nodes to message blocks
//!
//! One converter per node kind. Paragraph-like content goes through the
//! phrasing accumulator, which merges runs of inline markup into a single
//! section and splits them around images.

use blockdown_core::{
    mrkdwn, plain_text_all, Block, ListItem, ListOptions, Node, Options, Phrasing, DEFAULT_BULLET,
};
use futures::future::join_all;
use tracing::debug;

use crate::admission::{admit, Probe};
use crate::html::extract_images;

/// Convert a node sequence, preserving order.
///
/// All nodes are converted concurrently; `join_all` hands results back in
/// input order regardless of which probe finishes first.
pub async fn convert<P: Probe>(nodes: &[Node], options: &Options, probe: &P) -> Vec<Block> {
    join_all(nodes.iter().map(|node| convert_node(node, options, probe)))
        .await
        .into_iter()
        .flatten()
        .collect()
}

/// Convert a single node to zero or more blocks
async fn convert_node<P: Probe>(node: &Node, options: &Options, probe: &P) -> Vec<Block> {
    match node {
        Node::Heading { content, .. } => vec![Block::header(&plain_text_all(content))],

        Node::Paragraph(content) => accumulate(content, probe).await,

        Node::Code { lang, text } => vec![code_block(lang.as_deref(), text)],

        Node::List { ordered, items } => vec![list_block(*ordered, items, &options.lists)],

        Node::Table { headers, rows } => vec![table_block(headers, rows)],

        Node::BlockQuote(children) => blockquote(children, probe).await,

        Node::ThematicBreak => vec![Block::divider()],

        Node::Html(raw) => html_images(raw, probe).await,

        Node::Image { url, text, title } => {
            if admit(probe, url).await.is_admitted() {
                vec![Block::image(url, non_empty(text).unwrap_or(url), title.as_deref())]
            } else {
                Vec::new()
            }
        }
    }
}

/// Section/image fold state: finished blocks plus the open section buffer
#[derive(Default)]
struct Accumulator {
    blocks: Vec<Block>,
    pending: Option<String>,
}

impl Accumulator {
    fn push_text(&mut self, text: &str) {
        self.pending.get_or_insert_with(String::new).push_str(text);
    }

    /// An image closes the open section even when it is not admitted
    fn push_image(&mut self, block: Option<Block>) {
        self.flush();
        self.blocks.extend(block);
    }

    fn flush(&mut self) {
        if let Some(text) = self.pending.take() {
            self.blocks.push(Block::section(&text));
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

/// Fold phrasing content into sections and admitted images
pub(crate) async fn accumulate<P: Probe>(content: &[Phrasing], probe: &P) -> Vec<Block> {
    let admissions = join_all(content.iter().map(|phrasing| async move {
        match phrasing {
            Phrasing::Image { url, .. } => admit(probe, url).await.is_admitted(),
            _ => false,
        }
    }))
    .await;

    let mut acc = Accumulator::default();
    for (phrasing, admitted) in content.iter().zip(admissions) {
        match phrasing {
            Phrasing::Image { alt, url, title } => {
                let alt_text = non_empty(alt)
                    .or_else(|| title.as_deref().and_then(non_empty))
                    .unwrap_or(url);
                acc.push_image(admitted.then(|| Block::image(url, alt_text, title.as_deref())));
            }
            other => acc.push_text(&mrkdwn(other)),
        }
    }
    acc.finish()
}

fn code_block(lang: Option<&str>, text: &str) -> Block {
    Block::section(&format!("```{}\n{}\n```", lang.unwrap_or(""), text))
}

fn list_block(ordered: bool, items: &[ListItem], lists: &ListOptions) -> Block {
    let lines: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let text = list_item_text(item);
            if ordered {
                format!("{}. {}", i + 1, text)
            } else if let Some(checked) = item.checked {
                format!("{}{}", lists.checkbox(checked), text)
            } else {
                format!("{}{}", DEFAULT_BULLET, text)
            }
        })
        .collect();

    Block::section(&lines.join("\n"))
}

/// Item markup with images dropped; raw text when there is no phrasing
fn list_item_text(item: &ListItem) -> String {
    if item.content.is_empty() {
        return item.text.clone();
    }

    item.content
        .iter()
        .filter(|phrasing| !phrasing.is_image())
        .map(mrkdwn)
        .collect()
}

fn table_block(headers: &[Vec<Phrasing>], rows: &[Vec<Vec<Phrasing>>]) -> Block {
    let mut out = String::from("```\n");

    push_row(headers.iter().map(|cell| cell_text(cell)), &mut out);
    push_row(headers.iter().map(|_| "---".to_string()), &mut out);
    for row in rows {
        push_row(row.iter().map(|cell| cell_text(cell)), &mut out);
    }

    out.push_str("```");
    Block::section(&out)
}

fn push_row(cells: impl Iterator<Item = String>, out: &mut String) {
    let cells: Vec<String> = cells.collect();
    out.push_str("| ");
    out.push_str(&cells.join(" | "));
    out.push_str(" |\n");
}

/// Cell fragments joined by single spaces; images become url, title or alt
fn cell_text(cell: &[Phrasing]) -> String {
    cell.iter()
        .map(|phrasing| match phrasing {
            Phrasing::Image { alt, url, title } => non_empty(url)
                .or_else(|| title.as_deref().and_then(non_empty))
                .unwrap_or(alt)
                .to_string(),
            other => mrkdwn(other),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote multi-line sections of every contained paragraph.
///
/// Single-line sections are left without the `> ` prefix.
async fn blockquote<P: Probe>(children: &[Node], probe: &P) -> Vec<Block> {
    let paragraphs = children.iter().filter_map(|child| match child {
        Node::Paragraph(content) => Some(accumulate(content, probe)),
        _ => None,
    });

    join_all(paragraphs)
        .await
        .into_iter()
        .flatten()
        .map(|mut block| {
            if block.is_section() && block.text().is_some_and(|t| t.contains('\n')) {
                block.map_section_text(|text| format!("> {}", text.replace('\n', "\n> ")));
            }
            block
        })
        .collect()
}

/// Admitted `img` tags of a raw HTML fragment
async fn html_images<P: Probe>(raw: &str, probe: &P) -> Vec<Block> {
    let tags = match extract_images(raw) {
        Ok(tags) => tags,
        Err(e) => {
            debug!(error = %e, "skipping raw html");
            return Vec::new();
        }
    };

    let candidates: Vec<_> = tags
        .into_iter()
        .filter_map(|tag| match tag.src.clone() {
            Some(src) => Some((src, tag)),
            None => {
                debug!("img without src");
                None
            }
        })
        .collect();

    let admissions = join_all(candidates.iter().map(|(src, _)| admit(probe, src))).await;

    candidates
        .iter()
        .zip(admissions)
        .filter(|(_, admission)| admission.is_admitted())
        .map(|((src, tag), _)| {
            let alt = tag.alt.as_deref().and_then(non_empty).unwrap_or(src);
            Block::image(src, alt, tag.title.as_deref())
        })
        .collect()
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StubProbe;

    fn text(s: &str) -> Phrasing {
        Phrasing::text(s)
    }

    fn image(url: &str) -> Phrasing {
        Phrasing::Image {
            alt: String::new(),
            url: url.to_string(),
            title: None,
        }
    }

    async fn run(nodes: &[Node], probe: &StubProbe) -> Vec<Block> {
        convert(nodes, &Options::default(), probe).await
    }

    #[tokio::test]
    async fn test_heading_is_plain_text() {
        let nodes = [Node::Heading {
            depth: 1,
            content: vec![text("Hello "), Phrasing::Strong(vec![text("World")])],
        }];
        assert_eq!(run(&nodes, &StubProbe::ok()).await, vec![Block::header("Hello World")]);
    }

    #[tokio::test]
    async fn test_adjacent_phrasing_merges() {
        let nodes = [Node::Paragraph(vec![
            text("Hello "),
            Phrasing::Strong(vec![text("bold")]),
            text(" and "),
            Phrasing::Code("code".to_string()),
        ])];
        assert_eq!(
            run(&nodes, &StubProbe::ok()).await,
            vec![Block::section("Hello *bold* and `code`")]
        );
    }

    #[tokio::test]
    async fn test_image_splits_paragraph() {
        let nodes = [Node::Paragraph(vec![
            text("Hello "),
            image("https://x/y.png"),
            text(" world"),
        ])];
        assert_eq!(
            run(&nodes, &StubProbe::ok()).await,
            vec![
                Block::section("Hello "),
                Block::image("https://x/y.png", "https://x/y.png", None),
                Block::section(" world"),
            ]
        );
    }

    #[tokio::test]
    async fn test_images_never_merge() {
        let nodes = [Node::Paragraph(vec![image("https://x/1.png"), image("https://x/2.png")])];
        let blocks = run(&nodes, &StubProbe::ok()).await;
        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| !b.is_section()));
    }

    #[tokio::test]
    async fn test_rejected_image_keeps_sections_apart() {
        let nodes = [Node::Paragraph(vec![
            text("Hello "),
            image("https://x/y.png"),
            text(" world"),
        ])];
        assert_eq!(
            run(&nodes, &StubProbe::status(404)).await,
            vec![Block::section("Hello "), Block::section(" world")]
        );
    }

    #[tokio::test]
    async fn test_paragraph_image_alt_fallbacks() {
        let nodes = [Node::Paragraph(vec![
            Phrasing::Image {
                alt: "Alt".to_string(),
                url: "https://x/a.png".to_string(),
                title: Some("Title".to_string()),
            },
            Phrasing::Image {
                alt: String::new(),
                url: "https://x/b.png".to_string(),
                title: Some("Title".to_string()),
            },
        ])];
        assert_eq!(
            run(&nodes, &StubProbe::ok()).await,
            vec![
                Block::image("https://x/a.png", "Alt", Some("Title")),
                Block::image("https://x/b.png", "Title", Some("Title")),
            ]
        );
    }

    #[tokio::test]
    async fn test_local_image_never_probed() {
        let probe = StubProbe::ok();
        let nodes = [Node::Paragraph(vec![image("file:///tmp/a.png"), image("C:\\a.png")])];
        assert!(run(&nodes, &probe).await.is_empty());
        assert!(probe.calls().is_empty());
    }

    #[tokio::test]
    async fn test_code_block_labeled() {
        let nodes = [
            Node::Code {
                lang: Some("rust".to_string()),
                text: "let x = 1;".to_string(),
            },
            Node::Code {
                lang: None,
                text: "plain".to_string(),
            },
        ];
        assert_eq!(
            run(&nodes, &StubProbe::ok()).await,
            vec![
                Block::section("```rust\nlet x = 1;\n```"),
                Block::section("```\nplain\n```"),
            ]
        );
    }

    #[test]
    fn test_ordered_list_numbering() {
        let items = vec![
            ListItem::new(vec![text("one")]),
            ListItem::new(vec![text("two")]),
            ListItem::new(vec![text("three")]),
        ];
        let block = list_block(true, &items, &ListOptions::default());
        assert_eq!(block, Block::section("1. one\n2. two\n3. three"));
    }

    #[test]
    fn test_unordered_list_bullets() {
        let items = vec![
            ListItem::new(vec![Phrasing::Emphasis(vec![text("a")])]),
            ListItem::new(vec![text("b")]),
        ];
        let block = list_block(false, &items, &ListOptions::default());
        assert_eq!(block, Block::section("• _a_\n• b"));
    }

    #[test]
    fn test_task_list_default_prefix() {
        let items = vec![
            ListItem::task(true, vec![text("done")]),
            ListItem::task(false, vec![text("todo")]),
        ];
        let block = list_block(false, &items, &ListOptions::default());
        assert_eq!(block, Block::section("• done\n• todo"));
    }

    #[test]
    fn test_task_list_custom_prefix() {
        let lists = ListOptions::with_checkbox_prefix(|checked| {
            if checked { "☑ " } else { "☐ " }.to_string()
        });
        let items = vec![
            ListItem::task(true, vec![text("done")]),
            ListItem::new(vec![text("plain")]),
            ListItem::task(false, vec![text("todo")]),
        ];
        let block = list_block(false, &items, &lists);
        assert_eq!(block, Block::section("☑ done\n• plain\n☐ todo"));
    }

    #[test]
    fn test_list_item_drops_images() {
        let items = vec![ListItem::new(vec![text("see "), image("https://x/a.png"), text("here")])];
        let block = list_block(false, &items, &ListOptions::default());
        assert_eq!(block, Block::section("• see here"));
    }

    #[test]
    fn test_list_item_raw_fallback() {
        let items = vec![ListItem::raw("raw text"), ListItem::default()];
        let block = list_block(true, &items, &ListOptions::default());
        assert_eq!(block, Block::section("1. raw text\n2. "));
    }

    #[test]
    fn test_table_two_columns() {
        let headers = vec![vec![text("A")], vec![text("B")]];
        let rows = vec![vec![vec![text("1")], vec![Phrasing::Strong(vec![text("2")])]]];
        let block = table_block(&headers, &rows);
        assert_eq!(
            block,
            Block::section("```\n| A | B |\n| --- | --- |\n| 1 | *2* |\n```")
        );

        let rendered = block.text().unwrap();
        let inner: Vec<&str> = rendered.lines().filter(|l| !l.starts_with("```")).collect();
        assert_eq!(inner.len(), 3);
    }

    #[test]
    fn test_table_cell_fragments() {
        let cell = vec![
            text("x"),
            Phrasing::Image {
                alt: "alt".to_string(),
                url: "https://x/a.png".to_string(),
                title: None,
            },
            Phrasing::Image {
                alt: "alt".to_string(),
                url: String::new(),
                title: Some("T".to_string()),
            },
            Phrasing::Image {
                alt: "alt".to_string(),
                url: String::new(),
                title: None,
            },
        ];
        assert_eq!(cell_text(&cell), "x https://x/a.png T alt");
    }

    #[tokio::test]
    async fn test_blockquote_multiline_prefixed() {
        let nodes = [Node::BlockQuote(vec![Node::Paragraph(vec![text("line one\nline two")])])];
        assert_eq!(
            run(&nodes, &StubProbe::ok()).await,
            vec![Block::section("> line one\n> line two")]
        );
    }

    #[tokio::test]
    async fn test_blockquote_single_line_unprefixed() {
        let nodes = [Node::BlockQuote(vec![
            Node::Paragraph(vec![text("only line")]),
            Node::ThematicBreak,
            Node::Paragraph(vec![text("a\nb")]),
        ])];
        assert_eq!(
            run(&nodes, &StubProbe::ok()).await,
            vec![Block::section("only line"), Block::section("> a\n> b")]
        );
    }

    #[tokio::test]
    async fn test_thematic_break() {
        assert_eq!(
            run(&[Node::ThematicBreak], &StubProbe::ok()).await,
            vec![Block::divider()]
        );
    }

    #[tokio::test]
    async fn test_top_level_image() {
        let nodes = [
            Node::Image {
                url: "https://x/a.png".to_string(),
                text: "A".to_string(),
                title: Some("T".to_string()),
            },
            Node::Image {
                url: "https://x/b.png".to_string(),
                text: String::new(),
                title: None,
            },
        ];
        assert_eq!(
            run(&nodes, &StubProbe::ok()).await,
            vec![
                Block::image("https://x/a.png", "A", Some("T")),
                Block::image("https://x/b.png", "https://x/b.png", None),
            ]
        );
    }

    #[tokio::test]
    async fn test_top_level_image_unreachable() {
        let nodes = [Node::Image {
            url: "https://x/a.png".to_string(),
            text: "A".to_string(),
            title: None,
        }];
        assert!(run(&nodes, &StubProbe::unreachable()).await.is_empty());
    }

    #[tokio::test]
    async fn test_slow_image_keeps_its_place_in_paragraph() {
        let probe = StubProbe::ok()
            .delayed("https://x/1.png", 60)
            .delayed("https://x/2.png", 30);
        let nodes = [
            Node::Paragraph(vec![
                image("https://x/1.png"),
                text("between"),
                image("https://x/2.png"),
                image("https://x/3.png"),
            ]),
            Node::Paragraph(vec![text("after")]),
        ];
        assert_eq!(
            run(&nodes, &probe).await,
            vec![
                Block::image("https://x/1.png", "https://x/1.png", None),
                Block::section("between"),
                Block::image("https://x/2.png", "https://x/2.png", None),
                Block::image("https://x/3.png", "https://x/3.png", None),
                Block::section("after"),
            ]
        );
    }

    #[cfg(feature = "html")]
    #[tokio::test]
    async fn test_raw_html_images() {
        let probe = StubProbe::ok().with("https://x/dead.png", 500);
        let nodes = [Node::Html(
            r#"<div>
                <img src="https://x/a.png" alt="A">
                <img alt="no src">
                <img src="file:///a.png">
                <img src="https://x/dead.png">
                <img src="https://x/b.png" title="B">
            </div>"#
                .to_string(),
        )];
        assert_eq!(
            run(&nodes, &probe).await,
            vec![
                Block::image("https://x/a.png", "A", None),
                Block::image("https://x/b.png", "https://x/b.png", Some("B")),
            ]
        );
        assert!(!probe.calls().iter().any(|url| url.starts_with("file:")));
    }

    #[tokio::test]
    async fn test_raw_html_without_images() {
        let nodes = [Node::Html("<p>hello</p>".to_string())];
        assert!(run(&nodes, &StubProbe::ok()).await.is_empty());
    }

    #[tokio::test]
    async fn test_order_preserved_across_async_nodes() {
        let probe = StubProbe::ok().delayed("https://x/first.png", 50);
        let nodes = [
            Node::Image {
                url: "https://x/first.png".to_string(),
                text: "first".to_string(),
                title: None,
            },
            Node::ThematicBreak,
            Node::Paragraph(vec![text("middle")]),
            Node::Image {
                url: "https://x/last.png".to_string(),
                text: "last".to_string(),
                title: None,
            },
        ];
        assert_eq!(
            run(&nodes, &probe).await,
            vec![
                Block::image("https://x/first.png", "first", None),
                Block::divider(),
                Block::section("middle"),
                Block::image("https://x/last.png", "last", None),
            ]
        );
    }
}
