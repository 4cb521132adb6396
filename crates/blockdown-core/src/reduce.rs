//! Phrasing reducers
//!
//! Flattens phrasing subtrees either to plain text (headings) or to the
//! restricted markup dialect used by section blocks:
//! `*bold*`, `_italic_`, `~strike~`, `` `code` `` and `<url|text>`.

use smallvec::SmallVec;

use crate::ast::Phrasing;

/// Plain-text fragments of one phrasing node; most nodes yield one or two
pub type Fragments = SmallVec<[String; 4]>;

/// Flatten a phrasing node to plain-text fragments.
///
/// Line breaks contribute nothing and images are replaced by their title,
/// or their URL when untitled.
pub fn plain_text(phrasing: &Phrasing) -> Fragments {
    let mut out = Fragments::new();
    push_plain_text(phrasing, &mut out);
    out
}

/// Plain text of a phrasing sequence, fragments joined without separator
pub fn plain_text_all(phrasings: &[Phrasing]) -> String {
    let mut out = Fragments::new();
    for phrasing in phrasings {
        push_plain_text(phrasing, &mut out);
    }
    out.concat()
}

fn push_plain_text(phrasing: &Phrasing, out: &mut Fragments) {
    match phrasing {
        Phrasing::Text(text) | Phrasing::Code(text) | Phrasing::Html(text) => {
            out.push(text.clone())
        }

        Phrasing::Strong(inner)
        | Phrasing::Emphasis(inner)
        | Phrasing::Strikethrough(inner)
        | Phrasing::Link { content: inner, .. } => {
            for child in inner {
                push_plain_text(child, out);
            }
        }

        Phrasing::Image { url, title, .. } => {
            out.push(title.clone().unwrap_or_else(|| url.clone()));
        }

        Phrasing::LineBreak => {}
    }
}

/// Reduce a phrasing node to markup
pub fn mrkdwn(phrasing: &Phrasing) -> String {
    let mut out = String::new();
    write_mrkdwn(phrasing, &mut out);
    out
}

/// Reduce a phrasing sequence to markup, concatenated
pub fn mrkdwn_all(phrasings: &[Phrasing]) -> String {
    let mut out = String::new();
    for phrasing in phrasings {
        write_mrkdwn(phrasing, &mut out);
    }
    out
}

fn write_mrkdwn(phrasing: &Phrasing, out: &mut String) {
    match phrasing {
        Phrasing::Text(text) => out.push_str(text),

        Phrasing::Strong(content) => wrap(content, "*", out),

        Phrasing::Emphasis(content) => wrap(content, "_", out),

        Phrasing::Strikethrough(content) => wrap(content, "~", out),

        Phrasing::Code(code) => {
            out.push('`');
            out.push_str(code);
            out.push('`');
        }

        // The trailing space keeps a following word from gluing onto the link
        Phrasing::Link { content, url, .. } => {
            out.push('<');
            out.push_str(url);
            out.push('|');
            for child in content {
                write_mrkdwn(child, out);
            }
            out.push_str("> ");
        }

        // Images become their own blocks one level up
        Phrasing::Image { .. } | Phrasing::LineBreak | Phrasing::Html(_) => {}
    }
}

fn wrap(content: &[Phrasing], delimiter: &str, out: &mut String) {
    out.push_str(delimiter);
    for child in content {
        write_mrkdwn(child, out);
    }
    out.push_str(delimiter);
}
