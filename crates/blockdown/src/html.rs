//! Image extraction from raw HTML.
//!
//! Raw HTML nodes are best-effort: the only thing taken from them is their
//! `img` tags. Parsing uses scraper/html5ever when the `html` feature is
//! enabled; without it no images are found.

use crate::Result;

/// Attributes of one `img` tag
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageTag {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
}

/// Extract every `img` tag of an HTML fragment, in document order.
///
/// # Example
///
/// ```rust
/// use blockdown::html::extract_images;
///
/// let images = extract_images(r#"<p><img src="https://x/a.png" alt="A"></p>"#).unwrap();
/// assert_eq!(images[0].src.as_deref(), Some("https://x/a.png"));
/// ```
#[cfg(feature = "html")]
pub fn extract_images(raw: &str) -> Result<Vec<ImageTag>> {
    use scraper::{Html, Selector};

    use crate::BlockdownError;

    let fragment = Html::parse_fragment(raw);
    for error in &fragment.errors {
        tracing::trace!(%error, "html parse recovered");
    }

    let selector = Selector::parse("img").map_err(|e| BlockdownError::HtmlParse(e.to_string()))?;

    let images = fragment
        .select(&selector)
        .map(|element| {
            let element = element.value();
            ImageTag {
                src: element.attr("src").map(str::to_string),
                alt: element.attr("alt").map(str::to_string),
                title: element.attr("title").map(str::to_string),
            }
        })
        .collect();

    Ok(images)
}

#[cfg(not(feature = "html"))]
pub fn extract_images(_raw: &str) -> Result<Vec<ImageTag>> {
    Ok(Vec::new())
}
