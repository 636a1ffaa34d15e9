//! Asset Extractor: images, vector graphics, videos, gradients and Lottie
//! payloads found in and under an element.

use html::{Document, NodeId};
use log::debug;
use page_handler::HtmlPage;

use crate::record::{AssetBundle, VideoAsset};

/// Script type Lottie payloads are embedded with.
const LOTTIE_SCRIPT_TYPE: &str = "application/json";

/// Collect the assets of `node`: the element itself first, then its
/// descendants, then embedded animation payloads it contains. `palette` is
/// attached as-is. No deduplication happens here.
pub fn extract(page: &HtmlPage, node: NodeId, palette: &[String]) -> AssetBundle {
    let mut bundle = AssetBundle {
        palette: palette.to_vec(),
        ..AssetBundle::default()
    };
    let doc = page.document();
    if !doc.is_connected(node) || !doc.is_element(node) {
        return bundle;
    }

    match doc.tag_name(node) {
        Some("img") => push_image(page, node, &mut bundle),
        Some("svg") => bundle.svgs.push(doc.outer_html(node)),
        Some("video") => push_video(page, node, &mut bundle),
        _ => {}
    }

    if let Some(style) = page.computed_style(node) {
        let background = style.property_value("background-image");
        if background != "none" && !background.is_empty() {
            if let Some(url) = first_url(&background) {
                bundle.images.push(page.resolve_url(url));
            } else if background.contains("-gradient(") {
                bundle.gradients.push(background);
            }
        }
    }

    let descendants = doc.descendant_elements(node);
    for element in &descendants {
        if doc.tag_name(*element) == Some("img") {
            push_image(page, *element, &mut bundle);
        }
    }
    for element in &descendants {
        if doc.tag_name(*element) == Some("svg") {
            bundle.svgs.push(doc.outer_html(*element));
        }
    }
    for element in &descendants {
        if doc.tag_name(*element) == Some("video") {
            push_video(page, *element, &mut bundle);
        }
    }

    bundle.lotties = lottie_payloads(doc, node);
    bundle
}

fn push_image(page: &HtmlPage, img: NodeId, bundle: &mut AssetBundle) {
    match page.document().attr(img, "src").map(str::trim) {
        Some(src) if !src.is_empty() => bundle.images.push(page.resolve_url(src)),
        _ => debug!("skipping <img> without a source"),
    }
}

/// Own `src` first, then the first nested `<source>` with one.
fn push_video(page: &HtmlPage, video: NodeId, bundle: &mut AssetBundle) {
    let doc = page.document();
    let non_empty = |node: NodeId| doc.attr(node, "src").map(str::trim).filter(|src| !src.is_empty());
    let src = non_empty(video).or_else(|| {
        doc.descendant_elements(video)
            .into_iter()
            .find(|child| doc.tag_name(*child) == Some("source"))
            .and_then(non_empty)
    });
    let Some(src) = src else {
        debug!("skipping <video> without a source");
        return;
    };
    let poster = doc
        .attr(video, "poster")
        .map(str::trim)
        .filter(|poster| !poster.is_empty())
        .map(|poster| page.resolve_url(poster));
    bundle.videos.push(VideoAsset {
        src: page.resolve_url(src),
        poster,
    });
}

/// Argument of the first `url(...)` in a background value, quotes stripped.
pub fn first_url(background: &str) -> Option<&str> {
    let start = background.find("url(")?;
    let rest = background.get(start.saturating_add(4)..)?;
    let end = rest.find(')')?;
    let inner = rest.get(..end)?.trim();
    Some(inner.trim_matches(|quote| quote == '"' || quote == '\''))
}

/// JSON scripts that look like Lottie animations and whose parent element
/// lies inside `owner`.
fn lottie_payloads(doc: &Document, owner: NodeId) -> Vec<String> {
    doc.elements()
        .into_iter()
        .filter(|script| {
            doc.tag_name(*script) == Some("script")
                && doc.attr(*script, "type") == Some(LOTTIE_SCRIPT_TYPE)
        })
        .filter_map(|script| {
            let text = doc.text_content(script);
            let is_lottie = text.contains("\"v\":") && text.contains("\"fr\":");
            let owned = doc
                .parent_element(script)
                .is_some_and(|parent| doc.contains(owner, parent));
            (is_lottie && owned).then_some(text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_url_strips_quotes() {
        assert_eq!(first_url(r#"url("a/b.png")"#), Some("a/b.png"));
        assert_eq!(first_url("url('x.svg'), linear-gradient(red, blue)"), Some("x.svg"));
        assert_eq!(first_url("linear-gradient(red, blue)"), None);
    }
}
