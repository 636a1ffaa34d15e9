//! Serializable snapshots shared with the companion surface.

use chrono::Utc;
use html::NodeId;
use page_handler::HtmlPage;
use serde::{Deserialize, Serialize};

use crate::assets;
use crate::style;

/// Longest inner-text excerpt kept in a record, in characters.
pub const INNER_TEXT_LIMIT: usize = 50;

/// Resolved visual properties of one element at one instant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSnapshot {
    pub color: String,
    pub background_color: String,
    pub font_family: String,
    pub font_size: String,
    pub padding: String,
    pub margin: String,
    pub border: String,
    pub border_radius: String,
    pub font_weight: String,
    pub line_height: String,
    pub display: String,
    pub width: String,
    pub height: String,
    pub margin_top: String,
    pub margin_right: String,
    pub margin_bottom: String,
    pub margin_left: String,
    pub background_image: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub src: String,
    pub poster: Option<String>,
}

/// Visual assets found in and under one element, plus the page palette.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetBundle {
    pub images: Vec<String>,
    pub svgs: Vec<String>,
    pub lotties: Vec<String>,
    pub gradients: Vec<String>,
    pub videos: Vec<VideoAsset>,
    pub palette: Vec<String>,
}

/// The unit persisted as `currentElement`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    pub tag_name: String,
    #[serde(default)]
    pub inner_text: String,
    pub styles: StyleSnapshot,
    pub assets: AssetBundle,
    /// Capture time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// A record captured in pick mode, carrying the element's full markup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickedElement {
    #[serde(flatten)]
    pub record: ElementRecord,
    #[serde(rename = "outerHTML")]
    pub outer_html: String,
}

impl ElementRecord {
    /// Sample a connected element; `None` for anything else.
    pub fn capture(page: &HtmlPage, node: NodeId, palette: &[String]) -> Option<Self> {
        let doc = page.document();
        if !doc.is_connected(node) {
            return None;
        }
        let tag_name = doc.tag_name(node)?.to_ascii_lowercase();
        Some(Self {
            tag_name,
            inner_text: doc.inner_text(node).chars().take(INNER_TEXT_LIMIT).collect(),
            styles: style::sample(page, node),
            assets: assets::extract(page, node, palette),
            timestamp: Utc::now().timestamp_millis(),
        })
    }
}

impl PickedElement {
    pub fn capture(page: &HtmlPage, node: NodeId, palette: &[String]) -> Option<Self> {
        let record = ElementRecord::capture(page, node, palette)?;
        Some(Self {
            record,
            outer_html: page.document().outer_html(node),
        })
    }
}
