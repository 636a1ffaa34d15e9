//! Element geometry supplied from outside the page host.
//!
//! Lens does not lay pages out itself. Boxes arrive as page coordinates, either
//! set directly or described as JSON keyed by selector:
//!
//! ```json
//! [{ "selector": "#buy", "x": 40, "y": 120, "width": 160, "height": 44 }]
//! ```

use std::collections::HashMap;

use css::query_selector;
use html::{Document, NodeId};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::PageError;

/// Border box of an element, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Edges are inclusive, like `elementFromPoint` on a box boundary.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

#[derive(Deserialize)]
struct LayoutEntry {
    selector: String,
    #[serde(flatten)]
    rect: LayoutRect,
}

/// Page-coordinate boxes keyed by element.
#[derive(Clone, Debug, Default)]
pub struct LayoutMap {
    rects: HashMap<NodeId, LayoutRect>,
}

impl LayoutMap {
    /// Build a map from a JSON list of `{selector, x, y, width, height}`.
    /// Entries whose selector matches nothing are skipped.
    ///
    /// # Errors
    /// Returns [`PageError::Layout`] when the JSON does not have that shape.
    pub fn from_json(doc: &Document, json: &str) -> Result<Self, PageError> {
        let entries: Vec<LayoutEntry> = serde_json::from_str(json)?;
        let mut map = Self::default();
        for entry in entries {
            match query_selector(doc, &entry.selector) {
                Some(node) => map.set(node, entry.rect),
                None => debug!("layout entry `{}` matches no element", entry.selector),
            }
        }
        Ok(map)
    }

    pub fn set(&mut self, node: NodeId, rect: LayoutRect) {
        self.rects.insert(node, rect);
    }

    pub fn get(&self, node: NodeId) -> Option<LayoutRect> {
        self.rects.get(&node).copied()
    }

    pub fn remove(&mut self, node: NodeId) -> Option<LayoutRect> {
        self.rects.remove(&node)
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::parse_document;

    #[test]
    fn json_entries_bind_to_matching_elements() {
        let doc = parse_document(r#"<body><button id="buy">Buy</button></body>"#);
        let json = r##"[
            {"selector": "#buy", "x": 10, "y": 20, "width": 100, "height": 40},
            {"selector": "#gone", "x": 0, "y": 0, "width": 1, "height": 1}
        ]"##;
        let map = LayoutMap::from_json(&doc, json).unwrap_or_default();
        assert_eq!(map.len(), 1);
        let rect = doc.get_element_by_id("buy").and_then(|buy| map.get(buy));
        assert_eq!(rect, Some(LayoutRect::new(10.0, 20.0, 100.0, 40.0)));
        assert!(matches!(LayoutMap::from_json(&doc, "{}"), Err(_)));
    }

    #[test]
    fn containment_is_edge_inclusive() {
        let rect = LayoutRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(10.0, 10.0));
        assert!(!rect.contains(10.5, 3.0));
        assert_eq!(rect.translated(-2.0, 5.0).y, 5.0);
    }
}
