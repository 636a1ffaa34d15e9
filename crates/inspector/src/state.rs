//! Per-page inspection session.

use html::{Document, NodeId};

use crate::palette::PaletteMiner;

/// Which interaction mode the page is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InspectMode {
    Disabled,
    Idle,
    Picking,
}

/// Non-owning reference to a page element. The element may be removed from
/// the page at any time, so every use goes through [`ElementHandle::resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementHandle(NodeId);

impl ElementHandle {
    pub const fn new(node: NodeId) -> Self {
        Self(node)
    }

    /// The element if it is still connected to `doc`.
    pub fn resolve(self, doc: &Document) -> Option<NodeId> {
        (doc.is_connected(self.0) && doc.is_element(self.0)).then_some(self.0)
    }
}

/// Mutable state of one inspection session.
#[derive(Debug)]
pub struct InspectionSession {
    pub inspect_enabled: bool,
    pub picking_for_ai: bool,
    pub last_hovered: Option<ElementHandle>,
    pub selected: Option<ElementHandle>,
    /// Last known pointer position in viewport coordinates; unknown until
    /// the first pointer move.
    pub pointer: Option<(f64, f64)>,
    pub palette: PaletteMiner,
}

impl InspectionSession {
    pub const fn new(palette: PaletteMiner) -> Self {
        Self {
            inspect_enabled: true,
            picking_for_ai: false,
            last_hovered: None,
            selected: None,
            pointer: None,
            palette,
        }
    }

    pub const fn mode(&self) -> InspectMode {
        match (self.inspect_enabled, self.picking_for_ai) {
            (false, _) => InspectMode::Disabled,
            (true, false) => InspectMode::Idle,
            (true, true) => InspectMode::Picking,
        }
    }

    pub fn selected(&self, doc: &Document) -> Option<NodeId> {
        self.selected.and_then(|handle| handle.resolve(doc))
    }

    pub fn last_hovered(&self, doc: &Document) -> Option<NodeId> {
        self.last_hovered.and_then(|handle| handle.resolve(doc))
    }

    /// Target for edits that name no selector: the selection, else the
    /// last hovered element. Detached elements are skipped.
    pub fn implicit_target(&self, doc: &Document) -> Option<NodeId> {
        self.selected(doc).or_else(|| self.last_hovered(doc))
    }
}
