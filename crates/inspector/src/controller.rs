//! Interaction Controller: turns page events, companion messages and store
//! changes into hover tracking, selection, pick mode and edits.

use std::sync::Arc;
use std::time::Instant;

use html::NodeId;
use log::{debug, info, trace, warn};
use page_handler::HtmlPage;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::time::{Instant as TimerInstant, sleep_until};

use crate::config::InspectorConfig;
use crate::edit::{self, AppliedEdit, EditDescriptor};
use crate::error::EditError;
use crate::messaging::{Message, MessageReceiver, MessageSender};
use crate::overlay::{OverlayRenderer, PanelModel};
use crate::palette::PaletteMiner;
use crate::record::{ElementRecord, PickedElement};
use crate::state::{ElementHandle, InspectMode, InspectionSession};
use crate::storage::{CURRENT_ELEMENT_KEY, INSPECT_ENABLED_KEY, SharedStore, StoreChange, inspect_enabled};

/// Id prefix reserved for Lens's own elements.
pub const UI_ID_PREFIX: &str = "lens-";
/// Class set on `<body>` while inspection is on.
pub const INSPECT_MODE_CLASS: &str = "lens-inspect-mode";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Up,
    Click,
    DoubleClick,
    ContextMenu,
}

/// Whether a pointer event may reach the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventDisposition {
    PassThrough,
    Suppressed,
}

/// Input coming from the hosted page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PageEvent {
    PointerMove { x: f64, y: f64 },
    Scroll { dx: f64, dy: f64 },
    Resize { width: f64, height: f64 },
    Pointer {
        kind: PointerEventKind,
        x: f64,
        y: f64,
        target: Option<NodeId>,
    },
}

pub type PageEventSender = mpsc::UnboundedSender<PageEvent>;
pub type PageEventReceiver = mpsc::UnboundedReceiver<PageEvent>;

/// One page's inspector. Owns the page while inspection runs.
pub struct Inspector {
    page: HtmlPage,
    session: InspectionSession,
    overlay: OverlayRenderer,
    store: Arc<dyn SharedStore>,
    outbound: MessageSender,
    panel: Option<PanelModel>,
}

impl Inspector {
    /// Attach to `page`, installing the overlay and applying the persisted
    /// inspect setting.
    pub fn new(
        page: HtmlPage,
        config: &InspectorConfig,
        store: Arc<dyn SharedStore>,
        outbound: MessageSender,
    ) -> Self {
        let palette = PaletteMiner::new(config.palette_cap, config.refresh_palette);
        let mut inspector = Self {
            page,
            session: InspectionSession::new(palette),
            overlay: OverlayRenderer::new(config.panel_offset, config.glow_duration()),
            store,
            outbound,
            panel: None,
        };
        inspector.overlay.install(&mut inspector.page);
        let enabled = inspect_enabled(inspector.store.as_ref());
        inspector.set_inspect_state(enabled);
        inspector
    }

    pub const fn page(&self) -> &HtmlPage {
        &self.page
    }

    pub const fn page_mut(&mut self) -> &mut HtmlPage {
        &mut self.page
    }

    pub fn into_page(self) -> HtmlPage {
        self.page
    }

    pub const fn session(&self) -> &InspectionSession {
        &self.session
    }

    pub const fn mode(&self) -> InspectMode {
        self.session.mode()
    }

    pub const fn overlay(&self) -> &OverlayRenderer {
        &self.overlay
    }

    /// Panel contents from the latest render, if the overlay is showing.
    pub const fn panel(&self) -> Option<&PanelModel> {
        self.panel.as_ref()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.session.selected(self.page.document())
    }

    pub fn last_hovered(&self) -> Option<NodeId> {
        self.session.last_hovered(self.page.document())
    }

    pub fn set_inspect_state(&mut self, enabled: bool) {
        self.session.inspect_enabled = enabled;
        info!("inspect mode {}", if enabled { "enabled" } else { "disabled" });
        let doc = self.page.document_mut();
        if let Some(body) = doc.body() {
            if enabled {
                doc.add_class(body, INSPECT_MODE_CLASS);
            } else {
                doc.remove_class(body, INSPECT_MODE_CLASS);
            }
        }
        if enabled {
            self.interact();
        } else {
            self.overlay.hide(&mut self.page);
            self.panel = None;
        }
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.session.pointer = Some((x, y));
        self.interact();
    }

    pub fn scroll(&mut self, dx: f64, dy: f64) {
        self.page.scroll_by(dx, dy);
        self.interact();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.page.resize(width, height);
        self.interact();
    }

    /// Hit-test at the last pointer position and refresh hover state and
    /// the overlay. Hits on Lens's own elements are ignored entirely.
    fn interact(&mut self) {
        if !self.session.inspect_enabled {
            return;
        }
        let Some((x, y)) = self.session.pointer else {
            return;
        };
        let Some(hit) = self.page.element_from_point(x, y) else {
            trace!("no element under the pointer");
            self.overlay.hide(&mut self.page);
            self.panel = None;
            return;
        };
        if self.is_own_ui(hit) {
            trace!("ignoring hit on inspector UI");
            return;
        }
        if self.last_hovered() != Some(hit) {
            self.session.last_hovered = Some(ElementHandle::new(hit));
            self.publish(hit);
        }
        self.panel = self
            .overlay
            .render(&mut self.page, Some(hit), (x, y), self.session.picking_for_ai);
    }

    fn is_own_ui(&self, node: NodeId) -> bool {
        self.page
            .document()
            .closest_with_id_prefix(node, UI_ID_PREFIX)
            .is_some()
    }

    /// Decide whether a pointer event reaches the page. Clicks select, or
    /// in pick mode capture the element for the assistant.
    pub fn pointer_event(
        &mut self,
        kind: PointerEventKind,
        x: f64,
        y: f64,
        target: Option<NodeId>,
    ) -> EventDisposition {
        if !self.session.inspect_enabled {
            return EventDisposition::PassThrough;
        }
        if target.is_some_and(|node| self.is_own_ui(node)) {
            return EventDisposition::PassThrough;
        }
        if kind != PointerEventKind::Click {
            return EventDisposition::Suppressed;
        }
        let Some(element) = self
            .page
            .element_from_point(x, y)
            .filter(|node| !self.is_own_ui(*node))
        else {
            return EventDisposition::Suppressed;
        };

        if self.session.picking_for_ai {
            self.session.picking_for_ai = false;
            let palette = self.session.palette.palette(&self.page);
            match PickedElement::capture(&self.page, element, &palette) {
                Some(picked) => self.outbound.send(Message::ElementPickedForAi {
                    element: Box::new(picked),
                }),
                None => debug!("picked node is not a capturable element"),
            }
            self.overlay.reset_pick_styling(&mut self.page);
            info!("element picked for the assistant");
            return EventDisposition::Suppressed;
        }

        self.session.selected = Some(ElementHandle::new(element));
        self.publish(element);
        self.overlay.flash_selection(&mut self.page, Instant::now());
        EventDisposition::Suppressed
    }

    /// Persist the element's record as `currentElement`.
    fn publish(&mut self, node: NodeId) {
        let palette = self.session.palette.palette(&self.page);
        let Some(record) = ElementRecord::capture(&self.page, node, &palette) else {
            return;
        };
        let stored = serde_json::to_value(&record)
            .map_err(|err| err.to_string())
            .and_then(|value| {
                self.store
                    .set(CURRENT_ELEMENT_KEY, value)
                    .map_err(|err| err.to_string())
            });
        if let Err(err) = stored {
            warn!("could not store current element: {err}");
        }
    }

    pub fn handle_message(&mut self, message: Message) {
        match message {
            Message::SetInspect { enabled } => self.set_inspect_state(enabled),
            Message::ApplyStyles { styles } => {
                let assignments: Vec<(String, String)> = styles
                    .into_iter()
                    .map(|(name, value)| (name, style_text(value)))
                    .collect();
                if let Err(err) = self.apply_styles(&assignments) {
                    warn!("applyStyles: {err}");
                }
            }
            Message::ApplyEdits { edits } => {
                if let Err(err) = self.apply_edits(&edits) {
                    warn!("applyEdits: {err}");
                }
            }
            Message::StartPickingForAi => {
                self.session.picking_for_ai = true;
                info!("picking an element for the assistant");
                self.set_inspect_state(true);
            }
            Message::ElementPickedForAi { .. } => {
                debug!("ignoring elementPickedForAI addressed to the page");
            }
        }
    }

    /// Assign raw inline styles on the implicit target and republish it.
    ///
    /// # Errors
    /// [`EditError::NoTarget`] when nothing is selected or hovered.
    pub fn apply_styles(&mut self, styles: &[(String, String)]) -> Result<NodeId, EditError> {
        let target = self
            .session
            .implicit_target(self.page.document())
            .ok_or(EditError::NoTarget)?;
        edit::apply_styles(&mut self.page, target, styles);
        self.publish(target);
        Ok(target)
    }

    /// Apply a structured edit and republish the element it changed.
    ///
    /// # Errors
    /// See [`edit::apply_edit`].
    pub fn apply_edits(&mut self, descriptor: &EditDescriptor) -> Result<AppliedEdit, EditError> {
        let implicit = self.session.implicit_target(self.page.document());
        let applied = edit::apply_edit(&mut self.page, descriptor, implicit)?;
        self.publish(applied.target);
        Ok(applied)
    }

    pub fn handle_store_change(&mut self, change: &StoreChange) {
        if change.key == INSPECT_ENABLED_KEY {
            self.set_inspect_state(is_truthy(&change.new_value));
        }
    }

    /// Clear the selection glow once its time is up.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.overlay.tick(&mut self.page, now)
    }

    pub fn handle_page_event(&mut self, event: PageEvent) -> Option<EventDisposition> {
        match event {
            PageEvent::PointerMove { x, y } => self.pointer_move(x, y),
            PageEvent::Scroll { dx, dy } => self.scroll(dx, dy),
            PageEvent::Resize { width, height } => self.resize(width, height),
            PageEvent::Pointer { kind, x, y, target } => {
                return Some(self.pointer_event(kind, x, y, target));
            }
        }
        None
    }

    /// Drive the inspector until the page event stream ends, then hand the
    /// inspector back. Messages, store changes and the glow timer are
    /// served in between.
    pub async fn run(mut self, mut events: PageEventReceiver, mut messages: MessageReceiver) -> Self {
        let mut changes = self.store.subscribe();
        let mut messages_open = true;
        let mut changes_open = true;
        loop {
            let glow = self.overlay.glow_deadline();
            let glow_timer = sleep_until(glow.map_or_else(TimerInstant::now, TimerInstant::from_std));
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if let Some(disposition) = self.handle_page_event(event) {
                            trace!("pointer event {disposition:?}");
                        }
                    }
                    None => break,
                },
                message = messages.recv(), if messages_open => match message {
                    Some(message) => self.handle_message(message),
                    None => messages_open = false,
                },
                change = changes.recv(), if changes_open => match change {
                    Ok(change) => self.handle_store_change(&change),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("missed {skipped} store changes");
                    }
                    Err(RecvError::Closed) => changes_open = false,
                },
                () = glow_timer, if glow.is_some() => {
                    self.tick(Instant::now());
                }
            }
        }
        self.overlay.hide(&mut self.page);
        self
    }
}

/// Text form of a raw style value; `null` clears the property.
fn style_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|num| num != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
