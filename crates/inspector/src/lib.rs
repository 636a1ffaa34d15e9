#![allow(
    clippy::module_name_repetitions,
    reason = "Public types are re-exported at the crate root under their full names"
)]

//! In-page side of Lens.
//!
//! The [`Inspector`] owns a hosted page and reacts to pointer input, scroll
//! and resize: it hit-tests the element under the pointer, samples its style
//! and assets into an [`ElementRecord`], draws the hover outline and floating
//! panel, and publishes the record to a [`SharedStore`]. Edits returned by the
//! assistant arrive as [`Message`]s and are applied by the [`edit`] module.

pub mod assets;
pub mod config;
pub mod controller;
pub mod edit;
pub mod error;
pub mod messaging;
pub mod overlay;
pub mod palette;
pub mod record;
pub mod state;
pub mod storage;
pub mod style;

pub use config::InspectorConfig;
pub use controller::{EventDisposition, Inspector, PageEvent, PointerEventKind};
pub use edit::{AppliedEdit, ClassEdits, EditDescriptor, Interpretation};
pub use error::{EditError, StoreError};
pub use messaging::{Message, MessageReceiver, MessageSender};
pub use overlay::{OverlayRenderer, PanelModel, PanelSection};
pub use palette::PaletteMiner;
pub use record::{AssetBundle, ElementRecord, PickedElement, StyleSnapshot, VideoAsset};
pub use state::{ElementHandle, InspectMode, InspectionSession};
pub use storage::{JsonFileStore, MemoryStore, SharedStore, StoreChange};
