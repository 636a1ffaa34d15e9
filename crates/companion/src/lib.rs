//! Companion surface for Lens.
//!
//! Holds everything that runs beside the inspected page rather than inside it:
//! the summary of the last published element, asset downloads, and the
//! assistant chat that turns natural-language requests into edit descriptors
//! through Gemini.

pub mod chat;
pub mod client;
pub mod config;
pub mod context;
pub mod downloads;
pub mod error;
pub mod prompt;
pub mod summary;
pub mod types;

pub use chat::{ChatMessage, ChatSession, ReplyOutcome, Sender};
pub use client::GeminiClient;
pub use config::AssistantConfig;
pub use context::{AttachedContext, ChipTarget, ContextChip, ImageAttachment};
pub use error::{AssistantError, DownloadError};
pub use summary::ElementSummary;
