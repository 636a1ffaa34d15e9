#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

//! Arena-backed HTML document used by the Lens page host.
//!
//! Documents are parsed with html5ever, stored in an `indextree` arena and
//! mutated in place. Node handles are plain `NodeId`s; a handle whose node has
//! been detached from the tree stays valid for the arena but is no longer
//! connected, see [`Document::is_connected`].

pub mod dom;
pub mod parser;

pub use dom::{Document, DomNode, NodeKind};
pub use indextree::NodeId;
pub use parser::{parse_document, parse_fragment};
