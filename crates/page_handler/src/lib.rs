//! Page host for Lens.
//!
//! An [`HtmlPage`] owns one parsed document together with the stylesheets it
//! references, a style engine resolving computed values, externally supplied
//! element geometry, and the viewport and scroll state hit testing runs
//! against. Pages are built from markup in memory or loaded over `http(s)`
//! and `file` URLs.

pub mod config;
pub mod error;
pub mod layout;
pub mod state;
/// URL fetching for http, https and file schemes
pub mod url;

pub use config::PageConfig;
pub use error::PageError;
pub use layout::{LayoutMap, LayoutRect};
pub use state::{HtmlPage, StylesheetEntry};
