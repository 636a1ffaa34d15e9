//! `querySelector` / `querySelectorAll` over a document.

use css_selectors::{matches_selector_list, parse_selector_list};
use html::{Document, NodeId};

use crate::adapter::DomElements;

/// Every connected element matching `selector`, in tree order.
/// `None` when the selector does not parse.
pub fn query_selector_all(doc: &Document, selector: &str) -> Option<Vec<NodeId>> {
    let list = parse_selector_list(selector)?;
    let adapter = DomElements(doc);
    Some(
        doc.elements()
            .into_iter()
            .filter(|element| matches_selector_list(&adapter, *element, &list))
            .collect(),
    )
}

/// First element matching `selector`; invalid selectors match nothing.
pub fn query_selector(doc: &Document, selector: &str) -> Option<NodeId> {
    query_selector_all(doc, selector)?.into_iter().next()
}
