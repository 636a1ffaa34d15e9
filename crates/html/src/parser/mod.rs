//! html5ever front end.
//!
//! html5ever builds an `RcDom`, which is then copied into the arena. Fragments
//! are parsed as the body of a throwaway document and their top-level nodes
//! appended under the requested parent.

use html5ever::tendril::TendrilSink as _;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::ParseOpts;
use indextree::NodeId;
use log::{debug, warn};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::dom::{Document, DomNode};

fn parse_opts() -> ParseOpts {
    ParseOpts {
        tree_builder: TreeBuilderOpts {
            exact_errors: false,
            scripting_enabled: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    }
}

fn parse_rcdom(html: &str) -> RcDom {
    html5ever::parse_document(RcDom::default(), parse_opts()).one(html)
}

/// Copy an rcdom subtree under `parent`.
fn copy_tree(handle: &Handle, doc: &mut Document, parent: NodeId) {
    let node = match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let mut element = DomNode::element(&name.local);
            element.attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            element
        }
        NodeData::Text { contents } => DomNode::text(&contents.borrow()),
        NodeData::Comment { contents } => DomNode::comment(contents),
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                copy_tree(child, doc, parent);
            }
            return;
        }
        NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => return,
    };
    let id = doc.create_node(node);
    if let Err(err) = doc.append_child(parent, id) {
        warn!("dropping parsed node: {err}");
        return;
    }
    for child in handle.children.borrow().iter() {
        copy_tree(child, doc, id);
    }
}

/// Parse a complete HTML document. Parsing never fails; malformed markup is
/// repaired the way browsers repair it.
pub fn parse_document(html: &str) -> Document {
    let rcdom = parse_rcdom(html);
    let mut doc = Document::new();
    let root = doc.root();
    copy_tree(&rcdom.document, &mut doc, root);
    debug!("parsed document with {} elements", doc.elements().len());
    doc
}

/// Parse `html` in body context and append the resulting nodes to `parent`.
/// Returns the top-level nodes that were inserted.
pub fn parse_fragment(doc: &mut Document, parent: NodeId, html: &str) -> Vec<NodeId> {
    let rcdom = parse_rcdom(&format!("<body>{html}"));
    let Some(body) = find_body(&rcdom.document) else {
        return Vec::new();
    };
    let before: Vec<NodeId> = doc.children(parent).collect();
    for child in body.children.borrow().iter() {
        copy_tree(child, doc, parent);
    }
    doc.children(parent)
        .filter(|child| !before.contains(child))
        .collect()
}

fn find_body(handle: &Handle) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data
        && &*name.local == "body"
    {
        return Some(Handle::clone(handle));
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(find_body)
}
