use indextree::{NodeError, NodeId};
use log::trace;

use super::{Document, DomNode, NodeKind};
use crate::parser::parse_fragment;

impl Document {
    /// Allocate a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena_mut().new_node(DomNode::element(tag))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.arena_mut().new_node(DomNode::text(text))
    }

    pub(crate) fn create_node(&mut self, node: DomNode) -> NodeId {
        self.arena_mut().new_node(node)
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// # Errors
    /// Returns an error when the append would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), NodeError> {
        let arena = self.arena_mut();
        child.detach(arena);
        parent.checked_append(child, arena)
    }

    /// Remove the node (and its subtree) from the tree. The handle stays
    /// allocated but [`Document::is_connected`] reports false afterwards.
    pub fn detach(&mut self, id: NodeId) {
        if self.node(id).is_none() {
            return;
        }
        trace!("detaching node {id:?}");
        id.detach(self.arena_mut());
    }

    /// Remove the node and its subtree and free their arena slots. Handles to
    /// any of them stop resolving, even once the slots are reused.
    pub fn remove(&mut self, id: NodeId) {
        if self.node(id).is_none() {
            return;
        }
        trace!("removing node {id:?}");
        id.remove_subtree(self.arena_mut());
    }

    pub fn remove_children(&mut self, id: NodeId) {
        let children: Vec<NodeId> = self.children(id).collect();
        for child in children {
            self.remove(child);
        }
    }

    /// Set or replace an attribute. Non-elements are left untouched.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if !self.is_element(id) {
            return;
        }
        let Some(node) = self.arena_mut().get_mut(id) else {
            return;
        };
        let attrs = &mut node.get_mut().attrs;
        if let Some(slot) = attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            value.clone_into(&mut slot.1);
        } else {
            attrs.push((name.to_owned(), value.to_owned()));
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if self.attr(id, name).is_none() {
            return;
        }
        if let Some(node) = self.arena_mut().get_mut(id) {
            node.get_mut()
                .attrs
                .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        }
    }

    /// Replace every child with a single text node (none when `text` is empty).
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if !matches!(self.kind(id), Some(NodeKind::Element { .. })) {
            if let Some(node) = self.arena_mut().get_mut(id)
                && let NodeKind::Text { text: data } | NodeKind::Comment { text: data } =
                    &mut node.get_mut().kind
            {
                text.clone_into(data);
            }
            return;
        }
        self.remove_children(id);
        if text.is_empty() {
            return;
        }
        let child = self.create_text(text);
        if let Err(err) = self.append_child(id, child) {
            log::warn!("failed to insert text node: {err}");
        }
    }

    /// Rendered-text setter; identical to [`Document::set_text_content`] here
    /// since line breaks are kept as literal characters.
    pub fn set_inner_text(&mut self, id: NodeId, text: &str) {
        self.set_text_content(id, text);
    }

    /// Replace the element's children with the parsed markup.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        if !self.is_element(id) {
            return;
        }
        self.remove_children(id);
        parse_fragment(self, id, html);
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let mut classes: Vec<String> = self.class_list(id).into_iter().map(str::to_owned).collect();
        if classes.iter().any(|existing| existing == class) {
            return;
        }
        classes.push(class.to_owned());
        self.set_attr(id, "class", &classes.join(" "));
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if !self.has_class(id, class) {
            return;
        }
        let remaining = self
            .class_list(id)
            .into_iter()
            .filter(|existing| *existing != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", &remaining);
    }

    /// Overwrite the whole `class` attribute.
    pub fn set_class_name(&mut self, id: NodeId, value: &str) {
        self.set_attr(id, "class", value);
    }
}
