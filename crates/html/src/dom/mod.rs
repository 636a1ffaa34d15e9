mod printing;
mod updating;

pub use printing::TreeDump;

use indextree::{Arena, NodeId};
use smallvec::SmallVec;

/// Element names whose text never contributes to rendered text.
const NON_RENDERED_TEXT_TAGS: [&str; 5] = ["script", "style", "template", "noscript", "head"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<[(String, String); 4]>,
}

impl DomNode {
    pub fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_owned(),
            },
            attrs: SmallVec::new(),
        }
    }

    pub fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            attrs: SmallVec::new(),
        }
    }

    pub fn comment(text: &str) -> Self {
        Self {
            kind: NodeKind::Comment {
                text: text.to_owned(),
            },
            attrs: SmallVec::new(),
        }
    }
}

/// A parsed HTML document.
///
/// Every mutation bumps [`Document::generation`], which lets observers notice
/// that anything they derived from the tree may be out of date.
#[derive(Debug)]
pub struct Document {
    arena: Arena<DomNode>,
    root: NodeId,
    generation: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the document node.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::default());
        Self {
            arena,
            root,
            generation: 0,
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn node(&self, id: NodeId) -> Option<&DomNode> {
        self.arena.get(id).map(indextree::Node::get)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    /// Tag name as parsed (lowercase for HTML elements), `None` for non-elements.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { tag } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.tag_name(id).is_some()
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?
            .attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        self.node(id).map_or(&[], |node| node.attrs.as_slice())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id)?.parent()
    }

    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|parent| self.is_element(*parent))
    }

    /// `id` when it still names a live node; freed slots may have been reused.
    fn live(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).map(|_| id)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.live(id)
            .into_iter()
            .flat_map(move |id| id.children(&self.arena))
    }

    /// Nodes currently allocated in the arena, attached or not.
    pub fn allocated_nodes(&self) -> usize {
        self.arena.iter().filter(|node| !node.is_removed()).count()
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|child| self.is_element(*child))
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.element_children(id).next()
    }

    pub fn previous_sibling_element(&self, id: NodeId) -> Option<NodeId> {
        id.preceding_siblings(&self.arena)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    pub fn next_sibling_element(&self, id: NodeId) -> Option<NodeId> {
        id.following_siblings(&self.arena)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root).next()
    }

    pub fn head(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|child| self.tag_name(*child) == Some("head"))
    }

    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|child| self.tag_name(*child) == Some("body"))
    }

    /// Inclusive element ancestors of `id`, nearest first.
    pub fn ancestor_elements(&self, id: NodeId) -> Vec<NodeId> {
        if self.arena.get(id).is_none() {
            return Vec::new();
        }
        id.ancestors(&self.arena)
            .filter(|node| self.is_element(*node))
            .collect()
    }

    /// Element descendants of `id` in tree order, excluding `id` itself.
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.live(id)
            .into_iter()
            .flat_map(|id| id.descendants(&self.arena).skip(1))
            .filter(|node| self.is_element(*node))
            .collect()
    }

    /// Every connected element in tree order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendant_elements(self.root)
    }

    /// Tree-inclusive containment: true when `node` is `ancestor` or lies below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if self.arena.get(node).is_none() {
            return false;
        }
        node.ancestors(&self.arena).any(|candidate| candidate == ancestor)
    }

    /// Whether the node is still attached to this document's tree.
    pub fn is_connected(&self, id: NodeId) -> bool {
        !id.is_removed(&self.arena) && self.contains(self.root, id)
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|node| self.attr(*node, "id") == Some(element_id))
    }

    pub fn class_list(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|classes| classes.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.class_list(id).contains(&class)
    }

    /// Nearest inclusive ancestor element whose `id` attribute starts with `prefix`.
    pub fn closest_with_id_prefix(&self, id: NodeId, prefix: &str) -> Option<NodeId> {
        let id = self.live(id)?;
        id.ancestors(&self.arena).find(|node| {
            self.is_element(*node)
                && self
                    .attr(*node, "id")
                    .is_some_and(|value| value.starts_with(prefix))
        })
    }

    /// Concatenated data of every text descendant.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let Some(id) = self.live(id) else {
            return out;
        };
        for node in id.descendants(&self.arena) {
            if let Some(NodeKind::Text { text }) = self.kind(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Approximation of rendered text: skips non-rendered subtrees and
    /// collapses whitespace runs to single spaces.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut raw = String::new();
        self.collect_rendered_text(id, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_rendered_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text { text }) => out.push_str(text),
            Some(NodeKind::Element { tag }) if NON_RENDERED_TEXT_TAGS.contains(&tag.as_str()) => {}
            Some(NodeKind::Element { tag }) if tag == "br" => out.push(' '),
            Some(_) => {
                for child in self.children(id) {
                    self.collect_rendered_text(child, out);
                }
            }
            None => {}
        }
    }

    pub(crate) fn arena_mut(&mut self) -> &mut Arena<DomNode> {
        self.generation = self.generation.wrapping_add(1);
        &mut self.arena
    }
}
