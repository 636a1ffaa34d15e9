use css_selectors::ElementAdapter;
use html::{Document, NodeId, NodeKind};

/// Selector-matching view over an arena document.
pub struct DomElements<'doc>(pub &'doc Document);

impl ElementAdapter for DomElements<'_> {
    type Handle = NodeId;

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.0.parent_element(element)
    }

    fn previous_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.0.previous_sibling_element(element)
    }

    fn next_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        self.0.next_sibling_element(element)
    }

    fn tag_name(&self, element: NodeId) -> &str {
        self.0.tag_name(element).unwrap_or_default()
    }

    fn element_id(&self, element: NodeId) -> Option<&str> {
        self.0.attr(element, "id")
    }

    fn has_class(&self, element: NodeId, class: &str) -> bool {
        self.0.has_class(element, class)
    }

    fn attr(&self, element: NodeId, name: &str) -> Option<&str> {
        self.0.attr(element, name)
    }

    fn is_root(&self, element: NodeId) -> bool {
        self.0.document_element() == Some(element)
    }

    fn is_empty(&self, element: NodeId) -> bool {
        self.0.children(element).all(|child| match self.0.kind(child) {
            Some(NodeKind::Text { text }) => text.is_empty(),
            Some(NodeKind::Element { .. }) => false,
            _ => true,
        })
    }
}
