use core::fmt;

use super::{Document, NodeKind};
use indextree::NodeId;

/// Elements that never have an end tag.
const VOID_ELEMENTS: [&str; 15] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text children are serialized without escaping.
const RAW_TEXT_ELEMENTS: [&str; 7] = [
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
];

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

impl Document {
    /// Serialize the node and its subtree as HTML.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Serialize the node's children as HTML.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_children(id, &mut out);
        out
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        let raw = self
            .tag_name(id)
            .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
        for child in self.children(id) {
            match self.kind(child) {
                Some(NodeKind::Text { text }) if raw => out.push_str(text),
                _ => self.write_node(child, out),
            }
        }
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Document => self.write_children(id, out),
            NodeKind::Text { text } => escape_text(text, out),
            NodeKind::Comment { text } => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element { tag } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &node.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                self.write_children(id, out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.outer_html(self.root()))
    }
}

/// Indented tree dump used in test failure output.
pub struct TreeDump<'doc>(pub &'doc Document);

impl fmt::Debug for TreeDump<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn fmt_node(
            doc: &Document,
            id: NodeId,
            formatter: &mut fmt::Formatter<'_>,
            depth: usize,
        ) -> fmt::Result {
            let indent = "  ".repeat(depth);
            match doc.kind(id) {
                Some(NodeKind::Document) => writeln!(formatter, "{indent}#document")?,
                Some(NodeKind::Element { tag }) => {
                    write!(formatter, "{indent}<{tag}")?;
                    for (name, value) in doc.attrs(id) {
                        write!(formatter, " {name}={value:?}")?;
                    }
                    writeln!(formatter, ">")?;
                }
                Some(NodeKind::Text { text }) => {
                    // Whitespace-only runs are noise in dumps.
                    if text.trim().is_empty() {
                        return Ok(());
                    }
                    writeln!(formatter, "{indent}{text:?}")?;
                }
                Some(NodeKind::Comment { text }) => writeln!(formatter, "{indent}<!--{text}-->")?,
                None => return Ok(()),
            }
            for child in doc.children(id) {
                fmt_node(doc, child, formatter, depth + 1)?;
            }
            Ok(())
        }

        fmt_node(self.0, self.0.root(), formatter, 0)
    }
}
