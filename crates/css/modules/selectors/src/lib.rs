//! Selectors Level 3: Element matching and specificity.
//! Reference: <https://www.w3.org/TR/selectors-3/>
//!
//! Supported subset:
//! - Type, universal, class, id and attribute selectors (all Level 3 operators)
//! - Structural pseudo-classes `:root`, `:first-child`, `:last-child`,
//!   `:only-child`, `:empty`, plus `:link` and `:not(<compound>)`
//! - User-action pseudo-classes (`:hover`, `:focus`, ...) parse but never match
//! - Combinators: descendant, child, adjacent sibling, general sibling
//!
//! Anything else (pseudo-elements, functional pseudo-classes other than
//! `:not`) makes the whole selector invalid, which drops the rule.

mod matcher;
mod parser;
mod specificity;

pub use matcher::{matches_complex, matches_compound, matches_selector_list};
pub use parser::{parse_complex_selector, parse_selector_list};
pub use specificity::{Specificity, specificity_of_complex, specificity_of_compound};

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// Parent element if any. The document node is not an element.
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling element, skipping text and comments.
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Next sibling element, skipping text and comments.
    fn next_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name as stored by the DOM.
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Returns Some(id) if the element has an id attribute, else None.
    fn element_id(&self, element: Self::Handle) -> Option<&str>;

    /// True if the element has the given class token (case-sensitive).
    fn has_class(&self, element: Self::Handle, class: &str) -> bool;

    /// Returns the attribute value if present.
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// True for the document element.
    fn is_root(&self, element: Self::Handle) -> bool {
        self.parent(element).is_none()
    }

    /// True when the element has no element or non-empty text children.
    fn is_empty(&self, element: Self::Handle) -> bool;
}

/// Attribute selector operators.
/// Attribute selectors (§6.3)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrOperator {
    /// `[name]`
    Exists,
    /// `[name=value]`
    Equals,
    /// `[name~=value]`
    Includes,
    /// `[name|=value]`
    DashMatch,
    /// `[name^=value]`
    Prefix,
    /// `[name$=value]`
    Suffix,
    /// `[name*=value]`
    Substring,
}

/// Pseudo-classes understood by the matcher.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Link,
    /// User-action or history state (`:hover`, `:visited`, ...). A static
    /// page is never in these states.
    Dynamic(String),
    /// `:not(<compound>)`
    Not(Box<CompoundSelector>),
}

/// Simple selectors.
/// §5, 6, 7, 8
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// Type selector; stored lowercase and matched ASCII case-insensitively.
    Type(String),
    Class(String),
    IdSelector(String),
    Attribute {
        name: String,
        operator: AttrOperator,
        value: String,
        case_insensitive: bool,
    },
    PseudoClass(PseudoClass),
    Universal,
}

/// A compound selector is a sequence of simple selectors (no combinators).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Combinators between compounds.
/// Combinators (§8)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// A complex selector is one or more compounds separated by combinators.
/// `rest` holds each combinator together with the compound to its right.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

/// A selector list separated by commas.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}
