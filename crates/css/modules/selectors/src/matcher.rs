//! CSS selector matching engine.
//! Reference: <https://www.w3.org/TR/selectors-3/>
//!
//! Complex selectors are matched right to left with backtracking, so
//! `a b > c` finds any `b` ancestor whose parent chain satisfies `a`.

use crate::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, ElementAdapter, PseudoClass,
    SelectorList, SimpleSelector,
};

/// Match a selector list against an element.
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector_item| matches_complex(adapter, element, selector_item))
}

/// Match a complex selector against an element.
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    matches_from(adapter, element, sel, sel.rest.len())
}

/// Compound at `index` (0 is `sel.first`, `n` is `sel.rest[n - 1].1`) must
/// match `element`, and everything to its left must match relative to it.
fn matches_from<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
    index: usize,
) -> bool {
    let Some(left_index) = index.checked_sub(1) else {
        return matches_compound(adapter, element, &sel.first);
    };
    let Some((combinator, compound)) = sel.rest.get(left_index) else {
        return false;
    };
    if !matches_compound(adapter, element, compound) {
        return false;
    }
    match combinator {
        Combinator::Child => adapter
            .parent(element)
            .is_some_and(|parent| matches_from(adapter, parent, sel, left_index)),
        Combinator::AdjacentSibling => adapter
            .previous_sibling_element(element)
            .is_some_and(|sibling| matches_from(adapter, sibling, sel, left_index)),
        Combinator::Descendant => {
            let mut current = adapter.parent(element);
            while let Some(ancestor) = current {
                if matches_from(adapter, ancestor, sel, left_index) {
                    return true;
                }
                current = adapter.parent(ancestor);
            }
            false
        }
        Combinator::GeneralSibling => {
            let mut current = adapter.previous_sibling_element(element);
            while let Some(sibling) = current {
                if matches_from(adapter, sibling, sel, left_index) {
                    return true;
                }
                current = adapter.previous_sibling_element(sibling);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(adapter, element, simple))
}

fn matches_simple<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    simple: &SimpleSelector,
) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(type_name) => adapter.tag_name(element).eq_ignore_ascii_case(type_name),
        SimpleSelector::Class(class_name) => adapter.has_class(element, class_name),
        SimpleSelector::IdSelector(id_value) => adapter.element_id(element) == Some(id_value.as_str()),
        SimpleSelector::Attribute {
            name,
            operator,
            value,
            case_insensitive,
        } => adapter.attr(element, name).is_some_and(|actual| {
            if *case_insensitive {
                attr_matches(
                    *operator,
                    &actual.to_ascii_lowercase(),
                    &value.to_ascii_lowercase(),
                )
            } else {
                attr_matches(*operator, actual, value)
            }
        }),
        SimpleSelector::PseudoClass(pseudo) => matches_pseudo(adapter, element, pseudo),
    }
}

/// Attribute selectors (§6.3)
fn attr_matches(operator: AttrOperator, actual: &str, expected: &str) -> bool {
    match operator {
        AttrOperator::Exists => true,
        AttrOperator::Equals => actual == expected,
        AttrOperator::Includes => {
            !expected.is_empty() && actual.split_whitespace().any(|token| token == expected)
        }
        AttrOperator::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|tail| tail.starts_with('-'))
        }
        AttrOperator::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttrOperator::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttrOperator::Substring => !expected.is_empty() && actual.contains(expected),
    }
}

fn matches_pseudo<A: ElementAdapter>(adapter: &A, element: A::Handle, pseudo: &PseudoClass) -> bool {
    match pseudo {
        PseudoClass::Root => adapter.is_root(element),
        PseudoClass::FirstChild => adapter.previous_sibling_element(element).is_none(),
        PseudoClass::LastChild => adapter.next_sibling_element(element).is_none(),
        PseudoClass::OnlyChild => {
            adapter.previous_sibling_element(element).is_none()
                && adapter.next_sibling_element(element).is_none()
        }
        PseudoClass::Empty => adapter.is_empty(element),
        PseudoClass::Link => {
            matches!(adapter.tag_name(element), "a" | "area" | "link")
                && adapter.attr(element, "href").is_some()
        }
        PseudoClass::Dynamic(_) => false,
        PseudoClass::Not(inner) => !matches_compound(adapter, element, inner),
    }
}
