//! CSS Cascading and Inheritance Level 4: Cascade, inheritance, and initial values.
//! Reference: <https://www.w3.org/TR/css-cascade-4/>

#![forbid(unsafe_code)]

use core::cmp::Ordering;
use css_selectors::Specificity;

/// Where a declaration came from.
/// Cascading origins (§6.2)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    UserAgent,
    User,
    Author,
}

/// Priority tuple used to order declarations in the cascade.
/// Cascade sorting order (§6.1)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CascadePriority {
    pub origin: Origin,
    pub important: bool,
    /// Declarations from a `style` attribute beat any selector.
    pub inline: bool,
    pub specificity: Specificity,
    /// Source order index, increasing with appearance across all sheets.
    pub source_order: u32,
}

impl CascadePriority {
    pub const fn new(
        origin: Origin,
        important: bool,
        specificity: Specificity,
        source_order: u32,
    ) -> Self {
        Self {
            origin,
            important,
            inline: false,
            specificity,
            source_order,
        }
    }

    /// Priority of a declaration in an element's `style` attribute.
    pub const fn inline(important: bool, source_order: u32) -> Self {
        Self {
            origin: Origin::Author,
            important,
            inline: true,
            specificity: Specificity(0, 0, 0),
            source_order,
        }
    }
}

/// Compare two `CascadePriority` values according to the cascade rules.
/// Returns `Ordering::Greater` if `left` should win over `right`.
pub fn compare_priority(left: &CascadePriority, right: &CascadePriority) -> Ordering {
    origin_importance_rank(left)
        .cmp(&origin_importance_rank(right))
        .then_with(|| left.inline.cmp(&right.inline))
        .then_with(|| left.specificity.cmp(&right.specificity))
        .then_with(|| left.source_order.cmp(&right.source_order))
}

/// Normal declarations rank UA < User < Author; important ones invert the
/// origin order and sit above every normal declaration.
const fn origin_importance_rank(priority: &CascadePriority) -> u8 {
    match (priority.important, priority.origin) {
        (false, Origin::UserAgent) => 0,
        (false, Origin::User) => 1,
        (false, Origin::Author) => 2,
        (true, Origin::Author) => 3,
        (true, Origin::User) => 4,
        (true, Origin::UserAgent) => 5,
    }
}

/// Properties inherited by default, among those the style engine tracks.
/// Custom properties always inherit.
pub fn is_inherited_property(property_name: &str) -> bool {
    property_name.starts_with("--")
        || matches!(
            property_name,
            "color"
                | "font-family"
                | "font-size"
                | "font-weight"
                | "font-style"
                | "line-height"
                | "letter-spacing"
                | "text-align"
                | "text-transform"
                | "visibility"
                | "cursor"
                | "white-space"
                | "pointer-events"
        )
}

/// Initial values, in the string form the style engine serializes.
/// Initial values (§7.1)
pub fn initial_value(property_name: &str) -> Option<&'static str> {
    Some(match property_name {
        "color" => "rgb(0, 0, 0)",
        "background-color" => "rgba(0, 0, 0, 0)",
        "background-image" => "none",
        "font-family" => "Times New Roman",
        "font-size" => "16px",
        "font-weight" => "400",
        "font-style" => "normal",
        "line-height" => "normal",
        "display" => "inline",
        "width" | "height" => "auto",
        "margin-top" | "margin-right" | "margin-bottom" | "margin-left" => "0px",
        "padding-top" | "padding-right" | "padding-bottom" | "padding-left" => "0px",
        "border-top-width" | "border-right-width" | "border-bottom-width"
        | "border-left-width" => "medium",
        "border-top-color" | "border-right-color" | "border-bottom-color"
        | "border-left-color" => "currentcolor",
        "border-top-style" | "border-right-style" | "border-bottom-style"
        | "border-left-style" => "none",
        "border-top-left-radius"
        | "border-top-right-radius"
        | "border-bottom-right-radius"
        | "border-bottom-left-radius" => "0px",
        "visibility" => "visible",
        "pointer-events" => "auto",
        "box-shadow" => "none",
        "transition" => "all",
        "opacity" => "1",
        _ => return None,
    })
}

/// Resolve a property's value via inheritance fallback.
///
/// Returns the declared value, the parent's value (if inherited), or the initial value.
/// Defaulting (§7)
pub fn inherit_property(
    property_name: &str,
    declared_value: Option<String>,
    parent_computed_value: Option<String>,
) -> Option<String> {
    match declared_value.as_deref() {
        Some("inherit") => parent_computed_value
            .or_else(|| initial_value(property_name).map(ToOwned::to_owned)),
        Some("initial") => initial_value(property_name).map(ToOwned::to_owned),
        Some("unset") | None => {
            if is_inherited_property(property_name) && parent_computed_value.is_some() {
                parent_computed_value
            } else {
                initial_value(property_name).map(ToOwned::to_owned)
            }
        }
        Some(_) => declared_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn important_and_inline_ordering() {
        let author = CascadePriority::new(Origin::Author, false, Specificity(1, 0, 0), 1);
        let inline = CascadePriority::inline(false, 0);
        let ua_important = CascadePriority::new(Origin::UserAgent, true, Specificity(0, 0, 1), 0);
        let author_important = CascadePriority::new(Origin::Author, true, Specificity(0, 0, 1), 2);
        assert_eq!(compare_priority(&inline, &author), Ordering::Greater);
        assert_eq!(compare_priority(&author_important, &inline), Ordering::Greater);
        assert_eq!(compare_priority(&ua_important, &author_important), Ordering::Greater);
    }

    #[test]
    fn defaulting_keywords() {
        let parent = Some("rgb(1, 2, 3)".to_owned());
        assert_eq!(
            inherit_property("color", None, parent.clone()),
            Some("rgb(1, 2, 3)".to_owned())
        );
        assert_eq!(
            inherit_property("padding-top", Some("inherit".to_owned()), Some("4px".to_owned())),
            Some("4px".to_owned())
        );
        assert_eq!(
            inherit_property("color", Some("initial".to_owned()), parent),
            Some("rgb(0, 0, 0)".to_owned())
        );
        assert_eq!(
            inherit_property("margin-top", None, Some("9px".to_owned())),
            Some("0px".to_owned())
        );
    }
}
