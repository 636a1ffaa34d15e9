//! CSS Style Attributes: style="..." attribute processing.
//! Reference: <https://www.w3.org/TR/css-style-attr/>
//!
//! Parsing, editing and serialization of inline declaration blocks, plus the
//! camelCase → kebab-case mapping used when style maps arrive in script form.

#![forbid(unsafe_code)]

use std::collections::HashMap;

/// A single CSS declaration parsed from a style attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name normalized to ASCII lowercase; custom properties keep their case.
    pub property: String,
    /// Raw value trimmed of surrounding ASCII whitespace and any `!important`.
    pub value: String,
    pub important: bool,
}

/// Parse the value of a `style` attribute into a list of declarations.
///
/// - Splits on semicolons that are outside parentheses and quotes.
/// - For each item, splits on the first colon into property and value.
/// - Skips empty or invalid items (no colon, empty property, or empty value).
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    let mut out: Vec<Declaration> = Vec::new();
    for raw_item in split_declarations(input) {
        let item = raw_item.trim_matches(is_ascii_whitespace);
        let Some((raw_prop, raw_value)) = item.split_once(':') else {
            continue;
        };
        let property_text = raw_prop.trim_matches(is_ascii_whitespace);
        let (value_text, important) = split_important(raw_value.trim_matches(is_ascii_whitespace));
        if property_text.is_empty() || value_text.is_empty() {
            continue;
        }
        out.push(Declaration {
            property: normalize_property(property_text),
            value: value_text.to_owned(),
            important,
        });
    }
    out
}

/// Parse into a map keyed by property name. Later duplicates win.
pub fn parse_style_attribute_into_map(input: &str) -> HashMap<String, String> {
    parse_style_attribute(input)
        .into_iter()
        .map(|decl| (decl.property, decl.value))
        .collect()
}

/// Keep only the last occurrence of each property, preserving the position
/// of that last occurrence.
pub fn normalize_style_attribute(input: &str) -> Vec<Declaration> {
    let declarations = parse_style_attribute(input);
    let mut last_index_for_property: HashMap<&str, usize> = HashMap::new();
    for (index, decl_item) in declarations.iter().enumerate() {
        last_index_for_property.insert(decl_item.property.as_str(), index);
    }
    let keep: Vec<bool> = declarations
        .iter()
        .enumerate()
        .map(|(index, decl_item)| last_index_for_property.get(decl_item.property.as_str()) == Some(&index))
        .collect();
    declarations
        .into_iter()
        .zip(keep)
        .filter_map(|(decl_item, kept)| kept.then_some(decl_item))
        .collect()
}

/// Serialize declarations the way `element.style.cssText` does: `a: b; c: d;`.
pub fn serialize_style_attribute(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|decl| {
            if decl.important {
                format!("{}: {} !important;", decl.property, decl.value)
            } else {
                format!("{}: {};", decl.property, decl.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Value of `property` in an inline declaration block, last occurrence wins.
pub fn get_property(input: &str, property: &str) -> Option<String> {
    let wanted = normalize_property(property);
    parse_style_attribute(input)
        .into_iter()
        .rev()
        .find(|decl| decl.property == wanted)
        .map(|decl| decl.value)
}

/// Set `property` in an inline declaration block, returning the new attribute
/// text. An existing declaration is replaced in place; otherwise the new one
/// is appended. An empty value removes the property.
pub fn set_property(input: &str, property: &str, value: &str) -> String {
    let wanted = normalize_property(property);
    let (value_text, important) = split_important(value.trim());
    if value_text.is_empty() {
        return remove_property(input, &wanted);
    }
    let mut declarations = normalize_style_attribute(input);
    let replacement = Declaration {
        property: wanted,
        value: value_text.to_owned(),
        important,
    };
    if let Some(existing) = declarations
        .iter_mut()
        .find(|decl| decl.property == replacement.property)
    {
        *existing = replacement;
    } else {
        declarations.push(replacement);
    }
    serialize_style_attribute(&declarations)
}

/// Remove every declaration of `property`, returning the new attribute text.
pub fn remove_property(input: &str, property: &str) -> String {
    let wanted = normalize_property(property);
    let declarations: Vec<Declaration> = normalize_style_attribute(input)
        .into_iter()
        .filter(|decl| decl.property != wanted)
        .collect();
    serialize_style_attribute(&declarations)
}

/// Convert a script-style property name (`backgroundColor`) to its CSS form
/// (`background-color`). Names that already contain a hyphen are returned
/// lowercased; custom properties are returned unchanged.
pub fn camel_to_kebab(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_owned();
    }
    if name.contains('-') {
        return name.to_ascii_lowercase();
    }
    if name == "cssFloat" {
        return "float".to_owned();
    }
    let mut out = String::with_capacity(name.len().saturating_add(4));
    for (index, character) in name.chars().enumerate() {
        if character.is_ascii_uppercase() {
            // `WebkitTransform` maps to the vendor-prefixed `-webkit-transform`.
            if index > 0 || matches!(name.get(..6), Some("Webkit")) {
                out.push('-');
            }
            out.push(character.to_ascii_lowercase());
        } else {
            out.push(character);
        }
    }
    out
}

/// ASCII whitespace per CSS Syntax (TAB, LF, FF, CR, SPACE).
const fn is_ascii_whitespace(character: char) -> bool {
    matches!(
        character,
        '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{000D}' | '\u{0020}'
    )
}

fn normalize_property(property: &str) -> String {
    let trimmed = property.trim();
    if trimmed.starts_with("--") {
        trimmed.to_owned()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

fn split_important(value: &str) -> (&str, bool) {
    if let Some(pos) = value.rfind('!')
        && value
            .get(pos.saturating_add(1)..)
            .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("important"))
    {
        return (value.get(..pos).unwrap_or_default().trim_end(), true);
    }
    (value, false)
}

/// Split a declaration block on `;` outside of parentheses and quotes.
fn split_declarations(input: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (index, character) in input.char_indices() {
        match (quote, character) {
            (Some(open), current) if current == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(character),
            (None, '(') => depth = depth.saturating_add(1),
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                items.push(input.get(start..index).unwrap_or_default());
                start = index.saturating_add(1);
            }
            _ => {}
        }
    }
    items.push(input.get(start..).unwrap_or_default());
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_urls_and_important() {
        let decls = parse_style_attribute(
            "background-image: url(\"data:image/png;base64,AA==\"); COLOR: red !important; bad; --Brand: #fff",
        );
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].value, "url(\"data:image/png;base64,AA==\")");
        assert_eq!(decls[1].property, "color");
        assert!(decls[1].important);
        assert_eq!(decls[2].property, "--Brand");
    }

    #[test]
    fn set_replaces_in_place_and_appends() {
        let text = set_property("color: red; padding: 1px", "color", "blue");
        assert_eq!(text, "color: blue; padding: 1px;");
        let text = set_property(&text, "margin", "0px");
        assert_eq!(text, "color: blue; padding: 1px; margin: 0px;");
        assert_eq!(set_property(&text, "color", ""), "padding: 1px; margin: 0px;");
        assert_eq!(get_property(&text, "PADDING"), Some("1px".to_owned()));
    }

    #[test]
    fn camel_case_names() {
        assert_eq!(camel_to_kebab("backgroundColor"), "background-color");
        assert_eq!(camel_to_kebab("borderTopLeftRadius"), "border-top-left-radius");
        assert_eq!(camel_to_kebab("padding"), "padding");
        assert_eq!(camel_to_kebab("font-size"), "font-size");
        assert_eq!(camel_to_kebab("WebkitTransform"), "-webkit-transform");
        assert_eq!(camel_to_kebab("--myVar"), "--myVar");
        assert_eq!(camel_to_kebab("cssFloat"), "float");
    }
}
