//! Edit Interpreter: turns assistant replies into structured page edits.

use css_style_attr::{camel_to_kebab, set_property};
use html::NodeId;
use log::{debug, warn};
use page_handler::HtmlPage;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::EditError;

/// Class-list changes, applied add, then remove, then replace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassEdits {
    #[serde(deserialize_with = "scalar_text")]
    pub add: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub remove: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub replace: Option<String>,
}

/// Structured edit request. JSON `null` counts as absent, except for `text`
/// and `html` where it clears the content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditDescriptor {
    #[serde(deserialize_with = "scalar_text", skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<Map<String, Value>>,
    #[serde(deserialize_with = "clearing_text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(deserialize_with = "clearing_text", skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<ClassEdits>,
}

impl EditDescriptor {
    /// Whether the descriptor asks for any change at all.
    pub const fn has_edits(&self) -> bool {
        self.styles.is_some() || self.text.is_some() || self.html.is_some() || self.classes.is_some()
    }

    /// Style assignments worth applying: empty strings, `0`, `false` and
    /// `null` are dropped, numbers are stringified.
    pub fn style_assignments(&self) -> Vec<(String, String)> {
        let Some(styles) = &self.styles else {
            return Vec::new();
        };
        styles
            .iter()
            .filter_map(|(name, value)| Some((name.clone(), style_value(value)?)))
            .collect()
    }
}

fn style_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        _ => None,
    }
}

/// Strings as-is, numbers and booleans in their JSON form, `null` as absent.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar(Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

/// Like [`scalar_text`], but an explicit `null` is present and empty.
fn clearing_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Some(String::new())),
        other => scalar(other).map_err(D::Error::custom),
    }
}

fn scalar(value: Value) -> Result<Option<String>, String> {
    Ok(match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => return Err(format!("expected a string, found {other}")),
    })
}

/// How an assistant reply should be treated.
#[derive(Clone, Debug, PartialEq)]
pub enum Interpretation {
    /// The reply carries an edit. `block_only` is set when the reply is
    /// nothing but the edit block.
    Edit {
        descriptor: EditDescriptor,
        block_only: bool,
    },
    /// Plain text to show as-is.
    Commentary,
}

/// The span from the first `{` to the last `}`, if any.
pub fn extract_candidate_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| text.get(start..=end)).flatten()
}

pub fn interpret(text: &str) -> Interpretation {
    let Some(block) = extract_candidate_block(text) else {
        return Interpretation::Commentary;
    };
    match serde_json::from_str::<EditDescriptor>(block) {
        Ok(descriptor) if descriptor.has_edits() => Interpretation::Edit {
            block_only: text.trim() == block,
            descriptor,
        },
        Ok(_) => {
            debug!("reply block holds no edit fields");
            Interpretation::Commentary
        }
        Err(err) => {
            debug!("reply block is not an edit: {err}");
            Interpretation::Commentary
        }
    }
}

/// Summary of an edit that was applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedEdit {
    pub target: NodeId,
    /// Kebab-case names of the inline properties that were set.
    pub properties: Vec<String>,
    pub text_replaced: bool,
    pub html_replaced: bool,
    pub classes_changed: bool,
}

/// Apply `descriptor` to the element its selector names, falling back to
/// `implicit_target` when there is no selector or it matches nothing.
///
/// # Errors
/// [`EditError::EmptyDescriptor`] when there is nothing to change and
/// [`EditError::NoTarget`] when no element can be resolved. The page is
/// untouched in both cases.
pub fn apply_edit(
    page: &mut HtmlPage,
    descriptor: &EditDescriptor,
    implicit_target: Option<NodeId>,
) -> Result<AppliedEdit, EditError> {
    if !descriptor.has_edits() {
        return Err(EditError::EmptyDescriptor);
    }
    let named = descriptor.selector.as_deref().and_then(|selector| {
        let found = page.query_selector(selector);
        if found.is_none() {
            warn!("edit selector {selector:?} matched no element");
        }
        found
    });
    let doc = page.document();
    let target = named
        .or(implicit_target)
        .filter(|node| doc.is_connected(*node) && doc.is_element(*node))
        .ok_or(EditError::NoTarget)?;

    let assignments = descriptor.style_assignments();
    let properties = apply_styles(page, target, &assignments);

    let doc = page.document_mut();
    if let Some(text) = &descriptor.text {
        doc.set_inner_text(target, text);
    }
    if let Some(markup) = &descriptor.html {
        doc.set_inner_html(target, markup);
    }
    let mut classes_changed = false;
    if let Some(classes) = &descriptor.classes {
        for class in classes.add.iter().flat_map(|list| list.split_whitespace()) {
            doc.add_class(target, class);
            classes_changed = true;
        }
        for class in classes.remove.iter().flat_map(|list| list.split_whitespace()) {
            doc.remove_class(target, class);
            classes_changed = true;
        }
        if let Some(replace) = classes.replace.as_deref().filter(|value| !value.is_empty()) {
            doc.set_class_name(target, replace);
            classes_changed = true;
        }
    }

    Ok(AppliedEdit {
        target,
        properties,
        text_replaced: descriptor.text.is_some(),
        html_replaced: descriptor.html.is_some(),
        classes_changed,
    })
}

/// Assign inline style properties on `target`, names given in script or CSS
/// form. An empty value removes the property. Returns the CSS names touched.
pub fn apply_styles(page: &mut HtmlPage, target: NodeId, styles: &[(String, String)]) -> Vec<String> {
    let doc = page.document_mut();
    let mut inline = doc.attr(target, "style").unwrap_or_default().to_owned();
    let mut touched = Vec::with_capacity(styles.len());
    for (name, value) in styles {
        let property = camel_to_kebab(name);
        inline = set_property(&inline, &property, value);
        touched.push(property);
    }
    if !touched.is_empty() {
        doc.set_attr(target, "style", &inline);
    }
    touched
}
