//! Resolved per-element style values and their shorthand views.

use std::collections::BTreeMap;

use css_variables::CustomProperties;

use crate::values::serialize_box;

/// Longhands every computed style carries, whether declared or not.
pub const TRACKED_PROPERTIES: [&str; 40] = [
    "color",
    "background-color",
    "background-image",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "display",
    "width",
    "height",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "border-top-style",
    "border-right-style",
    "border-bottom-style",
    "border-left-style",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-right-radius",
    "border-bottom-left-radius",
    "visibility",
    "pointer-events",
    "box-shadow",
    "transition",
    "opacity",
];

/// Computed values for one element, keyed by longhand property name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    pub(crate) values: BTreeMap<String, String>,
    pub(crate) custom: CustomProperties,
}

impl ComputedStyle {
    /// Value of a longhand property, if the engine tracks or saw it.
    pub fn longhand(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// CSSOM-style lookup: longhands, box shorthands and custom properties.
    /// Unknown properties read as the empty string.
    pub fn property_value(&self, name: &str) -> String {
        if name.starts_with("--") {
            return self.custom_property(name).unwrap_or_default().to_owned();
        }
        match name {
            "padding" => self.padding(),
            "margin" => self.margin(),
            "border-radius" => self.border_radius(),
            "border" => self.border(),
            "border-width" | "border-style" | "border-color" => {
                let suffix = name.trim_start_matches("border-");
                self.side_box(|side| format!("border-{side}-{suffix}"))
            }
            "border-top" | "border-right" | "border-bottom" | "border-left" => {
                let side = name.trim_start_matches("border-");
                self.border_side(side)
            }
            _ => self.longhand(name).unwrap_or_default().to_owned(),
        }
    }

    pub fn custom_property(&self, name: &str) -> Option<&str> {
        self.custom.get(name).map(String::as_str)
    }

    pub const fn custom_properties(&self) -> &CustomProperties {
        &self.custom
    }

    pub fn padding(&self) -> String {
        self.side_box(|side| format!("padding-{side}"))
    }

    pub fn margin(&self) -> String {
        self.side_box(|side| format!("margin-{side}"))
    }

    pub fn border_radius(&self) -> String {
        let get = |corner: &str| {
            self.longhand(&format!("border-{corner}-radius"))
                .unwrap_or_default()
        };
        serialize_box(
            get("top-left"),
            get("top-right"),
            get("bottom-right"),
            get("bottom-left"),
        )
    }

    /// `border` only serializes when all four sides agree.
    pub fn border(&self) -> String {
        let top = self.border_side("top");
        let same = ["right", "bottom", "left"]
            .iter()
            .all(|side| self.border_side(side) == top);
        if same { top } else { String::new() }
    }

    fn border_side(&self, side: &str) -> String {
        let part = |what: &str| {
            self.longhand(&format!("border-{side}-{what}"))
                .unwrap_or_default()
        };
        format!("{} {} {}", part("width"), part("style"), part("color"))
    }

    fn side_box(&self, name_for: impl Fn(&str) -> String) -> String {
        let get = |side: &str| self.longhand(&name_for(side)).unwrap_or_default();
        serialize_box(get("top"), get("right"), get("bottom"), get("left"))
    }

    /// Font size in pixels, falling back to the initial 16px.
    pub fn font_size_px(&self) -> f64 {
        self.longhand("font-size")
            .and_then(|value| value.strip_suffix("px"))
            .and_then(|number| number.parse().ok())
            .unwrap_or(16.0)
    }

    pub(crate) fn font_weight(&self) -> u16 {
        self.longhand("font-weight")
            .and_then(|value| value.parse().ok())
            .unwrap_or(400)
    }

    /// Whether hit testing should skip this element.
    pub fn ignores_pointer(&self) -> bool {
        self.longhand("pointer-events") == Some("none")
    }

    pub fn is_display_none(&self) -> bool {
        self.longhand("display") == Some("none")
    }

    /// Iterate over every longhand in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(pairs: &[(&str, &str)]) -> ComputedStyle {
        ComputedStyle {
            values: pairs
                .iter()
                .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
                .collect(),
            custom: CustomProperties::new(),
        }
    }

    #[test]
    fn shorthand_views_collapse() {
        let computed = style(&[
            ("padding-top", "10px"),
            ("padding-right", "20px"),
            ("padding-bottom", "10px"),
            ("padding-left", "20px"),
            ("margin-top", "0px"),
            ("margin-right", "0px"),
            ("margin-bottom", "0px"),
            ("margin-left", "0px"),
        ]);
        assert_eq!(computed.padding(), "10px 20px");
        assert_eq!(computed.property_value("margin"), "0px");
        assert_eq!(computed.property_value("no-such-thing"), "");
    }

    #[test]
    fn border_requires_uniform_sides() {
        let mut pairs = Vec::new();
        for side in ["top", "right", "bottom", "left"] {
            pairs.push((format!("border-{side}-width"), "1px"));
            pairs.push((format!("border-{side}-style"), "solid"));
            pairs.push((format!("border-{side}-color"), "rgb(0, 0, 0)"));
        }
        let mut computed = style(&[]);
        for (name, value) in pairs {
            computed.values.insert(name, value.to_owned());
        }
        assert_eq!(computed.border(), "1px solid rgb(0, 0, 0)");
        computed
            .values
            .insert("border-left-width".to_owned(), "2px".to_owned());
        assert_eq!(computed.border(), "");
    }
}
