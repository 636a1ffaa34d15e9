//! Read-only views of the published element record: the values the companion
//! panel shows, the contrast verdict and the CSS / Tailwind exports.

use css_color::{ContrastTier, check_contrast, is_transparent};
use inspector::{ElementRecord, StyleSnapshot};

const NO_TEXT: &str = "No text content";

#[derive(Clone, Debug, PartialEq)]
pub struct ElementSummary {
    pub tag_name: String,
    pub inner_text: String,
    pub color: String,
    pub background_color: String,
    pub font_size: String,
    pub font_family: String,
    pub padding: String,
    pub margin: String,
    pub contrast: ContrastTier,
    pub palette: Vec<String>,
}

impl ElementSummary {
    pub fn from_record(record: &ElementRecord) -> Self {
        let styles = &record.styles;
        let inner_text = if record.inner_text.is_empty() {
            NO_TEXT.to_owned()
        } else {
            record.inner_text.clone()
        };
        Self {
            tag_name: record.tag_name.clone(),
            inner_text,
            color: styles.color.clone(),
            background_color: styles.background_color.clone(),
            font_size: styles.font_size.clone(),
            font_family: styles.font_family.replace('"', ""),
            padding: styles.padding.clone(),
            margin: styles.margin.clone(),
            contrast: check_contrast(&styles.color, &styles.background_color),
            palette: dedup_palette(&record.assets.palette),
        }
    }

    pub const fn contrast_fails(&self) -> bool {
        matches!(self.contrast, ContrastTier::Fail(_))
    }
}

/// First occurrence of each color, in order.
pub fn dedup_palette(palette: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(palette.len());
    for color in palette {
        if !unique.contains(color) {
            unique.push(color.clone());
        }
    }
    unique
}

/// Leading integer of a length such as `"14px"`, as `parseInt` reads it.
fn leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|number| sign * number)
}

/// Tailwind approximation of a style snapshot, space separated.
pub fn tailwind_classes(styles: &StyleSnapshot) -> String {
    let mut classes = Vec::new();
    if styles.color != "rgba(0, 0, 0, 0)" {
        classes.push(format!("text-[{}]", styles.color));
    }
    if !is_transparent(&styles.background_color) {
        classes.push(format!("bg-[{}]", styles.background_color));
    }
    if let Some(size) = leading_int(&styles.font_size).filter(|size| *size != 0) {
        let bucket = match size {
            ..=12 => "text-xs".to_owned(),
            13..=14 => "text-sm".to_owned(),
            15..=16 => "text-base".to_owned(),
            17..=18 => "text-lg".to_owned(),
            19..=20 => "text-xl".to_owned(),
            _ => format!("text-[{}]", styles.font_size),
        };
        classes.push(bucket);
    }
    if styles.padding != "0px" {
        classes.push(format!("p-[{}]", styles.padding));
    }
    if styles.margin != "0px" {
        classes.push(format!("m-[{}]", styles.margin));
    }
    if styles.border_radius != "0px" {
        classes.push(format!("rounded-[{}]", styles.border_radius));
    }
    classes.join(" ")
}

/// Plain CSS declarations for the sampled properties, one per line.
pub fn css_text(styles: &StyleSnapshot) -> String {
    let declarations = [
        ("color", &styles.color),
        ("background-color", &styles.background_color),
        ("font-family", &styles.font_family),
        ("font-size", &styles.font_size),
        ("font-weight", &styles.font_weight),
        ("line-height", &styles.line_height),
        ("padding", &styles.padding),
        ("margin", &styles.margin),
        ("border", &styles.border),
        ("border-radius", &styles.border_radius),
        ("display", &styles.display),
        ("width", &styles.width),
        ("height", &styles.height),
        ("background-image", &styles.background_image),
    ];
    declarations
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty-printed record, as written by "export JSON".
///
/// # Errors
///
/// Propagates serialization failures.
pub fn export_json(record: &ElementRecord) -> serde_json::Result<String> {
    serde_json::to_string_pretty(record)
}
