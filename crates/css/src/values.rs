//! Value-level helpers: tokenizing, shorthand expansion, length resolution
//! and the serialization forms resolved styles use.

use css_color::parse_css_color;

const LINE_STYLES: [&str; 10] = [
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

const CSS_WIDE_KEYWORDS: [&str; 4] = ["inherit", "initial", "unset", "revert"];

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

const CORNERS: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];

/// Context for resolving relative lengths to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    pub font_size_px: f64,
    pub root_font_size_px: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for LengthContext {
    fn default() -> Self {
        Self {
            font_size_px: 16.0,
            root_font_size_px: 16.0,
            viewport_width: 1280.0,
            viewport_height: 800.0,
        }
    }
}

/// Split a value on top-level whitespace; functions and quoted strings stay whole.
pub fn split_value_tokens(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start: Option<usize> = None;
    for (index, character) in value.char_indices() {
        match (quote, character) {
            (Some(open), current) if current == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(character),
            (None, '(') => depth = depth.saturating_add(1),
            (None, ')') => depth = depth.saturating_sub(1),
            (None, current) if current.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    tokens.push(value.get(begin..index).unwrap_or_default());
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        tokens.push(value.get(begin..).unwrap_or_default());
    }
    tokens
}

/// Split on commas outside of functions, e.g. background layers.
pub fn split_top_level_commas(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (index, character) in value.char_indices() {
        match character {
            '(' => depth = depth.saturating_add(1),
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(value.get(start..index).unwrap_or_default().trim());
                start = index.saturating_add(1);
            }
            _ => {}
        }
    }
    parts.push(value.get(start..).unwrap_or_default().trim());
    parts
}

/// Expand 1–4 box values into top/right/bottom/left order.
fn box_values<'value>(tokens: &[&'value str]) -> Option<[&'value str; 4]> {
    match *tokens {
        [all] => Some([all, all, all, all]),
        [vertical, horizontal] => Some([vertical, horizontal, vertical, horizontal]),
        [top, horizontal, bottom] => Some([top, horizontal, bottom, horizontal]),
        [top, right, bottom, left] => Some([top, right, bottom, left]),
        _ => None,
    }
}

fn is_css_wide(value: &str) -> bool {
    CSS_WIDE_KEYWORDS
        .iter()
        .any(|keyword| value.eq_ignore_ascii_case(keyword))
}

fn is_line_style(token: &str) -> bool {
    LINE_STYLES
        .iter()
        .any(|style| token.eq_ignore_ascii_case(style))
}

fn is_color_token(token: &str) -> bool {
    token.eq_ignore_ascii_case("currentcolor") || parse_css_color(token).is_some()
}

fn is_image_token(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    lower.starts_with("url(") || lower.contains("gradient(") || lower.starts_with("image-set(")
}

fn per_side(prefix: &str, suffix: &str, values: [&str; 4]) -> Vec<(String, String)> {
    SIDES
        .iter()
        .zip(values)
        .map(|(side, value)| {
            let name = if suffix.is_empty() {
                format!("{prefix}-{side}")
            } else {
                format!("{prefix}-{side}-{suffix}")
            };
            (name, value.to_owned())
        })
        .collect()
}

/// `border`/`border-<side>`: width, style and color in any order; omitted
/// parts reset to their initial values.
fn expand_border_side(value: &str, sides: &[&str]) -> Vec<(String, String)> {
    let mut width = "medium";
    let mut style = "none";
    let mut color = "currentcolor";
    if is_css_wide(value) {
        width = value;
        style = value;
        color = value;
    } else {
        for token in split_value_tokens(value) {
            if is_line_style(token) {
                style = token;
            } else if is_color_token(token) {
                color = token;
            } else {
                width = token;
            }
        }
    }
    let mut out = Vec::with_capacity(sides.len().saturating_mul(3));
    for side in sides {
        out.push((format!("border-{side}-width"), width.to_owned()));
        out.push((format!("border-{side}-style"), style.to_owned()));
        out.push((format!("border-{side}-color"), color.to_owned()));
    }
    out
}

fn expand_background(value: &str) -> Vec<(String, String)> {
    if is_css_wide(value) {
        return vec![
            ("background-color".to_owned(), value.to_owned()),
            ("background-image".to_owned(), value.to_owned()),
        ];
    }
    let mut color = "transparent".to_owned();
    let mut images: Vec<String> = Vec::new();
    for layer in split_top_level_commas(value) {
        for token in split_value_tokens(layer) {
            if is_image_token(token) {
                images.push(token.to_owned());
            } else if is_color_token(token) {
                token.clone_into(&mut color);
            }
        }
    }
    let image = if images.is_empty() {
        "none".to_owned()
    } else {
        images.join(", ")
    };
    vec![
        ("background-color".to_owned(), color),
        ("background-image".to_owned(), image),
    ]
}

fn expand_font(value: &str) -> Vec<(String, String)> {
    let tokens = split_value_tokens(value);
    let mut style = "normal";
    let mut weight = "normal";
    let mut index = 0usize;
    while let Some(&token) = tokens.get(index) {
        let lower = token.to_ascii_lowercase();
        match lower.as_str() {
            "italic" | "oblique" => style = token,
            "bold" | "bolder" | "lighter" => weight = token,
            "normal" | "small-caps" => {}
            _ if token.parse::<u16>().is_ok() => weight = token,
            _ => break,
        }
        index = index.saturating_add(1);
    }
    let Some(&size_token) = tokens.get(index) else {
        return Vec::new();
    };
    index = index.saturating_add(1);
    let (size, mut line_height) = match size_token.split_once('/') {
        Some((size, line)) if !line.is_empty() => (size, Some(line)),
        Some((size, _)) => {
            let line = tokens.get(index).copied();
            index = index.saturating_add(1);
            (size, line)
        }
        None => (size_token, None),
    };
    if tokens.get(index) == Some(&"/") {
        line_height = tokens.get(index.saturating_add(1)).copied();
        index = index.saturating_add(2);
    } else if let Some(rest) = tokens.get(index).and_then(|token| token.strip_prefix('/'))
        && !rest.is_empty()
    {
        line_height = Some(rest);
        index = index.saturating_add(1);
    }
    let family = tokens.get(index..).unwrap_or_default().join(" ");
    if family.is_empty() {
        return Vec::new();
    }
    vec![
        ("font-style".to_owned(), style.to_owned()),
        ("font-weight".to_owned(), weight.to_owned()),
        ("font-size".to_owned(), size.to_owned()),
        (
            "line-height".to_owned(),
            line_height.unwrap_or("normal").to_owned(),
        ),
        ("font-family".to_owned(), family),
    ]
}

/// Expand a declaration into longhands. Non-shorthands come back unchanged;
/// an invalid shorthand expands to nothing.
pub fn expand_shorthand(name: &str, value: &str) -> Vec<(String, String)> {
    let tokens = split_value_tokens(value);
    match name {
        "margin" | "padding" => box_values(&tokens)
            .map(|values| per_side(name, "", values))
            .unwrap_or_default(),
        "border-width" | "border-style" | "border-color" => {
            let suffix = name.trim_start_matches("border-");
            box_values(&tokens)
                .map(|values| per_side("border", suffix, values))
                .unwrap_or_default()
        }
        "border-radius" => {
            // Elliptical radii after `/` are not tracked.
            let horizontal = value.split('/').next().unwrap_or_default();
            box_values(&split_value_tokens(horizontal))
                .map(|values| {
                    CORNERS
                        .iter()
                        .zip(values)
                        .map(|(corner, radius)| {
                            (format!("border-{corner}-radius"), radius.to_owned())
                        })
                        .collect()
                })
                .unwrap_or_default()
        }
        "border" => expand_border_side(value, &SIDES),
        "border-top" | "border-right" | "border-bottom" | "border-left" => {
            let side = name.trim_start_matches("border-");
            expand_border_side(value, &[side])
        }
        "background" => expand_background(value),
        "font" => {
            if is_css_wide(value) {
                ["font-style", "font-weight", "font-size", "line-height", "font-family"]
                    .iter()
                    .map(|longhand| ((*longhand).to_owned(), value.to_owned()))
                    .collect()
            } else {
                expand_font(value)
            }
        }
        _ => vec![(name.to_owned(), value.to_owned())],
    }
}

/// Resolve an absolute or font/viewport-relative length to pixels.
/// Percentages, `auto` and `calc()` are not lengths here.
pub fn parse_length_px(value: &str, ctx: &LengthContext) -> Option<f64> {
    let trimmed = value.trim().to_ascii_lowercase();
    if trimmed == "0" {
        return Some(0.0);
    }
    let split = trimmed
        .find(|character: char| character.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let magnitude: f64 = number.parse().ok()?;
    let factor = match unit {
        "px" => 1.0,
        "em" => ctx.font_size_px,
        "rem" => ctx.root_font_size_px,
        "pt" => 4.0 / 3.0,
        "pc" => 16.0,
        "in" => 96.0,
        "cm" => 96.0 / 2.54,
        "mm" => 96.0 / 25.4,
        "vw" => ctx.viewport_width / 100.0,
        "vh" => ctx.viewport_height / 100.0,
        _ => return None,
    };
    Some(magnitude * factor)
}

/// Format a number the way resolved styles print it: no trailing zeros,
/// at most three decimals.
pub fn format_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let text = format!("{rounded:.3}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}

pub fn format_px(value: f64) -> String {
    format!("{}px", format_number(value))
}

/// Serialize four side values the way browsers collapse box shorthands.
pub fn serialize_box(top: &str, right: &str, bottom: &str, left: &str) -> String {
    if top == right && right == bottom && bottom == left {
        top.to_owned()
    } else if top == bottom && right == left {
        format!("{top} {right}")
    } else if right == left {
        format!("{top} {right} {bottom}")
    } else {
        format!("{top} {right} {bottom} {left}")
    }
}

/// Font-size keywords in pixels for the default 16px medium size.
pub fn font_size_keyword(keyword: &str, parent_px: f64) -> Option<f64> {
    Some(match keyword.to_ascii_lowercase().as_str() {
        "xx-small" => 9.0,
        "x-small" => 10.0,
        "small" => 13.0,
        "medium" => 16.0,
        "large" => 18.0,
        "x-large" => 24.0,
        "xx-large" => 32.0,
        "xxx-large" => 48.0,
        "smaller" => parent_px / 1.2,
        "larger" => parent_px * 1.2,
        _ => return None,
    })
}

/// Numeric font weight, resolving keywords against the parent weight.
pub fn resolve_font_weight(value: &str, parent_weight: u16) -> String {
    let weight = match value.trim().to_ascii_lowercase().as_str() {
        "normal" => 400,
        "bold" => 700,
        "bolder" => match parent_weight {
            0..=349 => 400,
            350..=549 => 700,
            _ => 900,
        },
        "lighter" => match parent_weight {
            0..=549 => 100,
            550..=749 => 400,
            _ => 700,
        },
        other => return other.parse::<u16>().map_or_else(|_| value.trim().to_owned(), |number| number.to_string()),
    };
    weight.to_string()
}

/// Width keywords for border widths.
pub fn border_width_keyword(keyword: &str) -> Option<f64> {
    match keyword.to_ascii_lowercase().as_str() {
        "thin" => Some(1.0),
        "medium" => Some(3.0),
        "thick" => Some(5.0),
        _ => None,
    }
}
