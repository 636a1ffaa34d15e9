//! Media Queries Level 4: evaluation against a fixed viewport.
//! Reference: <https://www.w3.org/TR/mediaqueries-4/>
//!
//! Supports media types, `not`/`only`, `and`, and the width, height,
//! orientation and prefers-color-scheme features. Unknown features never match.

use crate::values::{LengthContext, parse_length_px};

/// Viewport the page is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Evaluate a comma-separated media query list.
pub fn media_matches(query_list: &str, viewport: Viewport) -> bool {
    if query_list.trim().is_empty() {
        return true;
    }
    query_list
        .split(',')
        .any(|query| query_matches(query.trim(), viewport))
}

fn query_matches(query: &str, viewport: Viewport) -> bool {
    let lower = query.to_ascii_lowercase();
    let (negated, body) = match lower.strip_prefix("not ") {
        Some(rest) => (true, rest.trim()),
        None => (false, lower.strip_prefix("only ").unwrap_or(&lower).trim()),
    };
    let result = body
        .split(" and ")
        .map(str::trim)
        .all(|part| condition_matches(part, viewport));
    result != negated
}

fn condition_matches(part: &str, viewport: Viewport) -> bool {
    match part {
        "all" | "screen" => true,
        "print" | "speech" => false,
        feature if feature.starts_with('(') && feature.ends_with(')') => {
            let inner = feature
                .get(1..feature.len().saturating_sub(1))
                .unwrap_or_default();
            feature_matches(inner, viewport)
        }
        _ => false,
    }
}

fn feature_matches(feature: &str, viewport: Viewport) -> bool {
    let Some((name, value)) = feature.split_once(':') else {
        return matches!(feature.trim(), "color" | "hover" | "pointer");
    };
    let value = value.trim();
    let ctx = LengthContext {
        viewport_width: viewport.width,
        viewport_height: viewport.height,
        ..LengthContext::default()
    };
    let length = || parse_length_px(value, &ctx);
    match name.trim() {
        "min-width" => length().is_some_and(|px| viewport.width >= px),
        "max-width" => length().is_some_and(|px| viewport.width <= px),
        "width" => length().is_some_and(|px| (viewport.width - px).abs() < f64::EPSILON),
        "min-height" => length().is_some_and(|px| viewport.height >= px),
        "max-height" => length().is_some_and(|px| viewport.height <= px),
        "orientation" => {
            let landscape = viewport.width >= viewport.height;
            (value == "landscape") == landscape
        }
        "prefers-color-scheme" => value == "light",
        "prefers-reduced-motion" => value == "no-preference",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_queries() {
        let viewport = Viewport {
            width: 1280.0,
            height: 800.0,
        };
        assert!(media_matches("screen and (min-width: 768px)", viewport));
        assert!(!media_matches("(max-width: 600px)", viewport));
        assert!(media_matches("print, (orientation: landscape)", viewport));
        assert!(media_matches("not print", viewport));
        assert!(!media_matches("(min-width: 100em)", viewport));
    }
}
