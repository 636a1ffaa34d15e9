//! CSS Color Module Level 4: color values, serialization, and contrast.
//! Reference: <https://www.w3.org/TR/css-color-4/>
use core::fmt;
use csscolorparser::Color;

/// 8-bit RGBA channels.
pub type Rgba8Tuple = (u8, u8, u8, u8);

/// Parse a CSS <color> into 8-bit RGBA channels.
///
/// Supports named colors, hex forms (`#rgb`/`#rgba`/`#rrggbb`/`#rrggbbaa`),
/// and functional notations like `rgb()`, `rgba()`, `hsl()`, `hsla()`.
#[inline]
pub fn parse_css_color(input: &str) -> Option<Rgba8Tuple> {
    let parsed: Color = input.trim().parse().ok()?;
    let [red, green, blue, alpha] = parsed.to_rgba8();
    Some((red, green, blue, alpha))
}

/// Serialize a color the way resolved styles report it:
/// `rgb(r, g, b)` when opaque, `rgba(r, g, b, a)` otherwise.
/// Serializing sRGB values (§15.1)
pub fn serialize_rgba((red, green, blue, alpha): Rgba8Tuple) -> String {
    if alpha == u8::MAX {
        return format!("rgb({red}, {green}, {blue})");
    }
    format!("rgba({red}, {green}, {blue}, {})", format_alpha(alpha))
}

/// Alpha with the fewest decimals (up to three) that round-trips to the same byte.
fn format_alpha(alpha: u8) -> String {
    let unit = f64::from(alpha) / 255.0;
    for decimals in 0..3usize {
        let text = format!("{unit:.decimals$}");
        if let Ok(parsed) = text.parse::<f64>()
            && (parsed * 255.0).round() == f64::from(alpha)
        {
            return trim_decimal(&text);
        }
    }
    trim_decimal(&format!("{unit:.3}"))
}

fn trim_decimal(text: &str) -> String {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text.to_owned()
    }
}

/// Normalize any parseable color to its resolved serialization; `None` if unparseable.
pub fn normalize_color(input: &str) -> Option<String> {
    parse_css_color(input).map(serialize_rgba)
}

/// True for the two spellings of a fully transparent background that
/// resolved styles produce.
pub fn is_transparent(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed == "rgba(0, 0, 0, 0)" || trimmed.eq_ignore_ascii_case("transparent")
}

/// Any spelling of a color with zero alpha, authored or resolved.
pub fn is_fully_transparent(value: &str) -> bool {
    is_transparent(value) || parse_css_color(value).is_some_and(|(_, _, _, alpha)| alpha == 0)
}

/// Loose color-literal test used when scanning custom properties: starts
/// with `#`, or mentions `rgb` or `hsl` anywhere.
pub fn looks_like_color(value: &str) -> bool {
    value.starts_with('#') || value.contains("rgb") || value.contains("hsl")
}

/// WCAG 2 relative luminance of an sRGB color; unparseable input counts as black.
/// Reference: <https://www.w3.org/TR/WCAG21/#dfn-relative-luminance>
pub fn relative_luminance(color: &str) -> f64 {
    let Some((red, green, blue, _)) = parse_css_color(color) else {
        return 0.0;
    };
    let linear = |channel: u8| {
        let scaled = f64::from(channel) / 255.0;
        if scaled <= 0.039_28 {
            scaled / 12.92
        } else {
            ((scaled + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(red) + 0.7152 * linear(green) + 0.0722 * linear(blue)
}

/// WCAG contrast ratio between two colors, in `1.0..=21.0`.
pub fn contrast_ratio(foreground: &str, background: &str) -> f64 {
    let first = relative_luminance(foreground);
    let second = relative_luminance(background);
    (first.max(second) + 0.05) / (first.min(second) + 0.05)
}

/// WCAG conformance tier for normal-size text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContrastTier {
    Aaa(f64),
    Aa(f64),
    Fail(f64),
    /// One of the inputs was missing.
    NotApplicable,
}

impl fmt::Display for ContrastTier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aaa(ratio) => write!(formatter, "AAA ({ratio:.1})"),
            Self::Aa(ratio) => write!(formatter, "AA ({ratio:.1})"),
            Self::Fail(ratio) => write!(formatter, "Fail ({ratio:.1})"),
            Self::NotApplicable => formatter.write_str("N/A"),
        }
    }
}

/// Classify the contrast between a text color and its background.
pub fn check_contrast(foreground: &str, background: &str) -> ContrastTier {
    if foreground.trim().is_empty() || background.trim().is_empty() {
        return ContrastTier::NotApplicable;
    }
    let ratio = contrast_ratio(foreground, background);
    if ratio >= 7.0 {
        ContrastTier::Aaa(ratio)
    } else if ratio >= 4.5 {
        ContrastTier::Aa(ratio)
    } else {
        ContrastTier::Fail(ratio)
    }
}
