//! Palette Miner: representative page colors, mined once per session.

use css_color::{is_fully_transparent, looks_like_color};
use log::{debug, trace};
use page_handler::HtmlPage;

/// Elements whose background colors are sampled page-wide.
const PROMINENT_SELECTORS: [&str; 5] = ["header", "footer", "nav", "h1", "button"];

/// Insertion-ordered color set capped at a fixed size.
struct ColorSet {
    colors: Vec<String>,
}

impl ColorSet {
    fn insert(&mut self, color: &str) {
        if !self.colors.iter().any(|known| known == color) {
            self.colors.push(color.to_owned());
        }
    }

    fn insert_opaque(&mut self, color: &str) {
        if !color.is_empty() && !is_fully_transparent(color) {
            self.insert(color);
        }
    }
}

/// Lazily computed, cached palette.
#[derive(Clone, Debug)]
pub struct PaletteMiner {
    cap: usize,
    refresh_on_stylesheet_change: bool,
    cached: Vec<String>,
    mined_at_generation: u64,
}

impl PaletteMiner {
    pub const fn new(cap: usize, refresh_on_stylesheet_change: bool) -> Self {
        Self {
            cap,
            refresh_on_stylesheet_change,
            cached: Vec::new(),
            mined_at_generation: 0,
        }
    }

    /// The page palette. Mined on first use and reused afterwards; an empty
    /// result is not cached, so the next call scans again.
    pub fn palette(&mut self, page: &HtmlPage) -> Vec<String> {
        let stale = self.refresh_on_stylesheet_change
            && self.mined_at_generation != page.stylesheet_generation();
        if self.cached.is_empty() || stale {
            self.cached = mine(page, self.cap);
            self.mined_at_generation = page.stylesheet_generation();
            trace!("mined {} palette colors", self.cached.len());
        }
        self.cached.clone()
    }

    pub fn cached(&self) -> &[String] {
        &self.cached
    }
}

fn mine(page: &HtmlPage, cap: usize) -> Vec<String> {
    let doc = page.document();
    let mut set = ColorSet { colors: Vec::new() };

    for root in [doc.document_element(), doc.body()].into_iter().flatten() {
        if let Some(style) = page.computed_style(root) {
            set.insert_opaque(&style.property_value("color"));
            set.insert_opaque(&style.property_value("background-color"));
        }
    }

    for index in 0..page.stylesheet_count() {
        let sheet = match page.read_stylesheet(index) {
            Ok(sheet) => sheet,
            Err(err) => {
                debug!("palette: skipping stylesheet {index}: {err}");
                continue;
            }
        };
        for rule in sheet.top_level_rules() {
            for declaration in &rule.declarations {
                let value = declaration.value.trim();
                if declaration.is_custom_property() && looks_like_color(value) {
                    set.insert_opaque(value);
                }
            }
        }
    }

    for selector in PROMINENT_SELECTORS {
        for element in css::query_selector_all(doc, selector).unwrap_or_default() {
            if let Some(style) = page.computed_style(element) {
                set.insert_opaque(&style.property_value("background-color"));
            }
        }
    }

    set.colors.truncate(cap);
    set.colors
}
