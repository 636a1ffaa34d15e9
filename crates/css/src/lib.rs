//! Style engine: user-agent defaults, author stylesheets and inline styles
//! cascaded into per-element computed values.

#![allow(
    clippy::module_name_repetitions,
    reason = "StyleEngine and ComputedStyle read best fully qualified"
)]

mod adapter;
mod computed;
mod media;
mod query;
mod ruledb;
pub mod values;

use std::collections::{BTreeMap, HashMap};

use css_cascade::{CascadePriority, Origin, compare_priority, inherit_property};
use css_color::normalize_color;
use css_selectors::matches_complex;
use css_style_attr::parse_style_attribute;
use css_syntax::RuleCondition;
use css_variables::{CustomProperties, compute_custom_properties, resolve_vars_in_value};
use html::{Document, NodeId};
use log::trace;

pub use adapter::DomElements;
pub use computed::{ComputedStyle, TRACKED_PROPERTIES};
pub use css_syntax::{Stylesheet, parse_stylesheet};
pub use media::{Viewport, media_matches};
pub use query::{query_selector, query_selector_all};
pub use ruledb::{RightmostKey, RuleDB, RuleEntry};

use values::{
    LengthContext, border_width_keyword, expand_shorthand, font_size_keyword, format_number,
    format_px, parse_length_px, resolve_font_weight,
};

const UA_CSS: &str = r"
html, body, div, section, article, header, footer, nav, main, aside, form,
ul, ol, p, h1, h2, h3, h4, h5, h6, figure, blockquote, pre, fieldset { display: block }
li { display: list-item }
body { margin: 8px }
h1 { font-size: 2em; font-weight: bold; margin: 0.67em 0 }
h2 { font-size: 1.5em; font-weight: bold; margin: 0.83em 0 }
h3 { font-size: 1.17em; font-weight: bold; margin: 1em 0 }
p, ul, ol, blockquote { margin: 1em 0 }
ul, ol { padding-left: 40px }
b, strong, th { font-weight: bold }
a:link { color: #0000ee }
button { display: inline-block; padding: 1px 6px }
img, svg, video { display: inline-block }
head, style, script, title, meta, link, template, noscript { display: none }
";

/// One matched declaration waiting to be cascaded.
struct Candidate<'rule> {
    priority: CascadePriority,
    name: &'rule str,
    value: &'rule str,
}

/// Cascades the user-agent sheet, author sheets and inline styles.
#[derive(Clone, Debug)]
pub struct StyleEngine {
    ua: RuleDB,
    author: RuleDB,
    viewport: Viewport,
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl StyleEngine {
    pub fn new(viewport: Viewport) -> Self {
        let mut ua = RuleDB::default();
        ua.extend_from_stylesheet(&parse_stylesheet(UA_CSS), Origin::UserAgent, 0);
        Self {
            ua,
            author: RuleDB::default(),
            viewport,
        }
    }

    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub const fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Replace the author rules with `sheets`, in document order.
    pub fn rebuild<'sheet>(&mut self, sheets: impl IntoIterator<Item = &'sheet Stylesheet>) {
        let mut author = RuleDB::default();
        let mut order = 0;
        for sheet in sheets {
            order = author.extend_from_stylesheet(sheet, Origin::Author, order);
        }
        trace!("style engine rebuilt with {} author entries", author.entries.len());
        self.author = author;
    }

    /// Computed style of an element; `None` for non-element nodes.
    pub fn computed_style(&self, doc: &Document, node: NodeId) -> Option<ComputedStyle> {
        if !doc.is_element(node) {
            return None;
        }
        let mut chain = doc.ancestor_elements(node);
        chain.reverse();
        let mut parent: Option<ComputedStyle> = None;
        for element in chain {
            parent = Some(self.compute_element(doc, element, parent.as_ref()));
        }
        parent
    }

    fn condition_applies(&self, condition: Option<&RuleCondition>) -> bool {
        match condition {
            None | Some(RuleCondition::Supports(_)) => true,
            Some(RuleCondition::Media(query)) => media_matches(query, self.viewport),
        }
    }

    fn collect_candidates<'rule>(
        &'rule self,
        doc: &Document,
        element: NodeId,
        inline: &'rule [css_style_attr::Declaration],
    ) -> Vec<Candidate<'rule>> {
        let adapter = DomElements(doc);
        let mut candidates = Vec::new();
        for entry in self.ua.entries.iter().chain(&self.author.entries) {
            if !rightmost_may_match(&entry.rightmost, doc, element)
                || !self.condition_applies(entry.condition.as_ref())
                || !matches_complex(&adapter, element, &entry.selector)
            {
                continue;
            }
            for declaration in &entry.declarations {
                candidates.push(Candidate {
                    priority: CascadePriority::new(
                        entry.origin,
                        declaration.important,
                        entry.specificity,
                        entry.source_order,
                    ),
                    name: &declaration.name,
                    value: &declaration.value,
                });
            }
        }
        for (index, declaration) in inline.iter().enumerate() {
            candidates.push(Candidate {
                priority: CascadePriority::inline(
                    declaration.important,
                    u32::try_from(index).unwrap_or(u32::MAX),
                ),
                name: &declaration.property,
                value: &declaration.value,
            });
        }
        // Stable sort keeps declaration order within a rule.
        candidates.sort_by(|left, right| compare_priority(&left.priority, &right.priority));
        candidates
    }

    fn compute_element(
        &self,
        doc: &Document,
        element: NodeId,
        parent: Option<&ComputedStyle>,
    ) -> ComputedStyle {
        let inline = doc
            .attr(element, "style")
            .map(parse_style_attribute)
            .unwrap_or_default();
        let candidates = self.collect_candidates(doc, element, &inline);

        let mut declared_custom = CustomProperties::new();
        for candidate in candidates.iter().filter(|candidate| candidate.name.starts_with("--")) {
            declared_custom.insert(candidate.name.to_owned(), candidate.value.to_owned());
        }
        let empty = CustomProperties::new();
        let inherited_custom = parent.map_or(&empty, |style| &style.custom);
        let custom = compute_custom_properties(&declared_custom, inherited_custom);

        let mut declared: HashMap<String, String> = HashMap::new();
        for candidate in candidates.iter().filter(|candidate| !candidate.name.starts_with("--")) {
            let value = if candidate.value.contains("var(") {
                resolve_vars_in_value(candidate.value, &custom).unwrap_or_else(|| "unset".to_owned())
            } else {
                candidate.value.to_owned()
            };
            for (longhand, longhand_value) in expand_shorthand(candidate.name, &value) {
                declared.insert(longhand, longhand_value);
            }
        }

        let mut resolver = Resolver {
            declared: &declared,
            parent,
            ctx: LengthContext {
                viewport_width: self.viewport.width,
                viewport_height: self.viewport.height,
                ..LengthContext::default()
            },
            values: BTreeMap::new(),
        };
        resolver.resolve_font_size();
        resolver.resolve_color();
        let mut names: Vec<&str> = TRACKED_PROPERTIES.to_vec();
        names.extend(declared.keys().map(String::as_str));
        for name in names {
            resolver.resolve(name);
        }
        resolver.zero_borders_without_style();

        ComputedStyle {
            values: resolver.values,
            custom,
        }
    }
}

fn rightmost_may_match(key: &RightmostKey, doc: &Document, element: NodeId) -> bool {
    match key {
        RightmostKey::Id(id) => doc.attr(element, "id") == Some(id.as_str()),
        RightmostKey::Class(class) => doc.has_class(element, class),
        RightmostKey::Tag(tag) => doc
            .tag_name(element)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag)),
        RightmostKey::Universal => true,
    }
}

/// Turns declared longhands into computed values for one element.
struct Resolver<'style> {
    declared: &'style HashMap<String, String>,
    parent: Option<&'style ComputedStyle>,
    ctx: LengthContext,
    values: BTreeMap<String, String>,
}

impl Resolver<'_> {
    fn specified(&self, name: &str) -> Option<String> {
        inherit_property(
            name,
            self.declared.get(name).cloned(),
            self.parent
                .and_then(|style| style.longhand(name))
                .map(ToOwned::to_owned),
        )
    }

    fn resolve_font_size(&mut self) {
        let parent_px = self.parent.map_or(16.0, ComputedStyle::font_size_px);
        let specified = self.specified("font-size").unwrap_or_else(|| "16px".to_owned());
        let parent_ctx = LengthContext {
            font_size_px: parent_px,
            ..self.ctx
        };
        let trimmed = specified.trim();
        let px = font_size_keyword(trimmed, parent_px)
            .or_else(|| {
                trimmed
                    .strip_suffix('%')
                    .and_then(|number| number.trim().parse::<f64>().ok())
                    .map(|percent| parent_px * percent / 100.0)
            })
            .or_else(|| parse_length_px(trimmed, &parent_ctx))
            .unwrap_or(parent_px);
        self.ctx.font_size_px = px;
        self.values.insert("font-size".to_owned(), format_px(px));
    }

    fn resolve_color(&mut self) {
        let parent_color = self
            .parent
            .and_then(|style| style.longhand("color"))
            .unwrap_or("rgb(0, 0, 0)")
            .to_owned();
        let specified = self.specified("color").unwrap_or_else(|| parent_color.clone());
        let computed = if specified.eq_ignore_ascii_case("currentcolor") {
            parent_color
        } else {
            normalize_color(&specified).unwrap_or(specified)
        };
        self.values.insert("color".to_owned(), computed);
    }

    fn resolve(&mut self, name: &str) {
        if self.values.contains_key(name) {
            return;
        }
        let Some(specified) = self.specified(name) else {
            return;
        };
        let computed = self.compute(name, specified.trim());
        self.values.insert(name.to_owned(), computed);
    }

    fn compute(&self, name: &str, value: &str) -> String {
        if name.ends_with("color") {
            if value.eq_ignore_ascii_case("currentcolor") {
                return self.values.get("color").cloned().unwrap_or_default();
            }
            return normalize_color(value).unwrap_or_else(|| value.to_owned());
        }
        match name {
            "font-weight" => {
                let parent_weight = self.parent.map_or(400, ComputedStyle::font_weight);
                resolve_font_weight(value, parent_weight)
            }
            "line-height" => self.compute_line_height(value),
            "display" | "visibility" | "pointer-events" | "font-style" => {
                value.to_ascii_lowercase()
            }
            _ if is_length_property(name) => {
                let keyword = if name.ends_with("-width") && name.starts_with("border-") {
                    border_width_keyword(value)
                } else {
                    None
                };
                keyword
                    .or_else(|| parse_length_px(value, &self.ctx))
                    .map_or_else(|| value.to_owned(), format_px)
            }
            _ => value.to_owned(),
        }
    }

    fn compute_line_height(&self, value: &str) -> String {
        if value.eq_ignore_ascii_case("normal") {
            return "normal".to_owned();
        }
        if let Ok(number) = value.parse::<f64>() {
            return format_number(number);
        }
        if let Some(percent) = value.strip_suffix('%').and_then(|number| number.parse::<f64>().ok()) {
            return format_px(self.ctx.font_size_px * percent / 100.0);
        }
        parse_length_px(value, &self.ctx).map_or_else(|| value.to_owned(), format_px)
    }

    fn zero_borders_without_style(&mut self) {
        for side in ["top", "right", "bottom", "left"] {
            let style = self
                .values
                .get(&format!("border-{side}-style"))
                .map(String::as_str);
            if matches!(style, Some("none" | "hidden")) {
                self.values
                    .insert(format!("border-{side}-width"), "0px".to_owned());
            }
        }
    }
}

fn is_length_property(name: &str) -> bool {
    name.starts_with("margin-")
        || name.starts_with("padding-")
        || (name.starts_with("border-") && (name.ends_with("-width") || name.ends_with("-radius")))
        || matches!(
            name,
            "width"
                | "height"
                | "min-width"
                | "min-height"
                | "max-width"
                | "max-height"
                | "top"
                | "right"
                | "bottom"
                | "left"
                | "letter-spacing"
                | "gap"
        )
}
