//! Overlay Renderer: the hover outline and the floating info panel.
//!
//! Both are ordinary elements appended under `<html>` with ids in the
//! reserved `lens-` namespace and `pointer-events: none`, so they never take
//! part in hit testing. Rendering only touches those two elements.

use std::time::{Duration, Instant};

use css::ComputedStyle;
use css::values::format_px;
use css_color::is_transparent;
use css_style_attr::{remove_property, set_property};
use html::{Document, NodeId};
use log::{trace, warn};
use page_handler::{HtmlPage, LayoutRect};

pub const OVERLAY_ID: &str = "lens-hover-overlay";
pub const PANEL_ID: &str = "lens-floating-panel";

const PICK_COLOR: &str = "#10b981";
const INSPECT_COLOR: &str = "#6366f1";
const GLOW_SHADOW: &str = "0 0 20px #6366f1";
const HEADER_LIMIT: usize = 25;
const GRADIENT_PREVIEW_LIMIT: usize = 20;
const VARIABLE_LIMIT: usize = 5;

/// A custom property shown in the panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableRow {
    pub name: String,
    pub value: String,
    pub swatch: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelSection {
    Variables(Vec<VariableRow>),
    Font {
        family: String,
        size: String,
        weight: String,
    },
    Color(String),
    /// Full gradient value; the panel shows a shortened preview.
    Gradient(String),
    Background(String),
    Margin(String),
    /// Padding and radius side by side; each only when non-zero.
    Spacing {
        padding: Option<String>,
        radius: Option<String>,
    },
}

/// What the floating panel shows for one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelModel {
    pub header: String,
    pub sections: Vec<PanelSection>,
}

impl PanelModel {
    /// Build the panel contents for `target`.
    pub fn build(page: &HtmlPage, target: NodeId, style: &ComputedStyle) -> Self {
        let doc = page.document();
        let mut sections = Vec::new();

        let variables = css_variables(page, target);
        if !variables.is_empty() {
            sections.push(PanelSection::Variables(
                variables
                    .into_iter()
                    .take(VARIABLE_LIMIT)
                    .map(|(name, value)| VariableRow {
                        swatch: value.starts_with('#') || value.starts_with("rgb"),
                        name,
                        value,
                    })
                    .collect(),
            ));
        }

        let family = style.property_value("font-family");
        sections.push(PanelSection::Font {
            family: family
                .split(',')
                .next()
                .unwrap_or_default()
                .replace('"', "")
                .trim()
                .to_owned(),
            size: style.property_value("font-size"),
            weight: style.property_value("font-weight"),
        });

        let color = style.property_value("color");
        if color != "rgba(0, 0, 0, 0)" && !doc.inner_text(target).trim().is_empty() {
            sections.push(PanelSection::Color(color));
        }

        let background_image = style.property_value("background-image");
        let background_color = style.property_value("background-color");
        if background_image != "none" && background_image.contains("-gradient(") {
            sections.push(PanelSection::Gradient(background_image));
        } else if !is_transparent(&background_color) {
            sections.push(PanelSection::Background(background_color));
        }

        let margin = ["margin-top", "margin-right", "margin-bottom", "margin-left"]
            .map(|side| style.property_value(side))
            .join(" ");
        if !margin.replace("0px", "").trim().is_empty() {
            sections.push(PanelSection::Margin(margin));
        }

        let padding = style.padding();
        let radius = style.border_radius();
        let padding = (padding != "0px").then_some(padding);
        let radius = (radius != "0px").then_some(radius);
        if padding.is_some() || radius.is_some() {
            sections.push(PanelSection::Spacing { padding, radius });
        }

        Self {
            header: header_title(doc, target),
            sections,
        }
    }
}

/// `tag.class1.class2`, shortened to the header limit.
fn header_title(doc: &Document, target: NodeId) -> String {
    let tag = doc.tag_name(target).unwrap_or_default().to_ascii_lowercase();
    let classes = doc.class_list(target).join(".");
    let title = if classes.is_empty() {
        tag
    } else {
        format!("{tag}.{classes}")
    };
    truncate_with_ellipsis(&title, HEADER_LIMIT)
}

fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let mut shortened: String = text.chars().take(limit).collect();
        shortened.push_str("...");
        shortened
    } else {
        text.to_owned()
    }
}

/// Custom properties declared in `style` attributes on the element and its
/// ancestors below `<html>`, nearest first, with their resolved values. A
/// name declared at several levels keeps its nearest value.
pub fn css_variables(page: &HtmlPage, target: NodeId) -> Vec<(String, String)> {
    let doc = page.document();
    let root = doc.document_element();
    let mut found: Vec<(String, String)> = Vec::new();
    for element in doc.ancestor_elements(target) {
        if Some(element) == root {
            break;
        }
        let Some(inline) = doc.attr(element, "style") else {
            continue;
        };
        let Some(style) = page.computed_style(element) else {
            continue;
        };
        for declaration in css_style_attr::parse_style_attribute(inline) {
            let name = declaration.property;
            if !name.starts_with("--") || found.iter().any(|(known, _)| *known == name) {
                continue;
            }
            let value = style
                .custom_property(&name)
                .unwrap_or_default()
                .trim()
                .to_owned();
            found.push((name, value));
        }
    }
    found
}

/// Owns the overlay elements and the selection glow timer.
#[derive(Debug)]
pub struct OverlayRenderer {
    overlay: Option<NodeId>,
    panel: Option<NodeId>,
    panel_offset: f64,
    glow_duration: Duration,
    glow_until: Option<Instant>,
}

impl OverlayRenderer {
    pub const fn new(panel_offset: f64, glow_duration: Duration) -> Self {
        Self {
            overlay: None,
            panel: None,
            panel_offset,
            glow_duration,
            glow_until: None,
        }
    }

    /// Create the outline and panel once; existing ones are adopted.
    pub fn install(&mut self, page: &mut HtmlPage) {
        let doc = page.document_mut();
        let Some(root) = doc.document_element() else {
            return;
        };
        if self.overlay.is_none_or(|overlay| !doc.is_connected(overlay)) {
            let overlay = doc.get_element_by_id(OVERLAY_ID).unwrap_or_else(|| {
                let overlay = doc.create_element("div");
                doc.set_attr(overlay, "id", OVERLAY_ID);
                doc.set_attr(overlay, "class", "lens-highlight-rect");
                doc.set_attr(
                    overlay,
                    "style",
                    "position: fixed; z-index: 999998; pointer-events: none; display: none;",
                );
                append_or_log(doc, root, overlay);
                overlay
            });
            self.overlay = Some(overlay);
        }
        if self.panel.is_none_or(|panel| !doc.is_connected(panel)) {
            let panel = doc.get_element_by_id(PANEL_ID).unwrap_or_else(|| {
                let panel = doc.create_element("div");
                doc.set_attr(panel, "id", PANEL_ID);
                doc.set_attr(
                    panel,
                    "style",
                    "position: fixed; z-index: 999999; pointer-events: none;",
                );
                append_or_log(doc, root, panel);
                panel
            });
            self.panel = Some(panel);
        }
    }

    pub const fn overlay(&self) -> Option<NodeId> {
        self.overlay
    }

    pub const fn panel(&self) -> Option<NodeId> {
        self.panel
    }

    /// Whether the outline is currently shown.
    pub fn is_visible(&self, page: &HtmlPage) -> bool {
        let doc = page.document();
        self.overlay
            .and_then(|overlay| doc.attr(overlay, "style"))
            .and_then(|style| css_style_attr::get_property(style, "display"))
            .is_some_and(|display| display == "block")
    }

    /// Outline `target` and fill the panel. Nothing, the root element and
    /// the body hide both instead; the returned model is `None` then.
    pub fn render(
        &mut self,
        page: &mut HtmlPage,
        target: Option<NodeId>,
        pointer: (f64, f64),
        picking: bool,
    ) -> Option<PanelModel> {
        self.install(page);
        let doc = page.document();
        let target = target.filter(|node| {
            doc.is_connected(*node)
                && doc.is_element(*node)
                && Some(*node) != doc.document_element()
                && Some(*node) != doc.body()
        });
        let Some(target) = target else {
            self.hide(page);
            return None;
        };
        let style = page.computed_style(target)?;
        let model = PanelModel::build(page, target, &style);
        let rect = page.bounding_client_rect(target).unwrap_or_default();
        let (color, line) = if picking {
            (PICK_COLOR, "solid")
        } else {
            (INSPECT_COLOR, "dashed")
        };
        self.restyle_overlay(page, |style| {
            let mut style = set_property(style, "display", "block");
            for (name, value) in rect_properties(rect) {
                style = set_property(&style, name, &value);
            }
            style = set_property(&style, "border-color", color);
            set_property(&style, "border-style", line)
        });

        let offset = self.panel_offset;
        if let Some(panel) = self.panel {
            let doc = page.document_mut();
            doc.add_class(panel, "visible");
            let current = doc.attr(panel, "style").unwrap_or_default().to_owned();
            let left = set_property(&current, "left", &format_px(pointer.0 + offset));
            doc.set_attr(panel, "style", &set_property(&left, "top", &format_px(pointer.1 + offset)));
            fill_panel(doc, panel, &model);
        }
        trace!("overlay rendered for {}", model.header);
        Some(model)
    }

    /// Hide the outline and the panel; everything else stays as it is.
    pub fn hide(&mut self, page: &mut HtmlPage) {
        self.restyle_overlay(page, |style| set_property(style, "display", "none"));
        if let Some(panel) = self.panel {
            page.document_mut().remove_class(panel, "visible");
        }
    }

    /// Drop the pick-mode outline colors.
    pub fn reset_pick_styling(&mut self, page: &mut HtmlPage) {
        self.restyle_overlay(page, |style| {
            remove_property(&remove_property(style, "border-color"), "border-style")
        });
    }

    /// Start the selection glow; it stays until [`Self::tick`] passes its deadline.
    pub fn flash_selection(&mut self, page: &mut HtmlPage, now: Instant) {
        self.restyle_overlay(page, |style| {
            set_property(
                &set_property(style, "transition", "all 0.1s ease"),
                "box-shadow",
                GLOW_SHADOW,
            )
        });
        self.glow_until = Some(now + self.glow_duration);
    }

    pub const fn glow_deadline(&self) -> Option<Instant> {
        self.glow_until
    }

    /// Clear an expired glow. Returns `true` when it was cleared.
    pub fn tick(&mut self, page: &mut HtmlPage, now: Instant) -> bool {
        match self.glow_until {
            Some(deadline) if now >= deadline => {
                self.glow_until = None;
                self.restyle_overlay(page, |style| {
                    remove_property(&remove_property(style, "box-shadow"), "transition")
                });
                true
            }
            _ => false,
        }
    }

    fn restyle_overlay(&self, page: &mut HtmlPage, edit: impl FnOnce(&str) -> String) {
        let Some(overlay) = self.overlay else {
            return;
        };
        let doc = page.document_mut();
        let updated = edit(doc.attr(overlay, "style").unwrap_or_default());
        doc.set_attr(overlay, "style", &updated);
    }
}

fn rect_properties(rect: LayoutRect) -> [(&'static str, String); 4] {
    [
        ("top", format_px(rect.y)),
        ("left", format_px(rect.x)),
        ("width", format_px(rect.width)),
        ("height", format_px(rect.height)),
    ]
}

fn append_or_log(doc: &mut Document, parent: NodeId, child: NodeId) {
    if let Err(err) = doc.append_child(parent, child) {
        warn!("could not install overlay element: {err}");
    }
}

fn div(doc: &mut Document, parent: NodeId, class: &str, text: Option<&str>) -> NodeId {
    let node = doc.create_element("div");
    doc.set_attr(node, "class", class);
    if let Some(text) = text {
        doc.set_text_content(node, text);
    }
    append_or_log(doc, parent, node);
    node
}

fn swatch(doc: &mut Document, parent: NodeId, background: &str) {
    let node = div(doc, parent, "lens-color-swatch", None);
    doc.set_attr(node, "style", &set_property("", "background", background));
}

fn labelled_color(doc: &mut Document, body: NodeId, label: &str, color: &str, shown: &str) {
    div(doc, body, "lens-section-label", Some(label));
    let row = div(doc, body, "lens-color-row", None);
    swatch(doc, row, color);
    div(doc, row, "lens-value-text", Some(shown));
}

/// Replace the panel's children with the model's header and sections.
fn fill_panel(doc: &mut Document, panel: NodeId, model: &PanelModel) {
    doc.remove_children(panel);
    let header = div(doc, panel, "lens-panel-header", None);
    let title = doc.create_element("span");
    doc.set_text_content(title, &model.header);
    append_or_log(doc, header, title);
    let body = div(doc, panel, "lens-panel-body", None);

    for section in &model.sections {
        match section {
            PanelSection::Variables(rows) => {
                div(doc, body, "lens-section-label", Some("Variables"));
                for row in rows {
                    let line = div(doc, body, "lens-value-text", None);
                    div(doc, line, "lens-variable-name", Some(&format!("{}:", row.name)));
                    if row.swatch {
                        swatch(doc, line, &row.value);
                    }
                    div(doc, line, "lens-variable-value", Some(&row.value));
                }
            }
            PanelSection::Font {
                family,
                size,
                weight,
            } => {
                div(doc, body, "lens-section-label", Some("Font"));
                let text = format!("{family} · {size} · {weight}");
                div(doc, body, "lens-value-text", Some(&text));
            }
            PanelSection::Color(color) => labelled_color(doc, body, "Color", color, color),
            PanelSection::Gradient(gradient) => {
                let preview: String = gradient.chars().take(GRADIENT_PREVIEW_LIMIT).collect();
                labelled_color(doc, body, "Gradient", gradient, &format!("{preview}..."));
            }
            PanelSection::Background(color) => {
                labelled_color(doc, body, "Background", color, color);
            }
            PanelSection::Margin(margin) => {
                div(doc, body, "lens-section-label", Some("Margin"));
                div(doc, body, "lens-value-text", Some(margin));
            }
            PanelSection::Spacing { padding, radius } => {
                if padding.is_some() {
                    div(doc, body, "lens-section-label", Some("Padding"));
                }
                if radius.is_some() {
                    div(doc, body, "lens-section-label", Some("Radius"));
                }
                for value in [padding, radius].into_iter().flatten() {
                    div(doc, body, "lens-value-text", Some(value));
                }
            }
        }
    }
}
