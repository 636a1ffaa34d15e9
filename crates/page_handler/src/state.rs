use anyhow::{Context as _, Error};
use css::{ComputedStyle, StyleEngine, Stylesheet, Viewport, parse_stylesheet, query_selector};
use html::{Document, NodeId, parse_document};
use log::{debug, info, trace, warn};
use url::Url;

use crate::config::PageConfig;
use crate::error::PageError;
use crate::layout::{LayoutMap, LayoutRect};
use crate::url::{fetch_text, origin_of};

/// One stylesheet in document order.
#[derive(Clone, Debug)]
pub struct StylesheetEntry {
    /// `None` for `<style>` blocks and sheets added without a location.
    pub href: Option<Url>,
    pub sheet: Stylesheet,
    /// Applied to the cascade but unreadable through [`HtmlPage::read_stylesheet`].
    pub cross_origin: bool,
}

enum SheetSource {
    Inline(String),
    Linked(Url),
}

/// A single hosted page: its document, stylesheets, geometry and viewport.
pub struct HtmlPage {
    url: Url,
    document: Document,
    stylesheets: Vec<StylesheetEntry>,
    stylesheet_generation: u64,
    engine: StyleEngine,
    layout: LayoutMap,
    scroll_x: f64,
    scroll_y: f64,
    config: PageConfig,
}

impl HtmlPage {
    /// Host already-fetched markup. `<style>` blocks are applied; linked
    /// stylesheets are left out because nothing is fetched here.
    pub fn from_html(url: Url, html: &str, config: PageConfig) -> Self {
        let document = parse_document(html);
        let mut page = Self::empty(url, document, config);
        for source in page.sheet_sources() {
            match source {
                SheetSource::Inline(css) => page.push_sheet(None, &css),
                SheetSource::Linked(href) => debug!("not fetching linked stylesheet {href}"),
            }
        }
        page.restyle();
        page
    }

    /// Fetch a page and every linked stylesheet it references.
    ///
    /// # Errors
    /// Fails when the document itself cannot be fetched. Stylesheets that
    /// fail to load are logged and skipped.
    pub async fn load(url: Url, config: PageConfig) -> Result<Self, Error> {
        let html = fetch_text(&url, config.fetch_timeout())
            .await
            .with_context(|| format!("loading page {url}"))?;
        let document = parse_document(&html);
        let mut page = Self::empty(url, document, config);
        for source in page.sheet_sources() {
            match source {
                SheetSource::Inline(css) => page.push_sheet(None, &css),
                SheetSource::Linked(href) => {
                    match fetch_text(&href, page.config.fetch_timeout()).await {
                        Ok(css) => page.push_sheet(Some(href), &css),
                        Err(err) => warn!("skipping stylesheet: {err}"),
                    }
                }
            }
        }
        page.restyle();
        info!(
            "loaded {} with {} stylesheets",
            page.url,
            page.stylesheets.len()
        );
        Ok(page)
    }

    fn empty(url: Url, document: Document, config: PageConfig) -> Self {
        Self {
            url,
            document,
            stylesheets: Vec::new(),
            stylesheet_generation: 0,
            engine: StyleEngine::new(config.viewport()),
            layout: LayoutMap::default(),
            scroll_x: 0.0,
            scroll_y: 0.0,
            config,
        }
    }

    fn sheet_sources(&self) -> Vec<SheetSource> {
        let doc = &self.document;
        doc.elements()
            .into_iter()
            .filter_map(|element| match doc.tag_name(element)? {
                "style" => Some(SheetSource::Inline(doc.text_content(element))),
                "link" => {
                    let is_sheet = doc.attr(element, "rel").is_some_and(|rel| {
                        rel.split_whitespace()
                            .any(|token| token.eq_ignore_ascii_case("stylesheet"))
                    });
                    let href = doc.attr(element, "href")?;
                    if !is_sheet {
                        return None;
                    }
                    self.base_url()
                        .join(href)
                        .inspect_err(|err| debug!("bad stylesheet href `{href}`: {err}"))
                        .ok()
                        .map(SheetSource::Linked)
                }
                _ => None,
            })
            .collect()
    }

    fn push_sheet(&mut self, href: Option<Url>, css: &str) {
        let cross_origin = href
            .as_ref()
            .is_some_and(|location| origin_of(location) != origin_of(&self.url));
        self.stylesheets.push(StylesheetEntry {
            href,
            sheet: parse_stylesheet(css),
            cross_origin,
        });
    }

    fn restyle(&mut self) {
        self.stylesheet_generation = self.stylesheet_generation.wrapping_add(1);
        self.engine
            .rebuild(self.stylesheets.iter().map(|entry| &entry.sheet));
        trace!("stylesheet generation {}", self.stylesheet_generation);
    }

    /// Append a stylesheet after every existing one. A sheet whose `href`
    /// has a different origin than the page is marked cross-origin.
    pub fn add_stylesheet(&mut self, href: Option<Url>, css: &str) {
        self.push_sheet(href, css);
        self.restyle();
    }

    pub const fn url(&self) -> &Url {
        &self.url
    }

    pub const fn config(&self) -> &PageConfig {
        &self.config
    }

    pub const fn document(&self) -> &Document {
        &self.document
    }

    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn stylesheets(&self) -> &[StylesheetEntry] {
        &self.stylesheets
    }

    pub fn stylesheet_count(&self) -> usize {
        self.stylesheets.len()
    }

    /// Bumped whenever the set of stylesheets changes.
    pub const fn stylesheet_generation(&self) -> u64 {
        self.stylesheet_generation
    }

    /// Read a sheet's rules the way page script would.
    ///
    /// # Errors
    /// [`PageError::CrossOriginStylesheet`] for sheets from another origin and
    /// [`PageError::UnknownStylesheet`] for an index past the end.
    pub fn read_stylesheet(&self, index: usize) -> Result<&Stylesheet, PageError> {
        let entry = self
            .stylesheets
            .get(index)
            .ok_or(PageError::UnknownStylesheet(index))?;
        if entry.cross_origin {
            return Err(PageError::CrossOriginStylesheet {
                href: entry
                    .href
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            });
        }
        Ok(&entry.sheet)
    }

    /// Resolved style of a connected element; `None` otherwise.
    pub fn computed_style(&self, node: NodeId) -> Option<ComputedStyle> {
        if !self.document.is_connected(node) {
            return None;
        }
        self.engine.computed_style(&self.document, node)
    }

    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        query_selector(&self.document, selector)
    }

    /// Page URL, overridden by the first `<base href>`.
    pub fn base_url(&self) -> Url {
        let doc = &self.document;
        doc.head()
            .and_then(|head| {
                doc.element_children(head)
                    .filter(|child| doc.tag_name(*child) == Some("base"))
                    .find_map(|base| doc.attr(base, "href"))
            })
            .and_then(|href| self.url.join(href).ok())
            .unwrap_or_else(|| self.url.clone())
    }

    /// Absolute form of a URL found in the page; unresolvable input comes back as-is.
    pub fn resolve_url(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.starts_with("data:") {
            return trimmed.to_owned();
        }
        self.base_url()
            .join(trimmed)
            .map_or_else(|_| trimmed.to_owned(), |resolved| resolved.to_string())
    }

    pub const fn viewport(&self) -> Viewport {
        self.engine.viewport()
    }

    pub const fn resize(&mut self, width: f64, height: f64) {
        self.engine.set_viewport(Viewport { width, height });
    }

    /// Scroll by a delta; offsets never go negative.
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.scroll_to(self.scroll_x + dx, self.scroll_y + dy);
    }

    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll_x = x.max(0.0);
        self.scroll_y = y.max(0.0);
    }

    pub const fn scroll_position(&self) -> (f64, f64) {
        (self.scroll_x, self.scroll_y)
    }

    pub const fn layout(&self) -> &LayoutMap {
        &self.layout
    }

    pub fn set_layout(&mut self, node: NodeId, rect: LayoutRect) {
        self.layout.set(node, rect);
    }

    /// Replace the layout with a JSON description.
    ///
    /// # Errors
    /// See [`LayoutMap::from_json`].
    pub fn load_layout_json(&mut self, json: &str) -> Result<(), PageError> {
        self.layout = LayoutMap::from_json(&self.document, json)?;
        Ok(())
    }

    /// Border box in viewport coordinates, like `getBoundingClientRect`.
    pub fn bounding_client_rect(&self, node: NodeId) -> Option<LayoutRect> {
        if !self.document.is_connected(node) {
            return None;
        }
        self.layout
            .get(node)
            .map(|rect| rect.translated(-self.scroll_x, -self.scroll_y))
    }

    /// Topmost element at a viewport point, like `elementFromPoint`.
    /// Later elements in tree order paint above earlier ones; elements with
    /// `pointer-events: none` or `display: none` are transparent to hits.
    pub fn element_from_point(&self, x: f64, y: f64) -> Option<NodeId> {
        self.document
            .elements()
            .into_iter()
            .rev()
            .filter(|element| {
                self.bounding_client_rect(*element)
                    .is_some_and(|rect| rect.contains(x, y))
            })
            .find(|element| {
                self.computed_style(*element)
                    .is_some_and(|style| !style.ignores_pointer() && !style.is_display_none())
            })
    }
}
