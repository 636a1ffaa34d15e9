//! Style Sampler: an element's resolved style as a [`StyleSnapshot`].

use css::values::format_px;
use html::NodeId;
use page_handler::HtmlPage;

use crate::record::StyleSnapshot;

/// Read the resolved style of `node`. Non-elements and detached nodes give
/// the empty snapshot. Width and height report the used box size when the
/// page knows the element's geometry.
pub fn sample(page: &HtmlPage, node: NodeId) -> StyleSnapshot {
    let Some(computed) = page.computed_style(node) else {
        return StyleSnapshot::default();
    };
    let value = |name: &str| computed.property_value(name);
    let layout = page.layout().get(node);
    StyleSnapshot {
        color: value("color"),
        background_color: value("background-color"),
        font_family: value("font-family"),
        font_size: value("font-size"),
        padding: computed.padding(),
        margin: computed.margin(),
        border: computed.border(),
        border_radius: computed.border_radius(),
        font_weight: value("font-weight"),
        line_height: value("line-height"),
        display: value("display"),
        width: layout.map_or_else(|| value("width"), |rect| format_px(rect.width)),
        height: layout.map_or_else(|| value("height"), |rect| format_px(rect.height)),
        margin_top: value("margin-top"),
        margin_right: value("margin-right"),
        margin_bottom: value("margin-bottom"),
        margin_left: value("margin-left"),
        background_image: value("background-image"),
    }
}
