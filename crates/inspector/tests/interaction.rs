use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Error, anyhow};
use css_style_attr::get_property;
use html::NodeId;
use inspector::messaging::{self, MessageReceiver};
use inspector::storage::{CURRENT_ELEMENT_KEY, INSPECT_ENABLED_KEY};
use inspector::{
    ElementRecord, EventDisposition, InspectMode, Inspector, InspectorConfig, MemoryStore, Message,
    PageEvent, PanelSection, PointerEventKind, SharedStore, StoreChange,
};
use page_handler::{HtmlPage, PageConfig};
use serde_json::{Map, Value, json};
use url::Url;

const PAGE: &str = r##"<!doctype html>
<html><head><style>
  .cta { padding: 10px 20px; background-color: #6366f1; color: white }
</style></head>
<body>
  <button id="buy" class="cta primary">Buy now</button>
  <div id="card" style="--accent: #10b981; --gap: 8px">
    <h2 id="title" style="--accent: #ff0000">Title</h2>
  </div>
  <div id="lens-toolbar"><span id="tool">tool</span></div>
</body></html>"##;

const LAYOUT: &str = r##"[
  {"selector": "html", "x": 0, "y": 0, "width": 1280, "height": 800},
  {"selector": "body", "x": 0, "y": 0, "width": 1280, "height": 800},
  {"selector": "#buy", "x": 20, "y": 20, "width": 120, "height": 40},
  {"selector": "#card", "x": 200, "y": 0, "width": 300, "height": 200},
  {"selector": "#title", "x": 210, "y": 10, "width": 100, "height": 30},
  {"selector": "#lens-toolbar", "x": 600, "y": 0, "width": 100, "height": 100},
  {"selector": "#tool", "x": 610, "y": 10, "width": 50, "height": 20}
]"##;

struct Harness {
    inspector: Inspector,
    store: Arc<MemoryStore>,
    outbound: MessageReceiver,
}

fn harness_with(store: Arc<MemoryStore>) -> Result<Harness, Error> {
    let url = Url::parse("https://shop.example.com/")?;
    let mut page = HtmlPage::from_html(url, PAGE, PageConfig::default());
    page.load_layout_json(LAYOUT)?;
    let (sender, outbound) = messaging::channel();
    let shared: Arc<dyn SharedStore> = Arc::clone(&store) as Arc<dyn SharedStore>;
    let inspector = Inspector::new(page, &InspectorConfig::default(), shared, sender);
    Ok(Harness {
        inspector,
        store,
        outbound,
    })
}

fn harness() -> Result<Harness, Error> {
    harness_with(Arc::new(MemoryStore::new()))
}

fn by_id(inspector: &Inspector, id: &str) -> Result<NodeId, Error> {
    inspector
        .page()
        .document()
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("missing #{id}"))
}

fn overlay_style(inspector: &Inspector) -> Result<String, Error> {
    let overlay = inspector
        .overlay()
        .overlay()
        .ok_or_else(|| anyhow!("overlay not installed"))?;
    Ok(inspector
        .page()
        .document()
        .attr(overlay, "style")
        .unwrap_or_default()
        .to_owned())
}

fn stored_record(store: &MemoryStore) -> Result<ElementRecord, Error> {
    let value = store
        .get(CURRENT_ELEMENT_KEY)
        .ok_or_else(|| anyhow!("no current element"))?;
    Ok(serde_json::from_value(value)?)
}

#[test]
fn hover_samples_publishes_and_renders() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness()?;
    let buy = by_id(&harness.inspector, "buy")?;

    harness.inspector.pointer_move(30.0, 30.0);
    assert_eq!(harness.inspector.last_hovered(), Some(buy));

    let record = stored_record(&harness.store)?;
    assert_eq!(record.tag_name, "button");
    assert_eq!(record.inner_text, "Buy now");
    assert_eq!(record.styles.padding, "10px 20px");
    assert_eq!(record.styles.width, "120px");
    assert!(record.assets.images.is_empty());

    let panel = harness
        .inspector
        .panel()
        .ok_or_else(|| anyhow!("panel hidden"))?;
    assert_eq!(panel.header, "button.cta.primary");
    assert!(panel.sections.contains(&PanelSection::Color("rgb(255, 255, 255)".to_owned())));
    assert!(panel.sections.contains(&PanelSection::Background("rgb(99, 102, 241)".to_owned())));
    assert!(panel.sections.contains(&PanelSection::Spacing {
        padding: Some("10px 20px".to_owned()),
        radius: None,
    }));

    let style = overlay_style(&harness.inspector)?;
    assert_eq!(get_property(&style, "display").as_deref(), Some("block"));
    assert_eq!(get_property(&style, "left").as_deref(), Some("20px"));
    assert_eq!(get_property(&style, "width").as_deref(), Some("120px"));
    assert_eq!(get_property(&style, "border-style").as_deref(), Some("dashed"));
    assert_eq!(get_property(&style, "border-color").as_deref(), Some("#6366f1"));
    Ok(())
}

#[test]
fn panel_lists_nearest_inline_variables_first() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness()?;
    harness.inspector.pointer_move(220.0, 20.0);
    let panel = harness
        .inspector
        .panel()
        .ok_or_else(|| anyhow!("panel hidden"))?;
    let Some(PanelSection::Variables(rows)) = panel.sections.first() else {
        return Err(anyhow!("no variables section"));
    };
    let names: Vec<(&str, &str, bool)> = rows
        .iter()
        .map(|row| (row.name.as_str(), row.value.as_str(), row.swatch))
        .collect();
    assert_eq!(names, vec![("--accent", "#ff0000", true), ("--gap", "8px", false)]);
    Ok(())
}

#[test]
fn hits_on_inspector_ui_change_nothing() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness()?;
    let buy = by_id(&harness.inspector, "buy")?;
    let tool = by_id(&harness.inspector, "tool")?;

    harness.inspector.pointer_move(30.0, 30.0);
    let before = overlay_style(&harness.inspector)?;
    harness.inspector.pointer_move(620.0, 15.0);
    assert_eq!(harness.inspector.last_hovered(), Some(buy));
    assert_eq!(overlay_style(&harness.inspector)?, before);

    let disposition =
        harness
            .inspector
            .pointer_event(PointerEventKind::Click, 620.0, 15.0, Some(tool));
    assert_eq!(disposition, EventDisposition::PassThrough);
    assert_eq!(harness.inspector.selected(), None);
    Ok(())
}

#[test]
fn disabled_inspector_leaves_page_alone() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = Arc::new(MemoryStore::new());
    store.set(INSPECT_ENABLED_KEY, json!(false))?;
    let mut harness = harness_with(store)?;
    let buy = by_id(&harness.inspector, "buy")?;
    assert_eq!(harness.inspector.mode(), InspectMode::Disabled);

    harness.inspector.pointer_move(30.0, 30.0);
    assert_eq!(harness.inspector.last_hovered(), None);
    for kind in [
        PointerEventKind::Down,
        PointerEventKind::Up,
        PointerEventKind::Click,
        PointerEventKind::DoubleClick,
        PointerEventKind::ContextMenu,
    ] {
        let disposition = harness.inspector.pointer_event(kind, 30.0, 30.0, Some(buy));
        assert_eq!(disposition, EventDisposition::PassThrough);
    }
    assert_eq!(harness.inspector.selected(), None);
    assert!(harness.store.get(CURRENT_ELEMENT_KEY).is_none());

    let doc = harness.inspector.page().document();
    let body = doc.body().ok_or_else(|| anyhow!("no body"))?;
    assert!(!doc.has_class(body, "lens-inspect-mode"));
    Ok(())
}

#[test]
fn click_selects_persists_and_glows_briefly() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness()?;
    let buy = by_id(&harness.inspector, "buy")?;
    harness.inspector.pointer_move(30.0, 30.0);

    let down = harness
        .inspector
        .pointer_event(PointerEventKind::Down, 30.0, 30.0, Some(buy));
    assert_eq!(down, EventDisposition::Suppressed);
    assert_eq!(harness.inspector.selected(), None);

    let click = harness
        .inspector
        .pointer_event(PointerEventKind::Click, 30.0, 30.0, Some(buy));
    assert_eq!(click, EventDisposition::Suppressed);
    assert_eq!(harness.inspector.selected(), Some(buy));
    assert_eq!(stored_record(&harness.store)?.tag_name, "button");

    let style = overlay_style(&harness.inspector)?;
    assert_eq!(
        get_property(&style, "box-shadow").as_deref(),
        Some("0 0 20px #6366f1")
    );
    assert!(!harness.inspector.tick(Instant::now()));
    assert!(harness.inspector.tick(Instant::now() + Duration::from_secs(1)));
    let style = overlay_style(&harness.inspector)?;
    assert_eq!(get_property(&style, "box-shadow"), None);
    assert_eq!(get_property(&style, "transition"), None);
    Ok(())
}

#[test]
fn pick_mode_captures_once_for_the_assistant() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness()?;
    let buy = by_id(&harness.inspector, "buy")?;

    harness.inspector.handle_message(Message::SetInspect { enabled: false });
    harness.inspector.handle_message(Message::StartPickingForAi);
    assert_eq!(harness.inspector.mode(), InspectMode::Picking);

    harness.inspector.pointer_move(30.0, 30.0);
    let style = overlay_style(&harness.inspector)?;
    assert_eq!(get_property(&style, "border-color").as_deref(), Some("#10b981"));
    assert_eq!(get_property(&style, "border-style").as_deref(), Some("solid"));

    let click = harness
        .inspector
        .pointer_event(PointerEventKind::Click, 30.0, 30.0, Some(buy));
    assert_eq!(click, EventDisposition::Suppressed);
    assert_eq!(harness.inspector.mode(), InspectMode::Idle);
    assert_eq!(harness.inspector.selected(), None);

    let Ok(Message::ElementPickedForAi { element }) = harness.outbound.try_recv() else {
        return Err(anyhow!("no pick message"));
    };
    assert_eq!(element.record.tag_name, "button");
    assert!(element.outer_html.contains("Buy now"));
    assert!(matches!(harness.outbound.try_recv(), Err(_)));

    let style = overlay_style(&harness.inspector)?;
    assert_eq!(get_property(&style, "border-color"), None);
    Ok(())
}

#[test]
fn inspect_toggle_follows_messages_and_store_changes() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness()?;
    harness.inspector.pointer_move(30.0, 30.0);
    assert!(harness.inspector.overlay().is_visible(harness.inspector.page()));

    harness.inspector.handle_store_change(&StoreChange {
        key: INSPECT_ENABLED_KEY.to_owned(),
        new_value: json!(false),
    });
    assert_eq!(harness.inspector.mode(), InspectMode::Disabled);
    assert!(!harness.inspector.overlay().is_visible(harness.inspector.page()));
    assert!(harness.inspector.panel().is_none());

    harness.inspector.handle_message(Message::SetInspect { enabled: true });
    assert_eq!(harness.inspector.mode(), InspectMode::Idle);
    assert!(harness.inspector.overlay().is_visible(harness.inspector.page()));
    let doc = harness.inspector.page().document();
    let body = doc.body().ok_or_else(|| anyhow!("no body"))?;
    assert!(doc.has_class(body, "lens-inspect-mode"));
    Ok(())
}

#[test]
fn apply_styles_message_targets_hovered_element() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness()?;
    let buy = by_id(&harness.inspector, "buy")?;
    harness.inspector.pointer_move(30.0, 30.0);

    let mut styles = Map::new();
    styles.insert("backgroundColor".to_owned(), Value::from("red"));
    harness.inspector.handle_message(Message::ApplyStyles { styles });

    let style = harness
        .inspector
        .page()
        .computed_style(buy)
        .ok_or_else(|| anyhow!("no style"))?;
    assert_eq!(style.property_value("background-color"), "rgb(255, 0, 0)");
    assert_eq!(
        stored_record(&harness.store)?.styles.background_color,
        "rgb(255, 0, 0)"
    );
    Ok(())
}

#[tokio::test]
async fn run_loop_drains_page_events() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let harness = harness()?;
    let buy = by_id(&harness.inspector, "buy")?;
    let (events, receiver) = tokio::sync::mpsc::unbounded_channel();
    let (_messages, message_receiver) = messaging::channel();

    events.send(PageEvent::PointerMove { x: 30.0, y: 30.0 })?;
    events.send(PageEvent::Pointer {
        kind: PointerEventKind::Click,
        x: 30.0,
        y: 30.0,
        target: Some(buy),
    })?;
    drop(events);

    let inspector = harness.inspector.run(receiver, message_receiver).await;
    assert_eq!(inspector.last_hovered(), Some(buy));
    assert_eq!(inspector.selected(), Some(buy));
    assert!(!inspector.overlay().is_visible(inspector.page()));
    Ok(())
}

#[test]
fn scroll_and_resize_rehit_under_a_still_pointer() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness()?;
    let buy = by_id(&harness.inspector, "buy")?;
    let body = harness
        .inspector
        .page()
        .document()
        .body()
        .ok_or_else(|| anyhow!("no body"))?;

    harness.inspector.pointer_move(30.0, 30.0);
    assert_eq!(harness.inspector.last_hovered(), Some(buy));
    let style = overlay_style(&harness.inspector)?;
    assert_eq!(get_property(&style, "top").as_deref(), Some("20px"));

    harness.inspector.scroll(0.0, 10.0);
    assert_eq!(harness.inspector.last_hovered(), Some(buy));
    let style = overlay_style(&harness.inspector)?;
    assert_eq!(get_property(&style, "top").as_deref(), Some("10px"));

    harness.inspector.resize(1024.0, 768.0);
    assert_eq!(harness.inspector.last_hovered(), Some(buy));
    assert!(harness.inspector.panel().is_some());

    harness.inspector.scroll(0.0, 40.0);
    assert_eq!(harness.inspector.last_hovered(), Some(body));
    let style = overlay_style(&harness.inspector)?;
    assert_eq!(get_property(&style, "display").as_deref(), Some("none"));
    assert!(harness.inspector.panel().is_none());
    Ok(())
}

#[test]
fn overlay_hides_when_nothing_is_under_the_pointer() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness()?;
    harness.inspector.pointer_move(30.0, 30.0);
    assert!(harness.inspector.panel().is_some());

    harness.inspector.scroll(0.0, 5000.0);
    let style = overlay_style(&harness.inspector)?;
    assert_eq!(get_property(&style, "display").as_deref(), Some("none"));
    assert!(harness.inspector.panel().is_none());
    Ok(())
}

#[test]
fn repeated_renders_reuse_panel_nodes() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut harness = harness()?;
    harness.inspector.pointer_move(30.0, 30.0);
    let allocated = harness.inspector.page().document().allocated_nodes();
    for step in 0..500_u32 {
        harness.inspector.pointer_move(30.0 + f64::from(step % 50), 30.0);
    }
    assert_eq!(harness.inspector.page().document().allocated_nodes(), allocated);
    Ok(())
}
