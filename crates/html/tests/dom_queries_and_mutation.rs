use anyhow::{Error, anyhow};
use html::{Document, NodeId, parse_document};

fn by_id(doc: &Document, id: &str) -> Result<NodeId, Error> {
    doc.get_element_by_id(id)
        .ok_or_else(|| anyhow!("missing #{id}"))
}

const PAGE: &str = r#"<!doctype html>
<html><head><title>t</title><style>.x { color: red }</style></head>
<body>
  <div id="card" class="card  shadow">
    <h1 id="title">Hello <b>there</b></h1>
    <p id="para">One<br>two</p>
    <script>var hidden = 1;</script>
  </div>
  <svg id="icon" viewBox="0 0 10 10"><linearGradient id="g"></linearGradient></svg>
</body></html>"#;

#[test]
fn parses_structure_and_attributes() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse_document(PAGE);
    let html = doc.document_element().ok_or_else(|| anyhow!("no <html>"))?;
    assert_eq!(doc.tag_name(html), Some("html"));
    let body = doc.body().ok_or_else(|| anyhow!("no <body>"))?;
    assert!(doc.head().is_some());

    let card = by_id(&doc, "card")?;
    assert_eq!(doc.parent_element(card), Some(body));
    assert_eq!(doc.class_list(card), vec!["card", "shadow"]);
    assert!(doc.has_class(card, "shadow"));
    assert!(!doc.has_class(card, "Shadow"));

    let icon = by_id(&doc, "icon")?;
    assert_eq!(doc.attr(icon, "viewBox"), Some("0 0 10 10"));
    let gradient = doc
        .first_element_child(icon)
        .ok_or_else(|| anyhow!("svg child missing"))?;
    assert_eq!(doc.tag_name(gradient), Some("linearGradient"));
    Ok(())
}

#[test]
fn text_accessors_skip_scripts_for_rendered_text() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse_document(PAGE);
    let card = by_id(&doc, "card")?;
    let rendered = doc.inner_text(card);
    assert_eq!(rendered, "Hello there One two");
    assert!(doc.text_content(card).contains("var hidden"));
    Ok(())
}

#[test]
fn contains_is_inclusive_and_tracks_detachment() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = parse_document(PAGE);
    let card = by_id(&doc, "card")?;
    let title = by_id(&doc, "title")?;
    assert!(doc.contains(card, card));
    assert!(doc.contains(card, title));
    assert!(!doc.contains(title, card));

    let before = doc.generation();
    doc.detach(card);
    assert!(doc.generation() > before);
    assert!(!doc.is_connected(card));
    assert!(!doc.is_connected(title));
    assert!(doc.get_element_by_id("title").is_none());
    Ok(())
}

#[test]
fn outer_html_escapes_and_keeps_raw_text() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse_document(
        r#"<body><p id="p" title="a &quot;b&quot;">x &lt; y<br></p><style>a > b {}</style></body>"#,
    );
    let para = by_id(&doc, "p")?;
    assert_eq!(
        doc.outer_html(para),
        r#"<p id="p" title="a &quot;b&quot;">x &lt; y<br></p>"#
    );
    let body = doc.body().ok_or_else(|| anyhow!("no body"))?;
    assert!(doc.inner_html(body).ends_with("<style>a > b {}</style>"));
    Ok(())
}

#[test]
fn class_and_attribute_mutations() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = parse_document(r#"<body><button id="b" class="cta primary">Go</button></body>"#);
    let button = by_id(&doc, "b")?;

    doc.add_class(button, "big");
    doc.add_class(button, "big");
    assert_eq!(doc.attr(button, "class"), Some("cta primary big"));

    doc.remove_class(button, "cta");
    assert_eq!(doc.class_list(button), vec!["primary", "big"]);

    doc.set_class_name(button, "solo");
    assert_eq!(doc.attr(button, "class"), Some("solo"));

    doc.set_attr(button, "data-x", "1");
    doc.set_attr(button, "data-x", "2");
    assert_eq!(doc.attr(button, "data-x"), Some("2"));
    doc.remove_attr(button, "data-x");
    assert_eq!(doc.attr(button, "data-x"), None);
    Ok(())
}

#[test]
fn text_and_html_setters_replace_children() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = parse_document(r#"<body><div id="d"><span>old</span></div></body>"#);
    let div = by_id(&doc, "d")?;

    doc.set_text_content(div, "<b>literal</b>");
    assert_eq!(doc.inner_html(div), "&lt;b&gt;literal&lt;/b&gt;");

    doc.set_text_content(div, "");
    assert_eq!(doc.children(div).count(), 0);

    doc.set_inner_html(div, r#"<em class="x">new</em> tail"#);
    assert_eq!(doc.inner_html(div), r#"<em class="x">new</em> tail"#);
    let em = doc
        .first_element_child(div)
        .ok_or_else(|| anyhow!("fragment not inserted"))?;
    assert!(doc.is_connected(em));
    assert_eq!(doc.text_content(em), "new");
    Ok(())
}

#[test]
fn closest_with_id_prefix_walks_ancestors() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse_document(
        r#"<body><div id="lens-floating-panel"><span id="inner"><i id="leaf"></i></span></div></body>"#,
    );
    let leaf = by_id(&doc, "leaf")?;
    let panel = by_id(&doc, "lens-floating-panel")?;
    assert_eq!(doc.closest_with_id_prefix(leaf, "lens-"), Some(panel));
    assert_eq!(doc.closest_with_id_prefix(leaf, "nope-"), None);
    Ok(())
}

#[test]
fn replaced_children_are_freed() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = parse_document(PAGE);
    let para = by_id(&doc, "para")?;
    let title = by_id(&doc, "title")?;
    doc.set_inner_html(para, "<b>bold</b> text");
    let allocated = doc.allocated_nodes();
    for _ in 0..100 {
        doc.set_inner_html(para, "<b>bold</b> text");
        doc.set_text_content(title, "Hello");
        doc.set_text_content(title, "Hello");
    }
    assert_eq!(doc.allocated_nodes(), allocated - 2);

    let bold = doc
        .first_element_child(para)
        .ok_or_else(|| anyhow!("missing <b>"))?;
    doc.remove_children(para);
    assert!(!doc.is_connected(bold));
    assert_eq!(doc.children(bold).count(), 0);
    assert_eq!(doc.text_content(bold), "");
    Ok(())
}
