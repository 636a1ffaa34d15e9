use anyhow::{Error, anyhow};
use page_handler::{HtmlPage, LayoutRect, PageConfig, PageError};
use url::Url;

const PAGE: &str = r#"<!doctype html>
<html><head>
  <style>:root { --brand: #6366f1 } .cta { padding: 10px 20px }</style>
  <link rel="stylesheet" href="https://cdn.example.net/remote.css">
</head>
<body>
  <div id="wrap"><button id="buy" class="cta primary">Buy now</button></div>
  <div id="ghost" style="pointer-events: none">ghost</div>
  <img id="logo" src="img/logo.png">
</body></html>"#;

fn page() -> Result<HtmlPage, Error> {
    let url = Url::parse("https://shop.example.com/products/index.html")?;
    Ok(HtmlPage::from_html(url, PAGE, PageConfig::default()))
}

#[test]
fn inline_sheets_apply_and_links_are_not_fetched() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let page = page()?;
    assert_eq!(page.stylesheet_count(), 1);
    let buy = page
        .query_selector("button.cta")
        .ok_or_else(|| anyhow!("no button"))?;
    let style = page
        .computed_style(buy)
        .ok_or_else(|| anyhow!("no style"))?;
    assert_eq!(style.padding(), "10px 20px");
    assert!(matches!(page.read_stylesheet(0), Ok(_)));
    assert!(matches!(
        page.read_stylesheet(3),
        Err(PageError::UnknownStylesheet(3))
    ));
    Ok(())
}

#[test]
fn cross_origin_sheets_apply_but_stay_unreadable() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut page = page()?;
    let generation = page.stylesheet_generation();
    let remote = Url::parse("https://cdn.example.net/theme.css")?;
    page.add_stylesheet(Some(remote), "#buy { color: red }");
    let local = Url::parse("https://shop.example.com/site.css")?;
    page.add_stylesheet(Some(local), "#buy { margin: 4px }");
    assert!(page.stylesheet_generation() > generation);

    assert!(matches!(
        page.read_stylesheet(1),
        Err(PageError::CrossOriginStylesheet { .. })
    ));
    assert!(matches!(page.read_stylesheet(2), Ok(_)));

    let buy = page
        .document()
        .get_element_by_id("buy")
        .ok_or_else(|| anyhow!("no #buy"))?;
    let style = page
        .computed_style(buy)
        .ok_or_else(|| anyhow!("no style"))?;
    assert_eq!(style.property_value("color"), "rgb(255, 0, 0)");
    assert_eq!(style.margin(), "4px");
    Ok(())
}

#[test]
fn hit_testing_prefers_innermost_and_skips_pointer_transparent() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut page = page()?;
    page.load_layout_json(
        r##"[
        {"selector": "body", "x": 0, "y": 0, "width": 1280, "height": 800},
        {"selector": "#wrap", "x": 0, "y": 0, "width": 400, "height": 100},
        {"selector": "#buy", "x": 20, "y": 20, "width": 120, "height": 40},
        {"selector": "#ghost", "x": 0, "y": 0, "width": 400, "height": 400}
    ]"##,
    )?;
    let doc = page.document();
    let buy = doc.get_element_by_id("buy");
    let wrap = doc.get_element_by_id("wrap");
    let body = doc.body();

    assert_eq!(page.element_from_point(30.0, 30.0), buy);
    assert_eq!(page.element_from_point(300.0, 80.0), wrap);
    assert_eq!(page.element_from_point(300.0, 300.0), body);

    page.scroll_by(0.0, 15.0);
    assert_eq!(page.scroll_position(), (0.0, 15.0));
    let rect = buy.and_then(|node| page.bounding_client_rect(node));
    assert_eq!(rect, Some(LayoutRect::new(20.0, 5.0, 120.0, 40.0)));
    assert_eq!(page.element_from_point(30.0, 10.0), buy);
    page.scroll_by(0.0, -100.0);
    assert_eq!(page.scroll_position(), (0.0, 0.0));
    Ok(())
}

#[test]
fn detached_elements_have_no_style_or_box() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut page = page()?;
    let buy = page
        .document()
        .get_element_by_id("buy")
        .ok_or_else(|| anyhow!("no #buy"))?;
    page.set_layout(buy, LayoutRect::new(0.0, 0.0, 10.0, 10.0));
    page.document_mut().detach(buy);
    assert!(page.computed_style(buy).is_none());
    assert!(page.bounding_client_rect(buy).is_none());
    Ok(())
}

#[test]
fn urls_resolve_against_page_or_base() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let page = page()?;
    assert_eq!(
        page.resolve_url("img/logo.png"),
        "https://shop.example.com/products/img/logo.png"
    );
    assert_eq!(page.resolve_url("data:image/png;base64,AA=="), "data:image/png;base64,AA==");

    let with_base = HtmlPage::from_html(
        Url::parse("https://shop.example.com/a/b.html")?,
        r#"<html><head><base href="https://static.example.com/v2/"></head><body></body></html>"#,
        PageConfig::default(),
    );
    assert_eq!(
        with_base.resolve_url("x.png"),
        "https://static.example.com/v2/x.png"
    );
    Ok(())
}

#[tokio::test]
async fn loads_file_pages_with_linked_stylesheets() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("site.css"), "#hero { background-color: #ff0000 }")?;
    std::fs::write(
        dir.path().join("index.html"),
        r#"<html><head><link rel="stylesheet" href="site.css"><link rel="stylesheet" href="missing.css"></head>
<body><section id="hero">Hi</section></body></html>"#,
    )?;
    let url = Url::from_file_path(dir.path().join("index.html"))
        .map_err(|()| anyhow!("bad temp path"))?;
    let page = HtmlPage::load(url, PageConfig::default()).await?;
    assert_eq!(page.stylesheet_count(), 1);
    assert!(matches!(page.read_stylesheet(0), Ok(_)));
    let hero = page
        .query_selector("#hero")
        .ok_or_else(|| anyhow!("no hero"))?;
    let style = page
        .computed_style(hero)
        .ok_or_else(|| anyhow!("no style"))?;
    assert_eq!(style.property_value("background-color"), "rgb(255, 0, 0)");
    Ok(())
}
