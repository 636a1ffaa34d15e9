//! Subcommand implementations. Every command writes its report to the given
//! writer so the binary and the tests share one code path.

use std::fs;
use std::io::{self, Read as _, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Error, anyhow, bail};
use companion::chat::api_key;
use companion::summary::{export_json, tailwind_classes};
use companion::{
    AssistantConfig, ChatSession, ElementSummary, GeminiClient, ImageAttachment, ReplyOutcome,
    Sender, downloads,
};
use html::NodeId;
use inspector::edit::{self, AppliedEdit, Interpretation};
use inspector::storage::{
    CURRENT_ELEMENT_KEY, GEMINI_API_KEY, INSPECT_ENABLED_KEY, inspect_enabled,
};
use inspector::{
    ElementRecord, InspectorConfig, JsonFileStore, Message, PaletteMiner, PickedElement,
    SharedStore, messaging,
};
use log::{info, warn};
use page_handler::{HtmlPage, PageConfig};
use serde_json::{Value, json};
use url::Url;

use crate::cli::{Cli, Commands, ConfigAction, Target};

/// Run one parsed command line.
///
/// # Errors
/// Any failure of the selected command.
pub async fn run(cli: Cli, out: &mut impl Write) -> Result<(), Error> {
    let store_path = match cli.store {
        Some(path) => path,
        None => JsonFileStore::default_path()?,
    };
    let store = JsonFileStore::open(&store_path)?;
    match cli.command {
        Commands::Inspect {
            target,
            json,
            publish,
        } => inspect(&target, json, publish, &store, out).await,
        Commands::Palette { page, cap } => palette(&page, cap, out).await,
        Commands::Edit {
            target,
            response,
            output,
        } => {
            let text = read_response(response.as_deref())?;
            edit_offline(&target, &text, output.as_deref(), out).await
        }
        Commands::Ask {
            target,
            prompt,
            images,
            output,
        } => ask(&target, &prompt, &images, output.as_deref(), &store, out).await,
        Commands::Assets { target, out: dir } => assets(&target, &dir, out).await,
        Commands::Config { action } => config(action, &store, &store_path, out),
    }
}

/// Accept URLs as-is and turn anything else into a `file:` URL.
pub fn page_url(page: &str) -> Result<Url, Error> {
    if let Ok(url) = Url::parse(page)
        && matches!(url.scheme(), "http" | "https" | "file")
    {
        return Ok(url);
    }
    let path = fs::canonicalize(page).with_context(|| format!("no such page: {page}"))?;
    Url::from_file_path(&path).map_err(|()| anyhow!("not an absolute path: {}", path.display()))
}

async fn load_page(page: &str) -> Result<HtmlPage, Error> {
    HtmlPage::load(page_url(page)?, PageConfig::from_env()).await
}

fn load_layout(page: &mut HtmlPage, target: &Target) -> Result<(), Error> {
    if let Some(path) = &target.layout {
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading layout {}", path.display()))?;
        page.load_layout_json(&json)?;
    }
    Ok(())
}

/// The element a command targets: by selector, by point, or `<body>`.
fn resolve_target(page: &mut HtmlPage, target: &Target) -> Result<NodeId, Error> {
    load_layout(page, target)?;
    if let Some(selector) = &target.selector {
        return page
            .query_selector(selector)
            .ok_or_else(|| anyhow!("no element matches `{selector}`"));
    }
    if let Some(&[x, y]) = target.at.as_deref() {
        return page
            .element_from_point(x, y)
            .ok_or_else(|| anyhow!("no element at ({x}, {y})"));
    }
    page.document()
        .body()
        .ok_or_else(|| anyhow!("page has no body"))
}

fn mine_palette(page: &HtmlPage, cap: Option<usize>) -> Vec<String> {
    let config = InspectorConfig::from_env();
    PaletteMiner::new(cap.unwrap_or(config.palette_cap), config.refresh_palette).palette(page)
}

fn capture(page: &HtmlPage, node: NodeId) -> Result<ElementRecord, Error> {
    ElementRecord::capture(page, node, &mine_palette(page, None))
        .ok_or_else(|| anyhow!("target is not an element"))
}

async fn inspect(
    target: &Target,
    json: bool,
    publish: bool,
    store: &dyn SharedStore,
    out: &mut impl Write,
) -> Result<(), Error> {
    let mut page = load_page(&target.page).await?;
    let node = resolve_target(&mut page, target)?;
    let record = capture(&page, node)?;
    if publish {
        store.set(CURRENT_ELEMENT_KEY, serde_json::to_value(&record)?)?;
        info!("published <{}> as the current element", record.tag_name);
    }
    if json {
        writeln!(out, "{}", export_json(&record)?)?;
    } else {
        write_summary(out, &record)?;
    }
    Ok(())
}

fn write_summary(out: &mut impl Write, record: &ElementRecord) -> io::Result<()> {
    let summary = ElementSummary::from_record(record);
    let assets = &record.assets;
    writeln!(out, "<{}> {}", summary.tag_name, summary.inner_text)?;
    writeln!(out, "  color       {}", summary.color)?;
    writeln!(out, "  background  {}", summary.background_color)?;
    writeln!(out, "  font        {} {}", summary.font_family, summary.font_size)?;
    writeln!(out, "  padding     {}", summary.padding)?;
    writeln!(out, "  margin      {}", summary.margin)?;
    writeln!(out, "  contrast    {}", summary.contrast)?;
    writeln!(out, "  tailwind    {}", tailwind_classes(&record.styles))?;
    writeln!(out, "  palette     {}", summary.palette.join(", "))?;
    writeln!(
        out,
        "  assets      {} images, {} svgs, {} lotties, {} gradients, {} videos",
        assets.images.len(),
        assets.svgs.len(),
        assets.lotties.len(),
        assets.gradients.len(),
        assets.videos.len()
    )
}

async fn palette(page: &str, cap: Option<usize>, out: &mut impl Write) -> Result<(), Error> {
    let page = load_page(page).await?;
    for color in mine_palette(&page, cap) {
        writeln!(out, "{color}")?;
    }
    Ok(())
}

fn read_response(path: Option<&Path>) -> Result<String, Error> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading response {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn describe(applied: &AppliedEdit) -> String {
    let mut parts = Vec::new();
    if !applied.properties.is_empty() {
        parts.push(format!("styles {}", applied.properties.join(", ")));
    }
    if applied.text_replaced {
        parts.push("text".to_owned());
    }
    if applied.html_replaced {
        parts.push("html".to_owned());
    }
    if applied.classes_changed {
        parts.push("classes".to_owned());
    }
    if parts.is_empty() {
        "nothing changed".to_owned()
    } else {
        format!("applied {}", parts.join("; "))
    }
}

fn write_result(
    page: &HtmlPage,
    node: NodeId,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<(), Error> {
    match output {
        Some(path) => {
            fs::write(path, page.document().to_string())
                .with_context(|| format!("writing {}", path.display()))?;
            writeln!(out, "wrote {}", path.display())?;
        }
        None => writeln!(out, "{}", page.document().outer_html(node))?,
    }
    Ok(())
}

async fn edit_offline(
    target: &Target,
    response: &str,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<(), Error> {
    let mut page = load_page(&target.page).await?;
    let implicit = if target.selector.is_some() || target.at.is_some() {
        Some(resolve_target(&mut page, target)?)
    } else {
        load_layout(&mut page, target)?;
        None
    };
    let Interpretation::Edit { descriptor, .. } = edit::interpret(response) else {
        warn!("response carries no edit");
        writeln!(out, "{}", response.trim())?;
        return Ok(());
    };
    let applied = edit::apply_edit(&mut page, &descriptor, implicit)?;
    writeln!(out, "{}", describe(&applied))?;
    write_result(&page, applied.target, output, out)
}

fn image_attachment(path: &Path) -> Result<ImageAttachment, Error> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let mime_type = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        other => bail!("unsupported image type `{other}`: {}", path.display()),
    };
    let bytes = fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
    Ok(ImageAttachment::from_bytes(mime_type, &bytes))
}

const fn sender_label(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "you",
        Sender::Ai => "lens",
        Sender::System => "system",
    }
}

async fn ask(
    target: &Target,
    prompt: &str,
    images: &[PathBuf],
    output: Option<&Path>,
    store: &dyn SharedStore,
    out: &mut impl Write,
) -> Result<(), Error> {
    let mut page = load_page(&target.page).await?;
    let node = resolve_target(&mut page, target)?;
    let picked = PickedElement::capture(&page, node, &mine_palette(&page, None))
        .ok_or_else(|| anyhow!("target is not an element"))?;

    let mut chat = ChatSession::new();
    chat.on_message(Message::ElementPickedForAi {
        element: Box::new(picked),
    });
    for path in images {
        chat.attach_image(image_attachment(path)?);
    }

    let client = GeminiClient::new(&AssistantConfig::from_env());
    let key = api_key(store);
    let (sender, mut receiver) = messaging::channel();
    let outcome = chat.ask(&client, key.as_deref(), prompt, &sender).await;
    for message in chat.messages() {
        writeln!(out, "[{}] {}", sender_label(message.sender), message.text)?;
    }
    match outcome {
        None => bail!("the prompt is empty"),
        Some(ReplyOutcome::Failed) => bail!("the assistant request failed"),
        Some(ReplyOutcome::Text) => return Ok(()),
        Some(ReplyOutcome::Acknowledged | ReplyOutcome::AppliedWithText) => {}
    }

    while let Ok(message) = receiver.try_recv() {
        if let Message::ApplyEdits { edits } = message {
            let applied = edit::apply_edit(&mut page, &edits, Some(node))?;
            writeln!(out, "{}", describe(&applied))?;
        }
    }
    write_result(&page, node, output, out)
}

async fn assets(target: &Target, dir: &Path, out: &mut impl Write) -> Result<(), Error> {
    let mut page = load_page(&target.page).await?;
    let node = resolve_target(&mut page, target)?;
    let record = capture(&page, node)?;
    let bundle = &record.assets;

    let mut saved = Vec::new();
    for (index, svg) in bundle.svgs.iter().enumerate() {
        saved.push(downloads::save_svg(dir, index, svg)?);
    }
    for (index, lottie) in bundle.lotties.iter().enumerate() {
        saved.push(downloads::save_lottie(dir, index, lottie)?);
    }
    let timeout = page.config().fetch_timeout();
    for (index, src) in bundle.images.iter().enumerate() {
        match downloads::save_image(dir, index, src, timeout).await {
            Ok(path) => saved.push(path),
            Err(err) => warn!("skipping image {src}: {err}"),
        }
    }
    for path in &saved {
        writeln!(out, "saved {}", path.display())?;
    }
    for gradient in &bundle.gradients {
        writeln!(out, "gradient {gradient}")?;
    }
    for video in &bundle.videos {
        writeln!(out, "video {}", video.src)?;
    }
    Ok(())
}

fn masked(key: &str) -> String {
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if key.chars().count() > 4 {
        format!("****{tail}")
    } else {
        "****".to_owned()
    }
}

fn config(
    action: ConfigAction,
    store: &dyn SharedStore,
    store_path: &Path,
    out: &mut impl Write,
) -> Result<(), Error> {
    match action {
        ConfigAction::SetKey { key } => {
            let key = key.trim();
            if key.is_empty() {
                bail!("the API key is empty");
            }
            store.set(GEMINI_API_KEY, json!(key))?;
            writeln!(out, "saved API key to {}", store_path.display())?;
        }
        ConfigAction::Inspect { state } => {
            store.set(INSPECT_ENABLED_KEY, Value::Bool(state == "on"))?;
            writeln!(out, "inspect mode {state}")?;
        }
        ConfigAction::Show => {
            writeln!(out, "settings      {}", store_path.display())?;
            let inspect = if inspect_enabled(store) { "on" } else { "off" };
            writeln!(out, "inspect       {inspect}")?;
            let key = api_key(store).map_or_else(|| "not set".to_owned(), |key| masked(&key));
            writeln!(out, "gemini key    {key}")?;
            let current = store
                .get(CURRENT_ELEMENT_KEY)
                .and_then(|value| serde_json::from_value::<ElementRecord>(value).ok())
                .map_or_else(|| "none".to_owned(), |record| format!("<{}>", record.tag_name));
            writeln!(out, "element       {current}")?;
        }
    }
    Ok(())
}
