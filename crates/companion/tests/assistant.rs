use std::sync::Arc;

use anyhow::{Error, anyhow};
use companion::chat::{EDITS_APPLIED, PICK_PROMPT, THINKING, api_key};
use companion::{
    AssistantConfig, AssistantError, AttachedContext, ChatSession, GeminiClient, ImageAttachment,
    ReplyOutcome, Sender,
};
use inspector::messaging::{self, MessageReceiver};
use inspector::storage::GEMINI_API_KEY;
use inspector::{Inspector, InspectorConfig, MemoryStore, Message, PointerEventKind, SharedStore};
use page_handler::{HtmlPage, PageConfig};
use serde_json::{Value, json};
use url::Url;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(&AssistantConfig::default().with_endpoint(&server.uri()))
}

fn reply(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

fn drain(receiver: &mut MessageReceiver) -> Vec<Message> {
    let mut messages = Vec::new();
    while let Ok(message) = receiver.try_recv() {
        messages.push(message);
    }
    messages
}

#[tokio::test]
async fn reply_with_commentary_dispatches_edit_and_keeps_text() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;
    let text = "Here you go:\n```json\n{\"text\": \"Buy now\"}\n```";
    Mock::given(matchers::method("POST"))
        .and(matchers::path(GENERATE_PATH))
        .and(matchers::header("x-goog-api-key", "test-key"))
        .and(matchers::body_string_contains("Lens AI"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(text)))
        .expect(1)
        .mount(&server)
        .await;

    let (sender, mut receiver) = messaging::channel();
    let mut chat = ChatSession::new();
    let outcome = chat
        .ask(&client_for(&server), Some("test-key"), "rename it", &sender)
        .await;
    assert_eq!(outcome, Some(ReplyOutcome::AppliedWithText));

    let log = chat.messages();
    assert_eq!(log.len(), 2);
    assert_eq!((log[0].sender, log[0].text.as_str()), (Sender::User, "rename it"));
    assert_eq!((log[1].sender, log[1].text.as_str()), (Sender::Ai, text));
    assert!(!log[1].pending);

    let sent = drain(&mut receiver);
    assert!(matches!(
        sent.as_slice(),
        [Message::ApplyEdits { edits }] if edits.text.as_deref() == Some("Buy now")
    ));
    Ok(())
}

#[tokio::test]
async fn error_body_surfaces_message_verbatim() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .generate(Some("bad-key"), "hi", &AttachedContext::default())
        .await;
    assert!(matches!(
        &result,
        Err(AssistantError::Api { message })
            if message == "API key not valid. Please pass a valid API key."
    ));

    let (sender, mut receiver) = messaging::channel();
    let mut chat = ChatSession::new();
    let index = chat.begin("hi").ok_or_else(|| anyhow!("query ignored"))?;
    assert_eq!(chat.messages()[index].text, THINKING);
    assert_eq!(chat.resolve(index, result, &sender), ReplyOutcome::Failed);
    assert_eq!(
        chat.messages()[index].text,
        "Error: API key not valid. Please pass a valid API key."
    );
    assert!(drain(&mut receiver).is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_key_fails_before_any_request() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    assert_eq!(api_key(&store), None);
    store.set(GEMINI_API_KEY, json!("  "))?;
    assert_eq!(api_key(&store), None);

    let (sender, _receiver) = messaging::channel();
    let mut chat = ChatSession::new();
    let key = api_key(&store);
    let outcome = chat
        .ask(&client_for(&server), key.as_deref(), "make it pop", &sender)
        .await;
    assert_eq!(outcome, Some(ReplyOutcome::Failed));
    assert_eq!(chat.messages()[1].text, "Error: API Key not found");
    Ok(())
}

#[tokio::test]
async fn picked_component_flows_into_request_and_edit_lands_on_page() -> Result<(), Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path(GENERATE_PATH))
        .and(matchers::body_string_contains(
            "Here is the HTML of the component you are editing",
        ))
        .and(matchers::body_string_contains("inline_data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(
            "{\"classes\": {\"add\": \"rounded-full\"}, \"styles\": {\"backgroundColor\": \"#4f46e5\"}}",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse("https://shop.example.com/")?;
    let mut page = HtmlPage::from_html(
        url,
        r#"<html><body><button id="buy" class="cta">Buy</button></body></html>"#,
        PageConfig::default(),
    );
    page.load_layout_json(r##"[{"selector": "#buy", "x": 10, "y": 10, "width": 80, "height": 30}]"##)?;
    let button = page
        .document()
        .get_element_by_id("buy")
        .ok_or_else(|| anyhow!("missing #buy"))?;

    let store = Arc::new(MemoryStore::new());
    store.set(GEMINI_API_KEY, json!("test-key"))?;
    let shared: Arc<dyn SharedStore> = Arc::clone(&store) as Arc<dyn SharedStore>;
    let (to_companion, mut from_page) = messaging::channel();
    let (to_page, mut from_companion) = messaging::channel();
    let mut inspector = Inspector::new(page, &InspectorConfig::default(), shared, to_companion);
    let mut chat = ChatSession::new();

    chat.request_pick(&to_page);
    assert_eq!(chat.messages()[0].text, PICK_PROMPT);
    for message in drain(&mut from_companion) {
        inspector.handle_message(message);
    }
    inspector.pointer_move(20.0, 20.0);
    inspector.pointer_event(PointerEventKind::Click, 20.0, 20.0, Some(button));
    for message in drain(&mut from_page) {
        assert!(chat.on_message(message));
    }
    assert_eq!(chat.messages()[1].sender, Sender::System);
    assert_eq!(chat.messages()[1].text, "Attached component: button");

    chat.attach_image(ImageAttachment::from_data_url(
        "data:image/png;base64,iVBORw0KGgo=",
    )?);
    let labels: Vec<String> = chat.chips().into_iter().map(|chip| chip.label).collect();
    assert_eq!(labels, ["Comp: button", "Img 1"]);

    let key = api_key(store.as_ref());
    let outcome = chat
        .ask(&client_for(&server), key.as_deref(), "round it", &to_page)
        .await;
    assert_eq!(outcome, Some(ReplyOutcome::Acknowledged));
    assert_eq!(chat.messages()[3].text, EDITS_APPLIED);

    for message in drain(&mut from_companion) {
        inspector.handle_message(message);
    }
    let doc = inspector.page().document();
    assert!(doc.has_class(button, "cta"));
    assert!(doc.has_class(button, "rounded-full"));
    let inline = doc.attr(button, "style").unwrap_or_default();
    assert!(inline.contains("background-color: #4f46e5"));
    Ok(())
}
