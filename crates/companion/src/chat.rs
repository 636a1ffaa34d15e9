//! The assistant conversation: message log, attached context and the
//! round-trip from a query to applied edits.

use inspector::edit::{Interpretation, interpret};
use inspector::storage::GEMINI_API_KEY;
use inspector::{Message, MessageSender, SharedStore};
use log::{debug, info};

use crate::client::GeminiClient;
use crate::context::{AttachedContext, ChipTarget, ContextChip, ImageAttachment};
use crate::error::AssistantError;

pub const PICK_PROMPT: &str = "Click an element on the page to attach it to the chat...";
pub const THINKING: &str = "Thinking...";
pub const EDITS_APPLIED: &str = "Edits applied successfully! ✨";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
    System,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    /// Set while the reply this placeholder stands for is outstanding.
    pub pending: bool,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            pending: false,
        }
    }
}

/// What resolving a reply did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// An edit was dispatched and the reply was nothing but the edit block.
    Acknowledged,
    /// An edit was dispatched; the reply text is shown as-is.
    AppliedWithText,
    /// No edit; the reply text is shown as-is.
    Text,
    Failed,
}

/// Key stored under `geminiApiKey`, if any.
pub fn api_key(store: &dyn SharedStore) -> Option<String> {
    store
        .get(GEMINI_API_KEY)
        .and_then(|value| value.as_str().map(str::to_owned))
        .filter(|key| !key.trim().is_empty())
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    context: AttachedContext,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub const fn context(&self) -> &AttachedContext {
        &self.context
    }

    pub fn chips(&self) -> Vec<ContextChip> {
        self.context.chips()
    }

    pub fn remove_chip(&mut self, target: ChipTarget) -> bool {
        self.context.remove(target)
    }

    pub fn attach_image(&mut self, image: ImageAttachment) {
        self.context.attach_image(image);
    }

    fn push(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Ask the page session to enter pick mode.
    pub fn request_pick(&mut self, outbound: &MessageSender) {
        outbound.send(Message::StartPickingForAi);
        self.push(ChatMessage::new(Sender::System, PICK_PROMPT));
    }

    /// Handle a message from the page session; returns whether it was consumed.
    pub fn on_message(&mut self, message: Message) -> bool {
        match message {
            Message::ElementPickedForAi { element } => {
                let text = format!("Attached component: {}", element.record.tag_name);
                info!("{text}");
                self.context.attach_element(*element);
                self.push(ChatMessage::new(Sender::System, text));
                true
            }
            Message::SetInspect { .. }
            | Message::ApplyStyles { .. }
            | Message::ApplyEdits { .. }
            | Message::StartPickingForAi => false,
        }
    }

    /// Log a query and its placeholder reply. Blank queries are ignored.
    /// Returns the placeholder's index.
    pub fn begin(&mut self, query: &str) -> Option<usize> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.push(ChatMessage::new(Sender::User, query));
        let mut placeholder = ChatMessage::new(Sender::Ai, THINKING);
        placeholder.pending = true;
        Some(self.push(placeholder))
    }

    /// Replace the placeholder at `index` with the outcome of its request,
    /// dispatching any edit the reply carries.
    pub fn resolve(
        &mut self,
        index: usize,
        result: Result<String, AssistantError>,
        outbound: &MessageSender,
    ) -> ReplyOutcome {
        let (text, outcome) = match result {
            Err(err) => (format!("Error: {err}"), ReplyOutcome::Failed),
            Ok(reply) => match interpret(&reply) {
                Interpretation::Edit {
                    descriptor,
                    block_only,
                } => {
                    outbound.send(Message::ApplyEdits { edits: descriptor });
                    if block_only {
                        (EDITS_APPLIED.to_owned(), ReplyOutcome::Acknowledged)
                    } else {
                        (reply, ReplyOutcome::AppliedWithText)
                    }
                }
                Interpretation::Commentary => (reply, ReplyOutcome::Text),
            },
        };
        match self.messages.get_mut(index) {
            Some(slot) => {
                slot.text = text;
                slot.pending = false;
            }
            None => {
                debug!("placeholder {index} vanished; appending reply");
                self.push(ChatMessage::new(Sender::Ai, text));
            }
        }
        outcome
    }

    /// One full round-trip: log the query, call the assistant with the
    /// attached context and resolve the reply.
    pub async fn ask(
        &mut self,
        client: &GeminiClient,
        api_key: Option<&str>,
        query: &str,
        outbound: &MessageSender,
    ) -> Option<ReplyOutcome> {
        let index = self.begin(query)?;
        let result = client.generate(api_key, query.trim(), &self.context).await;
        Some(self.resolve(index, result, outbound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector::messaging;

    #[test]
    fn blank_queries_are_ignored() {
        let mut chat = ChatSession::new();
        assert_eq!(chat.begin("   "), None);
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn commentary_replaces_placeholder_without_dispatch() {
        let (sender, mut receiver) = messaging::channel();
        let mut chat = ChatSession::new();
        let index = chat.begin("why?").unwrap_or_default();
        assert!(chat.messages()[index].pending);
        assert_eq!(
            chat.resolve(index, Ok("Because.".to_owned()), &sender),
            ReplyOutcome::Text
        );
        assert_eq!(chat.messages()[index].text, "Because.");
        assert!(!chat.messages()[index].pending);
        assert!(matches!(receiver.try_recv(), Err(_)));
    }
}
