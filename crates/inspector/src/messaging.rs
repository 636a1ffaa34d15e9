//! Fire-and-forget messages between the page session and the companion.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use crate::edit::EditDescriptor;
use crate::record::PickedElement;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Message {
    #[serde(rename = "setInspect")]
    SetInspect { enabled: bool },
    #[serde(rename = "applyStyles")]
    ApplyStyles { styles: Map<String, Value> },
    #[serde(rename = "applyEdits")]
    ApplyEdits { edits: EditDescriptor },
    #[serde(rename = "startPickingForAI")]
    StartPickingForAi,
    #[serde(rename = "elementPickedForAI")]
    ElementPickedForAi { element: Box<PickedElement> },
}

/// Sending half. Sending never fails from the caller's point of view.
#[derive(Clone, Debug)]
pub struct MessageSender {
    inner: mpsc::UnboundedSender<Message>,
}

impl MessageSender {
    pub fn send(&self, message: Message) {
        if let Err(err) = self.inner.send(message) {
            debug!("dropping message, no receiver: {:?}", err.0);
        }
    }
}

pub type MessageReceiver = mpsc::UnboundedReceiver<Message>;

pub fn channel() -> (MessageSender, MessageReceiver) {
    let (inner, receiver) = mpsc::unbounded_channel();
    (MessageSender { inner }, receiver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn messages_are_tagged_by_action() {
        let value = serde_json::to_value(Message::SetInspect { enabled: false }).unwrap_or_default();
        assert_eq!(value, json!({"action": "setInspect", "enabled": false}));

        let parsed: Result<Message, _> = serde_json::from_value(json!({
            "action": "applyEdits",
            "edits": {"selector": "h1", "text": "Hi"}
        }));
        assert!(matches!(parsed, Ok(Message::ApplyEdits { edits }) if edits.text.as_deref() == Some("Hi")));

        let value = serde_json::to_value(Message::StartPickingForAi).unwrap_or_default();
        assert_eq!(value, json!({"action": "startPickingForAI"}));
    }

    #[test]
    fn sending_without_receiver_is_silent() {
        let (sender, receiver) = channel();
        drop(receiver);
        sender.send(Message::StartPickingForAi);
    }
}
