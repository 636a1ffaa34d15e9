//! Context attached to the next assistant request: one picked component and
//! any number of images.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use inspector::PickedElement;

use crate::error::AssistantError;
use crate::types::{InlineData, Part};

/// An image attachment split out of a `data:` URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageAttachment {
    pub mime_type: String,
    /// Base64 payload, exactly as it appeared in the URL
    pub data: String,
}

impl ImageAttachment {
    /// Parse `data:<mime>;base64,<payload>`.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::InvalidAttachment`] when the URL is not a
    /// base64 data URL or the payload does not decode.
    pub fn from_data_url(url: &str) -> Result<Self, AssistantError> {
        let invalid = |reason: &str| AssistantError::InvalidAttachment(reason.to_owned());
        let rest = url
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| invalid("not a data URL"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("missing payload"))?;
        let mime_type = header.split(';').next().unwrap_or_default().trim();
        if mime_type.is_empty() {
            return Err(invalid("missing MIME type"));
        }
        if !header.split(';').any(|param| param.trim() == "base64") {
            return Err(invalid("payload is not base64"));
        }
        STANDARD
            .decode(payload)
            .map_err(|err| AssistantError::InvalidAttachment(err.to_string()))?;
        Ok(Self {
            mime_type: mime_type.to_owned(),
            data: payload.to_owned(),
        })
    }

    /// Encode raw bytes, e.g. an image file read from disk.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_owned(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn to_part(&self) -> Part {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: self.mime_type.clone(),
                data: self.data.clone(),
            },
        }
    }
}

/// Removable entry of the context bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChipTarget {
    Element,
    /// Zero-based position in the image list
    Image(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextChip {
    pub label: String,
    pub target: ChipTarget,
}

#[derive(Clone, Debug, Default)]
pub struct AttachedContext {
    pub element: Option<PickedElement>,
    pub images: Vec<ImageAttachment>,
}

impl AttachedContext {
    pub fn attach_element(&mut self, element: PickedElement) {
        self.element = Some(element);
    }

    pub fn attach_image(&mut self, image: ImageAttachment) {
        self.images.push(image);
    }

    /// Chips in display order: the component first, then images numbered from one.
    pub fn chips(&self) -> Vec<ContextChip> {
        let element = self.element.iter().map(|picked| ContextChip {
            label: format!("Comp: {}", picked.record.tag_name),
            target: ChipTarget::Element,
        });
        let images = (0..self.images.len()).map(|index| ContextChip {
            label: format!("Img {}", index + 1),
            target: ChipTarget::Image(index),
        });
        element.chain(images).collect()
    }

    /// Drop one entry; returns whether anything was removed.
    pub fn remove(&mut self, target: ChipTarget) -> bool {
        match target {
            ChipTarget::Element => self.element.take().is_some(),
            ChipTarget::Image(index) if index < self.images.len() => {
                self.images.remove(index);
                true
            }
            ChipTarget::Image(_) => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.element.is_none() && self.images.is_empty()
    }
}
