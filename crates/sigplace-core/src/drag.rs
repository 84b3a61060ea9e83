//! Drag-and-drop payloads exchanged between drag sources and the page drop target

use crate::annotation::AnnotationId;
use serde::{Deserialize, Serialize};

/// What a "new signature" drag source creates when dropped
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NewAnnotationKind {
    /// Dashed rectangle with a label
    #[default]
    Placeholder,
    /// Opens the signature capture surface; placed once the user saves
    Drawn,
    /// Plain text
    Text,
}

/// Transient item carried by a drag operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DragPayload {
    #[serde(rename = "NEW_SIGNATURE")]
    NewSignature {
        #[serde(default)]
        kind: NewAnnotationKind,
        /// Content for `Text` items
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    #[serde(rename = "DROPPED_SIGNATURE")]
    ExistingAnnotation { id: AnnotationId },
}

impl DragPayload {
    pub fn placeholder() -> Self {
        DragPayload::NewSignature {
            kind: NewAnnotationKind::Placeholder,
            text: None,
        }
    }

    pub fn drawn() -> Self {
        DragPayload::NewSignature {
            kind: NewAnnotationKind::Drawn,
            text: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        DragPayload::NewSignature {
            kind: NewAnnotationKind::Text,
            text: Some(text.into()),
        }
    }

    pub fn existing(id: AnnotationId) -> Self {
        DragPayload::ExistingAnnotation { id }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_signature_deserializes() {
        let payload = DragPayload::from_json(r#"{"type":"NEW_SIGNATURE","kind":"placeholder"}"#)
            .unwrap();
        assert_eq!(payload, DragPayload::placeholder());
    }

    #[test]
    fn test_new_text_deserializes() {
        let payload =
            DragPayload::from_json(r#"{"type":"NEW_SIGNATURE","kind":"text","text":"J. Doe"}"#)
                .unwrap();
        assert_eq!(payload, DragPayload::text("J. Doe"));
    }

    #[test]
    fn test_kind_defaults_to_placeholder() {
        let payload = DragPayload::from_json(r#"{"type":"NEW_SIGNATURE"}"#).unwrap();
        assert_eq!(payload, DragPayload::placeholder());
    }

    #[test]
    fn test_existing_annotation_deserializes() {
        let payload = DragPayload::from_json(r#"{"type":"DROPPED_SIGNATURE","id":7}"#).unwrap();
        assert_eq!(payload, DragPayload::existing(AnnotationId(7)));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(DragPayload::from_json(r#"{"type":"SOMETHING"}"#).is_err());
    }
}
