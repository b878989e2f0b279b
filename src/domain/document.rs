//! Documents submitted for processing.

use serde::{Deserialize, Serialize};

use super::DocumentId;

/// One caller-submitted document.
///
/// Immutable once submitted; the engine only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Caller-assigned identifier, unique within a batch.
    pub id: DocumentId,
    /// Display name echoed back in the result.
    #[serde(default)]
    pub name: String,
    /// Raw text sent upstream verbatim.
    #[serde(default)]
    pub content: String,
}

impl Document {
    /// Create a new document.
    pub fn new(
        id: impl Into<DocumentId>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: content.into(),
        }
    }

    /// Whether the content is empty or whitespace-only.
    ///
    /// Blank documents are never dispatched upstream.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_content_is_blank() {
        assert!(Document::new("a", "a.txt", "").is_blank());
        assert!(Document::new("b", "b.txt", " \n\t ").is_blank());
        assert!(!Document::new("c", "c.txt", " x ").is_blank());
    }

    #[test]
    fn deserializes_with_missing_name() {
        let doc: Document = serde_json::from_str(r#"{"id": "a", "content": "hello"}"#).unwrap();
        assert_eq!(doc.id.as_str(), "a");
        assert!(doc.name.is_empty());
        assert_eq!(doc.content, "hello");
    }
}
