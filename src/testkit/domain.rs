//! Builders for domain primitives.

use crate::domain::Document;

/// A document whose name is derived from its id.
pub fn doc(id: &str, content: &str) -> Document {
    Document::new(id, format!("{id}.txt"), content)
}

/// `count` non-blank documents with ids `doc-0`, `doc-1`, ...
pub fn numbered_docs(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| doc(&format!("doc-{i}"), &format!("Document body number {i}.")))
        .collect()
}
