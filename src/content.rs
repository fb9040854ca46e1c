//! The nested section → field → value tree for one portfolio instance.
//!
//! The engine treats content as read-mostly input owned by the host: reads
//! default on missing keys instead of erroring, and every update produces a
//! new tree so the host can diff, persist, or undo.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub type SectionContent = BTreeMap<String, Value>;

/// The persisted content of one portfolio document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDocument(pub BTreeMap<String, SectionContent>);

impl ContentDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Section slice; `None` is equivalent to an empty section.
    pub fn section(&self, section_id: &str) -> Option<&SectionContent> {
        self.0.get(section_id)
    }

    /// Field value; missing section or field yields `None`, never an error.
    pub fn get(&self, section_id: &str, field_id: &str) -> Option<&Value> {
        self.0.get(section_id).and_then(|s| s.get(field_id))
    }

    /// Field value as a string slice, empty when missing or non-string.
    pub fn text(&self, section_id: &str, field_id: &str) -> &str {
        self.get(section_id, field_id)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Returns a new document with one field replaced. Only the mutated
    /// section is rebuilt; the original tree is untouched.
    pub fn with_field(&self, section_id: &str, field_id: &str, value: Value) -> Self {
        let mut doc = self.clone();
        doc.0
            .entry(section_id.to_string())
            .or_default()
            .insert(field_id.to_string(), value);
        doc
    }

    /// Returns a new document with a whole section slice replaced.
    pub fn with_section(&self, section_id: &str, content: SectionContent) -> Self {
        let mut doc = self.clone();
        doc.0.insert(section_id.to_string(), content);
        doc
    }

    /// Returns a new document without the given section.
    pub fn without_section(&self, section_id: &str) -> Self {
        let mut doc = self.clone();
        doc.0.remove(section_id);
        doc
    }

    /// Overlays another document's sections field-by-field on top of this
    /// one. Used to apply partial updates coming back from the store.
    pub fn merged_with(&self, delta: &ContentDocument) -> Self {
        let mut doc = self.clone();
        for (section_id, fields) in &delta.0 {
            let slot = doc.0.entry(section_id.clone()).or_default();
            for (field_id, value) in fields {
                slot.insert(field_id.clone(), value.clone());
            }
        }
        doc
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Summary row returned by the store's list operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Last-modified timestamp, milliseconds since the epoch.
    pub updated_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_keys_default() {
        let doc = ContentDocument::new();
        assert!(doc.get("about", "bio").is_none());
        assert_eq!(doc.text("about", "bio"), "");
    }

    #[test]
    fn test_with_field_leaves_original_untouched() {
        let doc = ContentDocument::new().with_field("about", "bio", json!("hello"));
        let updated = doc.with_field("about", "bio", json!("changed"));
        assert_eq!(doc.text("about", "bio"), "hello");
        assert_eq!(updated.text("about", "bio"), "changed");
    }

    #[test]
    fn test_merged_with_overlays_fields() {
        let base = ContentDocument::new()
            .with_field("about", "bio", json!("hello"))
            .with_field("about", "name", json!("Ada"));
        let delta = ContentDocument::new().with_field("about", "bio", json!("updated"));
        let merged = base.merged_with(&delta);
        assert_eq!(merged.text("about", "bio"), "updated");
        assert_eq!(merged.text("about", "name"), "Ada");
    }

    #[test]
    fn test_serialization_round_trip() {
        let doc = ContentDocument::new()
            .with_field("hero", "headline", json!("Hi"))
            .with_field("work", "projects", json!([{"title": "One"}]));
        let text = serde_json::to_string(&doc).unwrap();
        let back: ContentDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(doc, back);
    }
}
