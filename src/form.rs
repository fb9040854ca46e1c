//! Schema-driven form generation with touched-state tracking.
//!
//! The generator owns a working copy of the value tree and per-field touched
//! flags. Validation is the host's responsibility: errors are handed back in
//! via [`FormErrors`] and only surfaced for touched fields (or when display
//! is forced, e.g. on a submit attempt).

use crate::content::ContentDocument;
use crate::fields;
use crate::node::Node;
use crate::schema::Schema;
use crate::validate::ValidationReport;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Host-supplied errors, in either of the two supported shapes.
///
/// Lookup precedence is part of the contract: section-nested entries win
/// over flat `"sectionId.fieldId"` keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    pub sections: BTreeMap<String, BTreeMap<String, String>>,
    pub flat: BTreeMap<String, String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(|s| s.is_empty()) && self.flat.is_empty()
    }
}

impl From<&ValidationReport> for FormErrors {
    fn from(report: &ValidationReport) -> Self {
        FormErrors {
            sections: BTreeMap::new(),
            flat: report.field_errors.clone(),
        }
    }
}

/// Change notification handed back to the host after a field edit. The host
/// forwards the updated tree to its store (and re-validates if it wants to).
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub section_id: String,
    pub field_id: String,
    /// The value actually stored, after truncation/clamping.
    pub stored: Value,
}

/// Generates an editable form from a schema and tracks editing state.
#[derive(Debug, Clone)]
pub struct FormGenerator {
    schema: Schema,
    values: ContentDocument,
    touched: HashSet<String>,
    force_validation: bool,
}

impl FormGenerator {
    pub fn new(schema: Schema, values: ContentDocument) -> Self {
        Self {
            schema,
            values,
            touched: HashSet::new(),
            force_validation: false,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The current value tree. Reading this back after a render round-trip
    /// yields exactly what was loaded plus applied edits.
    pub fn values(&self) -> &ContentDocument {
        &self.values
    }

    /// Forces error display for untouched fields (submit attempt).
    pub fn set_force_validation(&mut self, force: bool) {
        self.force_validation = force;
    }

    pub fn is_touched(&self, section_id: &str, field_id: &str) -> bool {
        self.touched.contains(&touch_key(section_id, field_id))
    }

    /// Marks a field touched without changing it (blur).
    pub fn touch(&mut self, section_id: &str, field_id: &str) {
        self.touched.insert(touch_key(section_id, field_id));
    }

    /// Error for a field, only when the field has been touched or validation
    /// display is forced. Section-nested errors take priority over flat
    /// `"sectionId.fieldId"` keys.
    pub fn field_error<'a>(
        &self,
        errors: &'a FormErrors,
        section_id: &str,
        field_id: &str,
    ) -> Option<&'a str> {
        if !self.force_validation && !self.is_touched(section_id, field_id) {
            return None;
        }
        if let Some(message) = errors
            .sections
            .get(section_id)
            .and_then(|section| section.get(field_id))
        {
            return Some(message);
        }
        errors
            .flat
            .get(&format!("{}.{}", section_id, field_id))
            .map(String::as_str)
    }

    /// Applies a field edit: runs the field's change application, replaces
    /// the value tree immutably, marks the field touched, and returns the
    /// event for the host's `on_change`/`on_validate` hooks.
    pub fn apply_field_change(
        &mut self,
        section_id: &str,
        field_id: &str,
        value: Value,
    ) -> ChangeEvent {
        let stored = match self
            .schema
            .section(section_id)
            .and_then(|section| section.field(field_id))
        {
            Some(field) => fields::apply_change(field, self.values.get(section_id, field_id), value),
            // Fields outside the schema pass through untouched; the host's
            // validator decides what to do with them.
            None => value,
        };
        self.values = self.values.with_field(section_id, field_id, stored.clone());
        self.touched.insert(touch_key(section_id, field_id));
        ChangeEvent {
            section_id: section_id.to_string(),
            field_id: field_id.to_string(),
            stored,
        }
    }

    /// Renders the full form. An empty schema renders the dedicated
    /// empty-state placeholder and emits no change events.
    pub fn render(&self, errors: &FormErrors) -> Node {
        if self.schema.sections.is_empty() {
            return Node::new("div")
                .class("form-empty-state")
                .child(Node::text("p", "This template has no editable sections yet."));
        }

        let mut form = Node::new("form").class("schema-form");
        for section in &self.schema.sections {
            let mut group = Node::new("fieldset")
                .class("form-section")
                .attr("data-section-id", &section.id);
            if !section.name.is_empty() {
                group = group.child(Node::text("legend", &section.name));
            }
            if let Some(description) = &section.description {
                group = group.child(Node::text("p", description).class("section-description"));
            }
            for field in &section.fields {
                let value = self.values.get(&section.id, &field.id);
                let name = format!("{}.{}", section.id, field.id);
                let mut block = Node::new("div")
                    .class("field")
                    .attr("data-field-id", &field.id);
                if let Some(label) = &field.label {
                    block = block.child(Node::text("label", label).class("field-label"));
                }
                block = block.child(fields::control_node(field, value, &name));
                if let Some(message) = self.field_error(errors, &section.id, &field.id) {
                    block = block.child(Node::text("span", message).class("field-error"));
                }
                if let Some(help) = &field.help_text {
                    block = block.child(Node::text("p", help).class("field-help"));
                }
                group = group.child(block);
            }
            form = form.child(group);
        }
        form
    }
}

fn touch_key(section_id: &str, field_id: &str) -> String {
    format!("{}.{}", section_id, field_id)
}
