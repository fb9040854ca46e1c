//! Template rendering: resolves a template's sections against a content
//! document, applies merged styling as CSS custom properties at the page
//! root, and routes edit-mode changes back into the document.

use crate::content::ContentDocument;
use crate::error::{FolioError, FolioResult};
use crate::fields;
use crate::node::{escape_html, Node};
use crate::schema::{Schema, SectionDescriptor};
use crate::sections::{render_section, RenderMode};
use crate::styling::Styling;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write;
use tracing::warn;

/// Reserved section id for structural operations (add/remove/reorder whole
/// sections). Changes addressed to it never reach field-update logic.
pub const STRUCTURAL_SECTION_ID: &str = "__sections__";

/// Field of the reserved section holding the instance's section order.
const ORDER_FIELD: &str = "order";

/// A portfolio template: schema, default content, and base styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub name: String,
    pub schema: Schema,
    #[serde(default)]
    pub default_content: ContentDocument,
    #[serde(default)]
    pub styling: Styling,
}

fn default_version() -> String {
    "1".to_string()
}

/// A rendered page: the root node plus enough context to emit a standalone
/// HTML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    root: Node,
    title: String,
}

impl Page {
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// HTML for the page root (embeddable fragment).
    pub fn to_html(&self) -> String {
        self.root.to_html()
    }

    /// Complete standalone HTML document.
    pub fn to_document(&self) -> String {
        let mut html = String::new();
        write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_html(&self.title),
            self.root.to_html()
        )
        .expect("writing to String");
        html
    }
}

/// Renders a template against a content document.
///
/// Per-section content resolves three levels deep, first present wins:
/// instance content, then the template's default content, then empty.
pub fn render_page(
    template: &Template,
    content: &ContentDocument,
    instance_styling: Option<&Styling>,
    mode: RenderMode,
) -> Page {
    let empty = Styling::default();
    let styling = Styling::merged(&template.styling, instance_styling.unwrap_or(&empty));

    let mut root = Node::new("div")
        .class("portfolio-page")
        .attr("data-template-id", &template.id)
        .attr("data-template-version", &template.version);
    let style = styling.css_variable_style();
    if !style.is_empty() {
        root = root.attr("style", &style);
    }

    let empty_section = Default::default();
    for section in ordered_sections(template, content) {
        let resolved = content
            .section(&section.id)
            .or_else(|| template.default_content.section(&section.id))
            .unwrap_or(&empty_section);
        root = root.child(render_section(section, resolved, mode));
    }

    Page {
        root,
        title: if template.name.is_empty() {
            template.id.clone()
        } else {
            template.name.clone()
        },
    }
}

/// Sections in render order. When the instance carries a structural order
/// list, it is authoritative for both membership and order; otherwise the
/// schema's declared order is used.
fn ordered_sections<'a>(
    template: &'a Template,
    content: &ContentDocument,
) -> Vec<&'a SectionDescriptor> {
    let Some(order) = content
        .get(STRUCTURAL_SECTION_ID, ORDER_FIELD)
        .and_then(Value::as_array)
    else {
        return template.schema.sections.iter().collect();
    };

    order
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|id| {
            let found = template.schema.section(id);
            if found.is_none() {
                warn!(section = %id, "ordered section has no descriptor, skipping");
            }
            found
        })
        .collect()
}

// ─── Edit-mode change routing ────────────────────────────────────────────────

/// One edit coming back from the rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentChange {
    pub section_id: String,
    pub field_id: String,
    pub value: Value,
}

/// A structural operation, carried in the value of a change addressed to
/// [`STRUCTURAL_SECTION_ID`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SectionOp {
    Add { section_id: String },
    Remove { section_id: String },
    Move { section_id: String, to: usize },
}

/// Applies a change to the document, returning the new tree.
///
/// The reserved structural section id is special-cased before any field
/// logic; everything else runs through the schema's field change
/// application.
pub fn apply_content_change(
    template: &Template,
    document: &ContentDocument,
    change: ContentChange,
) -> FolioResult<ContentDocument> {
    if change.section_id == STRUCTURAL_SECTION_ID {
        let op: SectionOp =
            serde_json::from_value(change.value).map_err(|e| FolioError::InvalidSectionOp {
                reason: e.to_string(),
            })?;
        return apply_section_op(template, document, op);
    }

    let stored = match template
        .schema
        .section(&change.section_id)
        .and_then(|section| section.field(&change.field_id))
    {
        Some(field) => fields::apply_change(
            field,
            document.get(&change.section_id, &change.field_id),
            change.value,
        ),
        None => {
            warn!(
                section = %change.section_id,
                field = %change.field_id,
                "change for undeclared field, storing as-is"
            );
            change.value
        }
    };
    Ok(document.with_field(&change.section_id, &change.field_id, stored))
}

fn apply_section_op(
    template: &Template,
    document: &ContentDocument,
    op: SectionOp,
) -> FolioResult<ContentDocument> {
    let mut order: Vec<String> = ordered_sections(template, document)
        .iter()
        .map(|s| s.id.clone())
        .collect();

    let doc = match op {
        SectionOp::Add { section_id } => {
            if template.schema.section(&section_id).is_none() {
                return Err(FolioError::InvalidSectionOp {
                    reason: format!("no section '{}' in template schema", section_id),
                });
            }
            if !order.iter().any(|id| *id == section_id) {
                order.push(section_id.clone());
            }
            document.with_section(&section_id, Default::default())
        }
        SectionOp::Remove { section_id } => {
            order.retain(|id| *id != section_id);
            document.without_section(&section_id)
        }
        SectionOp::Move { section_id, to } => {
            let Some(from) = order.iter().position(|id| *id == section_id) else {
                return Err(FolioError::InvalidSectionOp {
                    reason: format!("section '{}' is not part of the page", section_id),
                });
            };
            let id = order.remove(from);
            let to = to.min(order.len());
            order.insert(to, id);
            document.clone()
        }
    };

    Ok(doc.with_field(
        STRUCTURAL_SECTION_ID,
        ORDER_FIELD,
        Value::Array(order.into_iter().map(Value::String).collect()),
    ))
}
