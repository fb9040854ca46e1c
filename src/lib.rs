//! # Folio Engine
//!
//! Schema-driven rendering engine for portfolio templates: parses a
//! template's section/field schema, binds a content document to editable
//! controls or read-only displays, merges design-token styling, and composes
//! a publishable page tree.
//!
//! ## Features
//! - Typed section/field descriptors parsed from JSON, with total fallback
//!   for unknown section types, field types, and layout variants
//! - Change application that enforces constraints (max-length truncation,
//!   numeric clamping, bounded collections) instead of merely flagging them
//! - Per-category styling merge (colors, fonts, type scale, spacing) emitted
//!   as CSS custom properties at the page root
//! - Host-driven persistence helpers: TTL cache and per-document debounced
//!   saves with an injected clock
//!
//! ## Example
//! ```ignore
//! use folio_engine::{parse_template, render_page, ContentDocument, RenderMode};
//!
//! let template = parse_template(template_json)?;
//! let content: ContentDocument = serde_json::from_str(content_json)?;
//! let page = render_page(&template, &content, None, RenderMode::Display);
//! println!("{}", page.to_document());
//! ```

pub mod content;
pub mod error;
pub mod fields;
pub mod form;
pub mod node;
pub mod schema;
pub mod sections;
pub mod store;
pub mod styling;
pub mod template;
pub mod upload;
pub mod validate;

// --- Core types ---
pub use content::{ContentDocument, DocumentSummary, SectionContent};
pub use error::{FolioError, FolioResult};
pub use form::{ChangeEvent, FormErrors, FormGenerator};
pub use node::Node;
pub use schema::{
    FieldDescriptor, FieldType, LayoutVariant, Schema, SectionDescriptor, SectionKind,
    ValidationRules,
};
pub use sections::{ItemEdit, RenderMode, SectionRender};
pub use styling::{Styling, Typography};
pub use template::{
    apply_content_change, render_page, ContentChange, Page, SectionOp, Template,
    STRUCTURAL_SECTION_ID,
};
pub use validate::{validate_content, validate_schema, ValidationReport};

// --- Collaborator types ---
pub use store::{CachingStore, MemoryStore, PortfolioDocument, PortfolioStore, SaveDebouncer};
pub use upload::{ImageUploader, PendingImage, UploadFile, UploadOptions, UploadPolicy};

/// Parse and validate a schema from JSON.
pub fn parse_schema(json: &str) -> FolioResult<Schema> {
    let schema: Schema = serde_json::from_str(json)?;
    validate::validate_schema(&schema)?;
    Ok(schema)
}

/// Parse and validate a full template (schema + default content + styling).
pub fn parse_template(json: &str) -> FolioResult<Template> {
    let template: Template = serde_json::from_str(json)?;
    validate::validate_schema(&template.schema)?;
    for (token, value) in &template.styling.colors {
        validate::validate_color(value).map_err(|_| FolioError::InvalidStylingToken {
            category: "colors".to_string(),
            token: token.clone(),
            reason: format!("'{}' is not a valid color", value),
        })?;
    }
    Ok(template)
}

/// Parse a content document from JSON. Shape errors are the only failure
/// mode; unknown sections and fields are kept and resolved at render time.
pub fn parse_content(json: &str) -> FolioResult<ContentDocument> {
    Ok(serde_json::from_str(json)?)
}
