use thiserror::Error;

pub type FolioResult<T> = Result<T, FolioError>;

#[derive(Error, Debug, Clone)]
pub enum FolioError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid schema: {reason}")]
    InvalidSchema { reason: String },

    #[error("Duplicate section id '{id}': section ids must be unique within a schema")]
    DuplicateSectionId { id: String },

    #[error("Duplicate field id '{id}' in section '{section}'")]
    DuplicateFieldId { section: String, id: String },

    #[error("Invalid field '{field}' in section '{section}': {reason}")]
    InvalidField {
        section: String,
        field: String,
        reason: String,
    },

    #[error("Invalid validation rule '{rule}' for field '{field}': {reason}")]
    InvalidRule {
        field: String,
        rule: String,
        reason: String,
    },

    #[error("Invalid color value '{value}': {reason}")]
    InvalidColor { value: String, reason: String },

    #[error("Invalid styling token '{token}' in category '{category}': {reason}")]
    InvalidStylingToken {
        category: String,
        token: String,
        reason: String,
    },

    #[error("Invalid slug '{slug}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug { slug: String },

    #[error("Document '{id}' not found")]
    DocumentNotFound { id: String },

    #[error("Store error during {operation}: {message}")]
    Store { operation: String, message: String },

    #[error("Upload rejected: {reason}")]
    Upload { reason: String },

    #[error("Invalid structural operation: {reason}")]
    InvalidSectionOp { reason: String },

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Empty document: no sections found")]
    EmptyDocument,
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::DeserializationError(err.to_string())
    }
}
