use crate::content::ContentDocument;
use crate::error::{FolioError, FolioResult};
use crate::schema::{FieldDescriptor, FieldType, Schema, SectionDescriptor};
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// Per-field and per-section errors produced by content validation.
///
/// Field errors are keyed `"sectionId.fieldId"`. Validation never fails the
/// render path: callers display these inline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub field_errors: BTreeMap<String, String>,
    pub section_errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.section_errors.is_empty()
    }

    pub fn field_error(&self, section_id: &str, field_id: &str) -> Option<&str> {
        self.field_errors
            .get(&format!("{}.{}", section_id, field_id))
            .map(String::as_str)
    }

    fn add_field_error(&mut self, section_id: &str, field_id: &str, message: String) {
        self.field_errors
            .insert(format!("{}.{}", section_id, field_id), message);
    }
}

// ─── Schema-shape validation ─────────────────────────────────────────────────

/// Validate a schema's structural invariants: unique section ids, unique
/// field ids per section, coherent validation rules.
pub fn validate_schema(schema: &Schema) -> FolioResult<()> {
    let mut seen_sections = HashSet::new();
    for section in &schema.sections {
        if section.id.is_empty() {
            return Err(FolioError::InvalidSchema {
                reason: "section id must not be empty".to_string(),
            });
        }
        if !seen_sections.insert(section.id.clone()) {
            return Err(FolioError::DuplicateSectionId {
                id: section.id.clone(),
            });
        }
        validate_section_descriptor(section)?;
    }
    Ok(())
}

fn validate_section_descriptor(section: &SectionDescriptor) -> FolioResult<()> {
    let mut seen_fields = HashSet::new();
    for field in &section.fields {
        if field.id.is_empty() {
            return Err(FolioError::InvalidField {
                section: section.id.clone(),
                field: field.id.clone(),
                reason: "field id must not be empty".to_string(),
            });
        }
        if !seen_fields.insert(field.id.clone()) {
            return Err(FolioError::DuplicateFieldId {
                section: section.id.clone(),
                id: field.id.clone(),
            });
        }
        validate_field_descriptor(&section.id, field)?;
    }
    Ok(())
}

fn validate_field_descriptor(section_id: &str, field: &FieldDescriptor) -> FolioResult<()> {
    let rules = field.rules();

    if let Some(max_length) = rules.max_length {
        if max_length == 0 {
            return Err(FolioError::InvalidRule {
                field: format!("{}.{}", section_id, field.id),
                rule: "maxLength".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
    }
    if let (Some(min), Some(max)) = (rules.min, rules.max) {
        if min > max {
            return Err(FolioError::InvalidRule {
                field: format!("{}.{}", section_id, field.id),
                rule: "min/max".to_string(),
                reason: format!("min {} exceeds max {}", min, max),
            });
        }
    }
    if let Some(max_items) = rules.max_items {
        if max_items == 0 {
            return Err(FolioError::InvalidRule {
                field: format!("{}.{}", section_id, field.id),
                rule: "maxItems".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
    }
    if field.field_type == FieldType::Select
        && rules.options.as_ref().map_or(true, |o| o.is_empty())
    {
        return Err(FolioError::InvalidField {
            section: section_id.to_string(),
            field: field.id.clone(),
            reason: "select field must declare at least one option".to_string(),
        });
    }
    if field.field_type == FieldType::Object
        && field.fields.as_ref().map_or(true, |f| f.is_empty())
    {
        return Err(FolioError::InvalidField {
            section: section_id.to_string(),
            field: field.id.clone(),
            reason: "object field must declare sub-fields".to_string(),
        });
    }

    // Sub-field ids must be unique within their parent
    for group in [&field.fields, &field.item_fields] {
        if let Some(sub_fields) = group {
            let mut seen = HashSet::new();
            for sub in sub_fields {
                if !seen.insert(sub.id.clone()) {
                    return Err(FolioError::DuplicateFieldId {
                        section: format!("{}.{}", section_id, field.id),
                        id: sub.id.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

// ─── Content validation ──────────────────────────────────────────────────────

/// Validate a content document against its schema. Always returns a report;
/// malformed values become inline errors, never an `Err`.
pub fn validate_content(schema: &Schema, document: &ContentDocument) -> ValidationReport {
    let mut report = ValidationReport::default();
    for section in &schema.sections {
        for field in &section.fields {
            let value = document.get(&section.id, &field.id);
            check_field(&mut report, &section.id, field, value);
        }
    }
    report
}

fn check_field(
    report: &mut ValidationReport,
    section_id: &str,
    field: &FieldDescriptor,
    value: Option<&Value>,
) {
    let rules = field.rules();

    if field.required && is_blank(value) {
        let label = field.label.as_deref().unwrap_or(&field.id);
        report.add_field_error(section_id, &field.id, format!("{} is required", label));
        return;
    }
    let Some(value) = value else { return };
    if value.is_null() {
        return;
    }

    if field.field_type.is_text_like() {
        if let (Some(max_length), Some(text)) = (rules.max_length, value.as_str()) {
            if text.chars().count() > max_length {
                report.add_field_error(
                    section_id,
                    &field.id,
                    format!("must be at most {} characters", max_length),
                );
            }
        }
    }

    match field.field_type {
        FieldType::Email => {
            if let Some(text) = value.as_str() {
                if !text.is_empty() && !email_regex().is_match(text) {
                    report.add_field_error(
                        section_id,
                        &field.id,
                        "must be a valid email address".to_string(),
                    );
                }
            }
        }
        FieldType::Url | FieldType::Video => {
            if let Some(text) = value.as_str() {
                if !text.is_empty() && !url_regex().is_match(text) {
                    report.add_field_error(
                        section_id,
                        &field.id,
                        "must be a valid http(s) URL".to_string(),
                    );
                }
            }
        }
        FieldType::Number => {
            if let Some(n) = numeric_value(value) {
                if rules.min.is_some_and(|min| n < min) || rules.max.is_some_and(|max| n > max) {
                    report.add_field_error(
                        section_id,
                        &field.id,
                        format!(
                            "must be between {} and {}",
                            rules.min.map_or("-∞".to_string(), |v| v.to_string()),
                            rules.max.map_or("∞".to_string(), |v| v.to_string()),
                        ),
                    );
                }
            } else {
                report.add_field_error(section_id, &field.id, "must be a number".to_string());
            }
        }
        FieldType::Select => {
            if let (Some(options), Some(text)) = (&rules.options, value.as_str()) {
                if !text.is_empty() && !options.iter().any(|o| o == text) {
                    report.add_field_error(
                        section_id,
                        &field.id,
                        format!("must be one of: {}", options.join(", ")),
                    );
                }
            }
        }
        FieldType::File | FieldType::Image => {
            if let (Some(formats), Some(path)) = (&rules.formats, value.as_str()) {
                if !path.is_empty() && !has_allowed_extension(path, formats) {
                    report.add_field_error(
                        section_id,
                        &field.id,
                        format!("must be one of: {}", formats.join(", ")),
                    );
                }
            }
        }
        FieldType::Array => {
            if let (Some(max_items), Some(items)) = (rules.max_items, value.as_array()) {
                if items.len() > max_items {
                    report.add_field_error(
                        section_id,
                        &field.id,
                        format!("must have at most {} items", max_items),
                    );
                }
            }
        }
        _ => {}
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn has_allowed_extension(path: &str, formats: &[String]) -> bool {
    let extension = path.rsplit('.').next().unwrap_or("").to_lowercase();
    formats.iter().any(|f| {
        f.trim_start_matches('.').eq_ignore_ascii_case(&extension)
    })
}

// ─── Shared patterns ─────────────────────────────────────────────────────────

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| Regex::new(r"^https?://[^\s]+$").unwrap())
}

/// Validate a color token value: 6-digit hex or a small named set.
pub fn validate_color(color: &str) -> FolioResult<()> {
    static HEX_COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    let hex_regex = HEX_COLOR_REGEX.get_or_init(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

    const NAMED_COLORS: &[&str] = &[
        "red", "blue", "green", "white", "black", "transparent", "yellow", "orange", "purple",
        "pink", "gray", "grey",
    ];

    if hex_regex.is_match(color) || NAMED_COLORS.contains(&color) {
        Ok(())
    } else {
        Err(FolioError::InvalidColor {
            value: color.to_string(),
            reason: format!(
                "must be a valid hex color (e.g., #ff0000) or named color ({})",
                NAMED_COLORS.join(", ")
            ),
        })
    }
}

/// Validate a publish slug: lowercase alphanumeric and hyphens.
pub fn validate_slug(slug: &str) -> FolioResult<()> {
    static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = SLUG_REGEX.get_or_init(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").unwrap());
    if re.is_match(slug) {
        Ok(())
    } else {
        Err(FolioError::InvalidSlug {
            slug: slug.to_string(),
        })
    }
}
