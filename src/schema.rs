use serde::{Deserialize, Serialize};
use tracing::warn;

/// A template's editable structure: an ordered list of section descriptors.
///
/// Section ids are unique within a schema (enforced by the validator).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub sections: Vec<SectionDescriptor>,
}

impl Schema {
    pub fn section(&self, id: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.id == id)
    }
}

/// Schema-level metadata for one section of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: SectionKind,
    /// Named layout strategy; unrecognized names degrade to single-column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl SectionDescriptor {
    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// Section type tag. Dispatch to a renderer is total: anything outside the
/// known set resolves to the custom renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionKind {
    Hero,
    About,
    Work,
    Gallery,
    Contact,
    #[default]
    Custom,
    /// Unrecognized tag, preserved verbatim so schemas round-trip.
    Other(String),
}

impl From<String> for SectionKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "hero" => SectionKind::Hero,
            "about" => SectionKind::About,
            // "projects" and "portfolio" are legacy aliases for work sections
            "work" | "projects" | "portfolio" => SectionKind::Work,
            "gallery" => SectionKind::Gallery,
            "contact" => SectionKind::Contact,
            "custom" => SectionKind::Custom,
            _ => {
                warn!(tag = %tag, "unknown section type, rendering via custom fallback");
                SectionKind::Other(tag)
            }
        }
    }
}

impl From<SectionKind> for String {
    fn from(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Hero => "hero".to_string(),
            SectionKind::About => "about".to_string(),
            SectionKind::Work => "work".to_string(),
            SectionKind::Gallery => "gallery".to_string(),
            SectionKind::Contact => "contact".to_string(),
            SectionKind::Custom => "custom".to_string(),
            SectionKind::Other(tag) => tag,
        }
    }
}

/// Schema-level metadata for one editable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    /// Sub-fields for `object`-typed fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDescriptor>>,
    /// Record shape for `array`-typed fields whose items are objects.
    /// Absent for arrays of scalars.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_fields: Option<Vec<FieldDescriptor>>,
}

impl FieldDescriptor {
    pub fn new(id: &str, field_type: FieldType) -> Self {
        Self {
            id: id.to_string(),
            field_type,
            label: None,
            placeholder: None,
            help_text: None,
            required: false,
            validation: None,
            fields: None,
            item_fields: None,
        }
    }

    pub fn rules(&self) -> ValidationRules {
        self.validation.clone().unwrap_or_default()
    }
}

/// Field type tag. The set is closed; an unrecognized tag is preserved and
/// treated as `text` at render/edit time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Url,
    Tel,
    Textarea,
    Richtext,
    Image,
    Video,
    File,
    Number,
    Checkbox,
    Toggle,
    Select,
    Array,
    Object,
    /// Unrecognized tag, preserved verbatim so schemas round-trip.
    Unknown(String),
}

impl FieldType {
    /// True for types whose value is a plain string subject to max-length.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            FieldType::Text
                | FieldType::Email
                | FieldType::Url
                | FieldType::Tel
                | FieldType::Textarea
                | FieldType::Richtext
                | FieldType::Unknown(_)
        )
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, FieldType::Checkbox | FieldType::Toggle)
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => FieldType::Text,
            "email" => FieldType::Email,
            "url" => FieldType::Url,
            "tel" => FieldType::Tel,
            "textarea" => FieldType::Textarea,
            "richtext" => FieldType::Richtext,
            "image" => FieldType::Image,
            "video" => FieldType::Video,
            "file" => FieldType::File,
            "number" => FieldType::Number,
            "checkbox" => FieldType::Checkbox,
            "toggle" => FieldType::Toggle,
            "select" => FieldType::Select,
            "array" => FieldType::Array,
            "object" => FieldType::Object,
            _ => {
                warn!(tag = %tag, "unknown field type, falling back to text control");
                FieldType::Unknown(tag)
            }
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => "text".to_string(),
            FieldType::Email => "email".to_string(),
            FieldType::Url => "url".to_string(),
            FieldType::Tel => "tel".to_string(),
            FieldType::Textarea => "textarea".to_string(),
            FieldType::Richtext => "richtext".to_string(),
            FieldType::Image => "image".to_string(),
            FieldType::Video => "video".to_string(),
            FieldType::File => "file".to_string(),
            FieldType::Number => "number".to_string(),
            FieldType::Checkbox => "checkbox".to_string(),
            FieldType::Toggle => "toggle".to_string(),
            FieldType::Select => "select".to_string(),
            FieldType::Array => "array".to_string(),
            FieldType::Object => "object".to_string(),
            FieldType::Unknown(tag) => tag,
        }
    }
}

/// Per-field validation constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Allowed values for `select` fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Allowed file extensions for `file`/`image` fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

/// Named layout strategy for a section's fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutVariant {
    #[default]
    SingleColumn,
    TwoColumn,
    Centered,
    Grid,
    Split,
}

impl LayoutVariant {
    /// Parses a variant name. Unrecognized names degrade to the single-column
    /// default and warn rather than erroring.
    pub fn parse(name: &str) -> Self {
        match name {
            "single-column" | "default" => Self::SingleColumn,
            "two-column" => Self::TwoColumn,
            "centered" => Self::Centered,
            "grid" => Self::Grid,
            "split" => Self::Split,
            _ => {
                warn!(variant = %name, "unknown layout variant, using single column");
                Self::SingleColumn
            }
        }
    }

    /// CSS class emitted on the section's field wrapper.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::SingleColumn => "layout-single-column",
            Self::TwoColumn => "layout-two-column",
            Self::Centered => "layout-centered",
            Self::Grid => "layout-grid",
            Self::Split => "layout-split",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_kind_aliases() {
        assert_eq!(SectionKind::from("projects".to_string()), SectionKind::Work);
        assert_eq!(SectionKind::from("portfolio".to_string()), SectionKind::Work);
        assert_eq!(SectionKind::from("work".to_string()), SectionKind::Work);
    }

    #[test]
    fn test_section_kind_unknown_round_trips() {
        let kind = SectionKind::from("mystery".to_string());
        assert_eq!(kind, SectionKind::Other("mystery".to_string()));
        assert_eq!(String::from(kind), "mystery");
    }

    #[test]
    fn test_field_type_unknown_round_trips() {
        let parsed: FieldDescriptor =
            serde_json::from_str(r#"{"id":"x","type":"hologram"}"#).unwrap();
        assert_eq!(parsed.field_type, FieldType::Unknown("hologram".to_string()));
        let back = serde_json::to_value(&parsed).unwrap();
        assert_eq!(back["type"], "hologram");
    }

    #[test]
    fn test_layout_variant_fallback() {
        assert_eq!(LayoutVariant::parse("two-column"), LayoutVariant::TwoColumn);
        assert_eq!(LayoutVariant::parse("zigzag"), LayoutVariant::SingleColumn);
    }

    #[test]
    fn test_schema_deserialize_camel_case() {
        let json = r#"{
            "sections": [{
                "id": "about",
                "name": "About",
                "type": "about",
                "fields": [{
                    "id": "bio",
                    "type": "textarea",
                    "validation": {"maxLength": 500}
                }]
            }]
        }"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        let field = &schema.sections[0].fields[0];
        assert_eq!(field.field_type, FieldType::Textarea);
        assert_eq!(field.rules().max_length, Some(500));
    }
}
