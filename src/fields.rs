//! Field-level rendering and change application.
//!
//! Every value mutation funnels through [`apply_change`] /
//! [`apply_array_edit`], which enforce the per-type constraints (max-length
//! truncation, numeric clamping, item bounds) before a value is accepted.
//! Rendering produces either an editable control or a read-only display node
//! for the same descriptor.

use crate::node::Node;
use crate::schema::{FieldDescriptor, FieldType};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// An edit to one element of an array-typed field.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayEdit {
    Set { index: usize, value: Value },
    Append(Value),
    Remove { index: usize },
}

/// Applies an incoming value to a field, returning the value actually stored.
///
/// Constraints are enforced here, not merely flagged: text beyond
/// `maxLength` is truncated, numbers are clamped into `[min, max]`, select
/// values outside the allowed options keep the previous value.
pub fn apply_change(field: &FieldDescriptor, current: Option<&Value>, incoming: Value) -> Value {
    let rules = field.rules();

    match &field.field_type {
        t if t.is_text_like() => {
            if matches!(t, FieldType::Unknown(_)) {
                warn!(field = %field.id, "unknown field type, applying text semantics");
            }
            match incoming {
                Value::String(text) => Value::String(clamp_text(&text, rules.max_length)),
                other => other,
            }
        }
        FieldType::Number => clamp_number(incoming, rules.min, rules.max),
        t if t.is_boolean() => Value::Bool(truthy(&incoming)),
        FieldType::Select => {
            let allowed = match (&rules.options, incoming.as_str()) {
                (Some(options), Some(text)) => {
                    text.is_empty() || options.iter().any(|o| o == text)
                }
                _ => true,
            };
            if allowed {
                incoming
            } else {
                debug!(field = %field.id, "select value outside allowed options, keeping previous");
                current.cloned().unwrap_or(Value::Null)
            }
        }
        FieldType::Object => {
            let mut merged = current
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            if let Value::Object(updates) = incoming {
                for (sub_id, value) in updates {
                    merged.insert(sub_id, value);
                }
            }
            Value::Object(merged)
        }
        FieldType::Array => match incoming {
            Value::Array(mut items) => {
                if let Some(max_items) = rules.max_items {
                    if items.len() > max_items {
                        debug!(field = %field.id, "array exceeds maxItems, truncating");
                        items.truncate(max_items);
                    }
                }
                Value::Array(items)
            }
            other => other,
        },
        // image/video/file store a URL or path string as-is
        _ => incoming,
    }
}

/// Applies a per-item edit to an array-typed field's value.
///
/// Appending at the `maxItems` bound is a no-op; removal shifts later
/// indices down so the list never has gaps.
pub fn apply_array_edit(field: &FieldDescriptor, current: Option<&Value>, edit: ArrayEdit) -> Value {
    let mut items = current
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    match edit {
        ArrayEdit::Set { index, value } => {
            if index < items.len() {
                items[index] = value;
            }
        }
        ArrayEdit::Append(value) => {
            let max_items = field.rules().max_items;
            if max_items.is_some_and(|max| items.len() >= max) {
                debug!(field = %field.id, "append ignored, array at maxItems bound");
            } else {
                items.push(value);
            }
        }
        ArrayEdit::Remove { index } => {
            if index < items.len() {
                items.remove(index);
            }
        }
    }
    Value::Array(items)
}

/// Default value for a field that has no stored content yet.
pub fn default_value(field: &FieldDescriptor) -> Value {
    match &field.field_type {
        t if t.is_boolean() => Value::Bool(false),
        FieldType::Number => Value::Null,
        FieldType::Array => json!([]),
        FieldType::Object => {
            let mut record = Map::new();
            if let Some(sub_fields) = &field.fields {
                for sub in sub_fields {
                    record.insert(sub.id.clone(), default_value(sub));
                }
            }
            Value::Object(record)
        }
        _ => Value::String(String::new()),
    }
}

/// Default record for one item of an array field declaring `itemFields`.
pub fn default_item(item_fields: &[FieldDescriptor]) -> Value {
    let mut record = Map::new();
    for field in item_fields {
        record.insert(field.id.clone(), default_value(field));
    }
    Value::Object(record)
}

fn clamp_text(text: &str, max_length: Option<usize>) -> String {
    match max_length {
        Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
        _ => text.to_string(),
    }
}

/// Clamps a numeric value into `[min, max]`, preserving the incoming shape:
/// a numeric string stays a string, a number stays a number.
fn clamp_number(incoming: Value, min: Option<f64>, max: Option<f64>) -> Value {
    let clamp = |n: f64| {
        let n = min.map_or(n, |lo| n.max(lo));
        max.map_or(n, |hi| n.min(hi))
    };
    match incoming {
        Value::Number(n) => match n.as_f64() {
            Some(raw) => number_value(clamp(raw)),
            None => Value::Number(n),
        },
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(raw) => Value::String(format_number(clamp(raw))),
            Err(_) => Value::String(s),
        },
        other => other,
    }
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true" || s == "on" || s == "1",
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Editable control for a field. `name` is the fully-qualified control name
/// (`sectionId.fieldId`) the host uses to route change events.
pub fn control_node(field: &FieldDescriptor, value: Option<&Value>, name: &str) -> Node {
    let rules = field.rules();
    let text = value.and_then(Value::as_str).unwrap_or("");

    match &field.field_type {
        FieldType::Textarea | FieldType::Richtext => {
            let mut node = Node::text("textarea", text)
                .attr("name", name)
                .class("field-control");
            if field.field_type == FieldType::Richtext {
                node = node.class("richtext-editor").attr("data-richtext", "true");
            }
            if let Some(max_length) = rules.max_length {
                node = node.attr("maxlength", &max_length.to_string());
            }
            with_placeholder(node, field)
        }
        FieldType::Number => {
            let mut node = Node::new("input")
                .attr("type", "number")
                .attr("name", name)
                .attr("value", &text_or_number(value))
                .class("field-control");
            if let Some(min) = rules.min {
                node = node.attr("min", &min.to_string());
            }
            if let Some(max) = rules.max {
                node = node.attr("max", &max.to_string());
            }
            node
        }
        t if t.is_boolean() => {
            let mut node = Node::new("input")
                .attr("type", "checkbox")
                .attr("name", name)
                .class(if *t == FieldType::Toggle {
                    "field-control toggle"
                } else {
                    "field-control"
                });
            if value.and_then(Value::as_bool).unwrap_or(false) {
                node = node.attr("checked", "checked");
            }
            node
        }
        FieldType::Select => {
            let mut select = Node::new("select").attr("name", name).class("field-control");
            for option in rules.options.as_deref().unwrap_or_default() {
                let mut opt = Node::text("option", option).attr("value", option);
                if option == text {
                    opt = opt.attr("selected", "selected");
                }
                select = select.child(opt);
            }
            select
        }
        FieldType::Image | FieldType::Video | FieldType::File => {
            let mut slot = Node::new("div").class("media-field");
            if field.field_type == FieldType::Image && !text.is_empty() {
                slot = slot.child(
                    Node::new("img")
                        .attr("src", text)
                        .attr("alt", field.label.as_deref().unwrap_or(&field.id))
                        .class("media-preview"),
                );
            }
            let input = Node::new("input")
                .attr("type", "url")
                .attr("name", name)
                .attr("value", text)
                .class("field-control media-input");
            slot.child(with_placeholder(input, field))
        }
        FieldType::Array => array_control(field, value, name),
        FieldType::Object => {
            let mut group = Node::new("fieldset")
                .attr("name", name)
                .class("object-field");
            for sub in field.fields.as_deref().unwrap_or_default() {
                let sub_value = value.and_then(|v| v.get(&sub.id));
                let sub_name = format!("{}.{}", name, sub.id);
                group = group.child(control_node(sub, sub_value, &sub_name));
            }
            group
        }
        t => {
            if let FieldType::Unknown(tag) = t {
                warn!(field = %field.id, tag = %tag, "unknown field type, rendering text control");
            }
            let input_type = match t {
                FieldType::Email => "email",
                FieldType::Url => "url",
                FieldType::Tel => "tel",
                _ => "text",
            };
            let mut node = Node::new("input")
                .attr("type", input_type)
                .attr("name", name)
                .attr("value", text)
                .class("field-control");
            if let Some(max_length) = rules.max_length {
                node = node.attr("maxlength", &max_length.to_string());
            }
            with_placeholder(node, field)
        }
    }
}

fn with_placeholder(node: Node, field: &FieldDescriptor) -> Node {
    match &field.placeholder {
        Some(placeholder) => node.attr("placeholder", placeholder),
        None => node,
    }
}

fn array_control(field: &FieldDescriptor, value: Option<&Value>, name: &str) -> Node {
    let items = value.and_then(Value::as_array).cloned().unwrap_or_default();
    let rules = field.rules();
    let mut list = Node::new("div").class("array-field").attr("data-field", name);

    for (index, item) in items.iter().enumerate() {
        let item_name = format!("{}[{}]", name, index);
        let control = match &field.item_fields {
            Some(item_fields) => {
                let mut record = Node::new("div").class("array-item-record");
                for sub in item_fields {
                    let sub_name = format!("{}.{}", item_name, sub.id);
                    record = record.child(control_node(sub, item.get(&sub.id), &sub_name));
                }
                record
            }
            None => Node::new("input")
                .attr("type", "text")
                .attr("name", &item_name)
                .attr("value", item.as_str().unwrap_or(""))
                .class("field-control"),
        };
        list = list.child(
            Node::new("div")
                .class("array-item")
                .attr("data-index", &index.to_string())
                .child(control)
                .child(
                    Node::text("button", "Remove")
                        .attr("type", "button")
                        .attr("data-remove-index", &index.to_string())
                        .class("array-remove"),
                ),
        );
    }

    // The add control disappears entirely once the bound is reached
    let at_bound = rules.max_items.is_some_and(|max| items.len() >= max);
    if !at_bound {
        list = list.child(
            Node::text("button", "Add")
                .attr("type", "button")
                .attr("data-add", "true")
                .class("array-add"),
        );
    }
    list
}

/// Read-only display for a field value.
pub fn display_node(field: &FieldDescriptor, value: Option<&Value>) -> Node {
    let text = value.and_then(Value::as_str).unwrap_or("");

    match &field.field_type {
        FieldType::Email => {
            if text.is_empty() {
                Node::new("span").class("field-empty")
            } else {
                Node::text("a", text)
                    .attr("href", &format!("mailto:{}", text))
                    .class("field-link")
            }
        }
        FieldType::Url | FieldType::Video => {
            if text.is_empty() {
                Node::new("span").class("field-empty")
            } else {
                Node::text("a", text)
                    .attr("href", text)
                    .attr("target", "_blank")
                    .attr("rel", "noopener")
                    .class("field-link")
            }
        }
        FieldType::Image => {
            if text.is_empty() {
                Node::new("div").class("image-placeholder")
            } else {
                Node::new("img")
                    .attr("src", text)
                    .attr("alt", field.label.as_deref().unwrap_or(&field.id))
            }
        }
        FieldType::File => {
            if text.is_empty() {
                Node::new("span").class("field-empty")
            } else {
                Node::text("a", text).attr("href", text).class("field-link")
            }
        }
        t if t.is_boolean() => {
            let checked = value.and_then(Value::as_bool).unwrap_or(false);
            Node::text("span", if checked { "✓" } else { "" }).class("field-flag")
        }
        FieldType::Number => Node::text("span", &text_or_number(value)).class("field-value"),
        FieldType::Array => {
            let items = value.and_then(Value::as_array).cloned().unwrap_or_default();
            let mut list = Node::new("ul").class("array-display");
            for item in &items {
                let entry = match &field.item_fields {
                    Some(item_fields) => {
                        let mut record = Node::new("li").class("array-display-item");
                        for sub in item_fields {
                            record = record.child(display_node(sub, item.get(&sub.id)));
                        }
                        record
                    }
                    None => Node::text("li", item.as_str().unwrap_or("")),
                };
                list = list.child(entry);
            }
            list
        }
        FieldType::Object => {
            let mut record = Node::new("div").class("object-display");
            for sub in field.fields.as_deref().unwrap_or_default() {
                record = record.child(display_node(sub, value.and_then(|v| v.get(&sub.id))));
            }
            record
        }
        t => {
            if let FieldType::Unknown(tag) = t {
                warn!(field = %field.id, tag = %tag, "unknown field type, rendering as text");
            }
            Node::text("span", text).class("field-value")
        }
    }
}

/// Number-or-string value rendered for an attribute/text slot.
fn text_or_number(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidationRules;
    use pretty_assertions::assert_eq;

    fn text_field(max_length: Option<usize>) -> FieldDescriptor {
        let mut field = FieldDescriptor::new("bio", FieldType::Textarea);
        field.validation = Some(ValidationRules {
            max_length,
            ..Default::default()
        });
        field
    }

    #[test]
    fn test_text_truncated_to_max_length() {
        let field = text_field(Some(10));
        let stored = apply_change(&field, None, json!("hello world this is long"));
        assert_eq!(stored, json!("hello worl"));
    }

    #[test]
    fn test_text_truncation_counts_chars_not_bytes() {
        let field = text_field(Some(3));
        let stored = apply_change(&field, None, json!("héllo"));
        assert_eq!(stored, json!("hél"));
    }

    #[test]
    fn test_number_clamped_to_bounds() {
        let mut field = FieldDescriptor::new("years", FieldType::Number);
        field.validation = Some(ValidationRules {
            min: Some(0.0),
            max: Some(100.0),
            ..Default::default()
        });
        assert_eq!(apply_change(&field, None, json!(150)), json!(100));
        assert_eq!(apply_change(&field, None, json!(-3)), json!(0));
        assert_eq!(apply_change(&field, None, json!(42)), json!(42));
        // numeric strings keep their shape
        assert_eq!(apply_change(&field, None, json!("150")), json!("100"));
    }

    #[test]
    fn test_select_rejects_unknown_option() {
        let mut field = FieldDescriptor::new("role", FieldType::Select);
        field.validation = Some(ValidationRules {
            options: Some(vec!["dev".to_string(), "design".to_string()]),
            ..Default::default()
        });
        let current = json!("dev");
        assert_eq!(
            apply_change(&field, Some(&current), json!("ops")),
            json!("dev")
        );
        assert_eq!(apply_change(&field, Some(&current), json!("design")), json!("design"));
    }

    #[test]
    fn test_object_shallow_merge() {
        let mut field = FieldDescriptor::new("social", FieldType::Object);
        field.fields = Some(vec![
            FieldDescriptor::new("github", FieldType::Url),
            FieldDescriptor::new("twitter", FieldType::Url),
        ]);
        let current = json!({"github": "https://github.com/ada", "twitter": ""});
        let stored = apply_change(&field, Some(&current), json!({"twitter": "https://t.co/ada"}));
        assert_eq!(
            stored,
            json!({"github": "https://github.com/ada", "twitter": "https://t.co/ada"})
        );
    }

    #[test]
    fn test_array_append_bounded() {
        let mut field = FieldDescriptor::new("tags", FieldType::Array);
        field.validation = Some(ValidationRules {
            max_items: Some(2),
            ..Default::default()
        });
        let v1 = apply_array_edit(&field, None, ArrayEdit::Append(json!("a")));
        let v2 = apply_array_edit(&field, Some(&v1), ArrayEdit::Append(json!("b")));
        let v3 = apply_array_edit(&field, Some(&v2), ArrayEdit::Append(json!("c")));
        assert_eq!(v3, json!(["a", "b"]));
    }

    #[test]
    fn test_array_remove_shifts_down() {
        let field = FieldDescriptor::new("tags", FieldType::Array);
        let current = json!(["a", "b", "c"]);
        let removed = apply_array_edit(&field, Some(&current), ArrayEdit::Remove { index: 1 });
        assert_eq!(removed, json!(["a", "c"]));
    }

    #[test]
    fn test_array_remove_out_of_bounds_noop() {
        let field = FieldDescriptor::new("tags", FieldType::Array);
        let current = json!(["a"]);
        let result = apply_array_edit(&field, Some(&current), ArrayEdit::Remove { index: 5 });
        assert_eq!(result, json!(["a"]));
    }

    #[test]
    fn test_unknown_type_behaves_as_text() {
        let mut field = FieldDescriptor::new("weird", FieldType::Unknown("hologram".to_string()));
        field.validation = Some(ValidationRules {
            max_length: Some(4),
            ..Default::default()
        });
        assert_eq!(apply_change(&field, None, json!("abcdef")), json!("abcd"));
        let node = control_node(&field, None, "custom.weird");
        assert_eq!(node.get_attr("type"), Some("text"));
    }

    #[test]
    fn test_display_email_renders_mailto() {
        let field = FieldDescriptor::new("email", FieldType::Email);
        let value = json!("ada@example.com");
        let node = display_node(&field, Some(&value));
        assert_eq!(node.tag, "a");
        assert_eq!(node.get_attr("href"), Some("mailto:ada@example.com"));
    }

    #[test]
    fn test_display_boolean_checkmark() {
        let field = FieldDescriptor::new("open", FieldType::Toggle);
        let value = json!(true);
        assert_eq!(display_node(&field, Some(&value)).text_content(), "✓");
        let value = json!(false);
        assert_eq!(display_node(&field, Some(&value)).text_content(), "");
    }

    #[test]
    fn test_array_add_control_hidden_at_bound() {
        let mut field = FieldDescriptor::new("tags", FieldType::Array);
        field.validation = Some(ValidationRules {
            max_items: Some(1),
            ..Default::default()
        });
        let under = control_node(&field, Some(&json!([])), "s.tags");
        assert!(under.find_by_attr("data-add", "true").is_some());
        let at_bound = control_node(&field, Some(&json!(["x"])), "s.tags");
        assert!(at_bound.find_by_attr("data-add", "true").is_none());
    }

    #[test]
    fn test_default_item_from_item_fields() {
        let fields = vec![
            FieldDescriptor::new("title", FieldType::Text),
            FieldDescriptor::new("featured", FieldType::Toggle),
        ];
        assert_eq!(default_item(&fields), json!({"title": "", "featured": false}));
    }
}
