//! Section rendering: type-keyed dispatch from a section's kind to a
//! renderer implementation.
//!
//! Dispatch is total. Every kind outside the known set (including tags the
//! schema parser preserved as `Other`) resolves to [`CustomSection`], so a
//! document is always renderable.

use crate::content::SectionContent;
use crate::fields::{self, ArrayEdit};
use crate::node::Node;
use crate::schema::{FieldDescriptor, FieldType, LayoutVariant, SectionDescriptor, SectionKind};
use serde_json::Value;

/// Whether the page is rendered read-only or with editable controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Display,
    Editing,
}

impl RenderMode {
    pub fn is_editing(&self) -> bool {
        matches!(self, RenderMode::Editing)
    }
}

/// A renderer for one section kind.
pub trait SectionRender: Sync {
    fn render(&self, section: &SectionDescriptor, content: &SectionContent, mode: RenderMode)
        -> Node;
}

/// Resolves a section kind to its renderer. Total: unmapped kinds get the
/// custom renderer.
pub fn renderer_for(kind: &SectionKind) -> &'static dyn SectionRender {
    match kind {
        SectionKind::Hero => &HeroSection,
        SectionKind::About => &AboutSection,
        SectionKind::Work => &WorkSection,
        SectionKind::Gallery => &GallerySection,
        SectionKind::Contact => &ContactSection,
        SectionKind::Custom | SectionKind::Other(_) => &CustomSection,
    }
}

/// Renders one resolved section: wrapper, kind class, layout, fields.
pub fn render_section(
    section: &SectionDescriptor,
    content: &SectionContent,
    mode: RenderMode,
) -> Node {
    renderer_for(&section.kind).render(section, content, mode)
}

// ─── Record-level item editing (work/gallery collections) ────────────────────

/// An edit to one record of a list-valued section field.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEdit {
    /// Append a freshly defaulted record.
    Add,
    /// Remove the record at `index`; later records shift down.
    Remove { index: usize },
    /// Change one sub-field of the record at `index`.
    SetField {
        index: usize,
        field_id: String,
        value: Value,
    },
}

/// Applies a record-level edit to a list field's value. Add respects the
/// field's `maxItems` bound; sub-field changes run through the sub-field's
/// own change application (truncation, clamping).
pub fn apply_item_edit(field: &FieldDescriptor, current: Option<&Value>, edit: ItemEdit) -> Value {
    match edit {
        ItemEdit::Add => {
            let record = match &field.item_fields {
                Some(item_fields) => fields::default_item(item_fields),
                None => Value::String(String::new()),
            };
            fields::apply_array_edit(field, current, ArrayEdit::Append(record))
        }
        ItemEdit::Remove { index } => {
            fields::apply_array_edit(field, current, ArrayEdit::Remove { index })
        }
        ItemEdit::SetField {
            index,
            field_id,
            value,
        } => {
            let items = current.and_then(Value::as_array);
            let Some(item) = items.and_then(|a| a.get(index)) else {
                return current.cloned().unwrap_or_else(|| Value::Array(Vec::new()));
            };
            let mut record = item.as_object().cloned().unwrap_or_default();
            let stored = match field
                .item_fields
                .as_deref()
                .and_then(|subs| subs.iter().find(|s| s.id == field_id))
            {
                Some(sub) => fields::apply_change(sub, record.get(&field_id), value),
                None => value,
            };
            record.insert(field_id, stored);
            fields::apply_array_edit(
                field,
                current,
                ArrayEdit::Set {
                    index,
                    value: Value::Object(record),
                },
            )
        }
    }
}

// ─── Shared building blocks ──────────────────────────────────────────────────

fn section_wrapper(section: &SectionDescriptor, kind_class: &str) -> Node {
    Node::new("section")
        .attr("data-section-id", &section.id)
        .attr("data-section-type", &String::from(section.kind.clone()))
        .class("section")
        .class(kind_class)
}

fn layout_wrapper(section: &SectionDescriptor) -> Node {
    let variant = section
        .variant
        .as_deref()
        .map(LayoutVariant::parse)
        .unwrap_or_default();
    Node::new("div").class(variant.class_name())
}

fn field_block(
    section: &SectionDescriptor,
    field: &FieldDescriptor,
    content: &SectionContent,
    mode: RenderMode,
) -> Node {
    let value = content.get(&field.id);
    let mut block = Node::new("div")
        .class("field")
        .attr("data-field-id", &field.id);

    if mode.is_editing() {
        if let Some(label) = &field.label {
            block = block.child(Node::text("label", label).class("field-label"));
        }
        let name = format!("{}.{}", section.id, field.id);
        block = block.child(fields::control_node(field, value, &name));
        if let Some(help) = &field.help_text {
            block = block.child(Node::text("p", help).class("field-help"));
        }
    } else {
        block = block.child(fields::display_node(field, value));
    }
    block
}

fn fields_in_layout(
    section: &SectionDescriptor,
    content: &SectionContent,
    mode: RenderMode,
) -> Node {
    let mut layout = layout_wrapper(section);
    for field in &section.fields {
        layout = layout.child(field_block(section, field, content, mode));
    }
    layout
}

fn heading(section: &SectionDescriptor) -> Option<Node> {
    if section.name.is_empty() {
        return None;
    }
    Some(Node::text("h2", &section.name).class("section-heading"))
}

/// Item-card grid for a list-valued field (work projects, gallery images).
fn item_grid(
    section: &SectionDescriptor,
    field: &FieldDescriptor,
    content: &SectionContent,
    grid_class: &str,
) -> Node {
    let items = content
        .get(&field.id)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut grid = Node::new("div")
        .class(grid_class)
        .attr("data-field-id", &field.id);
    for (index, item) in items.iter().enumerate() {
        let mut card = Node::new("article")
            .class("item-card")
            .attr("data-index", &index.to_string());
        if let Some(item_fields) = &field.item_fields {
            for sub in item_fields {
                let value = item.get(&sub.id);
                let rendered = match (&sub.field_type, value.and_then(Value::as_str)) {
                    (FieldType::Image, Some(src)) if !src.is_empty() => Node::new("img")
                        .attr("src", src)
                        .attr("alt", sub.label.as_deref().unwrap_or(&sub.id))
                        .class("item-image"),
                    _ if sub.id == "title" => {
                        Node::text("h3", value.and_then(Value::as_str).unwrap_or(""))
                            .class("item-title")
                    }
                    _ => fields::display_node(sub, value),
                };
                card = card.child(rendered);
            }
        } else {
            card = card.child(Node::text("p", item.as_str().unwrap_or("")));
        }
        grid = grid.child(card);
    }
    grid
}

/// First list-valued field of a section, if any.
fn list_field(section: &SectionDescriptor) -> Option<&FieldDescriptor> {
    section
        .fields
        .iter()
        .find(|f| f.field_type == FieldType::Array)
}

// ─── Renderers ───────────────────────────────────────────────────────────────

/// Opening section: first text field becomes the page headline.
pub struct HeroSection;

impl SectionRender for HeroSection {
    fn render(
        &self,
        section: &SectionDescriptor,
        content: &SectionContent,
        mode: RenderMode,
    ) -> Node {
        let wrapper = section_wrapper(section, "section-hero");
        if mode.is_editing() {
            return wrapper.child(fields_in_layout(section, content, mode));
        }

        let mut inner = layout_wrapper(section);
        let mut headline_used = false;
        for field in &section.fields {
            let value = content.get(&field.id);
            let text = value.and_then(Value::as_str).unwrap_or("");
            let rendered = match &field.field_type {
                t if t.is_text_like() && !headline_used => {
                    headline_used = true;
                    Node::text("h1", text).class("hero-headline")
                }
                t if t.is_text_like() => Node::text("p", text).class("hero-tagline"),
                FieldType::Image if !text.is_empty() => Node::new("img")
                    .attr("src", text)
                    .attr("alt", field.label.as_deref().unwrap_or(&field.id))
                    .class("hero-image"),
                _ => fields::display_node(field, value),
            };
            inner = inner.child(rendered);
        }
        wrapper.child(inner)
    }
}

/// Prose section: heading plus fields in the declared layout.
pub struct AboutSection;

impl SectionRender for AboutSection {
    fn render(
        &self,
        section: &SectionDescriptor,
        content: &SectionContent,
        mode: RenderMode,
    ) -> Node {
        let mut wrapper = section_wrapper(section, "section-about");
        if let Some(h) = heading(section) {
            wrapper = wrapper.child(h);
        }
        wrapper.child(fields_in_layout(section, content, mode))
    }
}

/// Project collection: list field renders as a card grid in display mode.
pub struct WorkSection;

impl SectionRender for WorkSection {
    fn render(
        &self,
        section: &SectionDescriptor,
        content: &SectionContent,
        mode: RenderMode,
    ) -> Node {
        let mut wrapper = section_wrapper(section, "section-work");
        if let Some(h) = heading(section) {
            wrapper = wrapper.child(h);
        }
        if mode.is_editing() {
            return wrapper.child(fields_in_layout(section, content, mode));
        }
        match list_field(section) {
            Some(field) => {
                let mut layout = layout_wrapper(section);
                for other in section.fields.iter().filter(|f| f.id != field.id) {
                    layout = layout.child(field_block(section, other, content, mode));
                }
                layout = layout.child(item_grid(section, field, content, "work-grid"));
                wrapper.child(layout)
            }
            None => wrapper.child(fields_in_layout(section, content, mode)),
        }
    }
}

/// Image collection: like work, with an image-first card grid.
pub struct GallerySection;

impl SectionRender for GallerySection {
    fn render(
        &self,
        section: &SectionDescriptor,
        content: &SectionContent,
        mode: RenderMode,
    ) -> Node {
        let mut wrapper = section_wrapper(section, "section-gallery");
        if let Some(h) = heading(section) {
            wrapper = wrapper.child(h);
        }
        if mode.is_editing() {
            return wrapper.child(fields_in_layout(section, content, mode));
        }
        match list_field(section) {
            Some(field) => wrapper.child(item_grid(section, field, content, "gallery-grid")),
            None => wrapper.child(fields_in_layout(section, content, mode)),
        }
    }
}

/// Contact details: display mode leans on link renderings (mailto, external).
pub struct ContactSection;

impl SectionRender for ContactSection {
    fn render(
        &self,
        section: &SectionDescriptor,
        content: &SectionContent,
        mode: RenderMode,
    ) -> Node {
        let mut wrapper = section_wrapper(section, "section-contact");
        if let Some(h) = heading(section) {
            wrapper = wrapper.child(h);
        }
        wrapper.child(fields_in_layout(section, content, mode))
    }
}

/// Fallback renderer: generic heading + fields. Also serves every unmapped
/// section kind.
pub struct CustomSection;

impl SectionRender for CustomSection {
    fn render(
        &self,
        section: &SectionDescriptor,
        content: &SectionContent,
        mode: RenderMode,
    ) -> Node {
        let mut wrapper = section_wrapper(section, "section-custom");
        if let Some(h) = heading(section) {
            wrapper = wrapper.child(h);
        }
        wrapper.child(fields_in_layout(section, content, mode))
    }
}
