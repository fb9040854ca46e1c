use folio_engine::{
    parse_content, parse_schema, parse_template, render_page, ContentDocument, FolioError,
    FormErrors, FormGenerator, MemoryStore, PortfolioDocument, PortfolioStore, RenderMode,
    SaveDebouncer, Styling, Template,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::{Duration, Instant};

const TEMPLATE_JSON: &str = r##"{
    "id": "minimal-folio",
    "version": "2",
    "name": "Minimal Folio",
    "schema": {
        "sections": [
            {
                "id": "hero",
                "name": "Hero",
                "type": "hero",
                "variant": "centered",
                "fields": [
                    {"id": "headline", "type": "text", "validation": {"maxLength": 80}},
                    {"id": "tagline", "type": "text"},
                    {"id": "portrait", "type": "image"}
                ]
            },
            {
                "id": "about",
                "name": "About",
                "type": "about",
                "variant": "two-column",
                "fields": [
                    {"id": "bio", "type": "textarea", "validation": {"maxLength": 500}},
                    {"id": "email", "type": "email", "required": true},
                    {"id": "years", "type": "number", "validation": {"min": 0, "max": 100}}
                ]
            },
            {
                "id": "work",
                "name": "Selected Work",
                "type": "projects",
                "variant": "grid",
                "fields": [
                    {
                        "id": "projects",
                        "type": "array",
                        "validation": {"maxItems": 12},
                        "itemFields": [
                            {"id": "title", "type": "text"},
                            {"id": "description", "type": "textarea"},
                            {"id": "image", "type": "image"},
                            {"id": "link", "type": "url"}
                        ]
                    }
                ]
            }
        ]
    },
    "defaultContent": {
        "hero": {"headline": "Your name here"}
    },
    "styling": {
        "colors": {"background": "#ffffff", "text": "#000000", "accent": "#4a90e2"},
        "fonts": {"body": "Inter", "heading": "Spectral"},
        "typography": {"scale": {"base": "1rem", "xl": "1.75rem"}},
        "spacing": {"section": "5rem"}
    }
}"##;

fn template() -> Template {
    parse_template(TEMPLATE_JSON).expect("template should parse")
}

// ─── Schema parsing ──────────────────────────────────────────────────────────

#[test]
fn test_template_parses_with_aliased_section_type() {
    let template = template();
    // "projects" is an alias for the work section type
    let work = template.schema.section("work").unwrap();
    assert_eq!(String::from(work.kind.clone()), "work");
}

#[test]
fn test_duplicate_section_ids_rejected() {
    let json = r#"{"sections": [
        {"id": "a", "type": "hero", "fields": []},
        {"id": "a", "type": "about", "fields": []}
    ]}"#;
    assert!(matches!(
        parse_schema(json),
        Err(FolioError::DuplicateSectionId { .. })
    ));
}

#[test]
fn test_template_with_bad_color_rejected() {
    let json = r#"{
        "id": "t", "schema": {"sections": []},
        "styling": {"colors": {"text": "not-a-color"}}
    }"#;
    assert!(matches!(
        parse_template(json),
        Err(FolioError::InvalidStylingToken { .. })
    ));
}

// ─── Field constraint properties ─────────────────────────────────────────────

#[test]
fn test_textarea_truncated_to_max_length() {
    let schema = parse_schema(
        r#"{"sections": [{
            "id": "about", "type": "about",
            "fields": [{"id": "bio", "type": "textarea", "validation": {"maxLength": 10}}]
        }]}"#,
    )
    .unwrap();
    let mut form = FormGenerator::new(schema, ContentDocument::new());
    let event = form.apply_field_change("about", "bio", json!("hello world this is long"));
    assert_eq!(event.stored, json!("hello worl"));
    assert_eq!(form.values().text("about", "bio"), "hello worl");
}

#[test]
fn test_max_length_holds_after_any_sequence() {
    let schema = parse_schema(
        r#"{"sections": [{
            "id": "s", "type": "custom",
            "fields": [{"id": "f", "type": "text", "validation": {"maxLength": 8}}]
        }]}"#,
    )
    .unwrap();
    let mut form = FormGenerator::new(schema, ContentDocument::new());
    for input in ["a", "abcdefghij", "short", "0123456789abcdef", ""] {
        form.apply_field_change("s", "f", json!(input));
        assert!(form.values().text("s", "f").chars().count() <= 8);
    }
}

#[test]
fn test_number_clamped_as_string() {
    let mut form = FormGenerator::new(template().schema, ContentDocument::new());
    let event = form.apply_field_change("about", "years", json!("150"));
    assert_eq!(event.stored, json!("100"));

    let event = form.apply_field_change("about", "years", json!(-5));
    assert_eq!(event.stored, json!(0));
}

#[test]
fn test_array_remove_preserves_relative_order() {
    let template = template();
    let content = ContentDocument::new().with_field(
        "work",
        "projects",
        json!([{"title": "a"}, {"title": "b"}, {"title": "c"}, {"title": "d"}]),
    );
    let field = template.schema.section("work").unwrap().field("projects").unwrap();
    let removed = folio_engine::fields::apply_array_edit(
        field,
        content.get("work", "projects"),
        folio_engine::fields::ArrayEdit::Remove { index: 1 },
    );
    assert_eq!(removed, json!([{"title": "a"}, {"title": "c"}, {"title": "d"}]));
}

// ─── Round-trip ──────────────────────────────────────────────────────────────

#[test]
fn test_load_render_read_round_trip() {
    let template = template();
    let content = ContentDocument::new()
        .with_field("hero", "headline", json!("Ada Lovelace"))
        .with_field("about", "bio", json!("Engineer and writer."))
        .with_field("about", "years", json!(12))
        .with_field(
            "work",
            "projects",
            json!([{"title": "Engine", "description": "Notes", "image": "", "link": ""}]),
        );

    // serialize → parse back → render → read values out of the generator
    let serialized = serde_json::to_string(&content).unwrap();
    let reloaded = parse_content(&serialized).unwrap();
    let _page = render_page(&template, &reloaded, None, RenderMode::Display);
    let form = FormGenerator::new(template.schema.clone(), reloaded.clone());

    assert_eq!(form.values(), &content);
}

// ─── Graceful degradation ────────────────────────────────────────────────────

#[test]
fn test_unknown_section_type_renders_declared_fields() {
    let template = parse_template(
        r#"{
            "id": "t",
            "schema": {"sections": [{
                "id": "extras", "name": "Extras", "type": "mystery",
                "fields": [{"id": "note", "type": "text"}]
            }]}
        }"#,
    )
    .unwrap();
    let content = ContentDocument::new().with_field("extras", "note", json!("kept"));
    let page = render_page(&template, &content, None, RenderMode::Display);
    let html = page.to_html();
    assert!(html.contains("data-section-type=\"mystery\""));
    assert!(html.contains("section-custom"));
    assert!(html.contains("kept"));
}

#[test]
fn test_missing_sections_and_fields_never_error() {
    let template = template();
    // completely empty document: renders defaults and placeholders
    let page = render_page(&template, &ContentDocument::new(), None, RenderMode::Display);
    assert!(page.to_html().contains("Your name here"));

    // editing mode over an empty document also renders
    let page = render_page(&template, &ContentDocument::new(), None, RenderMode::Editing);
    assert!(page.to_html().contains("data-section-id=\"about\""));
}

#[test]
fn test_empty_schema_renders_placeholder_without_changes() {
    let schema = parse_schema(r#"{"sections": []}"#).unwrap();
    let form = FormGenerator::new(schema, ContentDocument::new());
    let node = form.render(&FormErrors::default());
    assert_eq!(node.get_attr("class"), Some("form-empty-state"));
    // no sections means no touched fields and no change events were possible
    assert!(!form.is_touched("any", "field"));
}

// ─── Styling ─────────────────────────────────────────────────────────────────

#[test]
fn test_styling_merge_partial_override() {
    let template = template();
    let instance = Styling {
        colors: [("text".to_string(), "#111111".to_string())].into(),
        ..Default::default()
    };
    let merged = Styling::merged(&template.styling, &instance);
    assert_eq!(merged.colors.get("background").unwrap(), "#ffffff");
    assert_eq!(merged.colors.get("text").unwrap(), "#111111");
    assert_eq!(merged.colors.get("accent").unwrap(), "#4a90e2");
}

#[test]
fn test_page_root_exposes_style_variables_and_template_attrs() {
    let page = render_page(&template(), &ContentDocument::new(), None, RenderMode::Display);
    let root = page.root();
    assert_eq!(root.get_attr("data-template-id"), Some("minimal-folio"));
    assert_eq!(root.get_attr("data-template-version"), Some("2"));
    let style = root.get_attr("style").unwrap();
    assert!(style.contains("--color-accent:#4a90e2;"));
    assert!(style.contains("--font-heading:Spectral;"));
    assert!(style.contains("--text-xl:1.75rem;"));
    assert!(style.contains("--spacing-section:5rem;"));
}

#[test]
fn test_standalone_document_output() {
    let page = render_page(&template(), &ContentDocument::new(), None, RenderMode::Display);
    let html = page.to_document();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Minimal Folio</title>"));
}

// ─── Persistence flow ────────────────────────────────────────────────────────

#[test]
fn test_edit_debounce_save_flow() {
    let template = template();
    let mut store = MemoryStore::new();
    store.insert(PortfolioDocument {
        id: "p1".to_string(),
        title: "Mine".to_string(),
        template_id: template.id.clone(),
        published: false,
        slug: None,
        content: ContentDocument::new(),
        styling: Styling::default(),
        updated_at: 0,
    });

    let mut form = FormGenerator::new(template.schema.clone(), ContentDocument::new());
    let mut debouncer = SaveDebouncer::new(Duration::from_secs(2));
    let t0 = Instant::now();

    // two rapid edits coalesce into one pending save
    form.apply_field_change("hero", "headline", json!("Ada"));
    debouncer.schedule("p1", form.values(), t0);
    form.apply_field_change("about", "bio", json!("Engineer."));
    debouncer.schedule("p1", form.values(), t0 + Duration::from_millis(500));

    assert!(debouncer.due(t0 + Duration::from_secs(2)).is_empty());
    let due = debouncer.due(t0 + Duration::from_secs(3));
    assert_eq!(due.len(), 1);

    let (id, delta) = &due[0];
    let saved = store.save(id, delta).unwrap();
    assert_eq!(saved.content.text("hero", "headline"), "Ada");
    assert_eq!(saved.content.text("about", "bio"), "Engineer.");
}

#[test]
fn test_save_failure_keeps_optimistic_state() {
    let template = template();
    let mut store = MemoryStore::new();
    // document never inserted: saving fails
    let mut form = FormGenerator::new(template.schema.clone(), ContentDocument::new());
    form.apply_field_change("hero", "headline", json!("Ada"));

    let result = store.save("missing", form.values());
    assert!(matches!(result, Err(FolioError::DocumentNotFound { .. })));
    // the in-memory tree is not rolled back
    assert_eq!(form.values().text("hero", "headline"), "Ada");
}
