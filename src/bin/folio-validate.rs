use folio_engine::{parse_content, parse_schema, parse_template, FolioError};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: folio-validate <file.json> [more files...]");
        eprintln!();
        eprintln!("Validates template, schema, or content documents:");
        eprintln!("  folio-validate template.json");
        eprintln!("  folio-validate schemas/*.json");
        process::exit(1);
    }

    let mut exit_code = 0;

    for file_path in &args[1..] {
        match validate_file(file_path) {
            Ok(kind) => {
                println!("✓ {} is a valid {}", file_path, kind);
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file_path);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

/// Detects the document shape by its top-level keys and validates it.
fn validate_file(path: &str) -> Result<&'static str, FolioError> {
    let content = fs::read_to_string(path)
        .map_err(|e| FolioError::ValidationError(format!("Failed to read file: {}", e)))?;

    let value: serde_json::Value = serde_json::from_str(&content)?;
    let object = value
        .as_object()
        .ok_or_else(|| FolioError::ValidationError("top level must be an object".to_string()))?;

    if object.contains_key("schema") {
        parse_template(&content)?;
        Ok("template")
    } else if object.contains_key("sections") {
        parse_schema(&content)?;
        Ok("schema")
    } else {
        parse_content(&content)?;
        Ok("content document")
    }
}

fn print_error(error: &FolioError) {
    match error {
        FolioError::ValidationError(msg) => {
            eprintln!("  Validation error:");
            eprintln!("    {}", msg);
        }
        FolioError::InvalidSchema { reason } => {
            eprintln!("  Invalid schema:");
            eprintln!("    {}", reason);
        }
        FolioError::DuplicateSectionId { id } => {
            eprintln!("  Duplicate section id '{}':", id);
            eprintln!("    Section ids must be unique within a schema");
        }
        FolioError::DuplicateFieldId { section, id } => {
            eprintln!("  Duplicate field id '{}' in section '{}'", id, section);
        }
        FolioError::InvalidField {
            section,
            field,
            reason,
        } => {
            eprintln!("  Invalid field '{}' in section '{}':", field, section);
            eprintln!("    {}", reason);
        }
        FolioError::InvalidRule {
            field,
            rule,
            reason,
        } => {
            eprintln!("  Invalid rule '{}' for field '{}':", rule, field);
            eprintln!("    {}", reason);
        }
        FolioError::InvalidColor { value, reason } => {
            eprintln!("  Invalid color value '{}':", value);
            eprintln!("    {}", reason);
        }
        FolioError::InvalidStylingToken {
            category,
            token,
            reason,
        } => {
            eprintln!("  Invalid styling token '{}' in '{}':", token, category);
            eprintln!("    {}", reason);
        }
        FolioError::DeserializationError(msg) => {
            eprintln!("  Deserialization error:");
            eprintln!("    {}", msg);
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}
