//! Design-token styling: template defaults overlaid by instance overrides.
//!
//! Merging is deliberately per-category (colors, fonts, typography scale,
//! spacing) rather than a generic deep merge, so an instance can override a
//! single color token without discarding the rest of the template's palette.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type TokenMap = BTreeMap<String, String>;

/// Partial record of design tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Styling {
    pub colors: TokenMap,
    pub fonts: TokenMap,
    pub typography: Typography,
    pub spacing: TokenMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Typography {
    /// Type scale steps, e.g. "base" -> "1rem", "xl" -> "1.5rem".
    pub scale: TokenMap,
}

impl Styling {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template tokens overlaid by instance tokens, key by key per category.
    /// Instance wins on conflicts; everything else survives.
    pub fn merged(template: &Styling, instance: &Styling) -> Styling {
        Styling {
            colors: merge_tokens(&template.colors, &instance.colors),
            fonts: merge_tokens(&template.fonts, &instance.fonts),
            typography: Typography {
                scale: merge_tokens(&template.typography.scale, &instance.typography.scale),
            },
            spacing: merge_tokens(&template.spacing, &instance.spacing),
        }
    }

    /// Flat CSS custom-property set derived from the merged tokens, applied
    /// once at the page root so nested sections inherit without re-deriving.
    pub fn css_variables(&self) -> Vec<(String, String)> {
        let mut vars = Vec::new();
        for (token, value) in &self.colors {
            vars.push((format!("--color-{}", token), value.clone()));
        }
        for (token, value) in &self.fonts {
            vars.push((format!("--font-{}", token), value.clone()));
        }
        for (step, value) in &self.typography.scale {
            vars.push((format!("--text-{}", step), value.clone()));
        }
        for (token, value) in &self.spacing {
            vars.push((format!("--spacing-{}", token), value.clone()));
        }
        vars
    }

    /// Renders the variable set as an inline `style` attribute value.
    pub fn css_variable_style(&self) -> String {
        self.css_variables()
            .iter()
            .map(|(name, value)| format!("{}:{};", name, value))
            .collect()
    }
}

fn merge_tokens(base: &TokenMap, overlay: &TokenMap) -> TokenMap {
    let mut merged = base.clone();
    for (token, value) in overlay {
        merged.insert(token.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(pairs: &[(&str, &str)]) -> TokenMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_partial_color_override() {
        let template = Styling {
            colors: tokens(&[("background", "#ffffff"), ("text", "#000000")]),
            ..Default::default()
        };
        let instance = Styling {
            colors: tokens(&[("text", "#111111")]),
            ..Default::default()
        };
        let merged = Styling::merged(&template, &instance);
        assert_eq!(merged.colors.get("background").unwrap(), "#ffffff");
        assert_eq!(merged.colors.get("text").unwrap(), "#111111");
    }

    #[test]
    fn test_categories_merge_independently() {
        let template = Styling {
            colors: tokens(&[("primary", "#4a90e2")]),
            spacing: tokens(&[("section", "4rem")]),
            ..Default::default()
        };
        let instance = Styling {
            fonts: tokens(&[("heading", "Spectral")]),
            ..Default::default()
        };
        let merged = Styling::merged(&template, &instance);
        assert_eq!(merged.colors.get("primary").unwrap(), "#4a90e2");
        assert_eq!(merged.spacing.get("section").unwrap(), "4rem");
        assert_eq!(merged.fonts.get("heading").unwrap(), "Spectral");
    }

    #[test]
    fn test_css_variables_flat_derivation() {
        let styling = Styling {
            colors: tokens(&[("text", "#111111")]),
            fonts: tokens(&[("body", "Inter")]),
            typography: Typography {
                scale: tokens(&[("xl", "1.5rem")]),
            },
            spacing: tokens(&[("gap", "1rem")]),
        };
        let vars = styling.css_variables();
        assert!(vars.contains(&("--color-text".to_string(), "#111111".to_string())));
        assert!(vars.contains(&("--font-body".to_string(), "Inter".to_string())));
        assert!(vars.contains(&("--text-xl".to_string(), "1.5rem".to_string())));
        assert!(vars.contains(&("--spacing-gap".to_string(), "1rem".to_string())));
    }
}
