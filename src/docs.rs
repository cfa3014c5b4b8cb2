//! Documentation generator for a configuration schema
//!
//! Generates a markdown reference from a [`Schema`].

use crate::config::{DefaultValue, EntryType, Schema, SchemaEntry};
use crate::parse::display_value;
use std::fmt::Write;

/// Configuration for docs generation
#[derive(Debug, Clone, Default)]
pub struct DocsConfig {
    /// Title for the documentation
    pub title: Option<String>,
    /// Description/introduction text
    pub description: Option<String>,
    /// Namespace shown in the persisted key of each entry
    pub namespace: Option<String>,
}

impl DocsConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Generate markdown documentation from a schema, one section per key in
/// schema order
#[must_use]
pub fn generate_docs(schema: &Schema, config: DocsConfig) -> String {
    let mut output = String::new();

    let title = config
        .title
        .unwrap_or_else(|| "Configuration Reference".to_string());
    let _ = writeln!(output, "# {title}\n");

    if let Some(desc) = config.description {
        let _ = writeln!(output, "{desc}\n");
    }

    output.push_str("## Keys\n\n");
    for (key, entry) in schema.iter() {
        format_entry(&mut output, key, entry, config.namespace.as_deref());
    }

    output
}

fn format_entry(out: &mut String, key: &str, entry: &SchemaEntry, namespace: Option<&str>) {
    let _ = writeln!(out, "### `{key}`\n");

    if let Some(desc) = entry.description_text() {
        let _ = writeln!(out, "{desc}\n");
    }

    out.push_str("| Property | Value |\n");
    out.push_str("|----------|-------|\n");
    let _ = writeln!(out, "| **Type** | {} |", format_type(entry));
    let _ = writeln!(out, "| **Default** | {} |", format_default(entry.default_value_ref()));

    if let Some(namespace) = namespace {
        let _ = writeln!(out, "| **Stored as** | `{namespace}.{key}` |");
    }

    match entry.bounds() {
        (Some(min), Some(max)) => {
            let _ = writeln!(out, "| **Range** | {min} - {max} |");
        }
        (Some(min), None) => {
            let _ = writeln!(out, "| **Minimum** | {min} |");
        }
        (None, Some(max)) => {
            let _ = writeln!(out, "| **Maximum** | {max} |");
        }
        (None, None) => {}
    }

    out.push('\n');

    if let Some(options) = entry.enum_values() {
        out.push_str("**Allowed values:**\n\n");
        for option in options {
            let _ = writeln!(out, "- `{option}`");
        }
        out.push('\n');
    }

    out.push_str("---\n\n");
}

fn format_type(entry: &SchemaEntry) -> &'static str {
    match entry.entry_type() {
        EntryType::String if entry.is_string_enum() => "String (enum)",
        EntryType::String => "String",
        EntryType::Number => "Number",
        EntryType::Boolean => "Boolean",
        EntryType::Custom => "Custom",
    }
}

fn format_default(default: Option<&DefaultValue>) -> String {
    match default {
        None => "_none (must be injected)_".to_string(),
        Some(DefaultValue::Producer(_)) => "(computed)".to_string(),
        Some(DefaultValue::Static(value)) => format!("`{}`", display_value(value)),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .entry(
                "color",
                SchemaEntry::string_enum(["blue", "green", "pink"])
                    .description("Main color of the application"),
            )
            .entry("port", SchemaEntry::number().min(1.0).max(65535.0).default(8000))
            .entry("startedAt", SchemaEntry::number().default_with(|| json!(0)))
            .entry("retries", SchemaEntry::number().min(0.0))
    }

    #[test]
    fn test_generate_docs() {
        let docs = generate_docs(
            &schema(),
            DocsConfig::new()
                .with_title("My App Config")
                .with_description("Runtime configuration for My App")
                .with_namespace("my-app"),
        );

        assert!(docs.contains("# My App Config"));
        assert!(docs.contains("Runtime configuration for My App"));
        assert!(docs.contains("### `color`"));
        assert!(docs.contains("String (enum)"));
        assert!(docs.contains("- `pink`"));
        assert!(docs.contains("| **Range** | 1 - 65535 |"));
        assert!(docs.contains("| **Default** | `8000` |"));
        assert!(docs.contains("`my-app.port`"));
        assert!(docs.contains("| **Minimum** | 0 |"));
    }

    #[test]
    fn test_defaults_rendering() {
        let docs = generate_docs(&schema(), DocsConfig::new());

        assert!(docs.starts_with("# Configuration Reference"));
        assert!(docs.contains("(computed)"));
        assert!(docs.contains("_none (must be injected)_"));
        assert!(!docs.contains("Stored as"));
    }

    #[test]
    fn test_sections_follow_schema_order() {
        let docs = generate_docs(&schema(), DocsConfig::new());
        let color = docs.find("`color`").unwrap();
        let port = docs.find("`port`").unwrap();
        let retries = docs.find("`retries`").unwrap();
        assert!(color < port && port < retries);
    }
}
