//! Schema entries and the ordered schema map
//!
//! # Overview
//!
//! A [`Schema`] maps configuration keys to [`SchemaEntry`] values. Each entry is
//! one of four closed variants:
//!
//! - **String**: a free string, or a string-enum when `enum` is declared
//! - **Number**: a float with optional `min` / `max` bounds
//! - **Boolean**: `true` / `false`, also accepting the strings `"true"` / `"false"`
//! - **Custom**: any JSON value run through an application-supplied parser
//!
//! Every variant may carry a default, either a literal or a zero-argument
//! producer invoked on each read, and a free-form description.
//!
//! ```rust
//! use rtcfg::{Schema, SchemaEntry};
//!
//! let schema = Schema::new()
//!     .entry(
//!         "color",
//!         SchemaEntry::string_enum(["blue", "green", "pink"])
//!             .description("Main color of the application"),
//!     )
//!     .entry(
//!         "port",
//!         SchemaEntry::number().min(1.0).max(65535.0).default(8000),
//!     )
//!     .entry("isLive", SchemaEntry::boolean().default(false));
//!
//! assert_eq!(schema.keys().collect::<Vec<_>>(), ["color", "port", "isLive"]);
//! assert!(schema.validate().is_ok());
//! ```
//!
//! # Declaring a schema in JSON
//!
//! Entries without a custom parser can be loaded from a JSON declaration:
//!
//! ```rust
//! use rtcfg::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::from_json(&json!({
//!     "backend": { "type": "string", "description": "Backend url" },
//!     "port": { "type": "number", "min": 1, "max": 65535, "default": 8000 }
//! }))?;
//! assert_eq!(schema.len(), 2);
//! # Ok::<(), rtcfg::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::globals::{GlobalScope, Namespace};
use crate::parse;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Zero-argument default producer
pub type Producer = Arc<dyn Fn() -> Value + Send + Sync>;

/// Parser for custom entries: returns the resolved value or a message
pub type CustomParser = Arc<dyn Fn(&Value) -> std::result::Result<Value, String> + Send + Sync>;

// =============================================================================
// Default Values
// =============================================================================

/// Default of a schema entry
#[derive(Clone)]
pub enum DefaultValue {
    /// Literal value declared in the schema
    Static(Value),
    /// Computed on every read
    Producer(Producer),
}

impl DefaultValue {
    /// Current value of this default, invoking the producer if needed
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            DefaultValue::Static(value) => value.clone(),
            DefaultValue::Producer(producer) => producer(),
        }
    }

    /// The literal value, `None` for producers
    #[must_use]
    pub fn as_static(&self) -> Option<&Value> {
        match self {
            DefaultValue::Static(value) => Some(value),
            DefaultValue::Producer(_) => None,
        }
    }

    #[must_use]
    pub fn is_producer(&self) -> bool {
        matches!(self, DefaultValue::Producer(_))
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            DefaultValue::Producer(_) => f.write_str("Producer(Fn)"),
        }
    }
}

impl Serialize for DefaultValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DefaultValue::Static(value) => value.serialize(serializer),
            DefaultValue::Producer(_) => serializer.serialize_none(),
        }
    }
}

fn no_static_default(default: &Option<DefaultValue>) -> bool {
    !matches!(default, Some(DefaultValue::Static(_)))
}

// =============================================================================
// Entry Variants
// =============================================================================

/// Type tag of a schema entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    String,
    Number,
    Boolean,
    Custom,
}

impl EntryType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::String => "string",
            EntryType::Number => "number",
            EntryType::Boolean => "boolean",
            EntryType::Custom => "custom",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String entry, optionally restricted to an enum
#[derive(Debug, Clone, Default, Serialize)]
pub struct StringEntry {
    /// Allowed values (string-enum when present)
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "no_static_default")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Number entry with optional bounds
#[derive(Debug, Clone, Default, Serialize)]
pub struct NumberEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "no_static_default")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BooleanEntry {
    #[serde(skip_serializing_if = "no_static_default")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Custom entry validated by an application parser
#[derive(Clone, Serialize)]
pub struct CustomEntry {
    #[serde(skip_serializing_if = "no_static_default")]
    pub default: Option<DefaultValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Should return `Err` when the raw value can't be parsed
    #[serde(skip)]
    pub parser: CustomParser,
}

impl fmt::Debug for CustomEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomEntry")
            .field("default", &self.default)
            .field("description", &self.description)
            .field("parser", &"Fn")
            .finish()
    }
}

/// A single configuration entry
///
/// # Example
///
/// ```
/// use rtcfg::{SchemaEntry, EntryType};
/// use serde_json::{json, Value};
///
/// let link = SchemaEntry::custom(|raw: &Value| {
///     if raw.get("url").and_then(Value::as_str).is_some() {
///         Ok(raw.clone())
///     } else {
///         Err("Monitoring link invalid!".to_string())
///     }
/// })
/// .description("Link of the monitoring");
///
/// assert_eq!(link.entry_type(), EntryType::Custom);
/// assert_eq!(link.description_text(), Some("Link of the monitoring"));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaEntry {
    String(StringEntry),
    Number(NumberEntry),
    Boolean(BooleanEntry),
    Custom(CustomEntry),
}

impl SchemaEntry {
    // =========================================================================
    // Type-specific constructors
    // =========================================================================

    /// Create a free string entry
    #[must_use]
    pub fn string() -> Self {
        SchemaEntry::String(StringEntry::default())
    }

    /// Create a string-enum entry
    #[must_use]
    pub fn string_enum<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaEntry::String(StringEntry {
            options: Some(options.into_iter().map(Into::into).collect()),
            ..Default::default()
        })
    }

    /// Create a number entry
    #[must_use]
    pub fn number() -> Self {
        SchemaEntry::Number(NumberEntry::default())
    }

    /// Create a boolean entry
    #[must_use]
    pub fn boolean() -> Self {
        SchemaEntry::Boolean(BooleanEntry::default())
    }

    /// Create a custom entry from a parser
    #[must_use]
    pub fn custom<F>(parser: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        SchemaEntry::Custom(CustomEntry {
            default: None,
            description: None,
            parser: Arc::new(parser),
        })
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set a literal default
    #[must_use]
    pub fn default(self, value: impl Into<Value>) -> Self {
        self.with_default(DefaultValue::Static(value.into()))
    }

    /// Set a producer default, invoked on every read
    #[must_use]
    pub fn default_with<F>(self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.with_default(DefaultValue::Producer(Arc::new(producer)))
    }

    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        *self.default_slot() = Some(default);
        self
    }

    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match &mut self {
            SchemaEntry::String(e) => e.description = text,
            SchemaEntry::Number(e) => e.description = text,
            SchemaEntry::Boolean(e) => e.description = text,
            SchemaEntry::Custom(e) => e.description = text,
        }
        self
    }

    /// Set the lower bound. Ignored for non-number entries.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        if let SchemaEntry::Number(e) = &mut self {
            e.min = Some(min);
        }
        self
    }

    /// Set the upper bound. Ignored for non-number entries.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        if let SchemaEntry::Number(e) = &mut self {
            e.max = Some(max);
        }
        self
    }

    fn default_slot(&mut self) -> &mut Option<DefaultValue> {
        match self {
            SchemaEntry::String(e) => &mut e.default,
            SchemaEntry::Number(e) => &mut e.default,
            SchemaEntry::Boolean(e) => &mut e.default,
            SchemaEntry::Custom(e) => &mut e.default,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn entry_type(&self) -> EntryType {
        match self {
            SchemaEntry::String(_) => EntryType::String,
            SchemaEntry::Number(_) => EntryType::Number,
            SchemaEntry::Boolean(_) => EntryType::Boolean,
            SchemaEntry::Custom(_) => EntryType::Custom,
        }
    }

    #[must_use]
    pub fn default_value_ref(&self) -> Option<&DefaultValue> {
        match self {
            SchemaEntry::String(e) => e.default.as_ref(),
            SchemaEntry::Number(e) => e.default.as_ref(),
            SchemaEntry::Boolean(e) => e.default.as_ref(),
            SchemaEntry::Custom(e) => e.default.as_ref(),
        }
    }

    /// Current default, invoking a producer if one is declared
    #[must_use]
    pub fn resolve_default(&self) -> Option<Value> {
        self.default_value_ref().map(DefaultValue::resolve)
    }

    /// Literal default, `None` when absent or computed
    #[must_use]
    pub fn static_default(&self) -> Option<&Value> {
        self.default_value_ref().and_then(DefaultValue::as_static)
    }

    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        match self {
            SchemaEntry::String(e) => e.description.as_deref(),
            SchemaEntry::Number(e) => e.description.as_deref(),
            SchemaEntry::Boolean(e) => e.description.as_deref(),
            SchemaEntry::Custom(e) => e.description.as_deref(),
        }
    }

    /// Allowed values of a string-enum entry
    #[must_use]
    pub fn enum_values(&self) -> Option<&[String]> {
        match self {
            SchemaEntry::String(e) => e.options.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_string_enum(&self) -> bool {
        self.enum_values().is_some()
    }

    /// `(min, max)` of a number entry
    #[must_use]
    pub fn bounds(&self) -> (Option<f64>, Option<f64>) {
        match self {
            SchemaEntry::Number(e) => (e.min, e.max),
            _ => (None, None),
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate the entry definition itself
    ///
    /// Checks:
    /// - A declared enum is not empty
    /// - `min <= max`
    /// - A literal default parses against the entry and already has the
    ///   entry's JSON type, so `"8000"` is not a number default
    ///
    /// # Errors
    ///
    /// Returns the reason the definition is unusable.
    pub fn validate_schema(&self) -> std::result::Result<(), String> {
        if let Some(options) = self.enum_values() {
            if options.is_empty() {
                return Err("enum must list at least one value".to_string());
            }
        }

        if let (Some(min), Some(max)) = self.bounds() {
            if min > max {
                return Err(format!("min ({min}) cannot be greater than max ({max})"));
            }
        }

        // Custom defaults are already-parsed values, not raw input
        if self.entry_type() != EntryType::Custom {
            if let Some(default) = self.static_default() {
                let parsed = parse::parse(default, self)
                    .map_err(|e| format!("Default value is invalid: {e}"))?;
                if parsed != parse::normalize(default, self) {
                    return Err(format!(
                        "Default value {default} must be a {}",
                        self.entry_type()
                    ));
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// JSON Declarations
// =============================================================================

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum EntryDecl {
    String {
        #[serde(rename = "enum")]
        options: Option<Vec<String>>,
        default: Option<Value>,
        description: Option<String>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
        default: Option<Value>,
        description: Option<String>,
    },
    Boolean {
        default: Option<Value>,
        description: Option<String>,
    },
}

impl From<EntryDecl> for SchemaEntry {
    fn from(decl: EntryDecl) -> Self {
        match decl {
            EntryDecl::String {
                options,
                default,
                description,
            } => SchemaEntry::String(StringEntry {
                options,
                default: default.map(DefaultValue::Static),
                description,
            }),
            EntryDecl::Number {
                min,
                max,
                default,
                description,
            } => SchemaEntry::Number(NumberEntry {
                min,
                max,
                default: default.map(DefaultValue::Static),
                description,
            }),
            EntryDecl::Boolean {
                default,
                description,
            } => SchemaEntry::Boolean(BooleanEntry {
                default: default.map(DefaultValue::Static),
                description,
            }),
        }
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Ordered mapping from configuration key to entry
///
/// Insertion order is kept: it is the order of snapshots and admin listings.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<(String, SchemaEntry)>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder style). An existing key is replaced in place.
    #[must_use]
    pub fn entry(mut self, key: impl Into<String>, entry: SchemaEntry) -> Self {
        self.insert(key, entry);
        self
    }

    /// Add an entry. An existing key is replaced in place.
    pub fn insert(&mut self, key: impl Into<String>, entry: SchemaEntry) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key, entry)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate every entry definition
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSchema` for the first broken entry.
    pub fn validate(&self) -> Result<()> {
        for (key, entry) in self.iter() {
            entry
                .validate_schema()
                .map_err(|reason| Error::InvalidSchema {
                    key: key.to_string(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Load a schema from a JSON object of entry declarations
    ///
    /// Custom entries need a parser and can't be declared this way.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSchema` if the root is not an object or an entry
    /// declaration is malformed.
    pub fn from_json(value: &Value) -> Result<Self> {
        let root = value.as_object().ok_or_else(|| Error::InvalidSchema {
            key: String::new(),
            reason: "schema root must be an object".into(),
        })?;

        let mut schema = Schema::new();
        for (key, decl) in root {
            if decl.get("type").and_then(Value::as_str) == Some("custom") {
                return Err(Error::InvalidSchema {
                    key: key.clone(),
                    reason: "custom entries need a parser and cannot be declared in JSON".into(),
                });
            }
            let decl: EntryDecl =
                serde_json::from_value(decl.clone()).map_err(|e| Error::InvalidSchema {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
            schema.insert(key.clone(), decl.into());
        }
        Ok(schema)
    }

    /// Load a schema from a JSON string (see [`Schema::from_json`])
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialize` for invalid JSON, otherwise as `from_json`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_json(&value)
    }

    /// Infer a schema from the values injected under `namespace`
    ///
    /// Observed strings, numbers and booleans become entries of that type; any
    /// other value becomes a pass-through custom entry. `defaults` adds static
    /// defaults, creating entries for keys the scope doesn't provide.
    /// A missing namespace root yields just the defaults.
    ///
    /// Keys are taken as the scope lists them. An [`EnvScope`](crate::EnvScope)
    /// lists lower-cased names, so `APP_ISLIVE` becomes `islive`; declare
    /// camelCase keys through `defaults` or an explicit schema instead.
    #[must_use]
    pub fn infer(globals: &dyn GlobalScope, namespace: &Namespace, defaults: &Map<String, Value>) -> Self {
        let mut schema = Schema::new();

        for key in globals.keys(namespace) {
            if let Some(value) = globals.lookup(namespace, &key) {
                schema.insert(key, entry_for_value(&value));
            }
        }

        for (key, default) in defaults {
            let entry = match schema.get(key) {
                Some(existing) => existing.clone(),
                None => entry_for_value(default),
            };
            schema.insert(key.clone(), entry.default(default.clone()));
        }

        schema
    }
}

fn entry_for_value(value: &Value) -> SchemaEntry {
    match value {
        Value::String(_) => SchemaEntry::string(),
        Value::Number(_) => SchemaEntry::number(),
        Value::Bool(_) => SchemaEntry::boolean(),
        _ => SchemaEntry::custom(|raw| Ok(raw.clone())),
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

// =============================================================================
// Helper Macro
// =============================================================================

/// Macro for building a [`Schema`] more cleanly
///
/// # Example
/// ```rust
/// use rtcfg::{schema, SchemaEntry};
///
/// let schema = schema! {
///     "backend" => SchemaEntry::string().description("Backend url"),
///     "port" => SchemaEntry::number().min(1.0).max(65535.0).default(8000),
/// };
/// assert_eq!(schema.len(), 2);
/// ```
#[macro_export]
macro_rules! schema {
    ($($key:expr => $entry:expr),* $(,)?) => {{
        let mut schema = $crate::Schema::new();
        $(
            schema.insert($key, $entry);
        )*
        schema
    }};
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globals::{EnvScope, JsonScope, MapEnvSource};
    use serde_json::json;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn test_entry_builder() {
        let entry = SchemaEntry::number()
            .min(1.0)
            .max(65535.0)
            .default(8000)
            .description("Backend port");

        assert_eq!(entry.entry_type(), EntryType::Number);
        assert_eq!(entry.bounds(), (Some(1.0), Some(65535.0)));
        assert_eq!(entry.static_default(), Some(&json!(8000)));
        assert_eq!(entry.description_text(), Some("Backend port"));
    }

    #[test]
    fn test_bounds_ignored_outside_numbers() {
        let entry = SchemaEntry::string().min(1.0).max(2.0);
        assert_eq!(entry.bounds(), (None, None));
    }

    #[test]
    fn test_producer_default_is_reinvoked() {
        let counter = Arc::new(AtomicI64::new(0));
        let counter_clone = counter.clone();
        let entry = SchemaEntry::number()
            .default_with(move || json!(counter_clone.fetch_add(1, Ordering::SeqCst)));

        assert_eq!(entry.resolve_default(), Some(json!(0)));
        assert_eq!(entry.resolve_default(), Some(json!(1)));
        assert!(entry.static_default().is_none());
        assert!(entry.default_value_ref().unwrap().is_producer());
    }

    #[test]
    fn test_schema_keeps_insertion_order() {
        let schema = Schema::new()
            .entry("zeta", SchemaEntry::string())
            .entry("alpha", SchemaEntry::boolean())
            .entry("mid", SchemaEntry::number());

        assert_eq!(schema.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut schema = Schema::new()
            .entry("a", SchemaEntry::string())
            .entry("b", SchemaEntry::string());
        schema.insert("a", SchemaEntry::boolean());

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(schema.get("a").unwrap().entry_type(), EntryType::Boolean);
    }

    #[test]
    fn test_schema_validation() {
        assert!(SchemaEntry::number().min(0.0).max(10.0).validate_schema().is_ok());
        assert!(SchemaEntry::number().min(10.0).max(0.0).validate_schema().is_err());

        let empty_enum = SchemaEntry::string_enum(Vec::<String>::new());
        assert!(empty_enum.validate_schema().is_err());

        let bad_default = SchemaEntry::string_enum(["a", "b"]).default("c");
        let err = bad_default.validate_schema().unwrap_err();
        assert!(err.contains("Default value is invalid"));

        let out_of_range = SchemaEntry::number().max(10.0).default(20);
        assert!(out_of_range.validate_schema().is_err());
    }

    #[test]
    fn test_default_must_have_entry_type() {
        let quoted_number = SchemaEntry::number().default("8000");
        let err = quoted_number.validate_schema().unwrap_err();
        assert_eq!(err, r#"Default value "8000" must be a number"#);

        let quoted_bool = SchemaEntry::boolean().default("true");
        assert!(quoted_bool.validate_schema().is_err());

        assert!(SchemaEntry::number().default(8000.0).validate_schema().is_ok());
        assert!(SchemaEntry::boolean().default(false).validate_schema().is_ok());
    }

    #[test]
    fn test_schema_validate_names_key() {
        let schema = Schema::new().entry("port", SchemaEntry::number().min(5.0).max(1.0));
        let err = schema.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { ref key, .. } if key == "port"));
    }

    #[test]
    fn test_from_json() {
        let schema = Schema::from_json(&json!({
            "color": { "type": "string", "enum": ["blue", "green"], "description": "Color" },
            "port": { "type": "number", "min": 1, "max": 65535, "default": 8000 },
            "isLive": { "type": "boolean", "default": false }
        }))
        .unwrap();

        assert_eq!(schema.len(), 3);
        assert_eq!(
            schema.get("color").unwrap().enum_values(),
            Some(&["blue".to_string(), "green".to_string()][..])
        );
        assert_eq!(schema.get("port").unwrap().bounds(), (Some(1.0), Some(65535.0)));
        assert_eq!(schema.get("isLive").unwrap().static_default(), Some(&json!(false)));
    }

    #[test]
    fn test_from_json_rejects_bad_declarations() {
        let custom = Schema::from_json(&json!({ "link": { "type": "custom" } }));
        assert!(matches!(custom, Err(Error::InvalidSchema { .. })));

        let unknown_type = Schema::from_json(&json!({ "port": { "type": "integer" } }));
        assert!(matches!(unknown_type, Err(Error::InvalidSchema { .. })));

        assert!(Schema::from_json(&json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_serialization_shape() {
        let entry = SchemaEntry::string_enum(["blue", "green"]).description("Main color");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({ "type": "string", "enum": ["blue", "green"], "description": "Main color" })
        );

        let computed = SchemaEntry::number().default_with(|| json!(1));
        assert_eq!(serde_json::to_value(&computed).unwrap(), json!({ "type": "number" }));
    }

    #[test]
    fn test_infer_from_globals() {
        let scope = JsonScope::new(json!({
            "app": { "backend": "http://localhost", "port": 3000, "debug": true, "link": { "url": "x" } }
        }));
        let namespace = Namespace::new("app");
        let mut defaults = Map::new();
        defaults.insert("port".into(), json!(8000));
        defaults.insert("theme".into(), json!("dark"));

        let schema = Schema::infer(&scope, &namespace, &defaults);

        assert_eq!(schema.get("backend").unwrap().entry_type(), EntryType::String);
        assert_eq!(schema.get("debug").unwrap().entry_type(), EntryType::Boolean);
        assert_eq!(schema.get("link").unwrap().entry_type(), EntryType::Custom);
        assert_eq!(schema.get("port").unwrap().static_default(), Some(&json!(8000)));
        assert_eq!(schema.get("theme").unwrap().entry_type(), EntryType::String);
    }

    #[test]
    fn test_infer_from_env_uses_lowercase_keys() {
        let scope = EnvScope::with_source(MapEnvSource::new([
            ("APP_PORT", "3000"),
            ("APP_DEBUG", "true"),
        ]));
        let namespace = Namespace::new("app");

        let schema = Schema::infer(&scope, &namespace, &Map::new());

        let mut keys: Vec<&str> = schema.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, ["debug", "port"]);
        assert_eq!(schema.get("port").unwrap().entry_type(), EntryType::Number);
        assert_eq!(scope.lookup(&namespace, "port"), Some(json!(3000)));
    }

    #[test]
    fn test_infer_without_namespace_root() {
        let scope = JsonScope::new(json!({}));
        let schema = Schema::infer(&scope, &Namespace::new("missing"), &Map::new());
        assert!(schema.is_empty());
    }

    #[test]
    fn test_schema_macro() {
        let schema = crate::schema! {
            "a" => SchemaEntry::string(),
            "b" => SchemaEntry::boolean().default(true),
        };
        assert_eq!(schema.keys().collect::<Vec<_>>(), ["a", "b"]);
    }
}
