//! Common test utilities for rtcfg integration tests
//!
//! Provides the shared schema, an injected global scope and a fixture wiring
//! them to an in-memory store.

#![allow(dead_code)]

use rtcfg::{
    ChangeSignal, ConfigResolver, JsonScope, MemoryStore, Namespace, Schema, SchemaEntry,
};
use serde_json::{Value, json};

pub const NAMESPACE: &str = "test";

// =============================================================================
// Test Schema
// =============================================================================

/// Parser of the `monitoringLink` entry: an object with a string `url`
pub fn parse_monitoring_link(raw: &Value) -> Result<Value, String> {
    raw.get("url")
        .and_then(Value::as_str)
        .map(|url| json!({ "url": url }))
        .ok_or_else(|| "Monitoring link invalid!".to_string())
}

/// A schema covering every entry type
pub fn test_schema() -> Schema {
    Schema::new()
        .entry(
            "color",
            SchemaEntry::string_enum(["blue", "green", "pink"])
                .description("Main color of the application"),
        )
        .entry("backend", SchemaEntry::string().description("Backend url"))
        .entry(
            "port",
            SchemaEntry::number()
                .min(1.0)
                .max(65535.0)
                .default(8000)
                .description("Backend port"),
        )
        .entry(
            "monitoringLink",
            SchemaEntry::custom(parse_monitoring_link).description("Link of the monitoring"),
        )
        .entry("isLive", SchemaEntry::boolean().default(false))
        .entry("isAwesome", SchemaEntry::boolean())
}

/// Values the host injects under [`NAMESPACE`]
pub fn injected_values() -> Value {
    json!({
        "color": "blue",
        "backend": "http://localhost",
        "monitoringLink": { "url": "http://grafana" },
        "isAwesome": true
    })
}

// =============================================================================
// Test Fixtures
// =============================================================================

/// Resolver over a fresh in-memory store and the injected test values
pub struct TestFixture {
    pub store: MemoryStore,
    pub globals: JsonScope,
    pub signal: ChangeSignal,
    pub resolver: ConfigResolver,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Fixture over a store that already holds entries
    pub fn with_store(store: MemoryStore) -> Self {
        let globals = JsonScope::new(json!({ NAMESPACE: injected_values() }));
        let signal = ChangeSignal::new();
        let resolver = ConfigResolver::builder(NAMESPACE, test_schema())
            .store(store.clone())
            .globals(globals.clone())
            .signal(signal.clone())
            .build()
            .expect("Failed to build resolver");

        Self {
            store,
            globals,
            signal,
            resolver,
        }
    }

    /// A second context over the same store and signal, like another tab
    pub fn other_context(&self) -> ConfigResolver {
        ConfigResolver::builder(NAMESPACE, test_schema())
            .store(self.store.clone())
            .globals(self.globals.clone())
            .signal(self.signal.clone())
            .build()
            .expect("Failed to build second context")
    }

    pub fn namespace(&self) -> Namespace {
        Namespace::new(NAMESPACE)
    }

    /// Persisted key for a schema key
    pub fn storage_key(&self, key: &str) -> String {
        format!("{NAMESPACE}.{key}")
    }
}
