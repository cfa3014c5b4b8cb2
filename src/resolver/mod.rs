//! Configuration resolver
//!
//! The [`ConfigResolver`] computes the effective value of each schema key from
//! the persisted overrides, the host-injected values and the schema defaults.
//!
//! - `core`: the resolver struct and its constructor
//! - `builder`: [`ConfigResolverBuilder`]
//! - `operations`: reads, writes and resets

mod builder;
mod core;
mod operations;

pub use builder::ConfigResolverBuilder;
pub use self::core::ConfigResolver;
pub use operations::ConfigSnapshot;
pub(crate) use operations::Resolution;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Schema, SchemaEntry};
    use crate::error::Error;
    use crate::globals::{JsonScope, Namespace};
    use crate::storage::{KeyValueStore, MemoryStore};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    fn schema() -> Schema {
        Schema::new()
            .entry("color", SchemaEntry::string_enum(["blue", "green", "pink"]))
            .entry("backend", SchemaEntry::string())
            .entry("port", SchemaEntry::number().min(1.0).max(65535.0).default(8000))
            .entry("isLive", SchemaEntry::boolean().default(false))
    }

    fn scope() -> JsonScope {
        JsonScope::new(json!({
            "app": { "color": "blue", "backend": "http://localhost" }
        }))
    }

    fn resolver(store: &MemoryStore) -> ConfigResolver {
        ConfigResolver::builder("app", schema())
            .store(store.clone())
            .globals(scope())
            .build()
            .unwrap()
    }

    // =========================================================================
    // Resolution order
    // =========================================================================

    #[test]
    fn test_default_used_without_other_sources() {
        let resolver = resolver(&MemoryStore::new());
        assert_eq!(resolver.get_config("port").unwrap(), json!(8000));
        assert_eq!(resolver.get_config("isLive").unwrap(), json!(false));
    }

    #[test]
    fn test_window_value_beats_default() {
        let globals = scope();
        globals.insert(&Namespace::new("app"), "port", json!(3000));

        let resolver = ConfigResolver::builder("app", schema())
            .globals(globals)
            .build()
            .unwrap();
        assert_eq!(resolver.get_config("port").unwrap(), json!(3000));
    }

    #[test]
    fn test_override_beats_window_value() {
        let store = MemoryStore::with_entries([("app.color", "pink")]);
        let resolver = resolver(&store);

        assert_eq!(resolver.get_config("color").unwrap(), json!("pink"));
        assert_eq!(resolver.get_window_value("color").unwrap(), Some(json!("blue")));
        assert!(resolver.is_overridden("color").unwrap());
    }

    #[test]
    fn test_unknown_key() {
        let resolver = resolver(&MemoryStore::new());
        assert!(matches!(resolver.get_config("nope"), Err(Error::UnknownKey(_))));
        assert!(matches!(
            resolver.set_config("nope", json!(1)),
            Err(Error::UnknownKey(_))
        ));
    }

    #[test]
    fn test_producer_default_invoked_per_read() {
        let counter = Arc::new(AtomicI64::new(0));
        let counter_clone = counter.clone();
        let schema = Schema::new().entry(
            "startedAt",
            SchemaEntry::number().default_with(move || json!(counter_clone.fetch_add(1, Ordering::SeqCst))),
        );
        let resolver = ConfigResolver::builder("app", schema).build().unwrap();

        let first = resolver.get_config("startedAt").unwrap();
        let second = resolver.get_config("startedAt").unwrap();
        assert_ne!(first, second);
    }

    // =========================================================================
    // Writes
    // =========================================================================

    #[test]
    fn test_set_persists_encoded_value() {
        let store = MemoryStore::new();
        let resolver = resolver(&store);

        resolver.set_config("port", json!(42)).unwrap();
        resolver.set_config("isLive", json!(true)).unwrap();
        resolver.set_config("backend", json!("http://prod")).unwrap();

        assert_eq!(store.get("app.port").unwrap().as_deref(), Some("42"));
        assert_eq!(store.get("app.isLive").unwrap().as_deref(), Some("true"));
        assert_eq!(store.get("app.backend").unwrap().as_deref(), Some("http://prod"));
        assert_eq!(resolver.get_config("port").unwrap(), json!(42));
    }

    #[test]
    fn test_set_coerces_before_persisting() {
        let store = MemoryStore::new();
        let resolver = resolver(&store);

        resolver.set_config("port", json!("42")).unwrap();
        assert_eq!(store.get("app.port").unwrap().as_deref(), Some("42"));
        assert_eq!(resolver.get_config("port").unwrap(), json!(42));
    }

    #[test]
    fn test_set_baseline_removes_override() {
        let store = MemoryStore::new();
        let resolver = resolver(&store);

        resolver.set_config("color", json!("pink")).unwrap();
        assert!(resolver.is_overridden("color").unwrap());

        // Injected value is the baseline when present
        resolver.set_config("color", json!("blue")).unwrap();
        assert!(!resolver.is_overridden("color").unwrap());
        assert!(store.get("app.color").unwrap().is_none());

        // Otherwise the literal default
        resolver.set_config("port", json!(42)).unwrap();
        resolver.set_config("port", json!(8000.0)).unwrap();
        assert!(store.get("app.port").unwrap().is_none());
    }

    #[test]
    fn test_set_rejects_invalid_value() {
        let store = MemoryStore::new();
        let resolver = resolver(&store);

        let err = resolver.set_config("port", json!(-1)).unwrap_err();
        assert_eq!(err.to_string(), "Expected \"port=-1\" to be greater than 1");
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_raises_signal_every_time() {
        let store = MemoryStore::new();
        let resolver = resolver(&store);
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        let _subscription = resolver.signal().subscribe(move || {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        resolver.set_config("port", json!(42)).unwrap();
        resolver.set_config("port", json!(8000)).unwrap();
        let _ = resolver.set_config("port", json!("yolo"));

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_reset() {
        let store = MemoryStore::with_entries([("app.port", "42"), ("app.color", "pink"), ("app.other", "x")]);
        let resolver = resolver(&store);
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        let _subscription = resolver.signal().subscribe(move || {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        resolver.reset_config("port").unwrap();
        assert_eq!(resolver.get_config("port").unwrap(), json!(8000));
        assert_eq!(resolver.get_config("color").unwrap(), json!("pink"));

        resolver.reset().unwrap();
        assert_eq!(resolver.get_config("color").unwrap(), json!("blue"));
        assert_eq!(store.get("app.other").unwrap().as_deref(), Some("x"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    // =========================================================================
    // Failure modes
    // =========================================================================

    #[test]
    fn test_corrupted_override_is_ignored() {
        let store = MemoryStore::with_entries([("app.port", "yolo"), ("app.color", "red")]);
        let resolver = resolver(&store);

        assert_eq!(resolver.get_config("port").unwrap(), json!(8000));
        assert_eq!(resolver.get_config("color").unwrap(), json!("blue"));
        assert_eq!(resolver.get_storage_value("port").unwrap(), None);
    }

    #[test]
    fn test_invalid_window_value_fails_build() {
        let err = ConfigResolver::builder("app", schema())
            .globals(JsonScope::new(json!({ "app": { "color": "red", "backend": "x" } })))
            .build()
            .unwrap_err();

        assert!(err.is_config_error());
        assert_eq!(
            err.to_string(),
            "Config key \"color\" not valid: red not part of [\"blue\", \"green\", \"pink\"]"
        );
    }

    #[test]
    fn test_missing_value_fails_build() {
        let err = ConfigResolver::builder("app", schema())
            .globals(JsonScope::new(json!({ "app": { "color": "blue" } })))
            .build()
            .unwrap_err();

        assert!(matches!(err, Error::MissingValue(ref key) if key == "backend"));
    }

    #[test]
    fn test_overrides_disabled() {
        let store = MemoryStore::with_entries([("app.port", "42")]);
        let resolver = ConfigResolver::builder("app", schema())
            .store(store.clone())
            .globals(scope())
            .local_override(false)
            .build()
            .unwrap();

        assert_eq!(resolver.get_config("port").unwrap(), json!(8000));

        resolver.set_config("isLive", json!(true)).unwrap();
        assert_eq!(store.get("app.isLive").unwrap().as_deref(), Some("true"));
        assert_eq!(resolver.get_config("isLive").unwrap(), json!(false));
    }

    // =========================================================================
    // Typed access and inferred schemas
    // =========================================================================

    #[test]
    fn test_typed_get() {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AppConfig {
            color: String,
            port: u16,
            is_live: bool,
        }

        let resolver = resolver(&MemoryStore::with_entries([("app.port", "9000")]));
        let port: u16 = resolver.get("port").unwrap();
        assert_eq!(port, 9000);

        let config: AppConfig = resolver.get_all().unwrap();
        assert_eq!(config.color, "blue");
        assert_eq!(config.port, 9000);
        assert!(!config.is_live);
    }

    #[test]
    fn test_inferred_schema() {
        let mut defaults = serde_json::Map::new();
        defaults.insert("port".into(), json!(8000));

        let resolver = ConfigResolverBuilder::inferred("app", defaults)
            .globals(scope())
            .build()
            .unwrap();
        let snapshot = resolver.get_all_config().unwrap();

        assert_eq!(snapshot.keys().collect::<Vec<_>>(), ["color", "backend", "port"]);
        assert_eq!(snapshot["port"], json!(8000));
    }

    #[test]
    fn test_inferred_schema_without_root() {
        let resolver = ConfigResolverBuilder::inferred("absent", serde_json::Map::new())
            .globals(scope())
            .build()
            .unwrap();
        assert_eq!(resolver.get_all_config().unwrap(), ConfigSnapshot::new());
    }

    #[test]
    fn test_snapshot_keeps_schema_order() {
        let resolver = resolver(&MemoryStore::new());
        let snapshot = resolver.get_all_config().unwrap();
        assert_eq!(
            snapshot.keys().collect::<Vec<_>>(),
            ["color", "backend", "port", "isLive"]
        );
        assert_eq!(snapshot["backend"], Value::from("http://localhost"));
    }
}
