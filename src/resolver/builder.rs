//! Builder for ConfigResolver
//!
//! This module contains [`ConfigResolverBuilder`] which provides a fluent API
//! for creating a [`ConfigResolver`](super::ConfigResolver).

use crate::config::{ResolverConfig, ResolverConfigBuilder, Schema};
use crate::error::Result;
use crate::events::ChangeSignal;
use crate::globals::{GlobalScope, JsonScope, Namespace};
use crate::storage::{KeyValueStore, MemoryStore};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::ConfigResolver;

enum SchemaSource {
    Declared(Schema),
    /// Inferred from the injected values when the resolver is built
    Inferred(Map<String, Value>),
}

/// Builder for creating a [`ConfigResolver`] with a fluent API.
///
/// Collaborators not set explicitly default to an empty [`MemoryStore`], an
/// empty [`JsonScope`] and a fresh [`ChangeSignal`].
///
/// # Example
///
/// ```rust
/// use rtcfg::{ChangeSignal, ConfigResolver, JsonScope, MemoryStore, Schema, SchemaEntry};
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// let signal = ChangeSignal::new();
///
/// let resolver = ConfigResolver::builder("my-app", Schema::new().entry("isLive", SchemaEntry::boolean()))
///     .store(store.clone())
///     .globals(JsonScope::new(json!({ "my-app": { "isLive": true } })))
///     .signal(signal.clone())
///     .build()?;
///
/// assert_eq!(resolver.get_config("isLive")?, json!(true));
/// # Ok::<(), rtcfg::Error>(())
/// ```
pub struct ConfigResolverBuilder {
    config_builder: ResolverConfigBuilder,
    schema: SchemaSource,
    store: Option<Arc<dyn KeyValueStore>>,
    globals: Option<Arc<dyn GlobalScope>>,
    signal: Option<ChangeSignal>,
}

impl ConfigResolverBuilder {
    /// Create a new builder with the required namespace and schema.
    pub fn new(namespace: impl Into<Namespace>, schema: Schema) -> Self {
        Self::with_source(namespace.into(), SchemaSource::Declared(schema))
    }

    /// Create a builder whose schema is inferred from the injected values.
    ///
    /// See [`Schema::infer`]. `defaults` adds static defaults and may declare
    /// keys the host doesn't inject.
    pub fn inferred(namespace: impl Into<Namespace>, defaults: Map<String, Value>) -> Self {
        Self::with_source(namespace.into(), SchemaSource::Inferred(defaults))
    }

    fn with_source(namespace: Namespace, schema: SchemaSource) -> Self {
        Self {
            config_builder: ResolverConfigBuilder::new(namespace),
            schema,
            store: None,
            globals: None,
            signal: None,
        }
    }

    /// Enable or disable persisted overrides (default: enabled).
    #[must_use]
    pub fn local_override(mut self, enabled: bool) -> Self {
        self.config_builder = self.config_builder.local_override(enabled);
        self
    }

    /// Replace the whole configuration, namespace included.
    #[must_use]
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config_builder =
            ResolverConfigBuilder::new(config.namespace).local_override(config.local_override);
        self
    }

    /// Set the persistent store.
    #[must_use]
    pub fn store(self, store: impl KeyValueStore + 'static) -> Self {
        self.shared_store(Arc::new(store))
    }

    /// Set a persistent store already shared behind an `Arc`.
    #[must_use]
    pub fn shared_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the scope holding host-injected values.
    #[must_use]
    pub fn globals(mut self, globals: impl GlobalScope + 'static) -> Self {
        self.globals = Some(Arc::new(globals));
        self
    }

    /// Set the change signal.
    ///
    /// Resolvers over the same store should share one signal so a write in
    /// one of them reaches the views built on the others.
    #[must_use]
    pub fn signal(mut self, signal: ChangeSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Build the [`ConfigResolver`].
    ///
    /// # Errors
    ///
    /// See [`ConfigResolver::new`].
    pub fn build(self) -> Result<ConfigResolver> {
        let config = self.config_builder.build();
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let globals = self
            .globals
            .unwrap_or_else(|| Arc::new(JsonScope::default()));
        let signal = self.signal.unwrap_or_default();

        let schema = match self.schema {
            SchemaSource::Declared(schema) => schema,
            SchemaSource::Inferred(defaults) => {
                Schema::infer(globals.as_ref(), &config.namespace, &defaults)
            }
        };

        ConfigResolver::new(config, schema, store, globals, signal)
    }
}

impl ConfigResolver {
    /// Create a new builder (see [`ConfigResolverBuilder`])
    pub fn builder(namespace: impl Into<Namespace>, schema: Schema) -> ConfigResolverBuilder {
        ConfigResolverBuilder::new(namespace, schema)
    }
}
