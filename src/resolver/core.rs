use crate::config::{ResolverConfig, Schema};
use crate::error::Result;
use crate::events::ChangeSignal;
use crate::globals::{GlobalScope, Namespace};
use crate::storage::KeyValueStore;

use log::info;
use std::fmt;
use std::sync::Arc;

/// Resolves configuration values from three layered sources
///
/// For each schema key the effective value is, in priority order:
///
/// 1. **Override**: the value persisted at `"{namespace}.{key}"` in the store
/// 2. **Injected value**: `globals[namespace][key]` supplied by the host
/// 3. **Default**: the schema default, literal or computed
///
/// Overrides that no longer parse are skipped. Injected values that don't
/// parse are deployment errors and fail the read.
///
/// Cloning is cheap: clones share the schema, the store, the global scope and
/// the change signal.
///
/// # Example
///
/// ```rust
/// use rtcfg::{ConfigResolver, JsonScope, Schema, SchemaEntry};
/// use serde_json::json;
///
/// let schema = Schema::new()
///     .entry("backend", SchemaEntry::string())
///     .entry("port", SchemaEntry::number().min(1.0).max(65535.0).default(8000));
///
/// let resolver = ConfigResolver::builder("my-app", schema)
///     .globals(JsonScope::new(json!({ "my-app": { "backend": "http://localhost" } })))
///     .build()?;
///
/// assert_eq!(resolver.get_config("port")?, json!(8000));
///
/// resolver.set_config("port", json!(42))?;
/// assert_eq!(resolver.get_config("port")?, json!(42));
///
/// // Writing the default back removes the override
/// resolver.set_config("port", json!(8000))?;
/// assert!(!resolver.is_overridden("port")?);
/// # Ok::<(), rtcfg::Error>(())
/// ```
#[derive(Clone)]
pub struct ConfigResolver {
    pub(crate) config: ResolverConfig,

    /// Immutable once the resolver is built
    pub(crate) schema: Arc<Schema>,

    pub(crate) store: Arc<dyn KeyValueStore>,

    pub(crate) globals: Arc<dyn GlobalScope>,

    pub(crate) signal: ChangeSignal,
}

impl ConfigResolver {
    /// Create a resolver from its parts.
    ///
    /// The schema is validated and every key resolved once, so a broken schema
    /// or an invalid injected value fails here rather than on first read.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidSchema` for a broken entry definition
    /// - `Error::InvalidGlobalValue` / `Error::MissingValue` from the first full resolution
    pub fn new(
        config: ResolverConfig,
        schema: Schema,
        store: Arc<dyn KeyValueStore>,
        globals: Arc<dyn GlobalScope>,
        signal: ChangeSignal,
    ) -> Result<Self> {
        schema.validate()?;

        let resolver = Self {
            config,
            schema: Arc::new(schema),
            store,
            globals,
            signal,
        };

        resolver.get_all_config()?;

        info!(
            "Config resolver ready: namespace '{}', {} key(s), {} store",
            resolver.config.namespace,
            resolver.schema.len(),
            resolver.store.backend_name()
        );
        Ok(resolver)
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.config.namespace
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The change signal raised after every write
    #[must_use]
    pub fn signal(&self) -> &ChangeSignal {
        &self.signal
    }

    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("config", &self.config)
            .field("keys", &self.schema.keys().collect::<Vec<_>>())
            .field("store", &self.store.backend_name())
            .field("signal", &self.signal)
            .finish()
    }
}
