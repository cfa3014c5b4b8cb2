//! Live configuration view
//!
//! A [`LiveConfig`] keeps a snapshot of every key and recomputes it whenever
//! the change signal fires, so overrides written by any context sharing the
//! signal become visible without polling.

use crate::error::{Error, Result};
use crate::events::Subscription;
use crate::resolver::{ConfigResolver, ConfigSnapshot};
use crate::sync::RwLockExt;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct LiveState {
    /// `None` after a failed recompute
    snapshot: Option<ConfigSnapshot>,
    revision: u64,
}

/// Snapshot of a resolver kept current by its change signal
///
/// The subscription lives as long as the view; dropping the view
/// unsubscribes.
///
/// # Example
///
/// ```rust
/// use rtcfg::{ConfigResolver, LiveConfig, Schema, SchemaEntry};
/// use serde_json::json;
///
/// let schema = Schema::new().entry("isLive", SchemaEntry::boolean().default(false));
/// let resolver = ConfigResolver::builder("app", schema).build()?;
/// let live = LiveConfig::new(&resolver)?;
///
/// resolver.set_config("isLive", json!(true))?;
/// assert_eq!(live.get("isLive")?, json!(true));
/// assert_eq!(live.revision(), 1);
/// # Ok::<(), rtcfg::Error>(())
/// ```
pub struct LiveConfig {
    resolver: ConfigResolver,
    state: Arc<RwLock<LiveState>>,
    _subscription: Subscription,
}

impl LiveConfig {
    /// Compute the first snapshot and subscribe to the resolver's signal
    ///
    /// # Errors
    ///
    /// Fails like [`ConfigResolver::get_all_config`].
    pub fn new(resolver: &ConfigResolver) -> Result<Self> {
        let state = Arc::new(RwLock::new(LiveState {
            snapshot: Some(resolver.get_all_config()?),
            revision: 0,
        }));

        let handler_resolver = resolver.clone();
        let handler_state = Arc::clone(&state);
        let subscription = resolver.signal().subscribe(move || {
            let snapshot = match handler_resolver.get_all_config() {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    log::error!("Failed to refresh live config: {e}");
                    None
                }
            };
            let mut state = handler_state.write_recovered();
            state.snapshot = snapshot;
            state.revision += 1;
        });

        Ok(Self {
            resolver: resolver.clone(),
            state,
            _subscription: subscription,
        })
    }

    /// Current snapshot
    ///
    /// # Errors
    ///
    /// When the last refresh failed the snapshot is recomputed, and this
    /// returns the error if it fails again.
    pub fn snapshot(&self) -> Result<ConfigSnapshot> {
        let revision = {
            let state = self.state.read_recovered();
            if let Some(snapshot) = &state.snapshot {
                return Ok(snapshot.clone());
            }
            state.revision
        };

        let snapshot = self.resolver.get_all_config()?;

        // A refresh that landed while recomputing wins over this result
        let mut state = self.state.write_recovered();
        if state.revision == revision {
            state.snapshot = Some(snapshot.clone());
        } else if let Some(newer) = &state.snapshot {
            return Ok(newer.clone());
        }
        Ok(snapshot)
    }

    /// Value of one key from the current snapshot
    ///
    /// # Errors
    ///
    /// `Error::UnknownKey` for keys outside the schema, or the snapshot error.
    pub fn get(&self, key: &str) -> Result<Value> {
        self.snapshot()?
            .remove(key)
            .ok_or_else(|| Error::UnknownKey(key.to_string()))
    }

    /// Number of refreshes since creation
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.read_recovered().revision
    }
}

impl fmt::Debug for LiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveConfig")
            .field("namespace", self.resolver.namespace())
            .field("state", &*self.state.read_recovered())
            .finish()
    }
}

impl ConfigResolver {
    /// Live view of this resolver (see [`LiveConfig`])
    ///
    /// # Errors
    ///
    /// See [`LiveConfig::new`].
    pub fn live(&self) -> Result<LiveConfig> {
        LiveConfig::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Schema, SchemaEntry};
    use crate::globals::{JsonScope, Namespace};
    use crate::events::ChangeSignal;
    use crate::storage::{KeyValueStore, MemoryStore};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Store that, once armed, writes `app.port=42` and notifies while the
    /// next read of that key is still in flight
    struct InterleavingStore {
        inner: MemoryStore,
        signal: ChangeSignal,
        armed: AtomicBool,
    }

    impl KeyValueStore for InterleavingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            let current = self.inner.get(key)?;
            if key == "app.port" && self.armed.swap(false, Ordering::SeqCst) {
                self.inner.set(key, "42")?;
                self.signal.notify();
            }
            Ok(current)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Result<Vec<String>> {
            self.inner.keys()
        }

        fn backend_name(&self) -> &'static str {
            "interleaving"
        }
    }

    fn schema() -> Schema {
        Schema::new()
            .entry("backend", SchemaEntry::string())
            .entry("port", SchemaEntry::number().min(1.0).max(65535.0).default(8000))
    }

    #[test]
    fn test_refreshes_on_write() {
        let resolver = ConfigResolver::builder("app", schema())
            .globals(JsonScope::new(json!({ "app": { "backend": "x" } })))
            .build()
            .unwrap();
        let live = resolver.live().unwrap();

        assert_eq!(live.get("port").unwrap(), json!(8000));
        resolver.set_config("port", json!(42)).unwrap();
        assert_eq!(live.get("port").unwrap(), json!(42));
        assert_eq!(live.revision(), 1);
        assert!(matches!(live.get("nope"), Err(Error::UnknownKey(_))));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let resolver = ConfigResolver::builder("app", schema())
            .globals(JsonScope::new(json!({ "app": { "backend": "x" } })))
            .build()
            .unwrap();
        let live = resolver.live().unwrap();
        assert_eq!(resolver.signal().listener_count(), 1);

        drop(live);
        assert_eq!(resolver.signal().listener_count(), 0);
    }

    #[test]
    fn test_failed_refresh_recovers() {
        let globals = JsonScope::new(json!({ "app": { "backend": "x" } }));
        let store = MemoryStore::new();
        let resolver = ConfigResolver::builder("app", schema())
            .store(store.clone())
            .globals(globals.clone())
            .build()
            .unwrap();
        let live = resolver.live().unwrap();

        // The host breaks the injected value, then an external writer notifies
        globals.insert(&Namespace::new("app"), "port", json!("yolo"));
        store.set("app.port", "42").unwrap();
        resolver.signal().notify();
        assert!(live.snapshot().is_err());

        globals.remove(&Namespace::new("app"), "port");
        assert_eq!(live.get("port").unwrap(), json!(42));
    }

    #[test]
    fn test_recompute_keeps_newer_refresh() {
        let globals = JsonScope::new(json!({ "app": { "backend": "x" } }));
        let signal = ChangeSignal::new();
        let store = Arc::new(InterleavingStore {
            inner: MemoryStore::new(),
            signal: signal.clone(),
            armed: AtomicBool::new(false),
        });
        let resolver = ConfigResolver::builder("app", schema())
            .shared_store(store.clone())
            .globals(globals.clone())
            .signal(signal.clone())
            .build()
            .unwrap();
        let live = resolver.live().unwrap();

        globals.insert(&Namespace::new("app"), "port", json!("yolo"));
        signal.notify();
        globals.remove(&Namespace::new("app"), "port");
        assert_eq!(live.revision(), 1);

        // The recompute reads the old port while a refresh stores the new one
        store.armed.store(true, Ordering::SeqCst);
        assert_eq!(live.get("port").unwrap(), json!(42));
        assert_eq!(live.revision(), 2);
        assert_eq!(live.get("port").unwrap(), json!(42));
    }
}
