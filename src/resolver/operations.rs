use crate::config::SchemaEntry;
use crate::error::{Error, Result};
use crate::parse;
use crate::resolver::ConfigResolver;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Every schema key mapped to its effective value, in schema order
pub type ConfigSnapshot = Map<String, Value>;

/// The three candidate values of one key
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution {
    pub(crate) storage: Option<Value>,
    pub(crate) window: Option<Value>,
    pub(crate) default: Option<Value>,
}

impl Resolution {
    pub(crate) fn effective(&self) -> Option<&Value> {
        self.storage
            .as_ref()
            .or(self.window.as_ref())
            .or(self.default.as_ref())
    }
}

impl ConfigResolver {
    pub(crate) fn entry(&self, key: &str) -> Result<&SchemaEntry> {
        self.schema
            .get(key)
            .ok_or_else(|| Error::UnknownKey(key.to_string()))
    }

    /// Collect the override, injected and default values of `key`
    ///
    /// The injected value must parse even when an override hides it, and a
    /// key needs an injected value or a default regardless of overrides.
    pub(crate) fn resolve(&self, key: &str, entry: &SchemaEntry) -> Result<Resolution> {
        let storage = self.read_override(key, entry);
        let window = self.read_window(key, entry)?;
        let default = entry
            .resolve_default()
            .map(|value| parse::normalize(&value, entry));

        if window.is_none() && default.is_none() {
            return Err(Error::MissingValue(key.to_string()));
        }

        Ok(Resolution {
            storage,
            window,
            default,
        })
    }

    fn read_override(&self, key: &str, entry: &SchemaEntry) -> Option<Value> {
        if !self.config.local_override {
            return None;
        }

        let storage_key = self.config.storage_key(key);
        let raw = match self.store.get(&storage_key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Could not read override '{storage_key}', ignoring it: {e}");
                return None;
            }
        };

        match parse::parse(&parse::decode_raw(&raw, entry), entry) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring corrupted override '{storage_key}': {e}");
                None
            }
        }
    }

    fn read_window(&self, key: &str, entry: &SchemaEntry) -> Result<Option<Value>> {
        let Some(raw) = self.globals.lookup(&self.config.namespace, key) else {
            return Ok(None);
        };

        parse::parse(&raw, entry)
            .map(Some)
            .map_err(|e| Error::InvalidGlobalValue {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Effective value of a key.
    ///
    /// Every read goes back to the store and the global scope; nothing is
    /// cached.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownKey` if `key` is not in the schema
    /// - `Error::InvalidGlobalValue` if the injected value doesn't parse
    /// - `Error::MissingValue` if there is neither an injected value nor a default
    pub fn get_config(&self, key: &str) -> Result<Value> {
        let entry = self.entry(key)?;
        let resolution = self.resolve(key, entry)?;
        resolution
            .effective()
            .cloned()
            .ok_or_else(|| Error::MissingValue(key.to_string()))
    }

    /// Get a single value deserialized into `T`.
    ///
    /// # Errors
    ///
    /// As [`get_config`](Self::get_config), plus `Error::Serialize` when the
    /// value doesn't fit `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.get_config(key)?;
        serde_json::from_value(value).map_err(Error::from)
    }

    /// Effective value of every schema key, in schema order.
    ///
    /// # Errors
    ///
    /// Fails on the first key that [`get_config`](Self::get_config) rejects.
    pub fn get_all_config(&self) -> Result<ConfigSnapshot> {
        let mut snapshot = ConfigSnapshot::new();
        for key in self.schema.keys() {
            snapshot.insert(key.to_string(), self.get_config(key)?);
        }
        Ok(snapshot)
    }

    /// Deserialize the whole snapshot into a settings struct.
    ///
    /// # Errors
    ///
    /// As [`get_all_config`](Self::get_all_config), plus `Error::Serialize`.
    pub fn get_all<T: DeserializeOwned>(&self) -> Result<T> {
        let snapshot = self.get_all_config()?;
        serde_json::from_value(Value::Object(snapshot)).map_err(Error::from)
    }

    /// Parsed injected value of a key, if the host provides one.
    ///
    /// # Errors
    ///
    /// `Error::UnknownKey`, or `Error::InvalidGlobalValue` if it doesn't parse.
    pub fn get_window_value(&self, key: &str) -> Result<Option<Value>> {
        let entry = self.entry(key)?;
        self.read_window(key, entry)
    }

    /// Parsed override of a key.
    ///
    /// `None` when there is no override, when it no longer parses, or when
    /// overrides are disabled.
    ///
    /// # Errors
    ///
    /// `Error::UnknownKey` if `key` is not in the schema.
    pub fn get_storage_value(&self, key: &str) -> Result<Option<Value>> {
        let entry = self.entry(key)?;
        Ok(self.read_override(key, entry))
    }

    /// Whether a usable override currently takes precedence for `key`.
    ///
    /// # Errors
    ///
    /// `Error::UnknownKey` if `key` is not in the schema.
    pub fn is_overridden(&self, key: &str) -> Result<bool> {
        Ok(self.get_storage_value(key)?.is_some())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Persist an override for `key`, then raise the change signal.
    ///
    /// The value is validated first. When it equals the value the key would
    /// have without any override (the injected value if there is one,
    /// otherwise the literal default) the override is removed instead of
    /// written. The signal is raised in both cases.
    ///
    /// Built-in entries persist the coerced value. Custom entries persist the
    /// caller's raw input, which their parser runs on again at read time.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownKey` if `key` is not in the schema
    /// - `Error::InvalidValue` / `Error::CustomValue` if validation fails
    /// - `Error::InvalidGlobalValue` if the injected baseline doesn't parse
    /// - store errors from writing or removing the override
    pub fn set_config(&self, key: &str, value: Value) -> Result<()> {
        let entry = self.entry(key)?;
        let validated = parse::validate(key, &value, entry)?;

        let baseline = match self.read_window(key, entry)? {
            Some(window) => Some(window),
            None => entry
                .static_default()
                .map(|default| parse::normalize(default, entry)),
        };

        let storage_key = self.config.storage_key(key);
        if baseline.as_ref() == Some(&validated) {
            debug!("'{storage_key}' matches its baseline, removing override");
            self.store.remove(&storage_key)?;
        } else {
            // Custom parsers need not accept their own output
            let persisted = match entry {
                SchemaEntry::Custom(_) => &value,
                _ => &validated,
            };
            debug!("Persisting override '{storage_key}'");
            self.store
                .set(&storage_key, &parse::encode_value(persisted, entry))?;
        }

        self.signal.notify();
        Ok(())
    }

    /// Remove the override of one key, then raise the change signal.
    ///
    /// # Errors
    ///
    /// `Error::UnknownKey`, or the store error from removing the override.
    pub fn reset_config(&self, key: &str) -> Result<()> {
        self.entry(key)?;
        let storage_key = self.config.storage_key(key);
        debug!("Removing override '{storage_key}'");
        self.store.remove(&storage_key)?;
        self.signal.notify();
        Ok(())
    }

    /// Remove the override of every schema key, then raise the change signal
    /// once.
    ///
    /// Keys outside the schema that share the namespace prefix are left alone.
    ///
    /// # Errors
    ///
    /// Returns the first store error; overrides removed before it stay removed.
    pub fn reset(&self) -> Result<()> {
        for key in self.schema.keys() {
            self.store.remove(&self.config.storage_key(key))?;
        }
        info!(
            "Reset all overrides in namespace '{}'",
            self.config.namespace
        );
        self.signal.notify();
        Ok(())
    }
}
