//! Admin listing of every configuration field
//!
//! [`AdminConfig`] exposes, per schema key, where the effective value comes
//! from. An admin surface can render it and write back through
//! [`AdminField::set`].

use crate::config::SchemaEntry;
use crate::error::Result;
use crate::globals::Namespace;
use crate::resolver::ConfigResolver;
use serde::Serialize;
use serde_json::Value;

/// Admin view over a resolver, returned by [`ConfigResolver::admin`]
#[derive(Debug, Clone, Copy)]
pub struct AdminConfig<'a> {
    resolver: &'a ConfigResolver,
}

/// One configuration field as seen by an admin
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminField<'a> {
    pub key: String,
    /// Full persisted key, `"{namespace}.{key}"`
    pub path: String,
    #[serde(flatten)]
    pub entry: &'a SchemaEntry,
    pub window_value: Option<Value>,
    pub storage_value: Option<Value>,
    pub is_from_storage: bool,
    /// Effective value
    pub value: Value,
    #[serde(skip)]
    resolver: &'a ConfigResolver,
}

impl<'a> AdminConfig<'a> {
    pub(crate) fn new(resolver: &'a ConfigResolver) -> Self {
        Self { resolver }
    }

    #[must_use]
    pub fn namespace(&self) -> &'a Namespace {
        self.resolver.namespace()
    }

    /// List every schema key in schema order
    ///
    /// # Errors
    ///
    /// Fails like [`ConfigResolver::get_config`] on the first unresolvable key.
    pub fn fields(&self) -> Result<Vec<AdminField<'a>>> {
        let resolver = self.resolver;
        resolver
            .schema()
            .iter()
            .map(|(key, entry)| {
                let resolution = resolver.resolve(key, entry)?;
                let value = resolution
                    .effective()
                    .cloned()
                    .ok_or_else(|| crate::Error::MissingValue(key.to_string()))?;

                Ok(AdminField {
                    key: key.to_string(),
                    path: resolver.config().storage_key(key),
                    entry,
                    is_from_storage: resolution.storage.is_some(),
                    window_value: resolution.window,
                    storage_value: resolution.storage,
                    value,
                    resolver,
                })
            })
            .collect()
    }

    /// Look up a single field
    ///
    /// # Errors
    ///
    /// `Error::UnknownKey`, or the resolution error of that key.
    pub fn field(&self, key: &str) -> Result<AdminField<'a>> {
        self.fields()?
            .into_iter()
            .find(|field| field.key == key)
            .ok_or_else(|| crate::Error::UnknownKey(key.to_string()))
    }

    /// Remove every override in the namespace
    ///
    /// # Errors
    ///
    /// See [`ConfigResolver::reset`].
    pub fn reset(&self) -> Result<()> {
        self.resolver.reset()
    }
}

impl AdminField<'_> {
    /// Write a new value for this field
    ///
    /// This field keeps the values it was listed with; list again to see the
    /// result.
    ///
    /// # Errors
    ///
    /// See [`ConfigResolver::set_config`].
    pub fn set(&self, value: Value) -> Result<()> {
        self.resolver.set_config(&self.key, value)
    }
}

impl ConfigResolver {
    /// Admin view of this resolver
    #[must_use]
    pub fn admin(&self) -> AdminConfig<'_> {
        AdminConfig::new(self)
    }
}
