//! Resolver configuration

use crate::globals::Namespace;

/// Configuration for a [`ConfigResolver`](crate::ConfigResolver)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Prefix of injected values and persisted keys
    pub namespace: Namespace,

    /// Whether persisted overrides take part in resolution
    ///
    /// When `false`, `set_config` still persists but reads ignore the store.
    pub local_override: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            namespace: Namespace::new("config"),
            local_override: true,
        }
    }
}

impl ResolverConfig {
    /// Create a new builder for `ResolverConfig`
    ///
    /// # Example
    /// ```rust
    /// use rtcfg::ResolverConfig;
    ///
    /// let config = ResolverConfig::builder("my-app.")
    ///     .local_override(false)
    ///     .build();
    ///
    /// assert_eq!(config.namespace.as_str(), "my-app");
    /// assert!(!config.local_override);
    /// ```
    pub fn builder(namespace: impl Into<Namespace>) -> ResolverConfigBuilder {
        ResolverConfigBuilder::new(namespace)
    }

    /// Persisted key for a schema key, e.g. `"my-app.port"`
    #[must_use]
    pub fn storage_key(&self, key: &str) -> String {
        self.namespace.storage_key(key)
    }
}

/// Builder for creating `ResolverConfig` with a fluent API
#[derive(Debug, Clone)]
pub struct ResolverConfigBuilder {
    namespace: Namespace,
    local_override: bool,
}

impl ResolverConfigBuilder {
    /// Create a new builder with the required namespace
    pub fn new(namespace: impl Into<Namespace>) -> Self {
        Self {
            namespace: namespace.into(),
            local_override: true,
        }
    }

    /// Enable or disable persisted overrides (default: enabled)
    #[must_use]
    pub fn local_override(mut self, enabled: bool) -> Self {
        self.local_override = enabled;
        self
    }

    #[must_use]
    pub fn build(self) -> ResolverConfig {
        ResolverConfig {
            namespace: self.namespace,
            local_override: self.local_override,
        }
    }
}
