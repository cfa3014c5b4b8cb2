//! Injected global values
//!
//! The hosting environment publishes deployment-time values before the
//! resolver is built. The resolver reads them through [`GlobalScope`] and never
//! writes them.
//!
//! - [`JsonScope`]: a shared JSON tree addressed as `scope[namespace][key]`
//! - [`EnvScope`]: environment variables named `{NAMESPACE}_{KEY}`

use crate::sync::RwLockExt;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, RwLock};

// =============================================================================
// Namespace
// =============================================================================

/// Prefix scoping both the injected values and the persisted keys
///
/// A single trailing `.` is dropped, so `"app."` and `"app"` are the same
/// namespace. A dotted namespace (`"acme.web"`) addresses nested objects in a
/// [`JsonScope`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(raw: impl Into<String>) -> Self {
        let mut name = raw.into();
        if name.ends_with('.') {
            name.pop();
        }
        Self(name)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Persisted key for a config key: `"{namespace}.{key}"`
    #[must_use]
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}.{key}", self.0)
    }

    /// Path segments of the namespace (empty for the root namespace)
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Namespace {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

// =============================================================================
// GlobalScope Trait
// =============================================================================

/// Read accessor for the injected global value map
pub trait GlobalScope: Send + Sync {
    /// Raw value at `scope[namespace][key]`, `None` when absent
    fn lookup(&self, namespace: &Namespace, key: &str) -> Option<Value>;

    /// Keys present under the namespace root (empty when the root is missing)
    fn keys(&self, namespace: &Namespace) -> Vec<String>;
}

// =============================================================================
// JSON Scope
// =============================================================================

/// Global scope backed by a shared JSON tree
///
/// Clones share the same tree, so the host keeps a handle to publish or
/// retract values while the resolver reads through its own.
///
/// ```rust
/// use rtcfg::{GlobalScope, JsonScope, Namespace};
/// use serde_json::json;
///
/// let scope = JsonScope::new(json!({ "test": { "color": "blue" } }));
/// let ns = Namespace::new("test");
/// assert_eq!(scope.lookup(&ns, "color"), Some(json!("blue")));
///
/// scope.remove(&ns, "color");
/// assert_eq!(scope.lookup(&ns, "color"), None);
/// ```
#[derive(Clone, Default)]
pub struct JsonScope {
    root: Arc<RwLock<Value>>,
}

impl JsonScope {
    #[must_use]
    pub fn new(root: Value) -> Self {
        Self {
            root: Arc::new(RwLock::new(root)),
        }
    }

    /// Publish a value at `scope[namespace][key]`, creating objects on the way
    pub fn insert(&self, namespace: &Namespace, key: &str, value: Value) {
        let segments: Vec<&str> = namespace.segments().collect();
        insert_at(&mut self.root.write_recovered(), &segments, key, value);
    }

    /// Retract the value at `scope[namespace][key]`
    pub fn remove(&self, namespace: &Namespace, key: &str) -> Option<Value> {
        let mut root = self.root.write_recovered();
        let mut node = &mut *root;
        for segment in namespace.segments() {
            node = node.get_mut(segment)?;
        }
        node.as_object_mut()?.remove(key)
    }

    /// Drop the whole namespace root
    pub fn clear(&self, namespace: &Namespace) {
        let segments: Vec<&str> = namespace.segments().collect();
        let Some((last, parents)) = segments.split_last() else {
            *self.root.write_recovered() = Value::Object(Map::new());
            return;
        };

        let mut root = self.root.write_recovered();
        let mut node = &mut *root;
        for segment in parents {
            match node.get_mut(*segment) {
                Some(child) => node = child,
                None => return,
            }
        }
        if let Some(obj) = node.as_object_mut() {
            obj.remove(*last);
        }
    }

    fn namespace_root<'a>(root: &'a Value, namespace: &Namespace) -> Option<&'a Value> {
        namespace
            .segments()
            .try_fold(root, |node, segment| node.get(segment))
    }
}

/// Walk `path` from `node`, replacing non-object nodes by empty objects
fn insert_at(node: &mut Value, path: &[&str], key: &str, value: Value) {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        match path.split_first() {
            Some((first, rest)) => {
                let child = map.entry((*first).to_string()).or_insert(Value::Null);
                insert_at(child, rest, key, value);
            }
            None => {
                map.insert(key.to_string(), value);
            }
        }
    }
}

impl GlobalScope for JsonScope {
    fn lookup(&self, namespace: &Namespace, key: &str) -> Option<Value> {
        let root = self.root.read_recovered();
        Self::namespace_root(&root, namespace)
            .and_then(|ns| ns.get(key))
            .filter(|value| !value.is_null())
            .cloned()
    }

    fn keys(&self, namespace: &Namespace) -> Vec<String> {
        let root = self.root.read_recovered();
        Self::namespace_root(&root, namespace)
            .and_then(Value::as_object)
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for JsonScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonScope")
            .field("root", &*self.root.read_recovered())
            .finish()
    }
}

// =============================================================================
// Environment Scope
// =============================================================================

/// Source of environment variables
pub trait EnvSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;

    /// All variables, as `(name, value)` pairs
    fn vars(&self) -> Vec<(String, String)>;
}

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnvSource;

impl EnvSource for DefaultEnvSource {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn vars(&self) -> Vec<(String, String)> {
        std::env::vars().collect()
    }
}

/// Fixed set of variables, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource(Vec<(String, String)>);

impl MapEnvSource {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl EnvSource for MapEnvSource {
    fn var(&self, name: &str) -> Option<String> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.0.clone()
    }
}

/// Global scope backed by environment variables
///
/// `namespace = "my-app"`, `key = "apiUrl"` reads `MY_APP_APIURL`. Values are
/// decoded as JSON first and fall back to the raw string, so `MY_APP_PORT=42`
/// yields the number `42` and `MY_APP_NAME=demo` the string `"demo"`.
#[derive(Clone)]
pub struct EnvScope {
    source: Arc<dyn EnvSource>,
}

impl EnvScope {
    /// Scope over the process environment
    #[must_use]
    pub fn new() -> Self {
        Self::with_source(DefaultEnvSource)
    }

    pub fn with_source(source: impl EnvSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Variable name for a config key: `{NAMESPACE}_{KEY}` (all uppercase)
    #[must_use]
    pub fn var_name(namespace: &Namespace, key: &str) -> String {
        format!("{}{}", Self::prefix(namespace), env_segment(key))
    }

    fn prefix(namespace: &Namespace) -> String {
        let ns = env_segment(namespace.as_str());
        if ns.is_empty() {
            String::new()
        } else {
            format!("{ns}_")
        }
    }
}

impl Default for EnvScope {
    fn default() -> Self {
        Self::new()
    }
}

fn env_segment(raw: &str) -> String {
    raw.replace(['.', '-'], "_").to_uppercase()
}

impl GlobalScope for EnvScope {
    fn lookup(&self, namespace: &Namespace, key: &str) -> Option<Value> {
        let raw = self.source.var(&Self::var_name(namespace, key))?;
        Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
    }

    /// Keys come back lower-cased: `MY_APP_PORT` lists as `port`
    ///
    /// Case is lost in the variable name, so `MY_APP_ISLIVE` lists as
    /// `islive`. Lookups upper-case again, so listed keys always resolve.
    fn keys(&self, namespace: &Namespace) -> Vec<String> {
        let prefix = Self::prefix(namespace);
        self.source
            .vars()
            .into_iter()
            .filter_map(|(name, _)| name.strip_prefix(&prefix).map(str::to_lowercase))
            .filter(|key| !key.is_empty())
            .collect()
    }
}

impl fmt::Debug for EnvScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvScope").finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
