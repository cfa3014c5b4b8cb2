//! # rtcfg - Runtime Config Resolver
//!
//! A small library that reconciles configuration values from three layered
//! sources into one typed, validated view:
//!
//! 1. **Overrides** persisted in a key/value store (a user's local changes)
//! 2. **Injected values** supplied by the host at runtime (a deployment's globals)
//! 3. **Defaults** declared in the schema
//!
//! ## Features
//!
//! - **Typed schema**: string, string-enum, number (with bounds), boolean and custom entries
//! - **Validation**: every source is parsed against its entry; writes get caller-friendly messages
//! - **Minimal storage**: writing a key's baseline value removes the override
//! - **Change signal**: content-free broadcast raised after every write
//! - **Live views**: snapshots that refresh themselves when the signal fires
//! - **Admin listing**: per-key origin of the effective value
//!
//! ## Quick Start
//!
//! ```rust
//! use rtcfg::{ConfigResolver, JsonScope, MemoryStore, Schema, SchemaEntry};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .entry(
//!         "color",
//!         SchemaEntry::string_enum(["blue", "green", "pink"])
//!             .description("Main color of the application"),
//!     )
//!     .entry("backend", SchemaEntry::string().description("Backend url"))
//!     .entry("port", SchemaEntry::number().min(1.0).max(65535.0).default(8000))
//!     .entry("isLive", SchemaEntry::boolean().default(false));
//!
//! let globals = JsonScope::new(json!({
//!     "my-app": { "color": "blue", "backend": "http://localhost" }
//! }));
//!
//! let resolver = ConfigResolver::builder("my-app", schema)
//!     .store(MemoryStore::new())
//!     .globals(globals)
//!     .build()?;
//!
//! assert_eq!(resolver.get_config("color")?, json!("blue"));
//!
//! resolver.set_config("color", json!("pink"))?;
//! assert_eq!(resolver.get_config("color")?, json!("pink"));
//!
//! let err = resolver.set_config("port", json!(-1)).unwrap_err();
//! assert_eq!(err.to_string(), r#"Expected "port=-1" to be greater than 1"#);
//! # Ok::<(), rtcfg::Error>(())
//! ```
//!
//! ## Baseline Value Behavior
//!
//! When you set a key to the value it would have without an override (the
//! injected value when there is one, otherwise the literal default), rtcfg
//! **removes the override** instead of writing it. The store then only holds
//! real customizations, and a later change of the injected value or default
//! applies to everyone who hasn't customized the key.
//!
//! ## Sharing a Store Between Contexts
//!
//! ```rust
//! use rtcfg::{ChangeSignal, ConfigResolver, MemoryStore, Schema, SchemaEntry};
//! use serde_json::json;
//!
//! let schema = Schema::new().entry("isLive", SchemaEntry::boolean().default(false));
//! let store = MemoryStore::new();
//! let signal = ChangeSignal::new();
//!
//! let tab_a = ConfigResolver::builder("app", schema.clone())
//!     .store(store.clone())
//!     .signal(signal.clone())
//!     .build()?;
//! let tab_b = ConfigResolver::builder("app", schema)
//!     .store(store)
//!     .signal(signal)
//!     .build()?;
//!
//! let live_b = tab_b.live()?;
//! tab_a.set_config("isLive", json!(true))?;
//! assert_eq!(live_b.get("isLive")?, json!(true));
//! # Ok::<(), rtcfg::Error>(())
//! ```

// Core modules
mod admin;
mod docs;
mod error;
mod events;
mod parse;
mod resolver;
mod sync;
mod view;

pub mod globals;
pub mod storage;

// Grouped modules
pub mod config;

// Re-exports from core
pub use admin::{AdminConfig, AdminField};
pub use docs::{DocsConfig, generate_docs};
pub use error::{Error, Result};
pub use events::{ChangeListener, ChangeSignal, Subscription};
pub use parse::{ParseError, ParseErrorKind, normalize, parse, validate};
pub use resolver::{ConfigResolver, ConfigResolverBuilder, ConfigSnapshot};
pub use view::LiveConfig;

pub use globals::{
    DefaultEnvSource, EnvScope, EnvSource, GlobalScope, JsonScope, MapEnvSource, Namespace,
};
#[cfg(feature = "json-file")]
pub use storage::JsonFileStore;
pub use storage::{KeyValueStore, MemoryStore};

// Re-exports from config
pub use config::{
    BooleanEntry, CustomEntry, CustomParser, DefaultValue, EntryType, NumberEntry, Producer,
    ResolverConfig, ResolverConfigBuilder, Schema, SchemaEntry, StringEntry,
};
