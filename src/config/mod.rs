//! Core configuration types
//!
//! This module contains the foundational types for configuration resolution:
//! - `Schema` / `SchemaEntry` - Declared keys, their types and defaults
//! - `ResolverConfig` - Namespace and override settings for a resolver

mod schema;
mod types;

pub use schema::{
    BooleanEntry, CustomEntry, CustomParser, DefaultValue, EntryType, NumberEntry, Producer,
    Schema, SchemaEntry, StringEntry,
};

pub use types::{ResolverConfig, ResolverConfigBuilder};
