// JSON file store example for rtcfg
//
// Overrides are kept in a flat JSON file and survive restarts.
//
// Run with: cargo run --example file_store

use rtcfg::{ConfigResolver, EnvScope, JsonFileStore, Schema, SchemaEntry};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let schema = Schema::from_json_str(
        r#"{
            "backend": { "type": "string", "default": "http://localhost", "description": "Backend url" },
            "port": { "type": "number", "min": 1, "max": 65535, "default": 8000 },
            "isLive": { "type": "boolean", "default": false }
        }"#,
    )?;

    // FILE_DEMO_PORT=3000 cargo run --example file_store
    let store = JsonFileStore::new("./example_config/overrides.json");
    let resolver = ConfigResolver::builder("file-demo", schema)
        .store(store.clone())
        .globals(EnvScope::new())
        .build()?;

    println!("💾 rtcfg File Store Example\n");
    println!("📋 Before: {}", serde_json::to_string(&resolver.get_all_config()?)?);

    let is_live = resolver.get::<bool>("isLive")?;
    resolver.set_config("isLive", json!(!is_live))?;

    println!("📋 After:  {}", serde_json::to_string(&resolver.get_all_config()?)?);
    println!("📁 Stored in {}", store.path().display());

    Ok(())
}
