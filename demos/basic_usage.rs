// Basic usage example for rtcfg
//
// Run with: cargo run --example basic_usage

use rtcfg::{ConfigResolver, DocsConfig, JsonScope, MemoryStore, Schema, SchemaEntry, generate_docs};
use serde_json::{Value, json};

fn app_schema() -> Schema {
    Schema::new()
        .entry(
            "color",
            SchemaEntry::string_enum(["blue", "green", "pink"])
                .description("Main color of the application"),
        )
        .entry("backend", SchemaEntry::string().description("Backend url"))
        .entry(
            "port",
            SchemaEntry::number()
                .min(1.0)
                .max(65535.0)
                .default(8000)
                .description("Backend port"),
        )
        .entry(
            "monitoringLink",
            SchemaEntry::custom(|raw: &Value| {
                raw.get("url")
                    .and_then(Value::as_str)
                    .map(|url| json!({ "url": url }))
                    .ok_or_else(|| "Monitoring link invalid!".to_string())
            })
            .description("Link of the monitoring"),
        )
        .entry("isLive", SchemaEntry::boolean().default(false))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // What a deployment would inject before the app starts
    let globals = JsonScope::new(json!({
        "my-app": {
            "color": "blue",
            "backend": "http://localhost:3000",
            "monitoringLink": { "url": "http://grafana.local" }
        }
    }));

    let resolver = ConfigResolver::builder("my-app", app_schema())
        .store(MemoryStore::new())
        .globals(globals)
        .build()?;

    println!("⚙️  rtcfg Basic Usage Example\n");

    println!("📋 Resolved configuration:");
    println!("{}\n", serde_json::to_string_pretty(&resolver.get_all_config()?)?);

    println!("✏️  Overriding color and port...");
    resolver.set_config("color", json!("pink"))?;
    resolver.set_config("port", json!("42"))?;
    println!("   color = {}", resolver.get_config("color")?);
    println!("   port  = {}\n", resolver.get_config("port")?);

    println!("🚫 Rejected writes:");
    for (key, value) in [
        ("color", json!("red")),
        ("port", json!(-1)),
        ("port", json!("yolo")),
        ("monitoringLink", json!("red")),
    ] {
        if let Err(e) = resolver.set_config(key, value) {
            println!("   {e}");
        }
    }
    println!();

    println!("↩️  Writing the default back removes the override");
    resolver.set_config("port", json!(8000))?;
    println!("   port overridden: {}\n", resolver.is_overridden("port")?);

    resolver.reset()?;
    println!("🧹 After reset: color = {}\n", resolver.get_config("color")?);

    println!("📖 Reference docs:\n");
    println!(
        "{}",
        generate_docs(
            resolver.schema(),
            DocsConfig::new()
                .with_title("My App Configuration")
                .with_namespace("my-app"),
        )
    );

    Ok(())
}
