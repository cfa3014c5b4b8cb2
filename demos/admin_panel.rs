// Admin listing example for rtcfg
//
// Two contexts share one store and one change signal, like two browser tabs.
// The admin panel writes in one, a live view in the other picks it up.
//
// Run with: cargo run --example admin_panel

use rtcfg::{ChangeSignal, ConfigResolver, JsonScope, MemoryStore, Schema, SchemaEntry};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let schema = Schema::new()
        .entry("color", SchemaEntry::string_enum(["blue", "green", "pink"]))
        .entry("port", SchemaEntry::number().min(1.0).max(65535.0).default(8000))
        .entry("isLive", SchemaEntry::boolean().default(false));

    let store = MemoryStore::new();
    let signal = ChangeSignal::new();
    let globals = JsonScope::new(json!({ "shop": { "color": "blue" } }));

    let build = || {
        ConfigResolver::builder("shop", schema.clone())
            .store(store.clone())
            .globals(globals.clone())
            .signal(signal.clone())
            .build()
    };
    let admin_tab = build()?;
    let app_tab = build()?;

    let live = app_tab.live()?;
    println!("🛠️  rtcfg Admin Panel Example\n");

    let admin = admin_tab.admin();
    admin.field("color")?.set(json!("green"))?;
    admin.field("isLive")?.set(json!(true))?;

    println!("📋 Fields in namespace '{}':", admin.namespace());
    for field in admin.fields()? {
        let origin = if field.is_from_storage {
            "override"
        } else if field.window_value.is_some() {
            "injected"
        } else {
            "default"
        };
        println!("   {:<8} = {:<8} ({origin})", field.key, field.value.to_string());
    }
    println!();

    println!("🔄 Live view in the other tab (revision {}):", live.revision());
    println!("{}\n", serde_json::to_string_pretty(&live.snapshot()?)?);

    println!("📦 Admin fields as JSON:");
    println!("{}", serde_json::to_string_pretty(&admin.fields()?)?);

    admin.reset()?;
    println!("\n🧹 After reset the live view shows color = {}", live.get("color")?);

    Ok(())
}
