use clap::Parser;
use hikaku::prelude::*;
use ahash::AHashMap;
use std::fs;

/// Loads a module schema plus optional value assignments, stabilizes the
/// input state, and prints the resolved field table. Useful for inspecting
/// how a schema's conditionals, defaults and validators interact.
#[derive(Parser, Debug)]
#[command(name = "hikaku-cli", about = "Inspect a schema's resolved input state")]
struct Args {
    /// Path to the module schema JSON file.
    schema: String,

    /// Value assignments applied in order, as `field=value` pairs.
    #[arg(short, long)]
    set: Vec<String>,

    /// Context entries, as `key=value` pairs.
    #[arg(short, long)]
    context: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let raw = fs::read_to_string(&args.schema)?;
    let schema: ModuleSchema = serde_json::from_str(&raw)?;
    let schema = schema.into_schema()?;

    let mut context = AHashMap::new();
    for pair in &args.context {
        let (key, value) = split_pair(pair)?;
        context.insert(key.to_string(), value.to_string());
    }

    let mut engine = InputEngine::initialize(&schema, InitialValues::Fresh, context)?;
    for pair in &args.set {
        let (name, value) = split_pair(pair)?;
        engine.set_value(name, value, ResolveFlags::default())?;
    }

    println!(
        "{:<28} {:<9} {:<16} {:<24} {}",
        "FIELD", "VISIBLE", "VALUE", "ERROR", "OPTIONS"
    );
    for field in engine.fields() {
        let Some(state) = engine.state(&field.name) else {
            continue;
        };
        println!(
            "{:<28} {:<9} {:<16} {:<24} {}",
            field.name,
            state.is_visible,
            state.value,
            state.error,
            state.options.join(", "),
        );
    }
    println!();
    println!(
        "valid: {}  (pending option fetches: {})",
        engine.is_valid(),
        engine.needed_options().len()
    );
    Ok(())
}

fn split_pair(pair: &str) -> Result<(&str, &str), String> {
    pair.split_once('=')
        .ok_or_else(|| format!("expected `key=value`, got `{}`", pair))
}
