use std::io::Read;

use anyhow::{Context, Result};

use ara_push_builder::config::Settings;
use ara_push_builder::telemetry::init_tracing;
use ara_push_builder::PushPayloadBuilder;

fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    init_tracing(&settings.log);
    tracing::info!("Configuration loaded");

    // Command-line path wins over the configured one
    let path = std::env::args().nth(1).or_else(|| settings.input.path.clone());
    let input = read_input(path.as_deref())?;

    let fields: serde_json::Value =
        serde_json::from_str(&input).context("Failed to parse input as JSON")?;

    let mut builder = PushPayloadBuilder::from_value(fields)?.with_config(&settings.payload);
    let payload = builder.build();

    println!("{}", payload.to_json_pretty()?);
    tracing::info!("Payload written");
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) if path != "-" => {
            tracing::debug!(path = %path, "Reading fields from file");
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
        }
        _ => {
            tracing::debug!("Reading fields from stdin");
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}
