use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

use crate::domain::payload::EmptyDeviceTypes;
use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub payload: PayloadConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadConfig {
    /// Whether an empty derived `device_types` list is omitted or emitted as `[]`
    #[serde(default)]
    pub empty_device_types: EmptyDeviceTypes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Fallback filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputConfig {
    /// JSON file holding the field mapping; stdin when unset
    pub path: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn new() -> Result<Self> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("payload.empty_device_types", "omit")?
            .set_default("log.level", default_log_level())?
            .set_default("log.format", "pretty")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // PUSH_PAYLOAD__EMPTY_DEVICE_TYPES, PUSH_LOG__LEVEL, PUSH_INPUT__PATH, etc.
            .add_source(
                Environment::with_prefix("PUSH")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Ok(builder.build()?.try_deserialize()?)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.payload.empty_device_types, EmptyDeviceTypes::Omit);
        assert_eq!(settings.log.level, "info");
        assert_eq!(settings.log.format, LogFormat::Pretty);
        assert!(settings.input.path.is_none());
    }

    #[test]
    fn test_deserialize_from_config_source() {
        let settings: Settings = Config::builder()
            .set_override("payload.empty_device_types", "empty")
            .and_then(|b| b.set_override("log.format", "json"))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("settings");

        assert_eq!(settings.payload.empty_device_types, EmptyDeviceTypes::Empty);
        assert_eq!(settings.log.format, LogFormat::Json);
        assert_eq!(settings.log.level, "info");
    }
}
