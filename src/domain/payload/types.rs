use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// What `build()` does with an empty derived `device_types` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyDeviceTypes {
    /// Leave `device_types` out of the payload (default)
    #[default]
    Omit,
    /// Emit `device_types: []`
    Empty,
}

/// The assembled request body for the push API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    /// Target audience; null when nothing addresses a recipient
    pub audience: Option<Value>,
    pub notification: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_types: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl PushPayload {
    /// Structured form of the payload
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
