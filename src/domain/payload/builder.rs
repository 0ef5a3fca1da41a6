//! Push payload builder facade

use serde_json::{Map, Value};

use super::audience::compose_audience;
use super::notification::compose_notification;
use super::state::PushPayloadState;
use super::types::{EmptyDeviceTypes, PushPayload};
use super::value::string_of;
use crate::config::PayloadConfig;
use crate::domain::classifier::{classify, FieldClass};
use crate::domain::platform::{AudienceType, Platform};
use crate::error::{PushError, Result};

/// Top-level payload fields applied directly rather than classified.
const RESERVED_FIELDS: [&str; 6] = ["alert", "audience", "notification", "device_types", "options", "message"];

/// Builds a push payload from a loose bag of named values.
///
/// Each builder owns its state exclusively. `build()` writes injected
/// extras back into the override store, so one builder must not be shared
/// across concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct PushPayloadBuilder {
    state: PushPayloadState,
    empty_device_types: EmptyDeviceTypes,
}

impl PushPayloadBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from a configuration mapping.
    ///
    /// Token fields are applied first, then audience selectors, then the
    /// alert and other top-level fields. Every remaining field is routed
    /// through the classifier.
    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut fields: Map<String, Value> = fields.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let mut builder = Self::new();

        for platform in Platform::ALL {
            let singular = platform.identifier_key().to_string();
            let plural = platform.plural_identifier_key();
            for name in [singular, plural] {
                if let Some(value) = fields.remove(&name) {
                    builder.state.add_tokens(platform, value, false);
                }
            }
        }

        for audience_type in AudienceType::ALL {
            for name in [audience_type.as_str(), audience_type.plural()] {
                if let Some(value) = fields.remove(name) {
                    builder.state.add_audience_selectors(audience_type, value, false);
                }
            }
        }

        for name in RESERVED_FIELDS {
            if let Some(value) = fields.remove(name) {
                builder.set_reserved(name, value);
            }
        }

        for (name, value) in fields {
            builder.state.classify_and_store(&name, value);
        }

        tracing::debug!(
            present_platforms = ?builder.state.present_platforms(),
            extras = builder.state.extras().len(),
            "Push payload builder initialized"
        );

        builder
    }

    /// Create a builder from a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            other => Err(PushError::InvalidInput(format!(
                "expected an object of fields, got {}",
                other
            ))),
        }
    }

    /// Apply payload settings
    pub fn with_config(mut self, config: &PayloadConfig) -> Self {
        self.empty_device_types = config.empty_device_types;
        self
    }

    /// Set the empty `device_types` policy
    pub fn empty_device_types(mut self, policy: EmptyDeviceTypes) -> Self {
        self.empty_device_types = policy;
        self
    }

    /// Read-only view of the accumulated state
    pub fn state(&self) -> &PushPayloadState {
        &self.state
    }

    // ------------------------------------------------------------------
    // Tokens and audience selectors
    // ------------------------------------------------------------------

    pub fn tokens(&self, platform: Platform) -> &[String] {
        self.state.tokens(platform)
    }

    /// Replace a platform's tokens
    pub fn set_tokens(&mut self, platform: Platform, values: impl Into<Value>) -> &mut Self {
        self.state.add_tokens(platform, values.into(), true);
        self
    }

    /// Append to a platform's tokens
    pub fn add_tokens(&mut self, platform: Platform, values: impl Into<Value>) -> &mut Self {
        self.state.add_tokens(platform, values.into(), false);
        self
    }

    pub fn selectors(&self, audience_type: AudienceType) -> &[String] {
        self.state.selectors(audience_type)
    }

    /// Replace one audience type's selectors
    pub fn set_selectors(&mut self, audience_type: AudienceType, values: impl Into<Value>) -> &mut Self {
        self.state.add_audience_selectors(audience_type, values.into(), true);
        self
    }

    /// Append to one audience type's selectors
    pub fn add_selectors(&mut self, audience_type: AudienceType, values: impl Into<Value>) -> &mut Self {
        self.state.add_audience_selectors(audience_type, values.into(), false);
        self
    }

    /// Append by field name, e.g. `apids` or `aliases`.
    pub fn append(&mut self, name: &str, values: impl Into<Value>) -> Result<()> {
        match classify(name) {
            FieldClass::Token(platform) => {
                self.state.add_tokens(platform, values.into(), false);
                Ok(())
            }
            FieldClass::AudienceSelector(audience_type) => {
                self.state.add_audience_selectors(audience_type, values.into(), false);
                Ok(())
            }
            _ => Err(PushError::UnknownAttribute(name.to_string())),
        }
    }

    // ------------------------------------------------------------------
    // Alert and explicit top-level fields
    // ------------------------------------------------------------------

    pub fn alert(&self) -> Option<&str> {
        self.state.alert()
    }

    pub fn set_alert(&mut self, alert: impl Into<String>) -> &mut Self {
        self.state.alert = Some(alert.into());
        self
    }

    pub fn clear_alert(&mut self) -> &mut Self {
        self.state.alert = None;
        self
    }

    /// Use this audience instead of the generated one
    pub fn set_audience(&mut self, audience: impl Into<Value>) -> &mut Self {
        self.state.explicit.audience = Some(audience.into());
        self
    }

    /// Use this notification instead of the generated one
    pub fn set_notification(&mut self, notification: impl Into<Value>) -> &mut Self {
        self.state.explicit.notification = Some(notification.into());
        self
    }

    /// Use these device types instead of the present platforms
    pub fn set_device_types(&mut self, device_types: impl Into<Value>) -> &mut Self {
        self.state.explicit.device_types = Some(device_types.into());
        self
    }

    pub fn set_options(&mut self, options: impl Into<Value>) -> &mut Self {
        self.state.explicit.options = Some(options.into());
        self
    }

    pub fn set_message(&mut self, message: impl Into<Value>) -> &mut Self {
        self.state.explicit.message = Some(message.into());
        self
    }

    /// Address every device on every platform.
    pub fn broadcast(&mut self) -> &mut Self {
        self.set_audience("all").set_device_types("all")
    }

    fn set_reserved(&mut self, name: &str, value: Value) {
        let explicit = &mut self.state.explicit;
        match name {
            "alert" => {
                self.state.alert = match value {
                    Value::Null => None,
                    other => Some(string_of(&other)),
                }
            }
            "audience" => explicit.audience = Some(value),
            "notification" => explicit.notification = Some(value),
            "device_types" => explicit.device_types = Some(value),
            "options" => explicit.options = Some(value),
            "message" => explicit.message = Some(value),
            _ => {}
        }
    }

    fn reserved_value(&self, name: &str) -> Option<Value> {
        let explicit = &self.state.explicit;
        let value = match name {
            "alert" => self.state.alert().map(Value::from),
            "audience" => explicit.audience.clone(),
            "notification" => explicit.notification.clone(),
            "device_types" => explicit.device_types.clone(),
            "options" => explicit.options.clone(),
            "message" => explicit.message.clone(),
            _ => return None,
        };
        Some(value.unwrap_or(Value::Null))
    }

    // ------------------------------------------------------------------
    // Overrides and extras
    // ------------------------------------------------------------------

    /// Set an override on one platform; rejected unless the platform accepts the key.
    pub fn add_override(&mut self, platform: Platform, key: &str, value: impl Into<Value>) -> Result<&Value> {
        self.state.add_override(platform, key, value.into())
    }

    pub fn add_override_by_name(&mut self, platform: &str, key: &str, value: impl Into<Value>) -> Result<&Value> {
        self.state.add_override_by_name(platform, key, value.into())
    }

    pub fn add_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.state.add_extra(key, &value.into());
        self
    }

    /// Classify and store every entry of `values`.
    pub fn add_overrides_and_extras<I, K>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        for (name, value) in values {
            self.state.classify_and_store(name.as_ref(), value);
        }
        self
    }

    // ------------------------------------------------------------------
    // Name-driven access
    // ------------------------------------------------------------------

    /// Read a field by name.
    ///
    /// Extras win, then top-level fields, then a scan over platforms in
    /// registry order for a token field or override key. An override key
    /// shared by several platforms only reads back from the first one.
    pub fn get(&self, name: &str) -> Result<Value> {
        if let Some(extra) = self.state.extras().get(name) {
            return Ok(Value::String(extra.clone()));
        }

        if let Some(value) = self.reserved_value(name) {
            return Ok(value);
        }

        for platform in Platform::ALL {
            if platform.matches_identifier(name) {
                return Ok(Value::from(self.state.tokens(platform).to_vec()));
            }

            if platform.allows_override(name) {
                let value = self
                    .state
                    .platform_overrides(platform)
                    .and_then(|block| block.get(name))
                    .cloned()
                    .unwrap_or(Value::Null);
                return Ok(value);
            }
        }

        if let Some(audience_type) = AudienceType::from_field(name) {
            return Ok(Value::from(self.state.selectors(audience_type).to_vec()));
        }

        Err(PushError::UnknownAttribute(name.to_string()))
    }

    /// Write a field by name.
    ///
    /// Token and selector fields replace their list; other names become
    /// overrides or extras. Never fails.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        if RESERVED_FIELDS.contains(&name) {
            self.set_reserved(name, value);
        } else {
            self.state.classify_and_store(name, value);
        }
        self
    }

    // ------------------------------------------------------------------
    // Build
    // ------------------------------------------------------------------

    /// Assemble the payload.
    ///
    /// Explicitly set top-level fields replace the generated ones. Composing
    /// the notification injects extras into the override store.
    pub fn build(&mut self) -> PushPayload {
        let audience = match self.state.explicit.audience.clone() {
            Some(audience) => Some(audience),
            None => compose_audience(&self.state).map(Value::from),
        };

        let notification = match self.state.explicit.notification.clone() {
            Some(notification) => notification,
            None => compose_notification(&mut self.state).into(),
        };

        let device_types = match self.state.explicit.device_types.clone() {
            Some(device_types) => Some(device_types),
            None => self.derived_device_types(),
        };

        let payload = PushPayload {
            audience,
            notification,
            device_types,
            options: self.state.explicit.options.clone(),
            message: self.state.explicit.message.clone(),
        };

        tracing::debug!(
            present_platforms = ?self.state.present_platforms(),
            has_audience = payload.audience.is_some(),
            "Built push payload"
        );

        payload
    }

    /// Build and serialize to compact JSON text.
    pub fn to_json(&mut self) -> Result<String> {
        self.build().to_json_string()
    }

    fn derived_device_types(&self) -> Option<Value> {
        let present = self.state.present_platforms();
        if present.is_empty() && self.empty_device_types == EmptyDeviceTypes::Omit {
            return None;
        }
        let names: Vec<Value> = present.iter().map(|p| Value::from(p.as_str())).collect();
        Some(Value::Array(names))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for PushPayloadBuilder {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self::from_fields(iter)
    }
}
