//! Accumulated builder state and its mutators

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::value::{string_of, wrap};
use crate::domain::classifier::{classify, FieldClass};
use crate::domain::platform::{AudienceType, Platform};
use crate::error::{PushError, Result};

/// Caller-supplied top-level values that bypass generation in `build()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExplicitFields {
    pub audience: Option<Value>,
    pub notification: Option<Value>,
    pub device_types: Option<Value>,
    pub options: Option<Value>,
    pub message: Option<Value>,
}

/// Mutable state owned by a single builder.
#[derive(Debug, Clone, Default)]
pub struct PushPayloadState {
    tokens: BTreeMap<Platform, Vec<String>>,
    audience_selectors: BTreeMap<AudienceType, Vec<String>>,
    present_platforms: Vec<Platform>,
    overrides: BTreeMap<Platform, Map<String, Value>>,
    implied_overrides: BTreeMap<String, Value>,
    extras: BTreeMap<String, String>,
    pub(crate) alert: Option<String>,
    pub(crate) explicit: ExplicitFields,
}

impl PushPayloadState {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Identifier accumulation
    // ------------------------------------------------------------------

    /// Append (or replace) a platform's token list.
    pub fn add_tokens(&mut self, platform: Platform, values: Value, replace: bool) {
        let incoming = wrap(values);
        let list = self.tokens.entry(platform).or_default();
        if replace {
            list.clear();
        }
        list.extend(incoming);
        self.refresh_present_platforms();
    }

    /// Append (or replace) one audience type's selector list.
    pub fn add_audience_selectors(&mut self, audience_type: AudienceType, values: Value, replace: bool) {
        let incoming = wrap(values);
        let list = self.audience_selectors.entry(audience_type).or_default();
        if replace {
            list.clear();
        }
        list.extend(incoming);
    }

    /// Name-driven variant of [`add_audience_selectors`](Self::add_audience_selectors).
    ///
    /// Only the singular type names are accepted; anything else is
    /// rejected without touching state.
    pub fn add_audience_selectors_by_name(&mut self, name: &str, values: Value, replace: bool) -> Result<()> {
        let audience_type = name.parse::<AudienceType>().inspect_err(|_| {
            tracing::debug!(audience_type = %name, "Rejected unknown audience type");
        })?;
        self.add_audience_selectors(audience_type, values, replace);
        Ok(())
    }

    fn refresh_present_platforms(&mut self) {
        // BTreeMap keys are already sorted and unique
        self.present_platforms = self
            .tokens
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(platform, _)| *platform)
            .collect();
    }

    // ------------------------------------------------------------------
    // Overrides and extras
    // ------------------------------------------------------------------

    /// Store a platform override if the key is in the platform's allowlist.
    pub fn add_override(&mut self, platform: Platform, key: &str, value: Value) -> Result<&Value> {
        if !platform.allows_override(key) {
            tracing::debug!(platform = %platform, key = %key, "Rejected platform override");
            return Err(PushError::OverrideNotAllowed {
                platform,
                key: key.to_string(),
            });
        }

        let block = self.overrides.entry(platform).or_default();
        block.insert(key.to_string(), value);
        Ok(&block[key])
    }

    /// Same as [`add_override`](Self::add_override) with the platform given by name.
    pub fn add_override_by_name(&mut self, platform: &str, key: &str, value: Value) -> Result<&Value> {
        let platform = platform.parse::<Platform>().inspect_err(|_| {
            tracing::debug!(platform = %platform, key = %key, "Rejected override for unknown platform");
        })?;
        self.add_override(platform, key, value)
    }

    /// Store an extra, coerced to its string form.
    pub fn add_extra(&mut self, key: impl Into<String>, value: &Value) {
        self.extras.insert(key.into(), string_of(value));
    }

    /// Classify a field and store it where it belongs.
    ///
    /// Token and selector fields replace the current list. Override fields
    /// are written to every platform that accepts them and recorded as
    /// implied overrides. Anything else becomes an extra.
    pub fn classify_and_store(&mut self, name: &str, value: Value) -> FieldClass {
        let class = classify(name);
        tracing::trace!(field = %name, class = ?class, "Classified field");

        match &class {
            FieldClass::Token(platform) => self.add_tokens(*platform, value, true),
            FieldClass::AudienceSelector(audience_type) => {
                self.add_audience_selectors(*audience_type, value, true)
            }
            FieldClass::Override(platforms) => {
                for platform in platforms {
                    // Classification only yields platforms that allow the key
                    let _ = self.add_override(*platform, name, value.clone());
                }
                self.implied_overrides.insert(name.to_string(), value);
            }
            FieldClass::Extra => self.add_extra(name, &value),
        }

        class
    }

    /// Inject the full extras mapping as the `extra` override of every
    /// present platform that accepts one.
    ///
    /// Each injection goes through [`add_override`](Self::add_override), so
    /// platforms without `extra` in their allowlist are skipped.
    pub(crate) fn inject_extras(&mut self) {
        if self.extras.is_empty() {
            return;
        }

        let extras: Map<String, Value> = self
            .extras
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        for platform in self.present_platforms.clone() {
            if self.add_override(platform, "extra", Value::Object(extras.clone())).is_ok() {
                tracing::trace!(platform = %platform, "Injected extras");
            }
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    /// Tokens registered for a platform (empty when none).
    pub fn tokens(&self, platform: Platform) -> &[String] {
        self.tokens.get(&platform).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All token lists keyed by platform, including lists emptied by a replace.
    pub fn token_lists(&self) -> &BTreeMap<Platform, Vec<String>> {
        &self.tokens
    }

    /// Selectors registered for an audience type (empty when none).
    pub fn selectors(&self, audience_type: AudienceType) -> &[String] {
        self.audience_selectors
            .get(&audience_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn audience_selectors(&self) -> &BTreeMap<AudienceType, Vec<String>> {
        &self.audience_selectors
    }

    /// Platforms with at least one token, sorted and deduplicated.
    pub fn present_platforms(&self) -> &[Platform] {
        &self.present_platforms
    }

    pub fn is_present(&self, platform: Platform) -> bool {
        self.present_platforms.contains(&platform)
    }

    pub fn overrides(&self) -> &BTreeMap<Platform, Map<String, Value>> {
        &self.overrides
    }

    pub fn platform_overrides(&self, platform: Platform) -> Option<&Map<String, Value>> {
        self.overrides.get(&platform)
    }

    /// Fields whose platform scope was inferred from their name.
    pub fn implied_overrides(&self) -> &BTreeMap<String, Value> {
        &self.implied_overrides
    }

    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extras
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn explicit(&self) -> &ExplicitFields {
        &self.explicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_tokens_append_and_replace() {
        let mut state = PushPayloadState::new();
        state.add_tokens(Platform::Ios, json!("token1"), false);
        state.add_tokens(Platform::Ios, json!(["token2", "token2"]), false);
        assert_eq!(state.tokens(Platform::Ios), ["token1", "token2", "token2"]);

        state.add_tokens(Platform::Ios, json!(["token3"]), true);
        assert_eq!(state.tokens(Platform::Ios), ["token3"]);
    }

    #[test]
    fn test_present_platforms_sorted() {
        let mut state = PushPayloadState::new();
        state.add_tokens(Platform::Wns, json!("token1"), false);
        state.add_tokens(Platform::Ios, json!("token2"), false);
        state.add_tokens(Platform::Wns, json!("token3"), false);
        assert_eq!(state.present_platforms(), [Platform::Ios, Platform::Wns]);
    }

    #[test]
    fn test_present_platforms_drop_emptied_list() {
        let mut state = PushPayloadState::new();
        state.add_tokens(Platform::Android, json!("token1"), false);
        state.add_tokens(Platform::Android, Value::Null, true);
        assert!(state.present_platforms().is_empty());
        assert!(state.tokens(Platform::Android).is_empty());
    }

    #[test]
    fn test_audience_selectors() {
        let mut state = PushPayloadState::new();
        state.add_audience_selectors(AudienceType::Tag, json!(["tag1", "tag2"]), false);
        state.add_audience_selectors(AudienceType::Tag, json!("tag3"), false);
        assert_eq!(state.selectors(AudienceType::Tag), ["tag1", "tag2", "tag3"]);

        state.add_audience_selectors(AudienceType::Tag, json!(["tag4"]), true);
        assert_eq!(state.selectors(AudienceType::Tag), ["tag4"]);
    }

    #[test]
    fn test_audience_selectors_by_name_rejects_unknown() {
        let mut state = PushPayloadState::new();
        let result = state.add_audience_selectors_by_name("channel", json!("c1"), false);
        assert!(matches!(result, Err(PushError::UnknownAudienceType(_))));
        assert!(state.audience_selectors().is_empty());

        assert!(state.add_audience_selectors_by_name("alias", json!("a1"), false).is_ok());
        assert_eq!(state.selectors(AudienceType::Alias), ["a1"]);
    }

    #[test]
    fn test_add_override_allowlist() {
        let mut state = PushPayloadState::new();
        assert_eq!(state.add_override(Platform::Ios, "badge", json!(1)).ok(), Some(&json!(1)));
        assert!(state.add_override(Platform::Ios, "bad_override", json!(1)).is_err());
        assert!(state.add_override_by_name("bad_platform", "badge", json!(1)).is_err());

        assert_eq!(state.overrides().len(), 1);
        assert_eq!(
            state.platform_overrides(Platform::Ios).and_then(|o| o.get("badge")),
            Some(&json!(1))
        );
    }

    #[test]
    fn test_add_override_for_every_platform_and_key() {
        for platform in Platform::ALL {
            for key in ["alert", "badge", "sound", "extra", "toast", "collapse_key", "body", "nope"] {
                let mut state = PushPayloadState::new();
                let accepted = state.add_override(platform, key, json!("v")).is_ok();
                assert_eq!(accepted, platform.allows_override(key));
                assert_eq!(
                    state.platform_overrides(platform).and_then(|o| o.get(key)).is_some(),
                    accepted
                );
            }
        }
    }

    #[test]
    fn test_add_extra_coerces() {
        let mut state = PushPayloadState::new();
        state.add_extra("something", &json!(1));
        state.add_extra("flag", &json!(false));
        assert_eq!(state.extras().get("something").map(String::as_str), Some("1"));
        assert_eq!(state.extras().get("flag").map(String::as_str), Some("false"));
    }

    #[test]
    fn test_classify_and_store_multi_platform_override() {
        let mut state = PushPayloadState::new();
        let class = state.classify_and_store("badge", json!(1));
        assert_eq!(class, FieldClass::Override(vec![Platform::Ios, Platform::Wns]));
        assert_eq!(state.platform_overrides(Platform::Ios).and_then(|o| o.get("badge")), Some(&json!(1)));
        assert_eq!(state.platform_overrides(Platform::Wns).and_then(|o| o.get("badge")), Some(&json!(1)));
        assert_eq!(state.implied_overrides().get("badge"), Some(&json!(1)));
        assert!(state.present_platforms().is_empty());
    }

    #[test]
    fn test_classify_and_store_tokens_replace() {
        let mut state = PushPayloadState::new();
        state.classify_and_store("apids", json!(["token1", "token2"]));
        state.classify_and_store("apid", json!("token3"));
        assert_eq!(state.tokens(Platform::Android), ["token3"]);
        assert_eq!(state.present_platforms(), [Platform::Android]);
    }

    #[test]
    fn test_inject_extras_respects_allowlist() {
        let mut state = PushPayloadState::new();
        state.add_tokens(Platform::Ios, json!("token1"), false);
        state.add_tokens(Platform::Mpns, json!("token2"), false);
        state.add_extra("something", &json!("else"));
        state.inject_extras();

        assert_eq!(
            state.platform_overrides(Platform::Ios).and_then(|o| o.get("extra")),
            Some(&json!({"something": "else"}))
        );
        assert!(state.platform_overrides(Platform::Mpns).is_none());
        assert!(state.platform_overrides(Platform::Android).is_none());
    }

    #[test]
    fn test_inject_extras_overwrites_prior_extra() {
        let mut state = PushPayloadState::new();
        state.add_tokens(Platform::Android, json!("token1"), false);
        let _ = state.add_override(Platform::Android, "extra", json!({"old": "value"}));
        state.add_extra("new", &json!("value"));
        state.inject_extras();

        assert_eq!(
            state.platform_overrides(Platform::Android).and_then(|o| o.get("extra")),
            Some(&json!({"new": "value"}))
        );
    }
}
