//! Notification composition

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use super::state::PushPayloadState;
use crate::domain::platform::{all_platforms, Platform};

/// Generated notification: alert text plus one block per present platform.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationExpr {
    /// Always emitted, possibly null
    pub alert: Option<String>,
    /// Platform blocks in registry order
    pub platforms: Vec<(Platform, Map<String, Value>)>,
}

impl NotificationExpr {
    pub fn platform(&self, platform: Platform) -> Option<&Map<String, Value>> {
        self.platforms
            .iter()
            .find(|(p, _)| *p == platform)
            .map(|(_, block)| block)
    }
}

impl Serialize for NotificationExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.platforms.len()))?;
        map.serialize_entry("alert", &self.alert)?;
        for (platform, block) in &self.platforms {
            map.serialize_entry(platform.as_str(), block)?;
        }
        map.end()
    }
}

impl From<NotificationExpr> for Value {
    fn from(expr: NotificationExpr) -> Self {
        let mut map = Map::new();
        map.insert("alert".to_string(), expr.alert.map_or(Value::Null, Value::String));
        for (platform, block) in expr.platforms {
            map.insert(platform.as_str().to_string(), Value::Object(block));
        }
        Value::Object(map)
    }
}

/// Compose the notification from the alert, overrides and extras.
///
/// This writes into `state`: extras are injected as the `extra` override of
/// every present platform that accepts one. Platforms with overrides but
/// no tokens are left out of the result while keeping their override data.
pub fn compose_notification(state: &mut PushPayloadState) -> NotificationExpr {
    state.inject_extras();

    let platforms = all_platforms()
        .iter()
        .filter(|d| state.is_present(d.id))
        .filter_map(|d| {
            state
                .platform_overrides(d.id)
                .filter(|block| !block.is_empty())
                .map(|block| (d.id, block.clone()))
        })
        .collect();

    NotificationExpr {
        alert: state.alert().map(str::to_string),
        platforms,
    }
}
