//! Static registry of supported push platforms and audience selector types.
//!
//! Registry order (platform id ascending) is load-bearing: it decides the
//! order of OR clauses in the audience and of platform blocks in the
//! notification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PushError;

/// A supported push-notification channel.
///
/// Variants are declared in registry order so that the derived `Ord`
/// matches `Platform::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Blackberry,
    Ios,
    Mpns,
    Wns,
}

/// Static description of one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub id: Platform,
    /// Field name under which this platform's registration tokens are stored
    pub identifier_key: &'static str,
    /// Field names accepted in this platform's notification block
    pub allowed_overrides: &'static [&'static str],
}

const ANDROID: PlatformDescriptor = PlatformDescriptor {
    id: Platform::Android,
    identifier_key: "apid",
    allowed_overrides: &["alert", "collapse_key", "time_to_live", "delay_while_idle", "extra"],
};

const BLACKBERRY: PlatformDescriptor = PlatformDescriptor {
    id: Platform::Blackberry,
    identifier_key: "device_pin",
    allowed_overrides: &["alert", "body", "content_type", "content-type"],
};

const IOS: PlatformDescriptor = PlatformDescriptor {
    id: Platform::Ios,
    identifier_key: "device_token",
    allowed_overrides: &[
        "alert",
        "badge",
        "sound",
        "content-available",
        "content_available",
        "extra",
        "expiry",
        "priority",
    ],
};

const MPNS: PlatformDescriptor = PlatformDescriptor {
    id: Platform::Mpns,
    identifier_key: "mpns",
    allowed_overrides: &["alert", "toast", "tile"],
};

const WNS: PlatformDescriptor = PlatformDescriptor {
    id: Platform::Wns,
    identifier_key: "wns",
    allowed_overrides: &["alert", "toast", "tile", "badge"],
};

static REGISTRY: [PlatformDescriptor; 5] = [ANDROID, BLACKBERRY, IOS, MPNS, WNS];

/// All platform descriptors, sorted by id ascending.
pub fn all_platforms() -> &'static [PlatformDescriptor] {
    &REGISTRY
}

/// Look up a descriptor by platform name.
pub fn descriptor_for(name: &str) -> Option<&'static PlatformDescriptor> {
    REGISTRY.iter().find(|d| d.id.as_str() == name)
}

impl Platform {
    /// Every platform in registry order.
    pub const ALL: [Platform; 5] = [
        Platform::Android,
        Platform::Blackberry,
        Platform::Ios,
        Platform::Mpns,
        Platform::Wns,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Blackberry => "blackberry",
            Platform::Ios => "ios",
            Platform::Mpns => "mpns",
            Platform::Wns => "wns",
        }
    }

    pub fn descriptor(&self) -> &'static PlatformDescriptor {
        match self {
            Platform::Android => &REGISTRY[0],
            Platform::Blackberry => &REGISTRY[1],
            Platform::Ios => &REGISTRY[2],
            Platform::Mpns => &REGISTRY[3],
            Platform::Wns => &REGISTRY[4],
        }
    }

    pub fn identifier_key(&self) -> &'static str {
        self.descriptor().identifier_key
    }

    /// Plural form of the identifier key, e.g. `device_tokens` or `wnss`.
    pub fn plural_identifier_key(&self) -> String {
        format!("{}s", self.identifier_key())
    }

    /// Whether `name` is this platform's token field, singular or plural.
    pub fn matches_identifier(&self, name: &str) -> bool {
        let key = self.identifier_key();
        name == key || name.strip_suffix('s') == Some(key)
    }

    pub fn allows_override(&self, key: &str) -> bool {
        self.descriptor().allowed_overrides.contains(&key)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        descriptor_for(s)
            .map(|d| d.id)
            .ok_or_else(|| PushError::UnknownPlatform(s.to_string()))
    }
}

/// A named group of recipients independent of device tokens.
///
/// Declared alphabetically; the derived `Ord` is the clause order used
/// when composing the audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudienceType {
    Alias,
    Segment,
    Tag,
}

impl AudienceType {
    /// Every audience type in alphabetical order.
    pub const ALL: [AudienceType; 3] = [AudienceType::Alias, AudienceType::Segment, AudienceType::Tag];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudienceType::Alias => "alias",
            AudienceType::Segment => "segment",
            AudienceType::Tag => "tag",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            AudienceType::Alias => "aliases",
            AudienceType::Segment => "segments",
            AudienceType::Tag => "tags",
        }
    }

    /// Resolve a singular or plural field name.
    pub fn from_field(name: &str) -> Option<AudienceType> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name || t.plural() == name)
    }
}

impl fmt::Display for AudienceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudienceType {
    type Err = PushError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| PushError::UnknownAudienceType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_sorted_by_id() {
        let ids: Vec<&str> = all_platforms().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["android", "blackberry", "ios", "mpns", "wns"]);

        let mut sorted = Platform::ALL;
        sorted.sort();
        assert_eq!(sorted, Platform::ALL);
    }

    #[test]
    fn test_identifier_keys_unique() {
        let mut keys: Vec<&str> = all_platforms().iter().map(|d| d.identifier_key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), all_platforms().len());
    }

    #[test]
    fn test_descriptor_lookup() {
        assert_eq!(descriptor_for("ios").map(|d| d.identifier_key), Some("device_token"));
        assert!(descriptor_for("bad_platform").is_none());
        for platform in Platform::ALL {
            assert_eq!(platform.descriptor().id, platform);
        }
    }

    #[test]
    fn test_identifier_matching() {
        assert!(Platform::Ios.matches_identifier("device_token"));
        assert!(Platform::Ios.matches_identifier("device_tokens"));
        assert!(Platform::Mpns.matches_identifier("mpnss"));
        assert!(Platform::Wns.matches_identifier("wns"));
        assert!(!Platform::Android.matches_identifier("apidss"));
        assert_eq!(Platform::Blackberry.plural_identifier_key(), "device_pins");
    }

    #[test]
    fn test_overlapping_overrides() {
        assert!(Platform::Ios.allows_override("badge"));
        assert!(Platform::Wns.allows_override("badge"));
        assert!(!Platform::Mpns.allows_override("extra"));
    }

    #[test]
    fn test_audience_type_names() {
        assert_eq!(AudienceType::from_field("aliases"), Some(AudienceType::Alias));
        assert_eq!(AudienceType::from_field("segment"), Some(AudienceType::Segment));
        assert_eq!(AudienceType::from_field("aliass"), None);
        assert!("channel".parse::<AudienceType>().is_err());
        assert_eq!("tag".parse::<AudienceType>().ok(), Some(AudienceType::Tag));
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("wns".parse::<Platform>().ok(), Some(Platform::Wns));
        assert!(matches!(
            "bad_platform".parse::<Platform>(),
            Err(PushError::UnknownPlatform(_))
        ));
    }
}
