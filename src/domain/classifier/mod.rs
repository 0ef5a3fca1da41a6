//! Routes an arbitrary field name to the store it belongs in.

use crate::domain::platform::{all_platforms, AudienceType, Platform};

/// Where a named field is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldClass {
    /// Registration tokens for one platform
    Token(Platform),
    /// Audience selector values
    AudienceSelector(AudienceType),
    /// Override valid on every listed platform, in registry order
    Override(Vec<Platform>),
    /// Opaque extra, broadcast to present platforms
    Extra,
}

/// Classify a field name.
///
/// Token names win over selector names, which win over override keys.
/// An override key may match several platforms at once (`badge` is valid
/// for both ios and wns).
pub fn classify(name: &str) -> FieldClass {
    if let Some(descriptor) = all_platforms()
        .iter()
        .find(|d| d.id.matches_identifier(name))
    {
        return FieldClass::Token(descriptor.id);
    }

    if let Some(audience_type) = AudienceType::from_field(name) {
        return FieldClass::AudienceSelector(audience_type);
    }

    let platforms: Vec<Platform> = all_platforms()
        .iter()
        .filter(|d| d.allowed_overrides.contains(&name))
        .map(|d| d.id)
        .collect();

    if platforms.is_empty() {
        FieldClass::Extra
    } else {
        FieldClass::Override(platforms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_fields() {
        assert_eq!(classify("device_token"), FieldClass::Token(Platform::Ios));
        assert_eq!(classify("apids"), FieldClass::Token(Platform::Android));
        assert_eq!(classify("device_pins"), FieldClass::Token(Platform::Blackberry));
        assert_eq!(classify("mpns"), FieldClass::Token(Platform::Mpns));
        assert_eq!(classify("wnss"), FieldClass::Token(Platform::Wns));
    }

    #[test]
    fn test_audience_fields() {
        assert_eq!(classify("tag"), FieldClass::AudienceSelector(AudienceType::Tag));
        assert_eq!(classify("aliases"), FieldClass::AudienceSelector(AudienceType::Alias));
        assert_eq!(classify("segments"), FieldClass::AudienceSelector(AudienceType::Segment));
    }

    #[test]
    fn test_single_platform_override() {
        assert_eq!(classify("sound"), FieldClass::Override(vec![Platform::Ios]));
        assert_eq!(classify("collapse_key"), FieldClass::Override(vec![Platform::Android]));
    }

    #[test]
    fn test_multi_platform_override() {
        assert_eq!(
            classify("badge"),
            FieldClass::Override(vec![Platform::Ios, Platform::Wns])
        );
        assert_eq!(
            classify("extra"),
            FieldClass::Override(vec![Platform::Android, Platform::Ios])
        );
        assert_eq!(
            classify("tile"),
            FieldClass::Override(vec![Platform::Mpns, Platform::Wns])
        );
    }

    #[test]
    fn test_extra_fallback() {
        assert_eq!(classify("something"), FieldClass::Extra);
        assert_eq!(classify(""), FieldClass::Extra);
        assert_eq!(classify("Badge"), FieldClass::Extra);
    }
}
