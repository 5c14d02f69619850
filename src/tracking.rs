//! Tracking policy advertised by the newsroom page, and the consent rules it implies.

use scraper::{Html, Selector};
use std::sync::LazyLock;

static POLICY_META: LazyLock<Option<Selector>> =
    LazyLock::new(|| Selector::parse(r#"meta[name="prezly:tracking_policy"]"#).ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingPolicy {
    Strict,
    Default,
    Lenient,
    #[default]
    Unrestricted,
}

impl TrackingPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "default" => Some(Self::Default),
            "lenient" => Some(Self::Lenient),
            "wild-west" | "unrestricted" => Some(Self::Unrestricted),
            _ => None,
        }
    }

    /// Policy from the page's `prezly:tracking_policy` meta tag; unrestricted
    /// when the tag is missing or unreadable.
    pub fn from_html(html: &str) -> Self {
        let Some(selector) = POLICY_META.as_ref() else {
            return Self::default();
        };
        let document = Html::parse_document(html);
        document
            .select(selector)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .and_then(Self::parse)
            .unwrap_or_default()
    }

    /// Strict and default policies need an explicit opt-in.
    pub fn requires_consent(self) -> bool {
        matches!(self, Self::Strict | Self::Default)
    }

    /// Whether reading history may be stored, given the visitor's answer (if asked).
    pub fn allows_tracking(self, consent: Option<bool>) -> bool {
        match consent {
            Some(answer) => answer,
            None => !self.requires_consent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_meta_tag() {
        let html = r#"<html><head>
            <meta charset="utf-8">
            <meta content="strict" name="prezly:tracking_policy" />
        </head></html>"#;
        assert_eq!(TrackingPolicy::from_html(html), TrackingPolicy::Strict);
    }

    #[test]
    fn test_missing_or_unknown_is_unrestricted() {
        assert_eq!(
            TrackingPolicy::from_html("<html></html>"),
            TrackingPolicy::Unrestricted
        );
        let html = r#"<meta name="prezly:tracking_policy" content="whatever">"#;
        assert_eq!(TrackingPolicy::from_html(html), TrackingPolicy::Unrestricted);
    }

    #[test]
    fn test_wild_west_alias() {
        let html = r#"<meta name='prezly:tracking_policy' content='wild-west'>"#;
        assert_eq!(TrackingPolicy::from_html(html), TrackingPolicy::Unrestricted);
    }

    #[test]
    fn test_commented_out_tag_is_ignored() {
        let html = r#"<html><head>
            <!-- <meta name="prezly:tracking_policy" content="strict"> -->
            <meta name="prezly:tracking_policy" content="lenient">
        </head></html>"#;
        assert_eq!(TrackingPolicy::from_html(html), TrackingPolicy::Lenient);
    }

    #[test]
    fn test_angle_bracket_inside_attribute() {
        let html = r#"<meta data-note="a>b" name="prezly:tracking_policy" content="strict">"#;
        assert_eq!(TrackingPolicy::from_html(html), TrackingPolicy::Strict);
    }

    #[test]
    fn test_consent_rules() {
        assert!(!TrackingPolicy::Strict.allows_tracking(None));
        assert!(!TrackingPolicy::Default.allows_tracking(None));
        assert!(TrackingPolicy::Lenient.allows_tracking(None));
        assert!(TrackingPolicy::Strict.allows_tracking(Some(true)));
        assert!(!TrackingPolicy::Unrestricted.allows_tracking(Some(false)));
    }
}
