//! Context extraction - maps a request context to the value a condition inspects

use std::borrow::Cow;

use super::RequestContext;
use crate::vocabulary::ConditionType;

/// Viewports wider than this (in CSS pixels) on a mobile user agent are tablets
pub const TABLET_MIN_WIDTH: f64 = 768.0;

/// User agent tokens that mark a handheld device (matched case-insensitively)
const MOBILE_TOKENS: [&str; 8] = [
    "mobile",
    "android",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Heuristic device class of a page view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Tablet => "tablet",
            DeviceClass::Desktop => "desktop",
        }
    }
}

/// Classify a page view from its user agent and viewport width.
///
/// A user agent carrying a mobile token is a tablet when the viewport is
/// wider than [`TABLET_MIN_WIDTH`], a phone otherwise. Anything else is a
/// desktop.
pub fn classify_device(user_agent: &str, screen_width: f64) -> DeviceClass {
    let user_agent = user_agent.to_lowercase();
    if !MOBILE_TOKENS.iter().any(|token| user_agent.contains(token)) {
        return DeviceClass::Desktop;
    }
    if screen_width > TABLET_MIN_WIDTH {
        DeviceClass::Tablet
    } else {
        DeviceClass::Mobile
    }
}

/// Extract the value a condition of `condition_type` compares against.
///
/// Unknown condition types, and known ones the extractor does not implement,
/// yield the empty string.
pub fn extract<'a>(context: &'a RequestContext, condition_type: &str) -> Cow<'a, str> {
    let Some(condition_type) = ConditionType::parse(condition_type) else {
        return Cow::Borrowed("");
    };

    match condition_type {
        ConditionType::Url => Cow::Borrowed(context.url.as_str()),
        ConditionType::Path => Cow::Borrowed(context.path.as_str()),
        ConditionType::Referrer => Cow::Borrowed(context.referrer.as_str()),
        ConditionType::Language => Cow::Borrowed(context.language.as_str()),
        ConditionType::Device => {
            Cow::Borrowed(classify_device(&context.user_agent, context.screen_width).as_str())
        }
        _ => Cow::Borrowed(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
    const DESKTOP_CHROME: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0 Safari/537.36";

    #[test]
    fn test_device_classification() {
        let wide = RequestContext::new().with_user_agent(IPHONE).with_screen(1024.0, 768.0);
        assert_eq!(extract(&wide, "device"), "tablet");

        let narrow = RequestContext::new().with_user_agent(IPHONE).with_screen(400.0, 800.0);
        assert_eq!(extract(&narrow, "device"), "mobile");

        let desktop = RequestContext::new()
            .with_user_agent(DESKTOP_CHROME)
            .with_screen(1920.0, 1080.0);
        assert_eq!(extract(&desktop, "device"), "desktop");
    }

    #[test]
    fn test_tablet_threshold_is_exclusive() {
        assert_eq!(classify_device("Android", 768.0), DeviceClass::Mobile);
        assert_eq!(classify_device("Android", 768.5), DeviceClass::Tablet);
    }

    #[test]
    fn test_mobile_tokens_are_case_insensitive() {
        assert_eq!(classify_device("OPERA MINI/4.0", 320.0), DeviceClass::Mobile);
        assert_eq!(classify_device("BlackBerry9700", 0.0), DeviceClass::Mobile);
        assert_eq!(classify_device("", 0.0), DeviceClass::Desktop);
    }

    #[test]
    fn test_passthrough_fields() {
        let ctx = RequestContext::new()
            .with_url("https://example.com/a")
            .with_path("/a")
            .with_referrer("https://ref.example")
            .with_language("de-DE");
        assert_eq!(extract(&ctx, "url"), "https://example.com/a");
        assert_eq!(extract(&ctx, "path"), "/a");
        assert_eq!(extract(&ctx, "referrer"), "https://ref.example");
        assert_eq!(extract(&ctx, "language"), "de-DE");
    }

    #[test]
    fn test_unimplemented_and_unknown_types_are_empty() {
        let ctx = RequestContext::new()
            .with_user_agent(DESKTOP_CHROME)
            .with_url("https://example.com");
        for t in ConditionType::ALL.iter().filter(|t| !t.is_extracted()) {
            assert_eq!(extract(&ctx, t.as_str()), "", "{} should extract nothing", t);
        }
        assert_eq!(extract(&ctx, "user_agent"), "");
        assert_eq!(extract(&ctx, "device_type"), "");
        assert_eq!(extract(&ctx, ""), "");
    }
}
