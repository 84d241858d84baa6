//! Request context and condition matching
//!
//! The embedded script reports where and on what kind of device the page is
//! being viewed. The extractor turns that report into the scalar a given
//! condition type inspects, and the evaluator compares it against the
//! condition's value.

mod evaluator;
mod extractor;

pub use evaluator::{evaluate, matches, MAX_PATTERN_SIZE};
pub use extractor::{classify_device, extract, DeviceClass, TABLET_MIN_WIDTH};

use serde::{Deserialize, Deserializer, Serialize};

/// Context reported by the embedded script for one page view
///
/// Every field is optional on the wire. Missing fields and JSON `null`
/// both fall back to the empty string or zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub referrer: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_agent: String,
    #[serde(deserialize_with = "null_as_default")]
    pub language: String,
    /// Viewport width in CSS pixels
    #[serde(deserialize_with = "null_as_default")]
    pub screen_width: f64,
    /// Viewport height in CSS pixels
    #[serde(deserialize_with = "null_as_default")]
    pub screen_height: f64,
    /// Client clock at request time; accepted but not used by any condition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = referrer.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_screen(mut self, width: f64, height: f64) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    /// Parse a raw request body. An empty body is an empty context.
    pub fn from_json_bytes(body: &[u8]) -> serde_json::Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
