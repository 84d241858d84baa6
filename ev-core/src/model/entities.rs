//! Stored entities: websites, elements, variants and conditions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Prefix of every issued API key
pub const API_KEY_PREFIX: &str = "ev_";

/// Content given to the default variant created alongside a new element
pub const DEFAULT_VARIANT_CONTENT: &str = "<!-- Default content -->";

/// Name given to the default variant created alongside a new element
pub const DEFAULT_VARIANT_NAME: &str = "Default";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Issue a fresh API key.
///
/// The key is `ev_` followed by 40 hex characters of a SHA-256 digest over
/// two random UUIDs and the issue time.
pub fn generate_api_key() -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let digest = hasher.finalize();
    format!("{}{}", API_KEY_PREFIX, hex::encode(&digest[..20]))
}

/// A tenant's registered site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    pub id: String,
    /// User that registered the site
    pub owner_id: String,
    pub name: String,
    pub domain: String,
    /// Credential the embedded script presents; unique across websites
    pub api_key: String,
    /// Inactive websites are rejected by the integration endpoint
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Website {
    /// Create an active website with a freshly issued API key
    pub fn new(owner_id: impl Into<String>, name: impl Into<String>, domain: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            owner_id: owner_id.into(),
            name: name.into(),
            domain: domain.into(),
            api_key: generate_api_key(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Override the API key (fixtures and imports)
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A CSS-selector-addressed target on a website's pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    pub website_id: String,
    pub selector: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Element {
    pub fn new(website_id: impl Into<String>, selector: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            website_id: website_id.into(),
            selector: selector.into(),
            description: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// One candidate content payload for an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub element_id: String,
    pub name: String,
    /// Opaque payload, typically an HTML fragment
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    pub fn new(element_id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            element_id: element_id.into(),
            name: name.into(),
            content: content.into(),
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The placeholder default variant every new element starts with
    pub fn placeholder_default(element_id: impl Into<String>) -> Self {
        Self::new(element_id, DEFAULT_VARIANT_NAME, DEFAULT_VARIANT_CONTENT).as_default()
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A single predicate attached to a variant
///
/// `condition_type` and `operator` are kept as stored strings; the
/// vocabulary module decides what they mean at write and resolve time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub id: String,
    pub variant_id: String,
    pub condition_type: String,
    pub operator: String,
    #[serde(default)]
    pub value: String,
    /// Weight added to the variant's score when this condition matches
    #[serde(default)]
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Condition {
    pub fn new(
        variant_id: impl Into<String>,
        condition_type: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            variant_id: variant_id.into(),
            condition_type: condition_type.into(),
            operator: operator.into(),
            value: value.into(),
            priority: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
