//! # Element Variants Core
//!
//! Element Variants lets a site owner attach alternative content to parts of
//! their pages and have the right alternative chosen for each visitor:
//!
//! - **Websites** are registered by a user and authenticate the embedded
//!   script through an API key
//! - **Elements** are CSS selectors on the site's pages
//! - **Variants** are candidate contents for an element; exactly one is the
//!   default
//! - **Conditions** are weighted predicates over the visitor's context
//!
//! ## Core Rule
//!
//! > A variant is served only if every one of its conditions matches; among
//! > those, the highest total priority wins, and the default covers the rest.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ev_core::{
//!     Catalog, IntegrationService, InMemoryStore, NewCondition, NewElement, NewVariant,
//!     NewWebsite, Principal, RequestContext,
//! };
//!
//! let store = Arc::new(InMemoryStore::new());
//! let catalog = Catalog::new(store.clone());
//! let owner = Principal::new("user-1");
//!
//! // Register a site with one element and a mobile-only variant
//! let site = catalog
//!     .create_website(&owner, NewWebsite {
//!         name: Some("Shop".into()),
//!         domain: Some("shop.example.com".into()),
//!     })
//!     .unwrap();
//! let hero = catalog
//!     .create_element(&owner, NewElement {
//!         website_id: Some(site.id.clone()),
//!         selector: Some("#hero".into()),
//!         description: None,
//!     })
//!     .unwrap();
//! let mobile = catalog
//!     .create_variant(&owner, NewVariant {
//!         element_id: Some(hero.element.id.clone()),
//!         name: Some("Mobile".into()),
//!         content: Some("<h1>Tap to shop</h1>".into()),
//!         is_default: None,
//!     })
//!     .unwrap();
//! catalog
//!     .create_condition(&owner, NewCondition {
//!         variant_id: Some(mobile.id.clone()),
//!         condition_type: Some("device".into()),
//!         operator: Some("equals".into()),
//!         value: Some("mobile".into()),
//!         priority: Some(5),
//!     })
//!     .unwrap();
//!
//! // What the embedded script receives on a phone
//! let service = IntegrationService::new(store);
//! let context = RequestContext::new()
//!     .with_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X)")
//!     .with_screen(390.0, 844.0);
//! let resolution = service.serve(Some(site.api_key.as_str()), &context).unwrap();
//! assert_eq!(resolution.variants[0].selector, "#hero");
//! assert_eq!(resolution.variants[0].content, "<h1>Tap to shop</h1>");
//! ```

pub mod catalog;
pub mod context;
pub mod error;
pub mod model;
pub mod resolve;
pub mod storage;
pub mod vocabulary;

// Re-export main types
pub use catalog::{
    Catalog, ConditionPatch, ElementPatch, NewCondition, NewElement, NewVariant, NewWebsite,
    Principal, VariantPatch, WebsitePatch,
};
pub use context::{classify_device, DeviceClass, RequestContext};
pub use error::{EVError, ElementResolutionError, ErrorCategory, ErrorResponse, Result};
pub use model::{
    Condition, Element, ElementSnapshot, SiteSnapshot, Variant, VariantSnapshot, Website,
};
pub use resolve::{
    explain_element, resolve_element, resolve_site, AuthenticatedSite, ElementReport,
    IntegrationService, ResolvedVariant, SiteResolution,
};
pub use storage::{FileStore, InMemoryStore, SiteStore};
pub use vocabulary::{ConditionType, Operator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
