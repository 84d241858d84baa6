//! Pluggable Storage Backend
//!
//! The resolver only ever reads a consistent snapshot of one website; the
//! catalog performs the writes. Both go through [`SiteStore`]. The default is
//! in-memory storage; [`FileStore`] keeps the same tables in a JSON file.
//!
//! # Example
//!
//! ```rust
//! use ev_core::storage::{InMemoryStore, SiteStore};
//!
//! let store = InMemoryStore::new();
//! assert!(store.find_active_website_by_api_key("ev_unknown").unwrap().is_none());
//! ```

mod file;
mod memory;
mod tables;

pub use file::FileStore;
pub use memory::InMemoryStore;
pub use tables::Tables;

use crate::error::Result;
use crate::model::{Condition, Element, SiteSnapshot, Variant, Website};

/// Storage backend trait for websites and their nested configuration
///
/// Implement this trait to add custom persistence backends.
/// All methods take `&self` to allow for interior mutability patterns.
/// List methods return rows in insertion order unless stated otherwise.
pub trait SiteStore: Send + Sync {
    /// Load the full snapshot of the active website owning `api_key`
    fn find_active_website_by_api_key(&self, api_key: &str) -> Result<Option<SiteSnapshot>>;

    /// Load the full snapshot of a website regardless of its active flag
    fn load_snapshot(&self, website_id: &str) -> Result<Option<SiteSnapshot>>;

    fn get_website(&self, website_id: &str) -> Result<Option<Website>>;

    /// Websites registered by `owner_id`
    fn list_websites(&self, owner_id: &str) -> Result<Vec<Website>>;

    /// The website `owner_id` registered for `domain`, if any
    fn find_website_by_domain(&self, owner_id: &str, domain: &str) -> Result<Option<Website>>;

    /// Insert or replace a website
    fn save_website(&self, website: &Website) -> Result<()>;

    /// Delete a website with its elements, variants and conditions
    fn delete_website(&self, website_id: &str) -> Result<bool>;

    fn get_element(&self, element_id: &str) -> Result<Option<Element>>;

    fn list_elements(&self, website_id: &str) -> Result<Vec<Element>>;

    fn save_element(&self, element: &Element) -> Result<()>;

    /// Insert a new element and its default variant in one write
    fn insert_element(&self, element: &Element, default: &Variant) -> Result<()>;

    /// Delete an element with its variants and conditions
    fn delete_element(&self, element_id: &str) -> Result<bool>;

    fn get_variant(&self, variant_id: &str) -> Result<Option<Variant>>;

    fn list_variants(&self, element_id: &str) -> Result<Vec<Variant>>;

    /// Insert or replace a variant.
    ///
    /// Saving a default variant clears the default flag of every sibling in
    /// the same write, so an element never has two defaults.
    fn save_variant(&self, variant: &Variant) -> Result<()>;

    /// Delete a variant with its conditions
    fn delete_variant(&self, variant_id: &str) -> Result<bool>;

    fn get_condition(&self, condition_id: &str) -> Result<Option<Condition>>;

    fn list_conditions(&self, variant_id: &str) -> Result<Vec<Condition>>;

    fn save_condition(&self, condition: &Condition) -> Result<()>;

    fn delete_condition(&self, condition_id: &str) -> Result<bool>;

    /// Check if backend is healthy
    fn health_check(&self) -> Result<()>;

    /// Get backend name (for logging/debugging)
    fn name(&self) -> &'static str;
}
