//! Data model
//!
//! Website 1..* Element 1..* Variant 1..* Condition. The flat entities are what
//! the store persists; the snapshot types are the nested, immutable view the
//! resolver consumes for a single request.

mod entities;
mod snapshot;

pub use entities::{
    generate_api_key, Condition, Element, Variant, Website, API_KEY_PREFIX,
    DEFAULT_VARIANT_CONTENT, DEFAULT_VARIANT_NAME,
};
pub use snapshot::{ElementSnapshot, SiteSnapshot, VariantSnapshot};
