//! Variant resolution
//!
//! ## Resolution Flow
//!
//! 1. The embedded script posts its context with the site's API key
//! 2. [`IntegrationService`] authenticates the key against active websites
//! 3. The site's snapshot is loaded once from the store
//! 4. Each element is resolved independently ([`resolve_element`])
//! 5. Results are folded into a [`SiteResolution`]; malformed elements are
//!    recorded as failures and skipped

mod resolution;
mod resolver;
mod service;

pub use resolution::{
    ElementReport, ResolvedVariant, SiteResolution, VariantOutcome, VariantReport,
};
pub use resolver::{
    explain_element, resolve_element, resolve_site, score_variant, select_variant,
    NO_MATCH_PRIORITY,
};
pub use service::{AuthenticatedSite, IntegrationService};
