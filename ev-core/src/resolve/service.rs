//! Integration service - what the embedded script talks to
//!
//! Authenticates a site by API key, loads its snapshot once, and resolves
//! every element against the visitor's context.

use std::sync::Arc;

use crate::context::RequestContext;
use crate::error::{EVError, Result};
use crate::model::SiteSnapshot;
use crate::storage::SiteStore;

use super::{resolve_site, SiteResolution};

/// A website that presented a valid API key, with the snapshot loaded for it
///
/// Created only by [`IntegrationService::authenticate`] and passed explicitly
/// to [`IntegrationService::resolve`].
#[derive(Debug, Clone)]
pub struct AuthenticatedSite {
    snapshot: SiteSnapshot,
}

impl AuthenticatedSite {
    pub fn website_id(&self) -> &str {
        &self.snapshot.website.id
    }

    pub fn snapshot(&self) -> &SiteSnapshot {
        &self.snapshot
    }
}

/// Resolves variants for embedded-script requests
#[derive(Clone)]
pub struct IntegrationService {
    store: Arc<dyn SiteStore>,
}

impl IntegrationService {
    pub fn new(store: Arc<dyn SiteStore>) -> Self {
        Self { store }
    }

    /// Authenticate a site by API key.
    ///
    /// A missing or blank key is [`EVError::MissingApiKey`]. Any other key is
    /// compared exactly as presented; an unknown key and a key belonging to
    /// an inactive website are both [`EVError::InvalidApiKey`].
    pub fn authenticate(&self, api_key: Option<&str>) -> Result<AuthenticatedSite> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(EVError::MissingApiKey)?;

        let snapshot = self
            .store
            .find_active_website_by_api_key(api_key)?
            .filter(|s| s.website.active)
            .ok_or(EVError::InvalidApiKey)?;

        Ok(AuthenticatedSite { snapshot })
    }

    /// Resolve every element of an authenticated site
    pub fn resolve(&self, site: &AuthenticatedSite, context: &RequestContext) -> SiteResolution {
        resolve_site(&site.snapshot, context)
    }

    /// Authenticate and resolve in one step
    pub fn serve(&self, api_key: Option<&str>, context: &RequestContext) -> Result<SiteResolution> {
        let site = self.authenticate(api_key)?;
        Ok(self.resolve(&site, context))
    }
}

impl std::fmt::Debug for IntegrationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationService")
            .field("store", &self.store.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Element, Variant, Website};
    use crate::storage::{InMemoryStore, SiteStore};

    fn store_with_site(active: bool) -> (Arc<InMemoryStore>, Website) {
        let store = Arc::new(InMemoryStore::new());
        let site = Website::new("user-1", "Shop", "shop.example.com")
            .with_api_key("ev_test")
            .with_active(active);
        let element = Element::new(&site.id, "#hero");
        store.save_website(&site).unwrap();
        store.save_element(&element).unwrap();
        store
            .save_variant(&Variant::new(&element.id, "Default", "<h1>Hi</h1>").as_default())
            .unwrap();
        (store, site)
    }

    #[test]
    fn test_missing_key() {
        let (store, _) = store_with_site(true);
        let service = IntegrationService::new(store);
        assert!(matches!(service.authenticate(None), Err(EVError::MissingApiKey)));
        assert!(matches!(service.authenticate(Some("  ")), Err(EVError::MissingApiKey)));
    }

    #[test]
    fn test_key_is_compared_exactly() {
        let (store, _) = store_with_site(true);
        let service = IntegrationService::new(store);
        assert!(service.authenticate(Some("ev_test")).is_ok());
        assert!(matches!(service.authenticate(Some(" ev_test ")), Err(EVError::InvalidApiKey)));
        assert!(matches!(service.authenticate(Some("EV_TEST")), Err(EVError::InvalidApiKey)));
    }

    #[test]
    fn test_unknown_and_inactive_are_indistinguishable() {
        let (store, _) = store_with_site(false);
        let service = IntegrationService::new(store);

        let inactive = service.authenticate(Some("ev_test")).unwrap_err();
        let unknown = service.authenticate(Some("ev_nope")).unwrap_err();
        assert_eq!(inactive.to_error_response(), unknown.to_error_response());
        assert_eq!(inactive.http_status_code(), 401);
    }

    #[test]
    fn test_serve_resolves_elements() {
        let (store, site) = store_with_site(true);
        let service = IntegrationService::new(store);

        let authenticated = service.authenticate(Some("ev_test")).unwrap();
        assert_eq!(authenticated.website_id(), site.id);

        let resolution = service.serve(Some("ev_test"), &RequestContext::new()).unwrap();
        assert_eq!(resolution.variants.len(), 1);
        assert_eq!(resolution.variants[0].content, "<h1>Hi</h1>");
    }
}
