//! In-memory storage backend (default)

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{EVError, Result};
use crate::model::{Condition, Element, SiteSnapshot, Variant, Website};

use super::{SiteStore, Tables};

/// In-memory storage backend
///
/// Keeps every table in memory behind one `RwLock`; data is lost on restart.
/// Each write holds the lock for its whole duration, so multi-row updates
/// (cascading deletes, default-flag hand-over) are atomic to readers.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing tables (fixtures, file imports)
    pub fn from_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy of every table
    pub fn export(&self) -> Result<Tables> {
        Ok(self.read()?.clone())
    }

    /// Number of websites stored
    pub fn website_count(&self) -> usize {
        self.tables.read().map(|t| t.websites.len()).unwrap_or(0)
    }

    pub(crate) fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| EVError::StorageLocked)
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| EVError::StorageLocked)
    }
}

impl SiteStore for InMemoryStore {
    fn find_active_website_by_api_key(&self, api_key: &str) -> Result<Option<SiteSnapshot>> {
        Ok(self.read()?.find_active_by_api_key(api_key))
    }

    fn load_snapshot(&self, website_id: &str) -> Result<Option<SiteSnapshot>> {
        Ok(self.read()?.load_snapshot(website_id))
    }

    fn get_website(&self, website_id: &str) -> Result<Option<Website>> {
        Ok(self.read()?.website(website_id).cloned())
    }

    fn list_websites(&self, owner_id: &str) -> Result<Vec<Website>> {
        Ok(self.read()?.websites_of(owner_id))
    }

    fn find_website_by_domain(&self, owner_id: &str, domain: &str) -> Result<Option<Website>> {
        Ok(self.read()?.website_by_domain(owner_id, domain).cloned())
    }

    fn save_website(&self, website: &Website) -> Result<()> {
        self.write()?.save_website(website)
    }

    fn delete_website(&self, website_id: &str) -> Result<bool> {
        Ok(self.write()?.delete_website(website_id))
    }

    fn get_element(&self, element_id: &str) -> Result<Option<Element>> {
        Ok(self.read()?.element(element_id).cloned())
    }

    fn list_elements(&self, website_id: &str) -> Result<Vec<Element>> {
        Ok(self.read()?.elements_of(website_id))
    }

    fn save_element(&self, element: &Element) -> Result<()> {
        self.write()?.save_element(element);
        Ok(())
    }

    fn insert_element(&self, element: &Element, default: &Variant) -> Result<()> {
        self.write()?.insert_element(element, default);
        Ok(())
    }

    fn delete_element(&self, element_id: &str) -> Result<bool> {
        Ok(self.write()?.delete_element(element_id))
    }

    fn get_variant(&self, variant_id: &str) -> Result<Option<Variant>> {
        Ok(self.read()?.variant(variant_id).cloned())
    }

    fn list_variants(&self, element_id: &str) -> Result<Vec<Variant>> {
        Ok(self.read()?.variants_of(element_id))
    }

    fn save_variant(&self, variant: &Variant) -> Result<()> {
        self.write()?.save_variant(variant);
        Ok(())
    }

    fn delete_variant(&self, variant_id: &str) -> Result<bool> {
        Ok(self.write()?.delete_variant(variant_id))
    }

    fn get_condition(&self, condition_id: &str) -> Result<Option<Condition>> {
        Ok(self.read()?.condition(condition_id).cloned())
    }

    fn list_conditions(&self, variant_id: &str) -> Result<Vec<Condition>> {
        Ok(self.read()?.conditions_for(variant_id))
    }

    fn save_condition(&self, condition: &Condition) -> Result<()> {
        self.write()?.save_condition(condition);
        Ok(())
    }

    fn delete_condition(&self, condition_id: &str) -> Result<bool> {
        Ok(self.write()?.delete_condition(condition_id))
    }

    fn health_check(&self) -> Result<()> {
        // In-memory is always healthy if we can acquire the lock
        let _tables = self.read()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (InMemoryStore, Website, Element, Variant) {
        let store = InMemoryStore::new();
        let site = Website::new("user-1", "Shop", "shop.example.com").with_api_key("ev_key");
        let element = Element::new(&site.id, "#hero");
        let default = Variant::placeholder_default(&element.id);
        store.save_website(&site).unwrap();
        store.save_element(&element).unwrap();
        store.save_variant(&default).unwrap();
        (store, site, element, default)
    }

    #[test]
    fn test_snapshot_by_api_key() {
        let (store, site, element, _) = seeded();
        let snapshot = store.find_active_website_by_api_key("ev_key").unwrap().unwrap();
        assert_eq!(snapshot.website.id, site.id);
        assert_eq!(snapshot.elements.len(), 1);
        assert_eq!(snapshot.elements[0].element.id, element.id);
        assert_eq!(snapshot.elements[0].variants.len(), 1);
    }

    #[test]
    fn test_inactive_site_is_not_found_by_key() {
        let (store, site, _, _) = seeded();
        store.save_website(&site.clone().with_active(false)).unwrap();
        assert!(store.find_active_website_by_api_key("ev_key").unwrap().is_none());
        assert!(store.load_snapshot(&site.id).unwrap().is_some());
    }

    #[test]
    fn test_saving_default_clears_siblings() {
        let (store, _, element, old_default) = seeded();
        let new_default = Variant::new(&element.id, "Summer", "<p>sun</p>").as_default();
        store.save_variant(&new_default).unwrap();

        let variants = store.list_variants(&element.id).unwrap();
        let defaults: Vec<_> = variants.iter().filter(|v| v.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, new_default.id);
        assert!(!store.get_variant(&old_default.id).unwrap().unwrap().is_default);
    }

    #[test]
    fn test_upsert_keeps_position() {
        let (store, site, element, _) = seeded();
        let second = Element::new(&site.id, "#footer");
        store.save_element(&second).unwrap();

        let mut renamed = element.clone();
        renamed.selector = "#hero-v2".to_string();
        store.save_element(&renamed).unwrap();

        let selectors: Vec<_> = store
            .list_elements(&site.id)
            .unwrap()
            .into_iter()
            .map(|e| e.selector)
            .collect();
        assert_eq!(selectors, vec!["#hero-v2", "#footer"]);
    }

    #[test]
    fn test_delete_website_cascades() {
        let (store, site, element, default) = seeded();
        let condition = Condition::new(&default.id, "path", "equals", "/");
        store.save_condition(&condition).unwrap();

        assert!(store.delete_website(&site.id).unwrap());
        assert!(store.get_element(&element.id).unwrap().is_none());
        assert!(store.get_variant(&default.id).unwrap().is_none());
        assert!(store.get_condition(&condition.id).unwrap().is_none());
        assert!(!store.delete_website(&site.id).unwrap());
    }

    #[test]
    fn test_api_key_must_be_unique() {
        let (store, _, _, _) = seeded();
        let clash = Website::new("user-2", "Other", "other.example.com").with_api_key("ev_key");
        assert!(store.save_website(&clash).is_err());
    }

    #[test]
    fn test_domain_lookup_is_per_owner() {
        let (store, site, _, _) = seeded();
        assert_eq!(
            store
                .find_website_by_domain("user-1", "shop.example.com")
                .unwrap()
                .map(|w| w.id),
            Some(site.id)
        );
        assert!(store
            .find_website_by_domain("user-2", "shop.example.com")
            .unwrap()
            .is_none());
    }
}
