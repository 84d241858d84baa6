//! File-based storage backend (single JSON document)

use std::path::{Path, PathBuf};

use crate::error::{EVError, Result};
use crate::model::{Condition, Element, SiteSnapshot, Variant, Website};

use super::{InMemoryStore, SiteStore, Tables};

/// File-based storage backend
///
/// Serves reads from memory and rewrites the whole JSON document after every
/// write (temp file + rename). Suitable for development and small-scale
/// deployments.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl FileStore {
    /// Open the store at `path`, creating an empty one if the file is missing
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let tables = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| EVError::IoError {
                message: format!("Failed to read store file {}: {}", path.display(), e),
            })?;
            if content.trim().is_empty() {
                Tables::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| EVError::IoError {
                    message: format!("Failed to create storage directory: {}", e),
                })?;
            }
            Tables::default()
        };

        tracing::info!(
            path = %path.display(),
            websites = tables.websites.len(),
            "opened file store"
        );

        Ok(Self {
            path,
            inner: InMemoryStore::from_tables(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply a write to a copy of the tables and swap it in only once the
    /// copy is on disk. Readers never see a write that failed to persist.
    fn write_with<T>(&self, op: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut tables = self.inner.write()?;
        let mut next = tables.clone();
        let out = op(&mut next)?;
        self.persist(&next)?;
        *tables = next;
        Ok(out)
    }

    fn persist(&self, tables: &Tables) -> Result<()> {
        let json = serde_json::to_string_pretty(tables)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| EVError::IoError {
            message: format!("Failed to write {}: {}", tmp.display(), e),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| EVError::IoError {
            message: format!("Failed to replace {}: {}", self.path.display(), e),
        })?;
        Ok(())
    }
}

impl SiteStore for FileStore {
    fn find_active_website_by_api_key(&self, api_key: &str) -> Result<Option<SiteSnapshot>> {
        self.inner.find_active_website_by_api_key(api_key)
    }

    fn load_snapshot(&self, website_id: &str) -> Result<Option<SiteSnapshot>> {
        self.inner.load_snapshot(website_id)
    }

    fn get_website(&self, website_id: &str) -> Result<Option<Website>> {
        self.inner.get_website(website_id)
    }

    fn list_websites(&self, owner_id: &str) -> Result<Vec<Website>> {
        self.inner.list_websites(owner_id)
    }

    fn find_website_by_domain(&self, owner_id: &str, domain: &str) -> Result<Option<Website>> {
        self.inner.find_website_by_domain(owner_id, domain)
    }

    fn save_website(&self, website: &Website) -> Result<()> {
        self.write_with(|t| t.save_website(website))
    }

    fn delete_website(&self, website_id: &str) -> Result<bool> {
        self.write_with(|t| Ok(t.delete_website(website_id)))
    }

    fn get_element(&self, element_id: &str) -> Result<Option<Element>> {
        self.inner.get_element(element_id)
    }

    fn list_elements(&self, website_id: &str) -> Result<Vec<Element>> {
        self.inner.list_elements(website_id)
    }

    fn save_element(&self, element: &Element) -> Result<()> {
        self.write_with(|t| {
            t.save_element(element);
            Ok(())
        })
    }

    fn insert_element(&self, element: &Element, default: &Variant) -> Result<()> {
        self.write_with(|t| {
            t.insert_element(element, default);
            Ok(())
        })
    }

    fn delete_element(&self, element_id: &str) -> Result<bool> {
        self.write_with(|t| Ok(t.delete_element(element_id)))
    }

    fn get_variant(&self, variant_id: &str) -> Result<Option<Variant>> {
        self.inner.get_variant(variant_id)
    }

    fn list_variants(&self, element_id: &str) -> Result<Vec<Variant>> {
        self.inner.list_variants(element_id)
    }

    fn save_variant(&self, variant: &Variant) -> Result<()> {
        self.write_with(|t| {
            t.save_variant(variant);
            Ok(())
        })
    }

    fn delete_variant(&self, variant_id: &str) -> Result<bool> {
        self.write_with(|t| Ok(t.delete_variant(variant_id)))
    }

    fn get_condition(&self, condition_id: &str) -> Result<Option<Condition>> {
        self.inner.get_condition(condition_id)
    }

    fn list_conditions(&self, variant_id: &str) -> Result<Vec<Condition>> {
        self.inner.list_conditions(variant_id)
    }

    fn save_condition(&self, condition: &Condition) -> Result<()> {
        self.write_with(|t| {
            t.save_condition(condition);
            Ok(())
        })
    }

    fn delete_condition(&self, condition_id: &str) -> Result<bool> {
        self.write_with(|t| Ok(t.delete_condition(condition_id)))
    }

    fn health_check(&self) -> Result<()> {
        self.inner.health_check()?;
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) if !dir.is_dir() => Err(EVError::IoError {
                message: format!("Storage directory missing: {}", dir.display()),
            }),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.json");

        let site = Website::new("user-1", "Shop", "shop.example.com").with_api_key("ev_file");
        let element = Element::new(&site.id, "#hero");
        {
            let store = FileStore::open(&path).unwrap();
            store.save_website(&site).unwrap();
            store.save_element(&element).unwrap();
            store
                .save_variant(&Variant::placeholder_default(&element.id))
                .unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        let snapshot = reopened.find_active_website_by_api_key("ev_file").unwrap().unwrap();
        assert_eq!(snapshot.website, site);
        assert_eq!(snapshot.elements[0].element.selector, "#hero");
        assert!(snapshot.elements[0].variants[0].is_default());
        assert!(!dir.path().join("sites.json.tmp").exists());
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/sites.json");
        let store = FileStore::open(&path).unwrap();
        store.health_check().unwrap();
        store
            .save_website(&Website::new("u", "Shop", "shop.example.com"))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(EVError::JsonError(_))));
    }

    #[test]
    fn test_failed_persist_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        let store = FileStore::open(sub.join("sites.json")).unwrap();
        std::fs::remove_dir_all(&sub).unwrap();

        let site = Website::new("user-1", "Shop", "shop.example.com").with_api_key("ev_x");
        assert!(matches!(store.save_website(&site), Err(EVError::IoError { .. })));
        assert!(store.find_active_website_by_api_key("ev_x").unwrap().is_none());
        assert!(store.list_websites("user-1").unwrap().is_empty());
    }

    #[test]
    fn test_cascade_delete_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.json");
        let site = Website::new("user-1", "Shop", "shop.example.com");
        let element = Element::new(&site.id, "#hero");
        {
            let store = FileStore::open(&path).unwrap();
            store.save_website(&site).unwrap();
            store.save_element(&element).unwrap();
            store.delete_website(&site.id).unwrap();
        }
        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get_element(&element.id).unwrap().is_none());
        assert!(reopened.list_websites("user-1").unwrap().is_empty());
    }
}
