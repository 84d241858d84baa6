//! Catalog: management of websites, elements, variants and conditions
//!
//! Every operation runs on behalf of a [`Principal`]. Websites answer 403 to
//! other owners; everything nested below a website answers "not found or not
//! owned" so foreign ids cannot be probed.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ev_core::catalog::{Catalog, NewElement, NewWebsite, Principal};
//! use ev_core::storage::InMemoryStore;
//!
//! let catalog = Catalog::new(Arc::new(InMemoryStore::new()));
//! let owner = Principal::new("user-1");
//!
//! let site = catalog
//!     .create_website(&owner, NewWebsite {
//!         name: Some("Shop".into()),
//!         domain: Some("shop.example.com".into()),
//!     })
//!     .unwrap();
//! assert!(site.api_key.starts_with("ev_"));
//!
//! let element = catalog
//!     .create_element(&owner, NewElement {
//!         website_id: Some(site.id.clone()),
//!         selector: Some("#hero".into()),
//!         description: None,
//!     })
//!     .unwrap();
//! assert_eq!(element.variants.len(), 1);
//! assert!(element.variants[0].is_default());
//! ```

mod inputs;
pub mod validator;

pub use inputs::{
    ConditionPatch, ElementPatch, NewCondition, NewElement, NewVariant, NewWebsite,
    VariantPatch, WebsitePatch,
};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EVError, Result};
use crate::model::{
    generate_api_key, Condition, Element, ElementSnapshot, SiteSnapshot, Variant,
    VariantSnapshot, Website,
};
use crate::storage::SiteStore;

/// The authenticated user performing a management call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    fn owns(&self, website: &Website) -> bool {
        website.owner_id == self.user_id
    }
}

/// Management operations over a [`SiteStore`]
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn SiteStore>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("store", &self.store.name())
            .finish()
    }
}

impl Catalog {
    pub fn new(store: Arc<dyn SiteStore>) -> Self {
        Self { store }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Websites
    // ═══════════════════════════════════════════════════════════════════════

    /// Register a website and issue its API key
    pub fn create_website(&self, principal: &Principal, input: NewWebsite) -> Result<Website> {
        let (Some(name), Some(domain)) = (input.name.as_deref(), input.domain.as_deref()) else {
            return Err(EVError::invalid("Name and domain are required"));
        };
        let name = validator::required(Some(name), "Name and domain are required")?;
        let domain = validator::domain(domain)?;

        if self
            .store
            .find_website_by_domain(&principal.user_id, &domain)?
            .is_some()
        {
            return Err(EVError::DomainAlreadyRegistered { domain });
        }

        let website = Website::new(&principal.user_id, name, domain);
        self.store.save_website(&website)?;
        tracing::info!(
            website_id = %website.id,
            domain = %website.domain,
            owner = %principal.user_id,
            "website registered"
        );
        Ok(website)
    }

    /// The caller's websites, newest first
    pub fn list_websites(&self, principal: &Principal) -> Result<Vec<Website>> {
        let mut websites = self.store.list_websites(&principal.user_id)?;
        websites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(websites)
    }

    /// A website with its elements, variants and conditions
    pub fn get_website(&self, principal: &Principal, website_id: &str) -> Result<SiteSnapshot> {
        self.owned_website(principal, website_id)?;
        let mut snapshot = self
            .store
            .load_snapshot(website_id)?
            .ok_or_else(|| EVError::WebsiteNotFound {
                website_id: website_id.to_string(),
            })?;
        for element in &mut snapshot.elements {
            order_variants(&mut element.variants, |v| v.is_default());
            for variant in &mut element.variants {
                variant.conditions.sort_by_key(|c| c.priority);
            }
        }
        Ok(snapshot)
    }

    pub fn update_website(
        &self,
        principal: &Principal,
        website_id: &str,
        patch: WebsitePatch,
    ) -> Result<Website> {
        if patch.is_empty() {
            return Err(EVError::invalid("At least one field must be provided"));
        }
        let mut website = self.owned_website(principal, website_id)?;

        if let Some(name) = patch.name.as_deref() {
            website.name = validator::required(Some(name), "Name cannot be empty")?.to_string();
        }
        if let Some(domain) = patch.domain.as_deref() {
            let domain = validator::domain(domain)?;
            let taken = self
                .store
                .find_website_by_domain(&principal.user_id, &domain)?
                .is_some_and(|other| other.id != website.id);
            if taken {
                return Err(EVError::DomainAlreadyRegistered { domain });
            }
            website.domain = domain;
        }
        if let Some(active) = patch.active {
            website.active = active;
        }

        website.touch();
        self.store.save_website(&website)?;
        Ok(website)
    }

    /// Delete a website with everything configured under it
    pub fn delete_website(&self, principal: &Principal, website_id: &str) -> Result<()> {
        self.owned_website(principal, website_id)?;
        self.store.delete_website(website_id)?;
        tracing::info!(website_id, "website deleted");
        Ok(())
    }

    /// Issue a new API key; the previous key stops authenticating at once
    pub fn rotate_api_key(&self, principal: &Principal, website_id: &str) -> Result<Website> {
        let mut website = self.owned_website(principal, website_id)?;
        website.api_key = generate_api_key();
        website.touch();
        self.store.save_website(&website)?;
        tracing::info!(website_id, "api key rotated");
        Ok(website)
    }

    /// HTML snippet the tenant pastes into their pages
    pub fn snippet(&self, principal: &Principal, website_id: &str, base_url: &str) -> Result<String> {
        let website = self.owned_website(principal, website_id)?;
        Ok(embed_snippet(&website, base_url))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Elements
    // ═══════════════════════════════════════════════════════════════════════

    pub fn list_elements(&self, principal: &Principal, website_id: &str) -> Result<Vec<Element>> {
        self.visible_website(principal, website_id)?;
        self.store.list_elements(website_id)
    }

    /// Create an element together with its placeholder default variant
    pub fn create_element(&self, principal: &Principal, input: NewElement) -> Result<ElementSnapshot> {
        let website_id = validator::required(input.website_id.as_deref(), "websiteId is required")?;
        let selector = validator::required(input.selector.as_deref(), "Selector is required")?;
        self.visible_website(principal, website_id)?;

        let element = Element::new(website_id, selector)
            .with_description(input.description.unwrap_or_default());
        let default = Variant::placeholder_default(&element.id);
        self.store.insert_element(&element, &default)?;

        tracing::debug!(element_id = %element.id, selector = %element.selector, "element created");
        Ok(ElementSnapshot::new(element).with_variant(VariantSnapshot::new(default)))
    }

    /// An element with its variants (default first) and their conditions
    pub fn get_element(&self, principal: &Principal, element_id: &str) -> Result<ElementSnapshot> {
        let element = self.owned_element(principal, element_id)?;
        let mut snapshot = ElementSnapshot::new(element);
        for variant in self.ordered_variants(element_id)? {
            let conditions = self.ordered_conditions(&variant.id)?;
            snapshot = snapshot.with_variant(VariantSnapshot {
                variant,
                conditions,
            });
        }
        Ok(snapshot)
    }

    pub fn update_element(
        &self,
        principal: &Principal,
        element_id: &str,
        patch: ElementPatch,
    ) -> Result<Element> {
        let selector = validator::required(patch.selector.as_deref(), "Selector is required")?;
        let mut element = self.owned_element(principal, element_id)?;
        element.selector = selector.to_string();
        if let Some(description) = patch.description {
            element.description = description;
        }
        element.touch();
        self.store.save_element(&element)?;
        Ok(element)
    }

    pub fn delete_element(&self, principal: &Principal, element_id: &str) -> Result<()> {
        self.owned_element(principal, element_id)?;
        self.store.delete_element(element_id)?;
        tracing::debug!(element_id, "element deleted");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Variants
    // ═══════════════════════════════════════════════════════════════════════

    /// Variants of an element, default first, then in creation order
    pub fn list_variants(&self, principal: &Principal, element_id: &str) -> Result<Vec<Variant>> {
        self.owned_element(principal, element_id)?;
        self.ordered_variants(element_id)
    }

    pub fn create_variant(&self, principal: &Principal, input: NewVariant) -> Result<Variant> {
        let element_id = validator::required(input.element_id.as_deref(), "elementId is required")?;
        let name = validator::required(input.name.as_deref(), "Name is required")?;
        self.owned_element(principal, element_id)?;

        let mut variant = Variant::new(element_id, name, input.content.unwrap_or_default());
        variant.is_default = input.is_default.unwrap_or(false);
        self.store.save_variant(&variant)?;
        Ok(variant)
    }

    pub fn get_variant(&self, principal: &Principal, variant_id: &str) -> Result<VariantSnapshot> {
        let variant = self.owned_variant(principal, variant_id)?;
        let conditions = self.ordered_conditions(variant_id)?;
        Ok(VariantSnapshot {
            variant,
            conditions,
        })
    }

    pub fn update_variant(
        &self,
        principal: &Principal,
        variant_id: &str,
        patch: VariantPatch,
    ) -> Result<Variant> {
        let name = validator::required(patch.name.as_deref(), "Name is required")?;
        let mut variant = self.owned_variant(principal, variant_id)?;
        variant.name = name.to_string();
        if let Some(content) = patch.content {
            variant.content = content;
        }
        if let Some(is_default) = patch.is_default {
            variant.is_default = is_default;
        }
        variant.touch();
        self.store.save_variant(&variant)?;
        Ok(variant)
    }

    /// Delete a variant; the default and the last remaining variant are kept
    pub fn delete_variant(&self, principal: &Principal, variant_id: &str) -> Result<()> {
        let variant = self.owned_variant(principal, variant_id)?;
        let siblings = self.store.list_variants(&variant.element_id)?;
        if siblings.len() <= 1 {
            return Err(EVError::CannotDeleteOnlyVariant {
                variant_id: variant_id.to_string(),
            });
        }
        if variant.is_default {
            return Err(EVError::CannotDeleteDefaultVariant {
                variant_id: variant_id.to_string(),
            });
        }
        self.store.delete_variant(variant_id)?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Conditions
    // ═══════════════════════════════════════════════════════════════════════

    /// Conditions of a variant by ascending priority
    pub fn list_conditions(&self, principal: &Principal, variant_id: &str) -> Result<Vec<Condition>> {
        self.owned_variant(principal, variant_id)?;
        self.ordered_conditions(variant_id)
    }

    pub fn create_condition(&self, principal: &Principal, input: NewCondition) -> Result<Condition> {
        let variant_id = validator::required(input.variant_id.as_deref(), "variantId is required")?;
        let (condition_type, operator, value) = validator::condition_fields(
            input.condition_type.as_deref(),
            input.operator.as_deref(),
            input.value.as_deref(),
        )?;
        self.owned_variant(principal, variant_id)?;

        let condition = Condition::new(variant_id, condition_type.as_str(), operator.as_str(), value)
            .with_priority(input.priority.unwrap_or(0));
        self.store.save_condition(&condition)?;

        if !condition_type.is_extracted() || !operator.is_evaluated() {
            tracing::debug!(
                condition_id = %condition.id,
                condition_type = %condition_type,
                operator = %operator,
                "condition stored but never matches during resolution"
            );
        }
        Ok(condition)
    }

    pub fn get_condition(&self, principal: &Principal, condition_id: &str) -> Result<Condition> {
        self.owned_condition(principal, condition_id)
    }

    pub fn update_condition(
        &self,
        principal: &Principal,
        condition_id: &str,
        patch: ConditionPatch,
    ) -> Result<Condition> {
        let (condition_type, operator, value) = validator::condition_fields(
            patch.condition_type.as_deref(),
            patch.operator.as_deref(),
            patch.value.as_deref(),
        )?;
        let mut condition = self.owned_condition(principal, condition_id)?;
        condition.condition_type = condition_type.as_str().to_string();
        condition.operator = operator.as_str().to_string();
        condition.value = value.to_string();
        if let Some(priority) = patch.priority {
            condition.priority = priority;
        }
        condition.touch();
        self.store.save_condition(&condition)?;
        Ok(condition)
    }

    pub fn delete_condition(&self, principal: &Principal, condition_id: &str) -> Result<()> {
        self.owned_condition(principal, condition_id)?;
        self.store.delete_condition(condition_id)?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Ownership
    // ═══════════════════════════════════════════════════════════════════════

    fn owned_website(&self, principal: &Principal, website_id: &str) -> Result<Website> {
        let website = self
            .store
            .get_website(website_id)?
            .ok_or_else(|| EVError::WebsiteNotFound {
                website_id: website_id.to_string(),
            })?;
        if !principal.owns(&website) {
            return Err(EVError::WebsiteForbidden {
                website_id: website_id.to_string(),
            });
        }
        Ok(website)
    }

    /// Like `owned_website`, but a foreign website reads as missing
    fn visible_website(&self, principal: &Principal, website_id: &str) -> Result<Website> {
        self.owned_website(principal, website_id).map_err(|e| match e {
            EVError::WebsiteForbidden { website_id } => EVError::WebsiteNotFound { website_id },
            other => other,
        })
    }

    fn owns_website_id(&self, principal: &Principal, website_id: &str) -> Result<bool> {
        Ok(self
            .store
            .get_website(website_id)?
            .is_some_and(|w| principal.owns(&w)))
    }

    fn owned_element(&self, principal: &Principal, element_id: &str) -> Result<Element> {
        let not_found = || EVError::ElementNotFound {
            element_id: element_id.to_string(),
        };
        let element = self.store.get_element(element_id)?.ok_or_else(not_found)?;
        if !self.owns_website_id(principal, &element.website_id)? {
            return Err(not_found());
        }
        Ok(element)
    }

    fn owned_variant(&self, principal: &Principal, variant_id: &str) -> Result<Variant> {
        let not_found = || EVError::VariantNotFound {
            variant_id: variant_id.to_string(),
        };
        let variant = self.store.get_variant(variant_id)?.ok_or_else(not_found)?;
        let owned = match self.store.get_element(&variant.element_id)? {
            Some(element) => self.owns_website_id(principal, &element.website_id)?,
            None => false,
        };
        if !owned {
            return Err(not_found());
        }
        Ok(variant)
    }

    fn owned_condition(&self, principal: &Principal, condition_id: &str) -> Result<Condition> {
        let condition = self
            .store
            .get_condition(condition_id)?
            .ok_or_else(|| EVError::ConditionNotFound {
                condition_id: condition_id.to_string(),
            })?;
        self.owned_variant(principal, &condition.variant_id)
            .map_err(|e| match e {
                EVError::VariantNotFound { .. } => EVError::ConditionNotFound {
                    condition_id: condition_id.to_string(),
                },
                other => other,
            })?;
        Ok(condition)
    }

    fn ordered_variants(&self, element_id: &str) -> Result<Vec<Variant>> {
        let mut variants = self.store.list_variants(element_id)?;
        order_variants(&mut variants, |v| v.is_default);
        Ok(variants)
    }

    fn ordered_conditions(&self, variant_id: &str) -> Result<Vec<Condition>> {
        let mut conditions = self.store.list_conditions(variant_id)?;
        conditions.sort_by_key(|c| c.priority);
        Ok(conditions)
    }
}

/// Stable partition: defaults first, creation order otherwise
fn order_variants<T>(variants: &mut [T], is_default: impl Fn(&T) -> bool) {
    variants.sort_by_key(|v| !is_default(v));
}

/// Script tag loading the widget for `website`
pub fn embed_snippet(website: &Website, base_url: &str) -> String {
    format!(
        "<!-- Element Variants: {} -->\n<script src=\"{}/api/integration/widget.js\" data-api-key=\"{}\" async></script>",
        website.domain,
        base_url.trim_end_matches('/'),
        website.api_key
    )
}
