//! Row storage shared by the in-memory and file backends

use serde::{Deserialize, Serialize};

use crate::error::{EVError, Result};
use crate::model::{
    Condition, Element, ElementSnapshot, SiteSnapshot, Variant, VariantSnapshot, Website,
};

/// The four tables, each kept in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub websites: Vec<Website>,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

fn upsert<T>(rows: &mut Vec<T>, row: &T, id: impl Fn(&T) -> &str)
where
    T: Clone,
{
    match rows.iter().position(|r| id(r) == id(row)) {
        Some(i) => rows[i] = row.clone(),
        None => rows.push(row.clone()),
    }
}

impl Tables {
    pub fn snapshot(&self, website: &Website) -> SiteSnapshot {
        let elements = self
            .elements
            .iter()
            .filter(|e| e.website_id == website.id)
            .map(|e| ElementSnapshot {
                element: e.clone(),
                variants: self
                    .variants
                    .iter()
                    .filter(|v| v.element_id == e.id)
                    .map(|v| VariantSnapshot {
                        variant: v.clone(),
                        conditions: self.conditions_of(&v.id).cloned().collect(),
                    })
                    .collect(),
            })
            .collect();

        SiteSnapshot {
            website: website.clone(),
            elements,
        }
    }

    fn conditions_of<'a>(&'a self, variant_id: &'a str) -> impl Iterator<Item = &'a Condition> {
        self.conditions.iter().filter(move |c| c.variant_id == variant_id)
    }

    pub fn find_active_by_api_key(&self, api_key: &str) -> Option<SiteSnapshot> {
        self.websites
            .iter()
            .find(|w| w.active && w.api_key == api_key)
            .map(|w| self.snapshot(w))
    }

    pub fn load_snapshot(&self, website_id: &str) -> Option<SiteSnapshot> {
        self.website(website_id).map(|w| self.snapshot(w))
    }

    pub fn website(&self, website_id: &str) -> Option<&Website> {
        self.websites.iter().find(|w| w.id == website_id)
    }

    pub fn websites_of(&self, owner_id: &str) -> Vec<Website> {
        self.websites.iter().filter(|w| w.owner_id == owner_id).cloned().collect()
    }

    pub fn website_by_domain(&self, owner_id: &str, domain: &str) -> Option<&Website> {
        self.websites
            .iter()
            .find(|w| w.owner_id == owner_id && w.domain == domain)
    }

    pub fn save_website(&mut self, website: &Website) -> Result<()> {
        if self
            .websites
            .iter()
            .any(|w| w.api_key == website.api_key && w.id != website.id)
        {
            return Err(EVError::InternalError {
                reason: "API key collision".to_string(),
            });
        }
        upsert(&mut self.websites, website, |w| w.id.as_str());
        Ok(())
    }

    pub fn delete_website(&mut self, website_id: &str) -> bool {
        let before = self.websites.len();
        self.websites.retain(|w| w.id != website_id);
        if self.websites.len() == before {
            return false;
        }
        let element_ids: Vec<String> = self
            .elements
            .iter()
            .filter(|e| e.website_id == website_id)
            .map(|e| e.id.clone())
            .collect();
        for id in &element_ids {
            self.delete_element(id);
        }
        true
    }

    pub fn element(&self, element_id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == element_id)
    }

    pub fn elements_of(&self, website_id: &str) -> Vec<Element> {
        self.elements
            .iter()
            .filter(|e| e.website_id == website_id)
            .cloned()
            .collect()
    }

    pub fn save_element(&mut self, element: &Element) {
        upsert(&mut self.elements, element, |e| e.id.as_str());
    }

    pub fn insert_element(&mut self, element: &Element, default: &Variant) {
        self.save_element(element);
        self.save_variant(default);
    }

    pub fn delete_element(&mut self, element_id: &str) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != element_id);
        if self.elements.len() == before {
            return false;
        }
        let variant_ids: Vec<String> = self
            .variants
            .iter()
            .filter(|v| v.element_id == element_id)
            .map(|v| v.id.clone())
            .collect();
        for id in &variant_ids {
            self.delete_variant(id);
        }
        true
    }

    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    pub fn variants_of(&self, element_id: &str) -> Vec<Variant> {
        self.variants
            .iter()
            .filter(|v| v.element_id == element_id)
            .cloned()
            .collect()
    }

    pub fn save_variant(&mut self, variant: &Variant) {
        if variant.is_default {
            for sibling in self
                .variants
                .iter_mut()
                .filter(|v| v.element_id == variant.element_id && v.id != variant.id && v.is_default)
            {
                sibling.is_default = false;
                sibling.touch();
            }
        }
        upsert(&mut self.variants, variant, |v| v.id.as_str());
    }

    pub fn delete_variant(&mut self, variant_id: &str) -> bool {
        let before = self.variants.len();
        self.variants.retain(|v| v.id != variant_id);
        if self.variants.len() == before {
            return false;
        }
        self.conditions.retain(|c| c.variant_id != variant_id);
        true
    }

    pub fn condition(&self, condition_id: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.id == condition_id)
    }

    pub fn conditions_for(&self, variant_id: &str) -> Vec<Condition> {
        self.conditions_of(variant_id).cloned().collect()
    }

    pub fn save_condition(&mut self, condition: &Condition) {
        upsert(&mut self.conditions, condition, |c| c.id.as_str());
    }

    pub fn delete_condition(&mut self, condition_id: &str) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c.id != condition_id);
        self.conditions.len() != before
    }
}
