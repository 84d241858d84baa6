//! Nested, read-only views of a website used for one resolution

use serde::{Deserialize, Serialize};

use super::{Condition, Element, Variant, Website};

/// A website with all its elements, variants and conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSnapshot {
    #[serde(flatten)]
    pub website: Website,
    #[serde(default)]
    pub elements: Vec<ElementSnapshot>,
}

/// An element with its variants, in store order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    #[serde(flatten)]
    pub element: Element,
    #[serde(default)]
    pub variants: Vec<VariantSnapshot>,
}

/// A variant with its conditions, in store order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSnapshot {
    #[serde(flatten)]
    pub variant: Variant,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl SiteSnapshot {
    pub fn new(website: Website) -> Self {
        Self {
            website,
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: ElementSnapshot) -> Self {
        self.elements.push(element);
        self
    }

    /// Total number of variants across all elements
    pub fn variant_count(&self) -> usize {
        self.elements.iter().map(|e| e.variants.len()).sum()
    }
}

impl ElementSnapshot {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            variants: Vec::new(),
        }
    }

    pub fn with_variant(mut self, variant: VariantSnapshot) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn selector(&self) -> &str {
        &self.element.selector
    }

    /// Variants flagged as default (normally exactly one)
    pub fn defaults(&self) -> impl Iterator<Item = &VariantSnapshot> {
        self.variants.iter().filter(|v| v.variant.is_default)
    }
}

impl VariantSnapshot {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn is_default(&self) -> bool {
        self.variant.is_default
    }
}
