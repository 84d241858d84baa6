//! Request payloads for catalog writes
//!
//! Fields are optional at the type level so that "missing" and "blank" are
//! reported with the same validation message.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebsite {
    pub name: Option<String>,
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsitePatch {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub active: Option<bool>,
}

impl WebsitePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.domain.is_none() && self.active.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewElement {
    pub website_id: Option<String>,
    pub selector: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    pub selector: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVariant {
    pub element_id: Option<String>,
    pub name: Option<String>,
    pub content: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPatch {
    pub name: Option<String>,
    pub content: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCondition {
    pub variant_id: Option<String>,
    pub condition_type: Option<String>,
    pub operator: Option<String>,
    pub value: Option<String>,
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionPatch {
    pub condition_type: Option<String>,
    pub operator: Option<String>,
    pub value: Option<String>,
    pub priority: Option<i32>,
}
