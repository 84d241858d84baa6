//! Resolution results

use serde::{Deserialize, Serialize};

use crate::error::ElementResolutionError;

/// Content chosen for one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVariant {
    pub selector: String,
    pub content: String,
}

/// Outcome of resolving every element of a site
///
/// Elements without a winning variant do not appear in `variants`.
/// Elements whose stored data was malformed are reported in `failures`
/// and are likewise left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteResolution {
    /// Winning content per element, in element order
    pub variants: Vec<ResolvedVariant>,
    /// Elements skipped because of malformed data
    pub failures: Vec<ElementResolutionError>,
}

impl SiteResolution {
    /// Fold one element's outcome into the batch
    pub fn record(mut self, outcome: Result<Option<ResolvedVariant>, ElementResolutionError>) -> Self {
        match outcome {
            Ok(Some(resolved)) => self.variants.push(resolved),
            Ok(None) => {}
            Err(e) => self.failures.push(e),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Why a single variant did or did not qualify
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VariantOutcome {
    /// Every condition matched; `score` is the sum of their priorities
    Matched { score: i64 },
    /// The first condition (by store order) that failed
    Rejected {
        condition_id: String,
        condition_type: String,
        operator: String,
        extracted: String,
    },
    /// Default variant, only considered as a fallback
    Fallback,
}

/// Per-variant explanation of one element's resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantReport {
    pub variant_id: String,
    pub name: String,
    #[serde(flatten)]
    pub outcome: VariantOutcome,
}

/// Explanation of one element's resolution, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementReport {
    pub element_id: String,
    pub selector: String,
    pub variants: Vec<VariantReport>,
    /// Id of the variant that was served, if any
    pub winner: Option<String>,
    /// Set when the element could not be resolved at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
