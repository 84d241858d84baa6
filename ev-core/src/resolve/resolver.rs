//! Variant selection
//!
//! For every element the non-default variants are walked in store order.
//! A variant qualifies when all of its conditions match; its score is the
//! sum of those conditions' priorities, and a variant without conditions
//! scores zero. The first variant with the strictly highest score wins. When
//! nothing qualifies the default variant is served, and an element with
//! neither is left out of the result.

use crate::context::{extract, matches, RequestContext};
use crate::error::ElementResolutionError;
use crate::model::{Condition, ElementSnapshot, SiteSnapshot, VariantSnapshot};

use super::{ElementReport, ResolvedVariant, SiteResolution, VariantOutcome, VariantReport};

/// Score a conditional variant must beat to be selected
pub const NO_MATCH_PRIORITY: i64 = -1;

/// Score a variant against a context: `Ok(sum of priorities)` when every
/// condition matches, otherwise the first condition that failed.
fn evaluate_conditions<'a>(
    variant: &'a VariantSnapshot,
    context: &RequestContext,
) -> Result<i64, &'a Condition> {
    variant.conditions.iter().try_fold(0i64, |score, condition| {
        let actual = extract(context, &condition.condition_type);
        if matches(&actual, &condition.operator, &condition.value) {
            Ok(score + i64::from(condition.priority))
        } else {
            Err(condition)
        }
    })
}

/// Score of a variant for this context, or `None` if any condition fails
pub fn score_variant(variant: &VariantSnapshot, context: &RequestContext) -> Option<i64> {
    evaluate_conditions(variant, context).ok()
}

/// Reject elements whose stored data breaks the model's invariants and find
/// the fallback. Extra defaults are tolerated; the first one in store order wins.
fn check_element(element: &ElementSnapshot) -> Result<Option<&VariantSnapshot>, ElementResolutionError> {
    if element.selector().trim().is_empty() {
        return Err(ElementResolutionError::BlankSelector {
            element_id: element.element.id.clone(),
        });
    }

    let mut defaults = element.defaults();
    let default = defaults.next();
    let extra = defaults.count();
    if extra > 0 {
        tracing::warn!(
            element_id = %element.element.id,
            defaults = extra + 1,
            "element has several default variants; using the first"
        );
    }
    Ok(default)
}

/// Pick the variant to serve for an element
pub fn select_variant<'a>(
    element: &'a ElementSnapshot,
    context: &RequestContext,
) -> Result<Option<&'a VariantSnapshot>, ElementResolutionError> {
    let default = check_element(element)?;

    let mut best: Option<&VariantSnapshot> = None;
    let mut best_priority = NO_MATCH_PRIORITY;

    for variant in element.variants.iter().filter(|v| !v.is_default()) {
        if let Some(score) = score_variant(variant, context) {
            if score > best_priority {
                best_priority = score;
                best = Some(variant);
            }
        }
    }

    Ok(best.or(default))
}

/// Resolve one element to the content it should display
pub fn resolve_element(
    element: &ElementSnapshot,
    context: &RequestContext,
) -> Result<Option<ResolvedVariant>, ElementResolutionError> {
    Ok(select_variant(element, context)?.map(|winner| ResolvedVariant {
        selector: element.element.selector.clone(),
        content: winner.variant.content.clone(),
    }))
}

/// Resolve every element of a site.
///
/// A malformed element is logged and skipped; it never prevents the
/// remaining elements from resolving.
pub fn resolve_site(snapshot: &SiteSnapshot, context: &RequestContext) -> SiteResolution {
    let resolution = snapshot
        .elements
        .iter()
        .map(|element| resolve_element(element, context))
        .fold(SiteResolution::default(), SiteResolution::record);

    for failure in &resolution.failures {
        tracing::warn!(
            website_id = %snapshot.website.id,
            element_id = failure.element_id(),
            error = %failure,
            "skipping element that cannot be resolved"
        );
    }
    tracing::debug!(
        website_id = %snapshot.website.id,
        elements = snapshot.elements.len(),
        served = resolution.variants.len(),
        "resolved site"
    );

    resolution
}

/// Explain how an element resolves, variant by variant
pub fn explain_element(element: &ElementSnapshot, context: &RequestContext) -> ElementReport {
    let variants = element
        .variants
        .iter()
        .map(|v| {
            let outcome = if v.is_default() {
                VariantOutcome::Fallback
            } else {
                match evaluate_conditions(v, context) {
                    Ok(score) => VariantOutcome::Matched { score },
                    Err(condition) => VariantOutcome::Rejected {
                        condition_id: condition.id.clone(),
                        condition_type: condition.condition_type.clone(),
                        operator: condition.operator.clone(),
                        extracted: extract(context, &condition.condition_type).into_owned(),
                    },
                }
            };
            VariantReport {
                variant_id: v.variant.id.clone(),
                name: v.variant.name.clone(),
                outcome,
            }
        })
        .collect();

    let (winner, error) = match select_variant(element, context) {
        Ok(winner) => (winner.map(|w| w.variant.id.clone()), None),
        Err(e) => (None, Some(e.to_string())),
    };

    ElementReport {
        element_id: element.element.id.clone(),
        selector: element.element.selector.clone(),
        variants,
        winner,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, Element, Variant, Website};

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
    const DESKTOP: &str = "Mozilla/5.0 (X11; Linux x86_64) Chrome/120.0";

    fn mobile() -> RequestContext {
        RequestContext::new().with_user_agent(IPHONE).with_screen(390.0, 844.0)
    }

    fn desktop() -> RequestContext {
        RequestContext::new().with_user_agent(DESKTOP).with_screen(1920.0, 1080.0)
    }

    fn variant(element: &Element, content: &str, conditions: &[(&str, &str, &str, i32)]) -> VariantSnapshot {
        let v = Variant::new(&element.id, content, content);
        let mut snap = VariantSnapshot::new(v.clone());
        for (t, op, value, priority) in conditions {
            snap = snap.with_condition(Condition::new(&v.id, *t, *op, *value).with_priority(*priority));
        }
        snap
    }

    fn default_variant(element: &Element, content: &str) -> VariantSnapshot {
        VariantSnapshot::new(Variant::new(&element.id, "Default", content).as_default())
    }

    #[test]
    fn test_device_variant_over_default() {
        let el = Element::new("site", "#hero");
        let snap = ElementSnapshot::new(el.clone())
            .with_variant(default_variant(&el, "A"))
            .with_variant(variant(&el, "B", &[("device", "equals", "mobile", 5)]));

        let resolved = resolve_element(&snap, &mobile()).unwrap().unwrap();
        assert_eq!(resolved.selector, "#hero");
        assert_eq!(resolved.content, "B");

        let resolved = resolve_element(&snap, &desktop()).unwrap().unwrap();
        assert_eq!(resolved.content, "A");
    }

    #[test]
    fn test_highest_priority_sum_wins() {
        let el = Element::new("site", "#banner");
        let snap = ElementSnapshot::new(el.clone())
            .with_variant(default_variant(&el, "default"))
            .with_variant(variant(&el, "low", &[("path", "starts_with", "/", 3)]))
            .with_variant(variant(
                &el,
                "high",
                &[("path", "contains", "sale", 4), ("device", "equals", "mobile", 6)],
            ));

        let ctx = mobile().with_path("/sale");
        assert_eq!(resolve_element(&snap, &ctx).unwrap().unwrap().content, "high");
        assert_eq!(score_variant(&snap.variants[2], &ctx), Some(10));
        assert_eq!(score_variant(&snap.variants[1], &ctx), Some(3));
    }

    #[test]
    fn test_ties_keep_first_variant() {
        let el = Element::new("site", "#cta");
        let snap = ElementSnapshot::new(el.clone())
            .with_variant(variant(&el, "first", &[("language", "starts_with", "en", 2)]))
            .with_variant(variant(&el, "second", &[("path", "equals", "/", 2)]));

        let ctx = desktop().with_language("en-GB").with_path("/");
        assert_eq!(resolve_element(&snap, &ctx).unwrap().unwrap().content, "first");
    }

    #[test]
    fn test_unconditional_variant_scores_zero() {
        let el = Element::new("site", "#cta");
        let snap = ElementSnapshot::new(el.clone())
            .with_variant(default_variant(&el, "default"))
            .with_variant(variant(&el, "always", &[]));

        assert_eq!(resolve_element(&snap, &desktop()).unwrap().unwrap().content, "always");
    }

    #[test]
    fn test_negative_sums_never_beat_the_sentinel() {
        let el = Element::new("site", "#cta");
        let snap = ElementSnapshot::new(el.clone())
            .with_variant(default_variant(&el, "default"))
            .with_variant(variant(&el, "negative", &[("path", "equals", "/", -2)]));

        let ctx = desktop().with_path("/");
        assert_eq!(score_variant(&snap.variants[1], &ctx), Some(-2));
        assert_eq!(resolve_element(&snap, &ctx).unwrap().unwrap().content, "default");
    }

    #[test]
    fn test_any_failing_condition_rejects_variant() {
        let el = Element::new("site", "#cta");
        let snap = ElementSnapshot::new(el.clone())
            .with_variant(default_variant(&el, "default"))
            .with_variant(variant(
                &el,
                "both",
                &[("device", "equals", "mobile", 5), ("language", "equals", "fr", 5)],
            ));

        let ctx = mobile().with_language("en-US");
        assert_eq!(resolve_element(&snap, &ctx).unwrap().unwrap().content, "default");
    }

    #[test]
    fn test_unimplemented_vocabulary_never_matches() {
        let el = Element::new("site", "#cta");
        let snap = ElementSnapshot::new(el.clone())
            .with_variant(default_variant(&el, "default"))
            .with_variant(variant(&el, "browser", &[("browser", "contains", "chrome", 9)]))
            .with_variant(variant(&el, "gt", &[("path", "greater_than", "/", 9)]))
            .with_variant(variant(&el, "exists", &[("cookies", "exists", "", 9)]));

        let ctx = desktop().with_path("/x");
        assert_eq!(resolve_element(&snap, &ctx).unwrap().unwrap().content, "default");
    }

    #[test]
    fn test_no_default_and_no_match_is_omitted() {
        let el = Element::new("site", "#cta");
        let snap = ElementSnapshot::new(el.clone())
            .with_variant(variant(&el, "mobile", &[("device", "equals", "mobile", 1)]));
        assert_eq!(resolve_element(&snap, &desktop()).unwrap(), None);

        let empty = ElementSnapshot::new(Element::new("site", "#empty"));
        assert_eq!(resolve_element(&empty, &desktop()).unwrap(), None);
    }

    #[test]
    fn test_blank_selector_is_an_error() {
        let blank = Element::new("site", "   ");
        let blank = ElementSnapshot::new(blank.clone()).with_variant(default_variant(&blank, "a"));
        assert!(matches!(
            resolve_element(&blank, &desktop()),
            Err(ElementResolutionError::BlankSelector { .. })
        ));
    }

    #[test]
    fn test_extra_defaults_fall_back_to_first() {
        let el = Element::new("site", "#hero");
        let snap = ElementSnapshot::new(el.clone())
            .with_variant(default_variant(&el, "A"))
            .with_variant(default_variant(&el, "A2"))
            .with_variant(variant(&el, "B", &[("device", "equals", "mobile", 5)]));

        assert_eq!(resolve_element(&snap, &mobile()).unwrap().unwrap().content, "B");
        assert_eq!(resolve_element(&snap, &desktop()).unwrap().unwrap().content, "A");
    }

    #[test]
    fn test_resolve_site_isolates_failures() {
        let site = Website::new("user", "Shop", "shop.example.com");
        let good = Element::new(&site.id, "#good");
        let bad = Element::new(&site.id, "  ");
        let none = Element::new(&site.id, "#none");
        let doubled = Element::new(&site.id, "#doubled");
        let snapshot = SiteSnapshot::new(site)
            .with_element(ElementSnapshot::new(bad.clone()).with_variant(default_variant(&bad, "x")))
            .with_element(ElementSnapshot::new(none))
            .with_element(
                ElementSnapshot::new(doubled.clone())
                    .with_variant(default_variant(&doubled, "first"))
                    .with_variant(default_variant(&doubled, "second"))
                    .with_variant(variant(&doubled, "mobile", &[("device", "equals", "mobile", 5)])),
            )
            .with_element(ElementSnapshot::new(good.clone()).with_variant(default_variant(&good, "ok")));

        let resolution = resolve_site(&snapshot, &mobile());
        assert_eq!(
            resolution.variants,
            vec![
                ResolvedVariant {
                    selector: "#doubled".to_string(),
                    content: "mobile".to_string()
                },
                ResolvedVariant {
                    selector: "#good".to_string(),
                    content: "ok".to_string()
                },
            ]
        );
        assert_eq!(resolution.failures.len(), 1);
        assert_eq!(resolution.failures[0].element_id(), bad.id);
    }

    #[test]
    fn test_explain_reports_first_failure() {
        let el = Element::new("site", "#hero");
        let snap = ElementSnapshot::new(el.clone())
            .with_variant(default_variant(&el, "A"))
            .with_variant(variant(&el, "B", &[("device", "equals", "mobile", 5)]));

        let report = explain_element(&snap, &desktop());
        assert_eq!(report.winner.as_deref(), Some(snap.variants[0].variant.id.as_str()));
        assert_eq!(report.variants[0].outcome, VariantOutcome::Fallback);
        match &report.variants[1].outcome {
            VariantOutcome::Rejected { extracted, condition_type, .. } => {
                assert_eq!(extracted, "desktop");
                assert_eq!(condition_type, "device");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}
