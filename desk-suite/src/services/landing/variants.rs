//! The section variant registry.
//!
//! A landing page stores an ordered list of sections, each
//! `{kind, variant, props}`. This registry maps a `(kind, variant)`
//! pair to its default props; resolution merges stored props over the
//! defaults so a page only persists what it overrides.

use serde_json::{json, Value};

/// Default props for a section variant, or `None` for an unknown pair.
pub fn variant_defaults(kind: &str, variant: &str) -> Option<Value> {
    let defaults = match (kind, variant) {
        ("hero", "centered") => json!({
            "headline": "",
            "subheadline": "",
            "cta_label": "Get started",
            "cta_href": "/signup",
            "alignment": "center",
        }),
        ("hero", "split") => json!({
            "headline": "",
            "subheadline": "",
            "cta_label": "Get started",
            "cta_href": "/signup",
            "image": "",
            "image_side": "right",
        }),
        ("features", "grid") => json!({
            "heading": "Features",
            "columns": 3,
            "items": [],
        }),
        ("features", "list") => json!({
            "heading": "Features",
            "items": [],
        }),
        ("testimonials", "carousel") => json!({
            "heading": "What customers say",
            "autoplay": true,
            "items": [],
        }),
        ("testimonials", "quotes") => json!({
            "heading": "What customers say",
            "items": [],
        }),
        ("pricing", "tiers") => json!({
            "heading": "Pricing",
            "currency": "USD",
            "tiers": [],
        }),
        ("cta", "banner") => json!({
            "headline": "",
            "button_label": "Contact us",
            "button_href": "/contact",
        }),
        ("faq", "accordion") => json!({
            "heading": "Frequently asked questions",
            "items": [],
        }),
        _ => return None,
    };

    Some(defaults)
}

/// Stored props win over variant defaults.
pub fn merge_props(kind: &str, variant: &str, stored: Option<&Value>) -> Option<Value> {
    let mut merged = variant_defaults(kind, variant)?;

    if let (Some(out), Some(over)) = (
        merged.as_object_mut(),
        stored.and_then(|v| v.as_object()),
    ) {
        for (k, v) in over {
            out.insert(k.clone(), v.clone());
        }
    }

    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_pairs_have_defaults() {
        assert!(variant_defaults("hero", "centered").is_some());
        assert!(variant_defaults("pricing", "tiers").is_some());
        assert!(variant_defaults("hero", "spiral").is_none());
        assert!(variant_defaults("video", "centered").is_none());
    }

    #[test]
    fn stored_props_override_defaults() {
        let merged = merge_props(
            "hero",
            "centered",
            Some(&json!({"headline": "Welcome", "cta_label": "Try free"})),
        )
        .unwrap();

        assert_eq!(merged["headline"], "Welcome");
        assert_eq!(merged["cta_label"], "Try free");
        // untouched defaults survive
        assert_eq!(merged["cta_href"], "/signup");
        assert_eq!(merged["alignment"], "center");
    }

    #[test]
    fn merge_without_stored_props_is_the_defaults() {
        let merged = merge_props("faq", "accordion", None).unwrap();
        assert_eq!(merged, variant_defaults("faq", "accordion").unwrap());
    }
}
