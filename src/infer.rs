// src/infer.rs
//! Category and requirement hints derived from the same text blob the
//! classifier sees.

use indexmap::IndexMap;

pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Ordered category -> terms mapping. Declaration order decides ties.
pub type Taxonomy = IndexMap<String, Vec<String>>;

pub fn infer_category<'a>(text: &str, taxonomy: &'a Taxonomy) -> &'a str {
    let lowered = text.to_lowercase();
    taxonomy
        .iter()
        .find(|(_, terms)| {
            terms
                .iter()
                .any(|t| !t.is_empty() && lowered.contains(&t.to_lowercase()))
        })
        .map(|(name, _)| name.as_str())
        .unwrap_or(UNKNOWN_CATEGORY)
}

pub fn infer_requirements(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    if lowered.contains("no credit card") {
        return Some("No credit card required");
    }
    if lowered.contains("signup") || lowered.contains("sign up") {
        return Some("Signup required");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> Taxonomy {
        let mut t = Taxonomy::new();
        t.insert("Writing".into(), vec!["copywriting".into(), "writer".into()]);
        t.insert("Image".into(), vec!["image".into(), "photo".into()]);
        t.insert("Coding".into(), vec!["code".into(), "copilot".into()]);
        t
    }

    #[test]
    fn first_category_in_declared_order_wins() {
        let tax = taxonomy();
        assert_eq!(infer_category("AI Photo writer", &tax), "Writing");
        assert_eq!(infer_category("image to code", &tax), "Image");
        assert_eq!(infer_category("Copilot clone", &tax), "Coding");
    }

    #[test]
    fn unknown_when_nothing_matches() {
        assert_eq!(infer_category("music generator", &taxonomy()), UNKNOWN_CATEGORY);
        assert_eq!(infer_category("anything", &Taxonomy::new()), UNKNOWN_CATEGORY);
    }

    #[test]
    fn requirements_prefer_no_card() {
        assert_eq!(
            infer_requirements("Sign up now, no credit card needed"),
            Some("No credit card required")
        );
        assert_eq!(infer_requirements("Quick signup"), Some("Signup required"));
        assert_eq!(infer_requirements("Just download it"), None);
    }
}
