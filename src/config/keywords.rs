// src/config/keywords.rs
use serde::{Deserialize, Serialize};

use crate::infer::Taxonomy;

/// Lexicons used after classification: category taxonomy and the phrases a
/// landing page must contain to count as verified.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordConfig {
    pub verification_keywords: Vec<String>,
    /// Ordered; the first category with a matching term wins.
    #[serde(default)]
    pub categories: Taxonomy,
}

impl KeywordConfig {
    /// Trim and lower-case every term, dropping empties. Category order is kept.
    pub fn cleaned(self) -> Self {
        let clean = |v: Vec<String>| -> Vec<String> {
            v.into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };
        Self {
            verification_keywords: clean(self.verification_keywords),
            categories: self
                .categories
                .into_iter()
                .map(|(name, terms)| (name.trim().to_string(), clean(terms)))
                .filter(|(name, _)| !name.is_empty())
                .collect(),
        }
    }
}
