//! Keyword relevance scoring.
//!
//! Scores a piece of text against a report's [`KeywordConfig`]. Matching is
//! a case-insensitive substring test: both the text and every keyword are
//! lower-cased before the containment check, with no word-boundary
//! awareness (`"xbox"` matches inside `"xboxlive"`).
//!
//! # Algorithm
//!
//! Evaluation order is part of the contract:
//!
//! 1. **Exclude** — any exclude term present forces score 0 with no
//!    matches or categories. Nothing else is evaluated.
//! 2. **Weighted lists** — exact (3), phrase (2), sdk functions (2),
//!    models (2), frameworks (1), pricing (1). Each list entry contributes
//!    its weight at most once, however often it occurs in the text.
//! 3. **AI-context gate** — true if any AI-context indicator is present.
//! 4. **Contextual** (1) — only scanned when the gate is open.
//! 5. **Broad** (1) — applied only when two or more broad terms match, or
//!    one matches alongside an already positive score. A lone generic term
//!    such as `"agent"` never makes an item relevant on its own.
//! 6. Matched keywords are deduplicated, keeping first-match order.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::FeedItem;

/// A keyword category that can contribute to a relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Exact,
    Phrase,
    SdkFunctions,
    Models,
    Frameworks,
    Pricing,
    Contextual,
    Broad,
}

impl Category {
    /// Score added per matching keyword.
    pub fn weight(self) -> u32 {
        match self {
            Category::Exact => 3,
            Category::Phrase | Category::SdkFunctions | Category::Models => 2,
            Category::Frameworks | Category::Pricing | Category::Contextual | Category::Broad => 1,
        }
    }

    /// Stable tag used in results, issue labels, and logs.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Exact => "exact",
            Category::Phrase => "phrase",
            Category::SdkFunctions => "sdkFunctions",
            Category::Models => "models",
            Category::Frameworks => "frameworks",
            Category::Pricing => "pricing",
            Category::Contextual => "contextual",
            Category::Broad => "broad",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A report's complete keyword set.
///
/// Deserializes from a TOML/JSON table where every list is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub exact: Vec<String>,
    pub phrase: Vec<String>,
    #[serde(alias = "sdkFunctions")]
    pub sdk_functions: Vec<String>,
    pub models: Vec<String>,
    pub frameworks: Vec<String>,
    pub pricing: Vec<String>,
    pub contextual: Vec<String>,
    pub broad: Vec<String>,
    pub exclude: Vec<String>,
    /// Generic AI-domain terms gating the contextual list. Never scored.
    #[serde(alias = "aiContextIndicators")]
    pub ai_context_indicators: Vec<String>,
}

impl KeywordConfig {
    /// Merge two keyword sets by per-category list concatenation.
    ///
    /// `self` comes first, then `other`. Duplicates are kept; the score
    /// does not depend on order.
    pub fn merge(&self, other: &KeywordConfig) -> KeywordConfig {
        fn cat(a: &[String], b: &[String]) -> Vec<String> {
            a.iter().chain(b.iter()).cloned().collect()
        }
        KeywordConfig {
            exact: cat(&self.exact, &other.exact),
            phrase: cat(&self.phrase, &other.phrase),
            sdk_functions: cat(&self.sdk_functions, &other.sdk_functions),
            models: cat(&self.models, &other.models),
            frameworks: cat(&self.frameworks, &other.frameworks),
            pricing: cat(&self.pricing, &other.pricing),
            contextual: cat(&self.contextual, &other.contextual),
            broad: cat(&self.broad, &other.broad),
            exclude: cat(&self.exclude, &other.exclude),
            ai_context_indicators: cat(&self.ai_context_indicators, &other.ai_context_indicators),
        }
    }

    /// The unconditional weighted lists, in evaluation order.
    fn weighted_lists(&self) -> [(Category, &[String]); 6] {
        [
            (Category::Exact, self.exact.as_slice()),
            (Category::Phrase, self.phrase.as_slice()),
            (Category::SdkFunctions, self.sdk_functions.as_slice()),
            (Category::Models, self.models.as_slice()),
            (Category::Frameworks, self.frameworks.as_slice()),
            (Category::Pricing, self.pricing.as_slice()),
        ]
    }

    /// Every list with its config key, for validation and listings.
    pub fn named_lists(&self) -> [(&'static str, &[String]); 10] {
        [
            ("exact", self.exact.as_slice()),
            ("phrase", self.phrase.as_slice()),
            ("sdk_functions", self.sdk_functions.as_slice()),
            ("models", self.models.as_slice()),
            ("frameworks", self.frameworks.as_slice()),
            ("pricing", self.pricing.as_slice()),
            ("contextual", self.contextual.as_slice()),
            ("broad", self.broad.as_slice()),
            ("exclude", self.exclude.as_slice()),
            ("ai_context_indicators", self.ai_context_indicators.as_slice()),
        ]
    }

    /// Total number of scoring keywords (excluding exclude terms and indicators).
    pub fn keyword_count(&self) -> usize {
        self.weighted_lists()
            .iter()
            .map(|(_, terms)| terms.len())
            .sum::<usize>()
            + self.contextual.len()
            + self.broad.len()
    }
}

/// Outcome of scoring one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordMatchResult {
    pub score: u32,
    pub matched_keywords: Vec<String>,
    pub categories: BTreeSet<Category>,
}

impl KeywordMatchResult {
    /// Whether this result clears `threshold`. A zero score is never relevant.
    pub fn is_relevant(&self, threshold: u32) -> bool {
        self.score > 0 && self.score >= threshold
    }
}

/// The text a feed item is scored on: title followed by description.
pub fn item_text(item: &FeedItem) -> String {
    format!("{} {}", item.title, item.description)
}

/// Score `text` against `config`.
///
/// Never fails: empty text or empty lists simply score 0.
pub fn score(text: &str, config: &KeywordConfig) -> KeywordMatchResult {
    let text = text.to_lowercase();
    let contains = |term: &String| matches_term(&text, term);

    if config.exclude.iter().any(contains) {
        return KeywordMatchResult::default();
    }

    let mut result = KeywordMatchResult::default();

    for (category, terms) in config.weighted_lists() {
        for term in terms.iter().filter(|t| contains(*t)) {
            add_match(&mut result, category, term);
        }
    }

    let ai_context = config.ai_context_indicators.iter().any(contains);
    if ai_context {
        for term in config.contextual.iter().filter(|t| contains(*t)) {
            add_match(&mut result, Category::Contextual, term);
        }
    }

    let broad: Vec<&String> = config.broad.iter().filter(|t| contains(*t)).collect();
    if broad.len() >= 2 || (!broad.is_empty() && result.score > 0) {
        for term in broad {
            add_match(&mut result, Category::Broad, term);
        }
    }

    dedup_keywords(&mut result.matched_keywords);
    result
}

/// Keywords match verbatim, padding included: `" ai "` does not match "email".
fn matches_term(lowered_text: &str, term: &str) -> bool {
    !term.trim().is_empty() && lowered_text.contains(&term.to_lowercase())
}

fn add_match(result: &mut KeywordMatchResult, category: Category, term: &str) {
    result.score += category.weight();
    result.matched_keywords.push(term.to_string());
    result.categories.insert(category);
}

fn dedup_keywords(keywords: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    keywords.retain(|k| seen.insert(k.clone()));
}
