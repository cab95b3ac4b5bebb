//! Content relevance: keyword placement in the product name plus soft attribute
//! contributions. The combined score is capped at 1.0.

use regex::Regex;

use crate::{
    error::AppResult,
    models::{attribute_names as names, DimensionLimits, ProductCandidate, ProductId},
    services::{
        attributes::{AttributeIndex, AttributeSet},
        catalog::word_pattern,
    },
};

use super::contains_term;

pub const EXACT_NAME: f64 = 1.0;
pub const EARLY_WORD: f64 = 0.9;
pub const LATE_WORD: f64 = 0.7;
pub const PARTIAL_WORD: f64 = 0.5;
pub const DESCRIPTION_ONLY: f64 = 0.3;

/// Keyword part used when the request has no keywords at all
pub const NEUTRAL_KEYWORD_SCORE: f64 = 0.5;

/// Styling-tip terms count for less than the shopper's own keywords
pub const TIP_TERM_FACTOR: f64 = 0.6;

const COLOR_WEIGHT: f64 = 0.20;
const MATERIAL_WEIGHT: f64 = 0.15;
const TEXTURE_WEIGHT: f64 = 0.05;
const PATTERN_WEIGHT: f64 = 0.05;
const SIZE_WEIGHT: f64 = 0.05;
const DESCRIPTION_TERM_BONUS: f64 = 0.05;
const DESCRIPTION_BONUS_CAP: f64 = 0.1;

/// A keyword with its precompiled whole-word pattern
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keyword: String,
    pattern: Regex,
}

impl KeywordMatcher {
    pub fn new(keyword: &str) -> AppResult<Self> {
        Ok(Self {
            keyword: keyword.trim().to_lowercase(),
            pattern: word_pattern(keyword)?,
        })
    }

    pub fn many(keywords: &[String]) -> AppResult<Vec<Self>> {
        keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| Self::new(k))
            .collect()
    }

    /// Placement score of this keyword for one product
    pub fn score(&self, name: &str, description: Option<&str>) -> f64 {
        let name_lower = name.trim().to_lowercase();
        if name_lower == self.keyword {
            return EXACT_NAME;
        }

        if let Some(found) = self.pattern.find(name) {
            let words_before = name[..found.start()].split_whitespace().count();
            return if words_before < 2 { EARLY_WORD } else { LATE_WORD };
        }

        if name_lower.contains(&self.keyword) {
            return PARTIAL_WORD;
        }

        if description.is_some_and(|d| d.to_lowercase().contains(&self.keyword)) {
            return DESCRIPTION_ONLY;
        }

        0.0
    }
}

/// Soft preference inputs for content scoring
#[derive(Debug, Clone, Default)]
pub struct ContentPreferences {
    pub keywords: Vec<KeywordMatcher>,
    pub tip_terms: Vec<KeywordMatcher>,
    pub colors: Vec<String>,
    pub materials: Vec<String>,
    pub textures: Vec<String>,
    pub patterns: Vec<String>,
    pub dimensions: Option<DimensionLimits>,
    /// Style and functional words that earn a small bonus in descriptions
    pub description_terms: Vec<String>,
}

fn best(matchers: &[KeywordMatcher], product: &ProductCandidate) -> f64 {
    matchers
        .iter()
        .map(|m| m.score(&product.name, product.description.as_deref()))
        .fold(0.0, f64::max)
}

/// Keyword part of content relevance
pub fn keyword_score(prefs: &ContentPreferences, product: &ProductCandidate) -> f64 {
    let tip_score = best(&prefs.tip_terms, product) * TIP_TERM_FACTOR;
    if prefs.keywords.is_empty() {
        return NEUTRAL_KEYWORD_SCORE.max(tip_score);
    }
    best(&prefs.keywords, product).max(tip_score)
}

/// Exact color 1.0, same family 0.6, missing or different 0.0
pub fn color_subscore(index: &AttributeIndex, id: ProductId, wanted: &[String]) -> f64 {
    if index.has_exact(id, names::COLORS, wanted) {
        1.0
    } else if index.has_color_family(id, wanted) {
        0.6
    } else {
        0.0
    }
}

/// Match 1.0, missing or different 0.0
pub fn material_subscore(index: &AttributeIndex, id: ProductId, wanted: &[String]) -> f64 {
    if index.has_exact(id, names::MATERIALS, wanted) {
        1.0
    } else {
        0.0
    }
}

/// Match 1.0, missing 0.5, different 0.0
pub fn surface_subscore(
    index: &AttributeIndex,
    id: ProductId,
    attribute: &'static str,
    wanted: &[String],
) -> f64 {
    let attribute_names = [attribute];
    if index.has_exact(id, &attribute_names, wanted) {
        1.0
    } else if index.has_any(id, &attribute_names) {
        0.0
    } else {
        0.5
    }
}

/// Leading numeric part of values such as "80", "80 cm" or "31.5in"
fn parse_measure(value: &str) -> Option<f64> {
    let numeric: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    numeric.parse().ok()
}

/// All known dimensions fit 1.0, any too large 0.0, nothing known 0.5
pub fn size_subscore(index: &AttributeIndex, id: ProductId, limits: &DimensionLimits) -> f64 {
    let checks = [
        (names::WIDTH, limits.max_width),
        (names::DEPTH, limits.max_depth),
        (names::HEIGHT, limits.max_height),
    ];

    let mut known = 0;
    for (attribute, limit) in checks {
        let Some(limit) = limit else { continue };
        let Some(value) = index.first(id, attribute).and_then(parse_measure) else {
            continue;
        };
        if value > limit {
            return 0.0;
        }
        known += 1;
    }

    if known == 0 {
        0.5
    } else {
        1.0
    }
}

fn description_bonus(prefs: &ContentPreferences, product: &ProductCandidate) -> f64 {
    let Some(description) = product.description.as_deref() else {
        return 0.0;
    };
    let description = description.to_lowercase();
    let hits = prefs
        .description_terms
        .iter()
        .filter(|term| contains_term(&description, term))
        .count();
    (hits as f64 * DESCRIPTION_TERM_BONUS).min(DESCRIPTION_BONUS_CAP)
}

/// Full content relevance for one product, in [0, 1]
pub fn content_score(
    prefs: &ContentPreferences,
    attributes: &AttributeSet,
    product: &ProductCandidate,
) -> f64 {
    let id = product.id;
    let mut score = keyword_score(prefs, product);

    if !prefs.colors.is_empty() {
        score += COLOR_WEIGHT * color_subscore(&attributes.colors, id, &prefs.colors);
    }
    if !prefs.materials.is_empty() {
        score += MATERIAL_WEIGHT * material_subscore(&attributes.materials, id, &prefs.materials);
    }
    if !prefs.textures.is_empty() {
        score += TEXTURE_WEIGHT
            * surface_subscore(&attributes.textures, id, names::TEXTURE, &prefs.textures);
    }
    if !prefs.patterns.is_empty() {
        score += PATTERN_WEIGHT
            * surface_subscore(&attributes.patterns, id, names::PATTERN, &prefs.patterns);
    }
    if let Some(limits) = &prefs.dimensions {
        score += SIZE_WEIGHT * size_subscore(&attributes.dimensions, id, limits);
    }
    score += description_bonus(prefs, product);

    score.clamp(0.0, 1.0)
}
