use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};

use super::ProductId;

pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 20;
pub const MAX_RECOMMENDATIONS_LIMIT: usize = 100;

/// Room the shopper is furnishing
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoomContext {
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
}

/// Inclusive price bounds; either side may be open
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BudgetRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl BudgetRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        self.min.map_or(true, |min| price >= min) && self.max.map_or(true, |max| price <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Attribute values requested by the shopper, one list per dimension
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AttributePreferences {
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub textures: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
}

impl AttributePreferences {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
            && self.materials.is_empty()
            && self.textures.is_empty()
            && self.patterns.is_empty()
            && self.styles.is_empty()
    }
}

/// Maximum dimensions the product must fit within, in catalog units
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct DimensionLimits {
    #[serde(default)]
    pub max_width: Option<f64>,
    #[serde(default)]
    pub max_depth: Option<f64>,
    #[serde(default)]
    pub max_height: Option<f64>,
}

/// Opaque inputs produced by the upstream design assistant
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DesignerEnrichment {
    /// Hex colors such as `#1f3a5f`
    #[serde(default)]
    pub color_palette: Vec<String>,
    #[serde(default)]
    pub styling_tips: Vec<String>,
    /// Validated product types; acts as a hard filter at retrieval
    #[serde(default)]
    pub product_types: Vec<String>,
}

/// What to do when explicit keywords match too few products
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeywordFallback {
    /// Keyword matches are final, even when there are none
    #[default]
    Strict,
    /// Top up sparse keyword matches with randomly sampled catalog items
    Broaden,
}

/// Whether source-diversity re-ranking runs
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiversityMode {
    /// Re-rank unless the request carries explicit product keywords
    #[default]
    Auto,
    Always,
    Never,
}

/// Everything the shopper asked for, validated once at the engine boundary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub preferences: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub room_context: Option<RoomContext>,
    #[serde(default)]
    pub budget: Option<BudgetRange>,
    /// Ordered; the first entry is the primary style
    #[serde(default)]
    pub style_preferences: Vec<String>,
    #[serde(default)]
    pub functional_requirements: Vec<String>,
    #[serde(default)]
    pub product_keywords: Vec<String>,
    #[serde(default)]
    pub excluded_products: Vec<ProductId>,
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
    #[serde(default)]
    pub attributes: AttributePreferences,
    #[serde(default)]
    pub strict_attribute_match: bool,
    #[serde(default)]
    pub stores: Option<Vec<String>>,
    #[serde(default)]
    pub dimensions: Option<DimensionLimits>,
    #[serde(default)]
    pub enrichment: DesignerEnrichment,
    #[serde(default)]
    pub keyword_fallback: KeywordFallback,
    #[serde(default)]
    pub diversity: DiversityMode,
    #[serde(default = "default_true")]
    pub apply_budget_at_retrieval: bool,
}

fn default_max_recommendations() -> usize {
    DEFAULT_MAX_RECOMMENDATIONS
}

fn default_true() -> bool {
    true
}

impl Default for RecommendationRequest {
    fn default() -> Self {
        Self {
            preferences: HashMap::new(),
            room_context: None,
            budget: None,
            style_preferences: Vec::new(),
            functional_requirements: Vec::new(),
            product_keywords: Vec::new(),
            excluded_products: Vec::new(),
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            attributes: AttributePreferences::default(),
            strict_attribute_match: false,
            stores: None,
            dimensions: None,
            enrichment: DesignerEnrichment::default(),
            keyword_fallback: KeywordFallback::default(),
            diversity: DiversityMode::default(),
            apply_budget_at_retrieval: true,
        }
    }
}

impl RecommendationRequest {
    /// Rejects requests the engine cannot interpret
    pub fn validate(&self) -> AppResult<()> {
        if self.max_recommendations == 0 || self.max_recommendations > MAX_RECOMMENDATIONS_LIMIT {
            return Err(AppError::InvalidInput(format!(
                "max_recommendations must be between 1 and {}, got {}",
                MAX_RECOMMENDATIONS_LIMIT, self.max_recommendations
            )));
        }

        if let Some(budget) = &self.budget {
            for bound in [budget.min, budget.max].into_iter().flatten() {
                if !bound.is_finite() || bound < 0.0 {
                    return Err(AppError::InvalidInput(format!(
                        "budget bounds must be non-negative, got {}",
                        bound
                    )));
                }
            }
            if let (Some(min), Some(max)) = (budget.min, budget.max) {
                if min > max {
                    return Err(AppError::InvalidInput(format!(
                        "budget min {} exceeds max {}",
                        min, max
                    )));
                }
            }
        }

        Ok(())
    }

    /// Keywords trimmed, lowercased and deduplicated, in request order
    pub fn normalized_keywords(&self) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        for keyword in &self.product_keywords {
            let normalized = keyword.trim().to_lowercase();
            if !normalized.is_empty() && !keywords.contains(&normalized) {
                keywords.push(normalized);
            }
        }
        keywords
    }

    pub fn has_keywords(&self) -> bool {
        self.product_keywords.iter().any(|k| !k.trim().is_empty())
    }

    /// The budget, unless it places no bound at all
    pub fn effective_budget(&self) -> Option<BudgetRange> {
        self.budget.filter(|b| !b.is_unbounded())
    }

    pub fn room_type(&self) -> Option<&str> {
        self.room_context
            .as_ref()
            .and_then(|ctx| ctx.room_type.as_deref())
            .filter(|room| !room.trim().is_empty())
    }

    /// String values stored under `key` in the free-form preference bag
    pub fn preference_strings(&self, key: &str) -> Vec<String> {
        match self.preferences.get(key) {
            Some(serde_json::Value::String(value)) => vec![value.clone()],
            Some(serde_json::Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}
