use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::ProductId;

/// Which scoring regime dominated a response
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    CollaborativeHybrid,
    ContentBasedHybrid,
    ContextualContentBased,
    PopularityContentBased,
    StrictFilteringZeroResults,
    ErrorFallback,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CollaborativeHybrid => "collaborative_hybrid",
            Strategy::ContentBasedHybrid => "content_based_hybrid",
            Strategy::ContextualContentBased => "contextual_content_based",
            Strategy::PopularityContentBased => "popularity_content_based",
            Strategy::StrictFilteringZeroResults => "strict_filtering_zero_results",
            Strategy::ErrorFallback => "error_fallback",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-dimension scores for one candidate, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductScore {
    pub content: f64,
    pub popularity: f64,
    pub style: f64,
    pub functional: f64,
    pub price: f64,
    pub collaborative: f64,
    pub overall: f64,
}

/// A scored, explained recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub product_id: ProductId,
    pub product_name: String,
    pub overall_score: f64,
    pub scores: ProductScore,
    pub reasoning: Vec<String>,
    pub source_website: String,
}

/// Ranked output of a single recommendation call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResponse {
    pub recommendations: Vec<RecommendationResult>,
    /// Candidates scored before truncation
    pub total_found: usize,
    pub processing_time_ms: f64,
    pub strategy: Strategy,
    pub personalization_level: f64,
    pub diversity_score: f64,
}

impl RecommendationResponse {
    /// An empty, well-formed response carrying only a strategy label
    pub fn empty(strategy: Strategy, processing_time_ms: f64) -> Self {
        Self {
            recommendations: Vec::new(),
            total_found: 0,
            processing_time_ms,
            strategy,
            personalization_level: 0.0,
            diversity_score: 0.0,
        }
    }

    pub fn error_fallback(processing_time_ms: f64) -> Self {
        Self::empty(Strategy::ErrorFallback, processing_time_ms)
    }
}
