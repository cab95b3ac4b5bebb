//! Multi-factor scoring.
//!
//! Each dimension is an independent function from the candidate list to a
//! `product id → score` map with every score in [0, 1]. Dimensions never fail:
//! missing inputs produce that dimension's neutral value instead.

pub mod content;
pub mod functional;
pub mod price;
pub mod style;

use rand::Rng;
use std::collections::HashMap;

use crate::models::{attribute_names as names, BudgetRange, ProductCandidate, ProductId};

use super::attributes::AttributeSet;
use content::ContentPreferences;
use functional::{infer_function, FunctionRules, RoomType};
use style::{infer_style, Style, StyleMatrix};

/// Whole-word containment on already-lowercased text
pub fn contains_term(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    text.match_indices(term).any(|(start, _)| {
        let end = start + term.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        before.map_or(true, |c| !c.is_alphanumeric()) && after.map_or(true, |c| !c.is_alphanumeric())
    })
}

pub type ScoreMap = HashMap<ProductId, f64>;

/// Baseline and jitter of the popularity stand-in
const POPULARITY_BASELINE: f64 = 0.5;
const POPULARITY_JITTER: f64 = 0.1;

/// Neutral value used by placeholder and unconstrained dimensions
pub const NEUTRAL: f64 = 0.5;

const FUNCTIONAL_REQUIREMENT_BONUS: f64 = 0.1;

/// Per-request scoring inputs
#[derive(Debug, Clone, Default)]
pub struct ScoringContext {
    pub content: ContentPreferences,
    /// Parsed shopper styles; empty means no style signal
    pub styles: Vec<Style>,
    pub room: Option<RoomType>,
    pub functional_requirements: Vec<String>,
    pub budget: Option<BudgetRange>,
    pub has_user: bool,
}

/// Every dimension's score map for one candidate list
#[derive(Debug, Clone, Default)]
pub struct DimensionScores {
    pub content: ScoreMap,
    pub popularity: ScoreMap,
    pub style: ScoreMap,
    pub functional: ScoreMap,
    pub price: ScoreMap,
    pub collaborative: ScoreMap,
}

/// Holds the immutable lookup tables shared by every request
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    styles: StyleMatrix,
    functions: FunctionRules,
}

impl Scorer {
    pub fn new() -> Self {
        Self {
            styles: StyleMatrix::new(),
            functions: FunctionRules::new(),
        }
    }

    pub fn score_all<R: Rng>(
        &self,
        candidates: &[ProductCandidate],
        ctx: &ScoringContext,
        attributes: &AttributeSet,
        rng: &mut R,
    ) -> DimensionScores {
        DimensionScores {
            content: self.content_scores(candidates, ctx, attributes),
            popularity: self.popularity_scores(candidates, rng),
            style: self.style_scores(candidates, ctx, attributes),
            functional: self.functional_scores(candidates, ctx),
            price: self.price_scores(candidates, ctx),
            collaborative: self.collaborative_scores(candidates, ctx),
        }
    }

    pub fn content_scores(
        &self,
        candidates: &[ProductCandidate],
        ctx: &ScoringContext,
        attributes: &AttributeSet,
    ) -> ScoreMap {
        candidates
            .iter()
            .map(|c| (c.id, content::content_score(&ctx.content, attributes, c)))
            .collect()
    }

    /// Placeholder until real interaction data exists: 0.5 ± 0.1 of noise.
    /// Carries no information about the product.
    pub fn popularity_scores<R: Rng>(
        &self,
        candidates: &[ProductCandidate],
        rng: &mut R,
    ) -> ScoreMap {
        candidates
            .iter()
            .map(|c| {
                let jitter = rng.gen_range(-POPULARITY_JITTER..=POPULARITY_JITTER);
                (c.id, (POPULARITY_BASELINE + jitter).clamp(0.0, 1.0))
            })
            .collect()
    }

    /// Style of a product: its `style` attribute when parseable, else inferred from text
    pub fn product_style(&self, product: &ProductCandidate, attributes: &AttributeSet) -> Style {
        attributes
            .styles
            .first(product.id, names::STYLE)
            .and_then(Style::parse)
            .unwrap_or_else(|| infer_style(&product.searchable_text()))
    }

    pub fn style_scores(
        &self,
        candidates: &[ProductCandidate],
        ctx: &ScoringContext,
        attributes: &AttributeSet,
    ) -> ScoreMap {
        candidates
            .iter()
            .map(|c| {
                let score = if ctx.styles.is_empty() {
                    NEUTRAL
                } else {
                    self.styles.best(&ctx.styles, self.product_style(c, attributes))
                };
                (c.id, score)
            })
            .collect()
    }

    pub fn functional_scores(&self, candidates: &[ProductCandidate], ctx: &ScoringContext) -> ScoreMap {
        let room = ctx.room.unwrap_or(functional::DEFAULT_ROOM);
        let requirements: Vec<String> = ctx
            .functional_requirements
            .iter()
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .collect();

        candidates
            .iter()
            .map(|c| {
                let text = c.searchable_text();
                let mut score = self.functions.fit(infer_function(&text), room);
                if requirements.iter().any(|r| contains_term(&text, r)) {
                    score += FUNCTIONAL_REQUIREMENT_BONUS;
                }
                (c.id, score.clamp(0.0, 1.0))
            })
            .collect()
    }

    pub fn price_scores(&self, candidates: &[ProductCandidate], ctx: &ScoringContext) -> ScoreMap {
        candidates
            .iter()
            .map(|c| (c.id, price::price_fit(c.price, ctx.budget.as_ref())))
            .collect()
    }

    /// Neutral stand-in: 0.5 for everyone when a user is known, otherwise 0.0
    /// under a zero weight. Never reorders results.
    pub fn collaborative_scores(&self, candidates: &[ProductCandidate], ctx: &ScoringContext) -> ScoreMap {
        let value = if ctx.has_user { NEUTRAL } else { 0.0 };
        candidates.iter().map(|c| (c.id, value)).collect()
    }
}
