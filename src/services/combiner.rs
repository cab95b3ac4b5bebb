use std::cmp::Ordering;

use crate::models::{ProductCandidate, ProductScore, RecommendationResult};

use super::{
    reasoning::{ReasoningContext, ReasoningGenerator},
    scoring::{DimensionScores, ScoreMap, NEUTRAL},
    weights::ScoreWeights,
};

/// Weighted sum of dimension scores, with explanations attached
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreCombiner {
    reasoning: ReasoningGenerator,
}

fn lookup(map: &ScoreMap, product: &ProductCandidate) -> f64 {
    map.get(&product.id).copied().unwrap_or(NEUTRAL).clamp(0.0, 1.0)
}

/// Highest score first, product id breaks ties
pub fn by_score_desc(a: &RecommendationResult, b: &RecommendationResult) -> Ordering {
    b.overall_score
        .partial_cmp(&a.overall_score)
        .unwrap_or(Ordering::Equal)
        .then(a.product_id.cmp(&b.product_id))
}

impl ScoreCombiner {
    pub fn new(reasoning: ReasoningGenerator) -> Self {
        Self { reasoning }
    }

    pub fn combine(
        &self,
        candidates: &[ProductCandidate],
        scores: &DimensionScores,
        weights: &ScoreWeights,
        ctx: &ReasoningContext,
    ) -> Vec<RecommendationResult> {
        let mut results: Vec<RecommendationResult> = candidates
            .iter()
            .map(|product| {
                let mut score = ProductScore {
                    content: lookup(&scores.content, product),
                    popularity: lookup(&scores.popularity, product),
                    style: lookup(&scores.style, product),
                    functional: lookup(&scores.functional, product),
                    price: lookup(&scores.price, product),
                    collaborative: scores
                        .collaborative
                        .get(&product.id)
                        .copied()
                        .unwrap_or(0.0)
                        .clamp(0.0, 1.0),
                    overall: 0.0,
                };
                score.overall = (score.content * weights.content
                    + score.popularity * weights.popularity
                    + score.style * weights.style
                    + score.functional * weights.functional
                    + score.price * weights.price
                    + score.collaborative * weights.collaborative)
                    .clamp(0.0, 1.0);

                RecommendationResult {
                    product_id: product.id,
                    product_name: product.name.clone(),
                    overall_score: score.overall,
                    reasoning: self.reasoning.generate(&score, ctx),
                    scores: score,
                    source_website: product.source_website.clone(),
                }
            })
            .collect();

        results.sort_by(by_score_desc);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn uniform(ids: &[i64], value: f64) -> ScoreMap {
        ids.iter().map(|id| (*id, value)).collect()
    }

    #[test]
    fn test_overall_is_weighted_sum_and_sorted() {
        let candidates = vec![
            ProductCandidate::new(1, "Low", "a.com"),
            ProductCandidate::new(2, "High", "b.com"),
        ];
        let ids = [1, 2];
        let mut content = HashMap::new();
        content.insert(1, 0.2);
        content.insert(2, 1.0);
        let scores = DimensionScores {
            content,
            popularity: uniform(&ids, 0.5),
            style: uniform(&ids, 0.5),
            functional: uniform(&ids, 0.5),
            price: uniform(&ids, 1.0),
            collaborative: uniform(&ids, 0.0),
        };

        let results = ScoreCombiner::default().combine(
            &candidates,
            &scores,
            &ScoreWeights::default(),
            &ReasoningContext::default(),
        );

        assert_eq!(results[0].product_id, 2);
        // 0.4*1.0 + 0.1*0.5 + 0.2*0.5 + 0.2*0.5 + 0.1*1.0
        assert!((results[0].overall_score - 0.75).abs() < 1e-9);
        assert!((results[1].overall_score - 0.43).abs() < 1e-9);
        assert!(results.iter().all(|r| !r.reasoning.is_empty()));
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let candidates = vec![ProductCandidate::new(1, "Odd", "a.com")];
        let scores = DimensionScores {
            content: uniform(&[1], 7.0),
            price: uniform(&[1], -3.0),
            ..Default::default()
        };
        let results = ScoreCombiner::default().combine(
            &candidates,
            &scores,
            &ScoreWeights::default(),
            &ReasoningContext::default(),
        );
        let score = &results[0].scores;
        assert_eq!(score.content, 1.0);
        assert_eq!(score.price, 0.0);
        assert!((0.0..=1.0).contains(&results[0].overall_score));
    }

    #[test]
    fn test_ties_break_by_id() {
        let candidates = vec![
            ProductCandidate::new(9, "B", "a.com"),
            ProductCandidate::new(3, "A", "a.com"),
        ];
        let results = ScoreCombiner::default().combine(
            &candidates,
            &DimensionScores::default(),
            &ScoreWeights::default(),
            &ReasoningContext::default(),
        );
        assert_eq!(results[0].product_id, 3);
        assert_eq!(results[1].product_id, 9);
    }
}
