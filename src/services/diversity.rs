//! Source-diversity re-ranking.
//!
//! Results are grouped per source website, coarsely tiered by score, shuffled
//! within tiers, then interleaved one-per-source in randomized round-robin
//! passes. Nothing is dropped: a narrow search dominated by one source still
//! returns every match.

use rand::{seq::SliceRandom, Rng};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::models::RecommendationResult;

use super::combiner::by_score_desc;

pub const HIGH_TIER: f64 = 0.8;
pub const MID_TIER: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct DiversityRanker;

impl DiversityRanker {
    pub fn new() -> Self {
        Self
    }

    pub fn rank<R: Rng>(&self, results: Vec<RecommendationResult>, rng: &mut R) -> Vec<RecommendationResult> {
        if results.len() < 2 {
            return results;
        }

        let total = results.len();
        let mut sources = group_by_source(results);
        for (_, items) in sources.iter_mut() {
            *items = shuffle_within_tiers(std::mem::take(items), rng);
        }

        let mut queues: Vec<VecDeque<RecommendationResult>> =
            sources.into_iter().map(|(_, items)| items.into()).collect();
        let mut ranked = Vec::with_capacity(total);

        while ranked.len() < total {
            queues.retain(|q| !q.is_empty());
            queues.shuffle(rng);
            for queue in queues.iter_mut() {
                if let Some(item) = queue.pop_front() {
                    ranked.push(item);
                }
            }
        }

        ranked
    }
}

/// Groups in order of first appearance so seeded runs are reproducible
fn group_by_source(results: Vec<RecommendationResult>) -> Vec<(String, Vec<RecommendationResult>)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<RecommendationResult>)> = Vec::new();

    for result in results {
        let key = result.source_website.to_lowercase();
        match positions.get(&key) {
            Some(&index) => groups[index].1.push(result),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push((key, vec![result]));
            }
        }
    }
    groups
}

fn tier(score: f64) -> u8 {
    if score >= HIGH_TIER {
        0
    } else if score >= MID_TIER {
        1
    } else {
        2
    }
}

fn shuffle_within_tiers<R: Rng>(
    mut items: Vec<RecommendationResult>,
    rng: &mut R,
) -> Vec<RecommendationResult> {
    items.sort_by(by_score_desc);

    let mut tiers: [Vec<RecommendationResult>; 3] = Default::default();
    for item in items {
        tiers[tier(item.overall_score) as usize].push(item);
    }
    for bucket in tiers.iter_mut() {
        bucket.shuffle(rng);
    }
    tiers.into_iter().flatten().collect()
}

/// Distinct sources over result count, 0.0 for an empty list
pub fn diversity_score(results: &[RecommendationResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let sources: HashSet<String> = results
        .iter()
        .map(|r| r.source_website.to_lowercase())
        .collect();
    sources.len() as f64 / results.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductScore;
    use rand::{rngs::StdRng, SeedableRng};

    fn result(id: i64, source: &str, score: f64) -> RecommendationResult {
        RecommendationResult {
            product_id: id,
            product_name: format!("Product {}", id),
            overall_score: score,
            scores: ProductScore {
                overall: score,
                ..Default::default()
            },
            reasoning: vec!["test".to_string()],
            source_website: source.to_string(),
        }
    }

    fn sample() -> Vec<RecommendationResult> {
        vec![
            result(1, "a.com", 0.95),
            result(2, "a.com", 0.92),
            result(3, "a.com", 0.90),
            result(4, "a.com", 0.60),
            result(5, "b.com", 0.85),
            result(6, "b.com", 0.40),
            result(7, "c.com", 0.88),
        ]
    }

    fn ids(results: &[RecommendationResult]) -> Vec<i64> {
        results.iter().map(|r| r.product_id).collect()
    }

    #[test]
    fn test_rank_keeps_every_result() {
        let ranked = DiversityRanker::new().rank(sample(), &mut StdRng::seed_from_u64(1));
        let mut got = ids(&ranked);
        got.sort();
        assert_eq!(got, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_head_spans_every_source() {
        let ranked = DiversityRanker::new().rank(sample(), &mut StdRng::seed_from_u64(42));
        let head: HashSet<&str> = ranked[..3].iter().map(|r| r.source_website.as_str()).collect();
        assert_eq!(head.len(), 3);
    }

    #[test]
    fn test_same_seed_same_order() {
        let ranker = DiversityRanker::new();
        let first = ranker.rank(sample(), &mut StdRng::seed_from_u64(7));
        let second = ranker.rank(sample(), &mut StdRng::seed_from_u64(7));
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_single_source_keeps_tier_order() {
        let single: Vec<_> = sample().into_iter().filter(|r| r.source_website == "a.com").collect();
        let ranked = DiversityRanker::new().rank(single, &mut StdRng::seed_from_u64(3));
        assert_eq!(ranked.len(), 4);
        // the only mid-tier item can never climb above the high tier
        assert_eq!(ranked[3].product_id, 4);
    }

    #[test]
    fn test_one_source_narrow_search_is_not_truncated() {
        let ottomans: Vec<_> = (1..=10).map(|id| result(id, "store.com", 0.7)).collect();
        let ranked = DiversityRanker::new().rank(ottomans, &mut StdRng::seed_from_u64(5));
        assert_eq!(ranked.len(), 10);
    }

    #[test]
    fn test_diversity_score() {
        assert_eq!(diversity_score(&[]), 0.0);
        let all = sample();
        assert!((diversity_score(&all) - 3.0 / 7.0).abs() < 1e-9);
    }
}
