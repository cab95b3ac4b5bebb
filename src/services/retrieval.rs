use rand::{rngs::StdRng, seq::SliceRandom};
use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{attribute_names as names, KeywordFallback, ProductCandidate, RecommendationRequest},
};

use super::{
    attributes::{candidate_ids, furniture_type_matches, AttributeIndex},
    catalog::{word_pattern, CandidateFilters, Catalog, KeywordGroup},
    keywords::KeywordCategorizer,
    scoring::contains_term,
};

/// Accessories, parts and samples that never count as furniture results
pub const EXCLUDED_TERMS: &[&str] = &[
    "hook", "hooks", "knob", "knobs", "handle", "handles", "hinge", "hinges", "screw", "screws",
    "bracket", "brackets", "sample", "swatch", "swatches", "fabric sample", "spare", "replacement",
    "part", "parts", "adapter", "bulb", "bulbs", "cable", "cover", "glide", "glides",
];

/// Candidates plus how they were obtained
#[derive(Debug, Clone, Default)]
pub struct Retrieval {
    pub candidates: Vec<ProductCandidate>,
    /// Number of randomly sampled products added by the `broaden` fallback
    pub broadened: usize,
}

/// Builds catalog filters from a request and runs the candidate query
pub struct CandidateRetriever {
    catalog: Arc<dyn Catalog>,
    categorizer: KeywordCategorizer,
    limit: usize,
    fallback_min_results: usize,
}

impl CandidateRetriever {
    pub fn new(catalog: Arc<dyn Catalog>, limit: usize, fallback_min_results: usize) -> Self {
        Self {
            catalog,
            categorizer: KeywordCategorizer::new(),
            limit,
            fallback_min_results,
        }
    }

    /// Filters for `request` exactly as sent to the catalog
    pub fn filters(&self, request: &RecommendationRequest) -> AppResult<CandidateFilters> {
        let keywords = request.normalized_keywords();

        let groups = self
            .categorizer
            .categorize(&keywords)
            .into_iter()
            .map(|(category, words)| KeywordGroup::new(category, words))
            .collect::<AppResult<Vec<_>>>()?;

        // a shopper searching for "hook" must be able to find hooks
        let excluded: Vec<String> = EXCLUDED_TERMS
            .iter()
            .filter(|term| !keywords.iter().any(|k| contains_term(k, term)))
            .map(|term| term.to_string())
            .collect();

        let budget = if request.apply_budget_at_retrieval {
            request.effective_budget()
        } else {
            None
        };

        Ok(CandidateFilters::new(self.limit)
            .with_stores(request.stores.clone())
            .with_keyword_groups(groups)
            .with_excluded_terms(excluded)?
            .with_budget(budget)
            .with_excluded_ids(request.excluded_products.clone()))
    }

    pub async fn retrieve(
        &self,
        request: &RecommendationRequest,
        rng: &mut StdRng,
    ) -> AppResult<Retrieval> {
        let filters = self.filters(request)?;

        if !filters.has_keywords() {
            tracing::info!(
                catalog = self.catalog.name(),
                "No product keywords; retrieving all available products"
            );
        }

        let mut candidates = self.catalog.find_candidates(&filters).await?;
        tracing::info!(
            candidates = candidates.len(),
            keyword_groups = filters.keyword_groups.len(),
            "Retrieved candidates"
        );

        let mut broadened = 0;
        if filters.has_keywords()
            && request.keyword_fallback == KeywordFallback::Broaden
            && candidates.len() < self.fallback_min_results
        {
            broadened = self
                .broaden(&filters, &mut candidates, request.max_recommendations, rng)
                .await?;
        }

        let product_types: Vec<String> = request
            .enrichment
            .product_types
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        if !product_types.is_empty() && !candidates.is_empty() {
            candidates = self.validate_product_types(candidates, &product_types).await?;
        }

        Ok(Retrieval {
            candidates,
            broadened,
        })
    }

    /// Tops up sparse keyword results with randomly sampled available products
    async fn broaden(
        &self,
        filters: &CandidateFilters,
        candidates: &mut Vec<ProductCandidate>,
        target: usize,
        rng: &mut StdRng,
    ) -> AppResult<usize> {
        let present: HashSet<_> = candidates.iter().map(|c| c.id).collect();
        let mut pool: Vec<ProductCandidate> = self
            .catalog
            .find_candidates(&filters.sampling_pool())
            .await?
            .into_iter()
            .filter(|c| !present.contains(&c.id))
            .collect();
        pool.shuffle(rng);

        let wanted = target.max(self.fallback_min_results).saturating_sub(candidates.len());
        let added = wanted.min(pool.len());
        candidates.extend(pool.into_iter().take(added));

        tracing::info!(
            added,
            total = candidates.len(),
            "Too few keyword matches; broadened with sampled products"
        );
        Ok(added)
    }

    /// Keeps candidates whose name or `furniture_type` matches an AI-validated type
    async fn validate_product_types(
        &self,
        candidates: Vec<ProductCandidate>,
        product_types: &[String],
    ) -> AppResult<Vec<ProductCandidate>> {
        let patterns = product_types
            .iter()
            .map(|t| word_pattern(t))
            .collect::<AppResult<Vec<_>>>()?;

        let ids = candidate_ids(&candidates);
        let index = match self.catalog.get_attributes(&ids, &[names::FURNITURE_TYPE]).await {
            Ok(rows) => AttributeIndex::new(rows),
            Err(e) => {
                tracing::warn!(error = %e, "furniture_type lookup failed; validating by name only");
                AttributeIndex::default()
            }
        };

        let before = candidates.len();
        let kept: Vec<ProductCandidate> = candidates
            .into_iter()
            .filter(|c| {
                patterns.iter().any(|p| p.is_match(&c.name))
                    || furniture_type_matches(&index, c.id, product_types)
            })
            .collect();

        tracing::info!(before, after = kept.len(), "Validated product types");
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{AttributeRow, BudgetRange},
        services::catalog::MockCatalog,
    };
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn products() -> Vec<ProductCandidate> {
        vec![
            ProductCandidate::new(1, "Velvet Sofa", "a.com").with_price(500.0),
            ProductCandidate::new(2, "Oak Coffee Table", "a.com").with_price(200.0),
            ProductCandidate::new(3, "Brass Wall Hook", "b.com").with_price(15.0),
            ProductCandidate::new(4, "Linen Armchair", "b.com").with_price(300.0),
        ]
    }

    fn filtering_mock() -> MockCatalog {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_find_candidates()
            .returning(|filters| Ok(products().into_iter().filter(|p| filters.matches(p)).collect()));
        catalog.expect_name().return_const("mock");
        catalog
    }

    fn request(keywords: &[&str]) -> RecommendationRequest {
        RecommendationRequest {
            product_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn test_requested_term_is_not_excluded() {
        let retriever = CandidateRetriever::new(Arc::new(MockCatalog::new()), 1000, 3);
        let plain = retriever.filters(&request(&["sofa"])).unwrap();
        assert!(plain.excluded_terms.contains(&"hook".to_string()));

        let hooks = retriever.filters(&request(&["wall hook"])).unwrap();
        assert!(!hooks.excluded_terms.contains(&"hook".to_string()));
    }

    #[test]
    fn test_budget_at_retrieval_is_optional() {
        let retriever = CandidateRetriever::new(Arc::new(MockCatalog::new()), 1000, 3);
        let mut req = request(&[]);
        req.budget = Some(BudgetRange::new(100.0, 400.0));
        assert!(retriever.filters(&req).unwrap().budget.is_some());

        req.apply_budget_at_retrieval = false;
        assert!(retriever.filters(&req).unwrap().budget.is_none());
    }

    #[tokio::test]
    async fn test_no_keywords_returns_all_non_accessories() {
        let retriever = CandidateRetriever::new(Arc::new(filtering_mock()), 1000, 3);
        let retrieval = retriever.retrieve(&request(&[]), &mut rng()).await.unwrap();
        let ids: Vec<_> = retrieval.candidates.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[tokio::test]
    async fn test_strict_fallback_keeps_zero_matches_empty() {
        let retriever = CandidateRetriever::new(Arc::new(filtering_mock()), 1000, 3);
        let retrieval = retriever.retrieve(&request(&["wardrobe"]), &mut rng()).await.unwrap();
        assert!(retrieval.candidates.is_empty());
        assert_eq!(retrieval.broadened, 0);
    }

    #[tokio::test]
    async fn test_broaden_fallback_tops_up() {
        let retriever = CandidateRetriever::new(Arc::new(filtering_mock()), 1000, 3);
        let mut req = request(&["sofa"]);
        req.keyword_fallback = KeywordFallback::Broaden;
        req.max_recommendations = 3;
        let retrieval = retriever.retrieve(&req, &mut rng()).await.unwrap();

        assert_eq!(retrieval.candidates[0].id, 1);
        assert_eq!(retrieval.candidates.len(), 3);
        assert_eq!(retrieval.broadened, 2);
        assert!(retrieval.candidates.iter().all(|c| c.id != 3));
    }

    #[tokio::test]
    async fn test_broaden_pool_is_sampled_by_catalog() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_find_candidates()
            .withf(|filters: &CandidateFilters| !filters.sample)
            .times(1)
            .returning(|filters| Ok(products().into_iter().filter(|p| filters.matches(p)).collect()));
        catalog
            .expect_find_candidates()
            .withf(|filters: &CandidateFilters| filters.sample && !filters.has_keywords())
            .times(1)
            .returning(|filters| Ok(products().into_iter().filter(|p| filters.matches(p)).collect()));
        catalog.expect_name().return_const("mock");

        let retriever = CandidateRetriever::new(Arc::new(catalog), 1000, 3);
        let mut req = request(&["armchair"]);
        req.keyword_fallback = KeywordFallback::Broaden;
        let retrieval = retriever.retrieve(&req, &mut rng()).await.unwrap();

        assert_eq!(retrieval.candidates[0].id, 4);
        assert_eq!(retrieval.broadened, 2);
    }

    #[tokio::test]
    async fn test_product_type_validation_uses_name_or_attribute() {
        let mut catalog = filtering_mock();
        catalog.expect_get_attributes().returning(|_, _| {
            let mut rows = HashMap::new();
            rows.insert(4, vec![AttributeRow::new(4, names::FURNITURE_TYPE, "Accent Chair")]);
            Ok(rows)
        });
        let retriever = CandidateRetriever::new(Arc::new(catalog), 1000, 3);
        let mut req = request(&[]);
        req.enrichment.product_types = vec!["sofa".to_string(), "chair".to_string()];

        let retrieval = retriever.retrieve(&req, &mut rng()).await.unwrap();
        let ids: Vec<_> = retrieval.candidates.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let mut catalog = MockCatalog::new();
        catalog
            .expect_find_candidates()
            .returning(|_| Err(AppError::Catalog("connection refused".to_string())));
        catalog.expect_name().return_const("mock");
        let retriever = CandidateRetriever::new(Arc::new(catalog), 1000, 3);

        let result = retriever.retrieve(&request(&["sofa"]), &mut rng()).await;
        assert!(matches!(result, Err(AppError::Catalog(_))));
    }
}
