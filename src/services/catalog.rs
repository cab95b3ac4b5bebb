use regex::Regex;
use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{AttributeRow, BudgetRange, ProductCandidate, ProductId},
    services::keywords::ProductCategory,
};

/// Read-only product catalog abstraction
///
/// The engine needs two capabilities from storage: a filtered candidate query and
/// a batched EAV attribute lookup. Attribute lookups take whole id lists so that a
/// request issues one query per attribute dimension, never one per product.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// Available products passing every filter, at most `filters.limit`
    ///
    /// Ordered by id, except that `filters.sample` asks for an arbitrary subset
    /// drawn from the whole matching catalog.
    async fn find_candidates(&self, filters: &CandidateFilters)
        -> AppResult<Vec<ProductCandidate>>;

    /// Attribute rows for the given products, restricted to `attribute_names`
    ///
    /// Products without matching rows are absent from the returned map.
    async fn get_attributes(
        &self,
        product_ids: &[ProductId],
        attribute_names: &[&'static str],
    ) -> AppResult<HashMap<ProductId, Vec<AttributeRow>>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Case-insensitive whole-word pattern for a literal term
pub fn word_pattern(term: &str) -> AppResult<Regex> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term.trim())))
        .map_err(|e| AppError::InvalidInput(format!("Unusable keyword '{}': {}", term, e)))
}

/// Keywords from one product-type bucket; a name matches if any keyword does
#[derive(Debug, Clone)]
pub struct KeywordGroup {
    pub category: ProductCategory,
    pub keywords: Vec<String>,
    patterns: Vec<Regex>,
}

impl KeywordGroup {
    pub fn new(category: ProductCategory, keywords: Vec<String>) -> AppResult<Self> {
        let patterns = keywords
            .iter()
            .map(|k| word_pattern(k))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self {
            category,
            keywords,
            patterns,
        })
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }
}

/// Retrieval-time filters
///
/// `matches` is the reference semantics every `Catalog` backend must reproduce:
/// available only, store allow-list, keyword groups against the product name
/// (never the description), accessory exclusions, inclusive budget, excluded ids.
#[derive(Debug, Clone)]
pub struct CandidateFilters {
    pub stores: Option<Vec<String>>,
    pub keyword_groups: Vec<KeywordGroup>,
    pub excluded_terms: Vec<String>,
    exclusion_pattern: Option<Regex>,
    pub budget: Option<BudgetRange>,
    pub excluded_ids: Vec<ProductId>,
    pub limit: usize,
    /// Draw `limit` rows at random instead of the lowest ids
    pub sample: bool,
}

impl CandidateFilters {
    /// Filters with only the availability check and a row cap
    pub fn new(limit: usize) -> Self {
        Self {
            stores: None,
            keyword_groups: Vec::new(),
            excluded_terms: Vec::new(),
            exclusion_pattern: None,
            budget: None,
            excluded_ids: Vec::new(),
            limit,
            sample: false,
        }
    }

    pub fn with_stores(mut self, stores: Option<Vec<String>>) -> Self {
        self.stores = stores.filter(|s| !s.is_empty());
        self
    }

    pub fn with_keyword_groups(mut self, groups: Vec<KeywordGroup>) -> Self {
        self.keyword_groups = groups;
        self
    }

    pub fn with_excluded_terms(mut self, terms: Vec<String>) -> AppResult<Self> {
        self.exclusion_pattern = if terms.is_empty() {
            None
        } else {
            let alternation = terms
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))
                    .map_err(|e| AppError::Internal(format!("Exclusion pattern error: {}", e)))?,
            )
        };
        self.excluded_terms = terms;
        Ok(self)
    }

    pub fn with_budget(mut self, budget: Option<BudgetRange>) -> Self {
        self.budget = budget.filter(|b| !b.is_unbounded());
        self
    }

    pub fn with_excluded_ids(mut self, ids: Vec<ProductId>) -> Self {
        self.excluded_ids = ids;
        self
    }

    /// Same filters without the keyword condition, sampled across the catalog
    pub fn sampling_pool(&self) -> Self {
        let mut filters = self.clone();
        filters.keyword_groups.clear();
        filters.sample = true;
        filters
    }

    pub fn has_keywords(&self) -> bool {
        !self.keyword_groups.is_empty()
    }

    pub fn matches(&self, product: &ProductCandidate) -> bool {
        if !product.is_available {
            return false;
        }

        if let Some(stores) = &self.stores {
            if !stores
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&product.source_website))
            {
                return false;
            }
        }

        if self.has_keywords()
            && !self
                .keyword_groups
                .iter()
                .any(|group| group.matches_name(&product.name))
        {
            return false;
        }

        if let Some(pattern) = &self.exclusion_pattern {
            if pattern.is_match(&product.name) {
                return false;
            }
        }

        if let Some(budget) = &self.budget {
            match product.price {
                Some(price) if budget.contains(price) => {}
                _ => return false,
            }
        }

        !self.excluded_ids.contains(&product.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sofa_group() -> KeywordGroup {
        KeywordGroup::new(ProductCategory::Sofas, vec!["sofa".to_string()]).unwrap()
    }

    #[test]
    fn test_word_pattern_requires_whole_word() {
        let pattern = word_pattern("lamp").unwrap();
        assert!(pattern.is_match("Brass Lamp"));
        assert!(pattern.is_match("LAMP shade"));
        assert!(!pattern.is_match("Lampshade"));
        assert!(!pattern.is_match("Clamp"));
    }

    #[test]
    fn test_word_pattern_escapes_regex_syntax() {
        let pattern = word_pattern("3+2 seater").unwrap();
        assert!(pattern.is_match("Sofa Set 3+2 Seater"));
    }

    #[test]
    fn test_keywords_match_name_only() {
        let filters = CandidateFilters::new(10).with_keyword_groups(vec![sofa_group()]);
        let named = ProductCandidate::new(1, "Velvet Sofa", "a.com");
        let described = ProductCandidate::new(2, "Throw Pillow", "a.com")
            .with_description("Looks great on any sofa");

        assert!(filters.matches(&named));
        assert!(!filters.matches(&described));
    }

    #[test]
    fn test_unavailable_products_never_match() {
        let filters = CandidateFilters::new(10);
        let product = ProductCandidate::new(1, "Sofa", "a.com").unavailable();
        assert!(!filters.matches(&product));
    }

    #[test]
    fn test_exclusion_terms_reject_accessories() {
        let filters = CandidateFilters::new(10)
            .with_keyword_groups(vec![sofa_group()])
            .with_excluded_terms(vec!["legs".to_string(), "sample".to_string()])
            .unwrap();

        assert!(!filters.matches(&ProductCandidate::new(1, "Sofa Legs Set of 4", "a.com")));
        assert!(!filters.matches(&ProductCandidate::new(2, "Sofa Fabric Sample", "a.com")));
        assert!(filters.matches(&ProductCandidate::new(3, "Sofa Sleeper", "a.com")));
    }

    #[test]
    fn test_budget_excludes_unpriced_and_out_of_range() {
        let filters = CandidateFilters::new(10).with_budget(Some(BudgetRange::new(100.0, 500.0)));
        assert!(filters.matches(&ProductCandidate::new(1, "Chair", "a.com").with_price(500.0)));
        assert!(!filters.matches(&ProductCandidate::new(2, "Chair", "a.com").with_price(501.0)));
        assert!(!filters.matches(&ProductCandidate::new(3, "Chair", "a.com")));
    }

    #[test]
    fn test_store_allow_list_and_excluded_ids() {
        let filters = CandidateFilters::new(10)
            .with_stores(Some(vec!["Woodhaus.com".to_string()]))
            .with_excluded_ids(vec![2]);

        assert!(filters.matches(&ProductCandidate::new(1, "Chair", "woodhaus.com")));
        assert!(!filters.matches(&ProductCandidate::new(2, "Chair", "woodhaus.com")));
        assert!(!filters.matches(&ProductCandidate::new(3, "Chair", "other.com")));
    }

    #[test]
    fn test_empty_store_list_means_no_restriction() {
        let filters = CandidateFilters::new(10).with_stores(Some(vec![]));
        assert!(filters.stores.is_none());
    }

    #[test]
    fn test_sampling_pool_keeps_other_filters() {
        let filters = CandidateFilters::new(10)
            .with_keyword_groups(vec![sofa_group()])
            .with_excluded_ids(vec![9]);
        assert!(!filters.sample);

        let pool = filters.sampling_pool();
        assert!(!pool.has_keywords());
        assert!(pool.sample);
        assert_eq!(pool.excluded_ids, vec![9]);
    }
}
