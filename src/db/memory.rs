use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{AttributeRow, ProductCandidate, ProductId},
    services::catalog::{CandidateFilters, Catalog},
};

/// Catalog held entirely in memory, for tests and local runs without Postgres
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Vec<ProductCandidate>,
    attributes: HashMap<ProductId, Vec<AttributeRow>>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<ProductCandidate>) -> Self {
        Self {
            products,
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, product_id: ProductId, name: &str, value: &str) -> Self {
        self.attributes
            .entry(product_id)
            .or_default()
            .push(AttributeRow::new(product_id, name, value));
        self
    }
}

#[async_trait::async_trait]
impl Catalog for InMemoryCatalog {
    /// Always in id order; sampled pools are shuffled by the retriever, which
    /// keeps seeded runs reproducible.
    async fn find_candidates(&self, filters: &CandidateFilters) -> AppResult<Vec<ProductCandidate>> {
        let mut matches: Vec<ProductCandidate> = self
            .products
            .iter()
            .filter(|p| filters.matches(p))
            .cloned()
            .collect();
        matches.sort_by_key(|p| p.id);
        matches.truncate(filters.limit);
        Ok(matches)
    }

    async fn get_attributes(
        &self,
        product_ids: &[ProductId],
        attribute_names: &[&'static str],
    ) -> AppResult<HashMap<ProductId, Vec<AttributeRow>>> {
        let mut rows = HashMap::new();
        for id in product_ids {
            let Some(product_rows) = self.attributes.get(id) else {
                continue;
            };
            let selected: Vec<AttributeRow> = product_rows
                .iter()
                .filter(|row| attribute_names.contains(&row.attribute_name.as_str()))
                .cloned()
                .collect();
            if !selected.is_empty() {
                rows.insert(*id, selected);
            }
        }
        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attribute_names as names;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            ProductCandidate::new(3, "Linen Sofa", "a.com"),
            ProductCandidate::new(1, "Oak Table", "b.com"),
            ProductCandidate::new(2, "Old Chair", "a.com").unavailable(),
        ])
        .with_attribute(1, names::MATERIAL_PRIMARY, "oak")
        .with_attribute(1, names::COLOR_PRIMARY, "brown")
    }

    #[tokio::test]
    async fn test_find_candidates_orders_and_caps() {
        let found = catalog().find_candidates(&CandidateFilters::new(1)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[tokio::test]
    async fn test_find_candidates_skips_unavailable() {
        let found = catalog().find_candidates(&CandidateFilters::new(10)).await.unwrap();
        let ids: Vec<_> = found.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_get_attributes_restricts_names() {
        let rows = catalog()
            .get_attributes(&[1, 3], names::MATERIALS)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[&1], vec![AttributeRow::new(1, names::MATERIAL_PRIMARY, "oak")]);
    }
}
