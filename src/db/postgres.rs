use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{AttributeRow, ProductCandidate, ProductId},
    services::catalog::{CandidateFilters, Catalog},
};

/// Creates a PostgreSQL connection pool
///
/// The engine only reads, so a small pool is enough even under concurrent load.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

const CANDIDATE_COLUMNS: &str = "SELECT id, name, description, price::float8 AS price, brand, \
     source_website, is_available, is_on_sale FROM products WHERE is_available = TRUE";

#[derive(Debug, sqlx::FromRow)]
struct CandidateRecord {
    id: i64,
    name: String,
    description: Option<String>,
    price: Option<f64>,
    brand: Option<String>,
    source_website: String,
    is_available: bool,
    is_on_sale: bool,
}

impl From<CandidateRecord> for ProductCandidate {
    fn from(record: CandidateRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            price: record.price,
            brand: record.brand,
            source_website: record.source_website,
            is_available: record.is_available,
            is_on_sale: record.is_on_sale,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AttributeRecord {
    product_id: i64,
    attribute_name: String,
    attribute_value: String,
}

/// Postgres ARE whole-word pattern; `~*` supplies case-insensitivity
fn pg_word_pattern(terms: &[String]) -> String {
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t.trim()))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"\y(?:{})\y", alternation)
}

/// Catalog backed by the `products` and `product_attributes` tables
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Translates `CandidateFilters` into one parameterized query
    fn candidate_query(filters: &CandidateFilters) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(CANDIDATE_COLUMNS);

        if let Some(stores) = &filters.stores {
            let stores: Vec<String> = stores.iter().map(|s| s.to_lowercase()).collect();
            query.push(" AND lower(source_website) = ANY(");
            query.push_bind(stores);
            query.push(")");
        }

        if filters.has_keywords() {
            // OR within a category, then OR across categories
            query.push(" AND (");
            for (i, group) in filters.keyword_groups.iter().enumerate() {
                if i > 0 {
                    query.push(" OR ");
                }
                query.push("name ~* ");
                query.push_bind(pg_word_pattern(&group.keywords));
            }
            query.push(")");
        }

        if !filters.excluded_terms.is_empty() {
            query.push(" AND name !~* ");
            query.push_bind(pg_word_pattern(&filters.excluded_terms));
        }

        if let Some(budget) = &filters.budget {
            if let Some(min) = budget.min {
                query.push(" AND price >= ");
                query.push_bind(min);
            }
            if let Some(max) = budget.max {
                query.push(" AND price <= ");
                query.push_bind(max);
            }
        }

        if !filters.excluded_ids.is_empty() {
            query.push(" AND NOT (id = ANY(");
            query.push_bind(filters.excluded_ids.clone());
            query.push("))");
        }

        query.push(if filters.sample {
            " ORDER BY random() LIMIT "
        } else {
            " ORDER BY id LIMIT "
        });
        query.push_bind(filters.limit as i64);
        query
    }
}

#[async_trait::async_trait]
impl Catalog for PgCatalog {
    async fn find_candidates(&self, filters: &CandidateFilters) -> AppResult<Vec<ProductCandidate>> {
        let mut query = Self::candidate_query(filters);
        let records: Vec<CandidateRecord> = query.build_query_as().fetch_all(&self.pool).await?;

        Ok(records.into_iter().map(ProductCandidate::from).collect())
    }

    async fn get_attributes(
        &self,
        product_ids: &[ProductId],
        attribute_names: &[&'static str],
    ) -> AppResult<HashMap<ProductId, Vec<AttributeRow>>> {
        if product_ids.is_empty() || attribute_names.is_empty() {
            return Ok(HashMap::new());
        }

        let names: Vec<String> = attribute_names.iter().map(|n| n.to_string()).collect();
        let records: Vec<AttributeRecord> = sqlx::query_as(
            r#"
            SELECT product_id, attribute_name, attribute_value
            FROM product_attributes
            WHERE product_id = ANY($1) AND attribute_name = ANY($2)
            ORDER BY product_id, attribute_name
            "#,
        )
        .bind(product_ids)
        .bind(&names[..])
        .fetch_all(&self.pool)
        .await?;

        let mut rows: HashMap<ProductId, Vec<AttributeRow>> = HashMap::new();
        for record in records {
            rows.entry(record.product_id).or_default().push(AttributeRow {
                product_id: record.product_id,
                attribute_name: record.attribute_name,
                attribute_value: record.attribute_value,
            });
        }

        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::BudgetRange,
        services::{catalog::KeywordGroup, keywords::ProductCategory},
    };

    #[test]
    fn test_pg_word_pattern_escapes_terms() {
        let pattern = pg_word_pattern(&["floor lamp".to_string(), "3.5 seater".to_string()]);
        assert_eq!(pattern, r"\y(?:floor lamp|3\.5 seater)\y");
    }

    #[test]
    fn test_candidate_query_shape() {
        let filters = CandidateFilters::new(1000)
            .with_stores(Some(vec!["Store.com".to_string()]))
            .with_keyword_groups(vec![
                KeywordGroup::new(ProductCategory::Sofas, vec!["sofa".to_string()]).unwrap(),
                KeywordGroup::new(ProductCategory::Chairs, vec!["chair".to_string()]).unwrap(),
            ])
            .with_excluded_terms(vec!["hook".to_string()])
            .unwrap()
            .with_budget(Some(BudgetRange::new(100.0, 500.0)))
            .with_excluded_ids(vec![7]);

        let query = PgCatalog::candidate_query(&filters);
        let sql = query.sql();
        assert!(sql.starts_with("SELECT id, name"));
        assert!(sql.contains("lower(source_website) = ANY($1)"));
        assert!(sql.contains("AND (name ~* $2 OR name ~* $3)"));
        assert!(sql.contains("AND name !~* $4"));
        assert!(sql.contains("price >= $5 AND price <= $6"));
        assert!(sql.contains("NOT (id = ANY($7))"));
        assert!(sql.ends_with("ORDER BY id LIMIT $8"));
    }

    #[test]
    fn test_candidate_query_without_filters() {
        let query = PgCatalog::candidate_query(&CandidateFilters::new(50));
        assert_eq!(
            query.sql(),
            format!("{} ORDER BY id LIMIT $1", CANDIDATE_COLUMNS)
        );
    }

    #[test]
    fn test_sampling_pool_orders_randomly() {
        let filters = CandidateFilters::new(50)
            .with_keyword_groups(vec![
                KeywordGroup::new(ProductCategory::Sofas, vec!["sofa".to_string()]).unwrap(),
            ])
            .sampling_pool();
        let query = PgCatalog::candidate_query(&filters);
        assert!(!query.sql().contains("~*"));
        assert!(query.sql().ends_with("ORDER BY random() LIMIT $1"));
    }
}
