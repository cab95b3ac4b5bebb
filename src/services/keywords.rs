//! Keyword categorization.
//!
//! Free-text product keywords are grouped into product-type buckets so that the
//! retriever can OR keywords within a bucket and then OR the buckets together.
//! Buckets are never narrowed to one another: a request for "sofa" and
//! "side table" still matches either. Callers that need a single product type
//! must send only that type's keywords.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Mutually exclusive product-type buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    CeilingLighting,
    PortableLighting,
    WallLighting,
    Sofas,
    Chairs,
    OtherSeating,
    CenterTables,
    SideTables,
    DiningTables,
    OtherTables,
    StorageFurniture,
    BedroomFurniture,
    WallDecor,
    DecorPlanters,
    GeneralLighting,
    Other,
}

const CATEGORY_TERMS: &[(ProductCategory, &[&str])] = &[
    (
        ProductCategory::CeilingLighting,
        &[
            "chandelier",
            "chandeliers",
            "pendant",
            "pendants",
            "pendant light",
            "pendant lamp",
            "ceiling light",
            "ceiling lamp",
            "ceiling lighting",
            "ceiling fan",
        ],
    ),
    (
        ProductCategory::PortableLighting,
        &[
            "table lamp",
            "table lamps",
            "floor lamp",
            "floor lamps",
            "desk lamp",
            "desk lamps",
            "reading lamp",
            "bedside lamp",
        ],
    ),
    (
        ProductCategory::WallLighting,
        &["wall light", "wall lights", "wall lamp", "sconce", "sconces", "wall sconce"],
    ),
    (
        ProductCategory::Sofas,
        &["sofa", "sofas", "couch", "couches", "sectional", "loveseat", "settee", "sofa bed"],
    ),
    (
        ProductCategory::Chairs,
        &[
            "chair",
            "chairs",
            "armchair",
            "armchairs",
            "accent chair",
            "lounge chair",
            "dining chair",
            "office chair",
            "recliner",
            "rocking chair",
        ],
    ),
    (
        ProductCategory::OtherSeating,
        &[
            "ottoman", "ottomans", "bench", "benches", "stool", "stools", "pouf", "pouffe",
            "bean bag", "footstool",
        ],
    ),
    (
        ProductCategory::CenterTables,
        &["coffee table", "coffee tables", "center table", "centre table", "cocktail table"],
    ),
    (
        ProductCategory::SideTables,
        &["side table", "side tables", "end table", "end tables", "accent table"],
    ),
    (
        ProductCategory::DiningTables,
        &["dining table", "dining tables", "dinner table", "kitchen table"],
    ),
    (
        ProductCategory::OtherTables,
        &["table", "tables", "console table", "console", "desk", "desks", "study table"],
    ),
    (
        ProductCategory::StorageFurniture,
        &[
            "bookshelf",
            "bookshelves",
            "bookcase",
            "cabinet",
            "cabinets",
            "wardrobe",
            "shelf",
            "shelves",
            "dresser",
            "sideboard",
            "tv unit",
            "tv stand",
            "chest of drawers",
            "storage",
        ],
    ),
    (
        ProductCategory::BedroomFurniture,
        &[
            "bed",
            "beds",
            "mattress",
            "nightstand",
            "nightstands",
            "bedside table",
            "headboard",
        ],
    ),
    (
        ProductCategory::WallDecor,
        &[
            "wall art", "wall decor", "painting", "paintings", "mirror", "mirrors", "frame",
            "frames", "clock", "wall clock",
        ],
    ),
    (
        ProductCategory::DecorPlanters,
        &[
            "planter", "planters", "vase", "vases", "plant", "plants", "pot", "pots", "decor",
            "cushion", "cushions", "rug", "rugs", "carpet", "throw",
        ],
    ),
    (
        ProductCategory::GeneralLighting,
        &["lamp", "lamps", "light", "lights", "lighting", "lantern"],
    ),
];

/// Maps keywords to product-type buckets using a fixed term table
#[derive(Debug, Clone)]
pub struct KeywordCategorizer {
    terms: HashMap<&'static str, ProductCategory>,
}

impl Default for KeywordCategorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordCategorizer {
    pub fn new() -> Self {
        let terms = CATEGORY_TERMS
            .iter()
            .flat_map(|(category, terms)| terms.iter().map(move |term| (*term, *category)))
            .collect();
        Self { terms }
    }

    /// Category for a single keyword; unmapped terms land in `Other`
    pub fn category_of(&self, keyword: &str) -> ProductCategory {
        self.terms
            .get(keyword.trim().to_lowercase().as_str())
            .copied()
            .unwrap_or(ProductCategory::Other)
    }

    /// Groups keywords by category. Each keyword appears once, lowercased.
    pub fn categorize(&self, keywords: &[String]) -> BTreeMap<ProductCategory, Vec<String>> {
        let mut groups: BTreeMap<ProductCategory, Vec<String>> = BTreeMap::new();

        for keyword in keywords {
            let normalized = keyword.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            let bucket = groups.entry(self.category_of(&normalized)).or_default();
            if !bucket.contains(&normalized) {
                bucket.push(normalized);
            }
        }

        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_lamp_types_land_in_distinct_buckets() {
        let categorizer = KeywordCategorizer::new();
        assert_eq!(
            categorizer.category_of("floor lamp"),
            ProductCategory::PortableLighting
        );
        assert_eq!(
            categorizer.category_of("Chandelier"),
            ProductCategory::CeilingLighting
        );
        assert_eq!(categorizer.category_of("lamp"), ProductCategory::GeneralLighting);
        assert_eq!(categorizer.category_of("sconce"), ProductCategory::WallLighting);
    }

    #[test]
    fn test_side_table_is_not_a_sofa() {
        let categorizer = KeywordCategorizer::new();
        let groups = categorizer.categorize(&keywords(&["sofa", "side table", "couch"]));

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&ProductCategory::Sofas], vec!["sofa", "couch"]);
        assert_eq!(groups[&ProductCategory::SideTables], vec!["side table"]);
    }

    #[test]
    fn test_unknown_terms_go_to_other() {
        let categorizer = KeywordCategorizer::new();
        let groups = categorizer.categorize(&keywords(&["hammock", "Hammock", "  "]));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&ProductCategory::Other], vec!["hammock"]);
    }

    #[test]
    fn test_grouping_is_order_independent() {
        let categorizer = KeywordCategorizer::new();
        let a = categorizer.categorize(&keywords(&["ottoman", "rug", "pendant"]));
        let b = categorizer.categorize(&keywords(&["pendant", "ottoman", "rug"]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_table_term_maps_to_exactly_one_category() {
        let mut seen = std::collections::HashSet::new();
        for (_, terms) in CATEGORY_TERMS {
            for term in *terms {
                assert!(seen.insert(*term), "duplicate term {}", term);
            }
        }
    }
}
