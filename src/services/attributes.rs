//! Batched attribute access and strict attribute filtering.

use std::collections::{HashMap, HashSet};

use crate::models::{
    attribute_names as names, AttributePreferences, AttributeRow, ProductCandidate, ProductId,
};

/// Color families used when an exact color match fails
const COLOR_FAMILIES: &[(&str, &[&str])] = &[
    (
        "blue",
        &["blue", "navy", "azure", "cobalt", "indigo", "sky blue", "royal blue", "denim", "teal"],
    ),
    (
        "red",
        &["red", "maroon", "burgundy", "crimson", "wine", "cherry", "scarlet"],
    ),
    (
        "green",
        &["green", "olive", "sage", "emerald", "mint", "forest green", "teal", "lime"],
    ),
    (
        "brown",
        &["brown", "tan", "chocolate", "walnut", "coffee", "caramel", "mocha", "chestnut", "espresso"],
    ),
    (
        "white",
        &["white", "ivory", "cream", "off-white", "off white", "beige", "natural"],
    ),
    ("grey", &["grey", "gray", "charcoal", "silver", "slate", "ash", "graphite"]),
    ("black", &["black", "ebony", "onyx", "jet black"]),
    ("yellow", &["yellow", "mustard", "gold", "golden", "ochre", "lemon"]),
    ("pink", &["pink", "blush", "rose", "fuchsia", "magenta"]),
    ("purple", &["purple", "lavender", "violet", "plum", "mauve", "lilac"]),
    ("orange", &["orange", "rust", "terracotta", "coral", "peach", "amber"]),
];

/// True when both colors belong to at least one shared family
pub fn same_color_family(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    COLOR_FAMILIES
        .iter()
        .any(|(_, members)| members.contains(&a.as_str()) && members.contains(&b.as_str()))
}

fn equals_any(value: &str, wanted: &[String]) -> bool {
    let value = value.trim();
    wanted.iter().any(|w| w.trim().eq_ignore_ascii_case(value))
}

/// In-memory `product id → attribute rows` map built from one batched lookup
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    rows: HashMap<ProductId, Vec<AttributeRow>>,
}

impl AttributeIndex {
    pub fn new(rows: HashMap<ProductId, Vec<AttributeRow>>) -> Self {
        Self { rows }
    }

    /// Values of the named attributes for one product, in row order
    pub fn values<'a>(
        &'a self,
        product_id: ProductId,
        attribute_names: &'a [&'a str],
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .get(&product_id)
            .into_iter()
            .flatten()
            .filter(move |row| attribute_names.contains(&row.attribute_name.as_str()))
            .map(|row| row.attribute_value.as_str())
    }

    /// First value of a single attribute
    pub fn first(&self, product_id: ProductId, attribute_name: &str) -> Option<&str> {
        self.rows
            .get(&product_id)?
            .iter()
            .find(|row| row.attribute_name == attribute_name)
            .map(|row| row.attribute_value.as_str())
    }

    /// Whether any value of the named attributes equals one of `wanted`
    pub fn has_exact(&self, product_id: ProductId, attribute_names: &[&str], wanted: &[String]) -> bool {
        self.values(product_id, attribute_names)
            .any(|value| equals_any(value, wanted))
    }

    pub fn has_any(&self, product_id: ProductId, attribute_names: &[&str]) -> bool {
        self.values(product_id, attribute_names).next().is_some()
    }

    /// Whether any product color shares a family with any requested color
    pub fn has_color_family(&self, product_id: ProductId, wanted: &[String]) -> bool {
        self.values(product_id, names::COLORS)
            .any(|value| wanted.iter().any(|w| same_color_family(value, w)))
    }
}

/// Attribute lookups grouped by dimension, one batched query each
#[derive(Debug, Clone, Default)]
pub struct AttributeSet {
    pub colors: AttributeIndex,
    pub materials: AttributeIndex,
    pub textures: AttributeIndex,
    pub patterns: AttributeIndex,
    pub styles: AttributeIndex,
    pub dimensions: AttributeIndex,
}

/// Attribute dimensions a strict match can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeDimension {
    Colors,
    Materials,
    Textures,
    Patterns,
    Styles,
}

impl AttributeDimension {
    pub fn attribute_names(&self) -> &'static [&'static str] {
        match self {
            AttributeDimension::Colors => names::COLORS,
            AttributeDimension::Materials => names::MATERIALS,
            AttributeDimension::Textures => &[names::TEXTURE],
            AttributeDimension::Patterns => &[names::PATTERN],
            AttributeDimension::Styles => &[names::STYLE],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttributeDimension::Colors => "colors",
            AttributeDimension::Materials => "materials",
            AttributeDimension::Textures => "textures",
            AttributeDimension::Patterns => "patterns",
            AttributeDimension::Styles => "styles",
        }
    }

    fn index<'a>(&self, set: &'a AttributeSet) -> &'a AttributeIndex {
        match self {
            AttributeDimension::Colors => &set.colors,
            AttributeDimension::Materials => &set.materials,
            AttributeDimension::Textures => &set.textures,
            AttributeDimension::Patterns => &set.patterns,
            AttributeDimension::Styles => &set.styles,
        }
    }

    fn wanted<'a>(&self, prefs: &'a AttributePreferences) -> &'a [String] {
        match self {
            AttributeDimension::Colors => &prefs.colors,
            AttributeDimension::Materials => &prefs.materials,
            AttributeDimension::Textures => &prefs.textures,
            AttributeDimension::Patterns => &prefs.patterns,
            AttributeDimension::Styles => &prefs.styles,
        }
    }
}

pub const ALL_DIMENSIONS: [AttributeDimension; 5] = [
    AttributeDimension::Colors,
    AttributeDimension::Materials,
    AttributeDimension::Textures,
    AttributeDimension::Patterns,
    AttributeDimension::Styles,
];

/// Dimensions the request actually constrains
pub fn requested_dimensions(prefs: &AttributePreferences) -> Vec<AttributeDimension> {
    ALL_DIMENSIONS
        .into_iter()
        .filter(|d| d.wanted(prefs).iter().any(|v| !v.trim().is_empty()))
        .collect()
}

/// Zero-false-positive attribute filter
///
/// A candidate survives only if, for every requested dimension, one of its rows
/// matches one requested value exactly (case-insensitive). Colors may also match
/// by family. A product with no rows for a requested dimension is rejected.
pub struct StrictAttributeFilter<'a> {
    prefs: &'a AttributePreferences,
    dimensions: Vec<AttributeDimension>,
}

impl<'a> StrictAttributeFilter<'a> {
    pub fn new(prefs: &'a AttributePreferences) -> Self {
        Self {
            prefs,
            dimensions: requested_dimensions(prefs),
        }
    }

    pub fn accepts(&self, product_id: ProductId, attributes: &AttributeSet) -> bool {
        self.dimensions.iter().all(|dimension| {
            let index = dimension.index(attributes);
            let wanted = dimension.wanted(self.prefs);
            if index.has_exact(product_id, dimension.attribute_names(), wanted) {
                return true;
            }
            *dimension == AttributeDimension::Colors && index.has_color_family(product_id, wanted)
        })
    }

    pub fn apply(
        &self,
        candidates: Vec<ProductCandidate>,
        attributes: &AttributeSet,
    ) -> Vec<ProductCandidate> {
        if self.dimensions.is_empty() {
            return candidates;
        }

        let before = candidates.len();
        let kept: Vec<ProductCandidate> = candidates
            .into_iter()
            .filter(|c| self.accepts(c.id, attributes))
            .collect();

        tracing::info!(
            before,
            after = kept.len(),
            dimensions = ?self.dimensions.iter().map(|d| d.label()).collect::<Vec<_>>(),
            "Strict attribute filter applied"
        );

        kept
    }
}

/// Products whose `furniture_type` attribute relates to one of `product_types`
///
/// A type relates when either string contains the other, case-insensitively.
pub fn furniture_type_matches(
    index: &AttributeIndex,
    product_id: ProductId,
    product_types: &[String],
) -> bool {
    index
        .values(product_id, &[names::FURNITURE_TYPE])
        .map(|value| value.trim().to_lowercase())
        .any(|value| {
            product_types.iter().any(|t| {
                let t = t.trim().to_lowercase();
                !t.is_empty() && (value.contains(&t) || t.contains(&value))
            })
        })
}

/// Distinct product ids of a candidate list, preserving order
pub fn candidate_ids(candidates: &[ProductCandidate]) -> Vec<ProductId> {
    let mut seen = HashSet::new();
    candidates
        .iter()
        .map(|c| c.id)
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(rows: &[(ProductId, &str, &str)]) -> AttributeIndex {
        let mut map: HashMap<ProductId, Vec<AttributeRow>> = HashMap::new();
        for (id, name, value) in rows {
            map.entry(*id)
                .or_default()
                .push(AttributeRow::new(*id, name, value));
        }
        AttributeIndex::new(map)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_color_family_links_shades() {
        assert!(same_color_family("Navy", "blue"));
        assert!(same_color_family("teal", "green"));
        assert!(!same_color_family("navy", "red"));
        assert!(!same_color_family("unknownish", "unknownish"));
    }

    #[test]
    fn test_strict_filter_accepts_exact_match() {
        let prefs = AttributePreferences {
            colors: strings(&["Blue"]),
            ..Default::default()
        };
        let set = AttributeSet {
            colors: index(&[(1, names::COLOR_SECONDARY, "blue")]),
            ..Default::default()
        };
        assert!(StrictAttributeFilter::new(&prefs).accepts(1, &set));
    }

    #[test]
    fn test_strict_filter_uses_color_family_fallback() {
        let prefs = AttributePreferences {
            colors: strings(&["blue"]),
            ..Default::default()
        };
        let set = AttributeSet {
            colors: index(&[(1, names::COLOR_PRIMARY, "Navy")]),
            ..Default::default()
        };
        assert!(StrictAttributeFilter::new(&prefs).accepts(1, &set));
    }

    #[test]
    fn test_family_fallback_is_colors_only() {
        let prefs = AttributePreferences {
            materials: strings(&["oak"]),
            ..Default::default()
        };
        let set = AttributeSet {
            materials: index(&[(1, names::MATERIAL_PRIMARY, "walnut")]),
            ..Default::default()
        };
        assert!(!StrictAttributeFilter::new(&prefs).accepts(1, &set));
    }

    #[test]
    fn test_missing_attribute_is_rejected() {
        let prefs = AttributePreferences {
            colors: strings(&["blue"]),
            materials: strings(&["velvet"]),
            ..Default::default()
        };
        // Color matches, material rows are absent entirely
        let set = AttributeSet {
            colors: index(&[(1, names::COLOR_PRIMARY, "blue")]),
            ..Default::default()
        };
        assert!(!StrictAttributeFilter::new(&prefs).accepts(1, &set));
    }

    #[test]
    fn test_apply_keeps_only_matching_products() {
        let prefs = AttributePreferences {
            textures: strings(&["boucle"]),
            ..Default::default()
        };
        let set = AttributeSet {
            textures: index(&[(1, names::TEXTURE, "Boucle"), (2, names::TEXTURE, "smooth")]),
            ..Default::default()
        };
        let candidates = vec![
            ProductCandidate::new(1, "Chair A", "a.com"),
            ProductCandidate::new(2, "Chair B", "a.com"),
            ProductCandidate::new(3, "Chair C", "a.com"),
        ];
        let kept = StrictAttributeFilter::new(&prefs).apply(candidates, &set);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }

    #[test]
    fn test_requested_dimensions_ignores_blank_values() {
        let prefs = AttributePreferences {
            colors: strings(&["  "]),
            patterns: strings(&["striped"]),
            ..Default::default()
        };
        assert_eq!(requested_dimensions(&prefs), vec![AttributeDimension::Patterns]);
    }

    #[test]
    fn test_furniture_type_matches_substring_either_way() {
        let idx = index(&[
            (1, names::FURNITURE_TYPE, "Sectional Sofa"),
            (2, names::FURNITURE_TYPE, "chair"),
        ]);
        assert!(furniture_type_matches(&idx, 1, &strings(&["sofa"])));
        assert!(furniture_type_matches(&idx, 2, &strings(&["accent chair"])));
        assert!(!furniture_type_matches(&idx, 2, &strings(&["table"])));
        assert!(!furniture_type_matches(&idx, 3, &strings(&["sofa"])));
    }

    #[test]
    fn test_index_first_and_values() {
        let idx = index(&[
            (5, names::COLOR_PRIMARY, "red"),
            (5, names::COLOR_ACCENT, "gold"),
            (5, names::WIDTH, "80"),
        ]);
        assert_eq!(idx.first(5, names::WIDTH), Some("80"));
        assert_eq!(idx.values(5, names::COLORS).collect::<Vec<_>>(), vec!["red", "gold"]);
        assert!(idx.has_any(5, names::COLORS));
        assert!(!idx.has_any(6, names::COLORS));
    }
}
