use serde::Serialize;
use std::collections::HashMap;

use super::contains_term;

/// Named interior styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Modern,
    Contemporary,
    Minimalist,
    Traditional,
    Rustic,
    Industrial,
    Scandinavian,
    Bohemian,
    MidCenturyModern,
    Farmhouse,
    Coastal,
}

pub const ALL_STYLES: [Style; 11] = [
    Style::Modern,
    Style::Contemporary,
    Style::Minimalist,
    Style::Traditional,
    Style::Rustic,
    Style::Industrial,
    Style::Scandinavian,
    Style::Bohemian,
    Style::MidCenturyModern,
    Style::Farmhouse,
    Style::Coastal,
];

impl Style {
    /// Lenient parse of a user- or catalog-supplied style name
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
        let style = match normalized.as_str() {
            "modern" => Style::Modern,
            "contemporary" => Style::Contemporary,
            "minimalist" | "minimal" | "minimalism" => Style::Minimalist,
            "traditional" | "classic" => Style::Traditional,
            "rustic" => Style::Rustic,
            "industrial" => Style::Industrial,
            "scandinavian" | "scandi" | "nordic" => Style::Scandinavian,
            "bohemian" | "boho" => Style::Bohemian,
            "mid_century_modern" | "mid_century" | "midcentury" | "mid_century_mod" => {
                Style::MidCenturyModern
            }
            "farmhouse" | "modern_farmhouse" => Style::Farmhouse,
            "coastal" | "beach" | "nautical" => Style::Coastal,
            _ => return None,
        };
        Some(style)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Style::Modern => "modern",
            Style::Contemporary => "contemporary",
            Style::Minimalist => "minimalist",
            Style::Traditional => "traditional",
            Style::Rustic => "rustic",
            Style::Industrial => "industrial",
            Style::Scandinavian => "scandinavian",
            Style::Bohemian => "bohemian",
            Style::MidCenturyModern => "mid-century modern",
            Style::Farmhouse => "farmhouse",
            Style::Coastal => "coastal",
        }
    }
}

/// First matching entry wins; more specific styles come first
const STYLE_KEYWORDS: &[(Style, &[&str])] = &[
    (
        Style::MidCenturyModern,
        &["mid-century", "mid century", "midcentury", "retro", "eames"],
    ),
    (Style::Scandinavian, &["scandinavian", "nordic", "scandi", "hygge"]),
    (Style::Industrial, &["industrial", "iron", "pipe", "loft", "metal frame"]),
    (Style::Farmhouse, &["farmhouse", "barn", "shiplap"]),
    (Style::Rustic, &["rustic", "reclaimed", "distressed", "weathered"]),
    (Style::Bohemian, &["bohemian", "boho", "rattan", "macrame", "jute", "kilim"]),
    (Style::Coastal, &["coastal", "beach", "nautical", "driftwood", "seagrass"]),
    (
        Style::Traditional,
        &["traditional", "classic", "victorian", "carved", "antique", "chesterfield"],
    ),
    (Style::Minimalist, &["minimalist", "minimal", "clean lines", "simple"]),
    (Style::Contemporary, &["contemporary"]),
    (Style::Modern, &["modern", "sleek", "glossy", "chrome"]),
];

/// Fallback when nothing in the product text points at a style
pub const DEFAULT_PRODUCT_STYLE: Style = Style::Contemporary;

/// Infers a product's style from its text, first matching keyword wins
pub fn infer_style(text: &str) -> Style {
    STYLE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_term(text, k)))
        .map(|(style, _)| *style)
        .unwrap_or(DEFAULT_PRODUCT_STYLE)
}

// Rows are the shopper's style, columns the product's, in ALL_STYLES order.
const MATRIX: [[f64; 11]; 11] = [
    [1.0, 0.9, 0.85, 0.3, 0.3, 0.7, 0.75, 0.35, 0.75, 0.3, 0.5],
    [0.9, 1.0, 0.8, 0.45, 0.4, 0.65, 0.75, 0.45, 0.7, 0.4, 0.6],
    [0.85, 0.8, 1.0, 0.3, 0.3, 0.6, 0.9, 0.2, 0.7, 0.3, 0.5],
    [0.3, 0.45, 0.25, 1.0, 0.6, 0.2, 0.35, 0.4, 0.4, 0.75, 0.5],
    [0.3, 0.4, 0.3, 0.6, 1.0, 0.7, 0.55, 0.6, 0.4, 0.9, 0.55],
    [0.7, 0.65, 0.6, 0.2, 0.65, 1.0, 0.5, 0.35, 0.65, 0.5, 0.3],
    [0.75, 0.75, 0.85, 0.35, 0.55, 0.5, 1.0, 0.45, 0.75, 0.55, 0.65],
    [0.35, 0.45, 0.2, 0.4, 0.6, 0.35, 0.45, 1.0, 0.5, 0.5, 0.65],
    [0.75, 0.7, 0.65, 0.4, 0.4, 0.65, 0.75, 0.5, 1.0, 0.35, 0.45],
    [0.3, 0.4, 0.3, 0.75, 0.9, 0.5, 0.55, 0.5, 0.35, 1.0, 0.6],
    [0.5, 0.6, 0.55, 0.5, 0.55, 0.3, 0.7, 0.6, 0.45, 0.6, 1.0],
];

/// Immutable shopper-style × product-style compatibility table
#[derive(Debug, Clone)]
pub struct StyleMatrix {
    entries: HashMap<Style, HashMap<Style, f64>>,
}

impl Default for StyleMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleMatrix {
    pub fn new() -> Self {
        let entries = ALL_STYLES
            .iter()
            .zip(MATRIX.iter())
            .map(|(user, row)| {
                let columns = ALL_STYLES.iter().copied().zip(row.iter().copied()).collect();
                (*user, columns)
            })
            .collect();
        Self { entries }
    }

    pub fn compatibility(&self, user: Style, product: Style) -> f64 {
        self.entries
            .get(&user)
            .and_then(|row| row.get(&product))
            .copied()
            .unwrap_or(0.5)
    }

    /// Best compatibility across all requested styles
    pub fn best(&self, user_styles: &[Style], product: Style) -> f64 {
        user_styles
            .iter()
            .map(|user| self.compatibility(*user, product))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!(Style::parse("Mid-Century Modern"), Some(Style::MidCenturyModern));
        assert_eq!(Style::parse("boho"), Some(Style::Bohemian));
        assert_eq!(Style::parse(" Scandi "), Some(Style::Scandinavian));
        assert_eq!(Style::parse("baroque"), None);
    }

    #[test]
    fn test_infer_style_first_match_wins() {
        assert_eq!(infer_style("mid-century modern walnut sideboard"), Style::MidCenturyModern);
        assert_eq!(infer_style("modern rattan lounge chair"), Style::Bohemian);
        assert_eq!(infer_style("sleek chrome stool"), Style::Modern);
    }

    #[test]
    fn test_infer_style_defaults_to_contemporary() {
        assert_eq!(infer_style("three seater sofa"), Style::Contemporary);
    }

    #[test]
    fn test_infer_style_needs_whole_words() {
        // "environment" must not read as "iron"
        assert_eq!(infer_style("environment friendly chair"), Style::Contemporary);
    }

    #[test]
    fn test_matrix_diagonal_is_perfect() {
        let matrix = StyleMatrix::new();
        for style in ALL_STYLES {
            assert_eq!(matrix.compatibility(style, style), 1.0);
        }
    }

    #[test]
    fn test_matrix_allows_asymmetry() {
        let matrix = StyleMatrix::new();
        assert_eq!(matrix.compatibility(Style::Minimalist, Style::Scandinavian), 0.9);
        assert_eq!(matrix.compatibility(Style::Scandinavian, Style::Minimalist), 0.85);
    }

    #[test]
    fn test_best_takes_max_over_user_styles() {
        let matrix = StyleMatrix::new();
        let score = matrix.best(&[Style::Traditional, Style::Industrial], Style::Modern);
        assert_eq!(score, 0.7);
    }

    #[test]
    fn test_every_entry_in_unit_range() {
        for row in MATRIX {
            for value in row {
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }
}
