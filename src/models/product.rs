use serde::{Deserialize, Serialize};

/// Catalog product identifier
pub type ProductId = i64;

/// Attribute names carried by the catalog's EAV rows
pub mod attribute_names {
    pub const COLOR_PRIMARY: &str = "color_primary";
    pub const COLOR_SECONDARY: &str = "color_secondary";
    pub const COLOR_ACCENT: &str = "color_accent";
    pub const MATERIAL_PRIMARY: &str = "material_primary";
    pub const MATERIAL_SECONDARY: &str = "material_secondary";
    pub const TEXTURE: &str = "texture";
    pub const PATTERN: &str = "pattern";
    pub const STYLE: &str = "style";
    pub const WIDTH: &str = "width";
    pub const DEPTH: &str = "depth";
    pub const HEIGHT: &str = "height";
    pub const FURNITURE_TYPE: &str = "furniture_type";

    pub const COLORS: &[&str] = &[COLOR_PRIMARY, COLOR_SECONDARY, COLOR_ACCENT];
    pub const MATERIALS: &[&str] = &[MATERIAL_PRIMARY, MATERIAL_SECONDARY];
    pub const DIMENSIONS: &[&str] = &[WIDTH, DEPTH, HEIGHT];
}

/// A product as exposed by the catalog. Read-only to the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductCandidate {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `None` for enquiry-priced items
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub brand: Option<String>,
    pub source_website: String,
    pub is_available: bool,
    #[serde(default)]
    pub is_on_sale: bool,
}

impl ProductCandidate {
    pub fn new(id: ProductId, name: impl Into<String>, source_website: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            price: None,
            brand: None,
            source_website: source_website.into(),
            is_available: true,
            is_on_sale: false,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.is_available = false;
        self
    }

    /// Lowercased name and description, joined for keyword inference
    pub fn searchable_text(&self) -> String {
        match &self.description {
            Some(description) => format!("{} {}", self.name, description).to_lowercase(),
            None => self.name.to_lowercase(),
        }
    }
}

/// One `(product_id, attribute_name, attribute_value)` record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeRow {
    pub product_id: ProductId,
    pub attribute_name: String,
    pub attribute_value: String,
}

impl AttributeRow {
    pub fn new(product_id: ProductId, name: &str, value: &str) -> Self {
        Self {
            product_id,
            attribute_name: name.to_string(),
            attribute_value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchable_text_includes_description() {
        let product = ProductCandidate::new(1, "Oak Bench", "woodhaus.com")
            .with_description("Rustic Entryway seating");
        assert_eq!(product.searchable_text(), "oak bench rustic entryway seating");
    }

    #[test]
    fn test_new_product_defaults() {
        let product = ProductCandidate::new(7, "Floor Lamp", "lumen.com");
        assert!(product.is_available);
        assert!(!product.is_on_sale);
        assert_eq!(product.price, None);
    }

    #[test]
    fn test_product_deserializes_with_missing_optionals() {
        let json = r#"{"id":3,"name":"Pouf","source_website":"a.com","is_available":true}"#;
        let product: ProductCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 3);
        assert_eq!(product.price, None);
        assert!(!product.is_on_sale);
    }
}
