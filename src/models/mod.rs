pub mod product;
pub mod recommendation;
pub mod request;

pub use product::{attribute_names, AttributeRow, ProductCandidate, ProductId};
pub use recommendation::{ProductScore, RecommendationResponse, RecommendationResult, Strategy};
pub use request::{
    AttributePreferences, BudgetRange, DesignerEnrichment, DimensionLimits, DiversityMode,
    KeywordFallback, RecommendationRequest, RoomContext,
};
