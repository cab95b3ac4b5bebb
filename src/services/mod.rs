pub mod attributes;
pub mod catalog;
pub mod combiner;
pub mod diversity;
pub mod enrichment;
pub mod history;
pub mod keywords;
pub mod random;
pub mod reasoning;
pub mod recommendations;
pub mod retrieval;
pub mod scoring;
pub mod weights;

pub use catalog::{CandidateFilters, Catalog};
pub use history::HistoryStore;
pub use random::RandomSource;
pub use recommendations::{EngineSettings, RecommendationEngine};
