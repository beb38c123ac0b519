//! Product recommendations
//!
//! Combines two independent signals for a customer: attribute similarity between
//! unpurchased and purchased products, and a hand-curated association table. The
//! similarity list is ranked and truncated, then merged with the association list
//! and deduplicated by product name.

mod associations;
mod engine;
mod gateway;
mod similarity;
#[cfg(test)]
pub(crate) mod test_support;

pub use associations::{AssociationResolver, AssociationTable, AssociationTableError};
pub use engine::{merge_candidates, rank_similarity, RecommendationEngine};
pub use gateway::{CatalogGateway, RecommendationSink};
pub use similarity::{SimilarityScorer, SimilarityWeights};

use rust_decimal::Decimal;

/// Default per-attribute match weights.
pub const DEFAULT_WEIGHTS: SimilarityWeights = SimilarityWeights {
    same_name: 2.0,
    same_nutriscore: 1.5,
    same_category: 1.2,
    same_brand: 1.0,
    close_price: 0.8,
    price_tolerance: Decimal::ONE,
};

/// Maximum similarity-sourced entries kept before merging
pub const DEFAULT_SIMILARITY_LIMIT: usize = 5;
