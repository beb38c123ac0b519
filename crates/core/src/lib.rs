pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;

pub use domain::customer::{Customer, CustomerId};
pub use domain::product::{Product, ProductName, PurchaseStatus, TaggedProduct};
pub use domain::recommendation::{CandidateSource, RecommendationOutcome, ScoredCandidate};
pub use errors::{ApplicationError, DataAccessError, InterfaceError};
pub use recommend::{
    AssociationResolver, AssociationTable, CatalogGateway, RecommendationEngine,
    RecommendationSink, SimilarityScorer, SimilarityWeights,
};
pub use rust_decimal;
