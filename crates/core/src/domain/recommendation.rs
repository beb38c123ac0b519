use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductName};

/// Which signal produced a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Similarity,
    Association,
}

/// A recommended product and its affinity score.
///
/// Two candidates with the same [`ProductName`] describe the same entity regardless
/// of score or source; merge and dedup compare on [`ScoredCandidate::name`] only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub product: Product,
    pub score: f64,
    pub source: CandidateSource,
}

impl ScoredCandidate {
    pub fn from_similarity(product: Product, score: f64) -> Self {
        Self { product, score, source: CandidateSource::Similarity }
    }

    /// Association strength is binary, so these always carry a zero score.
    pub fn from_association(product: Product) -> Self {
        Self { product, score: 0.0, source: CandidateSource::Association }
    }

    pub fn name(&self) -> &ProductName {
        &self.product.name
    }
}

/// Terminal result of one recommendation pass.
#[derive(Clone, Debug, PartialEq)]
pub enum RecommendationOutcome {
    Recommendations(Vec<ScoredCandidate>),
    /// The customer has no purchases to base recommendations on.
    EmptyPurchaseHistory,
}

impl RecommendationOutcome {
    pub fn candidates(&self) -> &[ScoredCandidate] {
        match self {
            Self::Recommendations(candidates) => candidates,
            Self::EmptyPurchaseHistory => &[],
        }
    }

    pub fn is_empty_history(&self) -> bool {
        matches!(self, Self::EmptyPurchaseHistory)
    }
}
