//! Attribute similarity between unpurchased and purchased products

use rust_decimal::Decimal;

use crate::domain::product::Product;
use crate::domain::recommendation::ScoredCandidate;

/// Additive weights for each attribute a candidate shares with a purchased product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityWeights {
    /// Identical product name (default: 2.0)
    pub same_name: f64,
    /// Identical nutrition grade (default: 1.5)
    pub same_nutriscore: f64,
    /// Identical category (default: 1.2)
    pub same_category: f64,
    /// Identical brand (default: 1.0)
    pub same_brand: f64,
    /// Unit prices within `price_tolerance` (default: 0.8)
    pub close_price: f64,
    /// Inclusive absolute price difference for `close_price` (default: 1.0)
    pub price_tolerance: Decimal,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    weights: SimilarityWeights,
}

impl SimilarityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: SimilarityWeights) -> Self {
        Self { weights }
    }

    /// Sum of matching weights for a single (candidate, purchased) pair.
    pub fn pair_score(&self, candidate: &Product, purchased: &Product) -> f64 {
        let weights = &self.weights;
        let mut score = 0.0;

        if candidate.name == purchased.name {
            score += weights.same_name;
        }
        if candidate.nutriscore == purchased.nutriscore {
            score += weights.same_nutriscore;
        }
        if candidate.category == purchased.category {
            score += weights.same_category;
        }
        if candidate.brand == purchased.brand {
            score += weights.same_brand;
        }
        if (candidate.unit_price - purchased.unit_price).abs() <= weights.price_tolerance {
            score += weights.close_price;
        }

        score
    }

    /// Total affinity of `candidate` to the purchase history. Contributions compound
    /// across purchases rather than taking the best match.
    pub fn score(&self, candidate: &Product, purchased: &[Product]) -> f64 {
        purchased.iter().map(|product| self.pair_score(candidate, product)).sum()
    }

    /// One candidate per unpurchased product, in input order.
    pub fn score_all(
        &self,
        purchased: &[Product],
        not_purchased: &[Product],
    ) -> Vec<ScoredCandidate> {
        not_purchased
            .iter()
            .map(|candidate| {
                let score = self.score(candidate, purchased);
                ScoredCandidate::from_similarity(candidate.clone(), score)
            })
            .collect()
    }
}
