//! Recommendation pass: score, rank, resolve associations, merge

use std::collections::HashSet;
use std::sync::Arc;

use super::associations::{AssociationResolver, AssociationTable};
use super::gateway::{CatalogGateway, RecommendationSink};
use super::similarity::SimilarityScorer;
use super::DEFAULT_SIMILARITY_LIMIT;
use crate::domain::customer::CustomerId;
use crate::domain::product::Product;
use crate::domain::recommendation::{RecommendationOutcome, ScoredCandidate};
use crate::errors::DataAccessError;

/// Top-level entry point producing a ranked, deduplicated list for one customer.
pub struct RecommendationEngine<G> {
    gateway: G,
    associations: Arc<AssociationTable>,
    scorer: SimilarityScorer,
    similarity_limit: usize,
}

impl<G> RecommendationEngine<G>
where
    G: CatalogGateway,
{
    pub fn new(gateway: G, associations: Arc<AssociationTable>) -> Self {
        Self {
            gateway,
            associations,
            scorer: SimilarityScorer::new(),
            similarity_limit: DEFAULT_SIMILARITY_LIMIT,
        }
    }

    pub fn with_scorer(mut self, scorer: SimilarityScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_similarity_limit(mut self, limit: usize) -> Self {
        self.similarity_limit = limit;
        self
    }

    /// Runs one scoring pass. Any gateway failure aborts the whole request.
    pub async fn recommend(
        &self,
        customer_id: &CustomerId,
    ) -> Result<RecommendationOutcome, DataAccessError> {
        tracing::info!(
            event_name = "recommendation.request.started",
            customer_id = %customer_id,
            "computing recommendations"
        );

        let tagged = self.gateway.fetch_tagged_products(customer_id).await?;
        let (purchased, not_purchased): (Vec<_>, Vec<_>) =
            tagged.into_iter().partition(|product| product.is_purchased());
        let purchased = purchased.into_iter().map(|tagged| tagged.product).collect::<Vec<_>>();
        let not_purchased =
            not_purchased.into_iter().map(|tagged| tagged.product).collect::<Vec<Product>>();

        if purchased.is_empty() {
            tracing::info!(
                event_name = "recommendation.request.empty_history",
                customer_id = %customer_id,
                catalog_size = not_purchased.len(),
                "customer has no purchases"
            );
            return Ok(RecommendationOutcome::EmptyPurchaseHistory);
        }

        let similarity = rank_similarity(
            self.scorer.score_all(&purchased, &not_purchased),
            self.similarity_limit,
        );
        let association =
            AssociationResolver::new(&self.associations).resolve(&self.gateway, &purchased).await?;

        let similarity_count = similarity.len();
        let association_count = association.len();
        let merged = merge_candidates(similarity, association);

        tracing::info!(
            event_name = "recommendation.request.completed",
            customer_id = %customer_id,
            purchased = purchased.len(),
            similarity_candidates = similarity_count,
            association_candidates = association_count,
            recommended = merged.len(),
            "recommendations computed"
        );

        Ok(RecommendationOutcome::Recommendations(merged))
    }

    /// Same pass as [`Self::recommend`], delivered to `sink`. Nothing reaches the sink
    /// when the request fails.
    pub async fn recommend_to<S>(
        &self,
        customer_id: &CustomerId,
        sink: &mut S,
    ) -> Result<(), DataAccessError>
    where
        S: RecommendationSink + ?Sized,
    {
        match self.recommend(customer_id).await? {
            RecommendationOutcome::Recommendations(candidates) => {
                sink.emit_recommendations(&candidates)
            }
            RecommendationOutcome::EmptyPurchaseHistory => sink.report_empty_purchase_history(),
        }
        Ok(())
    }
}

/// Sorts by score descending, ties broken by product name ascending, then keeps the
/// first `limit` entries.
pub fn rank_similarity(
    mut candidates: Vec<ScoredCandidate>,
    limit: usize,
) -> Vec<ScoredCandidate> {
    candidates.sort_by(|left, right| {
        right.score.total_cmp(&left.score).then_with(|| left.name().cmp(right.name()))
    });
    candidates.truncate(limit);
    candidates
}

/// Similarity candidates first, then association candidates not already present.
/// An association entry whose name was already emitted is dropped, never merged.
pub fn merge_candidates(
    similarity: Vec<ScoredCandidate>,
    association: Vec<ScoredCandidate>,
) -> Vec<ScoredCandidate> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(similarity.len() + association.len());

    for candidate in similarity.into_iter().chain(association) {
        if seen.insert(candidate.name().clone()) {
            merged.push(candidate);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::{merge_candidates, rank_similarity, RecommendationEngine};
    use crate::domain::customer::CustomerId;
    use crate::domain::product::Product;
    use crate::domain::recommendation::{CandidateSource, RecommendationOutcome, ScoredCandidate};
    use crate::recommend::test_support::{grocery, RecordingSink, StubCatalog};
    use crate::recommend::{AssociationTable, SimilarityScorer, SimilarityWeights};

    const CUSTOMER: CustomerId = CustomerId(7);

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    fn names(candidates: &[ScoredCandidate]) -> Vec<&str> {
        candidates.iter().map(|candidate| candidate.name().as_str()).collect()
    }

    fn snack_catalog() -> Vec<Product> {
        vec![
            grocery("Chips nature", "E", "Snacks", "Lays", "1.80"),
            grocery("Canette de Coca-Cola", "E", "Boissons", "Coca-Cola", "1.20"),
            grocery("Canette de Pepsi", "E", "Boissons", "Pepsi", "1.10"),
            grocery("Bouteille d'eau 50cl", "A", "Boissons", "Cristaline", "0.50"),
            grocery("Ketchup", "D", "Condiments", "Heinz", "2.50"),
            grocery("Barre chocolatee", "E", "Confiserie", "Mars", "1.00"),
            grocery("Bonbons", "E", "Confiserie", "Haribo", "1.90"),
            grocery("Pomme Golden", "A", "Fruits", "Vergers", "2.20"),
            grocery("Banane", "A", "Fruits", "Chiquita", "1.90"),
        ]
    }

    fn engine(catalog: StubCatalog, table: AssociationTable) -> RecommendationEngine<StubCatalog> {
        RecommendationEngine::new(catalog, Arc::new(table))
    }

    #[tokio::test]
    async fn single_purchase_scores_grade_and_price() {
        let catalog = StubCatalog::new(
            vec![
                grocery("A", "B", "Fruit", "X", "1.0"),
                grocery("B", "B", "Vegetable", "Y", "1.5"),
            ],
            &["A"],
        );

        let outcome = engine(catalog, AssociationTable::default())
            .recommend(&CUSTOMER)
            .await
            .expect("recommend");

        let candidates = outcome.candidates();
        assert_eq!(names(candidates), vec!["B"]);
        assert_close(candidates[0].score, 2.3);
        assert_eq!(candidates[0].source, CandidateSource::Similarity);
    }

    #[tokio::test]
    async fn empty_history_reports_without_emitting() {
        let catalog = StubCatalog::new(snack_catalog(), &[]);
        let engine = engine(catalog, AssociationTable::grocery_defaults());
        let mut sink = RecordingSink::default();

        engine.recommend_to(&CUSTOMER, &mut sink).await.expect("recommend");

        assert_eq!(sink.empty_reports, 1);
        assert!(sink.emitted.is_empty());
        assert!(engine.recommend(&CUSTOMER).await.expect("recommend").is_empty_history());
    }

    #[tokio::test]
    async fn similarity_entry_wins_over_association_duplicate() {
        let catalog = StubCatalog::new(snack_catalog(), &["Bouteille d'eau 50cl"]);

        let outcome = engine(catalog, AssociationTable::grocery_defaults())
            .recommend(&CUSTOMER)
            .await
            .expect("recommend");
        let candidates = outcome.candidates();

        // Pepsi and Coca-Cola sit within 1.0 of the bottle's price and share its category,
        // so both rank in the similarity list and are also association targets.
        let pepsi = candidates
            .iter()
            .find(|candidate| candidate.name().as_str() == "Canette de Pepsi")
            .expect("pepsi recommended");
        assert_eq!(pepsi.source, CandidateSource::Similarity);
        assert_close(pepsi.score, 2.0);
        assert_eq!(
            candidates
                .iter()
                .filter(|candidate| candidate.name().as_str() == "Canette de Pepsi")
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn output_never_repeats_a_product() {
        let catalog =
            StubCatalog::new(snack_catalog(), &["Chips nature", "Canette de Coca-Cola"]);

        let outcome = engine(catalog, AssociationTable::grocery_defaults())
            .recommend(&CUSTOMER)
            .await
            .expect("recommend");
        let candidates = outcome.candidates();

        let unique = candidates.iter().map(ScoredCandidate::name).collect::<HashSet<_>>();
        assert_eq!(unique.len(), candidates.len());
    }

    #[tokio::test]
    async fn similarity_contributes_at_most_five() {
        let catalog = StubCatalog::new(snack_catalog(), &["Pomme Golden"]);

        let outcome = engine(catalog, AssociationTable::default())
            .recommend(&CUSTOMER)
            .await
            .expect("recommend");

        let similarity = outcome
            .candidates()
            .iter()
            .filter(|candidate| candidate.source == CandidateSource::Similarity)
            .count();
        assert_eq!(similarity, 5);
        assert_eq!(outcome.candidates().len(), 5);
    }

    #[tokio::test]
    async fn similarity_limit_is_configurable() {
        let catalog = StubCatalog::new(snack_catalog(), &["Pomme Golden"]);

        let outcome = engine(catalog, AssociationTable::default())
            .with_similarity_limit(2)
            .recommend(&CUSTOMER)
            .await
            .expect("recommend");

        assert_eq!(outcome.candidates().len(), 2);
    }

    #[tokio::test]
    async fn custom_weights_reorder_candidates() {
        let products = vec![
            grocery("A", "B", "Fruit", "X", "1.00"),
            grocery("Same grade", "B", "Dairy", "Y", "5.00"),
            grocery("Same category", "D", "Fruit", "Z", "5.00"),
        ];
        let weights = SimilarityWeights { same_category: 3.0, ..SimilarityWeights::default() };

        let default_outcome =
            engine(StubCatalog::new(products.clone(), &["A"]), AssociationTable::default())
                .recommend(&CUSTOMER)
                .await
                .expect("recommend");
        let weighted_outcome =
            engine(StubCatalog::new(products, &["A"]), AssociationTable::default())
                .with_scorer(SimilarityScorer::with_weights(weights))
                .recommend(&CUSTOMER)
                .await
                .expect("recommend");

        assert_eq!(names(default_outcome.candidates()), vec!["Same grade", "Same category"]);
        let weighted = weighted_outcome.candidates();
        assert_eq!(names(weighted), vec!["Same category", "Same grade"]);
        assert_close(weighted[0].score, 3.0);
        assert_close(weighted[1].score, 1.5);
    }

    #[tokio::test]
    async fn associations_follow_ranked_similarity() {
        let catalog = StubCatalog::new(snack_catalog(), &["Pomme Golden"]);

        let outcome = engine(catalog, AssociationTable::grocery_defaults())
            .recommend(&CUSTOMER)
            .await
            .expect("recommend");
        let candidates = outcome.candidates();

        // Banane shares grade, category and price band with Pomme Golden: 1.5 + 1.2 + 0.8.
        assert_eq!(candidates[0].name().as_str(), "Banane");
        assert_close(candidates[0].score, 3.5);
        assert!(candidates
            .iter()
            .skip_while(|candidate| candidate.source == CandidateSource::Similarity)
            .all(|candidate| candidate.source == CandidateSource::Association));
    }

    #[tokio::test]
    async fn repeated_runs_are_identical() {
        let engine = engine(
            StubCatalog::new(snack_catalog(), &["Chips nature", "Pomme Golden"]),
            AssociationTable::grocery_defaults(),
        );

        let first = engine.recommend(&CUSTOMER).await.expect("first run");
        let second = engine.recommend(&CUSTOMER).await.expect("second run");

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn tagged_fetch_failure_emits_nothing() {
        let engine = engine(StubCatalog::failing_tagged(), AssociationTable::grocery_defaults());
        let mut sink = RecordingSink::default();

        let result = engine.recommend_to(&CUSTOMER, &mut sink).await;

        assert!(result.is_err());
        assert!(sink.emitted.is_empty());
        assert_eq!(sink.empty_reports, 0);
    }

    #[tokio::test]
    async fn association_lookup_failure_fails_request() {
        let catalog =
            StubCatalog::new(snack_catalog(), &["Chips nature"]).with_failing_lookups();
        let engine = engine(catalog, AssociationTable::grocery_defaults());
        let mut sink = RecordingSink::default();

        let result = engine.recommend_to(&CUSTOMER, &mut sink).await;

        assert!(result.is_err());
        assert!(sink.emitted.is_empty());
    }

    #[test]
    fn ties_are_broken_by_name() {
        let ranked = rank_similarity(
            vec![
                ScoredCandidate::from_similarity(grocery("Zeta", "A", "c", "b", "1"), 1.0),
                ScoredCandidate::from_similarity(grocery("Alpha", "A", "c", "b", "1"), 1.0),
                ScoredCandidate::from_similarity(grocery("Mid", "A", "c", "b", "1"), 3.0),
            ],
            5,
        );

        assert_eq!(names(&ranked), vec!["Mid", "Alpha", "Zeta"]);
    }

    #[test]
    fn merge_keeps_similarity_first_and_drops_duplicates() {
        let similarity = vec![
            ScoredCandidate::from_similarity(grocery("B", "A", "c", "b", "1"), 4.0),
            ScoredCandidate::from_similarity(grocery("C", "A", "c", "b", "1"), 2.5),
        ];
        let association = vec![
            ScoredCandidate::from_association(grocery("C", "A", "c", "b", "1")),
            ScoredCandidate::from_association(grocery("D", "A", "c", "b", "1")),
        ];

        let merged = merge_candidates(similarity, association);

        assert_eq!(names(&merged), vec!["B", "C", "D"]);
        assert_close(merged[1].score, 2.5);
        assert_eq!(merged[1].source, CandidateSource::Similarity);
        assert_eq!(merged[2].source, CandidateSource::Association);
    }

    #[test]
    fn recommendation_outcome_exposes_candidates() {
        let outcome = RecommendationOutcome::Recommendations(vec![
            ScoredCandidate::from_association(grocery("D", "A", "c", "b", "1")),
        ]);

        assert_eq!(outcome.candidates().len(), 1);
        assert!(RecommendationOutcome::EmptyPurchaseHistory.candidates().is_empty());
    }
}
