use std::sync::Arc;

use serde::Serialize;
use shelfwise_core::config::{AppConfig, LoadOptions};
use shelfwise_core::{
    ApplicationError, AssociationTable, CandidateSource, CustomerId, RecommendationEngine,
    RecommendationSink, ScoredCandidate,
};
use shelfwise_db::{connect_from_config, SqlCatalogRepository};

use crate::commands::{prepare, CommandResult};

pub const EMPTY_HISTORY_MESSAGE: &str = "no products found for this customer";

/// One recommendation as shown to the operator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationRow {
    pub product: String,
    pub nutriscore: String,
    pub category: String,
    pub brand: String,
    pub price: String,
    pub score: f64,
    pub source: CandidateSource,
}

impl RecommendationRow {
    fn from_candidate(candidate: &ScoredCandidate) -> Self {
        let product = &candidate.product;
        Self {
            product: product.name.to_string(),
            nutriscore: product.nutriscore.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            price: format!("{:.2}", product.unit_price.round_dp(2)),
            score: candidate.score,
            source: candidate.source,
        }
    }

    pub fn render_line(&self) -> String {
        format!(
            "Product: {}, Nutriscore: {}, Category: {}, Brand: {}, Price: {}",
            self.product, self.nutriscore, self.category, self.brand, self.price
        )
    }
}

/// Collects what the engine delivers so the command can render it in one piece.
#[derive(Debug, Default)]
pub struct RenderingSink {
    rows: Vec<RecommendationRow>,
    empty_history: bool,
}

impl RecommendationSink for RenderingSink {
    fn emit_recommendations(&mut self, candidates: &[ScoredCandidate]) {
        self.rows.extend(candidates.iter().map(RecommendationRow::from_candidate));
    }

    fn report_empty_purchase_history(&mut self) {
        self.empty_history = true;
    }
}

impl RenderingSink {
    pub fn rows(&self) -> &[RecommendationRow] {
        &self.rows
    }

    pub fn is_empty_history(&self) -> bool {
        self.empty_history
    }

    pub fn into_result(self, customer_id: CustomerId, json: bool) -> CommandResult {
        if json {
            let message = if self.empty_history {
                EMPTY_HISTORY_MESSAGE.to_string()
            } else {
                format!("{} products recommended for customer {customer_id}", self.rows.len())
            };
            let data = serde_json::to_value(&self.rows).ok();
            return CommandResult::success_with_data("recommend", message, data);
        }

        if self.empty_history {
            return CommandResult::text(0, EMPTY_HISTORY_MESSAGE);
        }
        let lines = self.rows.iter().map(RecommendationRow::render_line).collect::<Vec<_>>();
        CommandResult::text(0, lines.join("\n"))
    }
}

pub fn run(customer: i64, json: bool) -> CommandResult {
    run_with_options(LoadOptions::default(), customer, json)
}

pub fn run_with_options(options: LoadOptions, customer: i64, json: bool) -> CommandResult {
    let (config, runtime) = match prepare("recommend", options) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let associations = match load_associations(&config) {
        Ok(table) => Arc::new(table),
        Err(error) => {
            return CommandResult::failure("recommend", error.error_class(), error.to_string(), 2);
        }
    };

    let customer_id = CustomerId(customer);
    let result = runtime.block_on(async {
        let pool = connect_from_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let repository = SqlCatalogRepository::new(pool.clone());
        let engine = RecommendationEngine::new(repository, associations)
            .with_similarity_limit(config.recommendation.similarity_limit);
        let mut sink = RenderingSink::default();
        let outcome = engine.recommend_to(&customer_id, &mut sink).await;
        pool.close().await;

        outcome.map(|()| sink).map_err(|error| {
            let correlation_id = format!("recommend-customer-{customer_id}");
            let application = ApplicationError::from(error);
            let error_class = application.error_class();
            tracing::error!(
                event_name = "recommendation.request.failed",
                customer_id = %customer_id,
                correlation_id = %correlation_id,
                error = %application,
                "recommendation request failed"
            );
            let interface = application.into_interface(correlation_id);
            let message = format!(
                "{} (correlation id: {})",
                interface.user_message(),
                interface.correlation_id()
            );
            (error_class, message, 7u8)
        })
    });

    match result {
        Ok(sink) => sink.into_result(customer_id, json),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("recommend", error_class, message, exit_code)
        }
    }
}

fn load_associations(config: &AppConfig) -> Result<AssociationTable, ApplicationError> {
    match &config.recommendation.associations_path {
        Some(path) => AssociationTable::load(path)
            .map_err(|error| ApplicationError::AssociationTable(error.to_string())),
        None => Ok(AssociationTable::grocery_defaults()),
    }
}
