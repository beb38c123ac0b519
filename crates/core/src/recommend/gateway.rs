use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::customer::CustomerId;
use crate::domain::product::{Product, ProductName, TaggedProduct};
use crate::domain::recommendation::ScoredCandidate;
use crate::errors::DataAccessError;

/// Read access to the product catalog and a customer's order history.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Every catalog product exactly once, flagged `Purchased` when the customer has at
    /// least one order line for it.
    async fn fetch_tagged_products(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<TaggedProduct>, DataAccessError>;

    /// `Ok(None)` when no product carries `name`.
    async fn fetch_product_by_name(
        &self,
        name: &ProductName,
    ) -> Result<Option<Product>, DataAccessError>;
}

#[async_trait]
impl<T> CatalogGateway for Arc<T>
where
    T: CatalogGateway + ?Sized,
{
    async fn fetch_tagged_products(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<TaggedProduct>, DataAccessError> {
        self.as_ref().fetch_tagged_products(customer_id).await
    }

    async fn fetch_product_by_name(
        &self,
        name: &ProductName,
    ) -> Result<Option<Product>, DataAccessError> {
        self.as_ref().fetch_product_by_name(name).await
    }
}

/// Destination for the outcome of one recommendation pass.
pub trait RecommendationSink {
    fn emit_recommendations(&mut self, candidates: &[ScoredCandidate]);

    fn report_empty_purchase_history(&mut self);
}
