use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::gateway::{CatalogGateway, RecommendationSink};
use crate::domain::customer::CustomerId;
use crate::domain::product::{Product, ProductName, TaggedProduct};
use crate::domain::recommendation::ScoredCandidate;
use crate::errors::DataAccessError;

pub(crate) fn grocery(
    name: &str,
    nutriscore: &str,
    category: &str,
    brand: &str,
    price: &str,
) -> Product {
    Product {
        name: ProductName::new(name),
        nutriscore: nutriscore.to_string(),
        category: category.to_string(),
        brand: brand.to_string(),
        unit_price: Decimal::from_str(price).expect("valid test price"),
    }
}

/// Fixed catalog where one customer has bought the products named in `purchased`.
#[derive(Default)]
pub(crate) struct StubCatalog {
    products: Vec<Product>,
    purchased: HashSet<ProductName>,
    fail_tagged: bool,
    fail_lookups: bool,
}

impl StubCatalog {
    pub(crate) fn new(products: Vec<Product>, purchased: &[&str]) -> Self {
        Self {
            products,
            purchased: purchased.iter().map(|name| ProductName::new(*name)).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn failing_lookups() -> Self {
        Self { fail_lookups: true, ..Self::default() }
    }

    pub(crate) fn with_failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    pub(crate) fn failing_tagged() -> Self {
        Self { fail_tagged: true, ..Self::default() }
    }
}

#[async_trait]
impl CatalogGateway for StubCatalog {
    async fn fetch_tagged_products(
        &self,
        _customer_id: &CustomerId,
    ) -> Result<Vec<TaggedProduct>, DataAccessError> {
        if self.fail_tagged {
            return Err(DataAccessError::Unavailable("connection refused".to_string()));
        }

        Ok(self
            .products
            .iter()
            .map(|product| {
                if self.purchased.contains(&product.name) {
                    TaggedProduct::purchased(product.clone())
                } else {
                    TaggedProduct::not_purchased(product.clone())
                }
            })
            .collect())
    }

    async fn fetch_product_by_name(
        &self,
        name: &ProductName,
    ) -> Result<Option<Product>, DataAccessError> {
        if self.fail_lookups {
            return Err(DataAccessError::Query("lookup failed".to_string()));
        }

        Ok(self.products.iter().find(|product| &product.name == name).cloned())
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) emitted: Vec<Vec<ScoredCandidate>>,
    pub(crate) empty_reports: usize,
}

impl RecommendationSink for RecordingSink {
    fn emit_recommendations(&mut self, candidates: &[ScoredCandidate]) {
        self.emitted.push(candidates.to_vec());
    }

    fn report_empty_purchase_history(&mut self) {
        self.empty_reports += 1;
    }
}
