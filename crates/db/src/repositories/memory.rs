use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use shelfwise_core::domain::customer::CustomerId;
use shelfwise_core::domain::product::{Product, ProductName, TaggedProduct};
use shelfwise_core::errors::DataAccessError;
use shelfwise_core::recommend::CatalogGateway;

use super::RepositoryError;

#[derive(Default)]
struct CatalogState {
    products: Vec<Product>,
    purchases: HashMap<CustomerId, HashSet<ProductName>>,
}

/// Process-local catalog for tests and demos. Products keep insertion order.
#[derive(Default)]
pub struct InMemoryCatalog {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalog {
    /// Inserts `product`, replacing any existing product with the same name.
    pub async fn add_product(&self, product: Product) {
        let mut state = self.state.write().await;
        match state.products.iter().position(|existing| existing.name == product.name) {
            Some(index) => state.products[index] = product,
            None => state.products.push(product),
        }
    }

    pub async fn record_purchase(
        &self,
        customer_id: CustomerId,
        name: &ProductName,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.products.iter().any(|product| &product.name == name) {
            return Err(RepositoryError::NotFound(format!("product `{name}`")));
        }
        state.purchases.entry(customer_id).or_default().insert(name.clone());
        Ok(())
    }

    /// Removes a product from the catalog while leaving past purchases untouched.
    pub async fn discontinue(&self, name: &ProductName) -> bool {
        let mut state = self.state.write().await;
        let before = state.products.len();
        state.products.retain(|product| &product.name != name);
        state.products.len() != before
    }
}

#[async_trait]
impl CatalogGateway for InMemoryCatalog {
    async fn fetch_tagged_products(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<TaggedProduct>, DataAccessError> {
        let state = self.state.read().await;
        let purchased = state.purchases.get(customer_id);

        Ok(state
            .products
            .iter()
            .map(|product| {
                if purchased.is_some_and(|names| names.contains(&product.name)) {
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
        let state = self.state.read().await;
        Ok(state.products.iter().find(|product| &product.name == name).cloned())
    }
}
