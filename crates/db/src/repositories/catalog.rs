use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shelfwise_core::domain::customer::CustomerId;
use shelfwise_core::domain::product::{Product, ProductName, PurchaseStatus, TaggedProduct};
use shelfwise_core::errors::DataAccessError;
use shelfwise_core::recommend::CatalogGateway;
use sqlx::{sqlite::SqliteRow, Row};

use super::RepositoryError;
use crate::DbPool;

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Whole catalog, one row per product, flagged by the customer's order history.
    pub async fn list_tagged_products(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<TaggedProduct>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT
                p.name, p.nutriscore, c.name AS category, p.brand, p.unit_price,
                EXISTS(
                    SELECT 1
                    FROM order_line ol
                    JOIN customer_order co ON co.id = ol.order_id
                    WHERE ol.product_id = p.id AND co.customer_id = ?1
                ) AS purchased
            FROM product p
            JOIN category c ON c.id = p.category_id
            ORDER BY p.id
            "#,
        )
        .bind(customer_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<TaggedProduct, RepositoryError> {
                let product = product_from_row(row)?;
                let purchased: i64 = row.try_get("purchased")?;
                let status = if purchased != 0 {
                    PurchaseStatus::Purchased
                } else {
                    PurchaseStatus::NotPurchased
                };
                Ok(TaggedProduct { product, status })
            })
            .collect()
    }

    pub async fn find_by_name(
        &self,
        name: &ProductName,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT p.name, p.nutriscore, c.name AS category, p.brand, p.unit_price
            FROM product p
            JOIN category c ON c.id = p.category_id
            WHERE p.name = ?1
            "#,
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|value| product_from_row(&value)).transpose()
    }
}

#[async_trait]
impl CatalogGateway for SqlCatalogRepository {
    async fn fetch_tagged_products(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<TaggedProduct>, DataAccessError> {
        Ok(self.list_tagged_products(customer_id).await?)
    }

    async fn fetch_product_by_name(
        &self,
        name: &ProductName,
    ) -> Result<Option<Product>, DataAccessError> {
        Ok(self.find_by_name(name).await?)
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let name: String = row.try_get("name")?;
    let raw_price: String = row.try_get("unit_price")?;
    let unit_price = Decimal::from_str(raw_price.trim()).map_err(|error| {
        RepositoryError::Decode(format!("invalid unit_price `{raw_price}` for `{name}`: {error}"))
    })?;
    if unit_price.is_sign_negative() {
        return Err(RepositoryError::Decode(format!(
            "negative unit_price `{raw_price}` for `{name}`"
        )));
    }

    Ok(Product {
        name: ProductName::new(name),
        nutriscore: row.try_get("nutriscore")?,
        category: row.try_get("category")?,
        brand: row.try_get("brand")?,
        unit_price,
    })
}
