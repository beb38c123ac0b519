use std::collections::BTreeSet;

use shelfwise_core::domain::customer::{Customer, CustomerId};
use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

struct SeedCustomerContract {
    id: i64,
    name: &'static str,
    purchased: &'static [&'static str],
}

const SEED_CUSTOMERS: &[SeedCustomerContract] = &[
    SeedCustomerContract {
        id: 1,
        name: "Alice Martin",
        purchased: &["Pomme Golden", "Yaourt nature", "Pain"],
    },
    SeedCustomerContract {
        id: 2,
        name: "Bruno Lefevre",
        purchased: &["Chips nature", "Canette de Coca-Cola"],
    },
    SeedCustomerContract { id: 3, name: "Chloe Dubois", purchased: &[] },
];

const SEED_PRODUCT_COUNT: i64 = 22;

/// Deterministic grocery catalog with three customers: a fresh-produce shopper, a
/// snack shopper, and one without any orders.
pub struct GrocerySeedDataset;

#[derive(Debug, Clone)]
pub struct SeedResult {
    pub customers_seeded: Vec<Customer>,
    pub products_seeded: i64,
}

#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(String, bool)>,
}

impl GrocerySeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/grocery_seed.sql");

    /// Loads the dataset. Re-running is a no-op for rows that already exist.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let customers_seeded = SEED_CUSTOMERS
            .iter()
            .map(|customer| Customer {
                id: CustomerId(customer.id),
                name: customer.name.to_string(),
            })
            .collect::<Vec<_>>();

        tracing::info!(
            event_name = "system.db.seeded",
            customers = customers_seeded.len(),
            products = SEED_PRODUCT_COUNT,
            "grocery seed dataset loaded"
        );

        Ok(SeedResult { customers_seeded, products_seeded: SEED_PRODUCT_COUNT })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM product").fetch_one(pool).await?;
        checks.push(("product-count".to_string(), product_count >= SEED_PRODUCT_COUNT));

        for customer in SEED_CUSTOMERS {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM customer WHERE id = ?1 AND name = ?2)",
            )
            .bind(customer.id)
            .bind(customer.name)
            .fetch_one(pool)
            .await?;
            checks.push((format!("customer:{}", customer.name), exists == 1));

            let purchased: Vec<String> = sqlx::query_scalar(
                r#"
                SELECT p.name
                FROM product p
                WHERE EXISTS(
                    SELECT 1
                    FROM order_line ol
                    JOIN customer_order co ON co.id = ol.order_id
                    WHERE ol.product_id = p.id AND co.customer_id = ?1
                )
                "#,
            )
            .bind(customer.id)
            .fetch_all(pool)
            .await?;
            // Compared as sets: row ids carry no meaning for purchase history.
            let purchased = purchased.iter().map(String::as_str).collect::<BTreeSet<_>>();
            let expected = customer.purchased.iter().copied().collect::<BTreeSet<_>>();
            checks.push((format!("purchase-history:{}", customer.name), purchased == expected));
        }

        let all_present = checks.iter().all(|(_, passed)| *passed);
        Ok(VerificationResult { all_present, checks })
    }
}

#[cfg(test)]
mod tests {
    use super::GrocerySeedDataset;
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn seed_loads_and_verifies() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        let result = GrocerySeedDataset::load(&pool).await.expect("seed");
        let verification = GrocerySeedDataset::verify(&pool).await.expect("verify");

        assert_eq!(result.customers_seeded.len(), 3);
        assert_eq!(result.products_seeded, 22);
        assert!(verification.all_present, "failed checks: {:?}", verification.checks);
    }

    #[tokio::test]
    async fn seed_is_rerunnable() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        GrocerySeedDataset::load(&pool).await.expect("first seed");
        GrocerySeedDataset::load(&pool).await.expect("second seed");

        let verification = GrocerySeedDataset::verify(&pool).await.expect("verify");
        assert!(verification.all_present, "failed checks: {:?}", verification.checks);
    }

    #[tokio::test]
    async fn purchase_history_check_ignores_row_order() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        GrocerySeedDataset::load(&pool).await.expect("seed");

        let verification = GrocerySeedDataset::verify(&pool).await.expect("verify");

        // Bruno's purchases are listed Chips first although Coca-Cola has the lower id.
        let bruno = verification
            .checks
            .iter()
            .find(|(label, _)| label == "purchase-history:Bruno Lefevre")
            .expect("history check for Bruno");
        assert!(bruno.1);
    }

    #[tokio::test]
    async fn failed_history_check_names_the_customer() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        GrocerySeedDataset::load(&pool).await.expect("seed");
        sqlx::query("DELETE FROM order_line WHERE order_id = 3 AND product_id = 12")
            .execute(&pool)
            .await
            .expect("drop an order line");

        let verification = GrocerySeedDataset::verify(&pool).await.expect("verify");

        let failed = verification
            .checks
            .iter()
            .filter(|(_, passed)| !passed)
            .map(|(label, _)| label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(failed, vec!["purchase-history:Bruno Lefevre"]);
        assert!(!verification.all_present);
    }

    #[tokio::test]
    async fn verify_flags_missing_seed() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        let verification = GrocerySeedDataset::verify(&pool).await.expect("verify");

        assert!(!verification.all_present);
    }
}
