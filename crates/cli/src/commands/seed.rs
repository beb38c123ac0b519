use serde_json::json;
use shelfwise_core::config::LoadOptions;
use shelfwise_core::Customer;
use shelfwise_db::{connect_from_config, migrations, GrocerySeedDataset};

use crate::commands::{prepare, CommandResult};

pub fn run() -> CommandResult {
    run_with_options(LoadOptions::default())
}

pub fn run_with_options(options: LoadOptions) -> CommandResult {
    let (config, runtime) = match prepare("seed", options) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_from_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seed_result = GrocerySeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = GrocerySeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result = if verification.all_present {
            Ok(SeedOutput {
                customers: seed_result.customers_seeded,
                products: seed_result.products_seeded,
            })
        } else {
            let failed_checks = verification
                .checks
                .iter()
                .filter_map(|(check, passed)| (!passed).then_some(check.as_str()))
                .collect::<Vec<_>>();
            Err(("seed_verification", verification_failure_message(&failed_checks), 6u8))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(output) => {
            let customers = output
                .customers
                .iter()
                .map(|customer| json!({ "id": customer.id, "name": customer.name }))
                .collect::<Vec<_>>();
            let message = format!(
                "grocery seed dataset loaded: {} products, {} customers",
                output.products,
                output.customers.len()
            );
            CommandResult::success_with_data(
                "seed",
                message,
                Some(json!({ "products": output.products, "customers": customers })),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

struct SeedOutput {
    customers: Vec<Customer>,
    products: i64,
}

fn verification_failure_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "some seed data failed to load".to_string()
    } else {
        format!("seed verification failed for checks: {}", failed_checks.join(", "))
    }
}
