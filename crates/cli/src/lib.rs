pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shelfwise_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "shelfwise",
    about = "Shelfwise product recommendation CLI",
    long_about = "Recommend catalog products to customers and operate the catalog database.",
    after_help = "Examples:\n  shelfwise migrate\n  shelfwise seed\n  shelfwise recommend --customer 1\n  shelfwise recommend --customer 1 --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Recommend products for a customer from their purchase history")]
    Recommend {
        #[arg(long, help = "Customer identifier")]
        customer: i64,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic grocery demo catalog and verify it")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Config errors are reported by the command itself.
    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        if let Err(error) = init_logging(&config) {
            eprintln!("logging disabled: {error:#}");
        }
    }

    let result = match cli.command {
        Command::Recommend { customer, json } => commands::recommend::run(customer, json),
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => commands::CommandResult::text(0, commands::config::run()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr; stdout carries command output only.
fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    use anyhow::Context;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed
        .map_err(|error| anyhow::anyhow!(error))
        .context("failed to install tracing subscriber")
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn recommend_parses_customer_and_json_flag() {
        let cli = Cli::try_parse_from(["shelfwise", "recommend", "--customer", "42", "--json"])
            .expect("valid args");

        assert!(matches!(cli.command, Command::Recommend { customer: 42, json: true }));
    }

    #[test]
    fn recommend_requires_customer() {
        let error = Cli::try_parse_from(["shelfwise", "recommend"]).expect_err("missing customer");

        assert_eq!(error.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
