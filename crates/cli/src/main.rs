//! Tradewind CLI - manual smoke tests against a live or mock backend.
//!
//! # Usage
//!
//! ```bash
//! # Fetch and print the catalog for the configured project
//! tw-cli catalog --locale de
//!
//! # Check an order's status
//! tw-cli order --token "$SESSION_TOKEN" --order-id 42
//!
//! # Decode a session token's payload
//! tw-cli token "$SESSION_TOKEN"
//! ```
//!
//! Backend and project configuration comes from the environment (see
//! `tradewind_client::Settings::from_env`), so the harness can point at a
//! local mock server by overriding `TRADEWIND_STORE_API`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tw-cli")]
#[command(author, version, about = "Tradewind SDK smoke-test harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the catalog and print a summary
    Catalog {
        /// Locale for group names
        #[arg(short, long, default_value = "en")]
        locale: String,
    },
    /// Check the status of an order
    Order {
        /// Session token
        #[arg(short, long)]
        token: String,

        /// Order id to check
        #[arg(short, long)]
        order_id: i64,
    },
    /// Decode a session token's payload (no signature verification)
    Token {
        /// The token to decode
        token: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Catalog { locale } => commands::catalog::run(&locale).await?,
        Commands::Order { token, order_id } => commands::order::run(&token, order_id).await?,
        Commands::Token { token } => commands::token::run(&token)?,
    }
    Ok(())
}
