//! Campus Desk CLI - drive the desk workflows from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List pending Xerox orders
//! desk-cli orders list
//!
//! # Complete a Xerox order (deletes the record, then the file)
//! desk-cli orders complete 7f3a9c
//!
//! # Look up a stationery order by PIN
//! desk-cli stationery lookup 007
//!
//! # Mark a stationery order delivered
//! desk-cli stationery deliver 7f3a9c
//!
//! # Print a receipt for the order behind a PIN
//! desk-cli stationery receipt 007
//! ```
//!
//! # Environment Variables
//!
//! - `DESK_BACKEND_URL` - Root URL of the campus order backend

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "desk-cli")]
#[command(author, version, about = "Campus order desk tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Xerox print orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Stationery pickup
    Stationery {
        #[command(subcommand)]
        action: StationeryAction,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List pending Xerox orders
    List,
    /// Complete a Xerox order
    Complete {
        /// Backend order id
        order_id: String,
    },
}

#[derive(Subcommand)]
enum StationeryAction {
    /// Find the order behind a 3-digit PIN
    Lookup {
        /// Pickup PIN
        pin: String,
    },
    /// Mark an order delivered
    Deliver {
        /// Backend order id
        order_id: String,
    },
    /// Print a receipt for the order behind a PIN
    Receipt {
        /// Pickup PIN
        pin: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let backend = commands::backend()?;

    match cli.command {
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(&backend).await?,
            OrdersAction::Complete { order_id } => {
                commands::orders::complete(&backend, &order_id).await?;
            }
        },
        Commands::Stationery { action } => match action {
            StationeryAction::Lookup { pin } => commands::stationery::lookup(&backend, &pin).await?,
            StationeryAction::Deliver { order_id } => {
                commands::stationery::deliver(&backend, &order_id).await?;
            }
            StationeryAction::Receipt { pin } => {
                commands::stationery::receipt(&backend, &pin).await?;
            }
        },
    }
    Ok(())
}
