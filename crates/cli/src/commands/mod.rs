//! Command implementations.
//!
//! Each command renders its output to a `String` first so the formatting can
//! be tested without a terminal.

pub mod orders;
pub mod stationery;

use campus_desk::config::{ConfigError, DeskConfig};
use campus_desk::gateway::{BackendClient, GatewayError};
use campus_desk::workflows::{BeginError, DeliveryError, LookupError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Begin(#[from] BeginError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Error delivering order: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("{0}")]
    NotFound(String),

    /// The workflow ran but did not complete the order.
    #[error("{0}")]
    Incomplete(String),
}

/// Build the backend client from `DESK_BACKEND_URL`.
pub fn backend() -> Result<BackendClient, CliError> {
    let config = DeskConfig::from_env()?;
    Ok(BackendClient::new(config.backend_url)?)
}

#[allow(clippy::print_stdout)]
fn emit(output: &str) {
    println!("{output}");
}
