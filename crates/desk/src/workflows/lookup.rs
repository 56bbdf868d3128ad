//! Stationery pickup by PIN.
//!
//! The panel is stateless: every submission validates the PIN locally, asks the
//! backend for the order and renders what came back. Delivery is a single
//! deletion with no rollback; a failure is reported inline and the panel does
//! not bring the order back.

use campus_desk_core::{Order, OrderId, Pin, PinError, StationeryOrder};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::gateway::{GatewayError, OrderBackend};

pub const NO_ORDER_MESSAGE: &str = "No order found for this PIN";
pub const DELIVERED_MESSAGE: &str = "Order delivered successfully";

/// Errors from looking up an order by PIN.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Rejected locally; no request was made.
    #[error("Please enter a valid 3-digit PIN")]
    Validation(#[from] PinError),

    #[error("Order not found for this PIN")]
    NotFound,

    #[error("Invalid PIN format")]
    InvalidFormat,

    #[error("{0}")]
    Gateway(GatewayError),
}

impl From<GatewayError> for LookupError {
    fn from(err: GatewayError) -> Self {
        match err.status() {
            Some(404) => Self::NotFound,
            Some(400) => Self::InvalidFormat,
            _ => Self::Gateway(err),
        }
    }
}

/// Errors from marking an order delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Order not found")]
    NotFound,

    #[error("{0}")]
    Gateway(GatewayError),
}

impl From<GatewayError> for DeliveryError {
    fn from(err: GatewayError) -> Self {
        match err.status() {
            Some(404) => Self::NotFound,
            _ => Self::Gateway(err),
        }
    }
}

/// Fetch the stationery order behind `input`.
///
/// A record without stationery items is reported as `Ok(None)`.
///
/// # Errors
///
/// Returns [`LookupError::Validation`] without touching the backend when
/// `input` is not exactly three digits.
#[instrument(skip(backend))]
pub async fn find_by_pin<B: OrderBackend>(
    backend: &B,
    input: &str,
) -> Result<Option<StationeryOrder>, LookupError> {
    let pin = Pin::parse(input)?;
    let order = backend.order_by_pin(&pin).await?;
    Ok(order.map(Order::from).and_then(Order::into_stationery))
}

/// Retire a stationery order.
///
/// # Errors
///
/// Returns [`DeliveryError::NotFound`] on a 404, otherwise the gateway error.
#[instrument(skip(backend), fields(order_id = %order_id))]
pub async fn deliver_order<B: OrderBackend>(
    backend: &B,
    order_id: &OrderId,
) -> Result<(), DeliveryError> {
    backend.deliver_order(order_id).await?;
    info!("Stationery order delivered");
    Ok(())
}

/// What the stationery panel shows below the PIN input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Idle,
    Error(String),
    NoOrder,
    Found(StationeryOrder),
    Delivered,
}

/// Panel content plus the value left in the PIN input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub input: String,
    pub panel: Panel,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            input: String::new(),
            panel: Panel::Idle,
        }
    }
}

/// Run a lookup and turn the outcome into panel content.
pub async fn lookup<B: OrderBackend>(backend: &B, input: &str) -> PanelState {
    let panel = match find_by_pin(backend, input).await {
        Ok(Some(order)) => Panel::Found(order),
        Ok(None) => Panel::NoOrder,
        Err(err @ LookupError::Validation(_)) => Panel::Error(err.to_string()),
        Err(err) => {
            warn!(error = %err, "Stationery lookup failed");
            Panel::Error(format!("Error loading order: {err}"))
        }
    };

    PanelState {
        input: input.to_string(),
        panel,
    }
}

/// Deliver an order and turn the outcome into panel content.
///
/// The PIN input is cleared only when the delivery went through.
pub async fn deliver<B: OrderBackend>(backend: &B, order_id: &OrderId, input: &str) -> PanelState {
    match deliver_order(backend, order_id).await {
        Ok(()) => PanelState {
            input: String::new(),
            panel: Panel::Delivered,
        },
        Err(err) => {
            warn!(order_id = %order_id, error = %err, "Delivery failed");
            PanelState {
                input: input.to_string(),
                panel: Panel::Error(format!("Error delivering order: {err}")),
            }
        }
    }
}
