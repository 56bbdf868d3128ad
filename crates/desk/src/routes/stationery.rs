//! Stationery pickup panel.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use campus_desk_core::{OrderId, StationeryOrder};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::receipt::Receipt;
use crate::routes::Layout;
use crate::state::AppState;
use crate::workflows::lookup::{self, DELIVERED_MESSAGE, LookupError, NO_ORDER_MESSAGE, Panel};

/// `?pin=` on the panel and receipt routes.
#[derive(Debug, Deserialize)]
pub struct PinQuery {
    pub pin: Option<String>,
}

/// Delivery form data.
#[derive(Debug, Deserialize)]
pub struct DeliverForm {
    #[serde(default)]
    pub pin: String,
}

/// A found order as the template sees it.
#[derive(Debug, Clone)]
pub struct FoundOrder {
    pub path_id: String,
    pub pin: String,
    pub items: String,
    pub quantity: u64,
    pub total: Decimal,
    pub date: String,
}

impl From<&StationeryOrder> for FoundOrder {
    fn from(order: &StationeryOrder) -> Self {
        Self {
            path_id: urlencoding::encode(order.id.as_str()).into_owned(),
            pin: order.pin.clone().unwrap_or_default(),
            items: order.item_names(),
            quantity: order.total_quantity(),
            total: order.total_cost,
            date: order.timestamp.clone().unwrap_or_default(),
        }
    }
}

/// Stationery panel template.
#[derive(Template, WebTemplate)]
#[template(path = "stationery/panel.html")]
pub struct PanelTemplate {
    pub layout: Layout,
    pub input: String,
    pub order: Option<FoundOrder>,
    pub error: Option<String>,
    pub message: Option<&'static str>,
}

impl PanelTemplate {
    fn new(layout: Layout, state: lookup::PanelState) -> Self {
        let (order, error, message) = match state.panel {
            Panel::Idle => (None, None, None),
            Panel::Error(error) => (None, Some(error), None),
            Panel::NoOrder => (None, None, Some(NO_ORDER_MESSAGE)),
            Panel::Found(order) => (Some(FoundOrder::from(&order)), None, None),
            Panel::Delivered => (None, None, Some(DELIVERED_MESSAGE)),
        };

        Self {
            layout,
            input: state.input,
            order,
            error,
            message,
        }
    }
}

/// Receipt template.
#[derive(Template, WebTemplate)]
#[template(path = "stationery/receipt.html")]
pub struct ReceiptTemplate {
    pub receipt: Receipt,
}

/// Show the panel, running a lookup when a PIN was submitted.
///
/// GET /stationery
#[instrument(skip(state, headers))]
pub async fn panel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PinQuery>,
) -> PanelTemplate {
    let panel = match query.pin {
        Some(pin) => lookup::lookup(state.backend(), &pin).await,
        None => lookup::PanelState::default(),
    };

    PanelTemplate::new(Layout::load(&state, &headers).await, panel)
}

/// Mark an order delivered.
///
/// POST /stationery/{id}/deliver
#[instrument(skip(state, headers, form))]
pub async fn deliver(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<DeliverForm>,
) -> PanelTemplate {
    let panel = lookup::deliver(state.backend(), &OrderId::new(id), &form.pin).await;
    PanelTemplate::new(Layout::load(&state, &headers).await, panel)
}

/// Printable receipt for the order behind a PIN.
///
/// GET /stationery/receipt?pin=
#[instrument(skip(state))]
pub async fn receipt(
    State(state): State<AppState>,
    Query(query): Query<PinQuery>,
) -> Result<ReceiptTemplate> {
    let pin = query.pin.unwrap_or_default();

    let order = match lookup::find_by_pin(state.backend(), &pin).await {
        Ok(Some(order)) => order,
        Ok(None) => return Err(AppError::NotFound(NO_ORDER_MESSAGE.to_string())),
        Err(err @ LookupError::Validation(_)) => return Err(AppError::BadRequest(err.to_string())),
        Err(err @ LookupError::NotFound) => return Err(AppError::NotFound(err.to_string())),
        Err(err @ LookupError::InvalidFormat) => return Err(AppError::BadRequest(err.to_string())),
        Err(LookupError::Gateway(err)) => return Err(AppError::Gateway(err)),
    };

    Ok(ReceiptTemplate {
        receipt: Receipt::new(&order, chrono::Local::now()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campus_desk_core::{Order, RawOrder};
    use serde_json::json;

    use super::*;

    fn order() -> StationeryOrder {
        let raw: RawOrder = serde_json::from_value(json!({
            "order_id": "s1",
            "pin": "123",
            "stationeryItems": [{"name": "Pen", "quantity": 2}, {"name": "Glue", "quantity": 3}],
            "totalCost": "60",
            "timestamp": "2025-07-14T16:30:00+05:30"
        }))
        .unwrap();
        Order::from(raw).into_stationery().unwrap()
    }

    fn render(panel: Panel, input: &str) -> String {
        PanelTemplate::new(
            Layout::default(),
            lookup::PanelState {
                input: input.to_string(),
                panel,
            },
        )
        .render()
        .unwrap()
    }

    #[test]
    fn test_found_order_panel() {
        let html = render(Panel::Found(order()), "123");
        assert!(html.contains("Items: Pen, Glue"));
        assert!(html.contains("Total Items: 5"));
        assert!(html.contains("₹60"));
        assert!(html.contains("/stationery/s1/deliver"));
        assert!(html.contains("/stationery/receipt?pin=123"));
        assert!(html.contains("value=\"123\""));
    }

    #[test]
    fn test_panel_messages() {
        assert!(render(Panel::NoOrder, "123").contains(NO_ORDER_MESSAGE));
        let delivered = render(Panel::Delivered, "");
        assert!(delivered.contains(DELIVERED_MESSAGE));
        assert!(delivered.contains("value=\"\""));
        assert!(
            render(Panel::Error("Please enter a valid 3-digit PIN".into()), "12")
                .contains("class=\"error\">Please enter a valid 3-digit PIN")
        );
    }

    #[test]
    fn test_receipt_markup() {
        let now = chrono::Local::now();
        let html = ReceiptTemplate {
            receipt: Receipt::new(&order(), now),
        }
        .render()
        .unwrap();
        assert!(html.contains("College Stationery"));
        assert!(html.contains("Order ID:</strong> #s1"));
        assert!(html.contains("Total Amount: ₹60"));
        assert!(html.contains("Thank you for your order!"));
    }
}
