//! Printable stationery receipts.

use campus_desk_core::{OrderId, StationeryOrder};
use chrono::{DateTime, Local, NaiveDateTime};
use rust_decimal::Decimal;

const DATE_FORMAT: &str = "%d/%m/%Y, %I:%M:%S %p";

/// One receipt, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub order_id: OrderId,
    pub date: String,
    pub items: String,
    pub quantity: u64,
    pub total: Decimal,
}

impl Receipt {
    /// Build a receipt for `order`, dated by its timestamp or `now`.
    #[must_use]
    pub fn new(order: &StationeryOrder, now: DateTime<Local>) -> Self {
        let date = order
            .timestamp
            .as_deref()
            .filter(|ts| !ts.is_empty())
            .map_or_else(|| now.format(DATE_FORMAT).to_string(), format_timestamp);

        Self {
            order_id: order.id.clone(),
            date,
            items: order.item_names(),
            quantity: order.total_quantity(),
            total: order.total_cost,
        }
    }
}

/// RFC 3339, RFC 2822 (`Mon, 14 Jul 2025 11:30:00 GMT`) and offset-less ISO
/// timestamps are reformatted; anything else is shown as the backend sent it.
fn format_timestamp(ts: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(ts) {
        return dt.format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DATE_FORMAT).to_string();
    }
    ts.to_string()
}
