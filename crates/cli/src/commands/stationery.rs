//! Stationery pickup commands.

use campus_desk::gateway::OrderBackend;
use campus_desk::receipt::Receipt;
use campus_desk::workflows::{self, lookup::DELIVERED_MESSAGE, lookup::NO_ORDER_MESSAGE};
use campus_desk_core::{OrderId, StationeryOrder};

use super::{CliError, emit};

/// Show the stationery order behind a PIN.
pub async fn lookup<B: OrderBackend>(backend: &B, pin: &str) -> Result<(), CliError> {
    let order = workflows::find_by_pin(backend, pin)
        .await?
        .ok_or_else(|| CliError::NotFound(NO_ORDER_MESSAGE.to_string()))?;
    emit(&format_order(&order));
    Ok(())
}

/// Mark a stationery order delivered.
pub async fn deliver<B: OrderBackend>(backend: &B, order_id: &str) -> Result<(), CliError> {
    workflows::lookup::deliver_order(backend, &OrderId::new(order_id)).await?;
    emit(DELIVERED_MESSAGE);
    Ok(())
}

/// Print a plain-text receipt for the order behind a PIN.
pub async fn receipt<B: OrderBackend>(backend: &B, pin: &str) -> Result<(), CliError> {
    let order = workflows::find_by_pin(backend, pin)
        .await?
        .ok_or_else(|| CliError::NotFound(NO_ORDER_MESSAGE.to_string()))?;
    emit(&format_receipt(&Receipt::new(&order, chrono::Local::now())));
    Ok(())
}

pub fn format_order(order: &StationeryOrder) -> String {
    format!(
        "Order #{id}\nPIN: {pin}\nItems: {items}\nTotal Items: {quantity}\nTotal Cost: ₹{total}",
        id = order.id,
        pin = order.pin.as_deref().unwrap_or("N/A"),
        items = order.item_names(),
        quantity = order.total_quantity(),
        total = order.total_cost,
    )
}

pub fn format_receipt(receipt: &Receipt) -> String {
    format!(
        "College Stationery\n\
         Order ID: #{id}\n\
         Date: {date}\n\
         Items: {items}\n\
         Total Items: {quantity}\n\
         Total Amount: ₹{total}\n\
         Thank you for your order!",
        id = receipt.order_id,
        date = receipt.date,
        items = receipt.items,
        quantity = receipt.quantity,
        total = receipt.total,
    )
}
