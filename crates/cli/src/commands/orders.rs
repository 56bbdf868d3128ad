//! Xerox order commands.

use campus_desk::board::{CardView, EMPTY_MESSAGE, OrderBoard};
use campus_desk::gateway::OrderBackend;
use campus_desk::notices::{Notice, NoticeQueue};
use campus_desk::workflows::{self, Restoration, Step};
use campus_desk_core::{ArcadeOrder, OrderId};
use tokio::sync::RwLock;

use super::{CliError, emit};

/// List the Xerox orders the dashboard would show.
pub async fn list<B: OrderBackend>(backend: &B) -> Result<(), CliError> {
    let mut board = OrderBoard::new();
    let summary = board.refresh_raw(backend.list_orders().await?);
    tracing::debug!(?summary, "Board loaded");

    let orders: Vec<&ArcadeOrder> = board.cards().iter().map(|card| &card.order).collect();
    emit(&format_orders(&orders));
    Ok(())
}

/// Complete a Xerox order the same way the dashboard does.
pub async fn complete<B: OrderBackend>(backend: &B, order_id: &str) -> Result<(), CliError> {
    let order_id = OrderId::new(order_id);
    let board = RwLock::new(OrderBoard::new());
    board.write().await.refresh_raw(backend.list_orders().await?);

    let notices = NoticeQueue::new();
    let run = workflows::begin(&board, &order_id).await?;
    let step = run.execute(backend, &board, &notices).await;

    let card = board.read().await.get(&order_id).map(|card| card.view.clone());
    emit(&format_outcome(&notices.drain().await, card.as_ref()));

    match step {
        Step::Completed => Ok(()),
        Step::Restored(Restoration::Card { error } | Restoration::Minimal { error }) => {
            Err(CliError::Incomplete(error))
        }
        _ => Err(CliError::Incomplete(format!("order {order_id} was not completed"))),
    }
}

/// One line per order, or the empty board message.
pub fn format_orders(orders: &[&ArcadeOrder]) -> String {
    if orders.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    orders
        .iter()
        .map(|order| {
            let details = &order.details;
            format!(
                "{id}  {file}  copies={copies}  side={side}  type={kind}  instructions={notes}",
                id = order.id,
                file = order.file_name_or_unknown(),
                copies = details.copies.map_or_else(|| "N/A".to_string(), |c| c.to_string()),
                side = or_na(details.print_side.as_deref()),
                kind = or_na(details.print_type.as_deref()),
                notes = or_na(details.custom_instructions.as_deref()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Notices in the order they were raised, then the card state left behind.
pub fn format_outcome(notices: &[Notice], card: Option<&CardView>) -> String {
    let mut lines: Vec<String> = notices.iter().map(|n| n.message.clone()).collect();

    match card {
        Some(CardView::Restored { .. }) => lines.push("Order restored to the board.".into()),
        Some(CardView::Failed { .. }) => lines.push("Order could not be reloaded.".into()),
        Some(CardView::Processing) => lines.push("Order is still processing.".into()),
        Some(CardView::Displayed) | None => {}
    }

    lines.join("\n")
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "N/A",
    }
}
