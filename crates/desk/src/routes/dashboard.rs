//! Xerox dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, http::HeaderMap};
use tracing::{debug, instrument, warn};

use crate::board::{Card, CardView, EMPTY_MESSAGE};
use crate::filters;
use crate::gateway::OrderBackend;
use crate::routes::Layout;
use crate::state::AppState;

/// One card as the template sees it. Blank fields render as `N/A`.
#[derive(Debug, Clone)]
pub struct CardData {
    pub id: String,
    /// Percent-encoded id for action URLs.
    pub path_id: String,
    pub pin: String,
    pub file_name: String,
    pub instructions: String,
    pub copies: String,
    pub print_side: String,
    pub print_type: String,
    pub timestamp: String,
    pub processing: bool,
    /// Inline error under a restored card.
    pub error: Option<String>,
    /// Replaces the whole card when the order could not be reloaded.
    pub failure: Option<String>,
}

impl From<&Card> for CardData {
    fn from(card: &Card) -> Self {
        let order = &card.order;
        let details = &order.details;
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        let (processing, error, failure) = match &card.view {
            CardView::Displayed => (false, None, None),
            CardView::Processing => (true, None, None),
            CardView::Restored { error } => (false, Some(error.clone()), None),
            CardView::Failed { error } => (false, None, Some(error.clone())),
        };

        Self {
            id: order.id.to_string(),
            path_id: urlencoding::encode(order.id.as_str()).into_owned(),
            pin: text(&order.pin),
            file_name: order.file_name_or_unknown().to_string(),
            instructions: text(&details.custom_instructions),
            copies: details
                .copies
                .filter(|copies| *copies > 0)
                .map(|copies| copies.to_string())
                .unwrap_or_default(),
            print_side: text(&details.print_side),
            print_type: text(&details.print_type),
            timestamp: text(&order.timestamp),
            processing,
            error,
            failure,
        }
    }
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub cards: Vec<CardData>,
    pub load_error: Option<String>,
    pub empty_message: &'static str,
}

/// Reload the order list and render the board.
///
/// Failure views are shown on this page and then retired.
///
/// GET /
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> DashboardTemplate {
    match state.backend().list_orders().await {
        Ok(orders) => {
            let summary = state.board().write().await.refresh_raw(orders);
            debug!(
                mounted = summary.mounted,
                filtered_out = summary.filtered_out,
                retained = summary.retained,
                "Board refreshed"
            );
        }
        Err(err) => {
            warn!(error = %err, "Failed to load orders");
            state.board().write().await.load_failed(err.to_string());
        }
    }

    let mut layout = Layout::load(&state, &headers).await;
    let mut board = state.board().write().await;
    layout.auto_refresh = board.has_processing();
    let cards = board.cards().iter().map(CardData::from).collect();
    let load_error = board.load_error().map(str::to_string);

    // Same lock as the snapshot, so no failure is retired unseen.
    board.acknowledge_failures();

    DashboardTemplate {
        layout,
        cards,
        load_error,
        empty_message: EMPTY_MESSAGE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campus_desk_core::{Order, RawOrder};
    use serde_json::json;

    use super::*;

    fn card(view: CardView) -> Card {
        let raw: RawOrder = serde_json::from_value(json!({
            "order_id": "a b",
            "pin": "42",
            "xeroxDetails": {"fileName": "notes.pdf", "copies": 0, "printSide": "double"}
        }))
        .unwrap();
        Card {
            order: Order::from(raw).into_arcade().unwrap(),
            view,
        }
    }

    #[test]
    fn test_card_data_fields() {
        let data = CardData::from(&card(CardView::Displayed));
        assert_eq!(data.path_id, "a%20b");
        assert_eq!(data.file_name, "notes.pdf");
        assert_eq!(data.copies, "");
        assert_eq!(data.print_side, "double");
        assert!(!data.processing);
    }

    #[test]
    fn test_card_data_views() {
        assert!(CardData::from(&card(CardView::Processing)).processing);
        let restored = CardData::from(&card(CardView::Restored {
            error: "HTTP error! status: 500".into(),
        }));
        assert_eq!(restored.error.as_deref(), Some("HTTP error! status: 500"));
        assert!(restored.failure.is_none());
    }

    #[test]
    fn test_dashboard_renders_empty_state() {
        let page = DashboardTemplate {
            layout: Layout::default(),
            cards: Vec::new(),
            load_error: None,
            empty_message: EMPTY_MESSAGE,
        };
        let html = page.render().unwrap();
        assert!(html.contains("No Xerox orders found."));
    }

    #[test]
    fn test_dashboard_renders_cards() {
        let page = DashboardTemplate {
            layout: Layout {
                auto_refresh: true,
                ..Layout::default()
            },
            cards: vec![
                CardData::from(&card(CardView::Processing)),
                CardData::from(&card(CardView::Failed {
                    error: "HTTP error! status: 404".into(),
                })),
            ],
            load_error: None,
            empty_message: EMPTY_MESSAGE,
        };
        let html = page.render().unwrap();
        assert!(html.contains("Processing..."));
        assert!(html.contains("Error completing order: HTTP error! status: 404"));
        assert!(html.contains("http-equiv=\"refresh\""));
        assert!(!html.contains("No Xerox orders found."));
    }

    #[test]
    fn test_dashboard_renders_load_error() {
        let page = DashboardTemplate {
            layout: Layout::default(),
            cards: Vec::new(),
            load_error: Some("HTTP error! status: 502".into()),
            empty_message: EMPTY_MESSAGE,
        };
        let html = page.render().unwrap();
        assert!(html.contains("Error loading orders: HTTP error! status: 502"));
    }
}
