//! The Xerox dashboard as data.
//!
//! [`OrderBoard`] is an ordered mapping from order id to [`Card`]. Handlers and
//! workflows only mount, unmount and restyle cards here; the dashboard page is
//! rendered from the board on every request.
//!
//! # Invariants
//!
//! - At most one card per order id.
//! - A card in [`CardView::Processing`] is never dropped by a list refresh;
//!   only the completion workflow unmounts it, after the backend confirmed
//!   both deletions.
//! - A failure view is shown on exactly one rendered page. A `Failed` card
//!   survives refreshes until then, even though its order is gone;
//!   [`OrderBoard::acknowledge_failures`] retires both failure views once the
//!   page showing them has been built.

use campus_desk_core::{ArcadeOrder, Order, OrderId, RawOrder};
use thiserror::Error;

/// Text shown when no Xerox order is mounted.
pub const EMPTY_MESSAGE: &str = "No Xerox orders found.";

/// Board operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("order {0} already has a card")]
    AlreadyMounted(OrderId),

    #[error("order {0} has no card")]
    NotMounted(OrderId),
}

/// How a card is currently presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardView {
    /// Full details with action buttons.
    Displayed,
    /// Completion in flight; details replaced by a processing indicator.
    Processing,
    /// Completion failed; full details plus an inline error.
    Restored { error: String },
    /// Completion failed and the order could not be reloaded.
    Failed { error: String },
}

impl CardView {
    /// Whether the card stays mounted when a refresh no longer lists its order.
    const fn outlives_order(&self) -> bool {
        matches!(self, Self::Processing | Self::Failed { .. })
    }
}

/// One mounted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub order: ArcadeOrder,
    pub view: CardView,
}

impl Card {
    #[must_use]
    pub const fn new(order: ArcadeOrder) -> Self {
        Self {
            order,
            view: CardView::Displayed,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.order.id
    }
}

/// Outcome of a list refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Cards mounted from the fetched list.
    pub mounted: usize,
    /// Stationery orders skipped.
    pub filtered_out: usize,
    /// In-flight cards kept although the list no longer has them.
    pub retained: usize,
}

/// Ordered set of mounted cards.
#[derive(Debug, Clone, Default)]
pub struct OrderBoard {
    cards: Vec<Card>,
    load_error: Option<String>,
}

impl OrderBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the board with a freshly fetched list.
    ///
    /// Cards that survive the refresh keep their view. Processing cards and
    /// unacknowledged failures missing from the list stay mounted right after
    /// the card that preceded them before the refresh.
    pub fn refresh(&mut self, orders: impl IntoIterator<Item = Order>) -> RefreshSummary {
        let previous = std::mem::take(&mut self.cards);
        let previous_ids: Vec<OrderId> = previous.iter().map(|card| card.id().clone()).collect();
        let mut slots: Vec<Option<Card>> = previous.into_iter().map(Some).collect();
        self.load_error = None;
        let mut summary = RefreshSummary::default();

        for order in orders {
            let Some(order) = order.into_arcade() else {
                summary.filtered_out += 1;
                continue;
            };
            if self.position(&order.id).is_some() {
                tracing::warn!(order_id = %order.id, "Duplicate order in list, keeping first");
                continue;
            }

            // A failure card whose order reloaded can show full details again.
            let view = slots
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|card| card.order.id == order.id))
                .and_then(Option::take)
                .map_or(CardView::Displayed, |card| match card.view {
                    CardView::Failed { error } => CardView::Restored { error },
                    view => view,
                });
            self.cards.push(Card { order, view });
            summary.mounted += 1;
        }

        // Walk the old order, inserting each kept card after its nearest
        // predecessor that is still mounted.
        let mut anchor = 0;
        for (id, slot) in previous_ids.iter().zip(slots) {
            match slot {
                Some(card) if card.view.outlives_order() => {
                    self.cards.insert(anchor, card);
                    anchor += 1;
                    summary.retained += 1;
                }
                Some(_) => {}
                None => {
                    if let Some(pos) = self.position(id) {
                        anchor = anchor.max(pos + 1);
                    }
                }
            }
        }

        summary
    }

    /// [`Self::refresh`] from wire records.
    pub fn refresh_raw(&mut self, orders: Vec<RawOrder>) -> RefreshSummary {
        self.refresh(orders.into_iter().map(Order::from))
    }

    /// Record a failed list load. Existing cards are dropped unless in flight
    /// or showing a failure not yet rendered.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        self.cards.retain(|card| card.view.outlives_order());
        self.load_error = Some(message.into());
    }

    /// Retire failure views after a page has shown them.
    ///
    /// `Restored` cards go back to `Displayed`; `Failed` cards are unmounted,
    /// so the next refresh shows the order again only if the backend still
    /// lists it.
    pub fn acknowledge_failures(&mut self) {
        self.cards
            .retain(|card| !matches!(card.view, CardView::Failed { .. }));
        for card in &mut self.cards {
            if matches!(card.view, CardView::Restored { .. }) {
                card.view = CardView::Displayed;
            }
        }
    }

    /// Message of the last failed list load, if the last load failed.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Mount a new card at the end of the board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::AlreadyMounted`] if the order already has a card.
    pub fn mount(&mut self, order: ArcadeOrder) -> Result<(), BoardError> {
        if self.position(&order.id).is_some() {
            return Err(BoardError::AlreadyMounted(order.id));
        }
        self.cards.push(Card::new(order));
        Ok(())
    }

    /// Remove a card, returning it if it was mounted.
    pub fn unmount(&mut self, id: &OrderId) -> Option<Card> {
        self.position(id).map(|idx| self.cards.remove(idx))
    }

    /// Change how a card is presented.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::NotMounted`] if the order has no card.
    pub fn set_view(&mut self, id: &OrderId, view: CardView) -> Result<(), BoardError> {
        let card = self
            .cards
            .iter_mut()
            .find(|card| &card.order.id == id)
            .ok_or_else(|| BoardError::NotMounted(id.clone()))?;
        card.view = view;
        Ok(())
    }

    /// Swap in fresh order data and a new view for a mounted card.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::NotMounted`] if the order has no card.
    pub fn replace(&mut self, order: ArcadeOrder, view: CardView) -> Result<(), BoardError> {
        let card = self
            .cards
            .iter_mut()
            .find(|card| card.order.id == order.id)
            .ok_or_else(|| BoardError::NotMounted(order.id.clone()))?;
        *card = Card { order, view };
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &OrderId) -> Option<&Card> {
        self.cards.iter().find(|card| &card.order.id == id)
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Whether any card is waiting on the backend.
    #[must_use]
    pub fn has_processing(&self) -> bool {
        self.cards
            .iter()
            .any(|card| card.view == CardView::Processing)
    }

    fn position(&self, id: &OrderId) -> Option<usize> {
        self.cards.iter().position(|card| &card.order.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn arcade(id: &str) -> ArcadeOrder {
        ArcadeOrder {
            id: OrderId::new(id),
            pin: None,
            user_id: None,
            details: campus_desk_core::XeroxDetails::default(),
            timestamp: None,
        }
    }

    fn ids(board: &OrderBoard) -> Vec<&str> {
        board.cards().iter().map(|c| c.id().as_str()).collect()
    }

    #[test]
    fn test_refresh_filters_stationery_orders() {
        let raw: Vec<RawOrder> = serde_json::from_value(json!([
            {"order_id": "a", "pin": "5", "stationeryItems": []},
            {"order_id": "b", "pin": "6", "stationeryItems": [{"name": "Pen", "quantity": 1}]}
        ]))
        .unwrap();

        let mut board = OrderBoard::new();
        let summary = board.refresh_raw(raw);

        assert_eq!(summary.mounted, 1);
        assert_eq!(summary.filtered_out, 1);
        assert_eq!(ids(&board), vec!["a"]);
    }

    #[test]
    fn test_mount_rejects_duplicates() {
        let mut board = OrderBoard::new();
        board.mount(arcade("a")).unwrap();
        assert_eq!(
            board.mount(arcade("a")),
            Err(BoardError::AlreadyMounted(OrderId::new("a")))
        );
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_refresh_skips_duplicate_ids() {
        let mut board = OrderBoard::new();
        let summary = board.refresh(vec![
            Order::Arcade(arcade("a")),
            Order::Arcade(arcade("a")),
        ]);
        assert_eq!(summary.mounted, 1);
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_unmount_and_empty() {
        let mut board = OrderBoard::new();
        board.mount(arcade("a")).unwrap();
        assert!(board.unmount(&OrderId::new("a")).is_some());
        assert!(board.unmount(&OrderId::new("a")).is_none());
        assert!(board.is_empty());
    }

    #[test]
    fn test_refresh_keeps_views_of_surviving_cards() {
        let mut board = OrderBoard::new();
        board.mount(arcade("a")).unwrap();
        board.mount(arcade("b")).unwrap();
        board
            .set_view(
                &OrderId::new("b"),
                CardView::Restored {
                    error: "HTTP error! status: 500".into(),
                },
            )
            .unwrap();

        board.refresh(vec![Order::Arcade(arcade("b")), Order::Arcade(arcade("c"))]);

        assert_eq!(ids(&board), vec!["b", "c"]);
        assert!(matches!(board.cards()[0].view, CardView::Restored { .. }));
        assert_eq!(board.cards()[1].view, CardView::Displayed);
    }

    #[test]
    fn test_refresh_retains_processing_cards() {
        let mut board = OrderBoard::new();
        board.mount(arcade("a")).unwrap();
        board.mount(arcade("b")).unwrap();
        board
            .set_view(&OrderId::new("a"), CardView::Processing)
            .unwrap();

        // Record already deleted server-side; file deletion still pending.
        let summary = board.refresh(vec![Order::Arcade(arcade("b"))]);

        assert_eq!(summary.retained, 1);
        assert_eq!(ids(&board), vec!["a", "b"]);
        assert!(board.has_processing());
    }

    #[test]
    fn test_refresh_upgrades_failed_card_that_reloaded() {
        let mut board = OrderBoard::new();
        board.mount(arcade("a")).unwrap();
        board
            .set_view(
                &OrderId::new("a"),
                CardView::Failed {
                    error: "boom".into(),
                },
            )
            .unwrap();

        board.refresh(vec![Order::Arcade(arcade("a"))]);
        assert_eq!(
            board.cards()[0].view,
            CardView::Restored {
                error: "boom".into()
            }
        );

        board
            .set_view(
                &OrderId::new("a"),
                CardView::Failed {
                    error: "boom".into(),
                },
            )
            .unwrap();
        let summary = board.refresh(Vec::new());
        assert_eq!(summary.retained, 1);
        assert_eq!(ids(&board), vec!["a"]);
    }

    #[test]
    fn test_retained_card_keeps_its_place() {
        let mut board = OrderBoard::new();
        for id in ["x", "y", "a", "z"] {
            board.mount(arcade(id)).unwrap();
        }
        board
            .set_view(&OrderId::new("a"), CardView::Processing)
            .unwrap();

        board.refresh(vec![Order::Arcade(arcade("x")), Order::Arcade(arcade("z"))]);
        assert_eq!(ids(&board), vec!["x", "a", "z"]);

        board.refresh(vec![Order::Arcade(arcade("z"))]);
        assert_eq!(ids(&board), vec!["a", "z"]);
    }

    #[test]
    fn test_failure_views_last_one_render() {
        let mut board = OrderBoard::new();
        board.mount(arcade("a")).unwrap();
        board.mount(arcade("b")).unwrap();
        board
            .set_view(
                &OrderId::new("a"),
                CardView::Failed {
                    error: "HTTP error! status: 500".into(),
                },
            )
            .unwrap();
        board
            .set_view(
                &OrderId::new("b"),
                CardView::Restored {
                    error: "HTTP error! status: 500".into(),
                },
            )
            .unwrap();

        // The file deletion failed after the record was removed.
        board.refresh(vec![Order::Arcade(arcade("b"))]);
        assert_eq!(ids(&board), vec!["a", "b"]);

        board.acknowledge_failures();
        assert_eq!(ids(&board), vec!["b"]);
        assert_eq!(board.cards()[0].view, CardView::Displayed);

        board.refresh(vec![Order::Arcade(arcade("b"))]);
        assert_eq!(ids(&board), vec!["b"]);
        assert_eq!(board.cards()[0].view, CardView::Displayed);
    }

    #[test]
    fn test_load_failed_keeps_in_flight_and_failed_cards() {
        let mut board = OrderBoard::new();
        board.mount(arcade("a")).unwrap();
        board.mount(arcade("b")).unwrap();
        board.mount(arcade("c")).unwrap();
        board
            .set_view(&OrderId::new("b"), CardView::Processing)
            .unwrap();
        board
            .set_view(
                &OrderId::new("c"),
                CardView::Failed {
                    error: "HTTP error! status: 500".into(),
                },
            )
            .unwrap();

        board.load_failed("HTTP error! status: 502");

        assert_eq!(ids(&board), vec!["b", "c"]);
        assert_eq!(board.load_error(), Some("HTTP error! status: 502"));

        board.refresh(Vec::new());
        assert_eq!(board.load_error(), None);
    }

    #[test]
    fn test_set_view_on_missing_card() {
        let mut board = OrderBoard::new();
        assert_eq!(
            board.set_view(&OrderId::new("zz"), CardView::Processing),
            Err(BoardError::NotMounted(OrderId::new("zz")))
        );
    }
}
