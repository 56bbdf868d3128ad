//! Two-phase completion of a Xerox order.
//!
//! Completing an order deletes its record, then the uploaded file the record
//! pointed at, and only then removes the card. Any failure rolls the card back
//! by re-reading the order list.
//!
//! ```text
//! Displayed ──Start──▶ DeletingRecord ──RecordDeleted──▶ DeletingFile ──FileDeleted──▶ Completed
//!                          │                                  │
//!                          └────────────Failed────────────────┴──▶ Recovering ──▶ Restored
//! ```
//!
//! [`transition`] is pure; [`CompletionRun::execute`] is the shell that
//! performs the resulting [`Effect`]s against the backend, the board and the
//! notice queue.

use std::collections::VecDeque;

use campus_desk_core::{ArcadeOrder, Order, OrderId};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::board::{BoardError, CardView, OrderBoard};
use crate::gateway::{CompletionResult, DeletedRecord, GatewayError, OrderBackend};
use crate::notices::{Notice, NoticeQueue};

/// Notice shown once both deletions are confirmed.
pub const SUCCESS_MESSAGE: &str = "Order marked as complete successfully!";

/// Where a completion currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Displayed,
    DeletingRecord,
    DeletingFile(CompletionResult),
    Recovering(GatewayError),
    Completed,
    Restored(Restoration),
}

/// How a failed completion was presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restoration {
    /// The order was found again and its card re-rendered with the error.
    Card { error: String },
    /// The order could not be reloaded; only the error is shown.
    Minimal { error: String },
}

/// Events fed into [`transition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    RecordDeleted(DeletedRecord),
    FileDeleted,
    Failed(GatewayError),
    Refetched(Option<ArcadeOrder>),
    RefetchFailed,
}

/// Work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ShowProcessing,
    DeleteRecord,
    DeleteFile(CompletionResult),
    Unmount,
    Refetch,
    RestoreCard { order: ArcadeOrder, error: String },
    ShowFailure { error: String },
    Notify(Notice),
}

/// Next step plus the effects to run, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Step,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: Step, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("input {input} is not valid in step {step}")]
pub struct InvalidTransition {
    pub step: &'static str,
    pub input: &'static str,
}

impl Step {
    const fn name(&self) -> &'static str {
        match self {
            Self::Displayed => "Displayed",
            Self::DeletingRecord => "DeletingRecord",
            Self::DeletingFile(_) => "DeletingFile",
            Self::Recovering(_) => "Recovering",
            Self::Completed => "Completed",
            Self::Restored(_) => "Restored",
        }
    }
}

impl Input {
    const fn name(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::RecordDeleted(_) => "RecordDeleted",
            Self::FileDeleted => "FileDeleted",
            Self::Failed(_) => "Failed",
            Self::Refetched(_) => "Refetched",
            Self::RefetchFailed => "RefetchFailed",
        }
    }
}

/// Advance the completion state machine.
///
/// # Errors
///
/// Returns [`InvalidTransition`] when `input` cannot happen in `step`.
pub fn transition(step: &Step, input: Input) -> Result<Transition, InvalidTransition> {
    let next = match (step, input) {
        (Step::Displayed, Input::Start) => Transition::to(
            Step::DeletingRecord,
            vec![Effect::ShowProcessing, Effect::DeleteRecord],
        ),
        (Step::DeletingRecord, Input::RecordDeleted(record)) => match record.into_completion() {
            Ok(completion) => Transition::to(
                Step::DeletingFile(completion.clone()),
                vec![Effect::DeleteFile(completion)],
            ),
            Err(err) => recover(err),
        },
        (Step::DeletingFile(_), Input::FileDeleted) => Transition::to(
            Step::Completed,
            vec![Effect::Unmount, Effect::Notify(Notice::success(SUCCESS_MESSAGE))],
        ),
        (Step::DeletingRecord | Step::DeletingFile(_), Input::Failed(err)) => recover(err),
        (Step::Recovering(err), Input::Refetched(Some(order))) => {
            let error = err.to_string();
            Transition::to(
                Step::Restored(Restoration::Card {
                    error: error.clone(),
                }),
                vec![Effect::RestoreCard { order, error }],
            )
        }
        (Step::Recovering(err), Input::Refetched(None) | Input::RefetchFailed) => {
            let error = err.to_string();
            Transition::to(
                Step::Restored(Restoration::Minimal {
                    error: error.clone(),
                }),
                vec![Effect::ShowFailure { error }],
            )
        }
        (step, input) => {
            return Err(InvalidTransition {
                step: step.name(),
                input: input.name(),
            });
        }
    };

    Ok(next)
}

/// Raise the failure notice, then re-read the order list.
fn recover(err: GatewayError) -> Transition {
    let notice = Notice::error(format!("Error completing order: {err}"));
    Transition::to(
        Step::Recovering(err),
        vec![Effect::Notify(notice), Effect::Refetch],
    )
}

/// Reasons a completion cannot start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeginError {
    #[error("order {0} is not on the board")]
    NotMounted(OrderId),

    #[error("order {0} is already being completed")]
    AlreadyProcessing(OrderId),

    #[error("order {0} is no longer available")]
    Unavailable(OrderId),
}

/// A completion that has been started and is waiting to run.
#[derive(Debug)]
#[must_use = "a started completion leaves its card in Processing until executed"]
pub struct CompletionRun {
    order_id: OrderId,
    step: Step,
    pending: VecDeque<Effect>,
}

/// Start completing `order_id`.
///
/// Flips the card to [`CardView::Processing`] under the board's write lock,
/// so a second call for the same order is refused until the first finishes.
///
/// # Errors
///
/// Returns [`BeginError`] if the card is missing, already processing, or
/// showing a failure with nothing left to complete.
pub async fn begin(board: &RwLock<OrderBoard>, order_id: &OrderId) -> Result<CompletionRun, BeginError> {
    let mut board = board.write().await;
    let card = board
        .get(order_id)
        .ok_or_else(|| BeginError::NotMounted(order_id.clone()))?;

    match card.view {
        CardView::Processing => return Err(BeginError::AlreadyProcessing(order_id.clone())),
        CardView::Failed { .. } => return Err(BeginError::Unavailable(order_id.clone())),
        CardView::Displayed | CardView::Restored { .. } => {}
    }

    let Transition { next, effects } = transition(&Step::Displayed, Input::Start)
        .map_err(|_| BeginError::Unavailable(order_id.clone()))?;

    let mut pending = VecDeque::from(effects);
    if pending.front() == Some(&Effect::ShowProcessing) {
        pending.pop_front();
        board
            .set_view(order_id, CardView::Processing)
            .map_err(|_| BeginError::NotMounted(order_id.clone()))?;
    }

    info!(order_id = %order_id, "Completion started");
    Ok(CompletionRun {
        order_id: order_id.clone(),
        step: next,
        pending,
    })
}

impl CompletionRun {
    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    #[must_use]
    pub const fn step(&self) -> &Step {
        &self.step
    }

    /// Run every pending effect until the workflow settles.
    ///
    /// Never holds the board lock across a backend call.
    #[instrument(skip_all, fields(order_id = %self.order_id))]
    pub async fn execute<B: OrderBackend>(
        mut self,
        backend: &B,
        board: &RwLock<OrderBoard>,
        notices: &NoticeQueue,
    ) -> Step {
        while let Some(effect) = self.pending.pop_front() {
            let Some(input) = self.perform(effect, backend, board, notices).await else {
                continue;
            };

            match transition(&self.step, input) {
                Ok(Transition { next, effects }) => {
                    self.step = next;
                    self.pending.extend(effects);
                }
                Err(err) => {
                    tracing::error!(error = %err, "Completion stopped on an unexpected input");
                    break;
                }
            }
        }

        match &self.step {
            Step::Completed => info!("Order completed"),
            Step::Restored(restoration) => warn!(?restoration, "Completion failed"),
            step => warn!(step = step.name(), "Completion ended early"),
        }

        self.step
    }

    async fn perform<B: OrderBackend>(
        &self,
        effect: Effect,
        backend: &B,
        board: &RwLock<OrderBoard>,
        notices: &NoticeQueue,
    ) -> Option<Input> {
        let id = &self.order_id;

        match effect {
            Effect::ShowProcessing => {
                log_board(board.write().await.set_view(id, CardView::Processing));
                None
            }
            Effect::DeleteRecord => Some(match backend.delete_order_record(id).await {
                Ok(record) => Input::RecordDeleted(record),
                Err(err) => Input::Failed(err),
            }),
            Effect::DeleteFile(completion) => {
                Some(match backend.delete_order_file(&completion).await {
                    Ok(()) => Input::FileDeleted,
                    Err(err) => Input::Failed(err),
                })
            }
            Effect::Unmount => {
                let mut board = board.write().await;
                board.unmount(id);
                info!(remaining = board.len(), "Card unmounted");
                None
            }
            Effect::Refetch => Some(match backend.list_orders().await {
                Ok(orders) => Input::Refetched(
                    orders
                        .into_iter()
                        .find(|order| &order.order_id == id)
                        .map(Order::from)
                        .and_then(Order::into_arcade),
                ),
                Err(err) => {
                    warn!(error = %err, "Refetch after failed completion failed");
                    Input::RefetchFailed
                }
            }),
            Effect::RestoreCard { order, error } => {
                log_board(board.write().await.replace(order, CardView::Restored { error }));
                None
            }
            Effect::ShowFailure { error } => {
                log_board(board.write().await.set_view(id, CardView::Failed { error }));
                None
            }
            Effect::Notify(notice) => {
                notices.push(notice).await;
                None
            }
        }
    }
}

fn log_board(result: Result<(), BoardError>) {
    if let Err(err) = result {
        warn!(error = %err, "Card vanished during completion");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use campus_desk_core::RawOrder;
    use serde_json::json;

    use super::*;
    use crate::gateway::fake::FakeBackend;

    fn raw(id: &str) -> RawOrder {
        serde_json::from_value(json!({
            "order_id": id,
            "pin": "101",
            "user_id": "u1",
            "xeroxDetails": {"fileName": "f.pdf", "copies": 2}
        }))
        .unwrap()
    }

    fn record(user_id: Option<&str>, file_name: Option<&str>) -> DeletedRecord {
        DeletedRecord {
            user_id: user_id.map(str::to_string),
            file_name: file_name.map(str::to_string),
            message: None,
        }
    }

    fn board_with(ids: &[&str]) -> RwLock<OrderBoard> {
        let mut board = OrderBoard::new();
        board.refresh_raw(ids.iter().copied().map(raw).collect());
        RwLock::new(board)
    }

    async fn run(backend: &FakeBackend, board: &RwLock<OrderBoard>, id: &str) -> (Step, Vec<Notice>) {
        let notices = NoticeQueue::new();
        let run = begin(board, &OrderId::new(id)).await.unwrap();
        let step = run.execute(backend, board, &notices).await;
        (step, notices.drain().await)
    }

    #[test]
    fn test_start_shows_processing_then_deletes_record() {
        let t = transition(&Step::Displayed, Input::Start).unwrap();
        assert_eq!(t.next, Step::DeletingRecord);
        assert_eq!(t.effects, vec![Effect::ShowProcessing, Effect::DeleteRecord]);
    }

    #[test]
    fn test_missing_metadata_never_reaches_file_deletion() {
        let t = transition(
            &Step::DeletingRecord,
            Input::RecordDeleted(record(Some("u1"), None)),
        )
        .unwrap();
        assert_eq!(t.next, Step::Recovering(GatewayError::MissingMetadata));
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::DeleteFile(_))));
        assert_eq!(
            t.effects,
            vec![
                Effect::Notify(Notice::error(
                    "Error completing order: Missing user_id or file_name in response"
                )),
                Effect::Refetch,
            ]
        );
    }

    #[test]
    fn test_file_deleted_completes() {
        let completion = record(Some("u1"), Some("f.pdf")).into_completion().unwrap();
        let t = transition(&Step::DeletingFile(completion), Input::FileDeleted).unwrap();
        assert_eq!(t.next, Step::Completed);
        assert_eq!(t.effects[0], Effect::Unmount);
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        assert!(transition(&Step::Completed, Input::Start).is_err());
        assert!(transition(&Step::Displayed, Input::FileDeleted).is_err());
        let err = transition(&Step::DeletingRecord, Input::Start).unwrap_err();
        assert_eq!(err.step, "DeletingRecord");
        assert_eq!(err.input, "Start");
    }

    #[tokio::test]
    async fn test_completion_success_empties_board() {
        let backend = FakeBackend {
            record_response: Ok(record(Some("u1"), Some("f.pdf"))),
            ..FakeBackend::with_orders(vec![raw("a")])
        };
        let board = board_with(&["a"]);

        let (step, notices) = run(&backend, &board, "a").await;

        assert_eq!(step, Step::Completed);
        assert!(board.read().await.is_empty());
        assert_eq!(notices, vec![Notice::success(SUCCESS_MESSAGE)]);
        assert_eq!(
            backend.calls(),
            vec!["delete_record:a", "delete_file:u1/f.pdf"]
        );
    }

    #[tokio::test]
    async fn test_record_failure_restores_card() {
        // A failed record deletion leaves the order listed.
        let backend = FakeBackend {
            record_response: Err(GatewayError::Http { status: 500 }),
            ..FakeBackend::with_orders(vec![raw("a"), raw("b")])
        };
        let board = board_with(&["a", "b"]);

        let (step, notices) = run(&backend, &board, "a").await;

        assert_eq!(
            step,
            Step::Restored(Restoration::Card {
                error: "HTTP error! status: 500".into()
            })
        );
        let board = board.read().await;
        assert_eq!(board.len(), 2);
        assert_eq!(
            board.get(&OrderId::new("a")).unwrap().view,
            CardView::Restored {
                error: "HTTP error! status: 500".into()
            }
        );
        assert_eq!(
            notices,
            vec![Notice::error("Error completing order: HTTP error! status: 500")]
        );
        assert_eq!(backend.calls(), vec!["delete_record:a", "list"]);
    }

    #[tokio::test]
    async fn test_metadata_missing_skips_file_deletion() {
        let backend = FakeBackend {
            record_response: Ok(record(None, Some("f.pdf"))),
            ..FakeBackend::with_orders(vec![raw("a")])
        };
        let board = board_with(&["a"]);

        let (step, _) = run(&backend, &board, "a").await;

        assert!(matches!(step, Step::Restored(_)));
        assert!(
            !backend
                .calls()
                .iter()
                .any(|call| call.starts_with("delete_file"))
        );
    }

    #[tokio::test]
    async fn test_file_failure_after_record_deleted_shows_minimal_state() {
        let backend = FakeBackend {
            record_response: Ok(record(Some("u1"), Some("f.pdf"))),
            file_response: Err(GatewayError::Http { status: 404 }),
            ..FakeBackend::with_orders(vec![raw("a")])
        };
        let board = board_with(&["a"]);

        let (step, notices) = run(&backend, &board, "a").await;

        assert_eq!(
            step,
            Step::Restored(Restoration::Minimal {
                error: "HTTP error! status: 404".into()
            })
        );
        assert_eq!(
            board.read().await.get(&OrderId::new("a")).unwrap().view,
            CardView::Failed {
                error: "HTTP error! status: 404".into()
            }
        );
        assert_eq!(notices.len(), 1);
    }

    #[tokio::test]
    async fn test_refetch_failure_shows_minimal_state() {
        let backend = FakeBackend {
            record_response: Err(GatewayError::Network("connection refused".into())),
            list_error: Some(GatewayError::Http { status: 503 }),
            ..FakeBackend::with_orders(vec![raw("a")])
        };
        let board = board_with(&["a"]);

        let (step, _) = run(&backend, &board, "a").await;

        assert_eq!(
            step,
            Step::Restored(Restoration::Minimal {
                error: "connection refused".into()
            })
        );
    }

    #[tokio::test]
    async fn test_double_begin_is_refused() {
        let board = board_with(&["a"]);
        let id = OrderId::new("a");

        let first = begin(&board, &id).await.unwrap();
        assert_eq!(first.step(), &Step::DeletingRecord);
        assert_eq!(
            begin(&board, &id).await.unwrap_err(),
            BeginError::AlreadyProcessing(id.clone())
        );
        assert_eq!(
            begin(&board, &OrderId::new("zz")).await.unwrap_err(),
            BeginError::NotMounted(OrderId::new("zz"))
        );
    }

    #[tokio::test]
    async fn test_failed_card_cannot_be_completed_again() {
        let board = board_with(&["a"]);
        let id = OrderId::new("a");
        board
            .write()
            .await
            .set_view(
                &id,
                CardView::Failed {
                    error: "gone".into(),
                },
            )
            .unwrap();

        assert_eq!(
            begin(&board, &id).await.unwrap_err(),
            BeginError::Unavailable(id)
        );
    }
}
