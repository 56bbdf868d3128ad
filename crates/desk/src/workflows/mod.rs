//! Desk workflows.
//!
//! - [`completion`]: two-phase retirement of a Xerox order with rollback by refetch
//! - [`lookup`]: stationery lookup by PIN and delivery
//!
//! Workflows are generic over [`OrderBackend`](crate::gateway::OrderBackend) and
//! catch every backend failure at their own boundary; callers only ever see
//! the final step or panel state.

pub mod completion;
pub mod lookup;

pub use completion::{BeginError, CompletionRun, Restoration, Step, begin};
pub use lookup::{DeliveryError, LookupError, Panel, PanelState, deliver, find_by_pin, lookup};
