//! In-memory backend for unit tests.

use std::sync::Mutex;

use campus_desk_core::{OrderId, Pin, RawOrder};

use super::{CompletionResult, DeletedRecord, GatewayError, OrderBackend};

/// Scripted backend that records every call it receives.
///
/// A successful record deletion removes the order from `orders`, so a later
/// list call sees what the real backend would.
pub struct FakeBackend {
    pub orders: Mutex<Vec<RawOrder>>,
    pub list_error: Option<GatewayError>,
    pub record_response: Result<DeletedRecord, GatewayError>,
    pub file_response: Result<(), GatewayError>,
    pub pin_response: Result<Option<RawOrder>, GatewayError>,
    pub deliver_response: Result<(), GatewayError>,
    pub calls: Mutex<Vec<String>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            list_error: None,
            record_response: Ok(DeletedRecord::default()),
            file_response: Ok(()),
            pin_response: Ok(None),
            deliver_response: Ok(()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[allow(clippy::unwrap_used)]
impl FakeBackend {
    pub fn with_orders(orders: Vec<RawOrder>) -> Self {
        Self {
            orders: Mutex::new(orders),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[allow(clippy::unwrap_used)]
impl OrderBackend for FakeBackend {
    async fn list_orders(&self) -> Result<Vec<RawOrder>, GatewayError> {
        self.record("list".to_string());
        match &self.list_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.orders.lock().unwrap().clone()),
        }
    }

    async fn delete_order_record(&self, order_id: &OrderId) -> Result<DeletedRecord, GatewayError> {
        self.record(format!("delete_record:{order_id}"));
        if self.record_response.is_ok() {
            self.orders
                .lock()
                .unwrap()
                .retain(|order| &order.order_id != order_id);
        }
        self.record_response.clone()
    }

    async fn delete_order_file(&self, completion: &CompletionResult) -> Result<(), GatewayError> {
        self.record(format!(
            "delete_file:{}/{}",
            completion.user_id, completion.file_name
        ));
        self.file_response.clone()
    }

    async fn order_by_pin(&self, pin: &Pin) -> Result<Option<RawOrder>, GatewayError> {
        self.record(format!("by_pin:{pin}"));
        self.pin_response.clone()
    }

    async fn deliver_order(&self, order_id: &OrderId) -> Result<(), GatewayError> {
        self.record(format!("deliver:{order_id}"));
        self.deliver_response.clone()
    }
}
