//! Integration tests for Campus Desk.
//!
//! Tests run against [`MockBackend`], an in-process stand-in for the campus
//! order backend that listens on an ephemeral port. Nothing external needs to
//! be running.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p campus-desk-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `gateway` - HTTP client against the mock backend
//! - `workflows` - Completion and stationery lookup end to end
//! - `desk_routes` - The desk server driven over HTTP
//! - `sign_in` - Login against the mock identity provider

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use campus_desk::config::DeskConfig;
use campus_desk::gateway::BackendClient;
use campus_desk::state::AppState;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use url::Url;

/// API key the mock identity provider accepts.
pub const IDENTITY_KEY: &str = "desk-test-key";

/// Password the mock identity provider accepts for any email.
pub const IDENTITY_PASSWORD: &str = "hunter2";

/// Token the mock identity provider hands out.
pub const IDENTITY_TOKEN: &str = "tok-123";

/// Backend routes a test can make fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    FetchOrders,
    DeleteRecord,
    DeleteFile,
    ByPin,
    DeleteStationery,
    Print,
    Upload,
}

#[derive(Debug, Default)]
struct Store {
    orders: Vec<Value>,
    failures: HashMap<Endpoint, u16>,
    /// Endpoints answering 200 with a body that is not JSON.
    garbled: HashSet<Endpoint>,
    /// Answer record deletions with null `user_id`/`file_name`.
    strip_metadata: bool,
    requests: Vec<String>,
    uploads: Vec<(String, String, usize)>,
}

/// In-process campus backend.
#[derive(Clone)]
pub struct MockBackend {
    store: Arc<Mutex<Store>>,
    addr: SocketAddr,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let store = Arc::new(Mutex::new(Store::default()));
        let app = router(store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");

        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(error = %err, "Mock backend stopped");
            }
        });

        Self { store, addr }
    }

    /// Root URL of the mock.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("Invalid mock URL")
    }

    /// A gateway client pointed at the mock.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> BackendClient {
        BackendClient::new(self.url()).expect("Failed to build backend client")
    }

    /// Sign-in endpoint of the mock identity provider.
    ///
    /// # Panics
    ///
    /// Never in practice; the path is a valid relative URL.
    #[must_use]
    pub fn identity_url(&self) -> Url {
        self.url()
            .join("identity/signin")
            .expect("Invalid identity URL")
    }

    /// Desk configuration pointed at the mock.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[must_use]
    pub fn desk_config(&self) -> DeskConfig {
        let url = self.url().to_string();
        DeskConfig::from_lookup(|key| (key == "DESK_BACKEND_URL").then(|| url.clone()))
            .expect("Failed to build desk config")
    }

    /// Desk configuration with sign-in going to `identity`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[must_use]
    pub fn desk_config_with_identity(&self, identity: &Url) -> DeskConfig {
        let backend = self.url().to_string();
        let identity = identity.to_string();
        DeskConfig::from_lookup(|key| match key {
            "DESK_BACKEND_URL" => Some(backend.clone()),
            "DESK_IDENTITY_URL" => Some(identity.clone()),
            "DESK_IDENTITY_API_KEY" => Some(IDENTITY_KEY.to_string()),
            _ => None,
        })
        .expect("Failed to build desk config")
    }

    /// Start a desk server backed by this mock and return its root URL.
    ///
    /// # Panics
    ///
    /// Panics if the desk cannot be started.
    pub async fn start_desk(&self) -> Url {
        Self::start_desk_with(&self.desk_config()).await
    }

    /// Start a desk server from `config` and return its root URL.
    ///
    /// # Panics
    ///
    /// Panics if the desk cannot be started.
    pub async fn start_desk_with(config: &DeskConfig) -> Url {
        let state = AppState::new(config).expect("Failed to create desk state");
        let app = campus_desk::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind desk");
        let addr = listener.local_addr().expect("Desk has no address");

        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(error = %err, "Desk stopped");
            }
        });

        Url::parse(&format!("http://{addr}/")).expect("Invalid desk URL")
    }

    pub async fn add_order(&self, order: Value) {
        self.store.lock().await.orders.push(order);
    }

    pub async fn fail(&self, endpoint: Endpoint, status: u16) {
        self.store.lock().await.failures.insert(endpoint, status);
    }

    pub async fn recover(&self, endpoint: Endpoint) {
        let mut store = self.store.lock().await;
        store.failures.remove(&endpoint);
        store.garbled.remove(&endpoint);
    }

    /// Answer `endpoint` with status 200 and an HTML body.
    pub async fn garble(&self, endpoint: Endpoint) {
        self.store.lock().await.garbled.insert(endpoint);
    }

    pub async fn strip_metadata(&self) {
        self.store.lock().await.strip_metadata = true;
    }

    /// Ids of the orders still stored.
    pub async fn order_ids(&self) -> Vec<String> {
        self.store
            .lock()
            .await
            .orders
            .iter()
            .filter_map(|o| o["order_id"].as_str().map(str::to_string))
            .collect()
    }

    /// Every request received, as `"{endpoint} {args}"`, oldest first.
    pub async fn requests(&self) -> Vec<String> {
        self.store.lock().await.requests.clone()
    }

    /// `(field, file name, size)` of every upload received.
    pub async fn uploads(&self) -> Vec<(String, String, usize)> {
        self.store.lock().await.uploads.clone()
    }
}

type Shared = Arc<Mutex<Store>>;

fn router(store: Shared) -> Router {
    Router::new()
        .route("/fetch_arcade_orders", get(fetch_orders))
        .route("/delete_xerox_order/{order_id}", delete(delete_record))
        .route("/delete_xerox_file/{user_id}/{file_name}", delete(delete_file))
        .route("/fetch_stationery_order_by_pin/{pin}", get(by_pin))
        .route("/delete_stationery_order/{order_id}", delete(delete_stationery))
        .route("/print_xerox/{order_id}/{file_name}", get(print))
        .route("/upload_profile", post(upload))
        .route("/upload_logo", post(upload))
        .route("/identity/signin", post(sign_in))
        .with_state(store)
}

/// Record the request and return the injected failure, if any.
fn check(store: &mut Store, endpoint: Endpoint, entry: String) -> Option<Response> {
    store.requests.push(entry);
    if store.garbled.contains(&endpoint) {
        return Some((StatusCode::OK, "<html>Gateway Timeout</html>").into_response());
    }
    store.failures.get(&endpoint).map(|&status| {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({"error": "injected"}))).into_response()
    })
}

fn take_order(store: &mut Store, order_id: &str) -> Option<Value> {
    let idx = store
        .orders
        .iter()
        .position(|o| o["order_id"].as_str() == Some(order_id))?;
    Some(store.orders.remove(idx))
}

async fn fetch_orders(State(store): State<Shared>) -> Response {
    let mut store = store.lock().await;
    if let Some(failure) = check(&mut store, Endpoint::FetchOrders, "fetch_orders".into()) {
        return failure;
    }
    Json(store.orders.clone()).into_response()
}

async fn delete_record(State(store): State<Shared>, Path(order_id): Path<String>) -> Response {
    let mut store = store.lock().await;
    if let Some(failure) = check(&mut store, Endpoint::DeleteRecord, format!("delete_record {order_id}")) {
        return failure;
    }
    let Some(order) = take_order(&mut store, &order_id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response();
    };

    if store.strip_metadata {
        return Json(json!({"user_id": null, "file_name": null})).into_response();
    }
    Json(json!({
        "message": "deleted",
        "user_id": order["user_id"],
        "file_name": order["xeroxDetails"]["fileName"],
    }))
    .into_response()
}

async fn delete_file(
    State(store): State<Shared>,
    Path((user_id, file_name)): Path<(String, String)>,
) -> Response {
    let mut store = store.lock().await;
    if let Some(failure) = check(
        &mut store,
        Endpoint::DeleteFile,
        format!("delete_file {user_id}/{file_name}"),
    ) {
        return failure;
    }
    Json(json!({"message": "File deleted"})).into_response()
}

async fn by_pin(State(store): State<Shared>, Path(pin): Path<String>) -> Response {
    let mut store = store.lock().await;
    if let Some(failure) = check(&mut store, Endpoint::ByPin, format!("by_pin {pin}")) {
        return failure;
    }
    let order = store
        .orders
        .iter()
        .find(|o| o["pin"].as_str() == Some(pin.as_str()))
        .cloned()
        .unwrap_or(Value::Null);
    Json(order).into_response()
}

async fn delete_stationery(State(store): State<Shared>, Path(order_id): Path<String>) -> Response {
    let mut store = store.lock().await;
    if let Some(failure) = check(
        &mut store,
        Endpoint::DeleteStationery,
        format!("deliver {order_id}"),
    ) {
        return failure;
    }
    match take_order(&mut store, &order_id) {
        Some(_) => Json(json!({"message": "Order deleted"})).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response(),
    }
}

async fn print(
    State(store): State<Shared>,
    Path((order_id, file_name)): Path<(String, String)>,
) -> Response {
    let mut store = store.lock().await;
    if let Some(failure) = check(&mut store, Endpoint::Print, format!("print {order_id}/{file_name}")) {
        return failure;
    }
    Json(json!({"message": "Printing"})).into_response()
}

async fn upload(State(store): State<Shared>, mut multipart: Multipart) -> Response {
    let mut received = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let size = field.bytes().await.map_or(0, |b| b.len());
        received.push((name, file_name, size));
    }

    let mut store = store.lock().await;
    if let Some(failure) = check(&mut store, Endpoint::Upload, "upload".into()) {
        return failure;
    }
    let filename = received.first().map(|(_, f, _)| format!("stored-{f}"));
    store.uploads.extend(received);
    Json(json!({"filename": filename})).into_response()
}

/// Firebase-style password sign-in.
async fn sign_in(
    State(store): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let key = query.get("key").map_or("", String::as_str);
    store
        .lock()
        .await
        .requests
        .push(format!("sign_in {email} key={key}"));

    if key != IDENTITY_KEY {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"code": 400, "message": "API key not valid"}})),
        )
            .into_response();
    }
    if body["password"].as_str() != Some(IDENTITY_PASSWORD)
        || body["returnSecureToken"] != Value::Bool(true)
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"code": 400, "message": "INVALID_PASSWORD"}})),
        )
            .into_response();
    }
    Json(json!({"idToken": IDENTITY_TOKEN, "email": email})).into_response()
}

/// A Xerox order as the backend stores it.
#[must_use]
pub fn xerox_order(order_id: &str, user_id: &str, file_name: &str) -> Value {
    json!({
        "order_id": order_id,
        "pin": "101",
        "user_id": user_id,
        "xeroxDetails": {
            "fileName": file_name,
            "copies": 2,
            "printSide": "single",
            "printType": "bw",
            "customInstructions": "",
            "fileUrl": format!("https://storage.local/{user_id}/{file_name}")
        },
        "timestamp": "2025-07-14T10:00:00"
    })
}

/// A stationery order as the backend stores it.
#[must_use]
pub fn stationery_order(order_id: &str, pin: &str) -> Value {
    json!({
        "order_id": order_id,
        "pin": pin,
        "user_id": "student-9",
        "stationeryItems": [
            {"name": "Pen", "quantity": 2},
            {"name": "Notebook", "quantity": 1}
        ],
        "totalCost": 70,
        "timestamp": "2025-07-14T11:30:00"
    })
}
