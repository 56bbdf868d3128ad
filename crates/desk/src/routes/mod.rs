//! HTTP route handlers for the desk.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check
//!
//! # Xerox dashboard
//! GET  /                           - Order board (reloads the order list)
//! POST /orders/{id}/complete       - Start two-phase completion
//! GET  /orders/{id}/download       - Redirect to the backend download
//! GET  /orders/{id}/view           - Redirect to the order's file URL
//! GET  /orders/{id}/print          - Start a print job, show print preview
//!
//! # Stationery
//! GET  /stationery                 - PIN lookup panel (?pin= runs a lookup)
//! POST /stationery/{id}/deliver    - Mark an order delivered
//! GET  /stationery/receipt         - Printable receipt (?pin=)
//!
//! # Auth
//! GET  /login                      - Sign-in form
//! POST /login                      - Sign in, set id_token cookie
//! POST /logout                     - Clear id_token cookie
//!
//! # Branding
//! POST /uploads/profile            - Replace profile picture (multipart)
//! POST /uploads/logo               - Replace college logo (multipart)
//! ```

pub mod auth;
pub mod dashboard;
pub mod orders;
pub mod stationery;
pub mod uploads;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::identity::has_id_token;
use crate::notices::Notice;
use crate::state::AppState;

/// Shared page chrome: header images, pending notices, sign-in state.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub profile_src: String,
    pub logo_src: String,
    pub notices: Vec<Notice>,
    pub signed_in: bool,
    /// Reload the page every couple of seconds.
    pub auto_refresh: bool,
}

impl Layout {
    /// Build the chrome for a page, taking every pending notice.
    pub async fn load(state: &AppState, headers: &HeaderMap) -> Self {
        let branding = state.branding().read().await.clone();
        Self {
            profile_src: branding.profile_src,
            logo_src: branding.logo_src,
            notices: state.notices().drain().await,
            signed_in: has_id_token(headers),
            auto_refresh: false,
        }
    }
}

/// Create the order action routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/complete", post(orders::complete))
        .route("/{id}/download", get(orders::download))
        .route("/{id}/view", get(orders::view))
        .route("/{id}/print", get(orders::print))
}

/// Create the stationery routes router.
pub fn stationery_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stationery::panel))
        .route("/receipt", get(stationery::receipt))
        .route("/{id}/deliver", post(stationery::deliver))
}

/// Create the upload routes router.
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", post(uploads::profile))
        .route("/logo", post(uploads::logo))
}

/// Create all routes for the desk.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(dashboard::index))
        .nest("/orders", order_routes())
        .nest("/stationery", stationery_routes())
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .nest("/uploads", upload_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
