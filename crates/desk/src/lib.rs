//! Campus Desk library.
//!
//! The order desk for a campus Xerox and stationery counter: a dashboard of
//! pending print jobs with two-phase completion, a stationery pickup panel
//! keyed by a 3-digit PIN, and the gateway both use to reach the campus order
//! backend.
//!
//! The crate is a library so the binary, the CLI and the integration tests
//! share one router and one set of workflows.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod board;
pub mod config;
pub mod error;
pub mod filters;
pub mod gateway;
pub mod identity;
pub mod notices;
pub mod receipt;
pub mod routes;
pub mod state;
pub mod workflows;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use state::AppState;

/// Directory the desk serves `/static` from, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/desk/static";

/// Build the desk application with request tracing and Sentry layers.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::DeskConfig;

    fn test_app() -> Router {
        // Nothing listens here; these requests never reach the backend.
        let config = DeskConfig::from_lookup(|key| {
            (key == "DESK_BACKEND_URL").then(|| "http://127.0.0.1:9".to_string())
        })
        .unwrap();
        app(AppState::new(&config).unwrap())
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_invalid_pin_is_rejected_locally() {
        let response = test_app()
            .oneshot(
                Request::get("/stationery?pin=12")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            body_text(response)
                .await
                .contains("Please enter a valid 3-digit PIN")
        );
    }

    #[tokio::test]
    async fn test_complete_unknown_order_is_not_found() {
        let response = test_app()
            .oneshot(
                Request::post("/orders/missing/complete")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let response = test_app()
            .oneshot(Request::post("/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let set = response.headers()["set-cookie"].to_str().unwrap();
        let cookie = cookie::Cookie::parse(set).unwrap();
        assert_eq!(cookie.name(), "id_token");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(cookie::time::Duration::ZERO));
    }

    #[tokio::test]
    async fn test_login_without_identity_provider() {
        let response = test_app()
            .oneshot(
                Request::post("/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("email=desk%40college.edu&password=pw"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(body_text(response).await.contains("Sign-in is not configured"));
    }
}
