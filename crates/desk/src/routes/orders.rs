//! Per-card order actions.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use campus_desk_core::{ArcadeOrder, OrderId};
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::{AppError, Result};
use crate::notices::Notice;
use crate::state::AppState;
use crate::workflows::completion;

pub const FILE_MISSING_MESSAGE: &str = "File not available for this order.";
pub const FILE_URL_INVALID_MESSAGE: &str = "Invalid file URL. Please check the order details.";

/// Print preview template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/print_preview.html")]
pub struct PrintPreviewTemplate {
    pub order_id: String,
    pub file_name: String,
}

/// Start completing an order and return to the dashboard.
///
/// The card turns to Processing before this returns; the backend calls run
/// in a spawned task and report back through the board and notices.
///
/// POST /orders/{id}/complete
#[instrument(skip(state))]
pub async fn complete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    let order_id = OrderId::new(id);
    let run = completion::begin(state.board(), &order_id).await?;

    tokio::spawn(async move {
        run.execute(state.backend(), state.board(), state.notices())
            .await;
    });

    Ok(Redirect::to("/"))
}

/// Send the browser to the backend download.
///
/// GET /orders/{id}/download
#[instrument(skip(state))]
pub async fn download(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    let order = mounted_order(&state, &OrderId::new(id)).await?;
    let url = state
        .backend()
        .download_url(&order.id, order.file_name_or_unknown());
    Ok(Redirect::to(url.as_str()))
}

/// Open the order's file, if it has a usable URL.
///
/// GET /orders/{id}/view
#[instrument(skip(state))]
pub async fn view(State(state): State<AppState>, Path(id): Path<String>) -> Result<Redirect> {
    let order = mounted_order(&state, &OrderId::new(id)).await?;

    match file_target(order.details.file_url.as_deref()) {
        Ok(url) => Ok(Redirect::to(url.as_str())),
        Err(message) => {
            warn!(order_id = %order.id, file_url = ?order.details.file_url, "{message}");
            state.notices().push(Notice::error(message)).await;
            Ok(Redirect::to("/"))
        }
    }
}

/// Ask the backend to print and show a preview page.
///
/// GET /orders/{id}/print
#[instrument(skip(state))]
pub async fn print(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let order = mounted_order(&state, &OrderId::new(id)).await?;
    let file_name = order.file_name_or_unknown().to_string();

    match state.backend().print_job(&order.id, &file_name).await {
        Ok(()) => {
            info!(order_id = %order.id, "Print job started");
            Ok(PrintPreviewTemplate {
                order_id: order.id.to_string(),
                file_name,
            }
            .into_response())
        }
        Err(err) => {
            state
                .notices()
                .push(Notice::error(format!("Error initiating print: {err}")))
                .await;
            Ok(Redirect::to("/").into_response())
        }
    }
}

/// Validate a file URL taken from order details.
///
/// # Errors
///
/// Returns the operator-facing message when the URL is blank or unparseable.
pub fn file_target(file_url: Option<&str>) -> std::result::Result<Url, &'static str> {
    let file_url = file_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or(FILE_MISSING_MESSAGE)?;
    Url::parse(file_url).map_err(|_| FILE_URL_INVALID_MESSAGE)
}

async fn mounted_order(state: &AppState, order_id: &OrderId) -> Result<ArcadeOrder> {
    state
        .board()
        .read()
        .await
        .get(order_id)
        .map(|card| card.order.clone())
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))
}
