//! Gateway to the campus order backend.
//!
//! Every backend call is a one-shot request: no retries, no timeout, no
//! caching. Responses are normalized the same way for every endpoint:
//!
//! - the request could not be sent → [`GatewayError::Network`]
//! - the status is outside `200..=299` → [`GatewayError::Http`]
//! - the body is not the expected JSON → [`GatewayError::Network`]
//!
//! # Endpoints
//!
//! ```text
//! GET    /fetch_arcade_orders                     - All purchases (filtered client-side)
//! DELETE /delete_xerox_order/{order_id}           - Delete a print job record
//! DELETE /delete_xerox_file/{user_id}/{file_name} - Delete the uploaded print file
//! GET    /fetch_stationery_order_by_pin/{pin}     - Stationery order lookup
//! DELETE /delete_stationery_order/{order_id}      - Mark a stationery order delivered
//! GET    /print_xerox/{order_id}/{file_name}      - Start a print job
//! GET    /download_xerox/{order_id}/{file_name}   - Browser navigation only
//! POST   /upload_profile, /upload_logo            - Branding images (multipart)
//! ```

mod client;
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fake;

use std::future::Future;

use campus_desk_core::{OrderId, Pin, RawOrder, UserId};
use serde::Deserialize;
use thiserror::Error;

pub use client::{BackendClient, ImageKind, ImageUpload, UploadedImage};

/// Errors that can occur when calling the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// A record deletion succeeded but did not say which file to delete.
    #[error("Missing user_id or file_name in response")]
    MissingMetadata,

    /// The request could not be sent or its body could not be parsed.
    #[error("{0}")]
    Network(String),
}

impl GatewayError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Response of `DELETE /delete_xerox_order/{order_id}`.
///
/// The backend may return `null` for either field when it could not work out
/// where the print file lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeletedRecord {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl DeletedRecord {
    /// Extract what the file deletion needs.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingMetadata`] if either field is absent or empty.
    pub fn into_completion(self) -> Result<CompletionResult, GatewayError> {
        match (self.user_id, self.file_name) {
            (Some(user_id), Some(file_name)) if !user_id.is_empty() && !file_name.is_empty() => {
                Ok(CompletionResult {
                    user_id: UserId::from(user_id),
                    file_name,
                })
            }
            _ => Err(GatewayError::MissingMetadata),
        }
    }
}

/// Owner and file name of a print job whose record is already deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResult {
    pub user_id: UserId,
    pub file_name: String,
}

/// Backend operations used by the desk workflows.
///
/// [`BackendClient`] is the HTTP implementation; tests substitute in-memory
/// backends.
pub trait OrderBackend: Send + Sync {
    /// `GET /fetch_arcade_orders`.
    fn list_orders(&self) -> impl Future<Output = Result<Vec<RawOrder>, GatewayError>> + Send;

    /// `DELETE /delete_xerox_order/{order_id}`.
    fn delete_order_record(
        &self,
        order_id: &OrderId,
    ) -> impl Future<Output = Result<DeletedRecord, GatewayError>> + Send;

    /// `DELETE /delete_xerox_file/{user_id}/{file_name}`.
    fn delete_order_file(
        &self,
        completion: &CompletionResult,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// `GET /fetch_stationery_order_by_pin/{pin}`. A JSON `null` body is `None`.
    fn order_by_pin(
        &self,
        pin: &Pin,
    ) -> impl Future<Output = Result<Option<RawOrder>, GatewayError>> + Send;

    /// `DELETE /delete_stationery_order/{order_id}`.
    fn deliver_order(
        &self,
        order_id: &OrderId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
