//! HTTP implementation of the backend gateway.

use std::sync::Arc;

use campus_desk_core::{OrderId, Pin, RawOrder};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{CompletionResult, DeletedRecord, GatewayError, OrderBackend};

/// Which branding image an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Profile,
    Logo,
}

impl ImageKind {
    /// Multipart field name the backend expects.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Profile => "profile-upload",
            Self::Logo => "logo-upload",
        }
    }

    const fn endpoint(self) -> &'static str {
        match self {
            Self::Profile => "upload_profile",
            Self::Logo => "upload_logo",
        }
    }

    /// Directory under `/Uploads` the backend serves these images from.
    #[must_use]
    pub const fn upload_dir(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Logo => "logo",
        }
    }
}

/// A file picked in the browser, ready to forward.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Response of the upload endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadedImage {
    #[serde(default)]
    pub filename: Option<String>,
}

/// Campus backend client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: Client,
    base_url: Url,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Network`] if the base URL cannot carry a path
    /// or the HTTP client fails to build.
    pub fn new(base_url: Url) -> Result<Self, GatewayError> {
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Network(format!(
                "backend URL cannot be a base: {base_url}"
            )));
        }

        let client = Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner { client, base_url }),
        })
    }

    /// The configured backend root.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL. Each segment is percent-encoded on its own, so a
    /// file name containing `/` or spaces stays one segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), url = %response.url(), "Backend returned error status");
            return Err(GatewayError::Http {
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, GatewayError> {
        let response = Self::send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Network(format!("Invalid response body: {e}")))
    }

    /// URL the browser navigates to for downloading a print file.
    #[must_use]
    pub fn download_url(&self, order_id: &OrderId, file_name: &str) -> Url {
        self.endpoint(&["download_xerox", order_id.as_str(), file_name])
    }

    /// URL of an uploaded branding image.
    #[must_use]
    pub fn uploaded_image_url(&self, kind: ImageKind, filename: &str) -> Url {
        self.endpoint(&["Uploads", kind.upload_dir(), filename])
    }

    /// Ask the backend to start a print job.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] per the module's normalization rules.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn print_job(&self, order_id: &OrderId, file_name: &str) -> Result<(), GatewayError> {
        let url = self.endpoint(&["print_xerox", order_id.as_str(), file_name]);
        let _: serde_json::Value = Self::send_json(self.inner.client.get(url)).await?;
        debug!("Print job acknowledged");
        Ok(())
    }

    /// Forward a branding image to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] per the module's normalization rules, or
    /// [`GatewayError::Network`] if the content type is not a valid MIME type.
    #[instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.bytes.len()))]
    pub async fn upload_image(
        &self,
        kind: ImageKind,
        upload: ImageUpload,
    ) -> Result<UploadedImage, GatewayError> {
        let mut part = reqwest::multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        let form = reqwest::multipart::Form::new().part(kind.field_name(), part);

        let url = self.endpoint(&[kind.endpoint()]);
        Self::send_json(self.inner.client.post(url).multipart(form)).await
    }
}

impl OrderBackend for BackendClient {
    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<RawOrder>, GatewayError> {
        let url = self.endpoint(&["fetch_arcade_orders"]);
        let orders: Vec<RawOrder> = Self::send_json(self.inner.client.get(url)).await?;
        debug!(count = orders.len(), "Fetched orders");
        Ok(orders)
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn delete_order_record(&self, order_id: &OrderId) -> Result<DeletedRecord, GatewayError> {
        let url = self.endpoint(&["delete_xerox_order", order_id.as_str()]);
        let record: DeletedRecord = Self::send_json(self.inner.client.delete(url)).await?;
        debug!(user_id = ?record.user_id, file_name = ?record.file_name, "Order record deleted");
        Ok(record)
    }

    #[instrument(skip(self), fields(user_id = %completion.user_id, file_name = %completion.file_name))]
    async fn delete_order_file(&self, completion: &CompletionResult) -> Result<(), GatewayError> {
        let url = self.endpoint(&[
            "delete_xerox_file",
            completion.user_id.as_str(),
            &completion.file_name,
        ]);
        let _: serde_json::Value = Self::send_json(self.inner.client.delete(url)).await?;
        debug!("Order file deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(pin = %pin))]
    async fn order_by_pin(&self, pin: &Pin) -> Result<Option<RawOrder>, GatewayError> {
        let url = self.endpoint(&["fetch_stationery_order_by_pin", pin.as_str()]);
        Self::send_json(self.inner.client.get(url)).await
    }

    #[instrument(skip(self), fields(order_id = %order_id))]
    async fn deliver_order(&self, order_id: &OrderId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["delete_stationery_order", order_id.as_str()]);
        let _: serde_json::Value = Self::send_json(self.inner.client.delete(url)).await?;
        debug!("Stationery order delivered");
        Ok(())
    }
}
