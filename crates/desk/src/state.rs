//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::board::OrderBoard;
use crate::config::DeskConfig;
use crate::gateway::{BackendClient, GatewayError, ImageKind};
use crate::identity::IdentityClient;
use crate::notices::NoticeQueue;

const DEFAULT_PROFILE_SRC: &str = "/static/img/profile.svg";
const DEFAULT_LOGO_SRC: &str = "/static/img/logo.svg";

/// Image paths shown in the page header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub profile_src: String,
    pub logo_src: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            profile_src: DEFAULT_PROFILE_SRC.to_string(),
            logo_src: DEFAULT_LOGO_SRC.to_string(),
        }
    }
}

impl Branding {
    /// Point the matching image at a new source.
    pub fn set(&mut self, kind: ImageKind, src: impl Into<String>) {
        let src = src.into();
        match kind {
            ImageKind::Profile => self.profile_src = src,
            ImageKind::Logo => self.logo_src = src,
        }
    }
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Mutable parts sit behind tokio locks so
/// handlers and spawned completions can share them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    backend: BackendClient,
    identity: Option<IdentityClient>,
    board: RwLock<OrderBoard>,
    notices: NoticeQueue,
    branding: RwLock<Branding>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built from the
    /// configured URL.
    pub fn new(config: &DeskConfig) -> Result<Self, GatewayError> {
        let backend = BackendClient::new(config.backend_url.clone())?;
        let identity = config.identity.as_ref().map(IdentityClient::new);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                backend,
                identity,
                board: RwLock::new(OrderBoard::new()),
                notices: NoticeQueue::new(),
                branding: RwLock::new(Branding::default()),
            }),
        })
    }

    /// Get a reference to the campus backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get the identity client, if sign-in is configured.
    #[must_use]
    pub fn identity(&self) -> Option<&IdentityClient> {
        self.inner.identity.as_ref()
    }

    /// The Xerox dashboard board.
    #[must_use]
    pub fn board(&self) -> &RwLock<OrderBoard> {
        &self.inner.board
    }

    /// Pending notices for the next rendered page.
    #[must_use]
    pub fn notices(&self) -> &NoticeQueue {
        &self.inner.notices
    }

    /// Header images.
    #[must_use]
    pub fn branding(&self) -> &RwLock<Branding> {
        &self.inner.branding
    }
}
