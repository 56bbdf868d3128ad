//! Email/password sign-in against the identity provider.
//!
//! The provider speaks the Firebase Auth REST dialect:
//! `POST {endpoint}?key={api_key}` with `{email, password, returnSecureToken}`
//! answers `{idToken, email}` on success and `{error: {message}}` otherwise.
//! The id token is handed to the browser as the `id_token` cookie.

use axum::http::{HeaderMap, header::COOKIE};
use campus_desk_core::Credentials;
use cookie::{Cookie, SameSite};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use url::Url;

use crate::config::IdentityConfig;

/// Name of the cookie carrying the identity token.
pub const ID_TOKEN_COOKIE: &str = "id_token";

/// Errors that can occur during sign-in.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No identity provider is configured for this desk.
    #[error("Sign-in is not configured")]
    NotConfigured,

    /// The provider rejected the credentials.
    #[error("{0}")]
    Rejected(String),

    /// HTTP request failed.
    #[error("Sign-in request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("Sign-in response error: {0}")]
    Response(String),
}

/// Identity token returned by a successful sign-in.
#[derive(Debug, Clone)]
pub struct IdToken(SecretString);

impl IdToken {
    #[must_use]
    pub const fn new(token: SecretString) -> Self {
        Self(token)
    }

    /// `Set-Cookie` value storing this token for the whole site.
    #[must_use]
    pub fn cookie(&self) -> String {
        token_cookie(self.0.expose_secret().to_owned())
            .build()
            .to_string()
    }

    /// `Set-Cookie` value removing the token.
    #[must_use]
    pub fn expired_cookie() -> String {
        token_cookie(String::new())
            .max_age(cookie::time::Duration::ZERO)
            .build()
            .to_string()
    }
}

fn token_cookie(value: String) -> cookie::CookieBuilder<'static> {
    Cookie::build((ID_TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
}

/// Whether the request carries a non-empty identity token cookie.
#[must_use]
pub fn has_id_token(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .any(|cookie| cookie.name() == ID_TOKEN_COOKIE && !cookie.value().is_empty())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct SignInErrorResponse {
    error: SignInErrorBody,
}

#[derive(Deserialize)]
struct SignInErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Identity provider client.
#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    endpoint: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for IdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl IdentityClient {
    /// Create a new identity client.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Exchange email and password for an id token.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Rejected`] with the provider's message when
    /// the credentials are refused, and `Request`/`Response` for transport
    /// or parse failures.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<IdToken, IdentityError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());

        let response = self
            .client
            .post(url)
            .json(&SignInRequest {
                email: credentials.email(),
                password: credentials.password(),
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status();

        if status.is_success() {
            let body: SignInResponse = response
                .json()
                .await
                .map_err(|e| IdentityError::Response(e.to_string()))?;
            info!(email = ?body.email, "Sign-in successful");
            return Ok(IdToken::new(SecretString::from(body.id_token)));
        }

        let message = response
            .json::<SignInErrorResponse>()
            .await
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or_else(|| format!("HTTP {status}"));

        warn!(status = status.as_u16(), message = %message, "Sign-in rejected");
        Err(IdentityError::Rejected(message))
    }
}
