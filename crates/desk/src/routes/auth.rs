//! Sign-in and sign-out.
//!
//! Sign-in trades email and password for an identity token and stores it in
//! the `id_token` cookie. Errors are shown on the form; nothing is retried.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use campus_desk_core::Credentials;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::filters;
use crate::identity::{IdToken, IdentityError};
use crate::routes::Layout;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
}

/// Display the login page.
///
/// GET /login
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> LoginTemplate {
    LoginTemplate {
        layout: Layout::load(&state, &headers).await,
        email: String::new(),
        error: None,
    }
}

/// Handle login form submission.
///
/// POST /login
#[instrument(skip(state, headers, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let result = match Credentials::parse(&form.email, &form.password) {
        Ok(credentials) => sign_in(&state, &credentials).await,
        Err(err) => Err(err.to_string()),
    };

    match result {
        Ok(token) => {
            info!("Signed in");
            ([(SET_COOKIE, token.cookie())], Redirect::to("/")).into_response()
        }
        Err(error) => LoginTemplate {
            layout: Layout::load(&state, &headers).await,
            email: form.email,
            error: Some(error),
        }
        .into_response(),
    }
}

async fn sign_in(state: &AppState, credentials: &Credentials) -> Result<IdToken, String> {
    let identity = state
        .identity()
        .ok_or_else(|| IdentityError::NotConfigured.to_string())?;

    identity.sign_in(credentials).await.map_err(|err| {
        warn!(error = %err, "Sign-in failed");
        err.to_string()
    })
}

/// Clear the identity cookie.
///
/// POST /logout
pub async fn logout() -> impl IntoResponse {
    ([(SET_COOKIE, IdToken::expired_cookie())], Redirect::to("/"))
}
