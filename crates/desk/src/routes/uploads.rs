//! Profile picture and logo uploads.
//!
//! The picked file is forwarded to the backend as-is. Outcomes are reported
//! as notices on the page the operator is sent back to.

use axum::{
    extract::{Multipart, State},
    response::Redirect,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{AppError, Result};
use crate::gateway::{ImageKind, ImageUpload};
use crate::notices::Notice;
use crate::state::AppState;

/// Replace the profile picture.
///
/// POST /uploads/profile
pub async fn profile(State(state): State<AppState>, multipart: Multipart) -> Result<Redirect> {
    upload(&state, ImageKind::Profile, multipart).await
}

/// Replace the college logo.
///
/// POST /uploads/logo
pub async fn logo(State(state): State<AppState>, multipart: Multipart) -> Result<Redirect> {
    upload(&state, ImageKind::Logo, multipart).await
}

const fn label(kind: ImageKind) -> &'static str {
    match kind {
        ImageKind::Profile => "profile picture",
        ImageKind::Logo => "logo",
    }
}

#[instrument(skip(state, multipart))]
async fn upload(state: &AppState, kind: ImageKind, multipart: Multipart) -> Result<Redirect> {
    let Some(file) = read_file(kind, multipart).await? else {
        debug!("No file picked");
        return Ok(Redirect::to("/"));
    };

    let notice = match state.backend().upload_image(kind, file).await {
        Ok(uploaded) => match uploaded.filename.filter(|name| !name.is_empty()) {
            Some(filename) => {
                let src = state.backend().uploaded_image_url(kind, &filename);
                state.branding().write().await.set(kind, src.as_str());
                info!(filename = %filename, "Image replaced");
                None
            }
            None => Some(Notice::error(format!("Error uploading {}", label(kind)))),
        },
        Err(err) => {
            warn!(error = %err, "Upload failed");
            Some(Notice::error(format!("Error uploading {}: {err}", label(kind))))
        }
    };

    if let Some(notice) = notice {
        state.notices().push(notice).await;
    }

    Ok(Redirect::to("/"))
}

/// Pull the file for `kind` out of the form. An empty file input counts as
/// no file.
async fn read_file(kind: ImageKind, mut multipart: Multipart) -> Result<Option<ImageUpload>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(kind.field_name()) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if file_name.is_empty() || bytes.is_empty() {
            return Ok(None);
        }

        return Ok(Some(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}
