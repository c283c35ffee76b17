use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tracing::{error, info};

use wayfarer_types::api::{
    DeleteAvatarRequest, OkResponse, UploadAvatarRequest, UploadAvatarResponse,
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::object_name_from_url;
use crate::validation::{present, validate_user_id};

/// POST /api/upload-avatar — store a base64 PNG and point the user at it.
///
/// Order: write the new object, update the row, then drop the previous
/// object. A failed row update removes the object it just wrote, so a
/// failure never leaves the user pointing at nothing.
pub async fn upload_avatar(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<UploadAvatarRequest>, ApiError>,
) -> Result<Json<UploadAvatarResponse>, ApiError> {
    let (Some(user_id), Some(image)) = (present(req.user_id), present(req.image_base64)) else {
        return Err(ApiError::bad_request("userId and imageBase64 are required"));
    };
    validate_user_id(&user_id)?;
    let bytes = decode_image(&image)?;

    let previous = current_avatar(&state, &user_id).await?;

    let name = format!("{}-{}.png", user_id, chrono::Utc::now().timestamp_millis());
    state.storage.put(&name, &bytes).await?;
    let url = state.storage.public_url(&name);

    let (uid, new_url) = (user_id.clone(), url.clone());
    let updated = state
        .with_db(move |db| db.set_avatar_url(&uid, Some(new_url.as_str())))
        .await;

    match updated {
        Ok(true) => {}
        Ok(false) => {
            discard_object(&state, &name).await;
            return Err(ApiError::not_found("User not found"));
        }
        Err(e) => {
            discard_object(&state, &name).await;
            return Err(e);
        }
    }

    if let Some(old) = previous.as_deref().and_then(|url| owned_object(url, &user_id)) {
        if old != name {
            discard_object(&state, old).await;
        }
    }

    info!("Avatar updated for {}", user_id);
    Ok(Json(UploadAvatarResponse {
        ok: true,
        avatar_url: url,
    }))
}

/// POST /api/delete-avatar — clear the column, then remove the stored object.
/// A user without an avatar is left untouched.
pub async fn delete_avatar(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<DeleteAvatarRequest>, ApiError>,
) -> Result<Json<OkResponse>, ApiError> {
    let user_id = present(req.user_id).ok_or_else(|| ApiError::bad_request("userId is required"))?;
    validate_user_id(&user_id)?;

    let Some(previous) = current_avatar(&state, &user_id).await? else {
        return Ok(Json(OkResponse::new()));
    };

    let uid = user_id.clone();
    if !state.with_db(move |db| db.set_avatar_url(&uid, None)).await? {
        return Err(ApiError::not_found("User not found"));
    }

    if let Some(old) = owned_object(&previous, &user_id) {
        discard_object(&state, old).await;
    }

    info!("Avatar removed for {}", user_id);
    Ok(Json(OkResponse::new()))
}

/// Object named by `url`, if it is one of this user's uploads. URLs set by
/// hand through the profile endpoint never cause another user's object to be
/// removed.
fn owned_object<'a>(url: &'a str, user_id: &str) -> Option<&'a str> {
    object_name_from_url(url)
        .filter(|name| name.strip_prefix(user_id).is_some_and(|rest| rest.starts_with('-')))
}

/// Stored avatar URL; 404 when the user row does not exist.
async fn current_avatar(state: &AppState, user_id: &str) -> Result<Option<String>, ApiError> {
    let uid = user_id.to_string();
    state
        .with_db(move |db| db.get_avatar_url(&uid))
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// Accepts bare base64 or a `data:image/...;base64,` URL.
fn decode_image(raw: &str) -> Result<Vec<u8>, ApiError> {
    let raw = raw.trim();
    let payload = match raw.strip_prefix("data:") {
        Some(rest) => rest
            .split_once("base64,")
            .map(|(_, data)| data)
            .ok_or_else(|| ApiError::bad_request("imageBase64 is not base64 encoded"))?,
        None => raw,
    };

    let bytes = B64
        .decode(payload)
        .map_err(|_| ApiError::bad_request("imageBase64 is not valid base64"))?;
    if bytes.is_empty() {
        return Err(ApiError::bad_request("imageBase64 is empty"));
    }
    Ok(bytes)
}

/// Best-effort object removal; failures are logged and swallowed.
async fn discard_object(state: &AppState, name: &str) {
    if let Err(e) = state.storage.remove(name).await {
        error!("Failed to remove avatar object {}: {:#}", name, e);
    }
}
