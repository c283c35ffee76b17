use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use tracing::info;

use wayfarer_db::models::ProfileRow;
use wayfarer_db::{ProfileUpsert, UpsertOutcome};
use wayfarer_types::api::{ProfileRequest, ProfileResponse};
use wayfarer_types::models::Profile;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{
    present, validate_bio, validate_display_name, validate_user_id, validate_username,
};

/// POST /api/profile — create or update the caller's profile row.
///
/// The row is identified by `userId`, or by `email` through the auth
/// directory when no id is given.
pub async fn upsert_profile(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ProfileRequest>, ApiError>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let id = match present(req.user_id) {
        Some(id) => id.trim().to_string(),
        None => resolve_by_email(&state, present(req.email)).await?,
    };

    validate_user_id(&id)?;
    let username = validate_username(req.username.as_deref())?;
    let display_name = validate_display_name(req.display_name.as_deref())?;
    let bio = validate_bio(req.bio.as_deref())?;

    let upsert = ProfileUpsert {
        id,
        username,
        display_name: Some(display_name),
        bio,
        avatar_url: req.avatar_url.map(|url| url.trim().to_string()),
    };

    match state.with_db(move |db| db.upsert_profile(&upsert)).await? {
        UpsertOutcome::Saved(row) => {
            info!("Profile saved for {} ({})", row.id, row.username);
            Ok(Json(ProfileResponse {
                ok: true,
                message: "Profile saved".to_string(),
                data: vec![profile_from_row(row)],
            }))
        }
        UpsertOutcome::UsernameTaken => Err(ApiError::Conflict(
            "That username is already taken".to_string(),
        )),
    }
}

async fn resolve_by_email(state: &AppState, email: Option<String>) -> Result<String, ApiError> {
    let email = email
        .map(|e| e.trim().to_string())
        .ok_or_else(|| ApiError::bad_request("userId or email is required"))?;

    let lookup = email.clone();
    state
        .with_db(move |db| db.find_auth_user_id_by_email(&lookup))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No user exists with email {}", email)))
}

fn profile_from_row(row: ProfileRow) -> Profile {
    Profile {
        id: row.id,
        username: row.username,
        display_name: row.display_name,
        bio: row.bio,
        avatar_url: row.avatar_url,
    }
}
