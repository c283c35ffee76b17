use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::state::AppState;
use crate::storage::AVATAR_PUBLIC_PATH;
use crate::{avatar, friends, globe, health, profile, trips};

/// REST surface plus read-only access to stored avatars. The static frontend
/// fallback and transport layers are added by the binary.
pub fn router(state: AppState) -> Router {
    let avatars = ServeDir::new(state.storage.dir());

    Router::new()
        .route("/health", get(health::health))
        .route("/api/profile", post(profile::upsert_profile))
        .route("/api/upload-avatar", post(avatar::upload_avatar))
        .route("/api/delete-avatar", post(avatar::delete_avatar))
        .route("/api/trips", get(trips::list_trips).post(trips::create_trip))
        .route("/api/trips/{id}", get(trips::get_trip))
        .route("/api/trips/{id}/comments", post(trips::add_comment))
        .route("/api/arcs", get(globe::list_arcs))
        .route("/api/destinations", get(globe::list_destinations))
        .route("/api/friends", get(friends::list_friends))
        .route("/api/add-friend", post(friends::add_friend))
        .nest_service(AVATAR_PUBLIC_PATH, avatars)
        .with_state(state)
}
