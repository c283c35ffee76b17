use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;
use tracing::info;

use wayfarer_db::FriendInsert;
use wayfarer_db::models::FriendRow;
use wayfarer_types::api::{AddFriendRequest, FriendsQuery, FriendsResponse, Friendship, OkResponse};
use wayfarer_types::models::FriendProfile;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::present;

/// GET /api/friends?userId= — every edge touching the user, in either
/// direction. `friend` is always the other participant.
pub async fn list_friends(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<FriendsQuery>, ApiError>,
) -> Result<Json<FriendsResponse>, ApiError> {
    let user_id = present(query.user_id).ok_or_else(|| ApiError::bad_request("userId is required"))?;

    let rows = state.with_db(move |db| db.get_friendships(&user_id)).await?;

    Ok(Json(FriendsResponse {
        ok: true,
        friends: rows.into_iter().map(friendship_from_row).collect(),
    }))
}

fn friendship_from_row(row: FriendRow) -> Friendship {
    Friendship {
        id: row.id,
        created_at: row.created_at,
        friend: FriendProfile {
            id: row.other_id,
            username: row.other_username.unwrap_or_default(),
            display_name: row.other_display_name,
            user_color: row.other_color,
            avatar_url: row.other_avatar_url,
        },
    }
}

/// POST /api/add-friend — insert a single directed edge.
pub async fn add_friend(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<AddFriendRequest>, ApiError>,
) -> Result<Json<OkResponse>, ApiError> {
    let (Some(user_id), Some(friend_id)) = (present(req.user_id), present(req.friend_id)) else {
        return Err(ApiError::bad_request("user_id and friend_id are required"));
    };

    let (uid, fid) = (user_id.clone(), friend_id.clone());
    match state.with_db(move |db| db.insert_friend(&uid, &fid)).await? {
        FriendInsert::Inserted(id) => {
            info!("Friend edge {} created: {} -> {}", id, user_id, friend_id);
            Ok(Json(OkResponse::new()))
        }
        FriendInsert::UnknownUser(id) => Err(ApiError::not_found(format!("User {} not found", id))),
    }
}
