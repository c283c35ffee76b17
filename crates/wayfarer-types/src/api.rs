use serde::{Deserialize, Serialize};

use crate::models::{
    Comment, Destination, FriendProfile, Profile, TripArc, TripDetail, TripSummary,
};

// Request bodies keep every field optional so that a missing field is
// reported by the handler with a specific message instead of a generic
// deserialization failure.

// -- Health --

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub env: String,
    pub uptime: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

// -- Profile --

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub ok: bool,
    pub message: String,
    pub data: Vec<Profile>,
}

// -- Avatar --

#[derive(Debug, Default, Deserialize)]
pub struct UploadAvatarRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "imageBase64")]
    pub image_base64: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadAvatarResponse {
    pub ok: bool,
    pub avatar_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteAvatarRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

// -- Trips --

#[derive(Debug, Serialize, Deserialize)]
pub struct TripsResponse {
    pub ok: bool,
    pub trips: Vec<TripSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TripResponse {
    pub ok: bool,
    pub trip: TripDetail,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewStopRequest {
    pub country_id: Option<i64>,
    pub city: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTripRequest {
    pub user_id: Option<String>,
    pub trip_name: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub stops: Vec<NewStopRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTripResponse {
    pub ok: bool,
    pub id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddCommentRequest {
    pub user_id: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentResponse {
    pub ok: bool,
    pub comment: Comment,
}

// -- Globe --

#[derive(Debug, Serialize, Deserialize)]
pub struct ArcsResponse {
    pub ok: bool,
    pub arcs: Vec<TripArc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DestinationsResponse {
    pub ok: bool,
    pub destinations: Vec<Destination>,
}

// -- Friends --

#[derive(Debug, Default, Deserialize)]
pub struct FriendsQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friendship {
    pub id: i64,
    pub created_at: String,
    pub friend: FriendProfile,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FriendsResponse {
    pub ok: bool,
    pub friends: Vec<Friendship>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddFriendRequest {
    pub user_id: Option<String>,
    pub friend_id: Option<String>,
}
