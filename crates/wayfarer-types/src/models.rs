use serde::{Deserialize, Serialize};

/// Fallback colour for users that never picked one.
pub const DEFAULT_USER_COLOR: &str = "rgba(192,192,192,1)";

/// Public profile columns, as returned by the profile upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// The "other side" of a friendship edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendProfile {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub user_color: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// -- Trip listing (frontend shape, camelCase) --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopSummary {
    pub country: String,
    pub city: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub id: i64,
    pub user_id: String,
    pub user_name: String,
    pub user_color: String,
    pub user_avatar: Option<String>,
    pub trip_name: String,
    pub cover_image: Option<String>,
    pub stops: Vec<StopSummary>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

// -- Trip detail (row shape, snake_case) --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripOwner {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub user_color: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopDetail {
    pub id: i64,
    pub city: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub country: Option<Country>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub trip_id: i64,
    pub user_id: String,
    pub username: Option<String>,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDetail {
    pub id: i64,
    pub user_id: String,
    pub trip_name: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: String,
    pub created_at: String,
    pub user: Option<TripOwner>,
    pub stops: Vec<StopDetail>,
    pub comments: Vec<Comment>,
}

// -- Globe aggregation --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripArc {
    pub trip_id: i64,
    pub user_id: String,
    pub user_name: String,
    pub user_color: String,
    pub trip_name: String,
    pub origin: StopSummary,
    pub destination: StopSummary,
    pub arc_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationTrip {
    pub trip_id: i64,
    pub user_id: String,
    pub user_name: String,
    pub user_color: String,
    pub trip_name: String,
    pub user_avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub user_id: String,
    pub user_name: String,
    pub user_color: String,
    pub user_avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub name: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub trips: Vec<DestinationTrip>,
    pub visitors: Vec<Visitor>,
    pub visit_count: usize,
    pub pin_color: String,
}
