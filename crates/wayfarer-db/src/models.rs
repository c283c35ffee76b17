//! Database row types — these map directly to SQLite rows.
//! Distinct from wayfarer-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct ProfileRow {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Trip joined with its owner. Owner columns are `None` when the owner row
/// has gone missing.
#[derive(Debug, Clone)]
pub struct TripRow {
    pub id: i64,
    pub user_id: String,
    pub trip_name: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: String,
    pub created_at: String,
    pub owner_username: Option<String>,
    pub owner_display_name: Option<String>,
    pub owner_color: Option<String>,
    pub owner_avatar_url: Option<String>,
}

/// Stop joined with its country.
#[derive(Debug, Clone)]
pub struct StopRow {
    pub id: i64,
    pub trip_id: i64,
    pub city: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub country_id: Option<i64>,
    pub country_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: i64,
    pub trip_id: i64,
    pub user_id: String,
    pub username: Option<String>,
    pub text: String,
    pub created_at: String,
}

/// Friendship edge seen from one participant; `other_*` is the counterpart
/// regardless of which column it was stored in.
#[derive(Debug, Clone)]
pub struct FriendRow {
    pub id: i64,
    pub created_at: String,
    pub other_id: String,
    pub other_username: Option<String>,
    pub other_display_name: Option<String>,
    pub other_color: Option<String>,
    pub other_avatar_url: Option<String>,
}
