use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;

use wayfarer_db::models::{CommentRow, StopRow, TripRow};
use wayfarer_db::{CommentInsert, NewStop, NewTrip, TripInsert};
use wayfarer_types::api::{
    AddCommentRequest, CommentResponse, CreateTripRequest, CreateTripResponse, TripResponse,
    TripsResponse,
};
use wayfarer_types::models::{
    Comment, Country, DEFAULT_USER_COLOR, StopDetail, StopSummary, TripDetail, TripOwner,
    TripSummary,
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{present, validate_user_id};

/// Only trips in this status are listed publicly.
pub const PUBLISHED: &str = "published";

/// GET /api/trips — every published trip with its owner and stops.
pub async fn list_trips(State(state): State<AppState>) -> Result<Json<TripsResponse>, ApiError> {
    let trips = published_trips(&state).await?;
    Ok(Json(TripsResponse { ok: true, trips }))
}

/// Published trips in listing shape. Shared with the globe endpoints.
pub async fn published_trips(state: &AppState) -> Result<Vec<TripSummary>, ApiError> {
    let (trips, stops) = state
        .with_db(|db| {
            let trips = db.list_trips_by_status(PUBLISHED)?;
            let stops = db.list_stops_by_trip_status(PUBLISHED)?;
            Ok((trips, stops))
        })
        .await?;

    Ok(summarize(trips, stops))
}

/// Group stops by trip id (keeping insertion order) and attach them to their trips.
pub fn summarize(trips: Vec<TripRow>, stops: Vec<StopRow>) -> Vec<TripSummary> {
    let mut stops_by_trip: HashMap<i64, Vec<StopSummary>> = HashMap::new();
    for stop in stops {
        stops_by_trip
            .entry(stop.trip_id)
            .or_default()
            .push(StopSummary {
                country: stop.country_name.unwrap_or_default(),
                city: stop.city,
                lat: stop.latitude,
                lng: stop.longitude,
                images: stop.images,
            });
    }

    trips
        .into_iter()
        .map(|trip| {
            let stops = stops_by_trip.remove(&trip.id).unwrap_or_default();
            summary_from_row(trip, stops)
        })
        .collect()
}

fn summary_from_row(trip: TripRow, stops: Vec<StopSummary>) -> TripSummary {
    let user_name = non_empty(trip.owner_display_name)
        .or(non_empty(trip.owner_username))
        .unwrap_or_default();
    let user_color = non_empty(trip.owner_color).unwrap_or_else(|| DEFAULT_USER_COLOR.to_string());

    TripSummary {
        id: trip.id,
        user_id: trip.user_id,
        user_name,
        user_color,
        user_avatar: non_empty(trip.owner_avatar_url),
        trip_name: trip.trip_name,
        cover_image: trip.cover_image,
        stops,
        start_date: trip.start_date,
        end_date: trip.end_date,
        description: trip.description,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// GET /api/trips/{id} — one trip with stops and comments (newest first).
pub async fn get_trip(
    State(state): State<AppState>,
    WithRejection(Path(trip_id), _): WithRejection<Path<i64>, ApiError>,
) -> Result<Json<TripResponse>, ApiError> {
    let found = state
        .with_db(move |db| {
            let Some(trip) = db.get_trip(trip_id)? else {
                return Ok(None);
            };
            let stops = db.get_stops_for_trip(trip_id)?;
            let comments = db.get_comments_for_trip(trip_id)?;
            Ok(Some((trip, stops, comments)))
        })
        .await?;

    let (trip, stops, comments) = found.ok_or_else(|| ApiError::not_found("Trip not found"))?;

    Ok(Json(TripResponse {
        ok: true,
        trip: detail_from_rows(trip, stops, comments),
    }))
}

fn detail_from_rows(trip: TripRow, stops: Vec<StopRow>, comments: Vec<CommentRow>) -> TripDetail {
    let user = trip.owner_username.map(|username| TripOwner {
        id: trip.user_id.clone(),
        username,
        display_name: trip.owner_display_name,
        user_color: trip.owner_color,
        avatar_url: trip.owner_avatar_url,
    });

    TripDetail {
        id: trip.id,
        user_id: trip.user_id,
        trip_name: trip.trip_name,
        description: trip.description,
        cover_image: trip.cover_image,
        start_date: trip.start_date,
        end_date: trip.end_date,
        status: trip.status,
        created_at: trip.created_at,
        user,
        stops: stops.into_iter().map(stop_detail).collect(),
        comments: comments.into_iter().map(comment_from_row).collect(),
    }
}

fn stop_detail(stop: StopRow) -> StopDetail {
    let country = match (stop.country_id, stop.country_name) {
        (Some(id), Some(name)) => Some(Country {
            id,
            name,
            latitude: stop.latitude,
            longitude: stop.longitude,
        }),
        _ => None,
    };

    StopDetail {
        id: stop.id,
        city: stop.city,
        description: stop.description,
        images: stop.images,
        country,
    }
}

fn comment_from_row(row: CommentRow) -> Comment {
    Comment {
        id: row.id,
        trip_id: row.trip_id,
        user_id: row.user_id,
        username: row.username,
        text: row.text,
        created_at: row.created_at,
    }
}

/// POST /api/trips — create a trip and its stops in one go.
pub async fn create_trip(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateTripRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = present(req.user_id).ok_or_else(|| ApiError::bad_request("user_id is required"))?;
    validate_user_id(&user_id)?;
    let trip_name = present(req.trip_name)
        .map(|name| name.trim().to_string())
        .ok_or_else(|| ApiError::bad_request("trip_name is required"))?;
    let status = present(req.status)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| PUBLISHED.to_string());

    let stops = req
        .stops
        .into_iter()
        .map(|stop| -> Result<NewStop, ApiError> {
            let city = present(stop.city)
                .map(|c| c.trim().to_string())
                .ok_or_else(|| ApiError::bad_request("Every stop needs a city"))?;
            Ok(NewStop {
                country_id: stop.country_id,
                city,
                description: stop.description,
                images: stop.images,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let trip = NewTrip {
        user_id,
        trip_name,
        description: req.description,
        cover_image: req.cover_image,
        start_date: req.start_date,
        end_date: req.end_date,
        status,
        stops,
    };

    match state.with_db(move |db| db.insert_trip(&trip)).await? {
        TripInsert::Inserted(id) => {
            info!("Trip {} created", id);
            Ok((StatusCode::CREATED, Json(CreateTripResponse { ok: true, id })))
        }
        TripInsert::UnknownOwner => Err(ApiError::not_found("User not found")),
        TripInsert::UnknownCountry(id) => {
            Err(ApiError::bad_request(format!("Unknown country id {}", id)))
        }
    }
}

/// POST /api/trips/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    WithRejection(Path(trip_id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<AddCommentRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = present(req.user_id).ok_or_else(|| ApiError::bad_request("user_id is required"))?;
    validate_user_id(&user_id)?;
    let text = present(req.text)
        .map(|t| t.trim().to_string())
        .ok_or_else(|| ApiError::bad_request("Comment text is required"))?;

    match state
        .with_db(move |db| db.insert_comment(trip_id, &user_id, &text))
        .await?
    {
        CommentInsert::Inserted(row) => Ok((
            StatusCode::CREATED,
            Json(CommentResponse {
                ok: true,
                comment: comment_from_row(row),
            }),
        )),
        CommentInsert::UnknownTrip => Err(ApiError::not_found("Trip not found")),
        CommentInsert::UnknownUser => Err(ApiError::not_found("User not found")),
    }
}
