//! Globe views derived from the published trip listing: arcs between
//! consecutive stops, and destination pins aggregated by city.

use std::collections::HashMap;

use axum::{Json, extract::State};

use wayfarer_types::api::{ArcsResponse, DestinationsResponse};
use wayfarer_types::models::{Destination, DestinationTrip, TripArc, TripSummary, Visitor};

use crate::error::ApiError;
use crate::state::AppState;
use crate::trips::published_trips;

/// Pin colour for destinations visited by more than one user.
pub const SHARED_PIN_COLOR: &str = "rgba(192, 192, 192, 1)";

pub const DEFAULT_AVATAR: &str = "/default-avatar.png";

/// GET /api/arcs
pub async fn list_arcs(State(state): State<AppState>) -> Result<Json<ArcsResponse>, ApiError> {
    let trips = published_trips(&state).await?;
    Ok(Json(ArcsResponse {
        ok: true,
        arcs: trip_arcs(&trips),
    }))
}

/// GET /api/destinations
pub async fn list_destinations(
    State(state): State<AppState>,
) -> Result<Json<DestinationsResponse>, ApiError> {
    let trips = published_trips(&state).await?;
    Ok(Json(DestinationsResponse {
        ok: true,
        destinations: destinations(&trips),
    }))
}

/// One arc per pair of consecutive stops of each trip.
pub fn trip_arcs(trips: &[TripSummary]) -> Vec<TripArc> {
    trips
        .iter()
        .flat_map(|trip| {
            trip.stops
                .windows(2)
                .enumerate()
                .map(move |(arc_index, pair)| TripArc {
                    trip_id: trip.id,
                    user_id: trip.user_id.clone(),
                    user_name: trip.user_name.clone(),
                    user_color: trip.user_color.clone(),
                    trip_name: trip.trip_name.clone(),
                    origin: pair[0].clone(),
                    destination: pair[1].clone(),
                    arc_index,
                })
        })
        .collect()
}

/// Every stop after a trip's first is a destination. Destinations are keyed
/// by city in first-seen order; the first occurrence supplies coordinates
/// and country.
pub fn destinations(trips: &[TripSummary]) -> Vec<Destination> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut pins: Vec<Destination> = Vec::new();

    for trip in trips {
        for stop in trip.stops.iter().skip(1) {
            let slot = *index.entry(stop.city.as_str()).or_insert_with(|| {
                pins.push(Destination {
                    name: stop.city.clone(),
                    country: stop.country.clone(),
                    lat: stop.lat,
                    lng: stop.lng,
                    trips: Vec::new(),
                    visitors: Vec::new(),
                    visit_count: 0,
                    pin_color: String::new(),
                });
                pins.len() - 1
            });

            let pin = &mut pins[slot];
            if !pin.trips.iter().any(|t| t.trip_id == trip.id) {
                pin.trips.push(DestinationTrip {
                    trip_id: trip.id,
                    user_id: trip.user_id.clone(),
                    user_name: trip.user_name.clone(),
                    user_color: trip.user_color.clone(),
                    trip_name: trip.trip_name.clone(),
                    user_avatar: trip.user_avatar.clone(),
                });
            }
        }
    }

    for pin in &mut pins {
        let mut visitors: Vec<Visitor> = Vec::new();
        for t in &pin.trips {
            if !visitors.iter().any(|v| v.user_id == t.user_id) {
                visitors.push(Visitor {
                    user_id: t.user_id.clone(),
                    user_name: t.user_name.clone(),
                    user_color: t.user_color.clone(),
                    user_avatar: t
                        .user_avatar
                        .clone()
                        .filter(|a| !a.is_empty())
                        .unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
                });
            }
        }

        pin.pin_color = match visitors.as_slice() {
            [only] => only.user_color.clone(),
            _ => SHARED_PIN_COLOR.to_string(),
        };
        pin.visit_count = pin.trips.len();
        pin.visitors = visitors;
    }

    pins
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_types::models::StopSummary;

    fn stop(city: &str, country: &str) -> StopSummary {
        StopSummary {
            country: country.into(),
            city: city.into(),
            lat: Some(0.0),
            lng: Some(0.0),
            images: Vec::new(),
        }
    }

    fn trip(id: i64, user: &str, color: &str, cities: &[&str]) -> TripSummary {
        TripSummary {
            id,
            user_id: user.into(),
            user_name: user.to_uppercase(),
            user_color: color.into(),
            user_avatar: None,
            trip_name: format!("trip {id}"),
            cover_image: None,
            stops: cities.iter().map(|c| stop(c, "X")).collect(),
            start_date: None,
            end_date: None,
            description: None,
        }
    }

    #[test]
    fn arcs_join_consecutive_stops() {
        let trips = [
            trip(1, "a", "red", &["Barcelona", "Tokyo", "Bangkok"]),
            trip(2, "b", "blue", &["Paris"]),
        ];
        let arcs = trip_arcs(&trips);

        assert_eq!(arcs.len(), 2);
        assert_eq!(arcs[0].origin.city, "Barcelona");
        assert_eq!(arcs[0].destination.city, "Tokyo");
        assert_eq!(arcs[1].arc_index, 1);
        assert_eq!(arcs[1].destination.city, "Bangkok");
        assert!(arcs.iter().all(|a| a.trip_id == 1));
    }

    #[test]
    fn first_stop_is_not_a_destination() {
        let pins = destinations(&[trip(1, "a", "red", &["Barcelona", "Tokyo"])]);
        let names: Vec<_> = pins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Tokyo"]);
    }

    #[test]
    fn single_visitor_colours_the_pin() {
        let pins = destinations(&[
            trip(1, "a", "red", &["Barcelona", "Tokyo"]),
            trip(2, "a", "red", &["Madrid", "Tokyo"]),
        ]);
        assert_eq!(pins[0].visit_count, 2);
        assert_eq!(pins[0].visitors.len(), 1);
        assert_eq!(pins[0].pin_color, "red");
        assert_eq!(pins[0].visitors[0].user_avatar, DEFAULT_AVATAR);
    }

    #[test]
    fn blank_avatar_falls_back_to_default() {
        let mut first = trip(1, "a", "red", &["Barcelona", "Tokyo"]);
        first.user_avatar = Some(String::new());
        let pins = destinations(&[first]);
        assert_eq!(pins[0].visitors[0].user_avatar, DEFAULT_AVATAR);
    }

    #[test]
    fn shared_destinations_get_neutral_pin() {
        let pins = destinations(&[
            trip(1, "a", "red", &["Barcelona", "Tokyo"]),
            trip(2, "b", "blue", &["Madrid", "Tokyo"]),
        ]);
        assert_eq!(pins[0].visitors.len(), 2);
        assert_eq!(pins[0].pin_color, SHARED_PIN_COLOR);
    }

    #[test]
    fn revisiting_a_city_in_one_trip_counts_once() {
        let pins = destinations(&[trip(1, "a", "red", &["Home", "Rome", "Naples", "Rome"])]);
        let rome = pins.iter().find(|p| p.name == "Rome").unwrap();
        assert_eq!(rome.visit_count, 1);
    }
}
