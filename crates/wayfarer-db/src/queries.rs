use crate::Database;
use crate::models::{CommentRow, FriendRow, ProfileRow, StopRow, TripRow};
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use tracing::warn;

/// Column values for a profile upsert. `None` leaves the stored value alone.
#[derive(Debug, Clone)]
pub struct ProfileUpsert {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug)]
pub enum UpsertOutcome {
    Saved(ProfileRow),
    /// Another user already owns the requested username.
    UsernameTaken,
}

#[derive(Debug, Clone)]
pub struct NewStop {
    pub country_id: Option<i64>,
    pub city: String,
    pub description: Option<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub user_id: String,
    pub trip_name: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: String,
    pub stops: Vec<NewStop>,
}

#[derive(Debug)]
pub enum TripInsert {
    Inserted(i64),
    UnknownOwner,
    UnknownCountry(i64),
}

#[derive(Debug)]
pub enum CommentInsert {
    Inserted(CommentRow),
    UnknownTrip,
    UnknownUser,
}

#[derive(Debug)]
pub enum FriendInsert {
    Inserted(i64),
    UnknownUser(String),
}

/// ISO-8601 UTC with millisecond precision, same format as the column defaults.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

const TRIP_COLUMNS: &str =
    "t.id, t.user_id, t.trip_name, t.description, t.cover_image, t.start_date, t.end_date,
     t.status, t.created_at, u.username, u.display_name, u.user_color, u.avatar_url";

const STOP_COLUMNS: &str =
    "s.id, s.trip_id, s.city, s.description, s.images, s.country_id, c.name, c.latitude, c.longitude";

impl Database {
    // -- Auth directory --

    pub fn create_auth_user(&self, id: &str, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO auth_users (id, email) VALUES (?1, ?2)",
                (id, email),
            )?;
            Ok(())
        })
    }

    /// Case-insensitive lookup of an auth user id by email.
    pub fn find_auth_user_id_by_email(&self, email: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let id: Option<String> = conn
                .query_row(
                    "SELECT id FROM auth_users WHERE email = ?1 COLLATE NOCASE",
                    [email],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id)
        })
    }

    // -- Users --

    /// Username uniqueness check and upsert in a single immediate transaction,
    /// so two concurrent renames cannot both pass the check.
    pub fn upsert_profile(&self, profile: &ProfileUpsert) -> Result<UpsertOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let taken: Option<String> = tx
                .query_row(
                    "SELECT id FROM users WHERE username = ?1 AND id != ?2 LIMIT 1",
                    params![profile.username, profile.id],
                    |row| row.get(0),
                )
                .optional()?;

            if taken.is_some() {
                return Ok(UpsertOutcome::UsernameTaken);
            }

            let row = tx.query_row(
                "INSERT INTO users (id, username, display_name, bio, avatar_url, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    username     = excluded.username,
                    display_name = COALESCE(excluded.display_name, users.display_name),
                    bio          = COALESCE(excluded.bio, users.bio),
                    avatar_url   = COALESCE(excluded.avatar_url, users.avatar_url),
                    updated_at   = excluded.updated_at
                 RETURNING id, username, display_name, bio, avatar_url",
                params![
                    profile.id,
                    profile.username,
                    profile.display_name,
                    profile.bio,
                    profile.avatar_url,
                    now_timestamp(),
                ],
                |row| {
                    Ok(ProfileRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        display_name: row.get(2)?,
                        bio: row.get(3)?,
                        avatar_url: row.get(4)?,
                    })
                },
            )?;

            tx.commit()?;
            Ok(UpsertOutcome::Saved(row))
        })
    }

    /// Returns `None` if the user does not exist, `Some(None)` if it has no avatar.
    pub fn get_avatar_url(&self, user_id: &str) -> Result<Option<Option<String>>> {
        self.with_conn(|conn| {
            let url = conn
                .query_row(
                    "SELECT avatar_url FROM users WHERE id = ?1",
                    [user_id],
                    |row| row.get::<_, Option<String>>(0),
                )
                .optional()?;
            Ok(url)
        })
    }

    /// Returns false when no row matched.
    pub fn set_avatar_url(&self, user_id: &str, avatar_url: Option<&str>) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET avatar_url = ?2, updated_at = ?3 WHERE id = ?1",
                params![user_id, avatar_url, now_timestamp()],
            )?;
            Ok(n > 0)
        })
    }

    // -- Trips --

    pub fn list_trips_by_status(&self, status: &str) -> Result<Vec<TripRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TRIP_COLUMNS}
                 FROM trips t
                 LEFT JOIN users u ON u.id = t.user_id
                 WHERE t.status = ?1
                 ORDER BY t.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([status], map_trip)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// All stops belonging to trips with the given status, in insertion order.
    pub fn list_stops_by_trip_status(&self, status: &str) -> Result<Vec<StopRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {STOP_COLUMNS}
                 FROM trip_stops s
                 JOIN trips t ON t.id = s.trip_id
                 LEFT JOIN countries c ON c.id = s.country_id
                 WHERE t.status = ?1
                 ORDER BY s.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([status], map_stop)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_trip(&self, id: i64) -> Result<Option<TripRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TRIP_COLUMNS}
                 FROM trips t
                 LEFT JOIN users u ON u.id = t.user_id
                 WHERE t.id = ?1"
            );
            let row = conn.query_row(&sql, [id], map_trip).optional()?;
            Ok(row)
        })
    }

    pub fn get_stops_for_trip(&self, trip_id: i64) -> Result<Vec<StopRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {STOP_COLUMNS}
                 FROM trip_stops s
                 LEFT JOIN countries c ON c.id = s.country_id
                 WHERE s.trip_id = ?1
                 ORDER BY s.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([trip_id], map_stop)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Newest first; ties on `created_at` fall back to insertion order, newest first.
    pub fn get_comments_for_trip(&self, trip_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.trip_id, m.user_id, u.username, m.text, m.created_at
                 FROM comments m
                 LEFT JOIN users u ON u.id = m.user_id
                 WHERE m.trip_id = ?1
                 ORDER BY m.created_at DESC, m.id DESC",
            )?;
            let rows = stmt
                .query_map([trip_id], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Inserts a trip and its stops atomically.
    pub fn insert_trip(&self, trip: &NewTrip) -> Result<TripInsert> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if !user_exists(&tx, &trip.user_id)? {
                return Ok(TripInsert::UnknownOwner);
            }

            for stop in &trip.stops {
                if let Some(country_id) = stop.country_id {
                    let known: Option<i64> = tx
                        .query_row("SELECT id FROM countries WHERE id = ?1", [country_id], |row| {
                            row.get(0)
                        })
                        .optional()?;
                    if known.is_none() {
                        return Ok(TripInsert::UnknownCountry(country_id));
                    }
                }
            }

            tx.execute(
                "INSERT INTO trips (user_id, trip_name, description, cover_image, start_date, end_date, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    trip.user_id,
                    trip.trip_name,
                    trip.description,
                    trip.cover_image,
                    trip.start_date,
                    trip.end_date,
                    trip.status,
                    now_timestamp(),
                ],
            )?;
            let trip_id = tx.last_insert_rowid();

            for stop in &trip.stops {
                let images = serde_json::to_string(&stop.images)?;
                tx.execute(
                    "INSERT INTO trip_stops (trip_id, country_id, city, description, images)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![trip_id, stop.country_id, stop.city, stop.description, images],
                )?;
            }

            tx.commit()?;
            Ok(TripInsert::Inserted(trip_id))
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, trip_id: i64, user_id: &str, text: &str) -> Result<CommentInsert> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let trip: Option<i64> = tx
                .query_row("SELECT id FROM trips WHERE id = ?1", [trip_id], |row| row.get(0))
                .optional()?;
            if trip.is_none() {
                return Ok(CommentInsert::UnknownTrip);
            }
            if !user_exists(&tx, user_id)? {
                return Ok(CommentInsert::UnknownUser);
            }

            tx.execute(
                "INSERT INTO comments (trip_id, user_id, text, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![trip_id, user_id, text, now_timestamp()],
            )?;
            let id = tx.last_insert_rowid();

            let row = tx.query_row(
                "SELECT m.id, m.trip_id, m.user_id, u.username, m.text, m.created_at
                 FROM comments m
                 LEFT JOIN users u ON u.id = m.user_id
                 WHERE m.id = ?1",
                [id],
                map_comment,
            )?;

            tx.commit()?;
            Ok(CommentInsert::Inserted(row))
        })
    }

    // -- Friends --

    /// Every edge touching `user_id`, in either direction, with the
    /// counterpart's profile attached.
    pub fn get_friendships(&self, user_id: &str) -> Result<Vec<FriendRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT f.id, f.created_at,
                        CASE WHEN f.user_id = ?1 THEN f.friend_id ELSE f.user_id END AS other_id,
                        u.username, u.display_name, u.user_color, u.avatar_url
                 FROM friends f
                 LEFT JOIN users u
                   ON u.id = CASE WHEN f.user_id = ?1 THEN f.friend_id ELSE f.user_id END
                 WHERE f.user_id = ?1 OR f.friend_id = ?1
                 ORDER BY f.created_at, f.id",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(FriendRow {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                        other_id: row.get(2)?,
                        other_username: row.get(3)?,
                        other_display_name: row.get(4)?,
                        other_color: row.get(5)?,
                        other_avatar_url: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Inserts one directed edge. No reciprocal edge and no duplicate check.
    pub fn insert_friend(&self, user_id: &str, friend_id: &str) -> Result<FriendInsert> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            for id in [user_id, friend_id] {
                if !user_exists(&tx, id)? {
                    return Ok(FriendInsert::UnknownUser(id.to_string()));
                }
            }

            tx.execute(
                "INSERT INTO friends (user_id, friend_id, created_at) VALUES (?1, ?2, ?3)",
                params![user_id, friend_id, now_timestamp()],
            )?;
            let id = tx.last_insert_rowid();

            tx.commit()?;
            Ok(FriendInsert::Inserted(id))
        })
    }
}

fn user_exists(conn: &Connection, id: &str) -> Result<bool> {
    let found: Option<String> = conn
        .query_row("SELECT id FROM users WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

fn map_trip(row: &Row<'_>) -> rusqlite::Result<TripRow> {
    Ok(TripRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        trip_name: row.get(2)?,
        description: row.get(3)?,
        cover_image: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        owner_username: row.get(9)?,
        owner_display_name: row.get(10)?,
        owner_color: row.get(11)?,
        owner_avatar_url: row.get(12)?,
    })
}

fn map_stop(row: &Row<'_>) -> rusqlite::Result<StopRow> {
    let id: i64 = row.get(0)?;
    Ok(StopRow {
        id,
        trip_id: row.get(1)?,
        city: row.get(2)?,
        description: row.get(3)?,
        images: parse_images(id, row.get(4)?),
        country_id: row.get(5)?,
        country_name: row.get(6)?,
        latitude: row.get(7)?,
        longitude: row.get(8)?,
    })
}

fn map_comment(row: &Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        trip_id: row.get(1)?,
        user_id: row.get(2)?,
        username: row.get(3)?,
        text: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Stop images are stored as a JSON array; anything unreadable counts as none.
fn parse_images(stop_id: i64, raw: Option<String>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Stop {} has malformed images column: {}", stop_id, e);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "6f1c2a3b-4d5e-4f60-8a71-92b3c4d5e6f7";
    const BOB: &str = "0b8e7d6c-5a4b-4c3d-9e2f-1a0b9c8d7e6f";
    const CAROL: &str = "c4a1f9e2-7b3d-4e8a-b5c6-d7e8f9a0b1c2";

    fn profile(id: &str, username: &str) -> ProfileUpsert {
        ProfileUpsert {
            id: id.to_string(),
            username: username.to_string(),
            display_name: None,
            bio: None,
            avatar_url: None,
        }
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        for (id, name) in [(ALICE, "alice"), (BOB, "bob"), (CAROL, "carol")] {
            db.upsert_profile(&profile(id, name)).unwrap();
        }
        db
    }

    fn trip(user_id: &str, name: &str, status: &str, stops: &[(&str, Option<i64>)]) -> NewTrip {
        NewTrip {
            user_id: user_id.to_string(),
            trip_name: name.to_string(),
            description: None,
            cover_image: None,
            start_date: Some("2024-03-15".to_string()),
            end_date: None,
            status: status.to_string(),
            stops: stops
                .iter()
                .map(|(city, country_id)| NewStop {
                    country_id: *country_id,
                    city: city.to_string(),
                    description: None,
                    images: vec![format!("https://img.example/{city}.jpg")],
                })
                .collect(),
        }
    }

    fn inserted(outcome: TripInsert) -> i64 {
        match outcome {
            TripInsert::Inserted(id) => id,
            other => panic!("expected insert, got {:?}", other),
        }
    }

    #[test]
    fn upsert_creates_then_updates_only_supplied_columns() {
        let db = Database::open_in_memory().unwrap();

        let mut first = profile(ALICE, "alice");
        first.bio = Some("hello".into());
        first.display_name = Some("Ali".into());
        db.upsert_profile(&first).unwrap();

        let second = profile(ALICE, "alice2");
        let UpsertOutcome::Saved(row) = db.upsert_profile(&second).unwrap() else {
            panic!("rename should succeed");
        };
        assert_eq!(row.username, "alice2");
        assert_eq!(row.bio.as_deref(), Some("hello"));
        assert_eq!(row.display_name.as_deref(), Some("Ali"));
    }

    #[test]
    fn upsert_rejects_username_held_by_another_user() {
        let db = seeded();
        let outcome = db.upsert_profile(&profile(CAROL, "alice")).unwrap();
        assert!(matches!(outcome, UpsertOutcome::UsernameTaken));
    }

    #[test]
    fn upsert_allows_keeping_own_username() {
        let db = seeded();
        let outcome = db.upsert_profile(&profile(ALICE, "alice")).unwrap();
        assert!(matches!(outcome, UpsertOutcome::Saved(_)));
    }

    #[test]
    fn email_lookup_ignores_case() {
        let db = Database::open_in_memory().unwrap();
        db.create_auth_user(ALICE, "Alice@Example.com").unwrap();
        assert_eq!(
            db.find_auth_user_id_by_email("alice@example.COM").unwrap().as_deref(),
            Some(ALICE)
        );
        assert!(db.find_auth_user_id_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn avatar_url_distinguishes_missing_user_from_missing_avatar() {
        let db = seeded();
        assert_eq!(db.get_avatar_url(ALICE).unwrap(), Some(None));
        assert_eq!(db.get_avatar_url("nope").unwrap(), None);

        assert!(db.set_avatar_url(ALICE, Some("http://x/a.png")).unwrap());
        assert_eq!(
            db.get_avatar_url(ALICE).unwrap(),
            Some(Some("http://x/a.png".to_string()))
        );
        assert!(!db.set_avatar_url("nope", None).unwrap());
    }

    #[test]
    fn trips_filter_by_status_and_keep_stop_order() {
        let db = seeded();
        let published = inserted(
            db.insert_trip(&trip(ALICE, "Asia", "published", &[("Barcelona", Some(1)), ("Tokyo", Some(2))]))
                .unwrap(),
        );
        inserted(db.insert_trip(&trip(BOB, "Draft", "draft", &[("Paris", Some(7))])).unwrap());

        let trips = db.list_trips_by_status("published").unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].id, published);
        assert_eq!(trips[0].owner_username.as_deref(), Some("alice"));

        let stops = db.list_stops_by_trip_status("published").unwrap();
        let cities: Vec<_> = stops.iter().map(|s| s.city.as_str()).collect();
        assert_eq!(cities, ["Barcelona", "Tokyo"]);
        assert_eq!(stops[1].country_name.as_deref(), Some("Japan"));
        assert_eq!(stops[1].images, ["https://img.example/Tokyo.jpg"]);
    }

    #[test]
    fn insert_trip_rejects_unknown_owner_and_country() {
        let db = seeded();
        let outcome = db.insert_trip(&trip("missing", "x", "published", &[])).unwrap();
        assert!(matches!(outcome, TripInsert::UnknownOwner));

        let outcome = db
            .insert_trip(&trip(ALICE, "x", "published", &[("Atlantis", Some(999))]))
            .unwrap();
        assert!(matches!(outcome, TripInsert::UnknownCountry(999)));
        assert!(db.list_trips_by_status("published").unwrap().is_empty());
    }

    #[test]
    fn comments_come_back_newest_first() {
        let db = seeded();
        let id = inserted(db.insert_trip(&trip(ALICE, "Asia", "published", &[])).unwrap());

        for text in ["first", "second", "third"] {
            db.insert_comment(id, BOB, text).unwrap();
        }

        let texts: Vec<_> = db
            .get_comments_for_trip(id)
            .unwrap()
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, ["third", "second", "first"]);
    }

    #[test]
    fn comment_on_unknown_trip_is_reported() {
        let db = seeded();
        assert!(matches!(
            db.insert_comment(42, BOB, "hi").unwrap(),
            CommentInsert::UnknownTrip
        ));
    }

    #[test]
    fn friendships_cover_both_directions() {
        let db = seeded();
        db.insert_friend(ALICE, BOB).unwrap();
        db.insert_friend(CAROL, ALICE).unwrap();
        db.insert_friend(BOB, CAROL).unwrap();

        let others: Vec<_> = db
            .get_friendships(ALICE)
            .unwrap()
            .into_iter()
            .map(|f| f.other_id)
            .collect();
        assert_eq!(others, [BOB, CAROL]);
    }

    #[test]
    fn insert_friend_requires_both_users() {
        let db = seeded();
        let outcome = db.insert_friend(ALICE, "ghost").unwrap();
        assert!(matches!(outcome, FriendInsert::UnknownUser(id) if id == "ghost"));
    }

    #[test]
    fn malformed_images_column_reads_as_empty() {
        assert!(parse_images(1, Some("not json".into())).is_empty());
        assert!(parse_images(1, None).is_empty());
    }
}
