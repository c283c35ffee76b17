use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Auth directory: only the id <-> email mapping the profile handler needs.
        CREATE TABLE IF NOT EXISTS auth_users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            username      TEXT NOT NULL UNIQUE,
            display_name  TEXT,
            bio           TEXT,
            avatar_url    TEXT,
            user_color    TEXT,
            updated_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS countries (
            id          INTEGER PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE,
            latitude    REAL,
            longitude   REAL
        );

        CREATE TABLE IF NOT EXISTS trips (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id      TEXT NOT NULL REFERENCES users(id),
            trip_name    TEXT NOT NULL,
            description  TEXT,
            cover_image  TEXT,
            start_date   TEXT,
            end_date     TEXT,
            status       TEXT NOT NULL DEFAULT 'published',
            created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_trips_status
            ON trips(status);

        CREATE TABLE IF NOT EXISTS trip_stops (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            trip_id      INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
            country_id   INTEGER REFERENCES countries(id),
            city         TEXT NOT NULL,
            description  TEXT,
            images       TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_trip_stops_trip
            ON trip_stops(trip_id, id);

        CREATE TABLE IF NOT EXISTS friends (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT NOT NULL REFERENCES users(id),
            friend_id   TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_friends_user
            ON friends(user_id);
        CREATE INDEX IF NOT EXISTS idx_friends_friend
            ON friends(friend_id);

        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            trip_id     INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            text        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_trip
            ON comments(trip_id, created_at);

        -- Countries used by the sample itineraries
        INSERT OR IGNORE INTO countries (id, name, latitude, longitude) VALUES
            (1,  'Spain',          40.4637,   -3.7492),
            (2,  'Japan',          36.2048,  138.2529),
            (3,  'Thailand',       15.8700,  100.9925),
            (4,  'USA',            37.0902,  -95.7129),
            (5,  'Brazil',        -14.2350,  -51.9253),
            (6,  'Argentina',     -38.4161,  -63.6167),
            (7,  'France',         46.2276,    2.2137),
            (8,  'Italy',          41.8719,   12.5674),
            (9,  'Greece',         39.0742,   21.8243),
            (10, 'Australia',     -25.2744,  133.7751),
            (11, 'Mexico',         23.6345, -102.5528),
            (12, 'United Kingdom', 55.3781,   -3.4360);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
