//! SQL statement catalog and statement builders.
//!
//! Fact and dimension loads execute fixed INSERT..SELECT statements looked
//! up by name from an immutable [`StatementCatalog`] injected at pipeline
//! construction. The catalog is configuration, not logic; tasks never
//! inspect the SQL they execute.

use indexmap::IndexMap;

/// Immutable mapping from symbolic statement name to SQL text.
#[derive(Debug, Clone, Default)]
pub struct StatementCatalog {
    statements: IndexMap<String, String>,
}

impl StatementCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog for the Sparkify star schema: one fact insert and four
    /// dimension inserts over the two staging tables.
    pub fn sparkify() -> Self {
        Self::new()
            .with_statement("songplay_table_insert", SONGPLAY_TABLE_INSERT)
            .with_statement("song_table_insert", SONG_TABLE_INSERT)
            .with_statement("user_table_insert", USER_TABLE_INSERT)
            .with_statement("artist_table_insert", ARTIST_TABLE_INSERT)
            .with_statement("time_table_insert", TIME_TABLE_INSERT)
    }

    /// Add or replace a named statement.
    pub fn with_statement(mut self, name: impl Into<String>, sql: impl Into<String>) -> Self {
        self.statements.insert(name.into(), sql.into());
        self
    }

    /// Look up a statement by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.statements.get(name).map(String::as_str)
    }

    /// Whether the catalog contains the named statement.
    pub fn contains(&self, name: &str) -> bool {
        self.statements.contains_key(name)
    }

    /// Statement names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.statements.keys().map(String::as_str)
    }
}

/// Assemble the warehouse bulk COPY statement.
///
/// Values are substituted positionally: table, path, access key, secret key,
/// format spec, region. Callers must never log the assembled statement - it
/// embeds credentials in plaintext.
pub fn copy_statement(
    table: &str,
    path: &str,
    access_key_id: &str,
    secret_access_key: &str,
    format_spec: &str,
    region: &str,
) -> String {
    format!(
        "COPY {}\nFROM '{}'\nACCESS_KEY_ID '{}'\nSECRET_ACCESS_KEY '{}'\nFORMAT AS {}\nREGION '{}';",
        table, path, access_key_id, secret_access_key, format_spec, region
    )
}

/// `DELETE FROM <table>` - full replace of a staging table.
pub fn clear_statement(table: &str) -> String {
    format!("DELETE FROM {table}")
}

/// `DELETE FROM <table> WHERE <column> IS NULL` - post-load key cleanup.
pub fn null_cleanup_statement(table: &str, column: &str) -> String {
    format!("DELETE FROM {table} WHERE {column} IS NULL")
}

/// `TRUNCATE <table>` - replace-mode dimension reset.
pub fn truncate_statement(table: &str) -> String {
    format!("TRUNCATE {table}")
}

/// `SELECT COUNT(*) FROM <table>` - quality-check probe.
pub fn count_statement(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {table}")
}

const SONGPLAY_TABLE_INSERT: &str = "\
INSERT INTO songplays (playid, start_time, userid, level, songid, artistid, sessionid, location, user_agent)
SELECT md5(events.sessionid || events.start_time) AS playid,
       events.start_time,
       events.userid,
       events.level,
       songs.song_id,
       songs.artist_id,
       events.sessionid,
       events.location,
       events.useragent
FROM (SELECT TIMESTAMP 'epoch' + ts / 1000 * INTERVAL '1 second' AS start_time, *
      FROM staging_events
      WHERE page = 'NextSong') events
LEFT JOIN staging_songs songs
  ON events.song = songs.title
 AND events.artist = songs.artist_name
 AND events.length = songs.duration";

const SONG_TABLE_INSERT: &str = "\
INSERT INTO songs (songid, title, artistid, year, duration)
SELECT DISTINCT song_id, title, artist_id, year, duration
FROM staging_songs";

const USER_TABLE_INSERT: &str = "\
INSERT INTO users (userid, first_name, last_name, gender, level)
SELECT DISTINCT userid, firstname, lastname, gender, level
FROM staging_events
WHERE page = 'NextSong'";

const ARTIST_TABLE_INSERT: &str = "\
INSERT INTO artists (artistid, name, location, latitude, longitude)
SELECT DISTINCT artist_id, artist_name, artist_location, artist_latitude, artist_longitude
FROM staging_songs";

const TIME_TABLE_INSERT: &str = "\
INSERT INTO time (start_time, hour, day, week, month, year, weekday)
SELECT start_time,
       EXTRACT(hour FROM start_time),
       EXTRACT(day FROM start_time),
       EXTRACT(week FROM start_time),
       EXTRACT(month FROM start_time),
       EXTRACT(year FROM start_time),
       EXTRACT(dayofweek FROM start_time)
FROM songplays";
