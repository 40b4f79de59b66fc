//! Watchlist persistence
//!
//! Entries live in a SQLite database; `watchlist.json` files can be imported
//! and exported for backups and for moving data between machines.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::StoreError;
use crate::watchlist::WatchlistEntry;

/// Storage the watchlist is read from and written to
pub trait WatchlistRepository {
    fn load_all(&self) -> Result<Vec<WatchlistEntry>, StoreError>;

    fn get(&self, id: &str) -> Result<Option<WatchlistEntry>, StoreError>;

    /// Insert or replace by id
    fn save_one(&self, entry: &WatchlistEntry) -> Result<(), StoreError>;

    /// Returns whether an entry was removed
    fn remove_one(&self, id: &str) -> Result<bool, StoreError>;
}

/// Get the database file path inside a data directory
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("watchlist.db")
}

/// SQLite-backed watchlist
pub struct SqliteStore {
    conn: Connection,
}

const SELECT_COLUMNS: &str = "SELECT id, tmdb_id, media_type, title, poster_path, overview, release_date,
        rating, status, added_date, notes, seasons, current_season, current_episode
     FROM watchlist";

impl SqliteStore {
    /// Open or create the watchlist database
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;

        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS watchlist (
                id TEXT PRIMARY KEY,
                tmdb_id INTEGER NOT NULL,
                media_type TEXT NOT NULL,
                title TEXT NOT NULL,
                poster_path TEXT,
                overview TEXT NOT NULL DEFAULT '',
                release_date TEXT NOT NULL DEFAULT '',
                rating REAL NOT NULL DEFAULT 0,
                status TEXT NOT NULL,
                added_date INTEGER NOT NULL,
                notes TEXT,
                seasons TEXT NOT NULL DEFAULT '[]',
                current_season INTEGER,
                current_episode INTEGER
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_watchlist_status ON watchlist(status)",
            [],
        )?;

        Ok(())
    }

    fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<WatchlistEntry> {
        let seasons_json: String = row.get(11)?;
        let seasons = serde_json::from_str(&seasons_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, Type::Text, Box::new(e)))?;

        Ok(WatchlistEntry {
            id: row.get(0)?,
            tmdb_id: row.get(1)?,
            media_type: parse_column(row, 2)?,
            title: row.get(3)?,
            poster_path: row.get(4)?,
            overview: row.get(5)?,
            release_date: row.get(6)?,
            rating: row.get(7)?,
            status: parse_column(row, 8)?,
            added_date: row.get(9)?,
            notes: row.get(10)?,
            seasons,
            current_season: row.get(12)?,
            current_episode: row.get(13)?,
        })
    }
}

/// Read a text column through `FromStr`
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

impl WatchlistRepository for SqliteStore {
    fn load_all(&self) -> Result<Vec<WatchlistEntry>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY added_date ASC, id ASC", SELECT_COLUMNS))?;

        let rows = stmt.query_map([], Self::row_to_entry)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn get(&self, id: &str) -> Result<Option<WatchlistEntry>, StoreError> {
        let entry = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                Self::row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    fn save_one(&self, entry: &WatchlistEntry) -> Result<(), StoreError> {
        let seasons = serde_json::to_string(&entry.seasons)?;

        self.conn.execute(
            "INSERT INTO watchlist (id, tmdb_id, media_type, title, poster_path, overview, release_date,
                rating, status, added_date, notes, seasons, current_season, current_episode)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(id) DO UPDATE SET
                 tmdb_id = excluded.tmdb_id,
                 media_type = excluded.media_type,
                 title = excluded.title,
                 poster_path = excluded.poster_path,
                 overview = excluded.overview,
                 release_date = excluded.release_date,
                 rating = excluded.rating,
                 status = excluded.status,
                 added_date = excluded.added_date,
                 notes = excluded.notes,
                 seasons = excluded.seasons,
                 current_season = excluded.current_season,
                 current_episode = excluded.current_episode",
            params![
                entry.id,
                entry.tmdb_id,
                entry.media_type.as_str(),
                entry.title,
                entry.poster_path,
                entry.overview,
                entry.release_date,
                entry.rating,
                entry.status.as_str(),
                entry.added_date,
                entry.notes,
                seasons,
                entry.current_season,
                entry.current_episode,
            ],
        )?;

        Ok(())
    }

    fn remove_one(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM watchlist WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }
}

/// Write every entry to a `watchlist.json` file
pub fn export_json<R: WatchlistRepository + ?Sized>(
    repo: &R,
    path: &Path,
) -> Result<usize, StoreError> {
    let entries = repo.load_all()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(&entries)?)?;
    Ok(entries.len())
}

/// Merge a `watchlist.json` file into the repository; a missing file imports nothing
pub fn import_json<R: WatchlistRepository + ?Sized>(
    repo: &R,
    path: &Path,
) -> Result<usize, StoreError> {
    if !path.exists() {
        return Ok(0);
    }

    let content = fs::read_to_string(path)?;
    let mut entries: Vec<WatchlistEntry> = serde_json::from_str(&content)?;
    for entry in &mut entries {
        entry.normalize();
        repo.save_one(entry)?;
    }
    Ok(entries.len())
}
