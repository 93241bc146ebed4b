//! SQLite-based persistent store for the media index and user preferences.
//!
//! This module provides the `MediaStore` struct which manages all database operations
//! for the gallery, including:
//! - Media item metadata (path, dimensions, mtime, first-seen time)
//! - The favorites id set
//! - Integer settings (theme, sort type, sort order)

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, Transaction};
use tracing::{debug, info, warn};

use crate::models::preferences::{Preferences, SortOrder, SortType, ThemeMode};
use crate::models::{MediaItem, MediaType};

const KEY_THEME: &str = "theme_mode";
const KEY_SORT_TYPE: &str = "sort_type";
const KEY_SORT_ORDER: &str = "sort_order";

const MEDIA_COLUMNS: &str =
    "id, path, media_type, mtime, size, width, height, duration_ms, added_at";

const UPSERT_MEDIA: &str = "
    INSERT INTO media (
        path, media_type, mtime, size, width, height, duration_ms, added_at, last_seen
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    ON CONFLICT(path) DO UPDATE SET
        media_type = excluded.media_type,
        mtime = excluded.mtime,
        size = excluded.size,
        width = excluded.width,
        height = excluded.height,
        duration_ms = excluded.duration_ms,
        last_seen = excluded.last_seen
    RETURNING id, added_at
";

/// SQLite-backed storage for the media index, favorites and settings.
///
/// The database is stored at `XDG_CONFIG_HOME/gallery/gallery.sqlite` by default
/// and uses WAL mode.
pub struct MediaStore {
    conn: Connection,
}

/// Database statistics for debugging and monitoring.
#[derive(Debug, Clone)]
pub struct DbStats {
    pub media_count: i64,
    pub favorite_count: i64,
    pub db_size_bytes: i64,
}

impl MediaStore {
    /// Returns the default database path based on XDG directories.
    pub fn default_db_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "gallery")
            .context("Failed to determine project directories")?;

        let config_dir = proj_dirs.config_dir();
        std::fs::create_dir_all(config_dir)
            .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;

        Ok(config_dir.join("gallery.sqlite"))
    }

    /// Opens or creates the database at the specified path.
    ///
    /// A file SQLite rejects as corrupt or not a database is moved aside and a
    /// fresh database is created in its place.
    pub fn open(path: &Path) -> Result<Self> {
        match Self::open_existing(path) {
            Ok(store) => Ok(store),
            Err(e) if is_corruption(&e) => {
                warn!("Database at {:?} is unreadable: {:#}", path, e);
                Self::handle_corruption(path)
            }
            Err(e) => Err(e),
        }
    }

    fn open_existing(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )
        .context("Failed to configure SQLite pragmas")?;

        let store = Self { conn };
        store.create_tables()?;

        info!("Opened media store at {:?}", path);
        Ok(store)
    }

    fn create_tables(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS media (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL UNIQUE,
                media_type INTEGER NOT NULL,
                mtime INTEGER NOT NULL,
                size INTEGER NOT NULL,
                width INTEGER NOT NULL,
                height INTEGER NOT NULL,
                duration_ms INTEGER,
                added_at INTEGER NOT NULL,
                last_seen INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_media_last_seen ON media(last_seen);

            CREATE TABLE IF NOT EXISTS favorites (
                media_id INTEGER PRIMARY KEY NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value INTEGER NOT NULL
            );
            ",
            )
            .context("Failed to create database tables")?;

        debug!("Database tables created/verified");
        Ok(())
    }

    // =========================================================================
    // Media Item Operations
    // =========================================================================

    /// Inserts or updates a media item, keyed by path.
    ///
    /// Writes the assigned id and the original `date_added` back into `item`.
    pub fn upsert_media(&self, item: &mut MediaItem, last_seen: i64) -> Result<()> {
        let (id, added_at): (i64, i64) = self
            .conn
            .query_row(UPSERT_MEDIA, media_params(item, last_seen), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .context("Failed to upsert media item")?;
        item.id = id;
        item.date_added = added_at;
        Ok(())
    }

    /// Batch inserts or updates media items in a single transaction.
    pub fn upsert_media_batch(&mut self, items: &mut [MediaItem], last_seen: i64) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let count = Self::upsert_media_batch_in_tx(&tx, items, last_seen)?;
        tx.commit()?;

        debug!("Batch upserted {} media items", count);
        Ok(count)
    }

    fn upsert_media_batch_in_tx(
        tx: &Transaction,
        items: &mut [MediaItem],
        last_seen: i64,
    ) -> Result<usize> {
        let mut stmt = tx.prepare_cached(UPSERT_MEDIA)?;

        let mut count = 0;
        for item in items.iter_mut() {
            let (id, added_at): (i64, i64) = stmt.query_row(media_params(item, last_seen), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?;
            item.id = id;
            item.date_added = added_at;
            count += 1;
        }

        Ok(count)
    }

    /// Retrieves a media item by its path.
    pub fn get_media(&self, path: &Path) -> Result<Option<MediaItem>> {
        let sql = format!("SELECT {} FROM media WHERE path = ?1", MEDIA_COLUMNS);
        self.conn
            .query_row(&sql, params![path.to_string_lossy().as_ref()], row_to_item)
            .optional()
            .context("Failed to query media item")
    }

    /// Retrieves all media items, newest first.
    pub fn get_all_media(&self) -> Result<Vec<MediaItem>> {
        let sql = format!(
            "SELECT {} FROM media ORDER BY added_at DESC, id DESC",
            MEDIA_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load media items")?;
        Ok(items)
    }

    /// Returns every indexed item keyed by path, for cache validation during scans.
    pub fn get_cache_map(&self) -> Result<HashMap<PathBuf, MediaItem>> {
        Ok(self
            .get_all_media()?
            .into_iter()
            .map(|item| (item.path.clone(), item))
            .collect())
    }

    /// Updates the last_seen timestamp for multiple paths.
    pub fn touch_last_seen(&mut self, paths: &[PathBuf], timestamp: i64) -> Result<usize> {
        if paths.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut count = 0;
        {
            let mut stmt = tx.prepare_cached("UPDATE media SET last_seen = ?1 WHERE path = ?2")?;
            for path in paths {
                count += stmt.execute(params![timestamp, path.to_string_lossy().as_ref()])?;
            }
        }
        tx.commit()?;

        Ok(count)
    }

    /// Deletes media items that haven't been seen since the given timestamp.
    ///
    /// Returns the paths of deleted items.
    pub fn delete_stale(&self, older_than: i64) -> Result<Vec<PathBuf>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM media WHERE last_seen < ?1")?;
        let paths: Vec<PathBuf> = stmt
            .query_map(params![older_than], |row| {
                Ok(PathBuf::from(row.get::<_, String>(0)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        self.conn.execute(
            "DELETE FROM favorites WHERE media_id IN (SELECT id FROM media WHERE last_seen < ?1)",
            params![older_than],
        )?;
        let deleted = self.conn.execute(
            "DELETE FROM media WHERE last_seen < ?1",
            params![older_than],
        )?;

        if deleted > 0 {
            info!("Deleted {} stale media entries", deleted);
        }

        Ok(paths)
    }

    /// Deletes a single media item (and its favorite mark) by path.
    pub fn delete_media(&self, path: &Path) -> Result<bool> {
        let path_str = path.to_string_lossy();
        self.conn.execute(
            "DELETE FROM favorites WHERE media_id IN (SELECT id FROM media WHERE path = ?1)",
            params![path_str.as_ref()],
        )?;
        let rows = self.conn.execute(
            "DELETE FROM media WHERE path = ?1",
            params![path_str.as_ref()],
        )?;
        Ok(rows > 0)
    }

    /// Returns the total count of media items in the database.
    pub fn count_media(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM media", [], |row| row.get(0))?;
        Ok(count)
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    pub fn is_favorite(&self, media_id: i64) -> Result<bool> {
        let exists: Option<i32> = self
            .conn
            .query_row(
                "SELECT 1 FROM favorites WHERE media_id = ?1",
                params![media_id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query favorite status")?;
        Ok(exists.is_some())
    }

    /// Toggles favorite status for the given media id.
    /// Returns true if the item is now favorited.
    pub fn toggle_favorite(&self, media_id: i64) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO favorites (media_id, created_at) VALUES (?1, ?2)",
            params![media_id, Self::now()],
        )?;
        if inserted > 0 {
            return Ok(true);
        }
        self.conn
            .execute("DELETE FROM favorites WHERE media_id = ?1", params![media_id])?;
        Ok(false)
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn get_setting(&self, key: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read setting {}", key))
    }

    pub fn set_setting(&self, key: &str, value: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .with_context(|| format!("Failed to write setting {}", key))?;
        Ok(())
    }

    /// Reads an enum setting, falling back to its default on missing or unknown values.
    fn decoded_setting<T, E>(&self, key: &str, decode: fn(i64) -> Result<T, E>) -> Result<T>
    where
        T: Default,
        E: std::fmt::Display,
    {
        let Some(value) = self.get_setting(key)? else {
            return Ok(T::default());
        };
        match decode(value) {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                warn!("Ignoring stored setting {}: {}", key, e);
                Ok(T::default())
            }
        }
    }

    // =========================================================================
    // Utility
    // =========================================================================

    /// Returns the current Unix timestamp.
    pub fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    /// Gets database statistics for debugging.
    pub fn get_stats(&self) -> Result<DbStats> {
        let media_count = self.count_media()?;
        let favorite_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM favorites", [], |r| r.get(0))?;
        let page_count: i64 = self.conn.query_row("PRAGMA page_count", [], |r| r.get(0))?;
        let page_size: i64 = self.conn.query_row("PRAGMA page_size", [], |r| r.get(0))?;

        Ok(DbStats {
            media_count,
            favorite_count,
            db_size_bytes: page_count * page_size,
        })
    }

    /// Handles database corruption by backing up and rebuilding.
    pub fn handle_corruption(path: &Path) -> Result<Self> {
        warn!("Handling potential database corruption at {:?}", path);

        let backup_path = sidecar_path(path, ".corrupted");
        if path.exists() {
            std::fs::rename(path, &backup_path).with_context(|| {
                format!("Failed to backup corrupted database to {:?}", backup_path)
            })?;
            warn!("Backed up corrupted database to {:?}", backup_path);
        }
        for suffix in ["-wal", "-shm"] {
            let stale = sidecar_path(path, suffix);
            if stale.exists() {
                std::fs::remove_file(&stale)
                    .with_context(|| format!("Failed to remove stale {:?}", stale))?;
            }
        }

        Self::open_existing(path)
    }
}

impl Preferences for MediaStore {
    fn favorite_ids(&self) -> Result<HashSet<i64>> {
        let mut stmt = self.conn.prepare_cached("SELECT media_id FROM favorites")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<HashSet<i64>, _>>()
            .context("Failed to load favorites")?;
        Ok(ids)
    }

    fn set_favorite(&self, media_id: i64, favorite: bool) -> Result<()> {
        if favorite {
            self.conn.execute(
                "INSERT OR IGNORE INTO favorites (media_id, created_at) VALUES (?1, ?2)",
                params![media_id, Self::now()],
            )?;
        } else {
            self.conn
                .execute("DELETE FROM favorites WHERE media_id = ?1", params![media_id])?;
        }
        Ok(())
    }

    fn theme_mode(&self) -> Result<ThemeMode> {
        self.decoded_setting(KEY_THEME, ThemeMode::from_ordinal)
    }

    fn set_theme_mode(&self, mode: ThemeMode) -> Result<()> {
        self.set_setting(KEY_THEME, mode.ordinal())
    }

    fn sort_type(&self) -> Result<SortType> {
        self.decoded_setting(KEY_SORT_TYPE, SortType::from_ordinal)
    }

    fn set_sort_type(&self, sort_type: SortType) -> Result<()> {
        self.set_setting(KEY_SORT_TYPE, sort_type.ordinal())
    }

    fn sort_order(&self) -> Result<SortOrder> {
        self.decoded_setting(KEY_SORT_ORDER, SortOrder::from_ordinal)
    }

    fn set_sort_order(&self, order: SortOrder) -> Result<()> {
        self.set_setting(KEY_SORT_ORDER, order.ordinal())
    }
}

// =========================================================================
// Helper Functions
// =========================================================================

fn media_params(item: &MediaItem, last_seen: i64) -> impl rusqlite::Params {
    let added_at = if item.date_added > 0 {
        item.date_added
    } else {
        last_seen
    };
    (
        item.path.to_string_lossy().into_owned(),
        media_type_to_int(item.media_type),
        item.date_modified,
        item.size,
        item.width,
        item.height,
        item.duration_ms,
        added_at,
        last_seen,
    )
}

fn row_to_item(row: &Row) -> rusqlite::Result<MediaItem> {
    let path = PathBuf::from(row.get::<_, String>(1)?);
    let mut item = MediaItem::new(
        row.get(0)?,
        path,
        int_to_media_type(row.get(2)?),
        row.get(5)?,
        row.get(6)?,
    );
    item.date_modified = row.get(3)?;
    item.size = row.get(4)?;
    item.duration_ms = row.get(7)?;
    item.date_added = row.get(8)?;
    Ok(item)
}

/// Converts MediaType enum to integer for storage.
fn media_type_to_int(media_type: MediaType) -> i32 {
    match media_type {
        MediaType::Image => 0,
        MediaType::Video => 1,
    }
}

/// True when the error chain holds a SQLite "corrupt" or "not a database" failure.
fn is_corruption(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<rusqlite::Error>())
        .any(|e| {
            matches!(
                e.sqlite_error_code(),
                Some(ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase)
            )
        })
}

/// `path` with `suffix` appended to its file name.
fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Converts stored integer back to MediaType enum.
fn int_to_media_type(value: i32) -> MediaType {
    match value {
        1 => MediaType::Video,
        _ => MediaType::Image,
    }
}
