//! File scanner that builds the gallery's media index from a directory tree.
//!
//! This module provides the `FileScanner` struct which handles:
//! - Recursive directory scanning using walkdir
//! - Media type detection by file extension
//! - Cache-aware scanning (skip unchanged files based on mtime and size)
//! - Batched SQLite writes that assign stable media ids

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use tokio::task;
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::models::media_store::MediaStore;
use crate::models::{MediaItem, MediaType};
use crate::scanner::metadata::MetadataExtractor;

/// Configuration for the file scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to scan directories recursively.
    pub recursive: bool,
    /// Maximum directory depth (0 = unlimited).
    pub max_depth: usize,
    /// Number of items to batch before writing to database.
    pub batch_size: usize,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
    /// Drop index rows not seen by this scan. Only safe when every indexed
    /// directory is under the scanned root.
    pub prune_missing: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: 0, // unlimited
            batch_size: 100,
            follow_symlinks: false,
            prune_missing: false,
        }
    }
}

/// Result of a completed scan operation.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Total number of media files found.
    pub total_files: usize,
    /// Number of newly added/updated items.
    pub new_items: usize,
    /// Number of items reused from the index unchanged.
    pub cached_items: usize,
    /// Number of files that had errors.
    pub error_count: usize,
    /// Number of images indexed with placeholder dimensions because their
    /// headers could not be read.
    pub warning_count: usize,
    /// Number of index rows removed because their files are gone.
    pub pruned: usize,
}

#[derive(Debug, Clone)]
struct DiscoveredEntry {
    path: PathBuf,
    media_type: MediaType,
    mtime: i64,
    size: i64,
}

pub struct FileScanner {
    config: ScanConfig,
}

impl FileScanner {
    /// Creates a new file scanner with default configuration.
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    /// Creates a new file scanner with custom configuration.
    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scans a directory on the blocking pool, taking ownership of the store.
    ///
    /// Returns the indexed media items (sorted by path) and scan statistics.
    pub async fn scan_directory(
        &self,
        dir: &Path,
        mut store: MediaStore,
    ) -> Result<(Vec<MediaItem>, ScanResult)> {
        let dir = dir.to_path_buf();
        let config = self.config.clone();

        task::spawn_blocking(move || Self::scan_directory_sync(&dir, &config, &mut store))
            .await
            .context("Scan task panicked")?
    }

    /// Synchronous directory scanning implementation.
    pub fn scan_directory_sync(
        dir: &Path,
        config: &ScanConfig,
        store: &mut MediaStore,
    ) -> Result<(Vec<MediaItem>, ScanResult)> {
        info!("Starting scan of {:?}", dir);
        let scan_time = MediaStore::now();

        let cache_map = store.get_cache_map()?;
        debug!("Loaded {} cached entries", cache_map.len());

        let discovered = Self::discover_files(dir, config)?;
        info!("Discovered {} media files", discovered.len());

        let mut items = Vec::with_capacity(discovered.len());
        let mut batch = Vec::with_capacity(config.batch_size.max(1));
        let mut cached_paths = Vec::new();
        let mut result = ScanResult::default();

        for entry in discovered {
            if let Some(cached) = Self::cached_item(&entry, &cache_map) {
                trace!("Cache hit for {:?}", entry.path);
                cached_paths.push(entry.path.clone());
                items.push(cached);
                result.cached_items += 1;
                continue;
            }

            match Self::process_entry(&entry) {
                Ok((item, has_warnings)) => {
                    if has_warnings {
                        result.warning_count += 1;
                    }
                    batch.push(item);
                    if batch.len() >= config.batch_size.max(1) {
                        result.new_items += store.upsert_media_batch(&mut batch, scan_time)?;
                        items.append(&mut batch);
                    }
                }
                Err(e) => {
                    warn!("Error processing {:?}: {}", entry.path, e);
                    result.error_count += 1;
                }
            }
        }

        if !batch.is_empty() {
            result.new_items += store.upsert_media_batch(&mut batch, scan_time)?;
            items.append(&mut batch);
        }

        store.touch_last_seen(&cached_paths, scan_time)?;

        if config.prune_missing {
            result.pruned = store.delete_stale(scan_time)?.len();
        }

        items.sort_by(|a, b| a.path.cmp(&b.path));
        result.total_files = items.len();

        info!(
            "Scan complete: {} total, {} new, {} cached, {} errors, {} warnings, {} pruned",
            result.total_files,
            result.new_items,
            result.cached_items,
            result.error_count,
            result.warning_count,
            result.pruned
        );

        Ok((items, result))
    }

    /// Discovers all media files in a directory.
    fn discover_files(dir: &Path, config: &ScanConfig) -> Result<Vec<DiscoveredEntry>> {
        if !dir.is_dir() {
            anyhow::bail!("Not a directory: {:?}", dir);
        }

        let mut walker = WalkDir::new(dir).follow_links(config.follow_symlinks);

        if !config.recursive {
            walker = walker.max_depth(1);
        } else if config.max_depth > 0 {
            walker = walker.max_depth(config.max_depth);
        }

        let mut entries = Vec::new();

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            let Some(media_type) = MediaType::from_path(path) else {
                continue;
            };

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!("Failed to read metadata for {:?}: {}", path, e);
                    continue;
                }
            };

            let mtime = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);

            entries.push(DiscoveredEntry {
                path: path.to_path_buf(),
                media_type,
                mtime,
                size: metadata.len() as i64,
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }

    fn cached_item(
        entry: &DiscoveredEntry,
        cache_map: &HashMap<PathBuf, MediaItem>,
    ) -> Option<MediaItem> {
        cache_map
            .get(&entry.path)
            .filter(|cached| cached.date_modified == entry.mtime && cached.size == entry.size)
            .cloned()
    }

    /// Builds a fresh item for a new or changed file, flagging placeholder metadata.
    fn process_entry(entry: &DiscoveredEntry) -> Result<(MediaItem, bool)> {
        trace!("Extracting metadata for {:?}", entry.path);
        let metadata = MetadataExtractor::extract_metadata(&entry.path)?;

        let mut item = MediaItem::new(
            0,
            entry.path.clone(),
            entry.media_type,
            metadata.width,
            metadata.height,
        );
        item.date_modified = entry.mtime;
        item.size = entry.size;
        item.duration_ms = metadata.duration_ms;
        Ok((item, metadata.has_warnings))
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn create_test_image(path: &Path) {
        image::RgbImage::new(4, 3).save(path).unwrap();
    }

    #[test]
    fn test_scan_config_default() {
        let config = ScanConfig::default();
        assert!(config.recursive);
        assert_eq!(config.max_depth, 0);
        assert_eq!(config.batch_size, 100);
        assert!(!config.follow_symlinks);
        assert!(!config.prune_missing);
    }

    #[test]
    fn test_discover_files_empty_dir() {
        let dir = tempdir().unwrap();
        let entries = FileScanner::discover_files(dir.path(), &ScanConfig::default()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_discover_rejects_missing_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(FileScanner::discover_files(&missing, &ScanConfig::default()).is_err());
    }

    #[test]
    fn test_discover_files_with_media() {
        let dir = tempdir().unwrap();

        create_test_image(&dir.path().join("image1.png"));
        create_test_image(&dir.path().join("image2.png"));
        File::create(dir.path().join("clip.mp4")).unwrap();
        File::create(dir.path().join("not_media.txt")).unwrap();

        let entries = FileScanner::discover_files(dir.path(), &ScanConfig::default()).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries
                .iter()
                .filter(|e| e.media_type == MediaType::Image)
                .count(),
            2
        );
    }

    #[test]
    fn test_discover_files_recursive() {
        let dir = tempdir().unwrap();
        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();

        create_test_image(&dir.path().join("root.png"));
        create_test_image(&subdir.join("nested.png"));

        let config = ScanConfig {
            recursive: true,
            ..Default::default()
        };
        let entries = FileScanner::discover_files(dir.path(), &config).unwrap();
        assert_eq!(entries.len(), 2);

        let config = ScanConfig {
            recursive: false,
            ..Default::default()
        };
        let entries = FileScanner::discover_files(dir.path(), &config).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_file_scanner_basic() {
        let dir = tempdir().unwrap();
        let db_dir = tempdir().unwrap();
        let db_path = db_dir.path().join("test.sqlite");

        let album = dir.path().join("Camera");
        fs::create_dir(&album).unwrap();
        create_test_image(&album.join("test1.png"));
        create_test_image(&album.join("test2.png"));

        let store = MediaStore::open(&db_path).unwrap();
        let scanner = FileScanner::new();

        let (items, result) = scanner.scan_directory(dir.path(), store).await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(result.total_files, 2);
        assert_eq!(result.new_items, 2);
        assert_eq!(result.cached_items, 0);
        assert_eq!(result.error_count, 0);
        assert!(items.iter().all(|i| i.id > 0 && i.bucket_name == "Camera"));
        assert_eq!((items[0].width, items[0].height), (4, 3));
    }

    #[tokio::test]
    async fn test_file_scanner_caching() {
        let dir = tempdir().unwrap();
        let db_dir = tempdir().unwrap();
        let db_path = db_dir.path().join("test.sqlite");

        create_test_image(&dir.path().join("cached.png"));

        let first_id = {
            let store = MediaStore::open(&db_path).unwrap();
            let (items, result) = FileScanner::new()
                .scan_directory(dir.path(), store)
                .await
                .unwrap();
            assert_eq!(result.new_items, 1);
            assert_eq!(result.cached_items, 0);
            items[0].id
        };

        let store = MediaStore::open(&db_path).unwrap();
        let (items, result) = FileScanner::new()
            .scan_directory(dir.path(), store)
            .await
            .unwrap();
        assert_eq!(result.total_files, 1);
        assert_eq!(result.new_items, 0);
        assert_eq!(result.cached_items, 1);
        assert_eq!(items[0].id, first_id);
        assert_eq!((items[0].width, items[0].height), (4, 3));
    }

    #[test]
    fn test_small_batches_flush_everything() {
        let dir = tempdir().unwrap();
        let db_dir = tempdir().unwrap();
        for i in 0..5 {
            create_test_image(&dir.path().join(format!("img_{}.png", i)));
        }

        let mut store = MediaStore::open(&db_dir.path().join("test.sqlite")).unwrap();
        let config = ScanConfig {
            batch_size: 2,
            ..Default::default()
        };
        let (items, result) =
            FileScanner::scan_directory_sync(dir.path(), &config, &mut store).unwrap();

        assert_eq!(result.new_items, 5);
        assert_eq!(items.len(), 5);
        assert_eq!(store.count_media().unwrap(), 5);
    }

    #[test]
    fn test_unreadable_image_counts_as_warning() {
        let dir = tempdir().unwrap();
        let db_dir = tempdir().unwrap();
        create_test_image(&dir.path().join("good.png"));
        fs::write(dir.path().join("broken.png"), b"not an image").unwrap();
        fs::write(dir.path().join("clip.mp4"), [0u8; 16]).unwrap();

        let mut store = MediaStore::open(&db_dir.path().join("test.sqlite")).unwrap();
        let (items, result) =
            FileScanner::scan_directory_sync(dir.path(), &ScanConfig::default(), &mut store)
                .unwrap();

        assert_eq!(result.total_files, 3);
        assert_eq!(result.error_count, 0);
        assert_eq!(result.warning_count, 1);
        let broken = items.iter().find(|i| i.name == "broken.png").unwrap();
        assert_eq!((broken.width, broken.height), (0, 0));
    }
}
