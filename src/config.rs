//! Runtime configuration from environment variables.

use std::path::PathBuf;

use anyhow::Result;

use crate::models::preferences::SLIDESHOW_DEFAULT_DELAY_MS;
use crate::models::MediaStore;
use crate::scanner::ScanConfig;

const DEFAULT_SCAN_BATCH: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Index database location.
    pub db_path: PathBuf,
    pub slideshow_delay_ms: u64,
    pub scan_batch_size: usize,
}

impl AppConfig {
    /// Reads `GALLERY_DB_PATH`, `GALLERY_SLIDESHOW_MS` and `GALLERY_SCAN_BATCH`,
    /// falling back to the XDG data dir and built-in defaults.
    pub fn from_env() -> Result<Self> {
        let db_path = match db_path_override() {
            Some(path) => path,
            None => MediaStore::default_db_path()?,
        };

        Ok(Self {
            db_path,
            slideshow_delay_ms: slideshow_delay_ms(),
            scan_batch_size: scan_batch_size(),
        })
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            batch_size: self.scan_batch_size,
            ..ScanConfig::default()
        }
    }
}

fn db_path_override() -> Option<PathBuf> {
    std::env::var_os("GALLERY_DB_PATH")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn slideshow_delay_ms() -> u64 {
    std::env::var("GALLERY_SLIDESHOW_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(SLIDESHOW_DEFAULT_DELAY_MS)
}

fn scan_batch_size() -> usize {
    std::env::var("GALLERY_SCAN_BATCH")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_SCAN_BATCH)
}
