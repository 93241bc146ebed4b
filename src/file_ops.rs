//! File operations on indexed media.

use std::fs;
use std::io::ErrorKind;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::models::{MediaItem, MediaStore};

/// Outcome of a bulk delete. Ids are media store row ids.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: Vec<i64>,
    pub failed: Vec<i64>,
}

/// Removes each file from disk, then its index row and favorite mark.
///
/// A file that is already gone still has its row removed. Files that cannot be
/// removed are reported in `failed` and stay indexed.
pub fn delete_media(store: &MediaStore, items: &[MediaItem]) -> Result<DeleteReport> {
    let mut report = DeleteReport::default();

    for item in items {
        match fs::remove_file(&item.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("{:?} already removed from disk", item.path);
            }
            Err(e) => {
                warn!("Failed to delete {:?}: {}", item.path, e);
                report.failed.push(item.id);
                continue;
            }
        }

        store
            .delete_media(&item.path)
            .with_context(|| format!("Failed to drop {:?} from the index", item.path))?;
        report.deleted.push(item.id);
    }

    info!(
        "Deleted {} media items ({} failed)",
        report.deleted.len(),
        report.failed.len()
    );
    Ok(report)
}
