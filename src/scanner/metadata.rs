//! Metadata extraction for media files.
//!
//! Reads only image headers to obtain dimensions. Broken or unreadable files
//! report `ERROR_DIMENSION` so the grid can still show a placeholder.

use std::path::Path;

use anyhow::Result;
use image::ImageReader;
use tracing::{debug, trace, warn};

use crate::models::MediaType;

/// Result of metadata extraction for a media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    pub width: u32,
    pub height: u32,
    /// Duration in milliseconds (only for videos, when known).
    pub duration_ms: Option<u32>,
    /// Whether a readable file was expected but extraction fell back to
    /// placeholder values.
    pub has_warnings: bool,
}

impl MediaMetadata {
    fn placeholder() -> Self {
        Self {
            width: ERROR_DIMENSION,
            height: ERROR_DIMENSION,
            duration_ms: None,
            has_warnings: true,
        }
    }
}

/// Error state marker for broken media files.
pub const ERROR_DIMENSION: u32 = 0;

pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extracts dimensions (and duration where available) for a media file.
    pub fn extract_metadata(path: &Path) -> Result<MediaMetadata> {
        match MediaType::from_path(path) {
            Some(MediaType::Image) => Ok(Self::extract_image_metadata(path)),
            Some(MediaType::Video) => {
                // Container parsing is left to the platform player; the grid
                // only needs a placeholder tile for videos.
                debug!("No dimension probe for video {:?}", path);
                Ok(MediaMetadata {
                    has_warnings: false,
                    ..MediaMetadata::placeholder()
                })
            }
            None => {
                warn!("Unknown media type for {:?}", path);
                Ok(MediaMetadata::placeholder())
            }
        }
    }

    fn extract_image_metadata(path: &Path) -> MediaMetadata {
        trace!("Extracting image dimensions from {:?}", path);

        let reader = match ImageReader::open(path).and_then(|r| r.with_guessed_format()) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("Failed to open image {:?}: {}", path, e);
                return MediaMetadata::placeholder();
            }
        };

        match reader.into_dimensions() {
            Ok((width, height)) => {
                trace!("Got dimensions {}x{} for {:?}", width, height, path);
                MediaMetadata {
                    width,
                    height,
                    duration_ms: None,
                    has_warnings: false,
                }
            }
            Err(e) => {
                warn!("Failed to read image dimensions for {:?}: {}", path, e);
                MediaMetadata::placeholder()
            }
        }
    }
}
