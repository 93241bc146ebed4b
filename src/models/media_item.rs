use std::path::{Path, PathBuf};

use xxhash_rust::xxh3::xxh3_64;

use crate::format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "bmp" | "tiff" | "tif" => Some(Self::Image),
            "webm" | "mp4" | "mkv" | "avi" | "mov" | "3gp" => Some(Self::Video),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    /// Row id assigned by the media store.
    pub id: i64,
    pub name: String,
    pub path: PathBuf,
    pub media_type: MediaType,
    /// Unix seconds when the file was first indexed.
    pub date_added: i64,
    /// File modification time, Unix seconds.
    pub date_modified: i64,
    pub size: i64,
    pub width: u32,
    pub height: u32,
    pub duration_ms: Option<u32>,
    pub bucket_id: String,
    pub bucket_name: String,
}

impl MediaItem {
    /// Create a new MediaItem for a file, deriving name and album bucket from its path.
    pub fn new(id: i64, path: PathBuf, media_type: MediaType, width: u32, height: u32) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bucket_id = bucket_id_for(&path);
        let bucket_name = bucket_name_for(&path);
        Self {
            id,
            name,
            path,
            media_type,
            date_added: 0,
            date_modified: 0,
            size: 0,
            width,
            height,
            duration_ms: None,
            bucket_id,
            bucket_name,
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }

    pub fn formatted_size(&self) -> String {
        format::format_size(self.size)
    }

    pub fn formatted_duration(&self) -> String {
        format::format_duration(self.duration_ms.map(i64::from).unwrap_or(0))
    }

    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// Album name for a file: its parent directory's name.
pub fn bucket_name_for(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Stable album id for a file: hash of its parent directory's path.
pub fn bucket_id_for(path: &Path) -> String {
    match path.parent() {
        Some(parent) => format!("{:016x}", xxh3_64(parent.to_string_lossy().as_bytes())),
        None => "0".to_string(),
    }
}
