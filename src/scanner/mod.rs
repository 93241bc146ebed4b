//! Directory-backed media index for the gallery.
//!
//! - `FileScanner` - walks a directory tree and syncs it into the `MediaStore`
//! - `MetadataExtractor` - header-only dimension probing

pub mod file_scanner;
pub mod metadata;

pub use file_scanner::{FileScanner, ScanConfig, ScanResult};
