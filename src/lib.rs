//! Media gallery core: the SQLite media index, directory scanner, gallery
//! view-model and the touch gesture engine used by the full-screen viewer.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod file_ops;
pub mod format;
pub mod gesture;
pub mod models;
pub mod scanner;
pub mod viewmodel;
