//! User preferences: theme, sort settings, grid filter and the favorites set.
//!
//! Enum values persist as their ordinal so the settings table stays a plain
//! key/integer map.

use std::collections::HashSet;
use std::str::FromStr;

use anyhow::Result;

use crate::error::DecodeError;

/// Upper bound on simultaneously selected items.
pub const MAX_SELECTION: usize = 50;
pub const SLIDESHOW_DEFAULT_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn ordinal(self) -> i64 {
        match self {
            Self::Light => 0,
            Self::Dark => 1,
            Self::System => 2,
        }
    }

    pub fn from_ordinal(value: i64) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::Light),
            1 => Ok(Self::Dark),
            2 => Ok(Self::System),
            _ => Err(DecodeError::UnknownOrdinal {
                kind: "theme mode",
                value,
            }),
        }
    }
}

impl FromStr for ThemeMode {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            _ => Err(DecodeError::UnknownName {
                kind: "theme mode",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortType {
    #[default]
    Date,
    Name,
    Size,
}

impl SortType {
    pub fn ordinal(self) -> i64 {
        match self {
            Self::Date => 0,
            Self::Name => 1,
            Self::Size => 2,
        }
    }

    pub fn from_ordinal(value: i64) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::Date),
            1 => Ok(Self::Name),
            2 => Ok(Self::Size),
            _ => Err(DecodeError::UnknownOrdinal {
                kind: "sort type",
                value,
            }),
        }
    }
}

impl FromStr for SortType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "name" => Ok(Self::Name),
            "size" => Ok(Self::Size),
            _ => Err(DecodeError::UnknownName {
                kind: "sort type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    pub fn ordinal(self) -> i64 {
        match self {
            Self::Ascending => 0,
            Self::Descending => 1,
        }
    }

    pub fn from_ordinal(value: i64) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::Ascending),
            1 => Ok(Self::Descending),
            _ => Err(DecodeError::UnknownOrdinal {
                kind: "sort order",
                value,
            }),
        }
    }
}

impl FromStr for SortOrder {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(DecodeError::UnknownName {
                kind: "sort order",
                value: s.to_string(),
            }),
        }
    }
}

/// Which subset of the library the grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    All,
    Photos,
    Videos,
    Favorites,
}

impl FromStr for FilterType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "photos" => Ok(Self::Photos),
            "videos" => Ok(Self::Videos),
            "favorites" => Ok(Self::Favorites),
            _ => Err(DecodeError::UnknownName {
                kind: "filter",
                value: s.to_string(),
            }),
        }
    }
}

/// Key/value preference storage used by the gallery view-model.
pub trait Preferences {
    fn favorite_ids(&self) -> Result<HashSet<i64>>;
    fn set_favorite(&self, media_id: i64, favorite: bool) -> Result<()>;
    fn theme_mode(&self) -> Result<ThemeMode>;
    fn set_theme_mode(&self, mode: ThemeMode) -> Result<()>;
    fn sort_type(&self) -> Result<SortType>;
    fn set_sort_type(&self, sort_type: SortType) -> Result<()>;
    fn sort_order(&self) -> Result<SortOrder>;
    fn set_sort_order(&self, order: SortOrder) -> Result<()>;
}
