//! Gallery view-model: the in-memory filter, search and sort pipeline over the
//! media index, plus albums, favorites and multi-selection.
//!
//! Every setter re-runs the pipeline so `filtered_media()` is always current.
//! Preference writes go through `Preferences`; a failed write is logged and the
//! in-memory state still changes.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::models::preferences::{
    FilterType, Preferences, SortOrder, SortType, ThemeMode, MAX_SELECTION,
};
use crate::models::{MediaItem, MediaType};

pub struct GalleryViewModel<P: Preferences> {
    prefs: P,
    all_media: Vec<MediaItem>,
    filtered_media: Vec<MediaItem>,
    albums: BTreeMap<String, Vec<MediaItem>>,
    favorites: Vec<MediaItem>,
    favorite_ids: HashSet<i64>,
    search_query: String,
    filter_type: FilterType,
    album_filter: Option<String>,
    sort_type: SortType,
    sort_order: SortOrder,
    // Selected media ids in selection order.
    selected: Vec<i64>,
    is_loading: bool,
}

impl<P: Preferences> GalleryViewModel<P> {
    /// Creates an empty view-model, restoring favorites and sort settings from `prefs`.
    pub fn new(prefs: P) -> Self {
        let favorite_ids = prefs.favorite_ids().unwrap_or_else(|e| {
            warn!("Failed to load favorites: {:#}", e);
            HashSet::new()
        });
        let sort_type = prefs.sort_type().unwrap_or_else(|e| {
            warn!("Failed to load sort type: {:#}", e);
            SortType::default()
        });
        let sort_order = prefs.sort_order().unwrap_or_else(|e| {
            warn!("Failed to load sort order: {:#}", e);
            SortOrder::default()
        });

        Self {
            prefs,
            all_media: Vec::new(),
            filtered_media: Vec::new(),
            albums: BTreeMap::new(),
            favorites: Vec::new(),
            favorite_ids,
            search_query: String::new(),
            filter_type: FilterType::All,
            album_filter: None,
            sort_type,
            sort_order,
            selected: Vec::new(),
            is_loading: false,
        }
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Marks a background load as in flight.
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Replaces the media list with a freshly loaded one.
    pub fn set_media(&mut self, items: Vec<MediaItem>) {
        info!("Gallery loaded {} media items", items.len());
        self.all_media = items;

        self.albums = BTreeMap::new();
        for item in &self.all_media {
            self.albums
                .entry(item.bucket_name.clone())
                .or_default()
                .push(item.clone());
        }

        let known: HashSet<i64> = self.all_media.iter().map(|m| m.id).collect();
        self.selected.retain(|id| known.contains(id));

        self.refresh_favorites();
        self.apply_filter_and_search();
        self.is_loading = false;
    }

    /// Drops deleted items from every derived list.
    pub fn remove_media(&mut self, ids: &[i64]) {
        let removed: HashSet<i64> = ids.iter().copied().collect();
        let remaining: Vec<MediaItem> = self
            .all_media
            .drain(..)
            .filter(|m| !removed.contains(&m.id))
            .collect();
        self.favorite_ids.retain(|id| !removed.contains(id));
        self.set_media(remaining);
    }

    pub fn all_media(&self) -> &[MediaItem] {
        &self.all_media
    }

    pub fn filtered_media(&self) -> &[MediaItem] {
        &self.filtered_media
    }

    /// Media grouped by album (parent directory name), albums in name order.
    pub fn albums(&self) -> &BTreeMap<String, Vec<MediaItem>> {
        &self.albums
    }

    pub fn favorites(&self) -> &[MediaItem] {
        &self.favorites
    }

    pub fn find(&self, media_id: i64) -> Option<&MediaItem> {
        self.all_media.iter().find(|m| m.id == media_id)
    }

    // =========================================================================
    // Filter / search / sort
    // =========================================================================

    pub fn set_album_filter(&mut self, album: Option<String>) {
        self.album_filter = album;
        self.apply_filter_and_search();
    }

    pub fn album_filter(&self) -> Option<&str> {
        self.album_filter.as_deref()
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.apply_filter_and_search();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
        self.apply_filter_and_search();
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Changes and persists the grid sort.
    pub fn set_sort(&mut self, sort_type: SortType, sort_order: SortOrder) {
        self.sort_type = sort_type;
        self.sort_order = sort_order;
        if let Err(e) = self.prefs.set_sort_type(sort_type) {
            warn!("Failed to save sort type: {:#}", e);
        }
        if let Err(e) = self.prefs.set_sort_order(sort_order) {
            warn!("Failed to save sort order: {:#}", e);
        }
        self.apply_filter_and_search();
    }

    pub fn sort_type(&self) -> SortType {
        self.sort_type
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    fn apply_filter_and_search(&mut self) {
        let query = self.search_query.to_lowercase();

        let mut filtered: Vec<MediaItem> = self
            .all_media
            .iter()
            .filter(|m| {
                self.album_filter
                    .as_deref()
                    .map_or(true, |album| m.bucket_name == album)
            })
            .filter(|m| match self.filter_type {
                FilterType::All => true,
                FilterType::Photos => m.media_type == MediaType::Image,
                FilterType::Videos => m.media_type == MediaType::Video,
                FilterType::Favorites => self.favorite_ids.contains(&m.id),
            })
            .filter(|m| query.is_empty() || m.name.to_lowercase().contains(&query))
            .cloned()
            .collect();

        let (sort_type, sort_order) = (self.sort_type, self.sort_order);
        filtered.sort_by(|a, b| compare_media(a, b, sort_type, sort_order));

        debug!(
            "Filter {:?} album={:?} query={:?} -> {} of {} items",
            self.filter_type,
            self.album_filter,
            self.search_query,
            filtered.len(),
            self.all_media.len()
        );
        self.filtered_media = filtered;
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Flips the favorite mark for a media id. Returns the new state.
    pub fn toggle_favorite(&mut self, media_id: i64) -> bool {
        let now_favorite = if self.favorite_ids.remove(&media_id) {
            false
        } else {
            self.favorite_ids.insert(media_id);
            true
        };

        if let Err(e) = self.prefs.set_favorite(media_id, now_favorite) {
            warn!("Failed to save favorite {}: {:#}", media_id, e);
        }

        self.refresh_favorites();
        self.apply_filter_and_search();
        now_favorite
    }

    pub fn is_favorite(&self, media_id: i64) -> bool {
        self.favorite_ids.contains(&media_id)
    }

    fn refresh_favorites(&mut self) {
        self.favorites = self
            .all_media
            .iter()
            .filter(|m| self.favorite_ids.contains(&m.id))
            .cloned()
            .collect();
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Adds or removes a media id from the selection.
    ///
    /// Returns whether the item is selected afterwards. Adding beyond
    /// `MAX_SELECTION` or adding an unknown id is refused.
    pub fn toggle_selection(&mut self, media_id: i64) -> bool {
        if let Some(pos) = self.selected.iter().position(|id| *id == media_id) {
            self.selected.remove(pos);
            return false;
        }
        if self.selected.len() >= MAX_SELECTION || self.find(media_id).is_none() {
            return false;
        }
        self.selected.push(media_id);
        true
    }

    /// Selects the first `MAX_SELECTION` filtered items.
    pub fn select_all(&mut self) {
        self.selected = self
            .filtered_media
            .iter()
            .take(MAX_SELECTION)
            .map(|m| m.id)
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn remove_from_selection(&mut self, media_id: i64) {
        self.selected.retain(|id| *id != media_id);
    }

    pub fn is_selected(&self, media_id: i64) -> bool {
        self.selected.contains(&media_id)
    }

    pub fn selected(&self) -> Vec<&MediaItem> {
        self.selected
            .iter()
            .filter_map(|id| self.find(*id))
            .collect()
    }

    /// Clears the selection and hands back the items so the caller can delete them.
    pub fn take_selected_for_deletion(&mut self) -> Vec<MediaItem> {
        let items = self.selected().into_iter().cloned().collect();
        self.selected.clear();
        items
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn theme_mode(&self) -> ThemeMode {
        self.prefs.theme_mode().unwrap_or_else(|e| {
            warn!("Failed to load theme mode: {:#}", e);
            ThemeMode::default()
        })
    }

    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        if let Err(e) = self.prefs.set_theme_mode(mode) {
            warn!("Failed to save theme mode: {:#}", e);
        }
    }
}

fn compare_media(a: &MediaItem, b: &MediaItem, sort_type: SortType, order: SortOrder) -> Ordering {
    let primary = match sort_type {
        SortType::Date => a.date_added.cmp(&b.date_added),
        SortType::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortType::Size => a.size.cmp(&b.size),
    };
    let primary = match order {
        SortOrder::Ascending => primary,
        SortOrder::Descending => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}
