//! Tagged-variant media item tree and its common header fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fields shared by every media item, regardless of kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemHeader {
    /// Stable identifier, unique within an [`crate::MediaItem`] tree.
    pub item_id: Uuid,
    /// IMDb identifier, when known.
    pub imdb_id: Option<String>,
    /// Human-readable title.
    pub title: String,
    /// Pre-formatted log line for this item, refreshed on upsert.
    pub log_string: String,
    /// When the item was first indexed by a source/indexer service.
    pub indexed_at: Option<DateTime<Utc>>,
    /// Number of times a scrape has been attempted for this item.
    pub scraped_times: u32,
    /// Resolved file name once a release has been downloaded.
    pub file: Option<String>,
    /// Resolved download folder once files have landed on disk.
    pub folder: Option<String>,
    /// Whether the item has been symlinked into the library.
    pub symlinked: bool,
    /// Destination folder used for the symlink, once created.
    pub update_folder: Option<String>,
    /// Release/air date, used only for display purposes.
    pub aired_at: Option<DateTime<Utc>>,
    /// Passthrough flag set by the indexer; not consulted by the core.
    pub is_anime: bool,
}

impl ItemHeader {
    /// Build a fresh header for a newly indexed item.
    #[must_use]
    pub fn new(item_id: Uuid, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            item_id,
            imdb_id: None,
            log_string: title.clone(),
            title,
            indexed_at: None,
            scraped_times: 0,
            file: None,
            folder: None,
            symlinked: false,
            update_folder: None,
            aired_at: None,
            is_anime: false,
        }
    }

    /// Copy the non-structural attributes of `other` onto `self`, mirroring
    /// the original's `copy_other_media_attr`: identity fields (`item_id`,
    /// kind) are never touched by this.
    pub fn copy_other_media_attr(&mut self, other: &Self) {
        self.imdb_id = other.imdb_id.clone();
        self.indexed_at = other.indexed_at.or(self.indexed_at);
        self.aired_at = other.aired_at.or(self.aired_at);
        self.is_anime = other.is_anime;
        if !other.title.is_empty() {
            self.title.clone_from(&other.title);
        }
        self.log_string = format!("{} ({})", self.title, self.item_id);
    }

    /// Merge `other` onto `self` field-by-field, preferring non-null
    /// incoming values, per spec §4.1's upsert contract. Covers both the
    /// non-structural attributes ([`Self::copy_other_media_attr`]) and
    /// the progression fields a service advances (`file`, `folder`,
    /// `symlinked`, `update_folder`, `scraped_times`), so a stored item
    /// never loses ground the router already merged onto its snapshot.
    pub fn merge_from(&mut self, other: &Self) {
        self.copy_other_media_attr(other);
        if other.file.is_some() {
            self.file.clone_from(&other.file);
        }
        if other.folder.is_some() {
            self.folder.clone_from(&other.folder);
        }
        self.symlinked |= other.symlinked;
        if other.update_folder.is_some() {
            self.update_folder.clone_from(&other.update_folder);
        }
        self.scraped_times = self.scraped_times.max(other.scraped_times);
    }
}

/// Discriminant for a [`MediaItem`] variant, used by services that key
/// behavior off item kind without matching the full enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// A standalone movie.
    Movie,
    /// A TV show, containing seasons.
    Show,
    /// A season within a show, containing episodes.
    Season,
    /// An episode within a season.
    Episode,
}

/// A standalone movie; a leaf item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    /// Shared header fields.
    pub header: ItemHeader,
}

/// A TV show; a container owning its seasons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    /// Shared header fields.
    pub header: ItemHeader,
    /// Seasons belonging to this show, owned hierarchically.
    pub seasons: Vec<Season>,
}

/// A season within a show; a container owning its episodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    /// Shared header fields.
    pub header: ItemHeader,
    /// Id of the owning [`Show`]. Non-owning back-reference.
    pub parent_id: Uuid,
    /// Episodes belonging to this season, owned hierarchically.
    pub episodes: Vec<Episode>,
}

/// An episode within a season; a leaf item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Shared header fields.
    pub header: ItemHeader,
    /// Id of the owning [`Season`]. Non-owning back-reference.
    pub parent_id: Uuid,
}

/// A media item: a closed, tagged-variant tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaItem {
    /// See [`Movie`].
    Movie(Movie),
    /// See [`Show`].
    Show(Show),
    /// See [`Season`].
    Season(Season),
    /// See [`Episode`].
    Episode(Episode),
}

impl MediaItem {
    /// Shared header, regardless of variant.
    #[must_use]
    pub const fn header(&self) -> &ItemHeader {
        match self {
            Self::Movie(item) => &item.header,
            Self::Show(item) => &item.header,
            Self::Season(item) => &item.header,
            Self::Episode(item) => &item.header,
        }
    }

    /// Mutable shared header, regardless of variant.
    pub fn header_mut(&mut self) -> &mut ItemHeader {
        match self {
            Self::Movie(item) => &mut item.header,
            Self::Show(item) => &mut item.header,
            Self::Season(item) => &mut item.header,
            Self::Episode(item) => &mut item.header,
        }
    }

    /// Stable identifier for this item.
    #[must_use]
    pub const fn item_id(&self) -> Uuid {
        self.header().item_id
    }

    /// Discriminant for this item's variant.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::Movie(_) => ItemKind::Movie,
            Self::Show(_) => ItemKind::Show,
            Self::Season(_) => ItemKind::Season,
            Self::Episode(_) => ItemKind::Episode,
        }
    }

    /// Whether this item is a container (owns children) rather than a leaf.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Show(_) | Self::Season(_))
    }

    /// Non-owning parent id, when this item has one.
    #[must_use]
    pub const fn parent_id(&self) -> Option<Uuid> {
        match self {
            Self::Season(season) => Some(season.parent_id),
            Self::Episode(episode) => Some(episode.parent_id),
            Self::Movie(_) | Self::Show(_) => None,
        }
    }
}
