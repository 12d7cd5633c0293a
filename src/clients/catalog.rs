//! Narrow capability traits over the remote music service.
//!
//! Each trait covers one capability so that an operation only depends on
//! what it actually calls.

use async_trait::async_trait;

use crate::clients::{entities::Track, errors::Result};

/// Most ids a single append call accepts.
pub const MAX_APPEND_BATCH: usize = 100;

/// Opaque marker for the next page of a playlist's tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageToken {
    /// Playlist the page belongs to
    pub playlist_id: String,
    /// Position of the page's first item
    pub offset: u32,
}

/// One page of playlist tracks and the marker of the page after it, if any.
#[derive(Debug, Clone, Default)]
pub struct TrackPage {
    /// Tracks on this page, in playlist order
    pub tracks: Vec<Track>,
    /// Marker of the following page, `None` on the last one
    pub next: Option<PageToken>,
}

/// Playlist metadata together with its first page of tracks.
#[derive(Debug, Clone)]
pub struct PlaylistPage {
    /// Catalog id of the playlist
    pub id: String,
    /// Display name of the playlist
    pub name: String,
    /// First page of tracks
    pub tracks: TrackPage,
}

/// Signs in to the remote service.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Completes the credential exchange, prompting the user if needed.
    async fn authenticate(&self) -> Result<()>;
}

/// Searches the remote catalog.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Tracks for `query`, in the service's relevance order.
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>>;
}

/// Reads playlists page by page.
#[async_trait]
pub trait PlaylistReader: Send + Sync {
    /// Playlist metadata and its first page of tracks.
    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistPage>;

    /// The page `token` points at.
    async fn get_next_page(&self, token: &PageToken) -> Result<TrackPage>;
}

/// Creates playlists and adds tracks to them.
#[async_trait]
pub trait PlaylistWriter: Send + Sync {
    /// Creates a playlist owned by the current user and returns its id.
    async fn create_playlist(&self, name: &str, description: &str) -> Result<String>;

    /// Appends at most [`MAX_APPEND_BATCH`] tracks to the end of a playlist.
    async fn append_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;
}
