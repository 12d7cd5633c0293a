/// Capability traits over the remote catalog
pub mod catalog;
/// Data entities for tracks and playlists
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Spotify API client
pub mod spotify;

pub use catalog::{Authenticator, CatalogSearch, PlaylistReader, PlaylistWriter};
pub use entities::{Playlist, Track};
pub use spotify::SpotifyClient;
