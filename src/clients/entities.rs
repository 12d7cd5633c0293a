use std::fmt;

use serde::Serialize;

/// A performing artist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artist {
    /// Display name
    pub name: String,
}

/// A catalog track as seen by the workflow.
///
/// Only the primary artist is kept. Equality compares every field, while
/// [`Track::matches`] compares content only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    /// Catalog id
    pub id: String,
    /// Display title
    pub name: String,
    /// Primary artist
    pub artist: Artist,
    /// Flagged as explicit by the catalog
    pub explicit: bool,
}

impl Track {
    /// A track with a single artist.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        artist: impl Into<String>,
        explicit: bool,
    ) -> Self {
        Track {
            id: id.into(),
            name: name.into(),
            artist: Artist {
                name: artist.into(),
            },
            explicit,
        }
    }

    /// Not flagged as explicit.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.explicit
    }

    /// Whether `self` and `other` look like the same song.
    ///
    /// Artists must be equal ignoring case, and one title must contain the other
    /// ignoring case, so "Song (Radio Edit)" matches "Song". This is a loose
    /// heuristic: "Love" also matches "Love Story" by the same artist.
    /// Empty titles or artists never match.
    #[must_use]
    pub fn matches(&self, other: &Track) -> bool {
        if self.name.is_empty()
            || other.name.is_empty()
            || self.artist.name.is_empty()
            || other.artist.name.is_empty()
        {
            return false;
        }
        if self.artist.name.to_lowercase() != other.artist.name.to_lowercase() {
            return false;
        }
        let ours = self.name.to_lowercase();
        let theirs = other.name.to_lowercase();
        ours.contains(&theirs) || theirs.contains(&ours)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rating = if self.is_clean() { "Clean" } else { "Explicit" };
        write!(f, "{} by {} ({rating})", self.name, self.artist.name)
    }
}

/// A playlist and its tracks in remote order. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playlist {
    /// Catalog id
    pub id: String,
    /// Display name
    pub name: String,
    tracks: Vec<Track>,
}

impl Playlist {
    /// An empty playlist.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Playlist {
            id: id.into(),
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    /// Appends one track at the end.
    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Appends tracks at the end, in the order given.
    pub fn add_tracks(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.tracks.extend(tracks);
    }

    /// Tracks in playlist order.
    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the playlist has no tracks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} tracks)", self.name, self.len())
    }
}
