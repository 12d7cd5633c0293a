use async_trait::async_trait;
use log::debug;

use crate::clients::{
    catalog::{
        Authenticator, CatalogSearch, MAX_APPEND_BATCH, PageToken, PlaylistPage, PlaylistReader,
        PlaylistWriter, TrackPage,
    },
    entities::Track,
    errors::{Error, Result},
};
use crate::config::Config;
use rspotify::{
    AuthCodeSpotify, Config as SpotifyConfig, Credentials, OAuth,
    model::{
        FullTrack, Page, PlayableId, PlayableItem, PlaylistId, PlaylistItem, SearchResult,
        SearchType, TrackId,
    },
    prelude::*,
    scopes,
};

impl TryFrom<FullTrack> for Track {
    type Error = Error;

    fn try_from(f: FullTrack) -> Result<Track> {
        let id = f
            .id
            .ok_or_else(|| Error::UnexpectedResponse(format!("track {:?} has no id", f.name)))?;
        // assume the first artist is the primary one
        let artist = f
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_default();
        Ok(Track::new(id.id(), f.name, artist, f.explicit))
    }
}

fn playlist_tracks(playlist_id: &str, page: Page<PlaylistItem>) -> TrackPage {
    let next = page.next.as_ref().map(|_| PageToken {
        playlist_id: playlist_id.to_string(),
        offset: page.offset + page.limit,
    });
    let tracks = page
        .items
        .into_iter()
        .filter_map(|item| match item.track {
            Some(PlayableItem::Track(track)) => match Track::try_from(track) {
                Ok(track) => Some(track),
                Err(e) => {
                    debug!("Skipping playlist item: {e}");
                    None
                }
            },
            _ => {
                debug!("Skipping playlist item without a catalog track");
                None
            }
        })
        .collect();
    TrackPage { tracks, next }
}

/// The remote catalog backed by the Spotify Web API.
pub struct SpotifyClient {
    /// Underlying rspotify client
    pub spotify: AuthCodeSpotify,
}

impl SpotifyClient {
    /// Wraps an already configured rspotify client.
    pub fn new(spotify: AuthCodeSpotify) -> Self {
        SpotifyClient { spotify }
    }

    /// A client for the app in `config`, with the OAuth token cached on disk.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let creds = Credentials::new(&config.client_id, &config.client_secret);
        let oauth = OAuth {
            redirect_uri: config.redirect_uri.clone(),
            scopes: scopes!("playlist-modify-public", "playlist-read-private"),
            ..Default::default()
        };
        let spotify = AuthCodeSpotify::with_config(
            creds,
            oauth,
            SpotifyConfig {
                token_cached: true,
                cache_path: config.token_cache_path.clone(),
                ..Default::default()
            },
        );
        Self { spotify }
    }
}

#[async_trait]
impl Authenticator for SpotifyClient {
    // Authorize via CLI prompt and OAuth flow, reusing a cached token when present.
    // This function requires the rspotify `cli` feature enabled.
    async fn authenticate(&self) -> Result<()> {
        debug!("Starting Spotify authorization ...");
        let url = self.spotify.get_authorize_url(false)?;
        self.spotify.prompt_for_token(&url).await?;
        let user = self.spotify.me().await?;
        debug!("Authenticated as user: {:?}", user.display_name);
        Ok(())
    }
}

#[async_trait]
impl CatalogSearch for SpotifyClient {
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>> {
        let result = self
            .spotify
            .search(query, SearchType::Track, None, None, Some(limit), None)
            .await?;
        let SearchResult::Tracks(page) = result else {
            return Err(Error::UnexpectedResponse(format!(
                "search for {query:?} returned no track results"
            )));
        };
        debug!("Search {query:?} returned {} tracks", page.items.len());
        Ok(page
            .items
            .into_iter()
            .filter_map(|t| Track::try_from(t).ok())
            .collect())
    }
}

#[async_trait]
impl PlaylistReader for SpotifyClient {
    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistPage> {
        let id = PlaylistId::from_id_or_uri(playlist_id)?;
        let playlist = self.spotify.playlist(id, None, None).await?;
        let id = playlist.id.id().to_string();
        debug!(
            "Fetched playlist {:?} with {} tracks",
            playlist.name, playlist.tracks.total
        );
        Ok(PlaylistPage {
            tracks: playlist_tracks(&id, playlist.tracks),
            id,
            name: playlist.name,
        })
    }

    async fn get_next_page(&self, token: &PageToken) -> Result<TrackPage> {
        let id = PlaylistId::from_id_or_uri(&token.playlist_id)?;
        let page = self
            .spotify
            .playlist_items_manual(id, None, None, None, Some(token.offset))
            .await?;
        debug!(
            "Fetched {} playlist items at offset {}",
            page.items.len(),
            token.offset
        );
        Ok(playlist_tracks(&token.playlist_id, page))
    }
}

#[async_trait]
impl PlaylistWriter for SpotifyClient {
    async fn create_playlist(&self, name: &str, description: &str) -> Result<String> {
        let user = self.spotify.me().await?;
        let playlist = self
            .spotify
            .user_playlist_create(user.id.as_ref(), name, Some(true), None, Some(description))
            .await?;
        debug!("Created playlist {name:?} with id {}", playlist.id.id());
        Ok(playlist.id.id().to_string())
    }

    async fn append_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        if track_ids.len() > MAX_APPEND_BATCH {
            return Err(Error::BatchTooLarge(track_ids.len()));
        }
        let id = PlaylistId::from_id_or_uri(playlist_id)?;
        let items = track_ids
            .iter()
            .map(|t| TrackId::from_id(t.as_str()).map(PlayableId::Track))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.spotify.playlist_add_items(id, items, None).await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn artist(name: &str) -> Value {
        json!({"external_urls": {}, "href": null, "id": null, "name": name})
    }

    fn full_track(id: Option<&str>, name: &str, artists: &[&str], explicit: bool) -> Value {
        json!({
            "album": {
                "album_type": "album",
                "artists": [],
                "available_markets": [],
                "external_urls": {},
                "href": null,
                "id": null,
                "images": [],
                "name": "Album",
                "release_date": null,
                "release_date_precision": null
            },
            "artists": artists.iter().map(|a| artist(a)).collect::<Vec<_>>(),
            "available_markets": [],
            "disc_number": 1,
            "duration_ms": 180_000,
            "explicit": explicit,
            "external_ids": {},
            "external_urls": {},
            "href": null,
            "id": id,
            "is_local": id.is_none(),
            "name": name,
            "popularity": 0,
            "preview_url": null,
            "track_number": 1,
            "type": "track"
        })
    }

    fn item(track: Value) -> Value {
        json!({"added_at": null, "added_by": null, "is_local": false, "track": track})
    }

    fn page(items: Vec<Value>, offset: u32, next: Option<&str>) -> Page<PlaylistItem> {
        serde_json::from_value(json!({
            "href": "https://api.spotify.com/v1/playlists/pl/tracks",
            "items": items,
            "limit": 100,
            "next": next,
            "offset": offset,
            "previous": null,
            "total": 400
        }))
        .unwrap()
    }

    #[test]
    fn playlist_page_keeps_catalog_tracks_in_order() {
        let page = page(
            vec![
                item(full_track(
                    Some("4iV5W9uYEdYUVa79Axb7Rh"),
                    "Night Drive",
                    &["Artist Y", "Guest"],
                    true,
                )),
                item(full_track(None, "Home Recording", &["Me"], false)),
                item(Value::Null),
                item(full_track(Some("1301WleyT98MSxVHPZCA6M"), "Sunny Day", &[], false)),
            ],
            200,
            Some("https://api.spotify.com/v1/playlists/pl/tracks?offset=300&limit=100"),
        );

        let tracks = playlist_tracks("pl", page);

        assert_eq!(
            tracks.tracks,
            vec![
                Track::new("4iV5W9uYEdYUVa79Axb7Rh", "Night Drive", "Artist Y", true),
                Track::new("1301WleyT98MSxVHPZCA6M", "Sunny Day", "", false),
            ]
        );
        assert_eq!(
            tracks.next,
            Some(PageToken {
                playlist_id: "pl".to_string(),
                offset: 300,
            })
        );
    }

    #[test]
    fn last_playlist_page_has_no_next_token() {
        let page = page(
            vec![item(full_track(
                Some("4iV5W9uYEdYUVa79Axb7Rh"),
                "Night Drive",
                &["Artist Y"],
                false,
            ))],
            300,
            None,
        );

        let tracks = playlist_tracks("pl", page);

        assert_eq!(tracks.tracks.len(), 1);
        assert_eq!(tracks.next, None);
    }

    #[test]
    fn track_without_id_is_rejected() {
        let full: FullTrack =
            serde_json::from_value(full_track(None, "Home Recording", &["Me"], false)).unwrap();

        let err = Track::try_from(full).unwrap_err();

        assert!(matches!(err, Error::UnexpectedResponse(msg) if msg.contains("Home Recording")));
    }

    #[tokio::test]
    async fn append_rejects_oversized_batch_before_calling_spotify() {
        let config = Config {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: crate::config::DEFAULT_REDIRECT_URI.to_string(),
            token_cache_path: std::env::temp_dir().join(".cleanlist_test_token_cache"),
        };
        let client = SpotifyClient::from_config(&config);
        let track_ids: Vec<String> = (0..=MAX_APPEND_BATCH)
            .map(|i| format!("{i:0>22}"))
            .collect();

        let err = client.append_tracks("pl", &track_ids).await.unwrap_err();

        assert!(matches!(err, Error::BatchTooLarge(101)));
    }
}
