use std::ops::Range;
use std::time::Instant;

use log::error;
use serde::Serialize;

use crate::clients::{
    catalog::{
        Authenticator, CatalogSearch, MAX_APPEND_BATCH, PlaylistPage, PlaylistReader,
        PlaylistWriter,
    },
    entities::{Playlist, Track},
    errors::{Result, WorkflowError},
};
use crate::observer::{LoggingObserver, Observers, Stage, WorkflowObserver};

/// Candidates requested per clean-version search.
pub const SEARCH_LIMIT: u32 = 50;
/// Description given to every destination playlist unless overridden.
pub const DEFAULT_DESCRIPTION: &str = "Clean version generated by cleanlist";
const CLEAN_SUFFIX: &str = " (Clean)";

/// Reads a whole playlist, following next-page markers until there are none.
pub async fn fetch_playlist<R>(reader: &R, playlist_id: &str) -> Result<Playlist>
where
    R: PlaylistReader + ?Sized,
{
    let PlaylistPage {
        id,
        name,
        tracks: mut page,
    } = reader.get_playlist(playlist_id).await?;
    let mut playlist = Playlist::new(id, name);
    loop {
        playlist.add_tracks(page.tracks);
        match page.next {
            Some(token) => page = reader.get_next_page(&token).await?,
            None => break,
        }
    }
    Ok(playlist)
}

/// Search query for a clean version of `track`.
#[must_use]
pub fn clean_query(track: &Track) -> String {
    format!("{} {} clean", track.name, track.artist.name)
}

/// First search candidate that is clean and matches `track`.
///
/// Ranking is left to the catalog. A failed search is logged and treated as
/// no match.
pub async fn find_clean<S>(search: &S, track: &Track) -> Option<Track>
where
    S: CatalogSearch + ?Sized,
{
    let query = clean_query(track);
    match search.search_tracks(&query, SEARCH_LIMIT).await {
        Ok(candidates) => candidates
            .into_iter()
            .find(|candidate| candidate.is_clean() && candidate.matches(track)),
        Err(e) => {
            error!("Error searching for {track}: {e}");
            None
        }
    }
}

/// Appends `track_ids` in order, one call per batch of at most
/// [`MAX_APPEND_BATCH`] ids, and returns how many were appended.
///
/// Stops at the first failing batch. Batches already appended stay in place.
pub async fn append_in_chunks<W>(
    writer: &W,
    playlist_id: &str,
    track_ids: &[String],
    mut on_chunk: impl FnMut(Range<usize>),
) -> Result<usize, WorkflowError>
where
    W: PlaylistWriter + ?Sized,
{
    let mut appended = 0;
    for chunk in track_ids.chunks(MAX_APPEND_BATCH) {
        writer
            .append_tracks(playlist_id, chunk)
            .await
            .map_err(|source| WorkflowError::Append {
                playlist_id: playlist_id.to_string(),
                appended,
                source,
            })?;
        on_chunk(appended..appended + chunk.len());
        appended += chunk.len();
    }
    Ok(appended)
}

/// Progress of a [`CleanPlaylistWorkflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowState {
    /// Nothing done yet
    Unauthenticated,
    /// Signed in to the remote service
    Authenticated,
    /// Source playlist read in full
    PlaylistFetched,
    /// Destination playlist created
    DestinationCreated,
    /// Every source track kept, replaced or dropped
    TracksResolved,
    /// Tracks appended and report produced
    Completed,
    /// Stopped by an unrecoverable error
    Failed,
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct CleanPlaylistReport {
    /// Id of the playlist that was read
    pub source_id: String,
    /// Name of the playlist that was read
    pub source_name: String,
    /// Id of the created playlist
    pub destination_id: String,
    /// Name of the created playlist
    pub destination_name: String,
    /// Tracks that were already clean
    pub kept: usize,
    /// Explicit tracks swapped for a clean version
    pub replaced: usize,
    /// Explicit tracks left out for lack of a clean version
    pub unresolved: Vec<Track>,
    /// Track ids added to the destination
    pub appended: usize,
}

/// Turns one playlist into a clean copy.
///
/// A workflow runs once: it ends in [`WorkflowState::Completed`] or
/// [`WorkflowState::Failed`], and both are final.
pub struct CleanPlaylistWorkflow<'a, C: ?Sized> {
    client: &'a C,
    observer: Observers<'a>,
    description: String,
    state: WorkflowState,
}

impl<'a, C> CleanPlaylistWorkflow<'a, C>
where
    C: Authenticator + CatalogSearch + PlaylistReader + PlaylistWriter + ?Sized,
{
    /// A workflow over `client` that logs through [`LoggingObserver`].
    pub fn new(client: &'a C) -> Self {
        CleanPlaylistWorkflow {
            client,
            observer: Observers::new().with(LoggingObserver),
            description: DEFAULT_DESCRIPTION.to_string(),
            state: WorkflowState::Unauthenticated,
        }
    }

    /// Adds an observer next to the built-in [`LoggingObserver`], which always
    /// stays in place.
    #[must_use]
    pub fn with_observer(mut self, observer: impl WorkflowObserver + 'a) -> Self {
        self.observer.push(observer);
        self
    }

    /// Overrides the description of the destination playlist.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Where the workflow currently is.
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Signs in, unless already signed in.
    pub async fn authenticate(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Unauthenticated => {}
            WorkflowState::Failed | WorkflowState::Completed => {
                return Err(WorkflowError::AlreadyFinished(self.state));
            }
            _ => return Ok(()),
        }
        let client = self.client;
        let started = self.begin(Stage::Authenticate);
        let result = client
            .authenticate()
            .await
            .map_err(WorkflowError::Authentication);
        self.finish(Stage::Authenticate, started, result)?;
        self.state = WorkflowState::Authenticated;
        Ok(())
    }

    /// Builds "<source name> (Clean)" from the playlist `source_id` and returns
    /// a report naming the new playlist.
    pub async fn run(&mut self, source_id: &str) -> Result<CleanPlaylistReport, WorkflowError> {
        self.authenticate().await?;
        match self.state {
            WorkflowState::Authenticated => {}
            WorkflowState::Completed | WorkflowState::Failed => {
                return Err(WorkflowError::AlreadyFinished(self.state));
            }
            state => return Err(WorkflowError::Interrupted(state)),
        }
        let client = self.client;

        let started = self.begin(Stage::FetchPlaylist);
        let result = fetch_playlist(client, source_id)
            .await
            .map_err(WorkflowError::PlaylistFetch);
        let source = self.finish(Stage::FetchPlaylist, started, result)?;
        self.observer.playlist_fetched(&source);
        self.state = WorkflowState::PlaylistFetched;

        let destination_name = format!("{}{CLEAN_SUFFIX}", source.name);
        let started = self.begin(Stage::CreatePlaylist);
        let result = client
            .create_playlist(&destination_name, &self.description)
            .await
            .map_err(WorkflowError::CreateDestination);
        let destination_id = self.finish(Stage::CreatePlaylist, started, result)?;
        self.state = WorkflowState::DestinationCreated;

        let started = self.begin(Stage::ResolveTracks);
        let mut track_ids = Vec::with_capacity(source.len());
        let (mut kept, mut replaced, mut unresolved) = (0, 0, Vec::new());
        for track in source.tracks() {
            if track.is_clean() {
                track_ids.push(track.id.clone());
                kept += 1;
                continue;
            }
            match find_clean(client, track).await {
                Some(clean) => {
                    self.observer.track_replaced(track, &clean);
                    track_ids.push(clean.id);
                    replaced += 1;
                }
                None => {
                    self.observer.track_unresolved(track);
                    unresolved.push(track.clone());
                }
            }
        }
        self.finish(Stage::ResolveTracks, started, Ok(()))?;
        self.state = WorkflowState::TracksResolved;

        let mut appended = 0;
        if !track_ids.is_empty() {
            let started = self.begin(Stage::AppendTracks);
            let observer = &mut self.observer;
            let result = append_in_chunks(client, &destination_id, &track_ids, |range| {
                observer.chunk_appended(range);
            })
            .await;
            appended = self.finish(Stage::AppendTracks, started, result)?;
        }
        self.state = WorkflowState::Completed;

        Ok(CleanPlaylistReport {
            source_id: source.id,
            source_name: source.name,
            destination_id,
            destination_name,
            kept,
            replaced,
            unresolved,
            appended,
        })
    }

    fn begin(&mut self, stage: Stage) -> Instant {
        self.observer.stage_started(stage);
        Instant::now()
    }

    fn finish<T>(
        &mut self,
        stage: Stage,
        started: Instant,
        result: Result<T, WorkflowError>,
    ) -> Result<T, WorkflowError> {
        self.observer
            .stage_finished(stage, started.elapsed(), result.as_ref().map(|_| ()));
        if result.is_err() {
            self.state = WorkflowState::Failed;
        }
        result
    }
}
