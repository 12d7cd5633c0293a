//! Observation hooks for the clean-playlist workflow.
//!
//! The workflow reports what it does to a [`WorkflowObserver`]; observers never
//! change the outcome of a run.

use std::fmt;
use std::ops::Range;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::clients::entities::{Playlist, Track};
use crate::clients::errors::WorkflowError;

/// Steps of a run that are timed and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Signing in
    Authenticate,
    /// Reading the source playlist
    FetchPlaylist,
    /// Creating the destination playlist
    CreatePlaylist,
    /// Looking up clean versions
    ResolveTracks,
    /// Adding tracks to the destination
    AppendTracks,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Authenticate => "authentication",
            Stage::FetchPlaylist => "playlist fetch",
            Stage::CreatePlaylist => "playlist creation",
            Stage::ResolveTracks => "track resolution",
            Stage::AppendTracks => "track append",
        };
        f.write_str(name)
    }
}

/// Receives workflow events. Every method defaults to doing nothing.
pub trait WorkflowObserver {
    /// A stage is about to run.
    fn stage_started(&mut self, _stage: Stage) {}

    /// A stage ended after `elapsed`, with its outcome.
    fn stage_finished(
        &mut self,
        _stage: Stage,
        _elapsed: Duration,
        _outcome: Result<(), &WorkflowError>,
    ) {
    }

    /// The whole source playlist was read.
    fn playlist_fetched(&mut self, _playlist: &Playlist) {}

    /// An explicit track will be replaced by a clean version.
    fn track_replaced(&mut self, _original: &Track, _replacement: &Track) {}

    /// No clean version exists for an explicit track; it is left out.
    fn track_unresolved(&mut self, _track: &Track) {}

    /// `range` is the zero-based span of ids appended by one call.
    fn chunk_appended(&mut self, _range: Range<usize>) {}
}

/// Writes every event to the `log` facade.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl WorkflowObserver for LoggingObserver {
    fn stage_started(&mut self, stage: Stage) {
        debug!("Starting {stage} ...");
    }

    fn stage_finished(
        &mut self,
        stage: Stage,
        elapsed: Duration,
        outcome: Result<(), &WorkflowError>,
    ) {
        match outcome {
            Ok(()) => info!("Finished {stage} in {elapsed:.2?}"),
            Err(e) => match std::error::Error::source(e) {
                Some(cause) => error!("{e} after {elapsed:.2?}: {cause}"),
                None => error!("{e} after {elapsed:.2?}"),
            },
        }
    }

    fn playlist_fetched(&mut self, playlist: &Playlist) {
        info!("Fetched playlist {playlist}");
    }

    fn track_replaced(&mut self, original: &Track, replacement: &Track) {
        debug!("Replacing {original} with {replacement} [{}]", replacement.id);
    }

    fn track_unresolved(&mut self, track: &Track) {
        warn!("No clean version found for: {track}");
    }

    fn chunk_appended(&mut self, range: Range<usize>) {
        debug!("Appended tracks {}..{}", range.start, range.end);
    }
}

/// Fans each event out to a list of observers, in order.
#[derive(Default)]
pub struct Observers<'a>(Vec<Box<dyn WorkflowObserver + 'a>>);

impl<'a> Observers<'a> {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds `observer` after the ones already in the list.
    #[must_use]
    pub fn with(mut self, observer: impl WorkflowObserver + 'a) -> Self {
        self.push(observer);
        self
    }

    /// Adds `observer` after the ones already in the list.
    pub fn push(&mut self, observer: impl WorkflowObserver + 'a) {
        self.0.push(Box::new(observer));
    }

    /// Number of observers in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list has no observers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl WorkflowObserver for Observers<'_> {
    fn stage_started(&mut self, stage: Stage) {
        for o in &mut self.0 {
            o.stage_started(stage);
        }
    }

    fn stage_finished(
        &mut self,
        stage: Stage,
        elapsed: Duration,
        outcome: Result<(), &WorkflowError>,
    ) {
        for o in &mut self.0 {
            o.stage_finished(stage, elapsed, outcome);
        }
    }

    fn playlist_fetched(&mut self, playlist: &Playlist) {
        for o in &mut self.0 {
            o.playlist_fetched(playlist);
        }
    }

    fn track_replaced(&mut self, original: &Track, replacement: &Track) {
        for o in &mut self.0 {
            o.track_replaced(original, replacement);
        }
    }

    fn track_unresolved(&mut self, track: &Track) {
        for o in &mut self.0 {
            o.track_unresolved(track);
        }
    }

    fn chunk_appended(&mut self, range: Range<usize>) {
        for o in &mut self.0 {
            o.chunk_appended(range.clone());
        }
    }
}
