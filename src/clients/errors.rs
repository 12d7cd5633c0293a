use rspotify::ClientError;
use rspotify::model::IdError;
use thiserror::Error;

use crate::workflow::WorkflowState;

/// Result alias defaulting to the client [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures of the remote client, configuration and terminal I/O.
#[derive(Error, Debug)]
pub enum Error {
    /// The Spotify API or its OAuth flow returned an error.
    #[error("Spotify error: {0}")]
    SpotifyError(#[from] ClientError),

    /// A playlist or track id could not be parsed.
    #[error("Invalid Spotify id: {0}")]
    InvalidId(#[from] IdError),

    /// The API answered with something the client cannot use.
    #[error("Spotify API unexpected response: {0}")]
    UnexpectedResponse(String),

    /// More ids than one append call accepts.
    #[error("Batch of {0} tracks exceeds the append limit")]
    BatchTooLarge(usize),

    /// Missing or invalid settings.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Reading from or writing to the terminal failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Terminal failures of the clean-playlist workflow, one per stage that can fail.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Signing in to the remote service failed.
    #[error("authentication failed")]
    Authentication(#[source] Error),

    /// The source playlist could not be read.
    #[error("playlist fetch failed")]
    PlaylistFetch(#[source] Error),

    /// The destination playlist could not be created.
    #[error("could not create destination playlist")]
    CreateDestination(#[source] Error),

    #[error("could not add tracks to playlist {playlist_id} ({appended} added before the failure)")]
    /// An append call failed after `appended` ids were already added.
    Append {
        /// Destination playlist, left partly filled
        playlist_id: String,
        /// Ids appended before the failing call
        appended: usize,
        /// Error of the failing call
        #[source]
        source: Error,
    },

    /// The workflow already ended in a final state.
    #[error("workflow already finished in state {0:?}")]
    AlreadyFinished(WorkflowState),

    /// An earlier run was dropped before it ended.
    #[error("workflow was interrupted in state {0:?} and cannot run again")]
    Interrupted(WorkflowState),
}
