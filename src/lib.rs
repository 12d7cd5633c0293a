//! Cleanlist - build clean copies of Spotify playlists
//!
//! This library reads a playlist, keeps its clean tracks, swaps explicit tracks
//! for clean versions found through catalog search, and writes the result to a
//! new playlist.

/// Client modules for interacting with the remote music service
pub mod clients;
/// Configuration loaded from overrides and the environment
pub mod config;
/// Observation hooks for logging and progress output
pub mod observer;
/// The clean-playlist workflow and its operations
pub mod workflow;
