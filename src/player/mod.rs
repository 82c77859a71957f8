//! # Player Module
//!
//! The client side of Album Shuffle: everything the player needs apart from
//! the playback widget itself.
//!
//! - [`QueueController`] - the shuffled album list, the cursor into it and
//!   the two-album window handed to the widget
//! - [`TokenKeeper`] - keeps an access token fresh with a heartbeat and an
//!   expiry watcher
//! - [`Cached`] - the staleness policy shared by both
//! - [`ApiClient`] - talks to the backend with the session cookie and backs
//!   the [`AlbumSource`] and [`TokenSource`] seams
//!
//! The seams let the controller and the keeper run against fakes in tests.

pub mod cache;
pub mod client;
pub mod queue;
pub mod token;

pub use cache::Cached;
pub use client::ApiClient;
pub use queue::{AlbumSource, LIBRARY_STALE_HOURS, LOOKAHEAD_ALBUMS, QueueController, QueueWindow};
pub use token::{HEARTBEAT_INTERVAL, TokenKeeper, TokenSource};
