//! # Spotify Integration Module
//!
//! This module is the only place that talks to the Spotify accounts service
//! and the Spotify Web API. Everything above it goes through the
//! [`SpotifyApi`] trait, which lets the auth service and the album library
//! be exercised against an in-process fake.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers (api)
//!          ↓
//! Auth service / Album library
//!          ↓
//! SpotifyApi (trait)  ── HttpSpotify (reqwest)
//!          ↓
//! accounts.spotify.com / api.spotify.com
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication Module
//!
//! [`auth`] - Authorization-code flow with a client secret:
//! - **Authorize URL**: Fixed scope set, built from configuration alone
//! - **Code Exchange**: Trades the callback code for access and refresh tokens
//! - **Refresh**: Trades the refresh token for a new access token
//!
//! ### Library Module
//!
//! [`library`] - Saved-album retrieval:
//! - **Offset Pagination**: Pages of 50, fetched sequentially in upstream order
//! - **Strict Decode**: Records missing an artist, artwork or tracks are dropped
//!
//! ## Error Types
//!
//! Upstream failures are converted at this boundary into the crate's
//! [`Error`](crate::Error) variants: [`Error::AuthExchange`](crate::Error::AuthExchange),
//! [`Error::Refresh`](crate::Error::Refresh) and
//! [`Error::LibraryFetch`](crate::Error::LibraryFetch). None of the calls retry.

pub mod auth;
pub mod library;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    Res,
    config::Config,
    types::{SavedAlbumsPage, TokenGrant},
};

/// The upstream calls the backend depends on.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Exchanges an authorization code for a token grant.
    async fn exchange_code(&self, code: &str) -> Res<TokenGrant>;

    /// Mints a new access token from a refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Res<TokenGrant>;

    /// Fetches one page of the user's saved albums.
    async fn saved_albums(&self, access_token: &str, limit: u32, offset: u64)
    -> Res<SavedAlbumsPage>;
}

/// [`SpotifyApi`] over HTTP.
#[derive(Clone)]
pub struct HttpSpotify {
    client: Client,
    config: Arc<Config>,
}

impl HttpSpotify {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl SpotifyApi for HttpSpotify {
    async fn exchange_code(&self, code: &str) -> Res<TokenGrant> {
        auth::exchange_code(&self.client, &self.config, code).await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Res<TokenGrant> {
        auth::refresh_token(&self.client, &self.config, refresh_token).await
    }

    async fn saved_albums(
        &self,
        access_token: &str,
        limit: u32,
        offset: u64,
    ) -> Res<SavedAlbumsPage> {
        library::get_saved_albums_page(&self.client, &self.config, access_token, limit, offset)
            .await
    }
}
