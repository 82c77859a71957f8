#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use albumshuffle::{
    Error, Res,
    config::{Config, Environment, SessionStoreKind},
    management::MemorySessionStore,
    server::AppState,
    spotify::SpotifyApi,
    types::{SavedAlbumsPage, TokenGrant},
};
use async_trait::async_trait;
use serde_json::{Value, json};

pub const GOOD_CODE: &str = "good-code";

/// Upstream double: a library of `library_size` albums served in pages.
#[derive(Default)]
pub struct FakeSpotify {
    pub library_size: u64,
    /// Lifetime of granted access tokens; 0 makes every token lapse at once.
    pub expires_in: u64,
    pub reject_refresh: bool,
    pub fail_at_offset: Option<u64>,
    pub refreshes: AtomicUsize,
    pub requested_offsets: Mutex<Vec<u64>>,
    pub seen_tokens: Mutex<Vec<String>>,
}

impl FakeSpotify {
    pub fn with_library(library_size: u64) -> Self {
        FakeSpotify {
            library_size,
            expires_in: 3600,
            ..Default::default()
        }
    }

    pub fn offsets(&self) -> Vec<u64> {
        self.requested_offsets.lock().unwrap().clone()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

pub fn saved_album(i: u64) -> Value {
    json!({
        "added_at": "2021-03-01T12:00:00Z",
        "album": {
            "name": format!("Album {i}"),
            "artists": [{ "name": format!("Artist {i}") }],
            "images": [{ "url": format!("https://i.scdn.co/image/{i}") }],
            "tracks": { "items": [
                { "uri": format!("spotify:track:{i}-1") },
                { "uri": format!("spotify:track:{i}-2") }
            ] }
        }
    })
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn exchange_code(&self, code: &str) -> Res<TokenGrant> {
        if code != GOOD_CODE {
            return Err(Error::AuthExchange("invalid_grant".into()));
        }
        Ok(TokenGrant {
            access_token: "access-0".into(),
            refresh_token: Some("refresh-0".into()),
            expires_in: self.expires_in,
            scope: None,
        })
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Res<TokenGrant> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.reject_refresh {
            return Err(Error::Refresh("invalid_grant".into()));
        }
        Ok(TokenGrant {
            access_token: format!("access-{n}"),
            refresh_token: None,
            expires_in: 3600,
            scope: None,
        })
    }

    async fn saved_albums(
        &self,
        access_token: &str,
        limit: u32,
        offset: u64,
    ) -> Res<SavedAlbumsPage> {
        self.requested_offsets.lock().unwrap().push(offset);
        self.seen_tokens.lock().unwrap().push(access_token.to_string());
        if self.fail_at_offset == Some(offset) {
            return Err(Error::LibraryFetch("503 Service Unavailable".into()));
        }

        let end = (offset + limit as u64).min(self.library_size);
        Ok(SavedAlbumsPage {
            total: self.library_size,
            items: (offset..end).map(saved_album).collect(),
        })
    }
}

pub fn test_config() -> Config {
    Config {
        client_id: "client".into(),
        client_secret: "secret".into(),
        redirect_uri: "http://localhost:5000/api/auth/callback".into(),
        session_secret: "pepper".into(),
        session_store: SessionStoreKind::Memory,
        environment: Environment::Development,
        client_base_url: "http://localhost:3000".into(),
        server_address: "127.0.0.1:0".into(),
        auth_url: "https://accounts.example/authorize".into(),
        token_url: "https://accounts.example/api/token".into(),
        api_url: "https://api.example/v1".into(),
    }
}

pub fn app_state(spotify: Arc<FakeSpotify>) -> AppState {
    AppState::new(test_config(), Arc::new(MemorySessionStore::new()), spotify)
}
