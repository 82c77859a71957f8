use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header};

use crate::{
    Error, Res,
    api::cookies::SESSION_COOKIE_NAME,
    config,
    player::{AlbumSource, TokenSource},
    types::{AccessToken, Album},
};

/// HTTP client for the Album Shuffle backend.
///
/// The backend authenticates by its session cookie; the player presents the
/// value the browser was given after logging in.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Option<String>) -> Self {
        ApiClient {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Client for `ALBUMSHUFFLE_SERVER_URL` with the `ALBUMSHUFFLE_SESSION` cookie.
    pub fn from_env() -> Self {
        Self::new(config::player_server_url(), config::player_session())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(format!("{}{}", self.base_url, path));
        match &self.session {
            Some(session) => {
                request.header(header::COOKIE, format!("{SESSION_COOKIE_NAME}={session}"))
            }
            None => request,
        }
    }

    /// `GET /api/auth`: where to send the browser to log in.
    pub async fn auth_url(&self) -> Res<String> {
        let url = self
            .get("/api/auth")
            .send()
            .await?
            .error_for_status()?
            .json::<String>()
            .await?;
        Ok(url)
    }

    /// `GET /api/auth/logout`
    pub async fn logout(&self) -> Res<()> {
        self.get("/api/auth/logout")
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// `GET /api/albums`
    pub async fn albums(&self) -> Res<Vec<Album>> {
        let response = self
            .get("/api/albums")
            .send()
            .await
            .map_err(|e| Error::LibraryFetch(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthenticated);
        }

        response
            .error_for_status()
            .map_err(|e| Error::LibraryFetch(e.to_string()))?
            .json::<Vec<Album>>()
            .await
            .map_err(|e| Error::LibraryFetch(e.to_string()))
    }

    /// `GET /api/auth/token`, `None` when the backend has no session for us.
    pub async fn token(&self) -> Res<Option<AccessToken>> {
        let response = self.get("/api/auth/token").send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        let token = response.error_for_status()?.json::<AccessToken>().await?;
        Ok(Some(token))
    }
}

#[async_trait]
impl AlbumSource for ApiClient {
    async fn fetch_albums(&self) -> Res<Vec<Album>> {
        self.albums().await
    }
}

#[async_trait]
impl TokenSource for ApiClient {
    async fn fetch_token(&self) -> Res<Option<AccessToken>> {
        self.token().await
    }
}
