//! Configuration management for Album Shuffle.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. The backend reads everything once into a
//! [`Config`] value which is then handed to the server state; the player
//! client only needs the backend URL and its session cookie.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf};

use crate::{Error, Res};

pub const APP_NAMESPACE: &str = "albumshuffle";

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_PLAYER_SERVER_URL: &str = "http://localhost:5000";
pub const PRODUCTION_CLIENT_URL: &str = "https://spotifyalbumshuffle.com";
pub const DEVELOPMENT_CLIENT_URL: &str = "http://localhost:3000";

pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Deployment environment, selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Where the backend keeps its sessions, selected by `SESSION_STORE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreKind {
    Memory,
    Directory(PathBuf),
}

/// Backend configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub session_secret: String,
    pub session_store: SessionStoreKind,
    pub environment: Environment,
    pub client_base_url: String,
    pub server_address: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl Config {
    /// Reads the backend configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first required variable that is
    /// missing or empty: `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`,
    /// `SPOTIFY_REDIRECT_URI` or `SESSION_SECRET`.
    pub fn from_env() -> Res<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| Error::Config(format!("{key} must be set")))
        };

        let environment = match get("APP_ENV").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let client_base_url = get("CLIENT_BASE_URL")
            .unwrap_or_else(|| match environment {
                Environment::Production => PRODUCTION_CLIENT_URL.to_string(),
                Environment::Development => DEVELOPMENT_CLIENT_URL.to_string(),
            })
            .trim_end_matches('/')
            .to_string();

        let session_store = match get("SESSION_STORE") {
            Some(v) if v == "memory" => SessionStoreKind::Memory,
            Some(dir) => SessionStoreKind::Directory(PathBuf::from(dir)),
            None => SessionStoreKind::Directory(data_dir().join("sessions")),
        };

        Ok(Config {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_REDIRECT_URI")?,
            session_secret: required("SESSION_SECRET")?,
            session_store,
            environment,
            client_base_url,
            server_address: get("SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
            auth_url: get("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| SPOTIFY_AUTH_URL.to_string()),
            token_url: get("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| SPOTIFY_TOKEN_URL.to_string()),
            api_url: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| SPOTIFY_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// The page the authorization callback sends the browser to.
    pub fn player_url(&self) -> String {
        format!("{}/player", self.client_base_url)
    }
}

/// Loads environment variables from `.env` files.
///
/// A `.env` in the working directory is read first, then the one in the
/// platform-specific local data directory under `albumshuffle/.env`; variables
/// that are already set are never overwritten. Missing files are skipped.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/albumshuffle/.env`
/// - macOS: `~/Library/Application Support/albumshuffle/.env`
/// - Windows: `%LOCALAPPDATA%/albumshuffle/.env`
///
/// # Errors
///
/// Fails only if the data directory cannot be created.
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    dotenv::dotenv().ok();
    dotenv::from_path(path).ok();
    Ok(())
}

/// Returns the application's local data directory.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_NAMESPACE);
    path
}

/// Returns the backend URL the player client talks to.
///
/// Read from `ALBUMSHUFFLE_SERVER_URL`, defaulting to the local backend.
pub fn player_server_url() -> String {
    env::var("ALBUMSHUFFLE_SERVER_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_PLAYER_SERVER_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Returns the session cookie value the player client presents, if any.
///
/// Read from `ALBUMSHUFFLE_SESSION`. The value is the `albumshuffle_sid`
/// cookie the browser received after logging in.
pub fn player_session() -> Option<String> {
    env::var("ALBUMSHUFFLE_SESSION")
        .ok()
        .filter(|v| !v.is_empty())
}
