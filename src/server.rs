use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower_http::cors::CorsLayer;

use crate::{
    Error, Res, api,
    config::{Config, SessionStoreKind},
    info,
    management::{AuthService, FileSessionStore, MemorySessionStore, SessionStore},
    spotify::{HttpSpotify, SpotifyApi},
    warning,
};

/// Everything a request handler can reach.
///
/// Built once at startup and cloned into each request; the session store
/// and the upstream client live behind the [`AuthService`] and the
/// [`SpotifyApi`] seam.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<AuthService>,
    pub spotify: Arc<dyn SpotifyApi>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn SessionStore>, spotify: Arc<dyn SpotifyApi>) -> Self {
        let config = Arc::new(config);
        let auth = Arc::new(AuthService::new(
            Arc::clone(&config),
            store,
            Arc::clone(&spotify),
        ));
        AppState {
            config,
            auth,
            spotify,
        }
    }

    /// Wires the configured session store and the real Spotify client.
    pub fn from_config(config: Config) -> Res<Self> {
        let store: Arc<dyn SessionStore> = match &config.session_store {
            SessionStoreKind::Memory => {
                warning!("Sessions are kept in memory and will not survive a restart");
                Arc::new(MemorySessionStore::new())
            }
            SessionStoreKind::Directory(dir) => {
                info!("Sessions are stored in {}", dir.display());
                Arc::new(FileSessionStore::new(dir.clone()))
            }
        };
        let spotify = Arc::new(HttpSpotify::new(Arc::new(config.clone())));
        Ok(Self::new(config, store, spotify))
    }
}

pub fn router(state: AppState) -> Router {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/api/auth", get(api::auth_url))
        .route("/api/auth/callback", get(api::callback))
        .route("/api/auth/token", get(api::token))
        .route("/api/auth/logout", get(api::logout))
        .route("/api/albums", get(api::albums));

    let app = match HeaderValue::from_str(&state.config.client_base_url) {
        Ok(origin) => app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET])
                .allow_credentials(true),
        ),
        Err(_) => {
            warning!(
                "CLIENT_BASE_URL '{}' is not a valid origin, CORS disabled",
                state.config.client_base_url
            );
            app
        }
    };

    app.with_state(state)
}

pub async fn start_api_server(state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(&state.config.server_address).map_err(|e| {
        Error::Config(format!(
            "failed to parse server address '{}': {e}",
            state.config.server_address
        ))
    })?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Listening on http://{}, players are sent to {}",
        addr,
        state.config.player_url()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                warning!("Cannot listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("Server stopped");
    Ok(())
}
