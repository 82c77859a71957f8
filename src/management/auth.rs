use std::{collections::HashMap, future::Future, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::{
    Error, Res,
    config::Config,
    info,
    management::SessionStore,
    spotify::{SpotifyApi, auth},
    success,
    types::{AccessToken, SessionData, TokenState},
    utils, warning,
};

/// Sliding lifetime of a session: every authenticated request extends it.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Result of a successful authorization callback.
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub session_id: String,
    pub redirect_to: String,
}

/// Owns the server-side sessions and the token lifecycle inside them.
///
/// Session ids arrive from the cookie; they are hashed with the session
/// secret before touching the store, so the store never sees a usable id.
///
/// Operations on one session run one at a time: a logout waits for an
/// in-flight refresh of the same session and then removes what it saved.
pub struct AuthService {
    config: Arc<Config>,
    store: Arc<dyn SessionStore>,
    spotify: Arc<dyn SpotifyApi>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AuthService {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn SessionStore>,
        spotify: Arc<dyn SpotifyApi>,
    ) -> Self {
        AuthService {
            config,
            store,
            spotify,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn authorization_url(&self) -> Res<String> {
        auth::authorize_url(&self.config)
    }

    /// Exchanges the callback code and opens a fresh session for it.
    ///
    /// A new session id is minted on every login, so an id handed out before
    /// login can never be promoted to an authenticated one.
    pub async fn handle_callback(&self, code: &str) -> Res<CallbackOutcome> {
        let grant = self.spotify.exchange_code(code).await?;
        let refresh_token = grant
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::AuthExchange("no refresh token granted".to_string()))?;

        let now = Utc::now();
        let session = SessionData {
            refresh_token,
            access_token: grant.access_token.clone(),
            expires_at: grant.expires_at(now),
            last_seen: now,
        };

        let session_id = utils::generate_session_id();
        self.store.save(&self.key(&session_id), &session).await?;
        success!(
            "Session established, access token valid until {}",
            session.expires_at.to_rfc3339()
        );

        Ok(CallbackOutcome {
            session_id,
            redirect_to: self.config.player_url(),
        })
    }

    /// Returns the session's access token, refreshing it first if it lapsed.
    ///
    /// `Ok(None)` means unauthenticated: no cookie, an unknown or aged-out
    /// session, or a session without a refresh credential.
    ///
    /// # Errors
    ///
    /// [`Error::Refresh`] if upstream rejects the refresh; the session is left
    /// as it was, still expired.
    pub async fn current_token(&self, session_id: Option<&str>) -> Res<Option<AccessToken>> {
        let Some(key) = self.key_for(session_id) else {
            return Ok(None);
        };
        self.exclusive(&key, || self.load_and_refresh(&key)).await
    }

    async fn load_and_refresh(&self, key: &str) -> Res<Option<AccessToken>> {
        let now = Utc::now();
        let Some(mut session) = self.load_live(key, now).await? else {
            return Ok(None);
        };

        match session.token_state(now) {
            TokenState::Absent => return Ok(None),
            TokenState::Expired => {
                let grant = self
                    .spotify
                    .refresh_token(&session.refresh_token)
                    .await
                    .map_err(|e| match e {
                        Error::Refresh(msg) => Error::Refresh(msg),
                        other => Error::Refresh(other.to_string()),
                    })?;

                session.access_token = grant.access_token.clone();
                session.expires_at = grant.expires_at(now);
                if let Some(rotated) = grant.refresh_token.filter(|t| !t.is_empty()) {
                    session.refresh_token = rotated;
                }
                info!(
                    "Refreshed access token, valid until {}",
                    session.expires_at.to_rfc3339()
                );
            }
            _ => {}
        }

        session.last_seen = now;
        self.store.save(key, &session).await?;
        Ok(Some(session.access_token()))
    }

    /// Destroys the session. Never fails from the caller's point of view.
    pub async fn logout(&self, session_id: Option<&str>) {
        let Some(key) = self.key_for(session_id) else {
            return;
        };
        let result = self.exclusive(&key, || self.store.destroy(&key)).await;
        if let Err(e) = result {
            warning!("Failed to destroy session: {}", e);
        }
    }

    /// Runs `op` while holding the lock of session `key`.
    async fn exclusive<F, Fut, T>(&self, key: &str, op: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(key.to_string()).or_default())
        };

        let result = {
            let _guard = lock.lock().await;
            op().await
        };

        // clones are only taken under the map lock, so the count is stable here
        let mut locks = self.locks.lock().await;
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
        result
    }

    fn key(&self, session_id: &str) -> String {
        utils::session_key(&self.config.session_secret, session_id)
    }

    fn key_for(&self, session_id: Option<&str>) -> Option<String> {
        session_id
            .filter(|id| utils::is_valid_session_id(id))
            .map(|id| self.key(id))
    }

    async fn load_live(&self, key: &str, now: DateTime<Utc>) -> Res<Option<SessionData>> {
        let Some(session) = self.store.load(key).await? else {
            return Ok(None);
        };

        if now - session.last_seen > Duration::days(SESSION_TTL_DAYS) {
            self.store.destroy(key).await?;
            return Ok(None);
        }
        Ok(Some(session))
    }
}
