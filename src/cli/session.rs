use crate::{
    api::cookies::SESSION_COOKIE_NAME,
    error, info,
    management::ClientStateStore,
    player::ApiClient,
    success, warning,
};

/// Opens the Spotify login in the browser.
///
/// The backend finishes the login in the browser and hands it the session
/// cookie; the terminal player reads that value from `ALBUMSHUFFLE_SESSION`.
pub async fn login() {
    let client = ApiClient::from_env();
    let auth_url = match client.auth_url().await {
        Ok(url) => url,
        Err(e) => error!("Cannot reach the backend at {}: {}", client.base_url(), e),
    };

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    info!(
        "After logging in, copy the {} cookie from the browser and export it:\n    export ALBUMSHUFFLE_SESSION=<value>",
        SESSION_COOKIE_NAME
    );
}

/// Ends the backend session and forgets the local queue.
pub async fn logout() {
    let client = ApiClient::from_env();
    if client.has_session() {
        match client.logout().await {
            Ok(()) => success!("Logged out"),
            Err(e) => warning!("Backend logout failed: {}", e),
        }
    } else {
        info!("No session configured, nothing to log out from");
    }

    let store = ClientStateStore::default_location();
    if let Err(e) = store.clear().await {
        warning!("Failed to remove {}: {}", store.path().display(), e);
    }
}
