use reqwest::{Client, Url};

use crate::{Error, Res, config::Config, types::TokenGrant};

/// Permission scopes requested at login.
pub const SCOPES: [&str; 7] = [
    "streaming",
    "user-read-email",
    "user-read-private",
    "user-library-read",
    "user-library-modify",
    "user-read-playback-state",
    "user-modify-playback-state",
];

/// Opaque `state` parameter echoed back by the authorize endpoint.
pub const AUTHORIZE_STATE: &str = "state";

/// Builds the Spotify authorization URL the user is sent to for login.
///
/// The URL carries the client id, the `code` response type, the registered
/// redirect URI and the fixed [`SCOPES`] set. Building it needs nothing but
/// configuration; no request is made.
///
/// # Errors
///
/// Returns [`Error::Config`] if the configured authorize endpoint is not a
/// valid URL.
///
/// # Example
///
/// ```
/// let url = authorize_url(&config)?;
/// assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
/// ```
pub fn authorize_url(config: &Config) -> Res<String> {
    let scope = SCOPES.join(" ");
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("state", AUTHORIZE_STATE),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid SPOTIFY_API_AUTH_URL: {e}")))?;

    Ok(url.to_string())
}

/// Exchanges an authorization code for an access token.
///
/// Completes the authorization-code flow by posting the code received on the
/// callback to the token endpoint, authenticated with the client id and
/// secret.
///
/// # Errors
///
/// Returns [`Error::AuthExchange`] for network failures, a non-success status
/// (an invalid or expired code yields `400 invalid_grant`), a response that
/// does not decode, or a grant without a refresh token.
pub async fn exchange_code(client: &Client, config: &Config, code: &str) -> Res<TokenGrant> {
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    let grant = request_token(client, config, &form)
        .await
        .map_err(Error::AuthExchange)?;

    if grant.refresh_token.as_deref().is_none_or(str::is_empty) {
        return Err(Error::AuthExchange(
            "token response carried no refresh token".to_string(),
        ));
    }

    Ok(grant)
}

/// Refreshes an expired access token using a refresh token.
///
/// The returned grant may or may not carry a rotated refresh token; callers
/// keep the old one when it does not.
///
/// # Errors
///
/// Returns [`Error::Refresh`] when the refresh token is rejected or the token
/// endpoint cannot be reached.
pub async fn refresh_token(
    client: &Client,
    config: &Config,
    refresh_token: &str,
) -> Res<TokenGrant> {
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];

    request_token(client, config, &form)
        .await
        .map_err(Error::Refresh)
}

async fn request_token(
    client: &Client,
    config: &Config,
    form: &[(&str, &str)],
) -> Result<TokenGrant, String> {
    let res = client
        .post(&config.token_url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .form(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(format!("token endpoint answered {status}: {body}"));
    }

    res.json::<TokenGrant>().await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, SessionStoreKind};

    fn config() -> Config {
        Config {
            client_id: "client-123".into(),
            client_secret: "secret".into(),
            redirect_uri: "http://localhost:5000/api/auth/callback".into(),
            session_secret: "pepper".into(),
            session_store: SessionStoreKind::Memory,
            environment: Environment::Development,
            client_base_url: "http://localhost:3000".into(),
            server_address: "127.0.0.1:0".into(),
            auth_url: crate::config::SPOTIFY_AUTH_URL.into(),
            token_url: crate::config::SPOTIFY_TOKEN_URL.into(),
            api_url: crate::config::SPOTIFY_API_URL.into(),
        }
    }

    #[test]
    fn authorize_url_carries_client_and_scopes() {
        let url = Url::parse(&authorize_url(&config()).unwrap()).unwrap();
        assert_eq!(url.host_str(), Some("accounts.spotify.com"));
        assert_eq!(url.path(), "/authorize");

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-123");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["redirect_uri"], "http://localhost:5000/api/auth/callback");
        assert_eq!(params["state"], AUTHORIZE_STATE);

        let scopes: Vec<&str> = params["scope"].split(' ').collect();
        assert_eq!(scopes, SCOPES.to_vec());
    }

    #[test]
    fn authorize_url_rejects_broken_endpoint() {
        let mut config = config();
        config.auth_url = "not a url".into();
        assert!(matches!(authorize_url(&config), Err(Error::Config(_))));
    }
}
