use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    Error, Res,
    api::cookies::{self, build_clear_cookie, build_session_cookie, session_max_age},
    info,
    server::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// `GET /api/auth`
pub async fn auth_url(State(state): State<AppState>) -> Res<Json<String>> {
    Ok(Json(state.auth.authorization_url()?))
}

/// `GET /api/auth/callback?code=...`
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Res<Response> {
    if let Some(reason) = params.error {
        return Err(Error::AuthExchange(format!("authorization denied: {reason}")));
    }
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return Err(Error::MissingCode);
    };

    let outcome = state.auth.handle_callback(&code).await?;
    let cookie = build_session_cookie(
        &outcome.session_id,
        session_max_age(),
        state.config.is_production(),
    );

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&outcome.redirect_to)).into_response())
}

/// `GET /api/auth/token`
pub async fn token(State(state): State<AppState>, headers: HeaderMap) -> Res<Response> {
    let session_id = cookies::session_id(&headers);
    let token = state
        .auth
        .current_token(session_id.as_deref())
        .await?
        .ok_or(Error::Unauthenticated)?;

    Ok(with_sliding_cookie(&state, session_id.as_deref(), Json(token)))
}

/// `GET /api/auth/logout`
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session_id = cookies::session_id(&headers);
    state.auth.logout(session_id.as_deref()).await;
    if session_id.is_some() {
        info!("Session closed");
    }

    [(header::SET_COOKIE, build_clear_cookie(state.config.is_production()))].into_response()
}

/// Re-issues the session cookie so its 30 days count from this request.
pub(crate) fn with_sliding_cookie(
    state: &AppState,
    session_id: Option<&str>,
    body: impl IntoResponse,
) -> Response {
    let mut response = body.into_response();
    if let Some(id) = session_id {
        let cookie = build_session_cookie(id, session_max_age(), state.config.is_production());
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}
