use axum::{Json, extract::State, http::HeaderMap, response::Response};

use crate::{
    Error, Res,
    api::{auth::with_sliding_cookie, cookies},
    info,
    server::AppState,
    spotify::library,
};

/// `GET /api/albums`
///
/// Answers with the complete saved-album library in upstream order. The
/// token is taken through the auth service, so a lapsed one is refreshed
/// before it reaches Spotify.
pub async fn albums(State(state): State<AppState>, headers: HeaderMap) -> Res<Response> {
    let session_id = cookies::session_id(&headers);
    let token = state
        .auth
        .current_token(session_id.as_deref())
        .await?
        .ok_or(Error::Unauthenticated)?;

    let albums = library::fetch_saved_albums(state.spotify.as_ref(), &token.value).await?;
    info!("Serving {} saved albums", albums.len());

    Ok(with_sliding_cookie(&state, session_id.as_deref(), Json(albums)))
}
