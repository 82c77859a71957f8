use reqwest::Client;

use crate::{
    Error, Res,
    config::Config,
    spotify::SpotifyApi,
    types::{Album, SavedAlbumItem, SavedAlbumsPage},
    warning,
};

/// Upstream page size for `GET /me/albums`.
pub const PAGE_SIZE: u32 = 50;

/// Retrieves a page of saved albums from the Spotify Web API.
///
/// # Arguments
///
/// * `token` - Valid access token for Spotify API authentication
/// * `limit` - Number of albums in this page (1-50)
/// * `offset` - Index of the first album of the page
///
/// # Errors
///
/// Returns [`Error::LibraryFetch`] for network failures, non-success statuses
/// and page bodies that do not decode.
pub async fn get_saved_albums_page(
    client: &Client,
    config: &Config,
    token: &str,
    limit: u32,
    offset: u64,
) -> Res<SavedAlbumsPage> {
    let api_url = format!(
        "{uri}/me/albums?limit={limit}&offset={offset}",
        uri = &config.api_url,
        limit = limit,
        offset = offset
    );

    let response = client
        .get(&api_url)
        .bearer_auth(token)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|e| Error::LibraryFetch(e.to_string()))?;

    response
        .json::<SavedAlbumsPage>()
        .await
        .map_err(|e| Error::LibraryFetch(e.to_string()))
}

/// Collects the complete saved-album library.
///
/// The first page (offset 0) tells how many albums there are; the remaining
/// pages are requested one after another with the offset advancing by
/// [`PAGE_SIZE`] until `total` is covered. Items keep upstream order.
///
/// # Errors
///
/// Any failed page fails the whole fetch with [`Error::LibraryFetch`]; no
/// partial library is returned.
pub async fn fetch_saved_albums(api: &dyn SpotifyApi, token: &str) -> Res<Vec<Album>> {
    let first = api
        .saved_albums(token, PAGE_SIZE, 0)
        .await
        .map_err(|e| page_error(0, e))?;

    let total = first.total;
    let mut items = first.items;
    let mut offset = PAGE_SIZE as u64;

    while offset < total {
        let page = api
            .saved_albums(token, PAGE_SIZE, offset)
            .await
            .map_err(|e| page_error(offset, e))?;
        items.extend(page.items);
        offset += PAGE_SIZE as u64;
    }

    Ok(normalize(items))
}

/// Decodes raw saved-album records, dropping the ones that do not fit.
pub fn normalize(items: Vec<serde_json::Value>) -> Vec<Album> {
    let mut quarantined = 0;
    let albums: Vec<Album> = items
        .into_iter()
        .filter_map(|raw| {
            let decoded = serde_json::from_value::<SavedAlbumItem>(raw)
                .map_err(|e| e.to_string())
                .and_then(Album::try_from);
            match decoded {
                Ok(album) => Some(album),
                Err(reason) => {
                    quarantined += 1;
                    warning!("Skipping saved album: {}", reason);
                    None
                }
            }
        })
        .collect();

    if quarantined > 0 {
        warning!("{} saved album(s) could not be used", quarantined);
    }
    albums
}

fn page_error(offset: u64, err: Error) -> Error {
    match err {
        Error::LibraryFetch(msg) => Error::LibraryFetch(format!("page at offset {offset}: {msg}")),
        other => Error::LibraryFetch(format!("page at offset {offset}: {other}")),
    }
}
