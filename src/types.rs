use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Access credential handed to the player client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Time left until the credential lapses; `None` once it has.
    pub fn expires_in(&self, now: DateTime<Utc>) -> Option<std::time::Duration> {
        (self.expires_at - now).to_std().ok()
    }
}

/// Where a credential sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Absent,
    Valid,
    Expired,
    Refreshing,
}

/// Token endpoint response, for both the code exchange and the refresh grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenGrant {
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::seconds(self.expires_in as i64)
    }
}

/// Server-side session row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub refresh_token: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl SessionData {
    pub fn access_token(&self) -> AccessToken {
        AccessToken {
            value: self.access_token.clone(),
            expires_at: self.expires_at,
        }
    }

    pub fn token_state(&self, now: DateTime<Utc>) -> TokenState {
        if self.refresh_token.is_empty() {
            TokenState::Absent
        } else if now > self.expires_at {
            TokenState::Expired
        } else {
            TokenState::Valid
        }
    }
}

/// Normalized album as served by `/api/albums`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub name: String,
    pub artist: String,
    pub artwork_url: String,
    pub uris: Vec<String>,
}

/// One page of `GET /me/albums`.
///
/// Items stay undecoded here so a single malformed record can be dropped
/// without failing the whole page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAlbumsPage {
    pub total: u64,
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAlbumItem {
    pub album: UpstreamAlbum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamAlbum {
    pub name: String,
    pub artists: Vec<UpstreamArtist>,
    pub images: Vec<UpstreamImage>,
    pub tracks: UpstreamTracks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamImage {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamTracks {
    pub items: Vec<UpstreamTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamTrack {
    pub uri: String,
}

impl TryFrom<SavedAlbumItem> for Album {
    type Error = String;

    fn try_from(item: SavedAlbumItem) -> Result<Self, Self::Error> {
        let album = item.album;
        let artist = album
            .artists
            .into_iter()
            .next()
            .ok_or_else(|| format!("album '{}' has no artists", album.name))?;
        let image = album
            .images
            .into_iter()
            .next()
            .ok_or_else(|| format!("album '{}' has no artwork", album.name))?;
        let uris: Vec<String> = album.tracks.items.into_iter().map(|t| t.uri).collect();
        if uris.is_empty() {
            return Err(format!("album '{}' has no tracks", album.name));
        }

        Ok(Album {
            name: album.name,
            artist: artist.name,
            artwork_url: image.url,
            uris,
        })
    }
}

/// Client-side queue state that survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackQueueState {
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(default)]
    pub queue_index: usize,
    #[serde(default)]
    pub seen_mobile_notice: bool,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Tabled)]
pub struct QueueTableRow {
    pub position: String,
    pub name: String,
    pub artist: String,
    pub tracks: usize,
}
