use std::{io::ErrorKind, path::PathBuf};

use crate::{Error, Res, config, types::PlaybackQueueState};

pub const STATE_TYPE_PLAYER: &str = "player";

/// Persists the player's queue state as JSON under the app's data dir.
#[derive(Debug, Clone)]
pub struct ClientStateStore {
    path: PathBuf,
}

impl ClientStateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<data_local_dir>/albumshuffle/state/player.json`
    pub fn default_location() -> Self {
        let mut path = config::data_dir();
        path.push(format!("state/{state}.json", state = STATE_TYPE_PLAYER));
        Self::new(path)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// `Ok(None)` when nothing has been persisted yet.
    pub async fn load(&self) -> Res<Option<PlaybackQueueState>> {
        let json = match async_fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };
        let state: PlaybackQueueState = serde_json::from_str(&json)?;
        Ok(Some(state))
    }

    pub async fn persist(&self, state: &PlaybackQueueState) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(state)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Res<()> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Album;

    #[tokio::test]
    async fn state_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = ClientStateStore::new(dir.path().join("state").join("player.json"));
        assert!(store.load().await.unwrap().is_none());

        let state = PlaybackQueueState {
            albums: vec![Album {
                name: "Kind of Blue".into(),
                artist: "Miles Davis".into(),
                artwork_url: "https://i.scdn.co/kob".into(),
                uris: vec!["spotify:track:so-what".into()],
            }],
            queue_index: 3,
            seen_mobile_notice: true,
            fetched_at: Some(chrono::Utc::now()),
        };
        store.persist(&state).await.unwrap();

        let reopened = ClientStateStore::new(store.path().clone());
        assert_eq!(reopened.load().await.unwrap(), Some(state));

        reopened.clear().await.unwrap();
        reopened.clear().await.unwrap();
        assert!(reopened.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn older_state_files_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");
        std::fs::write(&path, r#"{ "queue_index": 2 }"#).unwrap();

        let state = ClientStateStore::new(path).load().await.unwrap().unwrap();
        assert_eq!(state.queue_index, 2);
        assert!(state.albums.is_empty());
        assert!(!state.seen_mobile_notice);
    }
}
