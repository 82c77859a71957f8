use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::Mutex;

use crate::{
    Error, Res,
    management::ClientStateStore,
    player::cache::Cached,
    types::{Album, PlaybackQueueState},
    utils, warning,
};

/// Albums handed to the player widget at once: the current one and the next.
pub const LOOKAHEAD_ALBUMS: usize = 2;

/// How long a fetched library is used before `ensure_loaded` fetches again.
pub const LIBRARY_STALE_HOURS: i64 = 24;

/// Where the queue gets its albums from.
#[async_trait]
pub trait AlbumSource: Send + Sync {
    async fn fetch_albums(&self) -> Res<Vec<Album>>;
}

/// Track URIs for the player widget, tagged with the list they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueWindow {
    pub generation: u64,
    pub uris: Vec<String>,
}

struct QueueInner {
    library: Cached<Vec<Album>>,
    queue_index: usize,
    /// Bumped whenever a reload replaces the list.
    generation: u64,
    loading: bool,
    seen_mobile_notice: bool,
}

impl QueueInner {
    fn albums(&self) -> &[Album] {
        self.library.peek().map(Vec::as_slice).unwrap_or(&[])
    }

    fn current(&self) -> Option<&Album> {
        self.albums().get(self.queue_index)
    }

    fn can_retreat(&self) -> bool {
        !self.loading && self.queue_index > 0
    }

    fn can_advance(&self) -> bool {
        !self.loading && self.queue_index + 1 < self.albums().len()
    }

    fn window(&self) -> Vec<String> {
        self.albums()
            .iter()
            .skip(self.queue_index)
            .take(LOOKAHEAD_ALBUMS)
            .flat_map(|album| album.uris.iter().cloned())
            .collect()
    }

    fn snapshot(&self) -> PlaybackQueueState {
        PlaybackQueueState {
            albums: self.albums().to_vec(),
            queue_index: self.queue_index,
            seen_mobile_notice: self.seen_mobile_notice,
            fetched_at: self.library.fetched_at(),
        }
    }
}

/// The shuffled album list and the cursor into it.
///
/// The index is not clamped: after a reload shrinks the list, or after the
/// player reports leaving the last album, it may point past the end, which
/// reads as "no current album" until the user steps back.
#[derive(Clone)]
pub struct QueueController {
    inner: Arc<Mutex<QueueInner>>,
    source: Arc<dyn AlbumSource>,
    store: Option<ClientStateStore>,
}

impl QueueController {
    pub fn new(source: Arc<dyn AlbumSource>) -> Self {
        Self::from_state(source, PlaybackQueueState::default())
    }

    pub fn from_state(source: Arc<dyn AlbumSource>, state: PlaybackQueueState) -> Self {
        let stale_after = Duration::hours(LIBRARY_STALE_HOURS);
        let library = if state.albums.is_empty() && state.fetched_at.is_none() {
            Cached::new(stale_after)
        } else {
            Cached::restore(state.albums, state.fetched_at, stale_after)
        };

        QueueController {
            inner: Arc::new(Mutex::new(QueueInner {
                library,
                queue_index: state.queue_index,
                generation: 0,
                loading: false,
                seen_mobile_notice: state.seen_mobile_notice,
            })),
            source,
            store: None,
        }
    }

    /// Picks up where the last run left off and persists every change.
    pub async fn restore(source: Arc<dyn AlbumSource>, store: ClientStateStore) -> Self {
        let state = match store.load().await {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                warning!(
                    "Ignoring unreadable player state at {}: {}",
                    store.path().display(),
                    e
                );
                PlaybackQueueState::default()
            }
        };

        let mut controller = Self::from_state(source, state);
        controller.store = Some(store);
        controller
    }

    /// Fetches the library, shuffles it and starts again from the first album.
    ///
    /// Returns the number of albums loaded.
    ///
    /// # Errors
    ///
    /// [`Error::Busy`] while another reload runs. A failed fetch keeps the
    /// previous list and index.
    pub async fn reload(&self) -> Res<usize> {
        {
            let mut inner = self.inner.lock().await;
            if inner.loading {
                return Err(Error::Busy);
            }
            inner.loading = true;
        }

        let fetched = self.source.fetch_albums().await;

        let mut inner = self.inner.lock().await;
        inner.loading = false;
        let mut albums = fetched?;
        utils::shuffle(&mut albums);

        let count = albums.len();
        inner.library.store(albums);
        inner.queue_index = 0;
        inner.generation += 1;
        self.persist(&inner).await;
        Ok(count)
    }

    /// Reloads only when the cached library is missing or older than a day.
    pub async fn ensure_loaded(&self) -> Res<()> {
        let stale = self.inner.lock().await.library.is_stale();
        if stale {
            self.reload().await?;
        }
        Ok(())
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.lock().await.loading
    }

    pub async fn generation(&self) -> u64 {
        self.inner.lock().await.generation
    }

    pub async fn albums(&self) -> Vec<Album> {
        self.inner.lock().await.albums().to_vec()
    }

    pub async fn queue_index(&self) -> usize {
        self.inner.lock().await.queue_index
    }

    pub async fn current_album(&self) -> Option<Album> {
        self.inner.lock().await.current().cloned()
    }

    /// The current album and the ones after it, at most `count`, with their positions.
    pub async fn upcoming(&self, count: usize) -> Vec<(usize, Album)> {
        let inner = self.inner.lock().await;
        inner
            .albums()
            .iter()
            .enumerate()
            .skip(inner.queue_index)
            .take(count)
            .map(|(i, album)| (i, album.clone()))
            .collect()
    }

    pub async fn can_advance(&self) -> bool {
        self.inner.lock().await.can_advance()
    }

    pub async fn can_retreat(&self) -> bool {
        self.inner.lock().await.can_retreat()
    }

    /// Next album. A no-op on the last album and while a reload runs.
    pub async fn advance(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.can_advance() {
            return false;
        }
        inner.queue_index += 1;
        self.persist(&inner).await;
        true
    }

    /// Previous album. A no-op on the first album and while a reload runs.
    pub async fn retreat(&self) -> bool {
        let mut inner = self.inner.lock().await;
        if !inner.can_retreat() {
            return false;
        }
        inner.queue_index -= 1;
        self.persist(&inner).await;
        true
    }

    /// Track URIs of the current and the next album.
    pub async fn queued_uris(&self) -> QueueWindow {
        let inner = self.inner.lock().await;
        QueueWindow {
            generation: inner.generation,
            uris: inner.window(),
        }
    }

    /// Reconciles the queue with a track change reported by the player.
    ///
    /// The player was handed two albums and rolls into the second one on its
    /// own. When the track that just finished belongs to the current album
    /// and the one now playing does not, the queue moves on by one album.
    /// Reports for an older window (`generation`) or during a reload are
    /// ignored. Returns whether the queue advanced.
    pub async fn report_track_change(
        &self,
        generation: u64,
        previous_uri: Option<&str>,
        current_uri: &str,
    ) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.loading || inner.generation != generation {
            return false;
        }

        let left_album = match inner.current() {
            Some(album) => {
                let contains = |uri: &str| album.uris.iter().any(|u| u == uri);
                previous_uri.is_some_and(contains) && !contains(current_uri)
            }
            None => false,
        };
        if !left_album {
            return false;
        }

        inner.queue_index += 1;
        self.persist(&inner).await;
        true
    }

    pub async fn seen_mobile_notice(&self) -> bool {
        self.inner.lock().await.seen_mobile_notice
    }

    pub async fn mark_mobile_notice_seen(&self) {
        let mut inner = self.inner.lock().await;
        inner.seen_mobile_notice = true;
        self.persist(&inner).await;
    }

    async fn persist(&self, inner: &QueueInner) {
        if let Some(store) = &self.store {
            if let Err(e) = store.persist(&inner.snapshot()).await {
                warning!("Failed to save player state: {}", e);
            }
        }
    }
}
