use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::{MissedTickBehavior, interval, sleep},
};

use crate::{
    Res,
    player::cache::Cached,
    types::{AccessToken, TokenState},
    warning,
};

/// How often the keeper asks the backend for a token, expiry or not.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Hands out the current access token, refreshing it on the server side.
///
/// `Ok(None)` means there is no authenticated session.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Res<Option<AccessToken>>;
}

struct Shared {
    source: Arc<dyn TokenSource>,
    cache: Mutex<Cached<Option<AccessToken>>>,
    in_flight: AtomicUsize,
    updates: watch::Sender<Option<AccessToken>>,
}

struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        InFlight(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Shared {
    /// The only path that talks to the source. Whichever fetch finishes
    /// last decides the cached token.
    async fn fetch(&self) -> Res<Option<AccessToken>> {
        let token = {
            let _guard = InFlight::enter(&self.in_flight);
            self.source.fetch_token().await?
        };

        self.cache.lock().await.store(token.clone());
        self.updates.send_replace(token.clone());
        Ok(token)
    }

    async fn fetch_logged(&self, reason: &str) {
        if let Err(e) = self.fetch().await {
            warning!("Token {} failed, keeping the previous token: {}", reason, e);
        }
    }

    async fn cached(&self) -> Option<AccessToken> {
        self.cache.lock().await.peek().cloned().flatten()
    }
}

/// Keeps a fresh access token around for the player.
///
/// Once started, a heartbeat fetches every [`HEARTBEAT_INTERVAL`] and a
/// watcher fetches again the moment the current token lapses. Both run as
/// tokio tasks and are aborted by [`TokenKeeper::stop`] or on drop.
pub struct TokenKeeper {
    shared: Arc<Shared>,
    tasks: Vec<JoinHandle<()>>,
}

impl TokenKeeper {
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        let stale_after = chrono::Duration::from_std(HEARTBEAT_INTERVAL)
            .unwrap_or_else(|_| chrono::Duration::minutes(30));
        let (updates, _) = watch::channel(None);

        TokenKeeper {
            shared: Arc::new(Shared {
                source,
                cache: Mutex::new(Cached::new(stale_after)),
                in_flight: AtomicUsize::new(0),
                updates,
            }),
            tasks: Vec::new(),
        }
    }

    /// Receives every token the keeper fetches, `None` after a lost session.
    pub fn subscribe(&self) -> watch::Receiver<Option<AccessToken>> {
        self.shared.updates.subscribe()
    }

    /// Last fetched token without touching the network.
    pub async fn current(&self) -> Option<AccessToken> {
        self.shared.cached().await
    }

    /// Cached token while it is fresh and unexpired, a new one otherwise.
    pub async fn get(&self) -> Res<Option<AccessToken>> {
        let reusable = {
            let cache = self.shared.cache.lock().await;
            match cache.peek() {
                Some(Some(token)) if !cache.is_stale() && !token.is_expired_at(Utc::now()) => {
                    Some(token.clone())
                }
                _ => None,
            }
        };

        match reusable {
            Some(token) => Ok(Some(token)),
            None => self.shared.fetch().await,
        }
    }

    /// Fetches unconditionally.
    pub async fn refresh(&self) -> Res<Option<AccessToken>> {
        self.shared.fetch().await
    }

    pub async fn status(&self) -> TokenState {
        if self.shared.in_flight.load(Ordering::SeqCst) > 0 {
            return TokenState::Refreshing;
        }
        match self.shared.cached().await {
            None => TokenState::Absent,
            Some(token) if token.is_expired_at(Utc::now()) => TokenState::Expired,
            Some(_) => TokenState::Valid,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Starts the heartbeat and the expiry watcher. The first heartbeat
    /// fires right away. Calling it twice is a no-op.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let heartbeat = Arc::clone(&self.shared);
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = interval(HEARTBEAT_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                heartbeat.fetch_logged("heartbeat").await;
            }
        }));

        let watcher = Arc::clone(&self.shared);
        self.tasks.push(tokio::spawn(watch_expiry(watcher)));
    }

    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for TokenKeeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn watch_expiry(shared: Arc<Shared>) {
    let mut updates = shared.updates.subscribe();
    // expiry we already refetched for, so an unchanged lapsed token is not hammered
    let mut fired_for: Option<DateTime<Utc>> = None;

    loop {
        updates.borrow_and_update();
        let token = shared.cached().await;

        let wait = match &token {
            None => None,
            Some(token) => match token.expires_in(Utc::now()) {
                Some(left) => Some(left),
                None if fired_for == Some(token.expires_at) => None,
                None => Some(Duration::ZERO),
            },
        };

        match wait {
            Some(left) => {
                tokio::select! {
                    _ = sleep(left) => {
                        fired_for = token.map(|t| t.expires_at);
                        shared.fetch_logged("refresh on expiry").await;
                    }
                    changed = updates.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }
            None => {
                if updates.changed().await.is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use tokio::sync::Notify;

    use super::*;
    use crate::Error;

    fn token(value: &str, lifetime: chrono::Duration) -> AccessToken {
        AccessToken {
            value: value.into(),
            expires_at: Utc::now() + lifetime,
        }
    }

    /// Hands out `tokens` in order and repeats the last one.
    struct FakeSource {
        tokens: Vec<Option<AccessToken>>,
        calls: AtomicUsize,
        fail: AtomicBool,
        gate: Option<Arc<Notify>>,
    }

    impl FakeSource {
        fn new(tokens: Vec<Option<AccessToken>>) -> Self {
            FakeSource {
                tokens,
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                gate: None,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenSource for FakeSource {
        async fn fetch_token(&self) -> Res<Option<AccessToken>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Refresh("backend unavailable".into()));
            }
            Ok(self.tokens[call.min(self.tokens.len() - 1)].clone())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_fetches_on_start_and_every_interval() {
        let source = Arc::new(FakeSource::new(vec![Some(token(
            "a",
            chrono::Duration::hours(2),
        ))]));
        let mut keeper = TokenKeeper::new(source.clone());
        keeper.start();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(keeper.status().await, TokenState::Valid);

        sleep(HEARTBEAT_INTERVAL).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn lapsed_token_is_refetched_without_waiting_for_the_heartbeat() {
        let source = Arc::new(FakeSource::new(vec![
            Some(token("short", chrono::Duration::seconds(60))),
            Some(token("long", chrono::Duration::hours(2))),
        ]));
        let mut keeper = TokenKeeper::new(source.clone());
        keeper.start();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(keeper.current().await.unwrap().value, "short");

        sleep(Duration::from_secs(61)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(keeper.current().await.unwrap().value, "long");
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_lapsed_token_is_refetched_once() {
        let source = Arc::new(FakeSource::new(vec![Some(token(
            "stale",
            chrono::Duration::seconds(-5),
        ))]));
        let mut keeper = TokenKeeper::new(source.clone());
        keeper.start();

        sleep(Duration::from_secs(60)).await;
        // heartbeat plus one expiry refetch
        assert_eq!(source.calls(), 2);
        assert_eq!(keeper.status().await, TokenState::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_and_drop_cancel_the_timers() {
        let source = Arc::new(FakeSource::new(vec![Some(token(
            "a",
            chrono::Duration::seconds(30),
        ))]));
        let mut keeper = TokenKeeper::new(source.clone());
        keeper.start();
        sleep(Duration::from_secs(1)).await;
        keeper.stop();
        assert!(!keeper.is_running());

        sleep(HEARTBEAT_INTERVAL * 3).await;
        assert_eq!(source.calls(), 1);

        let mut restarted = TokenKeeper::new(source.clone());
        restarted.start();
        sleep(Duration::from_secs(1)).await;
        drop(restarted);

        sleep(HEARTBEAT_INTERVAL * 3).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn missing_session_reads_as_absent() {
        let source = Arc::new(FakeSource::new(vec![None]));
        let keeper = TokenKeeper::new(source);
        assert_eq!(keeper.status().await, TokenState::Absent);
        assert_eq!(keeper.get().await.unwrap(), None);
        assert_eq!(keeper.status().await, TokenState::Absent);
    }

    #[tokio::test]
    async fn get_reuses_a_fresh_token() {
        let source = Arc::new(FakeSource::new(vec![Some(token(
            "a",
            chrono::Duration::hours(1),
        ))]));
        let keeper = TokenKeeper::new(source.clone());

        let first = keeper.get().await.unwrap();
        let second = keeper.get().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);

        keeper.refresh().await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_the_previous_token() {
        let source = Arc::new(FakeSource::new(vec![Some(token(
            "a",
            chrono::Duration::hours(1),
        ))]));
        let keeper = TokenKeeper::new(source.clone());
        keeper.get().await.unwrap();

        source.fail.store(true, Ordering::SeqCst);
        assert!(matches!(keeper.refresh().await, Err(Error::Refresh(_))));
        assert_eq!(keeper.current().await.unwrap().value, "a");
        assert_eq!(keeper.status().await, TokenState::Valid);
    }

    #[tokio::test]
    async fn status_is_refreshing_while_a_fetch_runs() {
        let gate = Arc::new(Notify::new());
        let mut source = FakeSource::new(vec![Some(token("a", chrono::Duration::hours(1)))]);
        source.gate = Some(gate.clone());
        let keeper = Arc::new(TokenKeeper::new(Arc::new(source)));

        let fetching = Arc::clone(&keeper);
        let task = tokio::spawn(async move { fetching.refresh().await });
        while keeper.status().await != TokenState::Refreshing {
            tokio::task::yield_now().await;
        }

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert_eq!(keeper.status().await, TokenState::Valid);
    }

    #[tokio::test]
    async fn subscribers_see_each_fetched_token() {
        let source = Arc::new(FakeSource::new(vec![
            Some(token("a", chrono::Duration::hours(1))),
            None,
        ]));
        let keeper = TokenKeeper::new(source);
        let mut updates = keeper.subscribe();

        keeper.refresh().await.unwrap();
        updates.changed().await.unwrap();
        assert_eq!(updates.borrow_and_update().as_ref().unwrap().value, "a");

        keeper.refresh().await.unwrap();
        updates.changed().await.unwrap();
        assert!(updates.borrow_and_update().is_none());
    }
}
