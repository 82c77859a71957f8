use std::{collections::HashMap, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{Error, Res, types::SessionData};

/// Persistence for server-side sessions, keyed by the hashed session id.
///
/// Each call is a single read or write of one key; the auth service does its
/// read-modify-write on top of it.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, key: &str) -> Res<Option<SessionData>>;
    async fn save(&self, key: &str, session: &SessionData) -> Res<()>;
    /// Removing a missing key is not an error.
    async fn destroy(&self, key: &str) -> Res<()>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, key: &str) -> Res<Option<SessionData>> {
        Ok(self.sessions.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, session: &SessionData) -> Res<()> {
        self.sessions
            .lock()
            .await
            .insert(key.to_string(), session.clone());
        Ok(())
    }

    async fn destroy(&self, key: &str) -> Res<()> {
        self.sessions.lock().await.remove(key);
        Ok(())
    }
}

/// One JSON file per session inside a directory.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, key: &str) -> Res<PathBuf> {
        let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
        if key.is_empty() || !key.chars().all(allowed) {
            return Err(Error::Session(format!("malformed session key '{key}'")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, key: &str) -> Res<Option<SessionData>> {
        let path = self.path(key)?;
        let json = match async_fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Session(e.to_string())),
        };

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| Error::Session(format!("corrupt session file: {e}")))
    }

    async fn save(&self, key: &str, session: &SessionData) -> Res<()> {
        let path = self.path(key)?;
        async_fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::Session(e.to_string()))?;

        // readers only ever see a complete file
        let json = serde_json::to_string_pretty(session)?;
        let tmp = path.with_extension(format!("json.{:016x}.tmp", rand::random::<u64>()));
        async_fs::write(&tmp, json)
            .await
            .map_err(|e| Error::Session(e.to_string()))?;

        if let Err(e) = async_fs::rename(&tmp, &path).await {
            async_fs::remove_file(&tmp).await.ok();
            return Err(Error::Session(e.to_string()));
        }
        Ok(())
    }

    async fn destroy(&self, key: &str) -> Res<()> {
        let path = self.path(key)?;
        match async_fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Session(e.to_string())),
        }
    }
}
