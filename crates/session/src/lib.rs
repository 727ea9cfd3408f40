pub mod db;
pub mod storage;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use forest_core::{parse_instant, Session};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{watch, Mutex};

pub use db::SqliteStore;
pub use storage::{KeyValueStore, MemoryStore};

pub const TOKEN_KEY: &str = "authenticationToken";
pub const USERNAME_KEY: &str = "username";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const EXPIRES_AT_KEY: &str = "expiresAt";

const SESSION_KEYS: [&str; 4] = [TOKEN_KEY, USERNAME_KEY, REFRESH_TOKEN_KEY, EXPIRES_AT_KEY];

/// 購読者に配信されるログイン状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub logged_in: bool,
    pub username: Option<String>,
}

impl SessionSnapshot {
    fn of(session: Option<&Session>) -> Self {
        match session {
            Some(s) => Self {
                logged_in: true,
                username: Some(s.username.clone()),
            },
            None => Self::default(),
        }
    }
}

/// A mounted view's handle on the session broadcast. Dropping it unsubscribes.
pub struct SessionSubscription {
    rx: watch::Receiver<SessionSnapshot>,
}

impl SessionSubscription {
    pub fn current(&self) -> SessionSnapshot {
        self.rx.borrow().clone()
    }

    /// Returns the latest snapshot if something was published since the last call.
    pub fn take_update(&mut self) -> Option<SessionSnapshot> {
        if self.rx.has_changed().unwrap_or(false) {
            Some(self.rx.borrow_and_update().clone())
        } else {
            None
        }
    }

    pub async fn changed(&mut self) -> Option<SessionSnapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Client-side session: persisted in a [`KeyValueStore`], mirrored in memory
/// so that guards can ask synchronously.
///
/// The four persisted fields are either all present or all absent.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Session>>,
    publisher: watch::Sender<SessionSnapshot>,
    /// establish / replace_access_token / clear の書き込みを直列化する
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Restores the session left in `storage`. A partial session is wiped.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let token = storage.get(TOKEN_KEY).await?;
        let username = storage.get(USERNAME_KEY).await?;
        let refresh_token = storage.get(REFRESH_TOKEN_KEY).await?;
        let expires_raw = storage.get(EXPIRES_AT_KEY).await?;

        let any_present = token.is_some()
            || username.is_some()
            || refresh_token.is_some()
            || expires_raw.is_some();
        let expires_at = expires_raw.as_deref().and_then(parse_instant);

        let session = match (token, username, refresh_token, expires_at) {
            (Some(access_token), Some(username), Some(refresh_token), Some(expires_at)) => {
                tracing::info!("Restored session for {}", username);
                Some(Session {
                    access_token,
                    username,
                    refresh_token,
                    expires_at,
                })
            }
            _ => {
                if any_present {
                    tracing::warn!("Incomplete session found in storage, clearing it");
                    for key in SESSION_KEYS {
                        storage.remove(key).await?;
                    }
                }
                None
            }
        };

        Ok(Self::with_session(storage, session))
    }

    /// Starts logged out without reading storage.
    pub fn empty(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_session(storage, None)
    }

    fn with_session(storage: Arc<dyn KeyValueStore>, session: Option<Session>) -> Self {
        let (publisher, _) = watch::channel(SessionSnapshot::of(session.as_ref()));
        Self {
            storage,
            current: RwLock::new(session),
            publisher,
            write_lock: Mutex::new(()),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.read(|s| s.is_some())
    }

    pub fn username(&self) -> Option<String> {
        self.read(|s| s.map(|s| s.username.clone()))
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(|s| s.map(|s| s.access_token.clone()))
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(|s| s.map(|s| s.refresh_token.clone()))
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.read(|s| s.map(|s| s.expires_at))
    }

    pub fn session(&self) -> Option<Session> {
        self.read(|s| s.cloned())
    }

    pub fn is_admin(&self) -> bool {
        self.username().as_deref() == Some("admin")
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.publisher.borrow().clone()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.publisher.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.publisher.receiver_count()
    }

    /// ログイン成功時: 4 フィールドを保存してから購読者へ通知する
    pub async fn establish(&self, session: Session) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let expires_at = session.expires_at.to_rfc3339();
        let entries = [
            (TOKEN_KEY, session.access_token.as_str()),
            (USERNAME_KEY, session.username.as_str()),
            (REFRESH_TOKEN_KEY, session.refresh_token.as_str()),
            (EXPIRES_AT_KEY, expires_at.as_str()),
        ];

        for (key, value) in entries {
            if let Err(e) = self.storage.set(key, value).await {
                // 中途半端な状態を残さない
                for key in SESSION_KEYS {
                    if let Err(cleanup) = self.storage.remove(key).await {
                        tracing::error!("Failed to roll back session key {}: {:#}", key, cleanup);
                    }
                }
                return Err(e).context("Failed to persist session");
            }
        }

        let snapshot = SessionSnapshot::of(Some(&session));
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        self.publisher.send_replace(snapshot);
        Ok(())
    }

    /// Overwrites only the access token and its expiry. Fails once the
    /// session has been cleared, even if the clear happened while waiting.
    pub async fn replace_access_token(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if !self.is_logged_in() {
            anyhow::bail!("No active session to refresh");
        }

        self.storage.set(TOKEN_KEY, token).await?;
        self.storage
            .set(EXPIRES_AT_KEY, &expires_at.to_rfc3339())
            .await?;

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = current.as_mut() {
            session.access_token = token.to_string();
            session.expires_at = expires_at;
        }
        Ok(())
    }

    /// Logs out locally. The in-memory state and the broadcast are cleared
    /// before storage, so the store reads as logged out even if storage fails.
    /// Waits for an in-flight write so that none of its keys outlive the clear.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.publisher.send_replace(SessionSnapshot::default());

        let mut first_error = None;
        for key in SESSION_KEYS {
            if let Err(e) = self.storage.remove(key).await {
                tracing::error!("Failed to remove {} from storage: {:#}", key, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e).context("Failed to clear persisted session"),
            None => Ok(()),
        }
    }

    fn read<T>(&self, f: impl FnOnce(Option<&Session>) -> T) -> T {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        f(guard.as_ref())
    }
}
