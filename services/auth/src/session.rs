//! Session store backed by durable client storage
//!
//! The store is the single source of truth for who is signed in. It restores
//! itself from storage once at startup, and every mutation persists the token
//! and the user record together so a reload sees exactly what memory held.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::{DurableStorage, StorageError};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::{Role, Session, SessionUser};

/// Storage key of the bearer token
pub const TOKEN_KEY: &str = "jwtToken";

/// Storage key of the JSON-serialized user record
pub const USER_KEY: &str = "user";

/// Errors raised by session mutations
#[derive(Error, Debug)]
pub enum SessionError {
    /// The credential handed to `login` was empty
    #[error("A bearer token is required to sign in")]
    MissingToken,

    /// `update_user` was called while signed out
    #[error("No user is signed in")]
    NotSignedIn,

    /// The user record could not be serialized
    #[error("Failed to serialize user: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Durable storage rejected the write
    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

struct Inner {
    storage: Arc<dyn DurableStorage>,
    state: watch::Sender<Session>,
    write: Mutex<()>,
}

/// Handle to the session, shared between every view
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Create a signed-out, not yet ready store over `storage`
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(Inner {
                storage,
                state,
                write: Mutex::new(()),
            }),
        }
    }

    /// Create a store and run [`SessionStore::initialize`] on it
    pub fn restore(storage: Arc<dyn DurableStorage>) -> Self {
        let store = Self::new(storage);
        store.initialize();
        store
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.inner.write.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restore the persisted session, then mark the store ready
    ///
    /// Missing, partial or corrupt persisted state leaves the store signed out;
    /// partial and corrupt state is purged. Only the first call does anything.
    pub fn initialize(&self) {
        let _guard = self.lock();
        if self.inner.state.borrow().is_ready {
            debug!("Session already initialized");
            return;
        }

        let restored = self.read_persisted();
        self.inner.state.send_modify(|session| {
            if let Some((token, user)) = restored {
                session.token = Some(token);
                session.user = Some(user);
            }
            session.is_ready = true;
        });
        info!("Initial session check complete");
    }

    fn read_persisted(&self) -> Option<(String, SessionUser)> {
        let storage = &self.inner.storage;
        let read = |key: &str| storage.get(key).map(|value| value.filter(|v| !v.is_empty()));

        let (token, raw_user) = match (read(TOKEN_KEY), read(USER_KEY)) {
            (Ok(token), Ok(raw_user)) => (token, raw_user),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Discarding unreadable session storage: {}", e);
                self.purge();
                return None;
            }
        };

        match (token, raw_user) {
            (Some(token), Some(raw_user)) => match serde_json::from_str::<SessionUser>(&raw_user) {
                Ok(user) => {
                    info!("Restored session for {}", user.label());
                    Some((token, user))
                }
                Err(e) => {
                    warn!("Discarding corrupt stored user data: {}", e);
                    self.purge();
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!("Discarding partial stored session");
                self.purge();
                None
            }
        }
    }

    /// Remove the session keys; an unreadable document is wiped whole
    fn purge(&self) {
        let storage = &self.inner.storage;
        let removed = storage
            .delete(TOKEN_KEY)
            .and_then(|_| storage.delete(USER_KEY));
        if let Err(e) = removed {
            warn!("Failed to remove session keys ({}), clearing storage", e);
            if let Err(e) = storage.clear() {
                warn!("Failed to purge session storage: {}", e);
            }
        }
    }

    fn persist(&self, token: &str, user: &SessionUser) -> Result<(), SessionError> {
        let serialized = serde_json::to_string(user)?;
        let storage = &self.inner.storage;
        storage.set(TOKEN_KEY, token)?;
        storage.set(USER_KEY, &serialized)?;
        Ok(())
    }

    /// Sign in with the token and user record returned by the backend
    ///
    /// The user record is stored as-is. Storage is written first. If that
    /// fails, the previous session is written back; when even that is not
    /// possible, storage is purged and the store signs out, so memory and
    /// storage always describe the same session.
    pub fn login(&self, token: impl Into<String>, user: SessionUser) -> Result<(), SessionError> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::MissingToken);
        }

        let _guard = self.lock();
        if let Err(e) = self.persist(&token, &user) {
            warn!("Failed to persist session, rolling back: {}", e);
            self.roll_back();
            return Err(e);
        }

        info!("User logged in: {}", user.label());
        self.inner.state.send_modify(|session| {
            session.token = Some(token);
            session.user = Some(user);
        });
        Ok(())
    }

    fn roll_back(&self) {
        let previous = self.inner.state.borrow().credentials().map(|(token, user)| {
            (token.to_string(), user.clone())
        });

        if let Some((token, user)) = &previous {
            match self.persist(token, user) {
                Ok(()) => return,
                Err(e) => warn!("Failed to restore previous session: {}", e),
            }
        }

        self.purge();
        self.inner.state.send_if_modified(|session| {
            let changed = session.user.is_some() || session.token.is_some();
            session.user = None;
            session.token = None;
            changed
        });
    }

    /// Sign out and purge persisted state; calling it while signed out is a no-op
    pub fn logout(&self) {
        let _guard = self.lock();
        self.purge();

        let was_signed_in = self.inner.state.send_if_modified(|session| {
            let changed = session.user.is_some() || session.token.is_some();
            session.user = None;
            session.token = None;
            changed
        });
        if was_signed_in {
            info!("User logged out");
        }
    }

    /// Shallow-merge `partial` into the current user and persist the result
    ///
    /// Returns the merged record. Fails with [`SessionError::NotSignedIn`]
    /// when there is no user to merge into.
    pub fn update_user(&self, partial: &SessionUser) -> Result<SessionUser, SessionError> {
        let _guard = self.lock();
        let current = self
            .inner
            .state
            .borrow()
            .user
            .clone()
            .ok_or(SessionError::NotSignedIn)?;

        let merged = current.merged(partial);
        self.inner
            .storage
            .set(USER_KEY, &serde_json::to_string(&merged)?)?;

        info!("User data updated: {}", merged.label());
        self.inner.state.send_modify(|session| {
            session.user = Some(merged.clone());
        });
        Ok(merged)
    }

    /// Snapshot of the current session
    pub fn state(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.inner.state.borrow().user.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.inner.state.borrow().role()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.state.borrow().is_ready
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Wait until the initial restore attempt has completed
    pub async fn ready(&self) {
        let mut updates = self.inner.state.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = updates.wait_for(|session| session.is_ready).await;
    }

    /// Receive every session change (login, logout, user update)
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.state();
        f.debug_struct("SessionStore")
            .field("is_ready", &session.is_ready)
            .field("is_authenticated", &session.is_authenticated())
            .field("role", &session.role())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{MemoryStorage, StorageResult};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user(value: serde_json::Value) -> SessionUser {
        SessionUser::from_value(value).expect("object")
    }

    /// Storage whose writes always fail
    struct ReadOnlyStorage(MemoryStorage);

    /// Storage that fails the next `n` writes
    #[derive(Clone, Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        failures: Arc<AtomicUsize>,
    }

    impl FlakyStorage {
        fn fail_writes(&self, n: usize) {
            self.failures.store(n, Ordering::SeqCst);
        }
    }

    impl DurableStorage for FlakyStorage {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            let failing = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(std::io::Error::other("disk full").into());
            }
            self.inner.set(key, value)
        }

        fn delete(&self, key: &str) -> StorageResult<()> {
            self.inner.delete(key)
        }

        fn clear(&self) -> StorageResult<()> {
            self.inner.clear()
        }
    }

    /// Storage that cannot be read at all
    struct UnreadableStorage(MemoryStorage);

    impl DurableStorage for UnreadableStorage {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(std::io::Error::other("unreadable").into())
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.0.set(key, value)
        }

        fn delete(&self, _key: &str) -> StorageResult<()> {
            Err(std::io::Error::other("unreadable").into())
        }

        fn clear(&self) -> StorageResult<()> {
            self.0.clear()
        }
    }

    impl DurableStorage for ReadOnlyStorage {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }

        fn delete(&self, key: &str) -> StorageResult<()> {
            self.0.delete(key)
        }

        fn clear(&self) -> StorageResult<()> {
            self.0.clear()
        }
    }

    #[test]
    fn test_new_store_is_signed_out_and_not_ready() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        let session = store.state();
        assert!(!session.is_ready);
        assert!(!session.is_authenticated());
        assert!(session.user.is_none());
        assert!(session.token.is_none());
    }

    #[test]
    fn test_login_survives_reload() -> Result<(), SessionError> {
        let storage = MemoryStorage::new();
        let store = SessionStore::restore(Arc::new(storage.clone()));
        let record = user(json!({"userId": 7, "role": "PROVIDER", "name": "A"}));

        store.login("t1", record.clone())?;

        let reloaded = SessionStore::restore(Arc::new(storage));
        let session = reloaded.state();
        assert!(session.is_ready);
        assert!(session.is_authenticated());
        assert_eq!(session.token.as_deref(), Some("t1"));
        assert_eq!(session.user, Some(record));
        assert_eq!(reloaded.role(), Some(Role::Provider));
        Ok(())
    }

    #[test]
    fn test_logout_survives_reload() -> Result<(), SessionError> {
        let storage = MemoryStorage::new();
        let store = SessionStore::restore(Arc::new(storage.clone()));
        store.login("t1", user(json!({"userId": 7})))?;

        store.logout();
        assert!(!store.is_authenticated());
        assert!(storage.is_empty());

        let reloaded = SessionStore::restore(Arc::new(storage));
        assert!(!reloaded.is_authenticated());
        assert!(reloaded.user().is_none());
        assert!(reloaded.token().is_none());
        Ok(())
    }

    #[test]
    fn test_logout_is_idempotent() {
        let store = SessionStore::restore(Arc::new(MemoryStorage::new()));
        store.logout();
        store.logout();
        assert!(store.is_ready());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_corrupt_user_is_discarded() -> StorageResult<()> {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "t1")?;
        storage.set(USER_KEY, "{not json")?;

        let store = SessionStore::restore(Arc::new(storage.clone()));
        assert!(store.is_ready());
        assert!(!store.is_authenticated());
        assert!(storage.is_empty());
        Ok(())
    }

    #[test]
    fn test_non_object_user_is_discarded() -> StorageResult<()> {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "t1")?;
        storage.set(USER_KEY, "42")?;

        let store = SessionStore::restore(Arc::new(storage.clone()));
        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY)?, None);
        Ok(())
    }

    #[test]
    fn test_token_without_user_is_discarded() -> StorageResult<()> {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "t1")?;

        let store = SessionStore::restore(Arc::new(storage.clone()));
        assert!(!store.is_authenticated());
        assert!(storage.is_empty());
        Ok(())
    }

    #[test]
    fn test_ready_never_reverts() -> Result<(), SessionError> {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        assert!(!store.is_ready());

        store.initialize();
        assert!(store.is_ready());

        store.login("t1", user(json!({"userId": 1})))?;
        store.logout();
        store.initialize();
        assert!(store.is_ready());
        Ok(())
    }

    #[test]
    fn test_update_user_merges_and_persists() -> Result<(), SessionError> {
        let storage = MemoryStorage::new();
        let store = SessionStore::restore(Arc::new(storage.clone()));
        store.login(
            "t1",
            user(json!({"userId": 7, "role": "CUSTOMER", "name": "A", "email": "a@b.com"})),
        )?;

        let merged = store.update_user(&SessionUser::new().with("name", "B"))?;
        assert_eq!(merged.name(), Some("B"));
        assert_eq!(merged.user_id(), Some(7));
        assert_eq!(merged.email(), Some("a@b.com"));
        assert_eq!(store.user(), Some(merged.clone()));

        let persisted = storage.get(USER_KEY)?.expect("user persisted");
        let persisted: SessionUser = serde_json::from_str(&persisted)?;
        assert_eq!(persisted, merged);
        Ok(())
    }

    #[test]
    fn test_update_user_requires_signed_in_user() {
        let storage = MemoryStorage::new();
        let store = SessionStore::restore(Arc::new(storage.clone()));

        let result = store.update_user(&SessionUser::new().with("name", "B"));
        assert!(matches!(result, Err(SessionError::NotSignedIn)));
        assert!(store.user().is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_failed_login_write_keeps_signed_out() {
        let store = SessionStore::restore(Arc::new(ReadOnlyStorage(MemoryStorage::new())));

        let result = store.login("t1", user(json!({"userId": 7})));
        assert!(matches!(result, Err(SessionError::Storage(_))));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_failed_relogin_restores_previous_session() -> Result<(), SessionError> {
        let storage = FlakyStorage::default();
        let store = SessionStore::restore(Arc::new(storage.clone()));
        store.login("t1", user(json!({"userId": 7})))?;

        storage.fail_writes(1);
        let result = store.login("t2", user(json!({"userId": 8})));
        assert!(matches!(result, Err(SessionError::Storage(_))));

        let reloaded = SessionStore::restore(Arc::new(storage.clone()));
        assert_eq!(store.token().as_deref(), Some("t1"));
        assert_eq!(reloaded.token(), store.token());
        assert_eq!(reloaded.user(), store.user());
        Ok(())
    }

    #[test]
    fn test_failed_relogin_signs_out_when_rollback_fails() -> Result<(), SessionError> {
        let storage = FlakyStorage::default();
        let store = SessionStore::restore(Arc::new(storage.clone()));
        store.login("t1", user(json!({"userId": 7})))?;

        storage.fail_writes(usize::MAX);
        assert!(store.login("t2", user(json!({"userId": 8}))).is_err());

        let reloaded = SessionStore::restore(Arc::new(storage.clone()));
        assert!(!store.is_authenticated());
        assert!(!reloaded.is_authenticated());
        assert!(storage.inner.is_empty());
        Ok(())
    }

    #[test]
    fn test_unreadable_storage_restores_signed_out() -> StorageResult<()> {
        let inner = MemoryStorage::new();
        inner.set(TOKEN_KEY, "t1")?;
        inner.set(USER_KEY, r#"{"userId":7}"#)?;

        let store = SessionStore::restore(Arc::new(UnreadableStorage(inner.clone())));
        assert!(store.is_ready());
        assert!(!store.is_authenticated());
        assert!(inner.is_empty());
        Ok(())
    }

    #[test]
    fn test_corrupt_session_file_is_discarded() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json")?;

        let store = SessionStore::restore(Arc::new(common::FileStorage::new(&path)));
        assert!(store.is_ready());
        assert!(!store.is_authenticated());
        assert!(!path.exists());

        store.login("t1", user(json!({"userId": 7})))?;
        let reloaded = SessionStore::restore(Arc::new(common::FileStorage::new(&path)));
        assert_eq!(reloaded.token().as_deref(), Some("t1"));
        Ok(())
    }

    #[test]
    fn test_logout_keeps_unrelated_keys() -> Result<(), Box<dyn std::error::Error>> {
        let storage = MemoryStorage::new();
        storage.set("favorites", "[3]")?;
        let store = SessionStore::restore(Arc::new(storage.clone()));
        store.login("t1", user(json!({"userId": 7})))?;

        store.logout();
        assert_eq!(storage.get(TOKEN_KEY)?, None);
        assert_eq!(storage.get(USER_KEY)?, None);
        assert_eq!(storage.get("favorites")?, Some("[3]".to_string()));
        Ok(())
    }

    #[test]
    fn test_empty_token_is_rejected() {
        let store = SessionStore::restore(Arc::new(MemoryStorage::new()));
        let result = store.login("", user(json!({"userId": 7})));
        assert!(matches!(result, Err(SessionError::MissingToken)));
    }

    #[tokio::test]
    async fn test_ready_resolves_after_initialize() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move { store.ready().await })
        };

        store.initialize();
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .expect("ready() should resolve")
            .expect("waiter task panicked");
    }

    #[tokio::test]
    async fn test_subscribers_see_logout() -> Result<(), SessionError> {
        let store = SessionStore::restore(Arc::new(MemoryStorage::new()));
        store.login("t1", user(json!({"userId": 7})))?;
        let mut updates = store.subscribe();

        store.logout();
        updates.changed().await.expect("sender alive");
        assert!(!updates.borrow().is_authenticated());
        Ok(())
    }
}
