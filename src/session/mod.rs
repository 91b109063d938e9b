//! Session store: bearer token, profile and the forced password change flag.
//!
//! One `SessionStore` is shared (behind an `Arc`) by the request pipeline, the
//! router and the page stores. Every mutation is written through to durable
//! storage before it returns; the storage is read exactly once, in
//! [`SessionStore::rehydrate`].

pub mod storage;
pub mod token;

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::api::auth::{AuthApi, ME_PATH};
use crate::error::{ApiError, Result};
use crate::types::{Role, UserProfile};
use storage::{Storage, StorageError, MUST_CHANGE_PASSWORD_KEY, TOKEN_KEY, USER_KEY};
use token::TokenClaims;

/// Point-in-time copy of the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Empty means "not authenticated"
    pub token: String,
    pub user: Option<UserProfile>,
    pub must_change_password: bool,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

/// What a successful login hands back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub user: UserProfile,
    pub must_change_password: bool,
}

pub struct SessionStore {
    state: RwLock<Session>,
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Empty session over the given storage. Nothing is read.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            state: RwLock::new(Session::default()),
            storage,
        }
    }

    /// Read the persisted session once, at process start.
    ///
    /// A missing token means logged out, whatever else is stored. A profile
    /// that no longer deserializes is dropped rather than failing startup.
    pub fn rehydrate(storage: Arc<dyn Storage>) -> std::result::Result<Self, StorageError> {
        let token = storage.get(TOKEN_KEY)?.unwrap_or_default();

        let session = if token.is_empty() {
            Session::default()
        } else {
            let user = match storage.get(USER_KEY)? {
                Some(raw) => match serde_json::from_str::<Option<UserProfile>>(&raw) {
                    Ok(user) => user,
                    Err(e) => {
                        tracing::warn!("Discarding unreadable stored profile: {}", e);
                        None
                    }
                },
                None => None,
            };
            let must_change_password = storage
                .get(MUST_CHANGE_PASSWORD_KEY)?
                .map(|v| v == "true")
                .unwrap_or(false);

            Session {
                token,
                user,
                must_change_password,
            }
        };

        tracing::debug!(logged_in = session.is_logged_in(), "Session rehydrated");

        Ok(Self {
            state: RwLock::new(session),
            storage,
        })
    }

    pub fn snapshot(&self) -> Session {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).is_logged_in()
    }

    /// Token to attach to outgoing requests, if any
    pub fn token(&self) -> Option<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if state.token.is_empty() {
            None
        } else {
            Some(state.token.clone())
        }
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).user.clone()
    }

    pub fn must_change_password(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).must_change_password
    }

    pub fn token_claims(&self) -> Option<TokenClaims> {
        self.token().as_deref().and_then(token::peek_claims)
    }

    /// Exchange credentials for a session.
    ///
    /// A rejected credential exchange comes back as [`crate::error::ApiError::Credential`]
    /// with the session untouched. If the profile fetch fails after the token
    /// was accepted, the half-built session is discarded. A session cleared by
    /// another request while the profile was loading stays cleared.
    pub async fn login(&self, auth: &AuthApi<'_>, username: &str, password: &str) -> Result<LoginOutcome> {
        let token = auth.login(username, password).await?;
        self.begin(&token.access_token, token.must_change_password)?;

        let user = match auth.get_me().await {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!("Profile fetch after login failed: {}", err);
                self.logout()?;
                return Err(err);
            }
        };
        if !self.attach_user(&token.access_token, user.clone())? {
            tracing::warn!("Session was cleared while the profile was loading");
            return Err(ApiError::SessionExpired {
                path: ME_PATH.to_string(),
                message: "Session ended before login completed".to_string(),
            });
        }

        tracing::info!(user = %user.username, must_change_password = token.must_change_password, "Logged in");

        Ok(LoginOutcome {
            user,
            must_change_password: token.must_change_password,
        })
    }

    /// Replace the whole session with a fresh token and no profile yet.
    ///
    /// The previous profile is removed in the same storage write that stores
    /// the token, so the two never pair up on disk.
    fn begin(&self, token: &str, must_change_password: bool) -> std::result::Result<(), StorageError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.apply(&[
            (USER_KEY, None),
            (TOKEN_KEY, Some(token)),
            (MUST_CHANGE_PASSWORD_KEY, Some(bool_str(must_change_password))),
        ])?;
        *state = Session {
            token: token.to_string(),
            user: None,
            must_change_password,
        };
        Ok(())
    }

    /// Clear every field and every stored entry. Safe to call repeatedly.
    ///
    /// Memory is cleared even when storage fails; the storage error is still
    /// returned so the caller can report it.
    pub fn logout(&self) -> std::result::Result<(), StorageError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let was_logged_in = state.is_logged_in();

        let stored = self
            .storage
            .apply(&[(TOKEN_KEY, None), (USER_KEY, None), (MUST_CHANGE_PASSWORD_KEY, None)]);
        *state = Session::default();

        if was_logged_in {
            tracing::info!("Logged out");
        }
        stored
    }

    /// Replace the stored profile, e.g. after a profile edit.
    ///
    /// Ignored on a logged-out session: a profile never outlives its token.
    pub fn set_user(&self, user: UserProfile) -> std::result::Result<(), StorageError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.is_logged_in() {
            tracing::warn!(user = %user.username, "Ignoring profile update without a session");
            return Ok(());
        }
        self.store_user(&mut state, user)
    }

    /// Store the profile only if `token` is still the live session token
    fn attach_user(&self, token: &str, user: UserProfile) -> std::result::Result<bool, StorageError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.token.is_empty() || state.token != token {
            return Ok(false);
        }
        self.store_user(&mut state, user)?;
        Ok(true)
    }

    fn store_user(&self, state: &mut Session, user: UserProfile) -> std::result::Result<(), StorageError> {
        let raw = serde_json::to_string(&user).map_err(StorageError::Serialize)?;
        self.storage.set(USER_KEY, &raw)?;
        state.user = Some(user);
        Ok(())
    }

    /// Acknowledge a completed password change
    pub fn clear_must_change_password(&self) -> std::result::Result<(), StorageError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.is_logged_in() {
            return Ok(());
        }
        self.storage.set(MUST_CHANGE_PASSWORD_KEY, bool_str(false))?;
        state.must_change_password = false;
        Ok(())
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::storage::MemoryStorage;
    use super::*;

    fn profile(id: i64, role: Role) -> UserProfile {
        UserProfile {
            id,
            username: format!("user{}", id),
            role,
            real_name: Some("Alice".to_string()),
            department: None,
            is_active: Some(true),
            created_at: None,
        }
    }

    fn store_with(storage: &MemoryStorage) -> SessionStore {
        SessionStore::new(Arc::new(storage.clone()))
    }

    #[test]
    fn test_fresh_store_is_logged_out() {
        let store = store_with(&MemoryStorage::new());
        assert!(!store.is_logged_in());
        assert_eq!(store.token(), None);
        assert_eq!(store.user(), None);
        assert!(!store.must_change_password());
    }

    #[test]
    fn test_begin_persists_and_rehydrates() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.begin("T1", true).unwrap();
        store.set_user(profile(7, Role::Normal)).unwrap();

        let again = SessionStore::rehydrate(Arc::new(storage.clone())).unwrap();
        assert_eq!(again.snapshot(), store.snapshot());
        assert!(again.is_logged_in());
        assert!(again.must_change_password());
    }

    #[test]
    fn test_begin_supersedes_previous_user() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.begin("T1", false).unwrap();
        store.set_user(profile(1, Role::Admin)).unwrap();

        store.begin("T2", true).unwrap();
        assert_eq!(store.user(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert_eq!(store.token().as_deref(), Some("T2"));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.begin("T1", true).unwrap();
        store.set_user(profile(7, Role::Normal)).unwrap();

        store.logout().unwrap();
        let once = store.snapshot();
        assert!(storage.is_empty());

        store.logout().unwrap();
        assert_eq!(store.snapshot(), once);
        assert_eq!(once, Session::default());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_set_user_round_trips_through_storage() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.begin("T1", false).unwrap();
        let user = profile(42, Role::Admin);
        store.set_user(user.clone()).unwrap();

        let again = SessionStore::rehydrate(Arc::new(storage)).unwrap();
        assert_eq!(again.user(), Some(user));
    }

    #[test]
    fn test_clear_must_change_password() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.begin("T1", true).unwrap();
        store.clear_must_change_password().unwrap();
        assert!(!store.must_change_password());
        assert_eq!(storage.get(MUST_CHANGE_PASSWORD_KEY).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_rehydrate_without_token_ignores_leftovers() {
        let storage = MemoryStorage::new();
        storage.set(USER_KEY, r#"{"id":1,"username":"x","role":"admin"}"#).unwrap();
        storage.set(MUST_CHANGE_PASSWORD_KEY, "true").unwrap();

        let store = SessionStore::rehydrate(Arc::new(storage)).unwrap();
        assert_eq!(store.snapshot(), Session::default());
    }

    #[test]
    fn test_set_user_without_session_is_ignored() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);

        store.set_user(profile(1, Role::Admin)).unwrap();
        assert_eq!(store.user(), None);
        assert!(storage.is_empty());

        let again = SessionStore::rehydrate(Arc::new(storage)).unwrap();
        assert_eq!(again.snapshot(), store.snapshot());
    }

    #[test]
    fn test_profile_for_a_cleared_session_is_dropped() {
        let storage = MemoryStorage::new();
        let store = store_with(&storage);
        store.begin("T1", false).unwrap();

        // A stale 401 logs out while the profile is in flight
        store.logout().unwrap();
        assert!(!store.attach_user("T1", profile(7, Role::Normal)).unwrap());
        assert_eq!(store.user(), None);
        assert!(storage.is_empty());

        // A newer login owns the session now
        store.begin("T2", false).unwrap();
        assert!(!store.attach_user("T1", profile(7, Role::Normal)).unwrap());
        assert_eq!(store.user(), None);
        assert!(store.attach_user("T2", profile(8, Role::Normal)).unwrap());
        assert_eq!(store.user().map(|u| u.id), Some(8));
    }

    /// Fails every write to one key, lets the rest through
    struct BrokenKey {
        inner: MemoryStorage,
        key: &'static str,
    }

    impl Storage for BrokenKey {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            if key == self.key {
                return Err(StorageError::Poisoned);
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> std::result::Result<(), StorageError> {
            if key == self.key {
                return Err(StorageError::Poisoned);
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_logout_clears_what_it_can_when_storage_fails() {
        let inner = MemoryStorage::new();
        inner.set(TOKEN_KEY, "T1").unwrap();
        inner.set(USER_KEY, r#"{"id":7,"username":"alice","role":"normal"}"#).unwrap();
        inner.set(MUST_CHANGE_PASSWORD_KEY, "true").unwrap();

        let store = SessionStore::rehydrate(Arc::new(BrokenKey {
            inner: inner.clone(),
            key: USER_KEY,
        }))
        .unwrap();
        assert!(store.is_logged_in());

        assert!(store.logout().is_err());
        assert!(!store.is_logged_in());
        // The token went even though the profile could not be removed
        assert_eq!(inner.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(inner.get(MUST_CHANGE_PASSWORD_KEY).unwrap(), None);

        let again = SessionStore::rehydrate(Arc::new(inner)).unwrap();
        assert!(!again.is_logged_in());
        assert_eq!(again.user(), None);
    }

    #[test]
    fn test_rehydrate_drops_unreadable_profile() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "T1").unwrap();
        storage.set(USER_KEY, "not json").unwrap();

        let store = SessionStore::rehydrate(Arc::new(storage)).unwrap();
        assert!(store.is_logged_in());
        assert_eq!(store.user(), None);
    }
}
