/*
[INPUT]:  Auth tokens from login or refresh, logged-in flag updates
[OUTPUT]: Consistent snapshots of the current credentials
[POS]:    Auth layer - credential store shared by the request pipeline
[UPDATE]: When token fields or write-through persistence change
*/

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http::Result;

use super::persist::AuthPersistence;

/// Credential triple handed out by the hosted API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub access_token: String,
    pub refresh_token: String,
    /// Epoch second after which `access_token` must no longer be presented
    #[serde(alias = "exp")]
    pub expiry: i64,
    pub api_key: String,
    pub user_id: String,
}

impl AuthToken {
    /// True when the token expires before `now + buffer_secs`
    pub fn is_near_expiry(&self, now: i64, buffer_secs: i64) -> bool {
        self.expiry < now + buffer_secs
    }
}

#[derive(Debug, Clone, Default)]
struct CredentialState {
    auth: Option<AuthToken>,
    logged_in: bool,
}

/// Thread-safe holder of the current credentials.
///
/// Cloning yields another handle to the same state. Each write takes the
/// lock once, so readers never observe a half-applied update.
#[derive(Clone, Default)]
pub struct CredentialStore {
    state: Arc<RwLock<CredentialState>>,
    persistence: Option<Arc<dyn AuthPersistence>>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("has_auth", &self.get_auth().is_some())
            .field("logged_in", &self.is_logged_in())
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}

impl CredentialStore {
    /// Create an empty, logged-out store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that writes every token change through to `persistence`
    pub fn with_persistence(persistence: Arc<dyn AuthPersistence>) -> Self {
        Self {
            state: Arc::default(),
            persistence: Some(persistence),
        }
    }

    /// Rebuild a store from whatever `persistence` saved last
    pub fn restore(persistence: Arc<dyn AuthPersistence>) -> Result<Self> {
        let saved = persistence.load()?;
        let store = Self::with_persistence(persistence);
        if let Some(token) = saved {
            debug!(user_id = %token.user_id, "restored saved credentials");
            let mut guard = store.write();
            *guard = CredentialState {
                auth: Some(token),
                logged_in: true,
            };
        }
        Ok(store)
    }

    /// Current token, if any
    pub fn get_auth(&self) -> Option<AuthToken> {
        self.read().auth.clone()
    }

    /// Replace the stored token
    pub fn set_auth(&self, token: AuthToken) {
        let mut guard = self.write();
        if let Some(persistence) = &self.persistence {
            if let Err(err) = persistence.save(&token) {
                warn!(error = %err, "failed to persist credentials");
            }
        }
        guard.auth = Some(token);
    }

    /// Access token to present as bearer credential
    pub fn get_jwt(&self) -> Option<String> {
        self.read()
            .auth
            .as_ref()
            .map(|auth| auth.access_token.clone())
    }

    pub fn set_is_logged_in(&self, logged_in: bool) {
        self.write().logged_in = logged_in;
    }

    /// Logged in only while a token is held and the last refresh did not fail
    pub fn is_logged_in(&self) -> bool {
        let guard = self.read();
        guard.logged_in && guard.auth.is_some()
    }

    /// Drop the token (logout or irrecoverable failure)
    pub fn clear(&self) {
        let mut guard = self.write();
        if let Some(persistence) = &self.persistence {
            if let Err(err) = persistence.clear() {
                warn!(error = %err, "failed to clear persisted credentials");
            }
        }
        *guard = CredentialState::default();
    }

    fn read(&self) -> RwLockReadGuard<'_, CredentialState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CredentialState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
