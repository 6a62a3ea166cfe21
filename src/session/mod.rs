//! Session and authentication lifecycle.
//!
//! The gate owns the bearer credential and decides which remote calls are
//! legal. It restores a persisted session at startup, establishes new ones
//! through sign-in/sign-up, and tears everything down on sign-out. An
//! observer hook exposes the transitions so a navigation layer can react
//! without the gate knowing anything about screens.

mod profile_cache;
mod token_store;

pub use profile_cache::ProfileCacheError;
pub use token_store::{TokenStore, TokenStoreError};

use crate::api::{self, ApiConfig, ApiError, auth::User};

/// Where the gate currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Before any restore attempt.
    #[default]
    Unknown,
    /// A restore attempt is running.
    Restoring,
    /// A validated token and user are present.
    Authenticated,
    /// No credential, or restore/sign-in did not produce one.
    Unauthenticated,
}

/// A validated credential and the account it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Transitions collaborators may want to react to, e.g. by resetting
/// navigation to the main or sign-in section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
}

/// Errors surfaced by gate operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

/// Startup-restore advisory messages retained for the UI.
const RESTORE_NETWORK_ERROR: &str = "Network error during startup. Please check your connection.";
const RESTORE_INVALID_ERROR: &str = "Failed to load authentication data.";

/// The process-wide authentication gate.
///
/// Constructor-injected rather than a module-level singleton, so tests can
/// run gates against throwaway storage and stub backends.
pub struct SessionGate {
    config: ApiConfig,
    tokens: TokenStore,
    state: SessionState,
    session: Option<Session>,
    error: Option<String>,
    observer: Option<Box<dyn FnMut(SessionEvent)>>,
}

impl SessionGate {
    /// Build a gate against the given backend.
    pub fn new(config: ApiConfig) -> Result<Self, SessionError> {
        Ok(Self {
            config,
            tokens: TokenStore::new()?,
            state: SessionState::Unknown,
            session: None,
            error: None,
            observer: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|session| &session.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|session| session.token.as_str())
    }

    /// The most recent retained error message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Register the transition observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: Box<dyn FnMut(SessionEvent)>) {
        self.observer = Some(observer);
    }

    /// Attempt to restore a persisted session. Called once at startup.
    ///
    /// A stored token with a cached user short-circuits without touching the
    /// network. Without a cached user the profile is fetched once; a
    /// transport failure keeps the stored credential for the next launch
    /// (soft fail), while a server-reported failure purges it (hard fail).
    pub fn restore(&mut self) -> SessionState {
        self.state = SessionState::Restoring;
        self.error = None;

        let token = match self.tokens.get() {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!("Token store unreadable during restore: {err}");
                None
            }
        };
        let Some(token) = token else {
            self.state = SessionState::Unauthenticated;
            return self.state;
        };

        match profile_cache::load() {
            Ok(Some(user)) => {
                self.session = Some(Session { token, user });
                self.state = SessionState::Authenticated;
                return self.state;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!("Ignoring unreadable profile cache: {err}");
            }
        }

        match api::auth::get_profile(&self.config, &token) {
            Ok(user) => {
                if let Err(err) = profile_cache::store(&user) {
                    tracing::warn!("Failed to cache profile: {err}");
                }
                self.session = Some(Session { token, user });
                self.state = SessionState::Authenticated;
            }
            Err(ApiError::Transport(err)) => {
                tracing::warn!("Profile fetch failed during restore: {err}");
                // Connectivity loss is not proof the credential is bad, so
                // the stored token survives for the next attempt.
                self.error = Some(RESTORE_NETWORK_ERROR.to_string());
                self.state = SessionState::Unauthenticated;
            }
            Err(err) => {
                tracing::warn!("Stored credential rejected during restore: {err}");
                self.purge_storage();
                self.error = Some(RESTORE_INVALID_ERROR.to_string());
                self.state = SessionState::Unauthenticated;
            }
        }
        self.state
    }

    /// Exchange credentials for a session. On failure the state is left
    /// unchanged and the server's message is retained and returned.
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<(), SessionError> {
        self.error = None;
        match api::auth::sign_in(&self.config, email, password) {
            Ok(response) => {
                self.establish(response.token, response.user);
                Ok(())
            }
            Err(err) => {
                tracing::debug!("Sign in failed: {err}");
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Create an account and establish the fresh session.
    pub fn sign_up(&mut self, name: &str, email: &str, password: &str) -> Result<(), SessionError> {
        self.error = None;
        match api::auth::sign_up(&self.config, name, email, password) {
            Ok(response) => {
                self.establish(response.token, response.user);
                Ok(())
            }
            Err(err) => {
                tracing::debug!("Sign up failed: {err}");
                self.error = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Clear the session locally. Always succeeds; no remote invalidation
    /// endpoint exists.
    pub fn sign_out(&mut self) {
        self.session = None;
        self.error = None;
        self.purge_storage();
        self.state = SessionState::Unauthenticated;
        self.notify(SessionEvent::SignedOut);
    }

    fn establish(&mut self, token: String, user: User) {
        if let Err(err) = self.tokens.set(&token) {
            tracing::warn!("Failed to persist token: {err}");
        }
        if let Err(err) = profile_cache::store(&user) {
            tracing::warn!("Failed to cache profile: {err}");
        }
        self.session = Some(Session { token, user });
        self.state = SessionState::Authenticated;
        self.notify(SessionEvent::SignedIn);
    }

    fn purge_storage(&mut self) {
        if let Err(err) = self.tokens.delete() {
            tracing::warn!("Failed to delete stored token: {err}");
        }
        if let Err(err) = profile_cache::delete() {
            tracing::warn!("Failed to delete cached profile: {err}");
        }
    }

    fn notify(&mut self, event: SessionEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};
    use tempfile::tempdir;

    fn gate(base: &std::path::Path) -> (SessionGate, crate::app_dirs::ConfigBaseGuard) {
        let guard = crate::app_dirs::ConfigBaseGuard::set(base.to_path_buf());
        unsafe {
            std::env::set_var("LIFTLOG_DISABLE_KEYRING", "1");
        }
        let config = ApiConfig::new("http://127.0.0.1:1").unwrap();
        (SessionGate::new(config).unwrap(), guard)
    }

    #[test]
    fn starts_unknown() {
        let base = tempdir().unwrap();
        let (gate, _guard) = gate(base.path());
        assert_eq!(gate.state(), SessionState::Unknown);
        assert!(!gate.is_logged_in());
    }

    #[test]
    fn restore_without_token_is_unauthenticated() {
        let base = tempdir().unwrap();
        let (mut gate, _guard) = gate(base.path());
        assert_eq!(gate.restore(), SessionState::Unauthenticated);
        assert_eq!(gate.last_error(), None);
    }

    #[test]
    fn restore_with_cached_user_skips_network() {
        let base = tempdir().unwrap();
        let (mut gate, _guard) = gate(base.path());
        gate.tokens.set("tok_cached").unwrap();
        profile_cache::store(&User {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            created_at: None,
        })
        .unwrap();

        // The configured backend is unreachable; success proves no fetch ran.
        assert_eq!(gate.restore(), SessionState::Authenticated);
        assert_eq!(gate.token(), Some("tok_cached"));
        assert_eq!(gate.user().map(|u| u.id), Some(7));
    }

    #[test]
    fn restore_network_failure_keeps_stored_token() {
        let base = tempdir().unwrap();
        let (mut gate, _guard) = gate(base.path());
        gate.tokens.set("tok_kept").unwrap();

        // No cached user and an unreachable backend: transport soft fail.
        assert_eq!(gate.restore(), SessionState::Unauthenticated);
        assert!(gate.last_error().is_some_and(|e| e.contains("Network")));
        assert_eq!(gate.tokens.get().unwrap().as_deref(), Some("tok_kept"));
    }

    #[test]
    fn sign_out_clears_state_and_storage() {
        let base = tempdir().unwrap();
        let (mut gate, _guard) = gate(base.path());
        gate.tokens.set("tok_gone").unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        gate.set_observer(Box::new(move |event| sink.borrow_mut().push(event)));

        gate.sign_out();
        assert_eq!(gate.state(), SessionState::Unauthenticated);
        assert!(!gate.is_logged_in());
        assert_eq!(gate.tokens.get().unwrap(), None);
        assert_eq!(&*events.borrow(), &[SessionEvent::SignedOut]);
    }

    #[test]
    fn clear_error_drops_retained_message() {
        let base = tempdir().unwrap();
        let (mut gate, _guard) = gate(base.path());
        gate.tokens.set("tok").unwrap();
        gate.restore();
        assert!(gate.last_error().is_some());
        gate.clear_error();
        assert_eq!(gate.last_error(), None);
    }
}
