//! Client core for the liftlog fitness tracker.
//!
//! Everything below the screen layer lives here: the session/auth gate, the
//! in-progress workout draft, the submission transform, and the typed client
//! for the remote workout backend. A UI drives these through their action
//! APIs and renders whatever they expose.
/// Typed client for the remote workout backend.
pub mod api;
/// Application directory helpers.
pub mod app_dirs;
pub(crate) mod http_client;
/// Logging setup.
pub mod logging;
/// Session and authentication lifecycle.
pub mod session;
/// Persisted user preferences.
pub mod settings;
/// Draft workout state and submission.
pub mod workout;
