use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Point the app at a throwaway config home and force the encrypted-file
/// token fallback, restoring the previous environment on drop.
pub struct LiftlogEnvGuard {
    previous_home: Option<String>,
    previous_keyring: Option<String>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl LiftlogEnvGuard {
    pub fn set_config_home(path: PathBuf) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous_home = std::env::var("LIFTLOG_CONFIG_HOME").ok();
        let previous_keyring = std::env::var("LIFTLOG_DISABLE_KEYRING").ok();
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var("LIFTLOG_CONFIG_HOME", path);
            std::env::set_var("LIFTLOG_DISABLE_KEYRING", "1");
        }
        Self {
            previous_home,
            previous_keyring,
            _lock: lock,
        }
    }
}

impl Drop for LiftlogEnvGuard {
    fn drop(&mut self) {
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            match self.previous_home.take() {
                Some(value) => std::env::set_var("LIFTLOG_CONFIG_HOME", value),
                None => std::env::remove_var("LIFTLOG_CONFIG_HOME"),
            }
            match self.previous_keyring.take() {
                Some(value) => std::env::set_var("LIFTLOG_DISABLE_KEYRING", value),
                None => std::env::remove_var("LIFTLOG_DISABLE_KEYRING"),
            }
        }
    }
}
