//! API key resolution shared by every generative request.

use crate::errors::GenAiError;
use std::sync::{Arc, RwLock};

/// Shared API key handle.
///
/// The key is resolved at call time, not at startup: a key installed with
/// [`ApiKey::install`] wins, otherwise the environment variables are read in
/// order. Clones share the installed key.
#[derive(Debug, Clone)]
pub struct ApiKey {
    env_vars: Vec<String>,
    installed: Arc<RwLock<Option<String>>>,
}

impl ApiKey {
    /// Read the key from the first set, non-empty variable in `env_vars`.
    pub fn from_env(env_vars: Vec<String>) -> Self {
        Self {
            env_vars,
            installed: Arc::new(RwLock::new(None)),
        }
    }

    /// A key that never consults the environment.
    pub fn fixed(key: impl Into<String>) -> Self {
        let handle = Self::from_env(Vec::new());
        handle.install(key);
        handle
    }

    /// Replace the key for every clone of this handle.
    pub fn install(&self, key: impl Into<String>) {
        let mut guard = match self.installed.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(key.into());
    }

    pub fn is_set(&self) -> bool {
        self.resolve().is_ok()
    }

    /// Resolve the key or report the primary variable as missing.
    pub fn resolve(&self) -> Result<String, GenAiError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<String, GenAiError> {
        let installed = match self.installed.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if let Some(key) = installed.filter(|k| !k.is_empty()) {
            return Ok(key);
        }

        self.env_vars
            .iter()
            .find_map(|name| env(name).filter(|v| !v.trim().is_empty()))
            .ok_or_else(|| GenAiError::MissingCredential {
                env_var: self
                    .env_vars
                    .first()
                    .cloned()
                    .unwrap_or_else(|| "API_KEY".to_string()),
            })
    }
}
