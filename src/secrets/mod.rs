//! Secret Store
//!
//! Keyed lookup of instance credentials. Secrets are named
//! `<instance>-credentials`; the agent only ever reads the password field.
//! Any lookup failure aborts the render that requested it.

mod file_secret_store;
pub use file_secret_store::*;


use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;

use crate::constants::CREDENTIALS_SECRET_SUFFIX;
use crate::SecretError;

/// Secret key holding the credentials of `instance`
pub fn credentials_secret_key(instance: &str) -> String {
    format!("{}{}", instance, CREDENTIALS_SECRET_SUFFIX)
}

#[cfg_attr(test, automock)]
pub trait SecretStore: Send + Sync + 'static {
    /// Returns the plaintext password stored under `key`
    fn password(
        &self,
        key: &str,
    ) -> std::result::Result<String, SecretError>;
}

/// Secrets held in memory, for embedding hosts that already resolved them
#[derive(Debug, Default, Clone)]
pub struct StaticSecretStore {
    secrets: HashMap<String, String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(
        mut self,
        key: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.insert(key, password);
        self
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        password: impl Into<String>,
    ) {
        self.secrets.insert(key.into(), password.into());
    }
}

impl SecretStore for StaticSecretStore {
    fn password(
        &self,
        key: &str,
    ) -> std::result::Result<String, SecretError> {
        self.secrets
            .get(key)
            .cloned()
            .ok_or_else(|| SecretError::NotFound(key.to_string()))
    }
}
