use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use super::SecretStore;
use crate::SecretError;
use crate::SecretsConfig;

/// Reads secrets mounted as directories: `<root>/<key>/<field>`.
///
/// This is the layout produced when a Kubernetes secret is mounted as a
/// volume. Files are read on every lookup so rotated credentials are picked
/// up by the next refresh.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    root: PathBuf,
    password_field: String,
}

impl FileSecretStore {
    pub fn new(
        root: impl Into<PathBuf>,
        password_field: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            password_field: password_field.into(),
        }
    }

    pub fn from_config(config: &SecretsConfig) -> Self {
        Self::new(config.dir.clone(), config.password_field.clone())
    }
}

impl SecretStore for FileSecretStore {
    fn password(
        &self,
        key: &str,
    ) -> std::result::Result<String, SecretError> {
        let secret_dir = self.root.join(key);
        if !secret_dir.is_dir() {
            return Err(SecretError::NotFound(key.to_string()));
        }

        let path = secret_dir.join(&self.password_field);
        debug!("reading secret field {:?}", path);
        let raw = std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SecretError::MissingField {
                key: key.to_string(),
                field: self.password_field.clone(),
            },
            _ => SecretError::Io {
                key: key.to_string(),
                source: e,
            },
        })?;

        String::from_utf8(raw).map_err(|_| SecretError::InvalidEncoding { key: key.to_string() })
    }
}
