use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Template sections source and placeholder naming
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TemplateConfig {
    /// Directory holding `telegraf-init`, `telegraf-outputs` and `telegraf-inputs`
    /// (a mounted config map)
    #[serde(default = "default_template_dir")]
    pub dir: PathBuf,

    /// Prefix shared by the placeholder tokens and the exported credential variables.
    /// Tokens are `<prefix>DBNAME`, `<prefix>DBSERVICE`, `<prefix>DBPORT`, `<prefix>DBPASS`.
    #[serde(default = "default_placeholder_prefix")]
    pub placeholder_prefix: String,
}
impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: default_template_dir(),
            placeholder_prefix: default_placeholder_prefix(),
        }
    }
}
impl TemplateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("template.dir cannot be empty".into()));
        }
        let prefix = &self.placeholder_prefix;
        if prefix.is_empty() {
            return Err(Error::InvalidConfig("template.placeholder_prefix cannot be empty".into()));
        }
        // Exported as an environment variable name, so it must be a valid one
        let valid = prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !prefix.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(Error::InvalidConfig(format!(
                "template.placeholder_prefix {:?} is not a valid variable name prefix",
                prefix
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SecretsConfig {
    /// Directory of mounted secrets; each secret is a sub-directory with one file per field
    #[serde(default = "default_secrets_dir")]
    pub dir: PathBuf,

    /// Field of the credentials secret holding the password
    #[serde(default = "default_password_field")]
    pub password_field: String,
}
impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            dir: default_secrets_dir(),
            password_field: default_password_field(),
        }
    }
}
impl SecretsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dir.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("secrets.dir cannot be empty".into()));
        }
        if self.password_field.trim().is_empty() {
            return Err(Error::InvalidConfig("secrets.password_field cannot be empty".into()));
        }
        Ok(())
    }
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("/etc/telegraf-templates")
}
fn default_placeholder_prefix() -> String {
    "TELEGRAF_REDIS_PREFIX_".to_string()
}
fn default_secrets_dir() -> PathBuf {
    PathBuf::from("/etc/secrets")
}
fn default_password_field() -> String {
    "password".to_string()
}
