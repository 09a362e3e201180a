//! Configuration management module for the monitoring agent.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
//! - Component-wise validation
mod cluster;
mod collector;
mod debounce;
mod render;
pub use cluster::*;
pub use collector::*;
pub use debounce::*;
pub use render::*;
#[cfg(test)]
mod config_test;
use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container for the agent components
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables with `AGENT__` prefix (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct AgentConfig {
    /// Namespace and instance defaults
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// Collector process command and artifact location
    #[serde(default)]
    pub collector: CollectorConfig,
    /// Quiet period between the last registry change and a refresh
    #[serde(default)]
    pub debounce: DebounceConfig,
    /// Template sections location and placeholder naming
    #[serde(default)]
    pub template: TemplateConfig,
    /// Credential secrets location
    #[serde(default)]
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub log: LogConfig,
}
impl Debug for AgentConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("cluster", &self.cluster)
            .field("collector", &self.collector)
            .field("debounce", &self.debounce)
            .finish()
    }
}
impl AgentConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `AGENT__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred to allow further overrides via `with_override_config()`.
    /// Callers MUST call `validate()` before using the configuration.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("AGENT__CLUSTER__NAMESPACE", "redis");
    /// let cfg = AgentConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(Self::environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` from any subsystem:
    /// - Missing namespace
    /// - Empty collector command or artifact path
    /// - Zero quiet period
    pub fn validate(self) -> Result<Self> {
        self.cluster.validate()?;
        self.collector.validate()?;
        self.debounce.validate()?;
        self.template.validate()?;
        self.secrets.validate()?;
        Ok(self)
    }

    fn environment() -> Environment {
        Environment::with_prefix("AGENT")
            .separator("__")
            .ignore_empty(true)
            .try_parsing(true)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LogConfig {
    /// Raises the default log filter from `info` to `debug`; `RUST_LOG` still wins
    #[serde(default)]
    pub debug: bool,
}

impl LogConfig {
    pub fn default_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
