use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// How the collector process is launched
///
/// The worker is started as `<shell> -c "<command> <config_flag> <config_path>"`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CollectorConfig {
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Collector invocation. Prefix with `exec` so stopping the shell stops the collector
    #[serde(default = "default_command")]
    pub command: String,

    #[serde(default = "default_config_flag")]
    pub config_flag: String,

    /// Fixed path of the rendered configuration artifact
    #[serde(default = "default_config_path")]
    pub config_path: PathBuf,

    /// How long a stop waits for the worker to be reaped (milliseconds)
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}
impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            command: default_command(),
            config_flag: default_config_flag(),
            config_path: default_config_path(),
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }
}
impl CollectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.shell.trim().is_empty() {
            return Err(Error::InvalidConfig("collector.shell cannot be empty".into()));
        }
        if self.command.trim().is_empty() {
            return Err(Error::InvalidConfig("collector.command cannot be empty".into()));
        }
        if self.config_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("collector.config_path cannot be empty".into()));
        }
        if self.config_path.file_name().is_none() {
            return Err(Error::InvalidConfig(format!(
                "collector.config_path {} does not name a file",
                self.config_path.display()
            )));
        }
        if self.stop_timeout_ms == 0 {
            return Err(Error::InvalidConfig("collector.stop_timeout_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

fn default_shell() -> String {
    "sh".to_string()
}
fn default_command() -> String {
    "exec telegraf".to_string()
}
fn default_config_flag() -> String {
    "-config".to_string()
}
fn default_config_path() -> PathBuf {
    PathBuf::from("/tmp/telegraf.conf")
}
fn default_stop_timeout_ms() -> u64 {
    10_000
}
