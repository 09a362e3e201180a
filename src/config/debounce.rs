use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DebounceConfig {
    /// Delay after the last registry change before a refresh runs (milliseconds).
    /// Every register/deregister restarts the countdown.
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
}
impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: default_quiet_period_ms(),
        }
    }
}
impl DebounceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.quiet_period_ms == 0 {
            return Err(Error::InvalidConfig("debounce.quiet_period_ms must be > 0".into()));
        }
        Ok(())
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

fn default_quiet_period_ms() -> u64 {
    5_000
}
