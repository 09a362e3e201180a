//! Process Supervisor
//!
//! Owns the lifecycle of the single collector worker:
//!
//! ```text
//! Stopped --start--> Starting --spawned--> Running --stop--> Stopped
//!                        |                    |
//!                        +--spawn error--> Failed <--unexpected exit
//! ```
//!
//! Output and exit of the worker are only logged. Nothing here restarts a
//! crashed worker; the next refresh cycle does.

mod process_supervisor;
pub use process_supervisor::*;


use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::CollectorConfig;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Stopped,
    Starting,
    Running,
    Failed,
}

/// Result of a best-effort stop. Never an error: the caller proceeds in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The worker was running and has been terminated
    Stopped,
    /// No worker handle existed
    NotRunning,
    /// The handle existed but the process had already exited on its own
    AlreadyExited,
    /// Termination could not be confirmed; the handle is dropped anyway
    Failed(String),
}

impl StopOutcome {
    pub fn is_clean(&self) -> bool {
        !matches!(self, StopOutcome::Failed(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StopOutcome::Stopped => "stopped",
            StopOutcome::NotRunning => "not_running",
            StopOutcome::AlreadyExited => "already_exited",
            StopOutcome::Failed(_) => "failed",
        }
    }
}

/// Program and arguments of the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `<shell> -c "<command> <config_flag> <artifact>"`
    pub fn for_collector(
        config: &CollectorConfig,
        artifact: &Path,
    ) -> Self {
        let script = format!(
            "{} {} {}",
            config.command,
            config.config_flag,
            artifact.display()
        );
        Self::new(config.shell.clone(), vec!["-c".to_string(), script])
    }
}

impl fmt::Display for CommandLine {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Supervisor: Send + Sync + 'static {
    /// Launches the worker with `env` added to the inherited environment.
    ///
    /// # Errors
    /// `SupervisorError::DuplicateWorker` if a handle already exists; stop first.
    fn start(
        &mut self,
        command: &CommandLine,
        env: &BTreeMap<String, String>,
    ) -> Result<()>;

    /// Terminates the worker if there is one and releases its handle.
    async fn stop(&mut self) -> StopOutcome;

    fn state(&self) -> WorkerState;
}
