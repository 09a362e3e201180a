use std::collections::BTreeMap;
use std::process::ExitStatus;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::BufReader;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::CommandLine;
use super::StopOutcome;
use super::Supervisor;
use super::WorkerState;
use crate::Result;
use crate::SupervisorError;

/// How the waiter task of a worker ended
#[derive(Debug)]
enum WorkerExit {
    Killed,
    KillFailed(std::io::Error),
    Exited(ExitStatus),
    WaitFailed(std::io::Error),
}

struct WorkerHandle {
    pid: Option<u32>,
    kill_tx: oneshot::Sender<()>,
    exit_task: JoinHandle<WorkerExit>,
}

/// Supervises one OS process bound to a fixed worker name.
pub struct ProcessSupervisor {
    worker_name: String,
    stop_timeout: Duration,
    state: Arc<Mutex<WorkerState>>,
    worker: Option<WorkerHandle>,
}

impl ProcessSupervisor {
    pub fn new(
        worker_name: impl Into<String>,
        stop_timeout: Duration,
    ) -> Self {
        Self {
            worker_name: worker_name.into(),
            stop_timeout,
            state: Arc::new(Mutex::new(WorkerState::Stopped)),
            worker: None,
        }
    }

    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    /// OS process id of the current worker, if one is running
    pub fn pid(&self) -> Option<u32> {
        self.worker.as_ref().and_then(|w| w.pid)
    }

    fn set_state(
        &self,
        state: WorkerState,
    ) {
        *self.state.lock() = state;
    }
}

#[async_trait]
impl Supervisor for ProcessSupervisor {
    fn start(
        &mut self,
        command: &CommandLine,
        env: &BTreeMap<String, String>,
    ) -> Result<()> {
        if self.worker.is_some() {
            return Err(SupervisorError::DuplicateWorker(self.worker_name.clone()).into());
        }

        info!("[Process Master][{}] starting: {}", self.worker_name, command);
        self.set_state(WorkerState::Starting);

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!("[Process Master][{}] spawn failed: {:?}", self.worker_name, e);
                self.set_state(WorkerState::Failed);
                return Err(SupervisorError::Spawn {
                    worker: self.worker_name.clone(),
                    command: command.to_string(),
                    source: e,
                }
                .into());
            }
        };
        let pid = child.id();
        self.set_state(WorkerState::Running);
        debug!("[Process Master][{}] running with pid {:?}", self.worker_name, pid);

        if let Some(stdout) = child.stdout.take() {
            forward_output(self.worker_name.clone(), stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_output(self.worker_name.clone(), stderr);
        }

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let state = self.state.clone();
        let worker_name = self.worker_name.clone();
        let exit_task = tokio::spawn(async move {
            // A dropped sender also resolves `kill_rx`, so losing the supervisor kills the worker
            let exit = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => WorkerExit::Exited(status),
                    Err(e) => WorkerExit::WaitFailed(e),
                },
                _ = kill_rx => match child.kill().await {
                    Ok(()) => WorkerExit::Killed,
                    Err(e) => WorkerExit::KillFailed(e),
                },
            };

            match &exit {
                WorkerExit::Killed => {
                    info!("[Process Master][{}][STOPPED]", worker_name);
                    *state.lock() = WorkerState::Stopped;
                }
                WorkerExit::KillFailed(e) => {
                    error!("[Process Master][{}] kill failed: {:?}", worker_name, e);
                    *state.lock() = WorkerState::Failed;
                }
                WorkerExit::Exited(status) => {
                    error!("[Process Master][{}][FINISHED] Process finished unexpectedly: {}", worker_name, status);
                    *state.lock() = WorkerState::Failed;
                }
                WorkerExit::WaitFailed(e) => {
                    error!("[Process Master][{}][FINISHED] Process finished with error: {:?}", worker_name, e);
                    *state.lock() = WorkerState::Failed;
                }
            }
            exit
        });

        self.worker = Some(WorkerHandle {
            pid,
            kill_tx,
            exit_task,
        });
        Ok(())
    }

    async fn stop(&mut self) -> StopOutcome {
        let Some(mut worker) = self.worker.take() else {
            debug!("[Process Master][{}] stop: no worker", self.worker_name);
            return StopOutcome::NotRunning;
        };

        if worker.kill_tx.send(()).is_err() {
            debug!("[Process Master][{}] worker already finished", self.worker_name);
        }

        let outcome = match timeout(self.stop_timeout, &mut worker.exit_task).await {
            Ok(Ok(WorkerExit::Killed)) => StopOutcome::Stopped,
            Ok(Ok(WorkerExit::Exited(_))) | Ok(Ok(WorkerExit::WaitFailed(_))) => StopOutcome::AlreadyExited,
            Ok(Ok(WorkerExit::KillFailed(e))) => StopOutcome::Failed(format!("kill failed: {}", e)),
            Ok(Err(e)) => StopOutcome::Failed(format!("waiter task failed: {}", e)),
            Err(_) => {
                // Aborting drops the child, which kills it on drop
                worker.exit_task.abort();
                StopOutcome::Failed(format!("not reaped within {:?}", self.stop_timeout))
            }
        };

        match &outcome {
            StopOutcome::Failed(reason) => {
                warn!("[Process Master][{}] stop failed: {}", self.worker_name, reason);
                self.set_state(WorkerState::Failed);
            }
            _ => self.set_state(WorkerState::Stopped),
        }
        outcome
    }

    fn state(&self) -> WorkerState {
        *self.state.lock()
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            info!("[Process Master][{}] dropped with a live worker, killing it", self.worker_name);
            let _ = worker.kill_tx.send(());
        }
    }
}

fn forward_output<R>(
    worker_name: String,
    reader: R,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            info!("[Process Master][{}] {}", worker_name, line);
        }
    });
}
