//! Event Feed
//!
//! Line protocol through which the host reports database lifecycle changes:
//!
//! ```text
//! add <name> [REDIS_PORT=<port>] [TLS_ENABLED=<bool>] [TLS_ROOTCERT=<path>]
//! remove <name>
//! refresh
//! ```
//!
//! `KEY=VALUE` pairs are the environment of the database container; unknown
//! keys are ignored. Blank lines and lines starting with `#` are skipped.


use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::CoordinatorHandle;
use crate::FeedError;
use crate::InstanceConfig;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    Add(InstanceConfig),
    Remove(String),
    Refresh,
}

/// Parses one feed line; `Ok(None)` for blank and comment lines.
pub fn parse_line(
    line: &str,
    default_port: &str,
) -> std::result::Result<Option<FeedCommand>, FeedError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let Some(command) = tokens.next() else {
        return Ok(None);
    };

    match command {
        "add" => {
            let name = tokens.next().ok_or_else(|| FeedError::MissingName {
                command: command.to_string(),
            })?;
            let env = tokens
                .map(|pair| {
                    pair.split_once('=')
                        .filter(|(key, _)| !key.is_empty())
                        .ok_or_else(|| FeedError::MalformedPair(pair.to_string()))
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(Some(FeedCommand::Add(InstanceConfig::from_container_env(
                name,
                env,
                default_port,
            ))))
        }
        "remove" => {
            let name = tokens.next().ok_or_else(|| FeedError::MissingName {
                command: command.to_string(),
            })?;
            Ok(Some(FeedCommand::Remove(name.to_string())))
        }
        "refresh" => Ok(Some(FeedCommand::Refresh)),
        other => Err(FeedError::UnknownCommand(other.to_string())),
    }
}

/// Forwards feed lines from `reader` to the coordinator until EOF or shutdown.
///
/// Malformed lines are logged and skipped.
pub async fn run_feed<R>(
    reader: R,
    handle: CoordinatorHandle,
    default_port: String,
    mut shutdown_signal: watch::Receiver<()>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown_signal.changed() => {
                debug!("Event feed shutdown signal received.");
                return Ok(());
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else {
            info!("Event feed closed");
            return Ok(());
        };

        match parse_line(&line, &default_port) {
            Ok(Some(command)) => dispatch(&handle, command).await,
            Ok(None) => {}
            Err(e) => warn!("Skipping feed line {:?}: {}", line, e),
        }
    }
}

async fn dispatch(
    handle: &CoordinatorHandle,
    command: FeedCommand,
) {
    match command {
        FeedCommand::Add(instance) => {
            info!("Redis DB is added. Starting monitoring...");
            debug!("Redis DB: {:?}", instance);
            handle.register_instance(instance);
        }
        FeedCommand::Remove(name) => {
            info!("Redis DB is deleted. Stopping monitoring...");
            debug!("Redis DB: {}", name);
            handle.deregister(name);
        }
        FeedCommand::Refresh => match handle.refresh().await {
            Ok(outcome) => info!("Manual refresh finished: {:?}", outcome),
            Err(e) => error!("Manual refresh failed: {}", e),
        },
    }
}
