use tokio::sync::oneshot;

use super::CoordinatorStatus;
use super::RefreshOutcome;
use crate::InstanceConfig;
use crate::Result;

/// Inbound requests of the coordinator actor
#[derive(Debug)]
pub(crate) enum CoordinatorEvent {
    Register(InstanceConfig),
    Deregister(String),
    /// Refresh now and report the result, bypassing the quiet period
    Refresh(oneshot::Sender<Result<RefreshOutcome>>),
    Status(oneshot::Sender<CoordinatorStatus>),
}

impl CoordinatorEvent {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            CoordinatorEvent::Register(_) => "register",
            CoordinatorEvent::Deregister(_) => "deregister",
            CoordinatorEvent::Refresh(_) => "refresh",
            CoordinatorEvent::Status(_) => "status",
        }
    }
}
