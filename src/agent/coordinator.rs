use std::path::Path;

use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::time::sleep_until;
use tokio::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::CoordinatorEvent;
use super::DebounceTimer;
use crate::AgentConfig;
use crate::CollectorConfig;
use crate::CommandLine;
use crate::ConfigRenderer;
use crate::Error;
use crate::InstanceConfig;
use crate::InstanceRegistry;
use crate::Result;
use crate::StopOutcome;
use crate::Supervisor;
use crate::WorkerState;
use crate::MONITORED_INSTANCES;
use crate::REFRESH_CYCLES;
use crate::REFRESH_DURATION_MS;
use crate::REGISTRY_EVENTS;
use crate::STOP_OUTCOMES;

/// What a refresh cycle left behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Registry was empty: collector stopped, nothing rendered or started
    Idle,
    /// Collector restarted against a configuration covering `instances`
    Started { instances: usize },
}

impl RefreshOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshOutcome::Idle => "idle",
            RefreshOutcome::Started { .. } => "started",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorPhase {
    Idle,
    /// Debounce deadline armed
    PendingRefresh,
    Refreshing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorStatus {
    pub phase: CoordinatorPhase,
    /// Registered instance names, sorted
    pub instances: Vec<String>,
    pub worker: WorkerState,
    /// Time until the pending refresh fires
    pub next_refresh_in: Option<Duration>,
}

/// Cloneable front door of a running [`Coordinator`].
///
/// Registry mutations are fire-and-forget and never fail; if the coordinator
/// is gone they are dropped with a warning.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    event_tx: mpsc::UnboundedSender<CoordinatorEvent>,
}

impl CoordinatorHandle {
    /// Track an instance; replaces any previous entry with the same name
    pub fn register(
        &self,
        name: impl Into<String>,
        port: impl Into<String>,
        tls_enabled: bool,
        ca_file: impl Into<String>,
    ) {
        self.register_instance(InstanceConfig::new(name, port, tls_enabled, ca_file));
    }

    pub fn register_instance(
        &self,
        instance: InstanceConfig,
    ) {
        self.send(CoordinatorEvent::Register(instance));
    }

    /// Stop tracking `name`; unknown names still re-arm the debounce timer
    pub fn deregister(
        &self,
        name: impl Into<String>,
    ) {
        self.send(CoordinatorEvent::Deregister(name.into()));
    }

    /// Runs a refresh cycle right away and waits for its result.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.event_tx
            .send(CoordinatorEvent::Refresh(resp_tx))
            .map_err(|e| Error::CoordinatorClosed(format!("{} request not delivered", e.0.kind())))?;
        resp_rx
            .await
            .map_err(|e| Error::CoordinatorClosed(e.to_string()))?
    }

    pub async fn status(&self) -> Result<CoordinatorStatus> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.event_tx
            .send(CoordinatorEvent::Status(resp_tx))
            .map_err(|e| Error::CoordinatorClosed(format!("{} request not delivered", e.0.kind())))?;
        resp_rx.await.map_err(|e| Error::CoordinatorClosed(e.to_string()))
    }

    fn send(
        &self,
        event: CoordinatorEvent,
    ) {
        if let Err(e) = self.event_tx.send(event) {
            warn!("Coordinator is closed, dropping {} event", e.0.kind());
        }
    }
}

/// Owns the registry, the debounce timer and the collector worker.
pub struct Coordinator<S>
where S: Supervisor
{
    registry: InstanceRegistry,
    timer: DebounceTimer,
    renderer: ConfigRenderer,
    supervisor: S,
    collector: CollectorConfig,
    phase: CoordinatorPhase,

    // Kept so `event_rx` never reports a closed channel while the actor lives
    event_tx: mpsc::UnboundedSender<CoordinatorEvent>,
    event_rx: mpsc::UnboundedReceiver<CoordinatorEvent>,
    shutdown_signal: watch::Receiver<()>,

    #[cfg(test)]
    test_refresh_listener: Vec<mpsc::UnboundedSender<Option<RefreshOutcome>>>,
}

impl<S> Coordinator<S>
where S: Supervisor
{
    pub fn new(
        config: &AgentConfig,
        renderer: ConfigRenderer,
        supervisor: S,
        shutdown_signal: watch::Receiver<()>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            registry: InstanceRegistry::new(),
            timer: DebounceTimer::new(config.debounce.quiet_period()),
            renderer,
            supervisor,
            collector: config.collector.clone(),
            phase: CoordinatorPhase::Idle,
            event_tx,
            event_rx,
            shutdown_signal,
            #[cfg(test)]
            test_refresh_listener: Vec::new(),
        }
    }

    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle {
            event_tx: self.event_tx.clone(),
        }
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn timer(&self) -> &DebounceTimer {
        &self.timer
    }

    pub fn phase(&self) -> CoordinatorPhase {
        self.phase
    }

    pub fn supervisor(&self) -> &S {
        &self.supervisor
    }

    pub fn artifact_path(&self) -> &Path {
        &self.collector.config_path
    }

    pub fn register(
        &mut self,
        instance: InstanceConfig,
    ) {
        REGISTRY_EVENTS.with_label_values(&["register"]).inc();
        let name = instance.name.clone();
        if let Some(previous) = self.registry.register(instance) {
            debug!("Instance {} replaced: {:?}", name, previous);
        }
        info!("Redis DB {} is added. Scheduling monitoring refresh...", name);
        MONITORED_INSTANCES.set(self.registry.len() as i64);
        self.schedule_refresh();
    }

    pub fn deregister(
        &mut self,
        name: &str,
    ) {
        REGISTRY_EVENTS.with_label_values(&["deregister"]).inc();
        if self.registry.deregister(name).is_none() {
            debug!("Instance {} was not registered", name);
        }
        info!("Redis DB {} is deleted. Scheduling monitoring refresh...", name);
        MONITORED_INSTANCES.set(self.registry.len() as i64);
        self.schedule_refresh();
    }

    /// Stops the collector, renders the registry and starts a new collector.
    ///
    /// # Errors
    /// Render or start failures abort the cycle; the collector stays stopped
    /// until the next cycle.
    pub async fn refresh(&mut self) -> Result<RefreshOutcome> {
        let started_at = Instant::now();
        let result = self.do_refresh().await;
        REFRESH_DURATION_MS.observe(started_at.elapsed().as_secs_f64() * 1000.0);

        let label = match &result {
            Ok(outcome) => outcome.as_str(),
            Err(Error::Render(_)) => "render_failed",
            Err(_) => "start_failed",
        };
        REFRESH_CYCLES.with_label_values(&[label]).inc();

        #[cfg(test)]
        self.notify_refresh(result.as_ref().ok().cloned());

        result
    }

    async fn do_refresh(&mut self) -> Result<RefreshOutcome> {
        info!("Stopping monitoring process...");
        let stop = self.supervisor.stop().await;
        STOP_OUTCOMES.with_label_values(&[stop.as_str()]).inc();
        match &stop {
            StopOutcome::Failed(reason) => {
                warn!("Failed stopping monitoring process, starting a new one anyway: {}", reason)
            }
            outcome => debug!("Monitoring process stop: {:?}", outcome),
        }

        if self.registry.is_empty() {
            info!("No Redis DBs registered, monitoring stays stopped");
            return Ok(RefreshOutcome::Idle);
        }

        let rendered = self
            .renderer
            .render_to(&self.registry, &self.collector.config_path)?;
        let command = CommandLine::for_collector(&self.collector, &self.collector.config_path);

        info!("Starting monitoring process...");
        self.supervisor.start(&command, rendered.env())?;

        Ok(RefreshOutcome::Started {
            instances: self.registry.len(),
        })
    }

    fn schedule_refresh(&mut self) {
        self.timer.reset();
        self.phase = CoordinatorPhase::PendingRefresh;
        trace!("Refresh scheduled in {:?}", self.timer.quiet_period());
    }

    async fn run_refresh_cycle(&mut self) -> Result<RefreshOutcome> {
        self.timer.disarm();
        self.phase = CoordinatorPhase::Refreshing;
        let result = self.refresh().await;
        if let Err(e) = &result {
            error!("Failed refreshing monitoring: {}", e);
        }
        self.phase = CoordinatorPhase::Idle;
        result
    }

    fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            phase: self.phase,
            instances: self.registry.names(),
            worker: self.supervisor.state(),
            next_refresh_in: self.timer.remaining(),
        }
    }

    pub(crate) async fn handle_event(
        &mut self,
        event: CoordinatorEvent,
    ) {
        match event {
            CoordinatorEvent::Register(instance) => self.register(instance),
            CoordinatorEvent::Deregister(name) => self.deregister(&name),
            CoordinatorEvent::Refresh(resp_tx) => {
                let result = self.run_refresh_cycle().await;
                if resp_tx.send(result).is_err() {
                    debug!("Refresh requester went away");
                }
            }
            CoordinatorEvent::Status(resp_tx) => {
                let _ = resp_tx.send(self.status());
            }
        }
    }

    /// Serves events until the shutdown signal; the collector is stopped on exit.
    pub async fn run(&mut self) -> Result<()> {
        info!("Coordinator is running");

        loop {
            let deadline = self.timer.next_deadline();

            tokio::select! {
                biased;
                // P0: shutdown
                _ = self.shutdown_signal.changed() => {
                    info!("Coordinator shutdown signal received.");
                    let stop = self.supervisor.stop().await;
                    STOP_OUTCOMES.with_label_values(&[stop.as_str()]).inc();
                    info!("Monitoring process on shutdown: {:?}", stop);
                    return Ok(());
                }
                // P1: registry and control events; a late event still pushes the deadline
                event = self.event_rx.recv() => {
                    let Some(event) = event else {
                        return Err(Error::CoordinatorClosed("event channel closed".to_string()));
                    };
                    trace!("receive {} event", event.kind());
                    self.handle_event(event).await;
                }
                // P2: quiet period over
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    trace!("debounce timer fired");
                    let _ = self.run_refresh_cycle().await;
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn register_refresh_listener(
        &mut self,
        tx: mpsc::UnboundedSender<Option<RefreshOutcome>>,
    ) {
        self.test_refresh_listener.push(tx);
    }

    #[cfg(test)]
    fn notify_refresh(
        &self,
        outcome: Option<RefreshOutcome>,
    ) {
        for tx in &self.test_refresh_listener {
            let _ = tx.send(outcome.clone());
        }
    }
}
