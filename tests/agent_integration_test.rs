mod commons;

use std::sync::Arc;
use std::time::Duration;

use commons::wait_until;
use commons::Deployment;
use dbmon::ConfigRenderer;
use dbmon::ConfigTemplate;
use dbmon::Coordinator;
use dbmon::CoordinatorHandle;
use dbmon::FileSecretStore;
use dbmon::ProcessSupervisor;
use dbmon::RefreshOutcome;
use dbmon::WorkerState;
use dbmon::MONITORING_WORKER_NAME;
use tokio::sync::watch;
use tokio::task::JoinHandle;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

struct RunningAgent {
    handle: CoordinatorHandle,
    shutdown_tx: watch::Sender<()>,
    actor: JoinHandle<dbmon::Result<()>>,
}

fn start_agent(deployment: &Deployment) -> RunningAgent {
    let config = deployment.config().validate().unwrap();
    let template = ConfigTemplate::load_from_dir(&config.template.dir).unwrap();
    let renderer = ConfigRenderer::new(
        template,
        Arc::new(FileSecretStore::from_config(&config.secrets)),
        config.cluster.namespace.clone(),
        config.template.placeholder_prefix.clone(),
    );
    let supervisor = ProcessSupervisor::new(MONITORING_WORKER_NAME, config.collector.stop_timeout());
    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let mut coordinator = Coordinator::new(&config, renderer, supervisor, shutdown_rx);
    let handle = coordinator.handle();
    let actor = tokio::spawn(async move { coordinator.run().await });

    RunningAgent {
        handle,
        shutdown_tx,
        actor,
    }
}

async fn worker_state(handle: &CoordinatorHandle) -> WorkerState {
    handle.status().await.unwrap().worker
}

#[tokio::test]
async fn test_collector_follows_registered_instances() {
    enable_logger();
    let dir = tempfile::tempdir().unwrap();
    let deployment = Deployment::new(dir.path());
    deployment.add_secret("cache", "cache-pw");
    deployment.add_secret("sessions", "sessions-pw");
    let agent = start_agent(&deployment);

    agent.handle.register("cache", "6379", false, "");
    agent.handle.register("sessions", "6380", true, "/certs/ca.crt");

    assert!(wait_until(|| deployment.collector_env().is_some()).await);
    let env = deployment.collector_env().unwrap();
    assert_eq!(
        env,
        "TELEGRAF_REDIS_PREFIX_CACHE=cache-pw\nTELEGRAF_REDIS_PREFIX_SESSIONS=sessions-pw\n"
    );
    let conf = deployment.collector_conf().unwrap();
    assert!(conf.contains("tcp://cache.redis.svc:6379"));
    assert!(conf.contains("tcp://sessions.redis.svc:6380"));
    assert!(!conf.contains("-pw"));
    assert_eq!(worker_state(&agent.handle).await, WorkerState::Running);

    // Dropping the last instances leaves no collector behind
    deployment.reset_observations();
    agent.handle.deregister("cache");
    agent.handle.deregister("sessions");
    tokio::time::sleep(Duration::from_millis(500)).await;

    let status = agent.handle.status().await.unwrap();
    assert!(status.instances.is_empty());
    assert_eq!(status.worker, WorkerState::Stopped);
    assert!(deployment.collector_env().is_none());

    agent.shutdown_tx.send(()).unwrap();
    agent.actor.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_missing_secret_leaves_collector_stopped_until_fixed() {
    enable_logger();
    let dir = tempfile::tempdir().unwrap();
    let deployment = Deployment::new(dir.path());
    let agent = start_agent(&deployment);

    agent.handle.register("cache", "6379", false, "");
    assert!(agent.handle.refresh().await.is_err());
    assert_eq!(worker_state(&agent.handle).await, WorkerState::Stopped);

    deployment.add_secret("cache", "late-pw");
    let outcome = agent.handle.refresh().await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Started { instances: 1 });
    assert!(wait_until(|| deployment.collector_env().is_some()).await);
    assert_eq!(
        deployment.collector_env().unwrap(),
        "TELEGRAF_REDIS_PREFIX_CACHE=late-pw\n"
    );

    agent.shutdown_tx.send(()).unwrap();
    agent.actor.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_terminates_collector() {
    enable_logger();
    let dir = tempfile::tempdir().unwrap();
    let deployment = Deployment::new(dir.path());
    deployment.add_secret("cache", "cache-pw");
    let agent = start_agent(&deployment);

    agent.handle.register("cache", "6379", false, "");
    assert_eq!(
        agent.handle.refresh().await.unwrap(),
        RefreshOutcome::Started { instances: 1 }
    );
    assert_eq!(worker_state(&agent.handle).await, WorkerState::Running);

    agent.shutdown_tx.send(()).unwrap();
    agent.actor.await.unwrap().unwrap();

    assert!(agent.handle.status().await.is_err());
}
