use std::sync::Arc;

use dbmon::AgentConfig;
use dbmon::ConfigRenderer;
use dbmon::ConfigTemplate;
use dbmon::Coordinator;
use dbmon::Error;
use dbmon::FileSecretStore;
use dbmon::LogConfig;
use dbmon::ProcessSupervisor;
use dbmon::Result;
use dbmon::MONITORING_WORKER_NAME;
use tokio::io::BufReader;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let settings = AgentConfig::new()?.validate()?;

    // Initializing Logs
    init_observability(&settings.log);
    dbmon::init_metrics();
    debug!("Settings: {:?}", settings);

    let template = ConfigTemplate::load_from_dir(&settings.template.dir)?;
    let secrets = Arc::new(FileSecretStore::from_config(&settings.secrets));
    let renderer = ConfigRenderer::new(
        template,
        secrets,
        settings.cluster.namespace.clone(),
        settings.template.placeholder_prefix.clone(),
    );
    let supervisor = ProcessSupervisor::new(MONITORING_WORKER_NAME, settings.collector.stop_timeout());

    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());

    let mut coordinator = Coordinator::new(&settings, renderer, supervisor, graceful_rx.clone());
    let handle = coordinator.handle();

    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    let default_port = settings.cluster.default_port.clone();
    let feed_shutdown = graceful_rx.clone();
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = dbmon::run_feed(stdin, handle, default_port, feed_shutdown).await {
            error!("Event feed stopped: {:?}", e);
        }
    });

    info!("Monitoring agent started. Waiting for database events on stdin...");
    if let Err(e) = coordinator.run().await {
        error!("coordinator stops: {:?}", e);
    }

    debug!("Final metrics:\n{}", dbmon::metrics_text());
    println!("Exiting program.");
    Ok(())
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    graceful_tx.send(()).map_err(|e| {
        error!("Failed to send shutdown signal: {}", e);
        Error::SignalSendFailed(format!("Failed to send shutdown signal: {}", e))
    })?;

    info!("Shutdown completed");
    Ok(())
}

/// `RUST_LOG` wins over the configured default filter
fn init_observability(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log.default_filter()));
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(filter);
    tracing_subscriber::registry().with(base_subscriber).init();
}
