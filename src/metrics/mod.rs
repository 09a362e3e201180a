use std::sync::Once;

use lazy_static::lazy_static;
use prometheus::exponential_buckets;
use prometheus::Encoder;
use prometheus::Histogram;
use prometheus::HistogramOpts;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;
use tracing::error;


lazy_static! {
    /// Refresh cycles by outcome: started, idle, render_failed, start_failed
    pub static ref REFRESH_CYCLES: IntCounterVec = IntCounterVec::new(
        Opts::new("refresh_cycles", "Refresh cycles executed, by outcome"),
        &["outcome"]
    )
    .expect("metric can not be created");

    /// Collector stop attempts by outcome: stopped, not_running, already_exited, failed
    pub static ref STOP_OUTCOMES: IntCounterVec = IntCounterVec::new(
        Opts::new("collector_stop_outcomes", "Collector stop attempts, by outcome"),
        &["outcome"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY_EVENTS: IntCounterVec = IntCounterVec::new(
        Opts::new("registry_events", "Register/deregister calls received"),
        &["kind"]
    )
    .expect("metric can not be created");

    pub static ref MONITORED_INSTANCES: IntGauge =
        IntGauge::new("monitored_instances", "Instances currently in the registry")
            .expect("metric can not be created");

    pub static ref REFRESH_DURATION_MS: Histogram = Histogram::with_opts(
        HistogramOpts::new("refresh_duration_ms", "Duration of a refresh cycle in ms")
            .buckets(exponential_buckets(1.0, 2.0, 16).expect("valid buckets"))
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry =
        Registry::new_custom(Some("dbmon".to_string()), None).expect("registry can be created");
}

static REGISTER_ONCE: Once = Once::new();

pub(crate) fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(REFRESH_CYCLES.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(STOP_OUTCOMES.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(REGISTRY_EVENTS.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(MONITORED_INSTANCES.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(REFRESH_DURATION_MS.clone()))
        .expect("collector can be registered");
}

/// Registers the agent metrics into [`REGISTRY`]; later calls are no-ops.
pub fn init_metrics() {
    REGISTER_ONCE.call_once(|| register_custom_metrics(&REGISTRY));
}

/// Prometheus text exposition of [`REGISTRY`], for a host that serves it
pub fn metrics_text() -> String {
    init_metrics();
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
        return String::default();
    }
    match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            error!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    }
}
