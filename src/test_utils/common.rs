use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::AgentConfig;
use crate::ConfigRenderer;
use crate::ConfigTemplate;
use crate::SecretStore;

pub const TEST_PREFIX: &str = "TELEGRAF_REDIS_PREFIX_";
pub const TEST_INIT: &str = "[agent]\n  interval = \"10s\"";
pub const TEST_OUTPUTS: &str = "[[outputs.prometheus_client]]\n  listen = \":9273\"";
pub const TEST_INPUTS: &str = r#"[[inputs.redis]]
  servers = ["tcp://TELEGRAF_REDIS_PREFIX_DBSERVICE:TELEGRAF_REDIS_PREFIX_DBPORT"]
  password = "TELEGRAF_REDIS_PREFIX_DBPASS""#;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

pub fn test_template() -> ConfigTemplate {
    ConfigTemplate::new(TEST_INIT, TEST_OUTPUTS, TEST_INPUTS).expect("test template is valid")
}

pub fn test_renderer(secrets: Arc<dyn SecretStore>) -> ConfigRenderer {
    ConfigRenderer::new(test_template(), secrets, "redis", TEST_PREFIX)
}

/// Default settings writing the collector configuration to `artifact`
pub fn test_config(artifact: &Path) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.cluster.namespace = "redis".to_string();
    config.collector.config_path = artifact.to_path_buf();
    config
}
