use serial_test::serial;
use temp_env::with_vars;

use super::*;
use crate::Error;

fn cleanup_all_agent_env_vars() {
    for (key, _) in std::env::vars() {
        if key.starts_with("AGENT__") || key == "CONFIG_PATH" {
            std::env::remove_var(&key);
        }
    }
}

#[test]
#[serial]
fn default_config_should_initialize_with_hardcoded_values() {
    let config = AgentConfig::default();

    assert_eq!(config.cluster.default_port, "6379");
    assert_eq!(config.debounce.quiet_period_ms, 5_000);
    assert_eq!(config.collector.shell, "sh");
    assert_eq!(config.collector.config_flag, "-config");
    assert_eq!(config.collector.config_path.to_str(), Some("/tmp/telegraf.conf"));
    assert_eq!(config.template.placeholder_prefix, "TELEGRAF_REDIS_PREFIX_");
    assert_eq!(config.secrets.password_field, "password");
    assert!(!config.log.debug);
}

#[test]
#[serial]
fn new_should_merge_environment_overrides() {
    cleanup_all_agent_env_vars();
    with_vars(
        vec![
            ("AGENT__CLUSTER__NAMESPACE", Some("redis-prod")),
            ("AGENT__DEBOUNCE__QUIET_PERIOD_MS", Some("250")),
            ("AGENT__LOG__DEBUG", Some("true")),
        ],
        || {
            let config = AgentConfig::new().unwrap();

            assert_eq!(config.cluster.namespace, "redis-prod");
            assert_eq!(config.debounce.quiet_period_ms, 250);
            assert!(config.log.debug);
            assert_eq!(config.log.default_filter(), "debug");
        },
    );
}

#[test]
#[serial]
fn with_override_config_should_merge_file_settings() {
    cleanup_all_agent_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("agent_override.toml");

    std::fs::write(
        &config_path,
        r#"
        [cluster]
        namespace = "cache"

        [collector]
        command = "exec /sbin/tini -- telegraf"
        config_path = "/var/run/telegraf/telegraf.conf"
        "#,
    )
    .unwrap();

    let empty_vars: Vec<(&str, Option<&str>)> = vec![];
    with_vars(empty_vars, || {
        let base_config = AgentConfig::new().expect("success");
        let config = base_config
            .with_override_config(config_path.to_str().unwrap())
            .expect("override should succeed");

        assert_eq!(config.cluster.namespace, "cache");
        assert_eq!(config.collector.command, "exec /sbin/tini -- telegraf");
        assert_eq!(
            config.collector.config_path.to_str(),
            Some("/var/run/telegraf/telegraf.conf")
        );
        // Untouched sections keep their defaults
        assert_eq!(config.collector.shell, "sh");
        assert_eq!(config.debounce.quiet_period_ms, 5_000);
    });
}

#[test]
#[serial]
fn environment_variables_should_have_highest_priority() {
    cleanup_all_agent_env_vars();
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("agent.toml");
    std::fs::write(
        &config_path,
        r#"
        [cluster]
        namespace = "from-file"
        default_port = "7000"
        "#,
    )
    .unwrap();

    with_vars(
        vec![
            ("CONFIG_PATH", Some(config_path.to_str().unwrap())),
            ("AGENT__CLUSTER__NAMESPACE", Some("from-env")),
        ],
        || {
            let config = AgentConfig::new().unwrap();

            assert_eq!(config.cluster.namespace, "from-env");
            assert_eq!(config.cluster.default_port, "7000");
        },
    );
}

#[test]
#[serial]
fn missing_config_path_file_should_fail() {
    cleanup_all_agent_env_vars();
    with_vars(vec![("CONFIG_PATH", Some("/nonexistent/agent.toml"))], || {
        assert!(AgentConfig::new().is_err());
    });
}

#[test]
fn validation_should_require_namespace() {
    let config = AgentConfig::default();

    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
}

#[test]
fn validation_should_accept_defaults_with_namespace() {
    let mut config = AgentConfig::default();
    config.cluster.namespace = "redis".into();

    assert!(config.validate().is_ok());
}

#[test]
fn validation_should_reject_zero_quiet_period() {
    let mut config = AgentConfig::default();
    config.cluster.namespace = "redis".into();
    config.debounce.quiet_period_ms = 0;

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_empty_collector_command() {
    let mut config = AgentConfig::default();
    config.cluster.namespace = "redis".into();
    config.collector.command = "  ".into();

    assert!(config.validate().is_err());
}

#[test]
fn validation_should_reject_invalid_placeholder_prefix() {
    let mut config = AgentConfig::default();
    config.cluster.namespace = "redis".into();
    config.template.placeholder_prefix = "TELEGRAF-PREFIX".into();

    assert!(config.validate().is_err());
}
