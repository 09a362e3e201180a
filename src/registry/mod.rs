//! Instance Registry
//!
//! In-memory set of the database instances currently monitored, keyed by
//! instance name. Owned by the coordinator task; nothing outside of it holds
//! a reference.


use std::collections::BTreeMap;

use tracing::debug;

use crate::constants::ENV_REDIS_PORT;
use crate::constants::ENV_TLS_ENABLED;
use crate::constants::ENV_TLS_ROOTCERT;

/// Connection attributes of one monitored instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceConfig {
    pub name: String,
    /// Not validated; passed through to the rendered configuration as-is
    pub port: String,
    pub tls_enabled: bool,
    /// CA bundle path, empty when TLS is disabled
    pub ca_file: String,
}

impl InstanceConfig {
    pub fn new(
        name: impl Into<String>,
        port: impl Into<String>,
        tls_enabled: bool,
        ca_file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            port: port.into(),
            tls_enabled,
            ca_file: ca_file.into(),
        }
    }

    /// Builds the attributes of an instance from the env of its database container.
    ///
    /// `REDIS_PORT` overrides `default_port`, `TLS_ENABLED` is parsed as a bool
    /// (anything unparseable counts as disabled) and `TLS_ROOTCERT` names the CA bundle.
    pub fn from_container_env<'a, I>(
        name: impl Into<String>,
        env: I,
        default_port: &str,
    ) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut port = default_port.to_string();
        let mut tls_enabled = false;
        let mut ca_file = String::new();

        for (key, value) in env {
            match key {
                ENV_REDIS_PORT => port = value.to_string(),
                ENV_TLS_ENABLED => tls_enabled = parse_bool(value).unwrap_or(false),
                ENV_TLS_ROOTCERT => ca_file = value.to_string(),
                _ => {}
            }
        }

        Self::new(name, port, tls_enabled, ca_file)
    }
}

/// Accepts the spellings deployment manifests commonly use for booleans
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Mapping from instance name to its connection attributes.
///
/// Names are unique; a missing name means the instance is not monitored.
/// Iteration is ordered by name so rendered artifacts are reproducible.
#[derive(Debug, Default, Clone)]
pub struct InstanceRegistry {
    instances: BTreeMap<String, InstanceConfig>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `instance.name`. Last write wins.
    pub fn register(
        &mut self,
        instance: InstanceConfig,
    ) -> Option<InstanceConfig> {
        debug!("registry: register {} (port={})", instance.name, instance.port);
        self.instances.insert(instance.name.clone(), instance)
    }

    /// Removes the entry for `name`; absent names are ignored.
    pub fn deregister(
        &mut self,
        name: &str,
    ) -> Option<InstanceConfig> {
        let removed = self.instances.remove(name);
        if removed.is_none() {
            debug!("registry: deregister of unknown instance {}", name);
        }
        removed
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&InstanceConfig> {
        self.instances.get(name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.instances.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstanceConfig> {
        self.instances.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.instances.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
