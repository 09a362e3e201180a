use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Where the monitored instances live and how their attributes default
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClusterConfig {
    /// Namespace used to build `<instance>.<namespace>.svc` service addresses
    #[serde(default)]
    pub namespace: String,

    /// Port assumed for instances whose deployment does not declare one
    #[serde(default = "default_instance_port")]
    pub default_port: String,
}
impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            default_port: default_instance_port(),
        }
    }
}
impl ClusterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(Error::InvalidConfig("cluster.namespace must be set".into()));
        }
        if self.namespace.contains(char::is_whitespace) {
            return Err(Error::InvalidConfig(format!(
                "cluster.namespace {:?} contains whitespace",
                self.namespace
            )));
        }
        Ok(())
    }
}

fn default_instance_port() -> String {
    "6379".to_string()
}
