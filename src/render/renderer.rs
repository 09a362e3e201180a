use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::warn;

use super::ConfigTemplate;
use crate::constants::PLACEHOLDER_DB_NAME;
use crate::constants::PLACEHOLDER_DB_PASS;
use crate::constants::PLACEHOLDER_DB_PORT;
use crate::constants::PLACEHOLDER_DB_SERVICE;
use crate::credentials_secret_key;
use crate::utils::file_io::write_file_atomically;
use crate::InstanceConfig;
use crate::InstanceRegistry;
use crate::RenderError;
use crate::SecretStore;

/// Name of the variable carrying the password of `instance` into the collector.
///
/// The instance name is uppercased and every character other than an ASCII
/// letter or digit becomes `_`, so `cache-1` with the default prefix gives
/// `TELEGRAF_REDIS_PREFIX_CACHE_1`.
pub fn credential_env_name(
    prefix: &str,
    instance: &str,
) -> String {
    let mut name = String::with_capacity(prefix.len() + instance.len());
    name.push_str(prefix);
    name.extend(instance.chars().map(|c| {
        if c.is_ascii_alphanumeric() {
            c.to_ascii_uppercase()
        } else {
            '_'
        }
    }));
    name
}

/// A fully rendered collector configuration.
///
/// `env` holds the credential variables the configuration references; it is
/// handed to the supervisor and applied to the collector process only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConfig {
    content: String,
    env: BTreeMap<String, String>,
}

impl RenderedConfig {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

/// Builds the collector configuration from the template and the live registry.
pub struct ConfigRenderer {
    template: ConfigTemplate,
    secrets: Arc<dyn SecretStore>,
    namespace: String,
    placeholder_prefix: String,
}

impl ConfigRenderer {
    pub fn new(
        template: ConfigTemplate,
        secrets: Arc<dyn SecretStore>,
        namespace: impl Into<String>,
        placeholder_prefix: impl Into<String>,
    ) -> Self {
        Self {
            template,
            secrets,
            namespace: namespace.into(),
            placeholder_prefix: placeholder_prefix.into(),
        }
    }

    pub fn template(&self) -> &ConfigTemplate {
        &self.template
    }

    /// Renders `init`, `outputs` and one filled `inputs` block per instance,
    /// joined with newlines.
    ///
    /// # Errors
    /// - `RenderError::EmptyRegistry` when there is nothing to monitor
    /// - `RenderError::CredentialLookup` when any instance's secret is unavailable;
    ///   nothing is produced in that case
    pub fn render(
        &self,
        registry: &InstanceRegistry,
    ) -> std::result::Result<RenderedConfig, RenderError> {
        if registry.is_empty() {
            return Err(RenderError::EmptyRegistry);
        }
        debug!("Found {} instances", registry.len());

        let mut sections = Vec::with_capacity(registry.len() + 2);
        sections.push(self.template.init().to_string());
        sections.push(self.template.outputs().to_string());

        let mut env = BTreeMap::new();
        for instance in registry.iter() {
            let key = credentials_secret_key(&instance.name);
            let password = self.secrets.password(&key).map_err(|e| {
                error!("Failed reading {} secret: {}", key, e);
                RenderError::CredentialLookup {
                    instance: instance.name.clone(),
                    key: key.clone(),
                    source: e,
                }
            })?;

            let env_name = credential_env_name(&self.placeholder_prefix, &instance.name);
            if env.insert(env_name.clone(), password).is_some() {
                warn!(
                    "Instance {} maps to credential variable {} already used by another instance",
                    instance.name, env_name
                );
            }
            debug!("Variable {} is added to collector environment", env_name);

            sections.push(self.fill_inputs(instance, &env_name));
        }

        let content = sections.join("\n");
        debug!("Collector configuration result:\n{}", content);

        Ok(RenderedConfig { content, env })
    }

    /// Writes the rendered bytes over `path`. The previous artifact stays intact
    /// unless the new one is completely written.
    pub fn write_artifact(
        &self,
        path: &Path,
        rendered: &RenderedConfig,
    ) -> std::result::Result<(), RenderError> {
        write_file_atomically(path, rendered.as_bytes()).map_err(|e| {
            error!("Unable to write to a file {:?}: {}", path, e);
            RenderError::ArtifactWrite {
                path: path.to_path_buf(),
                source: e,
            }
        })
    }

    /// Renders and persists in one step; nothing is written if rendering fails.
    pub fn render_to(
        &self,
        registry: &InstanceRegistry,
        path: &Path,
    ) -> std::result::Result<RenderedConfig, RenderError> {
        let rendered = self.render(registry)?;
        self.write_artifact(path, &rendered)?;
        Ok(rendered)
    }

    fn fill_inputs(
        &self,
        instance: &InstanceConfig,
        env_name: &str,
    ) -> String {
        let prefix = &self.placeholder_prefix;
        let replacements = [
            (format!("{prefix}{PLACEHOLDER_DB_NAME}"), instance.name.clone()),
            (
                format!("{prefix}{PLACEHOLDER_DB_SERVICE}"),
                format!("{}.{}.svc", instance.name, self.namespace),
            ),
            (format!("{prefix}{PLACEHOLDER_DB_PORT}"), instance.port.clone()),
            (format!("{prefix}{PLACEHOLDER_DB_PASS}"), format!("${env_name}")),
        ];

        let mut inputs = self.template.inputs().to_string();
        for (token, value) in &replacements {
            inputs = inputs.replace(token.as_str(), value);
        }
        inputs
    }
}
