// -
// Template sections

/// File names (config map keys) of the three template sections
pub(crate) const TEMPLATE_INIT_KEY: &str = "telegraf-init";
pub(crate) const TEMPLATE_OUTPUTS_KEY: &str = "telegraf-outputs";
pub(crate) const TEMPLATE_INPUTS_KEY: &str = "telegraf-inputs";

/// Placeholder suffixes appended to the configured placeholder prefix
pub(crate) const PLACEHOLDER_DB_NAME: &str = "DBNAME";
pub(crate) const PLACEHOLDER_DB_SERVICE: &str = "DBSERVICE";
pub(crate) const PLACEHOLDER_DB_PORT: &str = "DBPORT";
pub(crate) const PLACEHOLDER_DB_PASS: &str = "DBPASS";

// -
// Secrets

/// Secret key is `<instance><CREDENTIALS_SECRET_SUFFIX>`
pub(crate) const CREDENTIALS_SECRET_SUFFIX: &str = "-credentials";

// -
// Supervisor

/// Logical name of the single supervised collector worker
pub const MONITORING_WORKER_NAME: &str = "monitoring";

// -
// Deployment env

pub(crate) const ENV_REDIS_PORT: &str = "REDIS_PORT";
pub(crate) const ENV_TLS_ENABLED: &str = "TLS_ENABLED";
pub(crate) const ENV_TLS_ROOTCERT: &str = "TLS_ROOTCERT";
