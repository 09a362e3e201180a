//! Config Renderer
//!
//! Merges the static collector template with one inputs block per monitored
//! instance and persists the result to the configuration artifact.
//!
//! ## Placeholders
//! The inputs section may contain four tokens built from the configured prefix
//! (default `TELEGRAF_REDIS_PREFIX_`):
//!
//! | Token                | Replaced with                      |
//! |----------------------|------------------------------------|
//! | `<prefix>DBNAME`     | instance name                      |
//! | `<prefix>DBSERVICE`  | `<name>.<namespace>.svc`           |
//! | `<prefix>DBPORT`     | instance port                      |
//! | `<prefix>DBPASS`     | `$<prefix><NAME>` variable reference |
//!
//! Replacement is literal; the tokens must not appear in the template for any
//! other purpose. Plaintext passwords never reach the artifact, they travel in
//! [`RenderedConfig::env`] to the collector process.

mod renderer;
mod template;
pub use renderer::*;
pub use template::*;
