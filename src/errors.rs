//! Monitoring Agent Error Hierarchy
//!
//! Defines the error types of the agent, categorized by the component that
//! raises them. Registry mutations never fail; everything else surfaces
//! through a refresh cycle or a loader.

use std::path::PathBuf;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings could not be loaded or deserialized
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Settings loaded but violate a validation rule
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Configuration artifact generation failures
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Collector process lifecycle failures
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    /// Secret store failures outside a render cycle
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// Template section loading failures
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Malformed event feed input
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The coordinator task is gone; requests can no longer be served
    #[error("Coordinator is not running: {0}")]
    CoordinatorClosed(String),

    #[error("{0}")]
    SignalSendFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Rendering requires at least one tracked instance
    #[error("No database instances registered")]
    EmptyRegistry,

    /// Credentials of one instance could not be fetched; aborts the whole render
    #[error("Failed reading secret {key} for instance {instance}")]
    CredentialLookup {
        instance: String,
        key: String,
        #[source]
        source: SecretError,
    },

    /// Artifact could not be created or written
    #[error("Unable to write configuration artifact {path}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Secret {0} not found")]
    NotFound(String),

    #[error("Secret {key} has no field {field}")]
    MissingField { key: String, field: String },

    #[error("Secret {key} is not valid UTF-8")]
    InvalidEncoding { key: String },

    #[error("Secret {key} could not be read")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// A handle for the worker name already exists; stop must precede start
    #[error("Worker {0} is already registered")]
    DuplicateWorker(String),

    #[error("Failed to spawn worker {worker}: {command}")]
    Spawn {
        worker: String,
        command: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template section {section} is missing at {path}")]
    MissingSection {
        section: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template section {0} is empty")]
    EmptySection(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Unknown feed command: {0}")]
    UnknownCommand(String),

    #[error("Feed command {command} requires an instance name")]
    MissingName { command: String },

    #[error("Malformed container env pair: {0}")]
    MalformedPair(String),
}
