//! Top-level error types for Connforge.
//!
//! Three error classes exist, and none of them is ever retried here:
//! - [`ConfigurationError`] - builder-time validation failures (fail fast)
//! - [`ResolveError`](crate::resolve::ResolveError) - flow-resolution failures
//! - execution failures, propagated verbatim from credential or connection
//!   builders as [`anyhow::Error`]
//!
//! All configuration and resolution errors are deterministic: identical
//! inputs always yield identical outcomes.

use std::fmt;
use thiserror::Error;

use crate::resolve::ResolveError;

/// Builder-time validation failure.
///
/// Raised eagerly by the fluent builders for
/// [`AuthenticationMechanism`](crate::AuthenticationMechanism),
/// [`DatabaseSupport`](crate::DatabaseSupport),
/// [`Connection`](crate::Connection), [`Environment`](crate::Environment),
/// and [`ConnectionFactory`](crate::ConnectionFactory).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Database type is missing")]
    MissingDatabaseType,

    #[error("Authentication mechanism type is missing")]
    MissingMechanismType,

    #[error("Found multiple authentication mechanisms with type '{mechanism}'")]
    DuplicateMechanism { mechanism: String },

    #[error(
        "Authentication configuration type '{configuration}' is associated with multiple authentication mechanisms"
    )]
    ConfigurationClaimedTwice { configuration: String },

    #[error(
        "No authentication configuration type is associated with authentication mechanism '{mechanism}'"
    )]
    EmptyMechanism { mechanism: String },

    #[error("Connection identifier is missing")]
    MissingConnectionIdentifier,

    #[error("Database support is missing")]
    MissingDatabaseSupport,

    #[error("Connection specification is missing")]
    MissingConnectionSpecification,

    #[error("Found multiple configurations for authentication mechanism '{mechanism}'")]
    DuplicateMechanismConfiguration { mechanism: String },

    #[error(
        "Authentication mechanism '{mechanism}' is not covered by database support '{support}'. Supported mechanism(s):\n{supported}"
    )]
    UnsupportedMechanism {
        mechanism: String,
        support: String,
        supported: String,
    },

    #[error(
        "Authentication configuration type '{configuration}' is not covered by database support '{support}' for authentication mechanism '{mechanism}'. Supported configuration type(s):\n{supported}"
    )]
    UnsupportedMechanismConfiguration {
        configuration: String,
        support: String,
        mechanism: String,
        supported: String,
    },

    #[error("Authentication configuration is missing")]
    MissingAuthenticationConfiguration,

    #[error(
        "Specified authentication configuration of type '{configuration}' is not compatible. Supported configuration type(s):\n{supported}"
    )]
    IncompatibleConfiguration {
        configuration: String,
        supported: String,
    },

    #[error("Found multiple database supports with type '{database_type}'")]
    DuplicateDatabaseSupport { database_type: String },

    #[error("Environment is missing")]
    MissingEnvironment,
}

/// Render items as the `- item` bullet list used by diagnostics.
pub(crate) fn bullet_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: fmt::Display,
{
    items
        .into_iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Top-level error type encompassing all Connforge errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Builder-time validation failure.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Authentication-flow resolution failure.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Failure inside a connection manager's one-time initialization hook.
    #[error("connection manager initialization failed: {0}")]
    Initialization(#[source] anyhow::Error),

    /// Failure propagated verbatim from a credential or connection builder.
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}
