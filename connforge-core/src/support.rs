//! Backend authentication capability declarations.
//!
//! This module defines:
//! - [`DatabaseType`] - Identifier for a backend type (e.g. "postgres")
//! - [`DatabaseSupport`] - A backend type's registry of accepted
//!   authentication mechanisms and configuration kinds
//!
//! Connectors register a [`DatabaseSupport`] into an
//! [`Environment`](crate::Environment) at startup; everything is validated
//! eagerly by the builder and immutable afterward.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::authentication::{
    AuthenticationConfigurationKind, AuthenticationMechanism, AuthenticationMechanismType,
};
use crate::error::ConfigurationError;

/// Identifier for a backend type (e.g. "postgres", "snowflake").
///
/// Backend types are open-ended: connectors are developed independently of
/// this crate, so this is a plain identifier rather than a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatabaseType(String);

impl DatabaseType {
    /// Create a new database type identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DatabaseType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DatabaseType {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A backend type's declared authentication capabilities.
///
/// Holds one [`AuthenticationMechanism`] per mechanism type; no configuration
/// kind may be claimed by two mechanisms within the same support. Built once
/// via [`DatabaseSupport::builder()`] and immutable afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSupport {
    database_type: DatabaseType,
    mechanisms: Vec<AuthenticationMechanism>,
}

impl DatabaseSupport {
    /// Start building a database support.
    pub fn builder() -> DatabaseSupportBuilder {
        DatabaseSupportBuilder::default()
    }

    /// The backend type this support describes.
    pub fn database_type(&self) -> &DatabaseType {
        &self.database_type
    }

    /// All declared mechanisms, in registration order.
    pub fn authentication_mechanisms(&self) -> &[AuthenticationMechanism] {
        &self.mechanisms
    }

    /// The mechanism registered for the given type, if any.
    pub fn authentication_mechanism(
        &self,
        mechanism_type: AuthenticationMechanismType,
    ) -> Option<&AuthenticationMechanism> {
        self.mechanisms
            .iter()
            .find(|mechanism| mechanism.mechanism_type() == mechanism_type)
    }

    /// The mechanism claiming the given configuration kind, if any.
    ///
    /// At most one mechanism can claim a kind; the builder enforces this.
    pub fn mechanism_for_configuration(
        &self,
        kind: AuthenticationConfigurationKind,
    ) -> Option<&AuthenticationMechanism> {
        self.mechanisms
            .iter()
            .find(|mechanism| mechanism.accepts(kind))
    }

    /// Every accepted configuration kind, in mechanism then declaration order.
    pub fn configuration_kinds(&self) -> Vec<AuthenticationConfigurationKind> {
        self.mechanisms
            .iter()
            .flat_map(|mechanism| mechanism.configuration_kinds().iter().copied())
            .collect()
    }
}

/// Fluent builder for [`DatabaseSupport`].
#[derive(Debug, Default)]
pub struct DatabaseSupportBuilder {
    database_type: Option<DatabaseType>,
    mechanisms: Vec<AuthenticationMechanism>,
}

impl DatabaseSupportBuilder {
    /// Set the backend type identifier (mandatory).
    pub fn database_type(mut self, database_type: impl Into<DatabaseType>) -> Self {
        self.database_type = Some(database_type.into());
        self
    }

    /// Register one authentication mechanism.
    pub fn authentication_mechanism(mut self, mechanism: AuthenticationMechanism) -> Self {
        self.mechanisms.push(mechanism);
        self
    }

    /// Register several authentication mechanisms.
    pub fn authentication_mechanisms(
        mut self,
        mechanisms: impl IntoIterator<Item = AuthenticationMechanism>,
    ) -> Self {
        self.mechanisms.extend(mechanisms);
        self
    }

    /// Validate all registration rules and build the support.
    pub fn build(self) -> Result<DatabaseSupport, ConfigurationError> {
        let database_type = self
            .database_type
            .ok_or(ConfigurationError::MissingDatabaseType)?;

        let mut seen_types: Vec<AuthenticationMechanismType> = Vec::new();
        let mut claimed_kinds: Vec<AuthenticationConfigurationKind> = Vec::new();
        for mechanism in &self.mechanisms {
            let mechanism_type = mechanism.mechanism_type();
            if seen_types.contains(&mechanism_type) {
                return Err(ConfigurationError::DuplicateMechanism {
                    mechanism: mechanism_type.identifier().to_string(),
                });
            }
            seen_types.push(mechanism_type);

            if mechanism.configuration_kinds().is_empty() {
                return Err(ConfigurationError::EmptyMechanism {
                    mechanism: mechanism_type.identifier().to_string(),
                });
            }
            for kind in mechanism.configuration_kinds() {
                if claimed_kinds.contains(kind) {
                    return Err(ConfigurationError::ConfigurationClaimedTwice {
                        configuration: kind.name().to_string(),
                    });
                }
                claimed_kinds.push(*kind);
            }
        }

        Ok(DatabaseSupport {
            database_type,
            mechanisms: self.mechanisms,
        })
    }
}
