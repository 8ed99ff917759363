//! Connection endpoints.
//!
//! This module defines:
//! - [`ConnectionSpecification`] - How a backend endpoint is addressed
//! - [`SpecificationKind`] - The payload-free tag of a specification variant
//! - [`Connection`] - A concrete, validated endpoint narrowing a
//!   [`DatabaseSupport`]'s capabilities
//!
//! A `Connection` inherits everything its database support declares unless it
//! explicitly narrows the mechanism set; narrowing is validated eagerly at
//! build time with exact diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::authentication::{
    AuthenticationConfiguration, AuthenticationConfigurationKind, AuthenticationMechanism,
    AuthenticationMechanismType,
};
use crate::error::{ConfigurationError, bullet_list};
use crate::support::DatabaseSupport;

/// Addressing description of a backend endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectionSpecification {
    /// A JDBC-style static host/port/database address.
    StaticJdbc {
        host: String,
        port: u16,
        database: String,
    },

    /// An HTTP(S) service endpoint.
    HttpService { url: Url },
}

impl ConnectionSpecification {
    /// The payload-free tag of this specification.
    pub fn kind(&self) -> SpecificationKind {
        match self {
            Self::StaticJdbc { .. } => SpecificationKind::StaticJdbc,
            Self::HttpService { .. } => SpecificationKind::HttpService,
        }
    }
}

/// The tag identifying a [`ConnectionSpecification`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecificationKind {
    StaticJdbc,
    HttpService,
}

impl SpecificationKind {
    /// The display name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StaticJdbc => "StaticJdbc",
            Self::HttpService => "HttpService",
        }
    }
}

impl fmt::Display for SpecificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A validated, concrete endpoint narrowing a [`DatabaseSupport`].
///
/// Carries the subset of the support's mechanisms this endpoint accepts
/// (defaulting to all of them) and exactly one stored
/// [`AuthenticationConfiguration`] used when no override is supplied at
/// resolution time. Immutable after [`build()`](ConnectionBuilder::build)
/// and cheap to clone.
#[derive(Debug, Clone)]
pub struct Connection {
    identifier: String,
    database_support: Arc<DatabaseSupport>,
    specification: ConnectionSpecification,
    mechanisms: Vec<AuthenticationMechanism>,
    configuration: AuthenticationConfiguration,
}

impl Connection {
    /// Start building a connection.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::default()
    }

    /// The endpoint identifier (e.g. "analytics::warehouse").
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The backing database support.
    pub fn database_support(&self) -> &DatabaseSupport {
        &self.database_support
    }

    /// How the endpoint is addressed.
    pub fn specification(&self) -> &ConnectionSpecification {
        &self.specification
    }

    /// The stored configuration used when no override is supplied.
    pub fn authentication_configuration(&self) -> &AuthenticationConfiguration {
        &self.configuration
    }

    /// The (narrowed) mechanisms this endpoint accepts.
    pub fn authentication_mechanisms(&self) -> &[AuthenticationMechanism] {
        &self.mechanisms
    }

    /// The mechanism of the given type accepted by this endpoint, if any.
    pub fn authentication_mechanism(
        &self,
        mechanism_type: AuthenticationMechanismType,
    ) -> Option<&AuthenticationMechanism> {
        self.mechanisms
            .iter()
            .find(|mechanism| mechanism.mechanism_type() == mechanism_type)
    }

    /// Every configuration kind this endpoint accepts, in mechanism order.
    pub fn configuration_kinds(&self) -> Vec<AuthenticationConfigurationKind> {
        self.mechanisms
            .iter()
            .flat_map(|mechanism| mechanism.configuration_kinds().iter().copied())
            .collect()
    }

    /// The mechanism claiming the given configuration kind, if any.
    pub fn mechanism_for_configuration(
        &self,
        kind: AuthenticationConfigurationKind,
    ) -> Option<&AuthenticationMechanism> {
        self.mechanisms
            .iter()
            .find(|mechanism| mechanism.accepts(kind))
    }

    /// Whether this endpoint accepts the given configuration kind.
    pub fn accepts_configuration(&self, kind: AuthenticationConfigurationKind) -> bool {
        self.mechanism_for_configuration(kind).is_some()
    }
}

/// Fluent builder for [`Connection`].
///
/// Omitting `authentication_mechanisms` means "inherit every mechanism the
/// database support declares"; an entry with an empty configuration kind set
/// inherits that mechanism's full kind set.
#[derive(Debug, Default)]
pub struct ConnectionBuilder {
    identifier: Option<String>,
    database_support: Option<Arc<DatabaseSupport>>,
    specification: Option<ConnectionSpecification>,
    mechanisms: Vec<AuthenticationMechanism>,
    configuration: Option<AuthenticationConfiguration>,
}

impl ConnectionBuilder {
    /// Set the endpoint identifier (mandatory).
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Set the backing database support (mandatory).
    pub fn database_support(mut self, support: impl Into<Arc<DatabaseSupport>>) -> Self {
        self.database_support = Some(support.into());
        self
    }

    /// Set the connection specification (mandatory).
    pub fn specification(mut self, specification: ConnectionSpecification) -> Self {
        self.specification = Some(specification);
        self
    }

    /// Narrow the accepted mechanisms to one entry.
    pub fn authentication_mechanism(mut self, mechanism: AuthenticationMechanism) -> Self {
        self.mechanisms.push(mechanism);
        self
    }

    /// Narrow the accepted mechanisms to the given entries.
    pub fn authentication_mechanisms(
        mut self,
        mechanisms: impl IntoIterator<Item = AuthenticationMechanism>,
    ) -> Self {
        self.mechanisms.extend(mechanisms);
        self
    }

    /// Set the stored authentication configuration (mandatory).
    pub fn authentication_configuration(
        mut self,
        configuration: AuthenticationConfiguration,
    ) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Validate every connection-time rule and build the endpoint.
    pub fn build(self) -> Result<Connection, ConfigurationError> {
        let identifier = self
            .identifier
            .ok_or(ConfigurationError::MissingConnectionIdentifier)?;
        let database_support = self
            .database_support
            .ok_or(ConfigurationError::MissingDatabaseSupport)?;
        let specification = self
            .specification
            .ok_or(ConfigurationError::MissingConnectionSpecification)?;

        let mechanisms = if self.mechanisms.is_empty() {
            database_support.authentication_mechanisms().to_vec()
        } else {
            let mut narrowed = Vec::with_capacity(self.mechanisms.len());
            let mut seen_types: Vec<AuthenticationMechanismType> = Vec::new();
            for entry in &self.mechanisms {
                let mechanism_type = entry.mechanism_type();
                if seen_types.contains(&mechanism_type) {
                    return Err(ConfigurationError::DuplicateMechanismConfiguration {
                        mechanism: mechanism_type.identifier().to_string(),
                    });
                }
                seen_types.push(mechanism_type);

                let declared = database_support
                    .authentication_mechanism(mechanism_type)
                    .ok_or_else(|| ConfigurationError::UnsupportedMechanism {
                        mechanism: mechanism_type.identifier().to_string(),
                        support: database_support.database_type().to_string(),
                        supported: bullet_list(
                            database_support
                                .authentication_mechanisms()
                                .iter()
                                .map(|mechanism| mechanism.mechanism_type().identifier()),
                        ),
                    })?;

                if entry.configuration_kinds().is_empty() {
                    narrowed.push(declared.clone());
                    continue;
                }
                for kind in entry.configuration_kinds() {
                    if !declared.accepts(*kind) {
                        return Err(ConfigurationError::UnsupportedMechanismConfiguration {
                            configuration: kind.name().to_string(),
                            support: database_support.database_type().to_string(),
                            mechanism: mechanism_type.identifier().to_string(),
                            supported: bullet_list(declared.configuration_kinds()),
                        });
                    }
                }
                narrowed
                    .push(declared.with_configuration_kinds(entry.configuration_kinds().to_vec()));
            }
            narrowed
        };

        let configuration = self
            .configuration
            .ok_or(ConfigurationError::MissingAuthenticationConfiguration)?;
        let accepted = mechanisms
            .iter()
            .any(|mechanism| mechanism.accepts(configuration.kind()));
        if !accepted {
            return Err(ConfigurationError::IncompatibleConfiguration {
                configuration: configuration.kind().name().to_string(),
                supported: bullet_list(
                    mechanisms
                        .iter()
                        .flat_map(|mechanism| mechanism.configuration_kinds().iter()),
                ),
            });
        }

        Ok(Connection {
            identifier,
            database_support,
            specification,
            mechanisms,
            configuration,
        })
    }
}
