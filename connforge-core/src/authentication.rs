//! Authentication configuration and mechanism model.
//!
//! This module defines:
//! - [`AuthenticationConfiguration`] - Declarative description of how to authenticate
//! - [`AuthenticationConfigurationKind`] - The payload-free tag of a configuration variant
//! - [`AuthenticationMechanismType`] - A named family of authentication
//! - [`AuthenticationMechanism`] - A mechanism type plus its accepted configuration kinds
//!
//! Configuration values are typically produced by configuration or
//! deserialization layers upstream of this crate; everything here is
//! immutable once built.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigurationError;
use crate::secret::Secret;

/// Declarative description of desired authentication parameters.
///
/// Each variant exposes a short stable identifier via
/// [`short_id()`](AuthenticationConfiguration::short_id) and a payload-free
/// tag via [`kind()`](AuthenticationConfiguration::kind).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthenticationConfiguration {
    /// Authenticate with a username and password.
    UserPassword { username: String, password: Secret },

    /// Authenticate with a named API key.
    ApiKey { key_name: String, value: Secret },

    /// Authenticate with an encrypted private key and its passphrase.
    EncryptedPrivateKey {
        private_key: Secret,
        passphrase: Secret,
    },

    /// Authenticate with the caller's Kerberos session.
    Kerberos,

    /// Authenticate as an OAuth client.
    OAuthClient {
        client_id: String,
        client_secret: Secret,
        scopes: Vec<String>,
    },
}

impl AuthenticationConfiguration {
    /// The payload-free tag of this configuration.
    pub fn kind(&self) -> AuthenticationConfigurationKind {
        match self {
            Self::UserPassword { .. } => AuthenticationConfigurationKind::UserPassword,
            Self::ApiKey { .. } => AuthenticationConfigurationKind::ApiKey,
            Self::EncryptedPrivateKey { .. } => {
                AuthenticationConfigurationKind::EncryptedPrivateKey
            }
            Self::Kerberos => AuthenticationConfigurationKind::Kerberos,
            Self::OAuthClient { .. } => AuthenticationConfigurationKind::OAuthClient,
        }
    }

    /// Short stable identifier of the variant (e.g. for serialized configs).
    pub fn short_id(&self) -> &'static str {
        match self {
            Self::UserPassword { .. } => "user-password",
            Self::ApiKey { .. } => "api-key",
            Self::EncryptedPrivateKey { .. } => "encrypted-private-key",
            Self::Kerberos => "kerberos",
            Self::OAuthClient { .. } => "oauth-client",
        }
    }
}

/// The tag identifying an [`AuthenticationConfiguration`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationConfigurationKind {
    UserPassword,
    ApiKey,
    EncryptedPrivateKey,
    Kerberos,
    OAuthClient,
}

impl AuthenticationConfigurationKind {
    /// The display name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserPassword => "UserPassword",
            Self::ApiKey => "ApiKey",
            Self::EncryptedPrivateKey => "EncryptedPrivateKey",
            Self::Kerberos => "Kerberos",
            Self::OAuthClient => "OAuthClient",
        }
    }
}

impl fmt::Display for AuthenticationConfigurationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A named family of authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationMechanismType {
    UserPassword,
    ApiKey,
    KeyPair,
    Kerberos,
    OAuth,
}

impl AuthenticationMechanismType {
    /// The display identifier used in diagnostics.
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::UserPassword => "UserPassword",
            Self::ApiKey => "ApiKey",
            Self::KeyPair => "KeyPair",
            Self::Kerberos => "Kerberos",
            Self::OAuth => "OAuth",
        }
    }
}

impl fmt::Display for AuthenticationMechanismType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// Binds one [`AuthenticationMechanismType`] to the configuration kinds it
/// accepts.
///
/// An empty kind set is legal at construction: when a mechanism entry is used
/// to narrow a [`Connection`](crate::Connection), an empty set means "inherit
/// every kind the database support declares for this mechanism". Registering
/// a mechanism with an empty kind set in a
/// [`DatabaseSupport`](crate::DatabaseSupport) is rejected there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationMechanism {
    mechanism_type: AuthenticationMechanismType,
    configuration_kinds: Vec<AuthenticationConfigurationKind>,
}

impl AuthenticationMechanism {
    /// Start building a mechanism.
    pub fn builder() -> AuthenticationMechanismBuilder {
        AuthenticationMechanismBuilder::default()
    }

    /// The mechanism family.
    pub fn mechanism_type(&self) -> AuthenticationMechanismType {
        self.mechanism_type
    }

    /// Accepted configuration kinds, in declaration order.
    pub fn configuration_kinds(&self) -> &[AuthenticationConfigurationKind] {
        &self.configuration_kinds
    }

    /// Whether this mechanism accepts the given configuration kind.
    pub fn accepts(&self, kind: AuthenticationConfigurationKind) -> bool {
        self.configuration_kinds.contains(&kind)
    }

    /// Same mechanism with a replaced configuration kind set.
    pub(crate) fn with_configuration_kinds(
        &self,
        configuration_kinds: Vec<AuthenticationConfigurationKind>,
    ) -> Self {
        Self {
            mechanism_type: self.mechanism_type,
            configuration_kinds,
        }
    }
}

/// Fluent builder for [`AuthenticationMechanism`].
#[derive(Debug, Default)]
pub struct AuthenticationMechanismBuilder {
    mechanism_type: Option<AuthenticationMechanismType>,
    configuration_kinds: Vec<AuthenticationConfigurationKind>,
}

impl AuthenticationMechanismBuilder {
    /// Set the mechanism family (mandatory).
    pub fn mechanism_type(mut self, mechanism_type: AuthenticationMechanismType) -> Self {
        self.mechanism_type = Some(mechanism_type);
        self
    }

    /// Add one accepted configuration kind.
    pub fn configuration_kind(mut self, kind: AuthenticationConfigurationKind) -> Self {
        self.configuration_kinds.push(kind);
        self
    }

    /// Add several accepted configuration kinds.
    pub fn configuration_kinds(
        mut self,
        kinds: impl IntoIterator<Item = AuthenticationConfigurationKind>,
    ) -> Self {
        self.configuration_kinds.extend(kinds);
        self
    }

    /// Validate and build the mechanism.
    pub fn build(self) -> Result<AuthenticationMechanism, ConfigurationError> {
        let mechanism_type = self
            .mechanism_type
            .ok_or(ConfigurationError::MissingMechanismType)?;
        let mut configuration_kinds = Vec::with_capacity(self.configuration_kinds.len());
        for kind in self.configuration_kinds {
            if !configuration_kinds.contains(&kind) {
                configuration_kinds.push(kind);
            }
        }
        Ok(AuthenticationMechanism {
            mechanism_type,
            configuration_kinds,
        })
    }
}
