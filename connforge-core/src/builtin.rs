//! Built-in credential builders for the common authentication flows.
//!
//! These cover the flows whose credential material lives entirely in the
//! [`AuthenticationConfiguration`] (or, for Kerberos, in the caller's
//! session). Builders that call out to vaults or token services belong to
//! integration crates and register through the same
//! [`CredentialBuilder`](crate::CredentialBuilder) trait.

use async_trait::async_trait;

use crate::authentication::{AuthenticationConfiguration, AuthenticationConfigurationKind};
use crate::environment::Environment;
use crate::flow::{CredentialBuilder, CredentialExtractor};
use crate::identity::{Credential, CredentialKind, CredentialSource, Identity};

/// Turns a user-password configuration into a [`Credential::UserPassword`].
#[derive(Debug, Default)]
pub struct UserPasswordCredentialBuilder;

#[async_trait]
impl CredentialBuilder for UserPasswordCredentialBuilder {
    fn configuration_kind(&self) -> AuthenticationConfigurationKind {
        AuthenticationConfigurationKind::UserPassword
    }

    fn input(&self) -> CredentialSource {
        CredentialSource::Any
    }

    fn output(&self) -> CredentialKind {
        CredentialKind::UserPassword
    }

    async fn make_credential(
        &self,
        _identity: &Identity,
        configuration: &AuthenticationConfiguration,
        _input: Option<&Credential>,
        _environment: &Environment,
    ) -> anyhow::Result<Credential> {
        match configuration {
            AuthenticationConfiguration::UserPassword { username, password } => {
                Ok(Credential::UserPassword {
                    username: username.clone(),
                    password: password.clone(),
                })
            }
            other => anyhow::bail!(
                "expected a user-password authentication configuration, got '{}'",
                other.kind()
            ),
        }
    }
}

/// Turns an API-key configuration into a [`Credential::ApiKey`].
#[derive(Debug, Default)]
pub struct ApiKeyCredentialBuilder;

#[async_trait]
impl CredentialBuilder for ApiKeyCredentialBuilder {
    fn configuration_kind(&self) -> AuthenticationConfigurationKind {
        AuthenticationConfigurationKind::ApiKey
    }

    fn input(&self) -> CredentialSource {
        CredentialSource::Any
    }

    fn output(&self) -> CredentialKind {
        CredentialKind::ApiKey
    }

    async fn make_credential(
        &self,
        _identity: &Identity,
        configuration: &AuthenticationConfiguration,
        _input: Option<&Credential>,
        _environment: &Environment,
    ) -> anyhow::Result<Credential> {
        match configuration {
            AuthenticationConfiguration::ApiKey { value, .. } => Ok(Credential::ApiKey {
                value: value.clone(),
            }),
            other => anyhow::bail!(
                "expected an api-key authentication configuration, got '{}'",
                other.kind()
            ),
        }
    }
}

/// Extractor surfacing the Kerberos ticket the caller's session already
/// holds, gated on the Kerberos configuration.
pub fn kerberos_ticket_extractor() -> CredentialExtractor {
    CredentialExtractor::new(
        CredentialKind::KerberosTicket,
        AuthenticationConfigurationKind::Kerberos,
    )
}
