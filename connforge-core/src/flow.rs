//! Credential-flow components: typed graph edges and terminals.
//!
//! This module defines:
//! - [`CredentialBuilder`] - A typed transformation from one credential kind
//!   to another, gated by a configuration kind (an edge of the flow graph)
//! - [`CredentialExtractor`] - The special-case builder whose input and
//!   output kinds are equal: it surfaces a credential the identity already holds
//! - [`ConnectionProvider`] - A typed terminal that turns a fully-resolved
//!   credential into a live connection object
//! - [`ConnectionManager`] - One-time initialization hook owned by a provider
//!
//! Each component declares its type tags explicitly at registration; the
//! resolver matches on those tags, never on runtime type inspection.

use anyhow::anyhow;
use async_trait::async_trait;
use std::any::Any;

use crate::authentication::{AuthenticationConfiguration, AuthenticationConfigurationKind};
use crate::connection::{ConnectionSpecification, SpecificationKind};
use crate::environment::Environment;
use crate::identity::{Credential, CredentialKind, CredentialSource, Identity};

/// A live connection object, as produced by a [`ConnectionProvider`].
///
/// Providers for different backends produce unrelated concrete types, so the
/// factory hands back a type-erased box; callers downcast to the type their
/// provider produces.
pub type LiveConnection = Box<dyn Any + Send + Sync>;

/// A typed edge of the credential-transformation graph.
///
/// Implementations are pure with respect to this crate's state: they may read
/// external systems (e.g. a secret store) but must not mutate anything shared.
/// Failures propagate verbatim to the caller; nothing here retries.
#[async_trait]
pub trait CredentialBuilder: Send + Sync {
    /// The configuration kind gating this edge.
    fn configuration_kind(&self) -> AuthenticationConfigurationKind;

    /// The credential the edge consumes, or [`CredentialSource::Any`] for a
    /// catch-all builder that needs no specific input.
    fn input(&self) -> CredentialSource;

    /// The credential kind the edge produces.
    fn output(&self) -> CredentialKind;

    /// Produce the output credential.
    ///
    /// `input` is `None` exactly when [`input()`](CredentialBuilder::input)
    /// is [`CredentialSource::Any`].
    async fn make_credential(
        &self,
        identity: &Identity,
        configuration: &AuthenticationConfiguration,
        input: Option<&Credential>,
        environment: &Environment,
    ) -> anyhow::Result<Credential>;

    /// `<input>-><output> [<configuration>]`, used in logs and flow summaries.
    fn describe(&self) -> String {
        format!(
            "{}->{} [{}]",
            self.input(),
            self.output(),
            self.configuration_kind()
        )
    }
}

/// A [`CredentialBuilder`] whose input and output kinds are equal.
///
/// An identity's held credential is never accepted implicitly; registering an
/// extractor states explicitly that holding the credential is sufficient for
/// flows gated by the given configuration kind (e.g. an existing Kerberos
/// ticket).
#[derive(Debug, Clone, Copy)]
pub struct CredentialExtractor {
    kind: CredentialKind,
    configuration_kind: AuthenticationConfigurationKind,
}

impl CredentialExtractor {
    /// Extract held credentials of `kind` for flows gated by
    /// `configuration_kind`.
    pub fn new(kind: CredentialKind, configuration_kind: AuthenticationConfigurationKind) -> Self {
        Self {
            kind,
            configuration_kind,
        }
    }
}

#[async_trait]
impl CredentialBuilder for CredentialExtractor {
    fn configuration_kind(&self) -> AuthenticationConfigurationKind {
        self.configuration_kind
    }

    fn input(&self) -> CredentialSource {
        CredentialSource::Kind(self.kind)
    }

    fn output(&self) -> CredentialKind {
        self.kind
    }

    async fn make_credential(
        &self,
        identity: &Identity,
        _configuration: &AuthenticationConfiguration,
        _input: Option<&Credential>,
        _environment: &Environment,
    ) -> anyhow::Result<Credential> {
        identity.credential(self.kind).cloned().ok_or_else(|| {
            anyhow!(
                "identity '{}' holds no credential of type '{}'",
                identity.name(),
                self.kind
            )
        })
    }
}

/// One-time initialization hook owned by a [`ConnectionProvider`].
///
/// Invoked exactly once per registered provider at factory construction,
/// never on the resolution or execution hot path. Typical use: priming a
/// backend driver or connection pool.
pub trait ConnectionManager: Send + Sync {
    fn initialize(&self, environment: &Environment) -> anyhow::Result<()>;
}

/// A typed terminal of the credential-transformation graph.
///
/// Turns a fully-resolved credential plus a connection specification into a
/// live connection object. This is the only place network I/O belongs;
/// timeout and retry policy are the implementation's own responsibility.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// The credential kind this provider requires.
    fn credential_kind(&self) -> CredentialKind;

    /// The specification kind this provider can address.
    fn specification_kind(&self) -> SpecificationKind;

    /// The provider's one-time initialization hook, if it has one.
    fn connection_manager(&self) -> Option<&dyn ConnectionManager> {
        None
    }

    /// Open a live connection.
    async fn open(
        &self,
        specification: &ConnectionSpecification,
        credential: &Credential,
        identity: &Identity,
    ) -> anyhow::Result<LiveConnection>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::Secret;

    fn environment() -> Environment {
        Environment::builder().build().unwrap()
    }

    #[tokio::test]
    async fn test_extractor_returns_held_credential() {
        let held = Credential::KerberosTicket {
            ticket: Secret::new("ticket"),
        };
        let identity = Identity::with_credential("alice", held.clone());
        let extractor = CredentialExtractor::new(
            CredentialKind::KerberosTicket,
            AuthenticationConfigurationKind::Kerberos,
        );

        let extracted = extractor
            .make_credential(
                &identity,
                &AuthenticationConfiguration::Kerberos,
                identity.credential(CredentialKind::KerberosTicket),
                &environment(),
            )
            .await
            .unwrap();
        assert_eq!(extracted, held);
    }

    #[tokio::test]
    async fn test_extractor_fails_without_held_credential() {
        let identity = Identity::new("alice");
        let extractor = CredentialExtractor::new(
            CredentialKind::KerberosTicket,
            AuthenticationConfigurationKind::Kerberos,
        );

        let error = extractor
            .make_credential(
                &identity,
                &AuthenticationConfiguration::Kerberos,
                None,
                &environment(),
            )
            .await
            .unwrap_err();
        assert!(error.to_string().contains("KerberosTicket"));
    }

    #[test]
    fn test_extractor_describe() {
        let extractor = CredentialExtractor::new(
            CredentialKind::ApiKey,
            AuthenticationConfigurationKind::ApiKey,
        );
        assert_eq!(extractor.describe(), "ApiKey->ApiKey [ApiKey]");
    }
}
