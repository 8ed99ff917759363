//! A resolved authentication plan bound to one connection.

use std::fmt;
use std::sync::Arc;

use crate::authentication::AuthenticationConfiguration;
use crate::connection::Connection;
use crate::environment::Environment;
use crate::flow::{ConnectionProvider, CredentialBuilder};
use crate::identity::{Credential, CredentialKind, CredentialSource, Identity};

/// The output of flow resolution: the connection, the effective
/// authentication configuration, and the concrete builder chain plus
/// provider that will authenticate against the backend.
///
/// An `Authenticator` is immutable and reusable across identities that hold
/// the same credential kinds it was resolved for.
#[derive(Clone)]
pub struct Authenticator {
    connection: Connection,
    configuration: AuthenticationConfiguration,
    source: CredentialSource,
    chain: Vec<Arc<dyn CredentialBuilder>>,
    provider: Arc<dyn ConnectionProvider>,
}

impl Authenticator {
    pub(crate) fn new(
        connection: Connection,
        configuration: AuthenticationConfiguration,
        source: CredentialSource,
        chain: Vec<Arc<dyn CredentialBuilder>>,
        provider: Arc<dyn ConnectionProvider>,
    ) -> Self {
        Self {
            connection,
            configuration,
            source,
            chain,
            provider,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// The effective configuration: the override if one was given, otherwise
    /// the connection's stored configuration.
    pub fn configuration(&self) -> &AuthenticationConfiguration {
        &self.configuration
    }

    /// The credential source the flow starts from.
    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn credential_builders(&self) -> &[Arc<dyn CredentialBuilder>] {
        &self.chain
    }

    pub fn connection_provider(&self) -> &dyn ConnectionProvider {
        self.provider.as_ref()
    }

    /// The credential kind the provider consumes.
    pub fn target(&self) -> CredentialKind {
        self.provider.credential_kind()
    }

    /// One human-readable line per flow step, in execution order.
    pub fn describe_flow(&self) -> Vec<String> {
        self.chain.iter().map(|builder| builder.describe()).collect()
    }

    /// Run the builder chain and produce the credential the provider needs.
    ///
    /// Builder failures propagate verbatim.
    pub async fn make_credential(
        &self,
        identity: &Identity,
        environment: &Environment,
    ) -> anyhow::Result<Credential> {
        let mut current: Option<Credential> = match self.source {
            CredentialSource::Any => None,
            CredentialSource::Kind(kind) => {
                let held = identity.credential(kind).ok_or_else(|| {
                    anyhow::anyhow!(
                        "identity '{}' holds no credential of type '{}'",
                        identity.name(),
                        kind
                    )
                })?;
                Some(held.clone())
            }
        };

        for builder in &self.chain {
            tracing::debug!(
                connection = %self.connection.identifier(),
                step = %builder.describe(),
                "running credential builder"
            );
            let produced = builder
                .make_credential(identity, &self.configuration, current.as_ref(), environment)
                .await?;
            current = Some(produced);
        }

        current.ok_or_else(|| {
            anyhow::anyhow!(
                "authentication flow for connection '{}' produced no credential",
                self.connection.identifier()
            )
        })
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("connection", &self.connection.identifier())
            .field("configuration", &self.configuration.kind())
            .field("source", &self.source)
            .field("flow", &self.describe_flow())
            .field("target", &self.target())
            .finish()
    }
}
