//! Connection factory: registration, flow resolution, connection opening.

use std::sync::Arc;

use crate::authentication::AuthenticationConfiguration;
use crate::authenticator::Authenticator;
use crate::connection::Connection;
use crate::environment::Environment;
use crate::error::{ConfigurationError, Error, bullet_list};
use crate::flow::{ConnectionProvider, CredentialBuilder, LiveConnection};
use crate::identity::Identity;
use crate::resolve::{ResolveError, resolve_flow};

/// The central registry of [`CredentialBuilder`]s and [`ConnectionProvider`]s,
/// bound to one [`Environment`].
///
/// A factory is immutable after [`build()`](ConnectionFactoryBuilder::build)
/// and shareable across threads. Resolution
/// ([`authenticator()`](ConnectionFactory::authenticator)) is synchronous and
/// deterministic; only [`open_connection()`](ConnectionFactory::open_connection)
/// performs I/O.
pub struct ConnectionFactory {
    environment: Arc<Environment>,
    credential_builders: Vec<Arc<dyn CredentialBuilder>>,
    connection_providers: Vec<Arc<dyn ConnectionProvider>>,
}

impl std::fmt::Debug for ConnectionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionFactory")
            .field("environment", &self.environment)
            .field("credential_builders", &self.credential_builders.len())
            .field("connection_providers", &self.connection_providers.len())
            .finish()
    }
}

impl ConnectionFactory {
    /// Start building a factory.
    pub fn builder() -> ConnectionFactoryBuilder {
        ConnectionFactoryBuilder::default()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Resolve the shortest authentication flow from what `identity` holds to
    /// a credential some registered provider can open `connection` with.
    ///
    /// With `configuration` set, only that override is attempted and it must
    /// be accepted by the connection. Without it, the connection's stored
    /// configuration is used.
    pub fn authenticator(
        &self,
        identity: &Identity,
        connection: &Connection,
        configuration: Option<&AuthenticationConfiguration>,
    ) -> Result<Authenticator, ResolveError> {
        if let Some(override_configuration) = configuration {
            let kind = override_configuration.kind();
            if !connection.accepts_configuration(kind) {
                return Err(ResolveError::IncompatibleConfiguration {
                    connection: connection.identifier().to_string(),
                    configuration: kind.name().to_string(),
                    supported: bullet_list(connection.configuration_kinds()),
                });
            }
        }
        let effective = configuration
            .cloned()
            .unwrap_or_else(|| connection.authentication_configuration().clone());

        let specification_kind = connection.specification().kind();
        let resolved = resolve_flow(
            &self.credential_builders,
            &self.connection_providers,
            identity,
            effective.kind(),
            specification_kind,
        );

        let Some(flow) = resolved else {
            return Err(if configuration.is_some() {
                ResolveError::UnresolvableFlow {
                    connection: connection.identifier().to_string(),
                    configuration: effective.kind().to_string(),
                    specification: specification_kind.to_string(),
                }
            } else {
                ResolveError::NoCompatibleFlow {
                    connection: connection.identifier().to_string(),
                    supported: bullet_list(connection.authentication_mechanisms().iter().flat_map(
                        |mechanism| {
                            mechanism.configuration_kinds().iter().map(move |kind| {
                                format!("{} ({})", kind, mechanism.mechanism_type())
                            })
                        },
                    )),
                }
            });
        };

        let chain: Vec<Arc<dyn CredentialBuilder>> = flow
            .chain
            .iter()
            .map(|&index| Arc::clone(&self.credential_builders[index]))
            .collect();
        tracing::debug!(
            connection = %connection.identifier(),
            source = %flow.source,
            steps = chain.len(),
            "resolved authentication flow"
        );
        Ok(Authenticator::new(
            connection.clone(),
            effective,
            flow.source,
            chain,
            Arc::clone(&self.connection_providers[flow.provider]),
        ))
    }

    /// Run the authenticator's flow for `identity` and open the connection.
    pub async fn open_connection(
        &self,
        identity: &Identity,
        authenticator: &Authenticator,
    ) -> Result<LiveConnection, Error> {
        let credential = authenticator
            .make_credential(identity, &self.environment)
            .await?;
        let connection = authenticator.connection();
        tracing::info!(
            connection = %connection.identifier(),
            credential = %credential.kind(),
            "opening connection"
        );
        let live = authenticator
            .connection_provider()
            .open(connection.specification(), &credential, identity)
            .await?;
        Ok(live)
    }
}

/// Fluent builder for [`ConnectionFactory`].
///
/// Registration order is significant: it breaks ties between equally short
/// authentication flows. Re-registering a credential builder with the same
/// (configuration kind, input, output) key, or a connection provider with the
/// same (specification kind, credential kind) key, replaces the earlier value
/// while keeping its position.
#[derive(Default)]
pub struct ConnectionFactoryBuilder {
    environment: Option<Arc<Environment>>,
    credential_builders: Vec<Arc<dyn CredentialBuilder>>,
    connection_providers: Vec<Arc<dyn ConnectionProvider>>,
}

impl ConnectionFactoryBuilder {
    /// Set the environment (mandatory).
    pub fn environment(mut self, environment: impl Into<Arc<Environment>>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Register a credential builder.
    pub fn credential_builder(mut self, builder: impl CredentialBuilder + 'static) -> Self {
        self.credential_builders.push(Arc::new(builder));
        self
    }

    /// Register several credential builders.
    pub fn credential_builders(
        mut self,
        builders: impl IntoIterator<Item = Arc<dyn CredentialBuilder>>,
    ) -> Self {
        self.credential_builders.extend(builders);
        self
    }

    /// Register a connection provider.
    pub fn connection_provider(mut self, provider: impl ConnectionProvider + 'static) -> Self {
        self.connection_providers.push(Arc::new(provider));
        self
    }

    /// Register several connection providers.
    pub fn connection_providers(
        mut self,
        providers: impl IntoIterator<Item = Arc<dyn ConnectionProvider>>,
    ) -> Self {
        self.connection_providers.extend(providers);
        self
    }

    /// Initialize connection managers, deduplicate registrations, and build
    /// the factory.
    ///
    /// Every registered provider's manager runs exactly once here, including
    /// managers on providers that deduplication later discards.
    pub fn build(self) -> Result<ConnectionFactory, Error> {
        let environment = self
            .environment
            .ok_or(ConfigurationError::MissingEnvironment)?;

        for provider in &self.connection_providers {
            if let Some(manager) = provider.connection_manager() {
                manager
                    .initialize(&environment)
                    .map_err(Error::Initialization)?;
            }
        }

        let mut credential_builders: Vec<Arc<dyn CredentialBuilder>> = Vec::new();
        for builder in self.credential_builders {
            let key = (
                builder.configuration_kind(),
                builder.input(),
                builder.output(),
            );
            let existing = credential_builders.iter().position(|registered| {
                (
                    registered.configuration_kind(),
                    registered.input(),
                    registered.output(),
                ) == key
            });
            match existing {
                Some(position) => credential_builders[position] = builder,
                None => credential_builders.push(builder),
            }
        }

        let mut connection_providers: Vec<Arc<dyn ConnectionProvider>> = Vec::new();
        for provider in self.connection_providers {
            let key = (provider.specification_kind(), provider.credential_kind());
            let existing = connection_providers.iter().position(|registered| {
                (registered.specification_kind(), registered.credential_kind()) == key
            });
            match existing {
                Some(position) => connection_providers[position] = provider,
                None => connection_providers.push(provider),
            }
        }

        tracing::info!(
            credential_builders = credential_builders.len(),
            connection_providers = connection_providers.len(),
            database_supports = environment.database_supports().len(),
            "connection factory built"
        );
        Ok(ConnectionFactory {
            environment,
            credential_builders,
            connection_providers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authentication::AuthenticationConfigurationKind;
    use crate::connection::{ConnectionSpecification, SpecificationKind};
    use crate::flow::ConnectionManager;
    use crate::identity::{Credential, CredentialKind, CredentialSource};
    use crate::secret::Secret;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MarkedBuilder {
        marker: &'static str,
    }

    #[async_trait]
    impl CredentialBuilder for MarkedBuilder {
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
            _configuration: &AuthenticationConfiguration,
            _input: Option<&Credential>,
            _environment: &Environment,
        ) -> anyhow::Result<Credential> {
            Ok(Credential::ApiKey {
                value: Secret::new(self.marker),
            })
        }
    }

    struct CountingManager {
        initializations: Arc<AtomicUsize>,
    }

    impl ConnectionManager for CountingManager {
        fn initialize(&self, _environment: &Environment) -> anyhow::Result<()> {
            self.initializations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ManagedProvider {
        manager: CountingManager,
        credential: CredentialKind,
    }

    #[async_trait]
    impl ConnectionProvider for ManagedProvider {
        fn credential_kind(&self) -> CredentialKind {
            self.credential
        }

        fn specification_kind(&self) -> SpecificationKind {
            SpecificationKind::StaticJdbc
        }

        fn connection_manager(&self) -> Option<&dyn ConnectionManager> {
            Some(&self.manager)
        }

        async fn open(
            &self,
            _specification: &ConnectionSpecification,
            _credential: &Credential,
            _identity: &Identity,
        ) -> anyhow::Result<LiveConnection> {
            Ok(Box::new(()))
        }
    }

    #[test]
    fn test_build_requires_environment() {
        let error = ConnectionFactory::builder().build().unwrap_err();
        assert_eq!(error.to_string(), "Environment is missing");
    }

    #[tokio::test]
    async fn test_builder_registration_replaces_value_keeps_position() {
        let factory = ConnectionFactory::builder()
            .environment(Environment::default())
            .credential_builder(MarkedBuilder { marker: "first" })
            .credential_builder(MarkedBuilder { marker: "second" })
            .build()
            .unwrap();
        assert_eq!(factory.credential_builders.len(), 1);

        let configuration = AuthenticationConfiguration::ApiKey {
            key_name: "k".to_string(),
            value: Secret::new("v"),
        };
        let credential = factory.credential_builders[0]
            .make_credential(
                &Identity::new("test"),
                &configuration,
                None,
                factory.environment(),
            )
            .await
            .unwrap();
        match credential {
            Credential::ApiKey { value } => assert_eq!(value.expose(), "second"),
            other => panic!("unexpected credential: {:?}", other),
        }
    }

    #[test]
    fn test_every_registered_manager_initializes_once() {
        let initializations = Arc::new(AtomicUsize::new(0));
        // same (specification, credential) key: the second provider replaces
        // the first, but both managers still initialize
        let factory = ConnectionFactory::builder()
            .environment(Environment::default())
            .connection_provider(ManagedProvider {
                manager: CountingManager {
                    initializations: Arc::clone(&initializations),
                },
                credential: CredentialKind::ApiKey,
            })
            .connection_provider(ManagedProvider {
                manager: CountingManager {
                    initializations: Arc::clone(&initializations),
                },
                credential: CredentialKind::ApiKey,
            })
            .build()
            .unwrap();
        assert_eq!(initializations.load(Ordering::SeqCst), 2);
        assert_eq!(factory.connection_providers.len(), 1);
    }

    #[test]
    fn test_failed_manager_initialization_aborts_build() {
        struct FailingManager;
        impl ConnectionManager for FailingManager {
            fn initialize(&self, _environment: &Environment) -> anyhow::Result<()> {
                anyhow::bail!("backend driver missing")
            }
        }
        struct FailingProvider {
            manager: FailingManager,
        }
        #[async_trait]
        impl ConnectionProvider for FailingProvider {
            fn credential_kind(&self) -> CredentialKind {
                CredentialKind::ApiKey
            }
            fn specification_kind(&self) -> SpecificationKind {
                SpecificationKind::StaticJdbc
            }
            fn connection_manager(&self) -> Option<&dyn ConnectionManager> {
                Some(&self.manager)
            }
            async fn open(
                &self,
                _specification: &ConnectionSpecification,
                _credential: &Credential,
                _identity: &Identity,
            ) -> anyhow::Result<LiveConnection> {
                Ok(Box::new(()))
            }
        }

        let error = ConnectionFactory::builder()
            .environment(Environment::default())
            .connection_provider(FailingProvider {
                manager: FailingManager,
            })
            .build()
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "connection manager initialization failed: backend driver missing"
        );
    }
}
