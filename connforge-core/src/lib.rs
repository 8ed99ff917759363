//! # Connforge Core
//!
//! Core library for Connforge connection authentication.
//!
//! This crate provides:
//! - Domain types for identities, credentials, authentication configurations,
//!   database supports, and connections
//! - Traits for credential builders and connection providers, the extension
//!   points integration crates register against
//! - A connection factory that resolves the shortest authentication flow from
//!   the credentials an identity holds to a credential a registered provider
//!   can open the connection with
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use connforge_core::{ConnectionFactory, Identity, LiveConnection};
//!
//! async fn connect(
//!     factory: &ConnectionFactory,
//!     identity: &Identity,
//!     connection: &connforge_core::Connection,
//! ) -> Result<LiveConnection, connforge_core::Error> {
//!     let authenticator = factory.authenticator(identity, connection, None)?;
//!     factory.open_connection(identity, &authenticator).await
//! }
//! ```

pub mod authentication;
pub mod authenticator;
pub mod builtin;
pub mod connection;
pub mod environment;
pub mod error;
pub mod factory;
pub mod flow;
pub mod identity;
pub mod resolve;
pub mod secret;
pub mod support;

// Re-export commonly used types at crate root
pub use identity::{
    Credential,
    CredentialKind,
    CredentialSource,
    Identity,
};

pub use authentication::{
    AuthenticationConfiguration,
    AuthenticationConfigurationKind,
    AuthenticationMechanism,
    AuthenticationMechanismBuilder,
    AuthenticationMechanismType,
};

pub use connection::{
    Connection,
    ConnectionBuilder,
    ConnectionSpecification,
    SpecificationKind,
};

pub use support::{
    DatabaseSupport,
    DatabaseSupportBuilder,
    DatabaseType,
};

pub use environment::{
    Environment,
    EnvironmentBuilder,
};

pub use flow::{
    ConnectionManager,
    ConnectionProvider,
    CredentialBuilder,
    CredentialExtractor,
    LiveConnection,
};

pub use factory::{
    ConnectionFactory,
    ConnectionFactoryBuilder,
};

pub use authenticator::Authenticator;

pub use builtin::{
    ApiKeyCredentialBuilder,
    UserPasswordCredentialBuilder,
    kerberos_ticket_extractor,
};

pub use error::{ConfigurationError, Error};

pub use resolve::ResolveError;

pub use secret::Secret;
