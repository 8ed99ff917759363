//! Process-wide registry of database supports.
//!
//! [`Environment`] maps backend type identifiers to their
//! [`DatabaseSupport`] declarations. It is built once at startup, validated
//! eagerly, and never mutated afterward, so it may be shared read-only
//! across any number of concurrent callers without locking.

use std::sync::Arc;

use crate::error::ConfigurationError;
use crate::support::{DatabaseSupport, DatabaseType};

/// Immutable registry of [`DatabaseSupport`]s, keyed by database type.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    database_supports: Vec<Arc<DatabaseSupport>>,
}

impl Environment {
    /// Start building an environment.
    pub fn builder() -> EnvironmentBuilder {
        EnvironmentBuilder::default()
    }

    /// The support registered for the given database type, if any.
    pub fn database_support(&self, database_type: &DatabaseType) -> Option<&Arc<DatabaseSupport>> {
        self.database_supports
            .iter()
            .find(|support| support.database_type() == database_type)
    }

    /// All registered supports, in registration order.
    pub fn database_supports(&self) -> &[Arc<DatabaseSupport>] {
        &self.database_supports
    }
}

/// Fluent builder for [`Environment`].
#[derive(Debug, Default)]
pub struct EnvironmentBuilder {
    database_supports: Vec<Arc<DatabaseSupport>>,
}

impl EnvironmentBuilder {
    /// Register one database support.
    pub fn database_support(mut self, support: impl Into<Arc<DatabaseSupport>>) -> Self {
        self.database_supports.push(support.into());
        self
    }

    /// Register several database supports.
    pub fn database_supports(
        mut self,
        supports: impl IntoIterator<Item = DatabaseSupport>,
    ) -> Self {
        self.database_supports
            .extend(supports.into_iter().map(Arc::new));
        self
    }

    /// Validate uniqueness and build the registry.
    pub fn build(self) -> Result<Environment, ConfigurationError> {
        let mut seen: Vec<&DatabaseType> = Vec::new();
        for support in &self.database_supports {
            if seen.contains(&support.database_type()) {
                return Err(ConfigurationError::DuplicateDatabaseSupport {
                    database_type: support.database_type().to_string(),
                });
            }
            seen.push(support.database_type());
        }
        Ok(Environment {
            database_supports: self.database_supports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authentication::{
        AuthenticationConfigurationKind, AuthenticationMechanism, AuthenticationMechanismType,
    };

    fn support(database_type: &str) -> DatabaseSupport {
        DatabaseSupport::builder()
            .database_type(database_type)
            .authentication_mechanism(
                AuthenticationMechanism::builder()
                    .mechanism_type(AuthenticationMechanismType::UserPassword)
                    .configuration_kind(AuthenticationConfigurationKind::UserPassword)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_environment_lookup() {
        let environment = Environment::builder()
            .database_support(support("postgres"))
            .database_support(support("snowflake"))
            .build()
            .unwrap();

        assert_eq!(environment.database_supports().len(), 2);
        assert!(
            environment
                .database_support(&DatabaseType::new("postgres"))
                .is_some()
        );
        assert!(
            environment
                .database_support(&DatabaseType::new("duckdb"))
                .is_none()
        );
    }

    #[test]
    fn test_environment_rejects_duplicate_database_type() {
        let result = Environment::builder()
            .database_support(support("postgres"))
            .database_support(support("postgres"))
            .build();
        assert_eq!(
            result.unwrap_err().to_string(),
            "Found multiple database supports with type 'postgres'"
        );
    }
}
