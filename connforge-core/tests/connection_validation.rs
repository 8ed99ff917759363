//! Builder-time validation: every misconfiguration fails eagerly with a
//! precise diagnostic.

use connforge_core::{
    AuthenticationConfiguration, AuthenticationConfigurationKind, AuthenticationMechanism,
    AuthenticationMechanismType, Connection, ConnectionSpecification, DatabaseSupport, Environment,
    Secret,
};

fn mechanism(
    mechanism_type: AuthenticationMechanismType,
    kinds: &[AuthenticationConfigurationKind],
) -> AuthenticationMechanism {
    AuthenticationMechanism::builder()
        .mechanism_type(mechanism_type)
        .configuration_kinds(kinds.iter().copied())
        .build()
        .unwrap()
}

fn postgres_support() -> DatabaseSupport {
    DatabaseSupport::builder()
        .database_type("postgres")
        .authentication_mechanism(mechanism(
            AuthenticationMechanismType::UserPassword,
            &[AuthenticationConfigurationKind::UserPassword],
        ))
        .authentication_mechanism(mechanism(
            AuthenticationMechanismType::ApiKey,
            &[AuthenticationConfigurationKind::ApiKey],
        ))
        .build()
        .unwrap()
}

fn user_password_configuration() -> AuthenticationConfiguration {
    AuthenticationConfiguration::UserPassword {
        username: "alice".to_string(),
        password: Secret::new("pw"),
    }
}

fn jdbc_specification() -> ConnectionSpecification {
    ConnectionSpecification::StaticJdbc {
        host: "db.internal".to_string(),
        port: 5432,
        database: "analytics".to_string(),
    }
}

#[test]
fn test_support_requires_database_type() {
    let error = DatabaseSupport::builder().build().unwrap_err();
    assert_eq!(error.to_string(), "Database type is missing");
}

#[test]
fn test_support_rejects_duplicate_mechanism_type() {
    let error = DatabaseSupport::builder()
        .database_type("postgres")
        .authentication_mechanism(mechanism(
            AuthenticationMechanismType::UserPassword,
            &[AuthenticationConfigurationKind::UserPassword],
        ))
        .authentication_mechanism(mechanism(
            AuthenticationMechanismType::UserPassword,
            &[AuthenticationConfigurationKind::UserPassword],
        ))
        .build()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Found multiple authentication mechanisms with type 'UserPassword'"
    );
}

#[test]
fn test_support_rejects_mechanism_without_configuration_kinds() {
    let error = DatabaseSupport::builder()
        .database_type("postgres")
        .authentication_mechanism(mechanism(AuthenticationMechanismType::Kerberos, &[]))
        .build()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "No authentication configuration type is associated with authentication mechanism 'Kerberos'"
    );
}

#[test]
fn test_support_rejects_configuration_kind_claimed_twice() {
    let error = DatabaseSupport::builder()
        .database_type("postgres")
        .authentication_mechanism(mechanism(
            AuthenticationMechanismType::UserPassword,
            &[AuthenticationConfigurationKind::UserPassword],
        ))
        .authentication_mechanism(mechanism(
            AuthenticationMechanismType::Kerberos,
            &[
                AuthenticationConfigurationKind::Kerberos,
                AuthenticationConfigurationKind::UserPassword,
            ],
        ))
        .build()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Authentication configuration type 'UserPassword' is associated with multiple authentication mechanisms"
    );
}

#[test]
fn test_connection_requires_identifier_support_specification_configuration() {
    let error = Connection::builder().build().unwrap_err();
    assert_eq!(error.to_string(), "Connection identifier is missing");

    let error = Connection::builder()
        .identifier("test::conn")
        .build()
        .unwrap_err();
    assert_eq!(error.to_string(), "Database support is missing");

    let error = Connection::builder()
        .identifier("test::conn")
        .database_support(postgres_support())
        .build()
        .unwrap_err();
    assert_eq!(error.to_string(), "Connection specification is missing");

    let error = Connection::builder()
        .identifier("test::conn")
        .database_support(postgres_support())
        .specification(jdbc_specification())
        .build()
        .unwrap_err();
    assert_eq!(error.to_string(), "Authentication configuration is missing");
}

#[test]
fn test_connection_rejects_duplicate_mechanism_entries() {
    let error = Connection::builder()
        .identifier("test::conn")
        .database_support(postgres_support())
        .specification(jdbc_specification())
        .authentication_mechanism(mechanism(AuthenticationMechanismType::UserPassword, &[]))
        .authentication_mechanism(mechanism(AuthenticationMechanismType::UserPassword, &[]))
        .authentication_configuration(user_password_configuration())
        .build()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Found multiple configurations for authentication mechanism 'UserPassword'"
    );
}

#[test]
fn test_connection_rejects_mechanism_outside_support() {
    let error = Connection::builder()
        .identifier("test::conn")
        .database_support(postgres_support())
        .specification(jdbc_specification())
        .authentication_mechanism(mechanism(
            AuthenticationMechanismType::KeyPair,
            &[AuthenticationConfigurationKind::EncryptedPrivateKey],
        ))
        .authentication_configuration(user_password_configuration())
        .build()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Authentication mechanism 'KeyPair' is not covered by database support 'postgres'. Supported mechanism(s):\n\
         - UserPassword\n\
         - ApiKey"
    );
}

#[test]
fn test_connection_rejects_configuration_kind_outside_declared_set() {
    let error = Connection::builder()
        .identifier("test::conn")
        .database_support(postgres_support())
        .specification(jdbc_specification())
        .authentication_mechanism(mechanism(
            AuthenticationMechanismType::UserPassword,
            &[AuthenticationConfigurationKind::Kerberos],
        ))
        .authentication_configuration(user_password_configuration())
        .build()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Authentication configuration type 'Kerberos' is not covered by database support 'postgres' for authentication mechanism 'UserPassword'. Supported configuration type(s):\n\
         - UserPassword"
    );
}

#[test]
fn test_connection_rejects_incompatible_stored_configuration() {
    let error = Connection::builder()
        .identifier("test::conn")
        .database_support(postgres_support())
        .specification(jdbc_specification())
        .authentication_configuration(AuthenticationConfiguration::Kerberos)
        .build()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Specified authentication configuration of type 'Kerberos' is not compatible. Supported configuration type(s):\n\
         - UserPassword\n\
         - ApiKey"
    );
}

#[test]
fn test_connection_empty_mechanism_entry_inherits_declared_kinds() {
    let connection = Connection::builder()
        .identifier("test::conn")
        .database_support(postgres_support())
        .specification(jdbc_specification())
        .authentication_mechanism(mechanism(AuthenticationMechanismType::ApiKey, &[]))
        .authentication_configuration(AuthenticationConfiguration::ApiKey {
            key_name: "x-api-key".to_string(),
            value: Secret::new("k"),
        })
        .build()
        .unwrap();
    assert_eq!(
        connection.configuration_kinds(),
        vec![AuthenticationConfigurationKind::ApiKey]
    );
    assert!(!connection.accepts_configuration(AuthenticationConfigurationKind::UserPassword));
}

#[test]
fn test_environment_rejects_duplicate_database_support() {
    let error = Environment::builder()
        .database_support(postgres_support())
        .database_support(postgres_support())
        .build()
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Found multiple database supports with type 'postgres'"
    );
}
