//! Caller identity and credential model.
//!
//! This module defines:
//! - [`Credential`] - A capability token representing a stage of proven identity
//! - [`CredentialKind`] - The payload-free tag of a credential variant
//! - [`CredentialSource`] - Where a credential transformation may start
//! - [`Identity`] - A caller plus the credentials it already holds
//!
//! Identities are created per caller/session by an identity-resolution layer
//! upstream of this crate and are read-only here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::secret::Secret;

/// A capability token representing a stage of proven identity.
///
/// Credentials carry no behavior beyond identifying (and transporting) what
/// stage of authentication they represent. They are immutable and freely
/// shareable across threads.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    /// A plaintext username/password pair.
    UserPassword { username: String, password: Secret },

    /// A static API key.
    ApiKey { value: Secret },

    /// A decrypted private key.
    PrivateKey { key: Secret },

    /// A Kerberos ticket held by the caller's session.
    KerberosTicket { ticket: Secret },

    /// An OAuth access token, optionally carrying its expiry.
    OAuthToken {
        access_token: Secret,
        expires_at: Option<DateTime<Utc>>,
    },
}

impl Credential {
    /// The payload-free tag of this credential.
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::UserPassword { .. } => CredentialKind::UserPassword,
            Self::ApiKey { .. } => CredentialKind::ApiKey,
            Self::PrivateKey { .. } => CredentialKind::PrivateKey,
            Self::KerberosTicket { .. } => CredentialKind::KerberosTicket,
            Self::OAuthToken { .. } => CredentialKind::OAuthToken,
        }
    }

    /// Whether the credential has passed its expiry at `now`.
    ///
    /// Only OAuth tokens carry an expiry; every other variant never expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::OAuthToken {
                expires_at: Some(expiry),
                ..
            } => *expiry <= now,
            _ => false,
        }
    }
}

/// The tag identifying a [`Credential`] variant, used for flow-graph matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    UserPassword,
    ApiKey,
    PrivateKey,
    KerberosTicket,
    OAuthToken,
}

impl CredentialKind {
    /// Every credential kind, in tag order.
    pub const ALL: [CredentialKind; 5] = [
        CredentialKind::UserPassword,
        CredentialKind::ApiKey,
        CredentialKind::PrivateKey,
        CredentialKind::KerberosTicket,
        CredentialKind::OAuthToken,
    ];

    /// The display name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserPassword => "UserPassword",
            Self::ApiKey => "ApiKey",
            Self::PrivateKey => "PrivateKey",
            Self::KerberosTicket => "KerberosTicket",
            Self::OAuthToken => "OAuthToken",
        }
    }

    /// Dense index into [`CredentialKind::ALL`], used as a graph node id.
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Where a credential transformation starts: a specific credential kind the
/// identity already holds, or the universal "no specific credential yet"
/// source used by catch-all credential builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSource {
    /// No specific input credential is required.
    Any,
    /// A credential of this kind, held by the identity.
    Kind(CredentialKind),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "Any"),
            Self::Kind(kind) => write!(f, "{}", kind),
        }
    }
}

/// A caller plus whatever credentials it already carries.
///
/// At most one credential per kind is kept; when several credentials of the
/// same kind are supplied, the first one wins. The credential list order is
/// preserved and is significant: it decides which held credential is tried
/// first when several equally short authentication flows exist.
#[derive(Debug, Clone)]
pub struct Identity {
    name: String,
    credentials: Vec<Credential>,
}

impl Identity {
    /// Create an identity holding no credentials.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            credentials: Vec::new(),
        }
    }

    /// Create an identity holding a single credential.
    pub fn with_credential(name: impl Into<String>, credential: Credential) -> Self {
        Self::with_credentials(name, vec![credential])
    }

    /// Create an identity holding the given credentials.
    pub fn with_credentials(name: impl Into<String>, credentials: Vec<Credential>) -> Self {
        let mut unique: Vec<Credential> = Vec::with_capacity(credentials.len());
        for credential in credentials {
            if !unique.iter().any(|held| held.kind() == credential.kind()) {
                unique.push(credential);
            }
        }
        Self {
            name: name.into(),
            credentials: unique,
        }
    }

    /// The principal name of the caller.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the held credential of the given kind, if any.
    pub fn credential(&self, kind: CredentialKind) -> Option<&Credential> {
        self.credentials.iter().find(|held| held.kind() == kind)
    }

    /// All held credentials, in insertion order.
    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    /// Whether the identity holds a credential of the given kind.
    pub fn holds(&self, kind: CredentialKind) -> bool {
        self.credential(kind).is_some()
    }
}
