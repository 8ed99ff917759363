//! Redacting wrapper for credential material.
//!
//! Passwords, API keys, tokens, and tickets travel through every layer of
//! this crate, including `tracing` fields and error payloads. [`Secret`]
//! keeps that material out of formatted output: the only way to read the
//! inner string is [`Secret::expose()`], and the backing memory is zeroed
//! when the wrapper drops.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string whose `Debug` and `Display` output is always `[REDACTED]`.
///
/// Serde passes the inner value through as a plain string, since
/// configurations carrying secrets are deserialized from trusted stores.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The inner value. Callers must not put the result in logs or errors.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Secret {}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
