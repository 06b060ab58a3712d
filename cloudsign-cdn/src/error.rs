//! Error types for signing and verification.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised while signing or verifying CDN URLs and cookies.
///
/// Signing only ever fails with [`SigningError::InvalidKeyFormat`] or
/// [`SigningError::EmptyKeyName`]; the other variants come from verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// The secret is not valid base64url, or decodes to nothing.
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// A signing key needs a name.
    #[error("Key name cannot be empty")]
    EmptyKeyName,

    /// A required query or cookie parameter is absent.
    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),

    /// `Expires` is not an epoch-seconds integer.
    #[error("Invalid Expires value: {0}")]
    InvalidExpires(String),

    /// `KeyName` does not name a key in the key ring.
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// The signature is malformed or does not match.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The requested URL is outside the signed `URLPrefix`.
    #[error("URL does not match the signed prefix")]
    PrefixMismatch,

    /// The signature is valid but its expiry has passed.
    #[error("Signature expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
}
