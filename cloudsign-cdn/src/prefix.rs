//! Signed URL prefixes.

use crate::SigningKey;
use crate::policy::{self, SIGNATURE};
use chrono::{DateTime, Utc};
use cloudsign_log::debug;
use std::fmt;

/// Query string authorizing every URL under one prefix:
/// `URLPrefix=..&Expires=..&KeyName=..&Signature=..`.
///
/// The prefix is base64url-encoded so it can carry its own `?` and `&`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPrefix {
    prefix: String,
    expires: i64,
    query: String,
}

impl SignedPrefix {
    pub(crate) fn sign(key: &SigningKey, prefix: &str, expiry: DateTime<Utc>) -> Self {
        let expires = policy::epoch_seconds(expiry);
        let policy = policy::prefix_policy(prefix, expires, key.name(), '&');
        let signature = policy::sign(key, &policy);

        debug!(
            target: "cloudsign::cdn",
            "Signed prefix '{}' with key '{}' expiring at {}",
            prefix,
            key.name(),
            expires
        );

        Self {
            prefix: prefix.to_string(),
            expires,
            query: format!("{policy}&{SIGNATURE}={signature}"),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn expires(&self) -> i64 {
        self.expires
    }

    /// The signed query string, without a leading separator.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Append the signed query string to `url`.
    ///
    /// Nothing checks that `url` actually starts with the prefix; the CDN
    /// rejects it if it does not.
    pub fn apply_to(&self, url: &str) -> String {
        format!("{}{}{}", url, policy::query_separator(url), self.query)
    }
}

impl fmt::Display for SignedPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}
