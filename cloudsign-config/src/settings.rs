//! Typed signer settings.

use crate::{ConfigValidator, Result, Validate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Default lifetime of a signed URL when no expiry is given.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Longest lifetime accepted for `default_ttl_secs` (365 days).
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Longest key name a CDN backend accepts.
pub const MAX_KEY_NAME_LEN: usize = 63;

/// Signing settings as found in a config file or `CLOUDSIGN_*` variables.
///
/// ```toml
/// key_name = "my-key"
/// key = "nZtRohdNF9m3cKM24IcK4w=="
/// default_ttl_secs = 600
///
/// [keys]
/// old-key = "..."
/// ```
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SignerSettings {
    /// Key used when none is named explicitly.
    #[serde(default)]
    pub key_name: Option<String>,

    /// Base64url secret for `key_name`.
    #[serde(default)]
    pub key: Option<String>,

    /// Additional named keys, e.g. during rotation.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,

    #[serde(default = "default_ttl", deserialize_with = "lenient_u64")]
    pub default_ttl_secs: u64,
}

fn default_ttl() -> u64 {
    DEFAULT_TTL_SECS
}

// Environment values always arrive as strings.
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl SignerSettings {
    /// Look up the base64 secret for `name`, falling back to the default
    /// key name. Returns the resolved name with its secret.
    pub fn key_for<'a>(&'a self, name: Option<&'a str>) -> Option<(&'a str, &'a str)> {
        let name = name.or(self.key_name.as_deref())?;

        if let Some(secret) = self.keys.get(name) {
            return Some((name, secret.as_str()));
        }

        match (self.key_name.as_deref(), self.key.as_deref()) {
            (Some(default_name), Some(secret)) if default_name == name => Some((name, secret)),
            _ => None,
        }
    }

    /// Every configured `(name, secret)` pair, default key first.
    pub fn all_keys(&self) -> Vec<(&str, &str)> {
        let mut all = Vec::new();
        if let (Some(name), Some(secret)) = (self.key_name.as_deref(), self.key.as_deref()) {
            all.push((name, secret));
        }
        for (name, secret) in &self.keys {
            if Some(name.as_str()) != self.key_name.as_deref() || self.key.is_none() {
                all.push((name.as_str(), secret.as_str()));
            }
        }
        all
    }
}

impl Validate for SignerSettings {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.key_name {
            ConfigValidator::is_resource_name(name, MAX_KEY_NAME_LEN, "key_name")?;
        }
        if let Some(key) = &self.key {
            ConfigValidator::not_empty(key, "key")?;
        }
        for (name, key) in &self.keys {
            ConfigValidator::is_resource_name(name, MAX_KEY_NAME_LEN, "keys")?;
            ConfigValidator::not_empty(key, &format!("keys.{}", name))?;
        }
        ConfigValidator::in_range(self.default_ttl_secs, 1, MAX_TTL_SECS, "default_ttl_secs")
    }
}

impl std::fmt::Debug for SignerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerSettings")
            .field("key_name", &self.key_name)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("keys", &self.keys.keys().collect::<Vec<_>>())
            .field("default_ttl_secs", &self.default_ttl_secs)
            .finish()
    }
}
