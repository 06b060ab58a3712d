//! Signed URL generation.

use crate::policy::{self, SIGNATURE};
use crate::{Result, SignedCookie, SignedPrefix, SigningKey};
use chrono::{DateTime, Utc};
use cloudsign_log::debug;
use std::fmt;

/// Signs URLs, URL prefixes and cookies with one key.
///
/// Immutable and cheap to clone; share it freely across threads.
#[derive(Debug, Clone)]
pub struct UrlSigner {
    key: SigningKey,
}

impl UrlSigner {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Build a signer from a key name and a base64url secret.
    pub fn from_base64(key_name: impl Into<String>, encoded_key: &str) -> Result<Self> {
        Ok(Self::new(SigningKey::from_base64(key_name, encoded_key)?))
    }

    pub fn key(&self) -> &SigningKey {
        &self.key
    }

    /// Sign `url` so the CDN serves it until `expiry`.
    ///
    /// `url` may already carry a query string. The key name is appended as
    /// is, without URL escaping.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use cloudsign_cdn::UrlSigner;
    ///
    /// let signer = UrlSigner::from_base64("my-key", "nZtRohdNF9m3cKM24IcK4w==").unwrap();
    /// let expiry = Utc.with_ymd_and_hms(2019, 5, 17, 22, 15, 50).unwrap();
    /// let signed = signer.sign("http://35.186.234.33/index.html", expiry);
    ///
    /// assert_eq!(
    ///     signed.as_str(),
    ///     "http://35.186.234.33/index.html?Expires=1558131350&KeyName=my-key&Signature=fm6JZSmKNsB5sys8VGr-JE4LiiE="
    /// );
    /// ```
    pub fn sign(&self, url: &str, expiry: DateTime<Utc>) -> SignedUrl {
        let expires = policy::epoch_seconds(expiry);
        let policy = format!(
            "{}{}{}",
            url,
            policy::query_separator(url),
            policy::expiry_policy(expires, self.key.name(), '&')
        );
        let signature = policy::sign(&self.key, &policy);

        debug!(
            target: "cloudsign::cdn",
            "Signed URL with key '{}' expiring at {}",
            self.key.name(),
            expires
        );

        SignedUrl {
            url: format!("{policy}&{SIGNATURE}={signature}"),
            expires,
            key_name: self.key.name().to_string(),
            signature,
        }
    }

    /// Sign every URL that starts with `prefix` at once.
    pub fn sign_prefix(&self, prefix: &str, expiry: DateTime<Utc>) -> SignedPrefix {
        SignedPrefix::sign(&self.key, prefix, expiry)
    }

    /// Sign a `Cloud-CDN-Cookie` granting access to `prefix`.
    pub fn sign_cookie(&self, prefix: &str, expiry: DateTime<Utc>) -> SignedCookie {
        SignedCookie::sign(&self.key, prefix, expiry)
    }
}

/// Everything needed to produce one signed URL.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    pub base_url: String,
    pub key: SigningKey,
    pub expiry: DateTime<Utc>,
}

impl SigningRequest {
    /// Decode `base64_key` and bundle the inputs.
    pub fn new(
        base_url: impl Into<String>,
        key_name: impl Into<String>,
        base64_key: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            key: SigningKey::from_base64(key_name, base64_key)?,
            expiry,
        })
    }

    pub fn sign(&self) -> SignedUrl {
        UrlSigner::new(self.key.clone()).sign(&self.base_url, self.expiry)
    }
}

/// A URL carrying `Expires`, `KeyName` and `Signature` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    url: String,
    expires: i64,
    key_name: String,
    signature: String,
}

impl SignedUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn into_string(self) -> String {
        self.url
    }

    /// Epoch seconds placed in `Expires`.
    pub fn expires(&self) -> i64 {
        self.expires
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// URL-safe base64 signature, padding included.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl fmt::Display for SignedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl AsRef<str> for SignedUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl From<SignedUrl> for String {
    fn from(signed: SignedUrl) -> Self {
        signed.url
    }
}

/// Sign `url` with a base64url-encoded key in one call.
///
/// Fails only when the key is not valid base64url or the key name is empty.
pub fn sign_url(url: &str, key_name: &str, base64_key: &str, expiry: DateTime<Utc>) -> Result<String> {
    Ok(SigningRequest::new(url, key_name, base64_key, expiry)?
        .sign()
        .into_string())
}
