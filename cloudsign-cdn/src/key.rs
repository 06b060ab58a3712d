//! Signing keys and key rings.

use crate::{Result, SigningError};
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use std::collections::BTreeMap;
use std::fmt;

/// URL-safe base64 that accepts input with or without `=` padding.
pub(crate) const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Size of keys produced by [`SigningKey::generate`].
pub const GENERATED_KEY_LEN: usize = 16;

/// A named HMAC secret as configured on a CDN backend.
///
/// The secret never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    name: String,
    secret: Vec<u8>,
}

impl SigningKey {
    /// Create a key from raw secret bytes.
    pub fn new(name: impl Into<String>, secret: impl Into<Vec<u8>>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SigningError::EmptyKeyName);
        }

        Ok(Self {
            name,
            secret: secret.into(),
        })
    }

    /// Create a key from its base64url encoding.
    ///
    /// Padding is optional. A key written with the standard alphabet
    /// (`+` and `/`) decodes to the same bytes as its URL-safe spelling.
    ///
    /// ```
    /// use cloudsign_cdn::SigningKey;
    ///
    /// let key = SigningKey::from_base64("my-key", "nZtRohdNF9m3cKM24IcK4w==").unwrap();
    /// assert_eq!(key.secret().len(), 16);
    /// assert!(SigningKey::from_base64("my-key", "not base64!").is_err());
    /// ```
    pub fn from_base64(name: impl Into<String>, encoded: &str) -> Result<Self> {
        Self::new(name, decode_key(encoded)?)
    }

    /// Generate a random 128-bit key.
    pub fn generate(name: impl Into<String>) -> Result<Self> {
        let secret: [u8; GENERATED_KEY_LEN] = rand::random();
        Self::new(name, secret.to_vec())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Padded base64url encoding of the secret, as a CDN backend expects it.
    pub fn to_base64(&self) -> String {
        URL_SAFE.encode(&self.secret)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Decode a base64url secret into raw key bytes.
pub fn decode_key(encoded: &str) -> Result<Vec<u8>> {
    let normalized: String = encoded
        .trim()
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();

    LENIENT_URL_SAFE
        .decode(normalized.as_bytes())
        .map_err(|e| SigningError::InvalidKeyFormat(e.to_string()))
}

/// Keys accepted by a backend, looked up by `KeyName`.
///
/// A backend can hold several keys at once so that one can be rotated out
/// while URLs signed with it are still in circulation.
#[derive(Clone, Default)]
pub struct KeyRing {
    keys: BTreeMap<String, SigningKey>,
}

impl KeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, replacing any key with the same name.
    pub fn insert(&mut self, key: SigningKey) -> Option<SigningKey> {
        self.keys.insert(key.name.clone(), key)
    }

    /// Builder-style [`KeyRing::insert`].
    pub fn with_key(mut self, key: SigningKey) -> Self {
        self.insert(key);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SigningKey> {
        self.keys.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<SigningKey> {
        self.keys.remove(name)
    }

    /// Key names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<SigningKey> for KeyRing {
    fn from(key: SigningKey) -> Self {
        KeyRing::new().with_key(key)
    }
}

impl FromIterator<SigningKey> for KeyRing {
    fn from_iter<I: IntoIterator<Item = SigningKey>>(iter: I) -> Self {
        let mut ring = KeyRing::new();
        for key in iter {
            ring.insert(key);
        }
        ring
    }
}

impl fmt::Debug for KeyRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
