//! Signed URLs for Cloud CDN
//!
//! A signed URL grants time-limited access to a cached resource without
//! requiring the client to authenticate. The CDN recomputes an HMAC-SHA1 over
//! the URL and its `Expires`/`KeyName` parameters using a key configured on
//! the backend, and serves the request only if the `Signature` matches and the
//! expiry has not passed.
//!
//! # Features
//!
//! - Signed URLs ([`UrlSigner::sign`], [`sign_url`])
//! - Signed URL prefixes covering a whole path ([`UrlSigner::sign_prefix`])
//! - Signed cookies ([`UrlSigner::sign_cookie`])
//! - Verification with key rotation ([`UrlVerifier`], [`KeyRing`])
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use cloudsign_cdn::sign_url;
//!
//! let expiry = Utc.with_ymd_and_hms(2019, 2, 9, 22, 30, 1).unwrap();
//! let signed = sign_url("https://www.google.com/", "my-key", "nZtRohdNF9m3cKM24IcK4w==", expiry)?;
//!
//! assert_eq!(
//!     signed,
//!     "https://www.google.com/?Expires=1549751401&KeyName=my-key&Signature=M_QO7BGHi2sGqrJO-MDr0uhDFuc="
//! );
//! # Ok::<(), cloudsign_cdn::SigningError>(())
//! ```
//!
//! Everything here is pure computation: no I/O, no shared state. Signers and
//! verifiers are `Send + Sync` and can be shared across threads as-is.

mod cookie;
mod error;
mod key;
mod policy;
mod prefix;
mod signer;
mod verify;

pub use cookie::{COOKIE_NAME, SignedCookie};
pub use error::SigningError;
pub use key::{GENERATED_KEY_LEN, KeyRing, SigningKey, decode_key};
pub use policy::epoch_seconds;
pub use prefix::SignedPrefix;
pub use signer::{SignedUrl, SigningRequest, UrlSigner, sign_url};
pub use verify::{UrlVerifier, VerifiedUrl};

/// Result type for signing operations
pub type Result<T> = std::result::Result<T, SigningError>;
