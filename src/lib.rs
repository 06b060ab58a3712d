// cloudsign - signed URLs and cookies for Google Cloud CDN
//
// This library re-exports the signing crate and, behind features, the
// configuration and logging layers the `cloudsign` CLI is built on.

// Re-export signing functionality
pub use cloudsign_cdn::*;

// Re-export logging
pub use cloudsign_log;

// Re-export optional crates
#[cfg(feature = "config")]
pub use cloudsign_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        KeyRing,
        SignedCookie,
        SignedPrefix,
        SignedUrl,
        SigningError,
        SigningKey,
        UrlSigner,
        UrlVerifier,
        VerifiedUrl,
        sign_url,
    };

    #[cfg(feature = "config")]
    pub use cloudsign_config::{ConfigManager, SignerSettings, Validate};
}
