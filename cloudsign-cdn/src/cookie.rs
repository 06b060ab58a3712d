//! Signed cookies.

use crate::SigningKey;
use crate::policy::{self, SIGNATURE};
use chrono::{DateTime, Utc};
use cloudsign_log::debug;
use std::fmt;

/// Name of the cookie Cloud CDN reads.
pub const COOKIE_NAME: &str = "Cloud-CDN-Cookie";

/// A `Cloud-CDN-Cookie` value authorizing a URL prefix.
///
/// The value uses `:` between fields:
/// `URLPrefix=..:Expires=..:KeyName=..:Signature=..`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCookie {
    value: String,
    expiry: DateTime<Utc>,
}

impl SignedCookie {
    pub(crate) fn sign(key: &SigningKey, prefix: &str, expiry: DateTime<Utc>) -> Self {
        let expires = policy::epoch_seconds(expiry);
        let policy = policy::prefix_policy(prefix, expires, key.name(), ':');
        let signature = policy::sign(key, &policy);

        debug!(
            target: "cloudsign::cdn",
            "Signed cookie for '{}' with key '{}' expiring at {}",
            prefix,
            key.name(),
            expires
        );

        Self {
            value: format!("{policy}:{SIGNATURE}={signature}"),
            expiry,
        }
    }

    pub fn name(&self) -> &'static str {
        COOKIE_NAME
    }

    /// Cookie value without the name.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Value for a `Set-Cookie` response header.
    pub fn header_value(&self) -> String {
        format!(
            "{}; Path=/; Expires={}; Secure; HttpOnly",
            self,
            self.expiry.format("%a, %d %b %Y %H:%M:%S GMT")
        )
    }
}

/// `Cloud-CDN-Cookie=<value>`
impl fmt::Display for SignedCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", COOKIE_NAME, self.value)
    }
}

#[cfg(test)]
mod tests {
    use crate::UrlSigner;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_signed_cookie_vector() {
        let signer = UrlSigner::from_base64("my-key", "nZtRohdNF9m3cKM24IcK4w==").unwrap();
        let expiry = Utc.with_ymd_and_hms(2019, 5, 17, 22, 15, 50).unwrap();
        let cookie = signer.sign_cookie("https://media.example.com/videos/", expiry);

        assert_eq!(
            cookie.value(),
            "URLPrefix=aHR0cHM6Ly9tZWRpYS5leGFtcGxlLmNvbS92aWRlb3Mv:Expires=1558131350:KeyName=my-key:Signature=5G60nLTb2S0xXzUA6HUoIc4bnz4="
        );
        assert_eq!(cookie.to_string(), format!("Cloud-CDN-Cookie={}", cookie.value()));
        assert_eq!(
            cookie.header_value(),
            format!(
                "Cloud-CDN-Cookie={}; Path=/; Expires=Fri, 17 May 2019 22:15:50 GMT; Secure; HttpOnly",
                cookie.value()
            )
        );
    }
}
