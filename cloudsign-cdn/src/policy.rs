//! Policy strings and the HMAC-SHA1 signature over them.

use crate::SigningKey;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

pub(crate) const EXPIRES: &str = "Expires";
pub(crate) const KEY_NAME: &str = "KeyName";
pub(crate) const SIGNATURE: &str = "Signature";
pub(crate) const URL_PREFIX: &str = "URLPrefix";

/// Whole seconds since the Unix epoch, truncated toward zero.
///
/// `DateTime::timestamp` floors, which differs for instants before the epoch
/// that carry a fractional second.
pub fn epoch_seconds(at: DateTime<Utc>) -> i64 {
    let secs = at.timestamp();
    if secs < 0 && at.timestamp_subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

/// Separator that appends a parameter to `url`.
pub(crate) fn query_separator(url: &str) -> char {
    if url.contains('?') { '&' } else { '?' }
}

/// `Expires={n}{sep}KeyName={name}`
pub(crate) fn expiry_policy(expires: i64, key_name: &str, sep: char) -> String {
    format!("{EXPIRES}={expires}{sep}{KEY_NAME}={key_name}")
}

/// `URLPrefix={b64}{sep}Expires={n}{sep}KeyName={name}`
pub(crate) fn prefix_policy(prefix: &str, expires: i64, key_name: &str, sep: char) -> String {
    format!(
        "{URL_PREFIX}={}{sep}{}",
        URL_SAFE.encode(prefix.as_bytes()),
        expiry_policy(expires, key_name, sep)
    )
}

fn mac(key: &[u8], policy: &str) -> HmacSha1 {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(policy.as_bytes());
    mac
}

/// Padded URL-safe base64 of HMAC-SHA1(`policy`).
pub(crate) fn sign(key: &SigningKey, policy: &str) -> String {
    URL_SAFE.encode(mac(key.secret(), policy).finalize().into_bytes())
}

/// Constant-time check of a raw signature against `policy`.
pub(crate) fn verify(key: &SigningKey, policy: &str, signature: &[u8]) -> bool {
    mac(key.secret(), policy).verify_slice(signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_epoch_seconds() {
        let at = Utc.with_ymd_and_hms(2019, 5, 17, 22, 15, 50).unwrap();
        assert_eq!(epoch_seconds(at), 1558131350);
    }

    #[test]
    fn test_epoch_seconds_truncates_fraction() {
        let at = DateTime::from_timestamp(1558131350, 999_999_999).unwrap();
        assert_eq!(epoch_seconds(at), 1558131350);
    }

    #[test]
    fn test_epoch_seconds_truncates_toward_zero_before_epoch() {
        // -1.5 s
        let at = DateTime::from_timestamp(-2, 500_000_000).unwrap();
        assert_eq!(at.timestamp(), -2);
        assert_eq!(epoch_seconds(at), -1);
    }

    #[test]
    fn test_query_separator() {
        assert_eq!(query_separator("https://cdn.example.com/a"), '?');
        assert_eq!(query_separator("https://cdn.example.com/a?b=c"), '&');
        assert_eq!(query_separator(""), '?');
    }

    #[test]
    fn test_prefix_policy() {
        assert_eq!(
            prefix_policy("https://media.example.com/videos/", 1558131350, "my-key", '&'),
            "URLPrefix=aHR0cHM6Ly9tZWRpYS5leGFtcGxlLmNvbS92aWRlb3Mv&Expires=1558131350&KeyName=my-key"
        );
    }

    #[test]
    fn test_sign_and_verify() {
        let key = SigningKey::new("k", b"secret".to_vec()).unwrap();
        let signature = sign(&key, "policy");

        let raw = crate::key::LENIENT_URL_SAFE.decode(&signature).unwrap();
        assert_eq!(raw.len(), 20);
        assert!(verify(&key, "policy", &raw));
        assert!(!verify(&key, "policy2", &raw));
    }
}
