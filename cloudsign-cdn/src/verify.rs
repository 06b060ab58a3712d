//! Verification of signed URLs, signed prefixes and signed cookies.
//!
//! Mirrors what the CDN does at the edge, which makes it useful for origin
//! fallbacks and for checking URLs handed out by other services.

use crate::cookie::COOKIE_NAME;
use crate::key::LENIENT_URL_SAFE;
use crate::policy::{self, EXPIRES, KEY_NAME, SIGNATURE, URL_PREFIX};
use crate::{KeyRing, Result, SigningError};
use base64::Engine;
use chrono::{DateTime, Utc};
use cloudsign_log::debug;

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedUrl {
    /// Key that produced the signature.
    pub key_name: String,
    pub expires: DateTime<Utc>,
    /// Decoded `URLPrefix`, when a prefix was signed.
    pub url_prefix: Option<String>,
}

/// Checks signatures against a [`KeyRing`].
#[derive(Debug, Clone)]
pub struct UrlVerifier {
    keys: KeyRing,
}

impl UrlVerifier {
    pub fn new(keys: impl Into<KeyRing>) -> Self {
        Self { keys: keys.into() }
    }

    pub fn keys(&self) -> &KeyRing {
        &self.keys
    }

    /// Verify a signed URL, or a URL carrying a signed prefix, against the
    /// wall clock.
    pub fn verify(&self, url: &str) -> Result<VerifiedUrl> {
        self.verify_at(url, Utc::now())
    }

    /// Verify a signed URL as of `now`.
    ///
    /// ```
    /// use chrono::{Duration, TimeZone, Utc};
    /// use cloudsign_cdn::{SigningError, UrlSigner, UrlVerifier};
    ///
    /// let signer = UrlSigner::from_base64("my-key", "nZtRohdNF9m3cKM24IcK4w==").unwrap();
    /// let expiry = Utc.with_ymd_and_hms(2019, 5, 17, 22, 15, 50).unwrap();
    /// let signed = signer.sign("https://cdn.example.com/a.png", expiry);
    ///
    /// let verifier = UrlVerifier::new(signer.key().clone());
    /// assert!(verifier.verify_at(signed.as_str(), expiry).is_ok());
    /// assert!(matches!(
    ///     verifier.verify_at(signed.as_str(), expiry + Duration::seconds(1)),
    ///     Err(SigningError::Expired { .. })
    /// ));
    /// ```
    pub fn verify_at(&self, url: &str, now: DateTime<Utc>) -> Result<VerifiedUrl> {
        let (signed, signature) = split_signature(url, '&')?;

        let result = match find_param(signed, URL_PREFIX) {
            Some(start) => match self.check_prefix(signed, start, signature, now) {
                // The URL's own query carried `URLPrefix=`; it was signed whole.
                Err(SigningError::InvalidSignature) => self.check_url(signed, signature, now),
                result => result,
            },
            None => self.check_url(signed, signature, now),
        };

        if let Err(ref e) = result {
            debug!(target: "cloudsign::cdn", "Rejected signed URL: {}", e);
        }
        result
    }

    /// Verify a `Cloud-CDN-Cookie` presented with a request for `url`, as of
    /// `now`. The value may include the `Cloud-CDN-Cookie=` name.
    pub fn verify_cookie_at(
        &self,
        cookie: &str,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedUrl> {
        let value = cookie
            .trim()
            .strip_prefix(COOKIE_NAME)
            .and_then(|rest| rest.strip_prefix('='))
            .unwrap_or(cookie.trim());
        let (policy, signature) = split_signature(value, ':')?;
        let resource = url.split_once('?').map_or(url, |(path, _)| path);

        let result = self.check(policy, ':', signature, Some(resource), now);
        if let Err(ref e) = result {
            debug!(target: "cloudsign::cdn", "Rejected signed cookie: {}", e);
        }
        result
    }

    /// Verify a cookie against the wall clock.
    pub fn verify_cookie(&self, cookie: &str, url: &str) -> Result<VerifiedUrl> {
        self.verify_cookie_at(cookie, url, Utc::now())
    }

    /// `signed` is a URL with `Expires` and `KeyName` appended.
    fn check_url(&self, signed: &str, signature: &str, now: DateTime<Utc>) -> Result<VerifiedUrl> {
        let query = signed.split_once('?').map_or("", |(_, query)| query);
        self.check_with_params(signed, query, '&', signature, None, now)
    }

    /// `signed[start..]` is a `URLPrefix=..&Expires=..&KeyName=..` policy
    /// appended to the requested URL.
    fn check_prefix(
        &self,
        signed: &str,
        start: usize,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedUrl> {
        let resource = signed[..start].trim_end_matches(['?', '&']);
        let resource = resource.split_once('?').map_or(resource, |(path, _)| path);
        self.check(&signed[start..], '&', signature, Some(resource), now)
    }

    fn check(
        &self,
        policy: &str,
        sep: char,
        signature: &str,
        resource: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<VerifiedUrl> {
        self.check_with_params(policy, policy, sep, signature, resource, now)
    }

    /// `policy` is the exact signed text; `params` is the part of it holding
    /// `sep`-separated parameters.
    fn check_with_params(
        &self,
        policy: &str,
        params: &str,
        sep: char,
        signature: &str,
        resource: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<VerifiedUrl> {
        let params = Params::parse(params, sep);

        let expires_raw = params.get(EXPIRES).ok_or(SigningError::MissingParameter("Expires"))?;
        let key_name = params.get(KEY_NAME).ok_or(SigningError::MissingParameter("KeyName"))?;

        let expires: i64 = expires_raw
            .parse()
            .map_err(|_| SigningError::InvalidExpires(expires_raw.to_string()))?;
        let expires_at = DateTime::from_timestamp(expires, 0)
            .ok_or_else(|| SigningError::InvalidExpires(expires_raw.to_string()))?;

        let key = self
            .keys
            .get(key_name)
            .ok_or_else(|| SigningError::UnknownKey(key_name.to_string()))?;

        let raw_signature = LENIENT_URL_SAFE
            .decode(signature.as_bytes())
            .map_err(|_| SigningError::InvalidSignature)?;
        if !policy::verify(key, policy, &raw_signature) {
            return Err(SigningError::InvalidSignature);
        }

        let url_prefix = match resource {
            Some(resource) => {
                let encoded = params
                    .get(URL_PREFIX)
                    .ok_or(SigningError::MissingParameter("URLPrefix"))?;
                let prefix = LENIENT_URL_SAFE
                    .decode(encoded.as_bytes())
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok())
                    .ok_or(SigningError::PrefixMismatch)?;
                if !resource.starts_with(&prefix) {
                    return Err(SigningError::PrefixMismatch);
                }
                Some(prefix)
            }
            None => None,
        };

        if policy::epoch_seconds(now) > expires {
            return Err(SigningError::Expired {
                expired_at: expires_at,
            });
        }

        Ok(VerifiedUrl {
            key_name: key_name.to_string(),
            expires: expires_at,
            url_prefix,
        })
    }
}

/// Split `input` at its last `{sep}Signature=`.
fn split_signature(input: &str, sep: char) -> Result<(&str, &str)> {
    let marker = format!("{sep}{SIGNATURE}=");
    let at = input
        .rfind(&marker)
        .ok_or(SigningError::MissingParameter("Signature"))?;
    Ok((&input[..at], &input[at + marker.len()..]))
}

/// Byte offset of the last `name=` parameter that starts the string or
/// follows a `?` or `&`.
fn find_param(input: &str, name: &str) -> Option<usize> {
    let needle = format!("{name}=");
    input.rmatch_indices(&needle).map(|(i, _)| i).find(|&i| {
        i == 0 || matches!(input.as_bytes()[i - 1], b'?' | b'&')
    })
}

/// Parameters in append order; a later duplicate wins.
struct Params<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Params<'a> {
    fn parse(input: &'a str, sep: char) -> Self {
        let pairs = input
            .split(sep)
            .filter_map(|pair| pair.split_once('='))
            .collect();
        Self { pairs }
    }

    fn get(&self, name: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SigningKey, UrlSigner};
    use chrono::{Duration, TimeZone};

    const KEY: &str = "nZtRohdNF9m3cKM24IcK4w==";

    fn expiry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 5, 17, 22, 15, 50).unwrap()
    }

    fn signer() -> UrlSigner {
        UrlSigner::from_base64("my-key", KEY).unwrap()
    }

    fn verifier() -> UrlVerifier {
        UrlVerifier::new(signer().key().clone())
    }

    #[test]
    fn test_split_signature() {
        assert_eq!(split_signature("a?b=c&Signature=xyz", '&').unwrap(), ("a?b=c", "xyz"));
        assert_eq!(
            split_signature("a?Signature=1&x=2", '&'),
            Err(SigningError::MissingParameter("Signature"))
        );
    }

    #[test]
    fn test_find_param_requires_boundary() {
        assert_eq!(find_param("URLPrefix=abc", "URLPrefix"), Some(0));
        assert_eq!(find_param("/a?URLPrefix=abc", "URLPrefix"), Some(3));
        assert_eq!(find_param("/a?XURLPrefix=abc", "URLPrefix"), None);
        assert_eq!(find_param("/a?URLPrefix=x&URLPrefix=y", "URLPrefix"), Some(15));
    }

    #[test]
    fn test_params_last_wins() {
        let params = Params::parse("Expires=1&KeyName=a&Expires=2", '&');
        assert_eq!(params.get("Expires"), Some("2"));
        assert_eq!(params.get("KeyName"), Some("a"));
        assert_eq!(params.get("Missing"), None);
    }

    #[test]
    fn test_verify_signed_url() {
        let signed = signer().sign("https://www.example.com/some/path?some=query", expiry());
        let verified = verifier().verify_at(signed.as_str(), expiry()).unwrap();

        assert_eq!(verified.key_name, "my-key");
        assert_eq!(verified.expires, expiry());
        assert_eq!(verified.url_prefix, None);
    }

    #[test]
    fn test_verify_url_with_signing_params_in_query() {
        let v = verifier();
        for url in [
            "https://cdn.example.com/a?URLPrefix=abc",
            "https://cdn.example.com/a?URLPrefix=",
            "https://cdn.example.com/a?Expires=1&KeyName=other",
            "https://cdn.example.com/a?URLPrefix=abc&t=1",
        ] {
            let signed = signer().sign(url, expiry());
            let verified = v.verify_at(signed.as_str(), expiry()).unwrap();
            assert_eq!(verified.key_name, "my-key");
            assert_eq!(verified.expires, expiry());
            assert_eq!(verified.url_prefix, None);
        }

        let signed = signer().sign("https://cdn.example.com/a?URLPrefix=abc", expiry());
        assert!(matches!(
            v.verify_at(signed.as_str(), expiry() + Duration::seconds(1)),
            Err(SigningError::Expired { .. })
        ));
    }

    #[test]
    fn test_verify_signed_prefix_on_url_with_prefix_param() {
        let prefix = signer().sign_prefix("https://media.example.com/videos/", expiry());
        let url = prefix.apply_to("https://media.example.com/videos/a.mp4?URLPrefix=abc");

        let verified = verifier().verify_at(&url, expiry()).unwrap();
        assert_eq!(verified.url_prefix.as_deref(), Some("https://media.example.com/videos/"));
    }

    #[test]
    fn test_verify_reference_url() {
        let url = "http://35.186.234.33/index.html?Expires=1558131350&KeyName=my-key&Signature=fm6JZSmKNsB5sys8VGr-JE4LiiE=";
        assert!(verifier().verify_at(url, expiry() - Duration::hours(1)).is_ok());
    }

    #[test]
    fn test_verify_accepts_unpadded_signature() {
        let url = "http://35.186.234.33/index.html?Expires=1558131350&KeyName=my-key&Signature=fm6JZSmKNsB5sys8VGr-JE4LiiE";
        assert!(verifier().verify_at(url, expiry()).is_ok());
    }

    #[test]
    fn test_verify_expired() {
        let signed = signer().sign("https://cdn.example.com/a", expiry());
        let result = verifier().verify_at(signed.as_str(), expiry() + Duration::seconds(1));

        assert_eq!(result, Err(SigningError::Expired { expired_at: expiry() }));
    }

    #[test]
    fn test_verify_tampered_url() {
        let signed = signer().sign("https://cdn.example.com/a", expiry());
        let tampered = signed.as_str().replace("/a?", "/b?");

        assert_eq!(
            verifier().verify_at(&tampered, expiry()),
            Err(SigningError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_extended_expiry_is_rejected() {
        let signed = signer().sign("https://cdn.example.com/a", expiry());
        let extended = signed.as_str().replace("Expires=1558131350", "Expires=1958131350");

        assert_eq!(
            verifier().verify_at(&extended, expiry()),
            Err(SigningError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_unknown_key() {
        let other = UrlSigner::new(SigningKey::new("other-key", b"x".to_vec()).unwrap());
        let signed = other.sign("https://cdn.example.com/a", expiry());

        assert_eq!(
            verifier().verify_at(signed.as_str(), expiry()),
            Err(SigningError::UnknownKey("other-key".to_string()))
        );
    }

    #[test]
    fn test_verify_missing_parameters() {
        let v = verifier();
        assert_eq!(
            v.verify_at("https://cdn.example.com/a", expiry()),
            Err(SigningError::MissingParameter("Signature"))
        );
        assert_eq!(
            v.verify_at("https://cdn.example.com/a?KeyName=my-key&Signature=abc", expiry()),
            Err(SigningError::MissingParameter("Expires"))
        );
        assert_eq!(
            v.verify_at("https://cdn.example.com/a?Expires=1&Signature=abc", expiry()),
            Err(SigningError::MissingParameter("KeyName"))
        );
        assert_eq!(
            v.verify_at("https://cdn.example.com/a?Expires=soon&KeyName=my-key&Signature=abc", expiry()),
            Err(SigningError::InvalidExpires("soon".to_string()))
        );
    }

    #[test]
    fn test_verify_garbage_signature() {
        let url = "https://cdn.example.com/a?Expires=1558131350&KeyName=my-key&Signature=***";
        assert_eq!(verifier().verify_at(url, expiry()), Err(SigningError::InvalidSignature));
    }

    #[test]
    fn test_verify_signed_prefix() {
        let prefix = signer().sign_prefix("https://media.example.com/videos/", expiry());
        let url = prefix.apply_to("https://media.example.com/videos/a.mp4");

        let verified = verifier().verify_at(&url, expiry()).unwrap();
        assert_eq!(verified.url_prefix.as_deref(), Some("https://media.example.com/videos/"));
    }

    #[test]
    fn test_verify_signed_prefix_with_existing_query() {
        let prefix = signer().sign_prefix("https://media.example.com/videos/", expiry());
        let url = prefix.apply_to("https://media.example.com/videos/a.mp4?t=10");

        assert!(verifier().verify_at(&url, expiry()).is_ok());
    }

    #[test]
    fn test_verify_signed_prefix_outside_prefix() {
        let prefix = signer().sign_prefix("https://media.example.com/videos/", expiry());
        let url = prefix.apply_to("https://media.example.com/private/a.mp4");

        assert_eq!(verifier().verify_at(&url, expiry()), Err(SigningError::PrefixMismatch));
    }

    #[test]
    fn test_verify_cookie() {
        let cookie = signer().sign_cookie("https://media.example.com/videos/", expiry());
        let v = verifier();

        let verified = v
            .verify_cookie_at(&cookie.to_string(), "https://media.example.com/videos/a.mp4", expiry())
            .unwrap();
        assert_eq!(verified.key_name, "my-key");

        assert!(v
            .verify_cookie_at(cookie.value(), "https://media.example.com/videos/b.mp4?x=1", expiry())
            .is_ok());
        assert_eq!(
            v.verify_cookie_at(cookie.value(), "https://media.example.com/other", expiry()),
            Err(SigningError::PrefixMismatch)
        );
        assert!(matches!(
            v.verify_cookie_at(
                cookie.value(),
                "https://media.example.com/videos/a.mp4",
                expiry() + Duration::days(1)
            ),
            Err(SigningError::Expired { .. })
        ));
    }

    #[test]
    fn test_verify_with_rotated_keys() {
        let old = SigningKey::from_base64("old-key", "b2xkLWtleS1ieXRlcw==").unwrap();
        let ring = KeyRing::from(signer().key().clone()).with_key(old.clone());
        let v = UrlVerifier::new(ring);

        let signed = UrlSigner::new(old).sign("https://cdn.example.com/a", expiry());
        assert_eq!(v.verify_at(signed.as_str(), expiry()).unwrap().key_name, "old-key");
    }
}
