//! `sign-url`, `sign-prefix` and `sign-cookie`.

use crate::context::Context;
use crate::error::CliResult;
use chrono::{DateTime, Utc};
use cloudsign_cdn::UrlSigner;
use cloudsign_log::{info, warn};

/// Key and expiry options common to the signing commands.
pub struct SignOptions<'a> {
    pub key_name: Option<&'a str>,
    pub key: Option<&'a str>,
    pub expires: Option<DateTime<Utc>>,
    pub ttl: Option<u64>,
}

impl SignOptions<'_> {
    fn resolve(&self, ctx: &Context) -> CliResult<(UrlSigner, DateTime<Utc>)> {
        let signer = UrlSigner::new(ctx.signing_key(self.key_name, self.key)?);
        let expiry = ctx.expiry(self.expires, self.ttl)?;

        if expiry <= ctx.now {
            warn!("Expiry {} is not in the future; the CDN will reject this signature", expiry);
        }
        info!("Signing with key '{}', expires {}", signer.key().name(), expiry.to_rfc3339());

        Ok((signer, expiry))
    }
}

/// Sign a single URL.
pub fn url(ctx: &Context, url: &str, options: &SignOptions<'_>) -> CliResult<String> {
    let (signer, expiry) = options.resolve(ctx)?;
    Ok(signer.sign(url, expiry).into_string())
}

/// Sign a URL prefix; with `url`, return that URL carrying the signed prefix.
pub fn prefix(
    ctx: &Context,
    prefix: &str,
    url: Option<&str>,
    options: &SignOptions<'_>,
) -> CliResult<String> {
    let (signer, expiry) = options.resolve(ctx)?;
    let signed = signer.sign_prefix(prefix, expiry);

    Ok(match url {
        Some(url) => {
            if !url.starts_with(prefix) {
                warn!("{} is outside the signed prefix {}", url, prefix);
            }
            signed.apply_to(url)
        }
        None => signed.query().to_string(),
    })
}

/// Sign a cookie for a URL prefix.
pub fn cookie(
    ctx: &Context,
    prefix: &str,
    value_only: bool,
    options: &SignOptions<'_>,
) -> CliResult<String> {
    let (signer, expiry) = options.resolve(ctx)?;
    let cookie = signer.sign_cookie(prefix, expiry);

    Ok(if value_only {
        cookie.value().to_string()
    } else {
        cookie.header_value()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use cloudsign_config::SignerSettings;

    const KEY: &str = "nZtRohdNF9m3cKM24IcK4w==";

    fn ctx() -> Context {
        Context::new(
            SignerSettings::default(),
            Utc.with_ymd_and_hms(2019, 5, 17, 21, 0, 0).unwrap(),
        )
    }

    fn options() -> SignOptions<'static> {
        SignOptions {
            key_name: Some("my-key"),
            key: Some(KEY),
            expires: Some(Utc.with_ymd_and_hms(2019, 5, 17, 22, 15, 50).unwrap()),
            ttl: None,
        }
    }

    #[test]
    fn test_sign_url() {
        let out = url(&ctx(), "http://35.186.234.33/index.html", &options()).unwrap();
        assert_eq!(
            out,
            "http://35.186.234.33/index.html?Expires=1558131350&KeyName=my-key&Signature=fm6JZSmKNsB5sys8VGr-JE4LiiE="
        );
    }

    #[test]
    fn test_sign_url_with_ttl() {
        let opts = SignOptions {
            expires: None,
            ttl: Some(4550),
            ..options()
        };
        let out = url(&ctx(), "http://35.186.234.33/index.html", &opts).unwrap();
        assert!(out.contains("Expires=1558131350&"));
    }

    #[test]
    fn test_sign_prefix() {
        let query = prefix(&ctx(), "https://media.example.com/videos/", None, &options()).unwrap();
        assert!(query.starts_with("URLPrefix=aHR0cHM6Ly9tZWRpYS5leGFtcGxlLmNvbS92aWRlb3Mv&"));

        let full = prefix(
            &ctx(),
            "https://media.example.com/videos/",
            Some("https://media.example.com/videos/a.mp4"),
            &options(),
        )
        .unwrap();
        assert_eq!(full, format!("https://media.example.com/videos/a.mp4?{}", query));
    }

    #[test]
    fn test_sign_cookie() {
        let value = cookie(&ctx(), "https://media.example.com/videos/", true, &options()).unwrap();
        assert!(value.ends_with(":Signature=5G60nLTb2S0xXzUA6HUoIc4bnz4="));

        let header = cookie(&ctx(), "https://media.example.com/videos/", false, &options()).unwrap();
        assert!(header.starts_with(&format!("Cloud-CDN-Cookie={};", value)));
    }
}
