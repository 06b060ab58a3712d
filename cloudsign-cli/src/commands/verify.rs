//! `verify`

use crate::context::Context;
use crate::error::CliResult;
use chrono::{DateTime, Utc};
use cloudsign_cdn::{UrlVerifier, VerifiedUrl};

/// Verify a signed URL, or a cookie presented for `url`.
pub fn execute(
    ctx: &Context,
    url: &str,
    cookie: Option<&str>,
    at: Option<DateTime<Utc>>,
    key_name: Option<&str>,
    key: Option<&str>,
) -> CliResult<String> {
    let verifier = UrlVerifier::new(ctx.key_ring(key_name, key)?);
    let now = at.unwrap_or(ctx.now);

    let verified = match cookie {
        Some(cookie) => verifier.verify_cookie_at(cookie, url, now)?,
        None => verifier.verify_at(url, now)?,
    };

    Ok(describe(&verified))
}

fn describe(verified: &VerifiedUrl) -> String {
    let mut out = format!(
        "valid (key={}, expires={}",
        verified.key_name,
        verified.expires.to_rfc3339()
    );
    if let Some(prefix) = &verified.url_prefix {
        out.push_str(&format!(", prefix={}", prefix));
    }
    out.push(')');
    out
}
