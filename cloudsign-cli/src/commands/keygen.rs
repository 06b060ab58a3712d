//! `generate-key`

use crate::error::CliResult;
use cloudsign_cdn::SigningKey;

/// Generate a random key. With `toml`, print a config snippet instead of the
/// bare key.
pub fn execute(key_name: &str, toml: bool) -> CliResult<String> {
    let key = SigningKey::generate(key_name)?;

    Ok(if toml {
        format!("key_name = \"{}\"\nkey = \"{}\"", key.name(), key.to_base64())
    } else {
        key.to_base64()
    })
}
