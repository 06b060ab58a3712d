//! Settings and key resolution shared by the commands.

use crate::error::{CliError, CliResult};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use cloudsign_cdn::{KeyRing, SigningKey};
use cloudsign_config::{ConfigManager, ENV_PREFIX, SignerSettings};
use cloudsign_log::debug;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const LOCAL_CONFIG: &str = "cloudsign.toml";

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub settings: SignerSettings,
    pub now: DateTime<Utc>,
}

impl Context {
    /// Load settings from `config` (or the default locations) and the
    /// `CLOUDSIGN_*` environment.
    pub fn load(config: Option<&Path>) -> CliResult<Self> {
        let mut builder = ConfigManager::builder().with_prefix(ENV_PREFIX).load_env();

        match config {
            Some(path) => builder = builder.add_file(path),
            None => {
                if let Some(path) = default_config_file() {
                    debug!("Using config file {}", path.display());
                    builder = builder.add_file(path);
                }
            }
        }

        let settings = builder.build()?.load_validated()?;
        Ok(Self::new(settings, Utc::now()))
    }

    pub fn new(settings: SignerSettings, now: DateTime<Utc>) -> Self {
        Self { settings, now }
    }

    /// Resolve the signing key from flags, falling back to settings.
    pub fn signing_key(&self, key_name: Option<&str>, key: Option<&str>) -> CliResult<SigningKey> {
        if let Some(encoded) = key {
            let name = key_name.or(self.settings.key_name.as_deref()).ok_or_else(|| {
                CliError::InvalidArgument("--key-name is required with --key".to_string())
            })?;
            return Ok(SigningKey::from_base64(name, encoded)?);
        }

        let (name, encoded) = self.settings.key_for(key_name).ok_or_else(|| match key_name {
            Some(name) => CliError::InvalidArgument(format!("no key named '{}' is configured", name)),
            None => CliError::InvalidArgument(
                "no signing key given; pass --key-name and --key or set CLOUDSIGN_KEY_NAME and CLOUDSIGN_KEY"
                    .to_string(),
            ),
        })?;

        Ok(SigningKey::from_base64(name, encoded)?)
    }

    /// Keys accepted during verification: the key given on the command line,
    /// or every configured key.
    pub fn key_ring(&self, key_name: Option<&str>, key: Option<&str>) -> CliResult<KeyRing> {
        if key.is_some() || key_name.is_some() {
            return Ok(KeyRing::from(self.signing_key(key_name, key)?));
        }

        let ring = self
            .settings
            .all_keys()
            .into_iter()
            .map(|(name, encoded)| SigningKey::from_base64(name, encoded))
            .collect::<Result<KeyRing, _>>()?;

        if ring.is_empty() {
            return Err(CliError::InvalidArgument(
                "no verification keys configured; pass --key-name and --key".to_string(),
            ));
        }
        Ok(ring)
    }

    /// Expiry from `--expires`, else `now + (--ttl or default_ttl_secs)`.
    pub fn expiry(&self, expires: Option<DateTime<Utc>>, ttl: Option<u64>) -> CliResult<DateTime<Utc>> {
        if let Some(expires) = expires {
            return Ok(expires);
        }

        let ttl = ttl.unwrap_or(self.settings.default_ttl_secs);
        i64::try_from(ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| self.now.checked_add_signed(ttl))
            .ok_or_else(|| CliError::InvalidArgument(format!("--ttl {} is out of range", ttl)))
    }
}

fn default_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("cloudsign").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Parse an expiry given as RFC 3339, as a UTC `YYYY-MM-DDTHH:MM:SS`, or as
/// epoch seconds.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, String> {
    let input = input.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(secs) = input.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).ok_or_else(|| format!("{} is out of range", secs));
    }

    Err(format!(
        "'{}' is not an ISO 8601 timestamp (e.g. 2019-05-17T22:15:50Z) or epoch seconds",
        input
    ))
}
