//! cloudsign - sign and verify Cloud CDN URLs from the command line.
//!
//! # Commands
//!
//! - `cloudsign sign-url` - Sign a single URL
//! - `cloudsign sign-prefix` - Sign every URL under a prefix
//! - `cloudsign sign-cookie` - Produce a signed `Cloud-CDN-Cookie`
//! - `cloudsign verify` - Check a signed URL or cookie
//! - `cloudsign generate-key` - Generate a random signing key
//! - `cloudsign completions` - Generate shell completions
//!
//! Keys come from `--key-name`/`--key`, a config file (`--config`,
//! `./cloudsign.toml` or the user config directory) or `CLOUDSIGN_KEY_NAME`
//! and `CLOUDSIGN_KEY`.

use chrono::{DateTime, Utc};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use std::io;
use std::path::PathBuf;

mod commands;
mod context;
mod error;

use commands::sign::SignOptions;
use commands::{keygen, sign, verify};
use context::{Context, parse_timestamp};
use error::CliResult;

/// Sign and verify Cloud CDN URLs and cookies
#[derive(Parser)]
#[command(name = "cloudsign")]
#[command(version)]
#[command(about = "Sign and verify Cloud CDN URLs and cookies")]
#[command(long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} cloudsign sign-url --url https://cdn.example.com/a.png --key-name my-key --key <KEY> --ttl 600\n  {} cloudsign verify --url '<SIGNED_URL>'",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON, TOML or .env)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a URL
    #[command(alias = "sign")]
    SignUrl {
        /// URL to sign; may already contain a query string
        #[arg(long)]
        url: String,

        #[command(flatten)]
        key: KeyArgs,

        #[command(flatten)]
        expiry: ExpiryArgs,
    },

    /// Sign a URL prefix so every URL under it is accepted
    SignPrefix {
        /// URL prefix, e.g. https://media.example.com/videos/
        #[arg(long)]
        prefix: String,

        /// Print this URL with the signed prefix appended instead of the bare query string
        #[arg(long)]
        url: Option<String>,

        #[command(flatten)]
        key: KeyArgs,

        #[command(flatten)]
        expiry: ExpiryArgs,
    },

    /// Create a signed cookie for a URL prefix
    SignCookie {
        /// URL prefix the cookie grants access to
        #[arg(long)]
        prefix: String,

        /// Print only the cookie value instead of a Set-Cookie header value
        #[arg(long)]
        value_only: bool,

        #[command(flatten)]
        key: KeyArgs,

        #[command(flatten)]
        expiry: ExpiryArgs,
    },

    /// Verify a signed URL, or a signed cookie for a URL
    Verify {
        /// Signed URL, or the requested URL when --cookie is given
        #[arg(long)]
        url: String,

        /// Cloud-CDN-Cookie value presented with the request
        #[arg(long)]
        cookie: Option<String>,

        /// Verify as of this time instead of now
        #[arg(long, value_name = "ISO8601", value_parser = parse_timestamp)]
        at: Option<DateTime<Utc>>,

        #[command(flatten)]
        key: KeyArgs,
    },

    /// Generate a random 128-bit signing key
    GenerateKey {
        /// Name to put in the --toml snippet
        #[arg(long, default_value = "my-key")]
        key_name: String,

        /// Print a config file snippet
        #[arg(long)]
        toml: bool,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct KeyArgs {
    /// Key name configured on the backend
    #[arg(long, value_name = "NAME")]
    key_name: Option<String>,

    /// Base64url-encoded secret for the key
    #[arg(long, value_name = "BASE64_KEY")]
    key: Option<String>,
}

#[derive(Args)]
struct ExpiryArgs {
    /// Expiry time, e.g. 2019-05-17T22:15:50Z
    #[arg(long, value_name = "ISO8601", value_parser = parse_timestamp, conflicts_with = "ttl")]
    expires: Option<DateTime<Utc>>,

    /// Lifetime in seconds from now (default from config, 3600)
    #[arg(long, value_name = "SECONDS")]
    ttl: Option<u64>,
}

impl KeyArgs {
    fn options<'a>(&'a self, expiry: &ExpiryArgs) -> SignOptions<'a> {
        SignOptions {
            key_name: self.key_name.as_deref(),
            key: self.key.as_deref(),
            expires: expiry.expires,
            ttl: expiry.ttl,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    cloudsign_log::install_log_bridge();
    if cli.verbose {
        cloudsign_log::set_debug(true);
    } else if cli.quiet {
        cloudsign_log::set_level(cloudsign_log::Level::Error);
    }
    #[cfg(feature = "tracing")]
    cloudsign_log::tracing_compat::try_init();

    let result = run(cli).and_then(|output| {
        if let Some(output) = output {
            use std::io::Write;
            writeln!(io::stdout(), "{}", output)?;
        }
        Ok(())
    });

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<Option<String>> {
    let config = cli.config;
    let load = || Context::load(config.as_deref());

    let output = match cli.command {
        Commands::SignUrl { url, key, expiry } => {
            sign::url(&load()?, &url, &key.options(&expiry))?
        }
        Commands::SignPrefix {
            prefix,
            url,
            key,
            expiry,
        } => sign::prefix(&load()?, &prefix, url.as_deref(), &key.options(&expiry))?,
        Commands::SignCookie {
            prefix,
            value_only,
            key,
            expiry,
        } => sign::cookie(&load()?, &prefix, value_only, &key.options(&expiry))?,
        Commands::Verify {
            url,
            cookie,
            at,
            key,
        } => verify::execute(
            &load()?,
            &url,
            cookie.as_deref(),
            at,
            key.key_name.as_deref(),
            key.key.as_deref(),
        )?,
        Commands::GenerateKey { key_name, toml } => keygen::execute(&key_name, toml)?,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "cloudsign", &mut io::stdout());
            return Ok(None);
        }
    };

    Ok(Some(output))
}
