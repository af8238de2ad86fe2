//! assetstore probe - check a provider configuration against a live store.
//!
//! Loads the configuration from the environment, validates it against the
//! configured bucket, and prints the report as JSON. Exits with code 1 when
//! any field is rejected.
//!
//! # Usage
//!
//! ```text
//! ASSETSTORE_BUCKET=acme ASSETSTORE_ACCESS_KEY=AK ASSETSTORE_SECRET_KEY=SK assetstore-probe
//! assetstore-probe --list images/ [--private]
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ASSETSTORE_BUCKET` | *(empty)* | Bucket holding every namespace |
//! | `ASSETSTORE_ACCESS_KEY` | *(empty)* | Access key identifier |
//! | `ASSETSTORE_SECRET_KEY` | *(empty)* | Secret access key |
//! | `ASSETSTORE_REGION` | `us-west-1` | Bucket region |
//! | `ASSETSTORE_ENDPOINT_URL` | *(unset)* | S3-compatible endpoint |
//! | `ASSETSTORE_FORCE_PATH_STYLE` | `false` | Path-style addressing |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use assetstore_core::{ObjectStoreProvider, ProviderConfig, StorageProvider, validate_configuration};
use assetstore_s3::S3ClientFactory;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Probe version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What the probe was asked to do.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// Validate the configuration and print the report.
    Validate,
    /// List the direct children of a logical path.
    List { path: String, private: bool },
}

/// Parse command-line arguments (without the program name).
fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut command = Command::Validate;
    let mut private = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--list" => {
                let path = args.next().context("--list requires a path")?;
                command = Command::List {
                    path,
                    private: false,
                };
            }
            "--private" => private = true,
            other => bail!("unknown argument: {other}"),
        }
    }

    if let Command::List { private: p, .. } = &mut command {
        *p = private;
    } else if private {
        bail!("--private is only valid with --list");
    }
    Ok(command)
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn run_validate(config: &ProviderConfig) -> Result<bool> {
    let report = validate_configuration(config, &S3ClientFactory).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.is_valid() {
        info!(bucket = %config.bucket, "configuration is valid");
    } else {
        warn!(errors = report.errors().len(), "configuration rejected");
    }
    Ok(report.is_valid())
}

async fn run_list(config: ProviderConfig, path: &str, private: bool) -> Result<()> {
    let provider = ObjectStoreProvider::new(config, Arc::new(S3ClientFactory))
        .context("failed to create provider")?;
    let entries = provider
        .list(path, private)
        .await
        .with_context(|| format!("failed to list {path:?}"))?;
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let command = parse_args(std::env::args().skip(1))?;
    let config = ProviderConfig::from_env();

    init_tracing(&config.log_level)?;

    info!(
        bucket = %config.bucket,
        region = %config.region,
        endpoint = ?config.endpoint_url,
        version = VERSION,
        "starting assetstore probe",
    );

    match command {
        Command::Validate => {
            if !run_validate(&config).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::List { path, private } => run_list(config, &path, private).await,
    }
}
