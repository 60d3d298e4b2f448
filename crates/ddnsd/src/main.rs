// # ddnsd - DDNS Daemon
//
// Thin integration layer: reads configuration from the environment, wires
// the DNS probe and the Gandi provider into `DdnsEngine`, and runs the
// loop until SIGINT/SIGTERM. All update logic lives in ddns-core.
//
// ## Configuration
//
// ### Required
// - `DDNS_PROVIDER_API_KEY`: Gandi LiveDNS API key
// - `DDNS_PROVIDER_ZONE_ID`: Zone identifier
// - `DDNS_RECORD`: Record name within the zone (e.g. `home`, `@`)
//
// ### Optional
// - `DDNS_REFRESH_SECS`: Seconds between checks (default 300)
// - `DDNS_RESOLVER`: DNS server to probe (default resolver1.opendns.com)
// - `DDNS_RESOLVER_PORT`: Port of that DNS server (default 53)
// - `DDNS_MYIP_HOSTNAME`: Hostname that answers with our address (default myip.opendns.com)
// - `DDNS_RESOLVER_TIMEOUT_MS`: Probe timeout (default 1000)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `DDNS_MODE`: `dry-run` to log writes instead of sending them
//
// ## Example
//
// ```bash
// export DDNS_PROVIDER_API_KEY=your_key
// export DDNS_PROVIDER_ZONE_ID=7f2c9d1e-...
// export DDNS_RECORD=home
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::{DdnsConfig, DdnsEngine};
use ddns_ip_dns::DnsProbeResolver;
use ddns_provider_gandi::GandiProvider;
use std::env;
use std::future::Future;
use std::num::ParseIntError;
use std::process::ExitCode;
use std::str::FromStr;
use tokio::sync::oneshot;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const USAGE: &str = "\
Usage: ddnsd

Required environment:
  DDNS_PROVIDER_API_KEY     Gandi LiveDNS API key
  DDNS_PROVIDER_ZONE_ID     Zone identifier
  DDNS_RECORD               Record name within the zone

Optional environment:
  DDNS_REFRESH_SECS         Seconds between checks (default 300)
  DDNS_RESOLVER             DNS server to probe (default resolver1.opendns.com)
  DDNS_RESOLVER_PORT        Port of that DNS server (default 53)
  DDNS_MYIP_HOSTNAME        Hostname answering with our address (default myip.opendns.com)
  DDNS_RESOLVER_TIMEOUT_MS  Probe timeout in milliseconds (default 1000)
  DDNS_LOG_LEVEL            trace, debug, info, warn, error (default info)
  DDNS_MODE                 dry-run to log writes instead of sending them";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon configuration, as read from the environment
#[derive(Debug)]
struct Config {
    ddns: DdnsConfig,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, treating empty values as unset
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required =
            |key: &str| get(key).with_context(|| format!("{} is required", key));

        let mut ddns = DdnsConfig::new(
            required("DDNS_PROVIDER_API_KEY")?,
            required("DDNS_PROVIDER_ZONE_ID")?,
            required("DDNS_RECORD")?,
        );

        if let Some(value) = get("DDNS_REFRESH_SECS") {
            ddns.engine.refresh_secs = parse_number("DDNS_REFRESH_SECS", &value)?;
        }
        if let Some(server) = get("DDNS_RESOLVER") {
            ddns.resolver.server = server;
        }
        if let Some(value) = get("DDNS_RESOLVER_PORT") {
            ddns.resolver.port = parse_number("DDNS_RESOLVER_PORT", &value)?;
        }
        if let Some(hostname) = get("DDNS_MYIP_HOSTNAME") {
            ddns.resolver.hostname = hostname;
        }
        if let Some(value) = get("DDNS_RESOLVER_TIMEOUT_MS") {
            ddns.resolver.timeout_ms = parse_number("DDNS_RESOLVER_TIMEOUT_MS", &value)?;
        }

        let dry_run = get("DDNS_MODE").is_some_and(|mode| mode.eq_ignore_ascii_case("dry-run"));
        ddns.provider.dry_run = dry_run;

        let log_level = parse_log_level(get("DDNS_LOG_LEVEL").as_deref().unwrap_or("info"))?;

        ddns.validate()?;

        Ok(Self { ddns, log_level })
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = ParseIntError>,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a positive integer. Got: {}", key, value))
}

fn parse_log_level(value: &str) -> Result<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            value
        ),
    }
}

fn main() -> ExitCode {
    // Load and validate configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}\n\n{}", e, USAGE);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");

    // One logical thread of control is enough for a sequential loop
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config.ddns).await {
            error!("Daemon error: {:#}", e);
            DdnsExitCode::RuntimeError
        } else {
            DdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: DdnsConfig) -> Result<()> {
    let resolver = DnsProbeResolver::from_config(&config.resolver);
    let provider =
        GandiProvider::new(&config.provider).context("Failed to create Gandi provider")?;

    info!(
        "Managing A record {} in zone {} (probe {} via {}, refresh {:?})",
        config.provider.record,
        config.provider.zone,
        config.resolver.hostname,
        config.resolver.server,
        config.engine.refresh()
    );

    let (mut engine, mut events) = DdnsEngine::new(Box::new(resolver), Box::new(provider), &config)
        .context("Failed to create DDNS engine")?;

    // The engine logs every outcome itself; events are surfaced at debug level
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "engine event");
        }
    });

    let shutdown_signal = install_shutdown_handlers()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        let signal = shutdown_signal.await;
        info!("Received shutdown signal: {}", signal);
        let _ = shutdown_tx.send(());
    });

    engine.run(shutdown_rx).await;

    info!("Shutting down daemon");
    Ok(())
}

/// Install handlers for SIGTERM and SIGINT
///
/// Returns a future resolving to the name of the first signal received.
#[cfg(unix)]
fn install_shutdown_handlers() -> Result<impl Future<Output = &'static str>> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        }
    })
}

/// Install a CTRL-C handler
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
fn install_shutdown_handlers() -> Result<impl Future<Output = &'static str>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
        "CTRL-C"
    })
}
