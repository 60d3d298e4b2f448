//! Configuration types for the DDNS system
//!
//! One [`DdnsConfig`] is built at startup and handed to the engine and its
//! components. Nothing in it changes for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default hostname whose answer is the querying client's public address
pub const DEFAULT_PROBE_HOSTNAME: &str = "myip.opendns.com";

/// Default resolver that answers the probe hostname
pub const DEFAULT_RESOLVER_SERVER: &str = "resolver1.opendns.com";

/// Main DDNS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Public address probe configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration for one record, with defaults everywhere else
    pub fn new(
        api_key: impl Into<String>,
        zone: impl Into<String>,
        record: impl Into<String>,
    ) -> Self {
        Self {
            resolver: ResolverConfig::default(),
            provider: ProviderConfig::new(api_key, zone, record),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.resolver.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// Which hostname to probe and which DNS server to ask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Hostname whose A answer is the caller's public address
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// DNS server to query (hostname or IP literal)
    #[serde(default = "default_server")]
    pub server: String,

    /// DNS server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Query timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl ResolverConfig {
    /// Query timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.hostname.trim().is_empty() {
            return Err(crate::Error::config("Probe hostname cannot be empty"));
        }
        if self.server.trim().is_empty() {
            return Err(crate::Error::config("Resolver server cannot be empty"));
        }
        if self.port == 0 {
            return Err(crate::Error::config("Resolver port must be > 0"));
        }
        if self.timeout_ms == 0 {
            return Err(crate::Error::config("Resolver timeout must be > 0"));
        }
        Ok(())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            server: default_server(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Provider credential and the one record it manages
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key sent with every request
    pub api_key: String,

    /// Zone identifier
    pub zone: String,

    /// Record name (a single DNS label, e.g. "www")
    pub record: String,

    /// Log intended writes instead of sending them
    #[serde(default)]
    pub dry_run: bool,
}

impl ProviderConfig {
    /// Create a new provider configuration
    pub fn new(
        api_key: impl Into<String>,
        zone: impl Into<String>,
        record: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            zone: zone.into(),
            record: record.into(),
            dry_run: false,
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_key.is_empty() {
            return Err(crate::Error::config("API key cannot be empty"));
        }
        if self.zone.is_empty() {
            return Err(crate::Error::config("Zone identifier cannot be empty"));
        }
        if self.record.is_empty() {
            return Err(crate::Error::config("Record name cannot be empty"));
        }
        validate_record_name(&self.record)
    }
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<REDACTED>")
            .field("zone", &self.zone)
            .field("record", &self.record)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Delay between checks for public address changes (in seconds)
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Refresh interval as a `Duration`
    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.refresh_secs == 0 {
            return Err(crate::Error::config("Refresh interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Validate that a record name is a usable DNS owner name
///
/// Basic RFC 1035 label checks. `@` (zone apex) is accepted as-is.
fn validate_record_name(record: &str) -> Result<(), crate::Error> {
    if record == "@" {
        return Ok(());
    }

    if record.len() > 253 {
        return Err(crate::Error::config(format!(
            "Record name too long: {} chars (max 253)",
            record.len()
        )));
    }

    for label in record.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Record name has empty label: '{}'",
                record
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Record label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        // Underscore is allowed for service-style labels
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(crate::Error::config(format!(
                "Record label contains invalid characters: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Record label cannot start or end with hyphen: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn default_hostname() -> String {
    DEFAULT_PROBE_HOSTNAME.to_string()
}

fn default_server() -> String {
    DEFAULT_RESOLVER_SERVER.to_string()
}

fn default_port() -> u16 {
    53
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_refresh_secs() -> u64 {
    300
}

fn default_event_channel_capacity() -> usize {
    1000
}
