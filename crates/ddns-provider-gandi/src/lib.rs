// # Gandi LiveDNS Provider
//
// This crate reads and writes a single A record through the Gandi LiveDNS
// v5 API.
//
// ## Behavior
//
// - One HTTP request per call, no retries (the engine retries on its next tick)
// - HTTP timeout configured (30 seconds)
// - Status-specific errors on reads (401/403, 404, 429, 5xx)
// - Reads return the first value as stored, IPv4 or not
// - Writes succeed only on `201 Created`
// - Dry-run mode performs reads and logs the write it would have sent
//
// ## Security
//
// - The API key never appears in logs or `Debug` output
// - The API key is sent only in the `X-Api-Key` header
//
// ## API Reference
//
// - Read a record:   GET `/zones/:zone/records/:name/A`
// - Replace values:  PUT `/zones/:zone/records/:name/A`

use async_trait::async_trait;
use ddns_core::config::ProviderConfig;
use ddns_core::traits::RecordStore;
use ddns_core::{Error, RegisteredAddress, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// LiveDNS v5 zones endpoint
pub const GANDI_API_BASE: &str = "https://dns.api.gandi.net/api/v5/zones";

/// TTL written with every update (seconds)
pub const RECORD_TTL: u32 = 300;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// LiveDNS record set, as read and written over the wire
///
/// Empty or zero fields are left out when encoding, so an update body
/// carries only `rrset_ttl` and `rrset_values`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressRecord {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rrset_type: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub rrset_name: String,

    #[serde(skip_serializing_if = "is_zero")]
    pub rrset_ttl: u32,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rrset_values: Vec<String>,
}

impl AddressRecord {
    /// Update body: TTL 300 and a single value
    pub fn update(ip: Ipv4Addr) -> Self {
        Self {
            rrset_ttl: RECORD_TTL,
            rrset_values: vec![ip.to_string()],
            ..Self::default()
        }
    }

    /// The registered value (first value, as stored)
    pub fn first_value(&self) -> Result<RegisteredAddress> {
        match self.rrset_values.first() {
            Some(value) if !value.is_empty() => Ok(RegisteredAddress::from_value(value.as_str())),
            Some(_) => Err(Error::invalid_record("first record value is empty")),
            None => Err(Error::invalid_record("record has no values")),
        }
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Gandi LiveDNS record store
///
/// Bound to one zone and one record name. Holds no state between calls.
pub struct GandiProvider {
    /// LiveDNS API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Zone identifier
    zone: String,

    /// Record name within the zone
    record: String,

    /// API base URL (overridable for sandboxes and tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform reads but skip writes
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for GandiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GandiProvider")
            .field("api_key", &"<REDACTED>")
            .field("zone", &self.zone)
            .field("record", &self.record)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl GandiProvider {
    /// Create a new Gandi provider
    ///
    /// # Errors
    ///
    /// - [`Error::Config`]: empty API key, zone or record name
    /// - [`Error::Http`]: the HTTP client could not be built
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        if config.dry_run {
            tracing::warn!("Gandi provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            api_key: config.api_key.clone(),
            zone: config.zone.clone(),
            record: config.record.clone(),
            base_url: GANDI_API_BASE.to_string(),
            client,
            dry_run: config.dry_run,
        })
    }

    /// Point the provider at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether writes are skipped
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// `{base}/{zone}/records/{record}/A`
    fn record_url(&self) -> String {
        format!("{}/{}/records/{}/A", self.base_url, self.zone, self.record)
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.record_url())
            .header("X-Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
    }

    /// Map a non-success read status to an error
    fn status_error(&self, status: reqwest::StatusCode, body: &str) -> Error {
        match status.as_u16() {
            401 | 403 => Error::auth(format!(
                "Invalid API key or insufficient permissions. Status: {}",
                status
            )),
            404 => Error::not_found(format!("{} in zone {}", self.record, self.zone)),
            429 => Error::rate_limited(format!("Please retry later. Status: {}", status)),
            500..=599 => Error::http(format!("Gandi server error (transient): {} - {}", status, body)),
            _ => Error::http(format!("Failed to read record: {} - {}", status, body)),
        }
    }
}

#[async_trait]
impl RecordStore for GandiProvider {
    /// Read the registered address
    ///
    /// ```http
    /// GET /zones/:zone/records/:name/A
    /// X-Api-Key: <key>
    /// ```
    async fn get(&self) -> Result<RegisteredAddress> {
        tracing::debug!("Reading A record {} in zone {}", self.record, self.zone);

        let response = self
            .request(reqwest::Method::GET)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(self.status_error(status, &body));
        }

        let record: AddressRecord = serde_json::from_str(&body)?;
        let registered = record.first_value()?;

        tracing::debug!("Registered value for {}: {}", self.record, registered);
        Ok(registered)
    }

    /// Replace the record values with `ip`
    ///
    /// ```http
    /// PUT /zones/:zone/records/:name/A
    /// X-Api-Key: <key>
    ///
    /// {"rrset_ttl": 300, "rrset_values": ["1.2.3.4"]}
    /// ```
    async fn set(&self, ip: Ipv4Addr) -> Result<()> {
        let payload = AddressRecord::update(ip);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {} with payload: {}",
                self.record_url(),
                serde_json::to_string(&payload)?
            );
            return Ok(());
        }

        tracing::debug!("Writing A record {} -> {}", self.record, ip);

        let response = self
            .request(reqwest::Method::PUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        match response.status() {
            reqwest::StatusCode::CREATED => Ok(()),
            status => Err(Error::UnexpectedStatus(status.as_u16())),
        }
    }

    fn provider_name(&self) -> &'static str {
        "gandi"
    }
}
