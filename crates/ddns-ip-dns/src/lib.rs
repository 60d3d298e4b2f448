// # DNS Probe Address Resolver
//
// This crate discovers the caller's public IPv4 address with a DNS query.
//
// ## Technique
//
// Some resolver operators publish a hostname whose A answer is the address
// the query arrived from. Asking `resolver1.opendns.com` for
// `myip.opendns.com` therefore returns our public address, as seen from
// outside any NAT.
//
// The query goes directly to the configured resolver (never the system
// resolver, which would not know the special name), with a short timeout,
// a single attempt and no answer cache. Looking up the resolver's own name
// is bounded by the same timeout.
//
// ## Failure Mapping
//
// - resolver name does not resolve, timeout, network error → `ResolutionFailure`
// - empty answer (or NXDOMAIN) → `NoAddressFound`
// - anything but exactly one IPv4 literal → `InvalidAddress`

use async_trait::async_trait;
use ddns_core::config::ResolverConfig;
use ddns_core::traits::AddressResolver;
use ddns_core::{Error, Result, parse_ipv4};

use hickory_resolver::config::{
    NameServerConfigGroup, ResolverConfig as HickoryResolverConfig, ResolverOpts,
};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::{Resolver, TokioResolver};

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Default DNS port
const DEFAULT_DNS_PORT: u16 = 53;

/// Default probe timeout
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Public address resolver backed by a DNS probe
#[derive(Debug, Clone)]
pub struct DnsProbeResolver {
    /// Hostname whose answer is our public address
    hostname: String,

    /// Resolver to ask (hostname or IP literal)
    server: String,

    /// Resolver port
    port: u16,

    /// Query timeout
    timeout: Duration,
}

impl DnsProbeResolver {
    /// Create a new DNS probe resolver
    ///
    /// # Parameters
    ///
    /// - `hostname`: Probe hostname (e.g., "myip.opendns.com")
    /// - `server`: Resolver that answers it (e.g., "resolver1.opendns.com")
    pub fn new(hostname: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            server: server.into(),
            port: DEFAULT_DNS_PORT,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Create a resolver from configuration
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.hostname.clone(), config.server.clone())
            .with_port(config.port)
            .with_timeout(config.timeout())
    }

    /// Override the resolver port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the query timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the configured server name to an address
    ///
    /// Looked up on every probe so a resolver that moves is followed.
    /// IPv4 addresses are preferred, since the probe must leave over IPv4
    /// for the answer to be our IPv4 address.
    async fn server_address(&self) -> Result<IpAddr> {
        let lookup = tokio::net::lookup_host((self.server.as_str(), self.port));
        let addrs: Vec<IpAddr> = within(self.timeout, &self.server, lookup)
            .await?
            .map_err(|e| {
                Error::resolution(format!("Cannot resolve DNS server {}: {}", self.server, e))
            })?
            .map(|addr| addr.ip())
            .collect();

        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| {
                Error::resolution(format!("DNS server {} has no addresses", self.server))
            })
    }

    /// Build a single-use resolver pinned to `server_ip`
    fn build_resolver(&self, server_ip: IpAddr) -> TokioResolver {
        let name_servers = NameServerConfigGroup::from_ips_clear(&[server_ip], self.port, true);
        let config = HickoryResolverConfig::from_parts(None, vec![], name_servers);

        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = 1;
        opts.cache_size = 0;

        Resolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(opts)
            .build()
    }

    /// Query the probe hostname, returning terse answer values (one per record)
    async fn query(&self) -> Result<Vec<String>> {
        let server_ip = self.server_address().await?;
        let resolver = self.build_resolver(server_ip);

        tracing::debug!(
            "Probing {} via {} ({}:{})",
            self.hostname,
            self.server,
            server_ip,
            self.port
        );

        match resolver.lookup(self.hostname.as_str(), RecordType::A).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .filter(|rdata| rdata.record_type() != RecordType::CNAME)
                .map(|rdata| rdata.to_string())
                .collect()),
            Err(e) if e.is_no_records_found() => Ok(Vec::new()),
            Err(e) => Err(Error::resolution(format!(
                "Query for {} against {} failed: {}",
                self.hostname, self.server, e
            ))),
        }
    }
}

#[async_trait]
impl AddressResolver for DnsProbeResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        let answer = self.query().await?;
        address_from_answer(&self.hostname, &answer)
    }

    fn resolver_name(&self) -> &'static str {
        "dns-probe"
    }
}

/// Run `future`, failing with `ResolutionFailure` once `timeout` elapses
async fn within<T>(timeout: Duration, what: &str, future: impl Future<Output = T>) -> Result<T> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| Error::resolution(format!("Timed out after {:?} resolving {}", timeout, what)))
}

/// Turn terse answer lines into the public address
///
/// Exactly one non-blank line holding an IPv4 literal is accepted.
///
/// # Errors
///
/// - [`Error::NoAddressFound`]: no lines at all
/// - [`Error::InvalidAddress`]: an IPv6 literal, junk, or more than one line
pub fn address_from_answer(hostname: &str, lines: &[String]) -> Result<Ipv4Addr> {
    let lines: Vec<&str> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    match lines.as_slice() {
        [] => Err(Error::NoAddressFound(hostname.to_string())),
        [line] => parse_ipv4(line),
        many => Err(Error::invalid_address(many.join(" "))),
    }
}
