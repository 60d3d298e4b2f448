// # Address Resolver Trait
//
// Defines the interface for discovering the caller's public IPv4 address.
//
// ## Implementations
//
// - DNS probe (`myip.opendns.com` against `resolver1.opendns.com`): `ddns-ip-dns` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::AddressResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* AddressResolver implementation */;
//
//     let public_ip = resolver.resolve().await?;
//     println!("public address: {}", public_ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for public address resolvers
///
/// A resolver answers one question: what address does the outside world see
/// for this host right now? It holds no state between calls and never
/// returns a cached or default address.
///
/// # Errors
///
/// Implementations report each failure distinctly:
/// - [`crate::Error::ResolutionFailure`]: the query itself failed (timeout,
///   unreachable server, server name does not resolve)
/// - [`crate::Error::NoAddressFound`]: the query succeeded with an empty answer
/// - [`crate::Error::InvalidAddress`]: the answer is not a single IPv4 literal
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve the current public IPv4 address
    async fn resolve(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}
