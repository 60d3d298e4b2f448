// # Record Store Trait
//
// Defines the interface for reading and replacing one DNS A record through a
// provider's record-management API.
//
// ## Implementations
//
// - Gandi LiveDNS: `ddns-provider-gandi` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::RecordStore;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* RecordStore implementation */;
//
//     let current = "192.0.2.10".parse()?;
//     let registered = store.get().await?;
//     if !registered.matches(current) {
//         store.set(current).await?;
//     }
//
//     Ok(())
// }
// ```

use crate::address::RegisteredAddress;
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for DNS record stores
///
/// A store is bound to exactly one record (zone + name + type A) at
/// construction time.
///
/// # Rules
///
/// - One request per call. No retry, no backoff: the engine simply tries
///   again on its next tick.
/// - No caching: every `get()` asks the provider.
/// - No decisions: the engine decides whether an update is needed.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the current value of the record
    ///
    /// # Returns
    ///
    /// - `Ok(RegisteredAddress)`: The first value held by the provider, IPv4 or not
    /// - `Err(Error::InvalidRecordResponse)`: Values are missing or the first one is empty
    /// - `Err(Error)`: Transport, decoding, or status error
    async fn get(&self) -> Result<RegisteredAddress, crate::Error>;

    /// Replace the record with a single new value
    ///
    /// # Idempotency
    ///
    /// Replacing with the value already held is safe to repeat.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider confirmed the write
    /// - `Err(Error::UnexpectedStatus)`: The provider answered with any other status
    /// - `Err(Error)`: Transport error
    async fn set(&self, ip: Ipv4Addr) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
