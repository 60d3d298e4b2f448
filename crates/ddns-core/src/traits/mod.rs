//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressResolver`]: Discover the current public IPv4 address
//! - [`RecordStore`]: Read and replace one A record via a provider API

pub mod address_resolver;
pub mod record_store;

pub use address_resolver::AddressResolver;
pub use record_store::RecordStore;
