// # ddns-core
//
// Core library for the polling DDNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for dynamic DNS updates:
// - **AddressResolver**: Trait for discovering the current public IPv4 address
// - **RecordStore**: Trait for reading and replacing one A record via a provider API
// - **DdnsEngine**: Polling loop that reconciles the two (resolve, compare, update)
// - **LoopState**: In-memory registered/current addresses, owned by the engine
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Explicit Configuration**: One immutable `DdnsConfig` built at startup
// 3. **Library-First**: All core functionality can be used as a library
// 4. **Non-Fatal Ticks**: Every per-tick failure is logged and the loop continues

pub mod address;
pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod state;

// Re-export core types for convenience
pub use address::{RegisteredAddress, parse_ipv4};
pub use traits::{AddressResolver, RecordStore};
pub use engine::{DdnsEngine, EngineEvent, TickOutcome};
pub use config::{DdnsConfig, EngineConfig, ProviderConfig, ResolverConfig};
pub use error::{Error, Result};
pub use state::LoopState;
