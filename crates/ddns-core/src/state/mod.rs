// # Loop State
//
// In-memory state owned by the DdnsEngine.
//
// ## Crash Behavior
//
// - All state is lost on restart/crash
// - The first successful tick after a restart reads the registered address
//   back from the provider, so no local persistence is needed
//
// ## Transitions
//
// `registered` goes from empty to populated exactly once (first successful
// provider read) and is afterwards only replaced by the engine's own
// successful writes. It never reverts to empty.

use crate::address::RegisteredAddress;
use std::net::Ipv4Addr;

/// Registered and current public addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopState {
    registered: Option<RegisteredAddress>,
    current: Option<Ipv4Addr>,
}

impl LoopState {
    /// Create an empty state (nothing registered, nothing resolved)
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value known to be stored at the provider
    pub fn registered(&self) -> Option<&RegisteredAddress> {
        self.registered.as_ref()
    }

    /// Registered value, if it is an IPv4 address
    pub fn registered_ip(&self) -> Option<Ipv4Addr> {
        self.registered.as_ref().and_then(RegisteredAddress::ipv4)
    }

    /// Most recently resolved public address
    pub fn current(&self) -> Option<Ipv4Addr> {
        self.current
    }

    /// Whether the provider value has been read (or written) yet
    pub fn has_registered(&self) -> bool {
        self.registered.is_some()
    }

    /// Whether the resolved address differs from the registered one
    ///
    /// `false` until both are known.
    pub fn needs_update(&self) -> bool {
        match (&self.registered, self.current) {
            (Some(registered), Some(current)) => !registered.matches(current),
            _ => false,
        }
    }

    pub(crate) fn observe_current(&mut self, ip: Ipv4Addr) {
        self.current = Some(ip);
    }

    pub(crate) fn record_registered(&mut self, value: RegisteredAddress) {
        self.registered = Some(value);
    }
}
