//! IPv4 literal validation shared by resolvers and record stores.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use crate::error::{Error, Result};

/// Parse a terse answer value as an IPv4 literal.
///
/// Surrounding whitespace (such as the trailing newline of a one-line answer)
/// is ignored. IPv6 literals are rejected even though they are valid
/// addresses, since only A records are managed.
///
/// # Errors
///
/// Returns [`Error::InvalidAddress`] for anything that is not a dotted-quad
/// IPv4 literal.
pub fn parse_ipv4(value: &str) -> Result<Ipv4Addr> {
    let trimmed = value.trim();
    match trimmed.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => Ok(ip),
        Ok(IpAddr::V6(_)) | Err(_) => Err(Error::invalid_address(trimmed)),
    }
}

/// Value currently held by the managed record at the provider
///
/// Providers hand back whatever the record contains. A value that is not an
/// IPv4 literal (stale text, an IPv6 address, padding) is kept as-is so the
/// engine can see that it differs and overwrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisteredAddress {
    /// The record holds an IPv4 literal
    Ipv4(Ipv4Addr),

    /// The record holds something else
    Other(String),
}

impl RegisteredAddress {
    /// Classify a raw record value, without trimming
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        match value.parse::<Ipv4Addr>() {
            Ok(ip) => Self::Ipv4(ip),
            Err(_) => Self::Other(value),
        }
    }

    /// The IPv4 address, if the record holds one
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        match self {
            Self::Ipv4(ip) => Some(*ip),
            Self::Other(_) => None,
        }
    }

    /// Whether the record already points at `ip`
    ///
    /// Same outcome as comparing the record text with `ip`'s dotted quad:
    /// any non-IPv4 value differs.
    pub fn matches(&self, ip: Ipv4Addr) -> bool {
        self.ipv4() == Some(ip)
    }
}

impl From<Ipv4Addr> for RegisteredAddress {
    fn from(ip: Ipv4Addr) -> Self {
        Self::Ipv4(ip)
    }
}

impl fmt::Display for RegisteredAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipv4(ip) => write!(f, "{}", ip),
            Self::Other(value) => write!(f, "'{}'", value),
        }
    }
}
