//! Test doubles and common utilities for engine contract tests
//!
//! This module provides minimal test doubles that script resolver answers
//! and record provider calls without touching the network.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{AddressResolver, RecordStore};
use ddns_core::{DdnsConfig, RegisteredAddress};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted probe answer
#[derive(Debug, Clone, Copy)]
pub enum Probe {
    /// Resolver answers with this address
    Address(Ipv4Addr),
    /// Resolver answers with nothing
    Empty,
    /// Resolver answers with something that is not IPv4
    Invalid(&'static str),
    /// Resolver cannot be reached
    Unreachable,
}

/// An AddressResolver that replays a script, repeating the last answer
pub struct ScriptedResolver {
    script: Arc<Mutex<VecDeque<Probe>>>,
    last: Arc<Mutex<Probe>>,
    resolve_call_count: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    pub fn new(script: impl IntoIterator<Item = Probe>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            last: Arc::new(Mutex::new(Probe::Unreachable)),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A resolver that always answers with `ip`
    pub fn fixed(ip: Ipv4Addr) -> Self {
        Self::new([Probe::Address(ip)])
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }

    /// Create a new ScriptedResolver that shares script and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            last: Arc::clone(&other.last),
            resolve_call_count: Arc::clone(&other.resolve_call_count),
        }
    }
}

#[async_trait::async_trait]
impl AddressResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);

        let probe = {
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.script.lock().unwrap().pop_front() {
                *last = next;
            }
            *last
        };

        match probe {
            Probe::Address(ip) => Ok(ip),
            Probe::Empty => Err(Error::NoAddressFound("myip.test".to_string())),
            Probe::Invalid(value) => Err(Error::invalid_address(value)),
            Probe::Unreachable => Err(Error::resolution("resolver unreachable")),
        }
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// What the provider answers to a read
#[derive(Debug, Clone, Copy)]
pub enum Registered {
    /// Record holds this address
    Value(Ipv4Addr),
    /// Record holds text that is not an IPv4 address
    Raw(&'static str),
    /// Record exists but its value list is empty
    EmptyValues,
    /// Provider cannot be reached
    Unreachable,
}

/// A RecordStore that tracks calls and answers writes with a chosen status
pub struct RecordingStore {
    registered: Arc<Mutex<Registered>>,
    set_status: Arc<Mutex<u16>>,
    get_call_count: Arc<AtomicUsize>,
    set_values: Arc<Mutex<Vec<Ipv4Addr>>>,
}

impl RecordingStore {
    /// Create a store whose writes succeed (201 Created)
    pub fn new(registered: Registered) -> Self {
        Self {
            registered: Arc::new(Mutex::new(registered)),
            set_status: Arc::new(Mutex::new(201)),
            get_call_count: Arc::new(AtomicUsize::new(0)),
            set_values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Change what reads return (simulates an out-of-band change)
    pub fn set_registered(&self, registered: Registered) {
        *self.registered.lock().unwrap() = registered;
    }

    /// Change the status code writes are answered with
    pub fn set_write_status(&self, status: u16) {
        *self.set_status.lock().unwrap() = status;
    }

    /// Get the number of times get() was called
    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times set() was called
    pub fn set_call_count(&self) -> usize {
        self.set_values.lock().unwrap().len()
    }

    /// Values passed to set(), in call order
    pub fn set_values(&self) -> Vec<Ipv4Addr> {
        self.set_values.lock().unwrap().clone()
    }

    /// Create a new RecordingStore that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            registered: Arc::clone(&other.registered),
            set_status: Arc::clone(&other.set_status),
            get_call_count: Arc::clone(&other.get_call_count),
            set_values: Arc::clone(&other.set_values),
        }
    }
}

#[async_trait::async_trait]
impl RecordStore for RecordingStore {
    async fn get(&self) -> Result<RegisteredAddress> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);

        let registered = *self.registered.lock().unwrap();
        match registered {
            Registered::Value(ip) => Ok(ip.into()),
            Registered::Raw(value) => Ok(RegisteredAddress::from_value(value)),
            Registered::EmptyValues => Err(Error::invalid_record("record has no values")),
            Registered::Unreachable => Err(Error::http("connection refused")),
        }
    }

    async fn set(&self, ip: Ipv4Addr) -> Result<()> {
        self.set_values.lock().unwrap().push(ip);

        let status = *self.set_status.lock().unwrap();
        if status == 201 {
            self.set_registered(Registered::Value(ip));
            Ok(())
        } else {
            Err(Error::UnexpectedStatus(status))
        }
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(record_name: &str) -> DdnsConfig {
    let mut config = DdnsConfig::new("test-key", "test-zone", record_name);
    config.engine.refresh_secs = 300;
    config.engine.event_channel_capacity = 100;
    config
}

/// Shorthand for building test addresses
pub fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
    Ipv4Addr::new(a, b, c, d)
}
