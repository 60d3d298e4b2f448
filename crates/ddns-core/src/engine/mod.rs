//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Resolving the current public address via AddressResolver
//! - Reading the registered address from the RecordStore (once)
//! - Replacing the record when the two differ
//! - Keeping the registered/current addresses in memory
//!
//! ## Architecture
//!
//! ```text
//!        ┌──────────────┐
//!        │ DdnsEngine   │◄──── shutdown (oneshot)
//!        └──────────────┘
//!               │ every `refresh_secs`
//!     ┌─────────┼──────────────────────────┬────────────────────┐
//!     │         │                          │                    │
//!     ▼         ▼                          ▼                    ▼
//! ┌──────────────────┐  ┌──────────────┐  ┌──────────────┐  ┌─────────────┐
//! │ AddressResolver  │  │ RecordStore  │  │ RecordStore  │  │   Events    │
//! │ (resolve)        │  │ (get, once)  │  │ (set, if Δ)  │  │  (notify)   │
//! └──────────────────┘  └──────────────┘  └──────────────┘  └─────────────┘
//! ```
//!
//! ## Tick Flow
//!
//! 1. Resolve the current public address; on failure skip the tick
//! 2. If no registered address is cached, read it from the store; on failure skip the tick
//! 3. If registered != current, write current; on success cache it as registered
//! 4. Sleep `refresh_secs`, repeat until shutdown
//!
//! Every failure is logged and swallowed. There is no retry within a tick and
//! no backoff across ticks.

use crate::address::RegisteredAddress;
use crate::config::DdnsConfig;
use crate::error::Result;
use crate::state::LoopState;
use crate::traits::{AddressResolver, RecordStore};
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        record_name: String,
        refresh: Duration,
    },

    /// Public address could not be resolved
    ResolutionFailed {
        error: String,
    },

    /// Registered value read from the provider
    RecordFetched {
        registered: RegisteredAddress,
    },

    /// Registered address could not be read
    RecordFetchFailed {
        error: String,
    },

    /// DNS update skipped (no change needed)
    UpdateSkipped {
        current_ip: Ipv4Addr,
    },

    /// DNS update succeeded
    UpdateSucceeded {
        new_ip: Ipv4Addr,
        previous: RegisteredAddress,
    },

    /// DNS update failed
    UpdateFailed {
        new_ip: Ipv4Addr,
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// What a successful tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Registered and current addresses already match
    Unchanged { ip: Ipv4Addr },

    /// The record was replaced
    Updated {
        previous: RegisteredAddress,
        new_ip: Ipv4Addr,
    },
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`], passing a shutdown receiver
/// 3. Engine ticks until the shutdown signal fires (or its sender is dropped)
///
/// ## Threading
///
/// The engine runs on a single task. All state is owned by the engine and
/// mutated only from [`DdnsEngine::tick()`].
pub struct DdnsEngine {
    /// Public address resolver
    resolver: Box<dyn AddressResolver>,

    /// Record store for the managed A record
    store: Box<dyn RecordStore>,

    /// Managed record name (for logs and events)
    record_name: String,

    /// Delay between ticks
    refresh: Duration,

    /// Registered/current addresses
    state: LoopState,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `resolver`: Public address resolver implementation
    /// - `store`: Record store implementation
    /// - `config`: DDNS configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        resolver: Box<dyn AddressResolver>,
        store: Box<dyn RecordStore>,
        config: &DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            resolver,
            store,
            record_name: config.provider.record.clone(),
            refresh: config.engine.refresh(),
            state: LoopState::new(),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Current loop state
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Delay between ticks
    pub fn refresh(&self) -> Duration {
        self.refresh
    }

    /// Run the update loop until `shutdown` fires
    ///
    /// The shutdown signal is observed both while a tick is in flight and
    /// while sleeping between ticks. A tick interrupted by shutdown leaves the
    /// state as it was before the tick.
    pub async fn run(&mut self, mut shutdown: oneshot::Receiver<()>) {
        info!(
            "Starting update loop for record {} (refresh every {:?})",
            self.record_name, self.refresh
        );
        self.emit_event(EngineEvent::Started {
            record_name: self.record_name.clone(),
            refresh: self.refresh,
        });

        loop {
            tokio::select! {
                result = self.tick() => {
                    if let Err(e) = result {
                        debug!("Tick skipped: {}", e);
                    }
                }

                _ = &mut shutdown => {
                    break;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.refresh) => {}

                _ = &mut shutdown => {
                    break;
                }
            }
        }

        info!("Shutdown signal received, update loop stopped");
        self.emit_event(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
    }

    /// Run a single resolve-compare-update pass
    ///
    /// Errors are logged here, with the stage that failed, before being
    /// returned. The state is only changed by a successful provider read or
    /// a successful provider write.
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let current_ip = match self.resolver.resolve().await {
            Ok(ip) => ip,
            Err(e) => {
                error!(
                    "Failed to get public IP ({}): {}",
                    self.resolver.resolver_name(),
                    e
                );
                self.emit_event(EngineEvent::ResolutionFailed {
                    error: e.to_string(),
                });
                return Err(e);
            }
        };
        self.state.observe_current(current_ip);

        if !self.state.has_registered() {
            match self.store.get().await {
                Ok(registered) => {
                    info!("Record {} currently points to {}", self.record_name, registered);
                    self.emit_event(EngineEvent::RecordFetched {
                        registered: registered.clone(),
                    });
                    self.state.record_registered(registered);
                }
                Err(e) => {
                    error!(
                        "Failed to get current {} record {}: {}",
                        self.store.provider_name(),
                        self.record_name,
                        e
                    );
                    self.emit_event(EngineEvent::RecordFetchFailed {
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            }
        }

        let previous = match self.state.registered() {
            Some(registered) if self.state.needs_update() => registered.clone(),
            _ => {
                debug!(
                    "Record {} already has IP {}, skipping update",
                    self.record_name, current_ip
                );
                self.emit_event(EngineEvent::UpdateSkipped { current_ip });
                return Ok(TickOutcome::Unchanged { ip: current_ip });
            }
        };

        match self.store.set(current_ip).await {
            Ok(()) => {
                info!(
                    "Updated {} record {} with IP {} (was {})",
                    self.store.provider_name(),
                    self.record_name,
                    current_ip,
                    previous
                );
                self.state.record_registered(current_ip.into());
                self.emit_event(EngineEvent::UpdateSucceeded {
                    new_ip: current_ip,
                    previous: previous.clone(),
                });
                Ok(TickOutcome::Updated {
                    previous,
                    new_ip: current_ip,
                })
            }
            Err(e) => {
                error!(
                    "Failed to update {} record {} to {}: {}",
                    self.store.provider_name(),
                    self.record_name,
                    current_ip,
                    e
                );
                self.emit_event(EngineEvent::UpdateFailed {
                    new_ip: current_ip,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Emit an engine event
    ///
    /// A full channel drops the event with a warning. A dropped receiver is
    /// not an error: embedding callers may not care about events.
    fn emit_event(&self, event: EngineEvent) {
        if let Err(TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
