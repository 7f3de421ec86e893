//! Connection lifecycle state machine.
//!
//! This module defines the status machine for the active connection,
//! enabling the UI to display appropriate feedback at each stage.

use serde::{Deserialize, Serialize};

/// The status of the connection to the active profile.
///
/// Transitions are driven only by explicit user actions (add/edit/
/// select profile, manual reconnect) plus the one-shot startup probe:
/// - `Disconnected` → `Connecting` on a connect attempt
/// - `Connecting` → `Connected` | `Error`
/// - any state → `Disconnected` on profile switch
///
/// There is no automatic retry and no heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// No connection attempt has been made, or the profile changed.
    #[default]
    Disconnected,
    /// A connectivity probe is in flight.
    Connecting,
    /// The last probe succeeded.
    Connected,
    /// The last probe failed.
    Error,
}

/// Full connection state: status plus the optional error message and
/// round-trip latency measurement that accompany it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConnectionState {
    /// Current status.
    pub status: ConnectionStatus,
    /// Error message from the last failed probe, surfaced verbatim.
    pub error: Option<String>,
    /// Round-trip latency of the last successful probe, in
    /// milliseconds.
    pub latency_ms: Option<u64>,
}

impl ConnectionState {
    /// Creates a new disconnected state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a connect attempt as started.
    pub fn begin_connect(&mut self) {
        self.status = ConnectionStatus::Connecting;
        self.error = None;
        self.latency_ms = None;
    }

    /// Marks the probe as succeeded with the measured latency.
    pub fn connected(&mut self, latency_ms: u64) {
        self.status = ConnectionStatus::Connected;
        self.error = None;
        self.latency_ms = Some(latency_ms);
    }

    /// Marks the probe as failed with the error message returned by
    /// the gateway.
    pub fn failed(&mut self, message: impl Into<String>) {
        self.status = ConnectionStatus::Error;
        self.error = Some(message.into());
        self.latency_ms = None;
    }

    /// Resets to disconnected. Called on profile switch.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns true if the connection is established.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connected)
    }

    /// Returns true if a probe is in flight.
    #[must_use]
    pub const fn is_connecting(&self) -> bool {
        matches!(self.status, ConnectionStatus::Connecting)
    }

    /// Returns true if the last probe failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.status, ConnectionStatus::Error)
    }
}
