//! Connection lifecycle: explicit connect attempts and the one-shot
//! startup probe.

use tracing::debug;

use nimbus_domain::connection::ConnectionState;
use nimbus_domain::profile::{ConnectionProfile, ProfileRegistry};

use crate::ports::{ApiError, ConnectionProbe, Credentials, VectorDbApi};

/// Drives the connection state machine against the API port.
///
/// Transitions happen only on explicit user action (connect, profile
/// save) or the one-shot startup probe; there is no automatic retry
/// and no heartbeat. Failures surface the gateway's error string
/// verbatim.
pub struct ConnectionService<A> {
    api: A,
}

impl<A: VectorDbApi> ConnectionService<A> {
    /// Creates the service over an API port.
    pub const fn new(api: A) -> Self {
        Self { api }
    }

    /// Attempts to connect with the given profile, driving
    /// `state` through connecting → connected | error.
    ///
    /// # Errors
    ///
    /// Returns the probe error after recording it on `state`.
    pub async fn connect(
        &self,
        profile: &ConnectionProfile,
        state: &mut ConnectionState,
    ) -> Result<ConnectionProbe, ApiError> {
        state.begin_connect();
        match self.api.test_connection(&Credentials::from(profile)).await {
            Ok(probe) => {
                debug!(latency_ms = probe.latency_ms, "connection probe succeeded");
                state.connected(probe.latency_ms);
                Ok(probe)
            }
            Err(e) => {
                debug!(error = %e, "connection probe failed");
                state.failed(e.to_string());
                Err(e)
            }
        }
    }

    /// One-shot automatic probe at application start: runs only when
    /// an active profile with a usable key exists. Failures are
    /// recorded on `state` and not retried.
    pub async fn startup_probe(
        &self,
        registry: &ProfileRegistry,
        state: &mut ConnectionState,
    ) -> Option<Result<ConnectionProbe, ApiError>> {
        let profile = registry.active_profile()?;
        if profile.api_key.is_empty() {
            return None;
        }
        Some(self.connect(profile, state).await)
    }

    /// The underlying API port.
    pub const fn api(&self) -> &A {
        &self.api
    }
}
