//! Nimbus - Main Entry Point
//!
//! Composition root for the client core: wires the HTTP gateway and
//! file-backed stores into the UI controller. The packaged desktop
//! application embeds the same wiring and drives the command channel
//! from its window shell; run standalone, this binary performs the
//! startup sequence (load stores, probe the active profile, list
//! namespaces) and reports the outcome.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nimbus_infrastructure::{
    FileCredentialsRepository, FilePreferencesStore, FileProfileStore, HttpApiGateway,
    PlaintextCipher, SystemClock, TokioFileSystem,
};
use nimbus_ui::{AppController, UiUpdate};

/// Application version string.
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    info!(version = VERSION, "nimbus core starting");

    let fs = TokioFileSystem::new();
    let gateway = Arc::new(HttpApiGateway::new()?);
    let profile_store = FileProfileStore::at_default_location(fs)?;
    let credentials = FileCredentialsRepository::at_default_location(fs, PlaintextCipher::new())?;
    let preferences = FilePreferencesStore::at_default_location(fs)?;

    let mut controller = AppController::new(
        gateway,
        profile_store,
        credentials,
        SystemClock::new(),
        preferences,
    );

    let (commands, command_rx) = mpsc::unbounded_channel();
    let (updates, mut update_rx) = mpsc::unbounded_channel();

    controller.startup(&updates).await;

    // No window shell is attached in the standalone run: dropping the
    // command sender lets the controller loop drain and exit.
    drop(commands);
    controller.run(command_rx, updates).await;

    while let Some(update) = update_rx.recv().await {
        report(&update);
    }

    Ok(())
}

fn report(update: &UiUpdate) {
    match update {
        UiUpdate::ConnectionChanged(state) => {
            info!(status = ?state.status, latency_ms = state.latency_ms, "connection");
        }
        UiUpdate::ProfilesChanged(profiles) => {
            info!(count = profiles.len(), "profiles loaded");
        }
        UiUpdate::SidebarChanged { loaded, has_more, .. } => {
            info!(loaded, has_more, "namespaces listed");
        }
        UiUpdate::Error { title, message } => {
            warn!(%title, %message, "startup error");
        }
        _ => {}
    }
}
