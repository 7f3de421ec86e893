//! End-to-end tests over the bridge: a controller wired with real
//! file-backed stores against a mock API server, driven the way the
//! window shell drives it.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use nimbus_application::ports::CredentialsRepository;
use nimbus_domain::connection::ConnectionStatus;
use nimbus_infrastructure::{
    FileCredentialsRepository, FilePreferencesStore, FileProfileStore, HttpApiGateway,
    PlaintextCipher, SystemClock, TokioFileSystem,
};
use nimbus_ui::{AppController, DocumentView, RowControl, UiCommand, UiUpdate};

/// Matches a query request whose `filters` field equals the expected
/// value (`None` = no filters key).
struct FilterMatcher(Option<serde_json::Value>);

impl Match for FilterMatcher {
    fn matches(&self, request: &Request) -> bool {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap_or_default();
        body.get("filters").cloned() == self.0
    }
}

fn rows_json(ids: &[u64]) -> serde_json::Value {
    json!({ "rows": ids.iter().map(|id| json!({"id": id, "title": format!("doc {id}")})).collect::<Vec<_>>() })
}

/// Mounts the full API surface for a five-document namespace browsed
/// two rows at a time.
async fn mount_api(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/namespaces"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "namespaces": [{"id": "app"}, {"id": "app_logs"}, {"id": "web"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/namespaces/app_logs/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "app_logs",
            "schema": {"title": {"type": "string", "full_text_search": true}},
            "approx_row_count": 5,
            "approx_logical_bytes": 4096,
            "index": {"status": "up-to-date"},
            "encryption": {"sse": true}
        })))
        .mount(server)
        .await;

    let pages: [(Option<serde_json::Value>, &[u64]); 3] = [
        (None, &[1, 2]),
        (Some(json!(["id", "Gt", 2])), &[3, 4]),
        (Some(json!(["id", "Gt", 4])), &[5]),
    ];
    for (filters, ids) in pages {
        Mock::given(method("POST"))
            .and(path("/v2/namespaces/app_logs/query"))
            .and(FilterMatcher(filters))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows_json(ids)))
            .mount(server)
            .await;
    }
}

type Handles = (
    UnboundedSender<UiCommand>,
    UnboundedReceiver<UiUpdate>,
    tokio::task::JoinHandle<()>,
);

/// Builds a controller over a temp config dir, runs its startup
/// sequence, and spawns the command loop.
async fn launch(config_dir: &Path) -> Handles {
    let fs = TokioFileSystem::new();
    let gateway = Arc::new(HttpApiGateway::new().expect("gateway builds"));
    let mut controller = AppController::new(
        gateway,
        FileProfileStore::new(fs, config_dir),
        FileCredentialsRepository::new(fs, PlaintextCipher::new(), config_dir),
        SystemClock::new(),
        FilePreferencesStore::new(fs, config_dir),
    );

    let (commands, command_rx) = mpsc::unbounded_channel();
    let (updates, update_rx) = mpsc::unbounded_channel();
    controller.startup(&updates).await;
    let worker = tokio::spawn(controller.run(command_rx, updates));

    (commands, update_rx, worker)
}

async fn next_update(updates: &mut UnboundedReceiver<UiUpdate>) -> UiUpdate {
    tokio::time::timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("timed out waiting for update")
        .expect("update channel closed")
}

/// Reads updates until one matches the predicate.
async fn wait_for<F>(updates: &mut UnboundedReceiver<UiUpdate>, mut predicate: F) -> UiUpdate
where
    F: FnMut(&UiUpdate) -> bool,
{
    loop {
        let update = next_update(updates).await;
        if predicate(&update) {
            return update;
        }
    }
}

fn table_ids(view: &DocumentView) -> Vec<String> {
    match view {
        DocumentView::Table(table) => table.rows.iter().map(|row| row.id.clone()).collect(),
        other => panic!("expected table view, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_browse_and_paginate() {
    let server = MockServer::start().await;
    mount_api(&server).await;
    let config = tempfile::tempdir().expect("temp dir");
    // Two rows per page so the five-document corpus spans three pages.
    std::fs::write(
        config.path().join("preferences.json"),
        br#"{"default_page_size": 2}"#,
    )
    .unwrap();
    let (commands, mut updates, _worker) = launch(config.path()).await;

    commands
        .send(UiCommand::AddProfile {
            name: "Test".to_string(),
            api_key: "nbk-e2e".to_string(),
            base_url: server.uri(),
        })
        .unwrap();

    // Connect: connecting, then connected with a measured latency.
    let connected = wait_for(&mut updates, |u| {
        matches!(
            u,
            UiUpdate::ConnectionChanged(state) if state.status == ConnectionStatus::Connected
        )
    })
    .await;
    if let UiUpdate::ConnectionChanged(state) = connected {
        assert!(state.latency_ms.is_some());
        assert!(state.error.is_none());
    }

    // Sidebar: "app" is both a namespace and a branch ("app_logs"
    // nests under it with delimiter "_"); "web" is a plain leaf.
    let sidebar = wait_for(&mut updates, |u| matches!(u, UiUpdate::SidebarChanged { .. })).await;
    if let UiUpdate::SidebarChanged { rows, loaded, has_more } = sidebar {
        assert_eq!(loaded, 3);
        assert!(!has_more);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].control,
            RowControl::BranchNamespace {
                namespace_id: "app".to_string()
            }
        );
        assert_eq!(
            rows[1].control,
            RowControl::Leaf {
                namespace_id: "web".to_string()
            }
        );
    }

    // Open the namespace: metadata then page 1.
    commands
        .send(UiCommand::OpenNamespace {
            id: "app_logs".to_string(),
        })
        .unwrap();

    let metadata = wait_for(&mut updates, |u| matches!(u, UiUpdate::MetadataLoaded(_))).await;
    if let UiUpdate::MetadataLoaded(metadata) = metadata {
        assert_eq!(metadata.approx_row_count, 5);
    }

    let page1 = wait_for(&mut updates, |u| matches!(u, UiUpdate::PageLoaded { .. })).await;
    if let UiUpdate::PageLoaded {
        page,
        has_more,
        has_previous,
        view,
        ..
    } = page1
    {
        assert_eq!(page, 1);
        assert!(has_more);
        assert!(!has_previous);
        assert_eq!(table_ids(&view), vec!["1", "2"]);
    }

    // Forward twice, then back: must land on exactly page 2's rows.
    commands.send(UiCommand::NextPage).unwrap();
    let page2 = wait_for(&mut updates, |u| matches!(u, UiUpdate::PageLoaded { .. })).await;
    if let UiUpdate::PageLoaded { page, view, .. } = page2 {
        assert_eq!(page, 2);
        assert_eq!(table_ids(&view), vec!["3", "4"]);
    }

    commands.send(UiCommand::NextPage).unwrap();
    let page3 = wait_for(&mut updates, |u| matches!(u, UiUpdate::PageLoaded { .. })).await;
    if let UiUpdate::PageLoaded {
        page,
        has_more,
        view,
        ..
    } = page3
    {
        assert_eq!(page, 3);
        assert!(!has_more);
        assert_eq!(table_ids(&view), vec!["5"]);
    }

    commands.send(UiCommand::PrevPage).unwrap();
    let back = wait_for(&mut updates, |u| matches!(u, UiUpdate::PageLoaded { .. })).await;
    if let UiUpdate::PageLoaded { page, view, .. } = back {
        assert_eq!(page, 2);
        assert_eq!(table_ids(&view), vec!["3", "4"]);
    }

    commands.send(UiCommand::FirstPage).unwrap();
    let first = wait_for(&mut updates, |u| matches!(u, UiUpdate::PageLoaded { .. })).await;
    if let UiUpdate::PageLoaded {
        page,
        has_previous,
        view,
        ..
    } = first
    {
        assert_eq!(page, 1);
        assert!(!has_previous);
        assert_eq!(table_ids(&view), vec!["1", "2"]);
    }

    commands.send(UiCommand::Shutdown).unwrap();
}

#[tokio::test]
async fn test_disallowed_host_rejected_without_dispatch() {
    let server = MockServer::start().await;
    let config = tempfile::tempdir().expect("temp dir");
    let (commands, mut updates, _worker) = launch(config.path()).await;

    commands
        .send(UiCommand::AddProfile {
            name: "Evil".to_string(),
            api_key: "nbk-e2e".to_string(),
            base_url: "https://evil.example.com".to_string(),
        })
        .unwrap();

    let failed = wait_for(&mut updates, |u| {
        matches!(
            u,
            UiUpdate::ConnectionChanged(state) if state.status == ConnectionStatus::Error
        )
    })
    .await;
    if let UiUpdate::ConnectionChanged(state) = failed {
        let message = state.error.expect("error message present");
        assert!(message.contains("Invalid API host"), "got: {message}");
    }

    // The gateway rejected before dispatch: nothing reached the wire.
    assert!(server.received_requests().await.unwrap().is_empty());

    commands.send(UiCommand::Shutdown).unwrap();
}

#[tokio::test]
async fn test_credentials_survive_restart() {
    let server = MockServer::start().await;
    mount_api(&server).await;
    let config = tempfile::tempdir().expect("temp dir");

    // First session: create and connect a profile.
    {
        let (commands, mut updates, worker) = launch(config.path()).await;
        commands
            .send(UiCommand::AddProfile {
                name: "Persistent".to_string(),
                api_key: "nbk-persisted".to_string(),
                base_url: server.uri(),
            })
            .unwrap();
        wait_for(&mut updates, |u| {
            matches!(
                u,
                UiUpdate::ConnectionChanged(state) if state.status == ConnectionStatus::Connected
            )
        })
        .await;
        commands.send(UiCommand::Shutdown).unwrap();
        worker.await.unwrap();
    }

    // The key never lands in the profile store, only in the vault.
    let profiles_raw = std::fs::read_to_string(config.path().join("profiles.json")).unwrap();
    assert!(!profiles_raw.contains("nbk-persisted"));
    let repo =
        FileCredentialsRepository::new(TokioFileSystem::new(), PlaintextCipher::new(), config.path());
    let stored: nimbus_domain::profile::StoredProfiles =
        serde_json::from_str(&profiles_raw).unwrap();
    let profile_id = stored.profiles[0].id.clone();
    assert_eq!(
        repo.fetch_key(&profile_id).await.unwrap().as_deref(),
        Some("nbk-persisted")
    );

    // Second session: startup rehydrates the key and the automatic
    // one-shot probe reconnects.
    {
        let (commands, mut updates, _worker) = launch(config.path()).await;
        let connected = wait_for(&mut updates, |u| {
            matches!(
                u,
                UiUpdate::ConnectionChanged(state) if state.status == ConnectionStatus::Connected
            )
        })
        .await;
        if let UiUpdate::ConnectionChanged(state) = connected {
            assert!(state.latency_ms.is_some());
        }
        commands.send(UiCommand::Shutdown).unwrap();
    }
}
