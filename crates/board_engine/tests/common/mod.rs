#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use board_engine::{FileCache, HttpRemoteStore, RemoteSettings, SyncEngine};
use serde_json::{json, Value};
use wiremock::MockServer;

pub fn init_logging() {
    board_logging::initialize_for_tests();
}

/// A project record as the remote store serves it.
pub fn project_json(id: &str, name: &str, layout: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "createdAt": "2025-03-14T09:00:00Z",
        "status": "active",
        "tasks": [
            { "kind": "layout", "status": layout },
            { "kind": "structureDwg", "status": "pending" }
        ]
    })
}

pub fn store(server: &MockServer) -> HttpRemoteStore {
    store_with_timeout(server, Duration::from_secs(5))
}

pub fn store_with_timeout(server: &MockServer, timeout: Duration) -> HttpRemoteStore {
    let settings = RemoteSettings {
        request_timeout: timeout,
        ..RemoteSettings::new(server.uri())
    };
    HttpRemoteStore::new(settings).unwrap()
}

pub fn engine(server: &MockServer, cache_dir: &Path) -> SyncEngine {
    SyncEngine::new(
        Arc::new(store(server)),
        Arc::new(FileCache::new(cache_dir)),
    )
}

pub fn ids(engine: &SyncEngine) -> Vec<String> {
    engine
        .projects()
        .into_iter()
        .map(|project| project.id.to_string())
        .collect()
}

pub async fn request_count(server: &MockServer, verb: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.method.as_str() == verb)
        .count()
}
