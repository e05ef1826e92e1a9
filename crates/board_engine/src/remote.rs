use std::time::Duration;

use board_core::{
    admit_collection, admit_project, Project, ProjectDraft, ProjectId, TaskStatus,
};
use board_logging::{board_debug, board_warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};
use url::Url;

use crate::RemoteError;

const COLLECTION: &str = "projects";
const MAX_REASON_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    /// Base endpoint; the collection lives at `{base_url}/projects`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl RemoteSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// CRUD contract of the remote project collection. One round trip per call,
/// no retries.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Project>, RemoteError>;

    async fn create(&self, draft: &ProjectDraft) -> Result<Project, RemoteError>;

    async fn update_task_status(
        &self,
        id: &ProjectId,
        task_key: &str,
        status: TaskStatus,
    ) -> Result<Project, RemoteError>;

    async fn delete(&self, id: &ProjectId) -> Result<(), RemoteError>;
}

#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base: Url,
}

impl HttpRemoteStore {
    pub fn new(settings: RemoteSettings) -> Result<Self, RemoteError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|_| RemoteError::InvalidBaseUrl(settings.base_url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidBaseUrl(settings.base_url));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RemoteError::Unavailable(err.to_string()))?;
        Ok(Self { client, base })
    }

    fn endpoint(&self, id: Option<&ProjectId>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(COLLECTION);
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, RemoteError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                reason: rejection_reason(status, &body),
            });
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(body.to_vec())
    }

    async fn send_for_project(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Project, RemoteError> {
        let body = self.send(request).await?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|err| RemoteError::Malformed(err.to_string()))?;
        admit_project(value).map_err(|err| RemoteError::Malformed(err.to_string()))
    }
}

#[async_trait::async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list(&self) -> Result<Vec<Project>, RemoteError> {
        let url = self.endpoint(None);
        board_debug!("GET {}", url);
        let body = self.send(self.client.get(url)).await?;
        let values: Vec<Value> = serde_json::from_slice(&body)
            .map_err(|err| RemoteError::Malformed(err.to_string()))?;
        let (projects, rejected) = admit_collection(values);
        for err in &rejected {
            board_warn!("Dropping project record from remote store: {}", err);
        }
        Ok(projects)
    }

    async fn create(&self, draft: &ProjectDraft) -> Result<Project, RemoteError> {
        let url = self.endpoint(None);
        board_debug!("POST {} name={}", url, draft.name);
        let body =
            serde_json::to_vec(draft).map_err(|err| RemoteError::Malformed(err.to_string()))?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.send_for_project(request).await
    }

    async fn update_task_status(
        &self,
        id: &ProjectId,
        task_key: &str,
        status: TaskStatus,
    ) -> Result<Project, RemoteError> {
        let url = self.endpoint(Some(id));
        board_debug!("PATCH {} {}={}", url, task_key, status);
        let body = json!({ "taskStatus": { task_key: status } });
        let request = self
            .client
            .patch(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        self.send_for_project(request).await
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), RemoteError> {
        let url = self.endpoint(Some(id));
        board_debug!("DELETE {}", url);
        self.send(self.client.delete(url)).await.map(|_| ())
    }
}

fn rejection_reason(status: reqwest::StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    let mut end = text.len().min(MAX_REASON_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

fn map_reqwest_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        return RemoteError::Unavailable(format!("timeout: {err}"));
    }
    RemoteError::Unavailable(err.to_string())
}
