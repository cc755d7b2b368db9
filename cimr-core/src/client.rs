//! HTTP client for the CIMR backend.
//!
//! The backend exposes `POST /query` for agent questions, `GET /health`,
//! `GET /modules` and static chart images under `/images/`.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::BackendConfig;
use crate::error::{CimrError, CimrResult};
use crate::images::image_url;

/// Body of `POST /query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub module: String,
    pub agent: String,
    #[serde(default)]
    pub custom_data: Map<String, Value>,
}

impl QueryRequest {
    pub fn new(
        query: impl Into<String>,
        module: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            module: module.into(),
            agent: agent.into(),
            custom_data: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer of `GET /modules`: module name to the agents it serves.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModulesResponse {
    #[serde(default)]
    pub modules: BTreeMap<String, Vec<String>>,
}

/// Anything that can answer an agent query.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Sends one query and returns the text the agent should show.
    async fn query(&self, request: &QueryRequest) -> CimrResult<String>;
}

/// Picks the displayable text out of a `/query` body.
///
/// A JSON object with a non-empty string `response` yields that string, a
/// JSON string yields itself, and any other body is shown verbatim. An
/// object with `success: false` is an error.
pub fn response_text(body: &str) -> CimrResult<String> {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) => return Ok(body.to_string()),
    };

    match value {
        Value::String(text) => Ok(text),
        Value::Object(_) => {
            let parsed: QueryResponse = serde_json::from_value(value)
                .map_err(|e| CimrError::ResponseParseError(e.to_string()))?;
            if parsed.success == Some(false) {
                return Err(CimrError::QueryFailed(
                    parsed
                        .error
                        .unwrap_or_else(|| "backend reported failure".to_string()),
                ));
            }
            match parsed.response {
                Some(Value::String(text)) if !text.is_empty() => Ok(text),
                _ => Ok(body.to_string()),
            }
        }
        _ => Ok(body.to_string()),
    }
}

/// reqwest-backed [`QueryBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> CimrResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub async fn health(&self) -> CimrResult<HealthStatus> {
        let resp = self.client.get(self.endpoint("health")).send().await?;
        let resp = ensure_success(resp).await?;
        resp.json::<HealthStatus>()
            .await
            .map_err(|e| CimrError::ResponseParseError(e.to_string()))
    }

    pub async fn modules(&self) -> CimrResult<ModulesResponse> {
        let resp = self.client.get(self.endpoint("modules")).send().await?;
        let resp = ensure_success(resp).await?;
        resp.json::<ModulesResponse>()
            .await
            .map_err(|e| CimrError::ResponseParseError(e.to_string()))
    }

    pub fn image_url(&self, filename: &str) -> CimrResult<Url> {
        image_url(&self.base_url, filename)
    }

    pub async fn fetch_image(&self, filename: &str) -> CimrResult<Vec<u8>> {
        let url = self.image_url(filename)?;
        debug!("Fetching image {}", url);
        let resp = self.client.get(url).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// Saves an image into `dir`, returning the written path.
    pub async fn download_image(&self, filename: &str, dir: &Path) -> CimrResult<PathBuf> {
        let bytes = self.fetch_image(filename).await?;
        let path = dir.join(local_file_name(filename));
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, &bytes).await?;
        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

#[async_trait]
impl QueryBackend for HttpBackend {
    async fn query(&self, request: &QueryRequest) -> CimrResult<String> {
        debug!(
            "POST {} module={} agent={}",
            self.endpoint("query"),
            request.module,
            request.agent
        );

        let resp = self
            .client
            .post(self.endpoint("query"))
            .json(request)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let body = resp.text().await?;

        response_text(&body)
    }
}

async fn ensure_success(resp: reqwest::Response) -> CimrResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    warn!("Backend returned status {}", status);
    Err(CimrError::BackendStatus {
        status: status.as_u16(),
        body,
    })
}

fn local_file_name(filename: &str) -> String {
    filename.replace(['/', '\\'], "_")
}
