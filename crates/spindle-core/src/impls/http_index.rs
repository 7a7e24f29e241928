//! HttpIndexClient - 検索バックエンドへの HTTP クライアント
//!
//! `POST {base_url}/index` with the document as JSON. Any non-2xx answer is
//! an error; the body is not inspected.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::config::SearchConfig;
use crate::domain::IndexDocument;
use crate::error::IndexError;
use crate::ports::IndexClient;

const INDEX_ENDPOINT: &str = "index";
const SEARCH_ENDPOINT: &str = "search";

/// Query sent to `POST {base_url}/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub user_query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "task_id", default)]
    pub task_ids: Vec<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct HttpIndexClient {
    base_url: Url,
    http: reqwest::Client,
    index_timeout: Duration,
    search_timeout: Duration,
}

impl HttpIndexClient {
    pub fn new(cfg: &SearchConfig) -> Result<Self, IndexError> {
        let raw = cfg.base_url.trim();
        if raw.is_empty() {
            return Err(IndexError::MissingField("base url"));
        }
        let base_url = Url::parse(raw).map_err(|e| IndexError::InvalidBaseUrl(format!("{raw}: {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(IndexError::InvalidBaseUrl(raw.to_string()));
        }

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            index_timeout: cfg.index_timeout(),
            search_timeout: cfg.search_timeout(),
        })
    }

    pub fn index_timeout(&self) -> Duration {
        self.index_timeout
    }

    /// Full-text query against the backend.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, IndexError> {
        if request.user_query.trim().is_empty() {
            return Err(IndexError::MissingField("user_query"));
        }
        let response = self.post(SEARCH_ENDPOINT, self.search_timeout, request).await?;
        decode(response).await
    }

    /// `base_url` path joined with `endpoint`, keeping any path prefix.
    fn endpoint(&self, endpoint: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), endpoint);
        url.set_path(&joined);
        url
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        timeout: Duration,
        body: &B,
    ) -> Result<reqwest::Response, IndexError> {
        let response = self
            .http
            .post(self.endpoint(endpoint))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IndexError::Timeout(timeout)
                } else {
                    IndexError::Transport(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status_code = status.as_u16(), endpoint, "search request failed");
            return Err(IndexError::UnexpectedStatus(status.as_u16()));
        }
        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, IndexError> {
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl IndexClient for HttpIndexClient {
    async fn index_task(&self, document: &IndexDocument) -> Result<(), IndexError> {
        if document.task_id.is_empty() {
            return Err(IndexError::MissingField("task_id"));
        }
        self.post(INDEX_ENDPOINT, self.index_timeout, document).await?;
        Ok(())
    }
}
