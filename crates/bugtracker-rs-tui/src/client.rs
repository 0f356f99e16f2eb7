//! HTTP client for the bug tracker API.

use bugtracker_rs_config::ClientConfig;
use bugtracker_rs_protocol::{
    BugListResponse, BugRecord, BugStatus, ErrorBody, HealthResponse, MAX_LIMIT, MessageBody,
};
use log::{debug, info};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, timeout or decoding failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The API answered with an error body; `message` is its summary.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
}

/// Thin wrapper over `reqwest` bound to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        info!("api client ready (base_url={})", config.base_url);
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        decode(self.http.get(self.url("/health")).send().await?).await
    }

    /// Fetch one page of bugs, newest first.
    pub async fn list_page(&self, page: u64, limit: u64) -> Result<BugListResponse, ClientError> {
        let response = self
            .http
            .get(self.url("/bugs"))
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;
        decode(response).await
    }

    /// Fetch every bug by walking the pages.
    pub async fn list_all(&self) -> Result<Vec<BugRecord>, ClientError> {
        let mut bugs = Vec::new();
        let mut page = 1;
        loop {
            let response = self.list_page(page, MAX_LIMIT).await?;
            bugs.extend(response.bugs);
            if page >= response.pagination.pages {
                break;
            }
            page += 1;
        }
        debug!("loaded bug list (count={}, pages={})", bugs.len(), page);
        Ok(bugs)
    }

    pub async fn create(&self, body: &Value) -> Result<BugRecord, ClientError> {
        decode(self.http.post(self.url("/bugs")).json(body).send().await?).await
    }

    pub async fn update(&self, id: &str, body: &Value) -> Result<BugRecord, ClientError> {
        let url = self.url(&format!("/bugs/{id}"));
        decode(self.http.put(url).json(body).send().await?).await
    }

    /// Move a bug to a new status without touching other fields.
    pub async fn set_status(&self, id: &str, status: BugStatus) -> Result<BugRecord, ClientError> {
        self.update(id, &json!({ "status": status.as_str() })).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/bugs/{id}"));
        let _: MessageBody = decode(self.http.delete(url).send().await?).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.summary(),
        Err(_) => status.to_string(),
    };
    debug!("api error (status={}, message={})", status.as_u16(), message);
    Err(ClientError::Api { status, message })
}
