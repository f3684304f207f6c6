use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::Endpoint;

const XSSI_PREFIX: &str = ")]}'";

#[derive(Debug, thiserror::Error)]
pub enum GerritError {
    #[error("Gerrit resource not found: {0}")]
    NotFound(String),
    #[error("Gerrit returned {status} for {path}")]
    Status { status: StatusCode, path: String },
    #[error("Gerrit request for {path} failed")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to decode Gerrit response for {path}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait GerritApi: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value, GerritError>;

    async fn project_exists(&self, project: &str) -> Result<bool, GerritError> {
        let path = format!("/projects/{}", project.replace('/', "%2F"));
        match self.get(&path).await {
            Ok(_) => Ok(true),
            Err(GerritError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

pub struct GerritClient {
    http: Client,
    url: String,
    username: String,
    password: String,
}

impl GerritClient {
    pub fn new(endpoint: &Endpoint) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build Gerrit client")?;

        Ok(Self {
            http,
            url: endpoint.url.trim_end_matches('/').to_string(),
            username: endpoint.username.clone(),
            password: endpoint.password.clone(),
        })
    }
}

#[async_trait]
impl GerritApi for GerritClient {
    async fn get(&self, path: &str) -> Result<Value, GerritError> {
        let url = format!("{}/a{}", self.url, path);
        debug!(url = %url, "gerrit request");

        let transport = |source| GerritError::Transport {
            path: path.to_string(),
            source,
        };

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(GerritError::NotFound(path.to_string())),
            status if !status.is_success() => {
                return Err(GerritError::Status {
                    status,
                    path: path.to_string(),
                });
            }
            _ => {}
        }

        let body = response.text().await.map_err(transport)?;
        parse_body(&body).map_err(|source| GerritError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

fn parse_body(body: &str) -> serde_json::Result<Value> {
    let body = body.trim_start();
    let body = body.strip_prefix(XSSI_PREFIX).unwrap_or(body);
    serde_json::from_str(body)
}
