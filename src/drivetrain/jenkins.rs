use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::debug;

use super::Endpoint;

#[async_trait]
pub trait JenkinsApi: Send + Sync {
    async fn jobs(&self) -> Result<Vec<String>>;
    async fn job_config(&self, job: &str) -> Result<String>;
    async fn plugins(&self) -> Result<BTreeSet<String>>;
}

pub struct JenkinsClient {
    http: Client,
    base: Url,
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<JobEntry>,
}

#[derive(Deserialize)]
struct JobEntry {
    name: String,
}

#[derive(Deserialize)]
struct PluginList {
    #[serde(default)]
    plugins: Vec<PluginEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PluginEntry {
    short_name: String,
}

impl JenkinsClient {
    pub fn new(endpoint: &Endpoint) -> Result<Self> {
        let base = Url::parse(&endpoint.url)
            .with_context(|| format!("Invalid Jenkins url: {}", endpoint.url))?;
        let http = Client::builder()
            .build()
            .context("Failed to build Jenkins client")?;

        Ok(Self {
            http,
            base,
            username: endpoint.username.clone(),
            password: endpoint.password.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Jenkins url cannot be a base: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        debug!(url = %url, "jenkins request");
        self.http
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .with_context(|| format!("Jenkins request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Jenkins request to {} failed", url))
    }
}

#[async_trait]
impl JenkinsApi for JenkinsClient {
    async fn jobs(&self) -> Result<Vec<String>> {
        let mut url = self.url(&["api", "json"])?;
        url.query_pairs_mut().append_pair("tree", "jobs[name]");

        let list: JobList = self
            .get(url)
            .await?
            .json()
            .await
            .context("Failed to decode Jenkins job list")?;

        Ok(list.jobs.into_iter().map(|job| job.name).collect())
    }

    async fn job_config(&self, job: &str) -> Result<String> {
        let url = self.url(&["job", job, "config.xml"])?;
        self.get(url)
            .await?
            .text()
            .await
            .with_context(|| format!("Failed to read config of job {}", job))
    }

    async fn plugins(&self) -> Result<BTreeSet<String>> {
        let mut url = self.url(&["pluginManager", "api", "json"])?;
        url.query_pairs_mut().append_pair("depth", "1");

        let list: PluginList = self
            .get(url)
            .await?
            .json()
            .await
            .context("Failed to decode Jenkins plugin list")?;

        Ok(list
            .plugins
            .into_iter()
            .map(|plugin| plugin.short_name)
            .collect())
    }
}
