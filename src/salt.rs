use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::SaltConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    Compound,
    Pillar,
}

impl TargetMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetMode::Compound => "compound",
            TargetMode::Pillar => "pillar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub expression: String,
    pub mode: TargetMode,
}

impl Target {
    pub fn compound(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            mode: TargetMode::Compound,
        }
    }

    pub fn pillar(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            mode: TargetMode::Pillar,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.expression, self.mode.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    nodes: BTreeMap<String, Value>,
}

impl QueryResult {
    pub fn new(nodes: BTreeMap<String, Value>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.nodes.iter().map(|(node, value)| (node.as_str(), value))
    }

    pub fn get(&self, node: &str) -> Option<&Value> {
        self.nodes.get(node)
    }

    pub fn uniform(&self) -> Result<Option<&Value>> {
        let mut entries = self.nodes.iter();
        let Some((first_node, first)) = entries.next() else {
            return Ok(None);
        };

        let disagreeing: Vec<&str> = entries
            .filter(|(_, value)| *value != first)
            .map(|(node, _)| node.as_str())
            .collect();

        if !disagreeing.is_empty() {
            bail!(
                "{} nodes matched with different output: {} disagrees with {}",
                self.nodes.len(),
                disagreeing.join(", "),
                first_node
            );
        }

        Ok(Some(first))
    }

    pub fn uniform_text(&self) -> Result<Option<String>> {
        Ok(self.uniform()?.map(text))
    }
}

impl FromIterator<(String, Value)> for QueryResult {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

pub fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
pub trait RemoteQuery: Send + Sync {
    async fn execute(
        &self,
        target: &Target,
        function: &str,
        args: &[String],
    ) -> Result<QueryResult>;

    async fn cmd_run(&self, target: &Target, command: &str) -> Result<QueryResult> {
        self.execute(target, "cmd.run", &[command.to_string()]).await
    }

    async fn pillar_get(&self, target: &Target, key: &str) -> Result<QueryResult> {
        self.execute(target, "pillar.get", &[key.to_string()]).await
    }
}

pub struct SaltApiClient {
    http: Client,
    url: String,
    token: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    eauth: &'a str,
}

#[derive(Serialize)]
struct LowState<'a> {
    client: &'a str,
    tgt: &'a str,
    fun: &'a str,
    arg: &'a [String],
    tgt_type: &'a str,
}

#[derive(Deserialize)]
#[serde(bound = "T: Deserialize<'de>")]
struct SaltResponse<T> {
    #[serde(rename = "return", default)]
    ret: Vec<T>,
}

#[derive(Deserialize)]
struct LoginToken {
    token: String,
}

impl SaltApiClient {
    pub async fn login(config: &SaltConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            bail!("Salt API url is not configured (set salt.url or SALT_URL)");
        }

        let url = config.url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .build()
            .context("Failed to build Salt API client")?;

        let response = http
            .post(format!("{}/login", url))
            .header("Accept", "application/json")
            .json(&LoginRequest {
                username: &config.username,
                password: &config.password,
                eauth: &config.eauth,
            })
            .send()
            .await
            .with_context(|| format!("Failed to reach Salt API at {}", url))?
            .error_for_status()
            .context("Salt API login rejected")?;

        let body: SaltResponse<LoginToken> = response
            .json()
            .await
            .context("Failed to decode Salt API login response")?;

        let token = body
            .ret
            .into_iter()
            .next()
            .map(|login| login.token)
            .ok_or_else(|| anyhow!("Salt API login returned no token"))?;

        debug!(url = %url, "logged in to Salt API");

        Ok(Self { http, url, token })
    }

    pub async fn logout(&self) -> Result<()> {
        self.http
            .post(format!("{}/logout", self.url))
            .header("Accept", "application/json")
            .header("X-Auth-Token", &self.token)
            .send()
            .await
            .with_context(|| format!("Failed to reach Salt API at {}", self.url))?
            .error_for_status()
            .context("Salt API logout rejected")?;

        debug!(url = %self.url, "logged out of Salt API");
        Ok(())
    }
}

#[async_trait]
impl RemoteQuery for SaltApiClient {
    async fn execute(
        &self,
        target: &Target,
        function: &str,
        args: &[String],
    ) -> Result<QueryResult> {
        debug!(tgt = %target, function, ?args, "salt query");

        let body = [LowState {
            client: "local",
            tgt: &target.expression,
            fun: function,
            arg: args,
            tgt_type: target.mode.as_str(),
        }];

        let response = self
            .http
            .post(format!("{}/", self.url))
            .header("Accept", "application/json")
            .header("X-Auth-Token", &self.token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Salt query {} on {} failed", function, target))?
            .error_for_status()
            .with_context(|| format!("Salt query {} on {} failed", function, target))?;

        let body: SaltResponse<BTreeMap<String, Value>> = response
            .json()
            .await
            .with_context(|| format!("Failed to decode Salt response for {}", function))?;

        let nodes = body.ret.into_iter().next().unwrap_or_default();
        debug!(tgt = %target, function, nodes = nodes.len(), "salt query answered");

        Ok(QueryResult::new(nodes))
    }
}
