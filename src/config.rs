use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "global_config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub salt: SaltConfig,
    pub drivetrain_version: Option<String>,
    pub drivetrain_repos: Vec<String>,
    pub drivetrain_username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SaltConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub eauth: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            salt: SaltConfig::default(),
            drivetrain_version: None,
            drivetrain_repos: Vec::new(),
            drivetrain_username: "admin".to_string(),
        }
    }
}

impl Default for SaltConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            eauth: "pam".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match resolve_path(path)? {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("SALT_URL") {
            self.salt.url = url;
        }
        if let Some(username) = lookup("SALT_USERNAME") {
            self.salt.username = username;
        }
        if let Some(password) = lookup("SALT_PASSWORD") {
            self.salt.password = password;
        }
        if let Some(eauth) = lookup("SALT_EAUTH") {
            self.salt.eauth = eauth;
        }
        if let Some(version) = lookup("DRIVETRAIN_VERSION") {
            self.drivetrain_version = Some(version);
        }
        if let Some(repos) = lookup("DRIVETRAIN_REPOS") {
            self.drivetrain_repos = repos
                .split(',')
                .map(str::trim)
                .filter(|repo| !repo.is_empty())
                .map(String::from)
                .collect();
        }
        self
    }

    pub fn drivetrain_version(&self) -> Option<&str> {
        self.drivetrain_version
            .as_deref()
            .map(str::trim)
            .filter(|version| !version.is_empty())
    }

    pub fn drivetrain_repos(&self) -> &[String] {
        &self.drivetrain_repos
    }
}

fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>> {
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            Ok(Some(path.to_path_buf()))
        }
        None => {
            let default = std::env::current_dir()?.join(DEFAULT_CONFIG_FILE);
            Ok(default.exists().then_some(default))
        }
    }
}
