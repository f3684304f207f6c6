mod gerrit;
mod jenkins;

pub use gerrit::{GerritApi, GerritClient, GerritError};
pub use jenkins::{JenkinsApi, JenkinsClient};

use anyhow::{Result, bail};

use crate::salt::{RemoteQuery, Target};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub username: String,
    pub password: String,
}

pub trait Connector: Send + Sync {
    fn jenkins(&self, endpoint: &Endpoint) -> Result<Box<dyn JenkinsApi>>;
    fn gerrit(&self, endpoint: &Endpoint) -> Result<Box<dyn GerritApi>>;
}

pub struct HttpConnector;

impl Connector for HttpConnector {
    fn jenkins(&self, endpoint: &Endpoint) -> Result<Box<dyn JenkinsApi>> {
        Ok(Box::new(JenkinsClient::new(endpoint)?))
    }

    fn gerrit(&self, endpoint: &Endpoint) -> Result<Box<dyn GerritApi>> {
        Ok(Box::new(GerritClient::new(endpoint)?))
    }
}

pub const JENKINS_CLIENT: &str = "I@jenkins:client and not I@salt:master";
pub const GERRIT_CLIENT: &str = "I@gerrit:client";
const ADMIN_PASSWORD: &str = "_param:openldap_admin_password";

pub async fn jenkins_endpoint(salt: &dyn RemoteQuery, username: &str) -> Result<Option<Endpoint>> {
    let password = pillar_value(salt, &Target::pillar("jenkins:client"), ADMIN_PASSWORD).await?;
    let target = Target::compound(JENKINS_CLIENT);
    let port = pillar_value(salt, &target, "_param:haproxy_jenkins_bind_port").await?;
    let host = pillar_value(salt, &target, "_param:haproxy_jenkins_bind_host").await?;

    let (Some(password), Some(port), Some(host)) = (password, port, host) else {
        return Ok(None);
    };

    Ok(Some(Endpoint {
        url: format!("http://{}:{}", host, port),
        username: username.to_string(),
        password,
    }))
}

pub async fn gerrit_endpoint(salt: &dyn RemoteQuery, username: &str) -> Result<Option<Endpoint>> {
    let target = Target::compound(GERRIT_CLIENT);
    let password = pillar_value(salt, &target, ADMIN_PASSWORD).await?;
    let port = pillar_value(salt, &target, "gerrit:client:server:http_port").await?;
    let host = pillar_value(salt, &target, "gerrit:client:server:host").await?;
    let protocol = pillar_value(salt, &target, "gerrit:client:server:protocol").await?;

    let (Some(password), Some(port), Some(host), Some(protocol)) = (password, port, host, protocol)
    else {
        return Ok(None);
    };

    Ok(Some(Endpoint {
        url: format!("{}://{}:{}", protocol, host, port),
        username: username.to_string(),
        password,
    }))
}

async fn pillar_value(salt: &dyn RemoteQuery, target: &Target, key: &str) -> Result<Option<String>> {
    let result = salt.pillar_get(target, key).await?;
    match result.uniform_text()? {
        Some(value) if value.is_empty() => {
            bail!("Pillar {} is empty on nodes matching {}", key, target)
        }
        other => Ok(other),
    }
}
