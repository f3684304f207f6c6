#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use cvp_checks::check::{CheckId, Context, Outcome};
use cvp_checks::config::Config;
use cvp_checks::drivetrain::{Connector, Endpoint, GerritApi, GerritError, JenkinsApi};
use cvp_checks::salt::{QueryResult, RemoteQuery, Target};

pub const DOCKER_SERVICE_LS: &str = include_str!("../fixtures/docker_service_ls.txt");
pub const JOB_CONFIG: &str = include_str!("../fixtures/job_config.xml");
pub const JOB_CONFIG_INLINE: &str = include_str!("../fixtures/job_config_inline.xml");

pub const DOCKER_HOSTS: &str = "I@docker:host and not I@prometheus:server and not I@kubernetes:*";
pub const JENKINS_CLIENT: &str = "I@jenkins:client and not I@salt:master";
pub const GERRIT_CLIENT: &str = "I@gerrit:client";

#[derive(Default)]
pub struct FakeSalt {
    answers: HashMap<(String, String, String), QueryResult>,
    calls: Mutex<Vec<String>>,
}

impl FakeSalt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, expression: &str, function: &str, arg: &str, nodes: &[(&str, Value)]) -> Self {
        let result = nodes
            .iter()
            .map(|(node, value)| (node.to_string(), value.clone()))
            .collect();
        self.answers.insert(
            (expression.to_string(), function.to_string(), arg.to_string()),
            result,
        );
        self
    }

    pub fn cmd(self, expression: &str, command: &str, nodes: &[(&str, &str)]) -> Self {
        let nodes: Vec<(&str, Value)> = nodes.iter().map(|(node, out)| (*node, json!(out))).collect();
        self.answer(expression, "cmd.run", command, &nodes)
    }

    pub fn pillar(self, expression: &str, key: &str, nodes: &[(&str, Value)]) -> Self {
        self.answer(expression, "pillar.get", key, nodes)
    }

    pub fn docker(self, output: &str) -> Self {
        self.cmd(DOCKER_HOSTS, "docker service ls", &[("cid01", output)])
    }

    pub fn jenkins_pillar(self) -> Self {
        self.pillar(
            "jenkins:client",
            "_param:openldap_admin_password",
            &[("cid01", json!("secret"))],
        )
        .pillar(
            JENKINS_CLIENT,
            "_param:haproxy_jenkins_bind_port",
            &[("cid01", json!(8081))],
        )
        .pillar(
            JENKINS_CLIENT,
            "_param:haproxy_jenkins_bind_host",
            &[("cid01", json!("10.0.0.10"))],
        )
    }

    pub fn gerrit_pillar(self) -> Self {
        self.pillar(GERRIT_CLIENT, "_param:openldap_admin_password", &[("cid01", json!("secret"))])
            .pillar(GERRIT_CLIENT, "gerrit:client:server:http_port", &[("cid01", json!(8080))])
            .pillar(GERRIT_CLIENT, "gerrit:client:server:host", &[("cid01", json!("10.0.0.10"))])
            .pillar(GERRIT_CLIENT, "gerrit:client:server:protocol", &[("cid01", json!("http"))])
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteQuery for FakeSalt {
    async fn execute(&self, target: &Target, function: &str, args: &[String]) -> Result<QueryResult> {
        let arg = args.first().cloned().unwrap_or_default();
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {} {}", target.expression, function, arg));
        let key = (target.expression.clone(), function.to_string(), arg);
        Ok(self.answers.get(&key).cloned().unwrap_or_default())
    }
}

#[derive(Clone, Default)]
pub struct FakeJenkins {
    pub jobs: Vec<(String, String)>,
    pub plugins: BTreeSet<String>,
}

impl FakeJenkins {
    pub fn job(mut self, name: &str, config: &str) -> Self {
        self.jobs.push((name.to_string(), config.to_string()));
        self
    }

    pub fn plugin(mut self, name: &str) -> Self {
        self.plugins.insert(name.to_string());
        self
    }
}

#[async_trait]
impl JenkinsApi for FakeJenkins {
    async fn jobs(&self) -> Result<Vec<String>> {
        Ok(self.jobs.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn job_config(&self, job: &str) -> Result<String> {
        match self.jobs.iter().find(|(name, _)| name == job) {
            Some((_, config)) => Ok(config.clone()),
            None => bail!("no such job {}", job),
        }
    }

    async fn plugins(&self) -> Result<BTreeSet<String>> {
        Ok(self.plugins.clone())
    }
}

#[derive(Clone, Default)]
pub struct FakeGerrit {
    pub projects: BTreeSet<String>,
    pub broken: BTreeSet<String>,
}

impl FakeGerrit {
    pub fn project(mut self, name: &str) -> Self {
        self.projects.insert(name.to_string());
        self
    }

    pub fn broken(mut self, name: &str) -> Self {
        self.broken.insert(name.to_string());
        self
    }
}

#[async_trait]
impl GerritApi for FakeGerrit {
    async fn get(&self, path: &str) -> Result<Value, GerritError> {
        let Some(encoded) = path.strip_prefix("/projects/") else {
            return Err(GerritError::NotFound(path.to_string()));
        };
        let name = encoded.replace("%2F", "/");
        if self.broken.contains(&name) {
            return Err(GerritError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                path: path.to_string(),
            });
        }
        if self.projects.contains(&name) {
            Ok(json!({ "id": encoded, "name": name, "state": "ACTIVE" }))
        } else {
            Err(GerritError::NotFound(path.to_string()))
        }
    }
}

#[derive(Default)]
pub struct FakeConnector {
    pub jenkins: FakeJenkins,
    pub gerrit: FakeGerrit,
    endpoints: Mutex<Vec<Endpoint>>,
}

impl FakeConnector {
    pub fn with_jenkins(jenkins: FakeJenkins) -> Self {
        Self {
            jenkins,
            ..Self::default()
        }
    }

    pub fn with_gerrit(gerrit: FakeGerrit) -> Self {
        Self {
            gerrit,
            ..Self::default()
        }
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.endpoints.lock().unwrap().clone()
    }
}

impl Connector for FakeConnector {
    fn jenkins(&self, endpoint: &Endpoint) -> Result<Box<dyn JenkinsApi>> {
        self.endpoints.lock().unwrap().push(endpoint.clone());
        Ok(Box::new(self.jenkins.clone()))
    }

    fn gerrit(&self, endpoint: &Endpoint) -> Result<Box<dyn GerritApi>> {
        self.endpoints.lock().unwrap().push(endpoint.clone());
        Ok(Box::new(self.gerrit.clone()))
    }
}

pub fn config_with_version(version: &str) -> Config {
    Config {
        drivetrain_version: Some(version.to_string()),
        ..Config::default()
    }
}

pub async fn run(id: CheckId, salt: &FakeSalt, connector: &FakeConnector, config: &Config) -> Result<Outcome> {
    let ctx = Context {
        salt,
        connector,
        config,
    };
    id.run(&ctx).await
}
