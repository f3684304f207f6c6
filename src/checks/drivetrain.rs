use anyhow::{Context as _, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::check::{Context, Outcome, verify};
use crate::drivetrain::{JENKINS_CLIENT, JenkinsApi, gerrit_endpoint, jenkins_endpoint};
use crate::parse::{ServiceDescriptor, branch_spec, parse_service_ls};
use crate::salt::Target;

pub const DOCKER_HOSTS: &str = "I@docker:host and not I@prometheus:server and not I@kubernetes:*";

pub const COMPONENTS: [&str; 8] = [
    "gerrit_db",
    "gerrit_server",
    "jenkins_master",
    "jenkins_slave01",
    "jenkins_slave02",
    "jenkins_slave03",
    "ldap_admin",
    "ldap_server",
];

const NOT_DEPLOYED: &str = "DriveTrain is not found on this environment";
const NO_VERSION: &str = "drivetrain_version is not defined. Skipping";

async fn docker_services(ctx: &Context<'_>) -> Result<Option<Vec<ServiceDescriptor>>> {
    let result = ctx
        .salt
        .cmd_run(&Target::compound(DOCKER_HOSTS), "docker service ls")
        .await?;
    let output = result
        .uniform_text()
        .context("docker service ls differs between swarm managers")?;
    Ok(output.map(|output| parse_service_ls(&output)))
}

async fn jenkins(ctx: &Context<'_>) -> Result<Option<Box<dyn JenkinsApi>>> {
    match jenkins_endpoint(ctx.salt, &ctx.config.drivetrain_username).await? {
        Some(endpoint) => Ok(Some(ctx.connector.jenkins(&endpoint)?)),
        None => Ok(None),
    }
}

pub async fn services_replicas(ctx: &Context<'_>) -> Result<Outcome> {
    let Some(services) = docker_services(ctx).await? else {
        return Ok(Outcome::skip(NOT_DEPLOYED));
    };

    let violations = services
        .iter()
        .filter(|service| service.is_replicated() && !service.replicas_satisfied())
        .map(|service| service.line.clone())
        .collect();

    Ok(Outcome::from_violations(
        "Some DriveTrain services doesn't have expected number of replicas",
        violations,
    ))
}

pub async fn components_and_versions(ctx: &Context<'_>) -> Result<Outcome> {
    let Some(expected) = ctx.config.drivetrain_version() else {
        return Ok(Outcome::skip(NO_VERSION));
    };
    let Some(services) = docker_services(ctx).await? else {
        return Ok(Outcome::skip(NOT_DEPLOYED));
    };

    let mut matched: BTreeMap<&str, &ServiceDescriptor> = BTreeMap::new();
    for service in &services {
        let component = COMPONENTS
            .into_iter()
            .find(|component| !matched.contains_key(component) && service.name.contains(component));
        if let Some(component) = component {
            matched.insert(component, service);
        }
    }

    let found: BTreeSet<&str> = matched.keys().copied().collect();
    let mut violations = verify::missing(COMPONENTS, &found, |component| {
        format!("{}: component not found", component)
    });
    for (component, service) in &matched {
        let observed = service.version().unwrap_or("<none>");
        violations.extend(verify::mismatch(component, expected, observed));
    }

    Ok(Outcome::from_violations(
        "Some DriveTrain components are not found or have a version mismatch",
        violations,
    ))
}

pub async fn jenkins_jobs_branch(ctx: &Context<'_>) -> Result<Outcome> {
    let Some(expected) = ctx.config.drivetrain_version() else {
        return Ok(Outcome::skip(NO_VERSION));
    };
    let Some(jenkins) = jenkins(ctx).await? else {
        return Ok(Outcome::skip("Jenkins is not found on this environment"));
    };

    let mut violations = Vec::new();
    for job in jenkins.jobs().await? {
        let config = jenkins.job_config(&job).await?;
        let branch = branch_spec(&config).with_context(|| format!("Job {}", job))?;
        let Some(branch) = branch else {
            continue;
        };
        if branch != expected && !branch.contains("master") {
            violations.push(format!(
                "Job {} has {} branch. Expected {}",
                job, branch, expected
            ));
        }
    }

    Ok(Outcome::from_violations(
        "Some DriveTrain jobs have version/branch mismatch",
        violations,
    ))
}

pub async fn jenkins_plugins(ctx: &Context<'_>) -> Result<Outcome> {
    let Some(jenkins) = jenkins(ctx).await? else {
        return Ok(Outcome::skip("Jenkins is not found on this environment"));
    };
    let installed = jenkins.plugins().await?;

    let pillar = ctx
        .salt
        .pillar_get(&Target::compound(JENKINS_CLIENT), "jenkins:client:plugin")
        .await?;
    let required = pillar.uniform()?.map(plugin_names).unwrap_or_default();

    let installed: BTreeSet<&str> = installed.iter().map(String::as_str).collect();
    let violations = verify::missing(required.iter().map(String::as_str), &installed, |plugin| {
        format!("Jenkins has missing plugin {}.", plugin)
    });

    Ok(Outcome::from_violations(
        "Some Jenkins plugins are not installed",
        violations,
    ))
}

fn plugin_names(value: &Value) -> Vec<String> {
    match value {
        Value::Object(plugins) => plugins.keys().cloned().collect(),
        Value::Array(plugins) => plugins
            .iter()
            .filter_map(|plugin| match plugin {
                Value::String(name) => Some(name.clone()),
                Value::Object(entry) => entry.get("name").and_then(Value::as_str).map(String::from),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub async fn gerrit_repositories(ctx: &Context<'_>) -> Result<Outcome> {
    let repos = ctx.config.drivetrain_repos();
    if repos.is_empty() {
        return Ok(Outcome::skip("drivetrain_repos is not defined. Skipping"));
    }
    let Some(endpoint) = gerrit_endpoint(ctx.salt, &ctx.config.drivetrain_username).await? else {
        return Ok(Outcome::skip("Gerrit is not found on this environment"));
    };
    let gerrit = ctx.connector.gerrit(&endpoint)?;

    let violations = verify::missing_remote(
        repos,
        async |repo: &str| gerrit.project_exists(repo).await.map_err(anyhow::Error::from),
        |repo| format!("Repo {} is missing", repo),
    )
    .await?;

    Ok(Outcome::from_violations(
        "Some repositories in Gerrit are missing",
        violations,
    ))
}
