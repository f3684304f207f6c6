pub mod verify;

use anyhow::Result;
use clap::ValueEnum;
use serde::{Serialize, Serializer};

use crate::checks;
use crate::config::Config;
use crate::drivetrain::Connector;
use crate::salt::RemoteQuery;

pub struct Context<'a> {
    pub salt: &'a dyn RemoteQuery,
    pub connector: &'a dyn Connector,
    pub config: &'a Config,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail {
        summary: String,
        violations: Vec<String>,
    },
    Skip(String),
}

impl Outcome {
    pub fn from_violations(summary: impl Into<String>, violations: Vec<String>) -> Self {
        if violations.is_empty() {
            Outcome::Pass
        } else {
            Outcome::Fail {
                summary: summary.into(),
                violations,
            }
        }
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        Outcome::Skip(reason.into())
    }

    pub fn violations(&self) -> &[String] {
        match self {
            Outcome::Fail { violations, .. } => violations,
            _ => &[],
        }
    }

    pub fn message(&self) -> Option<String> {
        match self {
            Outcome::Fail {
                summary,
                violations,
            } => Some(format!("{}:\n{}", summary, render_violations(violations))),
            _ => None,
        }
    }
}

pub fn render_violations(violations: &[String]) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match violations.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => violations.join("\n"),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum CheckId {
    CinderServices,
    DrivetrainServicesReplicas,
    DrivetrainComponentsAndVersions,
    JenkinsJobsBranch,
    JenkinsPlugins,
    GerritRepositories,
}

impl CheckId {
    pub const ALL: [CheckId; 6] = [
        CheckId::CinderServices,
        CheckId::DrivetrainServicesReplicas,
        CheckId::DrivetrainComponentsAndVersions,
        CheckId::JenkinsJobsBranch,
        CheckId::JenkinsPlugins,
        CheckId::GerritRepositories,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CheckId::CinderServices => "cinder_services",
            CheckId::DrivetrainServicesReplicas => "drivetrain_services_replicas",
            CheckId::DrivetrainComponentsAndVersions => "drivetrain_components_and_versions",
            CheckId::JenkinsJobsBranch => "jenkins_jobs_branch",
            CheckId::JenkinsPlugins => "jenkins_plugins",
            CheckId::GerritRepositories => "gerrit_repositories",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CheckId::CinderServices => "Cinder services are up and there is one volume backend",
            CheckId::DrivetrainServicesReplicas => {
                "DriveTrain docker services run their desired replica count"
            }
            CheckId::DrivetrainComponentsAndVersions => {
                "DriveTrain components are deployed at the expected version"
            }
            CheckId::JenkinsJobsBranch => "Jenkins jobs track the expected release branch",
            CheckId::JenkinsPlugins => "Jenkins has every plugin required by the pillar",
            CheckId::GerritRepositories => "Gerrit hosts every expected repository",
        }
    }

    pub async fn run(self, ctx: &Context<'_>) -> Result<Outcome> {
        match self {
            CheckId::CinderServices => checks::cinder::services(ctx).await,
            CheckId::DrivetrainServicesReplicas => checks::drivetrain::services_replicas(ctx).await,
            CheckId::DrivetrainComponentsAndVersions => {
                checks::drivetrain::components_and_versions(ctx).await
            }
            CheckId::JenkinsJobsBranch => checks::drivetrain::jenkins_jobs_branch(ctx).await,
            CheckId::JenkinsPlugins => checks::drivetrain::jenkins_plugins(ctx).await,
            CheckId::GerritRepositories => checks::drivetrain::gerrit_repositories(ctx).await,
        }
    }
}

impl std::fmt::Display for CheckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for CheckId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
