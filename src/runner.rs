use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::check::{CheckId, Context, Outcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Fail,
    Skip,
    Error,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pass => write!(f, "PASS"),
            Status::Fail => write!(f, "FAIL"),
            Status::Skip => write!(f, "SKIP"),
            Status::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub id: CheckId,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub results: Vec<CheckResult>,
}

impl RunReport {
    pub fn count(&self, status: Status) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn is_success(&self) -> bool {
        self.count(Status::Fail) == 0 && self.count(Status::Error) == 0
    }
}

impl CheckResult {
    pub fn from_outcome(id: CheckId, outcome: anyhow::Result<Outcome>, elapsed: Duration) -> Self {
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        match outcome {
            Ok(outcome) => {
                let message = outcome.message();
                let violations = outcome.violations().to_vec();
                let (status, reason) = match outcome {
                    Outcome::Pass => (Status::Pass, None),
                    Outcome::Fail { summary, .. } => (Status::Fail, Some(summary)),
                    Outcome::Skip(reason) => (Status::Skip, Some(reason)),
                };
                Self {
                    id,
                    status,
                    reason,
                    violations,
                    message,
                    duration_ms,
                }
            }
            Err(e) => Self {
                id,
                status: Status::Error,
                reason: Some(format!("{:#}", e)),
                violations: Vec::new(),
                message: None,
                duration_ms,
            },
        }
    }
}

pub async fn run_checks(ctx: &Context<'_>, checks: &[CheckId], progress: bool) -> RunReport {
    let started_at = Utc::now();
    let pb = if progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut results = Vec::with_capacity(checks.len());
    for &id in checks {
        pb.set_message(format!("{}", id));

        let start = Instant::now();
        let outcome = id.run(ctx).await;
        let result = CheckResult::from_outcome(id, outcome, start.elapsed());

        match result.status {
            Status::Skip => warn!(check = %id, reason = ?result.reason, "check skipped"),
            status => info!(check = %id, %status, duration_ms = result.duration_ms, "check finished"),
        }

        results.push(result);
    }

    pb.finish_and_clear();

    RunReport {
        started_at,
        results,
    }
}
