use anyhow::Result;
use std::fmt::Write;

use crate::check::CheckId;
use crate::runner::{RunReport, Status};

pub fn render_text(report: &RunReport) -> Result<String> {
    let mut buffer = String::new();

    writeln!(
        buffer,
        "[cvp-checks | {}]",
        report.started_at.format("%Y-%m-%dT%H:%M:%SZ")
    )?;
    writeln!(buffer)?;

    for result in &report.results {
        writeln!(
            buffer,
            "{:<5} {} ({} ms)",
            result.status.to_string(),
            result.id,
            result.duration_ms
        )?;

        match result.status {
            Status::Fail => {
                if let Some(message) = &result.message {
                    for line in message.lines() {
                        writeln!(buffer, "      {}", line)?;
                    }
                }
            }
            Status::Skip | Status::Error => {
                if let Some(reason) = &result.reason {
                    writeln!(buffer, "      {}", reason)?;
                }
            }
            Status::Pass => {}
        }
    }

    writeln!(buffer)?;
    writeln!(
        buffer,
        "{} passed, {} failed, {} skipped, {} errors",
        report.count(Status::Pass),
        report.count(Status::Fail),
        report.count(Status::Skip),
        report.count(Status::Error)
    )?;

    Ok(buffer)
}

pub fn render_json(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn render_catalogue() -> Result<String> {
    let mut buffer = String::new();
    let width = CheckId::ALL
        .iter()
        .map(|id| id.name().len())
        .max()
        .unwrap_or(0);

    for id in CheckId::ALL {
        writeln!(buffer, "{:<width$}  {}", id.name(), id.description())?;
    }

    Ok(buffer)
}
