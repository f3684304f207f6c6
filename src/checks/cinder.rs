use anyhow::Result;

use crate::check::{Context, Outcome, verify};
use crate::salt::{Target, text};

const SERVICES_DOWN: &str = r#". /root/keystonerc; cinder service-list | grep "down\|disabled""#;
const VOLUME_BACKENDS: &str = r#". /root/keystonerc; cinder service-list | grep "volume" | wc -l"#;

pub async fn services(ctx: &Context<'_>) -> Result<Outcome> {
    let down = ctx
        .salt
        .cmd_run(&Target::pillar("cinder:controller"), SERVICES_DOWN)
        .await?;
    if down.is_empty() {
        return Ok(Outcome::skip("Cinder is not found on this environment"));
    }

    let backends = ctx
        .salt
        .cmd_run(&Target::pillar("keystone:server"), VOLUME_BACKENDS)
        .await?;

    let mut violations = Vec::new();
    for (node, output) in down.iter() {
        violations.extend(verify::non_empty_lines(node, &text(output)));
    }
    if backends.is_empty() {
        violations.push("No keystone:server node reported cinder volume backends".to_string());
    }
    for (node, output) in backends.iter() {
        if let Some(violation) = verify::exact_count("host/backend for cinder", &text(output), 1) {
            violations.push(format!("{}: {}", node, violation));
        }
    }

    Ok(Outcome::from_violations(
        "Some cinder services are in wrong state",
        violations,
    ))
}
