use anyhow::Result;
use std::collections::BTreeSet;

pub fn non_empty_lines(prefix: &str, output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("{}: {}", prefix, line))
        .collect()
}

pub fn exact_count(subject: &str, observed: &str, expected: usize) -> Option<String> {
    let observed = observed.trim();
    match observed.parse::<usize>() {
        Ok(count) if count == expected => None,
        Ok(count) if count > expected => Some(format!(
            "There are more than {} {}: found {}",
            expected, subject, count
        )),
        Ok(count) => Some(format!(
            "Expected exactly {} {}, found {}",
            expected, subject, count
        )),
        Err(_) => Some(format!(
            "Expected exactly {} {}, got unexpected output {:?}",
            expected, subject, observed
        )),
    }
}

pub fn missing<'a>(
    expected: impl IntoIterator<Item = &'a str>,
    actual: &BTreeSet<&str>,
    describe: impl Fn(&str) -> String,
) -> Vec<String> {
    expected
        .into_iter()
        .filter(|name| !actual.contains(name))
        .map(describe)
        .collect()
}

pub fn mismatch(subject: &str, expected: &str, observed: &str) -> Option<String> {
    (expected != observed).then(|| {
        format!(
            "{}: expected version is {}, actual - {}",
            subject, expected, observed
        )
    })
}

pub async fn missing_remote<F>(
    expected: &[String],
    mut exists: F,
    describe: impl Fn(&str) -> String,
) -> Result<Vec<String>>
where
    F: AsyncFnMut(&str) -> Result<bool>,
{
    let mut violations = Vec::new();
    for resource in expected {
        if !exists(resource.as_str()).await? {
            violations.push(describe(resource.as_str()));
        }
    }
    Ok(violations)
}
