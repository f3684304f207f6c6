use std::collections::BTreeSet;

use cvp_checks::check::{Outcome, render_violations, verify};

#[test]
fn emptiness_turns_every_line_into_a_violation() {
    assert!(verify::non_empty_lines("ctl01", "").is_empty());
    assert!(verify::non_empty_lines("ctl01", "\n  \n").is_empty());

    let violations = verify::non_empty_lines("ctl01", "cinder-volume down\ncinder-backup disabled\n");
    assert_eq!(
        violations,
        vec![
            "ctl01: cinder-volume down".to_string(),
            "ctl01: cinder-backup disabled".to_string(),
        ]
    );
}

#[test]
fn count_above_expected_mentions_more_than_one() {
    let violation = verify::exact_count("host/backend for cinder", "2", 1).unwrap();
    assert!(violation.contains("more than 1"), "{}", violation);
    assert!(violation.contains('2'));
}

#[test]
fn count_matches_after_trimming() {
    assert_eq!(verify::exact_count("backend", " 1\n", 1), None);
}

#[test]
fn count_below_expected_or_garbage_is_a_violation() {
    let missing = verify::exact_count("backend", "0", 1).unwrap();
    assert!(missing.contains("found 0"));

    let garbage = verify::exact_count("backend", "ERROR: keystonerc missing", 1).unwrap();
    assert!(garbage.contains("unexpected output"));
}

#[test]
fn presence_reports_only_unmatched_names() {
    let actual: BTreeSet<&str> = ["A", "C"].into_iter().collect();
    let violations = verify::missing(["A", "B", "C"], &actual, |name| format!("{} not found", name));

    assert_eq!(violations, vec!["B not found".to_string()]);
}

#[test]
fn equality_mentions_subject_and_both_versions() {
    let violation = verify::mismatch("X", "v1", "v2").unwrap();
    assert!(violation.contains('X'));
    assert!(violation.contains("v1"));
    assert!(violation.contains("v2"));

    assert_eq!(verify::mismatch("X", "v1", "v1"), None);
}

#[tokio::test]
async fn remote_lookup_reports_not_found_resources() {
    let expected = vec!["repoA".to_string(), "repoB".to_string()];
    let violations = verify::missing_remote(
        &expected,
        async |name: &str| Ok::<_, anyhow::Error>(name != "repoB"),
        |name| format!("Repo {} is missing", name),
    )
    .await
    .unwrap();

    assert_eq!(violations, vec!["Repo repoB is missing".to_string()]);
}

#[tokio::test]
async fn remote_lookup_propagates_errors() {
    let expected = vec!["repoA".to_string(), "repoB".to_string()];
    let result = verify::missing_remote(
        &expected,
        async |name: &str| {
            if name == "repoA" {
                Ok(true)
            } else {
                Err(anyhow::anyhow!("connection reset"))
            }
        },
        |name| format!("Repo {} is missing", name),
    )
    .await;

    assert!(result.is_err());
}

#[test]
fn empty_violation_list_passes() {
    assert_eq!(Outcome::from_violations("anything", Vec::new()), Outcome::Pass);
    assert_eq!(Outcome::Pass.message(), None);
}

#[test]
fn failure_message_lists_every_violation() {
    let violations: Vec<String> = (0..5).map(|i| format!("violation {}", i)).collect();
    let outcome = Outcome::from_violations("Something is wrong", violations.clone());

    let message = outcome.message().unwrap();
    let (summary, body) = message.split_once('\n').unwrap();
    assert_eq!(summary, "Something is wrong:");

    let rendered: Vec<String> = serde_json::from_str(body).unwrap();
    assert_eq!(rendered, violations);
}

#[test]
fn rendered_violations_are_indented() {
    let rendered = render_violations(&["a".to_string(), "b".to_string()]);
    assert_eq!(rendered, "[\n    \"a\",\n    \"b\"\n]");
}
