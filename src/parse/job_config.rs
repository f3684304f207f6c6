use anyhow::{Context, Result};

const BRANCH_SPEC: &str = "hudson.plugins.git.BranchSpec";

pub fn branch_spec(xml: &str) -> Result<Option<String>> {
    let document = roxmltree::Document::parse(strip_declaration(xml))
        .context("Failed to parse job config XML")?;

    let branch = document
        .descendants()
        .find(|node| node.has_tag_name(BRANCH_SPEC))
        .and_then(|spec| spec.descendants().find(|node| node.has_tag_name("name")))
        .and_then(|name| name.text())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from);

    Ok(branch)
}

// Jenkins writes `<?xml version='1.1' ...?>`, which the parser rejects.
fn strip_declaration(xml: &str) -> &str {
    let trimmed = xml.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    trimmed
}
