//! Session start summary of branch state, with suggestions for stale or
//! oversized branches and untested production changes.

use crate::input::Event;
use crate::response::Response;
use crate::rules::Context;
use anyhow::Result;

const SECONDS_PER_DAY: i64 = 86_400;
const MAX_LISTED_FILES: usize = 3;

pub fn evaluate(_event: &Event, ctx: &Context) -> Result<Option<Response>> {
    let settings = &ctx.config.session_context;
    let reference = &ctx.config.reference_branch;

    let mut branch = ctx.vcs.current_branch();
    if branch.is_empty() {
        branch = "unknown".to_string();
    }
    let commits_ahead = ctx.vcs.commits_ahead(reference);
    let age_days = branch_age_days(ctx, &branch);
    let uncommitted = ctx.vcs.uncommitted_count();

    let diff_files = ctx.vcs.changed_files();
    let prod_files: Vec<&str> = diff_files
        .iter()
        .map(String::as_str)
        .filter(|f| f.contains("/src/") && !f.contains(".test."))
        .collect();
    let has_test_changes = diff_files
        .iter()
        .any(|f| f.contains(".test.") || f.contains("/tests/"));

    let mut lines = vec!["📋 **Session Context**".to_string()];
    lines.push(format!(
        "• Branch: `{}` ({} commits ahead of {})",
        branch, commits_ahead, reference
    ));
    if age_days > 0 {
        lines.push(format!("• Last commit: {} day(s) ago", age_days));
    }
    if uncommitted > 0 {
        lines.push(format!("• Uncommitted changes: {} file(s)", uncommitted));
    }

    let mut warnings = Vec::new();
    if commits_ahead > settings.many_commits {
        warnings.push("Branch has many commits - consider creating a PR".to_string());
    }
    if age_days > settings.stale_days {
        warnings.push("Branch is getting stale - consider merging or rebasing".to_string());
    }
    if !prod_files.is_empty() && !has_test_changes {
        let listed: Vec<&str> = prod_files.iter().take(MAX_LISTED_FILES).copied().collect();
        warnings.push(format!(
            "Production files modified without test changes: {}",
            listed.join(", ")
        ));
    }

    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("⚠️ **Suggestions:**".to_string());
        for w in &warnings {
            lines.push(format!("  • {}", w));
        }
    }

    lines.push(String::new());
    lines.push("💡 **Workflow:** Requirements → Tests (@req tags) → Implementation".to_string());
    lines.push("   Use `test-architect` for tests, `dev-agent` for implementation".to_string());
    lines.push("   Use `game-tester` agent or `/playtest` skill for MCP game testing".to_string());

    Ok(Some(Response::advisory(lines.join("\n"))))
}

/// Whole days since the branch's last commit, 0 when unknown or in the future
fn branch_age_days(ctx: &Context, branch: &str) -> i64 {
    match ctx.vcs.last_commit_time(branch) {
        Some(ts) => ((ctx.now - ts) / SECONDS_PER_DAY).max(0),
        None => 0,
    }
}
