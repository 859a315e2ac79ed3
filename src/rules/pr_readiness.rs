//! Suggests opening a pull request when a feature branch looks finished.
//! Fires at most once per persisted record.

use crate::input::Event;
use crate::response::Response;
use crate::rules::Context;
use crate::state::{SuggestionState, PR_READINESS_FILE};
use crate::transcript;
use anyhow::Result;

/// Branches that never get a suggestion
const TRUNK_BRANCHES: &[&str] = &["main", "master", ""];

pub fn evaluate(event: &Event, ctx: &Context) -> Result<Option<Response>> {
    let settings = &ctx.config.pr_readiness;
    let store = ctx.state_file::<SuggestionState>(PR_READINESS_FILE);
    let mut state = store.load();

    if state.pr_suggested {
        return Ok(None);
    }

    let branch = ctx.vcs.current_branch();
    if TRUNK_BRANCHES.contains(&branch.as_str()) {
        return Ok(None);
    }

    let reference = &ctx.config.reference_branch;
    let commits_ahead = ctx.vcs.commits_ahead(reference);
    if commits_ahead < 1 {
        return Ok(None);
    }

    let uncommitted = ctx.vcs.uncommitted_count();
    if uncommitted > settings.max_uncommitted {
        tracing::debug!(uncommitted, "too much uncommitted work for a PR suggestion");
        return Ok(None);
    }

    if !is_feature_branch(&branch, &settings.feature_prefixes) {
        return Ok(None);
    }

    if settings.require_completion_signal && !sounds_finished(event, &settings.completion_keywords)
    {
        tracing::debug!("no completion signal in transcript");
        return Ok(None);
    }

    let message = suggestion_message(&branch, reference, commits_ahead, uncommitted);

    state.mark_suggested();
    store.save(&state);

    Ok(Some(Response::advisory(message)))
}

/// Last assistant message mentions a completion keyword.
/// An unreadable transcript counts as no signal.
fn sounds_finished(event: &Event, keywords: &[String]) -> bool {
    let path = event.transcript_path.as_deref().unwrap_or("");
    match transcript::last_assistant_text(path) {
        Ok(Some(text)) => transcript::has_completion_signal(&text, keywords),
        Ok(None) => false,
        Err(e) => {
            tracing::debug!(error = %e, "unreadable transcript");
            false
        }
    }
}

fn is_feature_branch(branch: &str, prefixes: &[String]) -> bool {
    let lower = branch.to_lowercase();
    prefixes.iter().any(|p| lower.contains(p.as_str()))
}

fn suggestion_message(branch: &str, reference: &str, ahead: u64, uncommitted: usize) -> String {
    let changes = if uncommitted > 0 {
        format!("Uncommitted changes: {} file(s)", uncommitted)
    } else {
        "No uncommitted changes.".to_string()
    };
    let first_step = if uncommitted > 0 {
        "Commit remaining changes"
    } else {
        "Review your commits"
    };

    format!(
        "\n🚀 **PR Readiness Check**\n\n\
         Branch `{}` has {} commit(s) ahead of {}.\n\
         {}\n\n\
         This branch looks ready for a pull request!\n\n\
         **Next steps:**\n\
         1. {}\n\
         2. Run `npm test` to verify all tests pass\n\
         3. Create PR with: `gh pr create` or ask me to create one\n\n\
         Would you like me to create a PR for this branch?\n",
        branch, ahead, reference, changes, first_step
    )
}
