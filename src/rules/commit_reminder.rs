//! Edit-count commit reminder.
//!
//! Counts qualifying file edits in a persisted record and, once enough edits
//! have accumulated since the last reminder while the working tree is dirty,
//! suggests committing.

use crate::input::Event;
use crate::response::Response;
use crate::rules::paths::{base_name, file_matches_pattern};
use crate::rules::Context;
use crate::state::{EditCounter, COMMIT_REMINDER_FILE};
use anyhow::{Context as _, Result};
use glob::Pattern;

pub fn evaluate(event: &Event, ctx: &Context) -> Result<Option<Response>> {
    let settings = &ctx.config.commit_reminder;
    let file_path = event.input_str("file_path");

    if file_path.is_empty() {
        return Ok(None);
    }

    let patterns = settings
        .tracked_patterns
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid tracked pattern '{}'", p)))
        .collect::<Result<Vec<_>>>()?;

    if !patterns.iter().any(|p| file_matches_pattern(file_path, p)) {
        return Ok(None);
    }

    // Skip the hook files themselves
    if settings
        .excluded_dirs
        .iter()
        .any(|dir| file_path.contains(dir.as_str()))
    {
        return Ok(None);
    }

    let store = ctx.state_file::<EditCounter>(COMMIT_REMINDER_FILE);
    let mut counter = store.load();
    counter.record(file_path);

    let mut response = None;
    if counter.since_reminder() >= settings.threshold {
        let uncommitted = ctx.vcs.uncommitted_count();
        tracing::debug!(
            edits = counter.edit_count,
            uncommitted,
            "commit reminder threshold reached"
        );
        if uncommitted > 0 {
            response = Some(Response::advisory(reminder_message(
                &counter,
                uncommitted,
                settings.recent_files,
            )));
            counter.mark_reminded();
        }
    }

    store.save(&counter);
    Ok(response)
}

/// Base names of the most recent files, with a count of the rest
fn recent_files_display(counter: &EditCounter, recent: usize) -> String {
    let names: Vec<&str> = counter
        .recent(recent)
        .iter()
        .map(|f| base_name(f))
        .collect();
    let mut display = names.join(", ");
    let hidden = counter.files_edited.len().saturating_sub(recent);
    if hidden > 0 {
        display.push_str(&format!(" (+{} more)", hidden));
    }
    display
}

fn reminder_message(counter: &EditCounter, uncommitted: usize, recent: usize) -> String {
    format!(
        "\n📝 **Commit Reminder**\n\n\
         You've made {} edits across {} file(s).\n\
         Recent: {}\n\n\
         Currently {} uncommitted file(s) in the working tree.\n\n\
         Consider committing your progress to:\n\
         • Create a checkpoint you can return to\n\
         • Keep commits focused and reviewable\n\
         • Avoid losing work\n\n\
         Run `git status` to review changes, or ask me to commit when ready.\n",
        counter.edit_count,
        counter.files_edited.len(),
        recent_files_display(counter, recent),
        uncommitted
    )
}
