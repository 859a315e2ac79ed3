use crate::input::Event;
use crate::response::Response;
use crate::rules::paths::is_production_code;
use crate::rules::Context;
use anyhow::{Context as _, Result};
use regex::Regex;

/// Remind about the test-first workflow before production code is edited.
/// Advisory only, the edit always proceeds.
pub fn evaluate(event: &Event, ctx: &Context) -> Result<Option<Response>> {
    let settings = &ctx.config.tdd_reminder;
    let file_path = event.input_str("file_path");

    let source_root = Regex::new(&settings.source_pattern)
        .with_context(|| format!("Invalid source pattern '{}'", settings.source_pattern))?;

    if !is_production_code(file_path, &source_root, &settings.extensions) {
        return Ok(None);
    }

    Ok(Some(Response::advisory(reminder_message(file_path))))
}

fn reminder_message(file_path: &str) -> String {
    let rule = "=".repeat(80);
    format!(
        "\n{rule}\n\
         WORKFLOW REMINDER: You are editing production code.\n\n\
         This project follows: Requirements -> Tests -> Implementation\n\n\
         Before proceeding, verify:\n  \
         1. Are requirements defined? (Check @req tags in tests or GitHub issues)\n  \
         2. Is there a failing test that defines this change?\n  \
         3. Have you run 'npm test' to confirm the current state?\n\n\
         If this is a bug fix: Write a test that reproduces the bug FIRST.\n\
         If this is a new feature: Define requirements, then write failing tests FIRST.\n\n\
         Consider using:\n  \
         - test-architect agent: For writing requirements and tests\n  \
         - dev-agent: For implementing code to make tests pass\n\n\
         File: {file_path}\n\
         {rule}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::FakeVcs;
    use crate::rules::testing::{config_in, run};
    use crate::rules::Rule;
    use tempfile::TempDir;

    fn check(path: &str) -> Option<Response> {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let json = serde_json::json!({
            "tool_name": "Edit",
            "tool_input": {"file_path": path}
        })
        .to_string();
        run(Rule::TddReminder, &json, &config, &FakeVcs::default())
    }

    #[test]
    fn test_production_edit_reminds() {
        let response = check("/repo/packages/core/src/game.ts").unwrap();
        assert!(!response.is_blocking());
        let message = response.system_message.unwrap();
        assert!(message.contains("WORKFLOW REMINDER: You are editing production code."));
        assert!(message.contains("  1. Are requirements defined?"));
        assert!(message.contains("File: /repo/packages/core/src/game.ts"));
    }

    #[test]
    fn test_non_production_edits_are_quiet() {
        assert!(check("/repo/packages/core/src/game.test.ts").is_none());
        assert!(check("/repo/packages/core/src/types.d.ts").is_none());
        assert!(check("/repo/docs/README.md").is_none());
        assert!(check("").is_none());
    }

    #[test]
    fn test_configured_source_root() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp);
        config.tdd_reminder.source_pattern = "^lib/".to_string();
        let json = r#"{"tool_name":"Write","tool_input":{"file_path":"lib/index.js"}}"#;
        assert!(run(Rule::TddReminder, json, &config, &FakeVcs::default()).is_some());
    }

    #[test]
    fn test_invalid_source_root_is_error() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp);
        config.tdd_reminder.source_pattern = "(".to_string();
        let event = Event::parse(r#"{"tool_input":{"file_path":"lib/index.js"}}"#).unwrap();
        let ctx = Context {
            config: &config,
            vcs: &FakeVcs::default(),
            now: 0,
        };
        assert!(evaluate(&event, &ctx).is_err());
    }
}
