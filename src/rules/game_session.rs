//! Guards new game sessions: an `edition` is required so playtests draw from
//! the right card pool, and a missing `seed` earns a note.

use crate::input::Event;
use crate::response::Response;
use crate::rules::Context;
use anyhow::Result;
use serde_json::Value;

const MISSING_EDITION: &str = "Missing `edition` parameter in game_session call.\n\n\
**Required**: You must specify `edition` when starting a new game:\n\
- `edition: \"mixed\"` - All 25 kingdom cards (recommended for testing)\n\
- `edition: \"2E\"` - Second Edition only (excludes Chapel, Adventurer, etc.)\n\
- `edition: \"1E\"` - First Edition only\n\n\
**Example**: `game_session(command: \"new\", seed: \"test-1\", edition: \"mixed\")`\n\n\
Consult `/docs/testing/mcp-playtests/SCENARIOS.md` for correct seed/edition values.";

const MISSING_SEED: &str = "**Note**: No `seed` specified. Game will use random kingdom.\n\
For reproducible tests, specify a seed from SCENARIOS.md.";

pub fn evaluate(event: &Event, _ctx: &Context) -> Result<Option<Response>> {
    // Only new games are validated
    if event.input_str("command") != "new" {
        return Ok(None);
    }

    if !is_present(event.input("edition")) {
        tracing::debug!("blocking game_session without edition");
        return Ok(Some(Response::block(MISSING_EDITION)));
    }

    if !is_present(event.input("seed")) {
        return Ok(Some(Response::advisory(MISSING_SEED)));
    }

    Ok(None)
}

/// A parameter counts as supplied only when it carries a non-empty value
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::FakeVcs;
    use crate::rules::testing::{config_in, run};
    use crate::rules::Rule;
    use serde_json::json;
    use tempfile::TempDir;

    fn check(tool_input: Value) -> Option<Response> {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let json = json!({
            "tool_name": "mcp__principality__game_session",
            "tool_input": tool_input
        })
        .to_string();
        run(Rule::ValidateGameSession, &json, &config, &FakeVcs::default())
    }

    #[test]
    fn test_missing_edition_blocks() {
        let response = check(json!({"command": "new", "seed": "test-1"})).unwrap();
        assert!(response.is_blocking());
        assert!(response.system_message.is_none());
        let reason = response.reason.unwrap();
        assert!(reason.starts_with("Missing `edition` parameter"));
        assert!(reason.contains("`edition: \"mixed\"`"));
    }

    #[test]
    fn test_empty_edition_blocks() {
        let response = check(json!({"command": "new", "edition": "", "seed": "s"})).unwrap();
        assert!(response.is_blocking());
        let response = check(json!({"command": "new", "edition": null})).unwrap();
        assert!(response.is_blocking());
    }

    #[test]
    fn test_mistyped_session_id_still_blocks() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let json = r#"{"session_id":123,"tool_input":{"command":"new"}}"#;
        let response = run(Rule::ValidateGameSession, json, &config, &FakeVcs::default()).unwrap();
        assert!(response.is_blocking());
    }

    #[test]
    fn test_missing_seed_advises() {
        let response = check(json!({"command": "new", "edition": "mixed"})).unwrap();
        assert!(!response.is_blocking());
        assert!(response.system_message.unwrap().contains("No `seed` specified"));
    }

    #[test]
    fn test_complete_call_is_quiet() {
        assert!(check(json!({"command": "new", "edition": "2E", "seed": "test-1"})).is_none());
    }

    #[test]
    fn test_other_commands_are_quiet() {
        assert!(check(json!({"command": "end"})).is_none());
        assert!(check(json!({})).is_none());
    }

    #[test]
    fn test_is_present() {
        assert!(!is_present(None));
        assert!(!is_present(Some(&json!(null))));
        assert!(!is_present(Some(&json!(false))));
        assert!(!is_present(Some(&json!(0))));
        assert!(!is_present(Some(&json!([]))));
        assert!(is_present(Some(&json!("1E"))));
        assert!(is_present(Some(&json!(7))));
        assert!(is_present(Some(&json!({"k": 1}))));
    }
}
