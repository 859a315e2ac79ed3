pub mod commit_reminder;
pub mod game_session;
pub mod paths;
pub mod pr_readiness;
pub mod req_tag;
pub mod session_context;
pub mod tdd;

use crate::config::HookConfig;
use crate::git::Vcs;
use crate::input::Event;
use crate::response::Response;
use crate::state::{StateFile, COMMIT_REMINDER_FILE, PR_READINESS_FILE};
use anyhow::Result;
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Every rule the binary knows, one per lifecycle check
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Rule {
    /// After Write/Edit: remind to commit after many edits
    CommitReminder,
    /// Stop: suggest a pull request for a finished feature branch
    PrReadiness,
    /// SessionStart: summarize branch state
    SessionContext,
    /// Before Write: nudge for @req tags in new tests
    ReqTagReminder,
    /// Before Write/Edit: restate the test-first workflow for production code
    TddReminder,
    /// Before the game_session tool: require an edition for new games
    ValidateGameSession,
}

impl Rule {
    pub const ALL: [Rule; 6] = [
        Rule::CommitReminder,
        Rule::PrReadiness,
        Rule::SessionContext,
        Rule::ReqTagReminder,
        Rule::TddReminder,
        Rule::ValidateGameSession,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::CommitReminder => "commit-reminder",
            Rule::PrReadiness => "pr-readiness",
            Rule::SessionContext => "session-context",
            Rule::ReqTagReminder => "req-tag-reminder",
            Rule::TddReminder => "tdd-reminder",
            Rule::ValidateGameSession => "validate-game-session",
        }
    }

    /// Where the host should invoke this rule
    pub fn lifecycle(&self) -> &'static str {
        match self {
            Rule::CommitReminder => "PostToolUse (Write|Edit)",
            Rule::PrReadiness => "Stop",
            Rule::SessionContext => "SessionStart",
            Rule::ReqTagReminder => "PreToolUse (Write)",
            Rule::TddReminder => "PreToolUse (Write|Edit)",
            Rule::ValidateGameSession => "PreToolUse (game_session)",
        }
    }

    /// Name of the persisted record, for rules that keep one
    pub fn state_file_name(&self) -> Option<&'static str> {
        match self {
            Rule::CommitReminder => Some(COMMIT_REMINDER_FILE),
            Rule::PrReadiness => Some(PR_READINESS_FILE),
            _ => None,
        }
    }
}

/// Everything a rule may consult besides the event itself
pub struct Context<'a> {
    pub config: &'a HookConfig,
    pub vcs: &'a dyn Vcs,
    /// Current Unix time in seconds
    pub now: i64,
}

impl Context<'_> {
    pub fn state_file<T>(&self, name: &str) -> StateFile<T>
    where
        T: Default + Serialize + DeserializeOwned,
    {
        StateFile::new(self.config.state_dir.join(name))
    }
}

/// Evaluate one rule against an event.
/// Ok(None) means the rule has nothing to say.
pub fn evaluate(rule: Rule, event: &Event, ctx: &Context) -> Result<Option<Response>> {
    match rule {
        Rule::CommitReminder => commit_reminder::evaluate(event, ctx),
        Rule::PrReadiness => pr_readiness::evaluate(event, ctx),
        Rule::SessionContext => session_context::evaluate(event, ctx),
        Rule::ReqTagReminder => req_tag::evaluate(event, ctx),
        Rule::TddReminder => tdd::evaluate(event, ctx),
        Rule::ValidateGameSession => game_session::evaluate(event, ctx),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn test_names_match_cli_values() {
        for rule in Rule::ALL {
            let parsed = Rule::from_str(rule.name(), false).unwrap();
            assert_eq!(parsed, rule);
        }
    }

    #[test]
    fn test_only_counter_rules_have_state() {
        let with_state: Vec<Rule> = Rule::ALL
            .into_iter()
            .filter(|r| r.state_file_name().is_some())
            .collect();
        assert_eq!(with_state, vec![Rule::CommitReminder, Rule::PrReadiness]);
    }
}
