use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod config;
mod git;
mod input;
mod response;
mod rules;
mod state;
mod transcript;

use config::HookConfig;
use git::Git;
use input::Event;
use response::Response;
use rules::{Context, Rule};
use state::StateFile;

const LOG_ENV: &str = "HOOKRULE_LOG";
const LOG_FILE_ENV: &str = "HOOKRULE_LOG_FILE";

/// Timeout for the repository lookup that happens before config is known
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "hookrule", version, about = "Advisory lifecycle hooks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate a rule against the hook event on stdin
    Run {
        #[arg(value_enum)]
        rule: Rule,
    },
    /// Delete persisted counter state for one rule, or all of them
    Reset {
        #[arg(value_enum)]
        rule: Option<Rule>,
    },
    /// List rules and where the host should invoke them
    Rules,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { rule } => {
            run_hook(rule);
            Ok(())
        }
        Command::Reset { rule } => reset_state(rule),
        Command::Rules => {
            list_rules();
            Ok(())
        }
    }
}

/// Logs go to stderr, or to a file when HOOKRULE_LOG_FILE is set.
/// Stdout is reserved for the hook response.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));

    let log_file = std::env::var_os(LOG_FILE_ENV).and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);

    let _ = match log_file {
        Some(file) => builder.with_writer(std::sync::Mutex::new(file)).try_init(),
        None => builder.with_writer(io::stderr).try_init(),
    };
}

/// Read one event, evaluate the rule, emit at most one response.
/// Never fails: bad input and rule errors end quietly with success.
fn run_hook(rule: Rule) {
    let Some(event) = read_input() else {
        tracing::debug!(rule = rule.name(), "ignoring malformed input");
        return;
    };

    tracing::debug!(
        rule = rule.name(),
        event = event.hook_event_name.as_deref().unwrap_or("None"),
        tool = event.tool_name(),
        session = event.session_id.as_deref().unwrap_or(""),
        "hook invoked"
    );

    let cwd = event
        .cwd
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = load_config(&cwd);
    let git = Git::new(&cwd, config.git_timeout());
    let ctx = Context {
        config: &config,
        vcs: &git,
        now: chrono::Utc::now().timestamp(),
    };

    match rules::evaluate(rule, &event, &ctx) {
        Ok(Some(response)) => {
            tracing::debug!(rule = rule.name(), blocking = response.is_blocking(), "responding");
            emit_response(&response);
        }
        Ok(None) => {
            tracing::debug!(rule = rule.name(), "no response");
        }
        Err(e) => {
            tracing::warn!(rule = rule.name(), error = ?e, "rule failed");
        }
    }
}

fn read_input() -> Option<Event> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).ok()?;
    Event::parse(&buffer)
}

fn load_config(cwd: &std::path::Path) -> HookConfig {
    let repo_root = Git::new(cwd, DISCOVERY_TIMEOUT).toplevel();
    config::resolve(cwd, repo_root.as_deref())
}

fn emit_response(response: &Response) {
    if let Err(e) = write_response(&mut io::stdout(), response) {
        tracing::warn!(error = ?e, "failed to emit response");
    }
}

/// A closed pipe is an error here, not a panic
fn write_response(out: &mut impl Write, response: &Response) -> Result<()> {
    let json = response.to_json()?;
    writeln!(out, "{}", json)?;
    out.flush()?;
    Ok(())
}

fn reset_state(rule: Option<Rule>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd);
    let selected: Vec<Rule> = match rule {
        Some(r) => vec![r],
        None => Rule::ALL.to_vec(),
    };

    for rule in selected {
        if let Some(name) = rule.state_file_name() {
            let store: StateFile<serde_json::Value> = StateFile::new(config.state_dir.join(name));
            store.clear()?;
            tracing::debug!(rule = rule.name(), path = %store.path().display(), "state cleared");
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn list_rules() {
    for rule in Rule::ALL {
        println!("{:<24}{}", rule.name(), rule.lifecycle());
    }
}
