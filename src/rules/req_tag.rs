//! Nudges for `@req` requirement tags when a test file is written without any.

use crate::input::Event;
use crate::response::Response;
use crate::rules::paths::is_test_file;
use crate::rules::Context;
use anyhow::Result;
use regex::Regex;

const REQ_TAG_PATTERN: &str = r"(?i)@req\s*[:\s]";
const TEST_BLOCK_PATTERNS: &[&str] = &[r"\btest\s*\(", r"\bit\s*\(", r"\bdescribe\s*\("];

/// Compiled patterns for scanning test sources
struct TestScanner {
    req_tag: Regex,
    blocks: Vec<Regex>,
}

impl TestScanner {
    fn new() -> Result<Self> {
        let blocks = TEST_BLOCK_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            req_tag: Regex::new(REQ_TAG_PATTERN)?,
            blocks,
        })
    }

    fn has_req_tags(&self, content: &str) -> bool {
        self.req_tag.is_match(content)
    }

    /// Count test/it/describe blocks
    fn count_test_blocks(&self, content: &str) -> usize {
        self.blocks
            .iter()
            .map(|re| re.find_iter(content).count())
            .sum()
    }
}

pub fn evaluate(event: &Event, _ctx: &Context) -> Result<Option<Response>> {
    let file_path = event.input_str("file_path");

    // Only whole-file writes; edits are usually small changes
    if event.tool_name() != "Write" || !is_test_file(file_path) {
        return Ok(None);
    }

    let content = event.input_str("content");
    let scanner = TestScanner::new()?;
    let test_count = scanner.count_test_blocks(content);

    if test_count == 0 || scanner.has_req_tags(content) {
        return Ok(None);
    }

    Ok(Some(Response::advisory(reminder_message(
        test_count, file_path,
    ))))
}

fn reminder_message(test_count: usize, file_path: &str) -> String {
    format!(
        "\n💡 **@req Tag Reminder**\n\n\
         You're writing {} test(s) without `@req` tags.\n\n\
         Consider adding requirement tags to link tests to specifications:\n\
         ```typescript\n\
         // @req: FR-1.2 - User can log in with valid credentials\n\
         test('should authenticate user with correct password', () => {{\n  \
         // ...\n\
         }});\n\
         ```\n\n\
         Benefits:\n\
         • Links tests to requirements for traceability\n\
         • Helps test-architect understand test coverage\n\
         • Makes it clear what behavior is being verified\n\n\
         File: {}\n",
        test_count, file_path
    )
}
