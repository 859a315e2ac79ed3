use anyhow::Result;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A content item inside a transcript message
#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    type_: Option<String>,
    text: Option<String>,
}

/// Message content is either a plain string or a list of typed items
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Content {
    Text(String),
    Items(Vec<ContentItem>),
}

#[derive(Debug, Deserialize)]
struct Message {
    role: Option<String>,
    content: Option<Content>,
}

/// Represents a transcript line with message
#[derive(Debug, Deserialize)]
struct TranscriptLine {
    message: Option<Message>,
}

/// Text of the last assistant message in a JSONL transcript.
/// A missing transcript yields None; unparseable lines are skipped.
pub fn last_assistant_text(transcript_path: &str) -> Result<Option<String>> {
    let path = Path::new(transcript_path);
    if transcript_path.is_empty() || !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut last = None;

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        let Ok(entry) = serde_json::from_str::<TranscriptLine>(&line) else {
            continue;
        };
        let Some(message) = entry.message else {
            continue;
        };
        if message.role.as_deref() != Some("assistant") {
            continue;
        }

        let text = match message.content {
            Some(Content::Text(text)) => text,
            Some(Content::Items(items)) => items
                .into_iter()
                .filter(|i| i.type_.as_deref() == Some("text"))
                .filter_map(|i| i.text)
                .collect::<Vec<_>>()
                .join("\n"),
            None => continue,
        };
        if !text.trim().is_empty() {
            last = Some(text);
        }
    }

    Ok(last)
}

/// Whether the text mentions any completion keyword, case-insensitively
pub fn has_completion_signal(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_nonexistent_transcript() {
        assert!(last_assistant_text("/nonexistent/path.jsonl").unwrap().is_none());
        assert!(last_assistant_text("").unwrap().is_none());
    }

    #[test]
    fn test_last_assistant_text() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.jsonl");
        let lines = [
            r#"{"message":{"role":"assistant","content":[{"type":"text","text":"Starting work"}]}}"#,
            r#"{"message":{"role":"user","content":"thanks"}}"#,
            "garbage line",
            "",
            r#"{"message":{"role":"assistant","content":[{"type":"tool_use","name":"Bash"},{"type":"text","text":"All tests pass."}]}}"#,
            r#"{"type":"summary"}"#,
        ];
        std::fs::write(&path, lines.join("\n")).unwrap();

        let text = last_assistant_text(path.to_str().unwrap()).unwrap();
        assert_eq!(text.as_deref(), Some("All tests pass."));
    }

    #[test]
    fn test_plain_string_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.jsonl");
        std::fs::write(
            &path,
            r#"{"message":{"role":"assistant","content":"Implemented the parser"}}"#,
        )
        .unwrap();

        let text = last_assistant_text(path.to_str().unwrap()).unwrap();
        assert_eq!(text.as_deref(), Some("Implemented the parser"));
    }

    #[test]
    fn test_has_completion_signal() {
        let keywords = vec!["done".to_string(), "all tests pass".to_string()];
        assert!(has_completion_signal("We're DONE here", &keywords));
        assert!(has_completion_signal("All tests pass.", &keywords));
        assert!(!has_completion_signal("Still investigating", &keywords));
    }
}
