use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Input JSON from the host hook system
#[derive(Debug, Default, Deserialize)]
pub struct Event {
    #[serde(default, deserialize_with = "lenient_string")]
    pub hook_event_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub session_id: Option<String>,
    /// Working directory of the session; version-control queries run here
    #[serde(default, deserialize_with = "lenient_string")]
    pub cwd: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transcript_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tool_name: Option<String>,
    /// Tool arguments. Schema varies per tool, anything but an object reads as empty.
    #[serde(default)]
    pub tool_input: Value,
}

/// Side fields with the wrong type read as absent rather than failing the event
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

impl Event {
    /// Parse an event from raw stdin. Returns None for anything that is not a JSON object.
    pub fn parse(raw: &str) -> Option<Event> {
        let value: Value = serde_json::from_str(raw).ok()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub fn tool_name(&self) -> &str {
        self.tool_name.as_deref().unwrap_or("")
    }

    /// Raw value of a tool_input field
    pub fn input(&self, key: &str) -> Option<&Value> {
        self.tool_input.get(key)
    }

    /// String value of a tool_input field, empty when absent or not a string
    pub fn input_str(&self, key: &str) -> &str {
        self.input(key).and_then(Value::as_str).unwrap_or("")
    }
}
