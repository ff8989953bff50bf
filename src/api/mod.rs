use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Human,
    Ai,
    System,
    Function,
    Tool,
    #[serde(other)]
    Other,
}

/// A single message in the shape the runs API accepts as turn input.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TurnMessage {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default)]
    pub additional_kwargs: Map<String, Value>,
    #[serde(default)]
    pub example: bool,
}

impl TurnMessage {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: MessageType::Human,
            additional_kwargs: Map::new(),
            example: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunRequest<'a> {
    pub assistant_id: &'a str,
    pub thread_id: &'a str,
    /// `None` serializes as `null`, which asks the backend to resume the thread.
    pub input: Option<&'a [TurnMessage]>,
}

#[derive(Debug, Serialize)]
pub struct CreateThreadRequest<'a> {
    pub name: &'a str,
    pub assistant_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PutAssistantRequest<'a> {
    pub name: &'a str,
    pub config: &'a Value,
    pub public: bool,
}

/// Messages arrive on the stream as whole snapshots, not deltas.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StreamedMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Value,
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default)]
    pub additional_kwargs: Map<String, Value>,
}

impl StreamedMessage {
    pub fn text(&self) -> String {
        match &self.content {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RunMetadata {
    pub run_id: String,
}
