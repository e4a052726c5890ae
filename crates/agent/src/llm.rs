use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: LlmRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: LlmRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: LlmRole::Assistant, content: content.into() }
    }
}

/// A function the model may call instead of answering in free text.
#[derive(Clone, Debug, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the function arguments.
    pub parameters: serde_json::Value,
}

/// What the model produced: either free text or a call to one of the
/// offered tools, with the arguments still as a raw JSON string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlmReply {
    Text(String),
    ToolCall { name: String, arguments: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    /// Network-level failure, including timeouts, after retries.
    #[error("llm transport failure: {0}")]
    Transport(String),
    #[error("llm api returned status {status}: {detail}")]
    Api { status: u16, detail: String },
    /// The response arrived but did not have the expected shape.
    #[error("malformed llm response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One chat completion round. `tools` may be empty, in which case the
    /// reply is expected to be text.
    async fn chat(&self, messages: &[LlmMessage], tools: &[ToolSpec])
        -> Result<LlmReply, LlmError>;
}
