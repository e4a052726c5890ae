//! Client for the OpenAI chat completions API and compatible gateways.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use advisor_core::config::LlmConfig;

use crate::llm::{LlmClient, LlmError, LlmMessage, LlmReply, LlmRole, ToolSpec};

const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    max_retries: u32,
}

impl OpenAiClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn send_once(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
        let mut builder =
            self.client.post(format!("{}/chat/completions", self.base_url)).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response =
            builder.send().await.map_err(|error| LlmError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|_| "no response body".to_string());
            return Err(LlmError::Api { status: status.as_u16(), detail });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|error| LlmError::Malformed(error.to_string()))
    }

    async fn send_with_retry(&self, request: &ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
        let mut attempt = 0;
        loop {
            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(error) if attempt < self.max_retries && is_retryable(&error) => {
                    let delay = RETRY_BASE_DELAY * 2_u32.saturating_pow(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "llm request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Transient failures are worth retrying; client errors other than
/// rate limiting are not.
fn is_retryable(error: &LlmError) -> bool {
    match error {
        LlmError::Transport(_) => true,
        LlmError::Api { status, .. } => *status == 429 || *status >= 500,
        LlmError::Malformed(_) => false,
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(
        &self,
        messages: &[LlmMessage],
        tools: &[ToolSpec],
    ) -> Result<LlmReply, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            tools: tools.iter().map(WireTool::from).collect(),
            temperature: 0.0,
        };

        debug!(model = %self.model, messages = messages.len(), tools = tools.len(), "llm chat");
        let response = self.send_with_retry(&request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Malformed("response contained no choices".to_string()))?;

        if let Some(call) = choice.message.tool_calls.and_then(|calls| calls.into_iter().next()) {
            return Ok(LlmReply::ToolCall {
                name: call.function.name,
                arguments: call.function.arguments,
            });
        }

        match choice.message.content {
            Some(content) => Ok(LlmReply::Text(content)),
            None => Err(LlmError::Malformed(
                "response carried neither content nor a tool call".to_string(),
            )),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a LlmMessage> for WireMessage<'a> {
    fn from(message: &'a LlmMessage) -> Self {
        let role = match message.role {
            LlmRole::System => "system",
            LlmRole::User => "user",
            LlmRole::Assistant => "assistant",
        };
        Self { role, content: &message.content }
    }
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

impl<'a> From<&'a ToolSpec> for WireTool<'a> {
    fn from(tool: &'a ToolSpec) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: &tool.name,
                description: &tool.description,
                parameters: &tool.parameters,
            },
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    function: WireFunctionCall,
}

#[derive(Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}
