//! Turns the accumulated question-and-answer transcript into a structured
//! investment profile.

use std::sync::Arc;

use tracing::warn;

use advisor_core::domain::profile::InvestmentProfile;
use advisor_core::errors::{ApplicationError, DomainError};

use crate::llm::{LlmClient, LlmError, LlmMessage, LlmReply};
use crate::tools::{profile_tool, PROFILE_TOOL_NAME};

const EXTRACTION_SYSTEM_PROMPT: &str = "\
You derive a customer's investment profile from an advisory transcript. \
Call the record_investment_profile function with your result. Rules:\n\
- amount is the investment sum in whole euros; use 0 if the customer named no figure.\n\
- horizon: short_term (up to roughly 3 years), medium_term (3 to 7 years), \
long_term (more than 7 years).\n\
- risk: no_risk if the customer rules out losses, high_risk if they explicitly \
accept substantial losses for higher returns, medium_risk otherwise.\n\
- cost_acceptance: yes or no, but only when the customer took a stance on fees; \
omit the field otherwise.\n\
- sustainability: yes when sustainable investing matters to the customer, no otherwise.\n\
Example: 'I could put aside about 5000 euros for the next two years, losing money \
is out of the question, and it should be a green investment' becomes \
amount 5000, horizon short_term, risk no_risk, sustainability yes.\n\
Later clarifications override earlier answers. Never invent values.";

/// Extraction attempts per call. The transcript does not change between
/// attempts, so one retry against model noise is enough.
const EXTRACTION_ATTEMPTS: u32 = 2;

pub struct ProfileExtractor {
    llm: Arc<dyn LlmClient>,
}

impl ProfileExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Runs one extraction over the full transcript. Always single-shot over
    /// everything collected so far; clarifications extend the transcript and
    /// the next call re-reads all of it.
    pub async fn extract(
        &self,
        collected_answers: &str,
    ) -> Result<InvestmentProfile, ApplicationError> {
        let messages =
            [LlmMessage::system(EXTRACTION_SYSTEM_PROMPT), LlmMessage::user(collected_answers)];
        let tools = [profile_tool()];

        let mut last_failure = DomainError::MalformedExtraction("no attempt made".to_string());
        for attempt in 1..=EXTRACTION_ATTEMPTS {
            let reply = self.llm.chat(&messages, &tools).await.map_err(map_llm_error)?;

            match interpret_reply(reply) {
                Ok(profile) => return Ok(profile),
                Err(failure) => {
                    warn!(attempt, error = %failure, "extraction attempt rejected");
                    last_failure = failure;
                }
            }
        }

        Err(ApplicationError::from(last_failure))
    }
}

fn map_llm_error(error: LlmError) -> ApplicationError {
    match error {
        LlmError::Malformed(detail) => {
            ApplicationError::from(DomainError::MalformedExtraction(detail))
        }
        other => ApplicationError::ExternalService(other.to_string()),
    }
}

fn interpret_reply(reply: LlmReply) -> Result<InvestmentProfile, DomainError> {
    match reply {
        LlmReply::ToolCall { name, arguments } if name == PROFILE_TOOL_NAME => {
            parse_profile(&arguments)
        }
        LlmReply::ToolCall { name, .. } => {
            Err(DomainError::MalformedExtraction(format!("unexpected tool call `{name}`")))
        }
        // Some models answer with the JSON inline instead of calling the
        // tool; accept it when it parses strictly.
        LlmReply::Text(text) => parse_profile(&text),
    }
}

fn parse_profile(raw: &str) -> Result<InvestmentProfile, DomainError> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned)
        .map_err(|error| DomainError::MalformedExtraction(error.to_string()))
}

/// Tolerates a Markdown code fence around the JSON payload, with or without
/// a `json` language tag.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use advisor_core::domain::profile::{Horizon, Preference, RiskTolerance};
    use advisor_core::errors::{ApplicationError, DomainError};
    use advisor_core::messages;

    use crate::llm::{LlmClient, LlmError, LlmMessage, LlmReply, ToolSpec};
    use crate::tools::PROFILE_TOOL_NAME;

    use super::{strip_code_fences, ProfileExtractor};

    struct ScriptedLlm {
        replies: Mutex<Vec<Result<LlmReply, LlmError>>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<Result<LlmReply, LlmError>>) -> Arc<Self> {
            Arc::new(Self { replies: Mutex::new(replies) })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat(
            &self,
            _messages: &[LlmMessage],
            _tools: &[ToolSpec],
        ) -> Result<LlmReply, LlmError> {
            self.replies.lock().expect("lock").remove(0)
        }
    }

    fn tool_call(arguments: &str) -> Result<LlmReply, LlmError> {
        Ok(LlmReply::ToolCall {
            name: PROFILE_TOOL_NAME.to_string(),
            arguments: arguments.to_string(),
        })
    }

    #[tokio::test]
    async fn tool_call_arguments_become_a_profile() {
        let llm = ScriptedLlm::new(vec![tool_call(
            r#"{"amount":4000,"horizon":"short_term","risk":"no_risk","sustainability":"yes"}"#,
        )]);
        let extractor = ProfileExtractor::new(llm);

        let profile = extractor.extract("Question: ...\nAnswer: ...\n").await.expect("profile");
        assert_eq!(profile.amount, 4000);
        assert_eq!(profile.horizon, Horizon::ShortTerm);
        assert_eq!(profile.risk, RiskTolerance::NoRisk);
        assert_eq!(profile.sustainability, Preference::Yes);
    }

    #[tokio::test]
    async fn fenced_inline_json_is_accepted() {
        let llm = ScriptedLlm::new(vec![Ok(LlmReply::Text(
            "```json\n{\"horizon\":\"medium_term\",\"risk\":\"medium_risk\",\
             \"sustainability\":\"no\"}\n```"
                .to_string(),
        ))]);
        let extractor = ProfileExtractor::new(llm);

        let profile = extractor.extract("transcript").await.expect("profile");
        assert_eq!(profile.amount, 0);
        assert_eq!(profile.horizon, Horizon::MediumTerm);
    }

    #[tokio::test]
    async fn second_attempt_recovers_from_model_noise() {
        let llm = ScriptedLlm::new(vec![
            Ok(LlmReply::Text("I think the customer is cautious.".to_string())),
            tool_call(r#"{"horizon":"short_term","risk":"no_risk","sustainability":"no"}"#),
        ]);
        let extractor = ProfileExtractor::new(llm);

        assert!(extractor.extract("transcript").await.is_ok());
    }

    #[tokio::test]
    async fn persistent_noise_fails_as_malformed_extraction() {
        let llm = ScriptedLlm::new(vec![
            Ok(LlmReply::Text("no json here".to_string())),
            Ok(LlmReply::Text("still no json".to_string())),
        ]);
        let extractor = ProfileExtractor::new(llm);

        let error = extractor.extract("transcript").await.expect_err("failure");
        assert!(matches!(
            error,
            ApplicationError::Domain(DomainError::MalformedExtraction(_))
        ));
        assert_eq!(error.user_message(), messages::ADVISORY_FAILURE);
    }

    #[tokio::test]
    async fn out_of_vocabulary_values_are_not_repaired() {
        let llm = ScriptedLlm::new(vec![
            tool_call(r#"{"horizon":"forever","risk":"no_risk","sustainability":"no"}"#),
            tool_call(r#"{"horizon":"forever","risk":"no_risk","sustainability":"no"}"#),
        ]);
        let extractor = ProfileExtractor::new(llm);

        assert!(extractor.extract("transcript").await.is_err());
    }

    #[tokio::test]
    async fn transport_failures_surface_as_external_service_errors() {
        let llm =
            ScriptedLlm::new(vec![Err(LlmError::Transport("connection reset".to_string()))]);
        let extractor = ProfileExtractor::new(llm);

        let error = extractor.extract("transcript").await.expect_err("failure");
        assert!(matches!(error, ApplicationError::ExternalService(_)));
        assert_eq!(error.user_message(), messages::TRY_AGAIN_LATER);
    }

    #[test]
    fn code_fence_stripping_handles_the_common_shapes() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }
}
