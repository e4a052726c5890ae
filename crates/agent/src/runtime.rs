//! The advisory session controller.
//!
//! Owns the fixed workflow: greet, walk the question list, extract the
//! profile, match a product, present it, then answer product-scoped
//! follow-up questions. Every state change goes through the dialogue engine
//! and is audited; every failure is translated to one of the fixed
//! user-facing messages before it reaches the customer.

use std::sync::Arc;

use tracing::error;
use uuid::Uuid;

use advisor_core::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use advisor_core::dialogue::{DialogueEngine, DialogueEvent, DialogueState, ADVISORY_QUESTIONS};
use advisor_core::domain::product::ProductRecord;
use advisor_core::domain::profile::{InvestmentProfile, Preference};
use advisor_core::domain::session::SessionState;
use advisor_core::errors::{ApplicationError, DomainError};
use advisor_core::messages;

use advisor_index::repositories::DocumentIndex;

use crate::extraction::ProfileExtractor;
use crate::llm::LlmClient;
use crate::matcher::{MatchOutcome, ProductMatcher};
use crate::qa::ProductQaResponder;

const RUNTIME_ACTOR: &str = "advisor-runtime";

pub struct AdvisorRuntime {
    dialogue: DialogueEngine,
    index: Arc<dyn DocumentIndex>,
    extractor: ProfileExtractor,
    matcher: ProductMatcher,
    qa: ProductQaResponder,
    audit: Arc<dyn AuditSink>,
}

impl AdvisorRuntime {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        index: Arc<dyn DocumentIndex>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            dialogue: DialogueEngine::default(),
            extractor: ProfileExtractor::new(llm.clone()),
            matcher: ProductMatcher::new(index.clone()),
            qa: ProductQaResponder::new(llm),
            index,
            audit,
        }
    }

    /// Starts a session: greeting plus the first question.
    pub fn open_session(&self) -> SessionState {
        let mut session = SessionState::new();
        session.push_assistant(messages::GREETING);
        session.push_assistant(ADVISORY_QUESTIONS[0]);

        self.audit.emit(AuditEvent::new(
            Some(session.id.clone()),
            Uuid::new_v4().to_string(),
            "session.opened",
            AuditCategory::Dialogue,
            RUNTIME_ACTOR,
            AuditOutcome::Success,
        ));
        session
    }

    /// Processes one customer message and returns the assistant replies, in
    /// order. Never surfaces internal errors: failures become one of the
    /// fixed advisory messages and the detail stays in the logs.
    pub async fn handle_message(&self, session: &mut SessionState, text: &str) -> Vec<String> {
        let context = AuditContext::new(
            Some(session.id.clone()),
            Uuid::new_v4().to_string(),
            RUNTIME_ACTOR,
        );

        let replies = match self.dispatch(session, text, &context).await {
            Ok(replies) => replies,
            Err(failure) => {
                error!(
                    session_id = %session.id,
                    correlation_id = %context.correlation_id,
                    error = %failure,
                    "message handling failed"
                );
                vec![failure.user_message().to_string()]
            }
        };

        for reply in &replies {
            session.push_assistant(reply.clone());
        }
        replies
    }

    async fn dispatch(
        &self,
        session: &mut SessionState,
        text: &str,
        context: &AuditContext,
    ) -> Result<Vec<String>, ApplicationError> {
        match session.phase {
            DialogueState::AskingQuestions => self.handle_answer(session, text, context).await,
            DialogueState::Extracting => {
                // The previous extraction failed; the message is a
                // clarification and extraction re-runs over everything.
                session.append_clarification(text);
                self.run_advisory_pipeline(session, context).await
            }
            DialogueState::QAOpen => self.handle_follow_up(session, text, context).await,
            DialogueState::NoProductTerminal => {
                self.transition(session, DialogueEvent::FollowUpReceived, context)?;
                session.push_customer(text);
                Ok(vec![messages::NO_FURTHER_ADVICE.to_string()])
            }
            DialogueState::Matching | DialogueState::Presenting => {
                Err(DomainError::InvariantViolation(format!(
                    "customer message arrived in transient state {:?}",
                    session.phase
                ))
                .into())
            }
        }
    }

    async fn handle_answer(
        &self,
        session: &mut SessionState,
        text: &str,
        context: &AuditContext,
    ) -> Result<Vec<String>, ApplicationError> {
        let question = ADVISORY_QUESTIONS.get(session.step()).copied().ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "step {} has no question while still asking",
                session.step()
            ))
        })?;
        session.record_answer(question, text)?;

        if session.step() < ADVISORY_QUESTIONS.len() {
            self.transition(session, DialogueEvent::AnswerReceived, context)?;
            Ok(vec![ADVISORY_QUESTIONS[session.step()].to_string()])
        } else {
            self.transition(session, DialogueEvent::QuestionsExhausted, context)?;
            self.run_advisory_pipeline(session, context).await
        }
    }

    /// Extraction, matching, and presentation in one pass. Runs whenever the
    /// question list is exhausted or a clarification arrives after a failed
    /// extraction.
    async fn run_advisory_pipeline(
        &self,
        session: &mut SessionState,
        context: &AuditContext,
    ) -> Result<Vec<String>, ApplicationError> {
        let profile = match self.extractor.extract(session.collected_answers()).await {
            Ok(profile) => profile,
            Err(failure) => {
                self.audit.emit(
                    self.event(context, "extraction.failed", AuditCategory::Extraction)
                        .with_metadata("error", failure.to_string()),
                );
                // The session stays extractable; the failure message invites
                // a clarification.
                self.transition(session, DialogueEvent::ExtractionFailed, context)?;
                return Ok(vec![failure.user_message().to_string()]);
            }
        };

        self.audit.emit(
            self.event(context, "extraction.completed", AuditCategory::Extraction)
                .with_metadata("amount", profile.amount.to_string())
                .with_metadata("horizon", profile.horizon.to_string())
                .with_metadata("risk", profile.risk.to_string())
                .with_metadata("sustainability", profile.sustainability.to_string()),
        );

        // Matching runs before the extraction transition is applied, so an
        // index outage leaves the session in a state the customer can still
        // drive forward.
        let outcome = match self.matcher.match_profile(&profile).await {
            Ok(outcome) => outcome,
            Err(failure) => {
                self.audit.emit(
                    self.event(context, "matching.failed", AuditCategory::Matching)
                        .with_metadata("error", failure.to_string()),
                );
                return Err(failure);
            }
        };
        self.transition(session, DialogueEvent::ProfileExtracted, context)?;

        match outcome {
            MatchOutcome::Matched(product) => {
                self.audit.emit(
                    self.event(context, "matching.completed", AuditCategory::Matching)
                        .with_metadata("product_id", product.id.to_string()),
                );
                self.transition(session, DialogueEvent::MatchFound, context)?;

                session.matched_product = Some(product.id);
                session.source_reference = Some(product.source_file.clone());
                session.no_match = Some(false);

                let recommendation = compose_recommendation(&product, &profile);
                self.transition(session, DialogueEvent::RecommendationDelivered, context)?;
                Ok(vec![recommendation, messages::FOLLOW_UP_INVITE.to_string()])
            }
            MatchOutcome::NoMatch => {
                self.audit.emit(
                    self.event(context, "matching.completed", AuditCategory::Matching)
                        .with_metadata("product_id", "none".to_string()),
                );
                self.transition(session, DialogueEvent::NoMatchFound, context)?;
                session.no_match = Some(true);
                Ok(vec![messages::NO_MATCH.to_string()])
            }
        }
    }

    async fn handle_follow_up(
        &self,
        session: &mut SessionState,
        text: &str,
        context: &AuditContext,
    ) -> Result<Vec<String>, ApplicationError> {
        self.transition(session, DialogueEvent::FollowUpReceived, context)?;
        // The question is part of the transcript whether or not an answer
        // can be produced.
        session.push_customer(text);

        let product_id = session.matched_product.ok_or_else(|| {
            DomainError::InvariantViolation("open qa without a matched product".to_string())
        })?;
        let product = self
            .index
            .find_by_id(product_id)
            .await
            .map_err(|failure| ApplicationError::Index(failure.to_string()))?
            .ok_or_else(|| {
                ApplicationError::Index(format!("matched product {product_id} missing from index"))
            })?;
        let chunks = self
            .index
            .chunks_for_product(product_id)
            .await
            .map_err(|failure| ApplicationError::Index(failure.to_string()))?;

        // The question itself goes to the responder separately; the history
        // stops just before it.
        let history = &session.messages[..session.messages.len() - 1];
        let answer = self.qa.answer(&product, &chunks, history, text).await?;
        self.audit.emit(
            self.event(context, "retrieval.answered", AuditCategory::Retrieval)
                .with_metadata("product_id", product_id.to_string())
                .with_metadata("chunks", chunks.len().to_string()),
        );

        Ok(vec![answer])
    }

    fn transition(
        &self,
        session: &mut SessionState,
        event: DialogueEvent,
        context: &AuditContext,
    ) -> Result<(), ApplicationError> {
        let outcome = self
            .dialogue
            .apply_with_audit(&session.phase, &event, self.audit.as_ref(), context)
            .map_err(DomainError::from)?;
        session.phase = outcome.to;
        Ok(())
    }

    fn event(
        &self,
        context: &AuditContext,
        event_type: &str,
        category: AuditCategory,
    ) -> AuditEvent {
        AuditEvent::new(
            context.session_id.clone(),
            context.correlation_id.clone(),
            event_type,
            category,
            context.actor.clone(),
            if event_type.ends_with(".failed") {
                AuditOutcome::Failed
            } else {
                AuditOutcome::Success
            },
        )
    }
}

fn compose_recommendation(product: &ProductRecord, profile: &InvestmentProfile) -> String {
    let mut text = format!(
        "Based on your answers, I recommend our product {} (product number {}). \
         It is designed for {} investment horizon and {}. The minimum investment \
         is {} euros.",
        product.name,
        product.id,
        horizon_label(product),
        risk_label(product),
        product.min_amount
    );

    match product.cost {
        Some(Preference::Yes) => {
            text.push_str(" The product carries fees, detailed in the information sheet.");
        }
        Some(Preference::No) => text.push_str(" The product is free of ongoing fees."),
        None => {}
    }
    if product.sustainable && profile.sustainability == Preference::Yes {
        text.push_str(" As sustainability matters to you: it is classified as a sustainable \
                       investment.");
    }
    text.push_str(" You can download the product information sheet for all details.");
    text
}

fn horizon_label(product: &ProductRecord) -> &'static str {
    use advisor_core::domain::profile::Horizon;
    match product.horizon {
        Horizon::ShortTerm => "a short-term",
        Horizon::MediumTerm => "a medium-term",
        Horizon::LongTerm => "a long-term",
    }
}

fn risk_label(product: &ProductRecord) -> &'static str {
    use advisor_core::domain::profile::RiskTolerance;
    match product.risk {
        RiskTolerance::NoRisk => "carries no risk of loss",
        RiskTolerance::MediumRisk => "a medium risk profile",
        RiskTolerance::HighRisk => "a high risk profile",
    }
}

#[cfg(test)]
mod tests {
    use advisor_core::domain::product::{ProductId, ProductRecord};
    use advisor_core::domain::profile::{
        Horizon, InvestmentProfile, Preference, RiskTolerance,
    };

    use super::compose_recommendation;

    fn profile(sustainability: Preference) -> InvestmentProfile {
        InvestmentProfile {
            amount: 4000,
            horizon: Horizon::ShortTerm,
            risk: RiskTolerance::NoRisk,
            cost_acceptance: None,
            sustainability,
        }
    }

    fn product(sustainable: bool) -> ProductRecord {
        ProductRecord {
            id: ProductId(10400553),
            name: "Green Savings Deposit".to_string(),
            min_amount: 500,
            horizon: Horizon::ShortTerm,
            risk: RiskTolerance::NoRisk,
            cost: Some(Preference::No),
            sustainable,
            source_file: "green_savings_deposit.pdf".to_string(),
        }
    }

    #[test]
    fn recommendation_names_product_and_key_facts() {
        let text = compose_recommendation(&product(true), &profile(Preference::Yes));
        assert!(text.contains("Green Savings Deposit"));
        assert!(text.contains("10400553"));
        assert!(text.contains("500 euros"));
        assert!(text.contains("sustainable investment"));
        assert!(text.contains("download the product information sheet"));
    }

    #[test]
    fn sustainability_is_only_mentioned_when_the_customer_cares() {
        let text = compose_recommendation(&product(true), &profile(Preference::No));
        assert!(!text.contains("sustainable investment"));
    }
}
