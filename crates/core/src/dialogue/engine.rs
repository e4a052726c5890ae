use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::dialogue::states::{DialogueAction, DialogueEvent, DialogueState, TransitionOutcome};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DialogueTransitionError {
    #[error("event {event:?} is not valid in dialogue state {state:?}")]
    Unsupported { state: DialogueState, event: DialogueEvent },
}

pub trait DialogueDefinition {
    fn initial_state(&self) -> DialogueState;
    fn transition(
        &self,
        current: &DialogueState,
        event: &DialogueEvent,
    ) -> Result<TransitionOutcome, DialogueTransitionError>;
}

/// The fixed ask-extract-match-present-QA workflow.
#[derive(Clone, Debug, Default)]
pub struct AdvisoryDialogue;

impl DialogueDefinition for AdvisoryDialogue {
    fn initial_state(&self) -> DialogueState {
        DialogueState::AskingQuestions
    }

    fn transition(
        &self,
        current: &DialogueState,
        event: &DialogueEvent,
    ) -> Result<TransitionOutcome, DialogueTransitionError> {
        transition_advisory(current, event)
    }
}

fn transition_advisory(
    current: &DialogueState,
    event: &DialogueEvent,
) -> Result<TransitionOutcome, DialogueTransitionError> {
    use DialogueAction as A;
    use DialogueEvent as E;
    use DialogueState as S;

    let (to, actions) = match (current, event) {
        (S::AskingQuestions, E::AnswerReceived) => (S::AskingQuestions, vec![A::AskNextQuestion]),
        (S::AskingQuestions, E::QuestionsExhausted) => (S::Extracting, vec![A::RunExtraction]),
        (S::Extracting, E::ProfileExtracted) => (S::Matching, vec![A::RunMatching]),
        // A failed extraction keeps the session in place; the customer may
        // clarify and extraction re-runs over the full answer history.
        (S::Extracting, E::ExtractionFailed) => (S::Extracting, vec![A::ReportAdvisoryFailure]),
        (S::Matching, E::MatchFound) => {
            (S::Presenting, vec![A::ComposeRecommendation, A::OfferSourceDocument])
        }
        (S::Matching, E::NoMatchFound) => (S::NoProductTerminal, vec![A::EmitNoMatchMessage]),
        (S::Presenting, E::RecommendationDelivered) => {
            (S::QAOpen, vec![A::InviteFollowUpQuestions])
        }
        (S::QAOpen, E::FollowUpReceived) => (S::QAOpen, vec![A::AnswerFromProduct]),
        (S::NoProductTerminal, E::FollowUpReceived) => {
            (S::NoProductTerminal, vec![A::RestateNoMatch])
        }
        _ => {
            return Err(DialogueTransitionError::Unsupported { state: *current, event: *event });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: *event, actions })
}

pub struct DialogueEngine<D = AdvisoryDialogue> {
    definition: D,
}

impl Default for DialogueEngine<AdvisoryDialogue> {
    fn default() -> Self {
        Self::new(AdvisoryDialogue)
    }
}

impl<D> DialogueEngine<D>
where
    D: DialogueDefinition,
{
    pub fn new(definition: D) -> Self {
        Self { definition }
    }

    pub fn initial_state(&self) -> DialogueState {
        self.definition.initial_state()
    }

    pub fn apply(
        &self,
        current: &DialogueState,
        event: &DialogueEvent,
    ) -> Result<TransitionOutcome, DialogueTransitionError> {
        self.definition.transition(current, event)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &DialogueState,
        event: &DialogueEvent,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, DialogueTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit.session_id.clone(),
                        audit.correlation_id.clone(),
                        "dialogue.transition_applied",
                        AuditCategory::Dialogue,
                        audit.actor.clone(),
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", format!("{:?}", outcome.from))
                    .with_metadata("to", format!("{:?}", outcome.to))
                    .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit.session_id.clone(),
                        audit.correlation_id.clone(),
                        "dialogue.transition_rejected",
                        AuditCategory::Dialogue,
                        audit.actor.clone(),
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}
