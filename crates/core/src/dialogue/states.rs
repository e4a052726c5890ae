use serde::{Deserialize, Serialize};

/// Phases of one advisory session.
///
/// `NoProductTerminal` and `QAOpen` are terminal state classes: once either
/// is reached, the session never returns to the question-asking phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueState {
    AskingQuestions,
    Extracting,
    Matching,
    Presenting,
    QAOpen,
    NoProductTerminal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueEvent {
    AnswerReceived,
    QuestionsExhausted,
    ProfileExtracted,
    ExtractionFailed,
    MatchFound,
    NoMatchFound,
    RecommendationDelivered,
    FollowUpReceived,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueAction {
    AskNextQuestion,
    RunExtraction,
    RunMatching,
    ComposeRecommendation,
    OfferSourceDocument,
    EmitNoMatchMessage,
    InviteFollowUpQuestions,
    AnswerFromProduct,
    RestateNoMatch,
    ReportAdvisoryFailure,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: DialogueState,
    pub to: DialogueState,
    pub event: DialogueEvent,
    pub actions: Vec<DialogueAction>,
}
