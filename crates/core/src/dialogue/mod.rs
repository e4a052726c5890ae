pub mod engine;
pub mod states;

pub use engine::{AdvisoryDialogue, DialogueDefinition, DialogueEngine, DialogueTransitionError};
pub use states::{DialogueAction, DialogueEvent, DialogueState, TransitionOutcome};

/// The fixed ordered question list every advisory session walks through.
///
/// The first question only personalizes the recommendation; the remaining
/// five feed the extracted investment profile.
pub const ADVISORY_QUESTIONS: &[&str] = &[
    "What is your name?",
    "How much would you like to invest?",
    "For how long can you leave the money invested (short, medium, or long term)?",
    "How willing are you to accept losses in exchange for higher returns?",
    "Are you willing to accept fees in exchange for potentially higher returns?",
    "Is sustainable investing important to you?",
];
