use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dialogue::states::DialogueState;
use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Assistant,
    Customer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn customer(content: impl Into<String>) -> Self {
        Self { role: Role::Customer, content: content.into() }
    }
}

/// Mutable state of one advisory session.
///
/// Owned and mutated by the dialogue controller; other components receive
/// only the fields they need. The step index never decreases, and once it
/// passes the question count the session stays in Q&A or the no-match
/// terminal mode for its remaining lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: SessionId,
    pub messages: Vec<Message>,
    step: usize,
    /// Concatenation of every question asked and answer given so far.
    /// Re-extraction always runs over this full text, never a suffix.
    collected_answers: String,
    pub phase: DialogueState,
    pub matched_product: Option<ProductId>,
    /// Source reference of the matched product, surfaced for delivery.
    pub source_reference: Option<String>,
    /// `None` until matching has been attempted at least once.
    pub no_match: Option<bool>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: SessionId::generate(),
            messages: Vec::new(),
            step: 0,
            collected_answers: String::new(),
            phase: DialogueState::AskingQuestions,
            matched_product: None,
            source_reference: None,
            no_match: None,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn collected_answers(&self) -> &str {
        &self.collected_answers
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn push_customer(&mut self, content: impl Into<String>) {
        self.messages.push(Message::customer(content));
    }

    /// Records one answer to the question currently being asked and advances
    /// the step index by exactly one.
    pub fn record_answer(&mut self, question: &str, answer: &str) -> Result<(), DomainError> {
        if !matches!(self.phase, DialogueState::AskingQuestions) {
            return Err(DomainError::InvariantViolation(format!(
                "answers can only be recorded while asking questions, not in {:?}",
                self.phase
            )));
        }

        self.messages.push(Message::customer(answer));
        self.collected_answers.push_str("Question: ");
        self.collected_answers.push_str(question);
        self.collected_answers.push_str("\nAnswer: ");
        self.collected_answers.push_str(answer);
        self.collected_answers.push('\n');
        self.step += 1;
        Ok(())
    }

    /// Appends clarification text supplied after a failed extraction. The
    /// step index is already past the question list and must not move.
    pub fn append_clarification(&mut self, text: &str) {
        self.messages.push(Message::customer(text));
        self.collected_answers.push_str("Clarification: ");
        self.collected_answers.push_str(text);
        self.collected_answers.push('\n');
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::dialogue::states::DialogueState;
    use crate::domain::session::SessionState;

    #[test]
    fn step_index_increases_by_one_per_answer() {
        let mut session = SessionState::new();
        let answers = ["Petra Muster", "4000 euros", "short term please"];

        for (index, answer) in answers.iter().enumerate() {
            assert_eq!(session.step(), index);
            session.record_answer("q", answer).expect("record answer");
            assert_eq!(session.step(), index + 1);
        }
    }

    #[test]
    fn collected_answers_keep_question_context() {
        let mut session = SessionState::new();
        session.record_answer("How much would you like to invest?", "about 4000").expect("record");

        let collected = session.collected_answers();
        assert!(collected.contains("Question: How much would you like to invest?"));
        assert!(collected.contains("Answer: about 4000"));
    }

    #[test]
    fn answers_are_rejected_outside_the_question_phase() {
        let mut session = SessionState::new();
        session.phase = DialogueState::QAOpen;
        assert!(session.record_answer("q", "a").is_err());
    }

    #[test]
    fn clarification_extends_answers_without_moving_the_step() {
        let mut session = SessionState::new();
        session.record_answer("q", "a").expect("record");
        session.phase = DialogueState::Extracting;

        session.append_clarification("medium risk is fine");
        assert_eq!(session.step(), 1);
        assert!(session.collected_answers().contains("Clarification: medium risk is fine"));
    }
}
