//! Product-scoped question answering over the matched product's own
//! document chunks.

use std::sync::Arc;

use advisor_core::domain::product::{ProductChunk, ProductRecord};
use advisor_core::domain::session::{Message, Role};
use advisor_core::errors::ApplicationError;

use crate::llm::{LlmClient, LlmMessage, LlmReply};

/// Grounding contract for the Q&A phase. The model only knows what the
/// product sheet says; everything else is deferred, never invented.
const GROUNDING_INSTRUCTION: &str = "\
Answer only from the product information provided below. If the information \
does not cover the question, say so and offer to follow up through a human \
advisor later. Never invent figures, conditions, or guarantees, and never \
discuss products other than this one.";

/// Recent turns carried into the Q&A prompt. Older history adds cost
/// without improving grounded answers.
const HISTORY_WINDOW: usize = 12;

pub struct ProductQaResponder {
    llm: Arc<dyn LlmClient>,
}

impl ProductQaResponder {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn answer(
        &self,
        product: &ProductRecord,
        chunks: &[ProductChunk],
        history: &[Message],
        question: &str,
    ) -> Result<String, ApplicationError> {
        let mut messages = vec![LlmMessage::system(compose_system_prompt(product, chunks))];

        let start = history.len().saturating_sub(HISTORY_WINDOW);
        for message in &history[start..] {
            messages.push(match message.role {
                Role::Customer => LlmMessage::user(&message.content),
                Role::Assistant => LlmMessage::assistant(&message.content),
            });
        }
        messages.push(LlmMessage::user(question));

        let reply = self
            .llm
            .chat(&messages, &[])
            .await
            .map_err(|error| ApplicationError::ExternalService(error.to_string()))?;

        match reply {
            LlmReply::Text(answer) => Ok(answer),
            LlmReply::ToolCall { name, .. } => Err(ApplicationError::ExternalService(format!(
                "unexpected tool call `{name}` while answering a product question"
            ))),
        }
    }
}

fn compose_system_prompt(product: &ProductRecord, chunks: &[ProductChunk]) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are Thomas, a digital investment advisor at Musterbank, answering follow-up \
         questions about one recommended product.\n\n",
    );
    prompt.push_str(GROUNDING_INSTRUCTION);
    prompt.push_str("\n\nProduct: ");
    prompt.push_str(&product.name);
    prompt.push_str(&format!(" (product number {})\n\n", product.id));
    prompt.push_str("Product information:\n");
    for chunk in chunks {
        prompt.push_str("---\n");
        prompt.push_str(&chunk.content);
        prompt.push('\n');
    }
    prompt
}
