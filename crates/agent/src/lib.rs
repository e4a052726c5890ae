//! The advisory agent: LLM access, profile extraction, product matching,
//! product-scoped Q&A, and the session controller tying them together.

pub mod extraction;
pub mod llm;
pub mod matcher;
pub mod openai;
pub mod qa;
pub mod runtime;
pub mod tools;

pub use extraction::ProfileExtractor;
pub use llm::{LlmClient, LlmError, LlmMessage, LlmReply, LlmRole, ToolSpec};
pub use matcher::{MatchOutcome, ProductMatcher};
pub use openai::OpenAiClient;
pub use qa::ProductQaResponder;
pub use runtime::AdvisorRuntime;
