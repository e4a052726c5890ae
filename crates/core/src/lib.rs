//! Domain model of the conversational investment advisor.
//!
//! This crate holds everything the workflow needs that is independent of
//! external services: the investment profile and product metadata types, the
//! advisory dialogue state machine, session state, configuration, errors,
//! fixed user-facing messages, and the audit trail.

pub mod audit;
pub mod config;
pub mod dialogue;
pub mod domain;
pub mod errors;
pub mod messages;

pub use audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
pub use dialogue::{
    AdvisoryDialogue, DialogueAction, DialogueEngine, DialogueEvent, DialogueState,
    DialogueTransitionError, TransitionOutcome, ADVISORY_QUESTIONS,
};
pub use domain::product::{ProductChunk, ProductFilter, ProductId, ProductRecord};
pub use domain::profile::{Horizon, InvestmentProfile, Preference, RiskTolerance};
pub use domain::session::{Message, Role, SessionId, SessionState};
pub use errors::{ApplicationError, DomainError, InterfaceError};
