use thiserror::Error;

use crate::dialogue::engine::DialogueTransitionError;
use crate::messages;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    DialogueTransition(#[from] DialogueTransitionError),
    #[error("extraction returned out-of-vocabulary value for `{field}`: `{value}`")]
    OutOfVocabulary { field: &'static str, value: String },
    #[error("malformed extraction: {0}")]
    MalformedExtraction(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// LLM or document index unreachable or erroring after retries.
    #[error("external service failure: {0}")]
    ExternalService(String),
    #[error("document index failure: {0}")]
    Index(String),
    /// The matched product's source reference does not resolve to a readable
    /// file. Non-fatal: the recommendation itself was already delivered.
    #[error("missing source document: {0}")]
    MissingSourceDocument(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Maps internal failures onto the small fixed set of user-facing
    /// messages. Internal detail never reaches the customer.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(
                DomainError::MalformedExtraction(_) | DomainError::OutOfVocabulary { .. },
            ) => messages::ADVISORY_FAILURE,
            Self::Domain(_) => messages::TRY_AGAIN_LATER,
            Self::ExternalService(_) | Self::Index(_) => messages::TRY_AGAIN_LATER,
            Self::MissingSourceDocument(_) => messages::DOWNLOAD_UNAVAILABLE,
            Self::Configuration(_) => messages::TRY_AGAIN_LATER,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The requested resource does not exist.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(_) => Self::BadRequest {
                message: "domain validation failed".to_owned(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::MissingSourceDocument(message) => {
                Self::NotFound { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::ExternalService(message) | ApplicationError::Index(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
