//! HTTP surface of the advisory workflow: session lifecycle and messages.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use advisor_agent::AdvisorRuntime;
use advisor_core::dialogue::DialogueState;
use advisor_core::domain::product::ProductId;
use advisor_core::domain::session::{Message, SessionId, SessionState};
use advisor_core::errors::InterfaceError;

/// Upper bound on concurrently held sessions. Sessions are in-process only;
/// once the bound is hit the oldest session is dropped to admit a new one.
const MAX_OPEN_SESSIONS: usize = 1024;

#[derive(Clone)]
pub struct ApiState {
    advisor: Arc<AdvisorRuntime>,
    sessions: Arc<RwLock<SessionStore>>,
}

impl ApiState {
    pub fn new(advisor: Arc<AdvisorRuntime>) -> Self {
        Self::with_capacity(advisor, MAX_OPEN_SESSIONS)
    }

    pub fn with_capacity(advisor: Arc<AdvisorRuntime>, capacity: usize) -> Self {
        Self { advisor, sessions: Arc::new(RwLock::new(SessionStore::new(capacity))) }
    }
}

struct SessionStore {
    capacity: usize,
    /// Session ids in admission order, oldest first.
    order: VecDeque<SessionId>,
    sessions: HashMap<SessionId, SessionState>,
}

impl SessionStore {
    fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), order: VecDeque::new(), sessions: HashMap::new() }
    }

    fn admit(&mut self, session: SessionState) {
        while self.sessions.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.sessions.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(session.id.clone());
        self.sessions.insert(session.id.clone(), session);
    }

    fn get(&self, id: &SessionId) -> Option<&SessionState> {
        self.sessions.get(id)
    }

    fn get_mut(&mut self, id: &SessionId) -> Option<&mut SessionState> {
        self.sessions.get_mut(id)
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/messages", post(post_message))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub phase: DialogueState,
    pub messages: Vec<Message>,
    pub matched_product: Option<ProductId>,
    pub no_match: Option<bool>,
}

impl SessionView {
    fn from_state(session: &SessionState) -> Self {
        Self {
            session_id: session.id.to_string(),
            phase: session.phase,
            messages: session.messages.clone(),
            matched_product: session.matched_product,
            no_match: session.no_match,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub replies: Vec<String>,
    pub phase: DialogueState,
    pub matched_product: Option<ProductId>,
    pub no_match: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

pub(crate) fn error_response(error: InterfaceError) -> (StatusCode, Json<ErrorBody>) {
    let status = match &error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let correlation_id = match &error {
        InterfaceError::BadRequest { correlation_id, .. }
        | InterfaceError::NotFound { correlation_id, .. }
        | InterfaceError::ServiceUnavailable { correlation_id, .. }
        | InterfaceError::Internal { correlation_id, .. } => correlation_id.clone(),
    };
    (status, Json(ErrorBody { error: error.user_message().to_string(), correlation_id }))
}

fn not_found(what: &str) -> (StatusCode, Json<ErrorBody>) {
    error_response(InterfaceError::NotFound {
        message: what.to_string(),
        correlation_id: Uuid::new_v4().to_string(),
    })
}

pub async fn create_session(State(state): State<ApiState>) -> (StatusCode, Json<SessionView>) {
    let session = state.advisor.open_session();
    let view = SessionView::from_state(&session);
    state.sessions.write().await.admit(session);
    (StatusCode::CREATED, Json(view))
}

pub async fn get_session(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, (StatusCode, Json<ErrorBody>)> {
    let store = state.sessions.read().await;
    let session = store.get(&SessionId(id)).ok_or_else(|| not_found("unknown session"))?;
    Ok(Json(SessionView::from_state(session)))
}

pub async fn post_message(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorBody>)> {
    let text = request.text.trim().to_string();
    if text.is_empty() {
        return Err(error_response(InterfaceError::BadRequest {
            message: "empty message".to_string(),
            correlation_id: Uuid::new_v4().to_string(),
        }));
    }

    // The write lock serializes messages; a session is a strictly ordered
    // dialogue, so concurrent messages have no meaningful interleaving.
    let mut store = state.sessions.write().await;
    let session = store.get_mut(&SessionId(id)).ok_or_else(|| not_found("unknown session"))?;

    let replies = state.advisor.handle_message(session, &text).await;
    Ok(Json(MessageResponse {
        replies,
        phase: session.phase,
        matched_product: session.matched_product,
        no_match: session.no_match,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::Json;

    use advisor_agent::llm::{LlmClient, LlmError, LlmMessage, LlmReply, ToolSpec};
    use advisor_agent::AdvisorRuntime;
    use advisor_core::audit::InMemoryAuditSink;
    use advisor_core::dialogue::{DialogueState, ADVISORY_QUESTIONS};
    use advisor_core::messages;
    use advisor_index::repositories::InMemoryDocumentIndex;

    use super::{create_session, get_session, post_message, ApiState, MessageRequest};

    /// The question phase never consults the model, so an unreachable model
    /// is enough for these handlers.
    struct UnreachableLlm;

    #[async_trait]
    impl LlmClient for UnreachableLlm {
        async fn chat(
            &self,
            _messages: &[LlmMessage],
            _tools: &[ToolSpec],
        ) -> Result<LlmReply, LlmError> {
            Err(LlmError::Transport("unreachable in this test".to_string()))
        }
    }

    fn state() -> ApiState {
        let advisor = Arc::new(AdvisorRuntime::new(
            Arc::new(UnreachableLlm),
            Arc::new(InMemoryDocumentIndex::new()),
            Arc::new(InMemoryAuditSink::default()),
        ));
        ApiState::new(advisor)
    }

    #[tokio::test]
    async fn created_sessions_open_with_greeting_and_first_question() {
        let state = state();
        let (status, Json(view)) = create_session(State(state.clone())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view.phase, DialogueState::AskingQuestions);
        assert_eq!(view.messages[0].content, messages::GREETING);
        assert_eq!(view.messages[1].content, ADVISORY_QUESTIONS[0]);

        let fetched = get_session(State(state), Path(view.session_id.clone()))
            .await
            .expect("session should exist");
        assert_eq!(fetched.0.session_id, view.session_id);
    }

    #[tokio::test]
    async fn answering_advances_to_the_next_question() {
        let state = state();
        let (_, Json(view)) = create_session(State(state.clone())).await;

        let response = post_message(
            State(state),
            Path(view.session_id),
            Json(MessageRequest { text: "Petra Muster".to_string() }),
        )
        .await
        .expect("message should be accepted");

        assert_eq!(response.0.replies, vec![ADVISORY_QUESTIONS[1].to_string()]);
        assert_eq!(response.0.phase, DialogueState::AskingQuestions);
    }

    #[tokio::test]
    async fn unknown_sessions_return_not_found() {
        let state = state();
        let error = get_session(State(state.clone()), Path("missing".to_string()))
            .await
            .expect_err("missing session");
        assert_eq!(error.0, StatusCode::NOT_FOUND);

        let error = post_message(
            State(state),
            Path("missing".to_string()),
            Json(MessageRequest { text: "hello".to_string() }),
        )
        .await
        .expect_err("missing session");
        assert_eq!(error.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oldest_session_is_evicted_once_the_store_is_full() {
        let advisor = Arc::new(AdvisorRuntime::new(
            Arc::new(UnreachableLlm),
            Arc::new(InMemoryDocumentIndex::new()),
            Arc::new(InMemoryAuditSink::default()),
        ));
        let state = ApiState::with_capacity(advisor, 2);

        let (_, Json(first)) = create_session(State(state.clone())).await;
        let (_, Json(second)) = create_session(State(state.clone())).await;
        let (_, Json(third)) = create_session(State(state.clone())).await;

        let error = get_session(State(state.clone()), Path(first.session_id))
            .await
            .expect_err("oldest session should be gone");
        assert_eq!(error.0, StatusCode::NOT_FOUND);

        for id in [second.session_id, third.session_id] {
            get_session(State(state.clone()), Path(id)).await.expect("recent session kept");
        }
    }

    #[tokio::test]
    async fn blank_messages_are_rejected() {
        let state = state();
        let (_, Json(view)) = create_session(State(state.clone())).await;

        let error = post_message(
            State(state),
            Path(view.session_id),
            Json(MessageRequest { text: "   ".to_string() }),
        )
        .await
        .expect_err("blank message");
        assert_eq!(error.0, StatusCode::BAD_REQUEST);
    }
}
