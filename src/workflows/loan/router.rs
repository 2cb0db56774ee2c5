use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, DocumentType};
use super::gateway::{DocumentParser, IntentClassifier};
use super::repository::{ApplicationStore, SanctionLetterDispatcher};
use super::service::{DocumentUpload, LoanChatService};
use super::session::ConversationSession;

/// Router builder exposing the conversational loan endpoints. Sessions are
/// carried in the payloads, so the HTTP surface itself stays stateless.
pub fn loan_router<S, C, P, L>(service: Arc<LoanChatService<S, C, P, L>>) -> Router
where
    S: ApplicationStore + 'static,
    C: IntentClassifier + 'static,
    P: DocumentParser + 'static,
    L: SanctionLetterDispatcher + 'static,
{
    Router::new()
        .route("/api/v1/loan/sessions", post(open_session_handler::<S, C, P, L>))
        .route("/api/v1/loan/messages", post(message_handler::<S, C, P, L>))
        .route("/api/v1/loan/documents", post(document_handler::<S, C, P, L>))
        .route(
            "/api/v1/loan/applications/:application_id",
            get(status_handler::<S, C, P, L>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageRequest {
    session: ConversationSession,
    message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentRequest {
    session: ConversationSession,
    #[serde(default)]
    document_type: Option<DocumentType>,
    file_name: String,
    #[serde(default)]
    storage_key: Option<String>,
    content: String,
}

pub(crate) async fn open_session_handler<S, C, P, L>(
    State(service): State<Arc<LoanChatService<S, C, P, L>>>,
) -> Response
where
    S: ApplicationStore + 'static,
    C: IntentClassifier + 'static,
    P: DocumentParser + 'static,
    L: SanctionLetterDispatcher + 'static,
{
    let turn = service.open_session();
    (StatusCode::CREATED, axum::Json(turn)).into_response()
}

pub(crate) async fn message_handler<S, C, P, L>(
    State(service): State<Arc<LoanChatService<S, C, P, L>>>,
    axum::Json(request): axum::Json<MessageRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    C: IntentClassifier + 'static,
    P: DocumentParser + 'static,
    L: SanctionLetterDispatcher + 'static,
{
    let turn = service.handle_message(&request.session, &request.message);
    (StatusCode::OK, axum::Json(turn)).into_response()
}

pub(crate) async fn document_handler<S, C, P, L>(
    State(service): State<Arc<LoanChatService<S, C, P, L>>>,
    axum::Json(request): axum::Json<DocumentRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
    C: IntentClassifier + 'static,
    P: DocumentParser + 'static,
    L: SanctionLetterDispatcher + 'static,
{
    let upload = DocumentUpload {
        document_type: request.document_type,
        storage_key: request
            .storage_key
            .unwrap_or_else(|| format!("uploads/{}", request.file_name)),
        content: request.content.into_bytes(),
        file_name: request.file_name,
    };
    let turn = service.receive_document(&request.session, upload);
    (StatusCode::OK, axum::Json(turn)).into_response()
}

pub(crate) async fn status_handler<S, C, P, L>(
    State(service): State<Arc<LoanChatService<S, C, P, L>>>,
    Path(application_id): Path<String>,
) -> Response
where
    S: ApplicationStore + 'static,
    C: IntentClassifier + 'static,
    P: DocumentParser + 'static,
    L: SanctionLetterDispatcher + 'static,
{
    let id = ApplicationId(application_id);
    match service.application_status(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
