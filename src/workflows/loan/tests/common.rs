use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::loan::domain::{
    ApplicationContext, ApplicationId, DocumentType, ExtractionConfidence, LoanDetails,
    ParsedDocument, UploadedDocument,
};
use crate::workflows::loan::engine::{EligibilityEngine, PolicyConfig};
use crate::workflows::loan::gateway::{
    ClassifierError, DocumentParser, Intent, IntentClassifier, IntentRequest, IntentResponse,
    KeywordClassifier, ParserError, PlainTextDocumentParser,
};
use crate::workflows::loan::repository::{
    ApplicationStore, ApplicationUpsert, ChatMessageRecord, InMemoryApplicationStore,
    InMemoryLetterDispatcher, SanctionLetterDispatcher, StoreError,
};
use crate::workflows::loan::service::{DocumentUpload, LoanChatService};
use crate::workflows::loan::session::ConversationSession;

pub(super) fn policy_config() -> PolicyConfig {
    PolicyConfig::default()
}

pub(super) fn engine() -> EligibilityEngine {
    EligibilityEngine::new(policy_config())
}

pub(super) fn parsed(
    name: Option<&str>,
    salary: Option<u64>,
    score: Option<u16>,
    confidence: ExtractionConfidence,
) -> ParsedDocument {
    ParsedDocument {
        extracted_name: name.map(str::to_string),
        extracted_salary: salary,
        credit_score: score,
        confidence,
    }
}

pub(super) fn salary_slip(
    name: Option<&str>,
    salary: Option<u64>,
    confidence: ExtractionConfidence,
) -> UploadedDocument {
    UploadedDocument {
        id: "doc-salary".to_string(),
        document_type: DocumentType::SalarySlip,
        file_name: "salary-slip.pdf".to_string(),
        storage_key: "uploads/salary-slip.pdf".to_string(),
        parsed: parsed(name, salary, None, confidence),
    }
}

pub(super) fn credit_report(
    name: Option<&str>,
    score: Option<u16>,
    confidence: ExtractionConfidence,
) -> UploadedDocument {
    UploadedDocument {
        id: "doc-credit".to_string(),
        document_type: DocumentType::CreditReport,
        file_name: "credit-report.pdf".to_string(),
        storage_key: "uploads/credit-report.pdf".to_string(),
        parsed: parsed(name, None, score, confidence),
    }
}

pub(super) fn complete_details() -> LoanDetails {
    LoanDetails {
        name: Some("Asha Rao".to_string()),
        amount: Some(400_000),
        tenure_months: Some(24),
        monthly_income: Some(40_000),
    }
}

/// A session that already passed the details funnel and is waiting on its
/// first document.
pub(super) fn documents_stage_session() -> ConversationSession {
    let mut session = ConversationSession::new(ApplicationContext::default());
    session.start_application();
    session.details = complete_details();
    session.collecting = None;
    session.step = crate::workflows::loan::domain::ChatStep::Documents;
    session.awaiting_document = Some(DocumentType::SalarySlip);
    session
}

pub(super) fn upload(
    document_type: Option<DocumentType>,
    file_name: &str,
    content: &str,
) -> DocumentUpload {
    DocumentUpload {
        document_type,
        file_name: file_name.to_string(),
        storage_key: format!("uploads/{file_name}"),
        content: content.as_bytes().to_vec(),
    }
}

pub(super) fn intent_response(intent: Intent) -> IntentResponse {
    IntentResponse {
        intent,
        confidence: 0.9,
        suggested_response: String::new(),
        should_continue_flow: true,
    }
}

/// Replays a fixed sequence of intents, then falls back to `Other`.
pub(super) struct ScriptedClassifier {
    script: Mutex<VecDeque<Intent>>,
}

impl ScriptedClassifier {
    pub(super) fn with(intents: Vec<Intent>) -> Self {
        Self {
            script: Mutex::new(intents.into()),
        }
    }
}

impl IntentClassifier for ScriptedClassifier {
    fn classify(&self, _request: IntentRequest) -> Result<IntentResponse, ClassifierError> {
        let intent = self
            .script
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or(Intent::Other);
        Ok(intent_response(intent))
    }
}

pub(super) struct FailingClassifier;

impl IntentClassifier for FailingClassifier {
    fn classify(&self, _request: IntentRequest) -> Result<IntentResponse, ClassifierError> {
        Err(ClassifierError::Transport("gateway offline".to_string()))
    }
}

/// Proves the funnel never consults the classifier on a structured answer.
pub(super) struct PanickingClassifier;

impl IntentClassifier for PanickingClassifier {
    fn classify(&self, request: IntentRequest) -> Result<IntentResponse, ClassifierError> {
        panic!(
            "classifier invoked while collecting a field: {:?}",
            request.user_message
        );
    }
}

/// Returns canned extractions keyed by document type.
pub(super) struct StubParser {
    salary: ParsedDocument,
    credit: ParsedDocument,
}

impl StubParser {
    pub(super) fn new(salary: ParsedDocument, credit: ParsedDocument) -> Self {
        Self { salary, credit }
    }
}

impl DocumentParser for StubParser {
    fn parse(
        &self,
        document_type: DocumentType,
        _file_name: &str,
        _content: &[u8],
    ) -> Result<ParsedDocument, ParserError> {
        Ok(match document_type {
            DocumentType::SalarySlip => self.salary.clone(),
            DocumentType::CreditReport => self.credit.clone(),
        })
    }
}

pub(super) struct FailingParser;

impl DocumentParser for FailingParser {
    fn parse(
        &self,
        _document_type: DocumentType,
        _file_name: &str,
        _content: &[u8],
    ) -> Result<ParsedDocument, ParserError> {
        Err(ParserError::Transport("parser offline".to_string()))
    }
}

pub(super) struct UnavailableStore;

impl ApplicationStore for UnavailableStore {
    fn upsert(&self, _record: ApplicationUpsert) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<ApplicationUpsert>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn recent_applications(
        &self,
        _limit: usize,
    ) -> Result<Vec<crate::workflows::loan::domain::ApplicationSummary>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn record_message(&self, _message: ChatMessageRecord) -> Result<(), StoreError> {
        Ok(())
    }
}

pub(super) type DefaultService =
    LoanChatService<InMemoryApplicationStore, KeywordClassifier, PlainTextDocumentParser, InMemoryLetterDispatcher>;

pub(super) fn build_service() -> (
    Arc<DefaultService>,
    InMemoryApplicationStore,
    InMemoryLetterDispatcher,
) {
    let store = InMemoryApplicationStore::default();
    let letters = InMemoryLetterDispatcher::default();
    let service = Arc::new(LoanChatService::new(
        Arc::new(store.clone()),
        Arc::new(KeywordClassifier),
        Arc::new(PlainTextDocumentParser),
        Arc::new(letters.clone()),
        policy_config(),
    ));
    (service, store, letters)
}

pub(super) fn build_stubbed_service(
    intents: Vec<Intent>,
    salary: ParsedDocument,
    credit: ParsedDocument,
) -> (
    Arc<LoanChatService<InMemoryApplicationStore, ScriptedClassifier, StubParser, InMemoryLetterDispatcher>>,
    InMemoryApplicationStore,
    InMemoryLetterDispatcher,
) {
    let store = InMemoryApplicationStore::default();
    let letters = InMemoryLetterDispatcher::default();
    let service = Arc::new(LoanChatService::new(
        Arc::new(store.clone()),
        Arc::new(ScriptedClassifier::with(intents)),
        Arc::new(StubParser::new(salary, credit)),
        Arc::new(letters.clone()),
        policy_config(),
    ));
    (service, store, letters)
}

/// Run a sequence of user messages, threading the session through each turn.
pub(super) fn drive<S, C, P, L>(
    service: &LoanChatService<S, C, P, L>,
    session: ConversationSession,
    messages: &[&str],
) -> ConversationSession
where
    S: ApplicationStore + 'static,
    C: IntentClassifier + 'static,
    P: DocumentParser + 'static,
    L: SanctionLetterDispatcher + 'static,
{
    messages.iter().fold(session, |current, message| {
        service.handle_message(&current, message).session
    })
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
