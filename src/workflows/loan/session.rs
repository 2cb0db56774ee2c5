use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationContext, ApplicationId, ChatRole, ChatStep, CollectField, DocumentType,
    LoanDetails, TranscriptEntry, UploadedDocument,
};

/// How many transcript entries travel with each classifier request.
const CLASSIFIER_HISTORY_WINDOW: usize = 6;

/// Explicit, serializable state of one conversation. Every state-machine
/// transition takes a session in and hands an updated session plus outgoing
/// replies out, so the funnel can be unit tested without a UI harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub step: ChatStep,
    pub collecting: Option<CollectField>,
    pub awaiting_document: Option<DocumentType>,
    pub details: LoanDetails,
    pub documents: Vec<UploadedDocument>,
    pub application_id: Option<ApplicationId>,
    pub context: ApplicationContext,
    pub transcript: Vec<TranscriptEntry>,
}

impl ConversationSession {
    pub fn new(context: ApplicationContext) -> Self {
        Self {
            step: ChatStep::Greeting,
            collecting: None,
            awaiting_document: None,
            details: LoanDetails::default(),
            documents: Vec::new(),
            application_id: None,
            context,
            transcript: Vec::new(),
        }
    }

    /// Begin a fresh application: details wiped, documents dropped, funnel
    /// pointed at the name field. A decided application is never reopened.
    pub fn start_application(&mut self) {
        self.step = ChatStep::Details;
        self.collecting = Some(CollectField::Name);
        self.awaiting_document = None;
        self.details = LoanDetails::default();
        self.documents.clear();
        self.application_id = None;
    }

    pub fn document(&self, document_type: DocumentType) -> Option<&UploadedDocument> {
        self.documents
            .iter()
            .find(|doc| doc.document_type == document_type)
    }

    /// Attach a parsed document, superseding any earlier upload of the same
    /// type.
    pub fn attach_document(&mut self, document: UploadedDocument) {
        self.documents
            .retain(|existing| existing.document_type != document.document_type);
        self.documents.push(document);
    }

    pub fn has_both_documents(&self) -> bool {
        self.document(DocumentType::SalarySlip).is_some()
            && self.document(DocumentType::CreditReport).is_some()
    }

    pub fn push_user(&mut self, content: &str) {
        self.transcript.push(TranscriptEntry {
            role: ChatRole::User,
            content: content.to_string(),
        });
    }

    pub fn push_assistant(&mut self, content: &str) {
        self.transcript.push(TranscriptEntry {
            role: ChatRole::Assistant,
            content: content.to_string(),
        });
    }

    /// Window of recent messages forwarded to the intent classifier.
    pub fn recent_transcript(&self) -> &[TranscriptEntry] {
        let start = self
            .transcript
            .len()
            .saturating_sub(CLASSIFIER_HISTORY_WINDOW);
        &self.transcript[start..]
    }

    /// Fold a settled decision back into the conversational context so
    /// later small talk can reference it.
    pub fn record_decision(
        &mut self,
        application_id: ApplicationId,
        status: &str,
        rejection_reason: Option<String>,
        credit_score: Option<u16>,
    ) {
        self.step = ChatStep::Decision;
        self.application_id = Some(application_id.clone());
        self.context.has_existing_application = true;
        self.context.application_status = Some(status.to_string());
        self.context.rejection_reason = rejection_reason;
        self.context.loan_amount = self.details.amount;
        self.context.credit_score = credit_score;
        self.context.application_id = Some(application_id);
    }
}

/// Outcome of one transition: the successor session plus the assistant
/// replies produced along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTurn {
    pub session: ConversationSession,
    pub replies: Vec<String>,
}
