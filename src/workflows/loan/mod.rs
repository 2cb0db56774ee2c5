//! Conversational loan application workflow.
//!
//! The funnel runs greeting → details → documents → review → decision. The
//! `engine` module holds the pure eligibility policy; `verification` gates
//! it behind the document cross-check; `service` orchestrates both over the
//! collaborator traits in `gateway` and `repository`.

pub(crate) mod conversation;
pub mod domain;
pub mod engine;
pub mod gateway;
pub mod parse;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;
pub mod verification;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationContext, ApplicationId, ApplicationSummary, ChatRole, ChatStep, CollectField,
    DocumentType, ExtractionConfidence, LoanDetails, ParsedDocument, SanctionLetter,
    TranscriptEntry, UploadedDocument,
};
pub use engine::{
    EligibilityEngine, EligibilityResult, EngineError, LoanDecision, PolicyConfig, PolicyReason,
};
pub use gateway::{
    ClassifierError, DocumentParser, Intent, IntentClassifier, IntentRequest, IntentResponse,
    KeywordClassifier, ParserError, PlainTextDocumentParser,
};
pub use repository::{
    ApplicationStatusView, ApplicationStore, ApplicationUpsert, ChatMessageRecord,
    InMemoryApplicationStore, InMemoryLetterDispatcher, LetterError, SanctionLetterDispatcher,
    StoreError,
};
pub use router::loan_router;
pub use service::{ChatServiceError, DocumentUpload, LoanChatService};
pub use session::{ConversationSession, SessionTurn};
pub use verification::{cross_check, VerificationReport, VERIFICATION_FAILURE_REASON};
