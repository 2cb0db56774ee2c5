//! Boundary contracts for the AI gateway: intent classification and
//! document-field extraction.
//!
//! The hosted LLM endpoints are external collaborators; the traits pin down
//! their request/response shapes and the in-process implementations here
//! give the service a deterministic stand-in for local serving and tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationContext, ChatStep, DocumentType, ExtractionConfidence, ParsedDocument,
    TranscriptEntry,
};
use super::parse;

/// Intents the gateway is expected to recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    ApplyLoan,
    ContinueApplication,
    CheckStatus,
    RejectionReason,
    ApplicationHistory,
    LoanInfo,
    DocumentQuery,
    Help,
    FormResponse,
    Other,
}

/// Everything the classifier sees about the current turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRequest {
    pub user_message: String,
    pub recent_history: Vec<TranscriptEntry>,
    pub context: ApplicationContext,
    pub current_step: ChatStep,
    pub is_collecting_field: bool,
    pub current_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResponse {
    pub intent: Intent,
    pub confidence: f32,
    pub suggested_response: String,
    pub should_continue_flow: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("intent gateway unavailable: {0}")]
    Transport(String),
    #[error("malformed intent response: {0}")]
    Malformed(String),
}

pub trait IntentClassifier: Send + Sync {
    fn classify(&self, request: IntentRequest) -> Result<IntentResponse, ClassifierError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("document gateway unavailable: {0}")]
    Transport(String),
    #[error("malformed parser response: {0}")]
    Malformed(String),
}

pub trait DocumentParser: Send + Sync {
    fn parse(
        &self,
        document_type: DocumentType,
        file_name: &str,
        content: &[u8],
    ) -> Result<ParsedDocument, ParserError>;
}

/// Deterministic keyword heuristics covering the recognized intents.
///
/// Stands in for the hosted classifier when the service runs without an AI
/// gateway; the precedence mirrors how specific each phrase is, with plain
/// greetings checked last so "hi, what's my status" lands on the status
/// branch.
#[derive(Debug, Default, Clone)]
pub struct KeywordClassifier;

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, request: IntentRequest) -> Result<IntentResponse, ClassifierError> {
        let message = request.user_message.to_lowercase();
        let contains_any =
            |needles: &[&str]| needles.iter().any(|needle| message.contains(needle));

        let intent = if contains_any(&["continue", "resume"]) {
            Intent::ContinueApplication
        } else if contains_any(&["apply", "new loan", "start application", "start over"]) {
            Intent::ApplyLoan
        } else if contains_any(&["status", "approved yet", "application update"]) {
            Intent::CheckStatus
        } else if contains_any(&["reject", "denied", "turned down"]) {
            Intent::RejectionReason
        } else if contains_any(&["history", "previous application", "past application"]) {
            Intent::ApplicationHistory
        } else if contains_any(&["document", "upload", "salary slip", "credit report"]) {
            Intent::DocumentQuery
        } else if contains_any(&["help", "what can you do"]) {
            Intent::Help
        } else if contains_any(&["interest", "rate", "emi", "eligib", "tenure"]) {
            Intent::LoanInfo
        } else if contains_any(&["hello", "hi", "hey", "good morning", "good evening"]) {
            Intent::Greeting
        } else if request.is_collecting_field {
            Intent::FormResponse
        } else {
            Intent::Other
        };

        let confidence = if intent == Intent::Other { 0.4 } else { 0.9 };

        Ok(IntentResponse {
            intent,
            confidence,
            suggested_response: String::new(),
            should_continue_flow: true,
        })
    }
}

/// Labelled-line extraction for plain-text uploads.
///
/// Looks for `Name:`, `Salary:`/`Net Pay:`, and `Credit Score:`/`Score:`
/// lines, honoring the document type the way the production parser does:
/// salary figures only from salary slips, scores only from credit reports.
/// Confidence reflects how much was found.
#[derive(Debug, Default, Clone)]
pub struct PlainTextDocumentParser;

impl DocumentParser for PlainTextDocumentParser {
    fn parse(
        &self,
        document_type: DocumentType,
        _file_name: &str,
        content: &[u8],
    ) -> Result<ParsedDocument, ParserError> {
        let text = std::str::from_utf8(content)
            .map_err(|_| ParserError::Malformed("document is not valid UTF-8 text".to_string()))?;

        let extracted_name = labelled_value(text, &["name"]).and_then(|v| parse::parse_name(&v));
        let extracted_salary = match document_type {
            DocumentType::SalarySlip => {
                labelled_value(text, &["salary", "net pay", "monthly income"])
                    .and_then(|v| parse::parse_amount(&v))
            }
            DocumentType::CreditReport => None,
        };
        let credit_score = match document_type {
            DocumentType::CreditReport => {
                labelled_value(text, &["credit score", "cibil score", "score"])
                    .and_then(|v| parse::parse_number(&v))
                    .and_then(|v| u16::try_from(v).ok())
            }
            DocumentType::SalarySlip => None,
        };

        let primary_field_found = match document_type {
            DocumentType::SalarySlip => extracted_salary.is_some(),
            DocumentType::CreditReport => credit_score.is_some(),
        };
        let confidence = if primary_field_found && extracted_name.is_some() {
            ExtractionConfidence::High
        } else if primary_field_found || extracted_name.is_some() {
            ExtractionConfidence::Medium
        } else {
            ExtractionConfidence::Low
        };

        Ok(ParsedDocument {
            extracted_name,
            extracted_salary,
            credit_score,
            confidence,
        })
    }
}

fn labelled_value(text: &str, labels: &[&str]) -> Option<String> {
    for line in text.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let label = label.trim().to_lowercase();
        if labels.iter().any(|candidate| label == *candidate) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}
