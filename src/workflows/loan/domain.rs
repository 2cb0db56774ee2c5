use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for loan applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Funnel position of a conversation, from first contact to a settled
/// decision. Transitions are driven by field completion and document
/// arrival, never by time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStep {
    Greeting,
    Details,
    Documents,
    Review,
    Decision,
}

impl ChatStep {
    pub const fn label(self) -> &'static str {
        match self {
            ChatStep::Greeting => "greeting",
            ChatStep::Details => "details",
            ChatStep::Documents => "documents",
            ChatStep::Review => "review",
            ChatStep::Decision => "decision",
        }
    }
}

/// Pointer over the ordered field-collection funnel. Only meaningful while
/// the session sits in [`ChatStep::Details`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectField {
    Name,
    Amount,
    Tenure,
    Income,
}

/// Mutable draft of an in-progress application. All four fields must be
/// populated before eligibility can be evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanDetails {
    pub name: Option<String>,
    pub amount: Option<u64>,
    pub tenure_months: Option<u32>,
    pub monthly_income: Option<u64>,
}

impl LoanDetails {
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.amount.is_some()
            && self.tenure_months.is_some()
            && self.monthly_income.is_some()
    }
}

/// The two document kinds the funnel verifies before a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    SalarySlip,
    #[serde(rename = "credit_score")]
    CreditReport,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::SalarySlip => "salary_slip",
            DocumentType::CreditReport => "credit_score",
        }
    }

    /// Human wording used in prompts.
    pub const fn display_name(self) -> &'static str {
        match self {
            DocumentType::SalarySlip => "salary slip",
            DocumentType::CreditReport => "credit report",
        }
    }

    pub const fn counterpart(self) -> DocumentType {
        match self {
            DocumentType::SalarySlip => DocumentType::CreditReport,
            DocumentType::CreditReport => DocumentType::SalarySlip,
        }
    }
}

/// Coarse reliability tag attached by the external parser. Used as a gating
/// signal, not a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionConfidence {
    High,
    Medium,
    Low,
}

/// Fields the external parser extracted from one uploaded document.
/// Salary slips carry `extracted_salary`, credit reports carry
/// `credit_score`; either may come back empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub extracted_name: Option<String>,
    pub extracted_salary: Option<u64>,
    pub credit_score: Option<u16>,
    pub confidence: ExtractionConfidence,
}

/// A successfully uploaded and parsed document. Never mutated; a re-upload
/// of the same type supersedes the earlier instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: String,
    pub document_type: DocumentType,
    pub file_name: String,
    pub storage_key: String,
    pub parsed: ParsedDocument,
}

/// One row of a user's application history, as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub status: Option<String>,
    pub ai_reason: Option<String>,
    pub loan_amount: u64,
    pub loan_tenure: u32,
    pub credit_score: Option<u16>,
    pub emi_amount: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Summary of the user's latest prior application(s). Only used to phrase
/// conversational responses; carries no obligations for the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationContext {
    pub has_existing_application: bool,
    pub application_status: Option<String>,
    pub rejection_reason: Option<String>,
    pub loan_amount: Option<u64>,
    pub credit_score: Option<u16>,
    pub application_id: Option<ApplicationId>,
    pub history: Vec<ApplicationSummary>,
}

/// Payload for the downstream sanction-letter consumer, built only when a
/// loan is approved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanctionLetter {
    pub application_id: ApplicationId,
    pub customer_name: String,
    pub loan_amount: u64,
    pub tenure_months: u32,
    pub interest_rate: f64,
    pub emi_amount: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<u64>,
}

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub const fn label(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message of the running conversation, kept on the session so the
/// classifier can see recent context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: ChatRole,
    pub content: String,
}
