use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicationId, ApplicationSummary, ChatRole, SanctionLetter};
use super::engine::LoanDecision;

/// Row written to the external application store. Upserts are idempotent by
/// id: settling the same application twice updates in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationUpsert {
    pub id: ApplicationId,
    pub loan_amount: u64,
    pub loan_tenure: u32,
    pub monthly_income: u64,
    pub credit_score: Option<u16>,
    /// Rounded EMI; absent when the application was rejected by document
    /// verification and the engine never ran.
    pub emi_amount: Option<u64>,
    pub status: LoanDecision,
    pub ai_decision: LoanDecision,
    pub ai_reason: String,
}

/// One persisted transcript line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    pub application_id: Option<ApplicationId>,
    pub role: ChatRole,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

/// Storage abstraction over the external application store.
pub trait ApplicationStore: Send + Sync {
    fn upsert(&self, record: ApplicationUpsert) -> Result<(), StoreError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationUpsert>, StoreError>;
    /// Most recent applications first.
    fn recent_applications(&self, limit: usize) -> Result<Vec<ApplicationSummary>, StoreError>;
    fn record_message(&self, message: ChatMessageRecord) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("application store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// Outbound hook handing approved applications to the sanction-letter
/// consumer. Purely downstream; nothing feeds back into the funnel.
pub trait SanctionLetterDispatcher: Send + Sync {
    fn dispatch(&self, letter: SanctionLetter) -> Result<(), LetterError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LetterError {
    #[error("letter transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized status view exposed over HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: String,
    pub ai_reason: Option<String>,
    pub emi_amount: Option<u64>,
    pub loan_amount: Option<u64>,
}

impl ApplicationStatusView {
    pub fn from_record(record: &ApplicationUpsert) -> Self {
        Self {
            application_id: record.id.clone(),
            status: record.status.label().to_string(),
            ai_reason: Some(record.ai_reason.clone()),
            emi_amount: record.emi_amount,
            loan_amount: Some(record.loan_amount),
        }
    }

    /// View served for ids the store has never seen.
    pub fn pending(id: ApplicationId) -> Self {
        Self {
            application_id: id,
            status: "pending".to_string(),
            ai_reason: None,
            emi_amount: None,
            loan_amount: None,
        }
    }
}

/// In-memory store used for local serving and tests.
#[derive(Default, Clone)]
pub struct InMemoryApplicationStore {
    records: Arc<Mutex<Vec<(ApplicationUpsert, DateTime<Utc>)>>>,
    messages: Arc<Mutex<Vec<ChatMessageRecord>>>,
    keys: Arc<Mutex<HashMap<ApplicationId, usize>>>,
}

impl InMemoryApplicationStore {
    pub fn messages(&self) -> Vec<ChatMessageRecord> {
        self.messages.lock().expect("message mutex poisoned").clone()
    }

    pub fn records(&self) -> Vec<ApplicationUpsert> {
        self.records
            .lock()
            .expect("record mutex poisoned")
            .iter()
            .map(|(record, _)| record.clone())
            .collect()
    }
}

impl ApplicationStore for InMemoryApplicationStore {
    fn upsert(&self, record: ApplicationUpsert) -> Result<(), StoreError> {
        let mut keys = self.keys.lock().expect("key mutex poisoned");
        let mut records = self.records.lock().expect("record mutex poisoned");
        match keys.get(&record.id) {
            Some(&index) => {
                let created_at = records[index].1;
                records[index] = (record, created_at);
            }
            None => {
                keys.insert(record.id.clone(), records.len());
                records.push((record, Utc::now()));
            }
        }
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationUpsert>, StoreError> {
        let keys = self.keys.lock().expect("key mutex poisoned");
        let records = self.records.lock().expect("record mutex poisoned");
        Ok(keys.get(id).map(|&index| records[index].0.clone()))
    }

    fn recent_applications(&self, limit: usize) -> Result<Vec<ApplicationSummary>, StoreError> {
        let records = self.records.lock().expect("record mutex poisoned");
        Ok(records
            .iter()
            .rev()
            .take(limit)
            .map(|(record, created_at)| ApplicationSummary {
                id: record.id.clone(),
                status: Some(record.status.label().to_string()),
                ai_reason: Some(record.ai_reason.clone()),
                loan_amount: record.loan_amount,
                loan_tenure: record.loan_tenure,
                credit_score: record.credit_score,
                emi_amount: record.emi_amount,
                created_at: Some(*created_at),
            })
            .collect())
    }

    fn record_message(&self, message: ChatMessageRecord) -> Result<(), StoreError> {
        self.messages
            .lock()
            .expect("message mutex poisoned")
            .push(message);
        Ok(())
    }
}

/// Collects dispatched letters so tests and local serving can observe the
/// downstream handoff.
#[derive(Default, Clone)]
pub struct InMemoryLetterDispatcher {
    letters: Arc<Mutex<Vec<SanctionLetter>>>,
}

impl InMemoryLetterDispatcher {
    pub fn letters(&self) -> Vec<SanctionLetter> {
        self.letters.lock().expect("letter mutex poisoned").clone()
    }
}

impl SanctionLetterDispatcher for InMemoryLetterDispatcher {
    fn dispatch(&self, letter: SanctionLetter) -> Result<(), LetterError> {
        self.letters
            .lock()
            .expect("letter mutex poisoned")
            .push(letter);
        Ok(())
    }
}
