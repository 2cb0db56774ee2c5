use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use super::conversation::{self, format_inr};
use super::domain::{
    ApplicationContext, ApplicationId, ChatRole, ChatStep, CollectField, DocumentType,
    SanctionLetter, UploadedDocument,
};
use super::engine::{EligibilityEngine, EngineError, LoanDecision, PolicyConfig};
use super::gateway::{DocumentParser, IntentClassifier, IntentRequest};
use super::repository::{
    ApplicationStore, ApplicationUpsert, ChatMessageRecord, SanctionLetterDispatcher, StoreError,
};
use super::session::{ConversationSession, SessionTurn};
use super::verification::{self, VERIFICATION_FAILURE_REASON};

/// How much history seeds a fresh session's conversational context.
const HISTORY_LIMIT: usize = 10;

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DOCUMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("loan-{id:06}"))
}

fn next_document_id() -> String {
    let id = DOCUMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("doc-{id:06}")
}

/// An incoming upload, already moved through the opaque document store.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Explicit type if the caller knows it; otherwise the awaited type or
    /// a file-name heuristic decides.
    pub document_type: Option<DocumentType>,
    pub file_name: String,
    pub storage_key: String,
    pub content: Vec<u8>,
}

/// Failures that abort a settlement attempt. Absorbed at the call site and
/// surfaced to the user as a retry prompt; the session is rolled back.
#[derive(Debug, thiserror::Error)]
pub enum ChatServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Orchestrates the funnel from an empty session to a settled decision,
/// composing the intent classifier, document parser, application store, and
/// sanction-letter consumer behind their trait seams. Each transition takes
/// a session and returns the successor plus replies; external failures
/// leave the input session untouched.
pub struct LoanChatService<S, C, P, L> {
    store: Arc<S>,
    classifier: Arc<C>,
    parser: Arc<P>,
    letters: Arc<L>,
    engine: EligibilityEngine,
}

impl<S, C, P, L> LoanChatService<S, C, P, L>
where
    S: ApplicationStore + 'static,
    C: IntentClassifier + 'static,
    P: DocumentParser + 'static,
    L: SanctionLetterDispatcher + 'static,
{
    pub fn new(
        store: Arc<S>,
        classifier: Arc<C>,
        parser: Arc<P>,
        letters: Arc<L>,
        config: PolicyConfig,
    ) -> Self {
        Self {
            store,
            classifier,
            parser,
            letters,
            engine: EligibilityEngine::new(config),
        }
    }

    pub fn engine(&self) -> &EligibilityEngine {
        &self.engine
    }

    /// Open a fresh session, seeding the conversational context from the
    /// user's stored application history. History failures degrade to an
    /// empty context rather than blocking the conversation.
    pub fn open_session(&self) -> SessionTurn {
        let context = match self.store.recent_applications(HISTORY_LIMIT) {
            Ok(history) => {
                let latest = history.first();
                ApplicationContext {
                    has_existing_application: latest.is_some(),
                    application_status: latest
                        .map(|app| app.status.clone().unwrap_or_else(|| "pending".to_string())),
                    rejection_reason: latest.and_then(|app| app.ai_reason.clone()),
                    loan_amount: latest.map(|app| app.loan_amount),
                    credit_score: latest.and_then(|app| app.credit_score),
                    application_id: latest.map(|app| app.id.clone()),
                    history,
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to load application history");
                ApplicationContext::default()
            }
        };

        let mut session = ConversationSession::new(context);
        let greeting = conversation::opening_reply();
        session.push_assistant(&greeting);
        self.record(&session, ChatRole::Assistant, &greeting);

        SessionTurn {
            session,
            replies: vec![greeting],
        }
    }

    /// Process one user message: structured field parsing while a field is
    /// armed, intent dispatch otherwise.
    pub fn handle_message(&self, session: &ConversationSession, message: &str) -> SessionTurn {
        let mut next = session.clone();
        next.push_user(message);
        self.record(&next, ChatRole::User, message);

        let reply = match next.collecting {
            Some(field) => {
                // A re-prompt stays inside the funnel; unparseable answers
                // never reach the intent classifier.
                let outcome = conversation::collect_field(&mut next, field, message);
                outcome.reply().to_string()
            }
            None => {
                let request = IntentRequest {
                    user_message: message.to_string(),
                    recent_history: next.recent_transcript().to_vec(),
                    context: next.context.clone(),
                    current_step: next.step,
                    is_collecting_field: false,
                    current_date: Utc::now().date_naive(),
                };
                match self.classifier.classify(request) {
                    Ok(response) => conversation::respond_to_intent(&mut next, &response),
                    Err(err) => {
                        warn!(error = %err, "intent classification failed");
                        return SessionTurn {
                            session: session.clone(),
                            replies: vec![conversation::retry_reply()],
                        };
                    }
                }
            }
        };

        next.push_assistant(&reply);
        self.record(&next, ChatRole::Assistant, &reply);

        SessionTurn {
            session: next,
            replies: vec![reply],
        }
    }

    /// Process one uploaded document. The second arrival of the pair
    /// triggers verification and, if the gate passes, eligibility and
    /// persistence; arrival order is immaterial.
    pub fn receive_document(
        &self,
        session: &ConversationSession,
        upload: DocumentUpload,
    ) -> SessionTurn {
        let mut next = session.clone();
        let document_type = upload
            .document_type
            .or(next.awaiting_document)
            .unwrap_or_else(|| infer_document_type(&upload.file_name));

        let parsed = match self
            .parser
            .parse(document_type, &upload.file_name, &upload.content)
        {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, file = %upload.file_name, "document parsing failed");
                return SessionTurn {
                    session: session.clone(),
                    replies: vec![format!(
                        "There was an issue reading {}. Please upload it again.",
                        upload.file_name
                    )],
                };
            }
        };

        let document = UploadedDocument {
            id: next_document_id(),
            document_type,
            file_name: upload.file_name,
            storage_key: upload.storage_key,
            parsed,
        };

        let mut replies = vec![acknowledgement(&document)];
        next.attach_document(document);

        let pair = (
            next.document(DocumentType::SalarySlip).cloned(),
            next.document(DocumentType::CreditReport).cloned(),
        );
        match pair {
            (Some(salary_slip), Some(credit_report)) => {
                next.awaiting_document = None;
                next.step = ChatStep::Review;
                match self.settle(&mut next, &salary_slip, &credit_report) {
                    Ok(mut settled) => replies.append(&mut settled),
                    Err(err) => {
                        error!(error = %err, "failed to settle application");
                        return SessionTurn {
                            session: session.clone(),
                            replies: vec![conversation::retry_reply()],
                        };
                    }
                }
            }
            _ => {
                let missing = document_type.counterpart();
                next.awaiting_document = Some(missing);
                replies.push(format!(
                    "Now please upload your {}.",
                    missing.display_name()
                ));
            }
        }

        for reply in &replies {
            next.push_assistant(reply);
            self.record(&next, ChatRole::Assistant, reply);
        }

        SessionTurn {
            session: next,
            replies,
        }
    }

    /// Status view for the HTTP surface; unknown ids read as pending.
    pub fn application_status(
        &self,
        id: &ApplicationId,
    ) -> Result<super::repository::ApplicationStatusView, StoreError> {
        Ok(match self.store.fetch(id)? {
            Some(record) => super::repository::ApplicationStatusView::from_record(&record),
            None => super::repository::ApplicationStatusView::pending(id.clone()),
        })
    }

    /// Two-stage gate: verification first, the eligibility engine only when
    /// every cross-check passes. Verification rejections persist without an
    /// EMI and carry their own fixed reason, never a credit-policy one.
    fn settle(
        &self,
        next: &mut ConversationSession,
        salary_slip: &UploadedDocument,
        credit_report: &UploadedDocument,
    ) -> Result<Vec<String>, ChatServiceError> {
        let config = self.engine.config().clone();
        let report = verification::cross_check(
            &next.details,
            salary_slip,
            credit_report,
            config.income_tolerance,
        );
        let application_id = next
            .application_id
            .clone()
            .unwrap_or_else(next_application_id);

        let mut replies = vec![verification_summary(salary_slip, credit_report)];

        if !report.passed() {
            self.store.upsert(ApplicationUpsert {
                id: application_id.clone(),
                loan_amount: next.details.amount.unwrap_or(0),
                loan_tenure: next.details.tenure_months.unwrap_or(12),
                monthly_income: next.details.monthly_income.unwrap_or(0),
                credit_score: credit_report.parsed.credit_score,
                emi_amount: None,
                status: LoanDecision::Rejected,
                ai_decision: LoanDecision::Rejected,
                ai_reason: VERIFICATION_FAILURE_REASON.to_string(),
            })?;

            info!(
                application = %application_id.0,
                findings = ?report.findings(),
                "application rejected at document verification"
            );
            next.record_decision(
                application_id,
                LoanDecision::Rejected.label(),
                Some(VERIFICATION_FAILURE_REASON.to_string()),
                credit_report.parsed.credit_score,
            );

            let findings = report
                .findings()
                .iter()
                .map(|finding| format!("- {finding}"))
                .collect::<Vec<_>>()
                .join("\n");
            replies.push(format!(
                "I'm sorry, but your loan application has been rejected: your documents \
                 could not be verified.\n{findings}\nPlease make sure your documents are \
                 clear and official, and that your declared income matches your salary \
                 slip. Say \"apply again\" to start fresh."
            ));
            return Ok(replies);
        }

        let (Some(amount), Some(tenure)) = (next.details.amount, next.details.tenure_months)
        else {
            // Documents arrived before the funnel finished; steer back.
            next.step = ChatStep::Details;
            next.collecting = Some(first_missing_field(next));
            replies.push(
                "I'm missing some of your loan details. Let's pick up where we left off."
                    .to_string(),
            );
            return Ok(replies);
        };

        let verified_income = salary_slip
            .parsed
            .extracted_salary
            .or(next.details.monthly_income);
        let Some(verified_income) = verified_income else {
            next.step = ChatStep::Details;
            next.collecting = Some(CollectField::Income);
            replies.push(
                "I still need your monthly income before I can check eligibility. \
                 What is your monthly income?"
                    .to_string(),
            );
            return Ok(replies);
        };

        let credit_score = credit_report
            .parsed
            .credit_score
            .unwrap_or(config.fallback_credit_score);

        let result =
            self.engine
                .evaluate(credit_score, amount as f64, verified_income as f64, tenure)?;

        self.store.upsert(ApplicationUpsert {
            id: application_id.clone(),
            loan_amount: amount,
            loan_tenure: tenure,
            monthly_income: next.details.monthly_income.unwrap_or(verified_income),
            credit_score: Some(credit_score),
            emi_amount: Some(result.rounded_emi()),
            status: result.decision,
            ai_decision: result.decision,
            ai_reason: result.reason.clone(),
        })?;

        info!(
            application = %application_id.0,
            decision = result.decision.label(),
            reason = %result.reason,
            emi = result.rounded_emi(),
            "loan application settled"
        );
        next.record_decision(
            application_id.clone(),
            result.decision.label(),
            matches!(result.decision, LoanDecision::Rejected).then(|| result.reason.clone()),
            Some(credit_score),
        );

        replies.push("All details verified successfully. Checking your eligibility...".to_string());

        match result.decision {
            LoanDecision::Approved => {
                replies.push(format!(
                    "Congratulations! Your loan has been approved.\n\
                     Amount: ₹{}\nTenure: {} months\nInterest rate: {}% p.a.\n\
                     EMI: ₹{} per month\nYour sanction letter is being prepared.",
                    format_inr(amount),
                    tenure,
                    result.interest_rate,
                    format_inr(result.rounded_emi())
                ));

                let letter = SanctionLetter {
                    application_id,
                    customer_name: next
                        .details
                        .name
                        .clone()
                        .unwrap_or_else(|| "Valued Customer".to_string()),
                    loan_amount: amount,
                    tenure_months: tenure,
                    interest_rate: result.interest_rate,
                    emi_amount: result.rounded_emi(),
                    credit_score: Some(credit_score),
                    monthly_income: next.details.monthly_income,
                };
                if let Err(err) = self.letters.dispatch(letter) {
                    // Letter generation is downstream-only; the decision stands.
                    warn!(error = %err, "sanction letter dispatch failed");
                }
            }
            LoanDecision::Rejected => {
                replies.push(format!(
                    "Unfortunately, we're unable to approve your loan at this time.\n\
                     Reason: {}\nImproving your credit score or choosing a smaller amount \
                     both help. Say \"apply again\" to try with updated information.",
                    result.reason
                ));
            }
        }

        Ok(replies)
    }

    fn record(&self, session: &ConversationSession, role: ChatRole, content: &str) {
        let message = ChatMessageRecord {
            application_id: session.application_id.clone(),
            role,
            content: content.to_string(),
            sent_at: Utc::now(),
        };
        if let Err(err) = self.store.record_message(message) {
            warn!(error = %err, "failed to record chat message");
        }
    }
}

fn infer_document_type(file_name: &str) -> DocumentType {
    let lowered = file_name.to_lowercase();
    if lowered.contains("salary") || lowered.contains("payslip") || lowered.contains("slip") {
        DocumentType::SalarySlip
    } else {
        DocumentType::CreditReport
    }
}

fn acknowledgement(document: &UploadedDocument) -> String {
    let mut lines = vec![format!("{} received.", heading(document.document_type))];
    if let Some(name) = &document.parsed.extracted_name {
        lines.push(format!("Name: {name}"));
    }
    if let Some(salary) = document.parsed.extracted_salary {
        lines.push(format!("Monthly salary: ₹{}", format_inr(salary)));
    }
    if let Some(score) = document.parsed.credit_score {
        lines.push(format!("Credit score: {score}"));
    }
    lines.join("\n")
}

fn heading(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::SalarySlip => "Salary slip",
        DocumentType::CreditReport => "Credit report",
    }
}

fn verification_summary(salary_slip: &UploadedDocument, credit_report: &UploadedDocument) -> String {
    let mut lines = vec!["Document verification results:".to_string()];
    if let Some(name) = &salary_slip.parsed.extracted_name {
        lines.push(format!("Name (salary slip): {name}"));
    }
    if let Some(name) = &credit_report.parsed.extracted_name {
        lines.push(format!("Name (credit report): {name}"));
    }
    if let Some(salary) = salary_slip.parsed.extracted_salary {
        lines.push(format!("Extracted income: ₹{}/month", format_inr(salary)));
    }
    if let Some(score) = credit_report.parsed.credit_score {
        lines.push(format!("Credit score: {score}"));
    }
    lines.join("\n")
}

fn first_missing_field(session: &ConversationSession) -> CollectField {
    if session.details.name.is_none() {
        CollectField::Name
    } else if session.details.amount.is_none() {
        CollectField::Amount
    } else if session.details.tenure_months.is_none() {
        CollectField::Tenure
    } else {
        CollectField::Income
    }
}
