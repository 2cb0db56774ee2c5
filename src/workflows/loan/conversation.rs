//! Pure conversational transitions: the field-collection funnel and the
//! intent branches. Nothing here touches a collaborator, so every reply and
//! state change is reproducible from the session alone.

use super::domain::{ChatStep, CollectField, DocumentType};
use super::gateway::{Intent, IntentResponse};
use super::parse;
use super::session::ConversationSession;

/// Suggested responses below this confidence are discarded in favor of the
/// step-aware fallback.
const SUGGESTION_CONFIDENCE_FLOOR: f32 = 0.6;

/// Result of feeding user input to the active collection pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldOutcome {
    /// Input accepted, pointer advanced, prompt for what comes next.
    Advanced(String),
    /// Input rejected; the same field stays armed and the reply re-prompts.
    Reprompted(String),
}

impl FieldOutcome {
    pub(crate) fn reply(&self) -> &str {
        match self {
            FieldOutcome::Advanced(reply) | FieldOutcome::Reprompted(reply) => reply,
        }
    }
}

/// Apply one user answer to the pending field. Rejections never advance the
/// pointer and never reach the intent classifier.
pub(crate) fn collect_field(
    session: &mut ConversationSession,
    field: CollectField,
    input: &str,
) -> FieldOutcome {
    match field {
        CollectField::Name => match parse::parse_name(input) {
            Some(name) => {
                let reply = format!(
                    "Nice to meet you, {name}. How much would you like to borrow? \
                     Please enter the loan amount in rupees."
                );
                session.details.name = Some(name);
                session.collecting = Some(CollectField::Amount);
                FieldOutcome::Advanced(reply)
            }
            None => FieldOutcome::Reprompted(
                "Please enter your full name (at least two characters, not just digits)."
                    .to_string(),
            ),
        },
        CollectField::Amount => match parse::parse_amount(input) {
            Some(amount) => {
                session.details.amount = Some(amount);
                session.collecting = Some(CollectField::Tenure);
                FieldOutcome::Advanced(format!(
                    "Noted, a loan of ₹{}. Over how many months would you like to repay? \
                     Enter a tenure between {} and {} months, for example 12, 24, 36 or 60.",
                    format_inr(amount),
                    parse::MIN_TENURE_MONTHS,
                    parse::MAX_TENURE_MONTHS
                ))
            }
            None => FieldOutcome::Reprompted(
                "I could not read that amount. Please enter the loan amount in numbers, \
                 for example 500000 or 5 lakh."
                    .to_string(),
            ),
        },
        CollectField::Tenure => match parse::parse_tenure(input) {
            Some(months) => {
                session.details.tenure_months = Some(months);
                session.collecting = Some(CollectField::Income);
                FieldOutcome::Advanced(format!(
                    "{months} months it is. What is your monthly income? \
                     This determines your eligibility and EMI."
                ))
            }
            None => FieldOutcome::Reprompted(format!(
                "Please enter a tenure between {} and {} months, for example 36 for a \
                 three-year loan.",
                parse::MIN_TENURE_MONTHS,
                parse::MAX_TENURE_MONTHS
            )),
        },
        CollectField::Income => match parse::parse_amount(input) {
            Some(income) => {
                session.details.monthly_income = Some(income);
                session.collecting = None;
                session.step = ChatStep::Documents;
                session.awaiting_document = Some(DocumentType::SalarySlip);
                FieldOutcome::Advanced(format!(
                    "Monthly income of ₹{} recorded. To verify your application I need to \
                     check your name, your monthly salary, and your credit score across two \
                     documents. Please upload your salary slip first.",
                    format_inr(income)
                ))
            }
            None => FieldOutcome::Reprompted(
                "Please enter a valid monthly income, for example 50000 or 50k.".to_string(),
            ),
        },
    }
}

/// Branch on a classified intent, mutating the session where the intent
/// demands it (starting or restarting an application) and producing the
/// assistant reply.
pub(crate) fn respond_to_intent(
    session: &mut ConversationSession,
    response: &IntentResponse,
) -> String {
    match response.intent {
        Intent::Greeting => greeting_reply(session),
        Intent::CheckStatus => status_reply(session),
        Intent::RejectionReason => rejection_reason_reply(session),
        Intent::ApplicationHistory => history_reply(session),
        Intent::ApplyLoan | Intent::ContinueApplication => {
            session.start_application();
            "Happy to help you with a personal loan. The process is quick: share a few \
             details, upload your salary slip and credit report, and you get a decision in \
             minutes. First, what is your full name as it appears on official documents?"
                .to_string()
        }
        Intent::LoanInfo => {
            if !response.suggested_response.is_empty() {
                response.suggested_response.clone()
            } else {
                "Our personal loans start at 10.5% p.a. for tenures of 12 to 60 months. \
                 Eligibility needs a credit score of at least 700 and an EMI within 50% of \
                 your monthly income. Would you like to apply?"
                    .to_string()
            }
        }
        Intent::DocumentQuery => document_query_reply(session),
        Intent::Help => help_reply(session),
        Intent::FormResponse => form_response_reply(session, response),
        Intent::Other => fallback_reply(session, response),
    }
}

/// Opening message for a fresh session.
pub(crate) fn opening_reply() -> String {
    "Hi, I'm your personal loan assistant. I can help you apply for a loan, check an \
     application's status, or answer loan questions. How can I help you today?"
        .to_string()
}

/// Retry prompt used whenever an external collaborator fails mid-turn.
pub(crate) fn retry_reply() -> String {
    "Sorry, something went wrong on my side. Please try that again in a moment.".to_string()
}

fn greeting_reply(session: &ConversationSession) -> String {
    if session.context.has_existing_application {
        let status = session
            .context
            .application_status
            .as_deref()
            .unwrap_or("pending");
        let amount = session
            .context
            .loan_amount
            .map(|value| format!(" for ₹{}", format_inr(value)))
            .unwrap_or_default();
        format!(
            "Hello again. I see you have a {status} loan application{amount}. Would you \
             like to check its status, hear more about it, or start a new application?"
        )
    } else {
        "Hello! I'm here to help with loan questions or to get a personal loan \
         application started. How can I help you today?"
            .to_string()
    }
}

fn status_reply(session: &ConversationSession) -> String {
    if !session.context.has_existing_application {
        return "I don't see any loan applications on your account yet. Would you like to \
                apply for a personal loan? It only takes a few minutes."
            .to_string();
    }

    let status = session
        .context
        .application_status
        .as_deref()
        .unwrap_or("pending");
    let amount = session
        .context
        .loan_amount
        .map(|value| format!(" for ₹{}", format_inr(value)))
        .unwrap_or_default();
    let tail = match status {
        "approved" => {
            "Congratulations, your loan has been approved. Your sanction letter should \
             already be with you."
        }
        "rejected" => {
            "If you'd like to know why, just ask \"why was my loan rejected?\". You can \
             also start a fresh application anytime."
        }
        _ => "We're reviewing your application and will let you know once there's an update.",
    };
    format!(
        "Your most recent loan application{amount} is currently {status}. {tail}"
    )
}

fn rejection_reason_reply(session: &ConversationSession) -> String {
    let context = &session.context;
    if context.has_existing_application && context.application_status.as_deref() == Some("rejected")
    {
        let reason = context
            .rejection_reason
            .as_deref()
            .unwrap_or("The specific reason was not recorded.");
        format!(
            "Your application wasn't approved. Reason: {reason} Our criteria need a \
             credit score of at least 700, an EMI within 50% of monthly income, a loan \
             amount within your eligible limit, and verifiable documents. Improving your \
             credit score or asking for a smaller amount both help. Say \"apply again\" \
             to start fresh."
        )
    } else if context.has_existing_application {
        let status = context.application_status.as_deref().unwrap_or("pending");
        format!(
            "Your application wasn't rejected - it's currently {status}. Is there \
             anything else I can help with?"
        )
    } else {
        "I don't see any rejected applications on your account. If you'd like to apply \
         for a loan, just say \"apply\" to get started."
            .to_string()
    }
}

fn history_reply(session: &ConversationSession) -> String {
    if !session.context.has_existing_application {
        return "You haven't applied for any loans with us yet. Would you like to start? \
                The process is quick."
            .to_string();
    }

    let status = session
        .context
        .application_status
        .as_deref()
        .unwrap_or("pending");
    let mut reply = format!("Your most recent application is {status}.");
    if let Some(amount) = session.context.loan_amount {
        reply.push_str(&format!(" Amount: ₹{}.", format_inr(amount)));
    }
    if let Some(score) = session.context.credit_score {
        reply.push_str(&format!(" Credit score on file: {score}."));
    }
    reply.push_str(" Would you like more details, or to start a new application?");
    reply
}

fn document_query_reply(session: &ConversationSession) -> String {
    if session.step == ChatStep::Documents {
        match session.awaiting_document {
            Some(doc) => format!(
                "I'm waiting for your {0}. Please upload it using the upload button; PDF \
                 and image formats are fine.",
                doc.display_name()
            ),
            None => "I'm waiting for your documents. Please upload them using the upload \
                     button."
                .to_string(),
        }
    } else {
        "For verification you'll need to upload your latest salary slip and your credit \
         report. They confirm your income and creditworthiness. Would you like to start \
         an application?"
            .to_string()
    }
}

fn help_reply(session: &ConversationSession) -> String {
    let mut reply = String::from(
        "Here's what I can do: start a loan application (say \"apply\"), check your \
         application status, explain a rejection, or answer questions about rates, EMI, \
         and eligibility.",
    );
    if session.context.has_existing_application {
        if let Some(status) = session.context.application_status.as_deref() {
            reply.push_str(&format!(" I can see you have a {status} application."));
        }
    }
    reply.push_str(" What would you like to do?");
    reply
}

fn form_response_reply(session: &ConversationSession, response: &IntentResponse) -> String {
    // The funnel re-prompts before the classifier ever runs, so this branch
    // only fires when the gateway labels a free-form message as form data.
    match session.collecting {
        Some(CollectField::Name) => {
            "Please enter your full name (at least two characters, not just digits).".to_string()
        }
        Some(CollectField::Amount) => {
            "I didn't catch that amount. Please enter the loan amount in numbers, for \
             example 500000 or 5 lakh."
                .to_string()
        }
        Some(CollectField::Tenure) => format!(
            "Please enter a tenure between {} and {} months, for example 36.",
            parse::MIN_TENURE_MONTHS,
            parse::MAX_TENURE_MONTHS
        ),
        Some(CollectField::Income) => {
            "Please enter a valid monthly income, for example 50000 or 50k.".to_string()
        }
        None => {
            if response.suggested_response.is_empty() {
                "I'm here to help. How can I assist you today?".to_string()
            } else {
                response.suggested_response.clone()
            }
        }
    }
}

fn fallback_reply(session: &ConversationSession, response: &IntentResponse) -> String {
    if !response.suggested_response.is_empty()
        && response.confidence > SUGGESTION_CONFIDENCE_FLOOR
    {
        return response.suggested_response.clone();
    }

    match session.step {
        ChatStep::Documents => match session.awaiting_document {
            Some(doc) => format!(
                "I'm waiting for your {}. Please upload it using the upload button.",
                doc.display_name()
            ),
            None => "I'm waiting for your documents. Please upload them using the upload \
                     button."
                .to_string(),
        },
        ChatStep::Review => {
            "Your application is being reviewed. Please wait a moment.".to_string()
        }
        ChatStep::Decision => {
            let status = session
                .context
                .application_status
                .as_deref()
                .unwrap_or("processed");
            format!(
                "Your previous application has been {status}. I can help you understand \
                 the result, start a new application, or answer any questions."
            )
        }
        ChatStep::Greeting | ChatStep::Details => {
            "I'm your loan assistant. I can help you apply for a personal loan, check \
             your application status, or answer questions about loans and eligibility."
                .to_string()
        }
    }
}

/// Indian-style digit grouping: last three digits, then pairs.
pub(crate) fn format_inr(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let head_bytes = head.as_bytes();
    let mut index = head_bytes.len();
    while index > 0 {
        let start = index.saturating_sub(2);
        groups.push(&head[start..index]);
        index = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}
