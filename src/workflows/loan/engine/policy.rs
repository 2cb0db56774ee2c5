use super::config::PolicyConfig;
use serde::{Deserialize, Serialize};

/// Final adjudication of an evaluated application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanDecision {
    Approved,
    Rejected,
}

impl LoanDecision {
    pub const fn label(self) -> &'static str {
        match self {
            LoanDecision::Approved => "approved",
            LoanDecision::Rejected => "rejected",
        }
    }
}

/// The fixed set of policy reasons an evaluation can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyReason {
    CreditScoreBelowMinimum,
    WithinPreApprovedLimit,
    EmiWithinIncomeCap,
    EmiExceedsIncomeCap,
    AboveMaximumEligible,
}

impl PolicyReason {
    /// Customer-facing justification. The wording is part of the policy
    /// contract: rejection notices and the application store both carry it
    /// verbatim.
    pub fn message(self, config: &PolicyConfig) -> String {
        match self {
            PolicyReason::CreditScoreBelowMinimum => format!(
                "Credit score is below the required minimum of {}.",
                config.minimum_credit_score
            ),
            PolicyReason::WithinPreApprovedLimit => {
                "Loan amount is within pre-approved limit.".to_string()
            }
            PolicyReason::EmiWithinIncomeCap => format!(
                "EMI is within {:.0}% of monthly income and credit score meets requirements.",
                config.emi_to_income_cap * 100.0
            ),
            PolicyReason::EmiExceedsIncomeCap => format!(
                "EMI exceeds {:.0}% of monthly income.",
                config.emi_to_income_cap * 100.0
            ),
            PolicyReason::AboveMaximumEligible => {
                "Loan amount exceeds maximum eligible amount.".to_string()
            }
        }
    }
}

/// Standard reducing-balance amortization. The EMI is a property of the
/// amounts alone and is computed exactly once per evaluation, whatever the
/// decision ends up being.
pub(crate) fn monthly_installment(loan_amount: f64, annual_rate: f64, tenure_months: u32) -> f64 {
    let monthly_rate = annual_rate / 12.0 / 100.0;
    let growth = (1.0 + monthly_rate).powi(tenure_months as i32);
    loan_amount * monthly_rate * growth / (growth - 1.0)
}

/// Ordered policy tree; the first matching rule wins.
pub(crate) fn decide(
    config: &PolicyConfig,
    credit_score: u16,
    loan_amount: f64,
    monthly_income: f64,
    emi: f64,
) -> (LoanDecision, PolicyReason) {
    if credit_score < config.minimum_credit_score {
        return (LoanDecision::Rejected, PolicyReason::CreditScoreBelowMinimum);
    }

    let pre_approved_limit = monthly_income * config.pre_approved_income_months;
    if loan_amount <= pre_approved_limit {
        return (LoanDecision::Approved, PolicyReason::WithinPreApprovedLimit);
    }

    if loan_amount <= config.stretch_limit_multiplier * pre_approved_limit {
        let emi_to_income = emi / monthly_income;
        if emi_to_income <= config.emi_to_income_cap {
            return (LoanDecision::Approved, PolicyReason::EmiWithinIncomeCap);
        }
        return (LoanDecision::Rejected, PolicyReason::EmiExceedsIncomeCap);
    }

    (LoanDecision::Rejected, PolicyReason::AboveMaximumEligible)
}
