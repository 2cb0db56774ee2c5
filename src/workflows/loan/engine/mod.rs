mod config;
mod policy;

pub use config::PolicyConfig;
pub use policy::{LoanDecision, PolicyReason};

#[cfg(test)]
pub(crate) use policy::decide;

use serde::{Deserialize, Serialize};

use super::parse::MAX_TENURE_MONTHS;

/// Stateless evaluator applying the lending policy to verified inputs.
///
/// This is the only place a decision is made: no I/O, no side effects, fully
/// reproducible from its arguments.
pub struct EligibilityEngine {
    config: PolicyConfig,
}

impl EligibilityEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Decide approval and compute the EMI for one application.
    ///
    /// The EMI is always the standard amortized installment for the
    /// requested amount, tenure, and configured rate, whether or not the
    /// loan is approved. Non-positive inputs and tenures beyond the offered
    /// range fail fast instead of producing a degenerate installment.
    pub fn evaluate(
        &self,
        credit_score: u16,
        loan_amount: f64,
        monthly_income: f64,
        tenure_months: u32,
    ) -> Result<EligibilityResult, EngineError> {
        if !(loan_amount > 0.0) {
            return Err(EngineError::NonPositiveAmount(loan_amount));
        }
        if !(monthly_income > 0.0) {
            return Err(EngineError::NonPositiveIncome(monthly_income));
        }
        if tenure_months == 0 {
            return Err(EngineError::ZeroTenure);
        }
        // The amortization growth factor overflows to infinity for huge
        // tenures, so the installment stays finite only inside the range.
        if tenure_months > MAX_TENURE_MONTHS {
            return Err(EngineError::TenureTooLong(tenure_months));
        }

        let emi = policy::monthly_installment(
            loan_amount,
            self.config.annual_interest_rate,
            tenure_months,
        );
        let (decision, reason) = policy::decide(
            &self.config,
            credit_score,
            loan_amount,
            monthly_income,
            emi,
        );

        Ok(EligibilityResult {
            decision,
            reason: reason.message(&self.config),
            emi_amount: emi,
            interest_rate: self.config.annual_interest_rate,
        })
    }
}

/// Output of one evaluation. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub decision: LoanDecision,
    pub reason: String,
    pub emi_amount: f64,
    pub interest_rate: f64,
}

impl EligibilityResult {
    /// EMI rounded to the nearest currency unit, as persisted and shown to
    /// the customer.
    pub fn rounded_emi(&self) -> u64 {
        self.emi_amount.round() as u64
    }
}

/// Precondition violations for [`EligibilityEngine::evaluate`]. The funnel
/// only admits positive values, so these indicate a caller bug rather than
/// user error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("loan amount must be positive, got {0}")]
    NonPositiveAmount(f64),
    #[error("monthly income must be positive, got {0}")]
    NonPositiveIncome(f64),
    #[error("tenure must be at least one month")]
    ZeroTenure,
    #[error("tenure must be at most {max} months, got {0}", max = MAX_TENURE_MONTHS)]
    TenureTooLong(u32),
}
