use serde::{Deserialize, Serialize};

/// Lending policy knobs shared by the eligibility engine and the document
/// verification step. The defaults reproduce the production policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Flat annual interest rate (percent) used for EMI amortization.
    pub annual_interest_rate: f64,
    /// Applications below this credit score are rejected outright.
    pub minimum_credit_score: u16,
    /// Months of income that define the pre-approved limit.
    pub pre_approved_income_months: f64,
    /// Multiple of the pre-approved limit beyond which no loan is offered.
    pub stretch_limit_multiplier: f64,
    /// Maximum tolerated EMI-to-income ratio inside the stretch band.
    pub emi_to_income_cap: f64,
    /// Credit score assumed when the credit report carries no score.
    pub fallback_credit_score: u16,
    /// Tolerated relative gap between declared and extracted income.
    pub income_tolerance: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            annual_interest_rate: 10.5,
            minimum_credit_score: 700,
            pre_approved_income_months: 12.0,
            stretch_limit_multiplier: 2.0,
            emi_to_income_cap: 0.5,
            fallback_credit_score: 720,
            income_tolerance: 0.2,
        }
    }
}
