use super::common::*;

use crate::workflows::loan::engine::{decide, EngineError, LoanDecision, PolicyReason};
use crate::workflows::loan::parse::MAX_TENURE_MONTHS;

#[test]
fn evaluation_is_deterministic() {
    let engine = engine();
    let first = engine.evaluate(750, 400_000.0, 40_000.0, 24).expect("valid inputs");
    let second = engine.evaluate(750, 400_000.0, 40_000.0, 24).expect("valid inputs");
    assert_eq!(first, second);
}

#[test]
fn emi_is_computed_whatever_the_decision() {
    let engine = engine();
    let approved = engine.evaluate(750, 400_000.0, 40_000.0, 24).expect("valid inputs");
    let rejected = engine.evaluate(650, 400_000.0, 40_000.0, 24).expect("valid inputs");

    assert_eq!(approved.decision, LoanDecision::Approved);
    assert_eq!(rejected.decision, LoanDecision::Rejected);
    assert_eq!(approved.emi_amount, rejected.emi_amount);
}

#[test]
fn emi_matches_reducing_balance_amortization() {
    let engine = engine();
    let result = engine.evaluate(750, 400_000.0, 40_000.0, 24).expect("valid inputs");

    // 400,000 over 24 months at 10.5% p.a.
    assert!((result.emi_amount - 18_550.42).abs() < 0.01);
    assert_eq!(result.rounded_emi(), 18_550);
    assert_eq!(result.interest_rate, 10.5);
}

#[test]
fn credit_score_floor_rejects_before_any_other_rule() {
    let engine = engine();
    for score in [300, 650, 699] {
        let result = engine.evaluate(score, 100_000.0, 80_000.0, 12).expect("valid inputs");
        assert_eq!(result.decision, LoanDecision::Rejected);
        assert_eq!(
            result.reason,
            "Credit score is below the required minimum of 700."
        );
    }
}

#[test]
fn credit_score_exactly_at_minimum_passes_the_floor() {
    let engine = engine();
    let result = engine.evaluate(700, 300_000.0, 50_000.0, 24).expect("valid inputs");
    assert_eq!(result.decision, LoanDecision::Approved);
    assert_eq!(result.reason, "Loan amount is within pre-approved limit.");
}

#[test]
fn pre_approved_limit_is_inclusive() {
    let engine = engine();

    // 12 x 50,000 = 600,000 is inside the pre-approved band.
    let at_limit = engine.evaluate(750, 600_000.0, 50_000.0, 24).expect("valid inputs");
    assert_eq!(at_limit.decision, LoanDecision::Approved);
    assert_eq!(at_limit.reason, "Loan amount is within pre-approved limit.");

    // One rupee over falls through to the EMI ratio, which fails at this
    // tenure (EMI 27,826 against 50,000 income).
    let over_limit = engine.evaluate(750, 600_001.0, 50_000.0, 24).expect("valid inputs");
    assert_eq!(over_limit.decision, LoanDecision::Rejected);
    assert_eq!(over_limit.reason, "EMI exceeds 50% of monthly income.");
}

#[test]
fn stretch_band_decides_on_emi_to_income_ratio() {
    let engine = engine();

    // 700,000 over 36 months: EMI 22,752, ratio 0.455.
    let affordable = engine.evaluate(720, 700_000.0, 50_000.0, 36).expect("valid inputs");
    assert_eq!(affordable.decision, LoanDecision::Approved);
    assert_eq!(
        affordable.reason,
        "EMI is within 50% of monthly income and credit score meets requirements."
    );

    // 800,000 over 36 months: EMI 26,002, ratio 0.52.
    let stretched = engine.evaluate(720, 800_000.0, 50_000.0, 36).expect("valid inputs");
    assert_eq!(stretched.decision, LoanDecision::Rejected);
    assert_eq!(stretched.reason, "EMI exceeds 50% of monthly income.");
}

#[test]
fn amounts_beyond_twice_the_limit_are_rejected_outright() {
    let engine = engine();

    // 2 x 12 x 50,000 = 1,200,000 stays inside the stretch band.
    let in_band = engine.evaluate(800, 1_200_000.0, 50_000.0, 60).expect("valid inputs");
    assert_eq!(in_band.decision, LoanDecision::Rejected);
    assert_eq!(in_band.reason, "EMI exceeds 50% of monthly income.");

    let beyond = engine.evaluate(800, 1_200_001.0, 50_000.0, 60).expect("valid inputs");
    assert_eq!(beyond.decision, LoanDecision::Rejected);
    assert_eq!(beyond.reason, "Loan amount exceeds maximum eligible amount.");
}

#[test]
fn emi_ratio_cap_is_inclusive_at_exactly_half_income() {
    let config = policy_config();

    // 700,000 against 50,000 income sits in the stretch band, so the
    // decision hangs entirely on the ratio.
    let half_income = 25_000.0;
    let (decision, reason) = decide(&config, 720, 700_000.0, 50_000.0, half_income);
    assert_eq!(decision, LoanDecision::Approved);
    assert_eq!(reason, PolicyReason::EmiWithinIncomeCap);

    let (decision, reason) = decide(&config, 720, 700_000.0, 50_000.0, half_income + 1e-6);
    assert_eq!(decision, LoanDecision::Rejected);
    assert_eq!(reason, PolicyReason::EmiExceedsIncomeCap);
}

#[test]
fn tenures_beyond_the_offered_range_fail_fast() {
    let engine = engine();

    // Past the amortization's numeric range the growth factor would
    // overflow and the installment would come back non-finite.
    assert!(matches!(
        engine.evaluate(750, 400_000.0, 40_000.0, 100_000),
        Err(EngineError::TenureTooLong(100_000))
    ));
    assert!(matches!(
        engine.evaluate(750, 400_000.0, 40_000.0, 3_000_000_000),
        Err(EngineError::TenureTooLong(_))
    ));

    let longest = engine
        .evaluate(750, 400_000.0, 40_000.0, MAX_TENURE_MONTHS)
        .expect("maximum tenure evaluates");
    assert!(longest.emi_amount.is_finite());
    assert!(longest.emi_amount > 0.0);
}

#[test]
fn non_positive_inputs_fail_fast() {
    let engine = engine();

    assert!(matches!(
        engine.evaluate(750, 0.0, 40_000.0, 24),
        Err(EngineError::NonPositiveAmount(_))
    ));
    assert!(matches!(
        engine.evaluate(750, 400_000.0, -1.0, 24),
        Err(EngineError::NonPositiveIncome(_))
    ));
    assert!(matches!(
        engine.evaluate(750, 400_000.0, 40_000.0, 0),
        Err(EngineError::ZeroTenure)
    ));
}
