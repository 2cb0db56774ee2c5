use super::common::*;

use crate::workflows::loan::domain::ExtractionConfidence;
use crate::workflows::loan::verification::cross_check;

#[test]
fn matching_documents_pass() {
    let details = complete_details();
    let report = cross_check(
        &details,
        &salary_slip(Some("Asha Rao"), Some(40_000), ExtractionConfidence::High),
        &credit_report(Some("Asha Rao"), Some(750), ExtractionConfidence::High),
        policy_config().income_tolerance,
    );
    assert!(report.passed());
    assert!(report.findings().is_empty());
}

#[test]
fn name_containment_works_in_either_direction() {
    let details = complete_details();

    // Documents often carry only a partial name, or upper-case it.
    let report = cross_check(
        &details,
        &salary_slip(Some("ASHA RAO"), Some(40_000), ExtractionConfidence::High),
        &credit_report(Some("Rao"), Some(750), ExtractionConfidence::High),
        policy_config().income_tolerance,
    );
    assert!(report.passed());
}

#[test]
fn declared_name_mismatch_trips_the_gate() {
    let details = complete_details();
    let report = cross_check(
        &details,
        &salary_slip(Some("Bina Shah"), Some(40_000), ExtractionConfidence::High),
        &credit_report(Some("Asha Rao"), Some(750), ExtractionConfidence::High),
        policy_config().income_tolerance,
    );
    assert!(!report.passed());
    assert!(report.declared_name_conflict);
}

#[test]
fn documents_disagreeing_with_each_other_trip_the_gate() {
    let mut details = complete_details();
    details.name = None;

    let report = cross_check(
        &details,
        &salary_slip(Some("Bina Shah"), Some(40_000), ExtractionConfidence::High),
        &credit_report(Some("Asha Rao"), Some(750), ExtractionConfidence::High),
        policy_config().income_tolerance,
    );
    assert!(!report.passed());
    assert!(report.cross_document_name_conflict);
    assert!(!report.declared_name_conflict);
}

#[test]
fn missing_names_never_conflict() {
    let mut details = complete_details();
    details.name = None;

    let report = cross_check(
        &details,
        &salary_slip(None, Some(40_000), ExtractionConfidence::Medium),
        &credit_report(None, Some(750), ExtractionConfidence::Medium),
        policy_config().income_tolerance,
    );
    assert!(report.passed());
}

#[test]
fn income_band_is_inclusive_at_the_tolerance_edge() {
    let details = complete_details();

    // Declared 40,000 with 20% tolerance: 48,000 is the last passing value.
    let at_edge = cross_check(
        &details,
        &salary_slip(Some("Asha Rao"), Some(48_000), ExtractionConfidence::High),
        &credit_report(Some("Asha Rao"), Some(750), ExtractionConfidence::High),
        policy_config().income_tolerance,
    );
    assert!(at_edge.passed());

    let beyond = cross_check(
        &details,
        &salary_slip(Some("Asha Rao"), Some(48_001), ExtractionConfidence::High),
        &credit_report(Some("Asha Rao"), Some(750), ExtractionConfidence::High),
        policy_config().income_tolerance,
    );
    assert!(!beyond.passed());
    assert!(beyond.income_conflict);

    // The band is symmetric.
    let below = cross_check(
        &details,
        &salary_slip(Some("Asha Rao"), Some(31_999), ExtractionConfidence::High),
        &credit_report(Some("Asha Rao"), Some(750), ExtractionConfidence::High),
        policy_config().income_tolerance,
    );
    assert!(below.income_conflict);
}

#[test]
fn low_confidence_on_either_document_trips_the_gate() {
    let details = complete_details();

    let salary_low = cross_check(
        &details,
        &salary_slip(Some("Asha Rao"), Some(40_000), ExtractionConfidence::Low),
        &credit_report(Some("Asha Rao"), Some(750), ExtractionConfidence::High),
        policy_config().income_tolerance,
    );
    assert!(!salary_low.passed());
    assert!(salary_low.low_confidence);

    let credit_low = cross_check(
        &details,
        &salary_slip(Some("Asha Rao"), Some(40_000), ExtractionConfidence::High),
        &credit_report(Some("Asha Rao"), Some(750), ExtractionConfidence::Low),
        policy_config().income_tolerance,
    );
    assert!(!credit_low.passed());
    assert!(credit_low.low_confidence);
}

#[test]
fn unextracted_salary_skips_the_income_check() {
    let details = complete_details();
    let report = cross_check(
        &details,
        &salary_slip(Some("Asha Rao"), None, ExtractionConfidence::Medium),
        &credit_report(Some("Asha Rao"), Some(750), ExtractionConfidence::High),
        policy_config().income_tolerance,
    );
    assert!(!report.income_conflict);
    assert!(report.passed());
}
