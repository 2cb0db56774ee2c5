use super::domain::{ExtractionConfidence, LoanDetails, UploadedDocument};

/// Fixed reason persisted when the gate trips. Deliberately distinct from
/// every credit-policy reason so the two rejection paths never blur.
pub const VERIFICATION_FAILURE_REASON: &str =
    "Document verification failed - low confidence or data mismatch detected";

/// Independent findings of the pre-engine cross-check. The gate trips on
/// any finding; the individual flags feed the customer-facing summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationReport {
    /// Declared name conflicts with a name extracted from either document.
    pub declared_name_conflict: bool,
    /// The two documents carry names that conflict with each other.
    pub cross_document_name_conflict: bool,
    /// Extracted salary falls outside the tolerated band around the
    /// declared income.
    pub income_conflict: bool,
    /// Either document came back with low extraction confidence.
    pub low_confidence: bool,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        !self.declared_name_conflict
            && !self.cross_document_name_conflict
            && !self.income_conflict
            && !self.low_confidence
    }

    /// Findings phrased for the verification summary message.
    pub fn findings(&self) -> Vec<&'static str> {
        let mut notes = Vec::new();
        if self.low_confidence {
            notes.push("low confidence in extracted document data");
        }
        if self.declared_name_conflict {
            notes.push("declared name does not match the uploaded documents");
        }
        if self.cross_document_name_conflict {
            notes.push("names on the salary slip and credit report do not match");
        }
        if self.income_conflict {
            notes.push("extracted income differs from the declared income");
        }
        notes
    }
}

/// Cross-check the two parsed documents against each other and against the
/// declared details. Every comparison treats a missing side as "no
/// conflict"; only the confidence tag and an actual mismatch can trip the
/// gate.
pub fn cross_check(
    details: &LoanDetails,
    salary_slip: &UploadedDocument,
    credit_report: &UploadedDocument,
    income_tolerance: f64,
) -> VerificationReport {
    let declared_name = details.name.as_deref();
    let salary_name = salary_slip.parsed.extracted_name.as_deref();
    let credit_name = credit_report.parsed.extracted_name.as_deref();

    let declared_name_conflict =
        !names_align(declared_name, salary_name) || !names_align(declared_name, credit_name);
    let cross_document_name_conflict = !names_align(salary_name, credit_name);

    let income_conflict = match (salary_slip.parsed.extracted_salary, details.monthly_income) {
        (Some(extracted), Some(declared)) => {
            let tolerance = declared as f64 * income_tolerance;
            (extracted as f64 - declared as f64).abs() > tolerance
        }
        _ => false,
    };

    let low_confidence = salary_slip.parsed.confidence == ExtractionConfidence::Low
        || credit_report.parsed.confidence == ExtractionConfidence::Low;

    VerificationReport {
        declared_name_conflict,
        cross_document_name_conflict,
        income_conflict,
        low_confidence,
    }
}

/// Case-insensitive substring containment in either direction; a missing
/// name on either side aligns by definition.
fn names_align(left: Option<&str>, right: Option<&str>) -> bool {
    match (left, right) {
        (Some(a), Some(b)) => {
            let a = a.to_lowercase();
            let b = b.to_lowercase();
            a.contains(&b) || b.contains(&a)
        }
        _ => true,
    }
}
