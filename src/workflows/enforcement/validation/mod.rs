//! Compliance validation of tradeline records against the reporting schema.
//!
//! Validation is a pure function of the record and the evaluation date: it
//! never fails, never mutates, and reports everything it finds as typed
//! violations with a 0-100 compliance score.

mod rules;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::DisputeType;
use super::schema::{FieldId, Metro2Schema};
use super::tradeline::TradelineRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Points deducted from the compliance score per violation.
    pub const fn score_weight(self) -> u8 {
        match self {
            Self::Low => 5,
            Self::Medium => 10,
            Self::High => 15,
        }
    }
}

/// Closed set of violation classes the validator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    MissingRequiredField,
    FieldLengthExceeded,
    InvalidFieldFormat,
    FutureDateOpened,
    InvalidDateSequence,
    InvalidDelinquencyDate,
    InvalidLastPaymentDate,
    InvalidAccountStatus,
    InvalidPaymentRating,
    InconsistentStatusRating,
    InconsistentPastDue,
    InvalidPaymentHistoryCode,
    InconsistentPaymentHistory,
    InvalidEcoaCode,
}

impl ViolationType {
    pub const fn code(self) -> &'static str {
        match self {
            Self::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            Self::FieldLengthExceeded => "FIELD_LENGTH_EXCEEDED",
            Self::InvalidFieldFormat => "INVALID_FIELD_FORMAT",
            Self::FutureDateOpened => "FUTURE_DATE_OPENED",
            Self::InvalidDateSequence => "INVALID_DATE_SEQUENCE",
            Self::InvalidDelinquencyDate => "INVALID_DELINQUENCY_DATE",
            Self::InvalidLastPaymentDate => "INVALID_LAST_PAYMENT_DATE",
            Self::InvalidAccountStatus => "INVALID_ACCOUNT_STATUS",
            Self::InvalidPaymentRating => "INVALID_PAYMENT_RATING",
            Self::InconsistentStatusRating => "INCONSISTENT_STATUS_RATING",
            Self::InconsistentPastDue => "INCONSISTENT_PAST_DUE",
            Self::InvalidPaymentHistoryCode => "INVALID_PAYMENT_HISTORY_CODE",
            Self::InconsistentPaymentHistory => "INCONSISTENT_PAYMENT_HISTORY",
            Self::InvalidEcoaCode => "INVALID_ECOA_CODE",
        }
    }
}

/// Statutory authority cited for a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitedAuthority {
    FcraSection623A1,
    FcraSection623A2,
}

impl CitedAuthority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FcraSection623A1 => "FCRA 623(a)(1)",
            Self::FcraSection623A2 => "FCRA 623(a)(2)",
        }
    }
}

/// One reportable finding. Produced only by the validator, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub field: FieldId,
    pub violation_type: ViolationType,
    pub description: String,
    pub severity: Severity,
    pub cited_authority: CitedAuthority,
}

/// Result of one validation pass. The score is recomputed from scratch on
/// every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub violations: Vec<Violation>,
    pub compliance_score: u8,
}

impl ValidationResult {
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    fn severity_count(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|violation| violation.severity == severity)
            .count()
    }

    pub fn high_severity_count(&self) -> usize {
        self.severity_count(Severity::High)
    }

    /// Deterministic dispute priority derived from violation severities.
    pub fn priority_score(&self) -> u32 {
        self.violations
            .iter()
            .map(|violation| match violation.severity {
                Severity::High => 10u32,
                Severity::Medium => 5,
                Severity::Low => 2,
            })
            .sum()
    }

    /// Human-readable dispute reason lines, one per violation.
    pub fn dispute_reasons(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|violation| {
                format!(
                    "{} [{}]: {}",
                    violation.violation_type.code(),
                    violation.field.name(),
                    violation.description
                )
            })
            .collect()
    }

    /// Dispute reason class implied by the dominant violation kind.
    pub fn dispute_type(&self) -> DisputeType {
        let has_date_violation = self.violations.iter().any(|violation| {
            matches!(
                violation.violation_type,
                ViolationType::FutureDateOpened
                    | ViolationType::InvalidDateSequence
                    | ViolationType::InvalidDelinquencyDate
                    | ViolationType::InvalidLastPaymentDate
            )
        });
        if has_date_violation {
            return DisputeType::IncorrectDate;
        }

        let has_amount_violation = self.violations.iter().any(|violation| {
            matches!(
                violation.violation_type,
                ViolationType::InconsistentPastDue | ViolationType::InconsistentStatusRating
            )
        });
        if has_amount_violation {
            return DisputeType::IncorrectAmount;
        }

        DisputeType::Other
    }
}

/// Stateless validator applying the field registry and the cross-field
/// consistency rules to one record at a time.
#[derive(Debug, Clone)]
pub struct ComplianceValidator {
    schema: Metro2Schema,
}

impl ComplianceValidator {
    pub fn new(schema: Metro2Schema) -> Self {
        Self { schema }
    }

    pub fn standard() -> Self {
        Self::new(Metro2Schema::standard())
    }

    pub fn schema(&self) -> &Metro2Schema {
        &self.schema
    }

    /// Run every check pass against the record. `today` anchors the
    /// future-date rule so identical inputs always produce identical output.
    pub fn validate(&self, record: &TradelineRecord, today: NaiveDate) -> ValidationResult {
        let mut violations = Vec::new();
        violations.extend(rules::check_required_fields(&self.schema, record));
        violations.extend(rules::check_field_formats(&self.schema, record));
        violations.extend(rules::check_date_logic(record, today));
        violations.extend(rules::check_status_consistency(record));
        violations.extend(rules::check_payment_history(record));
        violations.extend(rules::check_ecoa(record));

        let compliance_score = compliance_score(&violations);

        ValidationResult {
            violations,
            compliance_score,
        }
    }
}

/// Start at 100, deduct per severity, floor at 0.
fn compliance_score(violations: &[Violation]) -> u8 {
    let deductions: u32 = violations
        .iter()
        .map(|violation| u32::from(violation.severity.score_weight()))
        .sum();
    100u32.saturating_sub(deductions) as u8
}
