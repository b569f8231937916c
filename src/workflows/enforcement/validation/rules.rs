use chrono::{NaiveDate, NaiveDateTime};

use super::super::schema::{
    self, FieldId, FieldType, Metro2Schema, CHARGE_OFF_RATING, CHARGE_OFF_STATUS,
    PAID_AS_AGREED_STATUS, PAYMENT_HISTORY_CODES,
};
use super::super::tradeline::TradelineRecord;
use super::{CitedAuthority, Severity, Violation, ViolationType};

const DATE_FORMATS: &[&str] = &["%m%d%Y", "%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y"];
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a reported date in any of the accepted layouts.
pub(crate) fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

fn violation(
    field: FieldId,
    violation_type: ViolationType,
    severity: Severity,
    cited_authority: CitedAuthority,
    description: String,
) -> Violation {
    Violation {
        field,
        violation_type,
        description,
        severity,
        cited_authority,
    }
}

/// Required-field pass. A date field whose value cannot be parsed counts as
/// absent here; the format pass flags it separately.
pub(super) fn check_required_fields(
    schema: &Metro2Schema,
    record: &TradelineRecord,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for spec in schema.fields().iter().filter(|spec| spec.required) {
        let present = match record.field(spec.field) {
            None => false,
            Some(value) => match spec.field_type {
                FieldType::Date => parse_report_date(value).is_some(),
                FieldType::Timestamp => parse_timestamp(value).is_some(),
                _ => true,
            },
        };

        if !present {
            violations.push(violation(
                spec.field,
                ViolationType::MissingRequiredField,
                Severity::High,
                CitedAuthority::FcraSection623A1,
                format!(
                    "required field '{}' is missing or empty",
                    spec.field.name()
                ),
            ));
        }
    }

    violations
}

/// Length and type-class pass over every present field.
pub(super) fn check_field_formats(
    schema: &Metro2Schema,
    record: &TradelineRecord,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for spec in schema.fields() {
        let Some(value) = record.field(spec.field) else {
            continue;
        };

        if value.chars().count() > spec.max_length {
            violations.push(violation(
                spec.field,
                ViolationType::FieldLengthExceeded,
                Severity::Medium,
                CitedAuthority::FcraSection623A2,
                format!(
                    "field '{}' exceeds maximum length of {} characters (found {})",
                    spec.field.name(),
                    spec.max_length,
                    value.chars().count()
                ),
            ));
        }

        if !matches_field_type(value, spec.field_type) {
            violations.push(violation(
                spec.field,
                ViolationType::InvalidFieldFormat,
                Severity::High,
                CitedAuthority::FcraSection623A2,
                format!(
                    "field '{}' has invalid format, expected {:?} value",
                    spec.field.name(),
                    spec.field_type
                ),
            ));
        }
    }

    violations
}

fn matches_field_type(value: &str, field_type: FieldType) -> bool {
    match field_type {
        FieldType::Alpha => value.chars().all(|c| c.is_ascii_alphabetic() || c == ' '),
        FieldType::Numeric => value.chars().all(|c| c.is_ascii_digit()),
        FieldType::Alphanumeric => value.chars().all(|c| c.is_ascii_alphanumeric() || c == ' '),
        FieldType::Date => parse_report_date(value).is_some(),
        FieldType::Timestamp => parse_timestamp(value).is_some(),
    }
}

/// Cross-field date consistency pass.
pub(super) fn check_date_logic(record: &TradelineRecord, today: NaiveDate) -> Vec<Violation> {
    let mut violations = Vec::new();

    let date_opened = record.field(FieldId::DateOpened).and_then(parse_report_date);
    let date_closed = record.field(FieldId::DateClosed).and_then(parse_report_date);
    let first_delinquency = record
        .field(FieldId::DateOfFirstDelinquency)
        .and_then(parse_report_date);
    let last_payment = record
        .field(FieldId::DateOfLastPayment)
        .and_then(parse_report_date);

    if let Some(opened) = date_opened {
        if opened > today {
            violations.push(violation(
                FieldId::DateOpened,
                ViolationType::FutureDateOpened,
                Severity::High,
                CitedAuthority::FcraSection623A2,
                "date opened cannot be in the future".to_string(),
            ));
        }

        if let Some(closed) = date_closed {
            if closed < opened {
                violations.push(violation(
                    FieldId::DateClosed,
                    ViolationType::InvalidDateSequence,
                    Severity::High,
                    CitedAuthority::FcraSection623A2,
                    "date closed cannot be before date opened".to_string(),
                ));
            }
        }

        if let Some(delinquency) = first_delinquency {
            if delinquency < opened {
                violations.push(violation(
                    FieldId::DateOfFirstDelinquency,
                    ViolationType::InvalidDelinquencyDate,
                    Severity::High,
                    CitedAuthority::FcraSection623A2,
                    "date of first delinquency cannot be before date opened".to_string(),
                ));
            }
        }

        if let Some(payment) = last_payment {
            if payment < opened {
                violations.push(violation(
                    FieldId::DateOfLastPayment,
                    ViolationType::InvalidLastPaymentDate,
                    Severity::Medium,
                    CitedAuthority::FcraSection623A2,
                    "date of last payment cannot be before date opened".to_string(),
                ));
            }
        }
    }

    violations
}

/// Account status and payment rating consistency pass.
pub(super) fn check_status_consistency(record: &TradelineRecord) -> Vec<Violation> {
    let mut violations = Vec::new();

    let account_status = record.field(FieldId::AccountStatus);
    let payment_rating = record.field(FieldId::PaymentRating);

    if let Some(status) = account_status {
        if !schema::is_valid_account_status(status) {
            violations.push(violation(
                FieldId::AccountStatus,
                ViolationType::InvalidAccountStatus,
                Severity::High,
                CitedAuthority::FcraSection623A2,
                format!("invalid account status code: {status}"),
            ));
        }
    }

    if let Some(rating) = payment_rating {
        if !schema::is_valid_payment_rating(rating) {
            violations.push(violation(
                FieldId::PaymentRating,
                ViolationType::InvalidPaymentRating,
                Severity::High,
                CitedAuthority::FcraSection623A2,
                format!("invalid payment rating code: {rating}"),
            ));
        }
    }

    if account_status == Some(CHARGE_OFF_STATUS) && payment_rating != Some(CHARGE_OFF_RATING) {
        violations.push(violation(
            FieldId::PaymentRating,
            ViolationType::InconsistentStatusRating,
            Severity::High,
            CitedAuthority::FcraSection623A2,
            "payment rating inconsistent with charged-off account status".to_string(),
        ));
    }

    let delinquent = account_status.is_some_and(schema::is_delinquent_status);
    if record.amount_past_due_value() > 0.0 && !delinquent {
        violations.push(violation(
            FieldId::AmountPastDue,
            ViolationType::InconsistentPastDue,
            Severity::Medium,
            CitedAuthority::FcraSection623A2,
            "past due amount reported without corresponding delinquent status".to_string(),
        ));
    }

    violations
}

/// 24-slot payment history pass: position codes must be recognized, and the
/// three most recent positions must agree with a paid-as-agreed status.
pub(super) fn check_payment_history(record: &TradelineRecord) -> Vec<Violation> {
    let mut violations = Vec::new();

    let Some(profile) = record.field(FieldId::PaymentHistoryProfile) else {
        return violations;
    };
    if profile.chars().count() != 24 {
        return violations;
    }

    for (position, code) in profile.chars().enumerate() {
        if !PAYMENT_HISTORY_CODES.contains(&code) {
            violations.push(violation(
                FieldId::PaymentHistoryProfile,
                ViolationType::InvalidPaymentHistoryCode,
                Severity::Medium,
                CitedAuthority::FcraSection623A2,
                format!(
                    "invalid payment history code '{}' at position {}",
                    code,
                    position + 1
                ),
            ));
        }
    }

    let recent_delinquency = profile
        .chars()
        .take(3)
        .any(|code| ('2'..='9').contains(&code));
    if record.field(FieldId::AccountStatus) == Some(PAID_AS_AGREED_STATUS) && recent_delinquency {
        violations.push(violation(
            FieldId::PaymentHistoryProfile,
            ViolationType::InconsistentPaymentHistory,
            Severity::High,
            CitedAuthority::FcraSection623A2,
            "payment history shows delinquency but account status is paid as agreed".to_string(),
        ));
    }

    violations
}

/// ECOA association code pass.
pub(super) fn check_ecoa(record: &TradelineRecord) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(code) = record.field(FieldId::EcoaCode) {
        if !schema::is_valid_ecoa_code(code) {
            violations.push(violation(
                FieldId::EcoaCode,
                ViolationType::InvalidEcoaCode,
                Severity::High,
                CitedAuthority::FcraSection623A2,
                format!("invalid ECOA code: {code}"),
            ));
        }
    }

    violations
}
