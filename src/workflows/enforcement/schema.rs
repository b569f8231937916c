//! Metro 2-style reporting schema: the fixed field registry the validator
//! checks tradeline records against, plus the fixed code sets for account
//! status, payment rating, payment history, and ECOA designators.

use serde::{Deserialize, Serialize};

/// Fields of the fixed-format tradeline base segment covered by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    ConsumerAccountNumber,
    PortfolioType,
    AccountType,
    DateOpened,
    CreditLimit,
    HighestCredit,
    AccountStatus,
    PaymentRating,
    PaymentHistoryProfile,
    CurrentBalance,
    AmountPastDue,
    DateReported,
    DateOfFirstDelinquency,
    DateClosed,
    DateOfLastPayment,
    Surname,
    FirstName,
    SocialSecurityNumber,
    DateOfBirth,
    TelephoneNumber,
    EcoaCode,
    FirstLineOfAddress,
    City,
    State,
    PostalZipCode,
}

impl FieldId {
    /// Canonical field name as it appears in the reporting format.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ConsumerAccountNumber => "CONSUMER_ACCOUNT_NUMBER",
            Self::PortfolioType => "PORTFOLIO_TYPE",
            Self::AccountType => "ACCOUNT_TYPE",
            Self::DateOpened => "DATE_OPENED",
            Self::CreditLimit => "CREDIT_LIMIT",
            Self::HighestCredit => "HIGHEST_CREDIT",
            Self::AccountStatus => "ACCOUNT_STATUS",
            Self::PaymentRating => "PAYMENT_RATING",
            Self::PaymentHistoryProfile => "PAYMENT_HISTORY_PROFILE",
            Self::CurrentBalance => "CURRENT_BALANCE",
            Self::AmountPastDue => "AMOUNT_PAST_DUE",
            Self::DateReported => "DATE_ACCOUNT_INFORMATION_REPORTED",
            Self::DateOfFirstDelinquency => "DATE_OF_FIRST_DELINQUENCY",
            Self::DateClosed => "DATE_CLOSED",
            Self::DateOfLastPayment => "DATE_OF_LAST_PAYMENT",
            Self::Surname => "SURNAME",
            Self::FirstName => "FIRST_NAME",
            Self::SocialSecurityNumber => "SOCIAL_SECURITY_NUMBER",
            Self::DateOfBirth => "DATE_OF_BIRTH",
            Self::TelephoneNumber => "TELEPHONE_NUMBER",
            Self::EcoaCode => "ECOA_CODE",
            Self::FirstLineOfAddress => "FIRST_LINE_OF_ADDRESS",
            Self::City => "CITY",
            Self::State => "STATE",
            Self::PostalZipCode => "POSTAL_ZIP_CODE",
        }
    }
}

/// Declared type class of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Alpha,
    Numeric,
    Alphanumeric,
    Date,
    Timestamp,
}

/// One field definition: required-ness, maximum length, and type class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: FieldId,
    pub required: bool,
    pub max_length: usize,
    pub field_type: FieldType,
}

/// Immutable, loaded-once registry of field definitions. Built with
/// [`Metro2Schema::standard`] and passed explicitly into the validator.
#[derive(Debug, Clone)]
pub struct Metro2Schema {
    fields: Vec<FieldSpec>,
}

impl Metro2Schema {
    pub fn standard() -> Self {
        Self {
            fields: standard_fields(),
        }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn spec(&self, field: FieldId) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.field == field)
    }
}

fn standard_fields() -> Vec<FieldSpec> {
    use FieldId::*;
    use FieldType::*;

    fn spec(field: FieldId, required: bool, max_length: usize, field_type: FieldType) -> FieldSpec {
        FieldSpec {
            field,
            required,
            max_length,
            field_type,
        }
    }

    vec![
        spec(ConsumerAccountNumber, true, 30, Alphanumeric),
        spec(PortfolioType, true, 1, Alpha),
        spec(AccountType, true, 2, Alphanumeric),
        spec(DateOpened, true, 10, Date),
        spec(CreditLimit, false, 9, Numeric),
        spec(HighestCredit, false, 9, Numeric),
        spec(AccountStatus, true, 2, Alphanumeric),
        spec(PaymentRating, true, 1, Alphanumeric),
        spec(PaymentHistoryProfile, false, 24, Alphanumeric),
        spec(CurrentBalance, false, 9, Numeric),
        spec(AmountPastDue, false, 9, Numeric),
        spec(DateReported, true, 10, Date),
        spec(DateOfFirstDelinquency, false, 10, Date),
        spec(DateClosed, false, 10, Date),
        spec(DateOfLastPayment, false, 10, Date),
        spec(Surname, true, 25, Alpha),
        spec(FirstName, true, 20, Alpha),
        spec(SocialSecurityNumber, true, 9, Numeric),
        spec(DateOfBirth, false, 10, Date),
        spec(TelephoneNumber, false, 10, Numeric),
        spec(EcoaCode, true, 1, Alpha),
        spec(FirstLineOfAddress, true, 32, Alphanumeric),
        spec(City, true, 20, Alpha),
        spec(State, true, 2, Alpha),
        spec(PostalZipCode, true, 9, Alphanumeric),
    ]
}

/// Valid account status codes and their meanings.
pub const ACCOUNT_STATUS_CODES: &[(&str, &str)] = &[
    ("11", "Too new to rate"),
    ("13", "Paid as agreed"),
    ("61", "30 days past due date"),
    ("62", "60 days past due date"),
    ("63", "90 days past due date"),
    ("64", "120 days past due date"),
    ("71", "150 days past due date"),
    ("78", "180+ days past due date"),
    ("80", "Repossession"),
    ("82", "Bad debt/Placed for collection"),
    ("83", "No payment history available"),
    ("84", "Voluntary surrender"),
    ("89", "Charged off to bad debt"),
    ("93", "Account closed by consumer"),
    ("94", "Account closed by credit grantor"),
    ("95", "Paid or paying under a partial payment agreement"),
    ("96", "Voluntary surrender"),
    ("97", "Unpaid balance reported as a loss by credit grantor"),
];

/// Valid payment rating codes and their meanings.
pub const PAYMENT_RATING_CODES: &[(&str, &str)] = &[
    ("0", "Too new to rate; approved but not used"),
    ("1", "Pays as agreed"),
    ("2", "30-59 days past due"),
    ("3", "60-89 days past due"),
    ("4", "90-119 days past due"),
    ("5", "120-149 days past due"),
    ("6", "150-179 days past due"),
    ("7", "180+ days past due"),
    ("8", "Repossession"),
    ("9", "Bad debt/Placed for collection/Skip"),
];

/// Allowed position codes in the 24-slot payment history profile.
pub const PAYMENT_HISTORY_CODES: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'B', 'D', 'E', 'G', 'H', 'J', 'K', 'L',
];

/// Recognized ECOA association codes.
pub const ECOA_CODES: &[(&str, &str)] = &[
    ("1", "Individual"),
    ("2", "Joint"),
    ("3", "Authorized user"),
    ("4", "Terminated"),
    ("5", "Shared"),
    ("6", "On behalf of another person"),
    ("7", "Maker"),
    ("8", "Co-maker"),
    ("9", "Co-signer"),
    ("X", "Deceased"),
    ("Z", "Delete entire account"),
];

/// Status codes reporting an active delinquency. A nonzero past-due amount
/// requires one of these.
pub const DELINQUENT_STATUS_CODES: &[&str] = &["61", "62", "63", "64", "71", "78"];

pub const CHARGE_OFF_STATUS: &str = "89";
pub const CHARGE_OFF_RATING: &str = "9";
pub const PAID_AS_AGREED_STATUS: &str = "13";

pub fn is_valid_account_status(code: &str) -> bool {
    ACCOUNT_STATUS_CODES.iter().any(|(known, _)| *known == code)
}

pub fn is_valid_payment_rating(code: &str) -> bool {
    PAYMENT_RATING_CODES.iter().any(|(known, _)| *known == code)
}

pub fn is_valid_ecoa_code(code: &str) -> bool {
    ECOA_CODES.iter().any(|(known, _)| *known == code)
}

pub fn is_delinquent_status(code: &str) -> bool {
    DELINQUENT_STATUS_CODES.contains(&code)
}
