use serde::{Deserialize, Serialize};

use super::domain::Bureau;
use super::schema::FieldId;

/// One reported account as currently known. Field values stay raw strings so
/// validation can report format problems instead of refusing to construct the
/// record; a fresh record supersedes the old one when the furnisher reports
/// an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradelineRecord {
    pub consumer_id: String,
    pub bureau: Bureau,
    pub furnisher_name: String,
    pub furnisher_address: String,
    pub account_number: String,
    pub portfolio_type: String,
    pub account_type: String,
    pub date_opened: String,
    pub credit_limit: Option<String>,
    pub highest_credit: Option<String>,
    pub account_status: String,
    pub payment_rating: String,
    pub payment_history_profile: Option<String>,
    pub current_balance: Option<String>,
    pub amount_past_due: Option<String>,
    pub date_reported: String,
    pub date_of_first_delinquency: Option<String>,
    pub date_closed: Option<String>,
    pub date_of_last_payment: Option<String>,
    pub surname: String,
    pub first_name: String,
    pub ssn: String,
    pub date_of_birth: Option<String>,
    pub telephone_number: Option<String>,
    pub ecoa_code: String,
    pub address1: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl TradelineRecord {
    /// Raw value of a schema field. Blank values count as absent.
    pub fn field(&self, field: FieldId) -> Option<&str> {
        let value = match field {
            FieldId::ConsumerAccountNumber => Some(self.account_number.as_str()),
            FieldId::PortfolioType => Some(self.portfolio_type.as_str()),
            FieldId::AccountType => Some(self.account_type.as_str()),
            FieldId::DateOpened => Some(self.date_opened.as_str()),
            FieldId::CreditLimit => self.credit_limit.as_deref(),
            FieldId::HighestCredit => self.highest_credit.as_deref(),
            FieldId::AccountStatus => Some(self.account_status.as_str()),
            FieldId::PaymentRating => Some(self.payment_rating.as_str()),
            FieldId::PaymentHistoryProfile => self.payment_history_profile.as_deref(),
            FieldId::CurrentBalance => self.current_balance.as_deref(),
            FieldId::AmountPastDue => self.amount_past_due.as_deref(),
            FieldId::DateReported => Some(self.date_reported.as_str()),
            FieldId::DateOfFirstDelinquency => self.date_of_first_delinquency.as_deref(),
            FieldId::DateClosed => self.date_closed.as_deref(),
            FieldId::DateOfLastPayment => self.date_of_last_payment.as_deref(),
            FieldId::Surname => Some(self.surname.as_str()),
            FieldId::FirstName => Some(self.first_name.as_str()),
            FieldId::SocialSecurityNumber => Some(self.ssn.as_str()),
            FieldId::DateOfBirth => self.date_of_birth.as_deref(),
            FieldId::TelephoneNumber => self.telephone_number.as_deref(),
            FieldId::EcoaCode => Some(self.ecoa_code.as_str()),
            FieldId::FirstLineOfAddress => Some(self.address1.as_str()),
            FieldId::City => Some(self.city.as_str()),
            FieldId::State => Some(self.state.as_str()),
            FieldId::PostalZipCode => Some(self.zip_code.as_str()),
        };

        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Reported past-due amount, zero when absent or unparseable.
    pub fn amount_past_due_value(&self) -> f64 {
        self.amount_past_due
            .as_deref()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    /// Last four SSN digits for correspondence, masked when unavailable.
    pub fn ssn_last_four(&self) -> String {
        let digits: String = self.ssn.chars().filter(char::is_ascii_digit).collect();
        if digits.len() >= 4 {
            digits[digits.len() - 4..].to_string()
        } else {
            "XXXX".to_string()
        }
    }
}
