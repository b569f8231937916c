//! Catalog of correspondence templates, keyed by dispute type and letter
//! kind. Initial bureau disputes carry one template per dispute reason with a
//! generic fallback; later-stage letters are shared across dispute types.

use super::super::domain::{DisputeType, EnforcementStage, LetterKind};
use super::LookupError;

/// Which party a template addresses. Bureau-addressed letters resolve their
/// recipient through the bureau directory; furnisher-addressed letters use
/// the dispute's furnisher fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientClass {
    Bureau,
    Furnisher,
}

/// One parameterized letter body plus its metadata. `tokens` declares every
/// placeholder the body uses; the composer refuses to ship a letter with any
/// of them unresolved.
#[derive(Debug, Clone, Copy)]
pub struct LetterTemplate {
    pub key: &'static str,
    pub kind: LetterKind,
    pub dispute_type: Option<DisputeType>,
    pub subject: &'static str,
    pub body: &'static str,
    pub tokens: &'static [&'static str],
    pub cited_section: &'static str,
    pub recipient: RecipientClass,
}

/// Immutable, loaded-once template registry passed into the composer.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    templates: Vec<LetterTemplate>,
}

impl TemplateLibrary {
    pub fn new(templates: Vec<LetterTemplate>) -> Self {
        Self { templates }
    }

    pub fn standard() -> Self {
        Self::new(standard_templates())
    }

    /// Resolve the template for a dispute type at a letter kind. Initial
    /// letters fall back to the generic template when no type-specific one
    /// exists; other kinds are shared across dispute types.
    pub fn lookup(
        &self,
        dispute_type: DisputeType,
        kind: LetterKind,
    ) -> Result<&LetterTemplate, LookupError> {
        let found = match kind {
            LetterKind::Initial => self
                .templates
                .iter()
                .find(|template| {
                    template.kind == LetterKind::Initial
                        && template.dispute_type == Some(dispute_type)
                })
                .or_else(|| {
                    self.templates.iter().find(|template| {
                        template.kind == LetterKind::Initial
                            && template.dispute_type == Some(DisputeType::Other)
                    })
                }),
            _ => self
                .templates
                .iter()
                .find(|template| template.kind == kind && template.dispute_type.is_none()),
        };

        found.ok_or(LookupError::TemplateNotFound { dispute_type, kind })
    }

    /// Template selected for a dispute entering the given stage, if the
    /// stage produces correspondence at all.
    pub fn for_stage(
        &self,
        dispute_type: DisputeType,
        stage: EnforcementStage,
    ) -> Result<&LetterTemplate, LookupError> {
        let kind = stage
            .letter_kind()
            .ok_or(LookupError::StageWithoutLetter(stage))?;
        self.lookup(dispute_type, kind)
    }

    pub fn templates(&self) -> &[LetterTemplate] {
        &self.templates
    }
}

const BUREAU_HEADER_TOKENS: [&str; 8] = [
    "date",
    "bureau_name",
    "bureau_address",
    "consumer_name",
    "consumer_address",
    "last_four_ssn",
    "account_name",
    "account_number",
];

fn standard_templates() -> Vec<LetterTemplate> {
    vec![
        LetterTemplate {
            key: "initial_not_mine",
            kind: LetterKind::Initial,
            dispute_type: Some(DisputeType::NotMine),
            subject: "Dispute - Account Not Mine",
            cited_section: "FCRA 611(a)(1)(A)",
            recipient: RecipientClass::Bureau,
            tokens: &BUREAU_HEADER_TOKENS,
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Dispute of Inaccurate Information\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Dispute Department,\n\nI am writing to formally dispute the following item on my credit report:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nThis account does not belong to me. I have never opened an account with this creditor, nor have I authorized anyone to open one on my behalf.\n\nUnder the Fair Credit Reporting Act, Section 611(a)(1)(A), I request that you conduct a reasonable reinvestigation of this item and remove it from my credit report. You have 30 days to investigate and respond to this dispute.\n\nPlease provide written confirmation of the removal of this item.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nEnclosures: Copy of ID, Proof of Address",
        },
        LetterTemplate {
            key: "initial_paid_in_full",
            kind: LetterKind::Initial,
            dispute_type: Some(DisputeType::PaidInFull),
            subject: "Dispute - Account Paid in Full",
            cited_section: "FCRA 611(a)(1)(A)",
            recipient: RecipientClass::Bureau,
            tokens: &BUREAU_HEADER_TOKENS,
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Dispute of Inaccurate Balance\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Dispute Department,\n\nI am writing to dispute the following account on my credit report:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nThis account shows an outstanding balance, however it has been paid in full. I have fulfilled all payment obligations and the account should reflect a zero balance or be removed.\n\nUnder the Fair Credit Reporting Act you have 30 days to investigate and respond to this dispute. Please update my credit report to accurately reflect the paid status of this account.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nEnclosures: Payment records, Account statements",
        },
        LetterTemplate {
            key: "initial_incorrect_amount",
            kind: LetterKind::Initial,
            dispute_type: Some(DisputeType::IncorrectAmount),
            subject: "Dispute - Incorrect Balance Amount",
            cited_section: "FCRA 611(a)(1)(A)",
            recipient: RecipientClass::Bureau,
            tokens: &[
                "date",
                "bureau_name",
                "bureau_address",
                "consumer_name",
                "consumer_address",
                "last_four_ssn",
                "account_name",
                "account_number",
                "violation_summary",
            ],
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Dispute of Incorrect Balance Information\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Dispute Department,\n\nI am writing to dispute the balance information reported for the following account:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nThe amounts currently reported are inaccurate and inconsistent with the account's reported status:\n\n{violation_summary}\n\nUnder the Fair Credit Reporting Act you have 30 days to investigate this dispute. Please correct the reported amounts to reflect the true status of this account, or delete the item if it cannot be verified as accurate and complete.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nEnclosures: Account statements, Payment records",
        },
        LetterTemplate {
            key: "initial_incorrect_date",
            kind: LetterKind::Initial,
            dispute_type: Some(DisputeType::IncorrectDate),
            subject: "Dispute - Incorrect Date Information",
            cited_section: "FCRA 611(a)(1)(A)",
            recipient: RecipientClass::Bureau,
            tokens: &[
                "date",
                "bureau_name",
                "bureau_address",
                "consumer_name",
                "consumer_address",
                "last_four_ssn",
                "account_name",
                "account_number",
                "violation_summary",
            ],
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Dispute of Incorrect Date Information\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Dispute Department,\n\nI am writing to dispute the date information reported for the following account:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nThe dates associated with this account do not reflect a logically consistent account history:\n\n{violation_summary}\n\nUnder the Fair Credit Reporting Act you have 30 days to investigate this dispute. Please correct the date information to reflect the actual account timeline, or delete the item if it cannot be verified.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nEnclosures: Account documentation, Payment history",
        },
        LetterTemplate {
            key: "initial_duplicate",
            kind: LetterKind::Initial,
            dispute_type: Some(DisputeType::Duplicate),
            subject: "Dispute - Duplicate Account Listing",
            cited_section: "FCRA 611(a)(1)(A)",
            recipient: RecipientClass::Bureau,
            tokens: &BUREAU_HEADER_TOKENS,
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Dispute of Duplicate Listing\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Dispute Department,\n\nI am writing to dispute a duplicate listing on my credit report:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nThis account appears more than once on my credit report, which is inaccurate and negatively impacts my credit standing. There should be exactly one listing for this account.\n\nUnder the Fair Credit Reporting Act you have 30 days to investigate this dispute. Please remove the duplicate listing from my credit report.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nEnclosures: Credit report highlighting duplicates",
        },
        LetterTemplate {
            key: "initial_identity_theft",
            kind: LetterKind::Initial,
            dispute_type: Some(DisputeType::IdentityTheft),
            subject: "Dispute - Identity Theft",
            cited_section: "FCRA 611(a)(1)(A)",
            recipient: RecipientClass::Bureau,
            tokens: &BUREAU_HEADER_TOKENS,
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Dispute of Fraudulent Account\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Dispute Department,\n\nI am writing to dispute the following fraudulent account on my credit report:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nThis account was opened as a result of identity theft. I did not open this account and have not authorized anyone to open it on my behalf. I have filed a police report and an FTC Identity Theft Report regarding this matter.\n\nUnder the Fair Credit Reporting Act you have 30 days to investigate this dispute. Please remove this fraudulent account from my credit report.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nEnclosures: Police report, FTC Identity Theft Report, Copy of ID",
        },
        LetterTemplate {
            key: "initial_mixed_file",
            kind: LetterKind::Initial,
            dispute_type: Some(DisputeType::MixedFile),
            subject: "Dispute - Mixed Credit File",
            cited_section: "FCRA 611(a)(1)(A)",
            recipient: RecipientClass::Bureau,
            tokens: &BUREAU_HEADER_TOKENS,
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Dispute of Mixed File Information\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Dispute Department,\n\nI am writing to dispute the following account, which appears to belong to another person:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nThis account does not belong to me and appears to be the result of a mixed credit file. The account information does not match my personal information, credit history, or financial records.\n\nUnder the Fair Credit Reporting Act you have 30 days to investigate this dispute. Please remove this account from my credit report.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nEnclosures: Copy of ID, Proof of Address",
        },
        LetterTemplate {
            key: "initial_outdated",
            kind: LetterKind::Initial,
            dispute_type: Some(DisputeType::Outdated),
            subject: "Dispute - Outdated Information",
            cited_section: "FCRA 611(a)(1)(A)",
            recipient: RecipientClass::Bureau,
            tokens: &BUREAU_HEADER_TOKENS,
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Dispute of Outdated Information\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Dispute Department,\n\nI am writing to dispute the following outdated account on my credit report:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nThis account information exceeds the reporting period allowed for negative information and should no longer appear on my credit report.\n\nUnder the Fair Credit Reporting Act you have 30 days to investigate this dispute. Please remove this outdated information from my credit report.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nEnclosures: Account timeline documentation",
        },
        LetterTemplate {
            key: "initial_other",
            kind: LetterKind::Initial,
            dispute_type: Some(DisputeType::Other),
            subject: "Credit Report Dispute",
            cited_section: "FCRA 611(a)(1)(A)",
            recipient: RecipientClass::Bureau,
            tokens: &[
                "date",
                "bureau_name",
                "bureau_address",
                "consumer_name",
                "consumer_address",
                "last_four_ssn",
                "account_name",
                "account_number",
                "dispute_reason",
            ],
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Credit Report Dispute\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Dispute Department,\n\nI am writing to dispute the following account on my credit report:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nReason for dispute:\n{dispute_reason}\n\nUnder the Fair Credit Reporting Act you have 30 days to investigate this dispute. Please investigate this matter and take appropriate action to correct my credit report.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nEnclosures: Supporting documentation",
        },
        LetterTemplate {
            key: "furnisher_direct_dispute",
            kind: LetterKind::Furnisher,
            dispute_type: None,
            subject: "Direct Dispute Under FCRA Section 623(a)(8)",
            cited_section: "FCRA 623(a)(8)",
            recipient: RecipientClass::Furnisher,
            tokens: &[
                "date",
                "furnisher_name",
                "furnisher_address",
                "consumer_name",
                "consumer_address",
                "last_four_ssn",
                "account_number",
                "violation_summary",
            ],
            body: "{date}\n\n{furnisher_name}\n{furnisher_address}\n\nRe: Direct Dispute Under FCRA Section 623(a)(8)\nAccount Number: {account_number}\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {furnisher_name} Compliance Department,\n\nI am disputing inaccurate information you are furnishing to consumer reporting agencies under FCRA Section 623(a)(8).\n\nSpecific inaccuracies:\n\n{violation_summary}\n\nUnder FCRA Section 623(a)(8)(E) you are required to conduct a reasonable investigation of the disputed information, review all relevant information I have provided, and report the results to each consumer reporting agency you furnish to. FCRA Section 623(a)(1)(A) requires the information you furnish to be accurate and complete; the current reporting does not meet that requirement.\n\nPlease investigate this dispute, correct or delete the inaccurate information, notify every consumer reporting agency of the correction, and provide written confirmation of your actions within 30 days.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nEnclosures: Supporting documentation",
        },
        LetterTemplate {
            key: "method_of_verification",
            kind: LetterKind::Verification,
            dispute_type: None,
            subject: "Method of Verification Request",
            cited_section: "FCRA 611(a)(7)",
            recipient: RecipientClass::Bureau,
            tokens: &[
                "date",
                "bureau_name",
                "bureau_address",
                "consumer_name",
                "consumer_address",
                "last_four_ssn",
                "account_name",
                "account_number",
                "original_dispute_date",
            ],
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Method of Verification Request\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Compliance Department,\n\nPursuant to FCRA Section 611(a)(7), I am requesting disclosure of the method of verification used in your reinvestigation of my dispute dated {original_dispute_date} concerning:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nI am specifically requesting:\n1. The method of verification used to confirm the accuracy of the disputed information\n2. The name and business address of any furnisher contacted\n3. The specific procedures followed during the reinvestigation\n4. Any documentation received from the furnisher\n\nFCRA Section 611(a)(7) requires you to provide this information within 15 days of my request. If the disputed information cannot be properly verified, it must be deleted from my credit report.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}",
        },
        LetterTemplate {
            key: "escalation_demand",
            kind: LetterKind::Escalation,
            dispute_type: None,
            subject: "Escalation - Unresolved Credit Report Dispute",
            cited_section: "FCRA 611(a)(1)(A)",
            recipient: RecipientClass::Bureau,
            tokens: &[
                "date",
                "bureau_name",
                "bureau_address",
                "consumer_name",
                "consumer_address",
                "last_four_ssn",
                "account_name",
                "account_number",
                "original_dispute_date",
                "days_since_dispute",
            ],
            body: "{date}\n\n{bureau_name}\n{bureau_address}\n\nRe: Escalation of Unresolved Dispute\nConsumer: {consumer_name}\nSSN: XXX-XX-{last_four_ssn}\nAddress: {consumer_address}\n\nDear {bureau_name} Compliance Management,\n\nI am writing to escalate my dispute regarding the following account:\n\nAccount Name: {account_name}\nAccount Number: {account_number}\n\nDespite my correspondence dated {original_dispute_date}, now {days_since_dispute} days ago, this matter remains unresolved. Continued reporting of unverified information may constitute a violation of the Fair Credit Reporting Act.\n\nIf this account cannot be properly verified, it must be removed from my credit report immediately. Failure to resolve this matter promptly will result in formal complaints to the Consumer Financial Protection Bureau and my state Attorney General's office.\n\nI expect a written response within 10 business days.\n\nSincerely,\n\n{consumer_name}\n{consumer_address}\n\nReference: Original dispute dated {original_dispute_date}",
        },
    ]
}
