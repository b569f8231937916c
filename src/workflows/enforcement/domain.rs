use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::Violation;

/// Identifier wrapper for clients tracked by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub String);

/// Identifier wrapper for individual disputes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisputeId(pub String);

/// Identifier wrapper for generated letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LetterId(pub String);

/// Identifier wrapper for per-client enforcement workflows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(pub String);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DisputeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for LetterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered escalation stages. The first six are remediation stages a dispute
/// traverses automatically; the rest are advisory stages reached after the
/// remediation disputes settle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementStage {
    CreditAnalysis,
    DisputePreparation,
    BureauDispute,
    FurnisherDispute,
    VerificationChallenge,
    LegalEscalation,
    ComplianceEnforcement,
    ScoreOptimization,
    CreditBuilding,
    WealthProtection,
}

impl EnforcementStage {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::CreditAnalysis,
            Self::DisputePreparation,
            Self::BureauDispute,
            Self::FurnisherDispute,
            Self::VerificationChallenge,
            Self::LegalEscalation,
            Self::ComplianceEnforcement,
            Self::ScoreOptimization,
            Self::CreditBuilding,
            Self::WealthProtection,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CreditAnalysis => "Credit Analysis",
            Self::DisputePreparation => "Dispute Preparation",
            Self::BureauDispute => "Bureau Dispute",
            Self::FurnisherDispute => "Furnisher Dispute",
            Self::VerificationChallenge => "Verification Challenge",
            Self::LegalEscalation => "Legal Escalation",
            Self::ComplianceEnforcement => "Compliance Enforcement",
            Self::ScoreOptimization => "Score Optimization",
            Self::CreditBuilding => "Credit Building",
            Self::WealthProtection => "Wealth Protection",
        }
    }

    /// The immediately following stage, if any. Transitions may only ever
    /// target this stage; skipping is rejected by the service.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::CreditAnalysis => Some(Self::DisputePreparation),
            Self::DisputePreparation => Some(Self::BureauDispute),
            Self::BureauDispute => Some(Self::FurnisherDispute),
            Self::FurnisherDispute => Some(Self::VerificationChallenge),
            Self::VerificationChallenge => Some(Self::LegalEscalation),
            Self::LegalEscalation => Some(Self::ComplianceEnforcement),
            Self::ComplianceEnforcement => Some(Self::ScoreOptimization),
            Self::ScoreOptimization => Some(Self::CreditBuilding),
            Self::CreditBuilding => Some(Self::WealthProtection),
            Self::WealthProtection => None,
        }
    }

    pub const fn is_remediation(self) -> bool {
        matches!(
            self,
            Self::CreditAnalysis
                | Self::DisputePreparation
                | Self::BureauDispute
                | Self::FurnisherDispute
                | Self::VerificationChallenge
                | Self::LegalEscalation
        )
    }

    /// Stages subject to the statutory investigation window. A dispute
    /// submitted at one of these stages carries a follow-up deadline.
    pub const fn tracks_follow_up(self) -> bool {
        matches!(
            self,
            Self::BureauDispute | Self::FurnisherDispute | Self::VerificationChallenge
        )
    }

    /// The correspondence produced when a dispute enters this stage.
    /// Advisory stages produce none.
    pub const fn letter_kind(self) -> Option<LetterKind> {
        match self {
            Self::BureauDispute => Some(LetterKind::Initial),
            Self::FurnisherDispute => Some(LetterKind::Furnisher),
            Self::VerificationChallenge => Some(LetterKind::Verification),
            Self::LegalEscalation => Some(LetterKind::Escalation),
            _ => None,
        }
    }
}

/// Dispute lifecycle sub-states. `Resolved` and `Rejected` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Pending,
    Submitted,
    Investigating,
    Resolved,
    Rejected,
}

impl DisputeStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

/// Enumerated dispute reasons carried on each dispute and used to select the
/// initial letter template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeType {
    NotMine,
    PaidInFull,
    IncorrectAmount,
    IncorrectDate,
    Duplicate,
    IdentityTheft,
    MixedFile,
    Outdated,
    Other,
}

impl DisputeType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotMine => "not mine",
            Self::PaidInFull => "paid in full",
            Self::IncorrectAmount => "incorrect amount",
            Self::IncorrectDate => "incorrect date",
            Self::Duplicate => "duplicate",
            Self::IdentityTheft => "identity theft",
            Self::MixedFile => "mixed file",
            Self::Outdated => "outdated",
            Self::Other => "other",
        }
    }
}

/// The three consumer reporting agencies a dispute can be addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bureau {
    Equifax,
    Experian,
    TransUnion,
}

impl Bureau {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Equifax => "Equifax",
            Self::Experian => "Experian",
            Self::TransUnion => "TransUnion",
        }
    }
}

/// Correspondence classes, one per letter-producing enforcement stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterKind {
    Initial,
    Furnisher,
    Verification,
    Escalation,
}

impl LetterKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Initial => "initial dispute",
            Self::Furnisher => "furnisher direct dispute",
            Self::Verification => "method of verification",
            Self::Escalation => "escalation demand",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterStatus {
    Draft,
    Generated,
    Sent,
    Delivered,
    Failed,
}

impl LetterStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Generated => "generated",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

/// One piece of outbound correspondence. The body is immutable once
/// generated; only delivery bookkeeping changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Letter {
    pub id: LetterId,
    pub dispute_id: DisputeId,
    pub stage: EnforcementStage,
    pub kind: LetterKind,
    pub subject: String,
    pub body: String,
    pub recipient: String,
    pub recipient_address: String,
    pub status: LetterStatus,
    pub created_on: NaiveDate,
    pub sent_on: Option<NaiveDate>,
    pub delivery_id: Option<String>,
    pub estimated_delivery: Option<NaiveDate>,
}

/// Record of a dispute entering a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub stage: EnforcementStage,
    pub entered_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    LetterGenerated,
    LetterSent,
    LetterFailed,
    LetterDelivered,
    ResponseReceived,
    FollowUpElapsed,
    StageAdvanced,
    Resolved,
    Rejected,
}

/// Append-only audit trail entry on a dispute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub recorded_on: NaiveDate,
    pub event: AuditEvent,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Outcome reported by a bureau or furnisher for a submitted dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOutcome {
    Deleted,
    Corrected,
    Verified,
    Acknowledged,
}

impl ResponseOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::Corrected => "corrected",
            Self::Verified => "verified",
            Self::Acknowledged => "acknowledged",
        }
    }
}

/// Inbound response event ingested from a bureau or furnisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeResponse {
    pub outcome: ResponseOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Client identity carried into generated correspondence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub id: ClientId,
    pub first_name: String,
    pub last_name: String,
    pub mailing_address: String,
}

impl ClientProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One client's challenge to one tradeline at one recipient. Mutated only by
/// the enforcement service's transition functions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub workflow_id: WorkflowId,
    pub client_id: ClientId,
    pub client_name: String,
    pub client_address: String,
    pub ssn_last_four: String,
    pub bureau: Bureau,
    pub furnisher_name: String,
    pub furnisher_address: String,
    pub account_number: String,
    pub dispute_type: DisputeType,
    pub dispute_reason: String,
    pub status: DisputeStatus,
    pub stage: EnforcementStage,
    pub priority: u32,
    pub success_probability: f32,
    pub violations: Vec<Violation>,
    pub letters: Vec<Letter>,
    pub audit: Vec<AuditEntry>,
    pub stage_history: Vec<StageTransition>,
    pub follow_up_due: Option<NaiveDate>,
    pub version: u64,
    pub created_on: NaiveDate,
    pub updated_on: NaiveDate,
}

impl Dispute {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn letter_for_stage(&self, stage: EnforcementStage) -> Option<&Letter> {
        self.letters.iter().find(|letter| letter.stage == stage)
    }

    /// Whether at least one letter actually reached a carrier. Resolution is
    /// refused until this holds.
    pub fn has_sent_letter(&self) -> bool {
        self.letters.iter().any(|letter| {
            matches!(letter.status, LetterStatus::Sent | LetterStatus::Delivered)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Active,
    Completed,
}

impl WorkflowStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// Per-client workflow owning a set of disputes. `current_stage` is a
/// reporting pointer tracking the furthest stage any owned dispute reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnforcementWorkflow {
    pub id: WorkflowId,
    pub client_id: ClientId,
    pub status: WorkflowStatus,
    pub current_stage: EnforcementStage,
    pub total_items: usize,
    pub estimated_completion: NaiveDate,
    pub created_on: NaiveDate,
}
