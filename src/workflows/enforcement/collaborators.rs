//! External collaborator contracts: letter delivery, success-probability
//! scoring, and draft enhancement. All three are best-effort services behind
//! traits so the core engine stays testable without them. Implementations
//! must enforce their own wall-clock timeouts and return an error instead of
//! blocking; the engine applies a defined fallback on every failure except
//! delivery, which aborts the owning stage transition.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{Bureau, DisputeType, EnforcementStage, Letter, LetterKind};

/// Transport used to send a letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Email,
    Mail,
    Fax,
}

impl DeliveryMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Mail => "mail",
            Self::Fax => "fax",
        }
    }
}

/// Carrier acknowledgment for an accepted letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub delivery_id: String,
    pub method: DeliveryMethod,
    pub estimated_delivery: NaiveDate,
}

/// Outbound delivery collaborator.
pub trait LetterDeliverer: Send + Sync {
    fn send(&self, letter: &Letter, method: DeliveryMethod) -> Result<DeliveryReceipt, DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery transport unavailable: {0}")]
    Transport(String),
    #[error("recipient rejected the letter: {0}")]
    Rejected(String),
}

/// Features handed to the external success estimator when a dispute is
/// opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeFeatures {
    pub dispute_type: DisputeType,
    pub bureau: Bureau,
    pub stage: EnforcementStage,
    pub violation_count: usize,
    pub high_severity_count: usize,
    pub priority: u32,
}

/// External scoring collaborator estimating dispute success in `[0, 1]`.
/// Absence or failure never blocks workflow creation.
pub trait SuccessEstimator: Send + Sync {
    fn estimate(&self, features: &DisputeFeatures) -> Result<f32, EstimatorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    #[error("success estimator unavailable: {0}")]
    Unavailable(String),
}

/// Context handed to the text-enhancement collaborator alongside the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnhancementContext {
    pub dispute_type: DisputeType,
    pub kind: LetterKind,
    pub bureau: Bureau,
}

/// External text-enhancement collaborator. Output is validated by the
/// composer's length heuristic before it replaces the templated draft.
pub trait LetterEnhancer: Send + Sync {
    fn enhance(&self, draft: &str, context: &EnhancementContext) -> Result<String, EnhancerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum EnhancerError {
    #[error("enhancement service unavailable: {0}")]
    Unavailable(String),
}
