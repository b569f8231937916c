//! Dispute enforcement engine: Metro 2-style compliance validation of
//! tradeline records, a per-client escalation workflow, and template-driven
//! correspondence generation.

pub mod collaborators;
mod config;
pub mod domain;
pub mod letters;
pub mod repository;
pub mod schema;
pub mod service;
pub mod tradeline;
pub mod validation;

#[cfg(test)]
mod tests;

pub use collaborators::{
    DeliveryError, DeliveryMethod, DeliveryReceipt, DisputeFeatures, EnhancementContext,
    EnhancerError, EstimatorError, LetterDeliverer, LetterEnhancer, SuccessEstimator,
};
pub use config::EngineConfig;
pub use domain::{
    AuditEntry, AuditEvent, Bureau, ClientId, ClientProfile, Dispute, DisputeId, DisputeResponse,
    DisputeStatus, DisputeType, EnforcementStage, EnforcementWorkflow, Letter, LetterId,
    LetterKind, LetterStatus, ResponseOutcome, StageTransition, WorkflowId, WorkflowStatus,
};
pub use letters::{
    BureauDirectory, BureauInfo, ComposeError, ComposedLetter, LetterComposer, LetterTemplate,
    LookupError, RecipientClass, TemplateLibrary,
};
pub use repository::{DisputeRepository, RepositoryError};
pub use schema::{FieldId, FieldSpec, FieldType, Metro2Schema};
pub use service::{
    EnforcementError, EnforcementService, FollowUpFailure, FollowUpSweep, TransitionError,
    WorkflowIntake, WorkflowStatusView,
};
pub use tradeline::TradelineRecord;
pub use validation::{
    CitedAuthority, ComplianceValidator, Severity, ValidationResult, Violation, ViolationType,
};
