use chrono::NaiveDate;

use super::domain::{Dispute, DisputeId, EnforcementWorkflow, WorkflowId};

/// Storage abstraction for workflows and disputes so the enforcement service
/// can be exercised in isolation.
///
/// Concurrency contract: every [`Dispute`] carries a `version`. An
/// implementation must reject `update_dispute` when the incoming version does
/// not match the stored one (returning [`RepositoryError::Conflict`]) and
/// bump the stored version on success. This is what serializes competing
/// transitions on the same dispute.
pub trait DisputeRepository: Send + Sync {
    fn insert_workflow(
        &self,
        workflow: EnforcementWorkflow,
    ) -> Result<EnforcementWorkflow, RepositoryError>;
    fn update_workflow(&self, workflow: EnforcementWorkflow) -> Result<(), RepositoryError>;
    fn fetch_workflow(
        &self,
        id: &WorkflowId,
    ) -> Result<Option<EnforcementWorkflow>, RepositoryError>;

    fn insert_dispute(&self, dispute: Dispute) -> Result<Dispute, RepositoryError>;
    fn update_dispute(&self, dispute: Dispute) -> Result<(), RepositoryError>;
    fn fetch_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>, RepositoryError>;
    fn disputes_for_workflow(&self, id: &WorkflowId) -> Result<Vec<Dispute>, RepositoryError>;

    /// Non-terminal disputes whose follow-up deadline is on or before
    /// `today`. Consumed by the idempotent follow-up sweep.
    fn follow_ups_due(&self, today: NaiveDate) -> Result<Vec<Dispute>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists or was modified concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
