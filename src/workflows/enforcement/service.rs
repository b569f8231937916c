use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use super::collaborators::{
    DeliveryError, DeliveryMethod, DisputeFeatures, LetterDeliverer, SuccessEstimator,
};
use super::config::EngineConfig;
use super::domain::{
    AuditEntry, AuditEvent, ClientId, ClientProfile, Dispute, DisputeId, DisputeResponse,
    DisputeStatus, EnforcementStage, EnforcementWorkflow, Letter, LetterId, LetterStatus,
    ResponseOutcome, StageTransition, WorkflowId, WorkflowStatus,
};
use super::letters::{ComposeError, LetterComposer, LookupError};
use super::repository::{DisputeRepository, RepositoryError};
use super::tradeline::TradelineRecord;
use super::validation::ComplianceValidator;

static WORKFLOW_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static DISPUTE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static LETTER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_workflow_id() -> WorkflowId {
    let id = WORKFLOW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    WorkflowId(format!("wfl-{id:06}"))
}

fn next_dispute_id() -> DisputeId {
    let id = DISPUTE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    DisputeId(format!("dsp-{id:06}"))
}

fn next_letter_id() -> LetterId {
    let id = LETTER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LetterId(format!("ltr-{id:06}"))
}

/// An attempted transition the state machine refuses. Callers should re-read
/// current state or surface the rejection to an operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("dispute {dispute} is terminal ({}) and accepts no further transitions", status.label())]
    Terminal {
        dispute: DisputeId,
        status: DisputeStatus,
    },
    #[error("cannot move dispute {dispute} from '{}' to '{}': stages advance one at a time", from.label(), to.label())]
    StageSkip {
        dispute: DisputeId,
        from: EnforcementStage,
        to: EnforcementStage,
    },
    #[error("dispute {dispute} has no stage after '{}'", stage.label())]
    NoFurtherStage {
        dispute: DisputeId,
        stage: EnforcementStage,
    },
    #[error("dispute {dispute} was modified by a concurrent transition; re-read and retry")]
    Concurrent { dispute: DisputeId },
    #[error("dispute {dispute} cannot resolve before at least one letter has been sent")]
    ResolutionWithoutLetter { dispute: DisputeId },
    #[error("letter {letter} is not in a failed state and cannot be retried")]
    NotRetryable { letter: LetterId },
    #[error("letter {letter} has not been sent and cannot be confirmed delivered")]
    NotSent { letter: LetterId },
}

/// Error raised by the enforcement service.
#[derive(Debug, thiserror::Error)]
pub enum EnforcementError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Result of initializing enforcement for one client.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowIntake {
    pub workflow: EnforcementWorkflow,
    pub disputes: Vec<Dispute>,
}

/// Outcome of one follow-up sweep pass.
#[derive(Debug, Clone, Serialize)]
pub struct FollowUpSweep {
    pub advanced: Vec<Dispute>,
    pub failures: Vec<FollowUpFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowUpFailure {
    pub dispute_id: DisputeId,
    pub error: String,
}

/// Reporting view over one workflow and its disputes.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStatusView {
    pub workflow_id: WorkflowId,
    pub client_id: ClientId,
    pub status: WorkflowStatus,
    pub current_stage: EnforcementStage,
    pub current_stage_label: String,
    pub total_disputes: usize,
    pub resolved_disputes: usize,
    pub rejected_disputes: usize,
    pub pending_disputes: usize,
    pub open_disputes: usize,
    pub progress_percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_success_probability: Option<f32>,
    pub estimated_completion: NaiveDate,
}

/// Service composing the validator, composer, repository, and external
/// collaborators into the dispute escalation state machine.
///
/// Each public operation is one synchronous unit of work. Writes go through
/// the repository's versioned update, so two concurrent transitions on the
/// same dispute cannot both succeed against a stale read.
pub struct EnforcementService<R, D, S> {
    repository: Arc<R>,
    delivery: Arc<D>,
    estimator: Arc<S>,
    composer: LetterComposer,
    validator: ComplianceValidator,
    config: EngineConfig,
}

impl<R, D, S> EnforcementService<R, D, S>
where
    R: DisputeRepository,
    D: LetterDeliverer,
    S: SuccessEstimator,
{
    pub fn new(
        repository: Arc<R>,
        delivery: Arc<D>,
        estimator: Arc<S>,
        composer: LetterComposer,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            delivery,
            estimator,
            composer,
            validator: ComplianceValidator::standard(),
            config,
        }
    }

    pub fn validator(&self) -> &ComplianceValidator {
        &self.validator
    }

    /// Run compliance analysis over a client's tradelines and open a dispute
    /// for every record carrying at least one violation. Creates the owning
    /// workflow with the configured completion horizon.
    pub fn initialize(
        &self,
        client: &ClientProfile,
        tradelines: &[TradelineRecord],
        today: NaiveDate,
    ) -> Result<WorkflowIntake, EnforcementError> {
        let workflow_id = next_workflow_id();
        let mut disputes = Vec::new();

        for record in tradelines {
            let result = self.validator.validate(record, today);
            if !result.has_violations() {
                continue;
            }

            let dispute_type = result.dispute_type();
            let priority = result.priority_score();
            let features = DisputeFeatures {
                dispute_type,
                bureau: record.bureau,
                stage: EnforcementStage::DisputePreparation,
                violation_count: result.violations.len(),
                high_severity_count: result.high_severity_count(),
                priority,
            };
            let success_probability = match self.estimator.estimate(&features) {
                Ok(probability) => probability.clamp(0.0, 1.0),
                Err(error) => {
                    warn!(
                        client = %client.id,
                        %error,
                        "success estimator unavailable, assuming neutral probability"
                    );
                    self.config.fallback_success_probability
                }
            };

            let dispute = Dispute {
                id: next_dispute_id(),
                workflow_id: workflow_id.clone(),
                client_id: client.id.clone(),
                client_name: client.full_name(),
                client_address: client.mailing_address.clone(),
                ssn_last_four: record.ssn_last_four(),
                bureau: record.bureau,
                furnisher_name: record.furnisher_name.clone(),
                furnisher_address: record.furnisher_address.clone(),
                account_number: record.account_number.clone(),
                dispute_type,
                dispute_reason: result.dispute_reasons().join("\n"),
                status: DisputeStatus::Pending,
                stage: EnforcementStage::DisputePreparation,
                priority,
                success_probability,
                violations: result.violations,
                letters: Vec::new(),
                audit: Vec::new(),
                stage_history: vec![StageTransition {
                    stage: EnforcementStage::DisputePreparation,
                    entered_on: today,
                }],
                follow_up_due: None,
                version: 0,
                created_on: today,
                updated_on: today,
            };

            disputes.push(self.repository.insert_dispute(dispute)?);
        }

        let workflow = EnforcementWorkflow {
            id: workflow_id,
            client_id: client.id.clone(),
            status: if disputes.is_empty() {
                WorkflowStatus::Completed
            } else {
                WorkflowStatus::Active
            },
            current_stage: EnforcementStage::CreditAnalysis,
            total_items: disputes.len(),
            estimated_completion: today + Duration::days(self.config.estimated_completion_days),
            created_on: today,
        };
        let workflow = self.repository.insert_workflow(workflow)?;

        info!(
            workflow = %workflow.id,
            client = %client.id,
            disputes = disputes.len(),
            "enforcement workflow initialized"
        );

        Ok(WorkflowIntake { workflow, disputes })
    }

    /// Advance a dispute to the immediately following stage, composing and
    /// sending the stage's letter. A failed send leaves the dispute at its
    /// current stage with the letter flagged for retry.
    pub fn advance_to_stage(
        &self,
        dispute_id: &DisputeId,
        next_stage: EnforcementStage,
        method: DeliveryMethod,
        today: NaiveDate,
    ) -> Result<Dispute, EnforcementError> {
        let dispute = self.fetch_required(dispute_id)?;
        self.submit_stage(dispute, next_stage, method, today)
    }

    /// Ingest a bureau or furnisher response. Deletion or correction resolves
    /// the dispute; verification escalates to the next remediation stage or
    /// rejects once stages are exhausted. Every response lands in the audit
    /// trail.
    pub fn process_response(
        &self,
        dispute_id: &DisputeId,
        response: DisputeResponse,
        today: NaiveDate,
    ) -> Result<Dispute, EnforcementError> {
        let mut dispute = self.fetch_required(dispute_id)?;
        if dispute.is_terminal() {
            return Err(TransitionError::Terminal {
                dispute: dispute.id,
                status: dispute.status,
            }
            .into());
        }

        dispute.audit.push(AuditEntry {
            recorded_on: today,
            event: AuditEvent::ResponseReceived,
            note: format!("{} response received", response.outcome.label()),
            metadata: response.metadata.clone(),
        });

        match response.outcome {
            ResponseOutcome::Deleted | ResponseOutcome::Corrected => {
                if !dispute.has_sent_letter() {
                    return Err(TransitionError::ResolutionWithoutLetter {
                        dispute: dispute.id,
                    }
                    .into());
                }

                dispute.status = DisputeStatus::Resolved;
                dispute.follow_up_due = None;
                dispute.updated_on = today;
                dispute.audit.push(AuditEntry {
                    recorded_on: today,
                    event: AuditEvent::Resolved,
                    note: format!("item {} by recipient", response.outcome.label()),
                    metadata: None,
                });
                self.persist(&dispute)?;
                self.refresh_workflow_completion(&dispute.workflow_id)?;

                info!(dispute = %dispute.id, "dispute resolved");
                Ok(dispute)
            }
            ResponseOutcome::Acknowledged => {
                if dispute.status == DisputeStatus::Submitted {
                    dispute.status = DisputeStatus::Investigating;
                }
                dispute.updated_on = today;
                self.persist(&dispute)?;
                Ok(dispute)
            }
            ResponseOutcome::Verified => self.escalate_or_reject(dispute, today),
        }
    }

    /// Idempotent sweep over disputes whose follow-up deadline has elapsed.
    /// Silence past the statutory window is treated like a verified response.
    /// Per-dispute failures are collected, not fatal to the sweep.
    pub fn process_due_follow_ups(
        &self,
        today: NaiveDate,
    ) -> Result<FollowUpSweep, EnforcementError> {
        let due = self.repository.follow_ups_due(today)?;
        let mut advanced = Vec::new();
        let mut failures = Vec::new();

        for mut dispute in due {
            if dispute.is_terminal() {
                continue;
            }
            let Some(deadline) = dispute.follow_up_due else {
                continue;
            };
            if deadline > today {
                continue;
            }

            let dispute_id = dispute.id.clone();
            dispute.audit.push(AuditEntry {
                recorded_on: today,
                event: AuditEvent::FollowUpElapsed,
                note: format!(
                    "no response within {} days of submission",
                    self.config.follow_up_window_days
                ),
                metadata: None,
            });

            match self.escalate_or_reject(dispute, today) {
                Ok(dispute) => advanced.push(dispute),
                Err(error) => {
                    warn!(dispute = %dispute_id, %error, "follow-up escalation failed");
                    failures.push(FollowUpFailure {
                        dispute_id,
                        error: error.to_string(),
                    });
                }
            }
        }

        Ok(FollowUpSweep { advanced, failures })
    }

    /// Re-attempt a failed send. On success the stage transition the failed
    /// send blocked is applied; the letter body is never regenerated.
    pub fn retry_letter(
        &self,
        dispute_id: &DisputeId,
        letter_id: &LetterId,
        method: DeliveryMethod,
        today: NaiveDate,
    ) -> Result<Dispute, EnforcementError> {
        let mut dispute = self.fetch_required(dispute_id)?;
        if dispute.is_terminal() {
            return Err(TransitionError::Terminal {
                dispute: dispute.id,
                status: dispute.status,
            }
            .into());
        }

        let index = dispute
            .letters
            .iter()
            .position(|letter| &letter.id == letter_id)
            .ok_or(LookupError::LetterNotFound(letter_id.clone()))?;
        if dispute.letters[index].status != LetterStatus::Failed {
            return Err(TransitionError::NotRetryable {
                letter: letter_id.clone(),
            }
            .into());
        }

        match self.delivery.send(&dispute.letters[index], method) {
            Ok(receipt) => {
                let stage = dispute.letters[index].stage;
                let letter = &mut dispute.letters[index];
                letter.status = LetterStatus::Sent;
                letter.sent_on = Some(today);
                letter.delivery_id = Some(receipt.delivery_id);
                letter.estimated_delivery = Some(receipt.estimated_delivery);

                dispute.audit.push(AuditEntry {
                    recorded_on: today,
                    event: AuditEvent::LetterSent,
                    note: format!("letter {letter_id} sent on retry via {}", method.label()),
                    metadata: None,
                });

                if dispute.stage < stage {
                    self.record_submission(&mut dispute, stage, today);
                } else {
                    dispute.updated_on = today;
                }

                self.persist(&dispute)?;
                self.bump_workflow_stage(&dispute.workflow_id, stage)?;
                Ok(dispute)
            }
            Err(error) => {
                dispute.audit.push(AuditEntry {
                    recorded_on: today,
                    event: AuditEvent::LetterFailed,
                    note: format!("retry failed: {error}"),
                    metadata: None,
                });
                dispute.updated_on = today;
                self.persist(&dispute)?;
                Err(EnforcementError::Delivery(error))
            }
        }
    }

    /// Record carrier confirmation for a sent letter. Allowed after the
    /// dispute settles since confirmations can trail resolution.
    pub fn confirm_delivery(
        &self,
        dispute_id: &DisputeId,
        letter_id: &LetterId,
        today: NaiveDate,
    ) -> Result<Dispute, EnforcementError> {
        let mut dispute = self.fetch_required(dispute_id)?;

        let index = dispute
            .letters
            .iter()
            .position(|letter| &letter.id == letter_id)
            .ok_or(LookupError::LetterNotFound(letter_id.clone()))?;
        if dispute.letters[index].status != LetterStatus::Sent {
            return Err(TransitionError::NotSent {
                letter: letter_id.clone(),
            }
            .into());
        }

        dispute.letters[index].status = LetterStatus::Delivered;
        dispute.audit.push(AuditEntry {
            recorded_on: today,
            event: AuditEvent::LetterDelivered,
            note: format!("letter {letter_id} confirmed delivered"),
            metadata: None,
        });
        dispute.updated_on = today;
        self.persist(&dispute)?;
        Ok(dispute)
    }

    /// Reporting view over a workflow and its disputes.
    pub fn workflow_status(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<WorkflowStatusView, EnforcementError> {
        let workflow = self
            .repository
            .fetch_workflow(workflow_id)?
            .ok_or(RepositoryError::NotFound)?;
        let disputes = self.repository.disputes_for_workflow(workflow_id)?;

        let total = disputes.len();
        let resolved = disputes
            .iter()
            .filter(|dispute| dispute.status == DisputeStatus::Resolved)
            .count();
        let rejected = disputes
            .iter()
            .filter(|dispute| dispute.status == DisputeStatus::Rejected)
            .count();
        let pending = disputes
            .iter()
            .filter(|dispute| dispute.status == DisputeStatus::Pending)
            .count();
        let progress_percentage = if total > 0 {
            (resolved * 100 / total) as u8
        } else {
            0
        };
        let average_success_probability = if total > 0 {
            let sum: f32 = disputes
                .iter()
                .map(|dispute| dispute.success_probability)
                .sum();
            Some(sum / total as f32)
        } else {
            None
        };

        Ok(WorkflowStatusView {
            workflow_id: workflow.id.clone(),
            client_id: workflow.client_id.clone(),
            status: workflow.status,
            current_stage: workflow.current_stage,
            current_stage_label: workflow.current_stage.label().to_string(),
            total_disputes: total,
            resolved_disputes: resolved,
            rejected_disputes: rejected,
            pending_disputes: pending,
            open_disputes: total - resolved - rejected,
            progress_percentage,
            average_success_probability,
            estimated_completion: workflow.estimated_completion,
        })
    }

    fn fetch_required(&self, dispute_id: &DisputeId) -> Result<Dispute, EnforcementError> {
        Ok(self
            .repository
            .fetch_dispute(dispute_id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    /// Shared transition path: validate the target stage, compose the stage
    /// letter, attempt delivery, and either commit the advance or persist the
    /// failed letter without moving the dispute.
    fn submit_stage(
        &self,
        mut dispute: Dispute,
        next_stage: EnforcementStage,
        method: DeliveryMethod,
        today: NaiveDate,
    ) -> Result<Dispute, EnforcementError> {
        if dispute.is_terminal() {
            return Err(TransitionError::Terminal {
                dispute: dispute.id,
                status: dispute.status,
            }
            .into());
        }

        let expected = dispute
            .stage
            .next()
            .ok_or_else(|| TransitionError::NoFurtherStage {
                dispute: dispute.id.clone(),
                stage: dispute.stage,
            })?;
        if next_stage != expected {
            return Err(TransitionError::StageSkip {
                dispute: dispute.id,
                from: dispute.stage,
                to: next_stage,
            }
            .into());
        }

        let kind = next_stage
            .letter_kind()
            .ok_or(LookupError::StageWithoutLetter(next_stage))?;
        let composed = self
            .composer
            .compose(&dispute, kind, today)
            .map_err(|error| match error {
                ComposeError::Lookup(inner) => EnforcementError::Lookup(inner),
                other => EnforcementError::Compose(other),
            })?;

        let mut letter = Letter {
            id: next_letter_id(),
            dispute_id: dispute.id.clone(),
            stage: next_stage,
            kind,
            subject: composed.subject,
            body: composed.body,
            recipient: composed.recipient,
            recipient_address: composed.recipient_address,
            status: LetterStatus::Generated,
            created_on: today,
            sent_on: None,
            delivery_id: None,
            estimated_delivery: None,
        };
        dispute.audit.push(AuditEntry {
            recorded_on: today,
            event: AuditEvent::LetterGenerated,
            note: format!(
                "{} letter generated for '{}'",
                kind.label(),
                next_stage.label()
            ),
            metadata: None,
        });

        match self.delivery.send(&letter, method) {
            Ok(receipt) => {
                letter.status = LetterStatus::Sent;
                letter.sent_on = Some(today);
                letter.delivery_id = Some(receipt.delivery_id);
                letter.estimated_delivery = Some(receipt.estimated_delivery);
                let letter_id = letter.id.clone();
                dispute.letters.push(letter);

                dispute.audit.push(AuditEntry {
                    recorded_on: today,
                    event: AuditEvent::LetterSent,
                    note: format!("letter {letter_id} sent via {}", method.label()),
                    metadata: None,
                });
                self.record_submission(&mut dispute, next_stage, today);

                self.persist(&dispute)?;
                self.bump_workflow_stage(&dispute.workflow_id, next_stage)?;

                info!(
                    dispute = %dispute.id,
                    stage = next_stage.label(),
                    "dispute advanced"
                );
                Ok(dispute)
            }
            Err(error) => {
                warn!(
                    dispute = %dispute.id,
                    stage = next_stage.label(),
                    %error,
                    "letter delivery failed, dispute stays at current stage"
                );
                letter.status = LetterStatus::Failed;
                dispute.letters.push(letter);
                dispute.audit.push(AuditEntry {
                    recorded_on: today,
                    event: AuditEvent::LetterFailed,
                    note: format!("delivery failed: {error}"),
                    metadata: None,
                });
                dispute.updated_on = today;
                self.persist(&dispute)?;
                Err(EnforcementError::Delivery(error))
            }
        }
    }

    /// Commit the bookkeeping of a successful submission: stage pointer,
    /// status, history, and the statutory follow-up deadline.
    fn record_submission(&self, dispute: &mut Dispute, stage: EnforcementStage, today: NaiveDate) {
        dispute.stage = stage;
        dispute.status = DisputeStatus::Submitted;
        dispute.stage_history.push(StageTransition {
            stage,
            entered_on: today,
        });
        dispute.follow_up_due = stage
            .tracks_follow_up()
            .then(|| today + Duration::days(self.config.follow_up_window_days));
        dispute.updated_on = today;
        dispute.audit.push(AuditEntry {
            recorded_on: today,
            event: AuditEvent::StageAdvanced,
            note: format!("advanced to '{}'", stage.label()),
            metadata: None,
        });
    }

    /// A verified response or an elapsed follow-up: advance to the next
    /// remediation stage when one exists, otherwise reject as exhausted.
    fn escalate_or_reject(
        &self,
        mut dispute: Dispute,
        today: NaiveDate,
    ) -> Result<Dispute, EnforcementError> {
        let next = dispute
            .stage
            .next()
            .filter(|stage| stage.is_remediation() && stage.letter_kind().is_some());

        match next {
            Some(stage) => {
                self.submit_stage(dispute, stage, self.config.default_delivery_method, today)
            }
            None => {
                dispute.status = DisputeStatus::Rejected;
                dispute.follow_up_due = None;
                dispute.updated_on = today;
                dispute.audit.push(AuditEntry {
                    recorded_on: today,
                    event: AuditEvent::Rejected,
                    note: "enforcement stages exhausted without resolution".to_string(),
                    metadata: None,
                });
                self.persist(&dispute)?;
                self.refresh_workflow_completion(&dispute.workflow_id)?;

                info!(dispute = %dispute.id, "dispute rejected after final stage");
                Ok(dispute)
            }
        }
    }

    fn persist(&self, dispute: &Dispute) -> Result<(), EnforcementError> {
        self.repository
            .update_dispute(dispute.clone())
            .map_err(|error| match error {
                RepositoryError::Conflict => TransitionError::Concurrent {
                    dispute: dispute.id.clone(),
                }
                .into(),
                other => EnforcementError::Repository(other),
            })
    }

    /// Keep the workflow's reporting pointer at the furthest stage any owned
    /// dispute reached.
    fn bump_workflow_stage(
        &self,
        workflow_id: &WorkflowId,
        stage: EnforcementStage,
    ) -> Result<(), EnforcementError> {
        if let Some(mut workflow) = self.repository.fetch_workflow(workflow_id)? {
            if stage > workflow.current_stage {
                workflow.current_stage = stage;
                self.repository.update_workflow(workflow)?;
            }
        }
        Ok(())
    }

    fn refresh_workflow_completion(
        &self,
        workflow_id: &WorkflowId,
    ) -> Result<(), EnforcementError> {
        let disputes = self.repository.disputes_for_workflow(workflow_id)?;
        if disputes.is_empty() || !disputes.iter().all(Dispute::is_terminal) {
            return Ok(());
        }

        if let Some(mut workflow) = self.repository.fetch_workflow(workflow_id)? {
            if workflow.status != WorkflowStatus::Completed {
                workflow.status = WorkflowStatus::Completed;
                self.repository.update_workflow(workflow)?;
                info!(workflow = %workflow_id, "enforcement workflow completed");
            }
        }
        Ok(())
    }
}
