use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate};

use crate::workflows::enforcement::collaborators::{
    DeliveryError, DeliveryMethod, DeliveryReceipt, DisputeFeatures, EnhancementContext,
    EnhancerError, EstimatorError, LetterDeliverer, LetterEnhancer, SuccessEstimator,
};
use crate::workflows::enforcement::domain::{
    Bureau, ClientId, ClientProfile, Dispute, DisputeId, DisputeStatus, DisputeType,
    EnforcementStage, EnforcementWorkflow, Letter, LetterId, LetterKind, LetterStatus,
    StageTransition, WorkflowId,
};
use crate::workflows::enforcement::letters::LetterComposer;
use crate::workflows::enforcement::repository::{DisputeRepository, RepositoryError};
use crate::workflows::enforcement::service::EnforcementService;
use crate::workflows::enforcement::tradeline::TradelineRecord;
use crate::workflows::enforcement::EngineConfig;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date")
}

pub(super) fn client() -> ClientProfile {
    ClientProfile {
        id: ClientId("cli-100".to_string()),
        first_name: "Alex".to_string(),
        last_name: "Jordan".to_string(),
        mailing_address: "742 Maple Ave\nDes Moines, IA 50309".to_string(),
    }
}

/// A record that passes every check.
pub(super) fn clean_record() -> TradelineRecord {
    TradelineRecord {
        consumer_id: "cli-100".to_string(),
        bureau: Bureau::Experian,
        furnisher_name: "Capital Finance".to_string(),
        furnisher_address: "Capital Finance\nP.O. Box 100\nDallas, TX 75201".to_string(),
        account_number: "ACCT1001".to_string(),
        portfolio_type: "R".to_string(),
        account_type: "01".to_string(),
        date_opened: "2020-03-01".to_string(),
        credit_limit: Some("5000".to_string()),
        highest_credit: Some("4200".to_string()),
        account_status: "13".to_string(),
        payment_rating: "1".to_string(),
        payment_history_profile: Some("111111111111111111111111".to_string()),
        current_balance: Some("1200".to_string()),
        amount_past_due: Some("0".to_string()),
        date_reported: "2025-06-01".to_string(),
        date_of_first_delinquency: None,
        date_closed: None,
        date_of_last_payment: Some("2025-05-15".to_string()),
        surname: "Jordan".to_string(),
        first_name: "Alex".to_string(),
        ssn: "123456789".to_string(),
        date_of_birth: Some("1988-07-04".to_string()),
        telephone_number: Some("5155550147".to_string()),
        ecoa_code: "1".to_string(),
        address1: "742 Maple Ave".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip_code: "50309".to_string(),
    }
}

/// Clean record except the opening date sits in the future. Exactly one
/// violation.
pub(super) fn future_open_record() -> TradelineRecord {
    let mut record = clean_record();
    record.date_opened = "2030-01-01".to_string();
    record.date_of_last_payment = None;
    record
}

/// Charged-off status paired with a pays-as-agreed rating. Exactly one
/// violation.
pub(super) fn charged_off_record() -> TradelineRecord {
    let mut record = clean_record();
    record.account_status = "89".to_string();
    record.payment_rating = "1".to_string();
    record
}

static TEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Dispute built directly at a chosen stage and status, bypassing intake.
pub(super) fn dispute_at(stage: EnforcementStage, status: DisputeStatus) -> Dispute {
    let id = TEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    Dispute {
        id: DisputeId(format!("dsp-t{id:03}")),
        workflow_id: WorkflowId("wfl-t001".to_string()),
        client_id: ClientId("cli-100".to_string()),
        client_name: "Alex Jordan".to_string(),
        client_address: "742 Maple Ave\nDes Moines, IA 50309".to_string(),
        ssn_last_four: "6789".to_string(),
        bureau: Bureau::Experian,
        furnisher_name: "Capital Finance".to_string(),
        furnisher_address: "Capital Finance\nP.O. Box 100\nDallas, TX 75201".to_string(),
        account_number: "ACCT1001".to_string(),
        dispute_type: DisputeType::NotMine,
        dispute_reason: "account does not belong to the consumer".to_string(),
        status,
        stage,
        priority: 10,
        success_probability: 0.7,
        violations: Vec::new(),
        letters: Vec::new(),
        audit: Vec::new(),
        stage_history: vec![StageTransition {
            stage,
            entered_on: today(),
        }],
        follow_up_due: None,
        version: 0,
        created_on: today(),
        updated_on: today(),
    }
}

/// A letter already accepted by the carrier, attached to prior-stage history.
pub(super) fn sent_letter(dispute_id: &DisputeId, stage: EnforcementStage, sent_on: NaiveDate) -> Letter {
    let id = TEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    Letter {
        id: LetterId(format!("ltr-t{id:03}")),
        dispute_id: dispute_id.clone(),
        stage,
        kind: stage.letter_kind().unwrap_or(LetterKind::Initial),
        subject: "Credit Report Dispute".to_string(),
        body: "previously generated body".to_string(),
        recipient: "Experian".to_string(),
        recipient_address: "Experian\nDispute Department\nP.O. Box 4500\nAllen, TX 75013"
            .to_string(),
        status: LetterStatus::Sent,
        created_on: sent_on,
        sent_on: Some(sent_on),
        delivery_id: Some(format!("mail-t{id:03}")),
        estimated_delivery: Some(sent_on + Duration::days(3)),
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    workflows: Mutex<HashMap<WorkflowId, EnforcementWorkflow>>,
    disputes: Mutex<HashMap<DisputeId, Dispute>>,
}

impl DisputeRepository for MemoryRepository {
    fn insert_workflow(
        &self,
        workflow: EnforcementWorkflow,
    ) -> Result<EnforcementWorkflow, RepositoryError> {
        let mut guard = self.workflows.lock().expect("workflow mutex poisoned");
        if guard.contains_key(&workflow.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(workflow.id.clone(), workflow.clone());
        Ok(workflow)
    }

    fn update_workflow(&self, workflow: EnforcementWorkflow) -> Result<(), RepositoryError> {
        let mut guard = self.workflows.lock().expect("workflow mutex poisoned");
        guard.insert(workflow.id.clone(), workflow);
        Ok(())
    }

    fn fetch_workflow(
        &self,
        id: &WorkflowId,
    ) -> Result<Option<EnforcementWorkflow>, RepositoryError> {
        let guard = self.workflows.lock().expect("workflow mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn insert_dispute(&self, dispute: Dispute) -> Result<Dispute, RepositoryError> {
        let mut guard = self.disputes.lock().expect("dispute mutex poisoned");
        if guard.contains_key(&dispute.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(dispute.id.clone(), dispute.clone());
        Ok(dispute)
    }

    fn update_dispute(&self, mut dispute: Dispute) -> Result<(), RepositoryError> {
        let mut guard = self.disputes.lock().expect("dispute mutex poisoned");
        let stored = guard.get(&dispute.id).ok_or(RepositoryError::NotFound)?;
        if stored.version != dispute.version {
            return Err(RepositoryError::Conflict);
        }
        dispute.version += 1;
        guard.insert(dispute.id.clone(), dispute);
        Ok(())
    }

    fn fetch_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>, RepositoryError> {
        let guard = self.disputes.lock().expect("dispute mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn disputes_for_workflow(&self, id: &WorkflowId) -> Result<Vec<Dispute>, RepositoryError> {
        let guard = self.disputes.lock().expect("dispute mutex poisoned");
        let mut disputes: Vec<Dispute> = guard
            .values()
            .filter(|dispute| &dispute.workflow_id == id)
            .cloned()
            .collect();
        disputes.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(disputes)
    }

    fn follow_ups_due(&self, today: NaiveDate) -> Result<Vec<Dispute>, RepositoryError> {
        let guard = self.disputes.lock().expect("dispute mutex poisoned");
        let mut disputes: Vec<Dispute> = guard
            .values()
            .filter(|dispute| {
                !dispute.is_terminal()
                    && dispute
                        .follow_up_due
                        .map(|deadline| deadline <= today)
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        disputes.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(disputes)
    }
}

/// Repository double whose dispute writes always conflict, simulating a
/// stale optimistic version.
#[derive(Default)]
pub(super) struct StaleRepository {
    inner: MemoryRepository,
}

impl StaleRepository {
    pub(super) fn seed(&self, dispute: Dispute) {
        self.inner
            .insert_dispute(dispute)
            .expect("seed dispute inserts");
    }
}

impl DisputeRepository for StaleRepository {
    fn insert_workflow(
        &self,
        workflow: EnforcementWorkflow,
    ) -> Result<EnforcementWorkflow, RepositoryError> {
        self.inner.insert_workflow(workflow)
    }

    fn update_workflow(&self, workflow: EnforcementWorkflow) -> Result<(), RepositoryError> {
        self.inner.update_workflow(workflow)
    }

    fn fetch_workflow(
        &self,
        id: &WorkflowId,
    ) -> Result<Option<EnforcementWorkflow>, RepositoryError> {
        self.inner.fetch_workflow(id)
    }

    fn insert_dispute(&self, dispute: Dispute) -> Result<Dispute, RepositoryError> {
        self.inner.insert_dispute(dispute)
    }

    fn update_dispute(&self, _dispute: Dispute) -> Result<(), RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch_dispute(&self, id: &DisputeId) -> Result<Option<Dispute>, RepositoryError> {
        self.inner.fetch_dispute(id)
    }

    fn disputes_for_workflow(&self, id: &WorkflowId) -> Result<Vec<Dispute>, RepositoryError> {
        self.inner.disputes_for_workflow(id)
    }

    fn follow_ups_due(&self, today: NaiveDate) -> Result<Vec<Dispute>, RepositoryError> {
        self.inner.follow_ups_due(today)
    }
}

/// Delivery double recording accepted letters, with a failure toggle.
#[derive(Default)]
pub(super) struct RecordingDeliverer {
    fail: Mutex<bool>,
    sent: Mutex<Vec<(LetterId, DeliveryMethod)>>,
    counter: AtomicU64,
}

impl RecordingDeliverer {
    pub(super) fn set_failing(&self, failing: bool) {
        *self.fail.lock().expect("fail mutex poisoned") = failing;
    }

    pub(super) fn sent(&self) -> Vec<(LetterId, DeliveryMethod)> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }
}

impl LetterDeliverer for RecordingDeliverer {
    fn send(
        &self,
        letter: &Letter,
        method: DeliveryMethod,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        if *self.fail.lock().expect("fail mutex poisoned") {
            return Err(DeliveryError::Transport("carrier offline".to_string()));
        }
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push((letter.id.clone(), method));
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(DeliveryReceipt {
            delivery_id: format!("dlv-{id:04}"),
            method,
            estimated_delivery: letter.created_on + Duration::days(3),
        })
    }
}

/// Estimator double returning a fixed probability or a hard failure.
pub(super) struct FixedEstimator {
    value: Option<f32>,
}

impl FixedEstimator {
    pub(super) fn ok(value: f32) -> Self {
        Self { value: Some(value) }
    }

    pub(super) fn failing() -> Self {
        Self { value: None }
    }
}

impl SuccessEstimator for FixedEstimator {
    fn estimate(&self, _features: &DisputeFeatures) -> Result<f32, EstimatorError> {
        self.value
            .ok_or_else(|| EstimatorError::Unavailable("scoring model offline".to_string()))
    }
}

/// Enhancer double appending a closing paragraph.
pub(super) struct AppendingEnhancer;

impl LetterEnhancer for AppendingEnhancer {
    fn enhance(&self, draft: &str, _context: &EnhancementContext) -> Result<String, EnhancerError> {
        Ok(format!("{draft}\n\nPlease treat this matter with urgency."))
    }
}

/// Enhancer double returning a degenerate short text.
pub(super) struct TruncatingEnhancer;

impl LetterEnhancer for TruncatingEnhancer {
    fn enhance(&self, _draft: &str, _context: &EnhancementContext) -> Result<String, EnhancerError> {
        Ok("ok".to_string())
    }
}

/// Enhancer double that always errors.
pub(super) struct FailingEnhancer;

impl LetterEnhancer for FailingEnhancer {
    fn enhance(&self, _draft: &str, _context: &EnhancementContext) -> Result<String, EnhancerError> {
        Err(EnhancerError::Unavailable("model timed out".to_string()))
    }
}

pub(super) type TestService = EnforcementService<MemoryRepository, RecordingDeliverer, FixedEstimator>;

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>, Arc<RecordingDeliverer>) {
    let repository = Arc::new(MemoryRepository::default());
    let delivery = Arc::new(RecordingDeliverer::default());
    let estimator = Arc::new(FixedEstimator::ok(0.72));
    let service = EnforcementService::new(
        repository.clone(),
        delivery.clone(),
        estimator,
        LetterComposer::standard(),
        EngineConfig::default(),
    );
    (service, repository, delivery)
}
