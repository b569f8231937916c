use std::sync::Arc;

use chrono::Duration;

use super::common::{
    build_service, charged_off_record, clean_record, client, dispute_at, future_open_record,
    sent_letter, today, FixedEstimator, MemoryRepository, RecordingDeliverer, StaleRepository,
};
use crate::workflows::enforcement::collaborators::DeliveryMethod;
use crate::workflows::enforcement::domain::{
    AuditEvent, DisputeResponse, DisputeStatus, EnforcementStage, LetterStatus, ResponseOutcome,
    WorkflowStatus,
};
use crate::workflows::enforcement::letters::LetterComposer;
use crate::workflows::enforcement::repository::DisputeRepository;
use crate::workflows::enforcement::service::{
    EnforcementError, EnforcementService, TransitionError,
};
use crate::workflows::enforcement::EngineConfig;

fn verified() -> DisputeResponse {
    DisputeResponse {
        outcome: ResponseOutcome::Verified,
        metadata: None,
    }
}

fn deleted() -> DisputeResponse {
    DisputeResponse {
        outcome: ResponseOutcome::Deleted,
        metadata: None,
    }
}

#[test]
fn initialize_opens_disputes_only_for_violating_tradelines() {
    let (service, repository, _delivery) = build_service();

    let intake = service
        .initialize(
            &client(),
            &[clean_record(), future_open_record()],
            today(),
        )
        .expect("intake succeeds");

    assert_eq!(intake.disputes.len(), 1);
    assert_eq!(intake.workflow.total_items, 1);
    assert_eq!(intake.workflow.status, WorkflowStatus::Active);
    assert_eq!(
        intake.workflow.estimated_completion,
        today() + Duration::days(120)
    );

    let dispute = &intake.disputes[0];
    assert_eq!(dispute.stage, EnforcementStage::DisputePreparation);
    assert_eq!(dispute.status, DisputeStatus::Pending);
    assert!(dispute.priority > 0);
    assert!((dispute.success_probability - 0.72).abs() < f32::EPSILON);
    assert!(!dispute.dispute_reason.is_empty());

    let stored = repository
        .fetch_dispute(&dispute.id)
        .expect("fetch succeeds")
        .expect("dispute persisted");
    assert_eq!(stored.status, DisputeStatus::Pending);
}

#[test]
fn initialize_assumes_neutral_probability_when_estimator_fails() {
    let repository = Arc::new(MemoryRepository::default());
    let delivery = Arc::new(RecordingDeliverer::default());
    let estimator = Arc::new(FixedEstimator::failing());
    let service = EnforcementService::new(
        repository,
        delivery,
        estimator,
        LetterComposer::standard(),
        EngineConfig::default(),
    );

    let intake = service
        .initialize(&client(), &[charged_off_record()], today())
        .expect("intake succeeds despite estimator outage");

    assert!((intake.disputes[0].success_probability - 0.5).abs() < f32::EPSILON);
}

#[test]
fn advance_sends_letter_and_schedules_follow_up() {
    let (service, repository, delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::DisputePreparation,
            DisputeStatus::Pending,
        ))
        .expect("seed dispute");

    let advanced = service
        .advance_to_stage(
            &dispute.id,
            EnforcementStage::BureauDispute,
            DeliveryMethod::Mail,
            today(),
        )
        .expect("advance succeeds");

    assert_eq!(advanced.stage, EnforcementStage::BureauDispute);
    assert_eq!(advanced.status, DisputeStatus::Submitted);
    assert_eq!(advanced.follow_up_due, Some(today() + Duration::days(30)));
    assert_eq!(advanced.letters.len(), 1);
    assert_eq!(advanced.letters[0].status, LetterStatus::Sent);
    assert_eq!(advanced.letters[0].stage, EnforcementStage::BureauDispute);
    assert_eq!(delivery.sent().len(), 1);
}

#[test]
fn advance_rejects_stage_skip() {
    let (service, repository, _delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::DisputePreparation,
            DisputeStatus::Pending,
        ))
        .expect("seed dispute");

    let error = service
        .advance_to_stage(
            &dispute.id,
            EnforcementStage::FurnisherDispute,
            DeliveryMethod::Mail,
            today(),
        )
        .expect_err("skip rejected");

    assert!(matches!(
        error,
        EnforcementError::Transition(TransitionError::StageSkip { .. })
    ));
}

#[test]
fn repeated_advance_is_rejected_not_repeated() {
    let (service, repository, delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::DisputePreparation,
            DisputeStatus::Pending,
        ))
        .expect("seed dispute");

    service
        .advance_to_stage(
            &dispute.id,
            EnforcementStage::BureauDispute,
            DeliveryMethod::Mail,
            today(),
        )
        .expect("first advance succeeds");
    let error = service
        .advance_to_stage(
            &dispute.id,
            EnforcementStage::BureauDispute,
            DeliveryMethod::Mail,
            today(),
        )
        .expect_err("second advance rejected");

    assert!(matches!(
        error,
        EnforcementError::Transition(TransitionError::StageSkip { .. })
    ));
    assert_eq!(delivery.sent().len(), 1, "no duplicate letter sent");
}

#[test]
fn terminal_dispute_accepts_no_transitions() {
    let (service, repository, _delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::BureauDispute,
            DisputeStatus::Resolved,
        ))
        .expect("seed dispute");

    let error = service
        .advance_to_stage(
            &dispute.id,
            EnforcementStage::FurnisherDispute,
            DeliveryMethod::Mail,
            today(),
        )
        .expect_err("terminal dispute rejected");
    assert!(matches!(
        error,
        EnforcementError::Transition(TransitionError::Terminal { .. })
    ));

    let error = service
        .process_response(&dispute.id, verified(), today())
        .expect_err("response on terminal dispute rejected");
    assert!(matches!(
        error,
        EnforcementError::Transition(TransitionError::Terminal { .. })
    ));
}

#[test]
fn failed_delivery_leaves_dispute_stuck_with_failed_letter() {
    let (service, repository, delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::DisputePreparation,
            DisputeStatus::Pending,
        ))
        .expect("seed dispute");

    delivery.set_failing(true);
    let error = service
        .advance_to_stage(
            &dispute.id,
            EnforcementStage::BureauDispute,
            DeliveryMethod::Mail,
            today(),
        )
        .expect_err("send failure aborts the transition");
    assert!(matches!(error, EnforcementError::Delivery(_)));

    let stored = repository
        .fetch_dispute(&dispute.id)
        .expect("fetch succeeds")
        .expect("dispute present");
    assert_eq!(stored.stage, EnforcementStage::DisputePreparation);
    assert_eq!(stored.status, DisputeStatus::Pending);
    assert_eq!(stored.letters.len(), 1);
    assert_eq!(stored.letters[0].status, LetterStatus::Failed);
    assert!(stored
        .audit
        .iter()
        .any(|entry| entry.event == AuditEvent::LetterFailed));
}

#[test]
fn retry_applies_the_blocked_transition() {
    let (service, repository, delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::DisputePreparation,
            DisputeStatus::Pending,
        ))
        .expect("seed dispute");

    delivery.set_failing(true);
    service
        .advance_to_stage(
            &dispute.id,
            EnforcementStage::BureauDispute,
            DeliveryMethod::Mail,
            today(),
        )
        .expect_err("send fails");

    let stored = repository
        .fetch_dispute(&dispute.id)
        .expect("fetch succeeds")
        .expect("dispute present");
    let failed_letter = stored.letters[0].id.clone();

    delivery.set_failing(false);
    let retried = service
        .retry_letter(&dispute.id, &failed_letter, DeliveryMethod::Fax, today())
        .expect("retry succeeds");

    assert_eq!(retried.stage, EnforcementStage::BureauDispute);
    assert_eq!(retried.status, DisputeStatus::Submitted);
    assert_eq!(retried.letters[0].status, LetterStatus::Sent);
    assert_eq!(retried.follow_up_due, Some(today() + Duration::days(30)));
    assert_eq!(retried.letters.len(), 1, "retry never regenerates the body");
}

#[test]
fn retry_rejects_letters_that_did_not_fail() {
    let (service, repository, _delivery) = build_service();
    let mut dispute = dispute_at(EnforcementStage::BureauDispute, DisputeStatus::Submitted);
    let letter = sent_letter(&dispute.id, EnforcementStage::BureauDispute, today());
    let letter_id = letter.id.clone();
    dispute.letters.push(letter);
    let dispute = repository.insert_dispute(dispute).expect("seed dispute");

    let error = service
        .retry_letter(&dispute.id, &letter_id, DeliveryMethod::Mail, today())
        .expect_err("sent letter is not retryable");
    assert!(matches!(
        error,
        EnforcementError::Transition(TransitionError::NotRetryable { .. })
    ));
}

#[test]
fn verified_response_escalates_to_next_stage() {
    let (service, repository, _delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::BureauDispute,
            DisputeStatus::Pending,
        ))
        .expect("seed dispute");

    let updated = service
        .process_response(&dispute.id, verified(), today())
        .expect("verified response processed");

    assert_eq!(updated.stage, EnforcementStage::FurnisherDispute);
    assert_eq!(updated.status, DisputeStatus::Submitted);
    assert!(updated
        .letter_for_stage(EnforcementStage::FurnisherDispute)
        .is_some());
    assert!(updated
        .audit
        .iter()
        .any(|entry| entry.event == AuditEvent::ResponseReceived));
}

#[test]
fn deleted_response_resolves_without_new_letters() {
    let (service, repository, _delivery) = build_service();
    let mut dispute = dispute_at(EnforcementStage::BureauDispute, DisputeStatus::Submitted);
    dispute
        .letters
        .push(sent_letter(&dispute.id, EnforcementStage::BureauDispute, today()));
    let dispute = repository.insert_dispute(dispute).expect("seed dispute");

    let updated = service
        .process_response(&dispute.id, deleted(), today())
        .expect("deleted response processed");

    assert_eq!(updated.status, DisputeStatus::Resolved);
    assert_eq!(updated.stage, EnforcementStage::BureauDispute);
    assert_eq!(updated.letters.len(), 1, "no further letters generated");
    assert_eq!(updated.follow_up_due, None);
}

#[test]
fn resolution_requires_a_sent_letter() {
    let (service, repository, _delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::BureauDispute,
            DisputeStatus::Submitted,
        ))
        .expect("seed dispute");

    let error = service
        .process_response(&dispute.id, deleted(), today())
        .expect_err("resolution without correspondence rejected");
    assert!(matches!(
        error,
        EnforcementError::Transition(TransitionError::ResolutionWithoutLetter { .. })
    ));
}

#[test]
fn verified_at_final_remediation_stage_rejects_dispute() {
    let (service, repository, _delivery) = build_service();
    let mut dispute = dispute_at(EnforcementStage::LegalEscalation, DisputeStatus::Submitted);
    dispute
        .letters
        .push(sent_letter(&dispute.id, EnforcementStage::LegalEscalation, today()));
    let dispute = repository.insert_dispute(dispute).expect("seed dispute");

    let updated = service
        .process_response(&dispute.id, verified(), today())
        .expect("verified response processed");

    assert_eq!(updated.status, DisputeStatus::Rejected);
    assert_eq!(updated.stage, EnforcementStage::LegalEscalation);
    assert!(updated
        .audit
        .iter()
        .any(|entry| entry.event == AuditEvent::Rejected));
}

#[test]
fn acknowledgment_moves_submitted_dispute_to_investigating() {
    let (service, repository, _delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::BureauDispute,
            DisputeStatus::Submitted,
        ))
        .expect("seed dispute");

    let updated = service
        .process_response(
            &dispute.id,
            DisputeResponse {
                outcome: ResponseOutcome::Acknowledged,
                metadata: None,
            },
            today(),
        )
        .expect("acknowledgment processed");

    assert_eq!(updated.status, DisputeStatus::Investigating);
    assert_eq!(updated.stage, EnforcementStage::BureauDispute);
}

#[test]
fn follow_up_sweep_escalates_silent_disputes_once() {
    let (service, repository, _delivery) = build_service();
    let mut dispute = dispute_at(EnforcementStage::BureauDispute, DisputeStatus::Submitted);
    dispute.follow_up_due = Some(today() - Duration::days(1));
    repository.insert_dispute(dispute).expect("seed dispute");

    let sweep = service
        .process_due_follow_ups(today())
        .expect("sweep succeeds");

    assert_eq!(sweep.advanced.len(), 1);
    assert!(sweep.failures.is_empty());
    let advanced = &sweep.advanced[0];
    assert_eq!(advanced.stage, EnforcementStage::FurnisherDispute);
    assert_eq!(advanced.follow_up_due, Some(today() + Duration::days(30)));
    assert!(advanced
        .audit
        .iter()
        .any(|entry| entry.event == AuditEvent::FollowUpElapsed));

    let second = service
        .process_due_follow_ups(today())
        .expect("second sweep succeeds");
    assert!(second.advanced.is_empty(), "sweep is idempotent");
}

#[test]
fn follow_up_sweep_collects_delivery_failures() {
    let (service, repository, delivery) = build_service();
    let mut dispute = dispute_at(EnforcementStage::BureauDispute, DisputeStatus::Submitted);
    dispute.follow_up_due = Some(today() - Duration::days(2));
    let dispute = repository.insert_dispute(dispute).expect("seed dispute");

    delivery.set_failing(true);
    let sweep = service
        .process_due_follow_ups(today())
        .expect("sweep itself succeeds");

    assert!(sweep.advanced.is_empty());
    assert_eq!(sweep.failures.len(), 1);
    assert_eq!(sweep.failures[0].dispute_id, dispute.id);

    let stored = repository
        .fetch_dispute(&dispute.id)
        .expect("fetch succeeds")
        .expect("dispute present");
    assert_eq!(stored.stage, EnforcementStage::BureauDispute, "no advance");
}

#[test]
fn concurrent_conflict_surfaces_as_transition_error() {
    let repository = Arc::new(StaleRepository::default());
    let delivery = Arc::new(RecordingDeliverer::default());
    let estimator = Arc::new(FixedEstimator::ok(0.6));
    let service = EnforcementService::new(
        repository.clone(),
        delivery,
        estimator,
        LetterComposer::standard(),
        EngineConfig::default(),
    );
    let dispute = dispute_at(EnforcementStage::DisputePreparation, DisputeStatus::Pending);
    let dispute_id = dispute.id.clone();
    repository.seed(dispute);

    let error = service
        .advance_to_stage(
            &dispute_id,
            EnforcementStage::BureauDispute,
            DeliveryMethod::Mail,
            today(),
        )
        .expect_err("stale write rejected");

    assert!(matches!(
        error,
        EnforcementError::Transition(TransitionError::Concurrent { .. })
    ));
}

#[test]
fn stage_history_is_monotonically_non_decreasing() {
    let (service, repository, _delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::DisputePreparation,
            DisputeStatus::Pending,
        ))
        .expect("seed dispute");

    service
        .advance_to_stage(
            &dispute.id,
            EnforcementStage::BureauDispute,
            DeliveryMethod::Mail,
            today(),
        )
        .expect("first advance");
    service
        .process_response(&dispute.id, verified(), today() + Duration::days(5))
        .expect("escalate");
    let updated = service
        .process_response(&dispute.id, verified(), today() + Duration::days(10))
        .expect("escalate again");

    assert_eq!(updated.stage, EnforcementStage::VerificationChallenge);
    let stages: Vec<_> = updated
        .stage_history
        .iter()
        .map(|transition| transition.stage)
        .collect();
    assert!(
        stages.windows(2).all(|pair| pair[0] <= pair[1]),
        "stage history regressed: {stages:?}"
    );
}

#[test]
fn workflow_status_reports_progress_and_completion() {
    let (service, repository, _delivery) = build_service();
    let intake = service
        .initialize(
            &client(),
            &[future_open_record(), charged_off_record()],
            today(),
        )
        .expect("intake succeeds");
    assert_eq!(intake.disputes.len(), 2);

    for dispute in &intake.disputes {
        service
            .advance_to_stage(
                &dispute.id,
                EnforcementStage::BureauDispute,
                DeliveryMethod::Mail,
                today(),
            )
            .expect("advance");
    }

    service
        .process_response(&intake.disputes[0].id, deleted(), today())
        .expect("resolve first");

    let view = service
        .workflow_status(&intake.workflow.id)
        .expect("status view");
    assert_eq!(view.total_disputes, 2);
    assert_eq!(view.resolved_disputes, 1);
    assert_eq!(view.open_disputes, 1);
    assert_eq!(view.progress_percentage, 50);
    assert_eq!(view.status, WorkflowStatus::Active);
    assert_eq!(view.current_stage, EnforcementStage::BureauDispute);

    service
        .process_response(&intake.disputes[1].id, deleted(), today())
        .expect("resolve second");

    let view = service
        .workflow_status(&intake.workflow.id)
        .expect("status view after completion");
    assert_eq!(view.resolved_disputes, 2);
    assert_eq!(view.progress_percentage, 100);
    assert_eq!(view.status, WorkflowStatus::Completed);
}

#[test]
fn confirm_delivery_marks_sent_letter_delivered() {
    let (service, repository, _delivery) = build_service();
    let dispute = repository
        .insert_dispute(dispute_at(
            EnforcementStage::DisputePreparation,
            DisputeStatus::Pending,
        ))
        .expect("seed dispute");

    let advanced = service
        .advance_to_stage(
            &dispute.id,
            EnforcementStage::BureauDispute,
            DeliveryMethod::Mail,
            today(),
        )
        .expect("advance");
    let letter_id = advanced.letters[0].id.clone();

    let confirmed = service
        .confirm_delivery(&dispute.id, &letter_id, today() + Duration::days(3))
        .expect("delivery confirmed");
    assert_eq!(confirmed.letters[0].status, LetterStatus::Delivered);

    let error = service
        .confirm_delivery(&dispute.id, &letter_id, today() + Duration::days(4))
        .expect_err("double confirmation rejected");
    assert!(matches!(
        error,
        EnforcementError::Transition(TransitionError::NotSent { .. })
    ));
}
