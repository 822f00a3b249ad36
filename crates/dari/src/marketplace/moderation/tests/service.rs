use super::common::*;
use crate::marketplace::accounts::{AccessError, TrustLevel};
use crate::marketplace::listings::{
    ListingService, PropertyStatus, StatusAction, TransitionError,
};
use crate::marketplace::moderation::domain::{
    AppealDecision, AppealResolution, AppealStatus, AppealSubmission, IssueStatus,
    IssueSubmission, IssueUpdate, ReportDecision, ReportReason, ReportResolution, ReportStatus,
    ReportSubmission,
};
use crate::marketplace::moderation::{AppealCooldown, ModerationService, ModerationServiceError};
use crate::marketplace::store::{
    AccountRepository, ListingRepository, ModerationRepository, RepositoryError,
};
use chrono::Duration;
use std::sync::Arc;

fn report_on(scene: &Scene, reason: ReportReason) -> ReportSubmission {
    ReportSubmission {
        property_id: scene.property.clone(),
        reason,
        comments: "Photos are copied from another site".to_string(),
    }
}

fn resolution(decision: ReportDecision, notes: &str) -> ReportResolution {
    ReportResolution {
        decision,
        notes: notes.to_string(),
    }
}

fn appeal_on(scene: &Scene) -> AppealSubmission {
    AppealSubmission {
        property_id: scene.property.clone(),
        message: "The photos are mine, here is the deed.".to_string(),
    }
}

fn decide(decision: AppealDecision, notes: &str) -> AppealResolution {
    AppealResolution {
        decision,
        notes: notes.to_string(),
    }
}

#[test]
fn scam_report_resolved_with_delete() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);

    let report = service
        .submit_report(&scene.reporter, report_on(&scene, ReportReason::ScamFraud))
        .expect("report filed");
    assert_eq!(report.status, ReportStatus::New);

    let outcome = service
        .resolve_report(
            &scene.admin,
            &report.id,
            resolution(ReportDecision::Delete, "fraudulent listing"),
        )
        .expect("resolved");

    let property = harness.property(&scene.property);
    assert_eq!(property.status, PropertyStatus::Deleted);
    assert_eq!(
        property.deletion_reason.as_deref(),
        Some("fraudulent listing")
    );
    assert!(property.archival_reason.is_none());
    assert!(property.moderation_hold);
    assert_eq!(harness.trust_of(&scene.owner), TrustLevel::Untrusted);

    let stored = harness
        .store
        .fetch_report(&report.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.status, ReportStatus::Resolved);
    assert_eq!(stored.decision, Some(ReportDecision::Delete));
    assert_eq!(stored.handled_by, Some(scene.admin.clone()));
    assert_eq!(outcome.report, stored);
    assert_eq!(outcome.owner_trust, Some(TrustLevel::Untrusted));
}

#[test]
fn upheld_reports_mark_owner_untrusted_from_any_level() {
    for (level, decision) in [
        (TrustLevel::Normal, ReportDecision::Delete),
        (TrustLevel::Untrusted, ReportDecision::Delete),
        (TrustLevel::Blacklisted, ReportDecision::Delete),
        (TrustLevel::Blacklisted, ReportDecision::Archive),
    ] {
        let harness = harness();
        let service = service(&harness);
        let scene = scene(&harness, PropertyStatus::Active);
        service
            .set_trust_level(&scene.admin, &scene.owner, level)
            .expect("seed trust");

        let report = service
            .submit_report(&scene.reporter, report_on(&scene, ReportReason::Other))
            .expect("report filed");
        service
            .resolve_report(&scene.admin, &report.id, resolution(decision, "upheld"))
            .expect("resolved");

        assert_eq!(harness.trust_of(&scene.owner), TrustLevel::Untrusted);
    }
}

#[test]
fn dismissed_reports_touch_nothing_else() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);
    let report = service
        .submit_report(
            &scene.reporter,
            report_on(&scene, ReportReason::WrongInformation),
        )
        .expect("report filed");

    let outcome = service
        .resolve_report(&scene.admin, &report.id, resolution(ReportDecision::Dismiss, ""))
        .expect("dismissed");

    assert_eq!(outcome.report.status, ReportStatus::Dismissed);
    assert!(outcome.property.is_none());
    let property = harness.property(&scene.property);
    assert_eq!(property.status, PropertyStatus::Active);
    assert_eq!(property.version, 1);
    assert_eq!(harness.trust_of(&scene.owner), TrustLevel::Normal);
}

#[test]
fn closed_reports_cannot_be_resolved_twice() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);
    let report = service
        .submit_report(&scene.reporter, report_on(&scene, ReportReason::AlreadySold))
        .expect("report filed");
    service
        .resolve_report(
            &scene.admin,
            &report.id,
            resolution(ReportDecision::Archive, "already sold"),
        )
        .expect("first resolution");

    match service.resolve_report(
        &scene.admin,
        &report.id,
        resolution(ReportDecision::Delete, "again"),
    ) {
        Err(ModerationServiceError::ReportClosed {
            status: ReportStatus::Resolved,
        }) => {}
        other => panic!("expected closed report, got {other:?}"),
    }
    assert_eq!(
        harness.property(&scene.property).status,
        PropertyStatus::Archived
    );
}

#[test]
fn report_decisions_need_notes_as_reason() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);
    let report = service
        .submit_report(&scene.reporter, report_on(&scene, ReportReason::ScamFraud))
        .expect("report filed");

    match service.resolve_report(&scene.admin, &report.id, resolution(ReportDecision::Delete, " ")) {
        Err(ModerationServiceError::Transition(TransitionError::MissingReason { .. })) => {}
        other => panic!("expected missing reason, got {other:?}"),
    }
    assert_eq!(harness.trust_of(&scene.owner), TrustLevel::Normal);
    let stored = harness
        .store
        .fetch_report(&report.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.status, ReportStatus::New);
}

#[test]
fn report_submission_rules() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);

    assert!(matches!(
        service.submit_report(&scene.owner, report_on(&scene, ReportReason::Other)),
        Err(ModerationServiceError::SelfReport)
    ));

    service
        .submit_report(&scene.reporter, report_on(&scene, ReportReason::Other))
        .expect("first report");
    assert!(matches!(
        service.submit_report(&scene.reporter, report_on(&scene, ReportReason::ScamFraud)),
        Err(ModerationServiceError::DuplicateReport)
    ));

    let archived = harness.listing("p-archived", &scene.owner, PropertyStatus::Archived);
    let submission = ReportSubmission {
        property_id: archived,
        reason: ReportReason::DuplicateListing,
        comments: String::new(),
    };
    assert!(matches!(
        service.submit_report(&scene.reporter, submission),
        Err(ModerationServiceError::NotReportable {
            status: PropertyStatus::Archived
        })
    ));
}

#[test]
fn review_moves_new_reports_under_review() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);
    let report = service
        .submit_report(&scene.reporter, report_on(&scene, ReportReason::Other))
        .expect("report filed");

    let reviewed = service
        .start_report_review(&scene.admin, &report.id)
        .expect("review started");
    assert_eq!(reviewed.status, ReportStatus::UnderReview);

    assert!(matches!(
        service.start_report_review(&scene.reporter, &report.id),
        Err(ModerationServiceError::Access(AccessError::AdminRequired))
    ));
}

#[test]
fn appeal_decisions_follow_fixed_mapping() {
    let cases = [
        (
            AppealDecision::Delete,
            PropertyStatus::Deleted,
            AppealStatus::ResolvedDeleted,
            TrustLevel::Untrusted,
        ),
        (
            AppealDecision::Archive,
            PropertyStatus::Archived,
            AppealStatus::ResolvedKeptArchived,
            TrustLevel::Untrusted,
        ),
        (
            AppealDecision::Publish,
            PropertyStatus::Active,
            AppealStatus::ResolvedPublished,
            TrustLevel::Normal,
        ),
    ];

    for (decision, property_status, appeal_status, trust) in cases {
        let harness = harness();
        let service = service(&harness);
        let scene = scene(&harness, PropertyStatus::Active);
        let report = service
            .submit_report(&scene.reporter, report_on(&scene, ReportReason::ScamFraud))
            .expect("report filed");
        service
            .resolve_report(
                &scene.admin,
                &report.id,
                resolution(ReportDecision::Archive, "misleading photos"),
            )
            .expect("archived by admin");

        let appeal = service
            .submit_appeal(&scene.owner, appeal_on(&scene))
            .expect("appeal filed");
        let outcome = service
            .resolve_appeal(&scene.admin, &appeal.id, decide(decision, ""))
            .expect("appeal resolved");

        let property = harness.property(&scene.property);
        assert_eq!(property.status, property_status, "{decision:?}");
        assert!(property.reasons_consistent(), "{decision:?}");
        assert_eq!(outcome.appeal.status, appeal_status);
        assert_eq!(harness.trust_of(&scene.owner), trust, "{decision:?}");
        if decision != AppealDecision::Publish {
            // blank notes keep the admin's original reason
            assert_eq!(
                property
                    .archival_reason
                    .or(property.deletion_reason)
                    .as_deref(),
                Some("misleading photos")
            );
        }
    }
}

#[test]
fn publishing_a_listing_the_owner_already_reactivated_closes_the_appeal() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Archived);
    let listings = ListingService::new(harness.store.clone(), harness.clock());

    let appeal = service
        .submit_appeal(&scene.owner, appeal_on(&scene))
        .expect("appeal filed");
    let reactivated = listings
        .change_status(&scene.owner, &scene.property, StatusAction::Reactivate)
        .expect("owner reactivates own archive");

    let outcome = service
        .resolve_appeal(&scene.admin, &appeal.id, decide(AppealDecision::Publish, ""))
        .expect("appeal closes");

    assert_eq!(outcome.appeal.status, AppealStatus::ResolvedPublished);
    assert_eq!(outcome.owner_trust, TrustLevel::Normal);
    let property = harness.property(&scene.property);
    assert_eq!(property.status, PropertyStatus::Active);
    assert_eq!(property.version, reactivated.version);
}

#[test]
fn published_appeal_restores_blacklisted_owner() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Deleted);
    service
        .set_trust_level(&scene.admin, &scene.owner, TrustLevel::Blacklisted)
        .expect("blacklist");

    let appeal = service
        .submit_appeal(&scene.owner, appeal_on(&scene))
        .expect("appeal filed");
    let outcome = service
        .resolve_appeal(
            &scene.admin,
            &appeal.id,
            decide(AppealDecision::Publish, "verified ownership"),
        )
        .expect("published");

    assert_eq!(outcome.owner_trust, TrustLevel::Normal);
    assert_eq!(outcome.property.status, PropertyStatus::Active);
    assert!(!outcome.property.moderation_hold);
    assert_eq!(
        outcome.appeal.admin_notes.as_deref(),
        Some("verified ownership")
    );
}

#[test]
fn appeal_cooldown_is_enforced_per_owner_and_listing() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Archived);

    let first = service
        .submit_appeal(&scene.owner, appeal_on(&scene))
        .expect("first appeal");
    service
        .resolve_appeal(
            &scene.admin,
            &first.id,
            decide(AppealDecision::Archive, "still misleading"),
        )
        .expect("kept archived");

    harness.clock.advance(Duration::hours(23));
    match service.submit_appeal(&scene.owner, appeal_on(&scene)) {
        Err(ModerationServiceError::CooldownActive { retry_at }) => {
            assert_eq!(retry_at, first.created_at + Duration::hours(24));
        }
        other => panic!("expected cooldown, got {other:?}"),
    }

    harness.clock.advance(Duration::hours(1));
    service
        .submit_appeal(&scene.owner, appeal_on(&scene))
        .expect("accepted at exactly 24 hours");
}

#[test]
fn appeal_submission_rules() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);

    assert!(matches!(
        service.submit_appeal(&scene.owner, appeal_on(&scene)),
        Err(ModerationServiceError::NotAppealable {
            status: PropertyStatus::Active
        })
    ));

    let archived = harness.listing("p-2", &scene.owner, PropertyStatus::Archived);
    let submission = AppealSubmission {
        property_id: archived.clone(),
        message: "please".to_string(),
    };
    assert!(matches!(
        service.submit_appeal(&scene.reporter, submission.clone()),
        Err(ModerationServiceError::NotOwner)
    ));

    service
        .submit_appeal(&scene.owner, submission.clone())
        .expect("first appeal");
    assert!(matches!(
        service.submit_appeal(&scene.owner, submission),
        Err(ModerationServiceError::DuplicateAppeal)
    ));

    let blank = AppealSubmission {
        property_id: archived,
        message: "   ".to_string(),
    };
    assert!(matches!(
        service.submit_appeal(&scene.owner, blank),
        Err(ModerationServiceError::Invalid(_))
    ));
}

#[test]
fn concurrent_admin_write_rejects_decision_atomically() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Active);
    let racing = Arc::new(RacingStore {
        inner: (*harness.store).clone(),
        rival: Rival::EditListing,
    });
    let service = ModerationService::new(racing, harness.clock(), AppealCooldown::default());

    let report = service
        .submit_report(&scene.reporter, report_on(&scene, ReportReason::ScamFraud))
        .expect("report filed");

    match service.resolve_report(
        &scene.admin,
        &report.id,
        resolution(ReportDecision::Delete, "fraudulent listing"),
    ) {
        Err(ModerationServiceError::Repository(RepositoryError::StaleVersion {
            expected: 1,
            found: 2,
        })) => {}
        other => panic!("expected stale version, got {other:?}"),
    }

    // the concurrent edit stands and nothing from the decision leaked through
    let property = harness.property(&scene.property);
    assert_eq!(property.status, PropertyStatus::Active);
    assert!(property.title.ends_with("(edited)"));
    assert_eq!(harness.trust_of(&scene.owner), TrustLevel::Normal);
    let stored = harness
        .store
        .fetch_report(&report.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.status, ReportStatus::New);
}

#[test]
fn dismissal_cannot_overwrite_a_report_upheld_meanwhile() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Active);
    let racing = Arc::new(RacingStore {
        inner: (*harness.store).clone(),
        rival: Rival::UpholdReport,
    });
    let service = ModerationService::new(racing, harness.clock(), AppealCooldown::default());

    let report = service
        .submit_report(&scene.reporter, report_on(&scene, ReportReason::ScamFraud))
        .expect("report filed");

    match service.resolve_report(
        &scene.admin,
        &report.id,
        resolution(ReportDecision::Dismiss, "looks fine"),
    ) {
        Err(ModerationServiceError::Repository(RepositoryError::Superseded)) => {}
        other => panic!("expected superseded write, got {other:?}"),
    }

    let stored = harness
        .store
        .fetch_report(&report.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.status, ReportStatus::Resolved);
    assert_eq!(stored.decision, Some(ReportDecision::Delete));
}

#[test]
fn review_cannot_reopen_a_report_closed_meanwhile() {
    let harness = harness();
    let scene = scene(&harness, PropertyStatus::Active);
    let racing = Arc::new(RacingStore {
        inner: (*harness.store).clone(),
        rival: Rival::UpholdReport,
    });
    let service = ModerationService::new(racing, harness.clock(), AppealCooldown::default());

    let report = service
        .submit_report(&scene.reporter, report_on(&scene, ReportReason::DuplicateListing))
        .expect("report filed");

    let error = service
        .start_report_review(&scene.admin, &report.id)
        .expect_err("review raced a decision");
    assert_eq!(error.status(), axum::http::StatusCode::CONFLICT);

    let stored = harness
        .store
        .fetch_report(&report.id)
        .expect("fetch")
        .expect("present");
    assert_eq!(stored.status, ReportStatus::Resolved);
}

#[test]
fn admin_listing_moderation_and_pending_queue() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);
    let pending = harness.listing("p-pending", &scene.owner, PropertyStatus::Pending);

    let queue = service.pending_listings(&scene.admin).expect("queue");
    assert_eq!(queue.len(), 1);

    let approved = service
        .moderate_listing(&scene.admin, &pending, StatusAction::Approve)
        .expect("approved");
    assert_eq!(approved.status, PropertyStatus::Active);
    assert!(!approved.moderation_hold);
    assert!(service
        .pending_listings(&scene.admin)
        .expect("queue")
        .is_empty());

    let archived = service
        .moderate_listing(
            &scene.admin,
            &scene.property,
            StatusAction::Archive {
                reason: "expired".to_string(),
            },
        )
        .expect("archived");
    assert!(archived.moderation_hold);

    assert!(matches!(
        service.moderate_listing(&scene.owner, &scene.property, StatusAction::Reactivate),
        Err(ModerationServiceError::Access(AccessError::AdminRequired))
    ));
}

#[test]
fn user_issues_move_forward_only() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);

    let issue = service
        .submit_issue(
            &scene.reporter,
            IssueSubmission {
                subject: "Cannot upload photos".to_string(),
                message: "The upload spins forever.".to_string(),
            },
        )
        .expect("issue opened");
    assert_eq!(issue.status, IssueStatus::New);

    let progressing = service
        .update_issue(
            &scene.admin,
            &issue.id,
            IssueUpdate {
                status: IssueStatus::InProgress,
                notes: Some("looking into it".to_string()),
            },
        )
        .expect("in progress");
    assert_eq!(progressing.admin_notes.as_deref(), Some("looking into it"));

    service
        .update_issue(
            &scene.admin,
            &issue.id,
            IssueUpdate {
                status: IssueStatus::Resolved,
                notes: None,
            },
        )
        .expect("resolved");

    match service.update_issue(
        &scene.admin,
        &issue.id,
        IssueUpdate {
            status: IssueStatus::New,
            notes: None,
        },
    ) {
        Err(ModerationServiceError::IssueTransition {
            from: IssueStatus::Resolved,
            to: IssueStatus::New,
        }) => {}
        other => panic!("expected rejected transition, got {other:?}"),
    }
}

#[test]
fn stats_count_open_work() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);
    harness.listing("p-pending", &scene.owner, PropertyStatus::Pending);
    let archived = harness.listing("p-archived", &scene.owner, PropertyStatus::Archived);

    service
        .submit_report(&scene.reporter, report_on(&scene, ReportReason::Other))
        .expect("report");
    service
        .submit_appeal(
            &scene.owner,
            AppealSubmission {
                property_id: archived,
                message: "please review".to_string(),
            },
        )
        .expect("appeal");
    service
        .submit_issue(
            &scene.owner,
            IssueSubmission {
                subject: "Billing".to_string(),
                message: "Charged twice".to_string(),
            },
        )
        .expect("issue");

    let stats = service.stats(&scene.admin).expect("stats");
    assert_eq!(stats.open_reports, 1);
    assert_eq!(stats.open_appeals, 1);
    assert_eq!(stats.open_issues, 1);
    assert_eq!(stats.pending_listings, 1);
}

#[test]
fn status_filters_and_export() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);
    let report = service
        .submit_report(&scene.reporter, report_on(&scene, ReportReason::ScamFraud))
        .expect("report");

    assert_eq!(
        service
            .reports(&scene.admin, Some(ReportStatus::New))
            .expect("list")
            .len(),
        1
    );
    assert!(service
        .reports(&scene.admin, Some(ReportStatus::Resolved))
        .expect("list")
        .is_empty());

    let csv = service
        .export_reports_csv(&scene.admin, None)
        .expect("export");
    assert!(csv.contains(&report.id.0));
    assert!(csv.contains("SCAM_FRAUD"));
}

#[test]
fn owners_missing_from_store_abort_decisions() {
    let harness = harness();
    let service = service(&harness);
    let scene = scene(&harness, PropertyStatus::Active);
    let orphan_owner = crate::marketplace::accounts::UserId("vanished".to_string());
    let orphan = harness.listing("p-orphan", &orphan_owner, PropertyStatus::Active);
    let report = service
        .submit_report(
            &scene.reporter,
            ReportSubmission {
                property_id: orphan.clone(),
                reason: ReportReason::ScamFraud,
                comments: String::new(),
            },
        )
        .expect("report");

    assert!(matches!(
        service.resolve_report(
            &scene.admin,
            &report.id,
            resolution(ReportDecision::Delete, "fraud")
        ),
        Err(ModerationServiceError::Repository(RepositoryError::NotFound))
    ));
    assert_eq!(harness.property(&orphan).status, PropertyStatus::Active);
    assert!(harness
        .store
        .fetch_user(&orphan_owner)
        .expect("fetch")
        .is_none());
    assert_eq!(
        harness
            .store
            .properties_with_status(PropertyStatus::Active)
            .expect("list")
            .len(),
        2
    );
}
