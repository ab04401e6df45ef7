use super::common::*;
use crate::applications::ApplicationDraft;
use crate::error::ErrorKind;
use crate::internships::{InternshipFilter, InternshipStatus, InternshipUpdate, ModerationAction, WorkMode};

#[test]
fn new_postings_are_pending_and_hidden() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");

    let internship = market
        .internships
        .create(&company, draft("Rust intern"))
        .expect("created");
    assert_eq!(internship.status, InternshipStatus::Pending);
    assert!(!internship.is_active);
    assert_eq!(internship.company_id, company.user_id);

    let public = market
        .internships
        .list_public(&InternshipFilter::default())
        .expect("list");
    assert!(public.is_empty());

    let err = market
        .internships
        .get_public(&internship.id)
        .expect_err("hidden posting");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn only_companies_create_postings() {
    let market = marketplace();
    let asha = student(&market, "asha@example.com");
    let err = market
        .internships
        .create(&asha, draft("Rust intern"))
        .expect_err("students cannot post");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn owners_cannot_approve_their_own_pending_postings() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    let internship = market
        .internships
        .create(&company, draft("Rust intern"))
        .expect("created");

    let err = market
        .internships
        .update(
            &company,
            &internship.id,
            InternshipUpdate {
                status: Some(InternshipStatus::Approved),
                ..InternshipUpdate::default()
            },
        )
        .expect_err("admin only");
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let admin = super_admin(&market);
    let approved = market
        .internships
        .update(
            &admin,
            &internship.id,
            InternshipUpdate {
                status: Some(InternshipStatus::Approved),
                ..InternshipUpdate::default()
            },
        )
        .expect("admin approves");
    assert!(approved.is_active);
    assert_eq!(approved.approved_by, Some(admin.user_id.clone()));
}

#[test]
fn owners_drive_the_lifecycle_after_approval() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    let internship = live_internship(&market, &company, "Rust intern");

    let paused = market
        .internships
        .update(
            &company,
            &internship.id,
            InternshipUpdate {
                status: Some(InternshipStatus::Paused),
                title: Some("Rust intern (2025)".to_string()),
                ..InternshipUpdate::default()
            },
        )
        .expect("owner pauses");
    assert!(!paused.is_active);
    assert_eq!(paused.title, "Rust intern (2025)");

    let closed = market
        .internships
        .update(
            &company,
            &internship.id,
            InternshipUpdate {
                status: Some(InternshipStatus::Closed),
                ..InternshipUpdate::default()
            },
        )
        .expect("owner closes");
    assert_eq!(closed.status, InternshipStatus::Closed);

    let err = market
        .internships
        .update(
            &company,
            &internship.id,
            InternshipUpdate {
                status: Some(InternshipStatus::Active),
                title: Some("Reopened".to_string()),
                ..InternshipUpdate::default()
            },
        )
        .expect_err("closed is terminal");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let stored = stored_internship(&market, &internship);
    assert_eq!(stored.status, InternshipStatus::Closed);
    assert_eq!(stored.title, "Rust intern (2025)");
}

#[test]
fn strangers_cannot_edit_or_delete() {
    let market = marketplace();
    let owner = approved_company(&market, "hr@acme.test");
    let rival = approved_company(&market, "hr@rival.test");
    let internship = live_internship(&market, &owner, "Rust intern");

    let err = market
        .internships
        .update(
            &rival,
            &internship.id,
            InternshipUpdate {
                title: Some("Hijacked".to_string()),
                ..InternshipUpdate::default()
            },
        )
        .expect_err("not the owner");
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = market
        .internships
        .delete(&rival, &internship.id)
        .expect_err("not the owner");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(stored_internship(&market, &internship).title, "Rust intern");
}

#[test]
fn public_reads_count_views() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    let internship = live_internship(&market, &company, "Rust intern");

    market.internships.get_public(&internship.id).expect("visible");
    let second = market.internships.get_public(&internship.id).expect("visible");
    assert_eq!(second.views, 2);
    assert_eq!(stored_internship(&market, &internship).views, 2);
}

#[test]
fn public_listing_filters() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    live_internship(&market, &company, "Rust intern");
    let mut office = draft("Design intern");
    office.work_mode = WorkMode::Office;
    office.location = Some("Mumbai".to_string());
    let office = market
        .internships
        .create(&company, office)
        .expect("created");
    let admin = super_admin(&market);
    market
        .internships
        .moderate(&admin, &office.id, ModerationAction::Approve, None)
        .expect("approved");

    let all = market
        .internships
        .list_public(&InternshipFilter::default())
        .expect("list");
    assert_eq!(all.len(), 2);

    let mumbai = market
        .internships
        .list_public(&InternshipFilter {
            location: Some("mum".to_string()),
            ..InternshipFilter::default()
        })
        .expect("list");
    assert_eq!(mumbai.len(), 1);
    assert_eq!(mumbai[0].title, "Design intern");

    let rust = market
        .internships
        .list_public(&InternshipFilter {
            q: Some("rust".to_string()),
            work_mode: Some(WorkMode::Remote),
            ..InternshipFilter::default()
        })
        .expect("list");
    assert_eq!(rust.len(), 1);
}

#[test]
fn moderation_actions_follow_the_table() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    let admin = super_admin(&market);
    let internship = market
        .internships
        .create(&company, draft("Rust intern"))
        .expect("created");

    let err = market
        .internships
        .moderate(&admin, &internship.id, ModerationAction::Activate, None)
        .expect_err("must be approved first");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = market
        .internships
        .moderate(&admin, &internship.id, ModerationAction::Reject, None)
        .expect_err("reason required");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let rejected = market
        .internships
        .moderate(
            &admin,
            &internship.id,
            ModerationAction::Reject,
            Some("misleading stipend"),
        )
        .expect("rejected");
    assert_eq!(rejected.status, InternshipStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("misleading stipend")
    );

    let err = market
        .internships
        .moderate(&company, &internship.id, ModerationAction::Approve, None)
        .expect_err("companies cannot moderate");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[test]
fn deactivate_pauses_and_activate_resumes() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    let admin = super_admin(&market);
    let internship = live_internship(&market, &company, "Rust intern");

    let paused = market
        .internships
        .moderate(&admin, &internship.id, ModerationAction::Deactivate, None)
        .expect("paused");
    assert_eq!(paused.status, InternshipStatus::Paused);
    assert!(!paused.is_active);

    let active = market
        .internships
        .moderate(&admin, &internship.id, ModerationAction::Activate, None)
        .expect("active");
    assert_eq!(active.status, InternshipStatus::Active);
    assert!(active.is_active);
}

#[test]
fn deleting_a_posting_removes_its_applications() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    let internship = live_internship(&market, &company, "Rust intern");
    let asha = student(&market, "asha@example.com");
    let application = market
        .applications
        .apply(
            &asha,
            ApplicationDraft {
                internship_id: internship.id.clone(),
                cover_letter: None,
                resume_url: None,
                portfolio_url: None,
            },
        )
        .expect("applied");

    market
        .internships
        .delete(&company, &internship.id)
        .expect("deleted");

    let err = market
        .applications
        .get(&asha, &application.id)
        .expect_err("cascaded");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(market
        .applications
        .list_mine(&asha)
        .expect("list")
        .is_empty());
}

#[test]
fn staff_lists_every_posting_by_status() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    live_internship(&market, &company, "Rust intern");
    market
        .internships
        .create(&company, draft("Pending intern"))
        .expect("created");
    let admin = super_admin(&market);

    let pending = market
        .internships
        .list_all(&admin, Some(InternshipStatus::Pending))
        .expect("list");
    assert_eq!(pending.len(), 1);
    assert_eq!(market.internships.list_all(&admin, None).expect("list").len(), 2);
    assert_eq!(market.internships.list_mine(&company).expect("mine").len(), 2);

    let err = market
        .internships
        .list_all(&company, None)
        .expect_err("staff only");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}
