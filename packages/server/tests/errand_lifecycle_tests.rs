//! End-to-end errand lifecycle through the activity layer, backed by the
//! in-memory harness.

mod common;

use common::*;
use errand_core::common::{ErrandError, Party};
use errand_core::domains::errands::activities;
use errand_core::domains::errands::data::{DurationInput, UpdateDraftInput};
use errand_core::domains::errands::models::{BidState, ErrandState, UpdateKind};
use errand_core::domains::notifications::models::NotificationKind;
use futures::future::join_all;

#[tokio::test]
async fn full_errand_lifecycle_settles_runner() {
    let h = TestHarness::new();
    let (runner_a, runner_b) = (h.runner(0).clone(), h.runner(1).clone());

    // Publish with budget 3000 from a balance of 5000.
    let errand = h.published_errand(3000).await;
    assert_eq!(errand.state(), ErrandState::Open);
    assert_eq!(h.balance(h.sender.user_id).await, 2000);

    // Two runners bid.
    activities::submit_bid(&runner_a, errand.id, bid(2500), &h.deps)
        .await
        .unwrap();
    let with_bids = activities::submit_bid(&runner_b, errand.id, bid(2800), &h.deps)
        .await
        .unwrap();
    assert_eq!(with_bids.total_bids, 2);
    let bid_a = with_bids.bids()[0].id;
    let bid_b = with_bids.bids()[1].id;

    // Sender accepts B at 2800.
    let pending =
        activities::accept_bid(&h.sender, errand.id, bid_b, runner_b.user_id, &h.deps)
            .await
            .unwrap();
    assert_eq!(pending.state(), ErrandState::Pending);
    assert_eq!(pending.amount, 2800);
    assert_eq!(pending.bid(bid_b).unwrap().state, BidState::Accepted);
    assert_eq!(pending.bid(bid_a).unwrap().state, BidState::Open);

    // B takes the contract; A is rejected.
    let active = activities::accept_contract(&runner_b, errand.id, bid_b, &h.deps)
        .await
        .unwrap();
    assert_eq!(active.state(), ErrandState::Active);
    assert_eq!(active.runner_id, Some(runner_b.user_id));
    assert_eq!(active.bid(bid_a).unwrap().state, BidState::Rejected);
    assert_eq!(active.bid(bid_b).unwrap().state, BidState::Accepted);

    // Sender confirms completion.
    let done = activities::complete_errand(&h.sender, errand.id, Party::Sender, &h.deps)
        .await
        .unwrap();
    assert_eq!(done.state(), ErrandState::RunnerCompleted);
    assert_eq!(done.status(), "runner-completed");
    assert_eq!(h.balance(runner_b.user_id).await, 2800);
    assert_eq!(h.balance(h.sender.user_id).await, 2000);

    let profile = h.mocks.users.user(runner_b.user_id).unwrap();
    assert_eq!(profile.errands_completed, 1);

    let credit = h.mocks.ledger.entries_for(runner_b.user_id);
    assert_eq!(credit.len(), 1);
    assert_eq!(credit[0].description, "Completed errand");
    assert_eq!(credit[0].item_id, Some(errand.id));

    // new-bid x2, bid-accepted, errand-started, errand-completed-by-sender
    h.wait_for_notifications(5).await;
    let to_b = h.mocks.notifications.sent_to(runner_b.user_id);
    assert!(to_b.iter().any(|n| n.kind == NotificationKind::BidAccepted));
    assert!(to_b
        .iter()
        .any(|n| n.kind == NotificationKind::ErrandCompletedBySender));
}

#[tokio::test]
async fn draft_is_created_once() {
    let h = TestHarness::new();

    let first = activities::get_or_create_draft(&h.sender, &h.deps).await.unwrap();
    let second = activities::get_or_create_draft(&h.sender, &h.deps).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.state(), ErrandState::Draft);
    assert_eq!(h.mocks.errands.len(), 1);
}

#[tokio::test]
async fn concurrent_draft_requests_share_one_draft() {
    let h = TestHarness::new();

    let drafts = join_all((0..8).map(|_| activities::get_or_create_draft(&h.sender, &h.deps))).await;
    let ids: Vec<_> = drafts.into_iter().map(|d| d.unwrap().id).collect();
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(h.mocks.errands.len(), 1);
}

#[tokio::test]
async fn draft_edits_apply_until_publish() {
    let h = TestHarness::new();
    let draft = activities::get_or_create_draft(&h.sender, &h.deps).await.unwrap();

    let edit = UpdateDraftInput::builder()
        .description(Some("Buy groceries".to_string()))
        .duration(Some(DurationInput::new(3, "hours")))
        .step(Some(2))
        .build();
    let edited = activities::update_draft(&h.sender, draft.id, edit, &h.deps)
        .await
        .unwrap();
    assert_eq!(edited.description.as_deref(), Some("Buy groceries"));
    assert_eq!(edited.step, 2);

    let stranger = h.runner(0).clone();
    let err = activities::update_draft(&stranger, draft.id, UpdateDraftInput::default(), &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::Authorization(_)));

    activities::publish_errand(&h.sender, draft.id, errand_input(1000), &h.deps)
        .await
        .unwrap();
    let err = activities::update_draft(&h.sender, draft.id, UpdateDraftInput::default(), &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::StateGuard(_)));
}

#[tokio::test]
async fn publish_seeds_timeline_and_expiry() {
    let h = TestHarness::new();
    let errand = h.published_errand(1500).await;

    assert_eq!(errand.step, 4);
    assert!(errand.expiry_date.is_some());
    assert_eq!(errand.category.as_ref().unwrap().identifier, DELIVERY);
    let timeline = errand.timeline.as_ref().unwrap();
    assert_eq!(timeline.updates.len(), 1);
    assert_eq!(timeline.updates[0].kind, UpdateKind::ErrandCreated);
    assert_eq!(timeline.updates[0].source, Party::Sender);

    let debit = h.mocks.ledger.entries_for(h.sender.user_id);
    assert!(debit
        .iter()
        .any(|e| e.description == "Errand creation" && e.amount == 1500));
}

#[tokio::test]
async fn publish_twice_is_rejected_without_second_debit() {
    let h = TestHarness::new();
    let errand = h.published_errand(1000).await;

    let err = activities::publish_errand(&h.sender, errand.id, errand_input(1000), &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::StateGuard(_)));
    assert_eq!(h.balance(h.sender.user_id).await, 4000);
}

#[tokio::test]
async fn publish_requires_funds() {
    let h = TestHarness::new();
    let draft = activities::get_or_create_draft(&h.sender, &h.deps).await.unwrap();

    let err = activities::publish_errand(&h.sender, draft.id, errand_input(9000), &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::Validation(ref m) if m.contains("insufficient funds")));
    assert_eq!(h.balance(h.sender.user_id).await, SENDER_BALANCE);
    assert_eq!(h.errand(draft.id).state(), ErrandState::Draft);
}

#[tokio::test]
async fn overlong_duration_is_rejected_before_any_debit() {
    let h = TestHarness::new();
    let draft = activities::get_or_create_draft(&h.sender, &h.deps).await.unwrap();

    for duration in [
        DurationInput::new(i64::MAX / 1000, "hours"),
        DurationInput::new(71, "days"),
    ] {
        let mut input = errand_input(1000);
        input.duration = duration;
        let err = activities::publish_errand(&h.sender, draft.id, input, &h.deps)
            .await
            .unwrap_err();
        assert!(matches!(err, ErrandError::Validation(ref m) if m == "duration cannot be longer than 10 weeks"));
    }

    assert_eq!(h.balance(h.sender.user_id).await, SENDER_BALANCE);
    assert_eq!(h.errand(draft.id).state(), ErrandState::Draft);
}

#[tokio::test]
async fn task_category_requires_dropoff() {
    let h = TestHarness::new();
    let draft = activities::get_or_create_draft(&h.sender, &h.deps).await.unwrap();

    let mut input = errand_input(1000);
    input.dropoff_address = None;
    let err = activities::publish_errand(&h.sender, draft.id, input, &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::Validation(ref m) if m == "drop-off location is required for tasks"));
    assert_eq!(h.balance(h.sender.user_id).await, SENDER_BALANCE);
}

#[tokio::test]
async fn service_category_needs_no_dropoff() {
    let h = TestHarness::new();
    let draft = activities::get_or_create_draft(&h.sender, &h.deps).await.unwrap();

    let errand = activities::publish_errand(&h.sender, draft.id, service_input(1000), &h.deps)
        .await
        .unwrap();
    assert_eq!(errand.state(), ErrandState::Open);
    assert!(errand.dropoff_address.is_none());
}

#[tokio::test]
async fn unknown_category_is_rejected() {
    let h = TestHarness::new();
    let draft = activities::get_or_create_draft(&h.sender, &h.deps).await.unwrap();

    let mut input = errand_input(1000);
    input.category = "plumbing".to_string();
    let err = activities::publish_errand(&h.sender, draft.id, input, &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::Validation(ref m) if m == "invalid errand category"));
}

#[tokio::test]
async fn cancel_keeps_the_publish_debit() {
    let h = TestHarness::new();
    let errand = h.published_errand(3000).await;

    let cancelled = activities::cancel_errand(
        &h.sender,
        errand.id,
        Some("No longer needed".to_string()),
        &h.deps,
    )
    .await
    .unwrap();
    assert_eq!(cancelled.state(), ErrandState::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("No longer needed"));
    assert!(!cancelled.modified_by.is_empty());

    // Known gap: nothing is refunded.
    assert_eq!(h.balance(h.sender.user_id).await, 2000);

    let err = activities::cancel_errand(&h.sender, errand.id, None, &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::StateGuard(_)));
}

#[tokio::test]
async fn only_owner_can_cancel() {
    let h = TestHarness::new();
    let errand = h.published_errand(1000).await;

    let err = activities::cancel_errand(h.runner(0), errand.id, None, &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::Authorization(_)));
    assert_eq!(h.errand(errand.id).state(), ErrandState::Open);
}

#[tokio::test]
async fn activation_rejects_every_other_bid() {
    let h = TestHarness::new();
    let errand = h.published_errand(3000).await;

    for (i, amount) in [2000, 2200, 2400].into_iter().enumerate() {
        activities::submit_bid(h.runner(i), errand.id, bid(amount), &h.deps)
            .await
            .unwrap();
    }
    let winner = h.runner(2).clone();
    let winning_bid = h.errand(errand.id).bids()[2].id;

    activities::accept_bid(&h.sender, errand.id, winning_bid, winner.user_id, &h.deps)
        .await
        .unwrap();
    let active = activities::accept_contract(&winner, errand.id, winning_bid, &h.deps)
        .await
        .unwrap();

    for bid in active.bids() {
        if bid.id == winning_bid {
            assert_eq!(bid.state, BidState::Accepted);
        } else {
            assert_eq!(bid.state, BidState::Rejected);
        }
    }
}

#[tokio::test]
async fn declined_contract_reopens_every_bid() {
    let h = TestHarness::new();
    let errand = h.published_errand(3000).await;

    for i in 0..3 {
        activities::submit_bid(h.runner(i), errand.id, bid(2000 + i as i64), &h.deps)
            .await
            .unwrap();
    }
    let bids: Vec<_> = h.errand(errand.id).bids().iter().map(|b| b.id).collect();

    // One bid rejected outright, another accepted.
    activities::reject_bid(&h.sender, errand.id, bids[0], &h.deps)
        .await
        .unwrap();
    let chosen = h.runner(1).clone();
    activities::accept_bid(&h.sender, errand.id, bids[1], chosen.user_id, &h.deps)
        .await
        .unwrap();

    let reopened = activities::reject_contract(&chosen, errand.id, bids[1], &h.deps)
        .await
        .unwrap();
    assert_eq!(reopened.state(), ErrandState::Open);
    assert_eq!(reopened.runner_id, None);
    assert_eq!(reopened.amount, 0);
    assert!(reopened.bids().iter().all(|b| b.state == BidState::Open));

    h.wait_for_notifications(5).await;
    assert!(h
        .mocks
        .notifications
        .sent_to(h.sender.user_id)
        .iter()
        .any(|n| n.kind == NotificationKind::ContractDeclined));
}

#[tokio::test]
async fn contract_responses_need_the_accepted_runner() {
    let h = TestHarness::new();
    let errand = h.published_errand(3000).await;
    activities::submit_bid(h.runner(0), errand.id, bid(2500), &h.deps)
        .await
        .unwrap();
    let bid_id = h.errand(errand.id).bids()[0].id;

    let err = activities::accept_contract(h.runner(0), errand.id, bid_id, &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::StateGuard(ref m) if m == "can't accept contract for errand with no accepted bid"));

    activities::accept_bid(&h.sender, errand.id, bid_id, h.runner(0).user_id, &h.deps)
        .await
        .unwrap();
    let err = activities::accept_contract(h.runner(1), errand.id, bid_id, &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::Validation(ref m) if m == "invalid runner id for selected bid"));
}

#[tokio::test]
async fn timeline_updates_flow_between_parties() {
    let h = TestHarness::new();
    let errand = h.published_errand(3000).await;
    let runner = h.runner(0).clone();
    activities::submit_bid(&runner, errand.id, bid(2500), &h.deps)
        .await
        .unwrap();
    let bid_id = h.errand(errand.id).bids()[0].id;

    // Not active yet.
    let err = activities::request_timeline_update(&h.sender, errand.id, &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::StateGuard(_)));

    activities::accept_bid(&h.sender, errand.id, bid_id, runner.user_id, &h.deps)
        .await
        .unwrap();
    activities::accept_contract(&runner, errand.id, bid_id, &h.deps)
        .await
        .unwrap();

    activities::request_timeline_update(&h.sender, errand.id, &h.deps)
        .await
        .unwrap();
    let updated =
        activities::post_timeline_update(&runner, errand.id, "Picked up the parcel".into(), &h.deps)
            .await
            .unwrap();

    let latest = updated.timeline.as_ref().unwrap().latest().unwrap();
    assert_eq!(latest.kind, UpdateKind::RunnerUpdate);
    assert_eq!(latest.source, Party::Runner);
    assert_eq!(latest.message, "Picked up the parcel");

    let err = activities::post_timeline_update(h.runner(1), errand.id, "hi".into(), &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::Authorization(_)));

    h.wait_for_notifications(5).await;
    let to_sender = h.mocks.notifications.sent_to(h.sender.user_id);
    let update = to_sender
        .iter()
        .find(|n| n.kind == NotificationKind::RunnerUpdate)
        .unwrap();
    assert_eq!(update.message, "Picked up the parcel");
    assert!(h
        .mocks
        .notifications
        .sent_to(runner.user_id)
        .iter()
        .any(|n| n.kind == NotificationKind::UpdateRequested));
}

#[tokio::test]
async fn sender_rates_runner_after_completion() {
    let h = TestHarness::new();
    let errand = h.published_errand(3000).await;
    let runner = h.runner(0).clone();
    activities::submit_bid(&runner, errand.id, bid(2500), &h.deps)
        .await
        .unwrap();
    let bid_id = h.errand(errand.id).bids()[0].id;
    activities::accept_bid(&h.sender, errand.id, bid_id, runner.user_id, &h.deps)
        .await
        .unwrap();
    activities::accept_contract(&runner, errand.id, bid_id, &h.deps)
        .await
        .unwrap();

    let err = activities::rate_runner(&h.sender, errand.id, runner.user_id, 4, &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::StateGuard(ref m) if m == "can only rate user for a completed errand"));

    activities::complete_errand(&h.sender, errand.id, Party::Sender, &h.deps)
        .await
        .unwrap();

    let err = activities::rate_runner(&h.sender, errand.id, runner.user_id, 6, &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::Validation(_)));

    let err = activities::rate_runner(&h.sender, errand.id, h.runner(1).user_id, 4, &h.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, ErrandError::Validation(ref m) if m == "invalid runner id"));

    activities::rate_runner(&h.sender, errand.id, runner.user_id, 4, &h.deps)
        .await
        .unwrap();
    activities::rate_runner(&h.sender, errand.id, runner.user_id, 5, &h.deps)
        .await
        .unwrap();

    let profile = h.mocks.users.user(runner.user_id).unwrap();
    assert_eq!(profile.ratings, vec![4, 5]);
    assert!((profile.rating - 4.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn participants_and_market_views() {
    let h = TestHarness::new();
    let open = h.published_errand(1000).await;
    activities::submit_bid(h.runner(0), open.id, bid(900), &h.deps)
        .await
        .unwrap();

    let market = activities::market_errands(h.runner(2), &h.deps).await.unwrap();
    assert_eq!(market.len(), 1);
    assert_eq!(market[0].id, open.id);

    let mine = activities::errands_for(h.runner(0), &h.deps).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(activities::errands_for(h.runner(1), &h.deps)
        .await
        .unwrap()
        .is_empty());

    // The sender's next draft is not listed.
    activities::get_or_create_draft(&h.sender, &h.deps).await.unwrap();
    let senders = activities::errands_for(&h.sender, &h.deps).await.unwrap();
    assert_eq!(senders.len(), 1);

    let fetched = activities::get_errand(h.runner(1), open.id, &h.deps).await.unwrap();
    assert_eq!(fetched.id, open.id);
}
