//! Postgres-backed collaborators. These need Docker and are ignored by
//! default; run with `cargo test -- --ignored`.

mod common;

use common::*;
use errand_core::common::{AuthUser, Party};
use errand_core::domains::categories::models::{Category, CategoryType};
use errand_core::domains::errands::activities;
use errand_core::domains::errands::models::{BidState, Errand, ErrandState};
use errand_core::domains::users::models::Session;
use errand_core::domains::wallet::activities as wallet;
use futures::future::join_all;

async fn seed_category(pool: &sqlx::PgPool) -> Category {
    // Identifiers are unique and tests share one database.
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let category = Category::new(format!("Delivery {suffix}"), CategoryType::Task);
    category.insert(pool).await.unwrap();
    category
}

#[tokio::test]
#[ignore = "requires docker"]
async fn draft_insert_is_idempotent_in_postgres() {
    let h = PgHarness::new().await.unwrap();
    let sender = AuthUser::new(create_test_user(&h.pool, "Ada").await.unwrap());

    let drafts = join_all((0..4).map(|_| activities::get_or_create_draft(&sender, &h.deps))).await;
    let ids: Vec<_> = drafts.into_iter().map(|d| d.unwrap().id).collect();
    assert!(ids.iter().all(|id| *id == ids[0]));

    let stored = Errand::find_draft_for(sender.user_id, &h.pool).await.unwrap().unwrap();
    assert_eq!(stored.id, ids[0]);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn lifecycle_round_trips_through_postgres() {
    let h = PgHarness::new().await.unwrap();
    let category = seed_category(&h.pool).await;
    let sender = AuthUser::new(create_test_user(&h.pool, "Ada").await.unwrap());
    let runner = AuthUser::new(create_test_user(&h.pool, "Bola").await.unwrap());

    wallet::top_up(&sender, 5000, &h.deps).await.unwrap();

    let draft = activities::get_or_create_draft(&sender, &h.deps).await.unwrap();
    let mut input = errand_input(3000);
    input.category = category.identifier.clone();
    let errand = activities::publish_errand(&sender, draft.id, input, &h.deps)
        .await
        .unwrap();
    assert_eq!(errand.state(), ErrandState::Open);

    activities::submit_bid(&runner, errand.id, bid(2800), &h.deps)
        .await
        .unwrap();
    assert!(Errand::has_open_bid_from_runner(errand.id, runner.user_id, &h.pool)
        .await
        .unwrap());

    let bid_id = Errand::find_by_id(errand.id, &h.pool)
        .await
        .unwrap()
        .unwrap()
        .bids()[0]
        .id;
    activities::accept_bid(&sender, errand.id, bid_id, runner.user_id, &h.deps)
        .await
        .unwrap();
    activities::accept_contract(&runner, errand.id, bid_id, &h.deps)
        .await
        .unwrap();
    activities::complete_errand(&sender, errand.id, Party::Sender, &h.deps)
        .await
        .unwrap();

    let stored = Errand::find_by_id(errand.id, &h.pool).await.unwrap().unwrap();
    assert_eq!(stored.state(), ErrandState::RunnerCompleted);
    assert_eq!(stored.bid(bid_id).unwrap().state, BidState::Accepted);

    let runner_wallet = wallet::wallet_for(&runner, &h.deps).await.unwrap();
    assert_eq!(runner_wallet.balance, 2800);
    let sender_wallet = wallet::wallet_for(&sender, &h.deps).await.unwrap();
    assert_eq!(sender_wallet.balance, 2000);

    let mine = activities::errands_for(&runner, &h.deps).await.unwrap();
    assert!(mine.iter().any(|e| e.id == errand.id));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn sessions_resolve_to_principals() {
    let h = PgHarness::new().await.unwrap();
    let user_id = create_test_user(&h.pool, "Ada").await.unwrap();
    let token = format!("token-{}", uuid::Uuid::new_v4());

    Session::new(token.clone(), user_id, chrono::Duration::hours(1))
        .insert(&h.pool)
        .await
        .unwrap();

    let resolved = h.deps.identity.resolve(&token).await.unwrap();
    assert_eq!(resolved, Some(AuthUser::new(user_id)));
    assert_eq!(h.deps.identity.resolve("missing").await.unwrap(), None);
}
