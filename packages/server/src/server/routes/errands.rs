//! Errand routes: drafts, publishing, bidding, contracts and settlement.

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;

use crate::common::{BidId, ErrandId, Party, UserId};
use crate::domains::errands::activities;
use crate::domains::errands::data::{BidInput, ErrandInput, HaggleInput, UpdateDraftInput};
use crate::domains::errands::models::Errand;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::middleware::RequireUser;

#[derive(Debug, Deserialize)]
pub struct CancelParams {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub source: Party,
}

#[derive(Debug, Deserialize)]
pub struct AcceptBidRequest {
    pub runner: UserId,
}

#[derive(Debug, Deserialize)]
pub struct TimelineRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub runner: UserId,
    pub rating: i64,
}

pub async fn draft_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
) -> ApiResult<Errand> {
    activities::get_or_create_draft(&user, &state.deps).await.map(Json)
}

pub async fn market_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
) -> ApiResult<Vec<Errand>> {
    activities::market_errands(&user, &state.deps).await.map(Json)
}

pub async fn list_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
) -> ApiResult<Vec<Errand>> {
    activities::errands_for(&user, &state.deps).await.map(Json)
}

pub async fn get_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ErrandId>,
) -> ApiResult<Errand> {
    activities::get_errand(&user, id, &state.deps).await.map(Json)
}

pub async fn update_draft_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ErrandId>,
    Json(input): Json<UpdateDraftInput>,
) -> ApiResult<Errand> {
    activities::update_draft(&user, id, input, &state.deps)
        .await
        .map(Json)
}

pub async fn publish_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ErrandId>,
    Json(input): Json<ErrandInput>,
) -> ApiResult<Errand> {
    activities::publish_errand(&user, id, input, &state.deps)
        .await
        .map(Json)
}

pub async fn cancel_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ErrandId>,
    Query(params): Query<CancelParams>,
) -> ApiResult<Errand> {
    activities::cancel_errand(&user, id, params.reason, &state.deps)
        .await
        .map(Json)
}

pub async fn complete_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ErrandId>,
    Json(body): Json<CompleteRequest>,
) -> ApiResult<Errand> {
    activities::complete_errand(&user, id, body.source, &state.deps)
        .await
        .map(Json)
}

pub async fn submit_bid_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ErrandId>,
    Json(input): Json<BidInput>,
) -> ApiResult<Errand> {
    activities::submit_bid(&user, id, input, &state.deps)
        .await
        .map(Json)
}

pub async fn counter_offer_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path((id, bid_id)): Path<(ErrandId, BidId)>,
    Json(input): Json<HaggleInput>,
) -> ApiResult<Errand> {
    activities::counter_offer(&user, id, bid_id, input, &state.deps)
        .await
        .map(Json)
}

pub async fn accept_bid_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path((id, bid_id)): Path<(ErrandId, BidId)>,
    Json(body): Json<AcceptBidRequest>,
) -> ApiResult<Errand> {
    activities::accept_bid(&user, id, bid_id, body.runner, &state.deps)
        .await
        .map(Json)
}

pub async fn reject_bid_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path((id, bid_id)): Path<(ErrandId, BidId)>,
) -> ApiResult<Errand> {
    activities::reject_bid(&user, id, bid_id, &state.deps)
        .await
        .map(Json)
}

pub async fn accept_contract_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path((id, bid_id)): Path<(ErrandId, BidId)>,
) -> ApiResult<Errand> {
    activities::accept_contract(&user, id, bid_id, &state.deps)
        .await
        .map(Json)
}

pub async fn reject_contract_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path((id, bid_id)): Path<(ErrandId, BidId)>,
) -> ApiResult<Errand> {
    activities::reject_contract(&user, id, bid_id, &state.deps)
        .await
        .map(Json)
}

pub async fn post_timeline_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ErrandId>,
    Json(body): Json<TimelineRequest>,
) -> ApiResult<Errand> {
    activities::post_timeline_update(&user, id, body.message, &state.deps)
        .await
        .map(Json)
}

pub async fn request_timeline_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ErrandId>,
) -> ApiResult<Errand> {
    activities::request_timeline_update(&user, id, &state.deps)
        .await
        .map(Json)
}

pub async fn rate_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ErrandId>,
    Json(body): Json<RateRequest>,
) -> ApiResult<serde_json::Value> {
    activities::rate_runner(&user, id, body.runner, body.rating, &state.deps).await?;
    Ok(Json(serde_json::json!({ "rated": true })))
}
