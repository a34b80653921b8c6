//! Admin routes for offline errands. Capability checks happen in the activities.

use axum::{
    extract::{Extension, Path, Query},
    Json,
};
use serde::Deserialize;

use crate::common::{ErrandId, UserId};
use crate::domains::admin::activities::{self, ErrandFilter};
use crate::domains::errands::data::ErrandInput;
use crate::domains::errands::models::Errand;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::middleware::RequireUser;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub filter: ErrandFilter,
}

#[derive(Debug, Deserialize)]
pub struct OfflineErrandRequest {
    pub user_id: UserId,
    pub errand: ErrandInput,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub runner: UserId,
}

pub async fn list_errands_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Errand>> {
    activities::list_errands(&user, params.filter, &state.deps)
        .await
        .map(Json)
}

pub async fn create_offline_errand_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<OfflineErrandRequest>,
) -> ApiResult<Errand> {
    activities::create_offline_errand(&user, body.user_id, body.errand, &state.deps)
        .await
        .map(Json)
}

pub async fn assign_runner_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ErrandId>,
    Json(body): Json<AssignRequest>,
) -> ApiResult<Errand> {
    activities::assign_offline_runner(&user, id, body.runner, &state.deps)
        .await
        .map(Json)
}
