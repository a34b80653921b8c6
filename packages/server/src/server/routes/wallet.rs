use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::domains::wallet::activities;
use crate::domains::wallet::models::{Wallet, WalletTransaction};
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::middleware::RequireUser;

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: i64,
}

pub async fn wallet_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
) -> ApiResult<Wallet> {
    activities::wallet_for(&user, &state.deps).await.map(Json)
}

pub async fn top_up_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<AmountRequest>,
) -> ApiResult<WalletTransaction> {
    activities::top_up(&user, body.amount, &state.deps)
        .await
        .map(Json)
}

pub async fn withdraw_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<AmountRequest>,
) -> ApiResult<WalletTransaction> {
    activities::withdraw(&user, body.amount, &state.deps)
        .await
        .map(Json)
}
