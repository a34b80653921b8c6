use axum::{extract::Extension, Json};

use crate::domains::notifications::activities;
use crate::domains::notifications::models::Notification;
use crate::server::app::AppState;
use crate::server::error::ApiResult;
use crate::server::middleware::RequireUser;

pub async fn list_handler(
    Extension(state): Extension<AppState>,
    RequireUser(user): RequireUser,
) -> ApiResult<Vec<Notification>> {
    activities::notifications_for(&user, &state.deps)
        .await
        .map(Json)
}
