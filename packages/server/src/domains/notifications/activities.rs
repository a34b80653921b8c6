use crate::common::{AuthUser, ErrandResult};
use crate::domains::notifications::models::Notification;
use crate::kernel::ServerDeps;

/// The caller's inbox, newest first.
pub async fn notifications_for(
    actor: &AuthUser,
    deps: &ServerDeps,
) -> ErrandResult<Vec<Notification>> {
    Ok(deps.notifications.list_for(actor.user_id).await?)
}
