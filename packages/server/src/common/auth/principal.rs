use serde::{Deserialize, Serialize};

use crate::common::UserId;

/// The caller behind a request, as resolved from its session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl AuthUser {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}
