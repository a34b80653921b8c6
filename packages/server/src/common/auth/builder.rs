use super::{AdminCapability, AuthError};
use crate::common::entity_ids::UserId;

/// Entry point for authorization checks
///
/// Usage:
/// ```
/// # use errand_core::common::auth::{Actor, AdminCapability};
/// # use errand_core::common::UserId;
/// # fn run(actor_id: UserId, is_admin: bool) -> Result<(), errand_core::common::auth::AuthError> {
/// Actor::new(actor_id, is_admin)
///     .can(AdminCapability::ViewAllErrands)
///     .check()?;
/// # Ok(())
/// # }
/// ```
pub struct Actor {
    actor_id: UserId,
    is_admin: bool,
}

impl Actor {
    /// `is_admin` comes from the resolved session, already trusted at this point.
    pub fn new(actor_id: UserId, is_admin: bool) -> Self {
        Self { actor_id, is_admin }
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: AdminCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor_id: self.actor_id,
            is_admin: self.is_admin,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor_id: UserId,
    is_admin: bool,
    capability: AdminCapability,
}

impl CapabilityBuilder {
    /// Perform the authorization check
    pub fn check(self) -> Result<(), AuthError> {
        if !self.is_admin {
            tracing::debug!(
                actor_id = %self.actor_id,
                capability = self.capability.as_str(),
                "Admin capability denied"
            );
            return Err(AuthError::AdminRequired);
        }

        Ok(())
    }
}
