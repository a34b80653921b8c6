use thiserror::Error;

use super::auth::AuthError;

/// Errors surfaced by errand, wallet and admin operations.
///
/// Every variant maps onto a single HTTP status in the server layer; messages
/// are returned to clients verbatim, except `Dependency` which is logged and
/// reported generically.
#[derive(Error, Debug)]
pub enum ErrandError {
    /// Malformed or out-of-range input. Nothing was written.
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthenticated,

    /// The caller is authenticated but does not own the resource or lacks the role.
    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    /// The errand or bid is not in a state that admits the operation.
    #[error("{0}")]
    StateGuard(String),

    /// A concurrent writer won the race for the same errand.
    #[error("{0}")]
    Conflict(String),

    /// Storage, ledger or another collaborator failed.
    #[error("Internal error: {0}")]
    Dependency(#[from] anyhow::Error),
}

pub type ErrandResult<T> = std::result::Result<T, ErrandError>;

impl ErrandError {
    pub fn validation(message: impl Into<String>) -> Self {
        ErrandError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ErrandError::Authorization(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ErrandError::NotFound(message.into())
    }

    pub fn state_guard(message: impl Into<String>) -> Self {
        ErrandError::StateGuard(message.into())
    }
}

impl From<AuthError> for ErrandError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired => ErrandError::Unauthenticated,
            AuthError::AdminRequired => ErrandError::Authorization(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ErrandError {
    fn from(err: sqlx::Error) -> Self {
        ErrandError::Dependency(err.into())
    }
}
