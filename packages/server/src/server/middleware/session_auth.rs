use axum::{
    async_trait,
    extract::{Extension, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::common::{AuthUser, ErrandError};
use crate::server::app::AppState;

/// Session authentication middleware
///
/// Resolves the bearer token through the identity resolver and adds the
/// `AuthUser` to request extensions. Requests without a valid token continue
/// unauthenticated; handlers that need a caller use [`RequireUser`].
pub async fn session_auth_middleware(
    Extension(state): Extension<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&request) {
        match state.deps.identity.resolve(token).await {
            Ok(Some(user)) => {
                debug!(user_id = %user.user_id, is_admin = user.is_admin, "Authenticated user");
                request.extensions_mut().insert(user);
            }
            Ok(None) => debug!("Unknown or expired session token"),
            Err(e) => warn!(error = %e, "Session lookup failed"),
        }
    }

    next.run(request).await
}

/// Extract the token from `Authorization: Bearer <token>` or a raw header value.
fn bearer_token(request: &Request) -> Option<&str> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    (!token.is_empty()).then_some(token)
}

/// Extractor for handlers that require a signed-in caller.
#[derive(Debug, Clone)]
pub struct RequireUser(pub AuthUser);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequireUser {
    type Rejection = ErrandError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(RequireUser)
            .ok_or(ErrandError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_extract_token_with_bearer() {
        let request = Request::builder()
            .header("authorization", "Bearer abc123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request), Some("abc123"));
    }

    #[test]
    fn test_extract_token_without_bearer() {
        let request = Request::builder()
            .header("authorization", "abc123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request), Some("abc123"));
    }

    #[test]
    fn test_no_auth_header() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(bearer_token(&request), None);
    }
}
