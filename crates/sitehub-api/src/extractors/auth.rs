//! `AuthUser` extractor — pulls the JWT from the Authorization header,
//! validates it, and injects the request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use sitehub_core::error::AppError;
use sitehub_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.jwt_decoder.decode(token)?;

        let ctx = RequestContext::new(claims.sub, claims.role, claims.username);
        Ok(AuthUser(ctx))
    }
}
