//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, TOKEN_KIND_ACCESS};
use crate::domain::{Actor, Role};
use crate::errors::AppError;

/// Authenticated user extracted from the JWT access token.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    /// Policy principal for this request.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Validates the bearer token and injects [`CurrentUser`] into the
/// request extensions. Refresh tokens are rejected here: only `access`
/// tokens open protected routes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;
    if claims.kind != TOKEN_KIND_ACCESS {
        return Err(AppError::Unauthorized);
    }

    let role: Role = claims.role.parse().map_err(|_| AppError::Unauthorized)?;

    let current_user = CurrentUser {
        id: claims.sub,
        username: claims.username,
        role,
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
