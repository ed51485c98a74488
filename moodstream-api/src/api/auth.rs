//! Identity middleware
//!
//! Authentication and session issuance live in the fronting auth
//! layer; requests arrive with an `X-User-Id` header carrying the
//! authenticated user id. Protected routes reject requests without a
//! well-formed id.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{ApiError, AppState};

/// Authenticated identity attached to protected requests
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Reject requests without a valid identity header and record the user.
///
/// Applied to protected routes only; track lookup, streaming,
/// suggestions and /health stay public.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing X-User-Id header".to_string()))?;

    let user_id = Uuid::parse_str(header)
        .map_err(|_| ApiError::Unauthorized("Malformed X-User-Id header".to_string()))?;

    crate::db::users::ensure_user(&state.db, user_id).await?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
