use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Extension type carrying the authenticated identity through the request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub username: String,
}

/// Owner-only authorization predicate.
///
/// Separate from authentication: the caller has already proven who they
/// are; this decides whether that identity may touch the target account.
/// Applied by every handler that mutates a specific user's data.
pub fn ensure_owner(current: &CurrentUser, owner: &UserId) -> Result<(), ApiError> {
    if current.user_id == *owner {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Permission denied".to_string()))
    }
}

/// Access guard: validates the bearer token and attaches the resolved
/// identity to the request. Protected handlers never run on a rejected
/// token.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let claims = state.authenticator.verify_token(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid or expired token"
            })),
        )
            .into_response()
    })?;

    // The subject claim is the immutable user id.
    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::error!("Failed to parse user ID from token subject: {}", e);
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid token format"
            })),
        )
            .into_response()
    })?;

    req.extensions_mut().insert(CurrentUser {
        user_id,
        username: claims.username,
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Missing Authorization header"
                })),
            )
                .into_response()
        })?;

    let auth_str = auth_header.to_str().map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid Authorization header"
            })),
        )
            .into_response()
    })?;

    if !auth_str.starts_with("Bearer ") {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid Authorization header format. Expected: Bearer <token>"
            })),
        )
            .into_response());
    }

    Ok(auth_str.trim_start_matches("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_owner_accepts_matching_identity() {
        let user_id = UserId::new();
        let current = CurrentUser {
            user_id,
            username: "JohnnyD1".to_string(),
        };

        assert!(ensure_owner(&current, &user_id).is_ok());
    }

    #[test]
    fn test_ensure_owner_rejects_other_account() {
        let current = CurrentUser {
            user_id: UserId::new(),
            username: "JohnnyD1".to_string(),
        };

        let result = ensure_owner(&current, &UserId::new());
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }
}
