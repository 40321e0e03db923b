use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

pub async fn list_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<ApiSuccess<Vec<String>>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;

    state
        .user_service
        .favorite_titles(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|titles| ApiSuccess::new(StatusCode::OK, titles))
}
