use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserServicePort;

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<UserData>>, ApiError> {
    state
        .user_service
        .list_users()
        .await
        .map_err(ApiError::from)
        .map(|users| {
            ApiSuccess::new(StatusCode::OK, users.iter().map(UserData::from).collect())
        })
}
