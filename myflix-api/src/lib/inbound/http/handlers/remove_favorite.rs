use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;
use crate::movie::errors::MovieError;
use crate::movie::models::MovieId;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((user_id, movie_id)): Path<(String, String)>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&user_id).map_err(UserError::from)?;
    let movie_id = MovieId::from_string(&movie_id).map_err(MovieError::from)?;

    state
        .user_service
        .remove_favorite(&user_id, &movie_id)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
