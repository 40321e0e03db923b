use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::user::models::UserId;
use crate::inbound::http::middleware::ensure_owner;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<ApiSuccess<String>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;

    ensure_owner(&current, &user_id)?;

    state
        .user_service
        .delete_user(&user_id)
        .await
        .map_err(ApiError::from)
        .map(|user| {
            ApiSuccess::new(
                StatusCode::OK,
                format!("{} was deleted from myFlix.", user.username),
            )
        })
}
