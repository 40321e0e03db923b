use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::inbound::http::middleware::ensure_owner;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;
use crate::user::ports::UserServicePort;

/// HTTP request body for a partial profile update (raw JSON)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

impl UpdateUserRequest {
    fn try_into_command(self) -> Result<UpdateUserCommand, UserError> {
        // Validation happens here - errors are automatically converted via #[from]
        let username = self.username.map(Username::new).transpose()?;
        let name = self.name.map(DisplayName::new).transpose()?;
        let email = self.email.map(EmailAddress::new).transpose()?;
        let password = self.password.map(Password::new).transpose()?;

        Ok(UpdateUserCommand {
            username,
            name,
            email,
            password,
            birthdate: self.birthdate,
        })
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;

    // Owner check comes before body validation: a non-owner gets 403 no
    // matter what the payload contains.
    ensure_owner(&current, &user_id)?;

    let command = req.try_into_command()?;

    state
        .user_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
