use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::DisplayNameError;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UsernameError;
use crate::user::ports::UserServicePort;

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .user_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registration (raw JSON, original wire casing)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserRequest {
    name: String,
    username: String,
    password: String,
    email: String,
    #[serde(default)]
    birthdate: Option<NaiveDate>,
}

#[derive(Debug, Clone, Error)]
enum ParseCreateUserRequestError {
    #[error("Invalid name: {0}")]
    Name(#[from] DisplayNameError),

    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordPolicyError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),
}

impl CreateUserRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, ParseCreateUserRequestError> {
        let name = DisplayName::new(self.name)?;
        let username = Username::new(self.username)?;
        let password = Password::new(self.password)?;
        let email = EmailAddress::new(self.email)?;
        Ok(CreateUserCommand {
            username,
            name,
            email,
            password,
            birthdate: self.birthdate,
        })
    }
}

impl From<ParseCreateUserRequestError> for ApiError {
    fn from(err: ParseCreateUserRequestError) -> Self {
        ApiError::UnprocessableEntity(err.to_string())
    }
}
