use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Serialize;

use crate::movie::errors::MovieError;
use crate::movie::models::Actor;
use crate::movie::models::Director;
use crate::movie::models::Genre;
use crate::movie::models::Movie;
use crate::movie::models::MovieSummary;
use crate::user::errors::UserError;
use crate::user::models::User;

pub mod add_favorite;
pub mod create_user;
pub mod delete_user;
pub mod get_director;
pub mod get_genre;
pub mod get_movie;
pub mod get_user;
pub mod list_favorites;
pub mod list_movies;
pub mod list_users;
pub mod login;
pub mod remove_favorite;
pub mod update_user;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        (status, Json(ApiResponseBody::new_error(status, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) | UserError::MovieNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            UserError::UsernameAlreadyExists(_) => ApiError::Conflict(err.to_string()),
            UserError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            UserError::InvalidUserId(_) => ApiError::BadRequest(err.to_string()),
            UserError::InvalidUsername(_)
            | UserError::InvalidDisplayName(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidPassword(_) => ApiError::UnprocessableEntity(err.to_string()),
            UserError::DatabaseError(_) | UserError::Unknown(_) => {
                // Persistence detail stays in the log; the client gets a
                // generic failure.
                tracing::error!(error = %err, "Request failed with an internal error");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

impl From<MovieError> for ApiError {
    fn from(err: MovieError) -> Self {
        match err {
            MovieError::NotFound(_)
            | MovieError::GenreNotFound(_)
            | MovieError::DirectorNotFound(_) => ApiError::NotFound(err.to_string()),
            MovieError::InvalidMovieId(_) => ApiError::BadRequest(err.to_string()),
            MovieError::DatabaseError(_) => {
                tracing::error!(error = %err, "Request failed with an internal error");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
}

/// User as it leaves the API. The password hash never appears here; the
/// field names keep the original myFlix wire casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserData {
    #[serde(rename = "id")]
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    pub favorites: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserData {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.as_str().to_string(),
            username: user.username.as_str().to_string(),
            email: user.email.as_str().to_string(),
            birthdate: user.birthdate,
            favorites: user.favorites.iter().map(|id| id.to_string()).collect(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovieData {
    #[serde(rename = "id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub director: DirectorData,
    pub genre: GenreData,
    pub actors: Vec<ActorData>,
}

impl From<&Movie> for MovieData {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id.to_string(),
            title: movie.title.clone(),
            description: movie.description.clone(),
            release_year: movie.release_year,
            director: (&movie.director).into(),
            genre: (&movie.genre).into(),
            actors: movie.actors.iter().map(ActorData::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DirectorData {
    pub name: String,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
}

impl From<&Director> for DirectorData {
    fn from(director: &Director) -> Self {
        Self {
            name: director.name.clone(),
            bio: director.bio.clone(),
            birth_year: director.birth_year,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenreData {
    pub name: String,
    pub description: String,
}

impl From<&Genre> for GenreData {
    fn from(genre: &Genre) -> Self {
        Self {
            name: genre.name.clone(),
            description: genre.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActorData {
    #[serde(rename = "id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    pub movies: Vec<MovieRefData>,
}

impl From<&Actor> for ActorData {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id.to_string(),
            name: actor.name.clone(),
            birth_year: actor.birth_year,
            movies: actor.movies.iter().map(MovieRefData::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MovieRefData {
    #[serde(rename = "id")]
    pub id: String,
    pub title: String,
}

impl From<&MovieSummary> for MovieRefData {
    fn from(summary: &MovieSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            title: summary.title.clone(),
        }
    }
}
