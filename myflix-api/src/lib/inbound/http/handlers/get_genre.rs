use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::GenreData;
use crate::inbound::http::router::AppState;
use crate::movie::ports::CatalogServicePort;

pub async fn get_genre(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ApiSuccess<GenreData>, ApiError> {
    state
        .catalog_service
        .get_genre(&name)
        .await
        .map_err(ApiError::from)
        .map(|ref genre| ApiSuccess::new(StatusCode::OK, genre.into()))
}
