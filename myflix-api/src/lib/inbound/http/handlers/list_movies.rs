use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::MovieData;
use crate::inbound::http::router::AppState;
use crate::movie::ports::CatalogServicePort;

pub async fn list_movies(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<MovieData>>, ApiError> {
    state
        .catalog_service
        .list_movies()
        .await
        .map_err(ApiError::from)
        .map(|movies| {
            ApiSuccess::new(
                StatusCode::OK,
                movies.iter().map(MovieData::from).collect(),
            )
        })
}
