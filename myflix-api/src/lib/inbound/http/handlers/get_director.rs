use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::DirectorData;
use crate::inbound::http::router::AppState;
use crate::movie::ports::CatalogServicePort;

pub async fn get_director(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<ApiSuccess<DirectorData>, ApiError> {
    state
        .catalog_service
        .get_director(&name)
        .await
        .map_err(ApiError::from)
        .map(|ref director| ApiSuccess::new(StatusCode::OK, director.into()))
}
