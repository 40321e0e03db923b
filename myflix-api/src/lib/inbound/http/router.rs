use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use myflix_auth::Authenticator;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::add_favorite::add_favorite;
use super::handlers::create_user::create_user;
use super::handlers::delete_user::delete_user;
use super::handlers::get_director::get_director;
use super::handlers::get_genre::get_genre;
use super::handlers::get_movie::get_movie;
use super::handlers::get_user::get_user;
use super::handlers::list_favorites::list_favorites;
use super::handlers::list_movies::list_movies;
use super::handlers::list_users::list_users;
use super::handlers::login::login;
use super::handlers::remove_favorite::remove_favorite;
use super::handlers::update_user::update_user;
use super::middleware::authenticate as auth_middleware;
use crate::domain::movie::service::CatalogService;
use crate::domain::user::service::UserService;
use crate::outbound::repositories::movie::PostgresMovieRepository;
use crate::outbound::repositories::user::PostgresUserRepository;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService<PostgresUserRepository, PostgresMovieRepository>>,
    pub catalog_service: Arc<CatalogService<PostgresMovieRepository>>,
    pub authenticator: Arc<Authenticator>,
}

pub fn create_router(
    user_service: Arc<UserService<PostgresUserRepository, PostgresMovieRepository>>,
    catalog_service: Arc<CatalogService<PostgresMovieRepository>>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        user_service,
        catalog_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/login", post(login))
        .route("/users", post(create_user));

    let protected_routes = Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id", get(get_user))
        .route("/users/:user_id", put(update_user))
        .route("/users/:user_id", delete(delete_user))
        .route("/users/:user_id/favorites", get(list_favorites))
        .route("/users/:user_id/movies/:movie_id", post(add_favorite))
        .route("/users/:user_id/movies/:movie_id", delete(remove_favorite))
        .route("/movies", get(list_movies))
        .route("/movies/:movie_id", get(get_movie))
        .route("/movies/genre/:name", get(get_genre))
        .route("/movies/director/:name", get(get_director))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
