use std::sync::Arc;

use myflix_api::config::Config;
use myflix_api::domain::movie::service::CatalogService;
use myflix_api::domain::user::service::UserService;
use myflix_api::inbound::http::router::create_router;
use myflix_api::outbound::repositories::PostgresMovieRepository;
use myflix_api::outbound::repositories::PostgresUserRepository;
use myflix_auth::Authenticator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "myflix_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "myflix-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let authenticator = Arc::new(Authenticator::new(config.jwt.secret.as_bytes()));
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let movie_repository = Arc::new(PostgresMovieRepository::new(pg_pool));

    let user_service = Arc::new(UserService::new(
        user_repository,
        Arc::clone(&movie_repository),
        Arc::clone(&authenticator),
    ));
    let catalog_service = Arc::new(CatalogService::new(movie_repository));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let application = create_router(user_service, catalog_service, authenticator);
    axum::serve(http_listener, application).await?;

    Ok(())
}
