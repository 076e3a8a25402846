use std::sync::Arc;

use actix_web::{App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use microblog_service::config::Config;
use microblog_service::db::{PgPostRepository, PgUserRepository};
use microblog_service::routes;
use microblog_service::security::TokenCodec;
use microblog_service::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,microblog_service=debug")),
        )
        .init();

    let config = Config::from_env().map_err(|e| {
        tracing::error!("configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            tracing::error!("failed to connect to database: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e)
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let state = AppState::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgPostRepository::new(pool)),
        Arc::new(TokenCodec::from_config(&config.auth)),
    );

    let bind = (config.app.host.clone(), config.app.port);
    tracing::info!(host = %bind.0, port = bind.1, env = %config.app.env, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(routes::cors(&config.cors))
            .configure(|cfg| routes::configure(cfg, state.clone()))
    })
    .bind(bind)?
    .run()
    .await
}
