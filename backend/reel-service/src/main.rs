use std::time::Duration;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use reel_service::config::Config;
use reel_service::routes;
use reel_service::security::tokens::TokenManager;
use reel_service::services::{EngagementService, MembershipResolver};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("starting reel-service ({} mode)", config.app.env);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database.url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("database migrations applied");

    let tokens = TokenManager::new(config.auth.jwt_secret.clone(), config.auth.jwt_expiry_hours);
    let engagement = EngagementService::new(pool.clone());
    let membership = MembershipResolver::new(pool.clone());

    let host = config.app.host.clone();
    let port = config.app.http_port;
    info!("listening on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::Data::new(engagement.clone()))
            .app_data(web::Data::new(membership.clone()))
            .configure(|cfg| routes::configure_routes(cfg, tokens.clone()))
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
