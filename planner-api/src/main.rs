mod adapters;
mod app_state;
mod auth;
mod config;
mod domain;
mod factory;
mod router;
mod routes;
mod seed;

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{fmt::time::UtcTime, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename("./planner-api/.env.local").ok();
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("planner_api=debug,tower_http=info,info")),
        )
        .with_timer(UtcTime::rfc_3339())
        .init();

    let settings = config::read_config().context("Failed to read configuration")?;

    let pool = settings
        .database
        .pool_options()
        .connect_lazy_with(settings.database.with_db());

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    if settings.seed.enabled {
        factory::build_seeder(&pool, &settings.auth)?
            .run(&settings.seed)
            .await
            .context("Failed to seed database")?;
    }

    let app_state = factory::build_app_state(&pool, &settings.auth)?;
    let app = router::create(app_state, &settings.application);

    let addr: SocketAddr = format!("{}:{}", settings.application.host, settings.application.port)
        .parse()
        .context("Invalid application host/port")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
