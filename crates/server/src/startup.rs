use std::sync::Arc;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};
use service::auth::{repo::seaorm::SeaOrmAuthRepository, repository::AuthRepository, AuthConfig};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    // DB connection + schema
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Runtime(format!("migrations: {e}")))?;

    let repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository { db });
    let state = ServerState::new(repo, AuthConfig::from_app_config(&cfg));

    let app: Router = routes::build_router(state, build_cors());

    // Bind and serve
    let listener = tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, issuer = %cfg.jwt.issuer, expiry_minutes = cfg.jwt.expiry_minutes, "starting auth server");
    axum::serve(listener, app).await?;
    Ok(())
}
