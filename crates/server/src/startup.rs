use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use models::db::{connect_with_config, DatabaseConfig};
use service::auth::{repo::seaorm::SeaOrmAuthRepository, repository::AuthRepository, service::AuthConfig, AuthService};
use service::client::{repo::seaorm::SeaOrmClientRepository, repository::ClientRepository, ClientService};
use service::password::{Argon2PasswordEncoder, PasswordEncoder};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Config file first; without one, fall back to env vars with dev defaults
fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            warn!(error = %e, "config file unusable, falling back to environment");
            let mut cfg = AppConfig::default();
            cfg.server.host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            cfg.server.port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8081);
            cfg.database.url = models::db::DATABASE_URL.clone();
            cfg.normalize_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
            Ok(cfg)
        }
    }
}

/// Wire repositories and services into shared handler state.
pub fn build_state(db: sea_orm::DatabaseConnection, cfg: &AppConfig) -> ServerState {
    let encoder: Arc<dyn PasswordEncoder> = Arc::new(Argon2PasswordEncoder);
    let client_repo: Arc<dyn ClientRepository> = Arc::new(SeaOrmClientRepository::new(db.clone()));
    let auth_repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository { db });
    let auth_cfg = AuthConfig { jwt_secret: cfg.auth.jwt_secret.clone(), token_ttl_hours: cfg.auth.token_ttl_hours };
    ServerState {
        clients: Arc::new(ClientService::new(client_repo, Arc::clone(&encoder))),
        auth: Arc::new(AuthService::new(auth_repo, encoder, auth_cfg)),
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config()?;

    // DB connection and schema
    let db_cfg = DatabaseConfig::from(&cfg.database);
    let db = connect_with_config(&db_cfg)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;

    let state = build_state(db, &cfg);

    // Build router
    let app: Router = routes::build_router(state, build_cors());

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting client registry server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
