//! Database-backed tests. They run against `DATABASE_URL` and are skipped
//! when `SKIP_DB_TESTS` is set or the database cannot be reached.

use std::time::Duration;

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::db::{connect_with_config, DatabaseConfig};

/// CRUD operations on users, clients and personal info
pub mod crud_tests;


// Migrations run only once across the test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    DatabaseConfig {
        max_connections: 5,
        min_connections: 1,
        connect_timeout: Duration::from_secs(3),
        acquire_timeout: Duration::from_secs(5),
        ..DatabaseConfig::from_env()
    }
}

pub(crate) async fn test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let ready = *MIGRATED
        .get_or_init(|| async {
            match connect_with_config(&test_config()).await {
                Ok(db) => migration::Migrator::up(&db, None).await.is_ok(),
                Err(_) => false,
            }
        })
        .await;
    if !ready {
        eprintln!("skip: database unavailable");
        return None;
    }
    connect_with_config(&test_config()).await.ok()
}

/// Short unique suffix for usernames, emails and VATs.
pub(crate) fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_string()
}
