//! Schema migrations for the PostgreSQL credential store.

use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};
use tracing::info;

/// Migrations under `sesame_core/migrations/`, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Bring the `users` schema up to date. Already-applied migrations are
/// skipped.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    info!(available = MIGRATOR.iter().count(), "applying credential store migrations");
    MIGRATOR.run(pool).await
}
