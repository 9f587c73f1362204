//! Database migration command.
//!
//! Applies the migrations in `crates/server/migrations/`. The server never
//! migrates on start-up; run this before deploying a new schema.
//!
//! # Environment Variables
//!
//! - `BAATTAK_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use super::{CommandError, database_url};

/// Run database migrations.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = baattak_server::db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
