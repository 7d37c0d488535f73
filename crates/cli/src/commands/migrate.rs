//! Database migration command.

use treasury_server::db;

use super::CliError;

/// Bring the treasury database schema up to date.
///
/// Creates the database file when it does not exist yet; already-applied
/// migrations are skipped.
pub async fn run() -> Result<(), CliError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to treasury database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
