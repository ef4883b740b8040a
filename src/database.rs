//! Database connection management

use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::mirror::MirrorError;

/// Connect to the `SQLite` database at `database_url`, creating it if missing,
/// and bring its schema up to date.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the connection cannot be
/// established or a migration fails.
pub async fn connect(database_url: &str) -> Result<SqlitePool, MirrorError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    migrate(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the mirror schema.
///
/// The pool holds a single connection that is never recycled, since every
/// in-memory connection sees its own empty database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established or a migration fails.
pub async fn connect_in_memory() -> Result<SqlitePool, MirrorError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;

    Ok(pool)
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub async fn migrate(pool: &SqlitePool) -> Result<(), MirrorError> {
    sqlx::migrate!("./migrations").run(pool).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn in_memory_database_has_mirror_tables() -> TestResult {
        let pool = connect_in_memory().await?;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite%' AND name NOT LIKE '\\_%' ESCAPE '\\' ORDER BY name",
        )
        .fetch_all(&pool)
        .await?;

        assert_eq!(tables, ["cart_lines", "favorite_entries"]);

        Ok(())
    }

    #[tokio::test]
    async fn file_database_is_created_when_missing() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("storefront.db");

        connect(&format!("sqlite://{}", path.display())).await?;

        assert!(path.exists(), "database file should have been created");

        Ok(())
    }
}
