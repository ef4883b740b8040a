//! Favorites Repository

use async_trait::async_trait;
use sqlx::{FromRow, Sqlite, SqlitePool, query, query_as, sqlite::SqliteRow};

use crate::{
    favorites::models::FavoriteEntry,
    mirror::{
        Change, Mirror, MirrorError,
        columns::{SqliteQuery, bind_product, id_column, product_from_row, timestamp_column},
    },
};

const LIST_FAVORITE_ENTRIES_SQL: &str = include_str!("sql/list_favorite_entries.sql");
const INSERT_FAVORITE_ENTRY_SQL: &str = include_str!("sql/insert_favorite_entry.sql");
const UPSERT_FAVORITE_ENTRY_SQL: &str = include_str!("sql/upsert_favorite_entry.sql");
const DELETE_FAVORITE_ENTRY_SQL: &str = include_str!("sql/delete_favorite_entry.sql");
const DELETE_ALL_FAVORITE_ENTRIES_SQL: &str = include_str!("sql/delete_all_favorite_entries.sql");

/// `SQLite` mirror of the favorites.
#[derive(Debug, Clone)]
pub struct SqliteFavoritesRepository {
    pool: SqlitePool,
}

impl SqliteFavoritesRepository {
    /// Create a repository backed by `pool`.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn bind_entry<'q>(
    query: SqliteQuery<'q>,
    entry: &FavoriteEntry,
) -> Result<SqliteQuery<'q>, sqlx::Error> {
    Ok(bind_product(query.bind(i64::from(entry.id)), &entry.product)?
        .bind(entry.added_at.as_millisecond()))
}

#[async_trait]
impl Mirror<FavoriteEntry> for SqliteFavoritesRepository {
    async fn list_all(&self) -> Result<Vec<FavoriteEntry>, MirrorError> {
        Ok(query_as::<Sqlite, FavoriteEntry>(LIST_FAVORITE_ENTRIES_SQL)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_all(&self) -> Result<(), MirrorError> {
        query(DELETE_ALL_FAVORITE_ENTRIES_SQL)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert(&self, entry: &FavoriteEntry) -> Result<(), MirrorError> {
        bind_entry(query(INSERT_FAVORITE_ENTRY_SQL), entry)?
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn apply(&self, changes: &[Change<FavoriteEntry>]) -> Result<(), MirrorError> {
        let mut tx = self.pool.begin().await?;

        for change in changes {
            match change {
                Change::Upsert(entry) => {
                    bind_entry(query(UPSERT_FAVORITE_ENTRY_SQL), entry)?
                        .execute(&mut *tx)
                        .await?;
                }
                Change::Delete(id) => {
                    query(DELETE_FAVORITE_ENTRY_SQL)
                        .bind(i64::from(*id))
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;

        Ok(())
    }
}

impl<'r> FromRow<'r, SqliteRow> for FavoriteEntry {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: id_column(row, "entry_id")?,
            product: product_from_row(row)?,
            added_at: timestamp_column(row, "added_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{database, favorites::models::EntryId, test_support::product};

    fn entry(id: u32, product_id: u32, title: &str) -> FavoriteEntry {
        FavoriteEntry {
            id: EntryId::new(id),
            product: product(product_id, title, Decimal::new(1999, 2), Decimal::ZERO),
            added_at: Timestamp::constant(1_700_000_000, 0),
        }
    }

    #[tokio::test]
    async fn entries_round_trip_and_apply_changes() -> TestResult {
        let repo = SqliteFavoritesRepository::new(database::connect_in_memory().await?);

        repo.insert(&entry(1, 10, "Lamp")).await?;
        repo.insert(&entry(2, 11, "Desk")).await?;

        assert_eq!(
            repo.list_all().await?,
            [entry(1, 10, "Lamp"), entry(2, 11, "Desk")]
        );

        repo.apply(&[
            Change::Delete(EntryId::new(1)),
            Change::Upsert(entry(2, 11, "Standing desk")),
        ])
        .await?;

        assert_eq!(repo.list_all().await?, [entry(2, 11, "Standing desk")]);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_entry_id_is_rejected_on_insert() -> TestResult {
        let repo = SqliteFavoritesRepository::new(database::connect_in_memory().await?);

        repo.insert(&entry(1, 10, "Lamp")).await?;

        assert!(
            repo.insert(&entry(1, 11, "Desk")).await.is_err(),
            "entry ids are unique"
        );

        Ok(())
    }
}
