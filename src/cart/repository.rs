//! Cart Repository

use async_trait::async_trait;
use sqlx::{FromRow, Sqlite, SqlitePool, query, query_as, sqlite::SqliteRow};

use crate::{
    cart::models::CartLine,
    mirror::{
        Change, Mirror, MirrorError,
        columns::{SqliteQuery, bind_product, decode_column, id_column, product_from_row, timestamp_column},
    },
};

const LIST_CART_LINES_SQL: &str = include_str!("sql/list_cart_lines.sql");
const INSERT_CART_LINE_SQL: &str = include_str!("sql/insert_cart_line.sql");
const UPSERT_CART_LINE_SQL: &str = include_str!("sql/upsert_cart_line.sql");
const DELETE_CART_LINE_SQL: &str = include_str!("sql/delete_cart_line.sql");
const DELETE_ALL_CART_LINES_SQL: &str = include_str!("sql/delete_all_cart_lines.sql");

/// `SQLite` mirror of the cart.
#[derive(Debug, Clone)]
pub struct SqliteCartRepository {
    pool: SqlitePool,
}

impl SqliteCartRepository {
    /// Create a repository backed by `pool`.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn bind_line<'q>(query: SqliteQuery<'q>, line: &CartLine) -> Result<SqliteQuery<'q>, sqlx::Error> {
    Ok(bind_product(query.bind(i64::from(line.id)), &line.product)?
        .bind(i64::from(line.quantity))
        .bind(line.added_at.as_millisecond()))
}

#[async_trait]
impl Mirror<CartLine> for SqliteCartRepository {
    async fn list_all(&self) -> Result<Vec<CartLine>, MirrorError> {
        Ok(query_as::<Sqlite, CartLine>(LIST_CART_LINES_SQL)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_all(&self) -> Result<(), MirrorError> {
        query(DELETE_ALL_CART_LINES_SQL).execute(&self.pool).await?;

        Ok(())
    }

    async fn insert(&self, line: &CartLine) -> Result<(), MirrorError> {
        bind_line(query(INSERT_CART_LINE_SQL), line)?
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn apply(&self, changes: &[Change<CartLine>]) -> Result<(), MirrorError> {
        let mut tx = self.pool.begin().await?;

        for change in changes {
            match change {
                Change::Upsert(line) => {
                    bind_line(query(UPSERT_CART_LINE_SQL), line)?
                        .execute(&mut *tx)
                        .await?;
                }
                Change::Delete(id) => {
                    query(DELETE_CART_LINE_SQL)
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

impl<'r> FromRow<'r, SqliteRow> for CartLine {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: id_column(row, "line_id")?,
            product: product_from_row(row)?,
            quantity: decode_column(row, "quantity", |raw: i64| u32::try_from(raw))?,
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
    use crate::{cart::models::LineId, database, test_support::product};

    fn line(id: u32, product_id: u32, quantity: u32) -> CartLine {
        CartLine {
            id: LineId::new(id),
            product: product(product_id, "Widget", Decimal::from(20), Decimal::from(10)),
            quantity,
            added_at: Timestamp::constant(1_700_000_000, 0),
        }
    }

    async fn repository() -> Result<SqliteCartRepository, MirrorError> {
        Ok(SqliteCartRepository::new(database::connect_in_memory().await?))
    }

    #[tokio::test]
    async fn inserted_lines_round_trip_in_id_order() -> TestResult {
        let repo = repository().await?;

        let mut second = line(2, 8, 1);
        second.product.brand = None;
        second.product.images = vec!["a.png".to_string(), "b.png".to_string()];

        repo.insert(&second).await?;
        repo.insert(&line(1, 7, 3)).await?;

        assert_eq!(repo.list_all().await?, [line(1, 7, 3), second]);

        Ok(())
    }

    #[tokio::test]
    async fn apply_upserts_and_deletes() -> TestResult {
        let repo = repository().await?;

        repo.insert(&line(1, 7, 1)).await?;
        repo.insert(&line(2, 8, 1)).await?;

        repo.apply(&[
            Change::Delete(LineId::new(1)),
            Change::Upsert(line(2, 8, 5)),
            Change::Upsert(line(3, 9, 2)),
        ])
        .await?;

        assert_eq!(repo.list_all().await?, [line(2, 8, 5), line(3, 9, 2)]);

        Ok(())
    }

    #[tokio::test]
    async fn failed_apply_leaves_mirror_untouched() -> TestResult {
        let repo = repository().await?;

        repo.insert(&line(1, 7, 1)).await?;

        // A zero quantity violates the table's check constraint.
        let result = repo
            .apply(&[Change::Delete(LineId::new(1)), Change::Upsert(line(2, 8, 0))])
            .await;

        assert!(result.is_err(), "expected the batch to fail");
        assert_eq!(repo.list_all().await?, [line(1, 7, 1)]);

        Ok(())
    }

    #[tokio::test]
    async fn delete_all_empties_the_table() -> TestResult {
        let repo = repository().await?;

        repo.insert(&line(1, 7, 1)).await?;
        repo.delete_all().await?;

        assert!(repo.list_all().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn corrupt_price_is_a_column_decode_error() -> TestResult {
        let repo = repository().await?;

        repo.insert(&line(1, 7, 1)).await?;

        query("UPDATE cart_lines SET product_price = 'not a number'")
            .execute(&repo.pool)
            .await?;

        let result = repo.list_all().await;

        assert!(
            matches!(
                &result,
                Err(MirrorError::Sql(sqlx::Error::ColumnDecode { index, .. })) if index == "product_price"
            ),
            "expected a decode error, got {result:?}"
        );

        Ok(())
    }
}
