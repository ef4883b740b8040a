//! Product snapshot columns shared by the mirror tables.

use std::{error::Error as StdError, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use sqlx::{
    Decode, Row, Sqlite, Type,
    query::Query,
    sqlite::{SqliteArguments, SqliteRow},
};

use crate::{ids::TypedId, products::Product};

pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Bind the eleven product snapshot columns, in table order.
pub(crate) fn bind_product<'q>(
    query: SqliteQuery<'q>,
    product: &Product,
) -> Result<SqliteQuery<'q>, sqlx::Error> {
    let images = serde_json::to_string(&product.images)
        .map_err(|error| sqlx::Error::Encode(Box::new(error)))?;

    Ok(query
        .bind(i64::from(product.id))
        .bind(product.title.clone())
        .bind(product.description.clone())
        .bind(product.price.to_string())
        .bind(product.discount_percentage.to_string())
        .bind(product.rating)
        .bind(i64::from(product.stock))
        .bind(product.brand.clone())
        .bind(product.category.clone())
        .bind(product.thumbnail.clone())
        .bind(images))
}

/// Decode the product snapshot columns of a mirror row.
pub(crate) fn product_from_row(row: &SqliteRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: id_column(row, "product_id")?,
        title: row.try_get("product_title")?,
        description: row.try_get("product_description")?,
        price: decode_column(row, "product_price", |text: String| Decimal::from_str(&text))?,
        discount_percentage: decode_column(row, "product_discount_percentage", |text: String| {
            Decimal::from_str(&text)
        })?,
        rating: row.try_get("product_rating")?,
        stock: decode_column(row, "product_stock", |raw: i64| u32::try_from(raw))?,
        brand: row.try_get("product_brand")?,
        category: row.try_get("product_category")?,
        thumbnail: row.try_get("product_thumbnail")?,
        images: decode_column(row, "product_images", |text: String| {
            serde_json::from_str::<Vec<String>>(&text)
        })?,
    })
}

/// Decode a positive integer id column.
pub(crate) fn id_column<T>(row: &SqliteRow, column: &str) -> Result<TypedId<T>, sqlx::Error> {
    decode_column(row, column, |raw: i64| u32::try_from(raw).map(TypedId::new))
}

/// Decode a Unix millisecond timestamp column.
pub(crate) fn timestamp_column(row: &SqliteRow, column: &str) -> Result<Timestamp, sqlx::Error> {
    decode_column(row, column, Timestamp::from_millisecond)
}

/// Read `column` as `T` and convert it, reporting conversion failures as column decode errors.
pub(crate) fn decode_column<T, U, E>(
    row: &SqliteRow,
    column: &str,
    convert: impl FnOnce(T) -> Result<U, E>,
) -> Result<U, sqlx::Error>
where
    T: for<'r> Decode<'r, Sqlite> + Type<Sqlite>,
    E: StdError + Send + Sync + 'static,
{
    let raw: T = row.try_get(column)?;

    convert(raw).map_err(|error| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(error),
    })
}
