//! `PostgreSQL` record store.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database. Rows are decoded through hand-written `FromRow`
//! impls that re-validate customer fields on the way out.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use baattak_core::{
    CartId, CartState, CustomerName, Email, OrderHistoryId, OrderItem, PhoneNumber,
};

use super::{RecordStore, StoreError};
use crate::models::{Cart, Customer, NewCart, NewOrderHistoryEntry, OrderHistoryEntry};

const CART_COLUMNS: &str =
    "id, customer, phone_number, items, total_quantity, total_price, created_at";

const UPSERT_CUSTOMER_SQL: &str = r"
    INSERT INTO customers (username, phone_number)
    VALUES ($1, $2)
    ON CONFLICT (username, phone_number)
    DO UPDATE SET phone_number = EXCLUDED.phone_number, updated_at = NOW()
    RETURNING id
";

/// Store backed by a `PostgreSQL` connection pool.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Row wrapper so `FromRow` can be implemented for server models.
struct Decoded<T>(T);

impl<'r> FromRow<'r, PgRow> for Decoded<Cart> {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(Cart {
            id: row.try_get("id")?,
            customer: try_get_name(row, "customer")?,
            phone: try_get_phone(row, "phone_number")?,
            items: row.try_get::<Json<Vec<OrderItem>>, _>("items")?.0,
            total_quantity: try_get_quantity(row, "total_quantity")?,
            total_price: row.try_get::<Decimal, _>("total_price")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        }))
    }
}

impl<'r> FromRow<'r, PgRow> for Decoded<OrderHistoryEntry> {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(OrderHistoryEntry {
            id: row.try_get::<OrderHistoryId, _>("id")?,
            customer: try_get_name(row, "customer")?,
            phone: try_get_phone(row, "phone_number")?,
            items: row.try_get::<Json<Vec<OrderItem>>, _>("items")?.0,
            total_quantity: try_get_quantity(row, "total_quantity")?,
            total_price: row.try_get::<Decimal, _>("total_price")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        }))
    }
}

impl<'r> FromRow<'r, PgRow> for Decoded<Customer> {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let email = row
            .try_get::<Option<String>, _>("email")?
            .map(|raw| Email::parse(&raw))
            .transpose()
            .map_err(|e| column_error("email", e))?;

        Ok(Self(Customer {
            id: row.try_get("id")?,
            username: try_get_name(row, "username")?,
            phone_number: try_get_phone(row, "phone_number")?,
            email,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        }))
    }
}

fn column_error(
    col: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(source),
    }
}

fn try_get_name(row: &PgRow, col: &str) -> sqlx::Result<CustomerName> {
    let raw: String = row.try_get(col)?;
    CustomerName::parse(&raw).map_err(|e| column_error(col, e))
}

fn try_get_phone(row: &PgRow, col: &str) -> sqlx::Result<PhoneNumber> {
    let raw: String = row.try_get(col)?;
    PhoneNumber::parse(&raw).map_err(|e| column_error(col, e))
}

fn try_get_quantity(row: &PgRow, col: &str) -> sqlx::Result<u32> {
    let raw: i64 = row.try_get(col)?;
    u32::try_from(raw).map_err(|e| column_error(col, e))
}

/// Map unique violations to `Conflict`, everything else to `Database`.
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(
            db_err
                .constraint()
                .unwrap_or("unique constraint")
                .to_owned(),
        );
    }
    StoreError::Database(e)
}

#[async_trait]
impl RecordStore for PgRecordStore {
    #[instrument(skip_all, fields(customer = %cart.customer))]
    async fn create_cart(&self, cart: NewCart) -> Result<Cart, StoreError> {
        let mut tx = self.pool.begin().await?;

        let customer_id: baattak_core::CustomerId = sqlx::query_scalar(UPSERT_CUSTOMER_SQL)
            .bind(cart.customer.as_str())
            .bind(cart.phone.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

        let created = sqlx::query_as::<_, Decoded<Cart>>(&format!(
            r"
            INSERT INTO carts (customer_id, customer, phone_number, items, total_quantity, total_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CART_COLUMNS}
            "
        ))
        .bind(customer_id)
        .bind(cart.customer.as_str())
        .bind(cart.phone.as_str())
        .bind(Json(&cart.items))
        .bind(i64::from(cart.total_quantity))
        .bind(cart.total_price)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;

        Ok(created.0)
    }

    async fn list_carts(&self) -> Result<Vec<Cart>, StoreError> {
        let rows = sqlx::query_as::<_, Decoded<Cart>>(&format!(
            "SELECT {CART_COLUMNS} FROM carts ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn get_cart(&self, id: CartId) -> Result<Option<Cart>, StoreError> {
        let row = sqlx::query_as::<_, Decoded<Cart>>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.0))
    }

    async fn find_cart_by_customer(&self, customer: &str) -> Result<Option<Cart>, StoreError> {
        let row = sqlx::query_as::<_, Decoded<Cart>>(&format!(
            "SELECT {CART_COLUMNS} FROM carts WHERE customer = $1 ORDER BY created_at, id LIMIT 1"
        ))
        .bind(customer)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.0))
    }

    async fn cart_ids_created_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CartId>, StoreError> {
        let ids = sqlx::query_scalar::<_, CartId>(
            "SELECT id FROM carts WHERE created_at < $1 ORDER BY created_at, id",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    #[instrument(skip_all, fields(cart_id = %id, outcome = %outcome))]
    async fn take_cart(
        &self,
        id: CartId,
        outcome: CartState,
    ) -> Result<Option<Cart>, StoreError> {
        // One statement: concurrent callers serialize on the row lock, only one
        // of them gets the row back, and only that one records an outcome.
        let row = sqlx::query_as::<_, Decoded<Cart>>(&format!(
            r"
            WITH removed AS (
                DELETE FROM carts WHERE id = $1 RETURNING {CART_COLUMNS}
            ), recorded AS (
                INSERT INTO cart_outcomes (cart_id, state)
                SELECT id, $2 FROM removed
            )
            SELECT {CART_COLUMNS} FROM removed
            "
        ))
        .bind(id)
        .bind(outcome.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.map(|r| r.0))
    }

    async fn cart_outcome(&self, id: CartId) -> Result<Option<CartState>, StoreError> {
        let state: Option<String> =
            sqlx::query_scalar("SELECT state FROM cart_outcomes WHERE cart_id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        state
            .map(|raw| {
                raw.parse::<CartState>()
                    .map_err(|e| StoreError::DataCorruption(e.to_string()))
            })
            .transpose()
    }

    #[instrument(skip_all, fields(customer = %entry.customer))]
    async fn insert_order_history(
        &self,
        entry: NewOrderHistoryEntry,
    ) -> Result<OrderHistoryEntry, StoreError> {
        let row = sqlx::query_as::<_, Decoded<OrderHistoryEntry>>(
            r"
            INSERT INTO order_history (customer, phone_number, items, total_quantity, total_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, customer, phone_number, items, total_quantity, total_price, created_at
            ",
        )
        .bind(entry.customer.as_str())
        .bind(entry.phone.as_str())
        .bind(Json(&entry.items))
        .bind(i64::from(entry.total_quantity))
        .bind(entry.total_price)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.0)
    }

    async fn list_order_history(&self) -> Result<Vec<OrderHistoryEntry>, StoreError> {
        let rows = sqlx::query_as::<_, Decoded<OrderHistoryEntry>>(
            r"
            SELECT id, customer, phone_number, items, total_quantity, total_price, created_at
            FROM order_history
            ORDER BY seq
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn delete_order_history(&self, id: OrderHistoryId) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query("DELETE FROM order_history WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, StoreError> {
        let rows = sqlx::query_as::<_, Decoded<Customer>>(
            r"
            SELECT id, username, phone_number, email, created_at, updated_at
            FROM customers
            ORDER BY created_at, id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
