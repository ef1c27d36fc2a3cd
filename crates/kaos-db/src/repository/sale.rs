//! # Sale Repository
//!
//! Database operations for sale records.
//!
//! Sales are bookkeeping rows: inserting one never touches stock here (the
//! engine decrements stock for direct sales in the same transaction), and
//! deleting one reverses nothing.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kaos_core::Sale;

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = "id, sale_code, consignment_id, amount, sale_date, notes";

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Lists all sales, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM sales ORDER BY sale_date DESC");
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Gets a sale by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets a sale by ID on a transaction connection.
    pub async fn get_tx(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(sale)
    }

    /// Gets a sale by its business code (e.g., "SL-1001").
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM sales WHERE sale_code = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Lists sales attributed to one consignment, newest first.
    pub async fn list_by_consignment(&self, consignment_id: &str) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM sales WHERE consignment_id = ?1 ORDER BY sale_date DESC"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(consignment_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Inserts a new sale record.
    ///
    /// ## Returns
    /// * `Ok(())` - Insert successful
    /// * `Err(DbError::UniqueViolation)` - sale_code already exists
    pub async fn insert_tx(&self, conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(sale_code = %sale.sale_code, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (id, sale_code, consignment_id, amount, sale_date, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.sale_code)
        .bind(&sale.consignment_id)
        .bind(sale.amount)
        .bind(sale.sale_date)
        .bind(&sale.notes)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Deletes a sale record. Record-only: stock and consignment paid
    /// amounts are left untouched.
    pub async fn delete_tx(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Counts total sales (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
