//! # Consignment Repository
//!
//! Database operations for consignments and their item lines.
//!
//! ## Data Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  consignments                    consignment_items                      │
//! │  ┌──────────────────┐            ┌──────────────────────┐              │
//! │  │ id               │◄───────────│ consignment_id (FK)  │              │
//! │  │ consignment_code │  1 ───── n │ product_id (FK)      │              │
//! │  │ reseller_id (FK) │            │ quantity             │              │
//! │  │ paid_amount      │            │ returned_quantity    │              │
//! │  │ status           │            │ price_per_item       │              │
//! │  └──────────────────┘            └──────────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals (total_items, total_value) are denormalized onto the consignment
//! row at creation and never recomputed from the items.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kaos_core::{Consignment, ConsignmentItem, ConsignmentStatus};

/// Repository for consignment database operations.
#[derive(Debug, Clone)]
pub struct ConsignmentRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = "id, consignment_code, reseller_id, total_items, total_value, \
     paid_amount, status, taken_date, return_date, notes";

const ITEM_COLUMNS: &str =
    "id, consignment_id, product_id, quantity, returned_quantity, price_per_item";

impl ConsignmentRepository {
    /// Creates a new ConsignmentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ConsignmentRepository { pool }
    }

    // =========================================================================
    // Consignment Rows
    // =========================================================================

    /// Lists all consignments, newest first.
    pub async fn list(&self) -> DbResult<Vec<Consignment>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM consignments ORDER BY taken_date DESC");
        let consignments = sqlx::query_as::<_, Consignment>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(consignments)
    }

    /// Lists open consignments (status aktif or sebagian), newest first.
    pub async fn list_active(&self) -> DbResult<Vec<Consignment>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM consignments WHERE status IN ('aktif', 'sebagian') \
             ORDER BY taken_date DESC"
        );
        let consignments = sqlx::query_as::<_, Consignment>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(consignments)
    }

    /// Lists consignments for one reseller, newest first.
    pub async fn list_by_reseller(&self, reseller_id: &str) -> DbResult<Vec<Consignment>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM consignments WHERE reseller_id = ?1 \
             ORDER BY taken_date DESC"
        );
        let consignments = sqlx::query_as::<_, Consignment>(&sql)
            .bind(reseller_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(consignments)
    }

    /// Gets a consignment by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Consignment>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM consignments WHERE id = ?1");
        let consignment = sqlx::query_as::<_, Consignment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(consignment)
    }

    /// Gets a consignment by ID on a transaction connection.
    pub async fn get_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Consignment>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM consignments WHERE id = ?1");
        let consignment = sqlx::query_as::<_, Consignment>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(consignment)
    }

    /// Gets several consignments at once (for sale-list joins).
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Consignment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql =
            format!("SELECT {SELECT_COLUMNS} FROM consignments WHERE id IN ({placeholders})");

        let mut query = sqlx::query_as::<_, Consignment>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let consignments = query.fetch_all(&self.pool).await?;

        Ok(consignments)
    }

    /// Gets a consignment by its business code (e.g., "CN-1001").
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Consignment>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM consignments WHERE consignment_code = ?1");
        let consignment = sqlx::query_as::<_, Consignment>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(consignment)
    }

    /// Inserts a new consignment row.
    pub async fn insert_tx(
        &self,
        conn: &mut SqliteConnection,
        consignment: &Consignment,
    ) -> DbResult<()> {
        debug!(consignment_code = %consignment.consignment_code, "Inserting consignment");

        sqlx::query(
            r#"
            INSERT INTO consignments (
                id, consignment_code, reseller_id, total_items, total_value,
                paid_amount, status, taken_date, return_date, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&consignment.id)
        .bind(&consignment.consignment_code)
        .bind(&consignment.reseller_id)
        .bind(consignment.total_items)
        .bind(consignment.total_value)
        .bind(consignment.paid_amount)
        .bind(consignment.status)
        .bind(consignment.taken_date)
        .bind(consignment.return_date)
        .bind(&consignment.notes)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Writes the cumulative paid amount and the resulting status.
    pub async fn update_payment_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        paid_amount: i64,
        status: ConsignmentStatus,
    ) -> DbResult<()> {
        debug!(id = %id, paid_amount = %paid_amount, status = %status, "Recording payment");

        let result =
            sqlx::query("UPDATE consignments SET paid_amount = ?2, status = ?3 WHERE id = ?1")
                .bind(id)
                .bind(paid_amount)
                .bind(status)
                .execute(conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Consignment", id));
        }

        Ok(())
    }

    /// Writes status and return date after a return has been processed.
    ///
    /// `return_date` is `Some` only once the whole consignment has come back.
    pub async fn update_return_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        status: ConsignmentStatus,
        return_date: Option<chrono::DateTime<chrono::Utc>>,
    ) -> DbResult<()> {
        debug!(id = %id, status = %status, "Recording return outcome");

        let result =
            sqlx::query("UPDATE consignments SET status = ?2, return_date = ?3 WHERE id = ?1")
                .bind(id)
                .bind(status)
                .bind(return_date)
                .execute(conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Consignment", id));
        }

        Ok(())
    }

    /// Administrative edit: overwrites totals, taken date, status, and notes.
    ///
    /// An escape hatch for corrections; the payment/return protocol above is
    /// the normal path. paid_amount is deliberately not written here.
    pub async fn update_tx(
        &self,
        conn: &mut SqliteConnection,
        consignment: &Consignment,
    ) -> DbResult<()> {
        debug!(id = %consignment.id, "Editing consignment");

        let result = sqlx::query(
            r#"
            UPDATE consignments SET
                total_items = ?2,
                total_value = ?3,
                taken_date = ?4,
                status = ?5,
                notes = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&consignment.id)
        .bind(consignment.total_items)
        .bind(consignment.total_value)
        .bind(consignment.taken_date)
        .bind(consignment.status)
        .bind(&consignment.notes)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Consignment", &consignment.id));
        }

        Ok(())
    }

    // =========================================================================
    // Consignment Items
    // =========================================================================

    /// Lists the items of a consignment.
    pub async fn items(&self, consignment_id: &str) -> DbResult<Vec<ConsignmentItem>> {
        let sql =
            format!("SELECT {ITEM_COLUMNS} FROM consignment_items WHERE consignment_id = ?1");
        let items = sqlx::query_as::<_, ConsignmentItem>(&sql)
            .bind(consignment_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Lists the items of several consignments at once (for list views).
    pub async fn items_for(&self, consignment_ids: &[String]) -> DbResult<Vec<ConsignmentItem>> {
        if consignment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=consignment_ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM consignment_items WHERE consignment_id IN ({placeholders})"
        );

        let mut query = sqlx::query_as::<_, ConsignmentItem>(&sql);
        for id in consignment_ids {
            query = query.bind(id);
        }
        let items = query.fetch_all(&self.pool).await?;

        Ok(items)
    }

    /// Lists the items of a consignment on a transaction connection.
    pub async fn items_tx(
        &self,
        conn: &mut SqliteConnection,
        consignment_id: &str,
    ) -> DbResult<Vec<ConsignmentItem>> {
        let sql =
            format!("SELECT {ITEM_COLUMNS} FROM consignment_items WHERE consignment_id = ?1");
        let items = sqlx::query_as::<_, ConsignmentItem>(&sql)
            .bind(consignment_id)
            .fetch_all(conn)
            .await?;

        Ok(items)
    }

    /// Inserts one item line.
    pub async fn insert_item_tx(
        &self,
        conn: &mut SqliteConnection,
        item: &ConsignmentItem,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO consignment_items (
                id, consignment_id, product_id, quantity, returned_quantity, price_per_item
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.consignment_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.returned_quantity)
        .bind(item.price_per_item)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Writes an item's cumulative returned quantity.
    pub async fn update_item_returned_tx(
        &self,
        conn: &mut SqliteConnection,
        item_id: &str,
        returned_quantity: i64,
    ) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE consignment_items SET returned_quantity = ?2 WHERE id = ?1")
                .bind(item_id)
                .bind(returned_quantity)
                .execute(conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ConsignmentItem", item_id));
        }

        Ok(())
    }
}
