//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations keyed by UUID, lookup by product_code
//! - Delta-based stock adjustment (never absolute writes)
//! - Low-stock listing for the reorder report
//!
//! ## Stock Adjustment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: Absolute update (races against concurrent writers)          │
//! │     UPDATE products SET stock = 7 WHERE id = ?                         │
//! │                                                                         │
//! │  ✅ CORRECT: Delta update                                              │
//! │     UPDATE products SET stock = stock - 3 WHERE id = ?                 │
//! │                                                                         │
//! │  The CHECK (stock >= 0) constraint backstops the engine-level          │
//! │  sufficiency check inside the same transaction.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kaos_core::Product;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let all = repo.list().await?;
/// let product = repo.get_by_code("KD-003").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = "id, product_code, shirt_type, size, stock, price, notes, created_at";

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM products ORDER BY created_at DESC, product_code"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by ID on a transaction connection.
    pub async fn get_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(product)
    }

    /// Gets several products at once (for detail-view joins).
    ///
    /// Missing IDs are silently absent from the result.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {SELECT_COLUMNS} FROM products WHERE id IN ({placeholders})");

        let mut query = sqlx::query_as::<_, Product>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let products = query.fetch_all(&self.pool).await?;

        Ok(products)
    }

    /// Gets a product by its business code (e.g., "KD-003").
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM products WHERE product_code = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Insert successful
    /// * `Err(DbError::UniqueViolation)` - product_code already exists
    pub async fn insert_tx(&self, conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
        debug!(product_code = %product.product_code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, product_code, shirt_type, size, stock, price, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.product_code)
        .bind(product.shirt_type)
        .bind(product.size)
        .bind(product.stock)
        .bind(product.price)
        .bind(&product.notes)
        .bind(product.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Updates an existing product's descriptive fields and price.
    ///
    /// Stock is deliberately NOT written here; all stock movement goes
    /// through [`adjust_stock_tx`](Self::adjust_stock_tx).
    pub async fn update_tx(&self, conn: &mut SqliteConnection, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                product_code = ?2,
                shirt_type = ?3,
                size = ?4,
                price = ?5,
                notes = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.product_code)
        .bind(product.shirt_type)
        .bind(product.size)
        .bind(product.price)
        .bind(&product.notes)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Adjusts product stock by a delta on a transaction connection.
    ///
    /// ## Arguments
    /// * `delta` - Change in stock (negative for outgoing goods, positive
    ///   for intake and returns)
    pub async fn adjust_stock_tx(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        delta: i64,
    ) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let result = sqlx::query("UPDATE products SET stock = stock + ?2 WHERE id = ?1")
            .bind(id)
            .bind(delta)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Hard-deletes a product on a transaction connection.
    ///
    /// The engine checks the consignment-reference rule first; the FK from
    /// consignment_items backstops it.
    pub async fn delete_tx(&self, conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// True when any consignment item references the product.
    ///
    /// The reference blocks product deletion even when every consigned unit
    /// has already been returned.
    pub async fn is_referenced_by_consignment(&self, id: &str) -> DbResult<bool> {
        let referenced: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM consignment_items WHERE product_id = ?1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(referenced != 0)
    }

    /// Lists products at or below the given stock threshold, lowest first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE stock <= ?1 ORDER BY stock, product_code"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts total products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
