//! # Product Ledger
//!
//! Product catalogue operations and the single stock-mutation primitive.
//!
//! ## Stock Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every stock movement goes through adjust-stock, in a transaction       │
//! │  together with its activity entry:                                      │
//! │                                                                         │
//! │  create_product ──► insert + "Tambah stok ..." activity                 │
//! │  update_product ──► stock diff becomes a Tambah/Kurang activity         │
//! │  adjust_stock   ──► delta + Tambah/Kurang activity                      │
//! │  consignment / direct sale ──► adjust_stock_tx inside THEIR transaction │
//! │                                                                         │
//! │  The activity log therefore accounts for every unit that moved.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::activity::record;
use crate::error::{EngineError, EngineResult};
use kaos_core::{
    validation, ActivityType, CoreError, Product, ShirtSize, ShirtType,
    DEFAULT_LOW_STOCK_THRESHOLD,
};
use kaos_db::{generate_id, Database};

// =============================================================================
// Operation Inputs
// =============================================================================

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub product_code: String,
    pub shirt_type: ShirtType,
    pub size: ShirtSize,
    pub stock: i64,
    pub price: i64,
    pub notes: Option<String>,
}

/// Partial update of a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    pub product_code: Option<String>,
    pub shirt_type: Option<ShirtType>,
    pub size: Option<ShirtSize>,
    pub stock: Option<i64>,
    pub price: Option<i64>,
    pub notes: Option<String>,
}

// =============================================================================
// Product Ledger
// =============================================================================

/// Product catalogue service.
#[derive(Debug, Clone)]
pub struct ProductLedger {
    db: Database,
}

impl ProductLedger {
    /// Creates a new ProductLedger over the given database.
    pub fn new(db: Database) -> Self {
        ProductLedger { db }
    }

    /// Lists all products.
    pub async fn list(&self) -> EngineResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    /// Gets a product by ID.
    pub async fn get(&self, id: &str) -> EngineResult<Product> {
        self.db
            .products()
            .get(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
    }

    /// Gets a product by its business code.
    pub async fn get_by_code(&self, code: &str) -> EngineResult<Product> {
        self.db
            .products()
            .get_by_code(code)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(code.to_string()).into())
    }

    /// Creates a product and logs its initial stock intake.
    pub async fn create_product(&self, input: NewProduct) -> EngineResult<Product> {
        validation::validate_code("product_code", &input.product_code).map_err(CoreError::from)?;
        validation::validate_stock("stock", input.stock).map_err(CoreError::from)?;
        validation::validate_price("price", input.price).map_err(CoreError::from)?;

        // Friendly duplicate check; the UNIQUE index backstops it.
        if self
            .db
            .products()
            .get_by_code(&input.product_code)
            .await?
            .is_some()
        {
            return Err(EngineError::conflict(format!(
                "product_code '{}' already exists",
                input.product_code
            )));
        }

        let product = Product {
            id: generate_id(),
            product_code: input.product_code,
            shirt_type: input.shirt_type,
            size: input.size,
            stock: input.stock,
            price: input.price,
            notes: input.notes,
            created_at: Utc::now(),
        };

        let mut tx = self.db.begin().await?;
        self.db.products().insert_tx(&mut tx, &product).await?;
        self.db
            .activities()
            .insert_tx(
                &mut tx,
                &record(
                    ActivityType::Stok,
                    format!(
                        "Tambah stok {} {} ({} pcs)",
                        product.shirt_type, product.size, product.stock
                    ),
                    Some(product.id.clone()),
                ),
            )
            .await?;
        tx.commit()
            .await
            .map_err(kaos_db::DbError::from)?;

        info!(product_code = %product.product_code, "Product created");
        Ok(product)
    }

    /// Applies a partial update; a stock change is logged as a
    /// Tambah/Kurang activity with the absolute diff.
    pub async fn update_product(&self, id: &str, update: ProductUpdate) -> EngineResult<Product> {
        let mut product = self.get(id).await?;

        if let Some(code) = update.product_code {
            product.product_code = code;
        }
        if let Some(shirt_type) = update.shirt_type {
            product.shirt_type = shirt_type;
        }
        if let Some(size) = update.size {
            product.size = size;
        }
        if let Some(price) = update.price {
            product.price = price;
        }
        if let Some(notes) = update.notes {
            product.notes = Some(notes);
        }

        validation::validate_code("product_code", &product.product_code)
            .map_err(CoreError::from)?;
        validation::validate_price("price", product.price).map_err(CoreError::from)?;

        let stock_delta = match update.stock {
            Some(new_stock) => {
                validation::validate_stock("stock", new_stock).map_err(CoreError::from)?;
                new_stock - product.stock
            }
            None => 0,
        };

        let mut tx = self.db.begin().await?;
        self.db.products().update_tx(&mut tx, &product).await?;

        if stock_delta != 0 {
            self.db
                .products()
                .adjust_stock_tx(&mut tx, &product.id, stock_delta)
                .await?;
            product.stock += stock_delta;

            let action = if stock_delta > 0 { "Tambah" } else { "Kurang" };
            self.db
                .activities()
                .insert_tx(
                    &mut tx,
                    &record(
                        ActivityType::Stok,
                        format!(
                            "{} stok {} {} ({} pcs)",
                            action,
                            product.shirt_type,
                            product.size,
                            stock_delta.abs()
                        ),
                        Some(product.id.clone()),
                    ),
                )
                .await?;
        }

        tx.commit().await.map_err(kaos_db::DbError::from)?;

        Ok(product)
    }

    /// Adjusts stock by a delta (positive = intake, negative = removal).
    ///
    /// A delta of zero is a no-op. A negative delta that would take stock
    /// below zero is rejected.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> EngineResult<Product> {
        let mut product = self.get(id).await?;

        if delta == 0 {
            return Ok(product);
        }

        if product.stock + delta < 0 {
            return Err(CoreError::InsufficientStock {
                product_code: product.product_code,
                available: product.stock,
                requested: -delta,
            }
            .into());
        }

        let mut tx = self.db.begin().await?;
        self.db
            .products()
            .adjust_stock_tx(&mut tx, &product.id, delta)
            .await?;

        let action = if delta > 0 { "Tambah" } else { "Kurang" };
        self.db
            .activities()
            .insert_tx(
                &mut tx,
                &record(
                    ActivityType::Stok,
                    format!(
                        "{} stok {} {} ({} pcs)",
                        action,
                        product.shirt_type,
                        product.size,
                        delta.abs()
                    ),
                    Some(product.id.clone()),
                ),
            )
            .await?;
        tx.commit().await.map_err(kaos_db::DbError::from)?;

        product.stock += delta;
        Ok(product)
    }

    /// Deletes a product.
    ///
    /// Rejected while any consignment item references the product, even one
    /// whose every unit has been returned. The reference keeps history
    /// meaningful.
    pub async fn delete_product(&self, id: &str) -> EngineResult<()> {
        let product = self.get(id).await?;

        if self.db.products().is_referenced_by_consignment(id).await? {
            return Err(CoreError::ProductInConsignment {
                product_code: product.product_code,
            }
            .into());
        }

        let mut tx = self.db.begin().await?;
        self.db.products().delete_tx(&mut tx, id).await?;
        self.db
            .activities()
            .insert_tx(
                &mut tx,
                &record(
                    ActivityType::Hapus,
                    format!("Hapus produk {} {}", product.shirt_type, product.size),
                    Some(product.id.clone()),
                ),
            )
            .await?;
        tx.commit().await.map_err(kaos_db::DbError::from)?;

        info!(product_code = %product.product_code, "Product deleted");
        Ok(())
    }

    /// Lists products at or below the threshold (default 30), lowest first.
    pub async fn low_stock(&self, threshold: Option<i64>) -> EngineResult<Vec<Product>> {
        let threshold = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        Ok(self.db.products().low_stock(threshold).await?)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityLog;
    use crate::error::ErrorCode;
    use kaos_db::DbConfig;

    async fn ledger() -> (ProductLedger, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (ProductLedger::new(db.clone()), db)
    }

    fn sample_input() -> NewProduct {
        NewProduct {
            product_code: "KD-003".to_string(),
            shirt_type: ShirtType::Dewasa,
            size: ShirtSize::Xl,
            stock: 124,
            price: 100_000,
            notes: Some("Hitam polos".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_product_logs_intake() {
        let (ledger, db) = ledger().await;

        let product = ledger.create_product(sample_input()).await.unwrap();
        assert_eq!(product.stock, 124);

        let feed = ActivityLog::new(db).recent(None).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].activity_type, ActivityType::Stok);
        assert_eq!(feed[0].description, "Tambah stok Kaos Dewasa XL (124 pcs)");
        assert_eq!(feed[0].related_id.as_deref(), Some(product.id.as_str()));
    }

    #[tokio::test]
    async fn test_duplicate_product_code_conflicts() {
        let (ledger, _db) = ledger().await;

        ledger.create_product(sample_input()).await.unwrap();
        let err = ledger.create_product(sample_input()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_negative_result() {
        let (ledger, _db) = ledger().await;
        let product = ledger.create_product(sample_input()).await.unwrap();

        let err = ledger.adjust_stock(&product.id, -200).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        // Stock untouched after the rejection.
        let unchanged = ledger.get(&product.id).await.unwrap();
        assert_eq!(unchanged.stock, 124);
    }

    #[tokio::test]
    async fn test_update_stock_logs_kurang() {
        let (ledger, db) = ledger().await;
        let product = ledger.create_product(sample_input()).await.unwrap();

        let updated = ledger
            .update_product(
                &product.id,
                ProductUpdate {
                    stock: Some(100),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.stock, 100);

        let feed = ActivityLog::new(db).recent(None).await.unwrap();
        assert_eq!(feed[0].description, "Kurang stok Kaos Dewasa XL (24 pcs)");
    }

    #[tokio::test]
    async fn test_missing_product_is_404() {
        let (ledger, _db) = ledger().await;

        let err = ledger.get("nope").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_low_stock_threshold() {
        let (ledger, _db) = ledger().await;

        ledger.create_product(sample_input()).await.unwrap();
        ledger
            .create_product(NewProduct {
                product_code: "KB-001".to_string(),
                shirt_type: ShirtType::Bloombee,
                size: ShirtSize::Xl3,
                stock: 8,
                price: 140_000,
                notes: Some("Premium".to_string()),
            })
            .await
            .unwrap();

        let low = ledger.low_stock(None).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].product_code, "KB-001");

        let all = ledger.low_stock(Some(200)).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_product_logs_hapus() {
        let (ledger, db) = ledger().await;
        let product = ledger.create_product(sample_input()).await.unwrap();

        ledger.delete_product(&product.id).await.unwrap();
        assert_eq!(
            ledger.get(&product.id).await.unwrap_err().code,
            ErrorCode::NotFound
        );

        let feed = ActivityLog::new(db).recent(None).await.unwrap();
        assert_eq!(feed[0].description, "Hapus produk Kaos Dewasa XL");
        assert_eq!(feed[0].activity_type, ActivityType::Hapus);
    }
}
