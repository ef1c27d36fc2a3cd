//! # Sales Recorder
//!
//! Sale records for both channels:
//!
//! - **Direct sale**: from owned inventory. Line items are checked and the
//!   stock decremented in one transaction; the amount is derived from the
//!   lines. The lines themselves are not persisted.
//! - **Consignment sale**: bookkeeping attribution to a reseller's batch.
//!   Touches neither stock (it left at consignment creation) nor the
//!   consignment's paid_amount (money arrives via process_payment).
//!
//! Deleting a sale removes the record only; nothing is reversed.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::activity::record;
use crate::error::{EngineError, EngineResult};
use kaos_core::{validation, ActivityType, Consignment, CoreError, Sale};
use kaos_db::{generate_id, Database};

// =============================================================================
// Operation Inputs
// =============================================================================

/// One line of a direct sale.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub quantity: i64,
    pub price_per_item: i64,
}

/// Input for recording a direct sale.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDirectSale {
    pub sale_code: String,
    pub items: Vec<SaleLine>,
    pub notes: Option<String>,
}

/// Input for recording a consignment sale.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConsignmentSale {
    pub sale_code: String,
    pub consignment_id: String,
    pub amount: i64,
    pub notes: Option<String>,
}

// =============================================================================
// Detail Views
// =============================================================================

/// A sale with its consignment attached (None for direct sales).
#[derive(Debug, Clone, Serialize)]
pub struct SaleDetail {
    pub sale: Sale,
    pub consignment: Option<Consignment>,
}

// =============================================================================
// Sales Recorder
// =============================================================================

/// Sale recording service.
#[derive(Debug, Clone)]
pub struct SalesRecorder {
    db: Database,
}

impl SalesRecorder {
    /// Creates a new SalesRecorder over the given database.
    pub fn new(db: Database) -> Self {
        SalesRecorder { db }
    }

    /// Lists all sales.
    pub async fn list(&self) -> EngineResult<Vec<Sale>> {
        Ok(self.db.sales().list().await?)
    }

    /// Gets a sale by ID.
    pub async fn get(&self, id: &str) -> EngineResult<Sale> {
        self.db
            .sales()
            .get(id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(id.to_string()).into())
    }

    /// Lists all sales with their consignments attached, via batch fetch.
    pub async fn list_with_consignments(&self) -> EngineResult<Vec<SaleDetail>> {
        let sales = self.db.sales().list().await?;

        let mut consignment_ids: Vec<String> = sales
            .iter()
            .filter_map(|s| s.consignment_id.clone())
            .collect();
        consignment_ids.sort();
        consignment_ids.dedup();

        let consignments: HashMap<String, Consignment> = self
            .db
            .consignments()
            .get_many(&consignment_ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let details = sales
            .into_iter()
            .map(|sale| {
                let consignment = sale
                    .consignment_id
                    .as_ref()
                    .and_then(|id| consignments.get(id).cloned());
                SaleDetail { sale, consignment }
            })
            .collect();

        Ok(details)
    }

    /// Gets a sale by its business code.
    pub async fn get_by_code(&self, code: &str) -> EngineResult<Sale> {
        self.db
            .sales()
            .get_by_code(code)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(code.to_string()).into())
    }

    /// Records a direct sale from owned inventory.
    ///
    /// Every line's product is fetched and its stock checked before any
    /// decrement; the whole sale commits or nothing does. The amount is
    /// Σ(quantity × price_per_item) over the lines.
    pub async fn create_direct_sale(&self, input: NewDirectSale) -> EngineResult<Sale> {
        validation::validate_code("sale_code", &input.sale_code).map_err(CoreError::from)?;
        if input.items.is_empty() {
            return Err(CoreError::from(kaos_core::ValidationError::Required {
                field: "items".to_string(),
            })
            .into());
        }
        for line in &input.items {
            validation::validate_quantity("quantity", line.quantity).map_err(CoreError::from)?;
            validation::validate_price("price_per_item", line.price_per_item)
                .map_err(CoreError::from)?;
        }

        if self
            .db
            .sales()
            .get_by_code(&input.sale_code)
            .await?
            .is_some()
        {
            return Err(EngineError::conflict(format!(
                "sale_code '{}' already exists",
                input.sale_code
            )));
        }

        let mut tx = self.db.begin().await?;

        // Validate every line before the first decrement.
        let mut amount = 0;
        for line in &input.items {
            let product = self
                .db
                .products()
                .get_tx(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            if product.stock < line.quantity {
                return Err(CoreError::InsufficientStock {
                    product_code: product.product_code,
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }

            amount += line.quantity * line.price_per_item;
        }

        // Individual lines may be zero-priced giveaways, but a sale whose
        // derived amount is zero has nothing to record.
        validation::validate_amount("amount", amount).map_err(CoreError::from)?;

        for line in &input.items {
            self.db
                .products()
                .adjust_stock_tx(&mut tx, &line.product_id, -line.quantity)
                .await?;
        }

        let sale = Sale {
            id: generate_id(),
            sale_code: input.sale_code,
            consignment_id: None,
            amount,
            sale_date: Utc::now(),
            notes: input.notes,
        };

        self.db.sales().insert_tx(&mut tx, &sale).await?;
        self.db
            .activities()
            .insert_tx(
                &mut tx,
                &record(
                    ActivityType::Penjualan,
                    format!("Penjualan langsung: {}", sale.amount),
                    Some(sale.id.clone()),
                ),
            )
            .await?;
        tx.commit().await.map_err(kaos_db::DbError::from)?;

        info!(sale_code = %sale.sale_code, amount = sale.amount, "Direct sale recorded");
        Ok(sale)
    }

    /// Records a sale attributed to a consignment.
    ///
    /// Bookkeeping only: stock already left inventory when the consignment
    /// was created, and the reseller settles money through process_payment.
    pub async fn create_consignment_sale(&self, input: NewConsignmentSale) -> EngineResult<Sale> {
        validation::validate_code("sale_code", &input.sale_code).map_err(CoreError::from)?;
        validation::validate_amount("amount", input.amount).map_err(CoreError::from)?;

        if self
            .db
            .sales()
            .get_by_code(&input.sale_code)
            .await?
            .is_some()
        {
            return Err(EngineError::conflict(format!(
                "sale_code '{}' already exists",
                input.sale_code
            )));
        }

        let mut tx = self.db.begin().await?;

        let consignment = self
            .db
            .consignments()
            .get_tx(&mut tx, &input.consignment_id)
            .await?
            .ok_or_else(|| CoreError::ConsignmentNotFound(input.consignment_id.clone()))?;

        let reseller = self
            .db
            .resellers()
            .get_tx(&mut tx, &consignment.reseller_id)
            .await?
            .ok_or_else(|| CoreError::ResellerNotFound(consignment.reseller_id.clone()))?;

        let sale = Sale {
            id: generate_id(),
            sale_code: input.sale_code,
            consignment_id: Some(consignment.id.clone()),
            amount: input.amount,
            sale_date: Utc::now(),
            notes: input.notes,
        };

        self.db.sales().insert_tx(&mut tx, &sale).await?;
        self.db
            .activities()
            .insert_tx(
                &mut tx,
                &record(
                    ActivityType::Penjualan,
                    format!("Penjualan konsinyasi: {} ({})", reseller.name, sale.amount),
                    Some(sale.id.clone()),
                ),
            )
            .await?;
        tx.commit().await.map_err(kaos_db::DbError::from)?;

        info!(sale_code = %sale.sale_code, amount = sale.amount, "Consignment sale recorded");
        Ok(sale)
    }

    /// Deletes a sale record.
    ///
    /// Record-only: stock and consignment paid amounts stay as they are.
    pub async fn delete_sale(&self, id: &str) -> EngineResult<()> {
        let sale = self.get(id).await?;

        let mut tx = self.db.begin().await?;
        self.db.sales().delete_tx(&mut tx, id).await?;
        self.db
            .activities()
            .insert_tx(
                &mut tx,
                &record(
                    ActivityType::Hapus,
                    format!("Hapus penjualan: {}", sale.sale_code),
                    Some(sale.id.clone()),
                ),
            )
            .await?;
        tx.commit().await.map_err(kaos_db::DbError::from)?;

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityLog;
    use crate::consignment::{ConsignmentEngine, NewConsignment, NewConsignmentLine, NewReseller};
    use crate::error::ErrorCode;
    use crate::ledger::{NewProduct, ProductLedger};
    use kaos_core::{Product, ShirtSize, ShirtType};
    use kaos_db::DbConfig;

    struct Fixture {
        db: Database,
        ledger: ProductLedger,
        engine: ConsignmentEngine,
        sales: SalesRecorder,
        product: Product,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = ProductLedger::new(db.clone());
        let engine = ConsignmentEngine::new(db.clone());
        let sales = SalesRecorder::new(db.clone());

        let product = ledger
            .create_product(NewProduct {
                product_code: "KD-001".to_string(),
                shirt_type: ShirtType::Dewasa,
                size: ShirtSize::M,
                stock: 85,
                price: 95_000,
                notes: None,
            })
            .await
            .unwrap();

        Fixture {
            db,
            ledger,
            engine,
            sales,
            product,
        }
    }

    #[tokio::test]
    async fn test_direct_sale_decrements_stock_and_derives_amount() {
        let f = fixture().await;

        let sale = f
            .sales
            .create_direct_sale(NewDirectSale {
                sale_code: "SL-1001".to_string(),
                items: vec![SaleLine {
                    product_id: f.product.id.clone(),
                    quantity: 10,
                    price_per_item: 95_000,
                }],
                notes: Some("Penjualan langsung".to_string()),
            })
            .await
            .unwrap();

        assert!(sale.is_direct());
        assert_eq!(sale.amount, 950_000);
        assert_eq!(f.ledger.get(&f.product.id).await.unwrap().stock, 75);

        let feed = ActivityLog::new(f.db.clone()).recent(None).await.unwrap();
        assert_eq!(feed[0].description, "Penjualan langsung: 950000");
    }

    #[tokio::test]
    async fn test_direct_sale_rejects_zero_derived_amount() {
        let f = fixture().await;

        // Zero price per line is legal (giveaways), but an all-giveaway
        // sale derives amount 0 and must bounce as bad input, not a 500.
        let err = f
            .sales
            .create_direct_sale(NewDirectSale {
                sale_code: "SL-0000".to_string(),
                items: vec![SaleLine {
                    product_id: f.product.id.clone(),
                    quantity: 2,
                    price_per_item: 0,
                }],
                notes: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.status_code(), 400);
        assert_eq!(f.ledger.get(&f.product.id).await.unwrap().stock, 85);
        assert!(f.sales.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_direct_sale_shortfall_changes_nothing() {
        let f = fixture().await;

        let err = f
            .sales
            .create_direct_sale(NewDirectSale {
                sale_code: "SL-9999".to_string(),
                items: vec![SaleLine {
                    product_id: f.product.id.clone(),
                    quantity: 1000,
                    price_per_item: 95_000,
                }],
                notes: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(f.ledger.get(&f.product.id).await.unwrap().stock, 85);
        assert!(f.sales.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_consignment_sale_is_bookkeeping_only() {
        let f = fixture().await;

        let reseller = f
            .engine
            .register_reseller(NewReseller {
                name: "Budi Santoso".to_string(),
                phone: None,
                address: None,
            })
            .await
            .unwrap();
        let consignment = f
            .engine
            .create_consignment(NewConsignment {
                consignment_code: "CN-1001".to_string(),
                reseller_id: reseller.id.clone(),
                notes: None,
                items: vec![NewConsignmentLine {
                    product_id: f.product.id.clone(),
                    quantity: 20,
                    price_per_item: 110_000,
                }],
            })
            .await
            .unwrap();
        let stock_after_consign = f.ledger.get(&f.product.id).await.unwrap().stock;

        let sale = f
            .sales
            .create_consignment_sale(NewConsignmentSale {
                sale_code: "SL-1002".to_string(),
                consignment_id: consignment.id.clone(),
                amount: 550_000,
                notes: None,
            })
            .await
            .unwrap();

        assert!(!sale.is_direct());
        // Neither stock nor paid_amount moved.
        assert_eq!(
            f.ledger.get(&f.product.id).await.unwrap().stock,
            stock_after_consign
        );
        assert_eq!(f.engine.get(&consignment.id).await.unwrap().paid_amount, 0);

        let feed = ActivityLog::new(f.db.clone()).recent(None).await.unwrap();
        assert_eq!(
            feed[0].description,
            "Penjualan konsinyasi: Budi Santoso (550000)"
        );

        let details = f.sales.list_with_consignments().await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(
            details[0]
                .consignment
                .as_ref()
                .unwrap()
                .consignment_code,
            "CN-1001"
        );
    }

    #[tokio::test]
    async fn test_delete_sale_is_record_only() {
        let f = fixture().await;

        let sale = f
            .sales
            .create_direct_sale(NewDirectSale {
                sale_code: "SL-1001".to_string(),
                items: vec![SaleLine {
                    product_id: f.product.id.clone(),
                    quantity: 10,
                    price_per_item: 95_000,
                }],
                notes: None,
            })
            .await
            .unwrap();
        assert_eq!(f.ledger.get(&f.product.id).await.unwrap().stock, 75);

        f.sales.delete_sale(&sale.id).await.unwrap();

        // Gone from the ledger of sales, but the stock it consumed stays consumed.
        assert_eq!(
            f.sales.get(&sale.id).await.unwrap_err().code,
            ErrorCode::NotFound
        );
        assert_eq!(f.ledger.get(&f.product.id).await.unwrap().stock, 75);

        let feed = ActivityLog::new(f.db.clone()).recent(None).await.unwrap();
        assert_eq!(feed[0].description, "Hapus penjualan: SL-1001");
    }

    #[tokio::test]
    async fn test_duplicate_sale_code_conflicts() {
        let f = fixture().await;

        let input = NewDirectSale {
            sale_code: "SL-1001".to_string(),
            items: vec![SaleLine {
                product_id: f.product.id.clone(),
                quantity: 1,
                price_per_item: 95_000,
            }],
            notes: None,
        };
        f.sales.create_direct_sale(input.clone()).await.unwrap();

        let err = f.sales.create_direct_sale(input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_activity_feed_orders_and_limits() {
        let f = fixture().await;

        for i in 0..12 {
            f.sales
                .create_direct_sale(NewDirectSale {
                    sale_code: format!("SL-{:04}", i),
                    items: vec![SaleLine {
                        product_id: f.product.id.clone(),
                        quantity: 1,
                        price_per_item: 95_000,
                    }],
                    notes: None,
                })
                .await
                .unwrap();
        }

        let log = ActivityLog::new(f.db.clone());

        // Default limit is 10, newest first.
        let feed = log.recent(None).await.unwrap();
        assert_eq!(feed.len(), 10);
        assert!(feed
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));

        let feed = log.recent(Some(3)).await.unwrap();
        assert_eq!(feed.len(), 3);
    }
}
