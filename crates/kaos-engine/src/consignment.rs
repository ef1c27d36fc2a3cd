//! # Consignment Engine
//!
//! The consignment lifecycle: reseller registry, consignment creation,
//! partial payments, partial/complete returns, and the administrative edit
//! escape hatch.
//!
//! ## Lifecycle and Stock Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_consignment           process_return                            │
//! │  ─────────────────            ──────────────                            │
//! │  stock ──(qty per item)──►    reseller ──(returned qty)──► stock        │
//! │  reseller                                                               │
//! │                                                                         │
//! │  process_payment moves money only:                                      │
//! │     paid_amount += amount   (capped at total_value)                     │
//! │     status: aktif ──► sebagian ──► lunas                                │
//! │                                                                         │
//! │  status ──► return  iff EVERY item is fully returned                    │
//! │                                                                         │
//! │  Each operation runs in ONE transaction with its activity entry.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::activity::record;
use crate::error::{EngineError, EngineResult};
use kaos_core::{
    status, validation, ActivityType, Consignment, ConsignmentItem, ConsignmentStatus, CoreError,
    Product, Reseller,
};
use kaos_db::{generate_id, Database};

// =============================================================================
// Operation Inputs
// =============================================================================

/// Input for registering a reseller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReseller {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update of a reseller's contact fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResellerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// One product line of a new consignment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConsignmentLine {
    pub product_id: String,
    pub quantity: i64,
    pub price_per_item: i64,
}

/// Input for creating a consignment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConsignment {
    pub consignment_code: String,
    pub reseller_id: String,
    pub notes: Option<String>,
    pub items: Vec<NewConsignmentLine>,
}

/// One entry of a return: how many units of which product came back.
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Administrative edit of a consignment. Direct overwrite, no re-validation
/// against the items; a deliberate escape hatch for corrections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsignmentEdit {
    pub total_items: Option<i64>,
    pub total_value: Option<i64>,
    pub taken_date: Option<DateTime<Utc>>,
    pub status: Option<ConsignmentStatus>,
    pub notes: Option<String>,
}

// =============================================================================
// Detail Views
// =============================================================================

/// A consignment item together with its product.
#[derive(Debug, Clone, Serialize)]
pub struct ItemWithProduct {
    pub item: ConsignmentItem,
    pub product: Option<Product>,
}

/// A consignment with its reseller and item lines attached.
#[derive(Debug, Clone, Serialize)]
pub struct ConsignmentDetail {
    pub consignment: Consignment,
    pub reseller: Option<Reseller>,
    pub items: Vec<ItemWithProduct>,
}

// =============================================================================
// Consignment Engine
// =============================================================================

/// Consignment lifecycle service.
#[derive(Debug, Clone)]
pub struct ConsignmentEngine {
    db: Database,
}

impl ConsignmentEngine {
    /// Creates a new ConsignmentEngine over the given database.
    pub fn new(db: Database) -> Self {
        ConsignmentEngine { db }
    }

    // =========================================================================
    // Reseller Registry
    // =========================================================================

    /// Registers a new reseller.
    pub async fn register_reseller(&self, input: NewReseller) -> EngineResult<Reseller> {
        validation::validate_name("name", &input.name).map_err(CoreError::from)?;

        let reseller = Reseller {
            id: generate_id(),
            name: input.name,
            phone: input.phone,
            address: input.address,
            created_at: Utc::now(),
        };

        let mut tx = self.db.begin().await?;
        self.db.resellers().insert_tx(&mut tx, &reseller).await?;
        self.db
            .activities()
            .insert_tx(
                &mut tx,
                &record(
                    ActivityType::Konsinyasi,
                    format!("Reseller baru: {}", reseller.name),
                    Some(reseller.id.clone()),
                ),
            )
            .await?;
        tx.commit().await.map_err(kaos_db::DbError::from)?;

        info!(name = %reseller.name, "Reseller registered");
        Ok(reseller)
    }

    /// Updates a reseller's contact fields.
    pub async fn update_reseller(&self, id: &str, update: ResellerUpdate) -> EngineResult<Reseller> {
        let mut reseller = self.get_reseller(id).await?;

        if let Some(name) = update.name {
            validation::validate_name("name", &name).map_err(CoreError::from)?;
            reseller.name = name;
        }
        if let Some(phone) = update.phone {
            reseller.phone = Some(phone);
        }
        if let Some(address) = update.address {
            reseller.address = Some(address);
        }

        self.db.resellers().update(&reseller).await?;
        Ok(reseller)
    }

    /// Gets a reseller by ID.
    pub async fn get_reseller(&self, id: &str) -> EngineResult<Reseller> {
        self.db
            .resellers()
            .get(id)
            .await?
            .ok_or_else(|| CoreError::ResellerNotFound(id.to_string()).into())
    }

    /// Lists all resellers.
    pub async fn list_resellers(&self) -> EngineResult<Vec<Reseller>> {
        Ok(self.db.resellers().list().await?)
    }

    // =========================================================================
    // Consignment Lifecycle
    // =========================================================================

    /// Creates a consignment: decrements stock per item and records the
    /// batch, all-or-nothing.
    pub async fn create_consignment(&self, input: NewConsignment) -> EngineResult<Consignment> {
        validation::validate_code("consignment_code", &input.consignment_code)
            .map_err(CoreError::from)?;
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
            .consignments()
            .get_by_code(&input.consignment_code)
            .await?
            .is_some()
        {
            return Err(EngineError::conflict(format!(
                "consignment_code '{}' already exists",
                input.consignment_code
            )));
        }

        let reseller = self.get_reseller(&input.reseller_id).await?;

        let mut tx = self.db.begin().await?;

        // Pull stock per line; any shortfall rolls the whole creation back.
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

            self.db
                .products()
                .adjust_stock_tx(&mut tx, &line.product_id, -line.quantity)
                .await?;
        }

        let lines: Vec<(i64, i64)> = input
            .items
            .iter()
            .map(|line| (line.quantity, line.price_per_item))
            .collect();
        let (total_items, total_value) = status::consignment_totals(&lines);

        let consignment = Consignment {
            id: generate_id(),
            consignment_code: input.consignment_code,
            reseller_id: input.reseller_id,
            total_items,
            total_value,
            paid_amount: 0,
            status: ConsignmentStatus::Aktif,
            taken_date: Utc::now(),
            return_date: None,
            notes: input.notes,
        };

        self.db
            .consignments()
            .insert_tx(&mut tx, &consignment)
            .await?;

        for line in &input.items {
            let item = ConsignmentItem {
                id: generate_id(),
                consignment_id: consignment.id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                returned_quantity: 0,
                price_per_item: line.price_per_item,
            };
            self.db
                .consignments()
                .insert_item_tx(&mut tx, &item)
                .await?;
        }

        self.db
            .activities()
            .insert_tx(
                &mut tx,
                &record(
                    ActivityType::Konsinyasi,
                    format!("Konsinyasi baru: {} ({} pcs)", reseller.name, total_items),
                    Some(consignment.id.clone()),
                ),
            )
            .await?;
        tx.commit().await.map_err(kaos_db::DbError::from)?;

        info!(
            consignment_code = %consignment.consignment_code,
            total_items,
            total_value,
            "Consignment created"
        );
        Ok(consignment)
    }

    /// Records a payment against a consignment.
    ///
    /// Amounts that would push paid_amount past total_value are rejected;
    /// the error carries the remaining balance so the caller can cap a
    /// retry. Full payment flips status to lunas, a partial one to sebagian.
    pub async fn process_payment(&self, id: &str, amount: i64) -> EngineResult<Consignment> {
        validation::validate_amount("amount", amount).map_err(CoreError::from)?;

        let mut tx = self.db.begin().await?;

        let mut consignment = self
            .db
            .consignments()
            .get_tx(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::ConsignmentNotFound(id.to_string()))?;

        let remaining = consignment.total_value - consignment.paid_amount;
        if amount > remaining {
            return Err(CoreError::PaymentExceedsBalance { remaining, amount }.into());
        }

        let new_paid = consignment.paid_amount + amount;
        let new_status =
            status::status_after_payment(consignment.status, new_paid, consignment.total_value);

        self.db
            .consignments()
            .update_payment_tx(&mut tx, id, new_paid, new_status)
            .await?;

        let reseller = self
            .db
            .resellers()
            .get_tx(&mut tx, &consignment.reseller_id)
            .await?
            .ok_or_else(|| CoreError::ResellerNotFound(consignment.reseller_id.clone()))?;

        self.db
            .activities()
            .insert_tx(
                &mut tx,
                &record(
                    ActivityType::Penjualan,
                    format!("Pembayaran konsinyasi: {} ({})", reseller.name, amount),
                    Some(consignment.id.clone()),
                ),
            )
            .await?;
        tx.commit().await.map_err(kaos_db::DbError::from)?;

        consignment.paid_amount = new_paid;
        consignment.status = new_status;
        Ok(consignment)
    }

    /// Processes a return: per entry, bumps the item's returned quantity and
    /// puts the units back in stock; once every item has fully come back the
    /// consignment flips to `return` and the return date is stamped.
    pub async fn process_return(
        &self,
        id: &str,
        returns: Vec<ReturnLine>,
    ) -> EngineResult<Consignment> {
        if returns.is_empty() {
            return Err(CoreError::from(kaos_core::ValidationError::Required {
                field: "items".to_string(),
            })
            .into());
        }
        for entry in &returns {
            validation::validate_quantity("quantity", entry.quantity).map_err(CoreError::from)?;
        }

        let mut tx = self.db.begin().await?;

        let mut consignment = self
            .db
            .consignments()
            .get_tx(&mut tx, id)
            .await?
            .ok_or_else(|| CoreError::ConsignmentNotFound(id.to_string()))?;

        let mut items = self.db.consignments().items_tx(&mut tx, id).await?;

        for entry in &returns {
            let item = items
                .iter_mut()
                .find(|item| item.product_id == entry.product_id)
                .ok_or_else(|| CoreError::ProductNotInConsignment {
                    product_id: entry.product_id.clone(),
                })?;

            let available = item.outstanding_quantity();
            if entry.quantity > available {
                let product = self
                    .db
                    .products()
                    .get_tx(&mut tx, &entry.product_id)
                    .await?
                    .ok_or_else(|| CoreError::ProductNotFound(entry.product_id.clone()))?;
                return Err(CoreError::ReturnExceedsOutstanding {
                    product_code: product.product_code,
                    available,
                    requested: entry.quantity,
                }
                .into());
            }

            item.returned_quantity += entry.quantity;
            let new_returned = item.returned_quantity;
            let item_id = item.id.clone();
            self.db
                .consignments()
                .update_item_returned_tx(&mut tx, &item_id, new_returned)
                .await?;
            self.db
                .products()
                .adjust_stock_tx(&mut tx, &entry.product_id, entry.quantity)
                .await?;
        }

        // Re-read after ALL updates; the status decision looks at the whole
        // consignment, not the entries just processed.
        let items_after = self.db.consignments().items_tx(&mut tx, id).await?;
        let new_status = status::status_after_return(consignment.status, &items_after);
        let return_date = if new_status == ConsignmentStatus::Return {
            consignment.return_date.or_else(|| Some(Utc::now()))
        } else {
            consignment.return_date
        };

        self.db
            .consignments()
            .update_return_tx(&mut tx, id, new_status, return_date)
            .await?;

        let reseller = self
            .db
            .resellers()
            .get_tx(&mut tx, &consignment.reseller_id)
            .await?
            .ok_or_else(|| CoreError::ResellerNotFound(consignment.reseller_id.clone()))?;

        let total_returned: i64 = returns.iter().map(|entry| entry.quantity).sum();
        self.db
            .activities()
            .insert_tx(
                &mut tx,
                &record(
                    ActivityType::Return,
                    format!(
                        "Pengembalian konsinyasi: {} ({} pcs)",
                        reseller.name, total_returned
                    ),
                    Some(consignment.id.clone()),
                ),
            )
            .await?;
        tx.commit().await.map_err(kaos_db::DbError::from)?;

        consignment.status = new_status;
        consignment.return_date = return_date;
        Ok(consignment)
    }

    /// Administrative edit: direct overwrite of totals, taken date, status,
    /// and notes. No re-validation against the items.
    pub async fn edit_consignment(
        &self,
        id: &str,
        edit: ConsignmentEdit,
    ) -> EngineResult<Consignment> {
        let mut consignment = self.get(id).await?;

        if let Some(total_items) = edit.total_items {
            consignment.total_items = total_items;
        }
        if let Some(total_value) = edit.total_value {
            consignment.total_value = total_value;
        }
        if let Some(taken_date) = edit.taken_date {
            consignment.taken_date = taken_date;
        }
        if let Some(new_status) = edit.status {
            consignment.status = new_status;
        }
        if let Some(notes) = edit.notes {
            consignment.notes = Some(notes);
        }

        let mut tx = self.db.begin().await?;
        self.db
            .consignments()
            .update_tx(&mut tx, &consignment)
            .await?;
        tx.commit().await.map_err(kaos_db::DbError::from)?;

        Ok(consignment)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a consignment by ID.
    pub async fn get(&self, id: &str) -> EngineResult<Consignment> {
        self.db
            .consignments()
            .get(id)
            .await?
            .ok_or_else(|| CoreError::ConsignmentNotFound(id.to_string()).into())
    }

    /// Gets a consignment by its business code.
    pub async fn get_by_code(&self, code: &str) -> EngineResult<Consignment> {
        self.db
            .consignments()
            .get_by_code(code)
            .await?
            .ok_or_else(|| CoreError::ConsignmentNotFound(code.to_string()).into())
    }

    /// Gets a consignment with reseller and items attached.
    pub async fn detail(&self, id: &str) -> EngineResult<ConsignmentDetail> {
        let consignment = self.get(id).await?;
        let mut details = self.attach(vec![consignment]).await?;
        // attach() preserves input length
        details
            .pop()
            .ok_or_else(|| EngineError::internal("detail assembly lost its row"))
    }

    /// Lists all consignments with resellers and items attached.
    pub async fn list(&self) -> EngineResult<Vec<ConsignmentDetail>> {
        let consignments = self.db.consignments().list().await?;
        self.attach(consignments).await
    }

    /// Lists open consignments (aktif or sebagian) with details attached.
    pub async fn list_active(&self) -> EngineResult<Vec<ConsignmentDetail>> {
        let consignments = self.db.consignments().list_active().await?;
        self.attach(consignments).await
    }

    /// Lists one reseller's consignments with details attached.
    pub async fn list_by_reseller(
        &self,
        reseller_id: &str,
    ) -> EngineResult<Vec<ConsignmentDetail>> {
        let consignments = self.db.consignments().list_by_reseller(reseller_id).await?;
        self.attach(consignments).await
    }

    /// Batch fetch + in-memory join of resellers, items, and products.
    async fn attach(&self, consignments: Vec<Consignment>) -> EngineResult<Vec<ConsignmentDetail>> {
        if consignments.is_empty() {
            return Ok(Vec::new());
        }

        let mut reseller_ids: Vec<String> = consignments
            .iter()
            .map(|c| c.reseller_id.clone())
            .collect();
        reseller_ids.sort();
        reseller_ids.dedup();

        let consignment_ids: Vec<String> = consignments.iter().map(|c| c.id.clone()).collect();

        let resellers: HashMap<String, Reseller> = self
            .db
            .resellers()
            .get_many(&reseller_ids)
            .await?
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect();

        let all_items = self.db.consignments().items_for(&consignment_ids).await?;

        let mut product_ids: Vec<String> =
            all_items.iter().map(|i| i.product_id.clone()).collect();
        product_ids.sort();
        product_ids.dedup();

        let products: HashMap<String, Product> = self
            .db
            .products()
            .get_many(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let mut items_by_consignment: HashMap<String, Vec<ConsignmentItem>> = HashMap::new();
        for item in all_items {
            items_by_consignment
                .entry(item.consignment_id.clone())
                .or_default()
                .push(item);
        }

        let details = consignments
            .into_iter()
            .map(|consignment| {
                let items = items_by_consignment
                    .remove(&consignment.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|item| {
                        let product = products.get(&item.product_id).cloned();
                        ItemWithProduct { item, product }
                    })
                    .collect();
                let reseller = resellers.get(&consignment.reseller_id).cloned();
                ConsignmentDetail {
                    consignment,
                    reseller,
                    items,
                }
            })
            .collect();

        Ok(details)
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
    use crate::ledger::{NewProduct, ProductLedger};
    use kaos_core::{ShirtSize, ShirtType};
    use kaos_db::DbConfig;

    struct Fixture {
        db: Database,
        ledger: ProductLedger,
        engine: ConsignmentEngine,
        product_l: Product,
        product_xl: Product,
        reseller: Reseller,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = ProductLedger::new(db.clone());
        let engine = ConsignmentEngine::new(db.clone());

        let product_l = ledger
            .create_product(NewProduct {
                product_code: "KD-002".to_string(),
                shirt_type: ShirtType::Dewasa,
                size: ShirtSize::L,
                stock: 72,
                price: 95_000,
                notes: None,
            })
            .await
            .unwrap();
        let product_xl = ledger
            .create_product(NewProduct {
                product_code: "KD-003".to_string(),
                shirt_type: ShirtType::Dewasa,
                size: ShirtSize::Xl,
                stock: 124,
                price: 100_000,
                notes: None,
            })
            .await
            .unwrap();
        let reseller = engine
            .register_reseller(NewReseller {
                name: "Budi Santoso".to_string(),
                phone: Some("0812-3456-7890".to_string()),
                address: None,
            })
            .await
            .unwrap();

        Fixture {
            db,
            ledger,
            engine,
            product_l,
            product_xl,
            reseller,
        }
    }

    fn two_line_consignment(f: &Fixture) -> NewConsignment {
        NewConsignment {
            consignment_code: "CN-1001".to_string(),
            reseller_id: f.reseller.id.clone(),
            notes: Some("Konsinyasi pertama".to_string()),
            items: vec![
                NewConsignmentLine {
                    product_id: f.product_xl.id.clone(),
                    quantity: 15,
                    price_per_item: 110_000,
                },
                NewConsignmentLine {
                    product_id: f.product_l.id.clone(),
                    quantity: 10,
                    price_per_item: 105_000,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_create_consignment_moves_stock_and_fixes_totals() {
        let f = fixture().await;

        let consignment = f
            .engine
            .create_consignment(two_line_consignment(&f))
            .await
            .unwrap();

        assert_eq!(consignment.total_items, 25);
        assert_eq!(consignment.total_value, 15 * 110_000 + 10 * 105_000);
        assert_eq!(consignment.paid_amount, 0);
        assert_eq!(consignment.status, ConsignmentStatus::Aktif);

        assert_eq!(f.ledger.get(&f.product_xl.id).await.unwrap().stock, 109);
        assert_eq!(f.ledger.get(&f.product_l.id).await.unwrap().stock, 62);

        let feed = ActivityLog::new(f.db.clone()).recent(None).await.unwrap();
        assert_eq!(feed[0].description, "Konsinyasi baru: Budi Santoso (25 pcs)");
    }

    #[tokio::test]
    async fn test_shortfall_rolls_back_whole_creation() {
        let f = fixture().await;

        let mut input = two_line_consignment(&f);
        input.items[1].quantity = 100; // only 72 in stock

        let err = f.engine.create_consignment(input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        // The first line's decrement must have been rolled back too.
        assert_eq!(f.ledger.get(&f.product_xl.id).await.unwrap().stock, 124);
        assert_eq!(f.ledger.get(&f.product_l.id).await.unwrap().stock, 72);
        assert!(f.engine.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payment_progression_and_overpay_rejection() {
        let f = fixture().await;
        let consignment = f
            .engine
            .create_consignment(two_line_consignment(&f))
            .await
            .unwrap();
        let total = consignment.total_value;

        let after_partial = f
            .engine
            .process_payment(&consignment.id, 800_000)
            .await
            .unwrap();
        assert_eq!(after_partial.status, ConsignmentStatus::Sebagian);
        assert_eq!(after_partial.paid_amount, 800_000);

        // Paying past the remaining balance is rejected and changes nothing.
        let err = f
            .engine
            .process_payment(&consignment.id, total)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert_eq!(
            f.engine.get(&consignment.id).await.unwrap().paid_amount,
            800_000
        );

        let after_full = f
            .engine
            .process_payment(&consignment.id, total - 800_000)
            .await
            .unwrap();
        assert_eq!(after_full.status, ConsignmentStatus::Lunas);
        assert_eq!(after_full.paid_amount, total);

        let feed = ActivityLog::new(f.db.clone()).recent(None).await.unwrap();
        assert!(feed
            .iter()
            .any(|a| a.description == "Pembayaran konsinyasi: Budi Santoso (800000)"));
    }

    #[tokio::test]
    async fn test_partial_return_keeps_status_and_restocks() {
        let f = fixture().await;
        let consignment = f
            .engine
            .create_consignment(two_line_consignment(&f))
            .await
            .unwrap();

        let after = f
            .engine
            .process_return(
                &consignment.id,
                vec![ReturnLine {
                    product_id: f.product_xl.id.clone(),
                    quantity: 5,
                }],
            )
            .await
            .unwrap();

        assert_eq!(after.status, ConsignmentStatus::Aktif);
        assert!(after.return_date.is_none());
        assert_eq!(f.ledger.get(&f.product_xl.id).await.unwrap().stock, 114);

        let detail = f.engine.detail(&consignment.id).await.unwrap();
        let line = detail
            .items
            .iter()
            .find(|i| i.item.product_id == f.product_xl.id)
            .unwrap();
        assert_eq!(line.item.returned_quantity, 5);
        assert_eq!(line.item.outstanding_quantity(), 10);
    }

    #[tokio::test]
    async fn test_complete_return_round_trips_stock() {
        let f = fixture().await;
        let consignment = f
            .engine
            .create_consignment(two_line_consignment(&f))
            .await
            .unwrap();

        // Split returns; the second one completes the consignment.
        f.engine
            .process_return(
                &consignment.id,
                vec![ReturnLine {
                    product_id: f.product_xl.id.clone(),
                    quantity: 15,
                }],
            )
            .await
            .unwrap();
        let done = f
            .engine
            .process_return(
                &consignment.id,
                vec![ReturnLine {
                    product_id: f.product_l.id.clone(),
                    quantity: 10,
                }],
            )
            .await
            .unwrap();

        assert_eq!(done.status, ConsignmentStatus::Return);
        assert!(done.return_date.is_some());

        // Stock is back where it started.
        assert_eq!(f.ledger.get(&f.product_xl.id).await.unwrap().stock, 124);
        assert_eq!(f.ledger.get(&f.product_l.id).await.unwrap().stock, 72);

        let feed = ActivityLog::new(f.db.clone()).recent(None).await.unwrap();
        assert!(feed
            .iter()
            .any(|a| a.description == "Pengembalian konsinyasi: Budi Santoso (10 pcs)"));
    }

    #[tokio::test]
    async fn test_split_return_of_same_item_accumulates() {
        let f = fixture().await;
        let consignment = f
            .engine
            .create_consignment(two_line_consignment(&f))
            .await
            .unwrap();

        // 5 now, 10 later: the second call adds onto the first, exactly as
        // one combined 15-unit return would have.
        f.engine
            .process_return(
                &consignment.id,
                vec![ReturnLine {
                    product_id: f.product_xl.id.clone(),
                    quantity: 5,
                }],
            )
            .await
            .unwrap();
        f.engine
            .process_return(
                &consignment.id,
                vec![ReturnLine {
                    product_id: f.product_xl.id.clone(),
                    quantity: 10,
                }],
            )
            .await
            .unwrap();

        let detail = f.engine.detail(&consignment.id).await.unwrap();
        let line = detail
            .items
            .iter()
            .find(|i| i.item.product_id == f.product_xl.id)
            .unwrap();
        assert_eq!(line.item.returned_quantity, 15);
        assert!(line.item.is_fully_returned());
        assert_eq!(f.ledger.get(&f.product_xl.id).await.unwrap().stock, 124);

        // Nothing left outstanding on that line; one more unit is rejected.
        let err = f
            .engine
            .process_return(
                &consignment.id,
                vec![ReturnLine {
                    product_id: f.product_xl.id.clone(),
                    quantity: 1,
                }],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_return_validation() {
        let f = fixture().await;
        let consignment = f
            .engine
            .create_consignment(two_line_consignment(&f))
            .await
            .unwrap();

        // More than outstanding.
        let err = f
            .engine
            .process_return(
                &consignment.id,
                vec![ReturnLine {
                    product_id: f.product_xl.id.clone(),
                    quantity: 16,
                }],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // A product that was never consigned.
        let err = f
            .engine
            .process_return(
                &consignment.id,
                vec![ReturnLine {
                    product_id: "not-a-product".to_string(),
                    quantity: 1,
                }],
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Neither attempt moved any stock.
        assert_eq!(f.ledger.get(&f.product_xl.id).await.unwrap().stock, 109);
    }

    #[tokio::test]
    async fn test_product_delete_blocked_even_after_full_return() {
        let f = fixture().await;
        let consignment = f
            .engine
            .create_consignment(two_line_consignment(&f))
            .await
            .unwrap();

        f.engine
            .process_return(
                &consignment.id,
                vec![
                    ReturnLine {
                        product_id: f.product_xl.id.clone(),
                        quantity: 15,
                    },
                    ReturnLine {
                        product_id: f.product_l.id.clone(),
                        quantity: 10,
                    },
                ],
            )
            .await
            .unwrap();

        let err = f.ledger.delete_product(&f.product_xl.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_detail_and_active_listing() {
        let f = fixture().await;
        let consignment = f
            .engine
            .create_consignment(two_line_consignment(&f))
            .await
            .unwrap();

        let detail = f.engine.detail(&consignment.id).await.unwrap();
        assert_eq!(detail.reseller.as_ref().unwrap().name, "Budi Santoso");
        assert_eq!(detail.items.len(), 2);
        assert!(detail.items.iter().all(|i| i.product.is_some()));

        assert_eq!(f.engine.list_active().await.unwrap().len(), 1);

        let budi_batches = f.engine.list_by_reseller(&f.reseller.id).await.unwrap();
        assert_eq!(budi_batches.len(), 1);
        assert!(f
            .engine
            .list_by_reseller("no-such-reseller")
            .await
            .unwrap()
            .is_empty());

        // Fully pay; no longer active.
        f.engine
            .process_payment(&consignment.id, consignment.total_value)
            .await
            .unwrap();
        assert!(f.engine.list_active().await.unwrap().is_empty());
        assert_eq!(f.engine.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_consignment_overwrites_without_revalidation() {
        let f = fixture().await;
        let consignment = f
            .engine
            .create_consignment(two_line_consignment(&f))
            .await
            .unwrap();

        let edited = f
            .engine
            .edit_consignment(
                &consignment.id,
                ConsignmentEdit {
                    status: Some(ConsignmentStatus::Lunas),
                    notes: Some("Koreksi manual".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(edited.status, ConsignmentStatus::Lunas);
        assert_eq!(edited.notes.as_deref(), Some("Koreksi manual"));
        // paid_amount untouched by the edit path.
        assert_eq!(edited.paid_amount, 0);
    }
}
