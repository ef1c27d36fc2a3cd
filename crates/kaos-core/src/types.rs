//! # Domain Types
//!
//! Core domain types for the inventory/consignment system.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Consignment    │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  product_code   │   │ consignment_code│   │  sale_code      │       │
//! │  │  stock          │   │  paid_amount    │   │  consignment_id?│       │
//! │  │  price          │   │  status         │   │  amount         │       │
//! │  └─────────────────┘   └────────┬────────┘   └─────────────────┘       │
//! │                                 │                                       │
//! │  ┌─────────────────┐   ┌────────▼────────┐   ┌─────────────────┐       │
//! │  │    Reseller     │   │ ConsignmentItem │   │    Activity     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name, phone    │   │  quantity       │   │  activity_type  │       │
//! │  │  address        │   │ returned_qty    │   │  description    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business code: (product_code, consignment_code, sale_code) -
//!   human-readable, unique
//!
//! ## Wire Strings
//! The enum string values (`aktif`, `lunas`, `Kaos Dewasa`, `stok`, ...) are
//! part of the persisted contract and must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Shirt Type
// =============================================================================

/// The fixed catalogue of shirt types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum ShirtType {
    #[serde(rename = "Kaos Dewasa")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Kaos Dewasa"))]
    Dewasa,

    #[serde(rename = "Kaos Dewasa Panjang")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Kaos Dewasa Panjang"))]
    DewasaPanjang,

    #[serde(rename = "Kaos Bloombee")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Kaos Bloombee"))]
    Bloombee,

    #[serde(rename = "Kaos Anak")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Kaos Anak"))]
    Anak,

    #[serde(rename = "Kaos Anak Tanggung")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Kaos Anak Tanggung"))]
    AnakTanggung,
}

impl ShirtType {
    /// Returns the wire/display string ("Kaos Dewasa", ...).
    pub const fn as_str(&self) -> &'static str {
        match self {
            ShirtType::Dewasa => "Kaos Dewasa",
            ShirtType::DewasaPanjang => "Kaos Dewasa Panjang",
            ShirtType::Bloombee => "Kaos Bloombee",
            ShirtType::Anak => "Kaos Anak",
            ShirtType::AnakTanggung => "Kaos Anak Tanggung",
        }
    }
}

impl fmt::Display for ShirtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Shirt Size
// =============================================================================

/// The fixed catalogue of shirt sizes, M through 8XL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum ShirtSize {
    M,
    L,
    #[serde(rename = "XL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "XL"))]
    Xl,
    #[serde(rename = "2XL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "2XL"))]
    Xl2,
    #[serde(rename = "3XL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "3XL"))]
    Xl3,
    #[serde(rename = "4XL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "4XL"))]
    Xl4,
    #[serde(rename = "5XL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "5XL"))]
    Xl5,
    #[serde(rename = "6XL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "6XL"))]
    Xl6,
    #[serde(rename = "7XL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "7XL"))]
    Xl7,
    #[serde(rename = "8XL")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "8XL"))]
    Xl8,
}

impl ShirtSize {
    /// Returns the wire/display string ("M", "XL", "2XL", ...).
    pub const fn as_str(&self) -> &'static str {
        match self {
            ShirtSize::M => "M",
            ShirtSize::L => "L",
            ShirtSize::Xl => "XL",
            ShirtSize::Xl2 => "2XL",
            ShirtSize::Xl3 => "3XL",
            ShirtSize::Xl4 => "4XL",
            ShirtSize::Xl5 => "5XL",
            ShirtSize::Xl6 => "6XL",
            ShirtSize::Xl7 => "7XL",
            ShirtSize::Xl8 => "8XL",
        }
    }
}

impl fmt::Display for ShirtSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Consignment Status
// =============================================================================

/// The status of a consignment.
///
/// ## State Machine
/// ```text
/// aktif ──payment──► sebagian ──payment──► lunas (terminal)
///   │                   │
///   └──all returned─────┴──────────────► return (terminal)
/// ```
/// `lunas` and `return` are terminal for the payment/return protocol; the
/// administrative edit operation can still force any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ConsignmentStatus {
    /// Active, nothing paid yet.
    Aktif,
    /// Fully paid.
    Lunas,
    /// Partially paid.
    Sebagian,
    /// All items returned by the reseller.
    Return,
}

impl ConsignmentStatus {
    /// Returns the wire string ("aktif", "lunas", "sebagian", "return").
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConsignmentStatus::Aktif => "aktif",
            ConsignmentStatus::Lunas => "lunas",
            ConsignmentStatus::Sebagian => "sebagian",
            ConsignmentStatus::Return => "return",
        }
    }

    /// An open consignment still has money or goods outstanding.
    pub const fn is_open(&self) -> bool {
        matches!(self, ConsignmentStatus::Aktif | ConsignmentStatus::Sebagian)
    }
}

impl Default for ConsignmentStatus {
    fn default() -> Self {
        ConsignmentStatus::Aktif
    }
}

impl fmt::Display for ConsignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Activity Type
// =============================================================================

/// Category of an activity-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// Stock intake or adjustment.
    Stok,
    /// Consignment created / reseller registered.
    Konsinyasi,
    /// Sale recorded or consignment payment received.
    Penjualan,
    /// Consigned goods returned.
    Return,
    /// A record was deleted.
    Hapus,
}

impl ActivityType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Stok => "stok",
            ActivityType::Konsinyasi => "konsinyasi",
            ActivityType::Penjualan => "penjualan",
            ActivityType::Return => "return",
            ActivityType::Hapus => "hapus",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A shirt product with its authoritative stock count.
///
/// `stock` counts units available for sale or consignment; units already
/// consigned out are NOT included. It is mutated only through the product
/// ledger's adjust-stock primitive so the activity log stays consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business code, e.g. "KD-001". Unique.
    pub product_code: String,

    /// Shirt type.
    pub shirt_type: ShirtType,

    /// Shirt size.
    pub size: ShirtSize,

    /// Units in stock. Never negative.
    pub stock: i64,

    /// Unit price in whole rupiah.
    pub price: i64,

    /// Free-form notes ("Hitam polos", ...).
    pub notes: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_rupiah(self.price)
    }

    /// Human-facing name used in activity descriptions: "Kaos Dewasa XL".
    pub fn display_name(&self) -> String {
        format!("{} {}", self.shirt_type, self.size)
    }
}

// =============================================================================
// Reseller
// =============================================================================

/// A consignment counterparty.
///
/// Immutable after creation except for the contact fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Reseller {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Consignment
// =============================================================================

/// A batch of goods handed to a reseller, tracked until paid or returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Consignment {
    pub id: String,

    /// Business code, e.g. "CN-1001". Unique.
    pub consignment_code: String,

    /// The reseller holding the goods.
    pub reseller_id: String,

    /// Σ quantity over the consignment's items, fixed at creation.
    pub total_items: i64,

    /// Σ (quantity × price_per_item) over the items, fixed at creation.
    pub total_value: i64,

    /// Amount paid so far. Invariant: 0 <= paid_amount <= total_value.
    pub paid_amount: i64,

    /// Current state-machine status.
    pub status: ConsignmentStatus,

    /// When the goods were handed out.
    pub taken_date: DateTime<Utc>,

    /// Stamped when every item has been fully returned.
    pub return_date: Option<DateTime<Utc>>,

    pub notes: Option<String>,
}

impl Consignment {
    /// Total consigned value as Money.
    #[inline]
    pub fn total_value(&self) -> Money {
        Money::from_rupiah(self.total_value)
    }

    /// Amount still owed by the reseller.
    #[inline]
    pub fn outstanding_balance(&self) -> Money {
        Money::from_rupiah(self.total_value - self.paid_amount)
    }
}

// =============================================================================
// Consignment Item
// =============================================================================

/// One product line within a consignment.
///
/// `quantity` is fixed at creation; only `returned_quantity` moves, and only
/// upward, bounded by `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ConsignmentItem {
    pub id: String,
    pub consignment_id: String,
    pub product_id: String,

    /// Units handed out. Positive, fixed at creation.
    pub quantity: i64,

    /// Units returned so far. Invariant: 0 <= returned_quantity <= quantity.
    pub returned_quantity: i64,

    /// Agreed unit price for this consignment (may differ from list price).
    pub price_per_item: i64,
}

impl ConsignmentItem {
    /// Units still held by the reseller (unsold or sold-but-not-returned).
    #[inline]
    pub fn outstanding_quantity(&self) -> i64 {
        self.quantity - self.returned_quantity
    }

    /// True when every handed-out unit has come back.
    #[inline]
    pub fn is_fully_returned(&self) -> bool {
        self.returned_quantity == self.quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
///
/// `consignment_id` of `None` means a direct sale from owned inventory;
/// `Some` attributes the sale to a reseller's consignment (bookkeeping only,
/// stock already left inventory at consignment creation).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,

    /// Business code, e.g. "SL-1001". Unique.
    pub sale_code: String,

    pub consignment_id: Option<String>,

    /// Sale amount in whole rupiah. Positive.
    pub amount: i64,

    pub sale_date: DateTime<Utc>,

    pub notes: Option<String>,
}

impl Sale {
    /// True for a sale from owned inventory (not via a reseller).
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.consignment_id.is_none()
    }

    /// Sale amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_rupiah(self.amount)
    }
}

// =============================================================================
// Activity
// =============================================================================

/// An append-only audit-trail entry.
///
/// Written as a side effect of every state-changing operation; never
/// updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Activity {
    pub id: String,
    pub activity_type: ActivityType,
    pub description: String,
    pub timestamp: DateTime<Utc>,

    /// ID of the entity the activity refers to, when applicable.
    pub related_id: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_product() -> Product {
        Product {
            id: "p-1".to_string(),
            product_code: "KD-003".to_string(),
            shirt_type: ShirtType::Dewasa,
            size: ShirtSize::Xl,
            stock: 124,
            price: 100_000,
            notes: Some("Hitam polos".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_wire_strings() {
        assert_eq!(ShirtType::DewasaPanjang.as_str(), "Kaos Dewasa Panjang");
        assert_eq!(ShirtSize::Xl3.as_str(), "3XL");
        assert_eq!(ConsignmentStatus::Sebagian.as_str(), "sebagian");
        assert_eq!(ActivityType::Hapus.as_str(), "hapus");
    }

    #[test]
    fn test_serde_uses_wire_strings() {
        let json = serde_json::to_string(&ConsignmentStatus::Return).unwrap();
        assert_eq!(json, "\"return\"");

        let json = serde_json::to_string(&ShirtType::AnakTanggung).unwrap();
        assert_eq!(json, "\"Kaos Anak Tanggung\"");

        let size: ShirtSize = serde_json::from_str("\"2XL\"").unwrap();
        assert_eq!(size, ShirtSize::Xl2);
    }

    #[test]
    fn test_product_display_name() {
        assert_eq!(sample_product().display_name(), "Kaos Dewasa XL");
    }

    #[test]
    fn test_consignment_outstanding_balance() {
        let consignment = Consignment {
            id: "c-1".to_string(),
            consignment_code: "CN-1001".to_string(),
            reseller_id: "r-1".to_string(),
            total_items: 25,
            total_value: 2_750_000,
            paid_amount: 800_000,
            status: ConsignmentStatus::Sebagian,
            taken_date: Utc::now(),
            return_date: None,
            notes: None,
        };
        assert_eq!(consignment.outstanding_balance().rupiah(), 1_950_000);
    }

    #[test]
    fn test_item_outstanding_quantity() {
        let item = ConsignmentItem {
            id: "i-1".to_string(),
            consignment_id: "c-1".to_string(),
            product_id: "p-1".to_string(),
            quantity: 15,
            returned_quantity: 5,
            price_per_item: 110_000,
        };
        assert_eq!(item.outstanding_quantity(), 10);
        assert!(!item.is_fully_returned());
    }

    #[test]
    fn test_status_is_open() {
        assert!(ConsignmentStatus::Aktif.is_open());
        assert!(ConsignmentStatus::Sebagian.is_open());
        assert!(!ConsignmentStatus::Lunas.is_open());
        assert!(!ConsignmentStatus::Return.is_open());
    }
}
