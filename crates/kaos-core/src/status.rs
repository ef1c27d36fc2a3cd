//! # Consignment Status State Machine
//!
//! Pure transition functions for the consignment lifecycle. The engine layer
//! reads current state from the database, calls into here, and persists
//! whatever comes back; no transition logic lives anywhere else.
//!
//! ## Lifecycle
//! ```text
//!                    payment (partial)
//!          ┌──────────────────────────────┐
//!          │                              ▼
//!       ┌──────┐   payment (full)    ┌──────────┐  payment (full)  ┌───────┐
//!       │aktif │────────────────────►│ sebagian │─────────────────►│ lunas │
//!       └──┬───┘                     └────┬─────┘                  └───────┘
//!          │                              │
//!          │ every item fully returned    │
//!          ▼                              ▼
//!       ┌────────────────────────────────────┐
//!       │               return               │
//!       └────────────────────────────────────┘
//! ```
//!
//! Payments move status forward based on the *cumulative* paid amount, never
//! backward. Returns flip status to `return` only once **every** item on the
//! consignment has been fully returned; partial returns leave status alone.

use crate::types::{ConsignmentItem, ConsignmentStatus};

// =============================================================================
// Transition Functions
// =============================================================================

/// Computes the status after a payment has been applied.
///
/// `new_paid` is the cumulative paid amount *after* the payment. A payment
/// covering the full value yields `Lunas`; any positive partial payment
/// yields `Sebagian`; a cumulative amount of zero leaves the current status
/// unchanged.
pub fn status_after_payment(
    current: ConsignmentStatus,
    new_paid: i64,
    total_value: i64,
) -> ConsignmentStatus {
    if new_paid >= total_value {
        ConsignmentStatus::Lunas
    } else if new_paid > 0 {
        ConsignmentStatus::Sebagian
    } else {
        current
    }
}

/// True when every item on the consignment has been fully returned.
///
/// An empty item list counts as fully returned.
pub fn all_returned(items: &[ConsignmentItem]) -> bool {
    items.iter().all(|item| item.is_fully_returned())
}

/// Computes the status after a return has been applied to the items.
///
/// Status flips to `Return` only once the whole consignment has come back;
/// otherwise the current status stands.
pub fn status_after_return(
    current: ConsignmentStatus,
    items: &[ConsignmentItem],
) -> ConsignmentStatus {
    if all_returned(items) {
        ConsignmentStatus::Return
    } else {
        current
    }
}

/// Derives `(total_items, total_value)` from `(quantity, price_per_item)`
/// pairs. Both totals are fixed at consignment creation and never
/// recalculated afterwards.
pub fn consignment_totals(lines: &[(i64, i64)]) -> (i64, i64) {
    let total_items = lines.iter().map(|(qty, _)| qty).sum();
    let total_value = lines.iter().map(|(qty, price)| qty * price).sum();
    (total_items, total_value)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, returned: i64) -> ConsignmentItem {
        ConsignmentItem {
            id: format!("i-{}", quantity),
            consignment_id: "c-1".to_string(),
            product_id: "p-1".to_string(),
            quantity,
            returned_quantity: returned,
            price_per_item: 100_000,
        }
    }

    #[test]
    fn test_full_payment_reaches_lunas() {
        let status = status_after_payment(ConsignmentStatus::Aktif, 2_750_000, 2_750_000);
        assert_eq!(status, ConsignmentStatus::Lunas);
    }

    #[test]
    fn test_overshooting_cumulative_amount_is_lunas() {
        // Transition function is pure; the overpayment guard lives upstream.
        let status = status_after_payment(ConsignmentStatus::Sebagian, 3_000_000, 2_750_000);
        assert_eq!(status, ConsignmentStatus::Lunas);
    }

    #[test]
    fn test_partial_payment_reaches_sebagian() {
        let status = status_after_payment(ConsignmentStatus::Aktif, 800_000, 2_750_000);
        assert_eq!(status, ConsignmentStatus::Sebagian);

        // A second partial payment keeps sebagian.
        let status = status_after_payment(ConsignmentStatus::Sebagian, 1_600_000, 2_750_000);
        assert_eq!(status, ConsignmentStatus::Sebagian);
    }

    #[test]
    fn test_zero_cumulative_keeps_current_status() {
        let status = status_after_payment(ConsignmentStatus::Aktif, 0, 2_750_000);
        assert_eq!(status, ConsignmentStatus::Aktif);
    }

    #[test]
    fn test_all_returned() {
        assert!(all_returned(&[item(10, 10), item(5, 5)]));
        assert!(!all_returned(&[item(10, 10), item(5, 4)]));
        assert!(!all_returned(&[item(10, 0)]));
        assert!(all_returned(&[]));
    }

    #[test]
    fn test_partial_return_keeps_status() {
        let items = [item(10, 4), item(5, 5)];
        let status = status_after_return(ConsignmentStatus::Sebagian, &items);
        assert_eq!(status, ConsignmentStatus::Sebagian);
    }

    #[test]
    fn test_complete_return_flips_status() {
        let items = [item(10, 10), item(5, 5)];
        let status = status_after_return(ConsignmentStatus::Aktif, &items);
        assert_eq!(status, ConsignmentStatus::Return);

        // Even a fully paid consignment flips once everything comes back.
        let status = status_after_return(ConsignmentStatus::Lunas, &items);
        assert_eq!(status, ConsignmentStatus::Return);
    }

    #[test]
    fn test_consignment_totals() {
        let lines = [(15, 110_000), (10, 110_000)];
        assert_eq!(consignment_totals(&lines), (25, 2_750_000));

        assert_eq!(consignment_totals(&[]), (0, 0));
    }
}
