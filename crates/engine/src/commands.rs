//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Every command carries the
//! caller's `user_id` explicitly; there is no ambient caller context.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{ExpenseType, MovementType};

/// One blueprint usage to create.
///
/// `blueprint_id` and `actual_sale_price_cents` are required; they stay
/// `Option` here so a batch can be validated as a whole and rejected with
/// the index of the offending entry.
#[derive(Clone, Debug, Default)]
pub struct UsageSpec {
    pub blueprint_id: Option<Uuid>,
    pub actual_materials_cost_cents: Option<i64>,
    pub actual_labor_cost_cents: Option<i64>,
    pub actual_overhead_cost_cents: Option<i64>,
    pub actual_sale_price_cents: Option<i64>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Create one or more blueprint usages, deducting inventory for the batch.
#[derive(Clone, Debug)]
pub struct CreateUsagesCmd {
    pub user_id: String,
    pub invoice_id: Option<Uuid>,
    pub usages: Vec<UsageSpec>,
    pub deduct_inventory: bool,
}

/// Link a bank transaction to an invoice.
///
/// Exactly one of `amount_cents` / `percentage` may be given; with neither,
/// the transaction's full absolute amount is allocated.
#[derive(Clone, Debug)]
pub struct LinkToInvoiceCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub invoice_id: Uuid,
    pub amount_cents: Option<i64>,
    pub percentage: Option<f64>,
    pub notes: Option<String>,
}

/// How to identify the allocation to unlink.
#[derive(Clone, Copy, Debug)]
pub enum AllocationRef {
    ById(Uuid),
    ByPair {
        transaction_id: Uuid,
        invoice_id: Uuid,
    },
}

#[derive(Clone, Debug)]
pub struct UnlinkFromInvoiceCmd {
    pub user_id: String,
    pub selector: AllocationRef,
}

/// Link a bank transaction to one cost bucket of a blueprint usage.
#[derive(Clone, Debug)]
pub struct LinkToUsageCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub blueprint_usage_id: Uuid,
    pub expense_type: ExpenseType,
    pub amount_cents: Option<i64>,
}

/// How to identify the expense allocation to unlink.
#[derive(Clone, Copy, Debug)]
pub enum ExpenseAllocationRef {
    ById(Uuid),
    ByPair {
        transaction_id: Uuid,
        blueprint_usage_id: Uuid,
    },
}

#[derive(Clone, Debug)]
pub struct UnlinkFromUsageCmd {
    pub user_id: String,
    pub selector: ExpenseAllocationRef,
}

/// Apply a manual quantity change to an inventory item.
#[derive(Clone, Debug)]
pub struct AdjustInventoryCmd {
    pub user_id: String,
    pub inventory_item_id: Uuid,
    pub movement_type: MovementType,
    /// Signed delta; must be non-zero.
    pub quantity_change: i64,
    pub unit_cost_cents: Option<i64>,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
}
