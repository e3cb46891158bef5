use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod allocation {
    use super::*;

    /// Request body for linking a bank transaction to an invoice.
    ///
    /// All monetary fields are signed integer cents. `invoice_id` also accepts
    /// the legacy `job_id` spelling.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkTransactionRequest {
        pub transaction_id: Uuid,
        #[serde(alias = "job_id")]
        pub invoice_id: Uuid,
        /// Fixed split in cents. Mutually exclusive with
        /// `allocation_percentage`; when both are absent the transaction's
        /// full absolute amount is allocated.
        pub allocation_amount: Option<i64>,
        /// Percentage split in (0, 100].
        pub allocation_percentage: Option<f64>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationView {
        pub id: Uuid,
        pub transaction_id: Uuid,
        pub invoice_id: Uuid,
        pub allocation_amount: i64,
        pub allocation_percentage: Option<f64>,
        pub notes: Option<String>,
    }

    /// Derived invoice totals after a link/unlink.
    ///
    /// Both fields are `null` when the invoice has no cost data at all
    /// (distinct from a known zero cost).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvoiceTotalsView {
        pub total_actual_cost: Option<i64>,
        pub actual_profit: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkTransactionResponse {
        pub allocation: AllocationView,
        pub invoice_totals_updated: InvoiceTotalsView,
    }

    /// Request body for unlinking: either the allocation id, or the
    /// (transaction, invoice) pair.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnlinkTransactionRequest {
        pub allocation_id: Option<Uuid>,
        pub transaction_id: Option<Uuid>,
        #[serde(alias = "job_id")]
        pub invoice_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnlinkTransactionResponse {
        pub invoice_totals_updated: InvoiceTotalsView,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExpenseType {
        Materials,
        Labor,
        Overhead,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkExpenseRequest {
        pub transaction_id: Uuid,
        pub blueprint_usage_id: Uuid,
        pub expense_type: ExpenseType,
        /// Fixed split in cents; defaults to the transaction's full absolute
        /// amount.
        pub allocation_amount: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseAllocationView {
        pub id: Uuid,
        pub blueprint_usage_id: Uuid,
        pub transaction_id: Uuid,
        pub allocation_amount: i64,
        pub expense_type: ExpenseType,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkExpenseResponse {
        pub allocation: ExpenseAllocationView,
        pub usage: super::usage::UsageView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnlinkExpenseRequest {
        pub expense_allocation_id: Option<Uuid>,
        pub transaction_id: Option<Uuid>,
        pub blueprint_usage_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnlinkExpenseResponse {
        pub usage: super::usage::UsageView,
    }
}

pub mod usage {
    use super::*;

    /// One blueprint usage to create. Costs are integer cents.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UsageSpec {
        pub blueprint_id: Option<Uuid>,
        pub actual_materials_cost: Option<i64>,
        pub actual_labor_cost: Option<i64>,
        pub actual_overhead_cost: Option<i64>,
        pub actual_sale_price: Option<i64>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub completed_date: Option<DateTime<FixedOffset>>,
        pub notes: Option<String>,
    }

    /// Single-usage creation request: the usage fields inline.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreateUsageRequest {
        #[serde(alias = "job_id")]
        pub invoice_id: Option<Uuid>,
        /// Defaults to true.
        pub deduct_inventory: Option<bool>,
        #[serde(flatten)]
        pub usage: UsageSpec,
    }

    /// Batch creation request; capped server-side.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreateUsageBatchRequest {
        #[serde(alias = "job_id")]
        pub invoice_id: Option<Uuid>,
        /// Defaults to true.
        pub deduct_inventory: Option<bool>,
        pub blueprint_usages: Vec<UsageSpec>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsageView {
        pub id: Uuid,
        pub blueprint_id: Uuid,
        pub invoice_id: Option<Uuid>,
        pub actual_materials_cost: i64,
        pub actual_labor_cost: i64,
        pub actual_overhead_cost: i64,
        pub actual_sale_price: i64,
        pub completed_date: Option<DateTime<FixedOffset>>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryDeductionView {
        pub inventory_item_id: Uuid,
        pub item_name: String,
        pub blueprint_usage_id: Uuid,
        pub quantity_deducted: i64,
        pub new_quantity: i64,
        pub is_low_stock: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LowStockAlertView {
        pub inventory_item_id: Uuid,
        pub item_name: String,
        pub current_quantity: i64,
        pub minimum_quantity: i64,
    }

    /// Batch financials: summed actual costs vs. summed sale prices.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsageBatchSummaryView {
        pub total_actual_cost: i64,
        pub total_sale_price: i64,
        pub projected_profit: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreateUsageResponse {
        pub usages: Vec<UsageView>,
        pub inventory_deductions: Vec<InventoryDeductionView>,
        pub low_stock_alerts: Vec<LowStockAlertView>,
        pub summary: UsageBatchSummaryView,
        /// Non-fatal failures from best-effort inventory deduction; the
        /// usages above were created regardless.
        pub warnings: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurgeUsagesRequest {
        /// Without `confirm: true` the purge is a dry run: nothing is
        /// deleted and the response reports what would be.
        pub confirm: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurgeUsagesResponse {
        pub executed: bool,
        pub usage_count: u64,
        pub expense_allocation_count: u64,
        pub total_actual_cost: i64,
        pub total_sale_price: i64,
    }
}

pub mod inventory {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MovementType {
        Purchase,
        Usage,
        Adjustment,
        Waste,
        Return,
        BlueprintUsage,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdjustInventoryRequest {
        pub inventory_item_id: Uuid,
        pub transaction_type: MovementType,
        /// Signed quantity delta; must be non-zero.
        pub quantity_change: i64,
        /// Integer cents. A `purchase` carrying a unit cost also refreshes
        /// the item's stored unit cost.
        pub unit_cost: Option<i64>,
        pub reference_id: Option<Uuid>,
        pub reference_type: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementView {
        pub id: Uuid,
        pub inventory_item_id: Uuid,
        pub transaction_type: MovementType,
        pub quantity_change: i64,
        pub unit_cost: Option<i64>,
        pub reference_id: Option<Uuid>,
        pub reference_type: Option<String>,
        pub notes: Option<String>,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InventoryStatusView {
        pub quantity_before: i64,
        pub quantity_after: i64,
        pub is_low_stock: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdjustInventoryResponse {
        pub inventory_transaction: MovementView,
        pub inventory_status: InventoryStatusView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementListRequest {
        pub inventory_item_id: Uuid,
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
        pub transaction_type: Option<MovementType>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementListResponse {
        pub movements: Vec<MovementView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecomputeQuantitiesRequest {
        /// Restrict the rebuild to one item; all of the caller's items
        /// otherwise.
        pub inventory_item_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecomputedItemView {
        pub inventory_item_id: Uuid,
        pub quantity_before: i64,
        pub quantity_after: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecomputeQuantitiesResponse {
        pub items: Vec<RecomputedItemView>,
    }
}

pub mod profit {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfitRequest {
        #[serde(alias = "job_id")]
        pub invoice_id: Uuid,
    }

    /// Which input the effective cost was taken from.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CostSource {
        Override,
        Transactions,
        Blueprint,
        None,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfitView {
        pub invoice_id: Uuid,
        pub revenue: i64,
        pub effective_cost: i64,
        pub profit: i64,
        /// Percent; 0 when revenue is 0.
        pub margin: f64,
        pub cost_source: CostSource,
        pub transaction_cost: i64,
        pub blueprint_cost: i64,
        pub estimated_profit: Option<i64>,
        pub variance: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PortfolioSummaryView {
        pub invoice_count: u64,
        pub total_revenue: i64,
        pub total_cost: i64,
        pub total_profit: i64,
        pub average_margin: f64,
        pub override_count: u64,
        pub transaction_costed_count: u64,
        pub blueprint_costed_count: u64,
        pub uncosted_count: u64,
    }
}

pub mod purge {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurgeInvoicesRequest {
        /// Without `confirm: true` the purge is a dry run: nothing is
        /// deleted and the response reports what would be.
        pub confirm: Option<bool>,
    }

    /// Pre-deletion aggregates, reported as the audit trail since the rows
    /// themselves are gone after an executed purge.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurgeInvoicesResponse {
        pub executed: bool,
        pub invoice_count: u64,
        pub allocation_count: u64,
        pub usage_count: u64,
        pub line_item_count: u64,
        pub accounting_link_count: u64,
        pub total_revenue: i64,
        pub total_cost: i64,
        pub total_profit: i64,
    }
}

pub mod error {
    use super::*;

    /// One row of an insufficient-inventory report.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShortageView {
        pub inventory_item_id: Uuid,
        pub item_name: String,
        pub current_quantity: i64,
        pub required_quantity: i64,
        pub shortage: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OverAllocationView {
        pub transaction_id: Uuid,
        /// Absolute transaction amount in cents.
        pub transaction_amount: i64,
        /// Cents already allocated elsewhere.
        pub allocated_amount: i64,
        /// Cents the rejected request asked for.
        pub attempted_amount: i64,
    }

    /// JSON error body. `shortages` / `over_allocation` carry the structured
    /// detail for the matching error kinds so callers can self-correct
    /// without extra lookups.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub shortages: Option<Vec<ShortageView>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub over_allocation: Option<OverAllocationView>,
    }
}
