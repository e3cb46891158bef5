pub use commands::{
    AdjustInventoryCmd, AllocationRef, CreateUsagesCmd, ExpenseAllocationRef, LinkToInvoiceCmd,
    LinkToUsageCmd, UnlinkFromInvoiceCmd, UnlinkFromUsageCmd, UsageSpec,
};
pub use error::{EngineError, Shortage};
pub use expense_allocations::{ExpenseAllocation, ExpenseType};
pub use inventory_items::InventoryItem;
pub use inventory_movements::{InventoryMovement, MovementType};
pub use ops::{
    AdjustmentOutcome, BatchSummary, Engine, EngineBuilder, InventoryDeduction, InventoryStatus,
    InvoiceLinkOutcome, InvoiceProfit, InvoicePurgeReport, InvoiceTotals, LowStockAlert,
    MovementListFilter, PortfolioSummary, RecomputedItem, UsageBatchOutcome, UsageLinkOutcome,
    UsagePurgeReport,
};
pub use profit::{CostSource, ProfitBreakdown, ReconcileInputs, reconcile};

pub use allocations::Allocation;
pub use blueprint_items::BlueprintItem;
pub use blueprint_usages::BlueprintUsage;
pub use blueprints::Blueprint;
pub use invoices::Invoice;
pub use transactions::BankTransaction;

// Entity modules stay public: bank-sync and CRUD collaborators (and tests)
// write these tables directly, the engine owns the cross-entity invariants.
pub mod accounting_links;
pub mod allocations;
pub mod blueprint_items;
pub mod blueprint_usages;
pub mod blueprints;
pub mod expense_allocations;
pub mod inventory_items;
pub mod inventory_movements;
pub mod invoices;
pub mod line_items;
pub mod transactions;

mod commands;
mod error;
mod ops;
mod profit;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
