use sea_orm::DatabaseConnection;

mod access;
mod allocations;
mod consumption;
mod expense_allocations;
mod inventory;
mod movements;
mod profit;
mod purge;

pub use allocations::{InvoiceLinkOutcome, InvoiceTotals};
pub use consumption::{BatchSummary, InventoryDeduction, LowStockAlert, UsageBatchOutcome};
pub use expense_allocations::UsageLinkOutcome;
pub use inventory::{AdjustmentOutcome, InventoryStatus, RecomputedItem};
pub use movements::MovementListFilter;
pub use profit::{InvoiceProfit, PortfolioSummary};
pub use purge::{InvoicePurgeReport, UsagePurgeReport};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Tolerance on the allocation-sum invariant, to absorb rounding from
/// percentage splits.
pub(crate) const OVER_ALLOCATION_TOLERANCE_CENTS: i64 = 1;

/// Upper bound on blueprint-usage batches, to bound worst-case latency.
pub(crate) const MAX_BATCH_USAGES: usize = 100;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}
