//! The module contains the errors the engine can throw.
//!
//! Validation errors (`InvalidArgument`, `NotFound`, `OverAllocation`,
//! `InsufficientInventory`) are raised before any write, so a caller that
//! sees one can retry after correcting the request. `Conflict` signals a
//! lost race (e.g. a double unlink). `Database` wraps the storage layer.

use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// One under-stocked item in an insufficient-inventory report.
///
/// `required_quantity` is the aggregate demand across the whole rejected
/// batch, not a single usage's share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Shortage {
    pub inventory_item_id: Uuid,
    pub item_name: String,
    pub current_quantity: i64,
    pub required_quantity: i64,
    pub shortage: i64,
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("insufficient inventory: {} item(s) short of the requested quantities", .0.len())]
    InsufficientInventory(Vec<Shortage>),
    #[error(
        "transaction {transaction_id} would be over-allocated: {attempted_cents} cents requested, \
         {allocated_cents} of {transaction_cents} cents already allocated"
    )]
    OverAllocation {
        transaction_id: Uuid,
        /// Absolute transaction amount in cents.
        transaction_cents: i64,
        /// Cents already allocated elsewhere (excluding a replaced row).
        allocated_cents: i64,
        /// Cents the rejected request asked for.
        attempted_cents: i64,
    },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::InsufficientInventory(a), Self::InsufficientInventory(b)) => a == b,
            (
                Self::OverAllocation {
                    transaction_id: a_id,
                    transaction_cents: a_tx,
                    allocated_cents: a_alloc,
                    attempted_cents: a_try,
                },
                Self::OverAllocation {
                    transaction_id: b_id,
                    transaction_cents: b_tx,
                    allocated_cents: b_alloc,
                    attempted_cents: b_try,
                },
            ) => a_id == b_id && a_tx == b_tx && a_alloc == b_alloc && a_try == b_try,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
