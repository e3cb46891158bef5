//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for the cost ledger:
//!
//! - `users`: authentication
//! - `transactions`: bank transactions synced from the aggregator
//! - `invoices`: billable jobs with derived cost/profit totals
//! - `invoice_line_items`: display rows owned by the CRUD surface
//! - `accounting_links`: external accounting-software mapping rows
//! - `allocations`: transaction → invoice splits
//! - `blueprints`: reusable cost templates
//! - `blueprint_items`: per-blueprint inventory requirements
//! - `blueprint_usages`: blueprint instantiations, optionally per invoice
//! - `expense_allocations`: transaction → usage cost-bucket splits
//! - `inventory_items`: stock levels (cached projection)
//! - `inventory_movements`: append-only quantity audit log

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    Name,
    AmountCents,
    PostedAt,
    Category,
    Pending,
}

#[derive(Iden)]
enum Invoices {
    Table,
    Id,
    UserId,
    CustomerName,
    RevenueCents,
    TotalActualCostCents,
    ActualProfitCents,
    CostOverrideByUser,
}

#[derive(Iden)]
enum InvoiceLineItems {
    Table,
    Id,
    InvoiceId,
    Description,
    AmountCents,
}

#[derive(Iden)]
enum AccountingLinks {
    Table,
    Id,
    InvoiceId,
    RemoteId,
}

#[derive(Iden)]
enum Allocations {
    Table,
    Id,
    TransactionId,
    InvoiceId,
    AmountCents,
    Percentage,
    Notes,
}

#[derive(Iden)]
enum Blueprints {
    Table,
    Id,
    UserId,
    Name,
    MaterialsCostCents,
    LaborCostCents,
    OverheadCostCents,
    TargetSalePriceCents,
}

#[derive(Iden)]
enum BlueprintItems {
    Table,
    Id,
    BlueprintId,
    InventoryItemId,
    QuantityRequired,
}

#[derive(Iden)]
enum BlueprintUsages {
    Table,
    Id,
    BlueprintId,
    InvoiceId,
    ActualMaterialsCostCents,
    ActualLaborCostCents,
    ActualOverheadCostCents,
    ActualSalePriceCents,
    CompletedAt,
    Notes,
}

#[derive(Iden)]
enum ExpenseAllocations {
    Table,
    Id,
    BlueprintUsageId,
    TransactionId,
    AmountCents,
    ExpenseType,
}

#[derive(Iden)]
enum InventoryItems {
    Table,
    Id,
    UserId,
    Name,
    CurrentQuantity,
    MinimumQuantity,
    UnitCostCents,
}

#[derive(Iden)]
enum InventoryMovements {
    Table,
    Id,
    InventoryItemId,
    MovementType,
    QuantityChange,
    UnitCostCents,
    ReferenceId,
    ReferenceType,
    Notes,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).string().not_null())
                    .col(ColumnDef::new(Transactions::Name).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::PostedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Category).string())
                    .col(
                        ColumnDef::new(Transactions::Pending)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-posted_at")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::PostedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Invoices
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Invoices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invoices::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Invoices::UserId).string().not_null())
                    .col(ColumnDef::new(Invoices::CustomerName).string().not_null())
                    .col(
                        ColumnDef::new(Invoices::RevenueCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Invoices::TotalActualCostCents).big_integer())
                    .col(ColumnDef::new(Invoices::ActualProfitCents).big_integer())
                    .col(
                        ColumnDef::new(Invoices::CostOverrideByUser)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoices-user_id")
                            .from(Invoices::Table, Invoices::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoices-user_id")
                    .table(Invoices::Table)
                    .col(Invoices::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Invoice line items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(InvoiceLineItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InvoiceLineItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InvoiceLineItems::InvoiceId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InvoiceLineItems::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InvoiceLineItems::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-invoice_line_items-invoice_id")
                            .from(InvoiceLineItems::Table, InvoiceLineItems::InvoiceId)
                            .to(Invoices::Table, Invoices::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-invoice_line_items-invoice_id")
                    .table(InvoiceLineItems::Table)
                    .col(InvoiceLineItems::InvoiceId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Accounting links
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AccountingLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountingLinks::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountingLinks::InvoiceId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountingLinks::RemoteId)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounting_links-invoice_id")
                            .from(AccountingLinks::Table, AccountingLinks::InvoiceId)
                            .to(Invoices::Table, Invoices::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Allocations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Allocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Allocations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Allocations::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Allocations::InvoiceId).string().not_null())
                    .col(
                        ColumnDef::new(Allocations::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Allocations::Percentage).double())
                    .col(ColumnDef::new(Allocations::Notes).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-allocations-transaction_id")
                            .from(Allocations::Table, Allocations::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-allocations-invoice_id")
                            .from(Allocations::Table, Allocations::InvoiceId)
                            .to(Invoices::Table, Invoices::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Re-linking the same pair must update, never duplicate.
        manager
            .create_index(
                Index::create()
                    .name("idx-allocations-transaction_id-invoice_id-unique")
                    .table(Allocations::Table)
                    .col(Allocations::TransactionId)
                    .col(Allocations::InvoiceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-allocations-invoice_id")
                    .table(Allocations::Table)
                    .col(Allocations::InvoiceId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Blueprints
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Blueprints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Blueprints::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Blueprints::UserId).string().not_null())
                    .col(ColumnDef::new(Blueprints::Name).string().not_null())
                    .col(
                        ColumnDef::new(Blueprints::MaterialsCostCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Blueprints::LaborCostCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Blueprints::OverheadCostCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Blueprints::TargetSalePriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blueprints-user_id")
                            .from(Blueprints::Table, Blueprints::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-blueprints-user_id")
                    .table(Blueprints::Table)
                    .col(Blueprints::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Blueprint items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BlueprintItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlueprintItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BlueprintItems::BlueprintId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BlueprintItems::InventoryItemId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BlueprintItems::QuantityRequired)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blueprint_items-blueprint_id")
                            .from(BlueprintItems::Table, BlueprintItems::BlueprintId)
                            .to(Blueprints::Table, Blueprints::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-blueprint_items-blueprint_id")
                    .table(BlueprintItems::Table)
                    .col(BlueprintItems::BlueprintId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Blueprint usages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BlueprintUsages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlueprintUsages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BlueprintUsages::BlueprintId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BlueprintUsages::InvoiceId).string())
                    .col(
                        ColumnDef::new(BlueprintUsages::ActualMaterialsCostCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BlueprintUsages::ActualLaborCostCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BlueprintUsages::ActualOverheadCostCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BlueprintUsages::ActualSalePriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(BlueprintUsages::CompletedAt).timestamp())
                    .col(ColumnDef::new(BlueprintUsages::Notes).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blueprint_usages-blueprint_id")
                            .from(BlueprintUsages::Table, BlueprintUsages::BlueprintId)
                            .to(Blueprints::Table, Blueprints::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blueprint_usages-invoice_id")
                            .from(BlueprintUsages::Table, BlueprintUsages::InvoiceId)
                            .to(Invoices::Table, Invoices::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-blueprint_usages-invoice_id")
                    .table(BlueprintUsages::Table)
                    .col(BlueprintUsages::InvoiceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-blueprint_usages-blueprint_id")
                    .table(BlueprintUsages::Table)
                    .col(BlueprintUsages::BlueprintId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 10. Expense allocations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseAllocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseAllocations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAllocations::BlueprintUsageId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAllocations::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAllocations::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseAllocations::ExpenseType)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_allocations-blueprint_usage_id")
                            .from(
                                ExpenseAllocations::Table,
                                ExpenseAllocations::BlueprintUsageId,
                            )
                            .to(BlueprintUsages::Table, BlueprintUsages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_allocations-transaction_id")
                            .from(ExpenseAllocations::Table, ExpenseAllocations::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Re-linking the same (usage, transaction) pair must update.
        manager
            .create_index(
                Index::create()
                    .name("idx-expense_allocations-usage_id-transaction_id-unique")
                    .table(ExpenseAllocations::Table)
                    .col(ExpenseAllocations::BlueprintUsageId)
                    .col(ExpenseAllocations::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 11. Inventory items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(InventoryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryItems::UserId).string().not_null())
                    .col(ColumnDef::new(InventoryItems::Name).string().not_null())
                    .col(
                        ColumnDef::new(InventoryItems::CurrentQuantity)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::MinimumQuantity)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::UnitCostCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_items-user_id")
                            .from(InventoryItems::Table, InventoryItems::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_items-user_id")
                    .table(InventoryItems::Table)
                    .col(InventoryItems::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 12. Inventory movements
        // ───────────────────────────────────────────────────────────────────
        // `reference_id` is deliberately not a foreign key: the audit log
        // outlives the usages it references.
        manager
            .create_table(
                Table::create()
                    .table(InventoryMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryMovements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::InventoryItemId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::MovementType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InventoryMovements::QuantityChange)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InventoryMovements::UnitCostCents).big_integer())
                    .col(ColumnDef::new(InventoryMovements::ReferenceId).string())
                    .col(ColumnDef::new(InventoryMovements::ReferenceType).string())
                    .col(ColumnDef::new(InventoryMovements::Notes).string())
                    .col(
                        ColumnDef::new(InventoryMovements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_movements-inventory_item_id")
                            .from(
                                InventoryMovements::Table,
                                InventoryMovements::InventoryItemId,
                            )
                            .to(InventoryItems::Table, InventoryItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_movements-item_id-created_at")
                    .table(InventoryMovements::Table)
                    .col(InventoryMovements::InventoryItemId)
                    .col(InventoryMovements::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(InventoryMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseAllocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlueprintUsages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlueprintItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Blueprints::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Allocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountingLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InvoiceLineItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Invoices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
