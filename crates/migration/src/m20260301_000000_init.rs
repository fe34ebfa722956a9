//! Initial schema migration - creates all tables from scratch.
//!
//! It creates the complete schema for Moneta:
//!
//! - `users`: authentication
//! - `budgets`: monthly spending plans with a JSON category map
//! - `expenses`: recorded spending, tied to a budget by `(user_id, month)`
//! - `savings_schemes`: savings goals over a month range
//! - `categories`: per-user category registry
//!
//! User ids are opaque strings resolved by the auth layer; rows reference
//! them by value without a foreign key.

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
enum Budgets {
    Table,
    Id,
    UserId,
    Month,
    AmountMinor,
    IncomeMinor,
    Categories,
    CreatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    UserId,
    Month,
    Day,
    Category,
    AmountMinor,
    CreatedAt,
}

#[derive(Iden)]
enum SavingsSchemes {
    Table,
    Id,
    UserId,
    StartDate,
    EndDate,
    MinAmountMinor,
    CreatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    NameNorm,
    Position,
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
        // 2. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Budgets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Budgets::UserId).string().not_null())
                    .col(ColumnDef::new(Budgets::Month).string().not_null())
                    .col(
                        ColumnDef::new(Budgets::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Budgets::IncomeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Budgets::Categories).string().not_null())
                    .col(ColumnDef::new(Budgets::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // One budget per user and month; backstop for the engine-level
        // duplicate check under concurrent creations.
        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-user_id-month-unique")
                    .table(Budgets::Table)
                    .col(Budgets::UserId)
                    .col(Budgets::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::UserId).string().not_null())
                    .col(ColumnDef::new(Expenses::Month).string().not_null())
                    .col(ColumnDef::new(Expenses::Day).integer().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-month")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::Month)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Savings schemes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(SavingsSchemes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SavingsSchemes::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SavingsSchemes::UserId).string().not_null())
                    .col(ColumnDef::new(SavingsSchemes::StartDate).date().not_null())
                    .col(ColumnDef::new(SavingsSchemes::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(SavingsSchemes::MinAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SavingsSchemes::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-savings_schemes-user_id")
                    .table(SavingsSchemes::Table)
                    .col(SavingsSchemes::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::UserId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(ColumnDef::new(Categories::Position).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-user_id-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::UserId)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation.
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SavingsSchemes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
