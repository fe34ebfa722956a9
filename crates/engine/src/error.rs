//! The module contains the errors the engine can throw.
//!
//! Domain failures carry the exact message shown to the user; [`Database`]
//! wraps storage failures and must never reach a client verbatim.
//!
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("You already have an existing budget for selected month")]
    DuplicateMonth(String),
    #[error("The budget you selected does not exist or might have been deleted")]
    BudgetNotFound(String),
    #[error("You cannot spend more than your budget. Please increase your budget")]
    OverBudget(String),
    #[error("You can't delete a budget you've already spent from")]
    HasExpenses(String),
    #[error("{0} already exists in your category list")]
    DuplicateCategory(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid categories: {0}")]
    InvalidCategories(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::DuplicateMonth(a), Self::DuplicateMonth(b)) => a == b,
            (Self::BudgetNotFound(a), Self::BudgetNotFound(b)) => a == b,
            (Self::OverBudget(a), Self::OverBudget(b)) => a == b,
            (Self::HasExpenses(a), Self::HasExpenses(b)) => a == b,
            (Self::DuplicateCategory(a), Self::DuplicateCategory(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidMonth(a), Self::InvalidMonth(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidCategories(a), Self::InvalidCategories(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
