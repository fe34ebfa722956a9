//! Command structs for engine write operations.
//!
//! These types group parameters for the socket-driven mutations, keeping
//! call sites readable and avoiding long argument lists.

use uuid::Uuid;

use crate::CategoryMap;

/// Create a budget for one `(user, month)`.
#[derive(Clone, Debug)]
pub struct CreateBudgetCmd {
    pub user_id: String,
    pub month: String,
    pub amount_minor: i64,
    pub income_minor: i64,
    /// Allocations with `spent` pre-initialized by the caller, usually zero.
    pub categories: CategoryMap,
}

impl CreateBudgetCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        month: impl Into<String>,
        amount_minor: i64,
        income_minor: i64,
        categories: CategoryMap,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            month: month.into(),
            amount_minor,
            income_minor,
            categories,
        }
    }
}

/// Replace amount, income and category map on an existing budget.
#[derive(Clone, Debug)]
pub struct EditBudgetCmd {
    pub user_id: String,
    pub budget_id: Uuid,
    pub amount_minor: i64,
    pub income_minor: i64,
    pub categories: CategoryMap,
}

impl EditBudgetCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        budget_id: Uuid,
        amount_minor: i64,
        income_minor: i64,
        categories: CategoryMap,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            budget_id,
            amount_minor,
            income_minor,
            categories,
        }
    }
}

/// Record an expense against one budget category.
#[derive(Clone, Debug)]
pub struct RecordExpenseCmd {
    pub user_id: String,
    pub budget_id: Uuid,
    pub category: String,
    pub amount_minor: i64,
}

impl RecordExpenseCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        budget_id: Uuid,
        category: impl Into<String>,
        amount_minor: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            budget_id,
            category: category.into(),
            amount_minor,
        }
    }
}

/// Delete an expense, reversing its effect on the parent budget.
#[derive(Clone, Debug)]
pub struct DeleteExpenseCmd {
    pub user_id: String,
    pub budget_id: Uuid,
    pub expense_id: Uuid,
    pub category: String,
    pub amount_minor: i64,
}

impl DeleteExpenseCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        budget_id: Uuid,
        expense_id: Uuid,
        category: impl Into<String>,
        amount_minor: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            budget_id,
            expense_id,
            category: category.into(),
            amount_minor,
        }
    }
}

/// Create a savings scheme spanning whole months.
#[derive(Clone, Debug)]
pub struct CreateSchemeCmd {
    pub user_id: String,
    /// `YYYY-MM` month the scheme starts in.
    pub start_month: String,
    /// `YYYY-MM` month the scheme ends in.
    pub end_month: String,
    pub min_amount_minor: i64,
}

impl CreateSchemeCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        start_month: impl Into<String>,
        end_month: impl Into<String>,
        min_amount_minor: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            start_month: start_month.into(),
            end_month: end_month.into(),
            min_amount_minor,
        }
    }
}

/// Replace a scheme's date range and target amount.
#[derive(Clone, Debug)]
pub struct EditSchemeCmd {
    pub user_id: String,
    pub scheme_id: Uuid,
    pub start_month: String,
    pub end_month: String,
    pub min_amount_minor: i64,
}

impl EditSchemeCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        scheme_id: Uuid,
        start_month: impl Into<String>,
        end_month: impl Into<String>,
        min_amount_minor: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            scheme_id,
            start_month: start_month.into(),
            end_month: end_month.into(),
            min_amount_minor,
        }
    }
}
