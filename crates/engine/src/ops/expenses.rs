use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Budget, CategoryMap, DeleteExpenseCmd, EngineError, Expense, RecordExpenseCmd, ResultEngine,
    budgets, expenses,
};

use super::{Engine, budgets::BudgetChanged, with_tx};

/// Outcome of a successful expense recording: the new row plus the state
/// needed for the budget-update broadcast.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseRecorded {
    pub expense: Expense,
    pub categories: CategoryMap,
    pub budget_amount_minor: i64,
}

impl Engine {
    /// Records an expense against a budget category.
    ///
    /// Holds the budget's write lock across the read-check-write cycle so
    /// two concurrent recordings cannot both pass the over-budget check on
    /// the same pre-update `spent` value. Fails with
    /// [`EngineError::OverBudget`] when the increment would exceed the
    /// category allocation.
    pub async fn record_expense(&self, cmd: RecordExpenseCmd) -> ResultEngine<ExpenseRecorded> {
        if cmd.amount_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "expense amount must be >= 0".to_string(),
            ));
        }

        let lock = self.budget_locks.entry(cmd.budget_id).await;
        let _guard = lock.lock().await;
        let recorded_at = Utc::now();

        with_tx!(self, |db_tx| {
            let model = self
                .require_budget(&db_tx, cmd.budget_id, &cmd.user_id)
                .await?;
            let mut budget = Budget::try_from(model)?;

            let allocation = budget
                .categories
                .get_mut(&cmd.category)
                .ok_or_else(|| EngineError::KeyNotFound(cmd.category.clone()))?;
            let spent = allocation.spent_minor + cmd.amount_minor;
            if spent > allocation.budget_minor {
                return Err(EngineError::OverBudget(cmd.category.clone()));
            }
            allocation.spent_minor = spent;

            let expense = Expense::new(
                &cmd.user_id,
                budget.month.clone(),
                cmd.category.clone(),
                cmd.amount_minor,
                recorded_at,
            );
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;

            let active = budgets::ActiveModel {
                id: ActiveValue::Set(budget.id.to_string()),
                categories: ActiveValue::Set(budgets::encode_categories(&budget.categories)?),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            Ok(ExpenseRecorded {
                expense,
                categories: budget.categories,
                budget_amount_minor: budget.amount_minor,
            })
        })
    }

    /// Deletes an expense and reverses its effect on the parent budget.
    ///
    /// The decrement trusts the caller-supplied amount and category; there
    /// is no floor check, so inconsistent input can drive `spent` negative
    /// (see DESIGN.md). Deleting an already-deleted expense row is a no-op.
    pub async fn delete_expense(&self, cmd: DeleteExpenseCmd) -> ResultEngine<BudgetChanged> {
        let lock = self.budget_locks.entry(cmd.budget_id).await;
        let _guard = lock.lock().await;

        with_tx!(self, |db_tx| {
            let model = self
                .require_budget(&db_tx, cmd.budget_id, &cmd.user_id)
                .await?;
            let mut budget = Budget::try_from(model)?;

            let allocation = budget
                .categories
                .get_mut(&cmd.category)
                .ok_or_else(|| EngineError::KeyNotFound(cmd.category.clone()))?;
            allocation.spent_minor -= cmd.amount_minor;

            expenses::Entity::delete_by_id(cmd.expense_id.to_string())
                .exec(&db_tx)
                .await?;

            let active = budgets::ActiveModel {
                id: ActiveValue::Set(budget.id.to_string()),
                categories: ActiveValue::Set(budgets::encode_categories(&budget.categories)?),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            Ok(BudgetChanged {
                budget_id: budget.id,
                categories: budget.categories,
                amount_minor: budget.amount_minor,
            })
        })
    }

    /// All expenses of a user, newest month and entry first.
    pub async fn list_expenses(&self, user_id: &str) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            let models = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(expenses::Column::Month)
                .order_by_desc(expenses::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Expense::try_from).collect()
        })
    }
}
