use std::collections::HashSet;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, CategoryMap, CreateBudgetCmd, EditBudgetCmd, EngineError, ResultEngine, budgets,
    categories, util::parse_month,
};

use super::{Engine, with_tx};

/// Updated per-category state of a budget after a mutation, ready for
/// broadcast.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetChanged {
    pub budget_id: Uuid,
    pub categories: CategoryMap,
    pub amount_minor: i64,
}

impl Engine {
    /// Creates a budget for `(user, month)`.
    ///
    /// Fails with [`EngineError::DuplicateMonth`] when the month is already
    /// budgeted and with [`EngineError::KeyNotFound`] when a category key
    /// is not present in the user's registry. `spent` values come
    /// pre-initialized from the caller but must respect the allocation.
    pub async fn create_budget(&self, cmd: CreateBudgetCmd) -> ResultEngine<Budget> {
        parse_month(&cmd.month)?;
        validate_allocations(cmd.amount_minor, cmd.income_minor, &cmd.categories)?;

        let budget = Budget::new(
            &cmd.user_id,
            cmd.month,
            cmd.amount_minor,
            cmd.income_minor,
            cmd.categories,
        );
        with_tx!(self, |db_tx| {
            let existing = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(budget.user_id.clone()))
                .filter(budgets::Column::Month.eq(budget.month.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::DuplicateMonth(budget.month.clone()));
            }

            self.require_registered_categories(&db_tx, &budget.user_id, &budget.categories)
                .await?;

            budgets::ActiveModel::try_from(&budget)?.insert(&db_tx).await?;
            Ok(budget)
        })
    }

    /// Replaces amount, income and the category map on an existing budget.
    ///
    /// The new map is applied as-is; recorded spend is not re-validated
    /// against the new allocations (see DESIGN.md).
    pub async fn edit_budget(&self, cmd: EditBudgetCmd) -> ResultEngine<BudgetChanged> {
        let lock = self.budget_locks.entry(cmd.budget_id).await;
        let _guard = lock.lock().await;

        with_tx!(self, |db_tx| {
            let model = self
                .require_budget(&db_tx, cmd.budget_id, &cmd.user_id)
                .await?;
            let active = budgets::ActiveModel {
                id: ActiveValue::Set(model.id),
                amount_minor: ActiveValue::Set(cmd.amount_minor),
                income_minor: ActiveValue::Set(cmd.income_minor),
                categories: ActiveValue::Set(budgets::encode_categories(&cmd.categories)?),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            Ok(BudgetChanged {
                budget_id: cmd.budget_id,
                categories: cmd.categories,
                amount_minor: cmd.amount_minor,
            })
        })
    }

    /// Deletes a budget that has no recorded spend.
    pub async fn delete_budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<()> {
        let lock = self.budget_locks.entry(budget_id).await;
        let _guard = lock.lock().await;

        with_tx!(self, |db_tx| {
            let model = self.require_budget(&db_tx, budget_id, user_id).await?;
            let budget = Budget::try_from(model)?;
            if budget.total_spent_minor() > 0 {
                return Err(EngineError::HasExpenses(budget_id.to_string()));
            }

            budgets::Entity::delete_by_id(budget_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Budget snapshot by id.
    pub async fn budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget(&db_tx, budget_id, user_id).await?;
            Budget::try_from(model)
        })
    }

    /// All budgets of a user, most recent month first.
    pub async fn list_budgets(&self, user_id: &str) -> ResultEngine<Vec<Budget>> {
        with_tx!(self, |db_tx| {
            let models = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(budgets::Column::Month)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Budget::try_from).collect()
        })
    }

    pub(super) async fn require_budget(
        &self,
        db_tx: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<budgets::Model> {
        budgets::Entity::find_by_id(budget_id.to_string())
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::BudgetNotFound(budget_id.to_string()))
    }

    async fn require_registered_categories(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        categories: &CategoryMap,
    ) -> ResultEngine<()> {
        if categories.is_empty() {
            return Ok(());
        }

        let registered: HashSet<String> = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|model| model.name)
            .collect();

        for name in categories.keys() {
            if !registered.contains(name) {
                return Err(EngineError::KeyNotFound(name.clone()));
            }
        }
        Ok(())
    }
}

fn validate_allocations(
    amount_minor: i64,
    income_minor: i64,
    categories: &CategoryMap,
) -> ResultEngine<()> {
    if amount_minor < 0 || income_minor < 0 {
        return Err(EngineError::InvalidAmount(
            "budget amount and income must be >= 0".to_string(),
        ));
    }
    for (name, allocation) in categories {
        if allocation.budget_minor < 0 || allocation.spent_minor < 0 {
            return Err(EngineError::InvalidAmount(format!(
                "allocation for '{name}' must be >= 0"
            )));
        }
        if allocation.spent_minor > allocation.budget_minor {
            return Err(EngineError::OverBudget(name.clone()));
        }
    }
    Ok(())
}
