//! Budgets API endpoint and view mapping.

use api_types::budget::{BudgetListResponse, BudgetView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

pub(crate) fn categories_view(categories: &engine::CategoryMap) -> api_types::budget::CategoryMap {
    categories
        .iter()
        .map(|(name, allocation)| {
            (
                name.clone(),
                api_types::budget::CategoryAllocation {
                    budget_minor: allocation.budget_minor,
                    spent_minor: allocation.spent_minor,
                },
            )
        })
        .collect()
}

pub(crate) fn categories_from_api(
    categories: api_types::budget::CategoryMap,
) -> engine::CategoryMap {
    categories
        .into_iter()
        .map(|(name, allocation)| {
            (
                name,
                engine::CategoryAllocation {
                    budget_minor: allocation.budget_minor,
                    spent_minor: allocation.spent_minor,
                },
            )
        })
        .collect()
}

fn view(budget: engine::Budget) -> BudgetView {
    let categories = categories_view(&budget.categories);
    BudgetView {
        budget_id: budget.id,
        user_id: budget.user_id,
        month: budget.month,
        amount: budget.amount_minor,
        income: budget.income_minor,
        categories,
        date: budget.created_at,
    }
}

pub(crate) async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetListResponse>, ServerError> {
    let budgets = state.engine.list_budgets(&user.username).await?;
    Ok(Json(BudgetListResponse {
        budgets: budgets.into_iter().map(view).collect(),
    }))
}
