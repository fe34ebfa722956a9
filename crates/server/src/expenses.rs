//! Expenses API endpoint.

use std::collections::BTreeMap;

use api_types::expense::{ExpenseListResponse, ExpenseView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

fn view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        expense_id: expense.id,
        user_id: expense.user_id,
        month: expense.month,
        day: expense.day,
        category: expense.category,
        amount: expense.amount_minor,
        date: expense.created_at,
    }
}

/// Expenses grouped by budget month; entries inside a month keep the
/// engine's newest-first order.
pub(crate) async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state.engine.list_expenses(&user.username).await?;

    let mut months: BTreeMap<String, Vec<ExpenseView>> = BTreeMap::new();
    for expense in expenses {
        months.entry(expense.month.clone()).or_default().push(view(expense));
    }

    Ok(Json(ExpenseListResponse { months }))
}
