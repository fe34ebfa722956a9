//! Event dispatch core.
//!
//! Receives one typed socket command, invokes the matching engine
//! operation and returns the reply frames tagged with their fan-out
//! audience. Routing happens in [`crate::sync`]; keeping this a pure
//! mapping over `(engine, user, event)` makes the fan-out table testable
//! without a live socket.
//!
//! Fan-out per event:
//!
//! | event | success | failure |
//! |---|---|---|
//! | create-budget | all sessions | caller |
//! | edit-budget | all sessions | caller |
//! | delete-budget | all sessions | caller |
//! | record-expense | update-budget + record-expense, all sessions | caller |
//! | delete-expense | update-budget all sessions, delete-expense others | caller |
//! | add-category | all sessions | caller |
//! | delete-category | all sessions | caller |
//! | create-scheme / edit-scheme / delete-scheme | all sessions | caller |

use api_types::event::{self as ev, ClientEvent, ServerFrame};
use engine::{
    CreateBudgetCmd, CreateSchemeCmd, DeleteExpenseCmd, EditBudgetCmd, EditSchemeCmd, Engine,
    EngineError, RecordExpenseCmd,
};
use serde::Serialize;

use crate::{budgets, schemes};

const CREATE_BUDGET: &str = "create-budget";
const EDIT_BUDGET: &str = "edit-budget";
const DELETE_BUDGET: &str = "delete-budget";
const UPDATE_BUDGET: &str = "update-budget";
const RECORD_EXPENSE: &str = "record-expense";
const DELETE_EXPENSE: &str = "delete-expense";
const ADD_CATEGORY: &str = "add-category";
const DELETE_CATEGORY: &str = "delete-category";
const CREATE_SCHEME: &str = "create-scheme";
const EDIT_SCHEME: &str = "edit-scheme";
const DELETE_SCHEME: &str = "delete-scheme";

/// Which of a user's live sessions receive a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Audience {
    /// Only the session the command came from.
    Caller,
    /// Every session of the user.
    User,
    /// Every session except the caller's.
    Others,
}

/// A serialized reply frame and its routing decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Routed {
    pub(crate) audience: Audience,
    pub(crate) frame: String,
}

pub(crate) async fn handle_event(
    engine: &Engine,
    user_id: &str,
    event: ClientEvent,
) -> Vec<Routed> {
    match event {
        ClientEvent::CreateBudget(data) => create_budget(engine, user_id, data).await,
        ClientEvent::EditBudget(data) => edit_budget(engine, user_id, data).await,
        ClientEvent::DeleteBudget(data) => delete_budget(engine, user_id, data).await,
        ClientEvent::RecordExpense(data) => record_expense(engine, user_id, data).await,
        ClientEvent::DeleteExpense(data) => delete_expense(engine, user_id, data).await,
        ClientEvent::AddCategory(data) => add_category(engine, user_id, data).await,
        ClientEvent::DeleteCategory(data) => delete_category(engine, user_id, data).await,
        ClientEvent::CreateScheme(data) => create_scheme(engine, user_id, data).await,
        ClientEvent::EditScheme(data) => edit_scheme(engine, user_id, data).await,
        ClientEvent::DeleteScheme(data) => delete_scheme(engine, user_id, data).await,
    }
}

fn encode<T: Serialize>(event: &'static str, data: &T) -> String {
    match serde_json::to_string(&ServerFrame { event, data }) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::error!("failed to encode {event} frame: {err}");
            format!(
                "{{\"event\":\"{event}\",\"data\":{{\"success\":false,\"message\":\"internal server error\"}}}}"
            )
        }
    }
}

fn reply<T: Serialize>(audience: Audience, event: &'static str, data: &T) -> Routed {
    Routed {
        audience,
        frame: encode(event, data),
    }
}

/// Domain failures go back to the caller with their message; storage
/// failures are logged and replaced by a generic one.
fn failure(event: &'static str, err: EngineError) -> Routed {
    let message = match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error while handling {event}: {db_err}");
            "Something went wrong. Please try again".to_string()
        }
        other => other.to_string(),
    };
    reply(
        Audience::Caller,
        event,
        &ev::ErrorReply {
            success: false,
            message,
        },
    )
}

async fn create_budget(engine: &Engine, user_id: &str, data: ev::CreateBudget) -> Vec<Routed> {
    let cmd = CreateBudgetCmd::new(
        user_id,
        data.month,
        data.amount,
        data.income,
        budgets::categories_from_api(data.categories),
    );
    match engine.create_budget(cmd).await {
        Ok(budget) => {
            let categories = budgets::categories_view(&budget.categories);
            vec![reply(
                Audience::User,
                CREATE_BUDGET,
                &ev::BudgetCreated {
                    success: true,
                    budget_id: budget.id,
                    user_id: budget.user_id,
                    month: budget.month,
                    amount: budget.amount_minor,
                    income: budget.income_minor,
                    categories,
                    date: budget.created_at,
                },
            )]
        }
        Err(err) => vec![failure(CREATE_BUDGET, err)],
    }
}

async fn edit_budget(engine: &Engine, user_id: &str, data: ev::EditBudget) -> Vec<Routed> {
    let ev::EditBudget {
        budget_id,
        amount,
        categories,
        income,
    } = data;
    let cmd = EditBudgetCmd::new(
        user_id,
        budget_id,
        amount,
        income,
        budgets::categories_from_api(categories),
    );
    match engine.edit_budget(cmd).await {
        Ok(changed) => vec![reply(
            Audience::User,
            EDIT_BUDGET,
            &ev::BudgetEdited {
                success: true,
                budget_id: changed.budget_id,
                amount: changed.amount_minor,
                categories: budgets::categories_view(&changed.categories),
                income,
            },
        )],
        Err(err) => vec![failure(EDIT_BUDGET, err)],
    }
}

async fn delete_budget(engine: &Engine, user_id: &str, data: ev::DeleteBudget) -> Vec<Routed> {
    match engine.delete_budget(user_id, data.budget_id).await {
        Ok(()) => vec![reply(
            Audience::User,
            DELETE_BUDGET,
            &ev::BudgetDeleted {
                success: true,
                budget_id: data.budget_id,
            },
        )],
        Err(err) => vec![failure(DELETE_BUDGET, err)],
    }
}

async fn record_expense(engine: &Engine, user_id: &str, data: ev::RecordExpense) -> Vec<Routed> {
    let cmd = RecordExpenseCmd::new(user_id, data.budget_id, data.category, data.amount);
    match engine.record_expense(cmd).await {
        Ok(done) => {
            let categories = budgets::categories_view(&done.categories);
            vec![
                reply(
                    Audience::User,
                    UPDATE_BUDGET,
                    &ev::BudgetUpdate {
                        budget_id: data.budget_id,
                        categories: categories.clone(),
                        amount: done.budget_amount_minor,
                    },
                ),
                reply(
                    Audience::User,
                    RECORD_EXPENSE,
                    &ev::ExpenseRecorded {
                        success: true,
                        expense_id: done.expense.id,
                        budget_id: data.budget_id,
                        user_id: done.expense.user_id,
                        month: done.expense.month,
                        day: done.expense.day,
                        category: done.expense.category,
                        categories,
                        amount: done.expense.amount_minor,
                        date: done.expense.created_at,
                    },
                ),
            ]
        }
        Err(err) => vec![failure(RECORD_EXPENSE, err)],
    }
}

async fn delete_expense(engine: &Engine, user_id: &str, data: ev::DeleteExpense) -> Vec<Routed> {
    let cmd = DeleteExpenseCmd::new(
        user_id,
        data.budget_id,
        data.expense_id,
        data.category.clone(),
        data.amount,
    );
    match engine.delete_expense(cmd).await {
        Ok(changed) => vec![
            reply(
                Audience::User,
                UPDATE_BUDGET,
                &ev::BudgetUpdate {
                    budget_id: changed.budget_id,
                    categories: budgets::categories_view(&changed.categories),
                    amount: changed.amount_minor,
                },
            ),
            // The caller already applied the deletion locally.
            reply(
                Audience::Others,
                DELETE_EXPENSE,
                &ev::ExpenseDeleted {
                    success: true,
                    expense_id: data.expense_id,
                    budget_id: data.budget_id,
                    category: data.category,
                    amount: data.amount,
                },
            ),
        ],
        Err(err) => vec![failure(DELETE_EXPENSE, err)],
    }
}

async fn add_category(engine: &Engine, user_id: &str, data: ev::AddCategory) -> Vec<Routed> {
    match engine.add_category(user_id, &data.category_name).await {
        Ok(name) => vec![reply(
            Audience::User,
            ADD_CATEGORY,
            &ev::CategoryAdded {
                success: true,
                category_name: name,
            },
        )],
        Err(err) => vec![failure(ADD_CATEGORY, err)],
    }
}

async fn delete_category(engine: &Engine, user_id: &str, data: ev::DeleteCategory) -> Vec<Routed> {
    match engine.remove_category(user_id, &data.category_name).await {
        Ok(()) => vec![reply(
            Audience::User,
            DELETE_CATEGORY,
            &ev::CategoryDeleted {
                success: true,
                category_name: data.category_name,
            },
        )],
        Err(err) => vec![failure(DELETE_CATEGORY, err)],
    }
}

async fn create_scheme(engine: &Engine, user_id: &str, data: ev::CreateScheme) -> Vec<Routed> {
    let cmd = CreateSchemeCmd::new(user_id, data.start_month, data.end_month, data.amount);
    match engine.create_scheme(cmd).await {
        Ok(overview) => vec![reply(
            Audience::User,
            CREATE_SCHEME,
            &ev::SchemeSaved {
                success: true,
                overview: schemes::overview_view(overview),
            },
        )],
        Err(err) => vec![failure(CREATE_SCHEME, err)],
    }
}

async fn edit_scheme(engine: &Engine, user_id: &str, data: ev::EditScheme) -> Vec<Routed> {
    let cmd = EditSchemeCmd::new(
        user_id,
        data.scheme_id,
        data.start_month,
        data.end_month,
        data.amount,
    );
    match engine.edit_scheme(cmd).await {
        Ok(overview) => vec![reply(
            Audience::User,
            EDIT_SCHEME,
            &ev::SchemeSaved {
                success: true,
                overview: schemes::overview_view(overview),
            },
        )],
        Err(err) => vec![failure(EDIT_SCHEME, err)],
    }
}

async fn delete_scheme(engine: &Engine, user_id: &str, data: ev::DeleteScheme) -> Vec<Routed> {
    match engine.delete_scheme(user_id, data.scheme_id).await {
        Ok(()) => vec![reply(
            Audience::User,
            DELETE_SCHEME,
            &ev::SchemeDeleted {
                success: true,
                scheme_id: data.scheme_id,
            },
        )],
        Err(err) => vec![failure(DELETE_SCHEME, err)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use serde_json::Value;

    async fn test_engine() -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Engine::builder().database(db).build().await.unwrap()
    }

    fn event(json: &str) -> ClientEvent {
        serde_json::from_str(json).unwrap()
    }

    fn parse(frame: &str) -> Value {
        serde_json::from_str(frame).unwrap()
    }

    async fn budget_id(engine: &Engine, user_id: &str) -> String {
        engine.add_category(user_id, "Food").await.unwrap();
        let payload = r#"{"event":"create-budget","data":{"month":"2024-01","budget":10000,"income":100000,"categories":{"Food":{"budget":10000,"spent":0}}}}"#;
        let frames = handle_event(engine, user_id, event(payload)).await;
        parse(&frames[0].frame)["data"]["budgetId"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn duplicate_budget_fails_only_to_the_caller() {
        let engine = test_engine().await;
        engine.add_category("alice", "Food").await.unwrap();
        let payload = r#"{"event":"create-budget","data":{"month":"2024-01","budget":10000,"income":100000,"categories":{"Food":{"budget":10000,"spent":0}}}}"#;

        let first = handle_event(&engine, "alice", event(payload)).await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].audience, Audience::User);
        let frame = parse(&first[0].frame);
        assert_eq!(frame["event"], "create-budget");
        assert_eq!(frame["data"]["success"], true);
        assert_eq!(frame["data"]["month"], "2024-01");

        let second = handle_event(&engine, "alice", event(payload)).await;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].audience, Audience::Caller);
        let frame = parse(&second[0].frame);
        assert_eq!(frame["data"]["success"], false);
        assert_eq!(
            frame["data"]["message"],
            "You already have an existing budget for selected month"
        );
    }

    #[tokio::test]
    async fn record_expense_broadcasts_update_then_confirmation() {
        let engine = test_engine().await;
        let budget_id = budget_id(&engine, "alice").await;

        let record = format!(
            r#"{{"event":"record-expense","data":{{"budgetId":"{budget_id}","amount":4000,"category":"Food"}}}}"#
        );
        let frames = handle_event(&engine, "alice", event(&record)).await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].audience, Audience::User);
        assert_eq!(frames[1].audience, Audience::User);

        let update = parse(&frames[0].frame);
        assert_eq!(update["event"], "update-budget");
        assert_eq!(update["data"]["categories"]["Food"]["spent"], 4000);
        assert_eq!(update["data"]["budget"], 10000);

        let confirmation = parse(&frames[1].frame);
        assert_eq!(confirmation["event"], "record-expense");
        assert_eq!(confirmation["data"]["success"], true);
        assert_eq!(confirmation["data"]["month"], "2024-01");
    }

    #[tokio::test]
    async fn over_budget_rejection_stays_with_the_caller() {
        let engine = test_engine().await;
        let budget_id = budget_id(&engine, "alice").await;

        let record = format!(
            r#"{{"event":"record-expense","data":{{"budgetId":"{budget_id}","amount":7000,"category":"Food"}}}}"#
        );
        handle_event(&engine, "alice", event(&record)).await;
        let frames = handle_event(&engine, "alice", event(&record)).await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].audience, Audience::Caller);
        let frame = parse(&frames[0].frame);
        assert_eq!(frame["event"], "record-expense");
        assert_eq!(
            frame["data"]["message"],
            "You cannot spend more than your budget. Please increase your budget"
        );
    }

    #[tokio::test]
    async fn delete_expense_updates_everyone_but_confirms_to_others() {
        let engine = test_engine().await;
        let budget_id = budget_id(&engine, "alice").await;

        let record = format!(
            r#"{{"event":"record-expense","data":{{"budgetId":"{budget_id}","amount":4000,"category":"Food"}}}}"#
        );
        let frames = handle_event(&engine, "alice", event(&record)).await;
        let expense_id = parse(&frames[1].frame)["data"]["expenseId"]
            .as_str()
            .unwrap()
            .to_string();

        let delete = format!(
            r#"{{"event":"delete-expense","data":{{"amount":4000,"category":"Food","budgetId":"{budget_id}","expenseId":"{expense_id}"}}}}"#
        );
        let frames = handle_event(&engine, "alice", event(&delete)).await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].audience, Audience::User);
        assert_eq!(frames[1].audience, Audience::Others);

        let update = parse(&frames[0].frame);
        assert_eq!(update["event"], "update-budget");
        assert_eq!(update["data"]["categories"]["Food"]["spent"], 0);

        let confirmation = parse(&frames[1].frame);
        assert_eq!(confirmation["event"], "delete-expense");
        assert_eq!(confirmation["data"]["expenseId"], expense_id.as_str());
    }

    #[tokio::test]
    async fn duplicate_category_names_the_offender() {
        let engine = test_engine().await;

        let frames = handle_event(
            &engine,
            "alice",
            event(r#"{"event":"add-category","data":{"categoryName":"Food"}}"#),
        )
        .await;
        assert_eq!(frames[0].audience, Audience::User);

        let frames = handle_event(
            &engine,
            "alice",
            event(r#"{"event":"add-category","data":{"categoryName":"food"}}"#),
        )
        .await;
        assert_eq!(frames[0].audience, Audience::Caller);
        let frame = parse(&frames[0].frame);
        assert_eq!(
            frame["data"]["message"],
            "food already exists in your category list"
        );
    }

    #[tokio::test]
    async fn scheme_replies_carry_recomputed_progress() {
        let engine = test_engine().await;

        let frames = handle_event(
            &engine,
            "alice",
            event(r#"{"event":"create-scheme","data":{"startMonth":"2024-01","endMonth":"2024-03","amount":30000}}"#),
        )
        .await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].audience, Audience::User);
        let frame = parse(&frames[0].frame);
        assert_eq!(frame["event"], "create-scheme");
        assert_eq!(frame["data"]["success"], true);
        assert_eq!(frame["data"]["schemeIsActive"], false);
        assert_eq!(frame["data"]["progress"], 0);

        let scheme_id = frame["data"]["schemeId"].as_str().unwrap().to_string();
        let frames = handle_event(
            &engine,
            "alice",
            event(&format!(
                r#"{{"event":"delete-scheme","data":{{"schemeId":"{scheme_id}"}}}}"#
            )),
        )
        .await;
        assert_eq!(frames[0].audience, Audience::User);
        assert_eq!(parse(&frames[0].frame)["event"], "delete-scheme");
    }
}
