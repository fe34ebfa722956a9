use std::collections::BTreeMap;

use chrono::{Datelike, Utc};
use sea_orm::Database;

use engine::{
    Budget, CategoryAllocation, CategoryMap, CreateBudgetCmd, CreateSchemeCmd, DeleteExpenseCmd,
    EditBudgetCmd, Engine, EngineError, RecordExpenseCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn allocations(entries: &[(&str, i64, i64)]) -> CategoryMap {
    entries
        .iter()
        .map(|(name, budget_minor, spent_minor)| {
            (
                name.to_string(),
                CategoryAllocation {
                    budget_minor: *budget_minor,
                    spent_minor: *spent_minor,
                },
            )
        })
        .collect()
}

async fn budget_with_food(engine: &Engine, month: &str, food_budget_minor: i64) -> Budget {
    engine.add_category("alice", "Food").await.unwrap();
    engine
        .create_budget(CreateBudgetCmd::new(
            "alice",
            month,
            food_budget_minor,
            100_000,
            allocations(&[("Food", food_budget_minor, 0)]),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn create_budget_rejects_duplicate_month() {
    let engine = engine_with_db().await;
    engine.add_category("alice", "Food").await.unwrap();

    let cmd = CreateBudgetCmd::new("alice", "2024-01", 10_000, 100_000, allocations(&[("Food", 10_000, 0)]));
    engine.create_budget(cmd.clone()).await.unwrap();

    let err = engine.create_budget(cmd).await.unwrap_err();
    assert!(matches!(err, EngineError::DuplicateMonth(_)));

    // Same month for a different user is fine.
    engine.add_category("bob", "Food").await.unwrap();
    engine
        .create_budget(CreateBudgetCmd::new(
            "bob",
            "2024-01",
            10_000,
            100_000,
            allocations(&[("Food", 10_000, 0)]),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn create_budget_requires_registered_categories() {
    let engine = engine_with_db().await;

    let err = engine
        .create_budget(CreateBudgetCmd::new(
            "alice",
            "2024-01",
            10_000,
            100_000,
            allocations(&[("Food", 10_000, 0)]),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn create_budget_rejects_invalid_month_and_amounts() {
    let engine = engine_with_db().await;
    engine.add_category("alice", "Food").await.unwrap();

    let err = engine
        .create_budget(CreateBudgetCmd::new("alice", "January", 10_000, 0, BTreeMap::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidMonth(_)));

    let err = engine
        .create_budget(CreateBudgetCmd::new(
            "alice",
            "2024-01",
            10_000,
            0,
            allocations(&[("Food", 10_000, 20_000)]),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::OverBudget(_)));
}

#[tokio::test]
async fn expense_lifecycle_round_trips_spent() {
    let engine = engine_with_db().await;
    // Food allocation of 100 with income 1000, as a fresh January budget.
    let budget = budget_with_food(&engine, "2024-01", 10_000).await;

    let recorded = engine
        .record_expense(RecordExpenseCmd::new("alice", budget.id, "Food", 4_000))
        .await
        .unwrap();
    assert_eq!(recorded.categories["Food"].spent_minor, 4_000);
    assert_eq!(recorded.expense.month, "2024-01");
    assert_eq!(recorded.expense.day, Utc::now().day());

    // 40 + 70 > 100: rejected, state unchanged.
    let err = engine
        .record_expense(RecordExpenseCmd::new("alice", budget.id, "Food", 7_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::OverBudget(_)));
    let current = engine.budget("alice", budget.id).await.unwrap();
    assert_eq!(current.categories["Food"].spent_minor, 4_000);

    // A budget with recorded spend cannot be deleted.
    let err = engine.delete_budget("alice", budget.id).await.unwrap_err();
    assert!(matches!(err, EngineError::HasExpenses(_)));

    // Deleting the expense restores spent and unblocks budget deletion.
    let changed = engine
        .delete_expense(DeleteExpenseCmd::new(
            "alice",
            budget.id,
            recorded.expense.id,
            "Food",
            4_000,
        ))
        .await
        .unwrap();
    assert_eq!(changed.categories["Food"].spent_minor, 0);
    assert!(engine.list_expenses("alice").await.unwrap().is_empty());

    engine.delete_budget("alice", budget.id).await.unwrap();
    let err = engine.budget("alice", budget.id).await.unwrap_err();
    assert!(matches!(err, EngineError::BudgetNotFound(_)));
}

#[tokio::test]
async fn record_expense_validates_budget_and_category() {
    let engine = engine_with_db().await;
    let budget = budget_with_food(&engine, "2024-01", 10_000).await;

    let err = engine
        .record_expense(RecordExpenseCmd::new("alice", uuid::Uuid::new_v4(), "Food", 1_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BudgetNotFound(_)));

    let err = engine
        .record_expense(RecordExpenseCmd::new("alice", budget.id, "Travel", 1_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    // Another user cannot spend against alice's budget.
    let err = engine
        .record_expense(RecordExpenseCmd::new("mallory", budget.id, "Food", 1_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BudgetNotFound(_)));
}

#[tokio::test]
async fn concurrent_recordings_cannot_both_pass_the_check() {
    let engine = engine_with_db().await;
    let budget = budget_with_food(&engine, "2024-01", 10_000).await;

    // Each expense fits alone but not together; the per-budget lock must
    // serialize them so exactly one succeeds.
    let (a, b) = tokio::join!(
        engine.record_expense(RecordExpenseCmd::new("alice", budget.id, "Food", 7_000)),
        engine.record_expense(RecordExpenseCmd::new("alice", budget.id, "Food", 7_000)),
    );
    let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);

    let current = engine.budget("alice", budget.id).await.unwrap();
    assert_eq!(current.categories["Food"].spent_minor, 7_000);
}

#[tokio::test]
async fn edit_budget_replaces_fields_without_revalidation() {
    let engine = engine_with_db().await;
    let budget = budget_with_food(&engine, "2024-01", 10_000).await;
    engine
        .record_expense(RecordExpenseCmd::new("alice", budget.id, "Food", 4_000))
        .await
        .unwrap();

    // The replacement map drops the recorded spend entirely; the engine
    // applies it verbatim.
    let changed = engine
        .edit_budget(EditBudgetCmd::new(
            "alice",
            budget.id,
            2_000,
            50_000,
            allocations(&[("Food", 2_000, 0)]),
        ))
        .await
        .unwrap();
    assert_eq!(changed.amount_minor, 2_000);

    let current = engine.budget("alice", budget.id).await.unwrap();
    assert_eq!(current.amount_minor, 2_000);
    assert_eq!(current.income_minor, 50_000);
    assert_eq!(current.categories["Food"].spent_minor, 0);
}

#[tokio::test]
async fn budgets_list_newest_month_first() {
    let engine = engine_with_db().await;
    engine.add_category("alice", "Food").await.unwrap();
    for month in ["2024-02", "2023-12", "2024-01"] {
        engine
            .create_budget(CreateBudgetCmd::new(
                "alice",
                month,
                10_000,
                100_000,
                allocations(&[("Food", 10_000, 0)]),
            ))
            .await
            .unwrap();
    }

    let months: Vec<String> = engine
        .list_budgets("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.month)
        .collect();
    assert_eq!(months, vec!["2024-02", "2024-01", "2023-12"]);
}

#[tokio::test]
async fn categories_deduplicate_case_insensitively() {
    let engine = engine_with_db().await;

    engine.add_category("alice", "Food").await.unwrap();
    let err = engine.add_category("alice", "food").await.unwrap_err();
    assert_eq!(err, EngineError::DuplicateCategory("food".to_string()));

    engine.add_category("alice", "Travel").await.unwrap();
    assert_eq!(
        engine.list_categories("alice").await.unwrap(),
        vec!["Food", "Travel"]
    );

    // Exact-case removal; unknown names are a silent no-op.
    engine.remove_category("alice", "food").await.unwrap();
    assert_eq!(
        engine.list_categories("alice").await.unwrap(),
        vec!["Food", "Travel"]
    );
    engine.remove_category("alice", "Food").await.unwrap();
    assert_eq!(engine.list_categories("alice").await.unwrap(), vec!["Travel"]);
}

#[tokio::test]
async fn scheme_progress_follows_budgeted_savings() {
    let engine = engine_with_db().await;
    engine.add_category("alice", "Rent").await.unwrap();

    // January and February each save 300 (income 500, spent 200); no
    // March budget. Target 300 is reached, so the scheme is fully funded.
    for month in ["2024-01", "2024-02"] {
        engine
            .create_budget(CreateBudgetCmd::new(
                "alice",
                month,
                20_000,
                50_000,
                allocations(&[("Rent", 20_000, 20_000)]),
            ))
            .await
            .unwrap();
    }

    let overview = engine
        .create_scheme(CreateSchemeCmd::new("alice", "2024-01", "2024-03", 30_000))
        .await
        .unwrap();
    assert!(overview.progress.active);
    assert_eq!(overview.progress.progress, 100);
    assert_eq!(overview.progress.saved_minor, 60_000);
    assert_eq!(overview.progress.total_income_minor, 100_000);
    assert_eq!(overview.progress.total_spent_minor, 40_000);
}

#[tokio::test]
async fn scheme_without_budgets_is_inactive() {
    let engine = engine_with_db().await;

    let overview = engine
        .create_scheme(CreateSchemeCmd::new("alice", "2030-01", "2030-03", 30_000))
        .await
        .unwrap();
    assert!(!overview.progress.active);
    assert_eq!(overview.progress.progress, 0);
}

#[tokio::test]
async fn scheme_edit_and_delete() {
    let engine = engine_with_db().await;

    let overview = engine
        .create_scheme(CreateSchemeCmd::new("alice", "2024-01", "2024-03", 30_000))
        .await
        .unwrap();
    let scheme_id = overview.scheme.id;

    let edited = engine
        .edit_scheme(engine::EditSchemeCmd::new(
            "alice",
            scheme_id,
            "2024-02",
            "2024-06",
            40_000,
        ))
        .await
        .unwrap();
    assert_eq!(edited.scheme.min_amount_minor, 40_000);
    assert_eq!(edited.scheme.start_date.to_string(), "2024-02-01");

    // Another user cannot edit it.
    let err = engine
        .edit_scheme(engine::EditSchemeCmd::new(
            "mallory",
            scheme_id,
            "2024-02",
            "2024-06",
            40_000,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    engine.delete_scheme("alice", scheme_id).await.unwrap();
    assert!(engine.list_schemes("alice").await.unwrap().is_empty());
    // Deleting again stays silent.
    engine.delete_scheme("alice", scheme_id).await.unwrap();
}
