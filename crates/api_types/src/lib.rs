use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub mod budget {
    use super::*;

    /// One category allocation inside a budget.
    ///
    /// Amounts are integer minor units; the wire keeps the short field
    /// names clients already use.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryAllocation {
        #[serde(rename = "budget")]
        pub budget_minor: i64,
        #[serde(rename = "spent")]
        pub spent_minor: i64,
    }

    /// Category name to allocation, in name order.
    pub type CategoryMap = BTreeMap<String, CategoryAllocation>;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetView {
        pub budget_id: Uuid,
        pub user_id: String,
        /// Budgeted month in `YYYY-MM` form.
        pub month: String,
        pub amount: i64,
        pub income: i64,
        pub categories: CategoryMap,
        pub date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetListResponse {
        pub budgets: Vec<BudgetView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseView {
        pub expense_id: Uuid,
        pub user_id: String,
        pub month: String,
        /// Day of month the expense was recorded on.
        pub day: u32,
        pub category: String,
        pub amount: i64,
        pub date: DateTime<Utc>,
    }

    /// Expenses grouped by budget month.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub months: BTreeMap<String, Vec<ExpenseView>>,
    }
}

pub mod scheme {
    use super::*;

    /// A savings scheme with its recomputed funding progress.
    ///
    /// Progress fields are derived on every read; they are never stored.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SchemeOverview {
        pub scheme_id: Uuid,
        pub user_id: String,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub min_amount: i64,
        pub date: DateTime<Utc>,
        /// Funding progress in whole percent, 0..=100.
        pub progress: i64,
        pub total_income: i64,
        pub saved: i64,
        pub spent: i64,
        pub scheme_is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SchemeListResponse {
        pub schemes: Vec<SchemeOverview>,
    }
}

pub mod category {
    use super::*;

    /// Registry names in insertion order.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<String>,
    }
}

pub mod event {
    use super::*;
    use super::budget::CategoryMap;

    /// An inbound socket command, tagged by event name.
    #[derive(Debug, Deserialize)]
    #[serde(tag = "event", content = "data", rename_all = "kebab-case")]
    pub enum ClientEvent {
        CreateBudget(CreateBudget),
        CreateScheme(CreateScheme),
        EditScheme(EditScheme),
        RecordExpense(RecordExpense),
        EditBudget(EditBudget),
        AddCategory(AddCategory),
        DeleteCategory(DeleteCategory),
        DeleteBudget(DeleteBudget),
        DeleteScheme(DeleteScheme),
        DeleteExpense(DeleteExpense),
    }

    /// An outbound frame: the reply event name plus its payload.
    #[derive(Debug, Serialize)]
    pub struct ServerFrame<T> {
        pub event: &'static str,
        pub data: T,
    }

    /// Validation failure reply, sent only to the initiating session.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorReply {
        pub success: bool,
        pub message: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateBudget {
        pub month: String,
        #[serde(rename = "budget")]
        pub amount: i64,
        pub categories: CategoryMap,
        pub income: i64,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EditBudget {
        pub budget_id: Uuid,
        #[serde(rename = "budget")]
        pub amount: i64,
        pub categories: CategoryMap,
        pub income: i64,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DeleteBudget {
        pub budget_id: Uuid,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DeleteScheme {
        pub scheme_id: Uuid,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordExpense {
        pub budget_id: Uuid,
        pub amount: i64,
        pub category: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DeleteExpense {
        pub amount: i64,
        pub category: String,
        pub budget_id: Uuid,
        pub expense_id: Uuid,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CreateScheme {
        pub start_month: String,
        pub end_month: String,
        pub amount: i64,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EditScheme {
        pub scheme_id: Uuid,
        pub start_month: String,
        pub end_month: String,
        pub amount: i64,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AddCategory {
        pub category_name: String,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DeleteCategory {
        pub category_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetCreated {
        pub success: bool,
        pub budget_id: Uuid,
        pub user_id: String,
        pub month: String,
        pub amount: i64,
        pub income: i64,
        pub categories: CategoryMap,
        pub date: DateTime<Utc>,
    }

    /// Generic budget state refresh emitted alongside expense mutations.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetUpdate {
        pub budget_id: Uuid,
        pub categories: CategoryMap,
        #[serde(rename = "budget")]
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetEdited {
        pub success: bool,
        pub budget_id: Uuid,
        #[serde(rename = "budget")]
        pub amount: i64,
        pub categories: CategoryMap,
        pub income: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetDeleted {
        pub success: bool,
        pub budget_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseRecorded {
        pub success: bool,
        pub expense_id: Uuid,
        pub budget_id: Uuid,
        pub user_id: String,
        pub month: String,
        pub day: u32,
        pub category: String,
        pub categories: CategoryMap,
        pub amount: i64,
        pub date: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseDeleted {
        pub success: bool,
        pub expense_id: Uuid,
        pub budget_id: Uuid,
        pub category: String,
        pub amount: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryAdded {
        pub success: bool,
        pub category_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryDeleted {
        pub success: bool,
        pub category_name: String,
    }

    /// Reply for `create-scheme` and `edit-scheme`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SchemeSaved {
        pub success: bool,
        #[serde(flatten)]
        pub overview: scheme::SchemeOverview,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SchemeDeleted {
        pub success: bool,
        pub scheme_id: Uuid,
    }
}
