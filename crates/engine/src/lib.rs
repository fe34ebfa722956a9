pub use budgets::{Budget, CategoryAllocation, CategoryMap};
pub use commands::{
    CreateBudgetCmd, CreateSchemeCmd, DeleteExpenseCmd, EditBudgetCmd, EditSchemeCmd,
    RecordExpenseCmd,
};
pub use error::EngineError;
pub use expenses::Expense;
pub use ops::{BudgetChanged, Engine, EngineBuilder, ExpenseRecorded, SchemeOverview};
pub use progress::{MonthTotals, SchemeProgress};
pub use schemes::SavingsScheme;

mod budgets;
mod categories;
mod commands;
mod error;
mod expenses;
mod ops;
pub mod progress;
mod schemes;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
