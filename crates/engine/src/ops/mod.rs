use std::{collections::HashMap, sync::Arc};

use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ResultEngine;

mod budgets;
mod categories;
mod expenses;
mod schemes;

pub use budgets::BudgetChanged;
pub use expenses::ExpenseRecorded;
pub use schemes::SchemeOverview;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The engine owning the database handle and the per-budget write locks.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    budget_locks: BudgetLocks,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Keyed async mutexes serializing read-modify-write cycles per budget.
///
/// Two concurrent expense recordings against one budget must not both read
/// the same pre-update `spent` value; each mutating operation holds the
/// budget's lock from its first read through its final write.
#[derive(Debug, Default)]
pub(crate) struct BudgetLocks {
    inner: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl BudgetLocks {
    pub(crate) async fn entry(&self, budget_id: Uuid) -> Arc<Mutex<()>> {
        let mut guard = self.inner.lock().await;
        guard.entry(budget_id).or_default().clone()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            budget_locks: BudgetLocks::default(),
        })
    }
}
