//! The module contains the representation of a recorded expense.

use chrono::{DateTime, Datelike, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A single expense, always tied to one budget via `(user_id, month)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: String,
    /// Month of the parent budget, `YYYY-MM`.
    pub month: String,
    /// Day of month the expense was recorded on, 1..=31.
    pub day: u32,
    pub category: String,
    pub amount_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// New expense dated `recorded_at`, with the day taken from that date.
    pub fn new(
        user_id: &str,
        month: String,
        category: String,
        amount_minor: i64,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            month,
            day: recorded_at.day(),
            category,
            amount_minor,
            created_at: recorded_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub month: String,
    pub day: i32,
    pub category: String,
    pub amount_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            user_id: ActiveValue::Set(expense.user_id.clone()),
            month: ActiveValue::Set(expense.month.clone()),
            day: ActiveValue::Set(expense.day as i32),
            category: ActiveValue::Set(expense.category.clone()),
            amount_minor: ActiveValue::Set(expense.amount_minor),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            user_id: model.user_id,
            month: model.month,
            day: u32::try_from(model.day)
                .map_err(|_| EngineError::InvalidAmount("invalid expense day".to_string()))?,
            category: model.category,
            amount_minor: model.amount_minor,
            created_at: model.created_at,
        })
    }
}
