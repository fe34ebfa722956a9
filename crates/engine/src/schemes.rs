//! The module contains the representation of a savings scheme.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A savings goal over a range of calendar months.
///
/// Funding progress is never stored; it is recomputed from the budgets
/// overlapping the range on every read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavingsScheme {
    pub id: Uuid,
    pub user_id: String,
    /// First day of the scheme's first month.
    pub start_date: NaiveDate,
    /// First day of the scheme's last month; normalized to the month's last
    /// day during progress computation.
    pub end_date: NaiveDate,
    pub min_amount_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl SavingsScheme {
    pub fn new(
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        min_amount_minor: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            start_date,
            end_date,
            min_amount_minor,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "savings_schemes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub start_date: Date,
    pub end_date: Date,
    pub min_amount_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingsScheme> for ActiveModel {
    fn from(scheme: &SavingsScheme) -> Self {
        Self {
            id: ActiveValue::Set(scheme.id.to_string()),
            user_id: ActiveValue::Set(scheme.user_id.clone()),
            start_date: ActiveValue::Set(scheme.start_date),
            end_date: ActiveValue::Set(scheme.end_date),
            min_amount_minor: ActiveValue::Set(scheme.min_amount_minor),
            created_at: ActiveValue::Set(scheme.created_at),
        }
    }
}

impl TryFrom<Model> for SavingsScheme {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "scheme")?,
            user_id: model.user_id,
            start_date: model.start_date,
            end_date: model.end_date,
            min_amount_minor: model.min_amount_minor,
            created_at: model.created_at,
        })
    }
}
