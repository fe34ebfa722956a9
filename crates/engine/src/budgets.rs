//! The module contains the representation of a monthly budget.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

/// One category allocation: how much is planned and how much is spent.
///
/// Amounts are integer minor units (cents). The resting invariant is
/// `spent_minor <= budget_minor`; mutations that would break it are
/// rejected before commit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    #[serde(rename = "budget")]
    pub budget_minor: i64,
    #[serde(rename = "spent")]
    pub spent_minor: i64,
}

/// Map of category name to its allocation.
pub type CategoryMap = BTreeMap<String, CategoryAllocation>;

/// A user's spending plan for one calendar month.
///
/// At most one budget exists per `(user_id, month)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: String,
    /// `YYYY-MM` month the budget covers.
    pub month: String,
    pub amount_minor: i64,
    pub income_minor: i64,
    pub categories: CategoryMap,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(
        user_id: &str,
        month: String,
        amount_minor: i64,
        income_minor: i64,
        categories: CategoryMap,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            month,
            amount_minor,
            income_minor,
            categories,
            created_at: Utc::now(),
        }
    }

    /// Total spent across all categories.
    pub fn total_spent_minor(&self) -> i64 {
        self.categories.values().map(|c| c.spent_minor).sum()
    }
}

pub(crate) fn encode_categories(categories: &CategoryMap) -> ResultEngine<String> {
    serde_json::to_string(categories).map_err(|err| EngineError::InvalidCategories(err.to_string()))
}

pub(crate) fn decode_categories(raw: &str) -> ResultEngine<CategoryMap> {
    serde_json::from_str(raw).map_err(|err| EngineError::InvalidCategories(err.to_string()))
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub month: String,
    pub amount_minor: i64,
    pub income_minor: i64,
    /// Category map serialized as JSON.
    pub categories: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Budget> for ActiveModel {
    type Error = EngineError;

    fn try_from(budget: &Budget) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(budget.id.to_string()),
            user_id: ActiveValue::Set(budget.user_id.clone()),
            month: ActiveValue::Set(budget.month.clone()),
            amount_minor: ActiveValue::Set(budget.amount_minor),
            income_minor: ActiveValue::Set(budget.income_minor),
            categories: ActiveValue::Set(encode_categories(&budget.categories)?),
            created_at: ActiveValue::Set(budget.created_at),
        })
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            user_id: model.user_id,
            month: model.month,
            amount_minor: model.amount_minor,
            income_minor: model.income_minor,
            categories: decode_categories(&model.categories)?,
            created_at: model.created_at,
        })
    }
}
