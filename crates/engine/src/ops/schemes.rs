use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, CreateSchemeCmd, EditSchemeCmd, EngineError, ResultEngine, SavingsScheme, budgets,
    progress::{self, MonthTotals, SchemeProgress},
    schemes,
    util::parse_month,
};

use super::{Engine, with_tx};

/// A savings scheme together with its recomputed funding progress.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemeOverview {
    pub scheme: SavingsScheme,
    pub progress: SchemeProgress,
}

impl Engine {
    /// Creates a savings scheme and returns it with fresh progress.
    pub async fn create_scheme(&self, cmd: CreateSchemeCmd) -> ResultEngine<SchemeOverview> {
        let start_date = parse_month(&cmd.start_month)?;
        let end_date = parse_month(&cmd.end_month)?;
        let scheme = SavingsScheme::new(&cmd.user_id, start_date, end_date, cmd.min_amount_minor);

        with_tx!(self, |db_tx| {
            schemes::ActiveModel::from(&scheme).insert(&db_tx).await?;
            let months = self.month_totals(&db_tx, &scheme.user_id).await?;
            let overview = overview_of(scheme, &months);
            Ok(overview)
        })
    }

    /// Replaces a scheme's date range and target, returning fresh progress.
    pub async fn edit_scheme(&self, cmd: EditSchemeCmd) -> ResultEngine<SchemeOverview> {
        let start_date = parse_month(&cmd.start_month)?;
        let end_date = parse_month(&cmd.end_month)?;

        with_tx!(self, |db_tx| {
            let model = schemes::Entity::find_by_id(cmd.scheme_id.to_string())
                .filter(schemes::Column::UserId.eq(cmd.user_id.clone()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(cmd.scheme_id.to_string()))?;

            let active = schemes::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                start_date: ActiveValue::Set(start_date),
                end_date: ActiveValue::Set(end_date),
                min_amount_minor: ActiveValue::Set(cmd.min_amount_minor),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            let scheme = SavingsScheme {
                id: cmd.scheme_id,
                user_id: model.user_id,
                start_date,
                end_date,
                min_amount_minor: cmd.min_amount_minor,
                created_at: model.created_at,
            };
            let months = self.month_totals(&db_tx, &scheme.user_id).await?;
            let overview = overview_of(scheme, &months);
            Ok(overview)
        })
    }

    /// Deletes a scheme; no guard, absent ids are a silent no-op.
    pub async fn delete_scheme(&self, user_id: &str, scheme_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            schemes::Entity::delete_many()
                .filter(schemes::Column::Id.eq(scheme_id.to_string()))
                .filter(schemes::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// All schemes of a user with progress, newest first.
    pub async fn list_schemes(&self, user_id: &str) -> ResultEngine<Vec<SchemeOverview>> {
        with_tx!(self, |db_tx| {
            let models = schemes::Entity::find()
                .filter(schemes::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(schemes::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let months = self.month_totals(&db_tx, user_id).await?;
            let mut overviews = Vec::with_capacity(models.len());
            for model in models {
                let scheme = SavingsScheme::try_from(model)?;
                overviews.push(overview_of(scheme, &months));
            }
            Ok(overviews)
        })
    }

    /// Income/spend totals of every budgeted month of a user.
    async fn month_totals(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<HashMap<String, MonthTotals>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .all(db_tx)
            .await?;

        let mut months = HashMap::with_capacity(models.len());
        for model in models {
            let budget = Budget::try_from(model)?;
            months.insert(
                budget.month.clone(),
                MonthTotals {
                    income_minor: budget.income_minor,
                    spent_minor: budget.total_spent_minor(),
                },
            );
        }
        Ok(months)
    }
}

fn overview_of(scheme: SavingsScheme, months: &HashMap<String, MonthTotals>) -> SchemeOverview {
    let progress = progress::compute(
        scheme.start_date,
        scheme.end_date,
        scheme.min_amount_minor,
        months,
        Utc::now().date_naive(),
    );
    SchemeOverview { scheme, progress }
}
