use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, categories, util::normalize_category_key};

use super::{Engine, with_tx};

impl Engine {
    /// Adds a name to the user's category registry.
    ///
    /// Uniqueness is case- and accent-insensitive via the normalized key;
    /// the registry is created lazily with the first entry. Returns the
    /// name as stored.
    pub async fn add_category(&self, user_id: &str, name: &str) -> ResultEngine<String> {
        let name = name.trim();
        let Some(norm) = normalize_category_key(name) else {
            return Err(EngineError::InvalidAmount(
                "category name must not be empty".to_string(),
            ));
        };

        with_tx!(self, |db_tx| {
            let existing = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .filter(categories::Column::NameNorm.eq(norm.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::DuplicateCategory(name.to_string()));
            }

            let position = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .count(&db_tx)
                .await?;

            let active = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name.to_string()),
                name_norm: ActiveValue::Set(norm),
                position: ActiveValue::Set(position as i32),
            };
            active.insert(&db_tx).await?;

            Ok(name.to_string())
        })
    }

    /// Removes the first exact-name match from the registry.
    ///
    /// Absent names are a silent no-op.
    pub async fn remove_category(&self, user_id: &str, name: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let existing = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .filter(categories::Column::Name.eq(name.to_string()))
                .order_by_asc(categories::Column::Position)
                .one(&db_tx)
                .await?;
            if let Some(model) = existing {
                categories::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            }
            Ok(())
        })
    }

    /// Registry names in insertion order.
    pub async fn list_categories(&self, user_id: &str) -> ResultEngine<Vec<String>> {
        with_tx!(self, |db_tx| {
            let models = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(categories::Column::Position)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(|model| model.name).collect())
        })
    }
}
