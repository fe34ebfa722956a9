use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod budgets;
mod categories;
mod dispatch;
mod expenses;
mod schemes;
mod server;
mod sessions;
mod sync;
mod user;

pub mod types {
    pub mod budget {
        pub use api_types::budget::{BudgetListResponse, BudgetView, CategoryAllocation};
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseListResponse, ExpenseView};
    }

    pub mod scheme {
        pub use api_types::scheme::{SchemeListResponse, SchemeOverview};
    }

    pub mod event {
        pub use api_types::event::{ClientEvent, ErrorReply, ServerFrame};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::BudgetNotFound(_) | EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::DuplicateMonth(_) | EngineError::DuplicateCategory(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::OverBudget(_)
        | EngineError::HasExpenses(_)
        | EngineError::InvalidMonth(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidCategories(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::BudgetNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::DuplicateMonth("2024-01".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::OverBudget("Food".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
