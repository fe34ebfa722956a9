//! Category registry API endpoint.

use api_types::category::CategoryListResponse;
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

pub(crate) async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state.engine.list_categories(&user.username).await?;
    Ok(Json(CategoryListResponse { categories }))
}
