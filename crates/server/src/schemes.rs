//! Savings schemes API endpoint and view mapping.

use api_types::scheme::{SchemeListResponse, SchemeOverview};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, user};

pub(crate) fn overview_view(overview: engine::SchemeOverview) -> SchemeOverview {
    SchemeOverview {
        scheme_id: overview.scheme.id,
        user_id: overview.scheme.user_id,
        start_date: overview.scheme.start_date,
        end_date: overview.scheme.end_date,
        min_amount: overview.scheme.min_amount_minor,
        date: overview.scheme.created_at,
        progress: overview.progress.progress,
        total_income: overview.progress.total_income_minor,
        saved: overview.progress.saved_minor,
        spent: overview.progress.total_spent_minor,
        scheme_is_active: overview.progress.active,
    }
}

pub(crate) async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<SchemeListResponse>, ServerError> {
    let schemes = state.engine.list_schemes(&user.username).await?;
    Ok(Json(SchemeListResponse {
        schemes: schemes.into_iter().map(overview_view).collect(),
    }))
}
