// src/handlers/activity.rs

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    common::{error::AppError, pagination::{self, Paginated}},
    config::AppState,
    middleware::guards::{AdminOnly, RequireLevel},
    models::activity::ActivityLog,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLogsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/logs
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "Logs",
    params(
        ("page" = Option<i64>, Query, description = "Página (começa em 1)"),
        ("limit" = Option<i64>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Trilha de auditoria, mais recente primeiro", body = Paginated<ActivityLog>),
        (status = 403, description = "Somente administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_logs(
    State(app_state): State<AppState>,
    _guard: RequireLevel<AdminOnly>,
    Query(query): Query<ListLogsQuery>,
) -> Result<Json<Paginated<ActivityLog>>, AppError> {
    let window = pagination::window(query.page, query.limit);

    let (logs, total) = app_state.activity_repo.list(window).await?;
    Ok(Json(Paginated::new(logs, total, window)))
}
