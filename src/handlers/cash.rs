// src/handlers/cash.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::{self, Paginated}},
    config::AppState,
    middleware::{auth::AuthenticatedUser, guards::{AdminOnly, RequireLevel}},
    models::cash::{
        BalanceResponse, CashEntryType, CashHistoryEntry, CashStatistics, ChargeDecision,
        ChargeRequest, ChargeRequestWithUser, ChargeStatus,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChargeRequestsQuery {
    pub status: Option<ChargeStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/cash/requests
#[utoipa::path(
    get,
    path = "/api/cash/requests",
    tag = "Cash",
    params(
        ("status" = Option<ChargeStatus>, Query, description = "Filtra pela situação da solicitação"),
        ("page" = Option<i64>, Query, description = "Página (começa em 1)"),
        ("limit" = Option<i64>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Solicitações do alcance do chamador", body = Paginated<ChargeRequestWithUser>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_charge_requests(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListChargeRequestsQuery>,
) -> Result<Json<Paginated<ChargeRequestWithUser>>, AppError> {
    let window = pagination::window(query.page, query.limit);

    let (requests, total) = app_state.cash_service
        .list_requests(&user, query.status, window)
        .await?;

    Ok(Json(Paginated::new(requests, total, window)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChargeRequestPayload {
    #[schema(example = "50000.00")]
    pub amount: Decimal,
}

// POST /api/cash/requests
#[utoipa::path(
    post,
    path = "/api/cash/requests",
    tag = "Cash",
    request_body = CreateChargeRequestPayload,
    responses(
        (status = 201, description = "Solicitação de carga aberta", body = ChargeRequest),
        (status = 400, description = "Valor precisa ser maior que zero")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_charge_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateChargeRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    let request = app_state.cash_service
        .request_charge(&user, payload.amount)
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessChargePayload {
    pub request_id: Uuid,

    #[schema(example = "approve")]
    pub decision: ChargeDecision,

    #[schema(example = "Comprovante não confere")]
    pub reject_reason: Option<String>,
}

// PATCH /api/cash/requests
#[utoipa::path(
    patch,
    path = "/api/cash/requests",
    tag = "Cash",
    request_body = ProcessChargePayload,
    responses(
        (status = 200, description = "Solicitação decidida; aprovação credita o saldo", body = ChargeRequest),
        (status = 404, description = "Solicitação não encontrada"),
        (status = 409, description = "Solicitação já processada")
    ),
    security(("api_jwt" = []))
)]
pub async fn process_charge_request(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireLevel<AdminOnly>,
    Json(payload): Json<ProcessChargePayload>,
) -> Result<Json<ChargeRequest>, AppError> {
    let processed = app_state.cash_service
        .process_request(
            &user,
            payload.request_id,
            payload.decision,
            payload.reject_reason.as_deref(),
        )
        .await?;

    Ok(Json(processed))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceQuery {
    // Sem userId devolve o saldo do próprio chamador
    pub user_id: Option<Uuid>,
}

// GET /api/cash/balance
#[utoipa::path(
    get,
    path = "/api/cash/balance",
    tag = "Cash",
    params(
        ("userId" = Option<Uuid>, Query, description = "Consulta o saldo de um usuário do alcance (padrão: o próprio)")
    ),
    responses(
        (status = 200, description = "Saldo atual (total = dinheiro + pontos)", body = BalanceResponse),
        (status = 403, description = "Usuário fora do alcance hierárquico")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_balance(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>, AppError> {
    let target = query.user_id.unwrap_or(user.id);
    let balance = app_state.cash_service.balance_of(&user, target).await?;
    Ok(Json(balance))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCashHistoryQuery {
    pub entry_type: Option<CashEntryType>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/cash/transactions
#[utoipa::path(
    get,
    path = "/api/cash/transactions",
    tag = "Cash",
    params(
        ("entryType" = Option<CashEntryType>, Query, description = "Filtra pelo tipo de lançamento"),
        ("page" = Option<i64>, Query, description = "Página (começa em 1)"),
        ("limit" = Option<i64>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Extrato do alcance do chamador", body = Paginated<CashHistoryEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListCashHistoryQuery>,
) -> Result<Json<Paginated<CashHistoryEntry>>, AppError> {
    let window = pagination::window(query.page, query.limit);

    let (entries, total) = app_state.cash_service
        .list_history(&user, query.entry_type, window)
        .await?;

    Ok(Json(Paginated::new(entries, total, window)))
}

// GET /api/cash/statistics
#[utoipa::path(
    get,
    path = "/api/cash/statistics",
    tag = "Cash",
    responses(
        (status = 200, description = "Agregados financeiros do alcance do chamador", body = CashStatistics)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_statistics(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<CashStatistics>, AppError> {
    let statistics = app_state.cash_service.statistics(&user).await?;
    Ok(Json(statistics))
}
