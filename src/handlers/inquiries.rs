// src/handlers/inquiries.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::{self, Paginated}},
    config::AppState,
    middleware::{auth::AuthenticatedUser, guards::{DistributorOrAbove, RequireLevel}},
    models::inquiry::{Inquiry, InquiryDetail, InquiryMessage, InquiryPriority, InquiryStatus},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInquiriesQuery {
    pub status: Option<InquiryStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/inquiries
#[utoipa::path(
    get,
    path = "/api/inquiries",
    tag = "Inquiries",
    params(
        ("status" = Option<InquiryStatus>, Query, description = "Filtra pela situação do chamado"),
        ("page" = Option<i64>, Query, description = "Página (começa em 1)"),
        ("limit" = Option<i64>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Chamados do alcance do chamador", body = Paginated<Inquiry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_inquiries(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListInquiriesQuery>,
) -> Result<Json<Paginated<Inquiry>>, AppError> {
    let window = pagination::window(query.page, query.limit);

    let (inquiries, total) = app_state.inquiry_service
        .list_inquiries(&user, query.status, window)
        .await?;

    Ok(Json(Paginated::new(inquiries, total, window)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInquiryPayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    #[schema(example = "Slot sem atualizar o ranking")]
    pub title: String,

    #[validate(length(min = 1, message = "A mensagem é obrigatória."))]
    #[schema(example = "O ranking parou de atualizar ontem à noite.")]
    pub content: String,

    pub priority: Option<InquiryPriority>,
}

// POST /api/inquiries
#[utoipa::path(
    post,
    path = "/api/inquiries",
    tag = "Inquiries",
    request_body = CreateInquiryPayload,
    responses(
        (status = 201, description = "Chamado aberto com a primeira mensagem", body = InquiryDetail)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_inquiry(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateInquiryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let detail = app_state.inquiry_service
        .create_inquiry(
            &user,
            &payload.title,
            &payload.content,
            payload.priority.unwrap_or(InquiryPriority::Normal),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/inquiries/{id}
#[utoipa::path(
    get,
    path = "/api/inquiries/{id}",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "ID do chamado")),
    responses(
        (status = 200, description = "Conversa completa; ler marca as mensagens do outro lado como lidas", body = InquiryDetail),
        (status = 403, description = "Fora do alcance hierárquico"),
        (status = 404, description = "Chamado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_inquiry(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InquiryDetail>, AppError> {
    let detail = app_state.inquiry_service.get_detail(&user, id).await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMessagePayload {
    #[validate(length(min = 1, message = "A mensagem não pode ficar vazia."))]
    #[schema(example = "Poderiam verificar novamente?")]
    pub content: String,
}

// POST /api/inquiries/{id}/messages
#[utoipa::path(
    post,
    path = "/api/inquiries/{id}/messages",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "ID do chamado")),
    request_body = AddMessagePayload,
    responses(
        (status = 201, description = "Mensagem acrescentada; primeira resposta de atendimento assume o chamado", body = InquiryMessage),
        (status = 404, description = "Chamado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_message(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddMessagePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let message = app_state.inquiry_service
        .add_message(&user, id, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInquiryStatusPayload {
    #[schema(example = "resolved")]
    pub status: InquiryStatus,
}

// PATCH /api/inquiries/{id}/status
#[utoipa::path(
    patch,
    path = "/api/inquiries/{id}/status",
    tag = "Inquiries",
    params(("id" = Uuid, Path, description = "ID do chamado")),
    request_body = UpdateInquiryStatusPayload,
    responses(
        (status = 200, description = "Situação alterada; resolver ou fechar carimba resolved_at", body = Inquiry),
        (status = 403, description = "Restrito aos níveis 1 e 2"),
        (status = 404, description = "Chamado não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_inquiry_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireLevel<DistributorOrAbove>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInquiryStatusPayload>,
) -> Result<Json<Inquiry>, AppError> {
    let updated = app_state.inquiry_service
        .update_status(&user, id, payload.status)
        .await?;

    Ok(Json(updated))
}
