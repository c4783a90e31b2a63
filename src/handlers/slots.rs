// src/handlers/slots.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::{self, Paginated}},
    config::AppState,
    middleware::{auth::AuthenticatedUser, guards::{AgencyOrAbove, RequireLevel}},
    models::slot::{Slot, SlotCategory, SlotDetail, SlotRanking, SlotStatus, SlotUpdate, SlotWorkType},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSlotsQuery {
    pub status: Option<SlotStatus>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/slots
#[utoipa::path(
    get,
    path = "/api/slots",
    tag = "Slots",
    params(
        ("status" = Option<SlotStatus>, Query, description = "Filtra pela situação do slot"),
        ("q" = Option<String>, Query, description = "Busca por nome, palavra-chave ou código"),
        ("page" = Option<i64>, Query, description = "Página (começa em 1)"),
        ("limit" = Option<i64>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Slots do alcance do chamador", body = Paginated<Slot>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_slots(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListSlotsQuery>,
) -> Result<Json<Paginated<Slot>>, AppError> {
    let window = pagination::window(query.page, query.limit);

    let (slots, total) = app_state.slot_service
        .list_slots(&user, query.status, query.q.as_deref(), window)
        .await?;

    Ok(Json(Paginated::new(slots, total, window)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlotPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Campanha Loja Centro")]
    pub name: String,

    #[validate(length(min = 1, message = "A palavra-chave é obrigatória."))]
    #[schema(example = "restaurante centro sp")]
    pub keyword: String,

    #[validate(url(message = "A URL fornecida é inválida."))]
    #[schema(example = "https://loja.exemplo.com")]
    pub url: String,

    pub category: SlotCategory,
    pub work_type: SlotWorkType,

    // Sem responsável indicado o slot fica com o próprio chamador
    pub assigned_to: Option<Uuid>,

    // Sem preço vale o padrão configurado na plataforma
    #[schema(example = "150000.00")]
    pub price: Option<Decimal>,

    #[schema(example = "2025-03-01")]
    pub start_date: NaiveDate,

    #[schema(example = "2025-03-30")]
    pub end_date: NaiveDate,
}

// POST /api/slots
#[utoipa::path(
    post,
    path = "/api/slots",
    tag = "Slots",
    request_body = CreateSlotPayload,
    responses(
        (status = 201, description = "Slot criado e atribuído", body = Slot),
        (status = 400, description = "Datas incoerentes"),
        (status = 403, description = "Responsável fora do alcance do chamador")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_slot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireLevel<AgencyOrAbove>,
    Json(payload): Json<CreateSlotPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let slot = app_state.slot_service
        .create_slot(
            &user,
            &payload.name,
            &payload.keyword,
            &payload.url,
            payload.category,
            payload.work_type,
            payload.assigned_to,
            payload.price,
            payload.start_date,
            payload.end_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(slot)))
}

// GET /api/slots/{id}
#[utoipa::path(
    get,
    path = "/api/slots/{id}",
    tag = "Slots",
    params(("id" = Uuid, Path, description = "ID do slot")),
    responses(
        (status = 200, description = "Detalhe com histórico de ranking", body = SlotDetail),
        (status = 403, description = "Fora do alcance hierárquico"),
        (status = 404, description = "Slot não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_slot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SlotDetail>, AppError> {
    let detail = app_state.slot_service.get_slot_detail(&user, id).await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlotPayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "A palavra-chave não pode ficar vazia."))]
    pub keyword: Option<String>,

    #[validate(url(message = "A URL fornecida é inválida."))]
    pub url: Option<String>,

    pub category: Option<SlotCategory>,
    pub work_type: Option<SlotWorkType>,
    pub status: Option<SlotStatus>,

    #[schema(example = "150000.00")]
    pub price: Option<Decimal>,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    #[validate(range(min = 0, max = 100, message = "O andamento deve estar entre 0 e 100."))]
    #[schema(example = 60)]
    pub progress: Option<i32>,
}

// PUT /api/slots/{id}
#[utoipa::path(
    put,
    path = "/api/slots/{id}",
    tag = "Slots",
    params(("id" = Uuid, Path, description = "ID do slot")),
    request_body = UpdateSlotPayload,
    responses(
        (status = 200, description = "Slot atualizado", body = Slot),
        (status = 403, description = "Responsável só altera andamento e situação"),
        (status = 404, description = "Slot não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_slot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSlotPayload>,
) -> Result<Json<Slot>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let update = SlotUpdate {
        name: payload.name,
        keyword: payload.keyword,
        url: payload.url,
        category: payload.category,
        work_type: payload.work_type,
        status: payload.status,
        price: payload.price,
        start_date: payload.start_date,
        end_date: payload.end_date,
        progress: payload.progress,
    };

    let updated = app_state.slot_service.update_slot(&user, id, &update).await?;
    Ok(Json(updated))
}

// DELETE /api/slots/{id}
#[utoipa::path(
    delete,
    path = "/api/slots/{id}",
    tag = "Slots",
    params(("id" = Uuid, Path, description = "ID do slot")),
    responses(
        (status = 204, description = "Slot removido com o histórico de ranking"),
        (status = 403, description = "Só administrador ou a hierarquia que atribuiu"),
        (status = 404, description = "Slot não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_slot(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.slot_service.delete_slot(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordRankPayload {
    #[validate(range(min = 1, message = "A posição deve ser maior ou igual a 1."))]
    #[schema(example = 5)]
    pub rank: i32,
}

// POST /api/slots/{id}/ranking
#[utoipa::path(
    post,
    path = "/api/slots/{id}/ranking",
    tag = "Slots",
    params(("id" = Uuid, Path, description = "ID do slot")),
    request_body = RecordRankPayload,
    responses(
        (status = 201, description = "Observação registrada e classificada", body = SlotRanking),
        (status = 404, description = "Slot não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_ranking(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordRankPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let ranking = app_state.slot_service.record_rank(&user, id, payload.rank).await?;
    Ok((StatusCode::CREATED, Json(ranking)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn progress_outside_range_fails_validation() {
        let payload: UpdateSlotPayload = serde_json::from_value(json!({ "progress": 101 })).unwrap();
        assert!(payload.validate().is_err());

        let payload: UpdateSlotPayload = serde_json::from_value(json!({ "progress": 100 })).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn rank_below_one_fails_validation() {
        let payload: RecordRankPayload = serde_json::from_value(json!({ "rank": 0 })).unwrap();
        assert!(payload.validate().is_err());

        let payload: RecordRankPayload = serde_json::from_value(json!({ "rank": 1 })).unwrap();
        assert!(payload.validate().is_ok());
    }
}
