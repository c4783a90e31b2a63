// src/handlers/announcements.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::{self, Paginated}},
    config::AppState,
    middleware::{auth::AuthenticatedUser, guards::{AdminOnly, RequireLevel}},
    models::announcement::{
        Announcement, AnnouncementKind, AnnouncementPriority, AnnouncementUpdate,
    },
};

// Distingue "campo ausente" (mantém) de "campo nulo" (limpa) no PUT
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAnnouncementsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/announcements
#[utoipa::path(
    get,
    path = "/api/announcements",
    tag = "Announcements",
    params(
        ("page" = Option<i64>, Query, description = "Página (começa em 1)"),
        ("limit" = Option<i64>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Avisos visíveis para o nível do chamador, fixados primeiro", body = Paginated<Announcement>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_announcements(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListAnnouncementsQuery>,
) -> Result<Json<Paginated<Announcement>>, AppError> {
    let window = pagination::window(query.page, query.limit);

    let (announcements, total) = app_state.announcement_service
        .list(&user, window)
        .await?;

    Ok(Json(Paginated::new(announcements, total, window)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementPayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    #[schema(example = "Manutenção programada no sábado")]
    pub title: String,

    #[validate(length(min = 1, message = "O conteúdo é obrigatório."))]
    #[schema(example = "O painel ficará indisponível das 02h às 04h.")]
    pub content: String,

    pub kind: AnnouncementKind,

    pub priority: Option<AnnouncementPriority>,

    #[serde(default)]
    #[schema(example = false)]
    pub is_pinned: bool,

    // NULL = visível para todos os níveis
    #[schema(example = 4)]
    pub target_level: Option<i32>,

    pub expires_at: Option<DateTime<Utc>>,
}

// POST /api/announcements
#[utoipa::path(
    post,
    path = "/api/announcements",
    tag = "Announcements",
    request_body = CreateAnnouncementPayload,
    responses(
        (status = 201, description = "Aviso publicado", body = Announcement),
        (status = 403, description = "Somente administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_announcement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireLevel<AdminOnly>,
    Json(payload): Json<CreateAnnouncementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let announcement = app_state.announcement_service
        .create(
            &user,
            &payload.title,
            &payload.content,
            payload.kind,
            payload.priority.unwrap_or(AnnouncementPriority::Normal),
            payload.is_pinned,
            payload.target_level,
            payload.expires_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(announcement)))
}

// GET /api/announcements/{id}
#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    tag = "Announcements",
    params(("id" = Uuid, Path, description = "ID do aviso")),
    responses(
        (status = 200, description = "Detalhe do aviso; cada leitura conta uma visualização", body = Announcement),
        (status = 404, description = "Aviso inexistente ou fora da audiência")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_announcement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Announcement>, AppError> {
    let announcement = app_state.announcement_service.read(&user, id).await?;
    Ok(Json(announcement))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnouncementPayload {
    #[validate(length(min = 1, message = "O título não pode ficar vazio."))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "O conteúdo não pode ficar vazio."))]
    pub content: Option<String>,

    pub kind: Option<AnnouncementKind>,
    pub priority: Option<AnnouncementPriority>,
    pub is_pinned: Option<bool>,
    pub is_visible: Option<bool>,

    // Enviar null limpa o direcionamento; omitir mantém o atual
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>, example = 4)]
    pub target_level: Option<Option<i32>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

// PUT /api/announcements/{id}
#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    tag = "Announcements",
    params(("id" = Uuid, Path, description = "ID do aviso")),
    request_body = UpdateAnnouncementPayload,
    responses(
        (status = 200, description = "Aviso atualizado", body = Announcement),
        (status = 403, description = "Somente administradores"),
        (status = 404, description = "Aviso não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_announcement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireLevel<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAnnouncementPayload>,
) -> Result<Json<Announcement>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let update = AnnouncementUpdate {
        title: payload.title,
        content: payload.content,
        kind: payload.kind,
        priority: payload.priority,
        is_pinned: payload.is_pinned,
        is_visible: payload.is_visible,
        target_level: payload.target_level,
        expires_at: payload.expires_at,
    };

    let updated = app_state.announcement_service.update(&user, id, &update).await?;
    Ok(Json(updated))
}

// DELETE /api/announcements/{id}
#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    tag = "Announcements",
    params(("id" = Uuid, Path, description = "ID do aviso")),
    responses(
        (status = 204, description = "Aviso removido"),
        (status = 403, description = "Somente administradores"),
        (status = 404, description = "Aviso não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_announcement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireLevel<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.announcement_service.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
