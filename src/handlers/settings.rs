// src/handlers/settings.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, guards::{AdminOnly, RequireLevel}},
    models::settings::{SystemSettings, UpdateSettingsRequest},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Configurações da plataforma", body = SystemSettings)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
) -> Result<Json<SystemSettings>, AppError> {
    let settings = app_state.settings_repo.get_settings().await?;
    Ok(Json(settings))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Configurações atualizadas", body = SystemSettings),
        (status = 403, description = "Somente administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireLevel<AdminOnly>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<SystemSettings>, AppError> {
    let settings = app_state.settings_repo
        .update_settings(&app_state.db_pool, &payload)
        .await?;

    app_state.activity_repo
        .record(&app_state.db_pool, Some(user.id), "settings.updated", None)
        .await?;

    Ok(Json(settings))
}
