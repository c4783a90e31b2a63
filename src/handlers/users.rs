// src/handlers/users.rs

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
    middleware::{auth::AuthenticatedUser, guards::{AgencyOrAbove, RequireLevel}},
    models::user::{UserResponse, UserStatus, UserUpdate},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub level: Option<i32>,
    pub status: Option<UserStatus>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(
        ("level" = Option<i32>, Query, description = "Filtra por nível (1 a 4)"),
        ("status" = Option<UserStatus>, Query, description = "Filtra por situação da conta"),
        ("q" = Option<String>, Query, description = "Busca por nome, e-mail ou código"),
        ("page" = Option<i64>, Query, description = "Página (começa em 1)"),
        ("limit" = Option<i64>, Query, description = "Itens por página (máx. 100)")
    ),
    responses(
        (status = 200, description = "Usuários dentro do alcance do chamador", body = Paginated<UserResponse>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Paginated<UserResponse>>, AppError> {
    let window = pagination::window(query.page, query.limit);

    let (users, total) = app_state.user_service
        .list_users(&user, query.level, query.status, query.q.as_deref(), window)
        .await?;

    let items = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Paginated::new(items, total, window)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "agencia@exemplo.com")]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    #[schema(example = "senha-forte-123")]
    pub password: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    #[schema(example = "Agência Horizonte")]
    pub name: String,

    // Sem parent_id o novo usuário nasce abaixo de quem chamou
    pub parent_id: Option<Uuid>,
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado um nível abaixo do pai", body = UserResponse),
        (status = 403, description = "Pai indicado fora do alcance do chamador"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireLevel<AgencyOrAbove>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let created = app_state.user_service
        .create_child(
            &user,
            &payload.email,
            &payload.password,
            &payload.name,
            payload.parent_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Dados do usuário", body = UserResponse),
        (status = 403, description = "Fora do alcance hierárquico"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let found = app_state.user_service.get_user(&user, id).await?;
    Ok(Json(found.into()))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "O nome não pode ficar vazio."))]
    #[schema(example = "Maria Souza")]
    pub name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "novo@exemplo.com")]
    pub email: Option<String>,

    pub status: Option<UserStatus>,
}

// PUT /api/users/{id}
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = UserResponse),
        (status = 403, description = "Fora do alcance hierárquico"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let update = UserUpdate {
        name: payload.name,
        email: payload.email,
        status: payload.status,
    };

    let updated = app_state.user_service.update_user(&user, id, &update).await?;
    Ok(Json(updated.into()))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    // Obrigatória quando o próprio usuário troca a senha
    #[schema(example = "senha-atual-123")]
    pub current_password: Option<String>,

    #[validate(length(min = 6, message = "A nova senha deve ter no mínimo 6 caracteres."))]
    #[schema(example = "senha-nova-456")]
    pub new_password: String,
}

// POST /api/users/{id}/password
#[utoipa::path(
    post,
    path = "/api/users/{id}/password",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Senha alterada"),
        (status = 401, description = "Senha atual incorreta"),
        (status = 403, description = "Fora do alcance hierárquico")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state.user_service
        .change_password(
            &user,
            id,
            payload.current_password.as_deref(),
            &payload.new_password,
        )
        .await?;

    Ok(StatusCode::OK)
}

// GET /api/users/{id}/children
#[utoipa::path(
    get,
    path = "/api/users/{id}/children",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário pai")),
    responses(
        (status = 200, description = "Filhos diretos do usuário", body = [UserResponse]),
        (status = 403, description = "Fora do alcance hierárquico")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_children(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let children = app_state.user_service.children(&user, id).await?;
    Ok(Json(children.into_iter().map(UserResponse::from).collect()))
}
