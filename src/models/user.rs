// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::hierarchy::Role;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

// --- Structs ---

// Representa um usuário vindo do banco de dados.
// O `role` não é coluna: é derivado do nível na hora de responder.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub user_code: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub name: String,
    pub parent_id: Option<Uuid>,
    pub level: i32,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_level(self.level)
    }
}

// Forma pública do usuário nas respostas da API (sem hash, com role derivado)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "U7F3A9C21")]
    pub user_code: String,
    #[schema(example = "maria@exemplo.com")]
    pub email: String,
    #[schema(example = "Maria Silva")]
    pub name: String,
    pub parent_id: Option<Uuid>,
    #[schema(example = 3)]
    pub level: i32,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let role = user.role();
        Self {
            id: user.id,
            user_code: user.user_code,
            email: user.email,
            name: user.name,
            parent_id: user.parent_id,
            level: user.level,
            role,
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// Campos permitidos no PUT /api/users/{id}.
// Lista fechada: nada de montar SET dinâmico a partir do corpo da requisição.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<UserStatus>,
}
