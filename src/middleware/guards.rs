// src/middleware/guards.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, models::user::User};

/// 1. O trait que define o teto de nível de um grupo de rotas
pub trait LevelDef: Send + Sync + 'static {
    /// Maior número de nível admitido (número menor = mais privilégio)
    fn max_level() -> i32;
}

/// 2. O extrator (guardião). Basta declará-lo na assinatura do handler:
/// `_guard: RequireLevel<AdminOnly>`.
pub struct RequireLevel<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireLevel<T>
where
    T: LevelDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .ok_or(AppError::InvalidToken)?;

        // O número do nível decide; o rótulo do papel é só fachada
        if user.level > T::max_level() {
            return Err(AppError::Forbidden);
        }

        Ok(RequireLevel(PhantomData))
    }
}

// ---
// TETOS USADOS PELAS ROTAS
// ---

/// Somente administradores (nível 1)
pub struct AdminOnly;
impl LevelDef for AdminOnly {
    fn max_level() -> i32 { 1 }
}

/// Distribuidores para cima (níveis 1 e 2)
pub struct DistributorOrAbove;
impl LevelDef for DistributorOrAbove {
    fn max_level() -> i32 { 2 }
}

/// Agências para cima (níveis 1 a 3)
pub struct AgencyOrAbove;
impl LevelDef for AgencyOrAbove {
    fn max_level() -> i32 { 3 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::user::UserStatus;

    fn user_with_level(level: i32) -> User {
        User {
            id: Uuid::new_v4(),
            user_code: "UTESTE001".to_string(),
            email: "teste@slotdesk.io".to_string(),
            password_hash: String::new(),
            name: "Teste".to_string(),
            parent_id: None,
            level,
            status: UserStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn parts_for(user: User) -> Parts {
        let (mut parts, _) = axum::http::Request::builder()
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(user);
        parts
    }

    #[tokio::test]
    async fn distributor_passes_agency_gate() {
        // Nível numericamente menor sempre passa em portões mais frouxos
        let mut parts = parts_for(user_with_level(2));
        let result = RequireLevel::<AgencyOrAbove>::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn end_user_is_blocked_at_agency_gate() {
        let mut parts = parts_for(user_with_level(4));
        let result = RequireLevel::<AgencyOrAbove>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn only_level_one_passes_admin_gate() {
        let mut parts = parts_for(user_with_level(1));
        assert!(RequireLevel::<AdminOnly>::from_request_parts(&mut parts, &()).await.is_ok());

        let mut parts = parts_for(user_with_level(2));
        assert!(matches!(
            RequireLevel::<AdminOnly>::from_request_parts(&mut parts, &()).await,
            Err(AppError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let (mut parts, _) = axum::http::Request::builder()
            .body(())
            .unwrap()
            .into_parts();
        let result = RequireLevel::<AdminOnly>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
