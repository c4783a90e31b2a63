// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, hierarchy},
    db::{ActivityRepository, UserRepository},
    models::{auth::Claims, user::{User, UserStatus}},
};

use super::user_service::generate_user_code;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    activity_repo: ActivityRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        activity_repo: ActivityRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, activity_repo, jwt_secret, pool }
    }

    /// Registro público. Com código de convite o novo usuário entra um nível
    /// abaixo do convidador; sem código entra como usuário final (nível 4).
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        parent_code: Option<&str>,
    ) -> Result<(String, User), AppError> {
        // 1. Resolve o convite antes de abrir a transação
        let (parent_id, level) = match parent_code {
            Some(code) => {
                let parent = self.user_repo
                    .find_by_code(code)
                    .await?
                    .ok_or_else(|| {
                        AppError::InvalidInput("Código de convite inválido.".to_string())
                    })?;
                (Some(parent.id), hierarchy::child_level(parent.level))
            }
            None => (None, 4),
        };

        // 2. Hashing fora da transação (não toca no banco)
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))?
            ?;

        let user_code = generate_user_code();

        // 3. Cria o usuário e o registro de auditoria na mesma transação
        let mut tx = self.pool.begin().await?;

        let new_user = self.user_repo
            .create_user(
                &mut *tx,
                &user_code,
                email,
                &hashed_password,
                name,
                parent_id,
                level,
            )
            .await?;

        self.activity_repo
            .record(
                &mut *tx,
                Some(new_user.id),
                "auth.register",
                Some(&format!("Cadastro de {} (nível {})", new_user.user_code, new_user.level)),
            )
            .await?;

        tx.commit().await?;

        tracing::info!("👤 Novo usuário registrado: {} (nível {})", new_user.user_code, new_user.level);

        // 4. Gera o token (não precisa de transação)
        let token = self.create_token(new_user.id)?;
        Ok((token, new_user))
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let user = self.user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
        ?;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Conta desativada não recebe token novo
        if user.status != UserStatus::Active {
            return Err(AppError::AccountDisabled);
        }

        self.activity_repo
            .record(&self.pool, Some(user.id), "auth.login", None)
            .await?;

        let token = self.create_token(user.id)?;
        Ok((token, user))
    }

    /// Logout é apenas auditoria: o token expira sozinho.
    pub async fn logout_user(&self, user: &User) -> Result<(), AppError> {
        self.activity_repo
            .record(&self.pool, Some(user.id), "auth.logout", None)
            .await
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        // Suspensão vale imediatamente, mesmo com token ainda válido
        if user.status != UserStatus::Active {
            return Err(AppError::AccountDisabled);
        }

        Ok(user)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_for(user_id: Uuid) -> Claims {
        let now = Utc::now();
        Claims {
            sub: user_id,
            exp: (now + chrono::Duration::days(7)).timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }

    #[test]
    fn token_round_trip_preserves_subject() {
        let user_id = Uuid::new_v4();
        let token = encode(
            &Header::default(),
            &claims_for(user_id),
            &EncodingKey::from_secret(b"segredo-de-teste"),
        )
        .unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"segredo-de-teste"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, user_id);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = encode(
            &Header::default(),
            &claims_for(Uuid::new_v4()),
            &EncodingKey::from_secret(b"segredo-a"),
        )
        .unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"segredo-b"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn password_verifies_only_against_its_own_hash() {
        // 4 = custo mínimo do bcrypt
        let hashed = hash("senha-correta", 4).unwrap();
        assert!(verify("senha-correta", &hashed).unwrap());
        assert!(!verify("senha-errada", &hashed).unwrap());
    }
}
