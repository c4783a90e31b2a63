// src/services/user_service.rs

use bcrypt::{hash, verify};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        hierarchy,
        pagination::PageWindow,
    },
    db::{ActivityRepository, UserRepository},
    models::user::{User, UserStatus, UserUpdate},
};

use super::access::{ensure_can_access, scope_of};

/// Código curto exibido no painel e usado como convite (ex.: "U3FA81C02").
pub(crate) fn generate_user_code() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("U{}", id[..8].to_uppercase())
}

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    activity_repo: ActivityRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(user_repo: UserRepository, activity_repo: ActivityRepository, pool: PgPool) -> Self {
        Self { user_repo, activity_repo, pool }
    }

    /// Criação administrativa de usuário. Sem `parent_id` o novo usuário
    /// entra abaixo de quem chamou; com `parent_id` o chamador precisa ter
    /// alcance sobre o pai indicado.
    pub async fn create_child(
        &self,
        caller: &User,
        email: &str,
        password: &str,
        name: &str,
        parent_id: Option<Uuid>,
    ) -> Result<User, AppError> {
        // 1. Resolve o pai do novo usuário
        let parent = match parent_id {
            Some(id) if id != caller.id => {
                let parent = self.user_repo
                    .find_by_id(id)
                    .await?
                    .ok_or(AppError::UserNotFound)?;
                ensure_can_access(&self.user_repo, caller, parent.id).await?;
                parent
            }
            _ => caller.clone(),
        };

        let level = hierarchy::child_level(parent.level);

        // 2. Hashing fora da transação
        let password_clone = password.to_owned();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))?
            ?;

        let user_code = generate_user_code();

        // 3. Usuário + auditoria na mesma transação
        let mut tx = self.pool.begin().await?;

        let new_user = self.user_repo
            .create_user(
                &mut *tx,
                &user_code,
                email,
                &hashed_password,
                name,
                Some(parent.id),
                level,
            )
            .await?;

        self.activity_repo
            .record(
                &mut *tx,
                Some(caller.id),
                "user.created",
                Some(&format!("Criou {} (nível {})", new_user.user_code, new_user.level)),
            )
            .await?;

        tx.commit().await?;

        Ok(new_user)
    }

    pub async fn list_users(
        &self,
        caller: &User,
        level: Option<i32>,
        status: Option<UserStatus>,
        search: Option<&str>,
        window: PageWindow,
    ) -> Result<(Vec<User>, i64), AppError> {
        let scope = scope_of(&self.user_repo, caller).await?;
        self.user_repo
            .list(scope.as_deref(), level, status, search, window)
            .await
    }

    pub async fn get_user(&self, caller: &User, id: Uuid) -> Result<User, AppError> {
        let user = self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        ensure_can_access(&self.user_repo, caller, user.id).await?;
        Ok(user)
    }

    pub async fn children(&self, caller: &User, id: Uuid) -> Result<Vec<User>, AppError> {
        ensure_can_access(&self.user_repo, caller, id).await?;
        self.user_repo.children_of(id).await
    }

    pub async fn update_user(
        &self,
        caller: &User,
        id: Uuid,
        update: &UserUpdate,
    ) -> Result<User, AppError> {
        let target = self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        ensure_can_access(&self.user_repo, caller, target.id).await?;

        // Suspender a própria conta derrubaria o acesso no meio da sessão
        if update.status.is_some() && caller.id == target.id {
            return Err(AppError::InvalidInput(
                "Não é possível alterar o próprio status.".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let updated = self.user_repo
            .update_user(&mut *tx, id, update)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if let Some(status) = update.status {
            self.activity_repo
                .record(
                    &mut *tx,
                    Some(caller.id),
                    "user.status_changed",
                    Some(&format!("{} agora está {:?}", updated.user_code, status)),
                )
                .await?;
        }

        tx.commit().await?;

        Ok(updated)
    }

    /// Troca de senha: o próprio usuário precisa informar a senha atual;
    /// um superior na hierarquia redefine direto (fluxo de recuperação).
    pub async fn change_password(
        &self,
        caller: &User,
        target_id: Uuid,
        current_password: Option<&str>,
        new_password: &str,
    ) -> Result<(), AppError> {
        let target = self.user_repo
            .find_by_id(target_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if caller.id == target.id {
            let current = current_password.ok_or_else(|| {
                AppError::InvalidInput("Senha atual é obrigatória.".to_string())
            })?;

            let current_clone = current.to_owned();
            let hash_clone = target.password_hash.clone();
            let is_valid = tokio::task::spawn_blocking(move || {
                verify(&current_clone, &hash_clone)
            })
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?
                ?;

            if !is_valid {
                return Err(AppError::InvalidCredentials);
            }
        } else {
            ensure_can_access(&self.user_repo, caller, target.id).await?;
        }

        let new_clone = new_password.to_owned();
        let new_hash = tokio::task::spawn_blocking(move || {
            hash(&new_clone, bcrypt::DEFAULT_COST)
        })
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))?
            ?;

        let mut tx = self.pool.begin().await?;

        let updated = self.user_repo
            .update_password(&mut *tx, target.id, &new_hash)
            .await?;
        if !updated {
            return Err(AppError::UserNotFound);
        }

        self.activity_repo
            .record(
                &mut *tx,
                Some(caller.id),
                "user.password_changed",
                Some(&format!("Senha de {} redefinida", target.user_code)),
            )
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

// Evitamos depender do banco aqui; o formato do código é contrato do painel.
#[cfg(test)]
mod tests {
    use super::generate_user_code;

    #[test]
    fn user_code_has_panel_format() {
        let code = generate_user_code();
        assert!(code.starts_with('U'));
        assert_eq!(code.len(), 9);
        assert!(code[1..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn user_codes_are_unique_enough() {
        let a = generate_user_code();
        let b = generate_user_code();
        assert_ne!(a, b);
    }
}
