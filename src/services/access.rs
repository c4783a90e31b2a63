// src/services/access.rs
// Helpers de autorização hierárquica compartilhados pelos serviços.
// A decisão em si é pura (common::hierarchy); aqui só carregamos os dados.

use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::hierarchy::{self, Role};
use crate::db::UserRepository;
use crate::models::user::User;

/// Verifica se `caller` pode operar sobre um recurso cujo dono é `owner_id`.
/// Carrega a cadeia de ancestrais do dono e delega à regra de alcance.
pub async fn can_access(
    user_repo: &UserRepository,
    caller: &User,
    owner_id: Uuid,
) -> Result<bool, AppError> {
    let chain = user_repo.ancestor_chain(owner_id).await?;
    Ok(hierarchy::can_access(caller.level, caller.id, owner_id, &chain))
}

/// Variante que transforma a negativa em `Forbidden` direto.
pub async fn ensure_can_access(
    user_repo: &UserRepository,
    caller: &User,
    owner_id: Uuid,
) -> Result<(), AppError> {
    if can_access(user_repo, caller, owner_id).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Monta o escopo de listagem do usuário: `None` significa sem filtro
/// (administrador enxerga tudo); caso contrário, o próprio usuário mais os
/// descendentes dentro do alcance do nível dele.
pub async fn scope_of(
    user_repo: &UserRepository,
    caller: &User,
) -> Result<Option<Vec<Uuid>>, AppError> {
    if caller.role() == Role::Admin {
        return Ok(None);
    }

    let reach = hierarchy::reach_of(caller.level);
    let mut ids = vec![caller.id];
    if reach > 0 {
        ids.extend(user_repo.descendant_ids(caller.id, reach as i32).await?);
    }
    Ok(Some(ids))
}
