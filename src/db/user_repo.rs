// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageWindow},
    models::user::{User, UserStatus, UserUpdate},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1",
        )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca pelo código curto (usado no convite do registro)
    pub async fn find_by_code(&self, user_code: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE user_code = $1",
        )
            .bind(user_code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário no banco de dados
    // Com tratamento de erro específico para e-mails duplicados.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        user_code: &str,
        email: &str,
        password_hash: &str,
        name: &str,
        parent_id: Option<Uuid>,
        level: i32,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_code, email, password_hash, name, parent_id, level)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
            .bind(user_code)
            .bind(email)
            .bind(password_hash)
            .bind(name)
            .bind(parent_id)
            .bind(level)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        if let Some(constraint) = db_err.constraint() {
                            return match constraint {
                                // O nome padrão que o Postgres cria para "UNIQUE" na coluna email
                                "users_email_key" => AppError::EmailAlreadyExists,

                                // Fallback (user_code e outras chaves únicas)
                                _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                            };
                        }
                    }
                }
                e.into()
            })?;

        Ok(user)
    }

    /// Cadeia de ancestrais de um usuário, do pai para cima.
    /// O limite de profundidade protege contra ciclos acidentais no parent_id.
    pub async fn ancestor_chain(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let chain = sqlx::query_scalar::<_, Uuid>(
            r#"
            WITH RECURSIVE ancestors AS (
                SELECT parent_id, 1 AS depth
                FROM users
                WHERE id = $1
                UNION ALL
                SELECT u.parent_id, a.depth + 1
                FROM users u
                JOIN ancestors a ON u.id = a.parent_id
                WHERE a.depth < 8
            )
            SELECT parent_id
            FROM ancestors
            WHERE parent_id IS NOT NULL
            ORDER BY depth
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(chain)
    }

    /// IDs dos descendentes de `root` até `max_depth` saltos (sem incluir o root).
    pub async fn descendant_ids(&self, root: Uuid, max_depth: i32) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            WITH RECURSIVE subtree AS (
                SELECT id, 0 AS depth FROM users WHERE id = $1
                UNION ALL
                SELECT u.id, s.depth + 1
                FROM users u
                JOIN subtree s ON u.parent_id = s.id
                WHERE s.depth < $2
            )
            SELECT id FROM subtree WHERE depth > 0
            "#,
        )
            .bind(root)
            .bind(max_depth)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    // Listagem paginada. `scope = None` significa sem recorte (admin vê tudo);
    // os filtros opcionais entram como binds nulos, nunca como SQL montado à mão.
    pub async fn list(
        &self,
        scope: Option<&[Uuid]>,
        level: Option<i32>,
        status: Option<UserStatus>,
        search: Option<&str>,
        window: PageWindow,
    ) -> Result<(Vec<User>, i64), AppError> {
        const FILTER: &str = r#"
            WHERE ($1::uuid[] IS NULL OR id = ANY($1))
              AND ($2::int IS NULL OR level = $2)
              AND ($3::user_status IS NULL OR status = $3)
              AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%'
                   OR email ILIKE '%' || $4 || '%'
                   OR user_code ILIKE '%' || $4 || '%')
        "#;

        let list_sql = format!(
            "SELECT * FROM users {FILTER} ORDER BY created_at DESC LIMIT $5 OFFSET $6"
        );
        let users = sqlx::query_as::<_, User>(&list_sql)
            .bind(scope)
            .bind(level)
            .bind(status)
            .bind(search)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM users {FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(scope)
            .bind(level)
            .bind(status)
            .bind(search)
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total))
    }

    // Filhos diretos de um usuário
    pub async fn children_of(&self, parent_id: Uuid) -> Result<Vec<User>, AppError> {
        let children = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE parent_id = $1 ORDER BY created_at DESC",
        )
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(children)
    }

    // Atualização com lista fechada de campos (COALESCE mantém o valor atual)
    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        update: &UserUpdate,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                status = COALESCE($4::user_status, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.email.as_deref())
            .bind(update.status)
            .fetch_optional(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        if db_err.constraint() == Some("users_email_key") {
                            return AppError::EmailAlreadyExists;
                        }
                    }
                }
                e.into()
            })?;

        Ok(user)
    }

    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        new_hash: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
            .bind(id)
            .bind(new_hash)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
