// src/db/activity_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageWindow},
    models::activity::ActivityLog,
};

#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn record<'e, E>(
        &self,
        executor: E,
        user_id: Option<Uuid>,
        action: &str,
        detail: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO activity_logs (user_id, action, detail) VALUES ($1, $2, $3)",
        )
            .bind(user_id)
            .bind(action)
            .bind(detail)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn list(&self, window: PageWindow) -> Result<(Vec<ActivityLog>, i64), AppError> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT * FROM activity_logs
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(&self.pool)
            .await?;

        Ok((logs, total))
    }
}
