// src/db/announcement_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageWindow},
    models::announcement::{
        Announcement, AnnouncementKind, AnnouncementPriority, AnnouncementUpdate,
    },
};

#[derive(Clone)]
pub struct AnnouncementRepository {
    pool: PgPool,
}

impl AnnouncementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        title: &str,
        content: &str,
        kind: AnnouncementKind,
        priority: AnnouncementPriority,
        is_pinned: bool,
        target_level: Option<i32>,
        expires_at: Option<DateTime<Utc>>,
        created_by: Uuid,
    ) -> Result<Announcement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let announcement = sqlx::query_as::<_, Announcement>(
            r#"
            INSERT INTO announcements
                (title, content, kind, priority, is_pinned, target_level, expires_at, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
            .bind(title)
            .bind(content)
            .bind(kind)
            .bind(priority)
            .bind(is_pinned)
            .bind(target_level)
            .bind(expires_at)
            .bind(created_by)
            .fetch_one(executor)
            .await?;
        Ok(announcement)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>, AppError> {
        let announcement = sqlx::query_as::<_, Announcement>(
            "SELECT * FROM announcements WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(announcement)
    }

    // Leitura do detalhe: o contador sobe de forma atômica na própria linha
    pub async fn increment_views<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Announcement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let announcement = sqlx::query_as::<_, Announcement>(
            r#"
            UPDATE announcements SET view_count = view_count + 1
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(announcement)
    }

    // `viewer_level = None` é a visão administrativa: sem filtro de audiência.
    // Para os demais valem visibilidade, validade e nível alvo; fixados primeiro.
    pub async fn list(
        &self,
        viewer_level: Option<i32>,
        window: PageWindow,
    ) -> Result<(Vec<Announcement>, i64), AppError> {
        const FILTER: &str = r#"
            WHERE ($1::int IS NULL OR (
                is_visible = TRUE
                AND (expires_at IS NULL OR expires_at > NOW())
                AND (target_level IS NULL OR $1 >= target_level)
            ))
        "#;

        let list_sql = format!(
            r#"
            SELECT * FROM announcements
            {FILTER}
            ORDER BY is_pinned DESC, created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );
        let announcements = sqlx::query_as::<_, Announcement>(&list_sql)
            .bind(viewer_level)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM announcements {FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(viewer_level)
            .fetch_one(&self.pool)
            .await?;

        Ok((announcements, total))
    }

    // Lista fechada de campos; target_level/expires_at aceitam limpar (NULL),
    // então entram como par (mexe? valor) em vez de COALESCE.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        update: &AnnouncementUpdate,
    ) -> Result<Option<Announcement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let announcement = sqlx::query_as::<_, Announcement>(
            r#"
            UPDATE announcements SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                kind = COALESCE($4::announcement_kind, kind),
                priority = COALESCE($5::announcement_priority, priority),
                is_pinned = COALESCE($6, is_pinned),
                is_visible = COALESCE($7, is_visible),
                target_level = CASE WHEN $8 THEN $9 ELSE target_level END,
                expires_at = CASE WHEN $10 THEN $11 ELSE expires_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(update.title.as_deref())
            .bind(update.content.as_deref())
            .bind(update.kind)
            .bind(update.priority)
            .bind(update.is_pinned)
            .bind(update.is_visible)
            .bind(update.target_level.is_some())
            .bind(update.target_level.flatten())
            .bind(update.expires_at.is_some())
            .bind(update.expires_at.flatten())
            .fetch_optional(executor)
            .await?;
        Ok(announcement)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
