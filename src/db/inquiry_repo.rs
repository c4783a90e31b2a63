// src/db/inquiry_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageWindow},
    models::inquiry::{Inquiry, InquiryMessage, InquiryPriority, InquiryStatus, SenderKind},
};

#[derive(Clone)]
pub struct InquiryRepository {
    pool: PgPool,
}

impl InquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_inquiry<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        title: &str,
        priority: InquiryPriority,
    ) -> Result<Inquiry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inquiry = sqlx::query_as::<_, Inquiry>(
            r#"
            INSERT INTO inquiries (user_id, title, priority)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
            .bind(user_id)
            .bind(title)
            .bind(priority)
            .fetch_one(executor)
            .await?;
        Ok(inquiry)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Inquiry>, AppError> {
        let inquiry = sqlx::query_as::<_, Inquiry>(
            "SELECT * FROM inquiries WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(inquiry)
    }

    // Trava o chamado: é o que garante que só o primeiro admin a responder
    // assume o atendimento quando duas respostas chegam juntas.
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Inquiry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inquiry = sqlx::query_as::<_, Inquiry>(
            "SELECT * FROM inquiries WHERE id = $1 FOR UPDATE",
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(inquiry)
    }

    pub async fn list(
        &self,
        scope: Option<&[Uuid]>,
        status: Option<InquiryStatus>,
        window: PageWindow,
    ) -> Result<(Vec<Inquiry>, i64), AppError> {
        const FILTER: &str = r#"
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
              AND ($2::inquiry_status IS NULL OR status = $2)
        "#;

        let list_sql = format!(
            r#"
            SELECT * FROM inquiries
            {FILTER}
            ORDER BY last_message_at DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let inquiries = sqlx::query_as::<_, Inquiry>(&list_sql)
            .bind(scope)
            .bind(status)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM inquiries {FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(scope)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok((inquiries, total))
    }

    pub async fn messages_of(&self, inquiry_id: Uuid) -> Result<Vec<InquiryMessage>, AppError> {
        let messages = sqlx::query_as::<_, InquiryMessage>(
            r#"
            SELECT * FROM inquiry_messages
            WHERE inquiry_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
            .bind(inquiry_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(messages)
    }

    pub async fn add_message<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
        sender_id: Uuid,
        sender_type: SenderKind,
        content: &str,
    ) -> Result<InquiryMessage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let message = sqlx::query_as::<_, InquiryMessage>(
            r#"
            INSERT INTO inquiry_messages (inquiry_id, sender_id, sender_type, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
            .bind(inquiry_id)
            .bind(sender_id)
            .bind(sender_type)
            .bind(content)
            .fetch_one(executor)
            .await?;
        Ok(message)
    }

    // Primeira resposta de admin: assume o chamado e move para IN_PROGRESS.
    // O WHERE assigned_admin IS NULL é a barreira contra reatribuição.
    pub async fn claim_unassigned<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
        admin_id: Uuid,
    ) -> Result<Option<Inquiry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inquiry = sqlx::query_as::<_, Inquiry>(
            r#"
            UPDATE inquiries SET
                assigned_admin = $2,
                status = 'IN_PROGRESS'
            WHERE id = $1 AND assigned_admin IS NULL
            RETURNING *
            "#,
        )
            .bind(inquiry_id)
            .bind(admin_id)
            .fetch_optional(executor)
            .await?;
        Ok(inquiry)
    }

    pub async fn touch_last_message<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE inquiries SET last_message_at = NOW() WHERE id = $1")
            .bind(inquiry_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // Entrar em RESOLVED/CLOSED carimba resolved_at; sair deles mantém o carimbo
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
        status: InquiryStatus,
    ) -> Result<Option<Inquiry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inquiry = sqlx::query_as::<_, Inquiry>(
            r#"
            UPDATE inquiries SET
                status = $2,
                resolved_at = CASE WHEN $3 THEN NOW() ELSE resolved_at END
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(inquiry_id)
            .bind(status)
            .bind(status.is_settled())
            .fetch_optional(executor)
            .await?;
        Ok(inquiry)
    }

    // Efeito colateral da leitura do detalhe: marca como lidas as mensagens
    // do outro lado da conversa.
    pub async fn mark_side_read<'e, E>(
        &self,
        executor: E,
        inquiry_id: Uuid,
        side: SenderKind,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE inquiry_messages SET
                is_read = TRUE,
                read_at = NOW()
            WHERE inquiry_id = $1 AND sender_type = $2 AND is_read = FALSE
            "#,
        )
            .bind(inquiry_id)
            .bind(side)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
