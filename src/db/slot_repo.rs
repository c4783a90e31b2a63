// src/db/slot_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageWindow},
    models::slot::{
        RankChange, Slot, SlotCategory, SlotRanking, SlotStatus, SlotUpdate, SlotWorkType,
    },
};

// Colunas derivadas das datas: calculadas em TODO SELECT para nunca
// divergirem do intervalo contratado (não existem como colunas físicas).
const DERIVED_DAYS: &str = r#"
    (end_date - start_date + 1) AS duration_days,
    GREATEST(end_date - CURRENT_DATE + 1, 0) AS remaining_days
"#;

#[derive(Clone)]
pub struct SlotRepository {
    pool: PgPool,
}

impl SlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        slot_code: &str,
        name: &str,
        keyword: &str,
        url: &str,
        category: SlotCategory,
        work_type: SlotWorkType,
        assigned_to: Uuid,
        assigned_by: Uuid,
        price: Decimal,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
    ) -> Result<Slot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO slots
                (slot_code, name, keyword, url, category, work_type,
                 assigned_to, assigned_by, price, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *, {DERIVED_DAYS}
            "#
        );
        let slot = sqlx::query_as::<_, Slot>(&sql)
            .bind(slot_code)
            .bind(name)
            .bind(keyword)
            .bind(url)
            .bind(category)
            .bind(work_type)
            .bind(assigned_to)
            .bind(assigned_by)
            .bind(price)
            .bind(start_date)
            .bind(end_date)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        if let Some(constraint) = db_err.constraint() {
                            return AppError::UniqueConstraintViolation(constraint.to_string());
                        }
                    }
                }
                e.into()
            })?;
        Ok(slot)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Slot>, AppError> {
        let sql = format!("SELECT *, {DERIVED_DAYS} FROM slots WHERE id = $1");
        let slot = sqlx::query_as::<_, Slot>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(slot)
    }

    // Versão com trava de linha: serializa gravações de ranking do mesmo slot
    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Slot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT *, {DERIVED_DAYS} FROM slots WHERE id = $1 FOR UPDATE");
        let slot = sqlx::query_as::<_, Slot>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(slot)
    }

    pub async fn list(
        &self,
        scope: Option<&[Uuid]>,
        status: Option<SlotStatus>,
        search: Option<&str>,
        window: PageWindow,
    ) -> Result<(Vec<Slot>, i64), AppError> {
        const FILTER: &str = r#"
            WHERE ($1::uuid[] IS NULL OR assigned_to = ANY($1))
              AND ($2::slot_status IS NULL OR status = $2)
              AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%'
                   OR keyword ILIKE '%' || $3 || '%'
                   OR slot_code ILIKE '%' || $3 || '%')
        "#;

        let list_sql = format!(
            r#"
            SELECT *, {DERIVED_DAYS}
            FROM slots
            {FILTER}
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#
        );
        let slots = sqlx::query_as::<_, Slot>(&list_sql)
            .bind(scope)
            .bind(status)
            .bind(search)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM slots {FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(scope)
            .bind(status)
            .bind(search)
            .fetch_one(&self.pool)
            .await?;

        Ok((slots, total))
    }

    // Atualização com lista fechada de campos. Atribuição (assigned_to/by/at)
    // fica de fora de propósito: é definida na criação e nunca muda.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        update: &SlotUpdate,
    ) -> Result<Option<Slot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE slots SET
                name = COALESCE($2, name),
                keyword = COALESCE($3, keyword),
                url = COALESCE($4, url),
                category = COALESCE($5::slot_category, category),
                work_type = COALESCE($6::slot_work_type, work_type),
                status = COALESCE($7::slot_status, status),
                price = COALESCE($8, price),
                start_date = COALESCE($9, start_date),
                end_date = COALESCE($10, end_date),
                progress = COALESCE($11, progress),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *, {DERIVED_DAYS}
            "#
        );
        let slot = sqlx::query_as::<_, Slot>(&sql)
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.keyword.as_deref())
            .bind(update.url.as_deref())
            .bind(update.category)
            .bind(update.work_type)
            .bind(update.status)
            .bind(update.price)
            .bind(update.start_date)
            .bind(update.end_date)
            .bind(update.progress)
            .fetch_optional(executor)
            .await?;
        Ok(slot)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM slots WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Observação mais recente; o desempate por id cobre duas no mesmo instante
    pub async fn latest_ranking<'e, E>(
        &self,
        executor: E,
        slot_id: Uuid,
    ) -> Result<Option<SlotRanking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ranking = sqlx::query_as::<_, SlotRanking>(
            r#"
            SELECT * FROM slot_rankings
            WHERE slot_id = $1
            ORDER BY recorded_at DESC, id DESC
            LIMIT 1
            "#,
        )
            .bind(slot_id)
            .fetch_optional(executor)
            .await?;
        Ok(ranking)
    }

    pub async fn insert_ranking<'e, E>(
        &self,
        executor: E,
        slot_id: Uuid,
        rank: i32,
        previous_rank: Option<i32>,
        change: RankChange,
    ) -> Result<SlotRanking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ranking = sqlx::query_as::<_, SlotRanking>(
            r#"
            INSERT INTO slot_rankings (slot_id, rank, previous_rank, change)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
            .bind(slot_id)
            .bind(rank)
            .bind(previous_rank)
            .bind(change)
            .fetch_one(executor)
            .await?;
        Ok(ranking)
    }

    // Histórico recente para a tela de tendência
    pub async fn rankings_of(&self, slot_id: Uuid, limit: i64) -> Result<Vec<SlotRanking>, AppError> {
        let rankings = sqlx::query_as::<_, SlotRanking>(
            r#"
            SELECT * FROM slot_rankings
            WHERE slot_id = $1
            ORDER BY recorded_at DESC, id DESC
            LIMIT $2
            "#,
        )
            .bind(slot_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rankings)
    }
}
