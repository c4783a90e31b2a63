// src/db/cash_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageWindow},
    models::cash::{
        BalanceKind, CashEntryType, CashHistoryEntry, CashStatistics, ChargeRequest,
        ChargeRequestWithUser, ChargeStatus, UserBalance,
    },
};

#[derive(Clone)]
pub struct CashRepository {
    pool: PgPool,
}

impl CashRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_request<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        amount: Decimal,
    ) -> Result<ChargeRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, ChargeRequest>(
            r#"
            INSERT INTO charge_requests (user_id, amount)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
            .bind(user_id)
            .bind(amount)
            .fetch_one(executor)
            .await?;
        Ok(request)
    }

    // Tranca a linha da solicitação até o fim da transação.
    // É isso que serializa duas aprovações simultâneas do mesmo pedido.
    pub async fn find_request_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<ChargeRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, ChargeRequest>(
            "SELECT * FROM charge_requests WHERE id = $1 FOR UPDATE",
        )
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(request)
    }

    pub async fn mark_processed<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ChargeStatus,
        processed_by: Uuid,
        reject_reason: Option<&str>,
    ) -> Result<ChargeRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, ChargeRequest>(
            r#"
            UPDATE charge_requests SET
                status = $2,
                processed_at = NOW(),
                processed_by = $3,
                reject_reason = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(status)
            .bind(processed_by)
            .bind(reject_reason)
            .fetch_one(executor)
            .await?;
        Ok(request)
    }

    // Upsert do saldo: cria no primeiro crédito, depois só soma.
    // O ON CONFLICT soma em cima do valor atual da linha, nunca sobrescreve.
    pub async fn upsert_balance_add_cash<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        amount: Decimal,
    ) -> Result<UserBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, UserBalance>(
            r#"
            INSERT INTO user_balances (user_id, cash_balance)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET
                cash_balance = user_balances.cash_balance + EXCLUDED.cash_balance,
                updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(user_id)
            .bind(amount)
            .fetch_one(executor)
            .await?;
        Ok(balance)
    }

    pub async fn append_history<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        entry_type: CashEntryType,
        amount: Decimal,
        balance_after: Decimal,
        balance_type: BalanceKind,
        description: &str,
        request_id: Option<Uuid>,
    ) -> Result<CashHistoryEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, CashHistoryEntry>(
            r#"
            INSERT INTO cash_history
                (user_id, entry_type, amount, balance_after, balance_type, description, request_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
            .bind(user_id)
            .bind(entry_type)
            .bind(amount)
            .bind(balance_after)
            .bind(balance_type)
            .bind(description)
            .bind(request_id)
            .fetch_one(executor)
            .await?;
        Ok(entry)
    }

    pub async fn get_balance(&self, user_id: Uuid) -> Result<Option<UserBalance>, AppError> {
        let balance = sqlx::query_as::<_, UserBalance>(
            "SELECT * FROM user_balances WHERE user_id = $1",
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(balance)
    }

    pub async fn list_requests(
        &self,
        scope: Option<&[Uuid]>,
        status: Option<ChargeStatus>,
        window: PageWindow,
    ) -> Result<(Vec<ChargeRequestWithUser>, i64), AppError> {
        const FILTER: &str = r#"
            FROM charge_requests cr
            JOIN users u ON u.id = cr.user_id
            WHERE ($1::uuid[] IS NULL OR cr.user_id = ANY($1))
              AND ($2::charge_status IS NULL OR cr.status = $2)
        "#;

        let list_sql = format!(
            r#"
            SELECT cr.*, u.name AS user_name, u.user_code
            {FILTER}
            ORDER BY cr.requested_at DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let requests = sqlx::query_as::<_, ChargeRequestWithUser>(&list_sql)
            .bind(scope)
            .bind(status)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) {FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(scope)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok((requests, total))
    }

    pub async fn list_history(
        &self,
        scope: Option<&[Uuid]>,
        entry_type: Option<CashEntryType>,
        window: PageWindow,
    ) -> Result<(Vec<CashHistoryEntry>, i64), AppError> {
        const FILTER: &str = r#"
            FROM cash_history
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
              AND ($2::cash_entry_type IS NULL OR entry_type = $2)
        "#;

        let list_sql = format!(
            "SELECT * {FILTER} ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
        let entries = sqlx::query_as::<_, CashHistoryEntry>(&list_sql)
            .bind(scope)
            .bind(entry_type)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) {FILTER}");
        let total = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(scope)
            .bind(entry_type)
            .fetch_one(&self.pool)
            .await?;

        Ok((entries, total))
    }

    // Agregados do financeiro em uma transação só (snapshot consistente)
    pub async fn statistics<'e, E>(
        &self,
        executor: E,
        scope: Option<&[Uuid]>,
    ) -> Result<CashStatistics, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A. Somas por situação da solicitação
        let (total_charged, pending_amount) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE status = 'APPROVED'), 0),
                COALESCE(SUM(amount) FILTER (WHERE status = 'PENDING'), 0)
            FROM charge_requests
            WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
            "#,
        )
            .bind(scope)
            .fetch_one(&mut *tx)
            .await?;

        // B. Contagens por situação
        let (pending_count, approved_count, rejected_count) =
            sqlx::query_as::<_, (i64, i64, i64)>(
                r#"
                SELECT
                    COUNT(*) FILTER (WHERE status = 'PENDING'),
                    COUNT(*) FILTER (WHERE status = 'APPROVED'),
                    COUNT(*) FILTER (WHERE status = 'REJECTED')
                FROM charge_requests
                WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
                "#,
            )
                .bind(scope)
                .fetch_one(&mut *tx)
                .await?;

        // C. Saldos somados do escopo
        let (total_cash_balance, total_point_balance) =
            sqlx::query_as::<_, (Decimal, Decimal)>(
                r#"
                SELECT
                    COALESCE(SUM(cash_balance), 0),
                    COALESCE(SUM(point_balance), 0)
                FROM user_balances
                WHERE ($1::uuid[] IS NULL OR user_id = ANY($1))
                "#,
            )
                .bind(scope)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(CashStatistics {
            total_charged,
            pending_amount,
            pending_count,
            approved_count,
            rejected_count,
            total_cash_balance,
            total_point_balance,
        })
    }
}
