// src/models/cash.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "charge_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum ChargeStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "cash_entry_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum CashEntryType {
    Charge,
    Withdrawal,
    Payment,
    Refund,
    Bonus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "balance_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum BalanceKind {
    Paid,
    Free,
}

// Decisão do administrador sobre uma solicitação de recarga
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChargeDecision {
    Approve,
    Reject,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "50000.00")]
    pub amount: Decimal,
    pub status: ChargeStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<Uuid>,
    pub reject_reason: Option<String>,
}

// Listagem administrativa: a solicitação acompanhada de quem pediu
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequestWithUser {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub request: ChargeRequest,
    #[schema(example = "Maria Silva")]
    pub user_name: String,
    #[schema(example = "U7F3A9C21")]
    pub user_code: String,
}

// Extrato: linha imutável do histórico financeiro
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_type: CashEntryType,
    #[schema(example = "50000.00")]
    pub amount: Decimal,
    #[schema(example = "125000.00")]
    pub balance_after: Decimal,
    pub balance_type: BalanceKind,
    #[schema(example = "cash charge")]
    pub description: String,
    pub request_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserBalance {
    pub user_id: Uuid,
    pub cash_balance: Decimal,
    pub point_balance: Decimal,
    pub updated_at: DateTime<Utc>,
}

// Saldo exposto pela API: o total nunca é armazenado, sempre recalculado
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub user_id: Uuid,
    #[schema(example = "125000.00")]
    pub cash_balance: Decimal,
    #[schema(example = "0.00")]
    pub point_balance: Decimal,
    #[schema(example = "125000.00")]
    pub total: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl From<UserBalance> for BalanceResponse {
    fn from(balance: UserBalance) -> Self {
        Self {
            user_id: balance.user_id,
            cash_balance: balance.cash_balance,
            point_balance: balance.point_balance,
            total: balance.cash_balance + balance.point_balance,
            updated_at: balance.updated_at,
        }
    }
}

// Agregados financeiros do escopo do chamador (admin = plataforma inteira)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashStatistics {
    #[schema(example = "1250000.00")]
    pub total_charged: Decimal,
    #[schema(example = "80000.00")]
    pub pending_amount: Decimal,
    #[schema(example = 4)]
    pub pending_count: i64,
    #[schema(example = 37)]
    pub approved_count: i64,
    #[schema(example = 2)]
    pub rejected_count: i64,
    #[schema(example = "310000.00")]
    pub total_cash_balance: Decimal,
    #[schema(example = "0.00")]
    pub total_point_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    #[test]
    fn balance_total_is_cash_plus_point() {
        let balance = UserBalance {
            user_id: Uuid::new_v4(),
            cash_balance: Decimal::new(12_345, 2),
            point_balance: Decimal::new(655, 2),
            updated_at: Utc::now(),
        };
        let response = BalanceResponse::from(balance);
        assert_eq!(response.total, Decimal::new(13_000, 2));
    }
}
