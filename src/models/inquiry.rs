// src/models/inquiry.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inquiry_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl InquiryStatus {
    /// RESOLVED/CLOSED carimbam `resolved_at`; sair deles não limpa o carimbo.
    pub fn is_settled(&self) -> bool {
        matches!(self, InquiryStatus::Resolved | InquiryStatus::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "inquiry_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum InquiryPriority {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sender_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum SenderKind {
    User,
    Admin,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Slot sem atualizar o ranking")]
    pub title: String,
    pub status: InquiryStatus,
    pub priority: InquiryPriority,
    pub assigned_admin: Option<Uuid>,
    pub last_message_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryMessage {
    pub id: Uuid,
    pub inquiry_id: Uuid,
    pub sender_id: Uuid,
    pub sender_type: SenderKind,
    #[schema(example = "O ranking parou de atualizar ontem à noite.")]
    pub content: String,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// Detalhe do chamado: cabeçalho + conversa completa
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InquiryDetail {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub messages: Vec<InquiryMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settled_states_are_resolved_and_closed() {
        assert!(InquiryStatus::Resolved.is_settled());
        assert!(InquiryStatus::Closed.is_settled());
        assert!(!InquiryStatus::Open.is_settled());
        assert!(!InquiryStatus::InProgress.is_settled());
    }
}
