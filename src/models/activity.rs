// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Trilha de auditoria: gravada pelos serviços, consultada só por admin
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    #[schema(example = "cash.charge_approved")]
    pub action: String,
    #[schema(example = "Recarga de 50000.00 aprovada")]
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}
