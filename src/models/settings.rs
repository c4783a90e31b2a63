// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    #[serde(skip_serializing)]
    #[schema(ignore)] // Chave interna da linha única, irrelevante para o cliente
    pub id: bool,

    #[schema(example = "SlotDesk")]
    pub site_name: String,

    #[schema(example = "suporte@slotdesk.io")]
    pub support_email: String,

    #[schema(example = false)]
    pub maintenance_mode: bool,

    #[schema(example = "100000.00")]
    pub default_slot_price: Decimal,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "SlotDesk")]
    pub site_name: Option<String>,

    #[schema(example = "suporte@slotdesk.io")]
    pub support_email: Option<String>,

    #[schema(example = false)]
    pub maintenance_mode: Option<bool>,

    #[schema(example = "120000.00")]
    pub default_slot_price: Option<Decimal>,
}
