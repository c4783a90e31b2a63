// src/models/slot.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "slot_category", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum SlotCategory {
    Place,
    Shopping,
    Blog,
    App,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "slot_work_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum SlotWorkType {
    Traffic,
    Save,
    Review,
    Ranking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "slot_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rank_change", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum RankChange {
    Up,
    Down,
    Stable,
    New,
}

impl RankChange {
    /// Classifica a posição observada contra a anterior.
    /// Número menor = posição melhor, então cair no número é subir no ranking.
    pub fn classify(current: i32, previous: Option<i32>) -> Self {
        match previous {
            None => RankChange::New,
            Some(prev) if current < prev => RankChange::Up,
            Some(prev) if current > prev => RankChange::Down,
            Some(_) => RankChange::Stable,
        }
    }
}

// --- Structs ---

// Slot vindo do banco. `duration_days`/`remaining_days` não existem como
// colunas: todo SELECT os deriva das datas, então nunca ficam defasados.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: Uuid,
    #[schema(example = "SLT-4B9F21A0")]
    pub slot_code: String,
    #[schema(example = "Campanha Loja Centro")]
    pub name: String,
    #[schema(example = "restaurante centro sp")]
    pub keyword: String,
    #[schema(example = "https://loja.exemplo.com")]
    pub url: String,
    pub category: SlotCategory,
    pub work_type: SlotWorkType,
    pub assigned_to: Uuid,
    pub assigned_by: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub status: SlotStatus,
    #[schema(example = "150000.00")]
    pub price: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(example = 30)]
    pub duration_days: i32,
    #[schema(example = 12)]
    pub remaining_days: i32,
    #[schema(example = 45)]
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotRanking {
    pub id: Uuid,
    pub slot_id: Uuid,
    #[schema(example = 5)]
    pub rank: i32,
    #[schema(example = 10)]
    pub previous_rank: Option<i32>,
    pub change: RankChange,
    pub recorded_at: DateTime<Utc>,
}

// Detalhe do slot: cabeçalho + histórico recente de ranking
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotDetail {
    #[serde(flatten)]
    pub slot: Slot,
    pub rankings: Vec<SlotRanking>,
}

// Campos permitidos no PUT /api/slots/{id}: o dono mexe em andamento,
// a hierarquia que atribuiu mexe nos metadados. Atribuição é imutável.
#[derive(Debug, Default, Clone)]
pub struct SlotUpdate {
    pub name: Option<String>,
    pub keyword: Option<String>,
    pub url: Option<String>,
    pub category: Option<SlotCategory>,
    pub work_type: Option<SlotWorkType>,
    pub status: Option<SlotStatus>,
    pub price: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_is_new() {
        assert_eq!(RankChange::classify(7, None), RankChange::New);
    }

    #[test]
    fn lower_number_means_up() {
        assert_eq!(RankChange::classify(5, Some(10)), RankChange::Up);
    }

    #[test]
    fn higher_number_means_down() {
        assert_eq!(RankChange::classify(15, Some(10)), RankChange::Down);
    }

    #[test]
    fn equal_rank_is_stable() {
        assert_eq!(RankChange::classify(10, Some(10)), RankChange::Stable);
    }
}
