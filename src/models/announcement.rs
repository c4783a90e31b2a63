// src/models/announcement.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "announcement_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementKind {
    Notice,
    Event,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "announcement_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementPriority {
    Low,
    Normal,
    High,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    #[schema(example = "Manutenção programada no sábado")]
    pub title: String,
    #[schema(example = "O painel ficará indisponível das 02h às 04h.")]
    pub content: String,
    pub kind: AnnouncementKind,
    pub priority: AnnouncementPriority,
    pub is_pinned: bool,
    pub is_visible: bool,
    // NULL = todos; caso contrário visível para quem tem level >= target_level
    #[schema(example = 4)]
    pub target_level: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    #[schema(example = 128)]
    pub view_count: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Regra de audiência usada pela listagem (admin ignora esta regra).
    pub fn visible_to(&self, level: i32, now: DateTime<Utc>) -> bool {
        if !self.is_visible {
            return false;
        }
        if let Some(expires_at) = self.expires_at {
            if expires_at <= now {
                return false;
            }
        }
        match self.target_level {
            None => true,
            Some(target) => level >= target,
        }
    }
}

// Campos permitidos no PUT /api/announcements/{id}
#[derive(Debug, Default, Clone)]
pub struct AnnouncementUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub kind: Option<AnnouncementKind>,
    pub priority: Option<AnnouncementPriority>,
    pub is_pinned: Option<bool>,
    pub is_visible: Option<bool>,
    pub target_level: Option<Option<i32>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(target_level: Option<i32>, expires_in: Option<i64>) -> Announcement {
        let now = Utc::now();
        Announcement {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            kind: AnnouncementKind::Notice,
            priority: AnnouncementPriority::Normal,
            is_pinned: false,
            is_visible: true,
            target_level,
            expires_at: expires_in.map(|h| now + Duration::hours(h)),
            view_count: 0,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn untargeted_announcement_reaches_everyone() {
        let a = sample(None, None);
        let now = Utc::now();
        for level in 1..=4 {
            assert!(a.visible_to(level, now));
        }
    }

    #[test]
    fn target_level_hides_from_higher_tiers() {
        // Direcionado ao nível 4: distribuidores e agências não veem
        let a = sample(Some(4), None);
        let now = Utc::now();
        assert!(a.visible_to(4, now));
        assert!(!a.visible_to(3, now));
        assert!(!a.visible_to(2, now));
    }

    #[test]
    fn expired_announcement_is_hidden() {
        let a = sample(None, Some(-1));
        assert!(!a.visible_to(4, Utc::now()));
    }

    #[test]
    fn invisible_flag_wins() {
        let mut a = sample(None, None);
        a.is_visible = false;
        assert!(!a.visible_to(4, Utc::now()));
    }
}
