// src/services/announcement_service.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, hierarchy::Role, pagination::PageWindow},
    db::{ActivityRepository, AnnouncementRepository},
    models::{
        announcement::{Announcement, AnnouncementKind, AnnouncementPriority, AnnouncementUpdate},
        user::User,
    },
};

#[derive(Clone)]
pub struct AnnouncementService {
    announcement_repo: AnnouncementRepository,
    activity_repo: ActivityRepository,
    pool: PgPool,
}

impl AnnouncementService {
    pub fn new(
        announcement_repo: AnnouncementRepository,
        activity_repo: ActivityRepository,
        pool: PgPool,
    ) -> Self {
        Self { announcement_repo, activity_repo, pool }
    }

    pub async fn create(
        &self,
        caller: &User,
        title: &str,
        content: &str,
        kind: AnnouncementKind,
        priority: AnnouncementPriority,
        is_pinned: bool,
        target_level: Option<i32>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Announcement, AppError> {
        if let Some(target) = target_level {
            if !(1..=4).contains(&target) {
                return Err(AppError::InvalidInput(
                    "Nível alvo deve estar entre 1 e 4.".to_string(),
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let announcement = self.announcement_repo
            .create(
                &mut *tx,
                title,
                content,
                kind,
                priority,
                is_pinned,
                target_level,
                expires_at,
                caller.id,
            )
            .await?;

        self.activity_repo
            .record(
                &mut *tx,
                Some(caller.id),
                "announcement.created",
                Some(&format!("Aviso \"{}\" publicado", announcement.title)),
            )
            .await?;

        tx.commit().await?;

        Ok(announcement)
    }

    /// Listagem pelo olhar do chamador: administrador vê tudo, inclusive
    /// avisos ocultos e expirados; os demais só o que a audiência permite.
    pub async fn list(
        &self,
        viewer: &User,
        window: PageWindow,
    ) -> Result<(Vec<Announcement>, i64), AppError> {
        let viewer_level = match viewer.role() {
            Role::Admin => None,
            _ => Some(viewer.level),
        };
        self.announcement_repo.list(viewer_level, window).await
    }

    /// Detalhe do aviso; cada leitura conta uma visualização.
    pub async fn read(&self, viewer: &User, id: Uuid) -> Result<Announcement, AppError> {
        let announcement = self.announcement_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::AnnouncementNotFound)?;

        // Fora da audiência o aviso simplesmente não existe
        if viewer.role() != Role::Admin && !announcement.visible_to(viewer.level, Utc::now()) {
            return Err(AppError::AnnouncementNotFound);
        }

        self.announcement_repo
            .increment_views(&self.pool, id)
            .await?
            .ok_or(AppError::AnnouncementNotFound)
    }

    pub async fn update(
        &self,
        caller: &User,
        id: Uuid,
        update: &AnnouncementUpdate,
    ) -> Result<Announcement, AppError> {
        if let Some(Some(target)) = update.target_level {
            if !(1..=4).contains(&target) {
                return Err(AppError::InvalidInput(
                    "Nível alvo deve estar entre 1 e 4.".to_string(),
                ));
            }
        }

        let mut tx = self.pool.begin().await?;

        let announcement = self.announcement_repo
            .update(&mut *tx, id, update)
            .await?
            .ok_or(AppError::AnnouncementNotFound)?;

        self.activity_repo
            .record(
                &mut *tx,
                Some(caller.id),
                "announcement.updated",
                Some(&format!("Aviso \"{}\" alterado", announcement.title)),
            )
            .await?;

        tx.commit().await?;

        Ok(announcement)
    }

    pub async fn delete(&self, caller: &User, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = self.announcement_repo.delete(&mut *tx, id).await?;
        if !deleted {
            return Err(AppError::AnnouncementNotFound);
        }

        self.activity_repo
            .record(&mut *tx, Some(caller.id), "announcement.deleted", None)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}
