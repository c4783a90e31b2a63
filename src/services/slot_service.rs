// src/services/slot_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, hierarchy::Role, pagination::PageWindow},
    db::{ActivityRepository, SettingsRepository, SlotRepository, UserRepository},
    models::{
        slot::{RankChange, Slot, SlotCategory, SlotDetail, SlotRanking, SlotStatus, SlotUpdate, SlotWorkType},
        user::User,
    },
};

use super::access::{can_access, ensure_can_access, scope_of};

// Histórico exibido no detalhe do slot
const RANKING_HISTORY_LIMIT: i64 = 30;

pub(crate) fn generate_slot_code() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("SLT-{}", id[..8].to_uppercase())
}

/// Campos de metadado são exclusivos de quem gerencia o slot;
/// o responsável só mexe em `status` e `progress`.
fn touches_metadata(update: &SlotUpdate) -> bool {
    update.name.is_some()
        || update.keyword.is_some()
        || update.url.is_some()
        || update.category.is_some()
        || update.work_type.is_some()
        || update.price.is_some()
        || update.start_date.is_some()
        || update.end_date.is_some()
}

fn ensure_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::InvalidInput(
            "A data final não pode ser anterior à inicial.".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct SlotService {
    slot_repo: SlotRepository,
    user_repo: UserRepository,
    settings_repo: SettingsRepository,
    activity_repo: ActivityRepository,
    pool: PgPool,
}

impl SlotService {
    pub fn new(
        slot_repo: SlotRepository,
        user_repo: UserRepository,
        settings_repo: SettingsRepository,
        activity_repo: ActivityRepository,
        pool: PgPool,
    ) -> Self {
        Self { slot_repo, user_repo, settings_repo, activity_repo, pool }
    }

    /// Cria um slot atribuído a alguém do alcance do chamador (ou a ele
    /// mesmo). Sem preço informado vale o preço padrão da plataforma.
    pub async fn create_slot(
        &self,
        caller: &User,
        name: &str,
        keyword: &str,
        url: &str,
        category: SlotCategory,
        work_type: SlotWorkType,
        assigned_to: Option<Uuid>,
        price: Option<Decimal>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Slot, AppError> {
        ensure_date_range(start_date, end_date)?;

        // 1. Resolve o responsável
        let assignee_id = match assigned_to {
            Some(id) if id != caller.id => {
                let assignee = self.user_repo
                    .find_by_id(id)
                    .await?
                    .ok_or(AppError::UserNotFound)?;
                ensure_can_access(&self.user_repo, caller, assignee.id).await?;
                assignee.id
            }
            _ => caller.id,
        };

        // 2. Preço padrão vem das configurações da plataforma
        let price = match price {
            Some(price) => price,
            None => self.settings_repo.get_settings().await?.default_slot_price,
        };

        let slot_code = generate_slot_code();

        // 3. Slot + auditoria na mesma transação
        let mut tx = self.pool.begin().await?;

        let slot = self.slot_repo
            .create(
                &mut *tx,
                &slot_code,
                name,
                keyword,
                url,
                category,
                work_type,
                assignee_id,
                caller.id,
                price,
                start_date,
                end_date,
            )
            .await?;

        self.activity_repo
            .record(
                &mut *tx,
                Some(caller.id),
                "slot.created",
                Some(&format!("Slot {} atribuído a {}", slot.slot_code, assignee_id)),
            )
            .await?;

        tx.commit().await?;

        Ok(slot)
    }

    pub async fn list_slots(
        &self,
        caller: &User,
        status: Option<SlotStatus>,
        search: Option<&str>,
        window: PageWindow,
    ) -> Result<(Vec<Slot>, i64), AppError> {
        let scope = scope_of(&self.user_repo, caller).await?;
        self.slot_repo.list(scope.as_deref(), status, search, window).await
    }

    pub async fn get_slot_detail(&self, caller: &User, id: Uuid) -> Result<SlotDetail, AppError> {
        let slot = self.slot_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::SlotNotFound)?;
        self.ensure_view_access(caller, &slot).await?;

        let rankings = self.slot_repo.rankings_of(slot.id, RANKING_HISTORY_LIMIT).await?;
        Ok(SlotDetail { slot, rankings })
    }

    pub async fn update_slot(
        &self,
        caller: &User,
        id: Uuid,
        update: &SlotUpdate,
    ) -> Result<Slot, AppError> {
        let slot = self.slot_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::SlotNotFound)?;

        let is_assignee = caller.id == slot.assigned_to;
        let manages = self.manages_slot(caller, &slot).await?;

        if !manages && !is_assignee {
            return Err(AppError::Forbidden);
        }
        if !manages && touches_metadata(update) {
            // Responsável tentando mexer em campo de gestão
            return Err(AppError::Forbidden);
        }

        if let Some(progress) = update.progress {
            if !(0..=100).contains(&progress) {
                return Err(AppError::InvalidInput(
                    "O andamento deve estar entre 0 e 100.".to_string(),
                ));
            }
        }

        // Datas continuam coerentes mesmo alterando só uma das pontas
        let new_start = update.start_date.unwrap_or(slot.start_date);
        let new_end = update.end_date.unwrap_or(slot.end_date);
        ensure_date_range(new_start, new_end)?;

        let mut tx = self.pool.begin().await?;

        let updated = self.slot_repo
            .update(&mut *tx, id, update)
            .await?
            .ok_or(AppError::SlotNotFound)?;

        self.activity_repo
            .record(
                &mut *tx,
                Some(caller.id),
                "slot.updated",
                Some(&format!("Slot {} atualizado", updated.slot_code)),
            )
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Remoção definitiva; as observações de ranking caem junto (cascade).
    pub async fn delete_slot(&self, caller: &User, id: Uuid) -> Result<(), AppError> {
        let slot = self.slot_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::SlotNotFound)?;

        if !self.manages_slot(caller, &slot).await? {
            return Err(AppError::Forbidden);
        }

        let mut tx = self.pool.begin().await?;

        let deleted = self.slot_repo.delete(&mut *tx, id).await?;
        if !deleted {
            return Err(AppError::SlotNotFound);
        }

        self.activity_repo
            .record(
                &mut *tx,
                Some(caller.id),
                "slot.deleted",
                Some(&format!("Slot {} removido", slot.slot_code)),
            )
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Grava uma observação de posição. A linha do slot fica travada durante
    /// a gravação, então duas observações simultâneas não leem o mesmo
    /// "anterior" e a cadeia new/up/down/stable permanece consistente.
    pub async fn record_rank(
        &self,
        caller: &User,
        slot_id: Uuid,
        rank: i32,
    ) -> Result<SlotRanking, AppError> {
        if rank < 1 {
            return Err(AppError::InvalidInput(
                "A posição deve ser maior ou igual a 1.".to_string(),
            ));
        }

        let slot = self.slot_repo
            .find_by_id(slot_id)
            .await?
            .ok_or(AppError::SlotNotFound)?;
        self.ensure_view_access(caller, &slot).await?;

        let mut tx = self.pool.begin().await?;

        // 1. Trava o slot
        self.slot_repo
            .find_by_id_for_update(&mut *tx, slot_id)
            .await?
            .ok_or(AppError::SlotNotFound)?;

        // 2. Classificação contra a última observação
        let previous = self.slot_repo
            .latest_ranking(&mut *tx, slot_id)
            .await?
            .map(|r| r.rank);
        let change = RankChange::classify(rank, previous);

        // 3. Acrescenta ao histórico
        let ranking = self.slot_repo
            .insert_ranking(&mut *tx, slot_id, rank, previous, change)
            .await?;

        tx.commit().await?;

        Ok(ranking)
    }

    // --- Regras de acesso específicas de slot ---

    /// Leitura: responsável, quem atribuiu, ou alguém com alcance sobre o
    /// responsável.
    async fn ensure_view_access(&self, caller: &User, slot: &Slot) -> Result<(), AppError> {
        if caller.id == slot.assigned_to || caller.id == slot.assigned_by {
            return Ok(());
        }
        ensure_can_access(&self.user_repo, caller, slot.assigned_to).await
    }

    /// Gestão: administrador, quem atribuiu, ou um superior com alcance
    /// sobre o responsável. Ser o responsável, por si só, não gerencia.
    async fn manages_slot(&self, caller: &User, slot: &Slot) -> Result<bool, AppError> {
        if caller.role() == Role::Admin || caller.id == slot.assigned_by {
            return Ok(true);
        }
        if caller.id == slot.assigned_to {
            return Ok(false);
        }
        can_access(&self.user_repo, caller, slot.assigned_to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_code_has_expected_format() {
        let code = generate_slot_code();
        assert!(code.starts_with("SLT-"));
        assert_eq!(code.len(), 12);
    }

    #[test]
    fn progress_only_update_does_not_touch_metadata() {
        let update = SlotUpdate {
            status: Some(SlotStatus::Active),
            progress: Some(60),
            ..Default::default()
        };
        assert!(!touches_metadata(&update));
    }

    #[test]
    fn renaming_touches_metadata() {
        let update = SlotUpdate {
            name: Some("Campanha nova".to_string()),
            ..Default::default()
        };
        assert!(touches_metadata(&update));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(ensure_date_range(start, end).is_err());
        assert!(ensure_date_range(end, start).is_ok());
        assert!(ensure_date_range(start, start).is_ok());
    }
}
