// src/services/inquiry_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageWindow},
    db::{ActivityRepository, InquiryRepository, UserRepository},
    models::{
        inquiry::{Inquiry, InquiryDetail, InquiryMessage, InquiryPriority, InquiryStatus, SenderKind},
        user::User,
    },
};

use super::access::{ensure_can_access, scope_of};

/// Quem escreve no próprio chamado fala como usuário; qualquer outra pessoa
/// com alcance sobre o chamado fala como atendimento.
fn sender_kind_for(sender_id: Uuid, owner_id: Uuid) -> SenderKind {
    if sender_id == owner_id {
        SenderKind::User
    } else {
        SenderKind::Admin
    }
}

fn counterpart(kind: SenderKind) -> SenderKind {
    match kind {
        SenderKind::User => SenderKind::Admin,
        SenderKind::Admin => SenderKind::User,
    }
}

#[derive(Clone)]
pub struct InquiryService {
    inquiry_repo: InquiryRepository,
    user_repo: UserRepository,
    activity_repo: ActivityRepository,
    pool: PgPool,
}

impl InquiryService {
    pub fn new(
        inquiry_repo: InquiryRepository,
        user_repo: UserRepository,
        activity_repo: ActivityRepository,
        pool: PgPool,
    ) -> Self {
        Self { inquiry_repo, user_repo, activity_repo, pool }
    }

    /// Abre um chamado já com a primeira mensagem do autor.
    pub async fn create_inquiry(
        &self,
        caller: &User,
        title: &str,
        content: &str,
        priority: InquiryPriority,
    ) -> Result<InquiryDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let inquiry = self.inquiry_repo
            .create_inquiry(&mut *tx, caller.id, title, priority)
            .await?;

        let first_message = self.inquiry_repo
            .add_message(&mut *tx, inquiry.id, caller.id, SenderKind::User, content)
            .await?;

        self.activity_repo
            .record(
                &mut *tx,
                Some(caller.id),
                "inquiry.created",
                Some(&format!("Chamado \"{}\" aberto", inquiry.title)),
            )
            .await?;

        tx.commit().await?;

        Ok(InquiryDetail { inquiry, messages: vec![first_message] })
    }

    pub async fn list_inquiries(
        &self,
        caller: &User,
        status: Option<InquiryStatus>,
        window: PageWindow,
    ) -> Result<(Vec<Inquiry>, i64), AppError> {
        let scope = scope_of(&self.user_repo, caller).await?;
        self.inquiry_repo.list(scope.as_deref(), status, window).await
    }

    /// Detalhe do chamado. Abrir a conversa marca como lidas as mensagens do
    /// outro lado, então o retorno já reflete a leitura.
    pub async fn get_detail(&self, caller: &User, id: Uuid) -> Result<InquiryDetail, AppError> {
        let inquiry = self.inquiry_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::InquiryNotFound)?;
        ensure_can_access(&self.user_repo, caller, inquiry.user_id).await?;

        let viewer_kind = sender_kind_for(caller.id, inquiry.user_id);
        self.inquiry_repo
            .mark_side_read(&self.pool, inquiry.id, counterpart(viewer_kind))
            .await?;

        let messages = self.inquiry_repo.messages_of(inquiry.id).await?;
        Ok(InquiryDetail { inquiry, messages })
    }

    /// Acrescenta uma mensagem à conversa. Com a linha do chamado travada,
    /// a primeira resposta de atendimento assume o chamado e o coloca em
    /// andamento; respostas seguintes não trocam o atendente.
    pub async fn add_message(
        &self,
        sender: &User,
        inquiry_id: Uuid,
        content: &str,
    ) -> Result<InquiryMessage, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Trava o chamado
        let inquiry = self.inquiry_repo
            .find_by_id_for_update(&mut *tx, inquiry_id)
            .await?
            .ok_or(AppError::InquiryNotFound)?;

        ensure_can_access(&self.user_repo, sender, inquiry.user_id).await?;

        let sender_type = sender_kind_for(sender.id, inquiry.user_id);

        // 2. Primeira resposta de atendimento assume o chamado
        if sender_type == SenderKind::Admin && inquiry.assigned_admin.is_none() {
            if let Some(claimed) = self.inquiry_repo
                .claim_unassigned(&mut *tx, inquiry.id, sender.id)
                .await?
            {
                tracing::info!("🎧 Chamado {} assumido por {}", claimed.id, sender.id);
            }
        }

        // 3. Mensagem + carimbo de última atividade
        let message = self.inquiry_repo
            .add_message(&mut *tx, inquiry.id, sender.id, sender_type, content)
            .await?;
        self.inquiry_repo.touch_last_message(&mut *tx, inquiry.id).await?;

        tx.commit().await?;

        Ok(message)
    }

    pub async fn update_status(
        &self,
        caller: &User,
        id: Uuid,
        status: InquiryStatus,
    ) -> Result<Inquiry, AppError> {
        let inquiry = self.inquiry_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::InquiryNotFound)?;
        ensure_can_access(&self.user_repo, caller, inquiry.user_id).await?;

        let mut tx = self.pool.begin().await?;

        let updated = self.inquiry_repo
            .update_status(&mut *tx, id, status)
            .await?
            .ok_or(AppError::InquiryNotFound)?;

        self.activity_repo
            .record(
                &mut *tx,
                Some(caller.id),
                "inquiry.status_changed",
                Some(&format!("Chamado {} marcado como {:?}", updated.id, status)),
            )
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_writes_as_user() {
        let owner = Uuid::new_v4();
        assert_eq!(sender_kind_for(owner, owner), SenderKind::User);
    }

    #[test]
    fn anyone_else_writes_as_admin() {
        let owner = Uuid::new_v4();
        let staff = Uuid::new_v4();
        assert_eq!(sender_kind_for(staff, owner), SenderKind::Admin);
    }

    #[test]
    fn reading_marks_the_other_side() {
        assert_eq!(counterpart(SenderKind::User), SenderKind::Admin);
        assert_eq!(counterpart(SenderKind::Admin), SenderKind::User);
    }
}
