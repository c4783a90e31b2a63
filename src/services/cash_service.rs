// src/services/cash_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageWindow},
    db::{ActivityRepository, CashRepository, UserRepository},
    models::{
        cash::{
            BalanceKind, BalanceResponse, CashEntryType, CashHistoryEntry, CashStatistics,
            ChargeDecision, ChargeRequest, ChargeRequestWithUser, ChargeStatus,
        },
        user::User,
    },
};

use super::access::{ensure_can_access, scope_of};

/// Pré-condição do fluxo de aprovação: só solicitações pendentes mudam de
/// estado. Quem chegar depois recebe conflito, nunca um segundo crédito.
fn ensure_pending(request: &ChargeRequest) -> Result<(), AppError> {
    if request.status != ChargeStatus::Pending {
        return Err(AppError::AlreadyProcessed);
    }
    Ok(())
}

/// O banco também tem um CHECK (amount > 0); validar antes devolve um 400
/// legível em vez do erro de constraint.
fn ensure_positive_amount(amount: Decimal) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidInput(
            "O valor da carga deve ser maior que zero.".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CashService {
    cash_repo: CashRepository,
    user_repo: UserRepository,
    activity_repo: ActivityRepository,
    pool: PgPool,
}

impl CashService {
    pub fn new(
        cash_repo: CashRepository,
        user_repo: UserRepository,
        activity_repo: ActivityRepository,
        pool: PgPool,
    ) -> Self {
        Self { cash_repo, user_repo, activity_repo, pool }
    }

    /// Abre uma solicitação de carga em nome do próprio usuário.
    pub async fn request_charge(
        &self,
        caller: &User,
        amount: Decimal,
    ) -> Result<ChargeRequest, AppError> {
        ensure_positive_amount(amount)?;

        let mut tx = self.pool.begin().await?;

        let request = self.cash_repo
            .create_request(&mut *tx, caller.id, amount)
            .await?;

        self.activity_repo
            .record(
                &mut *tx,
                Some(caller.id),
                "cash.charge_requested",
                Some(&format!("Solicitação de {} criada", amount)),
            )
            .await?;

        tx.commit().await?;

        Ok(request)
    }

    /// Decide uma solicitação pendente. Tudo acontece em uma transação com a
    /// linha da solicitação travada: checagem de pendência, mudança de
    /// estado e, na aprovação, crédito do saldo e registro no extrato.
    pub async fn process_request(
        &self,
        processor: &User,
        request_id: Uuid,
        decision: ChargeDecision,
        reject_reason: Option<&str>,
    ) -> Result<ChargeRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Trava a linha da solicitação
        let request = self.cash_repo
            .find_request_for_update(&mut *tx, request_id)
            .await?
            .ok_or(AppError::ChargeRequestNotFound)?;

        // 2. Pré-condição: ainda pendente (idempotência sob retry)
        ensure_pending(&request)?;

        let processed = match decision {
            ChargeDecision::Reject => {
                let processed = self.cash_repo
                    .mark_processed(
                        &mut *tx,
                        request.id,
                        ChargeStatus::Rejected,
                        processor.id,
                        reject_reason,
                    )
                    .await?;

                self.activity_repo
                    .record(
                        &mut *tx,
                        Some(processor.id),
                        "cash.charge_rejected",
                        Some(&format!("Solicitação {} rejeitada", request.id)),
                    )
                    .await?;

                processed
            }
            ChargeDecision::Approve => {
                // 3. Marca como aprovada
                let processed = self.cash_repo
                    .mark_processed(
                        &mut *tx,
                        request.id,
                        ChargeStatus::Approved,
                        processor.id,
                        None,
                    )
                    .await?;

                // 4. Credita o saldo (upsert cria a linha na primeira carga)
                let balance = self.cash_repo
                    .upsert_balance_add_cash(&mut *tx, request.user_id, request.amount)
                    .await?;

                // 5. Extrato com o saldo resultante daquele momento
                self.cash_repo
                    .append_history(
                        &mut *tx,
                        request.user_id,
                        CashEntryType::Charge,
                        request.amount,
                        balance.cash_balance,
                        BalanceKind::Paid,
                        "cash charge",
                        Some(request.id),
                    )
                    .await?;

                self.activity_repo
                    .record(
                        &mut *tx,
                        Some(processor.id),
                        "cash.charge_approved",
                        Some(&format!("Crédito de {} para o usuário {}", request.amount, request.user_id)),
                    )
                    .await?;

                processed
            }
        };

        // 6. Só aqui a decisão vira definitiva
        tx.commit().await?;

        Ok(processed)
    }

    pub async fn balance_of(&self, caller: &User, user_id: Uuid) -> Result<BalanceResponse, AppError> {
        ensure_can_access(&self.user_repo, caller, user_id).await?;

        let balance = self.cash_repo.get_balance(user_id).await?;
        Ok(match balance {
            Some(balance) => balance.into(),
            // Saldo criado de forma preguiçosa: sem linha ainda, tudo zero
            None => BalanceResponse {
                user_id,
                cash_balance: Decimal::ZERO,
                point_balance: Decimal::ZERO,
                total: Decimal::ZERO,
                updated_at: Utc::now(),
            },
        })
    }

    pub async fn list_requests(
        &self,
        caller: &User,
        status: Option<ChargeStatus>,
        window: PageWindow,
    ) -> Result<(Vec<ChargeRequestWithUser>, i64), AppError> {
        let scope = scope_of(&self.user_repo, caller).await?;
        self.cash_repo.list_requests(scope.as_deref(), status, window).await
    }

    pub async fn list_history(
        &self,
        caller: &User,
        entry_type: Option<CashEntryType>,
        window: PageWindow,
    ) -> Result<(Vec<CashHistoryEntry>, i64), AppError> {
        let scope = scope_of(&self.user_repo, caller).await?;
        self.cash_repo.list_history(scope.as_deref(), entry_type, window).await
    }

    pub async fn statistics(&self, caller: &User) -> Result<CashStatistics, AppError> {
        let scope = scope_of(&self.user_repo, caller).await?;
        self.cash_repo.statistics(&self.pool, scope.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn request_with_status(status: ChargeStatus) -> ChargeRequest {
        ChargeRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: Decimal::new(50_000, 0),
            status,
            requested_at: Utc::now(),
            processed_at: None,
            processed_by: None,
            reject_reason: None,
        }
    }

    #[test]
    fn pending_request_passes_precondition() {
        let request = request_with_status(ChargeStatus::Pending);
        assert!(ensure_pending(&request).is_ok());
    }

    #[test]
    fn approved_request_cannot_be_processed_again() {
        let request = request_with_status(ChargeStatus::Approved);
        assert!(matches!(
            ensure_pending(&request),
            Err(AppError::AlreadyProcessed)
        ));
    }

    #[test]
    fn rejected_request_cannot_be_processed_again() {
        let request = request_with_status(ChargeStatus::Rejected);
        assert!(matches!(
            ensure_pending(&request),
            Err(AppError::AlreadyProcessed)
        ));
    }

    #[test]
    fn charge_amount_must_be_positive() {
        assert!(ensure_positive_amount(Decimal::new(1, 2)).is_ok());
        assert!(matches!(
            ensure_positive_amount(Decimal::ZERO),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            ensure_positive_amount(Decimal::new(-500, 2)),
            Err(AppError::InvalidInput(_))
        ));
    }
}
