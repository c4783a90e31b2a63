// src/db/settings_repo.rs

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::settings::{SystemSettings, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_settings(&self) -> Result<SystemSettings, AppError> {
        // A linha única é semeada na migração; o fallback cobre um banco recém-limpo.
        let settings = sqlx::query_as::<_, SystemSettings>(
            "SELECT * FROM system_settings WHERE id = TRUE",
        )
            .fetch_optional(&self.pool)
            .await?;

        match settings {
            Some(s) => Ok(s),
            None => Ok(SystemSettings {
                id: true,
                site_name: "SlotDesk".to_string(),
                support_email: "suporte@slotdesk.io".to_string(),
                maintenance_mode: false,
                default_slot_price: Decimal::ZERO,
                updated_at: Utc::now(),
            }),
        }
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        input: &UpdateSettingsRequest,
    ) -> Result<SystemSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update): campos ausentes mantêm o valor atual
        let settings = sqlx::query_as::<_, SystemSettings>(
            r#"
            INSERT INTO system_settings (id) VALUES (TRUE)
            ON CONFLICT (id)
            DO UPDATE SET
                site_name = COALESCE($1, system_settings.site_name),
                support_email = COALESCE($2, system_settings.support_email),
                maintenance_mode = COALESCE($3, system_settings.maintenance_mode),
                default_slot_price = COALESCE($4, system_settings.default_slot_price),
                updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(input.site_name.as_deref())
            .bind(input.support_email.as_deref())
            .bind(input.maintenance_mode)
            .bind(input.default_slot_price)
            .fetch_one(executor)
            .await?;

        Ok(settings)
    }
}
