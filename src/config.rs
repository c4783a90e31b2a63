// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        ActivityRepository, AnnouncementRepository, CashRepository, InquiryRepository,
        SettingsRepository, SlotRepository, UserRepository,
    },
    services::{
        announcement_service::AnnouncementService, auth::AuthService, cash_service::CashService,
        inquiry_service::InquiryService, slot_service::SlotService, user_service::UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,

    // Repositórios acessados direto pelos handlers mais simples
    pub settings_repo: SettingsRepository,
    pub activity_repo: ActivityRepository,

    // Serviços com as regras de negócio
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub slot_service: SlotService,
    pub cash_service: CashService,
    pub inquiry_service: InquiryService,
    pub announcement_service: AnnouncementService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let cash_repo = CashRepository::new(db_pool.clone());
        let slot_repo = SlotRepository::new(db_pool.clone());
        let inquiry_repo = InquiryRepository::new(db_pool.clone());
        let announcement_repo = AnnouncementRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            activity_repo.clone(),
            jwt_secret.clone(),
            db_pool.clone(),
        );
        let user_service = UserService::new(
            user_repo.clone(),
            activity_repo.clone(),
            db_pool.clone(),
        );
        let slot_service = SlotService::new(
            slot_repo,
            user_repo.clone(),
            settings_repo.clone(),
            activity_repo.clone(),
            db_pool.clone(),
        );
        let cash_service = CashService::new(
            cash_repo,
            user_repo.clone(),
            activity_repo.clone(),
            db_pool.clone(),
        );
        let inquiry_service = InquiryService::new(
            inquiry_repo,
            user_repo.clone(),
            activity_repo.clone(),
            db_pool.clone(),
        );
        let announcement_service = AnnouncementService::new(
            announcement_repo,
            activity_repo.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            settings_repo,
            activity_repo,
            auth_service,
            user_service,
            slot_service,
            cash_service,
            inquiry_service,
            announcement_service,
        })
    }
}
