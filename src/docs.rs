// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::common::pagination::Paginated;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::logout,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::change_password,
        handlers::users::get_children,

        // --- Slots ---
        handlers::slots::list_slots,
        handlers::slots::create_slot,
        handlers::slots::get_slot,
        handlers::slots::update_slot,
        handlers::slots::delete_slot,
        handlers::slots::record_ranking,

        // --- Cash ---
        handlers::cash::list_charge_requests,
        handlers::cash::create_charge_request,
        handlers::cash::process_charge_request,
        handlers::cash::get_balance,
        handlers::cash::list_transactions,
        handlers::cash::get_statistics,

        // --- Inquiries ---
        handlers::inquiries::list_inquiries,
        handlers::inquiries::create_inquiry,
        handlers::inquiries::get_inquiry,
        handlers::inquiries::add_message,
        handlers::inquiries::update_inquiry_status,

        // --- Announcements ---
        handlers::announcements::list_announcements,
        handlers::announcements::create_announcement,
        handlers::announcements::get_announcement,
        handlers::announcements::update_announcement,
        handlers::announcements::delete_announcement,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Logs ---
        handlers::activity::list_logs,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Users ---
            crate::common::hierarchy::Role,
            models::user::UserStatus,
            models::user::UserResponse,
            handlers::users::CreateUserPayload,
            handlers::users::UpdateUserPayload,
            handlers::users::ChangePasswordPayload,
            Paginated<models::user::UserResponse>,

            // --- Slots ---
            models::slot::SlotCategory,
            models::slot::SlotWorkType,
            models::slot::SlotStatus,
            models::slot::RankChange,
            models::slot::Slot,
            models::slot::SlotRanking,
            models::slot::SlotDetail,
            handlers::slots::CreateSlotPayload,
            handlers::slots::UpdateSlotPayload,
            handlers::slots::RecordRankPayload,
            Paginated<models::slot::Slot>,

            // --- Cash ---
            models::cash::ChargeStatus,
            models::cash::CashEntryType,
            models::cash::BalanceKind,
            models::cash::ChargeDecision,
            models::cash::ChargeRequest,
            models::cash::ChargeRequestWithUser,
            models::cash::CashHistoryEntry,
            models::cash::BalanceResponse,
            models::cash::CashStatistics,
            handlers::cash::CreateChargeRequestPayload,
            handlers::cash::ProcessChargePayload,
            Paginated<models::cash::ChargeRequestWithUser>,
            Paginated<models::cash::CashHistoryEntry>,

            // --- Inquiries ---
            models::inquiry::InquiryStatus,
            models::inquiry::InquiryPriority,
            models::inquiry::SenderKind,
            models::inquiry::Inquiry,
            models::inquiry::InquiryMessage,
            models::inquiry::InquiryDetail,
            handlers::inquiries::CreateInquiryPayload,
            handlers::inquiries::AddMessagePayload,
            handlers::inquiries::UpdateInquiryStatusPayload,
            Paginated<models::inquiry::Inquiry>,

            // --- Announcements ---
            models::announcement::AnnouncementKind,
            models::announcement::AnnouncementPriority,
            models::announcement::Announcement,
            handlers::announcements::CreateAnnouncementPayload,
            handlers::announcements::UpdateAnnouncementPayload,
            Paginated<models::announcement::Announcement>,

            // --- Settings ---
            models::settings::SystemSettings,
            models::settings::UpdateSettingsRequest,

            // --- Logs ---
            models::activity::ActivityLog,
            Paginated<models::activity::ActivityLog>,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação, registro e sessão"),
        (name = "Users", description = "Hierarquia de usuários (admin, distribuidor, agência, usuário)"),
        (name = "Slots", description = "Slots de trabalho e histórico de ranking"),
        (name = "Cash", description = "Solicitações de carga, saldo e extrato"),
        (name = "Inquiries", description = "Chamados de suporte"),
        (name = "Announcements", description = "Avisos da plataforma"),
        (name = "Settings", description = "Configurações da plataforma"),
        (name = "Logs", description = "Trilha de auditoria")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
