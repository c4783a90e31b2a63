//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_middleware;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Sessão do usuário autenticado
    let session_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/logout", post(handlers::auth::logout))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let user_routes = Router::new()
        .route("/"
               ,get(handlers::users::list_users)
               .post(handlers::users::create_user)
        )
        .route("/{id}"
               ,get(handlers::users::get_user)
               .put(handlers::users::update_user)
        )
        .route("/{id}/password", post(handlers::users::change_password))
        .route("/{id}/children", get(handlers::users::get_children))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let slot_routes = Router::new()
        .route("/"
               ,get(handlers::slots::list_slots)
               .post(handlers::slots::create_slot)
        )
        .route("/{id}"
               ,get(handlers::slots::get_slot)
               .put(handlers::slots::update_slot)
               .delete(handlers::slots::delete_slot)
        )
        .route("/{id}/ranking", post(handlers::slots::record_ranking))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let inquiry_routes = Router::new()
        .route("/"
               ,get(handlers::inquiries::list_inquiries)
               .post(handlers::inquiries::create_inquiry)
        )
        .route("/{id}", get(handlers::inquiries::get_inquiry))
        .route("/{id}/messages", post(handlers::inquiries::add_message))
        .route("/{id}/status", patch(handlers::inquiries::update_inquiry_status))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let cash_routes = Router::new()
        .route("/requests"
               ,get(handlers::cash::list_charge_requests)
               .post(handlers::cash::create_charge_request)
               .patch(handlers::cash::process_charge_request)
        )
        .route("/balance", get(handlers::cash::get_balance))
        .route("/transactions", get(handlers::cash::list_transactions))
        .route("/statistics", get(handlers::cash::get_statistics))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let announcement_routes = Router::new()
        .route("/"
               ,get(handlers::announcements::list_announcements)
               .post(handlers::announcements::create_announcement)
        )
        .route("/{id}"
               ,get(handlers::announcements::get_announcement)
               .put(handlers::announcements::update_announcement)
               .delete(handlers::announcements::delete_announcement)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let settings_routes = Router::new()
        .route("/"
               ,get(handlers::settings::get_settings)
               .put(handlers::settings::update_settings)
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let log_routes = Router::new()
        .route("/", get(handlers::activity::list_logs))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/auth", session_routes)
        .nest("/api/users", user_routes)
        .nest("/api/slots", slot_routes)
        .nest("/api/inquiries", inquiry_routes)
        .nest("/api/cash", cash_routes)
        .nest("/api/announcements", announcement_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/logs", log_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
