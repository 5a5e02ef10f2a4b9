// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário + atribuição de papéis (o guard de admin fica no extractor)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/roles", get(handlers::auth::get_my_roles))
        .route(
            "/{id}/roles",
            post(handlers::rbac::assign_role).get(handlers::rbac::list_roles),
        )
        .route("/{id}/roles/{role}", axum::routing::delete(handlers::rbac::remove_role))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let budget_routes = Router::new()
        .route("/", post(handlers::budgets::create_budget).get(handlers::budgets::list_budgets))
        .route("/{id}", get(handlers::budgets::get_budget))
        .route("/{id}/transition", post(handlers::budgets::transition_budget))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let work_routes = Router::new()
        .route("/", post(handlers::works::create_work).get(handlers::works::list_works))
        .route("/{id}", get(handlers::works::get_work))
        .route("/{id}/dates", patch(handlers::works::update_work_dates))
        .route("/{id}/transition", post(handlers::works::transition_work))
        .route("/{id}/pipeline", get(handlers::works::get_pipeline))
        .route(
            "/{id}/checklists",
            post(handlers::works::create_checklist).get(handlers::works::list_checklists),
        )
        .route(
            "/{id}/documents",
            post(handlers::works::add_document).get(handlers::works::list_documents),
        )
        .route(
            "/{id}/photos",
            post(handlers::works::add_photo).get(handlers::works::list_photos),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let checklist_routes = Router::new()
        .route("/items/{id}", patch(handlers::works::update_checklist_item))
        .route("/{id}/complete", post(handlers::works::complete_checklist))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/budgets", budget_routes)
        .nest("/api/works", work_routes)
        .nest("/api/checklists", checklist_routes)
        .nest("/api/dashboard", dashboard_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
