// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::get_my_roles,

        // --- RBAC ---
        handlers::rbac::assign_role,
        handlers::rbac::remove_role,
        handlers::rbac::list_roles,

        // --- Budgets ---
        handlers::budgets::create_budget,
        handlers::budgets::list_budgets,
        handlers::budgets::get_budget,
        handlers::budgets::transition_budget,

        // --- Works ---
        handlers::works::create_work,
        handlers::works::list_works,
        handlers::works::get_work,
        handlers::works::update_work_dates,
        handlers::works::transition_work,
        handlers::works::get_pipeline,

        // --- Checklists ---
        handlers::works::create_checklist,
        handlers::works::list_checklists,
        handlers::works::update_checklist_item,
        handlers::works::complete_checklist,

        // --- Documentos / Fotos ---
        handlers::works::add_document,
        handlers::works::list_documents,
        handlers::works::add_photo,
        handlers::works::list_photos,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- RBAC ---
            models::rbac::Role,
            models::rbac::UserRole,
            models::rbac::AssignRolePayload,
            models::rbac::RolesResponse,

            // --- Budgets ---
            models::budget::BudgetStatus,
            models::budget::Budget,
            models::budget::CreateBudgetPayload,
            models::budget::TransitionBudgetPayload,

            // --- Works ---
            models::work::WorkStatus,
            models::work::PhotoCategory,
            models::work::Work,
            models::work::CreateWorkPayload,
            models::work::TransitionWorkPayload,
            models::work::UpdateWorkDatesPayload,
            models::work::Checklist,
            models::work::ChecklistItem,
            models::work::ChecklistResponse,
            models::work::CreateChecklistPayload,
            models::work::UpdateChecklistItemPayload,
            models::work::Document,
            models::work::CreateDocumentPayload,
            models::work::Photo,
            models::work::CreatePhotoPayload,

            // --- Pipeline ---
            models::pipeline::StageId,
            models::pipeline::StageStatus,
            models::pipeline::StageView,
            models::pipeline::PipelineView,

            // --- Dashboard ---
            models::dashboard::BudgetStatusCount,
            models::dashboard::WorkStatusCount,
            models::dashboard::StageCount,
            models::dashboard::DashboardSummary,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registro e login"),
        (name = "users", description = "Usuário autenticado"),
        (name = "rbac", description = "Atribuição de papéis (admin)"),
        (name = "budgets", description = "Orçamentos e seu ciclo de vida"),
        (name = "works", description = "Obras e seu ciclo de vida"),
        (name = "checklists", description = "Checklists que travam a finalização"),
        (name = "documents", description = "Metadados de documentos (Book Final)"),
        (name = "photos", description = "Fotos de campo por categoria"),
        (name = "dashboard", description = "Resumo do pipeline de obras"),
    ),
    info(
        title = "Gestão de Obras - API",
        description = "Back-end de orçamentos e obras de uma empreiteira elétrica: \
                       máquinas de estado com autorização por papel e pipeline derivado.",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
