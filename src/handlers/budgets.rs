// src/handlers/budgets.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::budget::{Budget, CreateBudgetPayload, TransitionBudgetPayload},
};

// POST /api/budgets
#[utoipa::path(
    post,
    path = "/api/budgets",
    request_body = CreateBudgetPayload,
    responses(
        (status = 201, description = "Orçamento criado como rascunho", body = Budget),
        (status = 400, description = "Payload inválido"),
    ),
    security(("bearer_auth" = [])),
    tag = "budgets",
)]
pub async fn create_budget(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateBudgetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let budget = app_state.budget_service.create_budget(&payload, user.0.id).await?;

    Ok((StatusCode::CREATED, Json(budget)))
}

// GET /api/budgets
#[utoipa::path(
    get,
    path = "/api/budgets",
    responses((status = 200, description = "Orçamentos, mais recentes primeiro", body = [Budget])),
    security(("bearer_auth" = [])),
    tag = "budgets",
)]
pub async fn list_budgets(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let budgets = app_state.budget_service.list_budgets().await?;
    Ok(Json(budgets))
}

// GET /api/budgets/{id}
#[utoipa::path(
    get,
    path = "/api/budgets/{id}",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento", body = Budget),
        (status = 404, description = "Orçamento não encontrado"),
    ),
    security(("bearer_auth" = [])),
    tag = "budgets",
)]
pub async fn get_budget(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let budget = app_state.budget_service.get_budget(id).await?;
    Ok(Json(budget))
}

// POST /api/budgets/{id}/transition
//
// Os papéis do ator são resolvidos aqui e entram como argumento explícito
// da máquina de estados; o corpo só carrega o status de destino.
#[utoipa::path(
    post,
    path = "/api/budgets/{id}/transition",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    request_body = TransitionBudgetPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Budget),
        (status = 403, description = "Papel não autorizado para a aresta"),
        (status = 404, description = "Orçamento não encontrado"),
        (status = 409, description = "Conflito de escrita concorrente"),
        (status = 422, description = "Transição ilegal ou estado terminal"),
    ),
    security(("bearer_auth" = [])),
    tag = "budgets",
)]
pub async fn transition_budget(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionBudgetPayload>,
) -> Result<impl IntoResponse, AppError> {
    let actor_roles = app_state.rbac_service.roles_of(user.0.id).await?;

    let budget = app_state
        .budget_service
        .transition(id, payload.status, &actor_roles)
        .await?;

    Ok(Json(budget))
}
