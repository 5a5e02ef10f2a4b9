// src/handlers/rbac.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{AdminOnly, RequireRole},
    models::rbac::{AssignRolePayload, Role},
};

// POST /api/users/{id}/roles — somente admin
#[utoipa::path(
    post,
    path = "/api/users/{id}/roles",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = AssignRolePayload,
    responses(
        (status = 201, description = "Papel atribuído", body = crate::models::rbac::UserRole),
        (status = 403, description = "Ator não é admin"),
        (status = 404, description = "Usuário não encontrado"),
    ),
    security(("bearer_auth" = [])),
    tag = "rbac",
)]
pub async fn assign_role(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AssignRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state.rbac_service.assign_role(user_id, payload.role).await?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

// DELETE /api/users/{id}/roles/{role} — somente admin
#[utoipa::path(
    delete,
    path = "/api/users/{id}/roles/{role}",
    params(
        ("id" = Uuid, Path, description = "ID do usuário"),
        ("role" = Role, Path, description = "Papel a remover"),
    ),
    responses(
        (status = 204, description = "Vínculo removido"),
        (status = 403, description = "Ator não é admin"),
        (status = 404, description = "Vínculo não encontrado"),
    ),
    security(("bearer_auth" = [])),
    tag = "rbac",
)]
pub async fn remove_role(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path((user_id, role)): Path<(Uuid, Role)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.rbac_service.remove_role(user_id, role).await?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/users/{id}/roles — somente admin
#[utoipa::path(
    get,
    path = "/api/users/{id}/roles",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Papéis do usuário",
         body = crate::models::rbac::RolesResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "rbac",
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let response = app_state.rbac_service.roles_response(user_id).await?;

    Ok(Json(response))
}
