// src/handlers/works.rs

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
    models::pipeline::PipelineView,
    models::work::{
        Checklist, ChecklistItem, ChecklistResponse, CreateChecklistPayload,
        CreateDocumentPayload, CreatePhotoPayload, CreateWorkPayload, Document, Photo,
        TransitionWorkPayload, UpdateChecklistItemPayload, UpdateWorkDatesPayload, Work,
    },
};

// POST /api/works
#[utoipa::path(
    post,
    path = "/api/works",
    request_body = CreateWorkPayload,
    responses(
        (status = 201, description = "Obra criada em planejamento", body = Work),
        (status = 404, description = "Orçamento não encontrado"),
        (status = 422, description = "Orçamento fora da família aprovada"),
    ),
    security(("bearer_auth" = [])),
    tag = "works",
)]
pub async fn create_work(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateWorkPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let work = app_state.work_service.create_work(&payload).await?;

    Ok((StatusCode::CREATED, Json(work)))
}

// GET /api/works
#[utoipa::path(
    get,
    path = "/api/works",
    responses((status = 200, description = "Obras, mais recentes primeiro", body = [Work])),
    security(("bearer_auth" = [])),
    tag = "works",
)]
pub async fn list_works(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let works = app_state.work_service.list_works().await?;
    Ok(Json(works))
}

// GET /api/works/{id}
#[utoipa::path(
    get,
    path = "/api/works/{id}",
    params(("id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 200, description = "Obra", body = Work),
        (status = 404, description = "Obra não encontrada"),
    ),
    security(("bearer_auth" = [])),
    tag = "works",
)]
pub async fn get_work(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let work = app_state.work_service.get_work(id).await?;
    Ok(Json(work))
}

// PATCH /api/works/{id}/dates
#[utoipa::path(
    patch,
    path = "/api/works/{id}/dates",
    params(("id" = Uuid, Path, description = "ID da obra")),
    request_body = UpdateWorkDatesPayload,
    responses(
        (status = 200, description = "Cronograma atualizado", body = Work),
        (status = 404, description = "Obra não encontrada"),
    ),
    security(("bearer_auth" = [])),
    tag = "works",
)]
pub async fn update_work_dates(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkDatesPayload>,
) -> Result<impl IntoResponse, AppError> {
    let work = app_state.work_service.update_dates(id, &payload).await?;
    Ok(Json(work))
}

// POST /api/works/{id}/transition
#[utoipa::path(
    post,
    path = "/api/works/{id}/transition",
    params(("id" = Uuid, Path, description = "ID da obra")),
    request_body = TransitionWorkPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Work),
        (status = 403, description = "Papel não autorizado para a aresta"),
        (status = 404, description = "Obra não encontrada"),
        (status = 409, description = "Conflito de escrita concorrente"),
        (status = 422, description = "Transição ilegal, estado terminal ou pré-condição não atendida"),
    ),
    security(("bearer_auth" = [])),
    tag = "works",
)]
pub async fn transition_work(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionWorkPayload>,
) -> Result<impl IntoResponse, AppError> {
    let actor_roles = app_state.rbac_service.roles_of(user.0.id).await?;

    let work = app_state.work_service.transition(id, payload.status, &actor_roles).await?;

    Ok(Json(work))
}

// GET /api/works/{id}/pipeline
#[utoipa::path(
    get,
    path = "/api/works/{id}/pipeline",
    params(("id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 200, description = "Visão derivada das cinco etapas", body = PipelineView),
        (status = 404, description = "Obra não encontrada"),
    ),
    security(("bearer_auth" = [])),
    tag = "works",
)]
pub async fn get_pipeline(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let view = app_state.work_service.pipeline(id).await?;
    Ok(Json(view))
}

// --- Checklists ---

// POST /api/works/{id}/checklists
#[utoipa::path(
    post,
    path = "/api/works/{id}/checklists",
    params(("id" = Uuid, Path, description = "ID da obra")),
    request_body = CreateChecklistPayload,
    responses(
        (status = 201, description = "Checklist criado com itens", body = ChecklistResponse),
        (status = 404, description = "Obra não encontrada"),
    ),
    security(("bearer_auth" = [])),
    tag = "checklists",
)]
pub async fn create_checklist(
    State(app_state): State<AppState>,
    Path(work_id): Path<Uuid>,
    Json(payload): Json<CreateChecklistPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = app_state.work_service.create_checklist(work_id, &payload).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/works/{id}/checklists
#[utoipa::path(
    get,
    path = "/api/works/{id}/checklists",
    params(("id" = Uuid, Path, description = "ID da obra")),
    responses(
        (status = 200, description = "Checklists da obra", body = [ChecklistResponse]),
    ),
    security(("bearer_auth" = [])),
    tag = "checklists",
)]
pub async fn list_checklists(
    State(app_state): State<AppState>,
    Path(work_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let checklists = app_state.work_service.list_checklists(work_id).await?;
    Ok(Json(checklists))
}

// PATCH /api/checklists/items/{id}
#[utoipa::path(
    patch,
    path = "/api/checklists/items/{id}",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateChecklistItemPayload,
    responses(
        (status = 200, description = "Item atualizado", body = ChecklistItem),
        (status = 404, description = "Item não encontrado"),
    ),
    security(("bearer_auth" = [])),
    tag = "checklists",
)]
pub async fn update_checklist_item(
    State(app_state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateChecklistItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.work_service.update_checklist_item(item_id, &payload).await?;
    Ok(Json(item))
}

// POST /api/checklists/{id}/complete
#[utoipa::path(
    post,
    path = "/api/checklists/{id}/complete",
    params(("id" = Uuid, Path, description = "ID do checklist")),
    responses(
        (status = 200, description = "Checklist concluído", body = Checklist),
        (status = 404, description = "Checklist não encontrado"),
        (status = 422, description = "Itens pendentes impedem a conclusão"),
    ),
    security(("bearer_auth" = [])),
    tag = "checklists",
)]
pub async fn complete_checklist(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(checklist_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let checklist = app_state
        .work_service
        .complete_checklist(checklist_id, user.0.id)
        .await?;

    Ok(Json(checklist))
}

// --- Documentos e fotos ---

// POST /api/works/{id}/documents
#[utoipa::path(
    post,
    path = "/api/works/{id}/documents",
    params(("id" = Uuid, Path, description = "ID da obra")),
    request_body = CreateDocumentPayload,
    responses(
        (status = 201, description = "Metadados de documento registrados", body = Document),
        (status = 404, description = "Obra não encontrada"),
    ),
    security(("bearer_auth" = [])),
    tag = "documents",
)]
pub async fn add_document(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(work_id): Path<Uuid>,
    Json(payload): Json<CreateDocumentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let document = app_state
        .work_service
        .add_document(work_id, &payload, user.0.id)
        .await?;

    Ok((StatusCode::CREATED, Json(document)))
}

// GET /api/works/{id}/documents
#[utoipa::path(
    get,
    path = "/api/works/{id}/documents",
    params(("id" = Uuid, Path, description = "ID da obra")),
    responses((status = 200, description = "Documentos da obra", body = [Document])),
    security(("bearer_auth" = [])),
    tag = "documents",
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    Path(work_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let documents = app_state.work_service.list_documents(work_id).await?;
    Ok(Json(documents))
}

// POST /api/works/{id}/photos
#[utoipa::path(
    post,
    path = "/api/works/{id}/photos",
    params(("id" = Uuid, Path, description = "ID da obra")),
    request_body = CreatePhotoPayload,
    responses(
        (status = 201, description = "Foto registrada", body = Photo),
        (status = 404, description = "Obra não encontrada"),
    ),
    security(("bearer_auth" = [])),
    tag = "photos",
)]
pub async fn add_photo(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(work_id): Path<Uuid>,
    Json(payload): Json<CreatePhotoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let photo = app_state.work_service.add_photo(work_id, &payload, user.0.id).await?;

    Ok((StatusCode::CREATED, Json(photo)))
}

// GET /api/works/{id}/photos
#[utoipa::path(
    get,
    path = "/api/works/{id}/photos",
    params(("id" = Uuid, Path, description = "ID da obra")),
    responses((status = 200, description = "Fotos da obra", body = [Photo])),
    security(("bearer_auth" = [])),
    tag = "photos",
)]
pub async fn list_photos(
    State(app_state): State<AppState>,
    Path(work_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let photos = app_state.work_service.list_photos(work_id).await?;
    Ok(Json(photos))
}
