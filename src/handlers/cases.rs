// src/handlers/cases.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::{
        case::{
            AssignPayload, Case, CaseFile, CaseFilter, CaseUpdate, FileMeta, NewCase, NewUpdate,
            PlacementPayload, StatusPayload,
        },
        session::Session,
    },
};

// =============================================================================
//  CICLO DE VIDA
// =============================================================================

// POST /api/cases
#[utoipa::path(
    post,
    path = "/api/cases",
    tag = "Cases",
    request_body = NewCase,
    responses(
        (status = 201, description = "Caso aberto", body = Case),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Franquia fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_case(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Json(payload): Json<NewCase>,
) -> Result<impl IntoResponse, ApiError> {
    let case = app_state
        .case_service
        .create_case(&session, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(case)))
}

// GET /api/cases
#[utoipa::path(
    get,
    path = "/api/cases",
    tag = "Cases",
    params(CaseFilter),
    responses(
        (status = 200, description = "Casos visíveis para a sessão", body = Vec<Case>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_cases(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Query(filter): Query<CaseFilter>,
) -> Result<Json<Vec<Case>>, ApiError> {
    let cases = app_state
        .case_service
        .list_cases(&session, filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(cases))
}

// GET /api/cases/{id}
#[utoipa::path(
    get,
    path = "/api/cases/{id}",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 200, description = "Caso", body = Case),
        (status = 403, description = "Franquia fora do escopo"),
        (status = 404, description = "Caso não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_case(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Case>, ApiError> {
    let case = app_state
        .case_service
        .get_case(&session, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(case))
}

// PUT /api/cases/{id}/status
#[utoipa::path(
    put,
    path = "/api/cases/{id}/status",
    tag = "Cases",
    request_body = StatusPayload,
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 200, description = "Status atualizado", body = Case),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_status(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusPayload>,
) -> Result<Json<Case>, ApiError> {
    let case = app_state
        .case_service
        .set_status(&session, id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(case))
}

// =============================================================================
//  LOGS (SÓ ANEXAR)
// =============================================================================

// POST /api/cases/{id}/updates
#[utoipa::path(
    post,
    path = "/api/cases/{id}/updates",
    tag = "Cases",
    request_body = NewUpdate,
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 201, description = "Atualização anexada", body = CaseUpdate),
        (status = 400, description = "Conteúdo vazio")
    ),
    security(("api_jwt" = []))
)]
pub async fn append_update(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let update = app_state
        .case_service
        .append_update(&session, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(update)))
}

// POST /api/cases/{id}/files
#[utoipa::path(
    post,
    path = "/api/cases/{id}/files",
    tag = "Cases",
    request_body = FileMeta,
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 201, description = "Arquivo anexado", body = CaseFile),
        (status = 400, description = "Nome vazio")
    ),
    security(("api_jwt" = []))
)]
pub async fn attach_file(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<FileMeta>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state
        .case_service
        .attach_file(&session, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(file)))
}

// =============================================================================
//  RESPONSÁVEL
// =============================================================================

// PUT /api/cases/{id}/assignee
#[utoipa::path(
    put,
    path = "/api/cases/{id}/assignee",
    tag = "Cases",
    request_body = AssignPayload,
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 200, description = "Responsável definido", body = Case),
        (status = 404, description = "Usuário não encontrado"),
        (status = 409, description = "Usuário de outra franquia")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignPayload>,
) -> Result<Json<Case>, ApiError> {
    let case = app_state
        .case_service
        .assign(&session, id, payload.user_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(case))
}

// DELETE /api/cases/{id}/assignee
#[utoipa::path(
    delete,
    path = "/api/cases/{id}/assignee",
    tag = "Cases",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses((status = 200, description = "Responsável removido", body = Case)),
    security(("api_jwt" = []))
)]
pub async fn unassign(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Case>, ApiError> {
    let case = app_state
        .case_service
        .unassign(&session, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(case))
}

// =============================================================================
//  LOCALIZAÇÃO NA PLANTA BAIXA
// =============================================================================

// PUT /api/cases/{id}/incident-location
#[utoipa::path(
    put,
    path = "/api/cases/{id}/incident-location",
    tag = "Floor Plans",
    request_body = PlacementPayload,
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses(
        (status = 200, description = "Incidente posicionado", body = Case),
        (status = 409, description = "Planta de outra franquia ou diferente da vinculada"),
        (status = 422, description = "Planta baixa inexistente ou coordenadas fora de 0..1")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_incident_location(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlacementPayload>,
) -> Result<Json<Case>, ApiError> {
    let case = app_state
        .floor_plan_locator
        .set_incident_location(&session, id, payload.floor_plan_id, payload.x, payload.y)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(case))
}

// DELETE /api/cases/{id}/incident-location
#[utoipa::path(
    delete,
    path = "/api/cases/{id}/incident-location",
    tag = "Floor Plans",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses((status = 200, description = "Marcação removida", body = Case)),
    security(("api_jwt" = []))
)]
pub async fn clear_incident_location(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Case>, ApiError> {
    let case = app_state
        .floor_plan_locator
        .clear_incident_location(&session, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(case))
}

// DELETE /api/cases/{id}/floor-plan
#[utoipa::path(
    delete,
    path = "/api/cases/{id}/floor-plan",
    tag = "Floor Plans",
    params(("id" = Uuid, Path, description = "ID do caso")),
    responses((status = 200, description = "Planta e marcação desvinculadas", body = Case)),
    security(("api_jwt" = []))
)]
pub async fn detach_floor_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Case>, ApiError> {
    let case = app_state
        .floor_plan_locator
        .detach_floor_plan(&session, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(case))
}
