// src/handlers/floor_plans.rs

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
        floor_plan::{FloorPlan, FloorPlanFilter, NewFloorPlan},
        session::Session,
    },
};

// POST /api/floor-plans
#[utoipa::path(
    post,
    path = "/api/floor-plans",
    tag = "Floor Plans",
    request_body = NewFloorPlan,
    responses(
        (status = 201, description = "Planta baixa cadastrada", body = FloorPlan),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Franquia fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_floor_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Json(payload): Json<NewFloorPlan>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = app_state
        .floor_plan_locator
        .create_floor_plan(&session, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(plan)))
}

// GET /api/floor-plans
#[utoipa::path(
    get,
    path = "/api/floor-plans",
    tag = "Floor Plans",
    params(FloorPlanFilter),
    responses((status = 200, description = "Plantas visíveis para a sessão", body = Vec<FloorPlan>)),
    security(("api_jwt" = []))
)]
pub async fn list_floor_plans(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Query(filter): Query<FloorPlanFilter>,
) -> Result<Json<Vec<FloorPlan>>, ApiError> {
    let plans = app_state
        .floor_plan_locator
        .list_floor_plans(&session, filter.franchise_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(plans))
}

// GET /api/floor-plans/{id}
#[utoipa::path(
    get,
    path = "/api/floor-plans/{id}",
    tag = "Floor Plans",
    params(("id" = Uuid, Path, description = "ID da planta baixa")),
    responses(
        (status = 200, description = "Planta baixa", body = FloorPlan),
        (status = 404, description = "Planta baixa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_floor_plan(
    State(app_state): State<AppState>,
    locale: Locale,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<FloorPlan>, ApiError> {
    let plan = app_state
        .floor_plan_locator
        .get_floor_plan(&session, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(plan))
}
