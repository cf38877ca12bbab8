// src/services/floor_plan_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{CaseRepository, FloorPlanRepository},
    models::{
        case::{Case, IncidentLocation},
        floor_plan::{FloorPlan, NewFloorPlan},
        session::Session,
    },
    services::scope,
};

/// Plantas baixas e a posição do incidente de cada caso sobre elas.
#[derive(Clone)]
pub struct FloorPlanLocator {
    case_repo: Arc<dyn CaseRepository>,
    floor_plan_repo: Arc<dyn FloorPlanRepository>,
}

impl FloorPlanLocator {
    pub fn new(case_repo: Arc<dyn CaseRepository>, floor_plan_repo: Arc<dyn FloorPlanRepository>) -> Self {
        Self {
            case_repo,
            floor_plan_repo,
        }
    }

    async fn load_case(&self, session: &Session, case_id: Uuid) -> Result<Case, AppError> {
        if !session.is_authenticated() {
            return Err(AppError::InvalidToken);
        }
        let case = self
            .case_repo
            .find_case(case_id)
            .await?
            .ok_or(AppError::CaseNotFound(case_id))?;
        scope::authorize(session, case.franchise_id)?;
        Ok(case)
    }

    pub async fn create_floor_plan(&self, session: &Session, new: NewFloorPlan) -> Result<FloorPlan, AppError> {
        if !session.is_authenticated() {
            return Err(AppError::InvalidToken);
        }
        new.validate()?;
        scope::authorize(session, new.franchise_id)?;

        let plan = self.floor_plan_repo.create_floor_plan(new).await?;
        tracing::info!(floor_plan_id = %plan.id, franchise_id = %plan.franchise_id, "Planta baixa cadastrada");
        Ok(plan)
    }

    pub async fn get_floor_plan(&self, session: &Session, id: Uuid) -> Result<FloorPlan, AppError> {
        if !session.is_authenticated() {
            return Err(AppError::InvalidToken);
        }
        let plan = self
            .floor_plan_repo
            .find_floor_plan(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("floor_plan:{}", id)))?;
        scope::authorize(session, plan.franchise_id)?;
        Ok(plan)
    }

    pub async fn list_floor_plans(
        &self,
        session: &Session,
        franchise_id: Option<Uuid>,
    ) -> Result<Vec<FloorPlan>, AppError> {
        let franchise_id = scope::listing_scope(session, franchise_id)?;
        self.floor_plan_repo.list_floor_plans(franchise_id).await
    }

    /// Marca o incidente sobre a planta. Vincula a planta se o caso ainda
    /// não tiver uma; trocar de planta exige `detach_floor_plan` antes.
    pub async fn set_incident_location(
        &self,
        session: &Session,
        case_id: Uuid,
        floor_plan_id: Uuid,
        x: f64,
        y: f64,
    ) -> Result<Case, AppError> {
        // 1. Caso existe e está no escopo do usuário
        let case = self.load_case(session, case_id).await?;

        // 2. Planta existe
        let plan = self
            .floor_plan_repo
            .find_floor_plan(floor_plan_id)
            .await?
            .ok_or(AppError::MissingFloorPlan)?;

        // 3. Planta e caso da mesma franquia
        if plan.franchise_id != case.franchise_id {
            return Err(AppError::FranchiseMismatch);
        }

        // 4. Caso sem planta ou com esta mesma planta
        if case.floor_plan_id.is_some_and(|bound| bound != plan.id) {
            return Err(AppError::FloorPlanMismatch);
        }

        // 5. Coordenadas normalizadas
        let location = IncidentLocation::new(x, y)?;

        let updated = self
            .case_repo
            .set_placement(case.id, case.floor_plan_id, Some(plan.id), Some(location))
            .await?;
        tracing::debug!(case_id = %case.id, floor_plan_id = %plan.id, x, y, "Incidente posicionado");
        Ok(updated)
    }

    /// Remove só a marcação; a planta continua vinculada.
    pub async fn clear_incident_location(&self, session: &Session, case_id: Uuid) -> Result<Case, AppError> {
        let case = self.load_case(session, case_id).await?;
        if case.incident_location.is_none() {
            return Ok(case);
        }
        self.case_repo
            .set_placement(case.id, case.floor_plan_id, case.floor_plan_id, None)
            .await
    }

    /// Desvincula a planta e, com ela, a marcação.
    pub async fn detach_floor_plan(&self, session: &Session, case_id: Uuid) -> Result<Case, AppError> {
        let case = self.load_case(session, case_id).await?;
        if case.floor_plan_id.is_none() {
            return Ok(case);
        }
        self.case_repo
            .set_placement(case.id, case.floor_plan_id, None, None)
            .await
    }
}
