// src/models/floor_plan.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::{not_blank, not_nil};

// Planta baixa de uma franquia; os casos só a referenciam
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlan {
    pub id: Uuid,
    #[schema(example = "Loja Centro - Térreo")]
    pub name: String,
    #[schema(example = "https://cdn.exemplo.com/plantas/centro-terreo.png")]
    pub image_url: String,
    pub franchise_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewFloorPlan {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub image_url: String,
    #[validate(custom(function = "not_nil"))]
    pub franchise_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FloorPlanFilter {
    pub franchise_id: Option<Uuid>,
}
