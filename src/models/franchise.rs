// src/models/franchise.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// A unidade de escopo: todo caso e toda planta pertencem a exatamente uma
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Franchise {
    pub id: Uuid,
    #[schema(example = "Franquia Centro")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}
