// src/models/case.rs

use std::{fmt, ops::Deref};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::{
        auth::Role,
        validation::{not_blank, not_nil},
    },
};

// --- Enums ---

// A ordem das variantes é a ordem do ciclo de vida
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "case_status")]
pub enum CaseStatus {
    #[serde(rename = "open")]
    #[sqlx(rename = "open")]
    Open,
    #[serde(rename = "in progress", alias = "in-progress", alias = "in_progress")]
    #[sqlx(rename = "in progress")]
    InProgress,
    #[serde(rename = "closed")]
    #[sqlx(rename = "closed")]
    Closed,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CaseStatus::Open => "open",
            CaseStatus::InProgress => "in progress",
            CaseStatus::Closed => "closed",
        })
    }
}

/// Resultado de uma mudança de status já autorizada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Forward,
    Reopen,
}

impl CaseStatus {
    /// Regra de transição: avançar é livre; voltar (reabrir) só para admin/superadmin.
    pub fn transition_to(self, next: CaseStatus, actor: Role) -> Result<Transition, AppError> {
        if next == self {
            return Ok(Transition::Unchanged);
        }
        if next > self {
            return Ok(Transition::Forward);
        }
        if actor.is_admin() {
            return Ok(Transition::Reopen);
        }
        Err(AppError::InvalidTransition {
            from: self,
            to: next,
        })
    }
}

// --- Log append-only ---

/// Sequência que só cresce. Não há API de edição nem de remoção; só o
/// próprio crate (os stores) consegue anexar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppendOnly<T>(Vec<T>);

impl<T> AppendOnly<T> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub(crate) fn from_vec(items: Vec<T>) -> Self {
        Self(items)
    }

    pub(crate) fn push(&mut self, item: T) {
        self.0.push(item);
    }
}

impl<T> Default for AppendOnly<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for AppendOnly<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

// --- Entradas dos logs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseUpdate {
    #[serde(alias = "user")]
    pub user_id: Uuid,
    #[schema(example = "Equipe de manutenção acionada")]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseFile {
    #[schema(example = "foto-vazamento.jpg")]
    pub name: String,
    #[serde(rename = "type")]
    #[schema(example = "image/jpeg")]
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Uuid,
}

// Metadados de arquivo enviados pelo cliente; o armazenamento do binário é externo
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct FileMeta {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "foto-vazamento.jpg")]
    pub name: String,
    #[serde(rename = "type", default)]
    #[schema(example = "image/jpeg")]
    pub content_type: String,
}

// Conteúdo de uma atualização; o autor vem sempre da sessão
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewUpdate {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Técnico a caminho")]
    pub content: String,
}

// --- Localização do incidente ---

/// Coordenada normalizada (0..=1) sobre a imagem da planta baixa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IncidentLocation {
    #[schema(example = 0.42)]
    pub x: f64,
    #[schema(example = 0.17)]
    pub y: f64,
}

impl IncidentLocation {
    pub fn new(x: f64, y: f64) -> Result<Self, AppError> {
        // `contains` é falso para NaN
        let unit = 0.0..=1.0;
        if !unit.contains(&x) || !unit.contains(&y) {
            return Err(AppError::OutOfBounds { x, y });
        }
        Ok(Self { x, y })
    }
}

// --- O Caso ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: Uuid,
    #[schema(example = "Vazamento na cozinha")]
    pub title: String,
    pub description: String,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
    pub assigned_to: Option<Uuid>,
    #[schema(value_type = Vec<CaseUpdate>)]
    pub updates: AppendOnly<CaseUpdate>,
    #[schema(value_type = Vec<CaseFile>)]
    pub files: AppendOnly<CaseFile>,
    #[serde(alias = "franchise")]
    pub franchise_id: Uuid,
    #[serde(alias = "floorPlan")]
    pub floor_plan_id: Option<Uuid>,
    pub incident_location: Option<IncidentLocation>,
}

impl Case {
    /// Caso recém-criado: aberto e com logs vazios.
    pub fn open(id: Uuid, new: NewCase, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title.trim().to_string(),
            description: new.description.trim().to_string(),
            status: CaseStatus::Open,
            created_at: now,
            assigned_to: None,
            updates: AppendOnly::new(),
            files: AppendOnly::new(),
            franchise_id: new.franchise_id,
            floor_plan_id: None,
            incident_location: None,
        }
    }

    /// Localização só existe com planta baixa.
    pub fn location_is_consistent(&self) -> bool {
        self.incident_location.is_none() || self.floor_plan_id.is_some()
    }
}

// Dados para criar um caso
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    #[validate(custom(function = "not_nil"))]
    pub franchise_id: Uuid,
}

// Filtro de listagem; franquia só tem efeito para superadmin
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct CaseFilter {
    pub franchise_id: Option<Uuid>,
    pub status: Option<CaseStatus>,
}

// --- Payloads das rotas de mutação ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusPayload {
    pub status: CaseStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignPayload {
    pub user_id: Uuid,
}

// Coordenadas chegam cruas; a faixa é validada por `IncidentLocation::new`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacementPayload {
    pub floor_plan_id: Uuid,
    pub x: f64,
    pub y: f64,
}
