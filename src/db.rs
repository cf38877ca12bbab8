// src/db.rs

// Contratos de persistência. Os serviços dependem apenas destas traits;
// há duas implementações: Postgres (sqlx) e memória (dev/testes).

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{User, UserWithPassword},
        case::{Case, CaseFile, CaseStatus, CaseUpdate, FileMeta, IncidentLocation, NewCase},
        floor_plan::{FloorPlan, NewFloorPlan},
        franchise::Franchise,
    },
};

pub mod case_repo;
pub mod floor_plan_repo;
pub mod franchise_repo;
pub mod memory;
pub mod user_repo;

pub use case_repo::PgCaseRepository;
pub use floor_plan_repo::PgFloorPlanRepository;
pub use franchise_repo::PgFranchiseRepository;
pub use memory::InMemoryStore;
pub use user_repo::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    /// `user.id` é gerado pelo chamador; e-mail duplicado vira `Conflict`.
    async fn create_user(&self, user: User, password_hash: &str) -> Result<User, AppError>;
}

#[async_trait]
pub trait FranchiseRepository: Send + Sync {
    async fn create_franchise(&self, name: &str) -> Result<Franchise, AppError>;
    async fn find_franchise(&self, id: Uuid) -> Result<Option<Franchise>, AppError>;
    async fn find_franchise_by_name(&self, name: &str) -> Result<Option<Franchise>, AppError>;
}

#[async_trait]
pub trait FloorPlanRepository: Send + Sync {
    async fn create_floor_plan(&self, new: NewFloorPlan) -> Result<FloorPlan, AppError>;
    async fn find_floor_plan(&self, id: Uuid) -> Result<Option<FloorPlan>, AppError>;
    /// `None` lista todas as franquias.
    async fn list_floor_plans(&self, franchise_id: Option<Uuid>) -> Result<Vec<FloorPlan>, AppError>;
}

#[async_trait]
pub trait CaseRepository: Send + Sync {
    async fn create_case(&self, new: NewCase) -> Result<Case, AppError>;
    async fn find_case(&self, id: Uuid) -> Result<Option<Case>, AppError>;
    /// Mais recentes primeiro.
    async fn list_cases(
        &self,
        franchise_id: Option<Uuid>,
        status: Option<CaseStatus>,
    ) -> Result<Vec<Case>, AppError>;

    /// Anexa ao fim do log; o timestamp é do servidor e nunca menor que o da entrada anterior.
    async fn append_update(
        &self,
        case_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CaseUpdate, AppError>;

    async fn append_file(
        &self,
        case_id: Uuid,
        file: FileMeta,
        uploaded_by: Uuid,
    ) -> Result<CaseFile, AppError>;

    /// Compare-and-set: só grava se o status atual ainda for `from` (senão `Conflict`).
    async fn update_status(
        &self,
        case_id: Uuid,
        from: CaseStatus,
        to: CaseStatus,
    ) -> Result<Case, AppError>;

    async fn set_assignee(&self, case_id: Uuid, user_id: Option<Uuid>) -> Result<Case, AppError>;

    /// Grava planta e localização juntas, desde que a planta atual ainda seja `expected_floor_plan`.
    async fn set_placement(
        &self,
        case_id: Uuid,
        expected_floor_plan: Option<Uuid>,
        floor_plan_id: Option<Uuid>,
        location: Option<IncidentLocation>,
    ) -> Result<Case, AppError>;
}
