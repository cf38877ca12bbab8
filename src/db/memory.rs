// src/db/memory.rs

//! Store em memória para desenvolvimento local e testes.
//!
//! Cada coleção fica num `HashMap` protegido por `tokio::sync::RwLock`.
//! Mutações de um caso acontecem inteiras sob o lock de escrita, então
//! anexos concorrentes ao mesmo caso ficam serializados e nenhum leitor
//! enxerga uma escrita pela metade. Nada é durável.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CaseRepository, FloorPlanRepository, FranchiseRepository, UserRepository},
    models::{
        auth::{User, UserWithPassword},
        case::{Case, CaseFile, CaseStatus, CaseUpdate, FileMeta, IncidentLocation, NewCase},
        floor_plan::{FloorPlan, NewFloorPlan},
        franchise::Franchise,
    },
};

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, UserWithPassword>>,
    franchises: RwLock<HashMap<Uuid, Franchise>>,
    floor_plans: RwLock<HashMap<Uuid, FloorPlan>>,
    cases: RwLock<HashMap<Uuid, Case>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// O relógio pode andar para trás; o log não
fn next_timestamp(last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match last {
        Some(last) if last > now => last,
        _ => now,
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, AppError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.get(&id).map(|u| u.user.clone()))
    }

    async fn create_user(&self, user: User, password_hash: &str) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.user.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict(format!("email {}", user.email)));
        }
        users.insert(
            user.id,
            UserWithPassword {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }
}

#[async_trait]
impl FranchiseRepository for InMemoryStore {
    async fn create_franchise(&self, name: &str) -> Result<Franchise, AppError> {
        let franchise = Franchise {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.franchises
            .write()
            .await
            .insert(franchise.id, franchise.clone());
        Ok(franchise)
    }

    async fn find_franchise(&self, id: Uuid) -> Result<Option<Franchise>, AppError> {
        Ok(self.franchises.read().await.get(&id).cloned())
    }

    async fn find_franchise_by_name(&self, name: &str) -> Result<Option<Franchise>, AppError> {
        let franchises = self.franchises.read().await;
        Ok(franchises.values().find(|f| f.name == name).cloned())
    }
}

#[async_trait]
impl FloorPlanRepository for InMemoryStore {
    async fn create_floor_plan(&self, new: NewFloorPlan) -> Result<FloorPlan, AppError> {
        if !self.franchises.read().await.contains_key(&new.franchise_id) {
            return Err(AppError::ResourceNotFound(format!("franchise {}", new.franchise_id)));
        }
        let plan = FloorPlan {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            image_url: new.image_url.trim().to_string(),
            franchise_id: new.franchise_id,
            created_at: Utc::now(),
        };
        self.floor_plans.write().await.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn find_floor_plan(&self, id: Uuid) -> Result<Option<FloorPlan>, AppError> {
        Ok(self.floor_plans.read().await.get(&id).cloned())
    }

    async fn list_floor_plans(&self, franchise_id: Option<Uuid>) -> Result<Vec<FloorPlan>, AppError> {
        let plans = self.floor_plans.read().await;
        let mut list: Vec<FloorPlan> = plans
            .values()
            .filter(|p| franchise_id.is_none_or(|f| p.franchise_id == f))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }
}

#[async_trait]
impl CaseRepository for InMemoryStore {
    async fn create_case(&self, new: NewCase) -> Result<Case, AppError> {
        if !self.franchises.read().await.contains_key(&new.franchise_id) {
            return Err(AppError::ResourceNotFound(format!("franchise {}", new.franchise_id)));
        }
        let case = Case::open(Uuid::new_v4(), new, Utc::now());
        self.cases.write().await.insert(case.id, case.clone());
        Ok(case)
    }

    async fn find_case(&self, id: Uuid) -> Result<Option<Case>, AppError> {
        Ok(self.cases.read().await.get(&id).cloned())
    }

    async fn list_cases(
        &self,
        franchise_id: Option<Uuid>,
        status: Option<CaseStatus>,
    ) -> Result<Vec<Case>, AppError> {
        let cases = self.cases.read().await;
        let mut list: Vec<Case> = cases
            .values()
            .filter(|c| franchise_id.is_none_or(|f| c.franchise_id == f))
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn append_update(
        &self,
        case_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<CaseUpdate, AppError> {
        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(&case_id)
            .ok_or(AppError::CaseNotFound(case_id))?;

        let entry = CaseUpdate {
            user_id,
            content: content.to_string(),
            created_at: next_timestamp(case.updates.last().map(|u| u.created_at)),
        };
        case.updates.push(entry.clone());
        Ok(entry)
    }

    async fn append_file(
        &self,
        case_id: Uuid,
        file: FileMeta,
        uploaded_by: Uuid,
    ) -> Result<CaseFile, AppError> {
        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(&case_id)
            .ok_or(AppError::CaseNotFound(case_id))?;

        let entry = CaseFile {
            name: file.name,
            content_type: file.content_type,
            uploaded_at: next_timestamp(case.files.last().map(|f| f.uploaded_at)),
            uploaded_by,
        };
        case.files.push(entry.clone());
        Ok(entry)
    }

    async fn update_status(
        &self,
        case_id: Uuid,
        from: CaseStatus,
        to: CaseStatus,
    ) -> Result<Case, AppError> {
        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(&case_id)
            .ok_or(AppError::CaseNotFound(case_id))?;

        if case.status != from {
            return Err(AppError::Conflict(format!("case {case_id} status")));
        }
        case.status = to;
        Ok(case.clone())
    }

    async fn set_assignee(&self, case_id: Uuid, user_id: Option<Uuid>) -> Result<Case, AppError> {
        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(&case_id)
            .ok_or(AppError::CaseNotFound(case_id))?;

        case.assigned_to = user_id;
        Ok(case.clone())
    }

    async fn set_placement(
        &self,
        case_id: Uuid,
        expected_floor_plan: Option<Uuid>,
        floor_plan_id: Option<Uuid>,
        location: Option<IncidentLocation>,
    ) -> Result<Case, AppError> {
        if location.is_some() && floor_plan_id.is_none() {
            return Err(AppError::MissingFloorPlan);
        }

        let mut cases = self.cases.write().await;
        let case = cases
            .get_mut(&case_id)
            .ok_or(AppError::CaseNotFound(case_id))?;

        if case.floor_plan_id != expected_floor_plan {
            return Err(AppError::Conflict(format!("case {case_id} floor plan")));
        }
        case.floor_plan_id = floor_plan_id;
        case.incident_location = location;
        Ok(case.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_case() -> (InMemoryStore, Case) {
        let store = InMemoryStore::new();
        let franchise = store.create_franchise("Centro").await.unwrap();
        let case = store
            .create_case(NewCase {
                title: "Porta emperrada".into(),
                description: "Entrada de serviço".into(),
                franchise_id: franchise.id,
            })
            .await
            .unwrap();
        (store, case)
    }

    #[tokio::test]
    async fn appended_timestamps_never_go_backwards() {
        let (store, case) = store_with_case().await;
        let author = Uuid::new_v4();
        for i in 0..20 {
            store
                .append_update(case.id, author, &format!("nota {i}"))
                .await
                .unwrap();
        }
        let stored = store.find_case(case.id).await.unwrap().unwrap();
        assert_eq!(stored.updates.len(), 20);
        assert!(stored
            .updates
            .windows(2)
            .all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn status_write_is_compare_and_set() {
        let (store, case) = store_with_case().await;
        store
            .update_status(case.id, CaseStatus::Open, CaseStatus::InProgress)
            .await
            .unwrap();
        let err = store
            .update_status(case.id, CaseStatus::Open, CaseStatus::Closed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn placement_rejects_location_without_plan() {
        let (store, case) = store_with_case().await;
        let location = IncidentLocation::new(0.5, 0.5).unwrap();
        let err = store
            .set_placement(case.id, None, None, Some(location))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingFloorPlan));
    }

    #[tokio::test]
    async fn case_requires_existing_franchise() {
        let store = InMemoryStore::new();
        let err = store
            .create_case(NewCase {
                title: "x".into(),
                description: "y".into(),
                franchise_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ResourceNotFound(_)));
    }
}
