// src/db/floor_plan_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FloorPlanRepository,
    models::floor_plan::{FloorPlan, NewFloorPlan},
};

#[derive(Clone)]
pub struct PgFloorPlanRepository {
    pool: PgPool,
}

impl PgFloorPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FloorPlanRepository for PgFloorPlanRepository {
    async fn create_floor_plan(&self, new: NewFloorPlan) -> Result<FloorPlan, AppError> {
        sqlx::query_as::<_, FloorPlan>(
            r#"
            INSERT INTO floor_plans (id, name, image_url, franchise_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, image_url, franchise_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.name.trim())
        .bind(new.image_url.trim())
        .bind(new.franchise_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound(format!("franchise {}", new.franchise_id));
                }
            }
            e.into()
        })
    }

    async fn find_floor_plan(&self, id: Uuid) -> Result<Option<FloorPlan>, AppError> {
        let plan = sqlx::query_as::<_, FloorPlan>(
            r#"
            SELECT id, name, image_url, franchise_id, created_at
            FROM floor_plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn list_floor_plans(&self, franchise_id: Option<Uuid>) -> Result<Vec<FloorPlan>, AppError> {
        let plans = sqlx::query_as::<_, FloorPlan>(
            r#"
            SELECT id, name, image_url, franchise_id, created_at
            FROM floor_plans
            WHERE ($1::uuid IS NULL OR franchise_id = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(franchise_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }
}
