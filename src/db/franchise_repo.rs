// src/db/franchise_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, db::FranchiseRepository, models::franchise::Franchise};

#[derive(Clone)]
pub struct PgFranchiseRepository {
    pool: PgPool,
}

impl PgFranchiseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FranchiseRepository for PgFranchiseRepository {
    async fn create_franchise(&self, name: &str) -> Result<Franchise, AppError> {
        let franchise = sqlx::query_as::<_, Franchise>(
            r#"
            INSERT INTO franchises (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(franchise)
    }

    async fn find_franchise(&self, id: Uuid) -> Result<Option<Franchise>, AppError> {
        let franchise = sqlx::query_as::<_, Franchise>(
            "SELECT id, name, created_at FROM franchises WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(franchise)
    }

    async fn find_franchise_by_name(&self, name: &str) -> Result<Option<Franchise>, AppError> {
        let franchise = sqlx::query_as::<_, Franchise>(
            "SELECT id, name, created_at FROM franchises WHERE name = $1 LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(franchise)
    }
}
