// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{User, UserWithPassword},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    // E-mail é comparado sem diferenciar maiúsculas (índice em lower(email))
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, AppError> {
        let maybe_user = sqlx::query_as::<_, UserWithPassword>(
            r#"
            SELECT id, email, role, franchise_id, password_hash
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT id, email, role, franchise_id FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe_user)
    }

    async fn create_user(&self, user: User, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, role, franchise_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, role, franchise_id
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(password_hash)
        .bind(user.role)
        .bind(user.franchise_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("email {}", user.email));
                }
                if db_err.is_foreign_key_violation() {
                    return AppError::ResourceNotFound(format!("franchise {}", user.franchise_id));
                }
            }
            e.into()
        })
    }
}
