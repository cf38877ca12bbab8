// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, LoginResponse, NewUser, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_secret: String,
        token_ttl: Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            user_repo,
            jwt_secret,
            token_ttl,
            bcrypt_cost,
        }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let Some(record) = self.user_repo.find_by_email(email).await? else {
            tracing::info!("Tentativa de login com e-mail desconhecido");
            return Err(AppError::InvalidCredentials);
        };

        let password_clone = password.to_owned();
        let password_hash_clone = record.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            tracing::info!(user_id = %record.user.id, "Senha inválida no login");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(record.user.id)?;
        tracing::info!(user_id = %record.user.id, role = %record.user.role, "✅ Login realizado");

        Ok(LoginResponse {
            token,
            user: record.user,
        })
    }

    /// Valida o JWT e relê o usuário do banco (papel e franquia sempre atuais).
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!("Token rejeitado: {}", e);
            AppError::InvalidToken
        })?;

        // Usuário removido depois da emissão do token: o token deixa de valer
        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn user_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.user_repo.find_by_email(email).await?.is_some())
    }

    /// Provisionamento de contas (bootstrap e testes).
    pub async fn provision_user(&self, new: NewUser) -> Result<User, AppError> {
        new.validate()?;

        let cost = self.bcrypt_cost;
        let password = new.password.clone();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let user = User {
            id: Uuid::new_v4(),
            email: new.email.trim().to_string(),
            role: new.role,
            franchise_id: new.franchise_id,
        };
        let user = self.user_repo.create_user(user, &hashed_password).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "Usuário provisionado");

        Ok(user)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
