// src/services/session.rs

// Gerenciador de sessão do lado do cliente: autentica, persiste o token,
// restaura na inicialização e controla o modo de visualização.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::{
    common::error::AppError,
    models::{
        auth::{LoginResponse, LoginUserPayload, Role, User, ValidateResponse},
        session::Session,
    },
    services::{auth::AuthService, token_store::TokenStore},
};

/// Os dois endpoints de autenticação que o cliente consome.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError>;
    async fn validate(&self, token: &str) -> Result<User, AppError>;
}

/// Fala com um servidor remoto via HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// Corpo de sucesso ou erro mapeado; qualquer status não previsto é falha interna
async fn read_body<T: DeserializeOwned>(
    response: reqwest::Response,
    rejected: &[StatusCode],
    rejection: AppError,
) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    if rejected.contains(&status) {
        return Err(rejection);
    }
    let body = response.text().await.unwrap_or_default();
    Err(anyhow::anyhow!("Resposta inesperada do servidor ({}): {}", status, body).into())
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let payload = LoginUserPayload {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&payload)
            .send()
            .await?;

        read_body(
            response,
            &[StatusCode::BAD_REQUEST, StatusCode::UNAUTHORIZED],
            AppError::InvalidCredentials,
        )
        .await
    }

    async fn validate(&self, token: &str) -> Result<User, AppError> {
        let response = self
            .client
            .get(self.url("/api/auth/validate"))
            .bearer_auth(token)
            .send()
            .await?;

        let body: ValidateResponse = read_body(
            response,
            &[StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN],
            AppError::InvalidToken,
        )
        .await?;
        Ok(body.user)
    }
}

/// Mesmo contrato, sem rede: usa o `AuthService` do próprio processo.
#[derive(Clone)]
pub struct LocalAuthApi {
    auth: AuthService,
}

impl LocalAuthApi {
    pub fn new(auth: AuthService) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl AuthApi for LocalAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        self.auth.login_user(email, password).await
    }

    async fn validate(&self, token: &str) -> Result<User, AppError> {
        self.auth.validate_token(token).await
    }
}

pub struct SessionManager<A: AuthApi, S: TokenStore> {
    api: A,
    store: S,
    session: Session,
    token: Option<String>,
}

impl<A: AuthApi, S: TokenStore> SessionManager<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self {
            api,
            store,
            session: Session::anonymous(),
            token: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Login. Em falha a sessão atual não é alterada.
    pub async fn authenticate(&mut self, email: &str, password: &str) -> Result<&Session, AppError> {
        let LoginResponse { token, user } = self.api.login(email, password).await?;

        self.store.save(&token).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "Sessão autenticada");

        self.token = Some(token);
        self.session = Session::authenticated(user);
        Ok(&self.session)
    }

    /// Revalida um token já emitido. Qualquer falha derruba a sessão e
    /// apaga o token armazenado.
    pub async fn restore_session(&mut self, token: &str) -> Result<&Session, AppError> {
        match self.api.validate(token).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Sessão restaurada");
                self.token = Some(token.to_string());
                self.session = Session::authenticated(user);
                Ok(&self.session)
            }
            Err(e) => {
                tracing::warn!("Falha ao restaurar sessão: {}", e);
                self.logout().await;
                match e {
                    AppError::InvalidToken | AppError::InvalidCredentials => Err(AppError::InvalidToken),
                    other => Err(other),
                }
            }
        }
    }

    /// Inicialização: restaura a partir do token persistido, se houver.
    /// Token ilegível conta como restauração falha: derruba a sessão e o arquivo.
    pub async fn resume(&mut self) -> Result<&Session, AppError> {
        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Token salvo ilegível: {}", e);
                self.logout().await;
                return Err(e);
            }
        };

        match stored {
            Some(token) => self.restore_session(&token).await,
            None => Ok(&self.session),
        }
    }

    /// Nunca falha; erro ao apagar o token só é registrado.
    pub async fn logout(&mut self) {
        if let Err(e) = self.store.remove().await {
            tracing::warn!("Não foi possível remover o token salvo: {}", e);
        }
        self.token = None;
        self.session.clear();
    }

    pub fn set_view_mode(&mut self, mode: Role) -> Result<&Session, AppError> {
        self.session.set_view_mode(mode)?;
        Ok(&self.session)
    }
}
