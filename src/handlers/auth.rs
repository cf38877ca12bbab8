// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        auth::{LoginResponse, LoginUserPayload, ValidateResponse},
        session::{Session, SessionView},
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login realizado", body = LoginResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(response))
}

// GET /api/auth/validate
#[utoipa::path(
    get,
    path = "/api/auth/validate",
    tag = "Auth",
    responses(
        (status = 200, description = "Token válido", body = ValidateResponse),
        (status = 401, description = "Token inválido ou expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn validate(locale: Locale, session: Session) -> Result<Json<ValidateResponse>, ApiError> {
    let user = session
        .user()
        .cloned()
        .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale))?;
    Ok(Json(ValidateResponse { user }))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Sessão atual", body = SessionView),
        (status = 401, description = "Token inválido ou expirado"),
        (status = 403, description = "Modo de visualização não permitido")
    ),
    params(
        ("x-view-mode" = Option<String>, Header, description = "Papel de exibição (admin/superadmin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(session: Session) -> Json<SessionView> {
    Json(session.view())
}
