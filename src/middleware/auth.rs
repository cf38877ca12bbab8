// src/middleware/auth.rs

use std::str::FromStr;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{auth::Role, session::Session},
};

// Troca do modo de visualização válida só para esta requisição
pub const VIEW_MODE_HEADER: &str = "x-view-mode";

/// Valida o bearer token e deixa a `Session` da requisição nos extensions.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extrai o token
    let Some(authorization) = request.headers().typed_get::<Authorization<Bearer>>() else {
        return Err(AppError::InvalidToken.to_api_error(&locale));
    };

    // 2. Valida e relê o usuário
    let user = app_state
        .auth_service
        .validate_token(authorization.token())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    // 3. Monta a sessão e aplica o modo de visualização pedido
    let mut session = Session::authenticated(user);
    if let Some(mode) = requested_view_mode(&request).map_err(|e| e.to_api_error(&locale))? {
        session
            .set_view_mode(mode)
            .map_err(|e| e.to_api_error(&locale))?;
    }

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

fn requested_view_mode(request: &Request) -> Result<Option<Role>, AppError> {
    let Some(value) = request.headers().get(VIEW_MODE_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|raw| Role::from_str(raw.trim()).ok())
        .map(Some)
        .ok_or_else(|| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("viewMode", validator::ValidationError::new("unknown_role"));
            AppError::ValidationError(errors)
        })
}

// Extrator da sessão montada pelo `auth_guard`
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Session>() {
            Some(session) => Ok(session.clone()),
            None => {
                let locale = Locale::from_request_parts(parts, state)
                    .await
                    .unwrap_or_default();
                Err(AppError::InvalidToken.to_api_error(&locale))
            }
        }
    }
}
