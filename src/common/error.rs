// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::{common::messages, middleware::i18n::Locale, models::case::CaseStatus};

// Erro de domínio da aplicação. Serviços e repositórios devolvem sempre este tipo;
// a camada HTTP converte em `ApiError` já traduzido.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido ou expirado")]
    InvalidToken,

    #[error("Permissão negada")]
    PermissionDenied,

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidTransition { from: CaseStatus, to: CaseStatus },

    #[error("Coordenadas fora do intervalo [0, 1]: ({x}, {y})")]
    OutOfBounds { x: f64, y: f64 },

    #[error("Planta baixa inexistente")]
    MissingFloorPlan,

    #[error("O caso já está vinculado a outra planta baixa")]
    FloorPlanMismatch,

    #[error("Franquia divergente")]
    FranchiseMismatch,

    #[error("Caso não encontrado: {0}")]
    CaseNotFound(Uuid),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Conflito: {0}")]
    Conflict(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro no cliente HTTP: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::CaseNotFound(_) | AppError::UserNotFound | AppError::ResourceNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            AppError::InvalidTransition { .. }
            | AppError::FloorPlanMismatch
            | AppError::FranchiseMismatch
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::OutOfBounds { .. } | AppError::MissingFloorPlan => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código estável para o cliente (não traduzido).
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_or_expired_token",
            AppError::PermissionDenied => "permission_denied",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::OutOfBounds { .. } => "out_of_bounds",
            AppError::MissingFloorPlan => "missing_floor_plan",
            AppError::FloorPlanMismatch => "floor_plan_mismatch",
            AppError::FranchiseMismatch => "franchise_mismatch",
            AppError::CaseNotFound(_) => "case_not_found",
            AppError::UserNotFound => "user_not_found",
            AppError::ResourceNotFound(_) => "resource_not_found",
            AppError::Conflict(_) => "conflict",
            _ => "internal_error",
        }
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        let code = self.code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica só no log
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let list: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), json!(list));
                }
                Some(Value::Object(fields))
            }
            AppError::InvalidTransition { from, to } => Some(json!({ "from": from, "to": to })),
            AppError::OutOfBounds { x, y } => Some(json!({ "x": x, "y": y })),
            AppError::CaseNotFound(id) => Some(json!({ "caseId": id })),
            AppError::ResourceNotFound(what) | AppError::Conflict(what) => {
                Some(json!({ "resource": what }))
            }
            _ => None,
        };

        ApiError {
            status,
            code,
            error: messages::lookup(&locale.0, code).to_string(),
            details,
        }
    }
}

// Erro já pronto para sair pela API
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "code": self.code, "error": self.error });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

// Sem idioma da requisição à mão: usa o padrão
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_http_status() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::PermissionDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::FranchiseMismatch.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::OutOfBounds { x: 1.5, y: 0.0 }.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::CaseNotFound(Uuid::nil()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn message_follows_locale() {
        let en = AppError::PermissionDenied.to_api_error(&Locale("en".into()));
        let pt = AppError::PermissionDenied.to_api_error(&Locale("pt".into()));
        assert_eq!(en.code, "permission_denied");
        assert_eq!(pt.code, en.code);
        assert_ne!(en.error, pt.error);
    }

    #[test]
    fn transition_details_carry_both_states() {
        let api = AppError::InvalidTransition {
            from: CaseStatus::Closed,
            to: CaseStatus::Open,
        }
        .to_api_error(&Locale::default());
        let details = api.details.unwrap();
        assert_eq!(details["from"], "closed");
        assert_eq!(details["to"], "open");
    }
}
