// src/models/validation.rs

use std::borrow::Cow;

use uuid::Uuid;
use validator::ValidationError;

fn required(message: &'static str) -> ValidationError {
    let mut error = ValidationError::new("required");
    error.message = Some(Cow::Borrowed(message));
    error
}

// `length(min = 1)` aceita "   ", e isso não serve para título/conteúdo
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(required("Campo obrigatório."));
    }
    Ok(())
}

pub fn not_nil(value: &Uuid) -> Result<(), ValidationError> {
    if value.is_nil() {
        return Err(required("Identificador obrigatório."));
    }
    Ok(())
}
