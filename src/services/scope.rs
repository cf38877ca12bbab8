// src/services/scope.rs

// Guarda de escopo por franquia. Predicado puro: não lê banco nem grava nada,
// então uma negação nunca deixa efeito colateral.

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{auth::User, session::Session},
};

/// `true` se a sessão pode ler/escrever algo da franquia `target_franchise`.
pub fn permit(session: &Session, target_franchise: Uuid) -> bool {
    session
        .user()
        .is_some_and(|user| user.role.is_super_admin() || user.franchise_id == target_franchise)
}

/// Forma usada pelos serviços: devolve o usuário autorizado ou o erro certo.
pub fn authorize(session: &Session, target_franchise: Uuid) -> Result<&User, AppError> {
    let user = session.user().ok_or(AppError::InvalidToken)?;

    if !permit(session, target_franchise) {
        tracing::warn!(
            user_id = %user.id,
            franchise_id = %user.franchise_id,
            target = %target_franchise,
            "Acesso negado fora da franquia"
        );
        return Err(AppError::PermissionDenied);
    }

    Ok(user)
}

/// Franquia efetiva de uma listagem. Superadmin pode pedir qualquer uma (ou
/// todas, com `None`); os demais ficam presos à própria.
pub fn listing_scope(session: &Session, requested: Option<Uuid>) -> Result<Option<Uuid>, AppError> {
    let user = session.user().ok_or(AppError::InvalidToken)?;

    if user.role.is_super_admin() {
        return Ok(requested);
    }
    match requested {
        Some(franchise_id) => authorize(session, franchise_id).map(|u| Some(u.franchise_id)),
        None => Ok(Some(user.franchise_id)),
    }
}
